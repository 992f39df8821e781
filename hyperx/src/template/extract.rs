//! Extraction of `<template>` and `<style>` blocks from component sources

use once_cell::sync::Lazy;
use regex::Regex;

static TEMPLATE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(/?)template\b[^>]*>").expect("Invalid regex"));

static STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<style[^>]*>([\s\S]*?)</style\s*>").expect("Invalid regex"));

/// Extract the inner markup of the first `<template>` block
///
/// Tag matching is case-insensitive and nesting-aware, so a component
/// template may itself contain `<template>` elements (for example JSON
/// render targets). Returns `None` when there is no complete block or when
/// its content is blank; otherwise returns the trimmed inner content.
///
/// # Examples
///
/// ```rust
/// use hyperx::template::extract_template_content;
///
/// let src = "<style>p{}</style><TEMPLATE>\n  <p>{{ name }}</p>\n</TEMPLATE>";
/// assert_eq!(extract_template_content(src).as_deref(), Some("<p>{{ name }}</p>"));
/// assert_eq!(extract_template_content("<div></div>"), None);
/// ```
#[must_use]
pub fn extract_template_content(source: &str) -> Option<String> {
    let mut depth = 0usize;
    let mut start = None;

    for caps in TEMPLATE_TAG.captures_iter(source) {
        let tag = caps.get(0)?;
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());

        if closing {
            if depth == 0 {
                continue;
            }
            depth -= 1;
            if depth == 0 {
                let inner = source[start?..tag.start()].trim();
                return (!inner.is_empty()).then(|| inner.to_string());
            }
        } else {
            if depth == 0 {
                start = Some(tag.end());
            }
            depth += 1;
        }
    }

    None
}

/// Extract the content of the first `<style>` block, if any
#[must_use]
pub fn extract_style_content(source: &str) -> Option<&str> {
    STYLE_BLOCK
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Put `styles` into `source` as its single `<style>` block
///
/// An existing first `<style>` block is replaced in place. Otherwise a new
/// block is inserted at the start of the first `<template>` so it survives
/// template extraction; sources without a template get the block
/// prepended. Blank `styles` leave a style-less source untouched.
#[must_use]
pub fn splice_style_block(source: &str, styles: &str) -> String {
    let block = format!("<style>\n{styles}\n</style>");

    if let Some(existing) = STYLE_BLOCK.find(source) {
        let mut out = String::with_capacity(source.len() + styles.len());
        out.push_str(&source[..existing.start()]);
        out.push_str(&block);
        out.push_str(&source[existing.end()..]);
        return out;
    }

    if styles.trim().is_empty() {
        return source.to_string();
    }

    TEMPLATE_TAG
        .captures_iter(source)
        .find(|caps| caps.get(1).is_none_or(|m| m.as_str().is_empty()))
        .and_then(|caps| caps.get(0))
        .map_or_else(
            || format!("\n{block}\n{source}"),
            |open| {
                format!(
                    "{}\n{block}\n{}",
                    &source[..open.end()],
                    &source[open.end()..]
                )
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_template_trims_content() {
        let src = "<template>\n   <div>{{name}}</div>\n</template>";
        assert_eq!(extract_template_content(src).as_deref(), Some("<div>{{name}}</div>"));
    }

    #[test]
    fn test_extract_template_case_insensitive_with_attributes() {
        let src = r#"<Template id="x" shadow="open"><b>hi</b></TEMPLATE>"#;
        assert_eq!(extract_template_content(src).as_deref(), Some("<b>hi</b>"));
    }

    #[test]
    fn test_extract_template_missing_or_empty() {
        assert_eq!(extract_template_content(""), None);
        assert_eq!(extract_template_content("<div>no template</div>"), None);
        assert_eq!(extract_template_content("<template>   \n </template>"), None);
        assert_eq!(extract_template_content("<template><p>unclosed"), None);
    }

    #[test]
    fn test_extract_template_first_block_only() {
        let src = "<template>one</template><template>two</template>";
        assert_eq!(extract_template_content(src).as_deref(), Some("one"));
    }

    #[test]
    fn test_extract_template_keeps_nested_templates() {
        let src = r#"<template><ul id="list"><template><li>{{x}}</li></template></ul></template>"#;
        assert_eq!(
            extract_template_content(src).as_deref(),
            Some(r#"<ul id="list"><template><li>{{x}}</li></template></ul>"#)
        );
    }

    #[test]
    fn test_extract_template_does_not_match_similar_tags() {
        let src = "<templates><template>ok</template></templates>";
        assert_eq!(extract_template_content(src).as_deref(), Some("ok"));
    }

    #[test]
    fn test_extract_style_content() {
        assert_eq!(
            extract_style_content("<template></template><STYLE media=\"x\">p { color: red; }</style>"),
            Some("p { color: red; }")
        );
        assert_eq!(extract_style_content("<template></template>"), None);
    }

    #[test]
    fn test_splice_replaces_existing_style() {
        let src = "<template><style>old</style><p></p></template>";
        assert_eq!(
            splice_style_block(src, "new"),
            "<template><style>\nnew\n</style><p></p></template>"
        );
    }

    #[test]
    fn test_splice_inserts_into_template_when_absent() {
        let src = "<template><p></p></template>";
        assert_eq!(
            splice_style_block(src, ".a p {}"),
            "<template>\n<style>\n.a p {}\n</style>\n<p></p></template>"
        );
    }

    #[test]
    fn test_splice_blank_styles_without_block_is_noop() {
        let src = "<template><p></p></template>";
        assert_eq!(splice_style_block(src, "  "), src);
    }

    #[test]
    fn test_splice_without_template_prepends() {
        assert_eq!(splice_style_block("<p></p>", "x"), "\n<style>\nx\n</style>\n<p></p>");
    }
}

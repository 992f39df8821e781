//! Stylesheet scoping and merging
//!
//! External stylesheets are scoped by prefixing each selector with the
//! component class (`.usercard h2`). The component's own inline styles are
//! appended after the scoped rules and win by source order.

use crate::template::file_stem;

/// At-rules whose blocks contain ordinary style rules
const GROUPING_AT_RULES: &[&str] = &["@media", "@supports", "@layer", "@container", "@document"];

/// Stands in for a comment while scanning; restored afterwards
const OPAQUE: char = '\u{FDD0}';

/// CSS class used to scope a component's external styles
///
/// The file stem, lowercased: `UserCard.hpx` -> `usercard`.
#[must_use]
pub fn component_class(component_file: &str) -> String {
    file_stem(component_file).to_lowercase()
}

/// Prefix every selector in `css` with `.{class}`
///
/// Selectors containing `:host` or `:root` are left alone, as are at-rule
/// preludes and `/* ... */` comments. Rules nested in grouping at-rules (`@media`, `@supports`, ...)
/// are scoped; the insides of other at-rules (`@keyframes`, `@font-face`)
/// are not.
///
/// # Examples
///
/// ```rust
/// use hyperx::components::scope_css;
///
/// assert_eq!(scope_css("card", "h2, p { color: red; }"), ".card h2, .card p { color: red; }");
/// assert_eq!(scope_css("card", ":host { display: block; }"), ":host { display: block; }");
/// ```
#[must_use]
pub fn scope_css(class: &str, css: &str) -> String {
    let prefix = format!(".{class}");
    let mut out = String::with_capacity(css.len() + css.len() / 4);
    let mut pending = String::new();
    let mut scopable: Vec<bool> = Vec::new();
    let mut opaque: Vec<String> = Vec::new();

    let mut chars = css.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut comment = String::from("/*");
                let mut prev = '\0';
                for c in chars.by_ref() {
                    comment.push(c);
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                opaque.push(comment);
                pending.push(OPAQUE);
            }
            OPAQUE => {
                opaque.push(ch.to_string());
                pending.push(OPAQUE);
            }
            '{' => {
                let (passthrough, prelude) = pending
                    .rfind(';')
                    .map_or(("", pending.as_str()), |idx| pending.split_at(idx + 1));
                out.push_str(passthrough);

                let body = prelude.trim_start_matches(|c: char| c.is_whitespace() || c == OPAQUE);
                let lead = &prelude[..prelude.len() - body.len()];
                let selector = body.trim_end();
                let allowed = scopable.last().copied().unwrap_or(true);

                if selector.starts_with('@') {
                    out.push_str(prelude);
                    let grouping = GROUPING_AT_RULES
                        .iter()
                        .any(|rule| selector.to_ascii_lowercase().starts_with(rule));
                    scopable.push(allowed && grouping);
                } else if allowed && !selector.is_empty() {
                    out.push_str(lead);
                    out.push_str(&scope_selector_list(&prefix, selector));
                    out.push(' ');
                    scopable.push(false);
                } else {
                    out.push_str(prelude);
                    scopable.push(false);
                }

                out.push('{');
                pending.clear();
            }
            '}' => {
                out.push_str(&pending);
                pending.clear();
                scopable.pop();
                out.push('}');
            }
            _ => pending.push(ch),
        }
    }

    out.push_str(&pending);
    restore_opaque(&out, opaque)
}

fn restore_opaque(scanned: &str, opaque: Vec<String>) -> String {
    if opaque.is_empty() {
        return scanned.to_string();
    }
    let mut opaque = opaque.into_iter();
    let mut out = String::with_capacity(scanned.len());
    for ch in scanned.chars() {
        if ch == OPAQUE {
            out.push_str(&opaque.next().unwrap_or_default());
        } else {
            out.push(ch);
        }
    }
    out
}

fn scope_selector_list(prefix: &str, selectors: &str) -> String {
    selectors
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|selector| {
            if selector.contains(":host") || selector.contains(":root") {
                selector.to_string()
            } else {
                format!("{prefix} {selector}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Merge a component's styles
///
/// Scoped external rules come first, separated by a blank line from the
/// component's inline `<style>` content. A missing or empty external
/// stylesheet contributes nothing.
#[must_use]
pub fn merge_styles(component_file: &str, inline: &str, external: Option<&str>) -> String {
    let mut styles = match external.filter(|css| !css.is_empty()) {
        Some(css) => {
            let mut scoped = scope_css(&component_class(component_file), css);
            scoped.push_str("\n\n");
            scoped
        }
        None => String::new(),
    };
    styles.push_str(inline);
    styles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_class() {
        assert_eq!(component_class("UserCard.hpx"), "usercard");
        assert_eq!(component_class("nested/Todo-List.hpx"), "todo-list");
    }

    #[test]
    fn test_scope_multiple_rules() {
        let css = "h2 { margin: 0; }\n.title, .sub { color: red; }";
        assert_eq!(
            scope_css("card", css),
            ".card h2 { margin: 0; }\n.card .title, .card .sub { color: red; }"
        );
    }

    #[test]
    fn test_scope_skips_host_and_root() {
        assert_eq!(
            scope_css("card", ":root, p { --x: 1; }"),
            ":root, .card p { --x: 1; }"
        );
        assert_eq!(scope_css("card", ":host(.big) {}"), ":host(.big) {}");
    }

    #[test]
    fn test_scope_media_queries() {
        let css = "@media (max-width: 600px) { p { display: none; } }";
        assert_eq!(
            scope_css("card", css),
            "@media (max-width: 600px) { .card p { display: none; } }"
        );
    }

    #[test]
    fn test_scope_leaves_keyframes_alone() {
        let css = "@keyframes spin { from { opacity: 0; } to { opacity: 1; } }";
        assert_eq!(scope_css("card", css), css);
    }

    #[test]
    fn test_scope_after_import_statement() {
        let css = "@import url(base.css);\np { x: y; }";
        assert_eq!(scope_css("card", css), "@import url(base.css);\n.card p { x: y; }");
    }

    #[test]
    fn test_scope_skips_comments() {
        assert_eq!(
            scope_css("card", "/* header { } */ p { color: red; }"),
            "/* header { } */ .card p { color: red; }"
        );
        assert_eq!(
            scope_css("card", "p { /* } ; { */ color: red; }\n/* a, b */\nh1, h2 {}"),
            ".card p { /* } ; { */ color: red; }\n/* a, b */\n.card h1, .card h2 {}"
        );
    }

    #[test]
    fn test_scope_comment_after_statement() {
        let css = "@import url(base.css); /* base; reset */ p { x: y; }";
        assert_eq!(
            scope_css("card", css),
            "@import url(base.css); /* base; reset */ .card p { x: y; }"
        );
    }

    #[test]
    fn test_scope_unterminated_comment() {
        assert_eq!(scope_css("card", "p {} /* open {"), ".card p {} /* open {");
    }

    #[test]
    fn test_merge_external_then_inline() {
        let merged = merge_styles("UserCard.hpx", "p { color: blue; }", Some("p { color: red; }"));
        assert_eq!(merged, ".usercard p { color: red; }\n\np { color: blue; }");
    }

    #[test]
    fn test_merge_without_external() {
        assert_eq!(merge_styles("UserCard.hpx", "p {}", None), "p {}");
        assert_eq!(merge_styles("UserCard.hpx", "p {}", Some("")), "p {}");
        assert_eq!(merge_styles("UserCard.hpx", "", None), "");
    }
}

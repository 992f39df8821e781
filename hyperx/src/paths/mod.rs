//! URL and path joining for component locations
//!
//! Component directories may be plain paths (`./components`) or absolute
//! URLs (`https://cdn.example.com/ui`). [`PathResolver::join`] joins segments
//! of either kind with single slashes while keeping a scheme's `//` intact.

use once_cell::sync::Lazy;
use regex::Regex;

static SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^[a-z][a-z0-9+.-]*://").expect("Invalid regex"));

static DOUBLE_SLASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^:])/{2,}").expect("Invalid regex"));

/// Joins path and URL segments
#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver;

impl PathResolver {
    /// Join segments with single slashes
    ///
    /// Empty, `.` and `./` segments are dropped. Leading and trailing slashes
    /// are stripped from every segment, except that a `scheme://` prefix on
    /// the first segment is preserved.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hyperx::paths::PathResolver;
    ///
    /// assert_eq!(
    ///     PathResolver::join(["https://example.com/", "/components/", "card.hpx"]),
    ///     "https://example.com/components/card.hpx"
    /// );
    /// assert_eq!(PathResolver::join(["./", "ui", "", "card.css"]), "ui/card.css");
    /// ```
    #[must_use]
    pub fn join<I, S>(segments: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parts: Vec<String> = Vec::new();

        for segment in segments {
            let segment = segment.as_ref();
            if segment.is_empty() || segment == "." || segment == "./" {
                continue;
            }

            let part = if parts.is_empty() {
                SCHEME.find(segment).map_or_else(
                    || segment.trim_matches('/').to_string(),
                    |scheme| {
                        let rest = segment[scheme.end()..].trim_matches('/');
                        format!("{}{rest}", scheme.as_str())
                    },
                )
            } else {
                segment.trim_matches('/').to_string()
            };

            if !part.is_empty() {
                parts.push(part);
            }
        }

        DOUBLE_SLASH.replace_all(&parts.join("/"), "$1/").into_owned()
    }

    /// Parent of a slash-separated path (`a/b/c` -> `a/b`)
    ///
    /// Returns the input unchanged when there is no slash to cut at, and an
    /// empty string for a single root-level segment (`/app`).
    #[must_use]
    pub fn parent(path: &str) -> &str {
        let trimmed = path.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(0) => "",
            Some(idx) if !trimmed[..idx].ends_with('/') => &trimmed[..idx],
            _ => trimmed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_join_simple_segments() {
        assert_eq!(PathResolver::join(["components", "card.hpx"]), "components/card.hpx");
    }

    #[test]
    fn test_join_skips_empty_and_dot_segments() {
        assert_eq!(PathResolver::join(["", ".", "./", "a", "b"]), "a/b");
        assert_eq!(PathResolver::join(Vec::<String>::new()), "");
    }

    #[test]
    fn test_join_strips_slashes() {
        assert_eq!(PathResolver::join(["/a/", "//b//", "c/"]), "a/b/c");
    }

    #[test]
    fn test_join_preserves_scheme() {
        assert_eq!(
            PathResolver::join(["http://localhost:3000/", "components"]),
            "http://localhost:3000/components"
        );
        assert_eq!(
            PathResolver::join(["HTTPS://Example.com", "/x/y"]),
            "HTTPS://Example.com/x/y"
        );
    }

    #[test]
    fn test_join_collapses_inner_double_slashes() {
        assert_eq!(PathResolver::join(["https://a.com", "b//c", "d"]), "https://a.com/b/c/d");
    }

    #[test]
    fn test_parent() {
        assert_eq!(PathResolver::parent("https://a.com/app/pages"), "https://a.com/app");
        assert_eq!(PathResolver::parent("a/b/"), "a");
        assert_eq!(PathResolver::parent("https://a.com"), "https://a.com");
        assert_eq!(PathResolver::parent("single"), "single");
        assert_eq!(PathResolver::parent("/app"), "");
    }

    proptest! {
        #[test]
        fn prop_join_never_has_double_slash_outside_scheme(
            segments in proptest::collection::vec("[a-z/.]{0,8}", 0..6)
        ) {
            let joined = PathResolver::join(&segments);
            prop_assert!(!joined.contains("//"));
            prop_assert!(!joined.starts_with('/'));
            prop_assert!(!joined.ends_with('/'));
        }
    }
}

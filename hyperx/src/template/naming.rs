//! Component naming rules
//!
//! Custom element tags must be kebab-case and contain at least one hyphen.
//! Component files may be named in camel, Pascal or kebab case; the tag is
//! derived from the file stem.

/// Check whether `name` is a valid component (custom element) name
///
/// A valid name matches `[a-z][a-z0-9-]*`, contains a hyphen, does not end
/// with a hyphen and has no consecutive hyphens.
///
/// # Examples
///
/// ```rust
/// use hyperx::template::is_valid_component_name;
///
/// assert!(is_valid_component_name("user-card"));
/// assert!(!is_valid_component_name("card"));
/// assert!(!is_valid_component_name("user--card"));
/// ```
#[must_use]
pub fn is_valid_component_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    first.is_ascii_lowercase()
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && name.contains('-')
        && !name.ends_with('-')
        && !name.contains("--")
}

/// Strip directories and the final extension from a file name
///
/// Both `/` and `\` are treated as separators.
#[must_use]
pub fn file_stem(filename: &str) -> &str {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    }
}

/// Derive a component name from a file name
///
/// `components/UserCard.hpx` becomes `user-card`. Underscores and spaces act
/// as word separators. Returns an empty string when the stem cannot be
/// turned into a valid component name (for example `Card.hpx`, which has no
/// word boundary to hyphenate).
///
/// # Examples
///
/// ```rust
/// use hyperx::template::filename_to_component_name;
///
/// assert_eq!(filename_to_component_name("UserCard.hpx"), "user-card");
/// assert_eq!(filename_to_component_name("ui/HTMLButton.hpx"), "html-button");
/// assert_eq!(filename_to_component_name("Card.hpx"), "");
/// ```
#[must_use]
pub fn filename_to_component_name(filename: &str) -> String {
    let name = to_kebab_case(file_stem(filename));
    if is_valid_component_name(&name) {
        name
    } else {
        String::new()
    }
}

fn to_kebab_case(stem: &str) -> String {
    let chars: Vec<char> = stem.chars().collect();
    let mut out = String::with_capacity(stem.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == ' ' || c == '-' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            continue;
        }

        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && !out.ends_with('-') {
                out.push('-');
            }
        }

        out.extend(c.to_lowercase());
    }

    out.trim_end_matches('-').to_string()
}

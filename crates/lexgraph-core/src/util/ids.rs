//! ID helpers.

/// Normalize an entity ID for map lookups.
///
/// Case-insensitive maps fold IDs to lowercase on both write and read.
pub fn normalize_id(id: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        id.to_string()
    } else {
        id.to_lowercase()
    }
}

/// Turn an arbitrary identifier into a safe file stem.
///
/// Keeps ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
pub fn file_stem(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

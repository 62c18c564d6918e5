//! Vault-relative path normalization.

/// Normalize a file or directory path relative to the vault root.
///
/// Turns backslashes into forward slashes, trims surrounding whitespace and
/// slashes, and collapses runs of slashes. Normalizing an already normalized
/// path returns it unchanged.
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let unified = unified.trim_matches(|c: char| c == '/' || c.is_whitespace());

    let mut normalized = String::with_capacity(unified.len());
    for c in unified.chars() {
        if c == '/' && normalized.ends_with('/') {
            continue;
        }
        normalized.push(c);
    }

    normalized
}

/// Percent-encode each `/`-separated segment for use in a request URL.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment))
        .collect::<Vec<_>>()
        .join("/")
}

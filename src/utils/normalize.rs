//! Normalization of submitted form values.

/// Split the comma-separated `paperKeywords` field, dropping blank entries.
///
/// # Examples
///
/// ```
/// use paperdesk::utils::split_keywords;
///
/// assert_eq!(split_keywords("ai, ml,,  vision "), vec!["ai", "ml", "vision"]);
/// ```
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

/// Reduce an uploaded file name to a safe single path component.
///
/// Directory parts are dropped and anything outside `[A-Za-z0-9._-]` becomes
/// `_`. An empty result falls back to `paper`.
///
/// # Examples
///
/// ```
/// use paperdesk::utils::sanitize_file_name;
///
/// assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
/// assert_eq!(sanitize_file_name("My Paper (v2).pdf"), "My_Paper__v2_.pdf");
/// assert_eq!(sanitize_file_name(""), "paper");
/// ```
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "paper".to_string()
    } else {
        trimmed.to_string()
    }
}

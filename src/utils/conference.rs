/// Conference acronym and paper ID utilities
///
/// Paper IDs are scoped by conference acronym in the format: {ACRONYM}-{NUMBER}
/// Examples: ABC-1, ICML2026-42, NEURO-SYM-7

/// Longest accepted acronym
const MAX_ACRONYM_LEN: usize = 32;

/// Check that an acronym can namespace paper IDs and storage folders
///
/// # Examples
/// ```
/// use paperdesk::utils::is_valid_acronym;
///
/// assert!(is_valid_acronym("ABC"));
/// assert!(is_valid_acronym("ICML2026"));
/// assert!(is_valid_acronym("NEURO-SYM"));
/// assert!(!is_valid_acronym(""));
/// assert!(!is_valid_acronym("ABC/2026"));
/// assert!(!is_valid_acronym("-ABC"));
/// ```
pub fn is_valid_acronym(acronym: &str) -> bool {
    !acronym.is_empty()
        && acronym.len() <= MAX_ACRONYM_LEN
        && !acronym.starts_with('-')
        && !acronym.ends_with('-')
        && acronym
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Generate a paper ID from an acronym and a sequence number
///
/// # Examples
/// ```
/// use paperdesk::utils::make_paper_id;
///
/// assert_eq!(make_paper_id("ABC", 1), "ABC-1");
/// assert_eq!(make_paper_id("NEURO-SYM", 12), "NEURO-SYM-12");
/// ```
pub fn make_paper_id(acronym: &str, number: i64) -> String {
    format!("{}-{}", acronym, number)
}

/// Numeric suffix of a paper ID: the segment after the last `-`
///
/// # Examples
/// ```
/// use paperdesk::utils::paper_number;
///
/// assert_eq!(paper_number("ABC-12"), Some(12));
/// assert_eq!(paper_number("NEURO-SYM-7"), Some(7));
/// assert_eq!(paper_number("ABC-x"), None);
/// ```
pub fn paper_number(paper_id: &str) -> Option<u64> {
    let (_, suffix) = paper_id.rsplit_once('-')?;
    suffix.parse().ok()
}

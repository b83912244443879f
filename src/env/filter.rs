//! Name filters for features and assessments

use regex::Regex;

/// Whether `name` passes `pattern`; no pattern lets everything through
///
/// The match is unanchored, so `pods` selects `create pods` as well.
pub fn matches(pattern: Option<&Regex>, name: &str) -> bool {
    pattern.map_or(true, |re| re.is_match(name))
}

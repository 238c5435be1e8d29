//! Numeric text normalization.
//!
//! Counts in rendered report documents arrive as locale-formatted strings
//! ("1,234", "12 345") and occasionally with stray markup remnants around
//! them. Every count read from rendered text goes through [`parse_count`] so
//! that all spellings of the same number normalize identically.

/// Parse a locale-formatted numeric string into an integer.
///
/// Strips everything except ASCII digits and minus signs before parsing.
/// Empty or all-non-digit input yields `None` rather than an error or zero;
/// a minus sign anywhere but the front fails the final parse and also yields
/// `None`.
pub fn parse_count(raw: &str) -> Option<i64> {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();

    if digits.is_empty() {
        return None;
    }

    digits.parse::<i64>().ok()
}

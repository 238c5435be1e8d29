//! Timestamp parsing for persisted snapshot records.
//!
//! Metadata written by different tool versions spells timestamps
//! differently: a `Z` suffix, an explicit offset, or no zone at all. All of
//! them are accepted; naive values are taken as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Naive datetime shapes older metadata records have carried.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

/// Parse a timestamp string recorded in snapshot metadata.
///
/// A value matching none of the known shapes is a parse miss, not an error:
/// the caller falls back to filesystem timestamps instead.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();

    let rfc3339 = match trimmed.strip_suffix('Z') {
        Some(rest) => format!("{rest}+00:00"),
        None => trimmed.to_string(),
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&rfc3339) {
        return Some(parsed.with_timezone(&Utc));
    }

    NAIVE_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(trimmed, format)
            .ok()
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_z_suffix_and_offset_agree() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-01T12:00:00.000Z"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-03-01T12:00:00.000+00:00"),
            Some(expected)
        );
    }

    #[test]
    fn test_nonzero_offset_converts_to_utc() {
        assert_eq!(
            parse_timestamp("2024-03-01T14:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_naive_is_taken_as_utc() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-01T12:00:00.000"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01 12:00:00"), Some(expected));
    }

    #[test]
    fn test_unparseable_is_a_miss() {
        assert_eq!(parse_timestamp("not a timestamp"), None);
        assert_eq!(parse_timestamp(""), None);
    }
}

//! Row validation and best-effort numeric repair.
//!
//! Data rows arrive over a lossy serial link, so the tail of a line is often
//! garbled: truncated fields, stray bytes glued onto the last number, or
//! unrelated log output appended mid-row. Strict validation accepts only a
//! clean row; salvage recovers the common "valid prefix + corrupted tail"
//! case by clipping the last field back to its leading numeric token.

use regex::Regex;
use std::sync::LazyLock;

/// Longest leading numeric token of a corrupted trailing field
static RE_LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+(\.\d+)?").expect("Failed to compile regex"));

/// Producer-declared row count, e.g. "--- total 120 samples ---"
static RE_TOTAL_SAMPLES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)total\s+(\d+)\s+samples").expect("Failed to compile regex"));

/// Check whether a line is a clean numeric CSV row with the expected column
/// count.
pub fn is_data_row(line: &str, ncols: usize) -> bool {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() != ncols {
        return false;
    }
    parts.iter().all(|p| p.trim().parse::<f64>().is_ok())
}

/// Try to repair a corrupted row.
///
/// Requires at least `ncols` fields; anything past the first `ncols` is
/// discarded as corruption residue. The last kept field is clipped to its
/// leading numeric token. Returns the repaired comma-joined row, or `None`
/// if the line is unrecoverable.
pub fn try_salvage(line: &str, ncols: usize) -> Option<String> {
    let mut parts: Vec<&str> = line.split(',').collect();
    if parts.len() < ncols {
        return None;
    }
    parts.truncate(ncols);

    let last = parts[ncols - 1];
    let token = RE_LEADING_NUMBER.find(last)?;
    parts[ncols - 1] = token.as_str();

    if parts.iter().all(|p| p.trim().parse::<f64>().is_ok()) {
        Some(parts.join(","))
    } else {
        None
    }
}

/// Extract a producer-declared sample count from a line, if present.
pub fn find_sample_count(line: &str) -> Option<usize> {
    let captures = RE_TOTAL_SAMPLES.captures(line)?;
    captures.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_data_row_accepts_clean_rows() {
        assert!(is_data_row("0.0,20,1.2", 3));
        assert!(is_data_row("-1.5,+2,3.75", 3));
    }

    #[test]
    fn test_is_data_row_rejects_wrong_count_and_garbage() {
        assert!(!is_data_row("0.0,20", 3));
        assert!(!is_data_row("0.0,20,1.2,9", 3));
        assert!(!is_data_row("0.0,20,abc", 3));
        assert!(!is_data_row("", 3));
    }

    #[test]
    fn test_salvage_clips_garbled_tail() {
        assert_eq!(
            try_salvage("1.0,2.0,12.34??GARBAGE", 3).as_deref(),
            Some("1.0,2.0,12.34")
        );
    }

    #[test]
    fn test_salvage_drops_extra_fields() {
        // Extra trailing fields are corruption residue
        assert_eq!(
            try_salvage("0.1,5,9.9junk,leftover,noise", 3).as_deref(),
            Some("0.1,5,9.9")
        );
    }

    #[test]
    fn test_salvage_fails_without_leading_number() {
        assert!(try_salvage("1.0,2.0,#@!#", 3).is_none());
    }

    #[test]
    fn test_salvage_fails_on_short_row() {
        assert!(try_salvage("1.0,2.0", 3).is_none());
    }

    #[test]
    fn test_salvage_fails_when_inner_field_is_bad() {
        assert!(try_salvage("1.0,junk,3.0trailing", 3).is_none());
    }

    #[test]
    fn test_find_sample_count() {
        assert_eq!(
            find_sample_count("--- test_turn complete, total 3 samples ---"),
            Some(3)
        );
        assert_eq!(find_sample_count("Total 120 Samples"), Some(120));
        assert_eq!(find_sample_count("total samples"), None);
        assert_eq!(find_sample_count("3 samples total"), None);
    }
}

//! Header row detection.

use std::sync::LazyLock;

use regex::Regex;

use super::{scan_records, split_fields};
use crate::column::normalize_header_names;

/// Minimum length of a typical column name.
const SHORT_NAME_LEN: usize = 3;

/// A single column name: letters, optionally followed by a digit.
static SINGLE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{L}[\p{L} _-]*\d?$").expect("Invalid single name pattern"));

/// Characters found in ordinary column names.
static IDENTIFIER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}\p{N} _\-.()/#%&]+$").expect("Invalid identifier pattern")
});

static NUMERIC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?\d+(?:[.,]\d+)?$").expect("Invalid numeric pattern"));

/// Decide whether the first data line after `skip_rows` lines holds column names.
pub fn guess_has_header(
    text: &str,
    delimiter: Option<char>,
    quote: Option<char>,
    comment_prefix: &str,
    skip_rows: usize,
) -> bool {
    let Some(first) = scan_records(text, quote, usize::MAX)
        .into_iter()
        .filter(|r| r.line >= skip_rows)
        .find(|r| !r.is_blank() && !r.is_comment(comment_prefix))
    else {
        return false;
    };
    let fields = split_fields(first.text, delimiter, quote);
    let accepted = is_header(&fields);
    log::debug!("header {} on line {}", if accepted { "found" } else { "not found" }, first.line + 1);
    accepted
}

fn is_header(fields: &[String]) -> bool {
    let count = fields.len();
    if count < 2 {
        return fields
            .first()
            .is_some_and(|f| SINGLE_NAME_PATTERN.is_match(f));
    }

    if normalize_header_names(fields).issues() * 2 > count {
        return false;
    }

    let short = fields
        .iter()
        .filter(|f| f.chars().count() < SHORT_NAME_LEN)
        .count();
    if short * 2 > count {
        return false;
    }

    let unusual = fields
        .iter()
        .filter(|f| NUMERIC_PATTERN.is_match(f) || !IDENTIFIER_PATTERN.is_match(f))
        .count();
    unusual * 2 < count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guess(text: &str) -> bool {
        guess_has_header(text, Some(','), Some('"'), "", 0)
    }

    #[test]
    fn test_typical_header() {
        assert!(guess("ID,Name\n1,Alice\n2,\"Bob, Jr.\"\n"));
        assert!(guess("first_name,last name,Amount (EUR)\nA,B,1\n"));
    }

    #[test]
    fn test_data_rows() {
        assert!(!guess("1,2,3\n4,5,6\n"));
        assert!(!guess("12.5,300,7,x\n"));
        assert!(!guess("a,b,c,d\n1,2,3,4\n"));
        assert!(!guess("alice@example.com,bob@example.com\n"));
    }

    #[test]
    fn test_bad_names() {
        assert!(!guess("name,,,\n1,2,3,4\n"));
        assert!(!guess("col,col,col\n1,2,3\n"));
    }

    #[test]
    fn test_single_column() {
        assert!(guess_has_header("Amount2\n1\n2\n", None, None, "", 0));
        assert!(!guess_has_header("42\n1\n", None, None, "", 0));
    }

    #[test]
    fn test_skip_rows_and_comments() {
        let text = "Report 2024\n# note\n\nregion,total\nnorth,1\n";
        assert!(guess_has_header(text, Some(','), Some('"'), "#", 1));
        assert!(!guess_has_header("", Some(','), None, "", 0));
    }
}

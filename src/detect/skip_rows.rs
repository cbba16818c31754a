//! Detection of preamble lines above the table.

use super::{scan_records, split_fields};

/// Records inspected.
pub const SKIP_ROWS_SCAN: usize = 50;

/// Fewer data records than this never lead to skipped rows.
const MIN_ROWS: usize = 5;

/// Allowed relative deviation from the average field count.
const TOLERANCE: f64 = 0.1;

/// Number of physical lines before the table starts.
///
/// The field count of the trailing records is taken as the table width.
/// Scanning backwards, the first record that does not fit it ends the
/// preamble.
pub fn guess_skip_rows(text: &str, delimiter: Option<char>, quote: Option<char>, comment_prefix: &str) -> usize {
    let rows: Vec<(usize, usize)> = scan_records(text, quote, SKIP_ROWS_SCAN)
        .iter()
        .filter(|r| !r.is_blank() && !r.is_comment(comment_prefix))
        .map(|r| (r.line, split_fields(r.text, delimiter, quote).len()))
        .collect();
    if rows.len() < MIN_ROWS {
        return 0;
    }

    let mut counts: Vec<usize> = rows.iter().map(|&(_, c)| c).collect();
    // a record with a lost line break holds two records' fields
    for idx in 1..counts.len() - 1 {
        if counts[idx] == 2 * counts[idx - 1] && counts[idx] == 2 * counts[idx + 1] {
            counts[idx] = counts[idx - 1];
        }
    }

    let trailing = &counts[counts.len() / 2..];
    let average = trailing.iter().sum::<usize>() as f64 / trailing.len() as f64;
    let fits = |count: usize| (count as f64 - average).abs() <= average * TOLERANCE;

    let start = match counts.iter().rposition(|&c| !fits(c)) {
        None => 0,
        Some(idx) => idx + 1,
    };
    let skip = if start == 0 || start >= rows.len() {
        0
    } else {
        rows[start].0
    };
    log::debug!("skip rows {skip} (average width {average:.1} over {} records)", rows.len());
    skip
}

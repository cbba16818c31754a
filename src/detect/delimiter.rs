//! Delimiter guessing by per-row occurrence statistics.

use super::scan_records;

/// Candidate delimiters, in order of preference on ties.
///
/// Colon is left out since it shows up in every time value.
pub const DELIMITERS: [char; 6] = [',', ';', '\t', '|', '^', '~'];

/// Rows inspected.
pub const DELIMITER_ROWS: usize = 300;

/// Per-row counts above this are clipped.
const ROW_COUNT_CLIP: usize = 100;

/// Share of rows a delimiter has to occur in.
const MIN_COVERAGE: f64 = 0.75;

const EPSILON: f64 = 1e-9;

/// Occurrences of every candidate in every row.
#[derive(Debug, Clone)]
pub struct DelimiterCounter {
    candidates: Vec<char>,
    /// One count per candidate for each row.
    rows: Vec<Vec<usize>>,
}

impl DelimiterCounter {
    pub fn new(candidates: &[char]) -> Self {
        Self {
            candidates: candidates.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Count candidates outside of quotes in one record.
    pub fn count_row(&mut self, record: &str, quote: Option<char>) {
        let mut counts = vec![0; self.candidates.len()];
        let mut in_quotes = false;
        for ch in record.chars() {
            if Some(ch) == quote {
                in_quotes = !in_quotes;
            } else if !in_quotes {
                if let Some(idx) = self.candidates.iter().position(|&c| c == ch) {
                    counts[idx] += 1;
                }
            }
        }
        self.rows.push(counts);
    }

    /// Share of rows containing candidate `idx`.
    fn coverage(&self, idx: usize) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        let present = self.rows.iter().filter(|r| r[idx] > 0).count();
        present as f64 / self.rows.len() as f64
    }

    fn total(&self, idx: usize) -> usize {
        self.rows.iter().map(|r| r[idx]).sum()
    }

    /// Mean and variance of the clipped per-row counts.
    fn stats(&self, idx: usize) -> (f64, f64) {
        let n = self.rows.len() as f64;
        let counts = self.rows.iter().map(|r| r[idx].min(ROW_COUNT_CLIP) as f64);
        let mean = counts.clone().sum::<f64>() / n;
        let variance = counts.map(|c| (c - mean) * (c - mean)).sum::<f64>() / n;
        (mean, variance)
    }

    /// The winning candidate, or `None` if no candidate occurs at all.
    ///
    /// Candidates present in at least 75 % of the rows compete on the lowest
    /// variance, then the highest mean. Without such a candidate the highest
    /// total count wins.
    pub fn best(&self) -> Option<char> {
        let mut best: Option<(usize, f64, f64)> = None;
        for idx in 0..self.candidates.len() {
            if self.coverage(idx) < MIN_COVERAGE {
                continue;
            }
            let (mean, variance) = self.stats(idx);
            let better = match best {
                None => true,
                Some((_, best_mean, best_variance)) => {
                    variance < best_variance - EPSILON
                        || ((variance - best_variance).abs() <= EPSILON && mean > best_mean + EPSILON)
                }
            };
            if better {
                best = Some((idx, mean, variance));
            }
        }
        if let Some((idx, mean, variance)) = best {
            log::debug!(
                "delimiter {:?}: mean {mean:.2}, variance {variance:.2} over {} rows",
                self.candidates[idx],
                self.rows.len()
            );
            return Some(self.candidates[idx]);
        }

        let (idx, total) = (0..self.candidates.len())
            .map(|idx| (idx, self.total(idx)))
            .fold((0, 0), |acc, cur| if cur.1 > acc.1 { cur } else { acc });
        if total == 0 {
            log::debug!("no delimiter found in {} rows", self.rows.len());
            return None;
        }
        log::debug!(
            "delimiter {:?} by total count {total}, no candidate covers enough rows",
            self.candidates[idx]
        );
        Some(self.candidates[idx])
    }
}

/// Guess the delimiter; `None` means the text is not delimited.
pub fn guess_delimiter(text: &str, quote: Option<char>, comment_prefix: &str) -> Option<char> {
    let mut counter = DelimiterCounter::new(&DELIMITERS);
    for record in scan_records(text, quote, DELIMITER_ROWS * 2)
        .iter()
        .filter(|r| !r.is_blank() && !r.is_comment(comment_prefix))
        .take(DELIMITER_ROWS)
    {
        counter.count_row(record.text, quote);
    }
    counter.best()
}

//! Repair of rows that have more fields than the header.
//!
//! Good rows teach the realigner what kind of value every column holds. An
//! overflowing row is then repaired by joining adjacent fields back together
//! in a text column, one pair per pass, as long as exactly one join fits the
//! learned profile best.

/// Rows with more surplus fields than this are never realigned.
pub const MAX_EXCESS: usize = 4;

/// Rows taken into account when learning column profiles.
pub const MAX_LEARNED_ROWS: usize = 250;

const EPSILON: f64 = 1e-9;

/// Coarse classification of a raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Empty,
    Integer,
    Decimal,
    DateLike,
    Text,
}

impl ValueKind {
    const COUNT: usize = 5;

    fn index(self) -> usize {
        self as usize
    }

    pub fn of(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() {
            return ValueKind::Empty;
        }
        let body = value.strip_prefix(['-', '+']).unwrap_or(value);
        if !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit()) {
            return ValueKind::Integer;
        }
        let mut digits = 0;
        let mut points = 0;
        let mut date_marks = 0;
        for ch in body.chars() {
            match ch {
                '0'..='9' => digits += 1,
                '.' | ',' => points += 1,
                '/' | '-' | ':' | ' ' | 'T' => date_marks += 1,
                _ => return ValueKind::Text,
            }
        }
        if digits == 0 {
            ValueKind::Text
        } else if date_marks > 0 {
            ValueKind::DateLike
        } else if points > 0 {
            ValueKind::Decimal
        } else {
            ValueKind::Text
        }
    }
}

/// Per column counts of [`ValueKind`]s seen in well formed rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRealigner {
    expected: usize,
    counts: Vec<[usize; ValueKind::COUNT]>,
    rows_learned: usize,
}

impl ColumnRealigner {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            counts: vec![[0; ValueKind::COUNT]; expected],
            rows_learned: 0,
        }
    }

    pub fn rows_learned(&self) -> usize {
        self.rows_learned
    }

    /// Learn from a row; rows of the wrong width are ignored.
    pub fn learn<S: AsRef<str>>(&mut self, fields: &[S]) {
        if fields.len() != self.expected || self.rows_learned >= MAX_LEARNED_ROWS {
            return;
        }
        for (column, value) in fields.iter().enumerate() {
            self.counts[column][ValueKind::of(value.as_ref()).index()] += 1;
        }
        self.rows_learned += 1;
    }

    /// Join surplus fields back into text columns.
    ///
    /// Returns the repaired row, or the untouched row when no unique best join
    /// exists at some pass.
    pub fn realign(&self, fields: Vec<String>, delimiter: char) -> Result<Vec<String>, Vec<String>> {
        match self.joins(&fields, delimiter) {
            Some(joins) => Ok(joins
                .into_iter()
                .fold(fields, |row, idx| join_at(&row, idx, delimiter))),
            None => Err(fields),
        }
    }

    /// The joins that repair an overflowing row, in the order they apply.
    ///
    /// Each entry is the index of the left field of one join, counted on the
    /// row as it is after the earlier joins. `None` when the row cannot be
    /// repaired.
    pub fn joins(&self, fields: &[String], delimiter: char) -> Option<Vec<usize>> {
        if fields.len() <= self.expected {
            return Some(Vec::new());
        }
        let excess = fields.len() - self.expected;
        if excess > MAX_EXCESS || self.rows_learned == 0 {
            return None;
        }

        let mut row = fields.to_vec();
        let mut joins = Vec::with_capacity(excess);
        for pass in 0..excess {
            let mut best: Option<(usize, f64)> = None;
            let mut tie = false;
            for idx in 0..self.expected.min(row.len() - 1) {
                if !self.is_text_column(idx) {
                    continue;
                }
                let candidate = join_at(&row, idx, delimiter);
                let score = self.score(&candidate);
                match best {
                    Some((_, top)) if (score - top).abs() < EPSILON => tie = true,
                    Some((_, top)) if score < top => {}
                    _ => {
                        best = Some((idx, score));
                        tie = false;
                    }
                }
            }
            match best {
                Some((idx, score)) if !tie => {
                    log::trace!("realign pass {pass}: joined fields {idx} and {} (score {score:.3})", idx + 1);
                    row = join_at(&row, idx, delimiter);
                    joins.push(idx);
                }
                _ => {
                    log::trace!("realign pass {pass}: no unique join, row left as read");
                    return None;
                }
            }
        }
        Some(joins)
    }

    fn probability(&self, column: usize, kind: ValueKind) -> f64 {
        let counts = &self.counts[column];
        let total: usize = counts.iter().sum();
        if total == 0 {
            return 0.0;
        }
        counts[kind.index()] as f64 / total as f64
    }

    /// Text is the most frequent non-empty kind of this column.
    fn is_text_column(&self, column: usize) -> bool {
        let counts = &self.counts[column];
        let text = counts[ValueKind::Text.index()];
        text > 0
            && [ValueKind::Integer, ValueKind::Decimal, ValueKind::DateLike]
                .iter()
                .all(|k| counts[k.index()] <= text)
    }

    fn score(&self, row: &[String]) -> f64 {
        row.iter()
            .take(self.expected)
            .enumerate()
            .map(|(column, value)| self.probability(column, ValueKind::of(value)))
            .sum()
    }
}

fn join_at(row: &[String], idx: usize, delimiter: char) -> Vec<String> {
    let mut joined = Vec::with_capacity(row.len() - 1);
    joined.extend_from_slice(&row[..idx]);
    joined.push(format!("{}{delimiter}{}", row[idx], row[idx + 1]));
    joined.extend_from_slice(&row[idx + 2..]);
    joined
}

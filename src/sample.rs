//! Sampling: how much of the file the dialect guessers see, and the
//! per column value samples handed to type inference.

use std::io::{Read, Seek};

use foldhash::{HashMap, HashMapExt, HashSet, HashSetExt};

use crate::error::Result;
use crate::options::is_null_literal;
use crate::reader::CsvReader;

/// Samples longer than this are truncated before deduplication.
pub const MAX_SAMPLE_LEN: usize = 40;

/// Distinct values kept per column unless more are wanted.
pub const SAMPLE_CAP: usize = 2000;

/// Size of the prefix inspected by the dialect guessers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSize {
    /// The first lines of the file.
    Records(usize),
    /// The first bytes of the file.
    Bytes(usize),
    /// Read the entire file.
    ///
    /// # Warning
    ///
    /// This loads the entire file into memory. For large files (e.g., >100 MB), prefer
    /// [`SampleSize::Bytes`] with a reasonable limit to avoid excessive memory usage.
    All,
}

impl Default for SampleSize {
    fn default() -> Self {
        SampleSize::Bytes(256 * 1024)
    }
}

impl SampleSize {
    /// Returns the number of records to sample, or None for other modes.
    pub fn records(&self) -> Option<usize> {
        match self {
            SampleSize::Records(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the number of bytes to sample, or None for other modes.
    pub fn bytes(&self) -> Option<usize> {
        match self {
            SampleSize::Bytes(n) => Some(*n),
            _ => None,
        }
    }
}

/// Date format preference for ambiguous date parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePreference {
    /// Day-Month-Year format (e.g., 31/12/2023).
    DmyFormat,
    /// Month-Day-Year format (e.g., 12/31/2023).
    #[default]
    MdyFormat,
}

impl DatePreference {
    /// Returns true if day comes before month in ambiguous dates.
    pub fn is_dmy(&self) -> bool {
        matches!(self, DatePreference::DmyFormat)
    }
}

/// Distinct values collected for one column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleResult {
    /// In order of first appearance.
    pub values: Vec<String>,
    /// Records read while collecting, including rejected ones.
    pub records_read: u64,
}

struct ColumnSamples {
    values: Vec<String>,
    seen: HashSet<String>,
}

impl ColumnSamples {
    fn insert(&mut self, value: String, cap: usize) {
        if self.values.len() >= cap {
            return;
        }
        if self.seen.insert(value.to_lowercase()) {
            self.values.push(value);
        }
    }
}

/// Collect distinct raw values for `columns`, starting at the reader's current record.
///
/// When the end of the file is reached, reading continues from the first
/// data row until the starting record comes around again, so every record
/// is looked at once at most. Rows that raised a warning are skipped
/// entirely, as are null literals.
pub fn collect<R: Read + Seek>(
    reader: &mut CsvReader<R>,
    columns: &[usize],
    max_records: u64,
    samples_wanted: usize,
    treat_as_null: &[String],
) -> Result<HashMap<usize, SampleResult>> {
    let cap = SAMPLE_CAP.max(samples_wanted);
    let mut samples: Vec<ColumnSamples> = columns
        .iter()
        .map(|_| ColumnSamples {
            values: Vec::new(),
            seen: HashSet::new(),
        })
        .collect();

    let start = reader.record_number();
    let mut wrapped = false;
    let mut read = 0u64;
    let mut rejected = 0u64;

    while read < max_records {
        let Some(row) = reader.read_record()? else {
            if wrapped || start == 0 {
                break;
            }
            log::debug!("sampling wrapped around after record {}", reader.record_number());
            reader.reset_to_first_data_row()?;
            wrapped = true;
            continue;
        };
        if wrapped && row.record_number > start {
            break;
        }
        read += 1;
        if !row.warnings.is_empty() {
            rejected += 1;
            continue;
        }

        for (column, target) in columns.iter().zip(samples.iter_mut()) {
            let Some(raw) = row.fields.get(*column) else {
                continue;
            };
            let value = raw.trim();
            if is_null_literal(value, treat_as_null) {
                continue;
            }
            let value: String = value.chars().take(MAX_SAMPLE_LEN).collect();
            target.insert(value, cap);
        }

        if samples.iter().all(|s| s.values.len() >= samples_wanted) {
            break;
        }
    }

    log::debug!("sampled {read} records, {rejected} skipped for warnings");
    let mut results = HashMap::with_capacity(columns.len());
    for (column, target) in columns.iter().zip(samples) {
        results.insert(
            *column,
            SampleResult {
                values: target.values,
                records_read: read,
            },
        );
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Dialect;
    use crate::options::ReadOptions;
    use std::io::Cursor;

    fn reader(text: &str) -> CsvReader<Cursor<Vec<u8>>> {
        CsvReader::open(
            Cursor::new(text.as_bytes().to_vec()),
            &Dialect::default(),
            &ReadOptions::default(),
        )
        .unwrap()
    }

    fn nulls() -> Vec<String> {
        vec!["NULL".to_string()]
    }

    #[test]
    fn test_sample_size_default() {
        assert_eq!(SampleSize::default().bytes(), Some(256 * 1024));
        assert_eq!(SampleSize::Records(5).records(), Some(5));
        assert_eq!(SampleSize::All.records(), None);
    }

    #[test]
    fn test_dedup_and_nulls() {
        let mut reader = reader("a,b\nx,1\nX,2\nNULL,3\n , 4\ny,1\n");
        let samples = collect(&mut reader, &[0, 1], 100, 10, &nulls()).unwrap();
        assert_eq!(samples[&0].values, vec!["x", "y"]);
        assert_eq!(samples[&1].values, vec!["1", "2", "3", "4"]);
        assert_eq!(samples[&1].records_read, 5);
    }

    #[test]
    fn test_rows_with_warnings_are_skipped() {
        let mut reader = reader("a,b\n1,2\n3\n4,5\n");
        let samples = collect(&mut reader, &[0], 100, 10, &nulls()).unwrap();
        assert_eq!(samples[&0].values, vec!["1", "4"]);
    }

    #[test]
    fn test_truncation() {
        let long = "z".repeat(60);
        let mut reader = reader(&format!("a\n{long}\n"));
        let samples = collect(&mut reader, &[0], 100, 10, &nulls()).unwrap();
        assert_eq!(samples[&0].values[0].len(), MAX_SAMPLE_LEN);
    }

    #[test]
    fn test_wrap_around_visits_every_record_once() {
        let mut reader = reader("v\n1\n2\n3\n4\n");
        reader.read_record().unwrap();
        reader.read_record().unwrap();
        let samples = collect(&mut reader, &[0], 100, 10, &nulls()).unwrap();
        assert_eq!(samples[&0].values, vec!["3", "4", "1", "2"]);
        assert_eq!(samples[&0].records_read, 4);
    }

    #[test]
    fn test_stops_when_enough_samples() {
        let mut reader = reader("v\n1\n2\n3\n4\n");
        let samples = collect(&mut reader, &[0], 100, 2, &nulls()).unwrap();
        assert_eq!(samples[&0].values, vec!["1", "2"]);
        assert_eq!(reader.record_number(), 2);
    }
}

//! Column definitions and header name normalization.

use foldhash::{HashSet, HashSetExt};

use crate::error::{Result, ScoutError};
use crate::field_type::{DataType, ValueFormat};

/// Header names longer than this are truncated.
pub const MAX_HEADER_LEN: usize = 128;

/// One column of a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    /// Zero-based position in the file.
    pub ordinal: usize,
    pub format: ValueFormat,
    /// Ignored columns are read but not converted.
    pub ignore: bool,
    /// Name of the column holding the time for this date column.
    pub time_part: Option<String>,
    pub time_part_format: String,
    /// Name of the column holding a time zone for this date column.
    pub time_zone_part: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, ordinal: usize, format: ValueFormat) -> Self {
        Self {
            name: name.into(),
            ordinal,
            format,
            ignore: false,
            time_part: None,
            time_part_format: "HH:mm:ss".to_string(),
            time_zone_part: None,
        }
    }
}

/// Ordered set of uniquely named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSchema {
    columns: Vec<Column>,
}

impl ColumnSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Case-insensitive lookup by name.
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Column at the given zero-based position in the file.
    pub fn by_ordinal(&self, ordinal: usize) -> Option<&Column> {
        self.columns.iter().find(|c| c.ordinal == ordinal)
    }

    /// Add a column, renaming it with a counter if the name is taken.
    ///
    /// Returns the name the column was stored under.
    pub fn add(&mut self, mut column: Column) -> String {
        column.name = self.unique_name(&column.name);
        let name = column.name.clone();
        self.columns.push(column);
        name
    }

    /// Add a column, or upgrade the format of an existing one with the same name.
    ///
    /// An existing format is only replaced by a more specific one, and caller
    /// settings such as `ignore` or the time part references are kept.
    pub fn add_or_upgrade(&mut self, column: Column) {
        match self.get_mut(&column.name) {
            Some(existing) => {
                if column.format.data_type.specificity() > existing.format.data_type.specificity() {
                    existing.format = column.format;
                }
            }
            None => {
                self.add(column);
            }
        }
    }

    /// Check the time part references.
    ///
    /// At most one date column may name a time part, and that name has to
    /// resolve to another column of this schema.
    pub fn validate(&self) -> Result<()> {
        let linked: Vec<&Column> = self
            .columns
            .iter()
            .filter(|c| c.time_part.is_some())
            .collect();
        if linked.len() > 1 {
            return Err(ScoutError::InvalidConfig(format!(
                "{} columns declare a time part, only one is allowed",
                linked.len()
            )));
        }
        for column in linked {
            if column.format.data_type != DataType::DateTime {
                return Err(ScoutError::InvalidConfig(format!(
                    "column '{}' declares a time part but is not a DateTime",
                    column.name
                )));
            }
            let Some(part) = column.time_part.as_deref() else {
                continue;
            };
            match self.get(part) {
                Some(target) if !target.name.eq_ignore_ascii_case(&column.name) => {}
                _ => {
                    return Err(ScoutError::InvalidConfig(format!(
                        "time part '{part}' of column '{}' does not resolve to another column",
                        column.name
                    )));
                }
            }
        }
        Ok(())
    }

    fn unique_name(&self, wanted: &str) -> String {
        if self.get(wanted).is_none() {
            return wanted.to_string();
        }
        let mut counter = 2;
        loop {
            let candidate = format!("{wanted}{counter}");
            if self.get(&candidate).is_none() {
                return candidate;
            }
            counter += 1;
        }
    }
}

impl<'a> IntoIterator for &'a ColumnSchema {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

/// Normalized header names plus the number of entries that needed fixing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderNames {
    pub names: Vec<String>,
    pub empty: usize,
    pub duplicate: usize,
    pub overlong: usize,
}

impl HeaderNames {
    /// Number of raw names that were empty, duplicated or too long.
    pub fn issues(&self) -> usize {
        self.empty + self.duplicate + self.overlong
    }
}

/// Trim raw header values and make them usable as unique column names.
///
/// Empty names become `Column<n>`, names over [`MAX_HEADER_LEN`] characters
/// are cut, and repeated names get a counter appended.
pub fn normalize_header_names<S: AsRef<str>>(raw: &[S]) -> HeaderNames {
    let mut names = Vec::with_capacity(raw.len());
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let (mut empty, mut duplicate, mut overlong) = (0, 0, 0);

    for (idx, value) in raw.iter().enumerate() {
        let mut name = value.as_ref().trim().to_string();
        if name.is_empty() {
            empty += 1;
            name = format!("Column{}", idx + 1);
        }
        if name.chars().count() > MAX_HEADER_LEN {
            overlong += 1;
            name = name.chars().take(MAX_HEADER_LEN).collect();
        }
        if seen.contains(&name.to_lowercase()) {
            duplicate += 1;
            let mut counter = 2;
            let base = name.clone();
            while seen.contains(&name.to_lowercase()) {
                name = format!("{base}{counter}");
                counter += 1;
            }
        }
        seen.insert(name.to_lowercase());
        names.push(name);
    }

    HeaderNames {
        names,
        empty,
        duplicate,
        overlong,
    }
}

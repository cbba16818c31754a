//! Typed access to the rows of a [`CsvReader`].

use std::io::{Read, Seek};

use chrono::{NaiveDateTime, NaiveTime};

use super::CsvReader;
use crate::column::{Column, ColumnSchema};
use crate::error::Result;
use crate::field_type::{DataType, ValueFormat};
use crate::infer::locale::Locale;
use crate::options::is_null_literal;
use crate::value::{Value, convert};
use crate::warning::Warning;

/// Shifts a timestamp given the text of its time zone column.
pub type TimeZoneAdjuster = Box<dyn Fn(NaiveDateTime, &str) -> Option<NaiveDateTime>>;

/// One record as read and as converted.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedRow {
    pub raw_fields: Vec<String>,
    /// One entry per schema column, in schema order.
    pub typed_fields: Vec<Value>,
    pub record_number: u64,
    pub start_line: usize,
    pub end_line: usize,
    pub warnings: Vec<Warning>,
}

struct Binding {
    column: Column,
    /// Position of the column in the raw row.
    index: Option<usize>,
    time_index: Option<usize>,
    zone_index: Option<usize>,
}

/// Converts the fields of every record with a [`ColumnSchema`].
pub struct TypedReader<R> {
    reader: CsvReader<R>,
    bindings: Vec<Binding>,
    locale: &'static Locale,
    adjuster: Option<TimeZoneAdjuster>,
}

impl<R: Read + Seek> TypedReader<R> {
    /// Bind the schema columns to the reader's fields, by name first and by ordinal otherwise.
    pub fn new(reader: CsvReader<R>, schema: &ColumnSchema, locale: &'static Locale) -> Result<Self> {
        schema.validate()?;
        let names = reader.field_names();
        let position = |name: &str| names.iter().position(|n| n.eq_ignore_ascii_case(name));
        let field_index = |column: &Column| {
            position(&column.name).or_else(|| (column.ordinal < reader.field_count()).then_some(column.ordinal))
        };

        let bindings = schema
            .iter()
            .map(|column| Binding {
                column: column.clone(),
                index: field_index(column),
                time_index: column
                    .time_part
                    .as_deref()
                    .and_then(|name| schema.get(name))
                    .and_then(field_index),
                zone_index: column.time_zone_part.as_deref().and_then(position),
            })
            .collect::<Vec<_>>();

        for binding in bindings.iter().filter(|b| b.index.is_none()) {
            log::debug!("column '{}' not found in the file", binding.column.name);
        }

        Ok(Self {
            reader,
            bindings,
            locale,
            adjuster: None,
        })
    }

    /// Register the time zone conversion used for columns with a zone part.
    pub fn with_time_zone_adjuster(mut self, adjuster: TimeZoneAdjuster) -> Self {
        self.adjuster = Some(adjuster);
        self
    }

    pub fn field_count(&self) -> usize {
        self.bindings.len()
    }

    /// Schema column at position `idx`.
    pub fn column(&self, idx: usize) -> Option<&Column> {
        self.bindings.get(idx).map(|b| &b.column)
    }

    pub fn record_number(&self) -> u64 {
        self.reader.record_number()
    }

    pub fn start_line(&self) -> usize {
        self.reader.start_line()
    }

    pub fn end_line(&self) -> usize {
        self.reader.end_line()
    }

    pub fn end_of_file(&self) -> bool {
        self.reader.end_of_file()
    }

    /// The wrapped row reader.
    pub fn inner(&mut self) -> &mut CsvReader<R> {
        &mut self.reader
    }

    pub fn into_inner(self) -> CsvReader<R> {
        self.reader
    }

    /// Read and convert the next record.
    pub fn next_row(&mut self) -> Result<Option<TypedRow>> {
        let Some(row) = self.reader.read_record()? else {
            return Ok(None);
        };
        let null_literals = &self.reader.options().treat_as_null;
        let mut warnings = row.warnings;
        let mut typed_fields = Vec::with_capacity(self.bindings.len());
        let mut conversion_warnings = Vec::new();

        for binding in &self.bindings {
            let column = &binding.column;
            let raw = binding.index.and_then(|i| row.fields.get(i));
            let value = match raw {
                _ if column.ignore => Value::Null,
                None => Value::Null,
                Some(raw) if is_null_literal(raw, null_literals) => Value::Null,
                Some(raw) => match convert(raw, &column.format, self.locale) {
                    Some(value) => value,
                    None => {
                        let mut warning = Warning::new(
                            binding.index,
                            format!("'{raw}' is not a valid {}", column.format.describe()),
                        );
                        warning.record_number = row.record_number;
                        warning.line = row.start_line;
                        conversion_warnings.push(warning);
                        Value::Null
                    }
                },
            };
            let value = self.complete_date_time(value, binding, &row.fields);
            typed_fields.push(value);
        }

        for warning in &conversion_warnings {
            self.reader.publish(warning);
        }
        warnings.extend(conversion_warnings);

        Ok(Some(TypedRow {
            raw_fields: row.fields,
            typed_fields,
            record_number: row.record_number,
            start_line: row.start_line,
            end_line: row.end_line,
            warnings,
        }))
    }

    /// Add the linked time column and apply the time zone column.
    fn complete_date_time(&self, value: Value, binding: &Binding, fields: &[String]) -> Value {
        let Value::DateTime(mut stamp) = value else {
            return value;
        };
        let column = &binding.column;
        if let Some(text) = binding.time_index.and_then(|i| fields.get(i)) {
            if let Some(time) = parse_time_part(text, &column.time_part_format, self.locale) {
                stamp = stamp.date().and_time(time);
            }
        }
        if let (Some(adjuster), Some(zone)) = (
            self.adjuster.as_ref(),
            binding.zone_index.and_then(|i| fields.get(i)),
        ) {
            let zone = zone.trim();
            if !zone.is_empty() {
                if let Some(adjusted) = adjuster(stamp, zone) {
                    stamp = adjusted;
                }
            }
        }
        Value::DateTime(stamp)
    }
}

fn parse_time_part(text: &str, pattern: &str, locale: &Locale) -> Option<NaiveTime> {
    let format = ValueFormat {
        data_type: DataType::DateTime,
        date_format: pattern.to_string(),
        ..ValueFormat::default()
    };
    convert(text, &format, locale)?.as_date_time().map(|dt| dt.time())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::locale::EN;
    use crate::metadata::Dialect;
    use crate::options::ReadOptions;
    use chrono::NaiveDate;
    use std::io::Cursor;

    fn reader(text: &str) -> CsvReader<Cursor<Vec<u8>>> {
        CsvReader::open(
            Cursor::new(text.as_bytes().to_vec()),
            &Dialect::default(),
            &ReadOptions::default(),
        )
        .unwrap()
    }

    fn schema(columns: Vec<Column>) -> ColumnSchema {
        let mut schema = ColumnSchema::new();
        for column in columns {
            schema.add(column);
        }
        schema
    }

    #[test]
    fn test_conversion_and_nulls() {
        let schema = schema(vec![
            Column::new("id", 0, ValueFormat::of(DataType::Integer)),
            Column::new("name", 1, ValueFormat::of(DataType::String)),
        ]);
        let mut typed = TypedReader::new(reader("id,name\n1,Ann\nNULL,Bob\nx,Cy\n"), &schema, &EN).unwrap();

        let row = typed.next_row().unwrap().unwrap();
        assert_eq!(row.typed_fields, vec![Value::Integer(1), Value::String("Ann".into())]);

        let row = typed.next_row().unwrap().unwrap();
        assert_eq!(row.typed_fields[0], Value::Null);
        assert!(row.warnings.is_empty());

        let row = typed.next_row().unwrap().unwrap();
        assert_eq!(row.typed_fields[0], Value::Null);
        assert_eq!(row.warnings.len(), 1);
        assert_eq!(row.warnings[0].record_number, 3);
        assert!(typed.next_row().unwrap().is_none());
        assert!(typed.end_of_file());
    }

    #[test]
    fn test_time_part_is_combined() {
        let mut date = Column::new("day", 0, ValueFormat::date_time("yyyy-MM-dd", "-", ":"));
        date.time_part = Some("time".to_string());
        let mut time = Column::new("time", 1, ValueFormat::date_time("HH:mm:ss", "-", ":"));
        time.ignore = true;
        let schema = schema(vec![date, time]);

        let mut typed = TypedReader::new(reader("day,time\n2024-02-29,13:45:10\n"), &schema, &EN).unwrap();
        let row = typed.next_row().unwrap().unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(13, 45, 10)
            .unwrap();
        assert_eq!(row.typed_fields, vec![Value::DateTime(expected), Value::Null]);
    }

    #[test]
    fn test_time_zone_adjuster() {
        let mut stamp = Column::new("at", 0, ValueFormat::date_time("yyyy-MM-dd HH:mm", "-", ":"));
        stamp.time_zone_part = Some("tz".to_string());
        let schema = schema(vec![stamp, Column::new("tz", 1, ValueFormat::default())]);

        let typed = TypedReader::new(reader("at,tz\n2024-01-01 10:00,+2\n"), &schema, &EN).unwrap();
        let mut typed = typed.with_time_zone_adjuster(Box::new(|dt, zone| {
            let hours: i64 = zone.parse().ok()?;
            Some(dt - chrono::TimeDelta::hours(hours))
        }));
        let row = typed.next_row().unwrap().unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        assert_eq!(row.typed_fields[0], Value::DateTime(expected));
    }

    #[test]
    fn test_invalid_schema_is_rejected() {
        let mut date = Column::new("day", 0, ValueFormat::of(DataType::String));
        date.time_part = Some("day".to_string());
        let schema = schema(vec![date]);
        assert!(TypedReader::new(reader("day\nx\n"), &schema, &EN).is_err());
    }
}

//! Typed field values.

use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::field_type::{DataType, ValueFormat};
use crate::infer::boolean::parse_boolean;
use crate::infer::date::{parse_date_time, parse_serial_date};
use crate::infer::locale::Locale;
use crate::infer::numeric::{ParsedNumber, parse_number};

/// A field converted with its column's [`ValueFormat`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    String(String),
    Integer(i64),
    Numeric(Decimal),
    Double(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
    Guid(Uuid),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_date_time(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::String(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Numeric(d) => write!(f, "{d}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            Value::Guid(g) => write!(f, "{g}"),
        }
    }
}

/// Convert one raw field; `None` when the text does not fit the format.
pub fn convert(raw: &str, format: &ValueFormat, locale: &Locale) -> Option<Value> {
    let text = raw.trim();
    match format.data_type {
        DataType::String => Some(Value::String(raw.to_string())),
        DataType::TextPart => Some(text_part(raw, format)),
        DataType::Boolean => {
            parse_boolean(text, &format.true_literal, &format.false_literal).map(Value::Boolean)
        }
        DataType::Guid => Uuid::parse_str(text).ok().map(Value::Guid),
        DataType::Integer => {
            parse_number(text, format.decimal_separator, format.group_separator)?
                .as_integer()
                .map(Value::Integer)
        }
        DataType::Numeric => {
            match parse_number(text, format.decimal_separator, format.group_separator)? {
                ParsedNumber::Decimal(d) => Some(Value::Numeric(d)),
                ParsedNumber::Double(v) => Decimal::from_f64_retain(v).map(Value::Numeric),
            }
        }
        DataType::Double => parse_number(text, format.decimal_separator, format.group_separator)?
            .as_f64()
            .map(Value::Double),
        DataType::DateTime => {
            if format.is_serial_date() {
                parse_serial_date(text).map(Value::DateTime)
            } else {
                parse_date_time(
                    text,
                    &format.date_format,
                    &format.date_separator,
                    &format.time_separator,
                    locale,
                )
                .map(Value::DateTime)
            }
        }
    }
}

fn text_part(raw: &str, format: &ValueFormat) -> Value {
    let index = format.part.saturating_sub(1);
    let part = if format.part_to_end {
        raw.splitn(index + 1, format.part_splitter).nth(index)
    } else {
        raw.split(format.part_splitter).nth(index)
    };
    match part {
        Some(part) => Value::String(part.to_string()),
        None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::locale::{DE, EN};
    use chrono::NaiveDate;
    use std::str::FromStr;

    #[test]
    fn test_numbers() {
        let int = ValueFormat::of(DataType::Integer);
        assert_eq!(convert(" 42 ", &int, &EN), Some(Value::Integer(42)));
        assert_eq!(convert("4.5", &int, &EN), None);

        let numeric = ValueFormat::number(DataType::Numeric, ',', Some('.'));
        assert_eq!(
            convert("1.234,5", &numeric, &DE),
            Some(Value::Numeric(Decimal::from_str("1234.5").unwrap()))
        );
        let double = ValueFormat::of(DataType::Double);
        assert_eq!(convert("2.5e2", &double, &EN), Some(Value::Double(250.0)));
    }

    #[test]
    fn test_boolean_and_guid() {
        let format = ValueFormat::boolean("Yes", "No");
        assert_eq!(convert("yes", &format, &EN), Some(Value::Boolean(true)));
        assert_eq!(convert("maybe", &format, &EN), None);

        let guid = ValueFormat::of(DataType::Guid);
        let value = convert("6F9619FF-8B86-D011-B42D-00C04FC964FF", &guid, &EN);
        assert!(matches!(value, Some(Value::Guid(_))));
    }

    #[test]
    fn test_dates() {
        let format = ValueFormat::date_time("yyyy-MM-dd", "-", ":");
        let expected = NaiveDate::from_ymd_opt(2021, 3, 4)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(convert("2021-03-04", &format, &EN), Some(Value::DateTime(expected)));
        assert_eq!(convert("2021-13-04", &format, &EN), None);
    }

    #[test]
    fn test_text_part() {
        let first = ValueFormat::text_part(':', 1, false);
        assert_eq!(convert("a:b:c", &first, &EN), Some(Value::String("a".into())));
        let rest = ValueFormat::text_part(':', 2, true);
        assert_eq!(convert("a:b:c", &rest, &EN), Some(Value::String("b:c".into())));
        let missing = ValueFormat::text_part(':', 4, false);
        assert_eq!(convert("a:b", &missing, &EN), Some(Value::Null));
    }
}

use std::fmt;

/// Data type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataType {
    /// Text/string value (fallback type).
    #[default]
    String,
    /// Whole number that fits an `i64`.
    Integer,
    /// Decimal number with a fixed scale.
    Numeric,
    /// Floating point number.
    Double,
    /// Boolean value with configurable literals.
    Boolean,
    /// Date and/or time value parsed with a date pattern.
    DateTime,
    /// GUID / UUID value.
    Guid,
    /// One part of a value split at a separator.
    TextPart,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::String => write!(f, "String"),
            DataType::Integer => write!(f, "Integer"),
            DataType::Numeric => write!(f, "Numeric"),
            DataType::Double => write!(f, "Double"),
            DataType::Boolean => write!(f, "Boolean"),
            DataType::DateTime => write!(f, "DateTime"),
            DataType::Guid => write!(f, "Guid"),
            DataType::TextPart => write!(f, "TextPart"),
        }
    }
}

impl DataType {
    /// Returns true if this type is numeric.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Numeric | DataType::Double)
    }

    /// Returns the specificity rank; higher values are more constrained.
    ///
    /// Used to decide whether a guessed format may replace an existing one.
    pub const fn specificity(&self) -> u8 {
        match self {
            DataType::String => 0,
            DataType::TextPart => 1,
            DataType::Double => 2,
            DataType::Numeric => 3,
            DataType::Integer => 4,
            DataType::DateTime => 5,
            DataType::Guid => 6,
            DataType::Boolean => 7,
        }
    }
}

/// Pattern marking a spreadsheet serial date in [`ValueFormat::date_format`].
pub const SERIAL_DATE_FORMAT: &str = "SerialDate";

/// A data type plus the parameters needed to convert raw text into it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueFormat {
    pub data_type: DataType,
    /// Date pattern (`yyyy-MM-dd HH:mm:ss` style); `/` and `:` stand for the separators.
    pub date_format: String,
    pub date_separator: String,
    pub time_separator: String,
    pub decimal_separator: char,
    pub group_separator: Option<char>,
    pub true_literal: String,
    pub false_literal: String,
    pub part_splitter: char,
    /// 1-based index of the part taken by [`DataType::TextPart`].
    pub part: usize,
    pub part_to_end: bool,
}

impl Default for ValueFormat {
    fn default() -> Self {
        Self {
            data_type: DataType::String,
            date_format: "MM/dd/yyyy".to_string(),
            date_separator: "/".to_string(),
            time_separator: ":".to_string(),
            decimal_separator: '.',
            group_separator: None,
            true_literal: "True".to_string(),
            false_literal: "False".to_string(),
            part_splitter: ':',
            part: 1,
            part_to_end: false,
        }
    }
}

impl ValueFormat {
    /// Format of the given type with default parameters.
    pub fn of(data_type: DataType) -> Self {
        Self {
            data_type,
            ..Self::default()
        }
    }

    pub fn boolean(true_literal: &str, false_literal: &str) -> Self {
        Self {
            data_type: DataType::Boolean,
            true_literal: true_literal.to_string(),
            false_literal: false_literal.to_string(),
            ..Self::default()
        }
    }

    pub fn number(data_type: DataType, decimal_separator: char, group_separator: Option<char>) -> Self {
        Self {
            data_type,
            decimal_separator,
            group_separator,
            ..Self::default()
        }
    }

    pub fn date_time(date_format: &str, date_separator: &str, time_separator: &str) -> Self {
        Self {
            data_type: DataType::DateTime,
            date_format: date_format.to_string(),
            date_separator: date_separator.to_string(),
            time_separator: time_separator.to_string(),
            ..Self::default()
        }
    }

    pub fn text_part(splitter: char, part: usize, to_end: bool) -> Self {
        Self {
            data_type: DataType::TextPart,
            part_splitter: splitter,
            part,
            part_to_end: to_end,
            ..Self::default()
        }
    }

    /// True for a spreadsheet serial date.
    pub fn is_serial_date(&self) -> bool {
        self.data_type == DataType::DateTime && self.date_format == SERIAL_DATE_FORMAT
    }

    /// Short human readable description, e.g. `DateTime (yyyy-MM-dd)`.
    pub fn describe(&self) -> String {
        match self.data_type {
            DataType::DateTime => format!("DateTime ({})", self.resolved_date_format()),
            DataType::Numeric | DataType::Double | DataType::Integer => {
                match self.group_separator {
                    Some(group) => format!(
                        "{} (decimal '{}', group '{}')",
                        self.data_type, self.decimal_separator, group
                    ),
                    None => format!("{} (decimal '{}')", self.data_type, self.decimal_separator),
                }
            }
            DataType::Boolean => format!("Boolean ({}/{})", self.true_literal, self.false_literal),
            DataType::TextPart => format!("TextPart ('{}' part {})", self.part_splitter, self.part),
            _ => self.data_type.to_string(),
        }
    }

    /// The date pattern with its separator placeholders substituted.
    pub fn resolved_date_format(&self) -> String {
        if self.is_serial_date() {
            return self.date_format.clone();
        }
        self.date_format
            .chars()
            .map(|c| match c {
                '/' => self.date_separator.clone(),
                ':' => self.time_separator.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}

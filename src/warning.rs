//! Non-fatal problems reported while reading.

use std::fmt;
use std::sync::mpsc::Sender;

/// A recoverable row- or field-level problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Zero-based column, when the problem is tied to one field.
    pub column: Option<usize>,
    /// Record number the warning belongs to (0 while reading the header).
    pub record_number: u64,
    /// Physical line where the record started.
    pub line: usize,
    pub message: String,
}

impl Warning {
    pub fn new(column: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            column,
            record_number: 0,
            line: 0,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, record {}", self.line, self.record_number)?;
        if let Some(column) = self.column {
            write!(f, ", column {}", column + 1)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Receiver of warnings, registered on a reader at construction.
pub trait WarningSink {
    fn warn(&mut self, warning: &Warning);
}

impl<F> WarningSink for F
where
    F: FnMut(&Warning),
{
    fn warn(&mut self, warning: &Warning) {
        self(warning);
    }
}

/// Forward warnings over a channel; a closed receiver is ignored.
impl WarningSink for Sender<Warning> {
    fn warn(&mut self, warning: &Warning) {
        let _ = self.send(warning.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn test_display() {
        let mut warning = Warning::new(Some(1), "Extra data ignored");
        warning.line = 4;
        warning.record_number = 3;
        assert_eq!(warning.to_string(), "line 4, record 3, column 2: Extra data ignored");
    }

    #[test]
    fn test_channel_sink() {
        let (tx, rx) = channel();
        let mut sink: Box<dyn WarningSink> = Box::new(tx);
        sink.warn(&Warning::new(None, "row combined"));
        assert_eq!(rx.recv().unwrap().message, "row combined");
    }
}

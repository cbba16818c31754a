/// How leading and trailing whitespace is removed from fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrimMode {
    /// Keep whitespace as read.
    None,
    /// Trim fields that were not quoted.
    #[default]
    Unquoted,
    /// Trim every field, quoted or not.
    All,
}

/// Tokenizer behaviour that is not part of the dialect itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOptions {
    pub trim: TrimMode,
    /// Replace non-breaking spaces with a plain space.
    pub treat_nbsp_as_space: bool,
    /// Replace undecodable characters (U+FFFD) with a plain space.
    pub treat_unknown_char_as_space: bool,
    /// Fold a line break inside a quoted field into a single space.
    pub treat_lf_as_space: bool,
    /// A quote only closes a field when followed by a delimiter or line end.
    pub context_sensitive_quoting: bool,
    /// A doubled quote directly followed by a delimiter or line end closes the field.
    pub duplicate_quote_closes: bool,
    pub skip_empty_lines: bool,
    /// Drop rows that repeat the header row.
    pub skip_duplicate_header: bool,
    /// Join a short row with the next physical row when that restores the column count.
    pub allow_row_combining: bool,
    /// Merge overflowing fields back into the most probable column.
    pub realign_columns: bool,
    pub warn_delimiter_in_value: bool,
    pub warn_quotes: bool,
    pub warn_nbsp: bool,
    pub warn_unknown_char: bool,
    pub warn_line_feed: bool,
    /// Literals read as null by the typed reader and the sample collector.
    pub treat_as_null: Vec<String>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            trim: TrimMode::Unquoted,
            treat_nbsp_as_space: false,
            treat_unknown_char_as_space: false,
            treat_lf_as_space: false,
            context_sensitive_quoting: false,
            duplicate_quote_closes: false,
            skip_empty_lines: true,
            skip_duplicate_header: true,
            allow_row_combining: false,
            realign_columns: false,
            warn_delimiter_in_value: true,
            warn_quotes: false,
            warn_nbsp: true,
            warn_unknown_char: true,
            warn_line_feed: false,
            treat_as_null: vec!["NULL".to_string(), "n/a".to_string()],
        }
    }
}

impl ReadOptions {
    /// Whether `value` is one of the configured null literals.
    pub fn is_null_literal(&self, value: &str) -> bool {
        is_null_literal(value, &self.treat_as_null)
    }
}

/// Case-insensitive test against a list of null literals; blank is always null.
pub fn is_null_literal(value: &str, literals: &[String]) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || literals.iter().any(|l| l.eq_ignore_ascii_case(trimmed))
}

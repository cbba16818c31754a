//! Column type inference from sampled values.
//!
//! Checks run from the most constrained type to the least: boolean, GUID,
//! numbers and dates, with plain text as the fallback. The first check that
//! accepts every sample wins. Failed checks still report how many samples
//! matched and a few counter examples so a near miss can be shown to a user.

pub mod boolean;
pub mod date;
pub mod formats;
pub mod locale;
pub mod numeric;

use chrono::{Datelike, Local};
use foldhash::{HashSet, HashSetExt};
use uuid::Uuid;

use crate::field_type::{DataType, SERIAL_DATE_FORMAT, ValueFormat};
use crate::sample::DatePreference;
use locale::{EN, Locale};
use numeric::ParsedNumber;

/// Failing values kept per check.
pub const MAX_EXAMPLES: usize = 3;

/// A failed check is only a possible match above this many positives.
pub const POSSIBLE_MATCH_THRESHOLD: usize = 5;

/// Letters that rarely show up in numbers or numeric dates.
const RARE_LETTERS: &str = "bcdfghijklnoqrsuvwxy";

/// Rare-letter samples that mark a column as text regardless of its size.
const RARE_LETTER_LIMIT: usize = 10;

/// Serial dates need more samples than this.
const SERIAL_DATE_MIN_SAMPLES: usize = 10;

/// Years accepted around the current year for serial dates.
const SERIAL_YEARS_BACK: i32 = 80;
const SERIAL_YEARS_AHEAD: i32 = 20;

const GUID_LENGTHS: std::ops::RangeInclusive<usize> = 32..=38;

/// Outcome of one type check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckResult {
    /// Format every sample converted with.
    pub found: Option<ValueFormat>,
    /// Best partial format, kept when more than [`POSSIBLE_MATCH_THRESHOLD`] samples matched.
    pub possible: Option<ValueFormat>,
    pub positive_matches: usize,
    /// Up to [`MAX_EXAMPLES`] values that did not convert.
    pub examples: Vec<String>,
}

impl CheckResult {
    pub fn found(format: ValueFormat) -> Self {
        Self {
            found: Some(format),
            ..Self::default()
        }
    }

    fn partial(format: ValueFormat, positive_matches: usize, examples: Vec<String>) -> Self {
        Self {
            found: None,
            possible: (positive_matches > POSSIBLE_MATCH_THRESHOLD).then_some(format),
            positive_matches,
            examples,
        }
    }

    pub fn is_found(&self) -> bool {
        self.found.is_some()
    }

    /// Data type of the found format, if any.
    pub fn data_type(&self) -> Option<DataType> {
        self.found.as_ref().map(|f| f.data_type)
    }

    /// Replace `self` with `other` if it is better; a found match is never replaced.
    pub fn keep_better(&mut self, other: CheckResult) {
        if self.found.is_some() {
            return;
        }
        if other.found.is_some()
            || (other.possible.is_some() && other.positive_matches > self.positive_matches)
            || (self.possible.is_none() && self.examples.is_empty())
        {
            *self = other;
        }
    }
}

/// Settings of the type inference engine.
#[derive(Debug, Clone, PartialEq)]
pub struct GuessOptions {
    /// Checks past the GUID test need at least this many distinct samples.
    pub min_samples: usize,
    pub guess_boolean: bool,
    pub guess_guid: bool,
    pub guess_numeric: bool,
    pub guess_date_time: bool,
    /// Try patterns with month and day names.
    pub check_named_dates: bool,
    /// Try spreadsheet serial dates.
    pub serial_date: bool,
    /// Reject serial dates far from the current year.
    pub serial_date_close_to_now: bool,
    /// Columns matching nothing become `String`; otherwise no format is produced.
    pub add_text_columns: bool,
    pub true_literal: Option<String>,
    pub false_literal: Option<String>,
    pub date_preference: DatePreference,
    pub locale: &'static Locale,
}

impl Default for GuessOptions {
    fn default() -> Self {
        Self {
            min_samples: 2,
            guess_boolean: true,
            guess_guid: true,
            guess_numeric: true,
            guess_date_time: true,
            check_named_dates: true,
            serial_date: false,
            serial_date_close_to_now: true,
            add_text_columns: true,
            true_literal: None,
            false_literal: None,
            date_preference: DatePreference::default(),
            locale: &EN,
        }
    }
}

/// Guess the format of one column.
pub fn guess<S: AsRef<str>>(samples: &[S], min_samples: usize, options: &GuessOptions) -> CheckResult {
    TypeGuesser::new(options).guess(samples, min_samples)
}

/// Type inference over the columns of one file.
///
/// Remembers the first date format found so later columns are checked
/// against it before the full pattern table.
#[derive(Debug)]
pub struct TypeGuesser<'a> {
    options: &'a GuessOptions,
    prior_date: Option<ValueFormat>,
}

impl<'a> TypeGuesser<'a> {
    pub fn new(options: &'a GuessOptions) -> Self {
        Self {
            options,
            prior_date: None,
        }
    }

    /// Date format established by an earlier column.
    pub fn prior_date(&self) -> Option<&ValueFormat> {
        self.prior_date.as_ref()
    }

    pub fn guess<S: AsRef<str>>(&mut self, samples: &[S], min_samples: usize) -> CheckResult {
        let values: Vec<&str> = samples
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty())
            .collect();
        if values.is_empty() {
            return self.finish(CheckResult::default());
        }
        let opts = self.options;
        let mut best = CheckResult::default();

        if opts.guess_boolean && distinct_count(&values) <= 2 {
            let custom = opts.true_literal.as_deref().zip(opts.false_literal.as_deref());
            if let Some((t, f)) = boolean::matching_pair(&values, custom) {
                return CheckResult::found(ValueFormat::boolean(&t, &f));
            }
        }

        if opts.guess_guid && values.iter().all(|v| GUID_LENGTHS.contains(&v.len())) {
            let result = check_guid(&values);
            if result.is_found() {
                return result;
            }
            best.keep_better(result);
        }

        if !opts.check_named_dates && looks_like_text(&values) {
            return self.finish(best);
        }

        if opts.guess_date_time {
            if let Some(prior) = self.prior_date.clone() {
                let (min, max) = length_range(&prior, opts.locale);
                let avg = average_len(&values);
                if avg >= min as f64 && avg <= max as f64 {
                    let result = self.check_date_format(&values, prior);
                    if result.is_found() {
                        return result;
                    }
                    best.keep_better(result);
                }
            }
        }

        if values.len() < min_samples {
            log::debug!("{} samples, {min_samples} needed for type checks", values.len());
            return self.finish(best);
        }

        if opts.guess_date_time
            && values
                .iter()
                .all(|v| v.len() == 8 && v.bytes().all(|b| b.is_ascii_digit()))
        {
            let result = self.check_date_format(&values, ValueFormat::date_time("yyyyMMdd", "/", ":"));
            if result.is_found() {
                return result;
            }
            best.keep_better(result);
        }

        if opts.serial_date && values.len() > SERIAL_DATE_MIN_SAMPLES {
            let result = check_serial_date(&values, opts.serial_date_close_to_now);
            if result.is_found() {
                return result;
            }
            best.keep_better(result);
        }

        if opts.guess_numeric {
            let result = check_numeric(&values, opts.locale.decimal_separator);
            if result.is_found() {
                return result;
            }
            best.keep_better(result);
        }

        if opts.guess_date_time {
            let result = self.check_date_table(&values);
            if result.is_found() {
                return result;
            }
            best.keep_better(result);

            if let Some(prior) = self.prior_date.clone() {
                let result = self.check_date_format(&values, prior);
                if result.is_found() {
                    return result;
                }
                best.keep_better(result);
            }
        }

        if opts.serial_date && !opts.guess_numeric {
            let result = check_serial_date(&values, false);
            if result.is_found() {
                return result;
            }
            best.keep_better(result);
        }

        self.finish(best)
    }

    fn finish(&self, mut best: CheckResult) -> CheckResult {
        if self.options.add_text_columns && best.found.is_none() {
            best.found = Some(ValueFormat::of(DataType::String));
        }
        best
    }

    /// Test every sample against one date format and remember it when it fits.
    fn check_date_format(&mut self, values: &[&str], format: ValueFormat) -> CheckResult {
        let result = check_pattern(values, format, self.options.locale);
        if let Some(found) = &result.found {
            self.prior_date.get_or_insert_with(|| found.clone());
        }
        result
    }

    fn check_date_table(&mut self, values: &[&str]) -> CheckResult {
        let opts = self.options;
        let avg = average_len(values);
        let date_seps = observed_date_separators(values);
        let time_seps: Vec<&str> = if values.iter().any(|v| v.contains(':')) || !values.iter().any(|v| v.contains('.')) {
            vec![":"]
        } else {
            vec![":", "."]
        };

        let mut best = CheckResult::default();
        for pattern in formats::date_formats(opts.date_preference) {
            if !opts.check_named_dates && date::is_named(pattern) {
                continue;
            }
            let seps: &[&str] = if pattern.contains('/') { &date_seps } else { &["/"] };
            let tseps: &[&str] = if pattern.contains(':') { &time_seps } else { &[":"] };
            for &dsep in seps {
                for &tsep in tseps {
                    let (min, max) = date::length_range(pattern, dsep, tsep, opts.locale);
                    if avg < min as f64 || avg > max as f64 {
                        continue;
                    }
                    let result = self.check_date_format(values, ValueFormat::date_time(pattern, dsep, tsep));
                    if result.is_found() {
                        log::debug!("date pattern '{pattern}' matched with separator '{dsep}'");
                        return result;
                    }
                    best.keep_better(result);
                }
            }
        }
        best
    }
}

fn check_pattern(values: &[&str], mut format: ValueFormat, locale: &Locale) -> CheckResult {
    format.date_format = format.resolved_date_format();
    let mut positives = 0;
    let mut examples = Vec::new();
    for value in values {
        if date::parse_date_time(value, &format.date_format, &format.date_separator, &format.time_separator, locale)
            .is_some()
        {
            positives += 1;
        } else {
            examples.push((*value).to_string());
            if examples.len() >= MAX_EXAMPLES {
                break;
            }
        }
    }
    if examples.is_empty() {
        CheckResult::found(format)
    } else {
        CheckResult::partial(format, positives, examples)
    }
}

fn length_range(format: &ValueFormat, locale: &Locale) -> (usize, usize) {
    date::length_range(&format.date_format, &format.date_separator, &format.time_separator, locale)
}

fn check_guid(values: &[&str]) -> CheckResult {
    let mut positives = 0;
    let mut examples = Vec::new();
    for value in values {
        if Uuid::parse_str(value).is_ok() {
            positives += 1;
        } else if examples.len() < MAX_EXAMPLES {
            examples.push((*value).to_string());
        }
    }
    let format = ValueFormat::of(DataType::Guid);
    if positives == values.len() {
        CheckResult::found(format)
    } else {
        CheckResult::partial(format, positives, examples)
    }
}

fn check_numeric(values: &[&str], preferred_decimal: char) -> CheckResult {
    let mut best = CheckResult::default();
    for (decimal, group) in numeric::separator_candidates(values, preferred_decimal) {
        let mut positives = 0;
        let mut examples = Vec::new();
        let mut integral = true;
        let mut exponent = false;
        for value in values {
            match numeric::parse_number(value, decimal, group) {
                Some(number) => {
                    positives += 1;
                    integral &= number.as_integer().is_some();
                    exponent |= matches!(number, ParsedNumber::Double(_));
                }
                None => {
                    if examples.len() < MAX_EXAMPLES {
                        examples.push((*value).to_string());
                    }
                }
            }
        }
        let data_type = if exponent {
            DataType::Double
        } else if integral {
            DataType::Integer
        } else {
            DataType::Numeric
        };
        let format = ValueFormat::number(data_type, decimal, group);
        if positives == values.len() {
            return CheckResult::found(format);
        }
        best.keep_better(CheckResult::partial(format, positives, examples));
    }
    best
}

fn check_serial_date(values: &[&str], close_to_now: bool) -> CheckResult {
    let year = Local::now().year();
    let window = (year - SERIAL_YEARS_BACK)..=(year + SERIAL_YEARS_AHEAD);
    let mut positives = 0;
    let mut examples = Vec::new();
    for value in values {
        match date::parse_serial_date(value) {
            Some(parsed) if !close_to_now || window.contains(&parsed.year()) => positives += 1,
            _ => {
                if examples.len() < MAX_EXAMPLES {
                    examples.push((*value).to_string());
                }
            }
        }
    }
    let format = ValueFormat::date_time(SERIAL_DATE_FORMAT, "/", ":");
    if positives == values.len() {
        CheckResult::found(format)
    } else {
        CheckResult::partial(format, positives, examples)
    }
}

fn distinct_count(values: &[&str]) -> usize {
    let mut seen = HashSet::with_capacity(3);
    for value in values {
        seen.insert(value.to_lowercase());
        if seen.len() > 2 {
            break;
        }
    }
    seen.len()
}

fn looks_like_text(values: &[&str]) -> bool {
    let rare = values
        .iter()
        .filter(|v| v.chars().any(|c| RARE_LETTERS.contains(c.to_ascii_lowercase())))
        .count();
    rare * 2 >= values.len() || rare >= RARE_LETTER_LIMIT
}

fn average_len(values: &[&str]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| v.chars().count()).sum::<usize>() as f64 / values.len() as f64
}

fn observed_date_separators(values: &[&str]) -> Vec<&'static str> {
    let found: Vec<&'static str> = ["/", "-", ".", " "]
        .into_iter()
        .filter(|sep| values.iter().any(|v| v.contains(sep)))
        .collect();
    if found.is_empty() { vec!["/"] } else { found }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guess_default(samples: &[&str]) -> CheckResult {
        guess(samples, 2, &GuessOptions::default())
    }

    #[test]
    fn test_boolean() {
        let result = guess_default(&["true", "false", "true"]);
        let format = result.found.unwrap();
        assert_eq!(format.data_type, DataType::Boolean);
        assert_eq!(format.true_literal, "True");
        assert_eq!(format.false_literal, "False");
    }

    #[test]
    fn test_iso_dates() {
        let result = guess_default(&["2021-01-05", "2021-02-07"]);
        let format = result.found.unwrap();
        assert_eq!(format.data_type, DataType::DateTime);
        assert_eq!(format.date_format, "yyyy-MM-dd");
    }

    #[test]
    fn test_compact_date_before_integer() {
        let result = guess_default(&["20210105", "20191231"]);
        let format = result.found.unwrap();
        assert_eq!(format.data_type, DataType::DateTime);
        assert_eq!(format.date_format, "yyyyMMdd");

        let result = guess_default(&["12345678", "20191231"]);
        assert_eq!(result.data_type(), Some(DataType::Integer));
    }

    #[test]
    fn test_integer_and_numeric() {
        assert_eq!(guess_default(&["1", "2", "3"]).data_type(), Some(DataType::Integer));
        assert_eq!(guess_default(&["1.5", "2", "-3"]).data_type(), Some(DataType::Numeric));
        assert_eq!(guess_default(&["1e5", "2.5E-3"]).data_type(), Some(DataType::Double));

        let format = guess_default(&["1,234.50", "12.00", "7,000"]).found.unwrap();
        assert_eq!(format.data_type, DataType::Numeric);
        assert_eq!(format.decimal_separator, '.');
        assert_eq!(format.group_separator, Some(','));
    }

    #[test]
    fn test_extreme_exponent_with_percent() {
        let result = guess(&["1e-2147483648%", "2%"], 2, &GuessOptions::default());
        assert_eq!(result.data_type(), Some(DataType::String));
    }

    #[test]
    fn test_german_numbers() {
        let options = GuessOptions {
            locale: &locale::DE,
            ..GuessOptions::default()
        };
        let format = guess(&["1.234,5", "17,25"], 2, &options).found.unwrap();
        assert_eq!(format.data_type, DataType::Numeric);
        assert_eq!(format.decimal_separator, ',');
        assert_eq!(format.group_separator, Some('.'));
    }

    #[test]
    fn test_guid() {
        let result = guess_default(&[
            "936DA01F-9ABD-4D9D-80C7-02AF85C822A8",
            "{7c9e6679-7425-40de-944b-e07fc1f90ae7}",
        ]);
        assert_eq!(result.data_type(), Some(DataType::Guid));
    }

    #[test]
    fn test_min_samples_gate() {
        let result = guess_default(&["42"]);
        assert_eq!(result.data_type(), Some(DataType::String));
        assert_eq!(guess(&["42"], 1, &GuessOptions::default()).data_type(), Some(DataType::Integer));
    }

    #[test]
    fn test_text_fallback_and_possible_match() {
        let mut samples: Vec<String> = (1..=8).map(|n| n.to_string()).collect();
        samples.push("n/a yet".to_string());
        let result = guess(&samples, 2, &GuessOptions::default());
        assert_eq!(result.data_type(), Some(DataType::String));
        assert_eq!(result.possible.map(|f| f.data_type), Some(DataType::Integer));
        assert_eq!(result.examples, vec!["n/a yet".to_string()]);

        let options = GuessOptions {
            add_text_columns: false,
            ..GuessOptions::default()
        };
        assert!(!guess(&["abc", "def"], 2, &options).is_found());
    }

    #[test]
    fn test_named_dates() {
        let result = guess_default(&["March 7, 2022", "May 12, 2021"]);
        let format = result.found.unwrap();
        assert_eq!(format.data_type, DataType::DateTime);
        assert_eq!(format.date_format, "MMMM d, yyyy");
    }

    #[test]
    fn test_rare_letter_short_circuit() {
        let options = GuessOptions {
            check_named_dates: false,
            ..GuessOptions::default()
        };
        let result = guess(&["Mar 7, 2022", "Jun 12, 2021"], 2, &options);
        assert_eq!(result.data_type(), Some(DataType::String));
    }

    #[test]
    fn test_date_preference() {
        let samples = ["01/05/2021", "03/04/2021"];
        let mdy = guess_default(&samples).found.unwrap();
        assert_eq!(mdy.date_format, "MM/dd/yyyy");

        let options = GuessOptions {
            date_preference: DatePreference::DmyFormat,
            ..GuessOptions::default()
        };
        let dmy = guess(&samples, 2, &options).found.unwrap();
        assert_eq!(dmy.date_format, "dd/MM/yyyy");
    }

    #[test]
    fn test_prior_date_format_is_reused() {
        let options = GuessOptions::default();
        let mut guesser = TypeGuesser::new(&options);
        let first = guesser.guess(&["31.12.2020", "15.01.2021"], 2).found.unwrap();
        assert_eq!(first.date_format, "dd.MM.yyyy");
        assert_eq!(guesser.prior_date().map(|f| f.date_format.as_str()), Some("dd.MM.yyyy"));

        // a single sample is below min_samples but still matches the prior format
        let second = guesser.guess(&["01.02.2021"], 2).found.unwrap();
        assert_eq!(second.date_format, "dd.MM.yyyy");
    }

    #[test]
    fn test_serial_dates() {
        let options = GuessOptions {
            serial_date: true,
            ..GuessOptions::default()
        };
        let samples: Vec<String> = (0..12).map(|n| format!("{}.25", 44197 + n)).collect();
        let format = guess(&samples, 2, &options).found.unwrap();
        assert!(format.is_serial_date());
    }

    #[test]
    fn test_time_only() {
        let format = guess_default(&["08:15:00", "17:45:30"]).found.unwrap();
        assert_eq!(format.data_type, DataType::DateTime);
        assert_eq!(format.date_format, "HH:mm:ss");
    }

    #[test]
    fn test_keep_better_never_downgrades() {
        let mut best = CheckResult::found(ValueFormat::of(DataType::Integer));
        best.keep_better(CheckResult::partial(ValueFormat::of(DataType::Numeric), 50, vec![]));
        assert_eq!(best.data_type(), Some(DataType::Integer));
    }
}

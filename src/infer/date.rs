//! Exact date/time parsing against `yyyy-MM-dd HH:mm:ss` style patterns.
//!
//! Pattern letters follow the usual custom date format conventions: `yyyy`
//! and `yy` years, `M`/`MM`/`MMM`/`MMMM` months, `d`/`dd`/`ddd`/`dddd` days,
//! `H`/`HH`/`h`/`hh` hours, `m`/`mm`, `s`/`ss`, `f..` fractions, `tt` for
//! AM/PM and `K` or `zzz` for a UTC offset. A single letter accepts one or two
//! digits, a doubled letter requires exactly two. `/` and `:` stand for the
//! date and time separators handed in by the caller. Anything else must match
//! literally.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use super::locale::Locale;

/// First day of the spreadsheet serial date epoch.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Largest serial date (9999-12-31).
const SERIAL_MAX: f64 = 2_958_465.0;

/// Two-digit years up to this value are read as 20xx, the rest as 19xx.
const TWO_DIGIT_YEAR_PIVOT: i32 = 29;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Year4,
    Year2,
    Month,
    Month2,
    MonthAbbr,
    MonthName,
    Day,
    Day2,
    DayAbbr,
    DayName,
    Hour24 { padded: bool },
    Hour12 { padded: bool },
    Minute { padded: bool },
    Second { padded: bool },
    Fraction(usize),
    AmPm,
    Zone,
    DateSep,
    TimeSep,
    Literal(char),
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::with_capacity(chars.len());
    let mut idx = 0;
    while idx < chars.len() {
        let ch = chars[idx];
        let mut run = 1;
        while idx + run < chars.len() && chars[idx + run] == ch {
            run += 1;
        }
        let padded = run >= 2;
        let token = match ch {
            'y' if run >= 3 => Token::Year4,
            'y' => Token::Year2,
            'M' => match run {
                1 => Token::Month,
                2 => Token::Month2,
                3 => Token::MonthAbbr,
                _ => Token::MonthName,
            },
            'd' => match run {
                1 => Token::Day,
                2 => Token::Day2,
                3 => Token::DayAbbr,
                _ => Token::DayName,
            },
            'H' => Token::Hour24 { padded },
            'h' => Token::Hour12 { padded },
            'm' => Token::Minute { padded },
            's' => Token::Second { padded },
            'f' | 'F' => Token::Fraction(run.min(9)),
            't' => Token::AmPm,
            'K' | 'z' => Token::Zone,
            '/' | ':' => {
                // separators never merge into runs
                run = 1;
                if ch == '/' { Token::DateSep } else { Token::TimeSep }
            }
            other => {
                run = 1;
                Token::Literal(other)
            }
        };
        tokens.push(token);
        idx += run;
    }
    tokens
}

/// Whether the pattern carries date fields and time fields.
pub fn pattern_parts(pattern: &str) -> (bool, bool) {
    let mut has_date = false;
    let mut has_time = false;
    for token in tokenize(pattern) {
        match token {
            Token::Year4
            | Token::Year2
            | Token::Month
            | Token::Month2
            | Token::MonthAbbr
            | Token::MonthName
            | Token::Day
            | Token::Day2 => has_date = true,
            Token::Hour24 { .. }
            | Token::Hour12 { .. }
            | Token::Minute { .. }
            | Token::Second { .. } => has_time = true,
            _ => {}
        }
    }
    (has_date, has_time)
}

/// True if the pattern needs month or day names.
pub fn is_named(pattern: &str) -> bool {
    tokenize(pattern).iter().any(|t| {
        matches!(
            t,
            Token::MonthAbbr | Token::MonthName | Token::DayAbbr | Token::DayName
        )
    })
}

/// Shortest and longest text a pattern can match.
pub fn length_range(pattern: &str, date_sep: &str, time_sep: &str, locale: &Locale) -> (usize, usize) {
    let date_sep = date_sep.chars().count();
    let time_sep = time_sep.chars().count();
    let (mut min, mut max) = (0, 0);
    for token in tokenize(pattern) {
        let (lo, hi) = match token {
            Token::Year4 => (4, 4),
            Token::Year2 | Token::Month2 | Token::Day2 => (2, 2),
            Token::Month | Token::Day => (1, 2),
            Token::MonthAbbr => Locale::name_lengths(&locale.month_abbr),
            Token::MonthName => Locale::name_lengths(&locale.month_names),
            Token::DayAbbr => Locale::name_lengths(&locale.day_abbr),
            Token::DayName => Locale::name_lengths(&locale.day_names),
            Token::Hour24 { padded }
            | Token::Hour12 { padded }
            | Token::Minute { padded }
            | Token::Second { padded } => {
                if padded {
                    (2, 2)
                } else {
                    (1, 2)
                }
            }
            Token::Fraction(n) => (n, n),
            Token::AmPm => Locale::name_lengths(&[locale.am, locale.pm]),
            Token::Zone => (1, 6),
            Token::DateSep => (date_sep, date_sep),
            Token::TimeSep => (time_sep, time_sep),
            Token::Literal(_) => (1, 1),
        };
        min += lo;
        max += hi;
    }
    (min, max)
}

#[derive(Default)]
struct Fields {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: u32,
    minute: u32,
    second: u32,
    nanos: u32,
    twelve_hour: bool,
    pm: Option<bool>,
    offset_minutes: i32,
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
}

impl Scanner {
    fn digits(&mut self, min: usize, max: usize) -> Option<u32> {
        let start = self.pos;
        let mut value: u32 = 0;
        while self.pos - start < max {
            match self.chars.get(self.pos).and_then(|c| c.to_digit(10)) {
                Some(d) => {
                    value = value.checked_mul(10)?.checked_add(d)?;
                    self.pos += 1;
                }
                None => break,
            }
        }
        (self.pos - start >= min).then_some(value)
    }

    fn literal(&mut self, expected: &str) -> bool {
        let mut pos = self.pos;
        for want in expected.chars() {
            match self.chars.get(pos) {
                Some(&got) if got.to_lowercase().eq(want.to_lowercase()) => pos += 1,
                _ => return false,
            }
        }
        self.pos = pos;
        true
    }

    /// Longest case-insensitive match from `names`; returns its index.
    fn name(&mut self, names: &[&str]) -> Option<usize> {
        let start = self.pos;
        let mut best: Option<(usize, usize)> = None;
        for (idx, name) in names.iter().enumerate() {
            self.pos = start;
            if self.literal(name) {
                let len = self.pos - start;
                if best.is_none_or(|(_, l)| len > l) {
                    best = Some((idx, len));
                }
            }
        }
        self.pos = start;
        let (idx, len) = best?;
        self.pos += len;
        Some(idx)
    }

    fn zone(&mut self) -> Option<i32> {
        match self.chars.get(self.pos) {
            Some('Z') | Some('z') => {
                self.pos += 1;
                Some(0)
            }
            Some(&sign @ ('+' | '-')) => {
                self.pos += 1;
                let hours = self.digits(2, 2)? as i32;
                if self.chars.get(self.pos) == Some(&':') {
                    self.pos += 1;
                }
                let minutes = self.digits(0, 2).unwrap_or(0) as i32;
                let total = hours * 60 + minutes;
                Some(if sign == '-' { -total } else { total })
            }
            _ => None,
        }
    }
}

/// Parse `text` with a pattern; the whole text has to be consumed.
pub fn parse_date_time(
    text: &str,
    pattern: &str,
    date_sep: &str,
    time_sep: &str,
    locale: &Locale,
) -> Option<NaiveDateTime> {
    let mut scanner = Scanner {
        chars: text.chars().collect(),
        pos: 0,
    };
    let mut fields = Fields::default();

    for token in tokenize(pattern) {
        match token {
            Token::Year4 => fields.year = Some(scanner.digits(4, 4)? as i32),
            Token::Year2 => {
                let yy = scanner.digits(2, 2)? as i32;
                fields.year = Some(if yy <= TWO_DIGIT_YEAR_PIVOT { 2000 + yy } else { 1900 + yy });
            }
            Token::Month => fields.month = Some(scanner.digits(1, 2)?),
            Token::Month2 => fields.month = Some(scanner.digits(2, 2)?),
            Token::MonthAbbr => {
                fields.month = Some(scanner.name(&locale.month_abbr)? as u32 + 1);
            }
            Token::MonthName => {
                fields.month = Some(scanner.name(&locale.month_names)? as u32 + 1);
            }
            Token::Day => fields.day = Some(scanner.digits(1, 2)?),
            Token::Day2 => fields.day = Some(scanner.digits(2, 2)?),
            Token::DayAbbr => {
                scanner.name(&locale.day_abbr)?;
            }
            Token::DayName => {
                scanner.name(&locale.day_names)?;
            }
            Token::Hour24 { padded } => fields.hour = two_digits(&mut scanner, padded)?,
            Token::Hour12 { padded } => {
                fields.hour = two_digits(&mut scanner, padded)?;
                fields.twelve_hour = true;
            }
            Token::Minute { padded } => fields.minute = two_digits(&mut scanner, padded)?,
            Token::Second { padded } => fields.second = two_digits(&mut scanner, padded)?,
            Token::Fraction(n) => {
                let value = scanner.digits(n, n)?;
                fields.nanos = value * 10u32.pow((9 - n) as u32);
            }
            Token::AmPm => {
                let idx = scanner.name(&[locale.am, locale.pm])?;
                fields.pm = Some(idx == 1);
            }
            Token::Zone => fields.offset_minutes = scanner.zone()?,
            Token::DateSep => {
                if !scanner.literal(date_sep) {
                    return None;
                }
            }
            Token::TimeSep => {
                if !scanner.literal(time_sep) {
                    return None;
                }
            }
            Token::Literal(ch) => {
                if scanner.chars.get(scanner.pos) != Some(&ch) {
                    return None;
                }
                scanner.pos += 1;
            }
        }
    }
    if scanner.pos != scanner.chars.len() {
        return None;
    }
    build(fields)
}

fn two_digits(scanner: &mut Scanner, padded: bool) -> Option<u32> {
    if padded { scanner.digits(2, 2) } else { scanner.digits(1, 2) }
}

fn build(fields: Fields) -> Option<NaiveDateTime> {
    let date = if fields.year.is_some() || fields.month.is_some() || fields.day.is_some() {
        NaiveDate::from_ymd_opt(
            fields.year.unwrap_or(1),
            fields.month.unwrap_or(1),
            fields.day.unwrap_or(1),
        )?
    } else {
        NaiveDate::from_ymd_opt(1, 1, 1)?
    };

    let mut hour = fields.hour;
    if fields.twelve_hour {
        if !(1..=12).contains(&hour) {
            return None;
        }
        match fields.pm {
            Some(true) if hour < 12 => hour += 12,
            Some(false) if hour == 12 => hour = 0,
            _ => {}
        }
    } else if fields.pm == Some(true) && hour < 12 {
        hour += 12;
    }
    let time = NaiveTime::from_hms_nano_opt(hour, fields.minute, fields.second, fields.nanos)?;
    let local = NaiveDateTime::new(date, time);
    if fields.offset_minutes == 0 {
        Some(local)
    } else {
        local.checked_sub_signed(TimeDelta::try_minutes(fields.offset_minutes as i64)?)
    }
}

/// Convert a spreadsheet serial date (days since 1899-12-30) to a timestamp.
pub fn serial_to_date_time(days: f64) -> Option<NaiveDateTime> {
    if !days.is_finite() || !(0.0..=SERIAL_MAX).contains(&days) {
        return None;
    }
    let (y, m, d) = SERIAL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?.and_hms_opt(0, 0, 0)?;
    let millis = (days * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}

/// Parse a plain decimal number as a serial date.
pub fn parse_serial_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    serial_to_date_time(text.parse::<f64>().ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::locale::{DE, EN};
    use chrono::{Datelike, Timelike};

    fn parse(text: &str, pattern: &str) -> Option<NaiveDateTime> {
        parse_date_time(text, pattern, "/", ":", &EN)
    }

    #[test]
    fn test_iso_date() {
        let value = parse_date_time("2021-01-05", "yyyy/MM/dd", "-", ":", &EN).unwrap();
        assert_eq!((value.year(), value.month(), value.day()), (2021, 1, 5));
        assert!(parse_date_time("2021-1-5", "yyyy/MM/dd", "-", ":", &EN).is_none());
        assert!(parse_date_time("2021-1-5", "yyyy/M/d", "-", ":", &EN).is_some());
    }

    #[test]
    fn test_exact_match_required() {
        assert!(parse("01/05/2021x", "MM/dd/yyyy").is_none());
        assert!(parse("13/05/2021", "MM/dd/yyyy").is_none());
        assert!(parse("13/05/2021", "dd/MM/yyyy").is_some());
    }

    #[test]
    fn test_twelve_hour_clock() {
        let value = parse("1/2/2020 12:30 AM", "M/d/yyyy h:mm tt").unwrap();
        assert_eq!(value.hour(), 0);
        let value = parse("1/2/2020 3:05:09 pm", "M/d/yyyy h:mm:ss tt").unwrap();
        assert_eq!((value.hour(), value.minute(), value.second()), (15, 5, 9));
        assert!(parse("1/2/2020 13:00 PM", "M/d/yyyy h:mm tt").is_none());
    }

    #[test]
    fn test_named_months() {
        let value = parse("March 7, 2022", "MMMM d, yyyy").unwrap();
        assert_eq!(value.month(), 3);
        let value = parse_date_time("7. März 2022", "d. MMMM yyyy", "/", ":", &DE).unwrap();
        assert_eq!(value.month(), 3);
        assert!(parse("Foo 7, 2022", "MMM d, yyyy").is_none());
    }

    #[test]
    fn test_zone_and_fraction() {
        let value = parse("2020-05-01T10:00:00.250+02:00", "yyyy-MM-ddTHH:mm:ss.fffK").unwrap();
        assert_eq!(value.hour(), 8);
        assert_eq!(value.nanosecond(), 250_000_000);
        let value = parse("2020-05-01T10:00:00Z", "yyyy-MM-ddTHH:mm:ssK").unwrap();
        assert_eq!(value.hour(), 10);
    }

    #[test]
    fn test_time_only() {
        let value = parse("23:59:58", "HH:mm:ss").unwrap();
        assert_eq!(value.date(), NaiveDate::from_ymd_opt(1, 1, 1).unwrap());
        assert_eq!(value.second(), 58);
    }

    #[test]
    fn test_pattern_parts() {
        assert_eq!(pattern_parts("yyyy-MM-dd"), (true, false));
        assert_eq!(pattern_parts("HH:mm"), (false, true));
        assert_eq!(pattern_parts("yyyy-MM-dd HH:mm"), (true, true));
        assert!(is_named("dd MMM yyyy"));
        assert!(!is_named("dd/MM/yyyy"));
    }

    #[test]
    fn test_length_range() {
        assert_eq!(length_range("yyyy/MM/dd", "-", ":", &EN), (10, 10));
        assert_eq!(length_range("M/d/yyyy", "/", ":", &EN), (8, 10));
        assert_eq!(length_range("MMMM d, yyyy", "/", ":", &EN), (11, 18));
    }

    #[test]
    fn test_serial_date() {
        let value = serial_to_date_time(44197.0).unwrap();
        assert_eq!((value.year(), value.month(), value.day()), (2021, 1, 1));
        let value = parse_serial_date("44197.5").unwrap();
        assert_eq!(value.hour(), 12);
        assert!(parse_serial_date("-1").is_none());
        assert!(parse_serial_date("abc").is_none());
    }
}

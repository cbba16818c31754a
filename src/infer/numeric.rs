//! Number parsing with configurable decimal and group separators.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Characters accepted as decimal separators.
pub const DECIMAL_CANDIDATES: [char; 2] = ['.', ','];

/// Characters accepted as group (thousands) separators.
pub const GROUP_CANDIDATES: [char; 5] = [',', '.', ' ', '\'', '\u{a0}'];

/// A successfully parsed number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedNumber {
    /// Fixed point value.
    Decimal(Decimal),
    /// Value written with an exponent or out of the fixed point range.
    Double(f64),
}

impl ParsedNumber {
    /// The value as an `i64` when it is an exact whole number.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ParsedNumber::Decimal(d) if d.fract().is_zero() => d.to_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParsedNumber::Decimal(d) => d.to_f64(),
            ParsedNumber::Double(f) => Some(*f),
        }
    }
}

/// Parse a number such as `-1,234.50`, `(12)`, `45 %` or `1.5e3`.
///
/// Parentheses mark a negative value; a `%` or `‰` suffix scales it. Group
/// separators are only accepted before the decimal separator, and every group
/// after the first must have exactly three digits.
pub fn parse_number(text: &str, decimal: char, group: Option<char>) -> Option<ParsedNumber> {
    let mut body = text.trim();
    if body.is_empty() {
        return None;
    }

    let mut negative = false;
    if let Some(inner) = body.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
        negative = true;
        body = inner.trim();
    }

    let mut scale = 0u32;
    if let Some(rest) = body.strip_suffix('%') {
        scale = 2;
        body = rest.trim_end();
    } else if let Some(rest) = body.strip_suffix('‰') {
        scale = 3;
        body = rest.trim_end();
    }

    if let Some(rest) = body.strip_prefix('-') {
        if negative {
            return None;
        }
        negative = true;
        body = rest;
    } else if let Some(rest) = body.strip_prefix('+') {
        body = rest;
    }

    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };

    let (int_part, frac_part) = match mantissa.find(decimal) {
        Some(idx) => (&mantissa[..idx], Some(&mantissa[idx + decimal.len_utf8()..])),
        None => (mantissa, None),
    };

    let digits = integer_digits(int_part, group)?;
    let mut normalized = String::with_capacity(mantissa.len() + 2);
    if negative {
        normalized.push('-');
    }
    normalized.push_str(if digits.is_empty() { "0" } else { &digits });
    if let Some(frac) = frac_part {
        if frac.is_empty() && digits.is_empty() {
            return None;
        }
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if !frac.is_empty() {
            normalized.push('.');
            normalized.push_str(frac);
        }
    } else if digits.is_empty() {
        return None;
    }

    if let Some(exp) = exponent {
        let exp: i32 = exp.parse().ok()?;
        let value: f64 = normalized.parse().ok()?;
        let value = value * 10f64.powi(exp.checked_sub(scale as i32)?);
        return value.is_finite().then_some(ParsedNumber::Double(value));
    }

    match Decimal::from_str(&normalized) {
        Ok(mut value) => {
            if scale > 0 {
                value = value.checked_div(Decimal::from(10u32.pow(scale)))?;
            }
            Some(ParsedNumber::Decimal(value))
        }
        Err(_) => {
            let value: f64 = normalized.parse().ok()?;
            let value = value / 10f64.powi(scale as i32);
            value.is_finite().then_some(ParsedNumber::Double(value))
        }
    }
}

fn integer_digits(int_part: &str, group: Option<char>) -> Option<String> {
    let Some(group) = group.filter(|g| int_part.contains(*g)) else {
        return int_part
            .bytes()
            .all(|b| b.is_ascii_digit())
            .then(|| int_part.to_string());
    };
    let mut digits = String::with_capacity(int_part.len());
    for (idx, chunk) in int_part.split(group).enumerate() {
        let valid_len = if idx == 0 {
            (1..=3).contains(&chunk.len())
        } else {
            chunk.len() == 3
        };
        if !valid_len || !chunk.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.push_str(chunk);
    }
    Some(digits)
}

/// Separator pairs worth trying for these samples, in the order given by the
/// preferred decimal separator.
///
/// Apart from the preferred decimal separator, only separators that actually
/// occur in the samples are proposed.
pub fn separator_candidates<S: AsRef<str>>(
    samples: &[S],
    preferred_decimal: char,
) -> Vec<(char, Option<char>)> {
    let seen = |c: char| samples.iter().any(|s| s.as_ref().contains(c));

    // the preferred separator goes first even when unseen, it then only
    // stands for whole numbers
    let mut decimals = vec![preferred_decimal];
    decimals.extend(
        DECIMAL_CANDIDATES
            .iter()
            .copied()
            .filter(|&c| c != preferred_decimal && seen(c)),
    );

    let groups: Vec<char> = GROUP_CANDIDATES.iter().copied().filter(|&c| seen(c)).collect();

    let mut pairs = Vec::new();
    for &decimal in &decimals {
        pairs.push((decimal, None));
        for &group in groups.iter().filter(|&&g| g != decimal) {
            pairs.push((decimal, Some(group)));
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(text: &str) -> Decimal {
        Decimal::from_str(text).unwrap()
    }

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_number("42", '.', None), Some(ParsedNumber::Decimal(dec("42"))));
        assert_eq!(parse_number("-3.5", '.', None), Some(ParsedNumber::Decimal(dec("-3.5"))));
        assert_eq!(parse_number(".5", '.', None), Some(ParsedNumber::Decimal(dec("0.5"))));
        assert!(parse_number("1.2.3", '.', None).is_none());
        assert!(parse_number("abc", '.', None).is_none());
        assert!(parse_number("-", '.', None).is_none());
    }

    #[test]
    fn test_group_separators() {
        assert_eq!(
            parse_number("1,234,567.25", '.', Some(',')),
            Some(ParsedNumber::Decimal(dec("1234567.25")))
        );
        assert_eq!(
            parse_number("1.234,5", ',', Some('.')),
            Some(ParsedNumber::Decimal(dec("1234.5")))
        );
        assert!(parse_number("12,34", '.', Some(',')).is_none());
        assert!(parse_number("1,234", '.', None).is_none());
    }

    #[test]
    fn test_percent_and_parentheses() {
        assert_eq!(parse_number("45%", '.', None), Some(ParsedNumber::Decimal(dec("0.45"))));
        assert_eq!(parse_number("5 ‰", '.', None), Some(ParsedNumber::Decimal(dec("0.005"))));
        assert_eq!(parse_number("(12)", '.', None), Some(ParsedNumber::Decimal(dec("-12"))));
        assert!(parse_number("(-12)", '.', None).is_none());
    }

    #[test]
    fn test_exponent() {
        assert_eq!(parse_number("1.5e3", '.', None), Some(ParsedNumber::Double(1500.0)));
        assert!(parse_number("1.5e", '.', None).is_none());
    }

    #[test]
    fn test_exponent_at_integer_limits() {
        assert!(parse_number("1e-2147483648%", '.', None).is_none());
        assert!(parse_number("1e-2147483648‰", '.', None).is_none());
        assert_eq!(parse_number("1e-2147483648", '.', None), Some(ParsedNumber::Double(0.0)));
        assert!(parse_number("1e2147483647", '.', None).is_none());
    }

    #[test]
    fn test_as_integer() {
        assert_eq!(parse_number("7.0", '.', None).unwrap().as_integer(), Some(7));
        assert_eq!(parse_number("7.5", '.', None).unwrap().as_integer(), None);
    }

    #[test]
    fn test_separator_candidates() {
        let samples = ["1,5", "2,25"];
        assert_eq!(
            separator_candidates(&samples, '.'),
            vec![('.', None), ('.', Some(',')), (',', None)]
        );
        let samples = ["1,234.5", "7"];
        let pairs = separator_candidates(&samples, '.');
        assert_eq!(pairs[0], ('.', None));
        assert!(pairs.contains(&('.', Some(','))));
        assert!(pairs.contains(&(',', Some('.'))));
        assert_eq!(separator_candidates(&["12", "7"], '.'), vec![('.', None)]);
    }
}

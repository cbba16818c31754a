use crate::metadata::Quote;

/// Lines inspected.
pub const QUOTE_LINES: usize = 30;

/// Count double and single quotes at the start of fields.
///
/// A field that also ends with the same quote counts twice. The delimiter
/// split is naive, so quoted delimiters only shift which field starts where.
pub fn guess_quote(text: &str, delimiter: Option<char>, comment_prefix: &str) -> Quote {
    let mut double = 0usize;
    let mut single = 0usize;

    let lines = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter(|l| comment_prefix.is_empty() || !l.starts_with(comment_prefix))
        .take(QUOTE_LINES);
    for line in lines {
        let fields: Vec<&str> = match delimiter {
            Some(d) => line.split(d).collect(),
            None => vec![line],
        };
        for field in fields {
            let field = field.trim();
            for (quote, count) in [('"', &mut double), ('\'', &mut single)] {
                if field.starts_with(quote) {
                    *count += 1;
                    if field.len() > 1 && field.ends_with(quote) {
                        *count += 1;
                    }
                }
            }
        }
    }

    log::debug!("quote evidence: double {double}, single {single}");
    match (double, single) {
        (0, 0) => Quote::None,
        (d, s) if s > d => Quote::Some('\''),
        _ => Quote::Some('"'),
    }
}

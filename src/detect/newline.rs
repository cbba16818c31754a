use crate::metadata::NewLine;

/// Characters inspected.
pub const NEWLINE_CHARS: usize = 8192;

const RECORD_SEPARATOR: char = '\u{1e}';
const UNIT_SEPARATOR: char = '\u{1f}';

/// Pick the most frequent record separator outside of quotes.
///
/// Ties go to CRLF, then LF, CR, LFCR and the two C0 separators.
pub fn guess_newline(text: &str, quote: Option<char>) -> NewLine {
    let mut counts = [0usize; 6];
    let mut in_quotes = false;
    let mut chars = text.chars().take(NEWLINE_CHARS).peekable();

    while let Some(ch) = chars.next() {
        if Some(ch) == quote {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        match ch {
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                counts[0] += 1;
            }
            '\r' => counts[2] += 1,
            '\n' if chars.peek() == Some(&'\r') => {
                chars.next();
                counts[3] += 1;
            }
            '\n' => counts[1] += 1,
            RECORD_SEPARATOR => counts[4] += 1,
            UNIT_SEPARATOR => counts[5] += 1,
            _ => {}
        }
    }

    const STYLES: [NewLine; 6] = [
        NewLine::CrLf,
        NewLine::Lf,
        NewLine::Cr,
        NewLine::LfCr,
        NewLine::RecordSeparator,
        NewLine::UnitSeparator,
    ];
    let (idx, max) = counts
        .iter()
        .enumerate()
        .fold((0, 0), |acc, (idx, &n)| if n > acc.1 { (idx, n) } else { acc });
    let style = if max == 0 { NewLine::None } else { STYLES[idx] };
    log::debug!("newline {style} (counts {counts:?})");
    style
}

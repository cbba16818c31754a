/// True if the text starts like a JSON object or array.
///
/// `{` has to be followed by a key or `}`, `[` by an object, a string, a
/// nested array or `]`.
pub fn looks_like_json(text: &str) -> bool {
    let mut chars = text
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !c.is_whitespace());
    match (chars.next(), chars.next()) {
        (Some('{'), Some('"' | '}')) => true,
        (Some('['), Some('{' | '"' | ']' | '[')) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json() {
        assert!(looks_like_json("{\"a\": 1}"));
        assert!(looks_like_json("\u{feff}  [\n  {\"a\": 1}]"));
        assert!(looks_like_json("[]"));
    }

    #[test]
    fn test_not_json() {
        assert!(!looks_like_json("a,b\n1,2"));
        assert!(!looks_like_json("[section]\nkey=value"));
        assert!(!looks_like_json("{name},{city}"));
        assert!(!looks_like_json(""));
    }
}

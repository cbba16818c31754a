/// Prefixes recognised as comment markers.
pub const COMMENT_PREFIXES: [&str; 2] = ["#", "//"];

/// Non-blank lines inspected.
const COMMENT_LINES: usize = 50;

/// Propose a comment prefix when the first line starts with one and at least
/// one later line does not.
pub fn guess_comment_prefix(text: &str) -> Option<&'static str> {
    let lines: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(COMMENT_LINES)
        .collect();
    let (first, rest) = lines.split_first()?;
    let prefix = COMMENT_PREFIXES
        .into_iter()
        .find(|p| first.trim_start().starts_with(p))?;
    let found = rest.iter().any(|l| !l.trim_start().starts_with(prefix));
    log::debug!("comment prefix '{prefix}' {}", if found { "accepted" } else { "rejected" });
    found.then_some(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_comments() {
        assert_eq!(guess_comment_prefix("# exported\n# v2\na,b\n1,2\n"), Some("#"));
        assert_eq!(guess_comment_prefix("// note\na;b\n"), Some("//"));
    }

    #[test]
    fn test_no_comment() {
        assert_eq!(guess_comment_prefix("a,b\n# not leading\n"), None);
        assert_eq!(guess_comment_prefix("#1\n#2\n#3\n"), None);
        assert_eq!(guess_comment_prefix(""), None);
    }
}

//! Built-in true/false literal pairs.

/// True/false literal pairs in several languages, most common first.
///
/// Digits are deliberately absent: a `0`/`1` column stays numeric.
pub const BOOLEAN_PAIRS: &[(&str, &str)] = &[
    ("True", "False"),
    ("Yes", "No"),
    ("Y", "N"),
    ("T", "F"),
    ("On", "Off"),
    ("Active", "Inactive"),
    ("Enabled", "Disabled"),
    ("Checked", "Unchecked"),
    ("Positive", "Negative"),
    ("Pass", "Fail"),
    ("Valid", "Invalid"),
    ("Wahr", "Falsch"),
    ("Ja", "Nein"),
    ("J", "N"),
    ("Richtig", "Falsch"),
    ("Vrai", "Faux"),
    ("Oui", "Non"),
    ("O", "N"),
    ("Verdadero", "Falso"),
    ("Sí", "No"),
    ("Si", "No"),
    ("S", "N"),
    ("Vero", "Falso"),
    ("Verdadeiro", "Falso"),
    ("Sim", "Não"),
    ("Sim", "Nao"),
    ("Waar", "Onwaar"),
    ("Ja", "Nee"),
    ("Sant", "Falskt"),
    ("Ja", "Nej"),
    ("Sand", "Falsk"),
    ("Sann", "Usann"),
    ("Tosi", "Epätosi"),
    ("Kyllä", "Ei"),
    ("Prawda", "Fałsz"),
    ("Tak", "Nie"),
    ("Pravda", "Nepravda"),
    ("Ano", "Ne"),
    ("Igaz", "Hamis"),
    ("Igen", "Nem"),
    ("Adevărat", "Fals"),
    ("Da", "Nu"),
    ("Истина", "Ложь"),
    ("Да", "Нет"),
    ("Doğru", "Yanlış"),
    ("Evet", "Hayır"),
    ("Αληθής", "Ψευδής"),
    ("Ναι", "Όχι"),
    ("Benar", "Salah"),
    ("Ya", "Tidak"),
    ("Đúng", "Sai"),
    ("Có", "Không"),
    ("真", "假"),
    ("是", "否"),
    ("はい", "いいえ"),
    ("예", "아니요"),
    ("Totuus", "Valhe"),
    ("Rigtigt", "Forkert"),
    ("Riktig", "Feil"),
];

/// The literal pair every value belongs to, preferring the caller's override.
///
/// All values have to be one of the two literals of the same pair
/// (case-insensitive); a mixed or unknown value yields `None`.
pub fn matching_pair<S: AsRef<str>>(
    values: &[S],
    custom: Option<(&str, &str)>,
) -> Option<(String, String)> {
    let fits = |(t, f): (&str, &str)| {
        values.iter().all(|v| {
            let v = v.as_ref().trim();
            !v.is_empty() && (v.eq_ignore_case(t) || v.eq_ignore_case(f))
        })
    };
    custom
        .into_iter()
        .chain(BOOLEAN_PAIRS.iter().copied())
        .find(|&pair| fits(pair))
        .map(|(t, f)| (t.to_string(), f.to_string()))
}

/// Interpret one value with the given literals, falling back to every built-in pair.
pub fn parse_boolean(value: &str, true_literal: &str, false_literal: &str) -> Option<bool> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if value.eq_ignore_case(true_literal) {
        return Some(true);
    }
    if value.eq_ignore_case(false_literal) {
        return Some(false);
    }
    BOOLEAN_PAIRS.iter().find_map(|(t, f)| {
        if value.eq_ignore_case(t) {
            Some(true)
        } else if value.eq_ignore_case(f) {
            Some(false)
        } else {
            None
        }
    })
}

trait EqIgnoreCase {
    fn eq_ignore_case(&self, other: &str) -> bool;
}

impl EqIgnoreCase for str {
    fn eq_ignore_case(&self, other: &str) -> bool {
        if self.is_ascii() && other.is_ascii() {
            return self.eq_ignore_ascii_case(other);
        }
        self.chars()
            .flat_map(char::to_lowercase)
            .eq(other.chars().flat_map(char::to_lowercase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_count() {
        let literals: usize = BOOLEAN_PAIRS
            .iter()
            .map(|(t, f)| usize::from(!t.is_empty()) + usize::from(!f.is_empty()))
            .sum();
        assert_eq!(literals, BOOLEAN_PAIRS.len() * 2);
        assert!(literals >= 115);
    }

    #[test]
    fn test_matching_pair() {
        assert_eq!(
            matching_pair(&["true", "false", "TRUE"], None),
            Some(("True".to_string(), "False".to_string()))
        );
        assert_eq!(
            matching_pair(&["ja", "nein"], None),
            Some(("Ja".to_string(), "Nein".to_string()))
        );
        assert_eq!(matching_pair(&["yes", "false"], None), None);
        assert_eq!(matching_pair(&["1", "0"], None), None);
        assert_eq!(
            matching_pair(&["ok", "bad"], Some(("OK", "Bad"))),
            Some(("OK".to_string(), "Bad".to_string()))
        );
    }

    #[test]
    fn test_parse_boolean() {
        assert_eq!(parse_boolean("Yes", "True", "False"), Some(true));
        assert_eq!(parse_boolean("falsch", "True", "False"), Some(false));
        assert_eq!(parse_boolean("OK", "OK", "Bad"), Some(true));
        assert_eq!(parse_boolean("maybe", "True", "False"), None);
    }
}

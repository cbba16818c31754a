//! Candidate date/time pattern table.
//!
//! The table is the cross product of the date layouts below with every time
//! suffix, followed by the time-only patterns. Ambiguous day/month layouts are
//! ordered by [`DatePreference`].

use std::sync::LazyLock;

use crate::sample::DatePreference;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// Year first, never ambiguous.
    Ymd,
    Mdy,
    Dmy,
    /// Named months or partial dates.
    Other,
}

const DATE_LAYOUTS: &[(&str, Layout)] = &[
    ("yyyy/MM/dd", Layout::Ymd),
    ("yyyy/M/d", Layout::Ymd),
    ("yyyyMMdd", Layout::Ymd),
    ("yy/MM/dd", Layout::Ymd),
    ("yyyy/MMM/dd", Layout::Ymd),
    ("MM/dd/yyyy", Layout::Mdy),
    ("M/d/yyyy", Layout::Mdy),
    ("MM/dd/yy", Layout::Mdy),
    ("M/d/yy", Layout::Mdy),
    ("MMM/dd/yyyy", Layout::Mdy),
    ("MMM d, yyyy", Layout::Mdy),
    ("MMMM d, yyyy", Layout::Mdy),
    ("dddd, MMMM d, yyyy", Layout::Mdy),
    ("dd/MM/yyyy", Layout::Dmy),
    ("d/M/yyyy", Layout::Dmy),
    ("dd/MM/yy", Layout::Dmy),
    ("d/M/yy", Layout::Dmy),
    ("dd/MMM/yyyy", Layout::Dmy),
    ("d/MMM/yyyy", Layout::Dmy),
    ("dd/MMM/yy", Layout::Dmy),
    ("d MMMM yyyy", Layout::Dmy),
    ("dd MMMM yyyy", Layout::Dmy),
    ("d. MMMM yyyy", Layout::Dmy),
    ("ddd, dd MMM yyyy", Layout::Dmy),
    ("dddd, d MMMM yyyy", Layout::Dmy),
    ("MM/yyyy", Layout::Other),
    ("yyyy/MM", Layout::Other),
    ("MMM yyyy", Layout::Other),
];

const TIME_SUFFIXES: &[&str] = &[
    "",
    " HH:mm:ss",
    " HH:mm",
    " H:mm:ss",
    " H:mm",
    " HH:mm:ss.fff",
    " hh:mm:ss tt",
    " h:mm:ss tt",
    " hh:mm tt",
    " h:mm tt",
    "THH:mm:ss",
    "THH:mm:ss.fff",
    "THH:mm:ssK",
    "THH:mm:ss.fffK",
];

const TIME_ONLY: &[&str] = &[
    "HH:mm:ss",
    "HH:mm",
    "H:mm:ss",
    "H:mm",
    "HH:mm:ss.fff",
    "hh:mm:ss tt",
    "h:mm:ss tt",
    "hh:mm tt",
    "h:mm tt",
];

static MDY_TABLE: LazyLock<Vec<String>> = LazyLock::new(|| compose(DatePreference::MdyFormat));
static DMY_TABLE: LazyLock<Vec<String>> = LazyLock::new(|| compose(DatePreference::DmyFormat));

/// Every candidate pattern, most common first.
pub fn date_formats(preference: DatePreference) -> &'static [String] {
    match preference {
        DatePreference::MdyFormat => &MDY_TABLE,
        DatePreference::DmyFormat => &DMY_TABLE,
    }
}

fn compose(preference: DatePreference) -> Vec<String> {
    let (first, second) = if preference.is_dmy() {
        (Layout::Dmy, Layout::Mdy)
    } else {
        (Layout::Mdy, Layout::Dmy)
    };
    let mut table = Vec::with_capacity(DATE_LAYOUTS.len() * TIME_SUFFIXES.len() + TIME_ONLY.len());
    for layout in [Layout::Ymd, first, second, Layout::Other] {
        for (date, _) in DATE_LAYOUTS.iter().filter(|(_, l)| *l == layout) {
            for suffix in TIME_SUFFIXES {
                // ISO style `T` suffixes only follow year-first layouts
                if suffix.starts_with('T') && layout != Layout::Ymd {
                    continue;
                }
                table.push(format!("{date}{suffix}"));
            }
        }
    }
    table.extend(TIME_ONLY.iter().map(|t| (*t).to_string()));
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_size() {
        let table = date_formats(DatePreference::MdyFormat);
        assert!(table.len() > 300, "only {} patterns", table.len());
        assert_eq!(table[0], "yyyy/MM/dd");
    }

    #[test]
    fn test_preference_order() {
        let mdy = date_formats(DatePreference::MdyFormat);
        let dmy = date_formats(DatePreference::DmyFormat);
        let pos = |table: &[String], p: &str| table.iter().position(|f| f == p).unwrap();
        assert!(pos(mdy, "MM/dd/yyyy") < pos(mdy, "dd/MM/yyyy"));
        assert!(pos(dmy, "dd/MM/yyyy") < pos(dmy, "MM/dd/yyyy"));
        assert_eq!(mdy.len(), dmy.len());
    }
}

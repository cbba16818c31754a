//! Culture data used for named-date matching and numeric separators.

/// Month and day names, AM/PM designators and number separators of one culture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    pub name: &'static str,
    pub month_names: [&'static str; 12],
    pub month_abbr: [&'static str; 12],
    /// Sunday first.
    pub day_names: [&'static str; 7],
    pub day_abbr: [&'static str; 7],
    pub am: &'static str,
    pub pm: &'static str,
    pub decimal_separator: char,
    pub group_separator: char,
}

pub static EN: Locale = Locale {
    name: "en",
    month_names: [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ],
    month_abbr: [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ],
    day_names: [
        "Sunday",
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
    ],
    day_abbr: ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
    am: "AM",
    pm: "PM",
    decimal_separator: '.',
    group_separator: ',',
};

pub static DE: Locale = Locale {
    name: "de",
    month_names: [
        "Januar",
        "Februar",
        "März",
        "April",
        "Mai",
        "Juni",
        "Juli",
        "August",
        "September",
        "Oktober",
        "November",
        "Dezember",
    ],
    month_abbr: [
        "Jan", "Feb", "Mär", "Apr", "Mai", "Jun", "Jul", "Aug", "Sep", "Okt", "Nov", "Dez",
    ],
    day_names: [
        "Sonntag",
        "Montag",
        "Dienstag",
        "Mittwoch",
        "Donnerstag",
        "Freitag",
        "Samstag",
    ],
    day_abbr: ["So", "Mo", "Di", "Mi", "Do", "Fr", "Sa"],
    am: "AM",
    pm: "PM",
    decimal_separator: ',',
    group_separator: '.',
};

pub static FR: Locale = Locale {
    name: "fr",
    month_names: [
        "janvier",
        "février",
        "mars",
        "avril",
        "mai",
        "juin",
        "juillet",
        "août",
        "septembre",
        "octobre",
        "novembre",
        "décembre",
    ],
    month_abbr: [
        "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
        "déc.",
    ],
    day_names: [
        "dimanche", "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi",
    ],
    day_abbr: ["dim.", "lun.", "mar.", "mer.", "jeu.", "ven.", "sam."],
    am: "AM",
    pm: "PM",
    decimal_separator: ',',
    group_separator: ' ',
};

pub static ES: Locale = Locale {
    name: "es",
    month_names: [
        "enero",
        "febrero",
        "marzo",
        "abril",
        "mayo",
        "junio",
        "julio",
        "agosto",
        "septiembre",
        "octubre",
        "noviembre",
        "diciembre",
    ],
    month_abbr: [
        "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
    ],
    day_names: [
        "domingo",
        "lunes",
        "martes",
        "miércoles",
        "jueves",
        "viernes",
        "sábado",
    ],
    day_abbr: ["dom", "lun", "mar", "mié", "jue", "vie", "sáb"],
    am: "a. m.",
    pm: "p. m.",
    decimal_separator: ',',
    group_separator: '.',
};

impl Locale {
    /// Look up a built-in locale by its two-letter name.
    pub fn by_name(name: &str) -> Option<&'static Locale> {
        [&EN, &DE, &FR, &ES]
            .into_iter()
            .find(|locale| locale.name.eq_ignore_ascii_case(name))
    }

    /// Shortest and longest character count of the given name list.
    pub fn name_lengths(names: &[&str]) -> (usize, usize) {
        names.iter().map(|n| n.chars().count()).fold(
            (usize::MAX, 0),
            |(min, max), len| (min.min(len), max.max(len)),
        )
    }
}

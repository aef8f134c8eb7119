//! Russian display formatting for dates, qualification groups and names.

use chrono::{Datelike, NaiveDate};

/// Month names in the genitive case, January first.
pub const MONTHS_GENITIVE: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

/// Render a date as `«3» декабря 2024`. The day is not zero-padded.
pub fn format_date(date: NaiveDate) -> String {
    let month = MONTHS_GENITIVE[date.month0() as usize];
    format!("«{}» {} {}", date.day(), month, date.year())
}

/// Render a qualification group, e.g. `4 гр. 1000 В и выше`.
///
/// Groups 3 and up cover installations above 1000 V, group 2 only up to it.
pub fn format_group(code: u8) -> String {
    let range = if code >= 3 { "и выше" } else { "и ниже" };
    format!("{code} гр. 1000 В {range}")
}

/// Capitalize the first letter of each word and lowercase the rest.
///
/// A word starts at any letter not preceded by another letter, so
/// `"анна-мария"` becomes `"Анна-Мария"`.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_alphabetic = false;

    for c in name.trim().chars() {
        if c.is_alphabetic() {
            if prev_alphabetic {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alphabetic = true;
        } else {
            out.push(c);
            prev_alphabetic = false;
        }
    }

    out
}

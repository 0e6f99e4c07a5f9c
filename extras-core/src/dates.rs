//! Statement date grammars. Each bank prints its own raw form; everything
//! converges on ISO `YYYY-MM-DD`.

use chrono::NaiveDate;

/// Month number for a full lowercase Romanian month name.
/// Matching is case-insensitive.
pub fn romanian_month(name: &str) -> Option<u32> {
    match name.to_lowercase().as_str() {
        "ianuarie" => Some(1),
        "februarie" => Some(2),
        "martie" => Some(3),
        "aprilie" => Some(4),
        "mai" => Some(5),
        "iunie" => Some(6),
        "iulie" => Some(7),
        "august" => Some(8),
        "septembrie" => Some(9),
        "octombrie" => Some(10),
        "noiembrie" => Some(11),
        "decembrie" => Some(12),
        _ => None,
    }
}

/// Month number for the abbreviated Romanian month form ("ian".."dec").
pub fn romanian_month_abbrev(abbrev: &str) -> Option<u32> {
    match abbrev.to_lowercase().as_str() {
        "ian" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "mai" => Some(5),
        "iun" => Some(6),
        "iul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}

fn iso(day: &str, month: u32, year: &str) -> Option<String> {
    let day: u32 = day.trim().parse().ok()?;
    let year: i32 = year.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.to_string())
}

/// `DD/MM/YYYY` tokens (already split) to ISO.
pub fn iso_from_slash(day: &str, month: &str, year: &str) -> Option<String> {
    let month: u32 = month.trim().parse().ok()?;
    iso(day, month, year)
}

/// `DD <monthname> YYYY` with a full Romanian month name to ISO.
pub fn iso_from_ro_long(day: &str, month_name: &str, year: &str) -> Option<String> {
    iso(day, romanian_month(month_name)?, year)
}

/// `DD <abbrev>. YYYY` with an abbreviated Romanian month to ISO.
pub fn iso_from_ro_abbrev(day: &str, abbrev: &str, year: &str) -> Option<String> {
    iso(day, romanian_month_abbrev(abbrev)?, year)
}

//! Locale-aware numeral parsing shared by every statement format.

/// Parse a numeral written in either European ("1.234,56") or US
/// ("1,234.56") convention into a decimal value.
///
/// When both separators are present, the one appearing later in the string
/// is the decimal separator and the other is stripped as a thousands
/// separator; a lone comma is treated as the European decimal separator.
/// Unparseable input yields `f64::NAN` rather than an error.
pub fn parse_locale_number(raw: &str) -> f64 {
    let s = raw.trim();

    let normalized = match (s.rfind(','), s.rfind('.')) {
        // European style: "1.234,56"
        (Some(comma), Some(dot)) if comma > dot => s.replace('.', "").replace(',', "."),
        // US style: "1,234.56"
        (Some(_), Some(_)) => s.replace(',', ""),
        // Comma only: assume it is the decimal separator
        (Some(_), None) => s.replace(',', "."),
        // Dot only or plain number
        _ => s.to_string(),
    };

    normalized.parse::<f64>().unwrap_or(f64::NAN)
}

//! Per-bank statement parsers behind a common capability trait.

pub mod bt;
pub mod ing;
pub mod rev;

use anyhow::Result;
use extras_core::parse_locale_number;
use extras_core::types::{BankId, StatementDates};
use regex::Regex;

use crate::types::RawTransaction;

pub use bt::BtParser;
pub use ing::IngParser;
pub use rev::RevParser;

/// Capability set every statement layout implements. The detector and the
/// assembler depend only on this trait, so adding a format never touches
/// shared logic.
pub trait StatementParser: Send + Sync {
    fn bank(&self) -> BankId;

    /// Signature check on the raw text: true when this layout's unique
    /// boilerplate (registration numbers, regulator codes) is present.
    fn identify(&self, text: &str) -> bool;

    fn extract_currency(&self, text: &str) -> Option<String>;

    fn extract_iban(&self, text: &str) -> Option<String> {
        find_iban(text)
    }

    fn extract_initial_balance(&self, text: &str, currency: &str) -> Option<f64>;

    fn extract_final_balance(&self, text: &str, currency: &str) -> Option<f64>;

    fn extract_statement_dates(&self, text: &str) -> StatementDates;

    /// Split the line stream into discrete transactions. Best-effort:
    /// malformed rows degrade field-by-field rather than failing the parse.
    fn extract_transactions(&self, text: &str, currency: &str) -> Result<Vec<RawTransaction>>;
}

/// Trimmed, non-empty lines of the extracted text layer.
pub(crate) fn clean_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

/// First IBAN-shaped token anywhere in the text.
pub fn find_iban(text: &str) -> Option<String> {
    let re = Regex::new(r"[A-Z]{2}\d{2}[A-Z0-9]{12,30}").ok()?;
    re.find(text).map(|m| m.as_str().to_string())
}

/// Parse a raw amount string, degrading to `None` instead of `NAN`.
pub(crate) fn amount_value(raw: &str) -> Option<f64> {
    let value = parse_locale_number(raw);
    (!value.is_nan()).then_some(value)
}

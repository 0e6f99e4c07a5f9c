//! Banca Transilvania statement parser (text layer).
//!
//! Expected extracted-text shape:
//!   01/02/2024
//!   Plata la POS 123,45
//!   TID 69812101 MEGA IMAGE 123 CLUJ-NAPOCA RO
//!   REF: 2402010731157717
//!
//! Dates print on their own row above the first header of the day and are
//! omitted for same-day runs, so the last seen date carries forward.

use anyhow::Result;
use extras_core::dates;
use extras_core::types::{BankId, StatementDates, TxnKind};
use regex::{Regex, RegexBuilder};

use crate::parsers::{clean_lines, StatementParser};
use crate::types::RawTransaction;

/// Boilerplate strings unique to BT statements (trade-registry and
/// regulator identifiers).
const BT_SIGNATURES: [&str; 3] = [
    "J12 / 4155 / 1993 • R.B. - P.J.R - 12 - 019",
    "J12/4155/1993 • R.B. - P.J.R-12-019",
    "Nr. Inreg. Registrul Comertului: J1993004155124",
];

/// Transaction header phrases in match-priority order; the first phrase
/// the line starts with wins.
const BT_HEADER_PHRASES: [&str; 14] = [
    "Plata la POS",
    "Retragere de numerar de la ATM BT",
    "Comision incasare OP",
    "Incasare ",
    "Incasare OP",
    "Rambursare principal credit",
    "Dobanda credit",
    "Abonament BT 24",
    "Depunere numerar ATM",
    "Plata OP intra - canal electronic",
    "365",
    "P2P BTPay",
    "Plata valutara intra",
    "Transfer intern",
];

const SKIP_START: &str = "Clasificare BT";
const SKIP_END: &str = "DataDescriere";

struct OpenTxn {
    name: String,
    date: Option<String>,
    amount: Option<String>,
    kind: TxnKind,
    details: Vec<String>,
    reference: Option<String>,
    location: Option<String>,
}

impl OpenTxn {
    /// Close the accumulator: settle the amount from detail lines when the
    /// header never carried one, and extract the terminal location from
    /// the joined details.
    fn finish(
        mut self,
        currency: &str,
        value_line_re: &Regex,
        amount_re: &Regex,
        location_re: &Regex,
    ) -> RawTransaction {
        if self.amount.is_none() {
            self.amount = extract_amount_from_details(&self.details, value_line_re, amount_re);
        }

        let joined = self.details.join(" ");
        if let Some(caps) = location_re.captures(&joined) {
            self.location = Some(caps[1].trim().to_string());
        }

        RawTransaction {
            name: self.name,
            date: self.date,
            amount: self.amount,
            currency: currency.to_string(),
            kind: self.kind,
            details: self.details,
            reference: self.reference,
            location: self.location,
        }
    }
}

/// An explicit "valoare tranzactie" marker outranks any amount-shaped
/// token found on a detail line.
fn extract_amount_from_details(
    details: &[String],
    value_line_re: &Regex,
    amount_re: &Regex,
) -> Option<String> {
    for line in details {
        if let Some(caps) = value_line_re.captures(line) {
            return Some(caps[1].to_string());
        }
    }
    for line in details {
        for token in line.split_whitespace() {
            if amount_re.is_match(token) {
                return Some(token.to_string());
            }
        }
    }
    None
}

pub struct BtParser;

impl StatementParser for BtParser {
    fn bank(&self) -> BankId {
        BankId::Bt
    }

    fn identify(&self, text: &str) -> bool {
        BT_SIGNATURES.iter().any(|s| text.contains(s))
    }

    fn extract_currency(&self, text: &str) -> Option<String> {
        let re = RegexBuilder::new(r"([A-Z]{3})Cod IBAN:")
            .case_insensitive(true)
            .build()
            .ok()?;
        for line in clean_lines(text) {
            if let Some(caps) = re.captures(line) {
                return Some(caps[1].to_uppercase());
            }
        }
        None
    }

    fn extract_initial_balance(&self, text: &str, _currency: &str) -> Option<f64> {
        let re = Regex::new(r"SOLD ANTERIOR\s*\n(\d{1,3}(?:,\d{3})*(?:\.\d{2})?)").ok()?;
        let caps = re.captures(text)?;
        caps[1].replace(',', "").parse::<f64>().ok()
    }

    fn extract_final_balance(&self, text: &str, _currency: &str) -> Option<f64> {
        let re = Regex::new(r"SOLD FINAL CONT\s*\n(\d{1,3}(?:[.,]\d{3})*(?:[.,]\d{2})?)").ok()?;
        let caps = re.captures(text)?;
        // the row prints cents behind unstable punctuation: strip both
        // separators and shift two places
        let cents = caps[1].replace(',', "").replace('.', "");
        cents.parse::<f64>().ok().map(|v| v / 100.0)
    }

    fn extract_statement_dates(&self, text: &str) -> StatementDates {
        let Ok(re) = Regex::new(r"(\d{2})/(\d{2})/(\d{4}) - (\d{2})/(\d{2})/(\d{4})") else {
            return StatementDates::default();
        };
        for line in clean_lines(text) {
            if !line.starts_with("EXTRAS CONT") {
                continue;
            }
            if let Some(caps) = re.captures(line) {
                return StatementDates {
                    start_date: dates::iso_from_slash(&caps[1], &caps[2], &caps[3]),
                    end_date: dates::iso_from_slash(&caps[4], &caps[5], &caps[6]),
                };
            }
        }
        StatementDates::default()
    }

    fn extract_transactions(&self, text: &str, currency: &str) -> Result<Vec<RawTransaction>> {
        let date_re = Regex::new(r"(\d{2})/(\d{2})/(\d{4})")?;
        let amount_re = Regex::new(r"^\d{1,3}(?:[.,]\d{3})*(?:[.,]\d{2})$")?;
        let ref_re = RegexBuilder::new(r"^REF[:.\s]").case_insensitive(true).build()?;
        let value_line_re = RegexBuilder::new(r"valoare tranzactie: ([\d.,]+)\s+[A-Z]{3}")
            .case_insensitive(true)
            .build()?;
        let location_re = Regex::new(r"(?:TID|MID)[:\s]+\S+\s+(.+?)\s+(?:RO|ROM|RON|RRN)\b")?;

        let lines = clean_lines(text);
        let mut out = Vec::new();
        let mut current: Option<OpenTxn> = None;
        let mut current_date: Option<String> = None;
        let mut ref_seen = false;
        let mut skipping = false;

        for i in 0..lines.len() {
            let line = lines[i];

            if line.starts_with(SKIP_START) {
                skipping = true;
                if let Some(open) = current.take() {
                    out.push(open.finish(currency, &value_line_re, &amount_re, &location_re));
                }
                continue;
            }
            if line.starts_with(SKIP_END) {
                skipping = false;
                continue;
            }
            if skipping {
                continue;
            }

            if let Some(phrase) = BT_HEADER_PHRASES.iter().find(|p| line.starts_with(**p)) {
                if let Some(open) = current.take() {
                    out.push(open.finish(currency, &value_line_re, &amount_re, &location_re));
                }

                if i > 0 {
                    if let Some(caps) = date_re.captures(lines[i - 1]) {
                        current_date = dates::iso_from_slash(&caps[1], &caps[2], &caps[3]);
                    }
                }

                let kind = if line.to_lowercase().starts_with("incasare") {
                    TxnKind::Income
                } else {
                    TxnKind::Expense
                };

                let rest = line[phrase.len()..].trim();
                let amount = amount_re.is_match(rest).then(|| rest.to_string());

                current = Some(OpenTxn {
                    name: phrase.trim().to_string(),
                    date: current_date.clone(),
                    amount,
                    kind,
                    details: Vec::new(),
                    reference: None,
                    location: None,
                });
                ref_seen = false;
                continue;
            }

            let Some(open) = current.as_mut() else {
                continue;
            };
            // once the reference row has been seen the remaining rows of
            // this transaction are boilerplate
            if ref_seen {
                continue;
            }

            if ref_re.is_match(line) {
                ref_seen = true;
                // the row after the reference may carry the definitive amount
                if let Some(next) = lines.get(i + 1) {
                    if amount_re.is_match(next) {
                        open.amount = Some((*next).to_string());
                    }
                }
                open.reference = Some(ref_re.replace(line, "").trim().to_string());
                continue;
            }

            if open.location.is_none() {
                if let Some(caps) = location_re.captures(line) {
                    open.location = Some(caps[1].trim().to_string());
                }
            }
            open.details.push(line.to_string());
        }

        if let Some(open) = current.take() {
            out.push(open.finish(currency, &value_line_re, &amount_re, &location_re));
        }

        Ok(out)
    }
}

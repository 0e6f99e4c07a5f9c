//! ING statement parser (text layer).
//!
//! Expected extracted-text shape:
//!   1.234,56Plata la POS comert 01 martie 2024
//!   Terminal: MEGA IMAGE 123
//!   Referinţă: 123456789
//!
//! A header row ends with the long-form Romanian date; an amount at the
//! very start marks an expense, its absence marks an income whose amount
//! surfaces later among the detail rows.

use anyhow::Result;
use extras_core::dates;
use extras_core::types::{BankId, StatementDates, TxnKind};
use regex::{Regex, RegexBuilder};

use crate::parsers::{amount_value, clean_lines, StatementParser};
use crate::types::RawTransaction;

/// Regulator code present only in ING boilerplate.
const ING_SIGNATURE: &str = "RB-PJS-40 024/18.02.99";

/// Legal footer whose right-censored wrapping corrupts header detection;
/// spotted two rows ahead so the region opens before the damage.
const FOOTER_MARKER: &str = "ING Bank N.V. Amsterdam";

/// Balance rows double as skip-region openers.
const BALANCE_MARKERS: [&str; 2] = ["Sold iniţial", "Sold initial"];

/// Column header that reopens the transaction table.
const TABLE_HEADER: &str = "DebitCreditDetalii tranzactieData";

const LOCATION_KEYWORDS: [&str; 3] = ["Ordonator:", "Beneficiar:", "Terminal:"];

const REFERENCE_KEYWORDS: [&str; 4] = [
    "Referinţă:",
    "Referinta:",
    "Numar autorizare:",
    "Autorizare:",
];

struct Header {
    date: Option<String>,
    amount: Option<String>,
    name: String,
    kind: TxnKind,
}

fn parse_header(line: &str, header_re: &Regex, amount_start_re: &Regex) -> Option<Header> {
    let caps = header_re.captures(line)?;
    let date = dates::iso_from_ro_long(&caps[1], &caps[2], &caps[3]);
    let without_date = header_re.replace(line, "").trim().to_string();

    if let Some(am) = amount_start_re.captures(&without_date) {
        let raw = am[1].to_string();
        let name = without_date[raw.len()..].trim().to_string();
        Some(Header {
            date,
            amount: Some(raw),
            name,
            kind: TxnKind::Expense,
        })
    } else {
        Some(Header {
            date,
            amount: None,
            name: without_date,
            kind: TxnKind::Income,
        })
    }
}

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
    /// Close the accumulator: settle the amount, the counterparty location
    /// and the reference from the detail rows, consuming each claimed row.
    fn finish(mut self, currency: &str, detail_amount_re: &Regex) -> RawTransaction {
        if self.amount.is_none() {
            if let Some(pos) = self
                .details
                .iter()
                .position(|l| detail_amount_re.is_match(l.trim()))
            {
                let line = self.details.remove(pos);
                self.amount = Some(line.trim().to_string());
            }
        }

        let mut found = None;
        for (pos, line) in self.details.iter().enumerate() {
            if let Some(keyword) = LOCATION_KEYWORDS.iter().find(|k| line.starts_with(**k)) {
                found = Some((pos, line[keyword.len()..].trim().to_string()));
                break;
            }
        }
        if let Some((pos, location)) = found {
            self.details.remove(pos);
            self.location = Some(location);
        }

        let mut found = None;
        for (pos, line) in self.details.iter().enumerate() {
            if REFERENCE_KEYWORDS.iter().any(|k| line.contains(k)) {
                let value = line.rsplit(':').next().unwrap_or("").trim().to_string();
                found = Some((pos, value));
                break;
            }
        }
        if let Some((pos, reference)) = found {
            self.details.remove(pos);
            self.reference = Some(reference);
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

pub struct IngParser;

impl StatementParser for IngParser {
    fn bank(&self) -> BankId {
        BankId::Ing
    }

    fn identify(&self, text: &str) -> bool {
        text.contains(ING_SIGNATURE)
    }

    fn extract_currency(&self, text: &str) -> Option<String> {
        // no word boundary: a code embedded in an adjacent alphanumeric
        // run still matches (known imprecision, kept as-is)
        let re = Regex::new(r"RON|EUR|USD").ok()?;
        re.find(text).map(|m| m.as_str().to_string())
    }

    fn extract_initial_balance(&self, text: &str, _currency: &str) -> Option<f64> {
        let re = Regex::new(r"Sold (?:iniţial|initial)\s*(\d{1,3}(?:\.\d{3})*,\d{2})").ok()?;
        let lines = clean_lines(text);
        for (i, line) in lines.iter().enumerate() {
            if !BALANCE_MARKERS.iter().any(|m| line.starts_with(m)) {
                continue;
            }
            if let Some(caps) = re.captures(line) {
                return amount_value(&caps[1]);
            }
            // the amount wraps onto the row below
            return lines.get(i + 1).and_then(|l| amount_value(l));
        }
        None
    }

    fn extract_final_balance(&self, text: &str, _currency: &str) -> Option<f64> {
        let lines = clean_lines(text);
        for (i, line) in lines.iter().enumerate() {
            if line.starts_with("Sold final") {
                return lines.get(i + 1).and_then(|l| amount_value(l));
            }
        }
        None
    }

    fn extract_statement_dates(&self, text: &str) -> StatementDates {
        let Ok(re) = Regex::new(r"(\d{2})/(\d{2})/(\d{4})-(\d{2})/(\d{2})/(\d{4})") else {
            return StatementDates::default();
        };
        match re.captures(text) {
            Some(caps) => StatementDates {
                start_date: dates::iso_from_slash(&caps[1], &caps[2], &caps[3]),
                end_date: dates::iso_from_slash(&caps[4], &caps[5], &caps[6]),
            },
            None => StatementDates::default(),
        }
    }

    fn extract_transactions(&self, text: &str, currency: &str) -> Result<Vec<RawTransaction>> {
        let header_re = RegexBuilder::new(
            r"(\d{2})\s+(ianuarie|februarie|martie|aprilie|mai|iunie|iulie|august|septembrie|octombrie|noiembrie|decembrie)\s+(\d{4})$",
        )
        .case_insensitive(true)
        .build()?;
        let amount_start_re = Regex::new(r"^(\d{1,3}(?:\.\d{3})*,\d{2})")?;
        let detail_amount_re = Regex::new(r"^\d{1,3}(?:\.\d{3})*,\d{2}$")?;

        let lines = clean_lines(text);
        let mut out = Vec::new();
        let mut current: Option<OpenTxn> = None;
        let mut skipping = false;

        for i in 0..lines.len() {
            let line = lines[i];

            let footer_ahead = lines
                .get(i + 2)
                .is_some_and(|l| l.starts_with(FOOTER_MARKER));
            if BALANCE_MARKERS.iter().any(|m| line.starts_with(m)) || footer_ahead {
                skipping = true;
                if let Some(open) = current.take() {
                    out.push(open.finish(currency, &detail_amount_re));
                }
                continue;
            }
            if line.starts_with(TABLE_HEADER) {
                skipping = false;
                continue;
            }
            // headers are not recognized inside a skip region even when
            // the date pattern matches
            if skipping {
                continue;
            }

            if let Some(header) = parse_header(line, &header_re, &amount_start_re) {
                if let Some(open) = current.take() {
                    out.push(open.finish(currency, &detail_amount_re));
                }
                current = Some(OpenTxn {
                    name: header.name,
                    date: header.date,
                    amount: header.amount,
                    kind: header.kind,
                    details: Vec::new(),
                    reference: None,
                    location: None,
                });
                continue;
            }

            if let Some(open) = current.as_mut() {
                open.details.push(line.to_string());
            }
        }

        if let Some(open) = current.take() {
            out.push(open.finish(currency, &detail_amount_re));
        }

        Ok(out)
    }
}

//! Revolut statement parser (text layer).
//!
//! Expected extracted-text shape:
//!   3 ian. 2024Top-Up by *1234 500,00 RON1.234,56 RON
//!   De la: JOHN DOE
//!   Referință: abcdef-123
//!
//! A header row starts with the abbreviated-month date; the trailing
//! running balance is stripped before the counterparty/amount split.

use anyhow::Result;
use extras_core::dates;
use extras_core::types::{BankId, StatementDates, TxnKind};
use regex::{Regex, RegexBuilder};

use crate::parsers::{amount_value, clean_lines, find_iban, StatementParser};
use crate::types::RawTransaction;

/// Statement sections that suspend transaction parsing.
const SKIP_STARTS: [&str; 2] = ["IBAN", "Extras RON"];

/// Column header that reopens the transaction table.
const TABLE_HEADER: &str = "DatăDescriereSume retraseSume adăugateSold";

/// Trailing sections (pockets, returned funds) that end the main history.
const SECTION_ENDS: [&str; 2] = ["Fonduri returnate", "Buzunare"];

/// Counterparty texts that mark a currency exchange credit when followed
/// by the account's own currency.
const EXCHANGE_MARKERS: [&str; 2] = ["Schimbat în", "To"];

/// Sender marker inside detail rows; its presence makes the entry income.
const SENDER_MARKER: &str = "De la:";

fn amount_with_currency(currency: &str) -> Result<Regex> {
    Ok(Regex::new(&format!(
        r"(\d{{1,3}}(?:[.,]\d{{3}})*(?:[.,]\d{{2}}))\s*{currency}"
    ))?)
}

struct Header {
    date: Option<String>,
    counterparty: String,
    amount: Option<String>,
}

fn parse_header(
    line: &str,
    date_re: &Regex,
    trailing_re: &Regex,
    amount_re: &Regex,
    known_res: &[Regex],
) -> Option<Header> {
    let caps = date_re.captures(line)?;
    let date = dates::iso_from_ro_abbrev(&caps[1], &caps[2], &caps[3]);
    let matched_len = caps.get(0).map_or(0, |m| m.end());
    let rest = line[matched_len..].trim();
    // drop the trailing running balance
    let rest = trailing_re.replace(rest, "").trim().to_string();

    for known in known_res {
        if let Some(m) = known.find(&rest) {
            let counterparty = m.as_str().to_string();
            let after = rest[m.end()..].trim();
            let amount = amount_re.captures(after).map(|c| c[1].to_string());
            return Some(Header {
                date,
                counterparty,
                amount,
            });
        }
    }

    match amount_re.captures(&rest) {
        Some(caps) => {
            let whole = caps.get(0)?;
            Some(Header {
                date,
                counterparty: rest[..whole.start()].trim().to_string(),
                amount: Some(caps[1].to_string()),
            })
        }
        None => Some(Header {
            date,
            counterparty: rest,
            amount: None,
        }),
    }
}

struct OpenTxn {
    date: Option<String>,
    amount: Option<String>,
    counterparty: String,
    details: Vec<String>,
    reference: Option<String>,
}

impl OpenTxn {
    /// Close the accumulator. The direction is only decidable here: a
    /// sender row or an exchange into the account's own currency marks
    /// income, everything else is an outgoing payment.
    fn finish(self, currency: &str) -> RawTransaction {
        let incoming = self.details.iter().any(|l| l.contains(SENDER_MARKER))
            || EXCHANGE_MARKERS
                .iter()
                .any(|m| self.counterparty.trim() == format!("{m} {currency}"));

        RawTransaction {
            name: "revolut transaction".to_string(),
            date: self.date,
            amount: self.amount,
            currency: currency.to_string(),
            kind: if incoming {
                TxnKind::Income
            } else {
                TxnKind::Expense
            },
            details: self.details,
            reference: self.reference,
            location: (!self.counterparty.is_empty()).then_some(self.counterparty),
        }
    }
}

pub struct RevParser;

impl StatementParser for RevParser {
    fn bank(&self) -> BankId {
        BankId::Rev
    }

    fn identify(&self, text: &str) -> bool {
        text.contains("REVOLT21")
            || clean_lines(text)
                .iter()
                .any(|l| l.starts_with("Revolut Bank UAB"))
    }

    fn extract_currency(&self, text: &str) -> Option<String> {
        for line in clean_lines(text) {
            if let Some(rest) = line.strip_prefix("Extras ") {
                return rest.split_whitespace().next().map(|c| c.to_uppercase());
            }
        }
        None
    }

    fn extract_iban(&self, text: &str) -> Option<String> {
        // the IBAN is not embedded in boilerplate; it follows a standalone
        // IBAN marker row
        let lines = clean_lines(text);
        for (i, line) in lines.iter().enumerate() {
            if !line.starts_with("IBAN") {
                continue;
            }
            for candidate in lines.iter().skip(i).take(4) {
                if let Some(iban) = find_iban(candidate) {
                    return Some(iban);
                }
            }
        }
        find_iban(text)
    }

    fn extract_initial_balance(&self, text: &str, currency: &str) -> Option<f64> {
        balance_row_amounts(text, currency)?
            .first()
            .and_then(|raw| amount_value(raw))
    }

    fn extract_final_balance(&self, text: &str, currency: &str) -> Option<f64> {
        balance_row_amounts(text, currency)?
            .last()
            .and_then(|raw| amount_value(raw))
    }

    fn extract_statement_dates(&self, text: &str) -> StatementDates {
        let Ok(re) = RegexBuilder::new(
            r"de la (\d{1,2}) (\w+) (\d{4}) până la (\d{1,2}) (\w+) (\d{4})",
        )
        .case_insensitive(true)
        .build() else {
            return StatementDates::default();
        };
        for line in clean_lines(text) {
            let Some(caps) = re.captures(line) else {
                continue;
            };
            return StatementDates {
                start_date: dates::iso_from_ro_long(&caps[1], &caps[2], &caps[3]),
                end_date: dates::iso_from_ro_long(&caps[4], &caps[5], &caps[6]),
            };
        }
        StatementDates::default()
    }

    fn extract_transactions(&self, text: &str, currency: &str) -> Result<Vec<RawTransaction>> {
        let date_re = RegexBuilder::new(
            r"^(\d{1,2}) (ian|feb|mar|apr|mai|iun|iul|aug|sep|oct|nov|dec)\. (\d{4})",
        )
        .case_insensitive(true)
        .build()?;
        let amount_re = amount_with_currency(currency)?;
        let trailing_re = Regex::new(&format!(
            r"(\d{{1,3}}(?:[.,]\d{{3}})*(?:[.,]\d{{2}}))\s*{currency}$"
        ))?;
        let known_res = vec![
            RegexBuilder::new(r"Top-Up by \*\d{4}")
                .case_insensitive(true)
                .build()?,
            RegexBuilder::new(r"Transfer către [A-Z\- ]+")
                .case_insensitive(true)
                .build()?,
        ];

        let lines = clean_lines(text);
        let mut out = Vec::new();
        let mut current: Option<OpenTxn> = None;
        let mut skipping = false;

        for line in &lines {
            if SKIP_STARTS.iter().any(|m| line.starts_with(m)) {
                skipping = true;
                if let Some(open) = current.take() {
                    out.push(open.finish(currency));
                }
                continue;
            }
            if line.starts_with(TABLE_HEADER) {
                skipping = false;
                continue;
            }
            if skipping {
                continue;
            }
            if SECTION_ENDS.iter().any(|m| line.starts_with(m)) {
                // pocket / returned-funds section: the main history is over
                if let Some(open) = current.take() {
                    out.push(open.finish(currency));
                }
                break;
            }

            if let Some(header) =
                parse_header(line, &date_re, &trailing_re, &amount_re, &known_res)
            {
                if let Some(open) = current.take() {
                    out.push(open.finish(currency));
                }
                current = Some(OpenTxn {
                    date: header.date,
                    amount: header.amount,
                    counterparty: header.counterparty,
                    details: Vec::new(),
                    reference: None,
                });
                continue;
            }

            if let Some(open) = current.as_mut() {
                if let Some(value) = line.strip_prefix("Referință:") {
                    open.reference = Some(value.trim().to_string());
                    continue;
                }
                open.details.push(line.to_string());
            }
        }

        if let Some(open) = current.take() {
            out.push(open.finish(currency));
        }

        Ok(out)
    }
}

/// The summary row prints exactly four amount+currency tokens: opening
/// balance, money out, money in, closing balance.
fn balance_row_amounts(text: &str, currency: &str) -> Option<Vec<String>> {
    let re = amount_with_currency(currency).ok()?;
    for line in clean_lines(text) {
        let amounts: Vec<String> = re
            .captures_iter(line)
            .map(|caps| caps[1].to_string())
            .collect();
        if amounts.len() == 4 {
            return Some(amounts);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_up_header() {
        let text = "3 ian. 2024Top-Up by *1234 500,00 RON1.234,56 RON";
        let txns = RevParser.extract_transactions(text, "RON").unwrap();
        assert_eq!(txns.len(), 1);
        let t = &txns[0];
        assert_eq!(t.date.as_deref(), Some("2024-01-03"));
        assert_eq!(t.location.as_deref(), Some("Top-Up by *1234"));
        assert_eq!(t.amount.as_deref(), Some("500,00"));
    }

    #[test]
    fn test_generic_counterparty_split() {
        let text = "14 feb. 2024Mega Image 45,90 RON988,66 RON";
        let txns = RevParser.extract_transactions(text, "RON").unwrap();
        let t = &txns[0];
        assert_eq!(t.location.as_deref(), Some("Mega Image"));
        assert_eq!(t.amount.as_deref(), Some("45,90"));
        assert_eq!(t.kind, TxnKind::Expense);
    }

    #[test]
    fn test_sender_row_makes_income() {
        let text = "3 ian. 2024Transfer primit 500,00 RON1.234,56 RON\nDe la: JOHN DOE";
        let txns = RevParser.extract_transactions(text, "RON").unwrap();
        assert_eq!(txns[0].kind, TxnKind::Income);
    }

    #[test]
    fn test_exchange_into_own_currency_is_income() {
        let text = "3 ian. 2024Schimbat în RON 200,00 RON1.434,56 RON";
        let txns = RevParser.extract_transactions(text, "RON").unwrap();
        assert_eq!(txns[0].kind, TxnKind::Income);

        // an exchange into another currency is an outgoing entry
        let text = "3 ian. 2024Schimbat în EUR 200,00 RON1.234,56 RON";
        let txns = RevParser.extract_transactions(text, "RON").unwrap();
        assert_eq!(txns[0].kind, TxnKind::Expense);
    }

    #[test]
    fn test_reference_row() {
        let text = "3 ian. 2024Plata card 10,00 RON990,00 RON\nReferință: abc-123\ndetaliu";
        let txns = RevParser.extract_transactions(text, "RON").unwrap();
        let t = &txns[0];
        assert_eq!(t.reference.as_deref(), Some("abc-123"));
        assert_eq!(t.details, vec!["detaliu".to_string()]);
    }

    #[test]
    fn test_section_end_terminates_parsing() {
        let text = r#"
3 ian. 2024Plata card 10,00 RON990,00 RON
Buzunare
5 ian. 2024Plata card 20,00 RON970,00 RON
"#;
        let txns = RevParser.extract_transactions(text, "RON").unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].amount.as_deref(), Some("10,00"));
    }

    #[test]
    fn test_skip_region_between_marker_and_table_header() {
        let text = r#"
IBAN
RO12BREL0005602999123456
DatăDescriereSume retraseSume adăugateSold
3 ian. 2024Plata card 10,00 RON990,00 RON
"#;
        let txns = RevParser.extract_transactions(text, "RON").unwrap();
        assert_eq!(txns.len(), 1);
    }

    #[test]
    fn test_identify() {
        assert!(RevParser.identify("Revolut Bank UAB Vilnius, Lithuania"));
        assert!(RevParser.identify("BIC REVOLT21"));
        assert!(!RevParser.identify("some other bank"));
    }

    #[test]
    fn test_iban_block_scan() {
        let text = "Extras RON\nIBAN\nRO12BREL0005602999123456\nBIC";
        assert_eq!(
            RevParser.extract_iban(text).as_deref(),
            Some("RO12BREL0005602999123456")
        );
    }

    #[test]
    fn test_currency_from_extras_line() {
        assert_eq!(
            RevParser.extract_currency("Extras eur\n").as_deref(),
            Some("EUR")
        );
    }

    #[test]
    fn test_balances_from_four_amount_row() {
        let text = "1.000,00 RON500,00 RON250,00 RON750,00 RON";
        let p = RevParser;
        assert_eq!(p.extract_initial_balance(text, "RON"), Some(1000.0));
        assert_eq!(p.extract_final_balance(text, "RON"), Some(750.0));
    }

    #[test]
    fn test_statement_dates_full_months() {
        let dates = RevParser
            .extract_statement_dates("Extras de la 1 ianuarie 2024 până la 31 martie 2024");
        assert_eq!(dates.start_date.as_deref(), Some("2024-01-01"));
        assert_eq!(dates.end_date.as_deref(), Some("2024-03-31"));
    }
}

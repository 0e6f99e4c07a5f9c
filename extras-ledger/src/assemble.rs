//! Statement assembly: detect the bank, extract metadata and
//! transactions, normalize amount signs, classify counterparties and
//! reconcile the ledger against the reported balances.

use extras_core::rules::{classify, tag_for, CounterpartyRule};
use extras_core::types::{
    Account, Counterparty, StatementMeta, Transaction, TransactionAmount, TxnKind,
};
use extras_core::{checksum_valid, parse_locale_number, Error, Result};
use extras_ingest::types::RawTransaction;
use extras_ingest::{detect, find_iban};

/// Build a per-IBAN account record from one document's text layer.
///
/// Extraction is best-effort: an unrecognized layout yields a record with
/// degraded meta fields and no transactions instead of an error, and
/// malformed values degrade field-by-field.
pub fn assemble_statement(text: &str, rules: &[CounterpartyRule]) -> Account {
    let Some(parser) = detect(text) else {
        return Account {
            iban: find_iban(text),
            meta: StatementMeta::unknown(),
            meta_array: Vec::new(),
            transactions: Vec::new(),
        };
    };

    let currency = parser.extract_currency(text);
    let parse_currency = currency.clone().unwrap_or_else(|| "RON".to_string());

    let raws = match parser.extract_transactions(text, &parse_currency) {
        Ok(raws) => raws,
        Err(err) => {
            tracing::warn!(bank = parser.bank().code(), %err, "transaction extraction failed");
            Vec::new()
        }
    };

    let initial = parser.extract_initial_balance(text, &parse_currency);
    let final_balance = parser.extract_final_balance(text, &parse_currency);

    let transactions: Vec<Transaction> =
        raws.into_iter().map(|raw| normalize(raw, rules)).collect();

    let meta = StatementMeta {
        bank: Some(parser.bank()),
        currency,
        dates: parser.extract_statement_dates(text),
        initial_balance: initial,
        final_balance,
        checksum_valid: checksum_valid(initial, final_balance, &transactions),
    };

    Account {
        iban: parser.extract_iban(text),
        meta,
        meta_array: Vec::new(),
        transactions,
    }
}

/// Strict variant for single-document flows, where an unknown layout is
/// fatal rather than degraded.
pub fn assemble_statement_strict(text: &str, rules: &[CounterpartyRule]) -> Result<Account> {
    if detect(text).is_none() {
        return Err(Error::UnrecognizedFormat);
    }
    Ok(assemble_statement(text, rules))
}

/// Turn a raw extraction into the output transaction shape: signed
/// rendered amount, fresh internal id, resolved counterparty and tag.
fn normalize(raw: RawTransaction, rules: &[CounterpartyRule]) -> Transaction {
    let signed = raw
        .amount
        .as_deref()
        .map(parse_locale_number)
        .map(|value| match raw.kind {
            TxnKind::Expense => -value,
            TxnKind::Income => value,
        });
    let amount = signed
        .filter(|value| !value.is_nan())
        .map(|value| format!("{value:.2}"));

    let mut txn = Transaction {
        name: raw.name,
        date: raw.date,
        amount: TransactionAmount {
            amount,
            currency: raw.currency,
        },
        kind: raw.kind,
        details: raw.details,
        reference: raw.reference,
        location: raw.location,
        counterparty: Counterparty::default(),
        tag: String::new(),
        internal_id: Transaction::new_internal_id(),
    };

    if let Some(id) = classify(&txn, rules) {
        txn.tag = tag_for(&id, rules);
        txn.counterparty = Counterparty {
            description: id.clone(),
            id: Some(id),
        };
    }

    txn
}

#[cfg(test)]
mod tests {
    use super::*;
    use extras_core::rules::{RuleField, RulePattern};
    use extras_core::types::BankId;

    const BT_DOC: &str = r#"
Nr. Inreg. Registrul Comertului: J1993004155124
EXTRAS CONT Nr 2 din 01/02/2024 - 29/02/2024
RONCod IBAN: RO49BTRLRONCRT0000000001
SOLD ANTERIOR
100.00
01/02/2024
Plata la POS 30,00
TID 1234 MEGA IMAGE CLUJ RO
Incasare OP
80,00
SOLD FINAL CONT
150,00
"#;

    fn rules() -> Vec<CounterpartyRule> {
        vec![CounterpartyRule {
            name: "Mega Image".to_string(),
            patterns: vec![RulePattern {
                field: RuleField::Details,
                value: "MEGA IMAGE".to_string(),
            }],
            tag: "groceries".to_string(),
        }]
    }

    #[test]
    fn test_assemble_bt_document() {
        let account = assemble_statement(BT_DOC, &rules());

        assert_eq!(account.meta.bank, Some(BankId::Bt));
        assert_eq!(account.meta.currency.as_deref(), Some("RON"));
        assert_eq!(account.iban.as_deref(), Some("RO49BTRLRONCRT0000000001"));
        assert_eq!(account.meta.initial_balance, Some(100.0));
        assert_eq!(account.meta.final_balance, Some(150.0));

        assert_eq!(account.transactions.len(), 2);
        let pos = &account.transactions[0];
        assert_eq!(pos.amount.amount.as_deref(), Some("-30.00"));
        assert_eq!(pos.counterparty.id.as_deref(), Some("Mega Image"));
        assert_eq!(pos.tag, "groceries");

        let incoming = &account.transactions[1];
        assert_eq!(incoming.amount.amount.as_deref(), Some("80.00"));
        assert_eq!(incoming.counterparty.id, None);
        assert_eq!(incoming.counterparty.description, "Unknown");
        assert_eq!(incoming.tag, "");

        // 150 - 100 == -30 + 80
        assert!(account.meta.checksum_valid);
    }

    #[test]
    fn test_internal_ids_are_unique() {
        let account = assemble_statement(BT_DOC, &[]);
        let ids: Vec<&str> = account
            .transactions
            .iter()
            .map(|t| t.internal_id.as_str())
            .collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_unknown_layout_degrades() {
        let account = assemble_statement("no signature here RO49AAAA1B31007593840000", &[]);
        assert_eq!(account.meta.bank, None);
        assert_eq!(account.meta.currency, None);
        assert!(account.transactions.is_empty());
        assert!(!account.meta.checksum_valid);
        // the IBAN is still recovered generically
        assert_eq!(account.iban.as_deref(), Some("RO49AAAA1B31007593840000"));
    }

    #[test]
    fn test_strict_fails_on_unknown_layout() {
        let err = assemble_statement_strict("no signature", &[]).unwrap_err();
        assert!(matches!(err, Error::UnrecognizedFormat));
    }
}

//! Shared data model for normalized statements.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::amount::parse_locale_number;

/// Supported statement layouts. Determined once per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BankId {
    #[serde(rename = "BT")]
    Bt,
    #[serde(rename = "ING")]
    Ing,
    #[serde(rename = "REV")]
    Rev,
}

impl BankId {
    /// Short code used in output records
    pub fn code(&self) -> &'static str {
        match self {
            BankId::Bt => "BT",
            BankId::Ing => "ING",
            BankId::Rev => "REV",
        }
    }

    /// Human-readable name for display
    pub fn name(&self) -> &'static str {
        match self {
            BankId::Bt => "Banca Transilvania",
            BankId::Ing => "ING Bank",
            BankId::Rev => "Revolut",
        }
    }
}

/// Transaction direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxnKind {
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "expense")]
    Expense,
}

/// Signed decimal amount plus its currency, as emitted in output records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionAmount {
    /// Decimal string with the sign already applied; `None` when the
    /// statement never yielded a parseable amount.
    pub amount: Option<String>,
    pub currency: String,
}

/// Canonical counterparty resolved by the rule engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counterparty {
    pub id: Option<String>,
    pub description: String,
}

impl Default for Counterparty {
    fn default() -> Self {
        Counterparty {
            id: None,
            description: "Unknown".to_string(),
        }
    }
}

/// One normalized statement entry. Created during extraction, enriched in
/// place by classification, never mutated afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Bank-proprietary operation label (the matched header phrase).
    #[serde(rename = "proprietaryBankTransactionCode")]
    pub name: String,

    /// ISO `YYYY-MM-DD`; `None` when the statement never announced a date.
    #[serde(rename = "bookingDate")]
    pub date: Option<String>,

    #[serde(rename = "transactionAmount")]
    pub amount: TransactionAmount,

    #[serde(rename = "type")]
    pub kind: TxnKind,

    /// Raw detail lines not claimed by any field extractor, in order.
    pub details: Vec<String>,

    /// Bank reference, when the statement carries one.
    #[serde(rename = "transactionId")]
    pub reference: Option<String>,

    /// Merchant/terminal location text; feeds classification but is not
    /// part of the output record.
    #[serde(skip)]
    pub location: Option<String>,

    pub counterparty: Counterparty,

    pub tag: String,

    #[serde(rename = "internalTransactionId")]
    pub internal_id: String,
}

impl Transaction {
    /// Fresh opaque id for `internalTransactionId`.
    pub fn new_internal_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Signed numeric amount; `NAN` when the stored string is missing or
    /// unparseable.
    pub fn signed_amount(&self) -> f64 {
        match &self.amount.amount {
            Some(s) => parse_locale_number(s),
            None => f64::NAN,
        }
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TxnKind::Expense
    }
}

/// Statement period boundaries, ISO strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementDates {
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

/// Per-document (or merged) statement metadata. Derived once; immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementMeta {
    pub bank: Option<BankId>,
    pub currency: Option<String>,
    pub dates: StatementDates,
    #[serde(rename = "initialBalance")]
    pub initial_balance: Option<f64>,
    #[serde(rename = "finalBalance")]
    pub final_balance: Option<f64>,
    #[serde(rename = "validCheckSumBalance")]
    pub checksum_valid: bool,
}

impl StatementMeta {
    /// Meta with every field degraded, for unrecognized layouts.
    pub fn unknown() -> Self {
        StatementMeta {
            bank: None,
            currency: None,
            dates: StatementDates::default(),
            initial_balance: None,
            final_balance: None,
            checksum_valid: false,
        }
    }
}

/// Per-IBAN account record: one (possibly merged) meta plus the ordered
/// transaction history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Extraction key; carried separately because output records key the
    /// whole object by IBAN.
    #[serde(skip)]
    pub iban: Option<String>,

    pub meta: StatementMeta,

    /// Per-document metas backing a multi-file merge; empty for a single
    /// statement.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meta_array: Vec<StatementMeta>,

    pub transactions: Vec<Transaction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_txn() -> Transaction {
        Transaction {
            name: "Plata la POS".to_string(),
            date: Some("2024-02-01".to_string()),
            amount: TransactionAmount {
                amount: Some("-123.45".to_string()),
                currency: "RON".to_string(),
            },
            kind: TxnKind::Expense,
            details: vec!["TID 1234 CLUJ RO".to_string()],
            reference: Some("2024020112345".to_string()),
            location: Some("CLUJ".to_string()),
            counterparty: Counterparty::default(),
            tag: String::new(),
            internal_id: "test-id".to_string(),
        }
    }

    #[test]
    fn test_signed_amount() {
        let txn = sample_txn();
        assert_eq!(txn.signed_amount(), -123.45);
        assert!(txn.is_expense());
    }

    #[test]
    fn test_missing_amount_is_nan() {
        let mut txn = sample_txn();
        txn.amount.amount = None;
        assert!(txn.signed_amount().is_nan());
    }

    #[test]
    fn test_output_record_keys() {
        let json = serde_json::to_value(sample_txn()).unwrap();
        assert_eq!(json["proprietaryBankTransactionCode"], "Plata la POS");
        assert_eq!(json["bookingDate"], "2024-02-01");
        assert_eq!(json["transactionAmount"]["amount"], "-123.45");
        assert_eq!(json["transactionAmount"]["currency"], "RON");
        assert_eq!(json["type"], "expense");
        assert_eq!(json["transactionId"], "2024020112345");
        assert_eq!(json["internalTransactionId"], "test-id");
        assert_eq!(json["counterparty"]["description"], "Unknown");
        // location feeds classification only
        assert!(json.get("location").is_none());
    }

    #[test]
    fn test_meta_output_keys() {
        let meta = StatementMeta {
            bank: Some(BankId::Bt),
            currency: Some("RON".to_string()),
            dates: StatementDates {
                start_date: Some("2024-02-01".to_string()),
                end_date: Some("2024-02-29".to_string()),
            },
            initial_balance: Some(100.0),
            final_balance: Some(150.0),
            checksum_valid: true,
        };
        let json = serde_json::to_value(meta).unwrap();
        assert_eq!(json["bank"], "BT");
        assert_eq!(json["dates"]["startDate"], "2024-02-01");
        assert_eq!(json["validCheckSumBalance"], true);
    }
}

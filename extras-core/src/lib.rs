//! extras-core: shared data model and normalization primitives for bank
//! statement processing.

pub mod amount;
pub mod dates;
pub mod error;
pub mod reconcile;
pub mod rules;
pub mod types;

pub use amount::parse_locale_number;
pub use error::{Error, Result};
pub use reconcile::{checksum_valid, merge_meta_array, BALANCE_EPSILON};
pub use rules::{
    classify, field_text, sync_tags_from_account, tag_for, CounterpartyRule, RuleField,
    RulePattern, RuleStore,
};
pub use types::{
    Account, BankId, Counterparty, StatementDates, StatementMeta, Transaction,
    TransactionAmount, TxnKind,
};

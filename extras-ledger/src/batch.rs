//! Multi-document batches: accumulate per-IBAN account histories and
//! merge statement metas into one covering period.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use extras_core::rules::CounterpartyRule;
use extras_core::types::{Account, StatementMeta};
use extras_core::{checksum_valid, merge_meta_array};

use crate::assemble::assemble_statement;

/// Fallback record key when no IBAN could be recovered.
pub const UNKNOWN_IBAN: &str = "UNKNOWN";

/// One source document: a display name for logs plus its text layer.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub name: String,
    pub text: String,
}

/// Assemble every document and merge the results per IBAN. A document
/// with an unrecognized layout is logged and skipped; it never aborts
/// the batch.
pub fn assemble_batch(
    docs: &[SourceDocument],
    rules: &[CounterpartyRule],
) -> BTreeMap<String, Account> {
    let mut accounts: BTreeMap<String, Account> = BTreeMap::new();

    for doc in docs {
        let account = assemble_statement(&doc.text, rules);
        if account.meta.bank.is_none() {
            tracing::warn!(document = %doc.name, "unrecognized statement layout, skipped");
            continue;
        }

        let key = account
            .iban
            .clone()
            .unwrap_or_else(|| UNKNOWN_IBAN.to_string());
        match accounts.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(account);
            }
            Entry::Occupied(mut slot) => merge_account(slot.get_mut(), account),
        }
    }

    accounts
}

/// Append a later document to an existing account: transactions extend in
/// document order, the incoming meta joins `meta_array`, and the merged
/// meta plus checksum are recomputed.
fn merge_account(existing: &mut Account, incoming: Account) {
    if existing.meta_array.is_empty() {
        existing.meta_array.push(existing.meta.clone());
    }
    existing.meta_array.push(incoming.meta.clone());
    existing.transactions.extend(incoming.transactions);

    if let Some(merged) = merge_meta_array(&existing.meta_array) {
        let valid = checksum_valid(
            merged.initial_balance,
            merged.final_balance,
            &existing.transactions,
        );
        existing.meta = StatementMeta {
            checksum_valid: valid,
            ..merged
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bt_doc(period: &str, date_row: &str, initial: &str, txn_row: &str, final_row: &str) -> String {
        format!(
            "Nr. Inreg. Registrul Comertului: J1993004155124\n\
             EXTRAS CONT Nr 1 din {period}\n\
             RONCod IBAN: RO49BTRLRONCRT0000000001\n\
             SOLD ANTERIOR\n{initial}\n\
             {date_row}\n{txn_row}\n\
             SOLD FINAL CONT\n{final_row}\n"
        )
    }

    #[test]
    fn test_batch_merges_per_iban() {
        let docs = vec![
            SourceDocument {
                name: "february.txt".to_string(),
                text: bt_doc(
                    "01/02/2024 - 29/02/2024",
                    "01/02/2024",
                    "70.00",
                    "Plata la POS 50,00",
                    "20,00",
                ),
            },
            SourceDocument {
                name: "january.txt".to_string(),
                text: bt_doc(
                    "01/01/2024 - 31/01/2024",
                    "03/01/2024",
                    "100.00",
                    "Plata la POS 30,00",
                    "70,00",
                ),
            },
        ];

        let accounts = assemble_batch(&docs, &[]);
        assert_eq!(accounts.len(), 1);

        let account = &accounts["RO49BTRLRONCRT0000000001"];
        assert_eq!(account.meta_array.len(), 2);
        assert_eq!(account.transactions.len(), 2);

        // merged meta spans january..february regardless of arrival order
        assert_eq!(account.meta.dates.start_date.as_deref(), Some("2024-01-01"));
        assert_eq!(account.meta.dates.end_date.as_deref(), Some("2024-02-29"));
        assert_eq!(account.meta.initial_balance, Some(100.0));
        assert_eq!(account.meta.final_balance, Some(20.0));

        // 20 - 100 == -50 + -30
        assert!(account.meta.checksum_valid);
    }

    #[test]
    fn test_unrecognized_document_is_skipped() {
        let docs = vec![
            SourceDocument {
                name: "broken.txt".to_string(),
                text: "not a statement".to_string(),
            },
            SourceDocument {
                name: "january.txt".to_string(),
                text: bt_doc(
                    "01/01/2024 - 31/01/2024",
                    "03/01/2024",
                    "100.00",
                    "Plata la POS 30,00",
                    "70,00",
                ),
            },
        ];

        let accounts = assemble_batch(&docs, &[]);
        assert_eq!(accounts.len(), 1);
        assert!(accounts.contains_key("RO49BTRLRONCRT0000000001"));
    }

    #[test]
    fn test_single_document_has_no_meta_array() {
        let docs = vec![SourceDocument {
            name: "january.txt".to_string(),
            text: bt_doc(
                "01/01/2024 - 31/01/2024",
                "03/01/2024",
                "100.00",
                "Plata la POS 30,00",
                "70,00",
            ),
        }];
        let accounts = assemble_batch(&docs, &[]);
        assert!(accounts["RO49BTRLRONCRT0000000001"].meta_array.is_empty());
    }
}

//! Output record naming.

use extras_core::types::Account;
use std::path::Path;

/// `<IBAN>_<start>_<end>.json` when the meta is complete, otherwise a
/// fallback derived from the source file name.
pub fn statement_file_name(account: &Account, source: &Path) -> String {
    let dates = &account.meta.dates;
    match (
        account.iban.as_deref(),
        dates.start_date.as_deref(),
        dates.end_date.as_deref(),
    ) {
        (Some(iban), Some(start), Some(end)) => format!("{iban}_{start}_{end}.json"),
        _ => {
            let stem = source
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("statement");
            format!("statement_{stem}.json")
        }
    }
}

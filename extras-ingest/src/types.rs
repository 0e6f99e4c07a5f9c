use extras_core::types::TxnKind;
use serde::{Deserialize, Serialize};

/// Transaction as recovered from statement text, before sign
/// normalization, id assignment and classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    /// Operation label: the matched header phrase or description text.
    pub name: String,
    /// ISO `YYYY-MM-DD`; `None` when no date was ever announced.
    pub date: Option<String>,
    /// Amount exactly as printed, unsigned.
    pub amount: Option<String>,
    pub currency: String,
    pub kind: TxnKind,
    /// Detail lines not claimed by any field extractor, in order.
    pub details: Vec<String>,
    pub reference: Option<String>,
    pub location: Option<String>,
}

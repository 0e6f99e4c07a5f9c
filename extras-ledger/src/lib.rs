//! extras-ledger: statement assembly (detect → meta → transactions →
//! classify → reconcile) and multi-document account merging.

pub mod assemble;
pub mod batch;

pub use assemble::{assemble_statement, assemble_statement_strict};
pub use batch::{assemble_batch, SourceDocument};

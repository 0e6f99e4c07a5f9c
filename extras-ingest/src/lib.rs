//! extras-ingest: statement-text ingestion, with per-bank format parsers
//! and bank detection over the extracted text layer.

pub mod detect;
pub mod parsers;
pub mod types;

pub use detect::{detect, detect_bank, parser_for};
pub use parsers::{find_iban, StatementParser};
pub use types::RawTransaction;

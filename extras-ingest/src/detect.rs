//! Bank detection: run each parser's signature check in fixed priority
//! order and return the first match. Signatures are designed to be
//! mutually exclusive; the order only matters if they ever co-occur.

use extras_core::types::BankId;

use crate::parsers::{BtParser, IngParser, RevParser, StatementParser};

static ING: IngParser = IngParser;
static BT: BtParser = BtParser;
static REV: RevParser = RevParser;

/// Parsers in detection priority order.
pub fn all_parsers() -> [&'static dyn StatementParser; 3] {
    [&ING, &BT, &REV]
}

/// First parser whose signature matches, or `None` for unknown layouts.
pub fn detect(text: &str) -> Option<&'static dyn StatementParser> {
    all_parsers().into_iter().find(|p| p.identify(text))
}

/// Bank identity of the detected layout.
pub fn detect_bank(text: &str) -> Option<BankId> {
    detect(text).map(|p| p.bank())
}

/// Parser for an already-confirmed bank identity.
pub fn parser_for(bank: BankId) -> &'static dyn StatementParser {
    match bank {
        BankId::Ing => &ING,
        BankId::Bt => &BT,
        BankId::Rev => &REV,
    }
}

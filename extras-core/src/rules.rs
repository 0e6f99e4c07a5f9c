//! Counterparty classification: an ordered rule list evaluated against
//! transaction fields. Classification is a pure function of the
//! transaction and the rules; it never mutates the rule list.

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{Account, Transaction};

/// Transaction field a rule pattern reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleField {
    Name,
    Details,
    Location,
    Reference,
}

/// One field/regex probe inside a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulePattern {
    pub field: RuleField,
    /// Regex source, compiled case-insensitive at match time.
    pub value: String,
}

/// A counterparty with its ordered match patterns and ledger tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterpartyRule {
    pub name: String,
    pub patterns: Vec<RulePattern>,
    #[serde(default)]
    pub tag: String,
}

/// Text a pattern matches against. Array-valued fields are joined with a
/// single space; absent fields read as empty.
pub fn field_text(txn: &Transaction, field: RuleField) -> String {
    match field {
        RuleField::Name => txn.name.clone(),
        RuleField::Details => txn.details.join(" "),
        RuleField::Location => txn.location.clone().unwrap_or_default(),
        RuleField::Reference => txn.reference.clone().unwrap_or_default(),
    }
}

/// Resolve a transaction to a counterparty id. Rules are evaluated in
/// list order and patterns in list order within each rule; the first
/// matching pattern wins regardless of specificity. No match yields
/// `None`.
pub fn classify(txn: &Transaction, rules: &[CounterpartyRule]) -> Option<String> {
    for rule in rules {
        for pattern in &rule.patterns {
            let Ok(re) = RegexBuilder::new(&pattern.value)
                .case_insensitive(true)
                .build()
            else {
                continue;
            };
            if re.is_match(&field_text(txn, pattern.field)) {
                return Some(rule.name.clone());
            }
        }
    }
    None
}

/// Tag carried by the named rule; empty when the rule is unknown or
/// untagged.
pub fn tag_for(id: &str, rules: &[CounterpartyRule]) -> String {
    rules
        .iter()
        .find(|r| r.name == id)
        .map(|r| r.tag.clone())
        .unwrap_or_default()
}

/// Copy classified tags from a finished account record back onto the rule
/// list, keyed by rule name. Transactions without a resolved counterparty
/// or without a tag are skipped; unmatched rules are left untouched.
pub fn sync_tags_from_account(rules: &mut [CounterpartyRule], account: &Account) {
    for txn in &account.transactions {
        let Some(id) = &txn.counterparty.id else {
            continue;
        };
        if txn.tag.is_empty() {
            continue;
        }
        if let Some(rule) = rules.iter_mut().find(|r| r.name == *id) {
            rule.tag = txn.tag.clone();
        }
    }
}

/// Storage capability for the rule list. The engine only ever sees plain
/// data; persistence lives behind this trait.
pub trait RuleStore {
    fn load(&self) -> Result<Vec<CounterpartyRule>>;
    fn save(&self, rules: &[CounterpartyRule]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Counterparty, StatementMeta, TransactionAmount, TxnKind};

    fn txn(name: &str, details: &[&str], location: Option<&str>) -> Transaction {
        Transaction {
            name: name.to_string(),
            date: None,
            amount: TransactionAmount {
                amount: Some("-10.00".to_string()),
                currency: "RON".to_string(),
            },
            kind: TxnKind::Expense,
            details: details.iter().map(|s| s.to_string()).collect(),
            reference: None,
            location: location.map(|s| s.to_string()),
            counterparty: Counterparty::default(),
            tag: String::new(),
            internal_id: "t".to_string(),
        }
    }

    fn rule(name: &str, field: RuleField, value: &str) -> CounterpartyRule {
        CounterpartyRule {
            name: name.to_string(),
            patterns: vec![RulePattern {
                field,
                value: value.to_string(),
            }],
            tag: String::new(),
        }
    }

    #[test]
    fn test_first_rule_wins_regardless_of_specificity() {
        let rules = vec![
            rule("Generic", RuleField::Name, "POS"),
            rule("Specific", RuleField::Name, "Plata la POS"),
        ];
        let t = txn("Plata la POS", &[], None);
        assert_eq!(classify(&t, &rules), Some("Generic".to_string()));
    }

    #[test]
    fn test_details_joined_with_space() {
        let rules = vec![rule("Grocer", RuleField::Details, "MEGA IMAGE")];
        // pattern spans two detail lines once joined
        let t = txn("Plata la POS", &["MEGA", "IMAGE BUCURESTI"], None);
        assert_eq!(classify(&t, &rules), None);

        let t = txn("Plata la POS", &["MEGA IMAGE", "BUCURESTI"], None);
        assert_eq!(classify(&t, &rules), Some("Grocer".to_string()));
    }

    #[test]
    fn test_case_insensitive_match() {
        let rules = vec![rule("Fuel", RuleField::Location, "petrom")];
        let t = txn("Plata la POS", &[], Some("PETROM CLUJ"));
        assert_eq!(classify(&t, &rules), Some("Fuel".to_string()));
    }

    #[test]
    fn test_no_match_is_none() {
        let rules = vec![rule("Fuel", RuleField::Name, "PETROM")];
        let t = txn("Plata la POS", &[], None);
        assert_eq!(classify(&t, &rules), None);
        assert_eq!(tag_for("Nonexistent", &rules), "");
    }

    #[test]
    fn test_classification_is_idempotent_and_pure() {
        let rules = vec![rule("Fuel", RuleField::Name, "POS")];
        let before = rules.clone();
        let t = txn("Plata la POS", &[], None);
        let first = classify(&t, &rules);
        let second = classify(&t, &rules);
        assert_eq!(first, second);
        assert_eq!(rules, before);
    }

    #[test]
    fn test_invalid_regex_is_skipped() {
        let rules = vec![
            rule("Broken", RuleField::Name, "("),
            rule("Fuel", RuleField::Name, "POS"),
        ];
        let t = txn("Plata la POS", &[], None);
        assert_eq!(classify(&t, &rules), Some("Fuel".to_string()));
    }

    #[test]
    fn test_tag_sync_by_rule_name() {
        let mut rules = vec![
            rule("Fuel", RuleField::Name, "PETROM"),
            rule("Grocer", RuleField::Name, "MEGA"),
        ];
        let mut t = txn("Plata la POS", &[], None);
        t.counterparty = Counterparty {
            id: Some("Fuel".to_string()),
            description: "Fuel".to_string(),
        };
        t.tag = "transport".to_string();

        let account = Account {
            iban: Some("RO49AAAA1B31007593840000".to_string()),
            meta: StatementMeta::unknown(),
            meta_array: Vec::new(),
            transactions: vec![t],
        };

        sync_tags_from_account(&mut rules, &account);
        assert_eq!(rules[0].tag, "transport");
        assert_eq!(rules[1].tag, "");
    }
}

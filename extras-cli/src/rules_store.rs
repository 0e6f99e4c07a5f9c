//! JSON-file implementation of the counterparty rule store.

use std::fs;
use std::path::PathBuf;

use extras_core::error::{Error, Result};
use extras_core::rules::{CounterpartyRule, RuleStore};

pub struct JsonRuleStore {
    path: PathBuf,
}

impl JsonRuleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonRuleStore { path: path.into() }
    }
}

impl RuleStore for JsonRuleStore {
    /// A missing store is an empty rule list, not an error.
    fn load(&self) -> Result<Vec<CounterpartyRule>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Parse(format!("rule store {}: {e}", self.path.display())))
    }

    fn save(&self, rules: &[CounterpartyRule]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(rules)
            .map_err(|e| Error::Parse(e.to_string()))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

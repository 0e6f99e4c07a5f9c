use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use extras_core::rules::RuleStore;
use extras_core::sync_tags_from_account;
use extras_core::types::Account;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use extras_ledger::{assemble_batch, assemble_statement_strict, SourceDocument};

mod output;
mod rules_store;

use rules_store::JsonRuleStore;

#[derive(Parser, Debug)]
#[command(name = "extras", version, about = "Bank statement text normalizer")]
struct Cli {
    /// Counterparty rule store (JSON)
    #[arg(long, global = true, default_value = "rules/counterparties.json")]
    rules: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse one extracted-text statement and write its account record
    Parse {
        /// Path to the statement's text layer
        file: PathBuf,

        /// Output directory
        #[arg(long, default_value = "output")]
        out_dir: PathBuf,
    },

    /// Parse every .txt statement in a folder and merge accounts per IBAN
    Folder {
        dir: PathBuf,

        /// Output directory
        #[arg(long, default_value = "output")]
        out_dir: PathBuf,
    },

    /// Copy tags from a produced statement record back into the rule store
    Tags {
        /// Statement record JSON produced by parse/folder
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let store = JsonRuleStore::new(&cli.rules);

    match cli.command {
        Command::Parse { file, out_dir } => parse_one(&file, &out_dir, &store).await,
        Command::Folder { dir, out_dir } => parse_folder(&dir, &out_dir, &store).await,
        Command::Tags { file } => sync_tags(&file, &store).await,
    }
}

async fn parse_one(file: &Path, out_dir: &Path, store: &JsonRuleStore) -> Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let rules = store.load()?;

    let account = assemble_statement_strict(&text, &rules)
        .with_context(|| format!("parsing {}", file.display()))?;

    let file_name = output::statement_file_name(&account, file);
    let iban = account
        .iban
        .clone()
        .unwrap_or_else(|| extras_ledger::batch::UNKNOWN_IBAN.to_string());

    println!(
        "Parsed {} transactions from {} ({} account)",
        account.transactions.len(),
        file.display(),
        account.meta.bank.map_or("unknown", |b| b.code()),
    );

    let mut record = BTreeMap::new();
    record.insert(iban, account);

    let out_path = out_dir.join(file_name);
    write_json(&out_path, &record).await?;
    println!("Output written to {}", out_path.display());

    Ok(())
}

async fn parse_folder(dir: &Path, out_dir: &Path, store: &JsonRuleStore) -> Result<()> {
    let rules = store.load()?;

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("listing {}", dir.display()))?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("txt") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut docs = Vec::new();
    for path in &paths {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => docs.push(SourceDocument {
                name: path.display().to_string(),
                text,
            }),
            // one unreadable document does not block the batch
            Err(err) => tracing::warn!(document = %path.display(), %err, "unreadable, skipped"),
        }
    }

    println!("Analyzing {} statements from {}", docs.len(), dir.display());
    let accounts = assemble_batch(&docs, &rules);

    let stamp = chrono::Utc::now().timestamp_millis();
    let out_path = out_dir.join(format!("transactions_{stamp}.json"));
    write_json(&out_path, &accounts).await?;
    println!(
        "Summary for {} accounts written to {}",
        accounts.len(),
        out_path.display()
    );

    Ok(())
}

async fn sync_tags(file: &Path, store: &JsonRuleStore) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let record: BTreeMap<String, Account> = serde_json::from_str(&content)
        .with_context(|| format!("parsing statement record {}", file.display()))?;

    let mut rules = store.load()?;
    for account in record.values() {
        sync_tags_from_account(&mut rules, account);
    }
    store.save(&rules)?;

    println!("Counterparty rule store updated with the latest tag mapping.");
    Ok(())
}

async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

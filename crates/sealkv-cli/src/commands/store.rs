//! Store operations.

use anyhow::Context;
use sealkv::EncryptedStore;
use sealkv_core::Config;

use crate::Commands;

/// Parse a `KEY=VALUE` argument. The value may itself contain `=`.
pub fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

/// Run a store command against the store described by `config`.
pub async fn run(command: Commands, config: &Config) -> anyhow::Result<()> {
    let store = sealkv::open(config).context("Failed to open store")?;
    execute(&store, command).await
}

async fn execute(store: &EncryptedStore, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Get { key } => match store.try_get_item(&key).await? {
            Some(value) => println!("{value}"),
            None => anyhow::bail!("Key not found: {key}"),
        },

        Commands::Set { key, value } => {
            store.set_item(&key, &value).await?;
        }

        Commands::Remove { keys } => {
            if let [key] = keys.as_slice() {
                store.try_remove_item(key).await?;
            } else {
                store.try_multi_remove(&keys).await?;
            }
        }

        Commands::Keys => {
            for key in store.try_get_all_keys().await? {
                println!("{key}");
            }
        }

        Commands::MultiGet { keys } => {
            let rows = store.try_multi_get(&keys).await?;
            let object: serde_json::Map<String, serde_json::Value> = rows
                .into_iter()
                .map(|(key, value)| (key, value.map_or(serde_json::Value::Null, Into::into)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&object)?);
        }

        Commands::MultiSet { pairs } => {
            store.multi_set(&pairs).await?;
            println!("Stored {} values", pairs.len());
        }

        Commands::Merge { key, value } => {
            store.merge_item(&key, &value).await?;
        }

        Commands::MultiMerge { pairs } => {
            store.multi_merge(&pairs).await?;
            println!("Merged {} values", pairs.len());
        }

        Commands::Config(_) | Commands::Version => {
            anyhow::bail!("not a store command")
        }
    }

    Ok(())
}

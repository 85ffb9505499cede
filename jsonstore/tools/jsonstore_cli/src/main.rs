// FICHIER : jsonstore/tools/jsonstore_cli/src/main.rs

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

use jsonstore::collections::{CollectionsManager, JsonCollection};
use jsonstore::utils::config::{ENV_LOG_DIR, ENV_LOG_LEVEL};
use jsonstore::utils::json::JsonObject;
use jsonstore::utils::{env, init_logging, AppConfig};

#[derive(Parser)]
#[command(
    name = "jsonstore_cli",
    author = "jsonstore Team",
    version,
    about = "Outil d'administration des collections JSON"
)]
struct Cli {
    #[arg(long, env = "JSONSTORE_DATA_ROOT", help = "Dossier racine des données")]
    root: PathBuf,

    #[arg(short, long, default_value = "default_meta", help = "Store externe (méta)")]
    outer: String,

    #[arg(short, long, default_value = "default_store", help = "Store interne (tables)")]
    inner: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crée une collection (idempotent)
    Create { name: String },
    /// Supprime une collection et toutes ses lignes
    Drop { name: String },
    /// Collections persistées à (outer, inner)
    List,
    Keys { collection: String },
    Get { collection: String, key: String },
    /// Toutes les lignes d'une collection
    Dump { collection: String },
    /// Remplace le JSON d'une ligne (`@fichier` accepté)
    Set {
        collection: String,
        key: String,
        data: String,
    },
    /// Fusion superficielle dans une ligne (`@fichier` accepté)
    Merge {
        collection: String,
        key: String,
        data: String,
    },
    /// Retire des clés de premier niveau
    Unset {
        collection: String,
        key: String,
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Supprime une ligne
    Delete { collection: String, key: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    // --root l'emporte ; le reste (logs) vient de l'environnement
    let config = match AppConfig::from_env() {
        Ok(from_env) => AppConfig {
            data_root: cli.root.clone(),
            ..from_env
        },
        Err(_) => {
            let mut config = AppConfig::new(cli.root.clone());
            config.log_level = env::get_or(ENV_LOG_LEVEL, "warn");
            config.log_dir = env::get_optional(ENV_LOG_DIR).map(PathBuf::from);
            config
        }
    };
    init_logging(&config);

    let mut mgr = CollectionsManager::with_config(config.store_config());
    let (outer, inner) = (cli.outer.as_str(), cli.inner.as_str());

    match cli.command {
        Commands::Create { name } => {
            mgr.create_collection(outer, inner, &name)
                .await
                .with_context(|| format!("Création de '{}' impossible", name))?;
            println!("✅ Collection '{}' prête dans {}/{}", name, outer, inner);
        }

        Commands::Drop { name } => {
            mgr.load_collections(outer, inner).await?;
            if !mgr.has_collection(&name) {
                return Err(anyhow!("❌ Collection '{}' introuvable dans {}/{}", name, outer, inner));
            }
            mgr.remove_collection(&name).await?;
            println!("🗑️  Collection '{}' supprimée.", name);
        }

        Commands::List => {
            let names = mgr.get_loadable_collection_names(outer, inner).await?;
            println!("📂 Collections dans {}/{}:", outer, inner);
            for n in names {
                println!("  - {}", n);
            }
        }

        Commands::Keys { collection } => {
            let col = open_collection(&mut mgr, outer, inner, &collection).await?;
            for key in col.get_all_keys().await? {
                println!("{}", key);
            }
        }

        Commands::Get { collection, key } => {
            let col = open_collection(&mut mgr, outer, inner, &collection).await?;
            let doc = col.get_row(&key).await?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }

        Commands::Dump { collection } => {
            let col = open_collection(&mut mgr, outer, inner, &collection).await?;
            let rows = col.get_all_rows().await?;
            println!("--- {} lignes ---", rows.len());
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }

        Commands::Set {
            collection,
            key,
            data,
        } => {
            let col = open_collection(&mut mgr, outer, inner, &collection).await?;
            col.set_row(&key, read_object(&data)?).await?;
            println!("✅ Ligne '{}' écrite.", key);
        }

        Commands::Merge {
            collection,
            key,
            data,
        } => {
            let col = open_collection(&mut mgr, outer, inner, &collection).await?;
            col.add_entries(&key, read_object(&data)?).await?;
            println!("{}", serde_json::to_string_pretty(&col.get_row(&key).await?)?);
        }

        Commands::Unset {
            collection,
            key,
            keys,
        } => {
            let col = open_collection(&mut mgr, outer, inner, &collection).await?;
            col.delete_entries(&key, keys.as_slice()).await?;
            println!("{}", serde_json::to_string_pretty(&col.get_row(&key).await?)?);
        }

        Commands::Delete { collection, key } => {
            let col = open_collection(&mut mgr, outer, inner, &collection).await?;
            col.delete_row(&key).await?;
            println!("🗑️  Ligne '{}' supprimée.", key);
        }
    }

    mgr.close_all_collections().await;
    Ok(())
}

/// Charge les collections persistées puis renvoie celle demandée.
async fn open_collection(
    mgr: &mut CollectionsManager,
    outer: &str,
    inner: &str,
    name: &str,
) -> Result<JsonCollection> {
    mgr.load_collections(outer, inner)
        .await
        .with_context(|| format!("Chargement de {}/{} impossible", outer, inner))?;
    let col = mgr
        .get_collection(name)
        .with_context(|| format!("Collection absente de {}/{}", outer, inner))?;
    Ok(col.clone())
}

/// JSON objet, en ligne ou depuis un fichier (`@chemin`).
fn read_object(data: &str) -> Result<JsonObject> {
    let content = match data.strip_prefix('@') {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Lecture de '{}' impossible", path))?
        }
        None => data.to_string(),
    };
    match serde_json::from_str::<Value>(&content)? {
        Value::Object(obj) => Ok(obj),
        other => Err(anyhow!("❌ Objet JSON attendu, reçu : {}", other)),
    }
}

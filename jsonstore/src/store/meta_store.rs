// FICHIER : jsonstore/src/store/meta_store.rs

//! Niveau externe : méta-document listant les schémas de chaque store interne.

use super::{StoreConfig, TableSchema};
use crate::utils::fs::{self, PathBuf};
use crate::utils::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

pub const META_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetaDocument {
    pub version: u32,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub stores: BTreeMap<String, StoreEntry>,
}

impl Default for MetaDocument {
    fn default() -> Self {
        Self {
            version: META_VERSION,
            updated_at: None,
            stores: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreEntry {
    #[serde(default)]
    pub schemas: BTreeMap<String, TableSchema>,
}

/// Handle ouvert sur le méta-document d'un store externe.
#[derive(Debug)]
pub struct MetaStore {
    path: PathBuf,
    doc: Mutex<MetaDocument>,
}

impl MetaStore {
    pub async fn open(path: PathBuf) -> Result<Self> {
        let doc = fs::read_json_opt::<MetaDocument>(&path)
            .await?
            .unwrap_or_default();
        Ok(Self {
            path,
            doc: Mutex::new(doc),
        })
    }

    pub async fn schemas(&self, inner: &str) -> Vec<TableSchema> {
        let doc = self.doc.lock().await;
        doc.stores
            .get(inner)
            .map(|e| e.schemas.values().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn schema_names(&self, inner: &str) -> Vec<String> {
        let doc = self.doc.lock().await;
        doc.stores
            .get(inner)
            .map(|e| e.schemas.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Ajoute (ou remplace) un schéma. `false` si l'identique était déjà présent.
    pub async fn save_schema(&self, inner: &str, schema: TableSchema) -> Result<bool> {
        let mut doc = self.doc.lock().await;
        let current = doc.stores.get(inner).and_then(|e| e.schemas.get(&schema.name));
        if current == Some(&schema) {
            return Ok(false);
        }

        let mut next = doc.clone();
        next.stores
            .entry(inner.to_string())
            .or_default()
            .schemas
            .insert(schema.name.clone(), schema);
        self.persist(&mut next).await?;
        *doc = next;
        Ok(true)
    }

    /// Retire un schéma. `false` s'il était absent.
    pub async fn rm_schema(&self, inner: &str, schema_name: &str) -> Result<bool> {
        let mut doc = self.doc.lock().await;
        let present = doc
            .stores
            .get(inner)
            .is_some_and(|e| e.schemas.contains_key(schema_name));
        if !present {
            return Ok(false);
        }

        let mut next = doc.clone();
        if let Some(entry) = next.stores.get_mut(inner) {
            entry.schemas.remove(schema_name);
            if entry.schemas.is_empty() {
                next.stores.remove(inner);
            }
        }
        self.persist(&mut next).await?;
        *doc = next;
        Ok(true)
    }

    // Le document en mémoire n'est remplacé qu'après écriture réussie
    async fn persist(&self, doc: &mut MetaDocument) -> Result<()> {
        doc.updated_at = Some(Utc::now().to_rfc3339());
        fs::write_json_atomic(&self.path, doc).await?;
        debug!(path = ?self.path, "Méta-document écrit");
        Ok(())
    }
}

/// Cache des méta-stores ouverts, indexé par chemin externe normalisé.
#[derive(Debug, Default)]
pub struct MetaStoreManager {
    open: Mutex<HashMap<String, Arc<MetaStore>>>,
}

impl MetaStoreManager {
    pub async fn load(&self, config: &StoreConfig, outer: &str) -> Result<Arc<MetaStore>> {
        let mut open = self.open.lock().await;
        if let Some(meta) = open.get(outer) {
            return Ok(meta.clone());
        }
        let meta = Arc::new(MetaStore::open(config.meta_path(outer)).await?);
        open.insert(outer.to_string(), meta.clone());
        Ok(meta)
    }

    pub async fn close_all(&self) {
        let mut open = self.open.lock().await;
        if !open.is_empty() {
            debug!(count = open.len(), "Fermeture des méta-stores");
        }
        open.clear();
    }

    pub async fn open_count(&self) -> usize {
        self.open.lock().await.len()
    }
}

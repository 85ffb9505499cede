// FICHIER : jsonstore/src/store/mod.rs

//! Store embarqué à deux niveaux.
//!
//! - niveau externe (`outer`) : un méta-document qui enregistre, pour chaque
//!   store interne, la liste des schémas de tables déclarés ;
//! - niveau interne (`inner`) : un dossier contenant un fichier par table.
//!
//! Un [`LoadableStore`] ouvert ne voit que les schémas présents dans le
//! méta-document au moment de son ouverture : après `save_schema`, il faut
//! recharger (`reload_store`) pour que la nouvelle table soit accessible.

pub mod loadable_store;
pub mod meta_store;
pub mod transaction;

use crate::utils::fs::{self, Component, Path, PathBuf};
use crate::utils::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub use loadable_store::{LoadableStore, LoadableStoreManager, StoredRow, Table};
pub use meta_store::{MetaDocument, MetaStore, MetaStoreManager};
pub use transaction::{Operation, UpdateMode, WriteTransaction};

/// Nom du méta-document à la racine de chaque store externe.
pub const META_FILE_NAME: &str = "_meta.json";

/// Seul type de propriété supporté par les tables.
pub const PROPERTY_TYPE_STRING: &str = "string";

// --- CONFIGURATION ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    pub data_root: PathBuf,
}

impl StoreConfig {
    pub fn new(data_root: PathBuf) -> Self {
        Self { data_root }
    }

    /// Racine d'un store externe : {data_root}/{outer}
    pub fn outer_root(&self, outer: &str) -> PathBuf {
        self.data_root.join(outer)
    }

    /// Méta-document : {data_root}/{outer}/_meta.json
    pub fn meta_path(&self, outer: &str) -> PathBuf {
        self.outer_root(outer).join(META_FILE_NAME)
    }

    /// Dossier d'un store interne : {data_root}/{outer}/{inner}
    pub fn store_root(&self, outer: &str, inner: &str) -> PathBuf {
        self.outer_root(outer).join(inner)
    }

    /// Fichier d'une table : {store_root}/{schema}.json
    pub fn table_path(&self, outer: &str, inner: &str, schema: &str) -> PathBuf {
        self.store_root(outer, inner).join(format!("{schema}.json"))
    }
}

/// Normalise un chemin fourni par l'appelant (`./a//b/` -> `a/b`).
/// Le niveau externe accepte un chemin absolu, le niveau interne non.
pub fn normalize_store_path(raw: &str, allow_absolute: bool) -> Result<String> {
    let path = fs::check_sandboxed(raw, allow_absolute)?;
    if path.has_root() {
        return Ok(path.to_string_lossy().trim_end_matches('/').to_string());
    }
    let parts: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        return Err(AppError::InvalidPath(format!("chemin sans composant : {raw}")));
    }
    if !allow_absolute && parts[0] == META_FILE_NAME {
        return Err(AppError::InvalidPath(format!("nom réservé : {raw}")));
    }
    Ok(parts.join("/"))
}

// --- SCHÉMA DE TABLE ---

/// Déclaration d'une table : clé primaire + propriétés typées.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    pub name: String,
    pub primary_key: String,
    pub properties: BTreeMap<String, String>,
}

impl TableSchema {
    /// Vérifie que le schéma est utilisable comme nom de fichier et cohérent.
    pub fn validate(&self) -> Result<()> {
        let name = self.name.as_str();
        if name.is_empty()
            || name.starts_with('.')
            || name.contains(['/', '\\'])
            || Path::new(name).components().count() != 1
        {
            return Err(AppError::Database(format!(
                "Nom de schéma invalide : '{name}'"
            )));
        }
        match self.properties.get(&self.primary_key) {
            Some(t) if t == PROPERTY_TYPE_STRING => {}
            _ => {
                return Err(AppError::Database(format!(
                    "Schéma '{name}' : clé primaire '{}' absente ou non textuelle",
                    self.primary_key
                )))
            }
        }
        if let Some((prop, t)) = self
            .properties
            .iter()
            .find(|(_, t)| t.as_str() != PROPERTY_TYPE_STRING)
        {
            return Err(AppError::Database(format!(
                "Schéma '{name}' : type '{t}' non supporté pour '{prop}'"
            )));
        }
        Ok(())
    }

    /// Valide un enregistrement et retourne sa clé primaire.
    pub fn check_row<'r>(&self, row: &'r StoredRow) -> Result<&'r str> {
        for key in row.keys() {
            if !self.properties.contains_key(key) {
                return Err(AppError::Database(format!(
                    "Table '{}' : propriété inconnue '{key}'",
                    self.name
                )));
            }
        }
        for prop in self.properties.keys() {
            if !row.get(prop).is_some_and(|v| v.is_string()) {
                return Err(AppError::Database(format!(
                    "Table '{}' : propriété '{prop}' manquante ou non textuelle",
                    self.name
                )));
            }
        }
        row.get(&self.primary_key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AppError::Database(format!("Table '{}' : clé primaire manquante", self.name))
            })
    }
}

// --- MOTEUR DE STOCKAGE ---

/// Point d'entrée du store : registre des schémas et cache des stores ouverts
/// sur les deux niveaux. Destiné à être partagé via `Arc`.
#[derive(Debug)]
pub struct StorageEngine {
    config: StoreConfig,
    metas: MetaStoreManager,
    loadables: LoadableStoreManager,
}

impl StorageEngine {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            metas: MetaStoreManager::default(),
            loadables: LoadableStoreManager::default(),
        }
    }

    pub fn shared(config: StoreConfig) -> Arc<Self> {
        Arc::new(Self::new(config))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn meta_stores(&self) -> &MetaStoreManager {
        &self.metas
    }

    pub fn loadable_stores(&self) -> &LoadableStoreManager {
        &self.loadables
    }

    /// Enregistre un schéma pour (outer, inner). Idempotent.
    #[instrument(skip(self, schema), fields(schema = %schema.name))]
    pub async fn save_schema(&self, outer: &str, inner: &str, schema: &TableSchema) -> Result<()> {
        schema.validate()?;
        let (outer, inner) = normalize_pair(outer, inner)?;
        let meta = self.metas.load(&self.config, &outer).await?;
        if meta.save_schema(&inner, schema.clone()).await? {
            info!(%outer, %inner, "Schéma enregistré");
        } else {
            debug!(%outer, %inner, "Schéma déjà présent");
        }
        Ok(())
    }

    /// Désenregistre un schéma et supprime le fichier de sa table.
    #[instrument(skip(self))]
    pub async fn rm_schema(&self, outer: &str, inner: &str, schema_name: &str) -> Result<()> {
        let (outer, inner) = normalize_pair(outer, inner)?;
        let meta = self.metas.load(&self.config, &outer).await?;
        if meta.rm_schema(&inner, schema_name).await? {
            let table = self.config.table_path(&outer, &inner, schema_name);
            fs::remove_file(&table).await?;
            info!(%outer, %inner, "Schéma supprimé");
        }
        Ok(())
    }

    /// Noms des schémas enregistrés pour (outer, inner), triés.
    pub async fn get_schema_names(&self, outer: &str, inner: &str) -> Result<Vec<String>> {
        let (outer, inner) = normalize_pair(outer, inner)?;
        let meta = self.metas.load(&self.config, &outer).await?;
        Ok(meta.schema_names(&inner).await)
    }

    /// Store interne ouvert (depuis le cache, ou ouvert à la demande).
    pub async fn load_store(&self, outer: &str, inner: &str) -> Result<Arc<LoadableStore>> {
        let (outer, inner) = normalize_pair(outer, inner)?;
        let meta = self.metas.load(&self.config, &outer).await?;
        self.loadables
            .load(&self.config, &meta, &outer, &inner)
            .await
    }

    /// Ferme puis rouvre le store interne avec les schémas courants.
    #[instrument(skip(self))]
    pub async fn reload_store(&self, outer: &str, inner: &str) -> Result<Arc<LoadableStore>> {
        let (outer, inner) = normalize_pair(outer, inner)?;
        let meta = self.metas.load(&self.config, &outer).await?;
        self.loadables
            .reload(&self.config, &meta, &outer, &inner)
            .await
    }

    /// Retire un store interne du cache. `true` s'il était ouvert.
    pub async fn close_store(&self, outer: &str, inner: &str) -> Result<bool> {
        let (outer, inner) = normalize_pair(outer, inner)?;
        Ok(self.loadables.close(&outer, &inner).await)
    }

    /// Ferme tous les handles, sur les deux niveaux.
    pub async fn close_all(&self) {
        self.metas.close_all().await;
        self.loadables.close_all().await;
    }
}

fn normalize_pair(outer: &str, inner: &str) -> Result<(String, String)> {
    Ok((
        normalize_store_path(outer, true)?,
        normalize_store_path(inner, false)?,
    ))
}

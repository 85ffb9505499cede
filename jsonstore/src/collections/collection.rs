// FICHIER : jsonstore/src/collections/collection.rs

//! Handle CRUD sur les lignes d'une collection JSON.
//!
//! Contrat « auto-create » : tout accès par clé matérialise d'abord une ligne
//! vide `{}` si elle n'existe pas. `get_row` sur une clé inconnue renvoie donc
//! `{}` (et crée la ligne), `delete_row` sur une clé inconnue ne fait rien.

use super::naming::{derive_schema_name, validate_collection_name};
use super::schema::{decode_row, encode_row, gen_base_schema};
use crate::store::{LoadableStore, StorageEngine, UpdateMode, WriteTransaction};
use crate::utils::json::{self, JsonObject};
use crate::utils::Result;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone)]
pub struct JsonCollection {
    engine: Arc<StorageEngine>,
    outer_path: String,
    inner_path: String,
    collection_name: String,
    schema_name: String,
}

impl JsonCollection {
    /// Enregistre le schéma (idempotent), recharge le store, renvoie le handle.
    #[instrument(skip(engine))]
    pub async fn create(
        engine: Arc<StorageEngine>,
        outer_path: &str,
        inner_path: &str,
        collection_name: &str,
    ) -> Result<Self> {
        validate_collection_name(collection_name)?;
        engine
            .save_schema(outer_path, inner_path, &gen_base_schema(collection_name))
            .await?;
        engine.reload_store(outer_path, inner_path).await?;

        info!("Collection créée");
        Ok(Self::handle(engine, outer_path, inner_path, collection_name))
    }

    /// Ouvre un handle sur un schéma existant, sans le créer.
    /// `reload = false` pour les chargements groupés (un seul reload à la fin).
    pub async fn load(
        engine: Arc<StorageEngine>,
        outer_path: &str,
        inner_path: &str,
        collection_name: &str,
        reload: bool,
    ) -> Result<Self> {
        validate_collection_name(collection_name)?;
        let collection = Self::handle(engine, outer_path, inner_path, collection_name);
        if reload {
            collection.reload_store().await?;
        }
        Ok(collection)
    }

    fn handle(
        engine: Arc<StorageEngine>,
        outer_path: &str,
        inner_path: &str,
        collection_name: &str,
    ) -> Self {
        Self {
            engine,
            outer_path: outer_path.to_string(),
            inner_path: inner_path.to_string(),
            collection_name: collection_name.to_string(),
            schema_name: derive_schema_name(collection_name),
        }
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    pub fn outer_path(&self) -> &str {
        &self.outer_path
    }

    pub fn inner_path(&self) -> &str {
        &self.inner_path
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub async fn load_store(&self) -> Result<Arc<LoadableStore>> {
        self.engine
            .load_store(&self.outer_path, &self.inner_path)
            .await
    }

    pub async fn reload_store(&self) -> Result<Arc<LoadableStore>> {
        self.engine
            .reload_store(&self.outer_path, &self.inner_path)
            .await
    }

    // --- LECTURE ---

    /// Objet JSON de la ligne ; `{}` (matérialisé) si la clé est inconnue.
    pub async fn get_row(&self, key: &str) -> Result<JsonObject> {
        if let Some(doc) = self.find_row(key).await? {
            return Ok(doc);
        }
        self.mutate_row(key, |_| {}).await
    }

    /// Lecture sans création.
    pub async fn find_row(&self, key: &str) -> Result<Option<JsonObject>> {
        let store = self.load_store().await?;
        match store.object_for_primary_key(&self.schema_name, key).await? {
            Some(row) => Ok(Some(decode_row(&row)?.1)),
            None => Ok(None),
        }
    }

    pub async fn has_row(&self, key: &str) -> Result<bool> {
        Ok(self.find_row(key).await?.is_some())
    }

    /// Toutes les lignes, triées par clé.
    pub async fn get_all_rows(&self) -> Result<BTreeMap<String, JsonObject>> {
        let store = self.load_store().await?;
        store
            .objects(&self.schema_name)
            .await?
            .iter()
            .map(decode_row)
            .collect()
    }

    pub async fn get_all_keys(&self) -> Result<Vec<String>> {
        Ok(self.get_all_rows().await?.into_keys().collect())
    }

    pub async fn count_rows(&self) -> Result<usize> {
        self.load_store().await?.count(&self.schema_name).await
    }

    // --- ÉCRITURE (une transaction par appel) ---

    /// Remplace entièrement le JSON de la ligne.
    pub async fn set_row(&self, key: &str, new_json: JsonObject) -> Result<()> {
        self.mutate_row(key, move |doc| *doc = new_json).await?;
        Ok(())
    }

    /// Fusion superficielle : les clés de `entries` l'emportent.
    pub async fn add_entries(&self, key: &str, entries: JsonObject) -> Result<()> {
        self.mutate_row(key, move |doc| json::shallow_merge(doc, entries))
            .await?;
        Ok(())
    }

    /// Retire les clés de premier niveau listées ; les absentes sont ignorées.
    pub async fn delete_entries<S: AsRef<str>>(&self, key: &str, keys_to_rm: &[S]) -> Result<()> {
        self.mutate_row(key, |doc| {
            json::remove_keys(doc, keys_to_rm);
        })
        .await?;
        Ok(())
    }

    pub async fn delete_row(&self, key: &str) -> Result<()> {
        let store = self.load_store().await?;
        let schema = self.schema_name.as_str();
        let deleted = store.write(|tx| tx.delete(schema, key)).await?;
        debug!(collection = %self.collection_name, key, deleted, "Ligne supprimée");
        Ok(())
    }

    /// Vide la collection, désenregistre son schéma et recharge le store.
    #[instrument(skip(self), fields(collection = %self.collection_name))]
    pub async fn delete_collection(&self) -> Result<()> {
        let store = self.load_store().await?;
        let schema = self.schema_name.as_str();
        if store.has_schema(schema).await {
            let count = store.write(|tx| tx.delete_all(schema)).await?;
            debug!(count, "Lignes supprimées");
        }

        self.engine
            .rm_schema(&self.outer_path, &self.inner_path, schema)
            .await?;
        self.reload_store().await?;
        info!("Collection supprimée");
        Ok(())
    }

    /// Lit (ou matérialise) la ligne, applique `f`, réécrit : une seule transaction.
    async fn mutate_row<F>(&self, key: &str, f: F) -> Result<JsonObject>
    where
        F: FnOnce(&mut JsonObject),
    {
        let store = self.load_store().await?;
        let schema = self.schema_name.as_str();
        store
            .write(|tx| {
                let mut doc = current_doc(tx, schema, key)?;
                f(&mut doc);
                tx.create(schema, encode_row(key, &doc)?, UpdateMode::Modified)?;
                Ok(doc)
            })
            .await
    }
}

fn current_doc(tx: &WriteTransaction<'_>, schema: &str, key: &str) -> Result<JsonObject> {
    match tx.get(schema, key)? {
        Some(row) => Ok(decode_row(row)?.1),
        None => Ok(JsonObject::new()),
    }
}

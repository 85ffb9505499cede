// FICHIER : jsonstore/src/collections/manager.rs

use super::collection::JsonCollection;
use super::naming::{recover_collection_name, validate_collection_name};
use crate::store::{StorageEngine, StoreConfig};
use crate::utils::{AppConfig, AppError, Result};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Registre des collections ouvertes, indexé par nom logique.
/// Les entrées vivent en mémoire uniquement ; rien n'est persisté ici.
#[derive(Debug)]
pub struct CollectionsManager {
    engine: Arc<StorageEngine>,
    collections: HashMap<String, JsonCollection>,
}

/// Registre par défaut du processus : configuration lue dans l'environnement
/// (`JSONSTORE_DATA_ROOT`), sinon le dossier `data` relatif.
impl Default for CollectionsManager {
    fn default() -> Self {
        Self::with_config(AppConfig::default().store_config())
    }
}

impl CollectionsManager {
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self {
            engine,
            collections: HashMap::new(),
        }
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self::new(StorageEngine::shared(config))
    }

    pub fn engine(&self) -> &Arc<StorageEngine> {
        &self.engine
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    pub fn get_collection(&self, name: &str) -> Result<&JsonCollection> {
        self.collections
            .get(name)
            .ok_or_else(|| AppError::CollectionNotFound(name.to_string()))
    }

    /// Crée la collection si le nom n'est pas encore chargé.
    /// Sinon renvoie le handle existant ; les chemins fournis sont alors ignorés.
    pub async fn create_collection(
        &mut self,
        outer_path: &str,
        inner_path: &str,
        name: &str,
    ) -> Result<JsonCollection> {
        if let Some(existing) = self.collections.get(name) {
            debug!(
                collection = name,
                outer = existing.outer_path(),
                inner = existing.inner_path(),
                "Collection déjà chargée, chemins demandés ignorés"
            );
            return Ok(existing.clone());
        }

        let collection =
            JsonCollection::create(self.engine.clone(), outer_path, inner_path, name).await?;
        self.collections.insert(name.to_string(), collection.clone());
        Ok(collection)
    }

    /// Supprime la collection (lignes + schéma) si elle est chargée ; no-op sinon.
    pub async fn remove_collection(&mut self, name: &str) -> Result<()> {
        if let Some(collection) = self.collections.get(name) {
            collection.delete_collection().await?;
        }
        self.collections.remove(name);
        Ok(())
    }

    /// Retire le handle du registre sans toucher au store.
    pub fn unload_collection(&mut self, name: &str) -> Option<JsonCollection> {
        self.collections.remove(name)
    }

    /// Charge toutes les collections persistées à (outer, inner) avec un seul
    /// rechargement du store. Retourne le nombre de collections découvertes.
    #[instrument(skip(self))]
    pub async fn load_collections(&mut self, outer_path: &str, inner_path: &str) -> Result<usize> {
        let names = self
            .get_loadable_collection_names(outer_path, inner_path)
            .await?;

        let mut loaded = Vec::with_capacity(names.len());
        for name in &names {
            let collection =
                JsonCollection::load(self.engine.clone(), outer_path, inner_path, name, false)
                    .await?;
            loaded.push(collection);
        }

        self.engine.reload_store(outer_path, inner_path).await?;

        for collection in loaded {
            self.collections
                .insert(collection.collection_name().to_string(), collection);
        }
        info!(count = names.len(), "Collections chargées");
        Ok(names.len())
    }

    /// Découverte seule : noms logiques des schémas persistés, dédoublonnés.
    /// Les noms invalides (ex. `legacy_name_JSON`) sont ignorés avec un `warn!`.
    pub async fn get_loadable_collection_names(
        &self,
        outer_path: &str,
        inner_path: &str,
    ) -> Result<BTreeSet<String>> {
        let schema_names = self.engine.get_schema_names(outer_path, inner_path).await?;
        let mut names = BTreeSet::new();
        for name in schema_names.iter().filter_map(|s| recover_collection_name(s)) {
            // Un nom que `JsonCollection::load` refuserait ne doit pas bloquer le lot
            if let Err(e) = validate_collection_name(name) {
                warn!(outer = outer_path, inner = inner_path, error = %e, "Schéma ignoré");
                continue;
            }
            names.insert(name.to_string());
        }
        Ok(names)
    }

    pub fn get_all_loaded_collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn get_all_loaded_collections(&self) -> Vec<JsonCollection> {
        let mut all: Vec<JsonCollection> = self.collections.values().cloned().collect();
        all.sort_by(|a, b| a.collection_name().cmp(b.collection_name()));
        all
    }

    /// Ferme tous les stores ouverts (deux niveaux). Les entrées du registre
    /// sont conservées : chaque opération rouvre son store à la demande.
    pub async fn close_all_collections(&self) {
        self.engine.close_all().await;
    }
}

// FICHIER : jsonstore/src/store/loadable_store.rs

//! Niveau interne : un dossier, une table (fichier JSON) par schéma déclaré.

use super::meta_store::MetaStore;
use super::transaction::WriteTransaction;
use super::{StoreConfig, TableSchema};
use crate::utils::fs::{self, PathBuf};
use crate::utils::json::{Map, Value};
use crate::utils::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// Un enregistrement : propriétés textuelles, dont la clé primaire.
pub type StoredRow = Map<String, Value>;

/// Table chargée en mémoire, triée par clé primaire.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub schema: TableSchema,
    pub rows: BTreeMap<String, StoredRow>,
}

impl Table {
    pub fn empty(schema: TableSchema) -> Self {
        Self {
            schema,
            rows: BTreeMap::new(),
        }
    }
}

/// Format disque d'une table.
#[derive(Debug, Serialize, Deserialize)]
struct TableFile {
    schema: String,
    #[serde(default)]
    rows: Vec<StoredRow>,
}

/// Store interne ouvert : instantané des tables visibles au moment de l'ouverture.
#[derive(Debug)]
pub struct LoadableStore {
    label: String,
    root: PathBuf,
    tables: RwLock<BTreeMap<String, Table>>,
}

impl LoadableStore {
    /// Ouvre le store avec l'ensemble de schémas fourni et charge leurs tables.
    pub async fn open(
        config: &StoreConfig,
        outer: &str,
        inner: &str,
        schemas: Vec<TableSchema>,
    ) -> Result<Self> {
        let root = config.store_root(outer, inner);
        let mut tables = BTreeMap::new();

        for schema in schemas {
            let path = root.join(format!("{}.json", schema.name));
            let mut table = Table::empty(schema);
            if let Some(file) = fs::read_json_opt::<TableFile>(&path).await? {
                if file.schema != table.schema.name {
                    return Err(AppError::corruption(
                        &path,
                        format!("table '{}' attendue, '{}' trouvée", table.schema.name, file.schema),
                    ));
                }
                for row in file.rows {
                    let id = table
                        .schema
                        .check_row(&row)
                        .map_err(|e| AppError::corruption(&path, e))?
                        .to_string();
                    table.rows.insert(id, row);
                }
            }
            tables.insert(table.schema.name.clone(), table);
        }

        Ok(Self {
            label: format!("{outer}::{inner}"),
            root,
            tables: RwLock::new(tables),
        })
    }

    /// Identifiant lisible "outer::inner".
    pub fn label(&self) -> &str {
        &self.label
    }

    pub async fn schema_names(&self) -> Vec<String> {
        self.tables.read().await.keys().cloned().collect()
    }

    pub async fn has_schema(&self, schema: &str) -> bool {
        self.tables.read().await.contains_key(schema)
    }

    pub async fn object_for_primary_key(&self, schema: &str, id: &str) -> Result<Option<StoredRow>> {
        let tables = self.tables.read().await;
        Ok(self.table(&tables, schema)?.rows.get(id).cloned())
    }

    /// Tous les enregistrements d'une table, triés par clé primaire.
    pub async fn objects(&self, schema: &str) -> Result<Vec<StoredRow>> {
        let tables = self.tables.read().await;
        Ok(self.table(&tables, schema)?.rows.values().cloned().collect())
    }

    pub async fn count(&self, schema: &str) -> Result<usize> {
        let tables = self.tables.read().await;
        Ok(self.table(&tables, schema)?.rows.len())
    }

    /// Portée d'écriture atomique.
    ///
    /// Le bloc prépare ses modifications sur des copies ; les tables touchées
    /// sont écrites sur disque (écriture atomique par fichier) puis publiées.
    /// Si le bloc ou l'écriture échoue, l'état visible reste inchangé.
    pub async fn write<F, T>(&self, op_block: F) -> Result<T>
    where
        F: FnOnce(&mut WriteTransaction<'_>) -> Result<T>,
    {
        let mut tables = self.tables.write().await;

        let mut tx = WriteTransaction::new(&self.label, &tables);
        let out = op_block(&mut tx)?;
        let tx_id = tx.id.clone();
        let op_count = tx.operations.len();
        let staged = tx.into_staged();

        for (name, table) in &staged {
            let file = TableFile {
                schema: name.clone(),
                rows: table.rows.values().cloned().collect(),
            };
            let path = self.root.join(format!("{name}.json"));
            fs::write_json_atomic(&path, &file).await?;
        }

        debug!(tx = %tx_id, store = %self.label, ops = op_count, "Transaction publiée");
        tables.extend(staged);
        Ok(out)
    }

    fn table<'t>(&self, tables: &'t BTreeMap<String, Table>, schema: &str) -> Result<&'t Table> {
        tables.get(schema).ok_or_else(|| AppError::SchemaNotLoaded {
            schema: schema.to_string(),
            store: self.label.clone(),
        })
    }
}

/// Cache des stores internes ouverts, indexé par (outer, inner).
#[derive(Debug, Default)]
pub struct LoadableStoreManager {
    open: Mutex<HashMap<(String, String), Arc<LoadableStore>>>,
}

impl LoadableStoreManager {
    pub async fn load(
        &self,
        config: &StoreConfig,
        meta: &MetaStore,
        outer: &str,
        inner: &str,
    ) -> Result<Arc<LoadableStore>> {
        let mut open = self.open.lock().await;
        let key = (outer.to_string(), inner.to_string());
        if let Some(store) = open.get(&key) {
            return Ok(store.clone());
        }
        let store = Arc::new(LoadableStore::open(config, outer, inner, meta.schemas(inner).await).await?);
        open.insert(key, store.clone());
        Ok(store)
    }

    /// Retire le handle du cache puis rouvre. En cas d'échec, le cache reste
    /// vide pour (outer, inner) : le prochain accès retentera l'ouverture.
    pub async fn reload(
        &self,
        config: &StoreConfig,
        meta: &MetaStore,
        outer: &str,
        inner: &str,
    ) -> Result<Arc<LoadableStore>> {
        let mut open = self.open.lock().await;
        let key = (outer.to_string(), inner.to_string());
        open.remove(&key);

        let schemas = meta.schemas(inner).await;
        let store = Arc::new(LoadableStore::open(config, outer, inner, schemas).await?);
        open.insert(key, store.clone());
        info!(store = %store.label(), schemas = ?store.schema_names().await, "Store rechargé");
        Ok(store)
    }

    pub async fn close(&self, outer: &str, inner: &str) -> bool {
        self.open
            .lock()
            .await
            .remove(&(outer.to_string(), inner.to_string()))
            .is_some()
    }

    pub async fn close_all(&self) {
        let mut open = self.open.lock().await;
        if !open.is_empty() {
            debug!(count = open.len(), "Fermeture des stores internes");
        }
        open.clear();
    }

    pub async fn open_count(&self) -> usize {
        self.open.lock().await.len()
    }
}

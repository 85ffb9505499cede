// FICHIER : jsonstore/src/store/transaction.rs

use super::loadable_store::{StoredRow, Table};
use crate::utils::{AppError, Result};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Comportement de `create` quand la clé primaire existe déjà.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Échoue si l'enregistrement existe.
    Never,
    /// Remplace l'enregistrement existant.
    Modified,
}

/// Opération appliquée dans une transaction (journal en mémoire).
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Insert { table: String, id: String },
    Update { table: String, id: String },
    Delete { table: String, id: String },
    Clear { table: String, count: usize },
}

/// Une transaction d'écriture en cours de construction (Staging Area).
/// Les tables touchées sont copiées à la première modification ; rien n'est
/// visible des lecteurs avant la publication par `LoadableStore::write`.
pub struct WriteTransaction<'a> {
    pub id: String,
    pub operations: Vec<Operation>,
    store_label: &'a str,
    base: &'a BTreeMap<String, Table>,
    staged: BTreeMap<String, Table>,
}

impl<'a> WriteTransaction<'a> {
    pub(crate) fn new(store_label: &'a str, base: &'a BTreeMap<String, Table>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            operations: Vec::new(),
            store_label,
            base,
            staged: BTreeMap::new(),
        }
    }

    /// Lecture cohérente avec les écritures déjà faites dans la transaction.
    pub fn get(&self, table: &str, id: &str) -> Result<Option<&StoredRow>> {
        let t = match self.staged.get(table) {
            Some(t) => t,
            None => self.base_table(table)?,
        };
        Ok(t.rows.get(id))
    }

    pub fn create(&mut self, table: &str, row: StoredRow, mode: UpdateMode) -> Result<()> {
        let t = self.staged_table(table)?;
        let id = t.schema.check_row(&row)?.to_string();
        let exists = t.rows.contains_key(&id);
        if exists && mode == UpdateMode::Never {
            return Err(AppError::Database(format!(
                "Table '{table}' : la clé '{id}' existe déjà"
            )));
        }
        t.rows.insert(id.clone(), row);
        let table = table.to_string();
        self.operations.push(if exists {
            Operation::Update { table, id }
        } else {
            Operation::Insert { table, id }
        });
        Ok(())
    }

    /// Supprime un enregistrement. `false` s'il était absent.
    pub fn delete(&mut self, table: &str, id: &str) -> Result<bool> {
        let t = self.staged_table(table)?;
        if t.rows.remove(id).is_none() {
            return Ok(false);
        }
        self.operations.push(Operation::Delete {
            table: table.to_string(),
            id: id.to_string(),
        });
        Ok(true)
    }

    /// Vide une table. Retourne le nombre d'enregistrements supprimés.
    pub fn delete_all(&mut self, table: &str) -> Result<usize> {
        let t = self.staged_table(table)?;
        let count = t.rows.len();
        t.rows.clear();
        self.operations.push(Operation::Clear {
            table: table.to_string(),
            count,
        });
        Ok(count)
    }

    pub(crate) fn into_staged(self) -> BTreeMap<String, Table> {
        self.staged
    }

    fn base_table(&self, table: &str) -> Result<&'a Table> {
        self.base.get(table).ok_or_else(|| AppError::SchemaNotLoaded {
            schema: table.to_string(),
            store: self.store_label.to_string(),
        })
    }

    fn staged_table(&mut self, table: &str) -> Result<&mut Table> {
        if !self.staged.contains_key(table) {
            let copy = self.base_table(table)?.clone();
            self.staged.insert(table.to_string(), copy);
        }
        self.staged
            .get_mut(table)
            .ok_or_else(|| AppError::Database(format!("Table '{table}' non préparée")))
    }
}

// FICHIER : jsonstore/src/collections/schema.rs

//! Représentation disque d'une ligne : `{ "id": <string>, "jsonStr": <string> }`.
//! `jsonStr` contient la sérialisation compacte de l'objet JSON de la ligne.

use super::naming::derive_schema_name;
use crate::store::{StoredRow, TableSchema, PROPERTY_TYPE_STRING};
use crate::utils::json::{self, JsonObject, Value};
use crate::utils::{AppError, Result};
use std::collections::BTreeMap;

pub const ID_KEY: &str = "id";
pub const JSON_KEY: &str = "jsonStr";

/// Schéma de table d'une collection JSON.
pub fn gen_base_schema(collection_name: &str) -> TableSchema {
    TableSchema {
        name: derive_schema_name(collection_name),
        primary_key: ID_KEY.to_string(),
        properties: BTreeMap::from([
            (ID_KEY.to_string(), PROPERTY_TYPE_STRING.to_string()),
            (JSON_KEY.to_string(), PROPERTY_TYPE_STRING.to_string()),
        ]),
    }
}

pub fn encode_row(id: &str, doc: &JsonObject) -> Result<StoredRow> {
    let mut row = StoredRow::new();
    row.insert(ID_KEY.to_string(), Value::String(id.to_string()));
    row.insert(JSON_KEY.to_string(), Value::String(json::stringify(doc)?));
    Ok(row)
}

pub fn decode_row(row: &StoredRow) -> Result<(String, JsonObject)> {
    let id = row
        .get(ID_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::Database(format!("Ligne sans '{ID_KEY}'")))?;
    let raw = row
        .get(JSON_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::Database(format!("Ligne '{id}' sans '{JSON_KEY}'")))?;

    match json::parse::<Value>(raw)? {
        Value::Object(doc) => Ok((id.to_string(), doc)),
        other => Err(AppError::Database(format!(
            "Ligne '{id}' : objet JSON attendu, {other} trouvé"
        ))),
    }
}

// FICHIER : jsonstore/src/utils/json.rs

use crate::utils::{AppError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

// --- RE-EXPORTS (Single Source of Truth pour le JSON) ---
pub use serde_json::{json, Map, Value};

/// Objet JSON ouvert, ordre d'insertion préservé (feature `preserve_order`).
pub type JsonObject = Map<String, Value>;

/// Parse une chaîne JSON en un type T.
pub fn parse<T: DeserializeOwned>(s: &str) -> Result<T> {
    serde_json::from_str(s).map_err(AppError::from)
}

/// Convertit un type T en chaîne JSON compacte.
pub fn stringify<T: Serialize>(v: &T) -> Result<String> {
    serde_json::to_string(v).map_err(AppError::from)
}

/// Convertit un type T en chaîne JSON formatée (pretty).
pub fn stringify_pretty<T: Serialize>(v: &T) -> Result<String> {
    serde_json::to_string_pretty(v).map_err(AppError::from)
}

/// Fusion superficielle : les clés de `entries` écrasent celles de `target`.
pub fn shallow_merge(target: &mut JsonObject, entries: JsonObject) {
    for (k, v) in entries {
        target.insert(k, v);
    }
}

/// Retire les clés de premier niveau listées ; les clés absentes sont ignorées.
/// Retourne le nombre de clés effectivement retirées.
pub fn remove_keys<S: AsRef<str>>(target: &mut JsonObject, keys: &[S]) -> usize {
    keys.iter()
        .filter(|k| target.shift_remove(k.as_ref()).is_some())
        .count()
}

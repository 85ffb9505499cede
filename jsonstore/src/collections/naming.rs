// FICHIER : jsonstore/src/collections/naming.rs

use crate::utils::{AppError, Result};

pub const JSON_SCHEMA_SUFFIX: &str = "JSON";
pub const SUFFIX_DELIMITER: char = '_';

/// `Users` -> `Users_JSON`
pub fn derive_schema_name(collection_name: &str) -> String {
    format!("{collection_name}{SUFFIX_DELIMITER}{JSON_SCHEMA_SUFFIX}")
}

/// Nom logique : tout ce qui précède le dernier délimiteur.
/// `None` pour un schéma sans délimiteur (pas une collection).
pub fn recover_collection_name(schema_name: &str) -> Option<&str> {
    schema_name
        .rfind(SUFFIX_DELIMITER)
        .map(|idx| &schema_name[..idx])
}

/// Un nom logique doit survivre à l'aller-retour derive/recover
/// et servir de nom de fichier de table.
pub fn validate_collection_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("nom vide".to_string())
    } else if name.contains(SUFFIX_DELIMITER) {
        Some(format!("le délimiteur '{SUFFIX_DELIMITER}' est interdit"))
    } else if name.contains(['/', '\\']) || name.starts_with('.') {
        Some("caractères de chemin interdits".to_string())
    } else {
        None
    };

    match reason {
        Some(reason) => Err(AppError::InvalidCollectionName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_for_valid_names() {
        for name in ["TestJson1", "users", "Émotions", "a-b.c", "42"] {
            validate_collection_name(name).unwrap();
            let schema = derive_schema_name(name);
            assert_eq!(recover_collection_name(&schema), Some(name));
        }
        assert_eq!(derive_schema_name("Users"), "Users_JSON");
    }

    #[test]
    fn test_recover_uses_last_delimiter() {
        assert_eq!(recover_collection_name("a_b_JSON"), Some("a_b"));
        assert_eq!(recover_collection_name("Graph_NODE"), Some("Graph"));
        assert_eq!(recover_collection_name("_JSON"), Some(""));
        assert_eq!(recover_collection_name("plain"), None);
    }

    #[test]
    fn test_validation_rejects_ambiguous_names() {
        for bad in ["", "a_b", "_", "x/y", "..", ".hidden", "a\\b"] {
            assert!(
                matches!(
                    validate_collection_name(bad),
                    Err(AppError::InvalidCollectionName { .. })
                ),
                "'{bad}' aurait dû être refusé"
            );
        }
    }
}

// FICHIER : jsonstore/src/utils/error.rs

use std::io;
use std::path::PathBuf;

/// Type de résultat standard de la librairie.
pub type Result<T> = std::result::Result<T, AppError>;

/// Enumération centrale des erreurs du store et des collections.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Erreur de configuration : {0}")]
    Config(String),

    #[error("Erreur d'entrée/sortie : {0}")]
    Io(#[from] io::Error),

    #[error("Erreur Base de Données : {0}")]
    Database(String),

    #[error("Erreur de sérialisation : {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Collection introuvable : {0}")]
    CollectionNotFound(String),

    #[error("Nom de collection invalide '{name}' : {reason}")]
    InvalidCollectionName { name: String, reason: String },

    #[error("Schéma '{schema}' absent du store chargé '{store}' (rechargement requis ?)")]
    SchemaNotLoaded { schema: String, store: String },

    #[error("Chemin de store invalide : {0}")]
    InvalidPath(String),

    #[error("Données corrompues dans {path:?} : {reason}")]
    Corruption { path: PathBuf, reason: String },
}

impl AppError {
    /// Helper pour les erreurs de corruption (méta-document ou table illisible).
    pub fn corruption(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        AppError::Corruption {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

// Permet de faire : return Err("Mon erreur".into());
impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::Database(s)
    }
}

impl From<&str> for AppError {
    fn from(s: &str) -> Self {
        AppError::Database(s.to_string())
    }
}

// FICHIER : jsonstore/src/utils/config.rs

use crate::store::StoreConfig;
use crate::utils::{env, json, AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Variables d'environnement reconnues (Single Source of Truth)
pub const ENV_DATA_ROOT: &str = "JSONSTORE_DATA_ROOT";
pub const ENV_LOG_LEVEL: &str = "JSONSTORE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "JSONSTORE_LOG_DIR";

/// Configuration applicative : emplacement des données et journalisation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub data_root: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dossier des logs fichiers (JSON, rotation quotidienne). Aucun fichier si absent.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

/// Racine des données quand l'environnement ne fournit rien.
pub const DEFAULT_DATA_ROOT: &str = "data";

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for AppConfig {
    /// Environnement si disponible, sinon `DEFAULT_DATA_ROOT`.
    fn default() -> Self {
        Self::from_env().unwrap_or_else(|_| Self::new(DEFAULT_DATA_ROOT))
    }
}

impl AppConfig {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            log_level: default_log_level(),
            log_dir: None,
        }
    }

    /// Charge la configuration depuis un fichier JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Lecture impossible de {:?} : {}", path, e))
        })?;
        let config: AppConfig = json::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Construit la configuration depuis l'environnement.
    pub fn from_env() -> Result<Self> {
        let data_root = PathBuf::from(env::get(ENV_DATA_ROOT)?);
        let config = Self {
            data_root,
            log_level: env::get_or(ENV_LOG_LEVEL, "warn"),
            log_dir: env::get_optional(ENV_LOG_DIR).map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.data_root.as_os_str().is_empty() {
            return Err(AppError::Config("'data_root' ne peut pas être vide".into()));
        }
        Ok(())
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.data_root.clone())
    }
}

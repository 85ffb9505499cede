// FICHIER : jsonstore/src/utils/mod.rs

// =========================================================================
//  Foundation Layer : erreurs, configuration, logs, I/O, JSON
// =========================================================================

pub mod config;
pub mod env;
pub mod error;
pub mod fs;
pub mod json;
pub mod logger;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use logger::init_logging;

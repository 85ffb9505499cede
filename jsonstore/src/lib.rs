pub mod collections;
pub mod store;
pub mod utils;

pub use collections::{CollectionsManager, JsonCollection};
pub use store::{StorageEngine, StoreConfig};
pub use utils::{AppError, Result};

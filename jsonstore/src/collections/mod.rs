//! Collections de documents JSON au-dessus du store embarqué.

pub mod collection;
pub mod manager;
pub mod naming;
pub mod schema;

pub use collection::JsonCollection;
pub use manager::CollectionsManager;
pub use naming::{derive_schema_name, recover_collection_name, validate_collection_name};

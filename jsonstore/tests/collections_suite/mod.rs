// FICHIER : jsonstore/tests/collections_suite/mod.rs

use jsonstore::collections::CollectionsManager;
use jsonstore::store::{StorageEngine, StoreConfig};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

pub struct TestEnv {
    pub cfg: StoreConfig,
    pub engine: Arc<StorageEngine>,
    // Le dossier temporaire est supprimé quand cette variable sort du scope
    pub _tmp_dir: tempfile::TempDir,
}

impl TestEnv {
    pub fn manager(&self) -> CollectionsManager {
        CollectionsManager::new(self.engine.clone())
    }

    /// Nouveau moteur sur les mêmes fichiers (simule un redémarrage).
    pub fn fresh_engine(&self) -> Arc<StorageEngine> {
        StorageEngine::shared(self.cfg.clone())
    }
}

pub fn init_test_env() -> TestEnv {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("info")
            .with_test_writer()
            .try_init();
    });

    let tmp_dir = tempfile::tempdir().expect("create temp dir");
    let cfg = StoreConfig::new(tmp_dir.path().to_path_buf());
    let engine = StorageEngine::shared(cfg.clone());

    TestEnv {
        cfg,
        engine,
        _tmp_dir: tmp_dir,
    }
}

pub fn obj(v: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    v.as_object().cloned().expect("objet JSON attendu")
}

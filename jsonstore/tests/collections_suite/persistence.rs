// FICHIER : jsonstore/tests/collections_suite/persistence.rs

use crate::common::{init_test_env, obj};
use jsonstore::collections::JsonCollection;
use jsonstore::store::META_FILE_NAME;
use serde_json::{json, Value};

#[tokio::test]
async fn on_disk_layout_is_two_levels() {
    let env = init_test_env();
    let mut mgr = env.manager();
    let col = mgr.create_collection("M1", "L1", "Users").await.unwrap();
    col.set_row("u1", obj(json!({ "n": 1 }))).await.unwrap();

    let meta_path = env.cfg.data_root.join("M1").join(META_FILE_NAME);
    let table_path = env.cfg.data_root.join("M1/L1/Users_JSON.json");
    assert!(meta_path.exists(), "meta absent : {:?}", meta_path);
    assert!(table_path.exists(), "table absente : {:?}", table_path);

    let meta: Value = serde_json::from_str(&std::fs::read_to_string(&meta_path).unwrap()).unwrap();
    assert!(meta.pointer("/stores/L1/schemas/Users_JSON").is_some());

    // Ligne stockée : { id, jsonStr }
    let table: Value = serde_json::from_str(&std::fs::read_to_string(&table_path).unwrap()).unwrap();
    let rows = table["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], "u1");
    assert_eq!(rows[0]["jsonStr"], r#"{"n":1}"#);

    // Suppression : fichier de table retiré
    mgr.remove_collection("Users").await.unwrap();
    assert!(!table_path.exists());
}

#[tokio::test]
async fn handle_on_stale_store_sees_schema_after_reload() {
    let env = init_test_env();
    let mut mgr = env.manager();
    mgr.create_collection("M1", "L1", "First").await.unwrap();

    // Schéma enregistré sans rechargement : le store ouvert ne le voit pas
    let late = JsonCollection::load(env.engine.clone(), "M1", "L1", "Late", false)
        .await
        .unwrap();
    env.engine
        .save_schema("M1", "L1", &jsonstore::collections::schema::gen_base_schema("Late"))
        .await
        .unwrap();
    assert!(matches!(
        late.get_row("k").await,
        Err(jsonstore::AppError::SchemaNotLoaded { .. })
    ));

    late.reload_store().await.unwrap();
    assert_eq!(late.count_rows().await.unwrap(), 0);
}

#[tokio::test]
async fn corrupted_table_file_is_reported() {
    let env = init_test_env();
    let mut mgr = env.manager();
    mgr.create_collection("M1", "L1", "Broken").await.unwrap();
    mgr.close_all_collections().await;

    let table_path = env.cfg.data_root.join("M1/L1/Broken_JSON.json");
    std::fs::create_dir_all(table_path.parent().unwrap()).unwrap();
    std::fs::write(&table_path, "{ pas du json").unwrap();

    let col = mgr.get_collection("Broken").unwrap();
    assert!(matches!(
        col.get_row("k").await,
        Err(jsonstore::AppError::Corruption { .. })
    ));
}

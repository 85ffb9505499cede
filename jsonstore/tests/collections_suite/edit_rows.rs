// FICHIER : jsonstore/tests/collections_suite/edit_rows.rs

use crate::common::{init_test_env, obj};
use jsonstore::utils::json::JsonObject;
use serde_json::json;

#[tokio::test]
async fn edit_rows_lifecycle() {
    let env = init_test_env();
    let mut mgr = env.manager();
    let col = mgr.create_collection("M1", "L1", "TestJson1").await.unwrap();

    // 1. Ligne inconnue : matérialisée vide
    assert_eq!(col.get_row("row1").await.unwrap(), JsonObject::new());

    // 2. Remplacement complet
    let initial = obj(json!({ "name": "Alice", "age": 30, "tags": ["a", "b"] }));
    col.set_row("row1", initial.clone()).await.unwrap();
    assert_eq!(col.get_row("row1").await.unwrap(), initial);

    // 3. Fusion superficielle
    col.add_entries("row1", obj(json!({ "age": 31, "city": "Lyon" })))
        .await
        .unwrap();
    assert_eq!(
        col.get_row("row1").await.unwrap(),
        obj(json!({ "name": "Alice", "age": 31, "tags": ["a", "b"], "city": "Lyon" }))
    );

    // 4. Retrait de clés (les absentes sont ignorées)
    col.delete_entries("row1", &["tags", "missing"]).await.unwrap();
    assert_eq!(
        col.get_row("row1").await.unwrap(),
        obj(json!({ "name": "Alice", "age": 31, "city": "Lyon" }))
    );

    // 5. Suppression puis relecture : contrat auto-create
    col.delete_row("row1").await.unwrap();
    assert!(!col.has_row("row1").await.unwrap());
    assert_eq!(col.get_row("row1").await.unwrap(), JsonObject::new());
}

#[tokio::test]
async fn add_entries_replaces_nested_values_wholesale() {
    let env = init_test_env();
    let mut mgr = env.manager();
    let col = mgr.create_collection("M1", "L1", "Nested").await.unwrap();

    col.set_row("k", obj(json!({ "cfg": { "a": 1, "b": 2 } })))
        .await
        .unwrap();
    col.add_entries("k", obj(json!({ "cfg": { "c": 3 } })))
        .await
        .unwrap();

    assert_eq!(col.get_row("k").await.unwrap()["cfg"], json!({ "c": 3 }));
}

#[tokio::test]
async fn collections_sharing_a_store_stay_isolated() {
    let env = init_test_env();
    let mut mgr = env.manager();
    let a = mgr.create_collection("M1", "L1", "A").await.unwrap();
    let b = mgr.create_collection("M1", "L1", "B").await.unwrap();

    a.set_row("same", obj(json!({ "from": "A" }))).await.unwrap();
    b.set_row("same", obj(json!({ "from": "B" }))).await.unwrap();

    assert_eq!(a.get_row("same").await.unwrap()["from"], "A");
    assert_eq!(b.get_row("same").await.unwrap()["from"], "B");

    // Suppression de B : A intact
    mgr.remove_collection("B").await.unwrap();
    assert_eq!(a.get_all_keys().await.unwrap(), vec!["same"]);
}

#[tokio::test]
async fn concurrent_merges_are_not_lost() {
    let env = init_test_env();
    let mut mgr = env.manager();
    let col = mgr.create_collection("M1", "L1", "Counters").await.unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let col = col.clone();
        handles.push(tokio::spawn(async move {
            let mut entry = JsonObject::new();
            entry.insert(format!("k{i}"), json!(i));
            col.add_entries("shared", entry).await.unwrap();
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    assert_eq!(col.get_row("shared").await.unwrap().len(), 16);
}

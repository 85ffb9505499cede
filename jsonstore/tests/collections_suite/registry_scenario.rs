// FICHIER : jsonstore/tests/collections_suite/registry_scenario.rs

use crate::common::init_test_env;
use jsonstore::AppError;
use std::collections::BTreeSet;

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn four_collections_then_progressive_removal() {
    let env = init_test_env();
    let mut mgr = env.manager();

    mgr.create_collection("M1", "L1", "A").await.unwrap();
    mgr.create_collection("M1", "L1", "B").await.unwrap();
    mgr.create_collection("M1", "L2", "C").await.unwrap();
    mgr.create_collection("M2", "L1", "D").await.unwrap();

    // 1. Découverte par couple de chemins
    assert_eq!(
        mgr.get_loadable_collection_names("M1", "L1").await.unwrap(),
        set(&["A", "B"])
    );
    assert_eq!(
        mgr.get_loadable_collection_names("M1", "L2").await.unwrap(),
        set(&["C"])
    );
    assert_eq!(
        mgr.get_loadable_collection_names("M2", "L1").await.unwrap(),
        set(&["D"])
    );
    assert_eq!(mgr.get_all_loaded_collection_names(), vec!["A", "B", "C", "D"]);

    // 2. Suppression progressive
    mgr.remove_collection("B").await.unwrap();
    assert_eq!(
        mgr.get_loadable_collection_names("M1", "L1").await.unwrap(),
        set(&["A"])
    );
    assert_eq!(mgr.get_all_loaded_collection_names(), vec!["A", "C", "D"]);

    mgr.remove_collection("C").await.unwrap();
    assert!(mgr
        .get_loadable_collection_names("M1", "L2")
        .await
        .unwrap()
        .is_empty());

    mgr.remove_collection("A").await.unwrap();
    mgr.remove_collection("D").await.unwrap();
    assert!(mgr.get_all_loaded_collection_names().is_empty());
    assert!(mgr.get_all_loaded_collections().is_empty());
    for (outer, inner) in [("M1", "L1"), ("M1", "L2"), ("M2", "L1")] {
        assert!(
            mgr.get_loadable_collection_names(outer, inner)
                .await
                .unwrap()
                .is_empty(),
            "{outer}/{inner} devrait être vide"
        );
    }

    // Suppression répétée : no-op
    mgr.remove_collection("A").await.unwrap();
}

#[tokio::test]
async fn four_collections_reload_per_path_pair() {
    let env = init_test_env();
    {
        let mut mgr = env.manager();
        mgr.create_collection("M1", "L1", "A").await.unwrap();
        mgr.create_collection("M1", "L1", "B").await.unwrap();
        mgr.create_collection("M1", "L2", "C").await.unwrap();
        mgr.create_collection("M2", "L1", "D").await.unwrap();
        mgr.close_all_collections().await;
    }

    let mut mgr = jsonstore::CollectionsManager::new(env.fresh_engine());
    let pairs = [
        ("M1", "L1", set(&["A", "B"])),
        ("M1", "L2", set(&["C"])),
        ("M2", "L1", set(&["D"])),
    ];

    let mut total = 0;
    for (outer, inner, expected) in &pairs {
        total += mgr.load_collections(outer, inner).await.unwrap();
        assert_eq!(
            &mgr.get_loadable_collection_names(outer, inner).await.unwrap(),
            expected
        );
    }

    assert_eq!(total, 4);
    assert_eq!(mgr.get_all_loaded_collection_names(), vec!["A", "B", "C", "D"]);
    let c = mgr.get_collection("C").unwrap();
    assert_eq!((c.outer_path(), c.inner_path()), ("M1", "L2"));
}

#[tokio::test]
async fn load_collections_restores_registry_after_restart() {
    let env = init_test_env();
    {
        let mut mgr = env.manager();
        mgr.create_collection("M1", "L1", "A").await.unwrap();
        mgr.create_collection("M1", "L1", "B").await.unwrap();
        let a = mgr.get_collection("A").unwrap();
        a.set_row("k", crate::common::obj(serde_json::json!({ "x": 1 })))
            .await
            .unwrap();
        mgr.close_all_collections().await;
    }

    let mut mgr = jsonstore::CollectionsManager::new(env.fresh_engine());
    assert!(mgr.get_all_loaded_collection_names().is_empty());

    assert_eq!(mgr.load_collections("M1", "L1").await.unwrap(), 2);
    assert_eq!(mgr.get_all_loaded_collection_names(), vec!["A", "B"]);

    let a = mgr.get_collection("A").unwrap();
    assert_eq!(a.get_row("k").await.unwrap()["x"], 1);
    assert_eq!(mgr.get_collection("B").unwrap().count_rows().await.unwrap(), 0);
}

#[tokio::test]
async fn registry_errors() {
    let env = init_test_env();
    let mut mgr = env.manager();

    assert!(matches!(
        mgr.get_collection("absent"),
        Err(AppError::CollectionNotFound(_))
    ));

    for bad in ["", "a_b", "a/b", ".hidden"] {
        let res = mgr.create_collection("M1", "L1", bad).await;
        assert!(
            matches!(res, Err(AppError::InvalidCollectionName { .. })),
            "'{bad}' aurait dû être refusé"
        );
    }
    assert!(mgr.get_all_loaded_collection_names().is_empty());

    // Chemins hors de la racine
    let res = mgr.create_collection("M1", "../evasion", "X").await;
    assert!(matches!(res, Err(AppError::InvalidPath(_))));
}

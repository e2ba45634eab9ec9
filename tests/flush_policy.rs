use json_docstore::{DocumentStore, FlushPolicy};
use serde_json::json;

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("json_docstore_test_{}.json", name))
}

#[test]
fn immediate_is_the_default() {
    let path = temp_path("default_policy");
    let _ = std::fs::remove_file(&path);
    let db = DocumentStore::open(&path).unwrap();
    assert_eq!(db.policy(), FlushPolicy::Immediate);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn immediate_flush_after_mutate() {
    let path = temp_path("immediate");
    let _ = std::fs::remove_file(&path);
    let db = DocumentStore::builder(&path)
        .policy(FlushPolicy::Immediate)
        .build()
        .unwrap();
    db.insert("c", json!({"key": "x", "value": 42})).unwrap();
    drop(db);
    let db2 = DocumentStore::open(&path).unwrap();
    assert_eq!(db2.query("c", "key", "x").unwrap()["value"], 42);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn manual_flush_only_on_call() {
    let path = temp_path("manual");
    let _ = std::fs::remove_file(&path);
    let db = DocumentStore::builder(&path)
        .policy(FlushPolicy::Manual)
        .build()
        .unwrap();
    db.insert("c", json!({"key": "a"})).unwrap();
    db.delete_collection("other").unwrap();
    assert!(!path.exists());

    db.flush().unwrap();
    drop(db);
    let db2 = DocumentStore::open(&path).unwrap();
    assert_eq!(db2.collection("c"), vec![json!({"key": "a"})]);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn pretty_output_is_indented() {
    let path = temp_path("pretty");
    let _ = std::fs::remove_file(&path);
    let db = DocumentStore::builder(&path).pretty(true).build().unwrap();
    db.insert("c", json!({"key": "a"})).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains('\n'));
    assert!(raw.contains("\n  \"c\""));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn compact_output_is_one_line() {
    let path = temp_path("compact");
    let _ = std::fs::remove_file(&path);
    let db = DocumentStore::open(&path).unwrap();
    db.insert("c", json!({"key": "a"})).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert_eq!(raw, r#"{"c":[{"key":"a"}]}"#);
    let _ = std::fs::remove_file(&path);
}

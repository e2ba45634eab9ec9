use json_docstore::DocumentStore;
use serde_json::json;

fn main() -> Result<(), json_docstore::Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let path = std::env::temp_dir().join("json_docstore_example_basic.json");
    let _ = std::fs::remove_file(&path);

    let db = DocumentStore::builder(&path)
        .pretty(true)
        .seed_default(true)
        .build()?;
    println!("collections after seeding = {:?}", db.collection_names());

    // upsert by "key"
    db.insert("users", json!({"key": "u1", "name": "Alice"}))?;
    db.insert("users", json!({"key": "u2", "name": "Bob"}))?;
    db.insert("users", json!({"key": "u1", "name": "Alice Cooper"}))?;
    println!("users = {:?}", db.collection("users"));

    println!("u2 = {:?}", db.query("users", "key", "u2"));
    db.delete("users", "key", "u1")?;

    // predicate removal
    db.append("events", json!({"level": "debug"}))?;
    db.append("events", json!({"level": "error"}))?;
    let dropped = db.delete_where("events", |e| e["level"] == "debug")?;
    println!("dropped {dropped} debug events");

    db.delete_collection("default")?;

    let contents = std::fs::read_to_string(db.path())?;
    println!("On-disk JSON:\n{contents}");

    let _ = std::fs::remove_file(&path);
    Ok(())
}

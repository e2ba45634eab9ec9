//! In-memory document model and the pure collection operations the store
//! builds on. Nothing in here touches the disk.

use serde_json::Value;
use std::collections::BTreeMap;

/// One stored value. No schema, anything JSON can hold.
pub type Record = Value;

/// Ordered sequence of records.
pub type Collection = Vec<Record>;

/// Whole persisted state: collection name -> records. Ordered so the file on
/// disk has a stable key order between saves.
pub type Document = BTreeMap<String, Collection>;

/// `true` when `record[field]` is the string `key`. Non-object records and
/// non-string field values never match.
pub fn field_matches(record: &Record, field: &str, key: &str) -> bool {
    matches!(record.get(field), Some(Value::String(s)) if s == key)
}

/// Index of the first record whose `field` is the string `key`.
pub fn position(collection: &[Record], field: &str, key: &str) -> Option<usize> {
    collection.iter().position(|r| field_matches(r, field, key))
}

/// Replace the record whose `key_field` equals the item's, in place, or
/// append if there is none (or the item has no such field). Returns the
/// replaced record.
///
/// The comparison is on the raw JSON value, so a numeric key only matches a
/// numeric key.
pub fn upsert(collection: &mut Collection, key_field: &str, item: Record) -> Option<Record> {
    let existing = item
        .get(key_field)
        .and_then(|key| collection.iter().position(|r| r.get(key_field) == Some(key)));
    match existing {
        Some(i) => Some(std::mem::replace(&mut collection[i], item)),
        None => {
            collection.push(item);
            None
        }
    }
}

/// Remove the first record whose `field` is the string `key`, keeping the
/// order of the rest.
pub fn remove_first(collection: &mut Collection, field: &str, key: &str) -> Option<Record> {
    position(collection, field, key).map(|i| collection.remove(i))
}

/// Keep only records for which `keep` is true. Returns how many were dropped.
pub fn retain<F>(collection: &mut Collection, mut keep: F) -> usize
where
    F: FnMut(&Record) -> bool,
{
    let before = collection.len();
    collection.retain(|r| keep(r));
    before - collection.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users() -> Collection {
        vec![
            json!({"key": "u1", "name": "Alice"}),
            json!({"key": "u2", "name": "Bob"}),
            json!({"key": "u3", "name": "Carol"}),
        ]
    }

    #[test]
    fn field_matches_only_strings() {
        let r = json!({"key": "1", "n": 1});
        assert!(field_matches(&r, "key", "1"));
        assert!(!field_matches(&r, "n", "1"));
        assert!(!field_matches(&r, "missing", "1"));
        assert!(!field_matches(&json!("key"), "key", "key"));
        assert!(!field_matches(&json!([1, 2]), "key", "1"));
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut c = users();
        let old = upsert(&mut c, "key", json!({"key": "u2", "name": "Robert"}));
        assert_eq!(old, Some(json!({"key": "u2", "name": "Bob"})));
        assert_eq!(c.len(), 3);
        assert_eq!(c[1], json!({"key": "u2", "name": "Robert"}));
    }

    #[test]
    fn upsert_appends_new_key() {
        let mut c = users();
        assert!(upsert(&mut c, "key", json!({"key": "u4"})).is_none());
        assert_eq!(c.len(), 4);
        assert_eq!(c[3], json!({"key": "u4"}));
    }

    #[test]
    fn upsert_without_key_field_always_appends() {
        let mut c = vec![json!({"name": "x"})];
        upsert(&mut c, "key", json!({"name": "x"}));
        upsert(&mut c, "key", json!(42));
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn upsert_honours_custom_key_field() {
        let mut c = vec![json!({"id": 7, "v": 1})];
        upsert(&mut c, "id", json!({"id": 7, "v": 2}));
        assert_eq!(c, vec![json!({"id": 7, "v": 2})]);
    }

    #[test]
    fn remove_first_is_stable() {
        let mut c = users();
        c.push(json!({"key": "u1", "name": "Alice again"}));
        let removed = remove_first(&mut c, "key", "u1").unwrap();
        assert_eq!(removed["name"], "Alice");
        let names: Vec<_> = c.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, ["Bob", "Carol", "Alice again"]);
    }

    #[test]
    fn remove_first_missing_leaves_collection() {
        let mut c = users();
        assert!(remove_first(&mut c, "key", "nope").is_none());
        assert_eq!(c, users());
    }

    #[test]
    fn retain_counts_dropped() {
        let mut c = users();
        let dropped = retain(&mut c, |r| r["name"] != "Bob");
        assert_eq!(dropped, 1);
        assert_eq!(position(&c, "key", "u2"), None);
        assert_eq!(position(&c, "key", "u3"), Some(1));
    }
}

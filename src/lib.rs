//! Flat-file JSON document store with named collections.
//!
//! One JSON file holds an object whose keys are collection names and whose
//! values are arrays of arbitrary records. The whole file is loaded on open
//! and rewritten (atomically) after every mutation.
//!
//! ```rust,no_run
//! use json_docstore::DocumentStore;
//! use serde_json::json;
//!
//! let db = DocumentStore::open("db.json").unwrap();
//! db.insert("users", json!({"key": "u1", "name": "Alice"})).unwrap();
//! assert_eq!(db.query("users", "key", "u1").unwrap()["name"], "Alice");
//! db.delete("users", "key", "u1").unwrap();
//! ```
//!
//! **Single-process only.** If multiple processes open the same file they will
//! clobber each other. Use advisory file locking or a real database for
//! multi-process access.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod flush;
pub mod persist;
pub mod serializer;
pub mod store;

pub use document::{Collection, Document, Record};
pub use error::{Error, Result};
pub use flush::FlushPolicy;
pub use store::{DocumentStore, DocumentStoreBuilder};

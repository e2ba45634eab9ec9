//! Core store type and builder.

use crate::document::{self, Collection, Document, Record};
use crate::error::{Error, Result};
use crate::flush::FlushPolicy;
use crate::persist::{atomic_write, load, seed_if_missing};
use crate::serializer::{JsonSerializer, Serializer};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Field `insert` matches on unless the builder says otherwise.
pub const DEFAULT_KEY_FIELD: &str = "key";

/// Flat-file JSON document store.
///
/// Holds named collections of arbitrary JSON records in memory and rewrites
/// the whole backing file after each mutation (with the default
/// [`FlushPolicy::Immediate`]). Use [`open`](Self::open) for a quick start or
/// [`builder`](Self::builder) for pretty output, seeding, and the rest.
///
/// Every method takes `&self`; the document sits behind a lock that is held
/// across a mutation and its save, so one store can be shared between threads.
/// Caller closures never run under that lock. Two stores on the same file will
/// clobber each other.
pub struct DocumentStore {
    doc: RwLock<Document>,
    path: PathBuf,
    serializer: JsonSerializer,
    policy: FlushPolicy,
    key_field: String,
}

impl DocumentStore {
    /// Open (or create) a store at `path` with immediate saves and compact
    /// JSON. A missing or empty file gives an empty document.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder(path).build()
    }

    /// Start configuring a new store. Call [`.build()`](DocumentStoreBuilder::build)
    /// when ready.
    pub fn builder(path: impl AsRef<Path>) -> DocumentStoreBuilder {
        DocumentStoreBuilder::new(path)
    }

    // ---- reads ----

    /// Snapshot of the named collection.
    ///
    /// A collection that doesn't exist yet is created empty under `name`.
    /// That creation is in memory only; it reaches the file with the next
    /// save. Use [`with_collection`](Self::with_collection) to mutate.
    pub fn collection(&self, name: &str) -> Collection {
        if let Some(c) = self.doc.read().get(name) {
            return c.clone();
        }
        self.doc.write().entry(name.to_string()).or_default().clone()
    }

    /// First record in `collection` whose `field` is the string `key`.
    /// Never creates the collection and never saves.
    #[must_use]
    pub fn query(&self, collection: &str, field: &str, key: &str) -> Option<Record> {
        let doc = self.doc.read();
        let records = doc.get(collection)?;
        document::position(records, field, key).map(|i| records[i].clone())
    }

    /// [`query`](Self::query), then deserialize the record into `T`.
    pub fn query_as<T>(&self, collection: &str, field: &str, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.query(collection, field, key)
            .map(|r| serde_json::from_value(r).map_err(Error::from))
            .transpose()
    }

    /// Names of all collections, sorted.
    #[must_use]
    pub fn collection_names(&self) -> Vec<String> {
        self.doc.read().keys().cloned().collect()
    }

    /// `true` if a collection with this name exists (even if empty).
    #[must_use]
    pub fn contains_collection(&self, name: &str) -> bool {
        self.doc.read().contains_key(name)
    }

    /// Path to the backing JSON file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Field [`insert`](Self::insert) uses to find the record to replace.
    #[must_use]
    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    /// The flush policy this store was built with.
    #[must_use]
    pub fn policy(&self) -> FlushPolicy {
        self.policy
    }

    // ---- writes ----

    /// Upsert `item` into `collection`.
    ///
    /// If the item has the key field and a record with an equal key is
    /// already there, that record is replaced at its position and returned.
    /// Otherwise the item is appended. Saves either way.
    pub fn insert<T: Serialize>(&self, collection: &str, item: T) -> Result<Option<Record>> {
        let item = to_record(item)?;
        let mut doc = self.doc.write();
        let replaced = document::upsert(
            doc.entry(collection.to_string()).or_default(),
            &self.key_field,
            item,
        );
        self.notify_mutation(&doc)?;
        Ok(replaced)
    }

    /// Append `item` to `collection` without looking for an existing key.
    pub fn append<T: Serialize>(&self, collection: &str, item: T) -> Result<()> {
        let item = to_record(item)?;
        let mut doc = self.doc.write();
        doc.entry(collection.to_string()).or_default().push(item);
        self.notify_mutation(&doc)
    }

    /// Remove the first record whose `field` is the string `key`.
    ///
    /// Returns `false`, without touching the file, when nothing matched.
    pub fn delete(&self, collection: &str, field: &str, key: &str) -> Result<bool> {
        let mut doc = self.doc.write();
        let removed = doc
            .get_mut(collection)
            .and_then(|records| document::remove_first(records, field, key));
        if removed.is_none() {
            return Ok(false);
        }
        self.notify_mutation(&doc)?;
        Ok(true)
    }

    /// Keep only the records for which `keep` returns `true`. Returns how many
    /// were removed. Saves even when nothing was.
    ///
    /// `keep` runs without the store locked, so it may read the store. See
    /// [`with_collection`](Self::with_collection) for when it runs again.
    pub fn retain<F>(&self, collection: &str, mut keep: F) -> Result<usize>
    where
        F: FnMut(&Record) -> bool,
    {
        self.modify(collection, |records| document::retain(records, &mut keep))
    }

    /// Remove every record for which `predicate` returns `true`. The inverse
    /// of [`retain`](Self::retain).
    pub fn delete_where<F>(&self, collection: &str, mut predicate: F) -> Result<usize>
    where
        F: FnMut(&Record) -> bool,
    {
        self.retain(collection, |r| !predicate(r))
    }

    /// Drop a collection and all its records. Saves even if it didn't exist;
    /// returns whether it did.
    pub fn delete_collection(&self, collection: &str) -> Result<bool> {
        let mut doc = self.doc.write();
        let existed = doc.remove(collection).is_some();
        self.notify_mutation(&doc)?;
        Ok(existed)
    }

    /// Mutate a collection in place, then save. The collection is created
    /// if missing.
    ///
    /// `f` works on a copy with the store unlocked, so it can call back into
    /// the store. If the collection changes before the copy is written back,
    /// `f` runs again on a fresh copy; it must not itself modify the
    /// collection it was handed through the store, or it never settles.
    pub fn with_collection<F, R>(&self, collection: &str, f: F) -> Result<R>
    where
        F: FnMut(&mut Collection) -> R,
    {
        self.modify(collection, f)
    }

    // ---- persistence ----

    /// Write the whole document to disk (atomic temp-file + rename).
    pub fn flush(&self) -> Result<()> {
        let doc = self.doc.read();
        self.save(&doc)
    }

    // ---- internal ----

    /// Copy the collection out, run `f` on the copy with no lock held, then
    /// swap the copy in if nobody touched the collection meanwhile.
    fn modify<F, R>(&self, collection: &str, mut f: F) -> Result<R>
    where
        F: FnMut(&mut Collection) -> R,
    {
        loop {
            let before = self.doc.read().get(collection).cloned();
            let mut working = before.clone().unwrap_or_default();
            let out = f(&mut working);

            let mut doc = self.doc.write();
            if doc.get(collection) != before.as_ref() {
                tracing::debug!(collection, "collection changed during update, retrying");
                continue;
            }
            doc.insert(collection.to_string(), working);
            self.notify_mutation(&doc)?;
            return Ok(out);
        }
    }

    fn notify_mutation(&self, doc: &Document) -> Result<()> {
        if self.policy.saves_on_mutation() {
            self.save(doc)?;
        }
        Ok(())
    }

    fn save(&self, doc: &Document) -> Result<()> {
        let written = self
            .serializer
            .serialize(doc)
            .and_then(|bytes| atomic_write(&self.path, &bytes).map(|()| bytes.len()));
        match written {
            Ok(bytes) => {
                tracing::debug!(path = %self.path.display(), bytes, "saved document");
                Ok(())
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "failed to save document");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("path", &self.path)
            .field("policy", &self.policy)
            .field("key_field", &self.key_field)
            .finish_non_exhaustive()
    }
}

fn to_record<T: Serialize>(item: T) -> Result<Record> {
    serde_json::to_value(item).map_err(|e| Error::Serialize(e.to_string()))
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures and opens a [`DocumentStore`].
///
/// ```rust,no_run
/// use json_docstore::DocumentStore;
///
/// let db = DocumentStore::builder("db.json")
///     .pretty(true)
///     .seed_default(true)
///     .build()
///     .unwrap();
/// ```
pub struct DocumentStoreBuilder {
    path: PathBuf,
    policy: FlushPolicy,
    pretty: bool,
    seed_default: bool,
    lenient: bool,
    key_field: String,
}

impl DocumentStoreBuilder {
    fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            policy: FlushPolicy::Immediate,
            pretty: false,
            seed_default: false,
            lenient: false,
            key_field: DEFAULT_KEY_FIELD.to_string(),
        }
    }

    /// Set the flush policy (default: [`FlushPolicy::Immediate`]).
    pub fn policy(mut self, policy: FlushPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Write human-readable JSON with two-space indentation (default: compact).
    pub fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }

    /// When the file doesn't exist, write one with a `"default"` collection
    /// holding a placeholder record before loading (default: off).
    pub fn seed_default(mut self, yes: bool) -> Self {
        self.seed_default = yes;
        self
    }

    /// On a file that can't be read or parsed, log the error and start from an
    /// empty document instead of failing (default: off). The bad file is
    /// overwritten by the next save.
    pub fn lenient(mut self, yes: bool) -> Self {
        self.lenient = yes;
        self
    }

    /// Field `insert` upserts on (default: `"key"`).
    pub fn key_field(mut self, field: impl Into<String>) -> Self {
        self.key_field = field.into();
        self
    }

    /// Load (or create) the store.
    pub fn build(self) -> Result<DocumentStore> {
        if self.path.as_os_str().is_empty() {
            return Err(Error::Config("store path is empty".into()));
        }
        if self.key_field.is_empty() {
            return Err(Error::Config("key field is empty".into()));
        }

        let serializer = if self.pretty {
            JsonSerializer::pretty()
        } else {
            JsonSerializer::new()
        };

        if self.seed_default {
            match seed_if_missing(&self.path, &serializer) {
                Ok(true) => {
                    tracing::info!(path = %self.path.display(), "wrote seed document");
                }
                Ok(false) => {}
                Err(e) if self.lenient => {
                    tracing::error!(path = %self.path.display(), error = %e, "failed to write seed document");
                }
                Err(e) => return Err(e),
            }
        }

        let doc = match load(&self.path, &serializer) {
            Ok(doc) => doc,
            Err(e) if self.lenient => {
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to load document, starting empty"
                );
                Document::new()
            }
            Err(e) => return Err(e),
        };
        tracing::debug!(
            path = %self.path.display(),
            collections = doc.len(),
            "opened document store"
        );

        Ok(DocumentStore {
            doc: RwLock::new(doc),
            path: self.path,
            serializer,
            policy: self.policy,
            key_field: self.key_field,
        })
    }
}

impl std::fmt::Debug for DocumentStoreBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStoreBuilder")
            .field("path", &self.path)
            .field("policy", &self.policy)
            .field("pretty", &self.pretty)
            .field("seed_default", &self.seed_default)
            .field("lenient", &self.lenient)
            .field("key_field", &self.key_field)
            .finish()
    }
}

//! Disk I/O helpers: load from file, seed a fresh file, and atomic write.
//!
//! The rename-over approach is close to atomic on most platforms. On NTFS
//! (Windows) it's reliable; on FAT32 or network shares there are no hard
//! guarantees. If that matters to you, keep backups or use a real database.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::serializer::Serializer;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Name of the collection written into a seeded file.
pub const DEFAULT_COLLECTION: &str = "default";

/// Reads and deserializes the file at `path`. Returns an empty document if the
/// file is missing or empty (not an error).
pub fn load<S: Serializer>(path: &Path, serializer: &S) -> Result<Document> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
        Err(e) => return Err(Error::Io(e.to_string())),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Document::new());
    }
    serializer.deserialize(&bytes)
}

/// The document a seeded file starts with: one `"default"` collection holding
/// a single placeholder record.
pub fn seed_document() -> Document {
    let mut doc = Document::new();
    doc.insert(
        DEFAULT_COLLECTION.to_string(),
        vec![json!({
            "key": "This is a default key.",
            "value": "This is a default value."
        })],
    );
    doc
}

/// Write the seed document to `path` unless something is already there.
/// Returns `true` if a file was written.
pub fn seed_if_missing<S: Serializer>(path: &Path, serializer: &S) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    let bytes = serializer.serialize(&seed_document())?;
    atomic_write(path, &bytes)?;
    Ok(true)
}

/// Write `bytes` to `<path>.tmp` and then rename over `path`. This avoids
/// leaving a half-written file if the process crashes mid-write.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_path(path)?;
    let written = std::fs::write(&tmp, bytes).and_then(|()| std::fs::rename(&tmp, path));
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(Error::Io(e.to_string()));
    }
    Ok(())
}

/// `<file name>.tmp` next to `path`. Appended to the whole name so `data` and
/// `data.json` never share a temp file.
fn tmp_path(path: &Path) -> Result<PathBuf> {
    let mut name = path
        .file_name()
        .ok_or_else(|| Error::Config(format!("{} has no file name", path.display())))?
        .to_os_string();
    name.push(".tmp");
    Ok(path.with_file_name(name))
}

//! Cache file persistence
//!
//! The whole store is written as one JSON document. Writes go to a temporary
//! file in the same directory which is then renamed over the target, so a
//! reader (or a crash mid-write) only ever sees the previous or the new
//! complete file.

use std::fs::{self, DirBuilder};
use std::io::{self, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use tempfile::{Builder, NamedTempFile};
use tracing::debug;

use super::{CacheError, EntryStore};

/// Reads the store from `path`
///
/// A missing file yields [`CacheError::NotFound`] and malformed content
/// yields [`CacheError::CorruptState`], so callers can tell the two apart.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<EntryStore<T>, CacheError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(CacheError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(unavailable(path, e)),
    };

    serde_json::from_str(&content).map_err(|source| CacheError::CorruptState {
        path: path.to_path_buf(),
        source,
    })
}

/// Atomically replaces the file at `path` with the serialized store
pub fn save<T: Serialize>(path: &Path, store: &EntryStore<T>) -> Result<(), CacheError> {
    let json = serde_json::to_vec_pretty(store).map_err(CacheError::Encode)?;

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        ensure_dir(dir).map_err(|e| unavailable(dir, e))?;
    }

    let temp = stage(path, &json)?;
    commit(temp, path)?;

    debug!(path = %path.display(), entries = store.len(), "Cache file written");
    Ok(())
}

/// Writes `contents` to a uniquely named temporary sibling of `path`
///
/// Each call gets its own file, so concurrent writers to the same target never
/// share a staging file. The file is removed when the handle is dropped
/// without being committed.
pub(crate) fn stage(path: &Path, contents: &[u8]) -> Result<NamedTempFile, CacheError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cache".to_string());
    let prefix = format!(".{file_name}.");

    // tempfile creates the file owner-only (0600) on unix.
    let mut temp = Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| unavailable(dir, e))?;

    temp.write_all(contents)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| unavailable(temp.path(), e))?;

    Ok(temp)
}

/// Renames the staged file over `path`; on failure the staged file is removed
pub(crate) fn commit(temp: NamedTempFile, path: &Path) -> Result<(), CacheError> {
    temp.persist(path)
        .map(|_| ())
        .map_err(|e| unavailable(path, e.error))
}

fn ensure_dir(dir: &Path) -> io::Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)
}

fn unavailable(path: &Path, source: io::Error) -> CacheError {
    CacheError::PersistenceUnavailable {
        path: path.to_path_buf(),
        source,
    }
}

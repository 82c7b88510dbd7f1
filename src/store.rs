//! Entry persistence. The whole list is written as one JSON array on every
//! change; there is no incremental update.

use crate::errors::StoreError;
use crate::journal_entry::JournalEntry;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::{Arc, Mutex};
use tracing::debug;

pub trait EntryStore {
    /// Returns the stored entries, newest first. An empty store is `Ok(vec![])`.
    fn load(&self) -> Result<Vec<JournalEntry>, StoreError>;

    /// Overwrites the stored list in full.
    fn save(&mut self, entries: &[JournalEntry]) -> Result<(), StoreError>;
}

fn encode(entries: &[JournalEntry]) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(entries)?)
}

fn decode(blob: &str) -> Result<Vec<JournalEntry>, StoreError> {
    if blob.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(blob)?)
}

/// JSON file on disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        JsonFileStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EntryStore for JsonFileStore {
    fn load(&self) -> Result<Vec<JournalEntry>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(serialized) => decode(&serialized),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no journal file yet");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes to a sibling temp file, syncs it, then renames over the target
    /// so a crash mid-write never leaves a truncated journal.
    fn save(&mut self, entries: &[JournalEntry]) -> Result<(), StoreError> {
        let serialized = encode(entries)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(serialized.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &self.path)?;
        debug!(path = %self.path.display(), count = entries.len(), "journal written");
        Ok(())
    }
}

/// In-memory blob store. Clones share the same blob.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MemoryStore {
    blob: Arc<Mutex<Option<String>>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        MemoryStore {
            blob: Arc::new(Mutex::new(Some(blob.into()))),
        }
    }

    pub fn blob(&self) -> Option<String> {
        self.blob.lock().map(|b| b.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl EntryStore for MemoryStore {
    fn load(&self) -> Result<Vec<JournalEntry>, StoreError> {
        match self.blob() {
            Some(blob) => decode(&blob),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, entries: &[JournalEntry]) -> Result<(), StoreError> {
        let serialized = encode(entries)?;
        if let Ok(mut blob) = self.blob.lock() {
            *blob = Some(serialized);
        }
        Ok(())
    }
}

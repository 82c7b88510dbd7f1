use crate::journal_entry::JournalEntry;
use crate::store::EntryStore;
use tracing::{error, info, warn};

/// The saved entries, newest first, plus the store they are mirrored to.
pub struct Journal {
    entries: Vec<JournalEntry>,
    store: Box<dyn EntryStore>,
}

impl Journal {
    /// Reads the store once. Unreadable or malformed data yields an empty
    /// journal; the two cases are not told apart.
    pub fn load(store: Box<dyn EntryStore>) -> Self {
        let entries = match store.load() {
            Ok(entries) => {
                info!(count = entries.len(), "journal loaded");
                entries
            }
            Err(e) => {
                warn!(error = %e, "journal could not be read, starting empty");
                Vec::new()
            }
        };
        Journal { entries, store }
    }

    /// Prepends the entry and rewrites the whole list to the store. A failed
    /// write is logged; the in-memory list stays authoritative.
    pub fn add_entry(&mut self, entry: JournalEntry) {
        self.entries.insert(0, entry);
        if let Err(e) = self.store.save(&self.entries) {
            error!(error = %e, count = self.entries.len(), "failed to persist journal");
        }
    }

    pub fn get_entries(&self) -> &[JournalEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreError;
    use crate::journal_entry::Mood;
    use crate::store::MemoryStore;

    fn entry(mood: Mood, text: &str) -> JournalEntry {
        JournalEntry::new(
            mood,
            text.to_string(),
            "quote".to_string(),
            "author".to_string(),
            "1/2/2026".to_string(),
        )
    }

    struct FailingStore;

    impl EntryStore for FailingStore {
        fn load(&self) -> Result<Vec<JournalEntry>, StoreError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into())
        }

        fn save(&mut self, _entries: &[JournalEntry]) -> Result<(), StoreError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into())
        }
    }

    #[test]
    fn add_entry_prepends_and_persists() {
        let store = MemoryStore::new();
        let mut journal = Journal::load(Box::new(store.clone()));

        journal.add_entry(entry(Mood::Happy, "first"));
        journal.add_entry(entry(Mood::Sad, "second"));

        let texts: Vec<&str> = journal.get_entries().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["second", "first"]);

        let reloaded = Journal::load(Box::new(store));
        assert_eq!(reloaded.get_entries(), journal.get_entries());
    }

    #[test]
    fn malformed_store_loads_empty() {
        let journal = Journal::load(Box::new(MemoryStore::with_blob("[{\"mood\":")));
        assert!(journal.get_entries().is_empty());
    }

    #[test]
    fn failing_store_keeps_entries_in_memory() {
        let mut journal = Journal::load(Box::new(FailingStore));
        assert!(journal.get_entries().is_empty());

        journal.add_entry(entry(Mood::Neutral, "kept"));

        assert_eq!(journal.get_entries().len(), 1);
        assert_eq!(journal.get_entries()[0].text, "kept");
    }
}

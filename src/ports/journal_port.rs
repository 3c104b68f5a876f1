//! Trade journal storage port.

use crate::domain::error::AlphamindError;
use crate::domain::journal::{JournalEntry, JournalUpdate};

pub trait JournalPort {
    fn append(&self, entry: &JournalEntry) -> Result<(), AlphamindError>;

    /// All entries in insertion order.
    fn entries(&self) -> Result<Vec<JournalEntry>, AlphamindError>;

    /// Applies a partial update to the entry with `id`. Returns `false`, and
    /// changes nothing, when no such entry exists.
    fn update(&self, id: &str, update: &JournalUpdate) -> Result<bool, AlphamindError>;

    /// Returns whether an entry was removed.
    fn delete(&self, id: &str) -> Result<bool, AlphamindError>;

    fn replace_all(&self, entries: &[JournalEntry]) -> Result<(), AlphamindError>;

    fn find(&self, id: &str) -> Result<Option<JournalEntry>, AlphamindError> {
        Ok(self.entries()?.into_iter().find(|e| e.id == id))
    }
}

//! Journal stored as a single pretty-printed JSON array.
//!
//! Every mutating operation reads the whole file and rewrites it. A missing
//! file is an empty journal.

use crate::domain::error::AlphamindError;
use crate::domain::journal::{export_json, JournalEntry, JournalUpdate};
use crate::ports::journal_port::JournalPort;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct JsonJournalAdapter {
    path: PathBuf,
}

impl JsonJournalAdapter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<JournalEntry>, AlphamindError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AlphamindError::Journal {
                    reason: format!("failed to read {}: {}", self.path.display(), e),
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| AlphamindError::Journal {
            reason: format!("corrupt journal {}: {}", self.path.display(), e),
        })
    }

    fn store(&self, entries: &[JournalEntry]) -> Result<(), AlphamindError> {
        let body = export_json(entries)?;
        fs::write(&self.path, body).map_err(|e| AlphamindError::Journal {
            reason: format!("failed to write {}: {}", self.path.display(), e),
        })
    }
}

impl JournalPort for JsonJournalAdapter {
    fn append(&self, entry: &JournalEntry) -> Result<(), AlphamindError> {
        let mut entries = self.load()?;
        entries.push(entry.clone());
        self.store(&entries)
    }

    fn entries(&self) -> Result<Vec<JournalEntry>, AlphamindError> {
        self.load()
    }

    fn update(&self, id: &str, update: &JournalUpdate) -> Result<bool, AlphamindError> {
        let mut entries = self.load()?;
        let Some(entry) = entries.iter_mut().find(|e| e.id == id) else {
            return Ok(false);
        };
        update.apply(entry);
        self.store(&entries)?;
        Ok(true)
    }

    fn delete(&self, id: &str) -> Result<bool, AlphamindError> {
        let mut entries = self.load()?;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Ok(false);
        }
        self.store(&entries)?;
        Ok(true)
    }

    fn replace_all(&self, entries: &[JournalEntry]) -> Result<(), AlphamindError> {
        self.store(entries)
    }
}

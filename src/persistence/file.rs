//! JSON file tally store
//!
//! Document: `{ "version": 1, "total_stars": N }`. Writes go to a sibling
//! temp file which is then renamed over the real one, so a crash mid-write
//! leaves the previous tally intact.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{PersistenceError, TallyDocument, TallyStore};

#[derive(Debug)]
pub struct JsonFileTallyStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl JsonFileTallyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Read the stored tally; a missing file is an empty tally
    pub fn load(&self) -> Result<u64, PersistenceError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        Ok(TallyDocument::parse(&json)?.total_stars)
    }

    /// Write the tally via temp file + rename
    pub fn store(&self, total_stars: u64) -> Result<(), PersistenceError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&TallyDocument::new(total_stars))?;
        let tmp = self.temp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn load_or_zero(&self) -> u64 {
        self.load().unwrap_or_else(|e| {
            log::warn!("Failed to read tally from {}: {e}", self.path.display());
            0
        })
    }

    fn store_logged(&self, total_stars: u64) {
        if let Err(e) = self.store(total_stars) {
            log::warn!("Failed to write tally to {}: {e}", self.path.display());
        }
    }
}

impl TallyStore for JsonFileTallyStore {
    fn get_tally(&self) -> u64 {
        self.load_or_zero()
    }

    fn increment_tally(&self) {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let next = self.load_or_zero().saturating_add(1);
        self.store_logged(next);
    }

    fn set_tally(&self, value: u64) {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.store_logged(value);
    }
}

//! LocalStorage tally store (wasm32)

use super::{PersistenceError, TallyDocument, TallyStore};

#[derive(Debug, Clone)]
pub struct LocalStorageTallyStore {
    key: String,
}

impl Default for LocalStorageTallyStore {
    fn default() -> Self {
        Self::new("tilt_maze_tally")
    }
}

impl LocalStorageTallyStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Result<web_sys::Storage, PersistenceError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| PersistenceError::Unavailable("no LocalStorage".into()))
    }

    pub fn load(&self) -> Result<u64, PersistenceError> {
        let Ok(Some(json)) = Self::storage()?.get_item(&self.key) else {
            return Ok(0);
        };
        Ok(TallyDocument::parse(&json)?.total_stars)
    }

    pub fn store(&self, total_stars: u64) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(&TallyDocument::new(total_stars))?;
        Self::storage()?
            .set_item(&self.key, &json)
            .map_err(|_| PersistenceError::Unavailable("LocalStorage write rejected".into()))
    }

    fn load_or_zero(&self) -> u64 {
        self.load().unwrap_or_else(|e| {
            log::warn!("Failed to read tally: {e}");
            0
        })
    }
}

impl TallyStore for LocalStorageTallyStore {
    fn get_tally(&self) -> u64 {
        self.load_or_zero()
    }

    fn increment_tally(&self) {
        if let Err(e) = self.store(self.load_or_zero().saturating_add(1)) {
            log::warn!("Failed to write tally: {e}");
        }
    }

    fn set_tally(&self, value: u64) {
        if let Err(e) = self.store(value) {
            log::warn!("Failed to write tally: {e}");
        }
    }
}

//! Star tally storage
//!
//! The session reads the tally once when it starts and then only sends
//! writes. Writes are fire-and-forget: stores log their own failures and
//! never report them back to gameplay.
//!
//! Stores:
//! - [`MemoryTallyStore`]: shared in-process counter
//! - [`JsonFileTallyStore`]: versioned JSON document on disk (native)
//! - [`BackgroundTallyStore`]: moves another store's writes to a worker thread (native)
//! - `LocalStorageTallyStore`: browser LocalStorage (wasm32)

#[cfg(not(target_arch = "wasm32"))]
pub mod background;
#[cfg(not(target_arch = "wasm32"))]
pub mod file;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(not(target_arch = "wasm32"))]
pub use background::BackgroundTallyStore;
#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonFileTallyStore;
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorageTallyStore;

/// Current tally document version
pub const TALLY_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("tally io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("tally document is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported tally version {found} (expected {})", TALLY_VERSION)]
    UnsupportedVersion { found: u32 },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Persisted tally document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyDocument {
    pub version: u32,
    pub total_stars: u64,
}

impl TallyDocument {
    pub fn new(total_stars: u64) -> Self {
        Self {
            version: TALLY_VERSION,
            total_stars,
        }
    }

    /// Parse a stored document, rejecting other versions
    pub fn parse(json: &str) -> Result<Self, PersistenceError> {
        let doc: TallyDocument = serde_json::from_str(json)?;
        if doc.version != TALLY_VERSION {
            return Err(PersistenceError::UnsupportedVersion { found: doc.version });
        }
        Ok(doc)
    }
}

/// Port to wherever the collectible tally lives
pub trait TallyStore {
    /// Current persisted tally (0 when nothing is stored)
    fn get_tally(&self) -> u64;
    /// Add one to the persisted tally
    fn increment_tally(&self);
    /// Overwrite the persisted tally
    fn set_tally(&self, value: u64);
}

impl<T: TallyStore + ?Sized> TallyStore for Box<T> {
    fn get_tally(&self) -> u64 {
        (**self).get_tally()
    }

    fn increment_tally(&self) {
        (**self).increment_tally()
    }

    fn set_tally(&self, value: u64) {
        (**self).set_tally(value)
    }
}

impl<T: TallyStore + ?Sized> TallyStore for Arc<T> {
    fn get_tally(&self) -> u64 {
        (**self).get_tally()
    }

    fn increment_tally(&self) {
        (**self).increment_tally()
    }

    fn set_tally(&self, value: u64) {
        (**self).set_tally(value)
    }
}

/// In-memory tally; clones share the same counter
#[derive(Debug, Clone, Default)]
pub struct MemoryTallyStore {
    count: Arc<AtomicU64>,
}

impl MemoryTallyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tally(value: u64) -> Self {
        Self {
            count: Arc::new(AtomicU64::new(value)),
        }
    }
}

impl TallyStore for MemoryTallyStore {
    fn get_tally(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }

    fn increment_tally(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    fn set_tally(&self, value: u64) {
        self.count.store(value, Ordering::SeqCst);
    }
}

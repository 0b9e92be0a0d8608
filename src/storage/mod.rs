//! Durable study persistence.
//!
//! The [`PersistenceStore`] trait defines how study snapshots are saved
//! and reloaded. A [`Study`](crate::Study) configured with a store saves a
//! fresh [`StudySnapshot`] after every terminal trial transition, and can
//! be rebuilt from the latest snapshot with
//! [`Study::load`](crate::Study::load) or
//! [`StudyBuilder::load_if_exists`](crate::StudyBuilder::load_if_exists).
//!
//! # Available backends
//!
//! | Backend | Description |
//! |---------|-------------|
//! | [`MemoryStore`] | In-process map behind a read-write lock, for tests and handoff between studies |
//! | [`JsonFileStore`] | One pretty-printed JSON file per study, atomic replace, `fs2` file locking |
//!
//! # Implementing a custom backend
//!
//! Implement [`save`](PersistenceStore::save) and
//! [`load`](PersistenceStore::load). `load` must return
//! [`Error::NotFound`](crate::Error::NotFound) for unknown ids. Any retry
//! policy belongs in the store; the study never retries.
//!
//! ```
//! use std::collections::HashMap;
//!
//! use hyperstudy::storage::PersistenceStore;
//! use hyperstudy::{Error, Result, StudySnapshot};
//! use parking_lot::Mutex;
//!
//! #[derive(Default)]
//! struct JsonStrings(Mutex<HashMap<String, String>>);
//!
//! impl PersistenceStore for JsonStrings {
//!     fn save(&self, snapshot: &StudySnapshot) -> Result<()> {
//!         let json = serde_json::to_string(snapshot)?;
//!         self.0.lock().insert(snapshot.study_id.clone(), json);
//!         Ok(())
//!     }
//!
//!     fn load(&self, study_id: &str) -> Result<StudySnapshot> {
//!         let map = self.0.lock();
//!         let json = map
//!             .get(study_id)
//!             .ok_or_else(|| Error::NotFound(study_id.to_string()))?;
//!         Ok(serde_json::from_str(json)?)
//!     }
//! }
//! ```

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::{Error, Result};
use crate::study::StudySnapshot;

/// Trait for durable storage of study snapshots.
///
/// Implementations must be `Send + Sync` because a study may finalize
/// trials from several worker threads at once.
pub trait PersistenceStore: Send + Sync {
    /// Durably record `snapshot`, replacing any earlier snapshot with the
    /// same `study_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] when the write fails.
    fn save(&self, snapshot: &StudySnapshot) -> Result<()>;

    /// Load the latest snapshot saved under `study_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if nothing was saved under `study_id`,
    /// or [`Error::Storage`] when reading or decoding fails.
    fn load(&self, study_id: &str) -> Result<StudySnapshot>;

    /// Whether a snapshot exists for `study_id`.
    ///
    /// The default implementation calls [`load`](Self::load) and maps
    /// [`Error::NotFound`] to `false`.
    ///
    /// # Errors
    ///
    /// Propagates any error other than [`Error::NotFound`].
    fn exists(&self, study_id: &str) -> Result<bool> {
        match self.load(study_id) {
            Ok(_) => Ok(true),
            Err(Error::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

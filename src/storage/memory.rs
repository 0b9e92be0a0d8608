use std::collections::HashMap;

use parking_lot::RwLock;

use super::PersistenceStore;
use crate::error::{Error, Result};
use crate::study::StudySnapshot;

/// In-memory snapshot store.
///
/// Keeps the latest snapshot per study id in a `HashMap` behind a
/// read-write lock. Useful in tests and for handing a study's history to a
/// new [`Study`](crate::Study) in the same process.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use hyperstudy::Study;
/// use hyperstudy::storage::{MemoryStore, PersistenceStore};
///
/// let store = Arc::new(MemoryStore::new());
/// let study = Study::builder()
///     .name("demo")
///     .store_arc(store.clone())
///     .build()
///     .unwrap();
/// study.save().unwrap();
/// assert!(store.exists("demo").unwrap());
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshots: RwLock<HashMap<String, StudySnapshot>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of every study saved so far, sorted.
    #[must_use]
    pub fn study_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.snapshots.read().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }
}

impl PersistenceStore for MemoryStore {
    fn save(&self, snapshot: &StudySnapshot) -> Result<()> {
        self.snapshots
            .write()
            .insert(snapshot.study_id.clone(), snapshot.clone());
        Ok(())
    }

    fn load(&self, study_id: &str) -> Result<StudySnapshot> {
        self.snapshots
            .read()
            .get(study_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(study_id.to_string()))
    }

    fn exists(&self, study_id: &str) -> Result<bool> {
        Ok(self.snapshots.read().contains_key(study_id))
    }
}

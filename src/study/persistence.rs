use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parameter::SearchSpace;
use crate::pruner::{NopPruner, Pruner};
use crate::sampler::{RandomSampler, Sampler};
use crate::storage::PersistenceStore;
use crate::trial::Trial;
use crate::types::Direction;

use super::{Study, TrialSlot};

/// The snapshot schema version written by this crate.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A serializable snapshot of a study's state.
///
/// Since [`Study`] contains non-serializable fields (sampler, pruner,
/// locks), this struct captures the state needed to save and restore it:
/// every trial record with its id, state, values, and report history.
///
/// # Schema versioning
///
/// The `version` field enables future schema evolution without breaking
/// existing files. The current version is [`SNAPSHOT_VERSION`].
///
/// # Sampler state
///
/// Sampler and pruner configuration is **not** included. [`Study::load`]
/// restores with a [`RandomSampler`] and no pruner; use
/// [`StudyBuilder::load_if_exists`](crate::StudyBuilder::load_if_exists) to
/// resume with your own.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StudySnapshot {
    /// Schema version for forward compatibility.
    pub version: u32,
    /// The study name.
    pub study_id: String,
    /// One direction per objective.
    pub directions: Vec<Direction>,
    /// The declared search space.
    pub space: SearchSpace,
    /// Every trial, in creation order.
    pub trials: Vec<Trial>,
    /// The next trial id to assign.
    pub next_trial_id: u64,
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
}

impl Study {
    pub(super) fn from_parts(
        name: String,
        directions: Vec<Direction>,
        space: SearchSpace,
        sampler: Arc<dyn Sampler>,
        pruner: Arc<dyn Pruner>,
        store: Option<Arc<dyn PersistenceStore>>,
    ) -> Self {
        Self {
            name,
            directions,
            space,
            sampler,
            pruner,
            store,
            trials: RwLock::new(Vec::new()),
            next_id: Mutex::new(0),
            enqueued: Mutex::new(VecDeque::new()),
            persist_lock: Mutex::new(()),
        }
    }

    /// Rebuild a study from `snapshot` with fresh trial records.
    ///
    /// `space` overrides the persisted search space when given.
    pub(super) fn restore(
        snapshot: StudySnapshot,
        space: Option<SearchSpace>,
        sampler: Arc<dyn Sampler>,
        pruner: Arc<dyn Pruner>,
        store: Option<Arc<dyn PersistenceStore>>,
    ) -> Result<Self> {
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(Error::Storage(format!(
                "snapshot version {} is newer than supported version {SNAPSHOT_VERSION}",
                snapshot.version
            )));
        }
        if snapshot.directions.is_empty() {
            return Err(Error::EmptyDirections);
        }

        let mut trials = snapshot.trials;
        trials.sort_by_key(Trial::id);
        if let Some(pair) = trials.windows(2).find(|w| w[0].id() == w[1].id()) {
            return Err(Error::Storage(format!(
                "snapshot contains trial id {} twice",
                pair[0].id()
            )));
        }
        let next_id = trials
            .last()
            .map_or(0, |t| t.id() + 1)
            .max(snapshot.next_trial_id);

        let n_trials = trials.len();
        let slots = trials
            .into_iter()
            .map(|trial| TrialSlot {
                id: trial.id(),
                record: Arc::new(RwLock::new(trial)),
            })
            .collect();

        let study = Self::from_parts(
            snapshot.study_id,
            snapshot.directions,
            space.unwrap_or(snapshot.space),
            sampler,
            pruner,
            store,
        );
        *study.trials.write() = slots;
        *study.next_id.lock() = next_id;

        trace_info!(study = %study.name, n_trials, next_id, "study resumed from snapshot");
        Ok(study)
    }

    /// Capture the study's current state.
    ///
    /// Each trial is copied atomically; trials that change state while the
    /// snapshot is taken appear either before or after the transition.
    #[must_use]
    pub fn snapshot(&self) -> StudySnapshot {
        let trials = self.trials();
        let next_trial_id = *self.next_id.lock();
        StudySnapshot {
            version: SNAPSHOT_VERSION,
            study_id: self.name.clone(),
            directions: self.directions.clone(),
            space: self.space.clone(),
            trials,
            next_trial_id,
            saved_at: Utc::now(),
        }
    }

    /// Save a snapshot to the configured store.
    ///
    /// A study with a store already saves after every terminal transition;
    /// call this to persist running trials' reports, or an empty study.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoStore`] if the study has no store, or the store's
    /// error.
    pub fn save(&self) -> Result<()> {
        let store = self
            .store
            .as_deref()
            .ok_or_else(|| Error::NoStore(self.name.clone()))?;
        self.save_to(store)
    }

    /// Save a snapshot to `store`, which need not be the configured one.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub fn save_to(&self, store: &dyn PersistenceStore) -> Result<()> {
        let _guard = self.persist_lock.lock();
        let result = store.save(&self.snapshot());
        #[cfg(feature = "tracing")]
        if let Err(e) = &result {
            tracing::warn!(study = %self.name, error = %e, "failed to persist study");
        }
        result
    }

    /// Load the study saved as `study_id` in `store`.
    ///
    /// The loaded study keeps `store` as its store, samples with a
    /// [`RandomSampler`], and never prunes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if nothing was saved under `study_id`, or
    /// the store's error.
    pub fn load(store: Arc<dyn PersistenceStore>, study_id: &str) -> Result<Self> {
        let snapshot = store.load(study_id)?;
        Self::restore(
            snapshot,
            None,
            Arc::new(RandomSampler::new()),
            Arc::new(NopPruner),
            Some(store),
        )
    }

    /// Save to the configured store, if any.
    pub(super) fn persist(&self) -> Result<()> {
        match self.store.as_deref() {
            Some(store) => self.save_to(store),
            None => Ok(()),
        }
    }
}

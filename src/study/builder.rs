use std::sync::Arc;

use crate::error::{Error, Result};
use crate::parameter::SearchSpace;
use crate::pruner::{NopPruner, Pruner};
use crate::sampler::{RandomSampler, Sampler};
use crate::storage::PersistenceStore;
use crate::types::Direction;

use super::Study;

/// The study name used when none is given.
const DEFAULT_STUDY_NAME: &str = "study";

/// A builder for constructing [`Study`] instances with a fluent API.
///
/// Created via [`Study::builder()`]. Collects the name, directions, search
/// space, sampler, pruner, and persistence store before constructing the
/// study.
///
/// # Defaults
///
/// - Name: `"study"`
/// - Directions: a single [`Minimize`](Direction::Minimize)
/// - Search space: empty
/// - Sampler: [`RandomSampler`]
/// - Pruner: [`NopPruner`]
/// - Store: none (nothing is persisted)
///
/// # Examples
///
/// ```
/// use hyperstudy::prelude::*;
///
/// let study = Study::builder()
///     .name("tuning")
///     .maximize()
///     .space(SearchSpace::new().with(&IntParam::new("layers", 1, 4)))
///     .sampler(RandomSampler::with_seed(7))
///     .pruner(MedianPruner::new(Direction::Maximize).n_warmup_steps(5))
///     .build()
///     .unwrap();
///
/// assert_eq!(study.directions(), &[Direction::Maximize]);
/// ```
pub struct StudyBuilder {
    name: Option<String>,
    directions: Option<Vec<Direction>>,
    space: SearchSpace,
    sampler: Option<Arc<dyn Sampler>>,
    pruner: Option<Arc<dyn Pruner>>,
    store: Option<Arc<dyn PersistenceStore>>,
    load_if_exists: bool,
}

impl StudyBuilder {
    /// Create a new builder with default settings.
    pub(super) fn new() -> Self {
        Self {
            name: None,
            directions: None,
            space: SearchSpace::new(),
            sampler: None,
            pruner: None,
            store: None,
            load_if_exists: false,
        }
    }

    /// Set the study name. It doubles as the id under which the study is
    /// persisted.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Single objective, minimized (the default).
    #[must_use]
    pub fn minimize(mut self) -> Self {
        self.directions = Some(vec![Direction::Minimize]);
        self
    }

    /// Single objective, maximized.
    #[must_use]
    pub fn maximize(mut self) -> Self {
        self.directions = Some(vec![Direction::Maximize]);
        self
    }

    /// Set the single objective's direction explicitly.
    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.directions = Some(vec![direction]);
        self
    }

    /// Set one direction per objective, for multi-objective studies.
    #[must_use]
    pub fn directions(mut self, directions: impl IntoIterator<Item = Direction>) -> Self {
        self.directions = Some(directions.into_iter().collect());
        self
    }

    /// Set the search space every assignment is validated against.
    #[must_use]
    pub fn space(mut self, space: SearchSpace) -> Self {
        self.space = space;
        self
    }

    /// Set the sampler used for parameter suggestions.
    ///
    /// Defaults to [`RandomSampler`] if not specified.
    #[must_use]
    pub fn sampler(mut self, sampler: impl Sampler + 'static) -> Self {
        self.sampler = Some(Arc::new(sampler));
        self
    }

    /// Set the pruner used for early stopping of trials.
    ///
    /// Defaults to [`NopPruner`] (no pruning) if not specified.
    #[must_use]
    pub fn pruner(mut self, pruner: impl Pruner + 'static) -> Self {
        self.pruner = Some(Arc::new(pruner));
        self
    }

    /// Persist the study to `store` after every terminal trial transition.
    #[must_use]
    pub fn store(self, store: impl PersistenceStore + 'static) -> Self {
        self.store_arc(Arc::new(store))
    }

    /// Like [`store`](Self::store), for a store shared with other owners.
    #[must_use]
    pub fn store_arc(mut self, store: Arc<dyn PersistenceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Resume from the store's snapshot for this study name, if one exists.
    ///
    /// The resumed study keeps every persisted trial with its id, state,
    /// values, and reports, and issues new ids above the highest persisted
    /// one. If no search space was set on the builder, the persisted one is
    /// used. Without a store this option has no effect.
    #[must_use]
    pub fn load_if_exists(mut self) -> Self {
        self.load_if_exists = true;
        self
    }

    /// Build the [`Study`] with the configured options.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyDirections`] if `directions` was given no entries.
    /// - Any search-space validation error, such as
    ///   [`Error::InvalidBounds`].
    /// - With [`load_if_exists`](Self::load_if_exists):
    ///   [`Error::DirectionMismatch`] if explicitly set directions differ
    ///   from the persisted ones, or [`Error::Storage`] if loading fails.
    pub fn build(self) -> Result<Study> {
        let name = self
            .name
            .unwrap_or_else(|| DEFAULT_STUDY_NAME.to_string());
        if self.directions.as_ref().is_some_and(Vec::is_empty) {
            return Err(Error::EmptyDirections);
        }
        self.space.validate()?;

        let sampler = self
            .sampler
            .unwrap_or_else(|| Arc::new(RandomSampler::new()));
        let pruner = self.pruner.unwrap_or_else(|| Arc::new(NopPruner));

        let snapshot = match &self.store {
            Some(store) if self.load_if_exists => match store.load(&name) {
                Ok(snapshot) => Some(snapshot),
                Err(Error::NotFound(_)) => None,
                Err(e) => return Err(e),
            },
            _ => None,
        };

        let Some(snapshot) = snapshot else {
            let directions = self
                .directions
                .unwrap_or_else(|| vec![Direction::Minimize]);
            trace_debug!(study = %name, n_objectives = directions.len(), "study created");
            return Ok(Study::from_parts(
                name,
                directions,
                self.space,
                sampler,
                pruner,
                self.store,
            ));
        };

        if let Some(requested) = self.directions
            && requested != snapshot.directions
        {
            return Err(Error::DirectionMismatch {
                stored: snapshot.directions,
                requested,
            });
        }
        let space = if self.space.is_empty() {
            None
        } else {
            Some(self.space)
        };
        Study::restore(snapshot, space, sampler, pruner, self.store)
    }
}

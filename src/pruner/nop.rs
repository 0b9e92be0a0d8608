use super::Pruner;
use crate::trial::Trial;

/// A pruner that never prunes. This is the default when no pruner is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NopPruner;

impl Pruner for NopPruner {
    fn should_prune(&self, _trial: &Trial, _step: u64, _siblings: &[Trial]) -> bool {
        false
    }
}

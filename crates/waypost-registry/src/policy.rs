//! Selection among active replicas of a service.

use rand::seq::SliceRandom;
use waypost_core::ServiceRecord;

/// Picks one record out of the active candidates for a name.
///
/// Called under the store lock, so implementations must not block.
pub trait SelectionPolicy: Send + Sync {
    fn select<'a>(&self, candidates: &'a [ServiceRecord]) -> Option<&'a ServiceRecord>;
}

/// Uniform random choice, independent on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformRandom;

impl SelectionPolicy for UniformRandom {
    fn select<'a>(&self, candidates: &'a [ServiceRecord]) -> Option<&'a ServiceRecord> {
        candidates.choose(&mut rand::thread_rng())
    }
}

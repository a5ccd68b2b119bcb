//! Activity and retention windows.
//!
//! A record's liveness is derived from its age, never stored:
//!   age <  active            → Active
//!   active <= age < retention → Inactive
//!   age >= retention          → Stale

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How a record is seen by readers at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Liveness {
    /// Renewed within the active window; discoverable.
    Active,
    /// Past the active window but still retained; listed only.
    Inactive,
    /// Past the retention window; removed on the next read.
    Stale,
}

/// The two time windows held by a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Windows {
    pub active: Duration,
    pub retention: Duration,
}

impl Default for Windows {
    fn default() -> Self {
        Self {
            active: Duration::from_secs(60),
            retention: Duration::from_secs(12 * 60 * 60),
        }
    }
}

impl Windows {
    pub fn new(active: Duration, retention: Duration) -> Self {
        Self { active, retention }
    }

    /// Classify a record of the given age.
    ///
    /// Retention is checked first, so a record past retention is stale even
    /// if the active window has been configured larger than retention.
    pub fn classify(&self, age: Duration) -> Liveness {
        if age >= self.retention {
            Liveness::Stale
        } else if age < self.active {
            Liveness::Active
        } else {
            Liveness::Inactive
        }
    }

    /// `active <= retention`; expected but not enforced by the store.
    pub fn is_ordered(&self) -> bool {
        self.active <= self.retention
    }
}

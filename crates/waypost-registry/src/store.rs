//! The registry store: single source of truth for service records.
//!
//! One exclusive lock guards both the record set and the two windows, so a
//! reader never pairs old windows with new records or the reverse. Every
//! operation is an in-memory scan or mutation; nothing blocks on I/O while
//! the lock is held.
//!
//! Stale records are only reclaimed by `get` and `list`. A store that is
//! written to but never read keeps its stale records indefinitely.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use waypost_core::{Liveness, ServiceRecord, Windows};

use crate::clock::{Clock, SystemClock};
use crate::error::RegistryError;
use crate::policy::{SelectionPolicy, UniformRandom};

/// Operations a registry backend exposes to the gateway.
pub trait Registry: Send + Sync {
    /// Insert the `(name, host)` pair, or renew it if already present.
    /// The renewal time is taken from the registry clock, never from `record`.
    fn add(&self, record: &ServiceRecord);

    /// Delete the `(name, host)` pair. Absent records are ignored.
    fn remove(&self, record: &ServiceRecord);

    /// One active record for `name`, chosen by the selection policy.
    fn get(&self, name: &str) -> Result<ServiceRecord, RegistryError>;

    /// Records for `name` (`""` = every name). Active only unless
    /// `include_inactive`; stale records are never returned.
    fn list(&self, name: &str, include_inactive: bool) -> Vec<ServiceRecord>;

    /// Replace the active window.
    fn set_timeout(&self, active: Duration);

    /// Replace the retention window.
    fn set_keep(&self, retention: Duration);

    /// Replace either or both windows in one step and return the result.
    /// No read observes one window updated without the other.
    fn update_windows(&self, active: Option<Duration>, retention: Option<Duration>) -> Windows;

    /// Current windows.
    fn windows(&self) -> Windows;
}

struct Inner {
    windows: Windows,
    /// name → host → last renewal
    services: BTreeMap<String, BTreeMap<String, DateTime<Utc>>>,
}

/// Records matching a read, split by liveness.
struct Sweep {
    active: Vec<ServiceRecord>,
    inactive: Vec<ServiceRecord>,
}

/// In-memory registry, generic over how replicas are picked and how time
/// is read.
pub struct MemoryRegistry<P = UniformRandom, C = SystemClock> {
    inner: Mutex<Inner>,
    policy: P,
    clock: C,
}

/// The default registry: uniform random selection on wall-clock time.
pub type RandomRegistry = MemoryRegistry<UniformRandom, SystemClock>;

impl RandomRegistry {
    pub fn new(windows: Windows) -> Self {
        Self::with_parts(windows, UniformRandom, SystemClock)
    }
}

impl<P: SelectionPolicy, C: Clock> MemoryRegistry<P, C> {
    pub fn with_parts(windows: Windows, policy: P, clock: C) -> Self {
        Self {
            inner: Mutex::new(Inner {
                windows,
                services: BTreeMap::new(),
            }),
            policy,
            clock,
        }
    }

    /// Raw number of stored records, stale ones included. Does not expire.
    pub fn len(&self) -> usize {
        self.inner.lock().services.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw number of stored records for one name. Does not expire.
    pub fn count(&self, name: &str) -> usize {
        self.inner
            .lock()
            .services
            .get(name)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    /// Single pass over every record: collect matches for `name` and drop
    /// every stale record in the store, matching or not.
    fn sweep(&self, inner: &mut Inner, name: &str, include_inactive: bool) -> Sweep {
        let now = self.clock.now();
        let windows = inner.windows;
        let mut sweep = Sweep {
            active: Vec::new(),
            inactive: Vec::new(),
        };
        let mut purged = 0usize;

        inner.services.retain(|svc_name, hosts| {
            let matches = name.is_empty() || name == svc_name;
            hosts.retain(|host, renewed| {
                let age = (now - *renewed).to_std().unwrap_or(Duration::ZERO);
                match windows.classify(age) {
                    Liveness::Stale => {
                        purged += 1;
                        return false;
                    }
                    Liveness::Active if matches => sweep
                        .active
                        .push(ServiceRecord::renewed_at(svc_name.as_str(), host.as_str(), *renewed)),
                    Liveness::Inactive if matches && include_inactive => sweep
                        .inactive
                        .push(ServiceRecord::renewed_at(svc_name.as_str(), host.as_str(), *renewed)),
                    _ => {}
                }
                true
            });
            !hosts.is_empty()
        });

        if purged > 0 {
            tracing::debug!(removed = purged, "purged stale service records");
        }
        sweep
    }
}

impl<P: SelectionPolicy, C: Clock> Registry for MemoryRegistry<P, C> {
    fn add(&self, record: &ServiceRecord) {
        let mut inner = self.inner.lock();
        let now = self.clock.now();
        let renewed = inner
            .services
            .entry(record.name.clone())
            .or_default()
            .insert(record.host.clone(), now)
            .is_some();
        tracing::trace!(name = %record.name, host = %record.host, renewed, "service record upserted");
    }

    fn remove(&self, record: &ServiceRecord) {
        let mut inner = self.inner.lock();
        let Some(hosts) = inner.services.get_mut(&record.name) else {
            return;
        };
        if hosts.remove(&record.host).is_some() && hosts.is_empty() {
            inner.services.remove(&record.name);
        }
    }

    fn get(&self, name: &str) -> Result<ServiceRecord, RegistryError> {
        let mut inner = self.inner.lock();
        let sweep = self.sweep(&mut inner, name, false);
        self.policy
            .select(&sweep.active)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    fn list(&self, name: &str, include_inactive: bool) -> Vec<ServiceRecord> {
        let mut inner = self.inner.lock();
        let Sweep { mut active, inactive } = self.sweep(&mut inner, name, include_inactive);
        active.extend(inactive);
        active
    }

    fn set_timeout(&self, active: Duration) {
        self.inner.lock().windows.active = active;
    }

    fn set_keep(&self, retention: Duration) {
        self.inner.lock().windows.retention = retention;
    }

    fn update_windows(&self, active: Option<Duration>, retention: Option<Duration>) -> Windows {
        let mut inner = self.inner.lock();
        if let Some(active) = active {
            inner.windows.active = active;
        }
        if let Some(retention) = retention {
            inner.windows.retention = retention;
        }
        inner.windows
    }

    fn windows(&self) -> Windows {
        self.inner.lock().windows
    }
}

//! Service records and their JSON wire shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::windows::Windows;

/// One location of a logical service.
///
/// Identity is the `(name, host)` pair. `added` is the last renewal time and
/// is always assigned by the registry; whatever a client sends is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub name: String,
    pub host: String,
    pub added: DateTime<Utc>,
}

impl ServiceRecord {
    /// Build a record stamped with the current wall-clock time.
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self::renewed_at(name, host, Utc::now())
    }

    pub fn renewed_at(name: impl Into<String>, host: impl Into<String>, added: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            added,
        }
    }

    /// Same `(name, host)` identity, regardless of renewal time.
    pub fn same_instance(&self, other: &ServiceRecord) -> bool {
        self.name == other.name && self.host == other.host
    }

    /// True when both halves of the identity key are present.
    pub fn is_addressable(&self) -> bool {
        !self.name.is_empty() && !self.host.is_empty()
    }
}

/// Body of `GET /list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceList {
    pub services: Vec<ServiceRecord>,
}

/// Body of `GET /windows` and `PUT /windows`.
///
/// On update, omitted fields keep their current value. Responses always
/// carry both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_window_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_window_secs: Option<u64>,
}

impl From<Windows> for WindowSettings {
    fn from(windows: Windows) -> Self {
        Self {
            active_window_secs: Some(windows.active.as_secs()),
            retention_window_secs: Some(windows.retention.as_secs()),
        }
    }
}

use thiserror::Error;

/// Registry store error type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No active record for the requested name.
    #[error("no such service '{0}'")]
    NotFound(String),
}

//! waypost-registry — the in-memory service registry.
//!
//! Records are renewed by `add`, discovered by `get` and listed by `list`.
//! Expiry is lazy: stale records are only purged as a side effect of reads.

pub mod auth;
pub mod clock;
pub mod error;
pub mod policy;
pub mod store;

pub use auth::{AllowAll, Authenticator, BasicAuthenticator};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::RegistryError;
pub use policy::{SelectionPolicy, UniformRandom};
pub use store::{MemoryRegistry, RandomRegistry, Registry};

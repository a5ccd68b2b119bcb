//! waypost-client — talk to a waypost registry over HTTP.
//!
//! [`Client`] discovers services; [`RegistrationAgent`] keeps one service
//! registered by renewing it on an interval.

pub mod agent;
pub mod client;
pub mod error;
pub mod transport;

pub use agent::{AgentState, RegistrationAgent};
pub use client::Client;
pub use error::ClientError;
pub use transport::{HttpTransport, RegistryTransport};

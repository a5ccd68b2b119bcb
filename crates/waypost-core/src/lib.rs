//! waypost-core — shared record model, wire types and configuration.
//! Every other waypost crate depends on this one.

pub mod auth;
pub mod config;
pub mod record;
pub mod windows;

pub use auth::basic_auth_token;
pub use record::{ServiceList, ServiceRecord, WindowSettings};
pub use windows::{Liveness, Windows};

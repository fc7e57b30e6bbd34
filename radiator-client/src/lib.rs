//! Radiator HTTP boundary
//!
//! Everything that touches the wire for the Radiator poller: request
//! shaping, the transport abstraction over reqwest, the session
//! authentication exchange, and the per-backend polling strategies.
//!
//! The scheduler consumes only the traits exported here, so the whole
//! crate can be replaced by fakes in tests.
//!
//! # Example
//!
//! ```no_run
//! use radiator_client::auth::HttpAuthenticator;
//! use radiator_client::strategy::StrategySet;
//! use radiator_client::transport::{HttpTransport, TransportConfig};
//! use std::sync::Arc;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = TransportConfig::default();
//!     let transport = Arc::new(HttpTransport::new(&config)?);
//!     let authenticator = Arc::new(HttpAuthenticator::new(&config)?);
//!     let strategies = StrategySet::new(transport, authenticator);
//!     let _ = strategies;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod error;
pub mod request;
pub mod strategy;
pub mod transport;

// Re-export the types the scheduler works with
pub use auth::{Authenticator, HttpAuthenticator, SessionToken};
pub use error::{AuthError, PollError, RequestError, TransportError};
pub use request::{RequestSpec, normalize_target};
pub use strategy::{Strategy, StrategySet};
pub use transport::{HttpTransport, PollResponse, Transport, TransportConfig};

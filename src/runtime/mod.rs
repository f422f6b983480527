//! Runtime orchestration and lifecycle management.
//!
//! Everything needed to bring the service up and take it down again:
//!
//! - [`OrderSystem`] - starts the store and router tasks, wires the engine
//!   to its collaborators, and coordinates graceful shutdown
//! - [`setup_tracing`] - initializes the logging infrastructure

pub mod order_system;
pub mod tracing;

pub use order_system::*;
pub use tracing::*;

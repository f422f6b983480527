//! Typed clients for the collaborators this service depends on.

pub mod catalog;
pub mod mock;
pub mod payments;

pub use catalog::*;
pub use mock::*;
pub use payments::*;

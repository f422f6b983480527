//! Pure data structures: order records, catalog answers, payment payloads.

pub mod order;
pub mod payment;
pub mod product;

pub use order::*;
pub use payment::*;
pub use product::*;

//! Service-wide error types.
//!
//! Every failure that reaches a caller travels through [`OrderError`]: the
//! reply side of each request/reply channel carries `Result<_, OrderError>`,
//! so a caller always receives a structured kind plus message rather than a
//! silent default. The enum serializes with a `kind` tag so a transport
//! boundary can encode it without losing the variant.

use serde::Serialize;
use thiserror::Error;

use crate::domain::OrderId;

/// Errors surfaced at the message boundary.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind")]
pub enum OrderError {
    /// Lookup by id failed. The message carries the id.
    #[error("Order with id {id} not found")]
    NotFound { id: String },

    /// A creation request referenced a product the catalog cannot price.
    /// The whole order is rejected; nothing is persisted.
    #[error("Unknown product: {product_id}")]
    UnknownProduct { product_id: String },

    /// A collaborator reported an error or was unreachable. The upstream's
    /// own detail is preserved, not swallowed.
    #[error("{service} failure: {detail}")]
    UpstreamFailure { service: String, detail: String },

    /// A persisted order references a product the catalog no longer
    /// recognizes. Surfaced at read time; items are never silently dropped.
    #[error("Order {order_id} references unknown product {product_id}")]
    DataInconsistency { order_id: String, product_id: String },

    /// Malformed or out-of-range input, rejected before any side effect.
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The peer task's mailbox is closed; the request could not be sent.
    #[error("{target} channel closed")]
    ChannelClosed { target: &'static str },

    /// The peer dropped the reply channel without answering.
    #[error("{target} dropped the reply channel")]
    ReplyDropped { target: &'static str },
}

impl OrderError {
    pub fn not_found(id: OrderId) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn upstream(service: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::UpstreamFailure {
            service: service.into(),
            detail: detail.into(),
        }
    }

    pub fn channel_closed(target: &'static str) -> Self {
        Self::ChannelClosed { target }
    }

    pub fn reply_dropped(target: &'static str) -> Self {
        Self::ReplyDropped { target }
    }
}

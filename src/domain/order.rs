//! Order records, item snapshots, and the inbound order payloads.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::product::ProductId;
use crate::error::OrderError;

/// Type-safe identifier for orders. Generated by the store, opaque to
/// everyone else, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an id received on the wire. Malformed ids are rejected here,
    /// before any lookup runs.
    pub fn parse(raw: &str) -> Result<Self, OrderError> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| OrderError::invalid(format!("malformed order id: {raw}")))
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of an order.
///
/// The engine copies the value verbatim on status changes; which transitions
/// are meaningful is caller-side policy. Only the payment-confirmation path
/// sets [`OrderStatus::Paid`] in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Delivered,
    Cancelled,
}

/// Scalar order record as the store keeps it.
///
/// Items and the receipt live beside this in the store; listing replies
/// carry only the scalars, mirroring what the store hands back for a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Σ price × quantity over the item snapshots, fixed at creation time.
    pub total_amount: Decimal,
    /// Σ quantity over the item snapshots, fixed at creation time.
    pub total_items: u32,
    pub status: OrderStatus,
    pub paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    /// External charge reference recorded by the payment-confirmation path.
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One order line as persisted: the price is a snapshot taken from the
/// catalog at creation time, not a live reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub price: Decimal,
    pub quantity: u32,
}

/// Proof of payment. Created only by the payment-confirmation path, at most
/// one per order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub receipt_url: String,
}

/// An order line enriched with the catalog's current display name for the
/// reply. Names are resolved on every read and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetail {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

/// Reply shape for operations that return a single order with its items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<ItemDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Receipt>,
}

/// Inbound createOrder payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrder {
    pub items: Vec<OrderLine>,
}

/// One requested line: which product and how many.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl CreateOrder {
    /// Rejects empty requests and zero quantities before any side effect.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.items.is_empty() {
            return Err(OrderError::invalid("order must contain at least one item"));
        }
        for line in &self.items {
            if line.quantity == 0 {
                return Err(OrderError::invalid(format!(
                    "quantity must be at least 1 for product {}",
                    line.product_id
                )));
            }
        }
        Ok(())
    }
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

/// Inbound findAllOrder payload: optional status filter plus a page window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderQuery {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for OrderQuery {
    fn default() -> Self {
        Self {
            status: None,
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl OrderQuery {
    pub fn with_status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            status: None,
            page,
            limit,
        }
    }

    /// Rejects out-of-range paging before the store is consulted.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.page == 0 {
            return Err(OrderError::invalid("page must be at least 1"));
        }
        if self.limit == 0 {
            return Err(OrderError::invalid("limit must be at least 1"));
        }
        Ok(())
    }
}

/// One page of orders plus the metadata callers page by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPage {
    pub data: Vec<Order>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Matching orders across all pages, not just this one.
    pub total: u64,
    pub page: u32,
    /// `ceil(total / limit)`; 0 when nothing matches.
    pub last_page: u32,
}

/// What the engine hands the store for persistence: the computed totals and
/// the item snapshots. The store assigns the id and `created_at`.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub total_amount: Decimal,
    pub total_items: u32,
    pub items: Vec<OrderItem>,
}

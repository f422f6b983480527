//! Payment session requests and the payment-confirmation event payload.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::order::OrderDetails;

/// Every session is opened in this currency.
pub const SESSION_CURRENCY: &str = "usd";

/// One line of a payment session: display name, unit price, quantity.
/// Built from the reply items so the payment page shows what the customer
/// saw at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLineItem {
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

/// Request handed to the payment collaborator to open a checkout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub order_id: String,
    pub currency: String,
    pub items: Vec<SessionLineItem>,
}

/// payment.succeeded event payload. Field names follow the payment
/// collaborator's wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentNotice {
    pub order_id: String,
    pub stripe_payment_id: String,
    pub receipt_url: String,
}

/// createOrder reply: the persisted order plus the session exactly as the
/// payment collaborator returned it. The session stays an opaque document;
/// this service never inspects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
    pub order: OrderDetails,
    pub payment_session: Value,
}

//! The order engine: validation, catalog coordination, totals, and the
//! payment handshake.

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::clients::{CatalogClient, PaymentsClient};
use crate::domain::{
    Checkout, CreateOrder, ItemDetail, NewOrder, Order, OrderDetails, OrderId, OrderItem,
    OrderPage, OrderQuery, OrderStatus, PaymentNotice, ProductId, ProductRecord, SessionLineItem,
    SessionRequest, SESSION_CURRENCY,
};
use crate::error::OrderError;
use crate::store::{OrderRecord, StoreHandle};

/// Coordinates the store and both collaborators for every order operation.
///
/// Cloneable; the router hands each inbound message its own clone, so
/// concurrent operations never contend on the engine itself.
#[derive(Clone)]
pub struct OrderService {
    store: StoreHandle,
    catalog: CatalogClient,
    payments: PaymentsClient,
}

impl OrderService {
    pub fn new(store: StoreHandle, catalog: CatalogClient, payments: PaymentsClient) -> Self {
        Self {
            store,
            catalog,
            payments,
        }
    }

    /// Creates an order, then opens a payment session for it.
    ///
    /// The session call runs after the order is persisted. If it fails the
    /// order stays stored in PENDING and the whole call reports the
    /// failure; there is no rollback.
    #[instrument(skip(self, payload))]
    pub async fn create(&self, payload: CreateOrder) -> Result<Checkout, OrderError> {
        let order = self.create_order(payload).await?;
        let payment_session = self.create_payment_session(&order).await?;
        Ok(Checkout {
            order,
            payment_session,
        })
    }

    /// Loads one order and joins current catalog names onto its items.
    #[instrument(skip(self))]
    pub async fn find_one(&self, id: OrderId) -> Result<OrderDetails, OrderError> {
        let record = self
            .store
            .fetch(id)
            .await?
            .ok_or_else(|| OrderError::not_found(id))?;
        self.with_item_names(record).await
    }

    /// One page of scalar order records, optionally filtered by status.
    /// Item names are not resolved here.
    #[instrument(skip(self, query))]
    pub async fn find_all(&self, query: OrderQuery) -> Result<OrderPage, OrderError> {
        query.validate()?;
        self.store.list(query).await
    }

    /// Overwrites the order's status and returns the updated order with
    /// its items.
    ///
    /// The order is loaded first, which keeps the NotFound contract
    /// identical to [`OrderService::find_one`] and already resolves the
    /// item names for the reply. When the status already matches, nothing
    /// is written.
    #[instrument(skip(self))]
    pub async fn change_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<OrderDetails, OrderError> {
        let mut details = self.find_one(id).await?;
        if details.order.status == status {
            debug!(%id, ?status, "status unchanged, skipping write");
            return Ok(details);
        }
        let updated = self
            .store
            .set_status(id, status)
            .await?
            .ok_or_else(|| OrderError::not_found(id))?;
        details.order = updated;
        Ok(details)
    }

    /// Records a confirmed payment on the order.
    ///
    /// Status, paid flags, charge reference, and receipt are written in a
    /// single store request, so no reader ever observes a half-paid order.
    #[instrument(skip(self, notice))]
    pub async fn mark_paid(&self, notice: PaymentNotice) -> Result<Order, OrderError> {
        let id = OrderId::parse(&notice.order_id)?;
        self.store
            .mark_paid(id, notice.stripe_payment_id, notice.receipt_url)
            .await?
            .ok_or_else(|| OrderError::not_found(id))
    }

    async fn create_order(&self, payload: CreateOrder) -> Result<OrderDetails, OrderError> {
        payload.validate()?;

        let product_ids: Vec<ProductId> = payload
            .items
            .iter()
            .map(|line| line.product_id.clone())
            .collect();
        let products = self.catalog.resolve_products(product_ids).await?;

        let mut total_amount = Decimal::ZERO;
        let mut total_items = 0u32;
        let mut details = Vec::with_capacity(payload.items.len());
        for line in &payload.items {
            let product = find_product(&products, &line.product_id).ok_or_else(|| {
                OrderError::UnknownProduct {
                    product_id: line.product_id.to_string(),
                }
            })?;
            // Quantities are caller input; the running totals must not wrap.
            total_amount = product
                .price
                .checked_mul(Decimal::from(line.quantity))
                .and_then(|line_total| total_amount.checked_add(line_total))
                .ok_or_else(totals_overflow)?;
            total_items = total_items
                .checked_add(line.quantity)
                .ok_or_else(totals_overflow)?;
            details.push(ItemDetail {
                product_id: product.id.clone(),
                name: product.name.clone(),
                price: product.price,
                quantity: line.quantity,
            });
        }

        // Prices stored with the order are the catalog prices seen right
        // here; later catalog changes must not move this order's totals.
        let items: Vec<OrderItem> = details
            .iter()
            .map(|detail| OrderItem {
                product_id: detail.product_id.clone(),
                price: detail.price,
                quantity: detail.quantity,
            })
            .collect();

        let record = self
            .store
            .insert(NewOrder {
                total_amount,
                total_items,
                items,
            })
            .await?;
        info!(id = %record.order.id, %total_amount, total_items, "order created");

        Ok(OrderDetails {
            order: record.order,
            items: details,
            receipt: None,
        })
    }

    async fn create_payment_session(&self, order: &OrderDetails) -> Result<Value, OrderError> {
        let request = SessionRequest {
            order_id: order.order.id.to_string(),
            currency: SESSION_CURRENCY.to_string(),
            items: order
                .items
                .iter()
                .map(|item| SessionLineItem {
                    name: item.name.clone(),
                    price: item.price,
                    quantity: item.quantity,
                })
                .collect(),
        };
        self.payments.create_session(request).await
    }

    /// Joins stored item snapshots with current catalog names. Prices stay
    /// the stored snapshots; only the names are live.
    async fn with_item_names(&self, record: OrderRecord) -> Result<OrderDetails, OrderError> {
        let product_ids: Vec<ProductId> = record
            .items
            .iter()
            .map(|item| item.product_id.clone())
            .collect();
        let products = self.catalog.resolve_products(product_ids).await?;

        let mut items = Vec::with_capacity(record.items.len());
        for item in &record.items {
            let product = find_product(&products, &item.product_id).ok_or_else(|| {
                OrderError::DataInconsistency {
                    order_id: record.order.id.to_string(),
                    product_id: item.product_id.to_string(),
                }
            })?;
            items.push(ItemDetail {
                product_id: item.product_id.clone(),
                name: product.name.clone(),
                price: item.price,
                quantity: item.quantity,
            });
        }
        Ok(OrderDetails {
            order: record.order,
            items,
            receipt: record.receipt,
        })
    }
}

fn find_product<'a>(products: &'a [ProductRecord], id: &ProductId) -> Option<&'a ProductRecord> {
    products.iter().find(|product| &product.id == id)
}

fn totals_overflow() -> OrderError {
    OrderError::invalid("order totals exceed the supported range")
}

//! The order store task: sole owner of persisted order state.
//!
//! All reads and writes go through [`StoreRequest`] messages answered by a
//! single task, one at a time. Each request is applied in full before the
//! next is taken, which is what makes multi-field writes like
//! [`StoreRequest::MarkPaid`] atomic without locks.

use chrono::Utc;
use indexmap::IndexMap;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::domain::{
    NewOrder, Order, OrderId, OrderItem, OrderPage, OrderQuery, OrderStatus, PageMeta, Receipt,
};
use crate::error::OrderError;

/// Everything the store keeps per order: the scalar record, the price
/// snapshots taken at creation, and the receipt once payment is confirmed.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub receipt: Option<Receipt>,
}

/// Requests the store task answers.
#[derive(Debug)]
pub enum StoreRequest {
    /// Persist a new order. The store assigns the id and timestamps and
    /// replies with the stored record.
    Insert {
        order: NewOrder,
        respond_to: oneshot::Sender<OrderRecord>,
    },
    /// Fetch one order with its items and receipt.
    Fetch {
        id: OrderId,
        respond_to: oneshot::Sender<Option<OrderRecord>>,
    },
    /// One page of scalar order records, optionally filtered by status.
    List {
        query: OrderQuery,
        respond_to: oneshot::Sender<OrderPage>,
    },
    /// Overwrite the lifecycle status. Replies `None` for unknown ids.
    SetStatus {
        id: OrderId,
        status: OrderStatus,
        respond_to: oneshot::Sender<Option<Order>>,
    },
    /// Record a confirmed payment: status, paid flags, charge reference and
    /// receipt, all in one step. Replies `None` for unknown ids.
    MarkPaid {
        id: OrderId,
        payment_reference: String,
        receipt_url: String,
        respond_to: oneshot::Sender<Option<Order>>,
    },
}

/// The task side of the store. Created together with its [`StoreHandle`]
/// and consumed by [`OrderStore::run`].
pub struct OrderStore {
    receiver: mpsc::Receiver<StoreRequest>,
    orders: IndexMap<OrderId, OrderRecord>,
}

impl OrderStore {
    pub fn new(capacity: usize) -> (Self, StoreHandle) {
        let (sender, receiver) = mpsc::channel(capacity);
        let store = Self {
            receiver,
            orders: IndexMap::new(),
        };
        (store, StoreHandle { sender })
    }

    /// Runs until every [`StoreHandle`] clone has been dropped.
    pub async fn run(mut self) {
        info!("order store started");
        while let Some(request) = self.receiver.recv().await {
            self.handle(request);
        }
        info!("order store stopped");
    }

    fn handle(&mut self, request: StoreRequest) {
        match request {
            StoreRequest::Insert { order, respond_to } => {
                let record = self.insert(order);
                let _ = respond_to.send(record);
            }
            StoreRequest::Fetch { id, respond_to } => {
                debug!(%id, "fetching order");
                let _ = respond_to.send(self.orders.get(&id).cloned());
            }
            StoreRequest::List { query, respond_to } => {
                let _ = respond_to.send(self.list(&query));
            }
            StoreRequest::SetStatus {
                id,
                status,
                respond_to,
            } => {
                let _ = respond_to.send(self.set_status(id, status));
            }
            StoreRequest::MarkPaid {
                id,
                payment_reference,
                receipt_url,
                respond_to,
            } => {
                let _ = respond_to.send(self.mark_paid(id, payment_reference, receipt_url));
            }
        }
    }

    fn insert(&mut self, order: NewOrder) -> OrderRecord {
        let id = OrderId::new();
        let record = OrderRecord {
            order: Order {
                id,
                total_amount: order.total_amount,
                total_items: order.total_items,
                status: OrderStatus::Pending,
                paid: false,
                paid_at: None,
                payment_reference: None,
                created_at: Utc::now(),
            },
            items: order.items,
            receipt: None,
        };
        self.orders.insert(id, record.clone());
        info!(
            %id,
            total_amount = %record.order.total_amount,
            total_items = record.order.total_items,
            "order persisted"
        );
        record
    }

    fn list(&self, query: &OrderQuery) -> OrderPage {
        let matching: Vec<&OrderRecord> = self
            .orders
            .values()
            .filter(|record| {
                query
                    .status
                    .map_or(true, |status| record.order.status == status)
            })
            .collect();
        let total = matching.len() as u64;
        // page is 1-based and limit nonzero; clamp instead of underflowing.
        let page = query.page.max(1);
        let limit = query.limit.max(1) as usize;
        let last_page = total.div_ceil(limit as u64) as u32;
        let skip = (page as usize - 1) * limit;
        let data: Vec<Order> = matching
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|record| record.order.clone())
            .collect();
        debug!(total, page, returned = data.len(), "listed orders");
        OrderPage {
            data,
            meta: PageMeta {
                total,
                page,
                last_page,
            },
        }
    }

    fn set_status(&mut self, id: OrderId, status: OrderStatus) -> Option<Order> {
        match self.orders.get_mut(&id) {
            Some(record) => {
                record.order.status = status;
                info!(%id, ?status, "order status updated");
                Some(record.order.clone())
            }
            None => {
                warn!(%id, "status update for unknown order");
                None
            }
        }
    }

    fn mark_paid(
        &mut self,
        id: OrderId,
        payment_reference: String,
        receipt_url: String,
    ) -> Option<Order> {
        match self.orders.get_mut(&id) {
            Some(record) => {
                record.order.status = OrderStatus::Paid;
                record.order.paid = true;
                record.order.paid_at = Some(Utc::now());
                record.order.payment_reference = Some(payment_reference);
                record.receipt = Some(Receipt { receipt_url });
                info!(%id, "order marked paid");
                Some(record.order.clone())
            }
            None => {
                warn!(%id, "payment confirmation for unknown order");
                None
            }
        }
    }
}

/// Cloneable handle for talking to the store task.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    sender: mpsc::Sender<StoreRequest>,
}

impl StoreHandle {
    /// Wraps a raw sender. Used by the runtime and by scripted test doubles.
    pub(crate) fn from_sender(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    pub async fn insert(&self, order: NewOrder) -> Result<OrderRecord, OrderError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Insert { order, respond_to })
            .await
            .map_err(|_| OrderError::channel_closed("store"))?;
        response.await.map_err(|_| OrderError::reply_dropped("store"))
    }

    pub async fn fetch(&self, id: OrderId) -> Result<Option<OrderRecord>, OrderError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Fetch { id, respond_to })
            .await
            .map_err(|_| OrderError::channel_closed("store"))?;
        response.await.map_err(|_| OrderError::reply_dropped("store"))
    }

    pub async fn list(&self, query: OrderQuery) -> Result<OrderPage, OrderError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::List { query, respond_to })
            .await
            .map_err(|_| OrderError::channel_closed("store"))?;
        response.await.map_err(|_| OrderError::reply_dropped("store"))
    }

    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::SetStatus {
                id,
                status,
                respond_to,
            })
            .await
            .map_err(|_| OrderError::channel_closed("store"))?;
        response.await.map_err(|_| OrderError::reply_dropped("store"))
    }

    pub async fn mark_paid(
        &self,
        id: OrderId,
        payment_reference: String,
        receipt_url: String,
    ) -> Result<Option<Order>, OrderError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::MarkPaid {
                id,
                payment_reference,
                receipt_url,
                respond_to,
            })
            .await
            .map_err(|_| OrderError::channel_closed("store"))?;
        response.await.map_err(|_| OrderError::reply_dropped("store"))
    }
}

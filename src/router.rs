//! Inbound message routing: the service's protocol surface.
//!
//! One router task owns the mailbox. Request/reply messages carry a
//! `respond_to` channel; events carry none. Each message is dispatched on
//! its own task, so a slow catalog lookup on one request never delays the
//! next. If a handler panics, its reply channel drops and the caller sees
//! [`OrderError::ReplyDropped`] rather than a hang.

use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, instrument};

use crate::domain::{
    Checkout, CreateOrder, OrderDetails, OrderId, OrderPage, OrderQuery, OrderStatus,
    PaymentNotice,
};
use crate::error::OrderError;
use crate::service::OrderService;

/// Reply channel for one request.
pub type Responder<T> = oneshot::Sender<Result<T, OrderError>>;

/// The service's inbound protocol. Order ids arrive as strings and are
/// validated during dispatch.
#[derive(Debug)]
pub enum OrderMessage {
    CreateOrder {
        payload: CreateOrder,
        respond_to: Responder<Checkout>,
    },
    FindAllOrder {
        payload: OrderQuery,
        respond_to: Responder<OrderPage>,
    },
    FindOneOrder {
        id: String,
        respond_to: Responder<OrderDetails>,
    },
    ChangeOrderStatus {
        id: String,
        status: OrderStatus,
        respond_to: Responder<OrderDetails>,
    },
    /// Fire-and-forget payment confirmation event.
    PaymentSucceeded { payload: PaymentNotice },
}

/// The task side of the protocol surface. Created together with its
/// [`OrdersClient`] and consumed by [`OrderRouter::run`].
pub struct OrderRouter {
    receiver: mpsc::Receiver<OrderMessage>,
    service: OrderService,
}

impl OrderRouter {
    pub fn new(capacity: usize, service: OrderService) -> (Self, OrdersClient) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { receiver, service }, OrdersClient { sender })
    }

    /// Runs until every [`OrdersClient`] clone has been dropped.
    pub async fn run(mut self) {
        info!("order router started");
        while let Some(message) = self.receiver.recv().await {
            let service = self.service.clone();
            tokio::spawn(dispatch(service, message));
        }
        info!("order router stopped");
    }
}

async fn dispatch(service: OrderService, message: OrderMessage) {
    match message {
        OrderMessage::CreateOrder {
            payload,
            respond_to,
        } => {
            let _ = respond_to.send(service.create(payload).await);
        }
        OrderMessage::FindAllOrder {
            payload,
            respond_to,
        } => {
            let _ = respond_to.send(service.find_all(payload).await);
        }
        OrderMessage::FindOneOrder { id, respond_to } => {
            let _ = respond_to.send(find_one(&service, &id).await);
        }
        OrderMessage::ChangeOrderStatus {
            id,
            status,
            respond_to,
        } => {
            let _ = respond_to.send(change_status(&service, &id, status).await);
        }
        OrderMessage::PaymentSucceeded { payload } => {
            info!(order_id = %payload.order_id, "payment confirmation received");
            // No reply channel to report on; failures are logged and dropped.
            if let Err(error) = service.mark_paid(payload).await {
                error!(%error, "payment confirmation failed");
            }
        }
    }
}

async fn find_one(service: &OrderService, id: &str) -> Result<OrderDetails, OrderError> {
    let id = OrderId::parse(id)?;
    service.find_one(id).await
}

async fn change_status(
    service: &OrderService,
    id: &str,
    status: OrderStatus,
) -> Result<OrderDetails, OrderError> {
    let id = OrderId::parse(id)?;
    service.change_status(id, status).await
}

/// Cloneable client for the order service's protocol surface.
#[derive(Debug, Clone)]
pub struct OrdersClient {
    sender: mpsc::Sender<OrderMessage>,
}

impl OrdersClient {
    #[instrument(skip(self, payload))]
    pub async fn create_order(&self, payload: CreateOrder) -> Result<Checkout, OrderError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(OrderMessage::CreateOrder {
                payload,
                respond_to,
            })
            .await
            .map_err(|_| OrderError::channel_closed("orders"))?;
        response
            .await
            .map_err(|_| OrderError::reply_dropped("orders"))?
    }

    #[instrument(skip(self, payload))]
    pub async fn find_all(&self, payload: OrderQuery) -> Result<OrderPage, OrderError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(OrderMessage::FindAllOrder {
                payload,
                respond_to,
            })
            .await
            .map_err(|_| OrderError::channel_closed("orders"))?;
        response
            .await
            .map_err(|_| OrderError::reply_dropped("orders"))?
    }

    #[instrument(skip(self))]
    pub async fn find_one(&self, id: String) -> Result<OrderDetails, OrderError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(OrderMessage::FindOneOrder { id, respond_to })
            .await
            .map_err(|_| OrderError::channel_closed("orders"))?;
        response
            .await
            .map_err(|_| OrderError::reply_dropped("orders"))?
    }

    #[instrument(skip(self))]
    pub async fn change_status(
        &self,
        id: String,
        status: OrderStatus,
    ) -> Result<OrderDetails, OrderError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(OrderMessage::ChangeOrderStatus {
                id,
                status,
                respond_to,
            })
            .await
            .map_err(|_| OrderError::channel_closed("orders"))?;
        response
            .await
            .map_err(|_| OrderError::reply_dropped("orders"))?
    }

    /// Publishes the payment confirmation event. There is no reply;
    /// delivery ends at the service's mailbox.
    #[instrument(skip(self, payload))]
    pub async fn payment_succeeded(&self, payload: PaymentNotice) -> Result<(), OrderError> {
        self.sender
            .send(OrderMessage::PaymentSucceeded { payload })
            .await
            .map_err(|_| OrderError::channel_closed("orders"))
    }
}

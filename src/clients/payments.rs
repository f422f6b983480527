//! Client for the payment collaborator.

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

use crate::domain::SessionRequest;
use crate::error::OrderError;

/// Requests understood by the payment collaborator.
#[derive(Debug)]
pub enum PaymentsRequest {
    /// Open a checkout session for an order. The reply is the session
    /// document exactly as the collaborator produced it.
    CreateSession {
        request: SessionRequest,
        respond_to: oneshot::Sender<Result<Value, String>>,
    },
}

/// Cloneable handle for talking to the payment collaborator.
#[derive(Debug, Clone)]
pub struct PaymentsClient {
    sender: mpsc::Sender<PaymentsRequest>,
}

impl PaymentsClient {
    pub fn new(sender: mpsc::Sender<PaymentsRequest>) -> Self {
        Self { sender }
    }

    /// Opens a payment session and returns the collaborator's session
    /// document untouched. This service never looks inside it.
    #[instrument(skip(self, request))]
    pub async fn create_session(&self, request: SessionRequest) -> Result<Value, OrderError> {
        debug!(order_id = %request.order_id, "creating payment session");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(PaymentsRequest::CreateSession {
                request,
                respond_to,
            })
            .await
            .map_err(|_| OrderError::upstream("payments", "unreachable (channel closed)"))?;
        response
            .await
            .map_err(|_| OrderError::upstream("payments", "no reply (channel dropped)"))?
            .map_err(|detail| OrderError::upstream("payments", detail))
    }
}

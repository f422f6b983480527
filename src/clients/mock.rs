//! In-process doubles for the catalog and payment collaborators.
//!
//! Each mock spawns a task that answers requests over the real channel
//! types, so everything downstream of the client is exercised exactly as
//! in production. Used by the integration tests and the demo binary.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::clients::{CatalogClient, CatalogRequest, PaymentsClient, PaymentsRequest};
use crate::domain::{ProductRecord, SessionRequest};
use crate::store::{StoreHandle, StoreRequest};

/// Product catalog double backed by a fixed product table.
///
/// Answers each lookup with the subset of requested ids it knows about,
/// the way the real catalog does. [`MockCatalog::fail_next`] makes the
/// next lookup report an error instead.
pub struct MockCatalog {
    client: CatalogClient,
    calls: Arc<AtomicUsize>,
    fail_next: Arc<AtomicBool>,
}

impl MockCatalog {
    pub fn new(products: Vec<ProductRecord>) -> Self {
        let (sender, mut receiver) = mpsc::channel::<CatalogRequest>(16);
        let calls = Arc::new(AtomicUsize::new(0));
        let fail_next = Arc::new(AtomicBool::new(false));
        let table: HashMap<_, _> = products
            .into_iter()
            .map(|product| (product.id.clone(), product))
            .collect();

        let task_calls = calls.clone();
        let task_fail = fail_next.clone();
        tokio::spawn(async move {
            while let Some(CatalogRequest::ResolveProducts {
                product_ids,
                respond_to,
            }) = receiver.recv().await
            {
                task_calls.fetch_add(1, Ordering::SeqCst);
                let reply = if task_fail.swap(false, Ordering::SeqCst) {
                    Err("catalog unavailable".to_string())
                } else {
                    Ok(product_ids
                        .iter()
                        .filter_map(|id| table.get(id).cloned())
                        .collect())
                };
                let _ = respond_to.send(reply);
            }
        });

        Self {
            client: CatalogClient::new(sender),
            calls,
            fail_next,
        }
    }

    pub fn client(&self) -> CatalogClient {
        self.client.clone()
    }

    /// Lookups answered so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Makes the next lookup answer with an error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

/// Payment collaborator double that issues canned session documents.
pub struct MockPayments {
    client: PaymentsClient,
    calls: Arc<AtomicUsize>,
    fail_next: Arc<AtomicBool>,
}

impl MockPayments {
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<PaymentsRequest>(16);
        let calls = Arc::new(AtomicUsize::new(0));
        let fail_next = Arc::new(AtomicBool::new(false));

        let task_calls = calls.clone();
        let task_fail = fail_next.clone();
        tokio::spawn(async move {
            while let Some(PaymentsRequest::CreateSession {
                request,
                respond_to,
            }) = receiver.recv().await
            {
                let call = task_calls.fetch_add(1, Ordering::SeqCst) + 1;
                let reply = if task_fail.swap(false, Ordering::SeqCst) {
                    Err("payment collaborator unavailable".to_string())
                } else {
                    Ok(session_document(call, &request))
                };
                let _ = respond_to.send(reply);
            }
        });

        Self {
            client: PaymentsClient::new(sender),
            calls,
            fail_next,
        }
    }

    pub fn client(&self) -> PaymentsClient {
        self.client.clone()
    }

    /// Sessions opened so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Makes the next session request answer with an error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl Default for MockPayments {
    fn default() -> Self {
        Self::new()
    }
}

/// Session document shaped like the real collaborator's reply.
fn session_document(call: usize, request: &SessionRequest) -> Value {
    json!({
        "id": format!("cs_test_{call}"),
        "url": format!("https://pay.example/session/cs_test_{call}"),
        "currency": request.currency,
        "orderId": request.order_id,
    })
}

/// Store handle plus the raw request stream, for tests that script store
/// replies by hand instead of running the real store task.
pub fn scripted_store(capacity: usize) -> (StoreHandle, mpsc::Receiver<StoreRequest>) {
    let (sender, receiver) = mpsc::channel(capacity);
    (StoreHandle::from_sender(sender), receiver)
}

/// Catalog client plus the raw request stream for hand-scripted replies.
pub fn scripted_catalog(capacity: usize) -> (CatalogClient, mpsc::Receiver<CatalogRequest>) {
    let (sender, receiver) = mpsc::channel(capacity);
    (CatalogClient::new(sender), receiver)
}

/// Payments client plus the raw request stream for hand-scripted replies.
pub fn scripted_payments(capacity: usize) -> (PaymentsClient, mpsc::Receiver<PaymentsRequest>) {
    let (sender, receiver) = mpsc::channel(capacity);
    (PaymentsClient::new(sender), receiver)
}

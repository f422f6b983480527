//! Client for the product catalog collaborator.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

use crate::domain::{ProductId, ProductRecord};
use crate::error::OrderError;

/// Requests understood by the product catalog.
#[derive(Debug)]
pub enum CatalogRequest {
    /// Resolve the current price and name for a set of products. The reply
    /// carries a record for every id the catalog knows; unknown ids are
    /// simply absent from it.
    ResolveProducts {
        product_ids: Vec<ProductId>,
        respond_to: oneshot::Sender<Result<Vec<ProductRecord>, String>>,
    },
}

/// Cloneable handle for talking to the catalog.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    sender: mpsc::Sender<CatalogRequest>,
}

impl CatalogClient {
    pub fn new(sender: mpsc::Sender<CatalogRequest>) -> Self {
        Self { sender }
    }

    /// Asks the catalog for the current price and name of each product.
    ///
    /// Transport failures and collaborator-reported errors both come back
    /// as [`OrderError::UpstreamFailure`]; callers see the catalog as
    /// something that either answers or is unavailable.
    #[instrument(skip(self))]
    pub async fn resolve_products(
        &self,
        product_ids: Vec<ProductId>,
    ) -> Result<Vec<ProductRecord>, OrderError> {
        debug!(count = product_ids.len(), "resolving products");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(CatalogRequest::ResolveProducts {
                product_ids,
                respond_to,
            })
            .await
            .map_err(|_| OrderError::upstream("catalog", "unreachable (channel closed)"))?;
        response
            .await
            .map_err(|_| OrderError::upstream("catalog", "no reply (channel dropped)"))?
            .map_err(|detail| OrderError::upstream("catalog", detail))
    }
}

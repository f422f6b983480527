use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::clients::{CatalogClient, PaymentsClient};
use crate::config::SystemConfig;
use crate::router::{OrderRouter, OrdersClient};
use crate::service::OrderService;
use crate::store::OrderStore;

/// Runtime orchestrator for the order service.
///
/// `OrderSystem` starts the store and router tasks, wires the engine
/// between them, and hands out the client used to talk to the service.
/// The catalog and payment clients point at whatever implements those
/// collaborators; the system itself does not care whether that is a real
/// deployment or an in-process double.
///
/// # Example
///
/// ```ignore
/// let catalog = MockCatalog::new(products);
/// let payments = MockPayments::new();
/// let system = OrderSystem::start(SystemConfig::default(), catalog.client(), payments.client());
///
/// let checkout = system.orders.create_order(payload).await?;
///
/// system.shutdown().await?;
/// ```
pub struct OrderSystem {
    /// Client for the service's protocol surface.
    pub orders: OrdersClient,

    /// Task handles for the store and router, awaited on shutdown.
    handles: Vec<JoinHandle<()>>,
}

impl OrderSystem {
    /// Starts the system against the given collaborators.
    pub fn start(config: SystemConfig, catalog: CatalogClient, payments: PaymentsClient) -> Self {
        let (store, store_handle) = OrderStore::new(config.store_capacity);
        let store_task = tokio::spawn(store.run());

        let service = OrderService::new(store_handle, catalog, payments);
        let (router, orders) = OrderRouter::new(config.mailbox_capacity, service);
        let router_task = tokio::spawn(router.run());

        info!(
            mailbox_capacity = config.mailbox_capacity,
            store_capacity = config.store_capacity,
            "order system started"
        );
        Self {
            orders,
            handles: vec![store_task, router_task],
        }
    }

    /// Gracefully shuts the system down.
    ///
    /// Dropping the client closes the router's mailbox; the router drains
    /// in-flight work and exits, its engine clones drop, the store's
    /// channel closes, and both tasks finish. Callers must drop their own
    /// client clones first, or this waits forever.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("shutting down order system");
        drop(self.orders);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("task failed: {e:?}");
                return Err(format!("task failed: {e:?}"));
            }
        }

        info!("order system shutdown complete");
        Ok(())
    }
}

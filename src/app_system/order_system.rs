use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use crate::clients::{CatalogClient, OrderCoordinator, OrderQueryService, StockLedger};
use crate::config::EngineConfig;
use crate::error::StoreError;
use crate::store::{StoreActor, StoreClient};

/// The running engine: the store task plus every client wired to it.
///
/// Responsible for starting the store, injecting its handle into the clients,
/// and shutting down.
pub struct OrderSystem {
    pub catalog: CatalogClient,
    pub stock_ledger: StockLedger,
    pub orders: OrderCoordinator,
    pub order_queries: OrderQueryService,
    store: StoreClient,
    handles: Vec<JoinHandle<()>>,
}

impl OrderSystem {
    /// Starts the store task. Must be called from inside a tokio runtime.
    #[instrument(name = "order_system", skip(config))]
    pub fn new(config: &EngineConfig) -> Self {
        info!("Starting order system");

        let (store_actor, store) = StoreActor::new(config);
        let handles = vec![tokio::spawn(store_actor.run())];

        let stock_ledger = StockLedger::new(store.clone());
        let orders = OrderCoordinator::new(store.clone(), stock_ledger.clone());

        info!("Order system started");

        Self {
            catalog: CatalogClient::new(store.clone()),
            stock_ledger,
            orders,
            order_queries: OrderQueryService::new(store.clone()),
            store,
            handles,
        }
    }

    /// Handle for tests and tooling that talk to the store directly.
    pub fn store(&self) -> &StoreClient {
        &self.store
    }

    /// Stops the store after the requests already queued ahead of the shutdown,
    /// then waits for its task to finish.
    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), StoreError> {
        info!("Shutting down order system");

        self.store.shutdown().await?;

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Store task failed");
                return Err(StoreError::Communication(format!("store task failed: {}", e)));
            }
        }

        info!("Order system shutdown complete");
        Ok(())
    }
}

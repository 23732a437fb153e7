use tracing::{debug, info, instrument, warn};

use crate::domain::{Item, ItemId};
use crate::error::StockError;
use crate::store::{StoreClient, UnitOfWork};

/// Which way a stock adjustment moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDirection {
    Restock,
    /// A purchase made outside an order.
    Purchase,
}

/// Reads and conditionally adjusts the stock column of catalog items.
///
/// Adjustments are evaluated by the store against the quantity it holds at
/// that moment. Callers never compute a new quantity themselves.
#[derive(Clone, Debug)]
pub struct StockLedger {
    store: StoreClient,
}

impl StockLedger {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn get_item(&self, id: ItemId) -> Result<Item, StockError> {
        debug!("Sending request");
        Ok(self.store.get_item(id).await?)
    }

    /// Adjusts stock by `delta` as a standalone atomic step.
    #[instrument(skip(self))]
    pub async fn adjust_quantity(&self, id: ItemId, delta: i64) -> Result<(), StockError> {
        debug!("Sending request");
        Ok(self.store.adjust_quantity(id, delta).await?)
    }

    /// Adjusts stock by `delta` inside an open unit of work.
    #[instrument(skip(self, uow))]
    pub async fn adjust_quantity_in(
        &self,
        uow: &UnitOfWork,
        id: ItemId,
        delta: i64,
    ) -> Result<(), StockError> {
        debug!("Sending request");
        Ok(uow.adjust_quantity(id, delta).await?)
    }

    /// Restock or purchase-outside-an-order of `quantity` units.
    #[instrument(skip(self))]
    pub async fn adjust_stock(
        &self,
        id: ItemId,
        quantity: u32,
        direction: StockDirection,
    ) -> Result<(), StockError> {
        if quantity == 0 {
            warn!("Rejected zero quantity");
            return Err(StockError::InvalidQuantity(quantity));
        }
        let delta = match direction {
            StockDirection::Restock => i64::from(quantity),
            StockDirection::Purchase => -i64::from(quantity),
        };

        match self.adjust_quantity(id, delta).await {
            Ok(()) => {
                info!("Stock adjusted");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Stock adjustment failed");
                Err(e)
            }
        }
    }
}

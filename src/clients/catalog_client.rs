use tracing::{debug, info, instrument, warn};

use crate::domain::{Item, ItemCreate, ItemId, ItemPatch};
use crate::error::CatalogError;
use crate::store::StoreClient;

/// Catalog maintenance used by the engine: create, read and patch items.
///
/// Payloads are validated here before they reach the store.
#[derive(Clone, Debug)]
pub struct CatalogClient {
    store: StoreClient,
}

impl CatalogClient {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    #[instrument(fields(name = %params.name, price = %params.price), skip(self, params))]
    pub async fn create_item(&self, params: ItemCreate) -> Result<ItemId, CatalogError> {
        debug!("Sending request");
        if let Err(e) = params.validate() {
            warn!(error = %e, "Rejected item");
            return Err(e.into());
        }
        let id = self.store.create_item(params).await?;
        info!(item_id = %id, "Item created");
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn get_item(&self, id: ItemId) -> Result<Item, CatalogError> {
        debug!("Sending request");
        Ok(self.store.get_item(id).await?)
    }

    #[instrument(skip(self))]
    pub async fn update_item(&self, id: ItemId, patch: ItemPatch) -> Result<Item, CatalogError> {
        debug!("Sending request");
        if let Err(e) = patch.validate() {
            warn!(error = %e, "Rejected patch");
            return Err(e.into());
        }
        Ok(self.store.update_item(id, patch).await?)
    }
}

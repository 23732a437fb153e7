use tracing::{debug, info, instrument};

use crate::domain::{OrderId, OrderView, Principal};
use crate::error::OrderError;
use crate::store::StoreClient;

/// Read-only order history, scoped by the caller's role.
#[derive(Clone, Debug)]
pub struct OrderQueryService {
    store: StoreClient,
}

impl OrderQueryService {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    /// Every order for admins, the caller's own orders otherwise. Most recent first.
    #[instrument(fields(principal_id = %principal.id, role = ?principal.role), skip(self, principal))]
    pub async fn list_for_principal(&self, principal: &Principal) -> Result<Vec<OrderView>, OrderError> {
        debug!("Sending request");
        let owner = (!principal.role.is_elevated()).then_some(principal.id);
        let orders = self.store.list_orders(owner).await?;
        info!(order_count = orders.len(), "Listed orders");
        Ok(orders)
    }

    /// A single historical order, or `None` if it does not exist or the caller may not see it.
    #[instrument(fields(principal_id = %principal.id), skip(self, principal))]
    pub async fn get_order(
        &self,
        principal: &Principal,
        id: OrderId,
    ) -> Result<Option<OrderView>, OrderError> {
        debug!("Sending request");
        let order = self.store.get_order(id).await?;
        match &order {
            Some(order) => info!(total = %order.total, "Order found"),
            None => debug!("Order not found"),
        }
        Ok(order.filter(|order| principal.can_view(order.owner_id)))
    }
}

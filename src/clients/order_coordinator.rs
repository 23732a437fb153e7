use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{error, info, instrument, warn};

use crate::domain::{
    ItemId, LineRequest, OrderCreate, OrderId, OrderLineCreate, PrincipalId,
};
use crate::error::{OrderError, StockError};
use crate::store::{StoreClient, UnitOfWork};
use super::StockLedger;

/// A requested line with the price read from the catalog.
#[derive(Debug, Clone, Copy)]
struct PricedLine {
    item_id: ItemId,
    quantity: u32,
    unit_price: Decimal,
}

/// Creates orders as one all-or-nothing unit of work.
///
/// 1. **Validate** the request shape (no I/O)
/// 2. **Pre-check** every line against the currently known stock
/// 3. **Price** each line from that read, snapshotting the unit price
/// 4. **Write** header, lines and stock decrements in one unit of work; the
///    conditional decrement is the guard that actually prevents overselling
/// 5. **Commit**, or roll back everything on any failure
#[derive(Clone, Debug)]
pub struct OrderCoordinator {
    store: StoreClient,
    ledger: StockLedger,
}

impl OrderCoordinator {
    pub fn new(store: StoreClient, ledger: StockLedger) -> Self {
        Self { store, ledger }
    }

    #[instrument(fields(principal_id = %principal_id, lines = items.len()), skip(self, items))]
    pub async fn create_order(
        &self,
        principal_id: PrincipalId,
        items: Vec<LineRequest>,
    ) -> Result<OrderId, OrderError> {
        info!("Processing create_order request");

        // Step 1: Validate request
        validate_request(&items)?;

        // Step 2 + 3: Optimistic stock pre-check and price snapshot
        let lines = self.price_lines(&items).await?;
        let total = order_total(&lines)?;
        let created_at = Utc::now();

        // Step 4: Atomic write
        let uow = self.store.begin().await.map_err(|e| {
            error!(error = %e, "Could not open unit of work");
            OrderError::from(e)
        })?;

        match self.write_order(&uow, principal_id, total, created_at, &lines).await {
            Ok(order_id) => {
                // Step 5: Commit
                if let Err(e) = uow.commit().await {
                    error!(error = %e, "Commit failed, order discarded");
                    return Err(OrderError::TransactionFailure(e.to_string()));
                }
                info!(order_id = %order_id, total = %total, "Order created successfully");
                Ok(order_id)
            }
            Err(e) => {
                uow.rollback().await;
                warn!(error = %e, "Order rolled back");
                Err(e)
            }
        }
    }

    async fn price_lines(&self, items: &[LineRequest]) -> Result<Vec<PricedLine>, OrderError> {
        let mut lines = Vec::with_capacity(items.len());
        for request in items {
            let item = match self.ledger.get_item(request.item_id).await {
                Ok(item) => item,
                Err(StockError::NotFound(id)) => {
                    warn!(item_id = %id, "Item not found");
                    return Err(OrderError::ItemNotFound(id));
                }
                Err(e) => {
                    error!(error = %e, "Item lookup failed");
                    return Err(e.into());
                }
            };

            if request.quantity > item.quantity {
                warn!(
                    item_id = %item.id,
                    requested = request.quantity,
                    available = item.quantity,
                    "Insufficient stock at pre-check"
                );
                return Err(OrderError::InsufficientStock {
                    item_id: item.id,
                    requested: u64::from(request.quantity),
                    available: item.quantity,
                });
            }

            lines.push(PricedLine {
                item_id: item.id,
                quantity: request.quantity,
                unit_price: item.price,
            });
        }
        Ok(lines)
    }

    async fn write_order(
        &self,
        uow: &UnitOfWork,
        principal_id: PrincipalId,
        total: Decimal,
        created_at: DateTime<Utc>,
        lines: &[PricedLine],
    ) -> Result<OrderId, OrderError> {
        let order_id = uow
            .insert_order(OrderCreate {
                owner_id: principal_id,
                total,
                created_at,
            })
            .await?;

        for line in lines {
            uow.insert_order_line(OrderLineCreate {
                order_id,
                item_id: line.item_id,
                quantity: line.quantity,
                unit_price_at_purchase: line.unit_price,
            })
            .await?;
            self.ledger
                .adjust_quantity_in(uow, line.item_id, -i64::from(line.quantity))
                .await?;
        }

        Ok(order_id)
    }
}

fn validate_request(items: &[LineRequest]) -> Result<(), OrderError> {
    if items.is_empty() {
        warn!("Rejected empty order");
        return Err(OrderError::ValidationError(
            "items must not be empty".to_string(),
        ));
    }
    if let Some(line) = items.iter().find(|line| line.quantity == 0) {
        warn!(item_id = %line.item_id, "Rejected non-positive quantity");
        return Err(OrderError::ValidationError(format!(
            "quantity for {} must be positive",
            line.item_id
        )));
    }
    Ok(())
}

fn order_total(lines: &[PricedLine]) -> Result<Decimal, OrderError> {
    lines.iter().try_fold(Decimal::ZERO, |total, line| {
        line.unit_price
            .checked_mul(Decimal::from(line.quantity))
            .and_then(|subtotal| total.checked_add(subtotal))
            .ok_or_else(|| OrderError::ValidationError("order total overflows".to_string()))
    })
}

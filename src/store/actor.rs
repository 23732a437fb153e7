use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::catalog::StockAction;
use crate::config::EngineConfig;
use crate::domain::{
    Item, ItemId, Order, OrderId, OrderLine, OrderLineId, OrderLineView, OrderView, PrincipalId,
};
use crate::error::StoreError;
use super::client::{StoreClient, UnitOfWork};
use super::entity::Table;
use super::messages::{Envelope, Response, StoreRequest, TxMessage};

// =============================================================================
// Tables and undo journal
// =============================================================================

#[derive(Debug, Default)]
struct Tables {
    items: Table<Item>,
    orders: Table<Order>,
    order_lines: Table<OrderLine>,
}

impl Tables {
    fn view(&self, order: &Order) -> OrderView {
        let lines = self
            .order_lines
            .values()
            .filter(|line| line.order_id == order.id)
            .map(|line| OrderLineView {
                item_id: line.item_id,
                item_name: self
                    .items
                    .get(line.item_id)
                    .map(|item| item.name.clone())
                    .unwrap_or_default(),
                quantity: line.quantity,
                unit_price_at_purchase: line.unit_price_at_purchase,
            })
            .collect();

        OrderView {
            order_id: order.id,
            owner_id: order.owner_id,
            total: order.total,
            created_at: order.created_at,
            lines,
        }
    }

    fn list_views(&self, owner: Option<PrincipalId>) -> Vec<OrderView> {
        let mut orders: Vec<&Order> = self
            .orders
            .values()
            .filter(|order| owner.map_or(true, |owner| order.owner_id == owner))
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        orders.into_iter().map(|order| self.view(order)).collect()
    }
}

/// How to put back one write.
#[derive(Debug)]
enum Undo {
    RestoreItem(Item),
    RemoveItem(ItemId),
    RemoveOrder(OrderId),
    RemoveOrderLine(OrderLineId),
}

/// Writes made inside the current unit of work, newest last.
#[derive(Debug, Default)]
struct Journal {
    entries: Vec<Undo>,
    aborted: Option<String>,
}

impl Journal {
    fn record(&mut self, undo: Undo) {
        self.entries.push(undo);
    }
}

// =============================================================================
// The store task
// =============================================================================

/// Single-writer store task owning the item, order and order line relations.
///
/// Requests on the main queue are applied one at a time. A unit of work takes
/// over the task until it ends, which serializes every write to an item row.
pub struct StoreActor {
    receiver: mpsc::Receiver<Envelope>,
    tables: Tables,
    tx_buffer: usize,
    tx_idle_timeout: Duration,
    #[cfg(test)]
    fail_next_commit: bool,
}

impl StoreActor {
    pub fn new(config: &EngineConfig) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(config.store_buffer);
        let actor = Self {
            receiver,
            tables: Tables::default(),
            tx_buffer: config.tx_buffer,
            tx_idle_timeout: config.tx_idle_timeout,
            #[cfg(test)]
            fail_next_commit: false,
        };
        (actor, StoreClient::new(sender))
    }

    #[instrument(name = "store", skip(self))]
    pub async fn run(mut self) {
        info!("Store starting");

        while let Some(envelope) = self.receiver.recv().await {
            match envelope {
                Envelope::Request(request) => {
                    let mut journal = Journal::default();
                    let _ = self.handle_request(request, &mut journal);
                }
                Envelope::Begin { respond_to } => {
                    self.handle_unit_of_work(respond_to).await;
                }
                Envelope::Shutdown => {
                    info!("Store shutting down");
                    break;
                }
                #[cfg(test)]
                Envelope::RowCounts { respond_to } => {
                    let _ = respond_to.send(super::messages::RowCounts {
                        items: self.tables.items.len(),
                        orders: self.tables.orders.len(),
                        order_lines: self.tables.order_lines.len(),
                    });
                }
                #[cfg(test)]
                Envelope::FailNextCommit => {
                    self.fail_next_commit = true;
                }
            }
        }

        info!("Store stopped");
    }

    /// Serves one unit of work to completion.
    #[instrument(skip(self, respond_to))]
    async fn handle_unit_of_work(&mut self, respond_to: oneshot::Sender<UnitOfWork>) {
        let (sender, mut receiver) = mpsc::channel(self.tx_buffer);
        if respond_to.send(UnitOfWork::new(sender)).is_err() {
            debug!("Caller went away before the unit of work started");
            return;
        }
        debug!("Unit of work open");

        let mut journal = Journal::default();
        loop {
            let message = match timeout(self.tx_idle_timeout, receiver.recv()).await {
                Ok(message) => message,
                Err(_) => {
                    warn!(
                        timeout_ms = self.tx_idle_timeout.as_millis(),
                        "Unit of work idle for too long, rolling back"
                    );
                    self.rollback(journal);
                    return;
                }
            };

            match message {
                Some(TxMessage::Request(request)) => {
                    if let Some(reason) = &journal.aborted {
                        request.reject(StoreError::Aborted(reason.clone()));
                        continue;
                    }
                    let kind = request.kind();
                    if let Err(e) = self.handle_request(request, &mut journal) {
                        debug!(request = kind, error = %e, "Request failed, unit of work aborted");
                        journal.aborted = Some(format!("{} failed: {}", kind, e));
                    }
                }
                Some(TxMessage::Commit { respond_to }) => {
                    let result = self.commit(journal);
                    let _ = respond_to.send(result);
                    return;
                }
                Some(TxMessage::Rollback) | None => {
                    self.rollback(journal);
                    return;
                }
            }
        }
    }

    fn commit(&mut self, journal: Journal) -> Result<(), StoreError> {
        if let Some(reason) = journal.aborted.clone() {
            warn!(reason = %reason, "Commit refused for aborted unit of work");
            self.rollback(journal);
            return Err(StoreError::Aborted(reason));
        }

        #[cfg(test)]
        if std::mem::take(&mut self.fail_next_commit) {
            warn!("Injected commit failure");
            self.rollback(journal);
            return Err(StoreError::Aborted("injected commit failure".to_string()));
        }

        info!(writes = journal.entries.len(), "Unit of work committed");
        Ok(())
    }

    fn rollback(&mut self, journal: Journal) {
        let writes = journal.entries.len();
        for undo in journal.entries.into_iter().rev() {
            match undo {
                Undo::RestoreItem(item) => self.tables.items.restore(item),
                Undo::RemoveItem(id) => self.tables.items.remove(id),
                Undo::RemoveOrder(id) => self.tables.orders.remove(id),
                Undo::RemoveOrderLine(id) => self.tables.order_lines.remove(id),
            }
        }
        info!(writes, "Unit of work rolled back");
    }

    /// Applies one request, recording how to undo any write it made.
    ///
    /// A failed request changes nothing.
    fn handle_request(
        &mut self,
        request: StoreRequest,
        journal: &mut Journal,
    ) -> Result<(), StoreError> {
        match request {
            StoreRequest::GetItem { id, respond_to } => {
                let result = self
                    .tables
                    .items
                    .get(id)
                    .cloned()
                    .ok_or(StoreError::ItemNotFound(id));
                reply(respond_to, result)
            }
            StoreRequest::CreateItem { params, respond_to } => {
                let result = self.tables.items.insert(params);
                if let Ok(id) = &result {
                    journal.record(Undo::RemoveItem(*id));
                    info!(item_id = %id, "Item created");
                }
                reply(respond_to, result)
            }
            StoreRequest::UpdateItem {
                id,
                patch,
                respond_to,
            } => {
                let result = self
                    .tables
                    .items
                    .update(id, patch, StoreError::ItemNotFound)
                    .map(|(before, after)| {
                        journal.record(Undo::RestoreItem(before));
                        info!(item_id = %id, price = %after.price, "Item updated");
                        after
                    });
                reply(respond_to, result)
            }
            StoreRequest::AdjustQuantity {
                id,
                delta,
                respond_to,
            } => {
                let result = self.handle_adjust_quantity(id, delta, journal);
                reply(respond_to, result)
            }
            StoreRequest::InsertOrder { params, respond_to } => {
                let result = self.tables.orders.insert(params);
                if let Ok(id) = &result {
                    journal.record(Undo::RemoveOrder(*id));
                    debug!(order_id = %id, "Order header inserted");
                }
                reply(respond_to, result)
            }
            StoreRequest::InsertOrderLine { params, respond_to } => {
                let result = if !self.tables.orders.contains(params.order_id) {
                    Err(StoreError::Constraint(format!(
                        "order line references missing {}",
                        params.order_id
                    )))
                } else if !self.tables.items.contains(params.item_id) {
                    Err(StoreError::Constraint(format!(
                        "order line references missing {}",
                        params.item_id
                    )))
                } else {
                    self.tables.order_lines.insert(params).map(|id| {
                        journal.record(Undo::RemoveOrderLine(id));
                    })
                };
                reply(respond_to, result)
            }
            StoreRequest::GetOrder { id, respond_to } => {
                let view = self.tables.orders.get(id).map(|order| self.tables.view(order));
                reply(respond_to, Ok(view))
            }
            StoreRequest::ListOrders { owner, respond_to } => {
                let views = self.tables.list_views(owner);
                debug!(order_count = views.len(), "Listed orders");
                reply(respond_to, Ok(views))
            }
        }
    }

    #[instrument(fields(item_id = %id, delta), skip(self, journal))]
    fn handle_adjust_quantity(
        &mut self,
        id: ItemId,
        delta: i64,
        journal: &mut Journal,
    ) -> Result<(), StoreError> {
        match self
            .tables
            .items
            .act(id, StockAction::Adjust(delta), StoreError::ItemNotFound)
        {
            Ok((before, result)) => {
                journal.record(Undo::RestoreItem(before));
                debug!(?result, "Stock adjusted");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Stock adjustment rejected");
                Err(e)
            }
        }
    }
}

/// Sends `result` back and hands the outcome (without the value) to the caller.
fn reply<T>(respond_to: Response<T>, result: Result<T, StoreError>) -> Result<(), StoreError> {
    let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);
    let _ = respond_to.send(result);
    outcome
}

use tokio::sync::oneshot;

use crate::domain::{
    Item, ItemCreate, ItemId, ItemPatch, OrderCreate, OrderId, OrderLineCreate, OrderView,
    PrincipalId,
};
use crate::error::StoreError;
use super::client::UnitOfWork;

pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// Every operation the store serves, each with its own typed response channel.
///
/// The same requests are accepted in autocommit mode and inside a unit of work.
#[derive(Debug)]
pub enum StoreRequest {
    GetItem {
        id: ItemId,
        respond_to: Response<Item>,
    },
    CreateItem {
        params: ItemCreate,
        respond_to: Response<ItemId>,
    },
    UpdateItem {
        id: ItemId,
        patch: ItemPatch,
        respond_to: Response<Item>,
    },
    /// Conditional stock adjustment, evaluated against the stored quantity.
    AdjustQuantity {
        id: ItemId,
        delta: i64,
        respond_to: Response<()>,
    },
    InsertOrder {
        params: OrderCreate,
        respond_to: Response<OrderId>,
    },
    InsertOrderLine {
        params: OrderLineCreate,
        respond_to: Response<()>,
    },
    GetOrder {
        id: OrderId,
        respond_to: Response<Option<OrderView>>,
    },
    /// All orders when `owner` is `None`, most recent first.
    ListOrders {
        owner: Option<PrincipalId>,
        respond_to: Response<Vec<OrderView>>,
    },
}

impl StoreRequest {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            StoreRequest::GetItem { .. } => "get_item",
            StoreRequest::CreateItem { .. } => "create_item",
            StoreRequest::UpdateItem { .. } => "update_item",
            StoreRequest::AdjustQuantity { .. } => "adjust_quantity",
            StoreRequest::InsertOrder { .. } => "insert_order",
            StoreRequest::InsertOrderLine { .. } => "insert_order_line",
            StoreRequest::GetOrder { .. } => "get_order",
            StoreRequest::ListOrders { .. } => "list_orders",
        }
    }

    /// Answers the request with `error` without touching any table.
    pub(crate) fn reject(self, error: StoreError) {
        match self {
            StoreRequest::GetItem { respond_to, .. } => drop(respond_to.send(Err(error))),
            StoreRequest::CreateItem { respond_to, .. } => drop(respond_to.send(Err(error))),
            StoreRequest::UpdateItem { respond_to, .. } => drop(respond_to.send(Err(error))),
            StoreRequest::AdjustQuantity { respond_to, .. } => drop(respond_to.send(Err(error))),
            StoreRequest::InsertOrder { respond_to, .. } => drop(respond_to.send(Err(error))),
            StoreRequest::InsertOrderLine { respond_to, .. } => drop(respond_to.send(Err(error))),
            StoreRequest::GetOrder { respond_to, .. } => drop(respond_to.send(Err(error))),
            StoreRequest::ListOrders { respond_to, .. } => drop(respond_to.send(Err(error))),
        }
    }
}

/// Messages on the store's main queue.
#[derive(Debug)]
pub(crate) enum Envelope {
    /// A single request, applied atomically on its own.
    Request(StoreRequest),
    /// Opens a unit of work; the store serves nothing else until it ends.
    Begin {
        respond_to: oneshot::Sender<UnitOfWork>,
    },
    Shutdown,
    #[cfg(test)]
    RowCounts {
        respond_to: oneshot::Sender<RowCounts>,
    },
    #[cfg(test)]
    FailNextCommit,
}

/// Messages on a unit of work's private queue.
#[derive(Debug)]
pub(crate) enum TxMessage {
    Request(StoreRequest),
    Commit {
        respond_to: oneshot::Sender<Result<(), StoreError>>,
    },
    Rollback,
}

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RowCounts {
    pub items: usize,
    pub orders: usize,
    pub order_lines: usize,
}

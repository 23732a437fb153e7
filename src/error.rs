use thiserror::Error;

use crate::domain::{InvalidField, ItemId, OrderId};

/// Failures reported by the store task.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),
    #[error("Insufficient stock for {item_id}: requested {requested}, available {available}")]
    InsufficientStock {
        item_id: ItemId,
        requested: u64,
        available: u32,
    },
    #[error("Store validation error: {0}")]
    Validation(String),
    #[error("Constraint violation: {0}")]
    Constraint(String),
    #[error("{0} rows are immutable")]
    Immutable(&'static str),
    #[error("Unit of work aborted: {0}")]
    Aborted(String),
    #[error("Store communication error: {0}")]
    Communication(String),
}

impl From<InvalidField> for StoreError {
    fn from(e: InvalidField) -> Self {
        StoreError::Validation(e.to_string())
    }
}

/// Failures from stock ledger operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StockError {
    #[error("Item not found: {0}")]
    NotFound(ItemId),
    #[error("Insufficient stock for {item_id}: requested {requested}, available {available}")]
    InsufficientStock {
        item_id: ItemId,
        requested: u64,
        available: u32,
    },
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),
    #[error("Stock store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for StockError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ItemNotFound(id) => StockError::NotFound(id),
            StoreError::InsufficientStock {
                item_id,
                requested,
                available,
            } => StockError::InsufficientStock {
                item_id,
                requested,
                available,
            },
            other => StockError::Store(other),
        }
    }
}

/// Failures from catalog maintenance.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Item not found: {0}")]
    NotFound(ItemId),
    #[error("Catalog validation error: {0}")]
    Validation(#[from] InvalidField),
    #[error("Catalog store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for CatalogError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ItemNotFound(id) => CatalogError::NotFound(id),
            other => CatalogError::Store(other),
        }
    }
}

/// Errors that can occur during order operations.
///
/// Everything except `TransactionFailure` is a deterministic business-rule
/// rejection and must not be retried as-is.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order validation error: {0}")]
    ValidationError(String),
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),
    #[error("Insufficient stock for {item_id}: requested {requested}, available {available}")]
    InsufficientStock {
        item_id: ItemId,
        requested: u64,
        available: u32,
    },
    #[error("Order transaction failed: {0}")]
    TransactionFailure(String),
}

impl OrderError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, OrderError::TransactionFailure(_))
    }
}

impl From<StoreError> for OrderError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ItemNotFound(id) => OrderError::ItemNotFound(id),
            StoreError::InsufficientStock {
                item_id,
                requested,
                available,
            } => OrderError::InsufficientStock {
                item_id,
                requested,
                available,
            },
            other => OrderError::TransactionFailure(other.to_string()),
        }
    }
}

impl From<StockError> for OrderError {
    fn from(e: StockError) -> Self {
        match e {
            StockError::NotFound(id) => OrderError::ItemNotFound(id),
            StockError::InsufficientStock {
                item_id,
                requested,
                available,
            } => OrderError::InsufficientStock {
                item_id,
                requested,
                available,
            },
            StockError::InvalidQuantity(q) => {
                OrderError::ValidationError(format!("invalid quantity {}", q))
            }
            StockError::Store(e) => OrderError::from(e),
        }
    }
}

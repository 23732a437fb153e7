//! Typed clients over the store: the engine's public operations.

mod catalog_client;
mod order_coordinator;
mod order_queries;
mod stock_ledger;

pub use catalog_client::CatalogClient;
pub use order_coordinator::OrderCoordinator;
pub use order_queries::OrderQueryService;
pub use stock_ledger::{StockDirection, StockLedger};

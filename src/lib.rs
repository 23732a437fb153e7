//! # Sweetshop order engine
//!
//! Creates orders against a shared sweet inventory without ever overselling.
//!
//! ## Pieces
//!
//! - **Domain types**: plain data for items, orders and principals → [`domain`]
//! - **Store**: a single-writer task owning the relations, reached through
//!   [`StoreClient`] and interactive [`UnitOfWork`]s → [`store`]
//! - **Clients**: the engine's operations
//!     - [`StockLedger`]: read an item, conditionally adjust its stock
//!     - [`OrderCoordinator`]: validate, price and atomically write an order
//!     - [`OrderQueryService`]: order history scoped by role
//!     - [`CatalogClient`]: create and patch catalog items
//! - **System**: [`OrderSystem`] wires everything from an [`EngineConfig`];
//!   [`setup_tracing`] installs structured logging
//!
//! ## Example
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use rust_decimal::Decimal;
//! use sweetshop_engine::{EngineConfig, OrderSystem};
//! use sweetshop_engine::domain::{ItemCreate, LineRequest, Principal, PrincipalId};
//!
//! let system = OrderSystem::new(&EngineConfig::default());
//! let fudge = system
//!     .catalog
//!     .create_item(ItemCreate::new("Fudge", "Chocolate", Decimal::new(300, 2), 5))
//!     .await?;
//!
//! let customer = Principal::customer(PrincipalId::new(1));
//! let order_id = system
//!     .orders
//!     .create_order(customer.id, vec![LineRequest::new(fudge, 2)])
//!     .await?;
//!
//! let history = system.order_queries.list_for_principal(&customer).await?;
//! assert_eq!(history[0].order_id, order_id);
//!
//! system.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod app_system;
pub mod catalog;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod orders;
pub mod store;

#[cfg(test)]
mod mock_framework;
#[cfg(test)]
mod integration_tests;

pub use app_system::{setup_tracing, OrderSystem};
pub use clients::{CatalogClient, OrderCoordinator, OrderQueryService, StockDirection, StockLedger};
pub use config::{ConfigError, EngineConfig};
pub use error::{CatalogError, OrderError, StockError, StoreError};
pub use store::{StoreClient, UnitOfWork};

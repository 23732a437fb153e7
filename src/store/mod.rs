//! # Store
//!
//! A single-writer store task that owns the item, order and order line
//! relations, plus the handles used to reach it.
//!
//! - [`StoreClient`] sends autocommit requests; each is applied atomically.
//! - [`StoreClient::begin`] opens a [`UnitOfWork`]. While it is open the store
//!   serves only that unit of work, applying its requests against the live
//!   tables with an undo journal. Commit keeps the writes; rollback, a dropped
//!   handle, an idle timeout or any failed request discards them all.
//!
//! Every other backend for this engine has to give the same two guarantees:
//! stock adjustments are conditional on the stored quantity, and a unit of work
//! is all-or-nothing.

#[macro_use]
mod macros;

mod actor;
mod client;
mod entity;
mod messages;

pub use actor::StoreActor;
pub use client::{call, Executor, StoreClient, UnitOfWork};
pub use entity::{Entity, Table};
pub use messages::{Response, StoreRequest};
#[cfg(test)]
pub(crate) use messages::{Envelope, RowCounts, TxMessage};

//! Order header and order line rows.

pub mod entity;

//! Item rows and the stock actions the store evaluates against them.

mod actions;
pub mod entity;

pub use actions::*;

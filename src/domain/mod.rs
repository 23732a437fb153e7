pub mod ids;
pub mod item;
pub mod order;
pub mod principal;

pub use ids::*;
pub use item::*;
pub use order::*;
pub use principal::*;

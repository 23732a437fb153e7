/// Stock operations evaluated against a single item row inside the store.
///
/// The store applies each action to the row it currently holds, so the check
/// and the write can never be separated by another request.
#[derive(Debug, Clone)]
pub enum StockAction {
    /// Adds `delta` to the stock level; negative deltas must not drive it below zero.
    Adjust(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StockActionResult {
    Adjusted { quantity: u32 },
}

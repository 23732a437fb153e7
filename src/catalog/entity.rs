use crate::domain::{Item, ItemCreate, ItemId, ItemPatch};
use crate::error::StoreError;
use crate::store::Entity;
use super::actions::{StockAction, StockActionResult};

impl Entity for Item {
    type Id = ItemId;
    type CreateParams = ItemCreate;
    type Patch = ItemPatch;
    type Action = StockAction;
    type ActionResult = StockActionResult;

    const TABLE: &'static str = "item";

    fn id(&self) -> ItemId {
        self.id
    }

    fn from_create_params(id: ItemId, params: ItemCreate) -> Result<Self, StoreError> {
        params.validate()?;
        Ok(Self {
            id,
            name: params.name,
            category: params.category,
            price: params.price,
            quantity: params.quantity,
        })
    }

    /// Updates name, category and/or price. Stock is not reachable from a patch.
    fn on_update(&mut self, patch: ItemPatch) -> Result<(), StoreError> {
        patch.validate()?;
        patch.apply_to(self);
        Ok(())
    }

    /// # Errors
    /// `InsufficientStock` when a negative delta exceeds the stock held right now,
    /// `Validation` when a restock would overflow the quantity column.
    fn handle_action(&mut self, action: StockAction) -> Result<StockActionResult, StoreError> {
        match action {
            StockAction::Adjust(delta) => {
                let id = self.id;
                let overflow =
                    move || StoreError::Validation(format!("stock for {} would overflow", id));
                let next = i64::from(self.quantity)
                    .checked_add(delta)
                    .ok_or_else(overflow)?;
                if next < 0 {
                    return Err(StoreError::InsufficientStock {
                        item_id: self.id,
                        requested: delta.unsigned_abs(),
                        available: self.quantity,
                    });
                }
                self.quantity = u32::try_from(next).map_err(|_| overflow())?;
                Ok(StockActionResult::Adjusted {
                    quantity: self.quantity,
                })
            }
        }
    }
}

use crate::domain::{Order, OrderCreate, OrderId, OrderLine, OrderLineCreate, OrderLineId};
use crate::error::StoreError;
use crate::store::Entity;

// Orders and their lines are permanent records: the default update/action
// hooks reject every mutation.

impl Entity for Order {
    type Id = OrderId;
    type CreateParams = OrderCreate;
    type Patch = ();
    type Action = ();
    type ActionResult = ();

    const TABLE: &'static str = "order";

    fn id(&self) -> OrderId {
        self.id
    }

    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, StoreError> {
        if params.total < rust_decimal::Decimal::ZERO {
            return Err(StoreError::Validation(format!(
                "order total {} is negative",
                params.total
            )));
        }
        Ok(Self {
            id,
            owner_id: params.owner_id,
            total: params.total,
            created_at: params.created_at,
        })
    }
}

impl Entity for OrderLine {
    type Id = OrderLineId;
    type CreateParams = OrderLineCreate;
    type Patch = ();
    type Action = ();
    type ActionResult = ();

    const TABLE: &'static str = "order_line";

    fn id(&self) -> OrderLineId {
        self.id
    }

    fn from_create_params(id: OrderLineId, params: OrderLineCreate) -> Result<Self, StoreError> {
        if params.quantity == 0 {
            return Err(StoreError::Validation(format!(
                "line for {} has zero quantity",
                params.item_id
            )));
        }
        Ok(Self {
            id,
            order_id: params.order_id,
            item_id: params.item_id,
            quantity: params.quantity,
            unit_price_at_purchase: params.unit_price_at_purchase,
        })
    }
}

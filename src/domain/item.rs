use rust_decimal::Decimal;
use thiserror::Error;

use super::ItemId;

/// A catalog row: one sweet with its current price and available stock.
///
/// `quantity` only changes through conditional stock adjustments in the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub quantity: u32,
}

/// A field rejected at the catalog boundary.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("invalid {field}: {reason}")]
pub struct InvalidField {
    pub field: &'static str,
    pub reason: &'static str,
}

/// Payload for creating a new catalog item.
#[derive(Debug, Clone)]
pub struct ItemCreate {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub quantity: u32,
}

impl ItemCreate {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            price,
            quantity,
        }
    }

    pub fn validate(&self) -> Result<(), InvalidField> {
        require_text("name", &self.name)?;
        require_text("category", &self.category)?;
        require_price(self.price)
    }
}

/// Every catalog field that may be changed after creation.
///
/// Stock is not patchable; it moves only through the stock ledger.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
}

impl ItemPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.category.is_none() && self.price.is_none()
    }

    pub fn validate(&self) -> Result<(), InvalidField> {
        if self.is_empty() {
            return Err(InvalidField {
                field: "patch",
                reason: "must change at least one field",
            });
        }
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(category) = &self.category {
            require_text("category", category)?;
        }
        if let Some(price) = self.price {
            require_price(price)?;
        }
        Ok(())
    }

    /// Applies an already validated patch.
    pub fn apply_to(self, item: &mut Item) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(price) = self.price {
            item.price = price;
        }
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), InvalidField> {
    if value.trim().is_empty() {
        return Err(InvalidField {
            field,
            reason: "must not be blank",
        });
    }
    Ok(())
}

fn require_price(price: Decimal) -> Result<(), InvalidField> {
    if price < Decimal::ZERO {
        return Err(InvalidField {
            field: "price",
            reason: "must not be negative",
        });
    }
    Ok(())
}

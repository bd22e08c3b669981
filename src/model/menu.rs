use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for menu items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MenuItemId(pub u32);

impl From<u32> for MenuItemId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for MenuItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "menu_item_{}", self.0)
    }
}

/// A dish as currently listed. Orders copy `price_cents` at order time, so
/// later price edits never touch existing orders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub price_cents: u64,
    pub available: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuItemCreate {
    pub name: String,
    pub price_cents: u64,
}

impl MenuItem {
    pub fn new(id: MenuItemId, params: MenuItemCreate) -> Self {
        Self {
            id,
            name: params.name,
            price_cents: params.price_cents,
            available: true,
        }
    }
}

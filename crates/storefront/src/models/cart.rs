//! Shopping cart models.

use rust_decimal::Decimal;
use serde::Serialize;

use fraz_modern_core::{CartId, CartItemId, LineItem, subtotal};

use super::Product;

/// A user's cart with its lines.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    pub items: Vec<CartLine>,
    pub subtotal: Decimal,
    pub item_count: i64,
}

impl Cart {
    /// Build a cart, pricing lines at the current product price.
    #[must_use]
    pub fn new(id: CartId, items: Vec<CartLine>) -> Self {
        let priced: Vec<LineItem> = items.iter().map(CartLine::line_item).collect();
        let item_count = items.iter().map(|line| i64::from(line.quantity)).sum();
        Self {
            id,
            subtotal: subtotal(&priced),
            item_count,
            items,
        }
    }
}

/// One product in a cart.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub id: CartItemId,
    pub quantity: i32,
    pub product: Product,
}

impl CartLine {
    #[must_use]
    pub const fn line_item(&self) -> LineItem {
        LineItem {
            unit_price: self.product.price,
            quantity: self.quantity,
        }
    }
}

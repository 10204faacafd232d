//! Order models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fraz_modern_core::{CartItemId, CouponId, OrderId, OrderItemId, OrderStatus, ProductId, UserId};

use super::UserRef;

/// Where an order ships to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl ShippingAddress {
    /// Trim every field, returning `None` if any field ends up empty.
    #[must_use]
    pub fn normalized(&self) -> Option<Self> {
        let field = |s: &str| {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        Some(Self {
            full_name: field(&self.full_name)?,
            street_address: field(&self.street_address)?,
            city: field(&self.city)?,
            state: field(&self.state)?,
            zip_code: field(&self.zip_code)?,
            country: field(&self.country)?,
        })
    }
}

/// A placed order with its items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub coupon_id: Option<CouponId>,
    pub shipping_address: Option<ShippingAddress>,
    pub tracking_number: Option<String>,
    pub tracking_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// An order together with the customer who placed it.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithUser {
    #[serde(flatten)]
    pub order: Order,
    pub user: UserRef,
}

/// A line of an order. Name and price are captured when the order is placed.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: i32,
    pub price: Decimal,
}

/// Request body for placing an order from the cart.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    /// Only order these cart lines. All lines when absent.
    pub cart_item_ids: Option<Vec<CartItemId>>,
    pub shipping_address: Option<ShippingAddress>,
    pub coupon_code: Option<String>,
}

/// Back-office changes to an order.
#[derive(Debug, Clone, Default)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub tracking_number: Option<String>,
    pub tracking_status: Option<String>,
}

impl OrderUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none() && self.tracking_number.is_none() && self.tracking_status.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: " Ada Lovelace ".to_string(),
            street_address: "12 Analytical Row".to_string(),
            city: "London".to_string(),
            state: "LDN".to_string(),
            zip_code: "N1 9GU".to_string(),
            country: "UK".to_string(),
        }
    }

    #[test]
    fn test_shipping_address_normalized_trims() {
        let normalized = address().normalized().unwrap();
        assert_eq!(normalized.full_name, "Ada Lovelace");
    }

    #[test]
    fn test_shipping_address_requires_every_field() {
        let mut incomplete = address();
        incomplete.city = "   ".to_string();
        assert!(incomplete.normalized().is_none());
    }

    #[test]
    fn test_new_order_deserializes() {
        let body: NewOrder = serde_json::from_value(serde_json::json!({
            "cartItemIds": [4, 7],
            "couponCode": "save10"
        }))
        .unwrap();
        assert_eq!(
            body.cart_item_ids,
            Some(vec![CartItemId::new(4), CartItemId::new(7)])
        );
        assert_eq!(body.coupon_code.as_deref(), Some("save10"));
        assert!(body.shipping_address.is_none());
    }
}

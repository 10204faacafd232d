//! Back-office input for creating and editing catalog entries.

use rust_decimal::Decimal;
use serde::Deserialize;

use fraz_modern_core::{CategoryId, is_storable_money, slugify};

use super::{Category, Product};

/// Request body for creating a product.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub sku: Option<String>,
    pub stock: Option<i32>,
    pub category_id: Option<CategoryId>,
    pub tags: Option<String>,
    pub is_active: Option<bool>,
}

/// Partial update of a product. Absent fields keep their value.
pub type ProductPatch = ProductInput;

/// A validated product ready to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFields {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub sku: String,
    pub stock: i32,
    pub category_id: Option<CategoryId>,
    pub tags: Option<String>,
    pub is_active: bool,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Normalize a comma separated tag list: trimmed, no empty entries.
#[must_use]
pub fn normalize_tags(tags: &str) -> Option<String> {
    let joined = tags
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(",");
    (!joined.is_empty()).then_some(joined)
}

fn check_ranges(fields: &ProductFields) -> Result<(), String> {
    if fields.price < Decimal::ZERO {
        return Err("Price cannot be negative".to_string());
    }
    if !is_storable_money(fields.price) {
        return Err("Price must be at most 99999999.99 with two decimal places".to_string());
    }
    if fields.stock < 0 {
        return Err("Stock cannot be negative".to_string());
    }
    Ok(())
}

impl ProductInput {
    /// Validate a new product.
    ///
    /// # Errors
    ///
    /// Returns the message to show the admin.
    pub fn validate(self) -> Result<ProductFields, String> {
        let (Some(name), Some(price), Some(sku)) = (
            non_blank(self.name.as_deref()),
            self.price,
            non_blank(self.sku.as_deref()),
        ) else {
            return Err("Name, price and SKU are required".to_string());
        };

        let fields = ProductFields {
            name,
            description: self.description,
            price,
            image_url: self.image_url,
            sku,
            stock: self.stock.unwrap_or(0),
            category_id: self.category_id,
            tags: self.tags.as_deref().and_then(normalize_tags),
            is_active: self.is_active.unwrap_or(true),
        };
        check_ranges(&fields)?;
        Ok(fields)
    }

    /// Apply as a partial update to `current`.
    ///
    /// # Errors
    ///
    /// Returns the message to show the admin.
    pub fn apply(self, current: &Product) -> Result<ProductFields, String> {
        let name = match self.name {
            Some(name) => non_blank(Some(&name)).ok_or("Name cannot be empty")?,
            None => current.name.clone(),
        };
        let sku = match self.sku {
            Some(sku) => non_blank(Some(&sku)).ok_or("SKU cannot be empty")?,
            None => current.sku.clone(),
        };
        let tags = match self.tags {
            Some(tags) => normalize_tags(&tags),
            None => current.tags.clone(),
        };

        let fields = ProductFields {
            name,
            description: self.description.or_else(|| current.description.clone()),
            price: self.price.unwrap_or(current.price),
            image_url: self.image_url.or_else(|| current.image_url.clone()),
            sku,
            stock: self.stock.unwrap_or(current.stock),
            category_id: self.category_id.or(current.category_id),
            tags,
            is_active: self.is_active.unwrap_or(current.is_active),
        };
        check_ranges(&fields)?;
        Ok(fields)
    }
}

/// Request body for adding an image to a product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImageInput {
    pub url: String,
    pub alt_text: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

/// Request body for creating or editing a category.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// A validated category ready to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFields {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl CategoryInput {
    /// Validate a new category and derive its slug.
    ///
    /// # Errors
    ///
    /// Returns the message to show the admin.
    pub fn validate(self) -> Result<CategoryFields, String> {
        let name = non_blank(self.name.as_deref()).ok_or("Name is required")?;
        let slug = slugify(&name);
        if slug.is_empty() {
            return Err("Name must contain letters or digits".to_string());
        }
        Ok(CategoryFields {
            name,
            slug,
            description: self.description,
            image_url: self.image_url,
        })
    }

    /// Apply as a partial update. A new name regenerates the slug.
    ///
    /// # Errors
    ///
    /// Returns the message to show the admin.
    pub fn apply(self, current: &Category) -> Result<CategoryFields, String> {
        let (name, slug) = match self.name {
            Some(name) => {
                let name = non_blank(Some(&name)).ok_or("Name is required")?;
                let slug = slugify(&name);
                if slug.is_empty() {
                    return Err("Name must contain letters or digits".to_string());
                }
                (name, slug)
            }
            None => (current.name.clone(), current.slug.clone()),
        };
        Ok(CategoryFields {
            name,
            slug,
            description: self.description.or_else(|| current.description.clone()),
            image_url: self.image_url.or_else(|| current.image_url.clone()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use fraz_modern_core::ProductId;

    use super::*;

    fn product() -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(1),
            name: "Walnut Desk".to_string(),
            description: None,
            price: "499.00".parse().unwrap(),
            image_url: None,
            sku: "DESK001".to_string(),
            stock: 4,
            category_id: None,
            tags: Some("office,wood".to_string()),
            is_active: true,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_product_requires_name_price_sku() {
        let err = ProductInput {
            name: Some("Lamp".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, "Name, price and SKU are required");
    }

    #[test]
    fn test_product_defaults() {
        let fields = ProductInput {
            name: Some(" Lamp ".to_string()),
            price: Some("39.90".parse().unwrap()),
            sku: Some("LAMP001".to_string()),
            tags: Some(" light, , desk ".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(fields.name, "Lamp");
        assert_eq!(fields.stock, 0);
        assert!(fields.is_active);
        assert_eq!(fields.tags.as_deref(), Some("light,desk"));
    }

    #[test]
    fn test_product_rejects_negative_values() {
        let err = ProductInput {
            price: Some("-1".parse().unwrap()),
            ..Default::default()
        }
        .apply(&product())
        .unwrap_err();
        assert_eq!(err, "Price cannot be negative");

        let err = ProductInput {
            stock: Some(-3),
            ..Default::default()
        }
        .apply(&product())
        .unwrap_err();
        assert_eq!(err, "Stock cannot be negative");
    }

    #[test]
    fn test_product_price_must_fit_money_column() {
        for raw in ["100000000", "12.345", "79228162514264337593543950335"] {
            let err = ProductInput {
                price: Some(raw.parse().unwrap()),
                ..Default::default()
            }
            .apply(&product())
            .unwrap_err();
            assert_eq!(
                err,
                "Price must be at most 99999999.99 with two decimal places"
            );
        }

        let fields = ProductInput {
            price: Some("99999999.99".parse().unwrap()),
            ..Default::default()
        }
        .apply(&product())
        .unwrap();
        assert_eq!(fields.price, "99999999.99".parse().unwrap());
    }

    #[test]
    fn test_product_patch_keeps_fields() {
        let fields = ProductInput {
            stock: Some(10),
            ..Default::default()
        }
        .apply(&product())
        .unwrap();
        assert_eq!(fields.stock, 10);
        assert_eq!(fields.sku, "DESK001");
        assert_eq!(fields.tags.as_deref(), Some("office,wood"));
    }

    #[test]
    fn test_category_slug_from_name() {
        let fields = CategoryInput {
            name: Some("Home & Garden".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(fields.slug, "home-garden");

        let err = CategoryInput::default().validate().unwrap_err();
        assert_eq!(err, "Name is required");
    }
}

//! Seed the database with demo data.
//!
//! Reads categories, products and users from YAML (the bundled
//! `seed/catalog.yaml` unless `--file` is given). Running it twice is safe:
//! categories are upserted by slug, products by SKU, and users that already
//! exist are left alone.

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use fraz_modern_core::{CategoryId, Email};
use fraz_modern_storefront::db::{
    CategoryRepository, ProductRepository, RepositoryError, UserRepository,
};
use fraz_modern_storefront::models::{CategoryFields, CategoryInput, ProductFields, ProductInput};
use fraz_modern_storefront::services::auth::{AuthError, hash_password};

/// The catalog used when no file is given.
const DEFAULT_CATALOG: &str = include_str!("../../seed/catalog.yaml");

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid {what} \"{name}\": {reason}")]
    Invalid {
        what: &'static str,
        name: String,
        reason: String,
    },

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("password hashing failed: {0}")]
    Auth(#[from] AuthError),
}

/// Contents of a seed file.
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

#[derive(Debug, Deserialize)]
pub struct SeedCategory {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub sku: String,
    #[serde(default)]
    pub stock: i32,
    /// Slug of the product's category.
    pub category: Option<String>,
    pub tags: Option<String>,
    #[serde(default = "active")]
    pub is_active: bool,
}

const fn active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub email: String,
    pub name: Option<String>,
    pub password: String,
    #[serde(default)]
    pub admin: bool,
}

/// A product ready to write, still pointing at its category by slug.
#[derive(Debug)]
pub struct PlannedProduct {
    pub category: Option<String>,
    pub fields: ProductFields,
}

/// Validated seed data.
#[derive(Debug)]
pub struct SeedPlan {
    pub categories: Vec<CategoryFields>,
    pub products: Vec<PlannedProduct>,
    pub users: Vec<(Email, SeedUser)>,
}

impl SeedData {
    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Yaml` if the document doesn't match the format.
    pub fn from_yaml(yaml: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Check every entry before anything is written.
    ///
    /// Products may only reference categories from the same file.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Invalid` naming the first bad entry.
    pub fn plan(self) -> Result<SeedPlan, SeedError> {
        let categories = self
            .categories
            .into_iter()
            .map(|c| {
                let name = c.name.clone();
                CategoryInput {
                    name: Some(c.name),
                    description: c.description,
                    image_url: c.image_url,
                }
                .validate()
                .map_err(|reason| SeedError::Invalid {
                    what: "category",
                    name,
                    reason,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let products = self
            .products
            .into_iter()
            .map(|p| {
                let sku = p.sku.clone();
                if let Some(slug) = &p.category
                    && !categories.iter().any(|c| &c.slug == slug)
                {
                    return Err(SeedError::Invalid {
                        what: "product",
                        name: sku,
                        reason: format!("unknown category {slug}"),
                    });
                }
                let fields = ProductInput {
                    name: Some(p.name),
                    description: p.description,
                    price: Some(p.price),
                    image_url: p.image_url,
                    sku: Some(p.sku),
                    stock: Some(p.stock),
                    category_id: None,
                    tags: p.tags,
                    is_active: Some(p.is_active),
                }
                .validate()
                .map_err(|reason| SeedError::Invalid {
                    what: "product",
                    name: sku,
                    reason,
                })?;
                Ok(PlannedProduct {
                    category: p.category,
                    fields,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let users = self
            .users
            .into_iter()
            .map(|u| {
                let email = Email::parse(&u.email).map_err(|e| SeedError::Invalid {
                    what: "user",
                    name: u.email.clone(),
                    reason: e.to_string(),
                })?;
                Ok((email, u))
            })
            .collect::<Result<Vec<_>, SeedError>>()?;

        Ok(SeedPlan {
            categories,
            products,
            users,
        })
    }
}

/// Seed from `file`, or from the bundled catalog.
///
/// # Errors
///
/// Returns an error if the file is invalid or a database write fails.
pub async fn run(file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let yaml = match file {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading seed data from file");
            tokio::fs::read_to_string(path).await.map_err(SeedError::from)?
        }
        None => DEFAULT_CATALOG.to_string(),
    };
    let plan = SeedData::from_yaml(&yaml)?.plan()?;
    tracing::info!(
        categories = plan.categories.len(),
        products = plan.products.len(),
        users = plan.users.len(),
        "Seed data validated"
    );

    let pool = super::connect().await?;
    apply(&pool, plan).await?;

    tracing::info!("Database seeded successfully!");
    Ok(())
}

async fn apply(pool: &sqlx::PgPool, plan: SeedPlan) -> Result<(), SeedError> {
    let categories = CategoryRepository::new(pool);
    let mut category_ids: HashMap<String, CategoryId> = HashMap::new();
    for fields in &plan.categories {
        let category = categories.upsert_by_slug(fields).await?;
        category_ids.insert(category.slug, category.id);
    }
    tracing::info!(count = category_ids.len(), "Categories upserted");

    let products = ProductRepository::new(pool);
    for PlannedProduct {
        category,
        mut fields,
    } in plan.products
    {
        fields.category_id = category.and_then(|slug| category_ids.get(&slug).copied());
        products.upsert_by_sku(&fields).await?;
    }
    tracing::info!("Products upserted");

    let users = UserRepository::new(pool);
    for (email, user) in plan.users {
        if users.get_by_email(&email).await?.is_some() {
            tracing::info!(email = %email, "User already exists, skipping");
            continue;
        }
        let hash = hash_password(&user.password)?;
        users
            .create(&email, &hash, user.name.as_deref(), user.admin)
            .await?;
        tracing::info!(email = %email, admin = user.admin, "User created");
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog() {
        let plan = SeedData::from_yaml(DEFAULT_CATALOG).unwrap().plan().unwrap();
        let slugs: Vec<&str> = plan.categories.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, ["electronics", "clothing", "home-garden", "sports"]);
        assert_eq!(plan.products.len(), 8);
        assert!(plan.products.iter().any(|p| p.fields.sku == "LAPTOP001"));
        assert_eq!(plan.users.iter().filter(|(_, u)| u.admin).count(), 1);
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let yaml = r"
products:
  - name: Kayak
    price: '899.00'
    sku: KAYAK001
    category: water-sports
";
        let err = SeedData::from_yaml(yaml).unwrap().plan().unwrap_err();
        assert!(err.to_string().contains("unknown category water-sports"));
    }

    #[test]
    fn test_product_rules_apply() {
        let yaml = r"
products:
  - name: Broken
    price: '-5'
    sku: BROKEN001
";
        let err = SeedData::from_yaml(yaml).unwrap().plan().unwrap_err();
        assert!(err.to_string().contains("Price cannot be negative"));
    }
}

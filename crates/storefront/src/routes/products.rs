//! Product catalog route handlers: listing, search, detail and reviews.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use fraz_modern_core::{CategoryId, ProductId};

use crate::db::products::ProductFilter;
use crate::db::{CategoryRepository, ProductRepository, RepositoryError, ReviewRepository, contains_pattern};
use crate::error::{AppError, Result};
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::middleware::RequireAuth;
use crate::models::{
    CategoryRef, Pagination, ProductDetail, ProductListQuery, ProductSummary, Review,
};
use crate::state::AppState;

/// Products returned by suggestion mode.
const SUGGESTED_PRODUCTS: i64 = 5;
/// Categories returned by suggestion mode.
const SUGGESTED_CATEGORIES: i64 = 3;
/// Products returned by a full search.
const SEARCH_RESULTS: i64 = 50;

#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub products: Vec<ProductSummary>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub suggestions: Option<String>,
}

/// A product in the suggestion dropdown.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSuggestion {
    pub id: ProductId,
    pub name: String,
    pub image_url: Option<String>,
    pub price: Decimal,
}

/// One entry of the flat suggestion list.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Suggestion {
    Product { id: ProductId, name: String },
    Category { id: CategoryId, name: String },
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Suggestions {
        products: Vec<ProductSuggestion>,
        categories: Vec<CategoryRef>,
        suggestions: Vec<Suggestion>,
    },
    Results {
        products: Vec<ProductSummary>,
    },
    Empty {
        products: [(); 0],
        suggestions: [(); 0],
    },
}

#[derive(Debug, Deserialize)]
pub struct NewReview {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

/// Paged listing of active products.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ProductListQuery>,
) -> Result<Json<ProductPage>> {
    let filter = ProductFilter::from_query(&query);
    let (products, total) = ProductRepository::new(state.pool()).list(&filter).await?;

    Ok(Json(ProductPage {
        products,
        pagination: Pagination::new(filter.page, filter.limit, total),
    }))
}

/// Search with optional suggestion mode.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Json<SearchResponse>> {
    let term = query.q.trim();
    if term.is_empty() {
        return Ok(Json(SearchResponse::Empty {
            products: [],
            suggestions: [],
        }));
    }

    let products = ProductRepository::new(state.pool());

    if query.suggestions.as_deref() == Some("true") {
        let matches = products.suggest(term, SUGGESTED_PRODUCTS).await?;
        let categories = CategoryRepository::new(state.pool())
            .search(&contains_pattern(term), SUGGESTED_CATEGORIES)
            .await?;

        let suggestions = matches
            .iter()
            .map(|p| Suggestion::Product {
                id: p.id,
                name: p.name.clone(),
            })
            .chain(categories.iter().map(|c| Suggestion::Category {
                id: c.id,
                name: c.name.clone(),
            }))
            .collect();

        return Ok(Json(SearchResponse::Suggestions {
            products: matches
                .into_iter()
                .map(|p| ProductSuggestion {
                    id: p.id,
                    name: p.name,
                    image_url: p.image_url,
                    price: p.price,
                })
                .collect(),
            categories: categories
                .into_iter()
                .map(|c| CategoryRef {
                    id: c.id,
                    name: c.name,
                    slug: c.slug,
                })
                .collect(),
            suggestions,
        }));
    }

    let results = products.search(term, SEARCH_RESULTS).await?;
    Ok(Json(SearchResponse::Results { products: results }))
}

/// Product detail with category, gallery and rating.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    PathParam(id): PathParam<ProductId>,
) -> Result<Json<ProductDetail>> {
    ProductRepository::new(state.pool())
        .get_detail(id)
        .await?
        .filter(|detail| detail.summary.product.is_active)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// Reviews of a product, newest first.
#[instrument(skip(state))]
pub async fn reviews(
    State(state): State<AppState>,
    PathParam(id): PathParam<ProductId>,
) -> Result<Json<Vec<Review>>> {
    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(id)
        .await?;
    Ok(Json(reviews))
}

/// Review a product once.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn create_review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParam(id): PathParam<ProductId>,
    JsonBody(body): JsonBody<NewReview>,
) -> Result<impl IntoResponse> {
    let (Some(rating), Some(comment)) = (
        body.rating,
        body.comment.as_deref().map(str::trim).filter(|c| !c.is_empty()),
    ) else {
        return Err(AppError::BadRequest("Missing fields".to_string()));
    };
    if !(1..=5).contains(&rating) {
        return Err(AppError::BadRequest(
            "Rating must be between 1 and 5".to_string(),
        ));
    }

    if ProductRepository::new(state.pool()).get(id).await?.is_none() {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    let review = ReviewRepository::new(state.pool())
        .create(id, user.id, rating, comment)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                AppError::BadRequest("You have already reviewed this product.".to_string())
            }
            other => other.into(),
        })?;

    tracing::info!(review_id = %review.id, "Review created");
    Ok((StatusCode::CREATED, Json(review)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestions_are_tagged() {
        let json = serde_json::to_value(vec![
            Suggestion::Product {
                id: ProductId::new(1),
                name: "Laptop".to_string(),
            },
            Suggestion::Category {
                id: CategoryId::new(2),
                name: "Electronics".to_string(),
            },
        ])
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "type": "product", "id": 1, "name": "Laptop" },
                { "type": "category", "id": 2, "name": "Electronics" }
            ])
        );
    }

    #[test]
    fn test_empty_search_shape() {
        let json = serde_json::to_value(SearchResponse::Empty {
            products: [],
            suggestions: [],
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "products": [], "suggestions": [] }));
    }
}

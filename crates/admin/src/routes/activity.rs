//! The back-office audit trail.

use axum::{Json, Router, extract::State, routing::get};
use tracing::instrument;

use crate::db::ActivityRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::ActivityEntry;
use crate::state::AppState;

/// Entries shown in the activity feed.
const FEED_LENGTH: i64 = 20;

/// Build the activity router.
pub fn router() -> Router<AppState> {
    Router::new().route("/activity", get(index))
}

/// The latest admin actions, newest first.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<ActivityEntry>>> {
    let entries = ActivityRepository::new(state.pool())
        .recent(FEED_LENGTH)
        .await?;
    Ok(Json(entries))
}

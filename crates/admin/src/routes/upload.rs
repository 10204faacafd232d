//! Product image upload.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
};
use serde::Serialize;
use tracing::instrument;

use fraz_modern_storefront::services::uploads::MAX_UPLOAD_BYTES;
use fraz_modern_storefront::services::{ImageUpload, UploadError};

use super::record_activity;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::Activity;
use crate::state::AppState;

/// Room for the multipart framing around the file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the upload router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/upload",
        post(upload).layer(DefaultBodyLimit::max(
            MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES,
        )),
    )
}

#[derive(Debug, Serialize)]
pub struct Uploaded {
    pub url: String,
}

/// Read the `file` part of the form. Other parts are ignored.
async fn read_file(mut multipart: Multipart) -> Result<Option<ImageUpload>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        return Ok(Some(ImageUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

/// Store an image and return its public URL.
#[instrument(skip(state, admin, multipart), fields(admin_id = %admin.id))]
pub async fn upload(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    multipart: Multipart,
) -> Result<Json<Uploaded>> {
    let file = read_file(multipart).await?.ok_or(UploadError::NoFile)?;
    let url = state.uploads().save_image(&file).await?;

    tracing::info!(url = %url, size = file.bytes.len(), "Image uploaded");
    record_activity(
        &state,
        &admin,
        Activity::new("upload", "create").details(url.clone()),
    )
    .await;

    Ok(Json(Uploaded { url }))
}

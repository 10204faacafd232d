//! Image uploads written to the local upload directory.
//!
//! Files are served back by the storefront under `/uploads/`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use thiserror::Error;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Content types accepted for product images and avatars.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
];

/// Public URL prefix of uploaded files.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Errors that can occur while accepting an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file uploaded")]
    NoFile,

    #[error("Invalid file type")]
    InvalidType,

    #[error("File too large (max {} MB)", MAX_UPLOAD_BYTES / 1024 / 1024)]
    TooLarge,

    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// An image received in a multipart form.
#[derive(Debug)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Check the content type and size.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::NoFile` for an empty part,
    /// `UploadError::InvalidType` for a non-image and
    /// `UploadError::TooLarge` above [`MAX_UPLOAD_BYTES`].
    pub fn validate(&self) -> Result<(), UploadError> {
        if self.bytes.is_empty() {
            return Err(UploadError::NoFile);
        }
        let allowed = self
            .content_type
            .as_deref()
            .is_some_and(|ct| ALLOWED_IMAGE_TYPES.contains(&ct.to_ascii_lowercase().as_str()));
        if !allowed {
            return Err(UploadError::InvalidType);
        }
        if self.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge);
        }
        Ok(())
    }
}

/// Writes uploads to disk and hands back their public URLs.
#[derive(Debug, Clone)]
pub struct UploadService {
    dir: PathBuf,
}

impl UploadService {
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Directory files are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store a product image as `{millis}-{random}.{ext}`.
    ///
    /// # Errors
    ///
    /// Returns an `UploadError` if validation or the write fails.
    pub async fn save_image(&self, upload: &ImageUpload) -> Result<String, UploadError> {
        upload.validate()?;
        let name = image_file_name(
            Utc::now().timestamp_millis(),
            &random_suffix(),
            &extension_for(upload),
        );
        self.write(&name, &upload.bytes).await
    }

    /// Store an avatar as `{millis}-{sanitized original name}`.
    ///
    /// # Errors
    ///
    /// Returns an `UploadError` if validation or the write fails.
    pub async fn save_avatar(&self, upload: &ImageUpload) -> Result<String, UploadError> {
        upload.validate()?;
        let name = avatar_file_name(Utc::now().timestamp_millis(), &upload.file_name);
        self.write(&name, &upload.bytes).await
    }

    /// Delete a file stored by this service, given the URL it was served at.
    ///
    /// URLs outside the upload prefix and names with path separators are
    /// ignored. A file that is already gone is not an error.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Io` if the file exists but cannot be removed.
    pub async fn remove(&self, url: &str) -> Result<(), UploadError> {
        let Some(name) = stored_name(url) else {
            return Ok(());
        };
        match tokio::fs::remove_file(self.dir.join(name)).await {
            Ok(()) => {
                tracing::info!(file = %name, "Upload removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(name), bytes).await?;
        tracing::info!(file = %name, size = bytes.len(), "Upload stored");
        Ok(format!("{UPLOADS_URL_PREFIX}/{name}"))
    }
}

/// File name behind an upload URL, if it is one of ours.
fn stored_name(url: &str) -> Option<&str> {
    url.strip_prefix(UPLOADS_URL_PREFIX)?
        .strip_prefix('/')
        .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && *name != "..")
}

fn random_suffix() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

fn image_file_name(millis: i64, suffix: &str, ext: &str) -> String {
    format!("{millis}-{suffix}.{ext}")
}

fn avatar_file_name(millis: i64, original: &str) -> String {
    let sanitized: String = original
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
        .collect();
    let sanitized = sanitized.trim_start_matches('.');
    if sanitized.is_empty() {
        format!("{millis}-avatar.jpg")
    } else {
        format!("{millis}-{sanitized}")
    }
}

/// Extension from the original name, else from the content type.
fn extension_for(upload: &ImageUpload) -> String {
    let from_name = upload
        .file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    from_name.unwrap_or_else(|| {
        match upload.content_type.as_deref() {
            Some("image/png") => "png",
            Some("image/webp") => "webp",
            Some("image/gif") => "gif",
            _ => "jpg",
        }
        .to_string()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn upload(name: &str, content_type: Option<&str>, len: usize) -> ImageUpload {
        ImageUpload {
            file_name: name.to_string(),
            content_type: content_type.map(str::to_string),
            bytes: vec![0; len],
        }
    }

    #[test]
    fn test_validate_content_type() {
        assert!(upload("a.png", Some("image/png"), 10).validate().is_ok());
        assert!(upload("a.jpg", Some("image/jpg"), 10).validate().is_ok());
        assert!(matches!(
            upload("a.svg", Some("image/svg+xml"), 10).validate(),
            Err(UploadError::InvalidType)
        ));
        assert!(matches!(
            upload("a.png", None, 10).validate(),
            Err(UploadError::InvalidType)
        ));
    }

    #[test]
    fn test_validate_size() {
        assert!(upload("a.png", Some("image/png"), MAX_UPLOAD_BYTES).validate().is_ok());
        assert!(matches!(
            upload("a.png", Some("image/png"), MAX_UPLOAD_BYTES + 1).validate(),
            Err(UploadError::TooLarge)
        ));
        assert!(matches!(
            upload("a.png", Some("image/png"), 0).validate(),
            Err(UploadError::NoFile)
        ));
    }

    #[test]
    fn test_image_file_name_shape() {
        let suffix = random_suffix();
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(
            image_file_name(1_700_000_000_000, "ab12cd", "png"),
            "1700000000000-ab12cd.png"
        );
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for(&upload("Photo.JPEG", Some("image/jpeg"), 1)), "jpeg");
        assert_eq!(extension_for(&upload("photo", Some("image/webp"), 1)), "webp");
        assert_eq!(extension_for(&upload("bad.p/g", Some("image/png"), 1)), "png");
    }

    #[test]
    fn test_avatar_file_name_sanitized() {
        assert_eq!(avatar_file_name(42, "my photo (1).png"), "42-myphoto1.png");
        assert_eq!(avatar_file_name(42, "../../etc/passwd"), "42-etcpasswd");
        assert_eq!(avatar_file_name(42, "???"), "42-avatar.jpg");
    }

    #[tokio::test]
    async fn test_save_image_writes_file() {
        let dir = std::env::temp_dir().join(format!("fm-uploads-{}", random_suffix()));
        let service = UploadService::new(dir.clone());
        let url = service
            .save_image(&upload("shoe.png", Some("image/png"), 16))
            .await
            .unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));
        let name = url.trim_start_matches("/uploads/");
        assert_eq!(std::fs::read(dir.join(name)).unwrap().len(), 16);
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_stored_name() {
        assert_eq!(stored_name("/uploads/42-me.png"), Some("42-me.png"));
        assert_eq!(stored_name("/uploads/../secret"), None);
        assert_eq!(stored_name("/uploads/"), None);
        assert_eq!(stored_name("https://cdn.example.com/a.png"), None);
    }

    #[tokio::test]
    async fn test_remove_deletes_saved_avatar() {
        let dir = std::env::temp_dir().join(format!("fm-uploads-{}", random_suffix()));
        let service = UploadService::new(dir.clone());
        let url = service
            .save_avatar(&upload("me.png", Some("image/png"), 8))
            .await
            .unwrap();
        let path = dir.join(url.trim_start_matches("/uploads/"));
        assert!(path.exists());

        service.remove(&url).await.unwrap();
        assert!(!path.exists());
        // Removing twice is fine.
        service.remove(&url).await.unwrap();
        std::fs::remove_dir_all(dir).unwrap();
    }
}

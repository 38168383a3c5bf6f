//! Image uploads for avatars, recipes and collections.
//!
//! Files are written to `<media_dir>/<kind>/<uuid><ext>` and referenced by
//! `<media_url>/<kind>/<uuid><ext>`. Serving them is left to whatever sits
//! in front of the API.

use crate::config::MediaConfig;
use crate::error::{Error, Result};
use axum::body::Bytes;
use axum::extract::Multipart;
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Accepted content types and the extension each is stored under
const ALLOWED_CONTENT_TYPES: &[(&str, &str)] = &[
    ("image/png", ".png"),
    ("image/jpeg", ".jpg"),
    ("image/webp", ".webp"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Avatars,
    Recipes,
    Collections,
}

impl MediaKind {
    pub fn dir_name(self) -> &'static str {
        match self {
            MediaKind::Avatars => "avatars",
            MediaKind::Recipes => "recipes",
            MediaKind::Collections => "collections",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub extension: &'static str,
    pub data: Bytes,
}

/// Map a content type to its stored extension
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    ALLOWED_CONTENT_TYPES
        .iter()
        .find(|(allowed, _)| allowed.eq_ignore_ascii_case(essence))
        .map(|(_, ext)| *ext)
}

/// Read the `file` field of a multipart body and check its type and size
pub async fn read_image_field(multipart: &mut Multipart, max_size: usize) -> Result<ImageUpload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(format!("Failed to read multipart data: {}", e.body_text())))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let extension = extension_for(&content_type).ok_or_else(|| {
            Error::Validation(format!(
                "Unsupported image type '{content_type}'. Allowed: image/png, image/jpeg, image/webp"
            ))
        })?;

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::Validation(format!("Failed to read file data: {}", e.body_text())))?;

        if data.is_empty() {
            return Err(Error::Validation("Uploaded file is empty".to_string()));
        }
        if data.len() > max_size {
            return Err(Error::Validation(format!(
                "File too large. Maximum size is {max_size} bytes"
            )));
        }

        return Ok(ImageUpload { extension, data });
    }

    Err(Error::Validation("No file provided".to_string()))
}

/// Write an upload under the media directory and return its public URL
pub async fn save_image(
    config: &MediaConfig,
    kind: MediaKind,
    upload: &ImageUpload,
) -> Result<String> {
    let dir = config.media_dir.join(kind.dir_name());
    tokio::fs::create_dir_all(&dir).await?;

    let file_name = format!("{}{}", Uuid::new_v4(), upload.extension);
    tokio::fs::write(dir.join(&file_name), &upload.data).await?;
    debug!("Stored {} bytes as {}/{}", upload.data.len(), kind.dir_name(), file_name);

    Ok(format!("{}/{}/{}", config.media_url, kind.dir_name(), file_name))
}

/// Filesystem path behind a media URL, if the URL points into our media
/// directory
pub fn local_path(config: &MediaConfig, url: &str) -> Option<PathBuf> {
    let relative = url.strip_prefix(&config.media_url)?.strip_prefix('/')?;
    let relative = Path::new(relative);

    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }

    Some(config.media_dir.join(relative))
}

/// Best-effort removal of a previously stored image
pub async fn remove_local_image(config: &MediaConfig, url: &str) {
    let Some(path) = local_path(config, url) else {
        debug!("Not removing non-local image {}", url);
        return;
    };

    if let Err(e) = tokio::fs::remove_file(&path).await {
        warn!("Failed to remove old image {}: {}", path.display(), e);
    }
}

/// Point a row at `new_url` through `update`, then delete the image it
/// replaced. When the update fails the old image stays and the new file is
/// removed instead.
pub async fn replace_image<T, F>(
    config: &MediaConfig,
    old_url: Option<&str>,
    new_url: &str,
    update: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match update.await {
        Ok(updated) => {
            if let Some(old) = old_url {
                remove_local_image(config, old).await;
            }
            Ok(updated)
        }
        Err(e) => {
            remove_local_image(config, new_url).await;
            Err(e)
        }
    }
}

//! Stores uploaded and base64-encoded images and hands back references.
//!
//! A reference is the object key (`tags/<uuid>.png`). Absolute `http(s)`
//! URLs are treated as external images: they pass through untouched and are
//! never deleted.

use base64::Engine;
use catalog_types::{AppError, Tristate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::storage::ObjectStore;

/// Marker every accepted data URI starts with.
pub const IMAGE_DATA_URI_PREFIX: &str = "data:image";

/// A file received from a client.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub original_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Extension of the client's file name, falling back to the mime subtype.
    pub fn extension(&self) -> String {
        std::path::Path::new(&self.original_name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(clean_extension)
            .unwrap_or_else(|| extension_for_mime(&self.content_type))
    }
}

/// Lowercased `[a-z0-9+]` characters of `raw`, or `None` when nothing is left.
fn clean_extension(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '+')
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

fn extension_for_mime(mime: &str) -> String {
    let essence = mime.split(';').next().unwrap_or_default().trim();
    match essence.split_once('/').and_then(|(_, sub)| clean_extension(sub)) {
        Some(sub) if sub == "svg+xml" => "svg".to_string(),
        Some(sub) => sub,
        None => "bin".to_string(),
    }
}

pub fn is_external_url(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// A movie attachment (trailer, teaser, clip) as submitted.
#[derive(Debug, Clone, Default)]
pub struct AttachmentUpload {
    pub kind: Option<String>,
    pub title: Option<String>,
    pub duration: Option<i32>,
    pub url: Option<String>,
    pub file: Option<UploadedFile>,
}

/// A stored movie attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub duration: i32,
    pub url: Option<String>,
}

/// Asset operations over an injected [`ObjectStore`].
#[derive(Clone)]
pub struct AssetResolver {
    store: Arc<dyn ObjectStore>,
}

impl AssetResolver {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    fn new_key(directory: &str, extension: &str) -> String {
        let directory = directory.trim_matches('/');
        let filename = format!("{}.{}", Uuid::new_v4(), extension);
        if directory.is_empty() {
            filename
        } else {
            format!("{directory}/{filename}")
        }
    }

    /// Store `file` under `directory` with a fresh name, deleting `previous`
    /// first. Returns `None` when there is no file.
    pub async fn store(
        &self,
        file: Option<UploadedFile>,
        directory: &str,
        previous: Option<&str>,
    ) -> Result<Option<String>, AppError> {
        let Some(file) = file else {
            return Ok(None);
        };

        self.delete(previous).await?;

        let key = Self::new_key(directory, &file.extension());
        self.store
            .put(&key, &file.content_type, file.bytes)
            .await
            .map_err(AppError::storage)?;
        Ok(Some(key))
    }

    /// Delete a stored asset. Missing references and external URLs yield
    /// `false`.
    pub async fn delete(&self, reference: Option<&str>) -> Result<bool, AppError> {
        let Some(reference) = reference.filter(|r| !r.is_empty() && !is_external_url(r)) else {
            return Ok(false);
        };

        if !self.store.exists(reference).await.map_err(AppError::storage)? {
            return Ok(false);
        }
        self.store
            .delete(reference)
            .await
            .map_err(AppError::storage)?;
        Ok(true)
    }

    pub fn resolve_url(&self, reference: Option<&str>) -> Option<String> {
        reference
            .filter(|r| !r.is_empty())
            .map(|r| self.store.public_url(r))
    }

    /// Decode and store a `data:image/...;base64,...` URI. Anything without
    /// the image data-URI prefix yields `None`.
    pub async fn store_base64(
        &self,
        data_uri: Option<&str>,
        directory: &str,
        previous: Option<&str>,
    ) -> Result<Option<String>, AppError> {
        let Some(data_uri) = data_uri.filter(|d| d.starts_with(IMAGE_DATA_URI_PREFIX)) else {
            return Ok(None);
        };

        let (header, payload) = data_uri
            .split_once(',')
            .ok_or_else(|| AppError::bad_request("Malformed image data URI"))?;
        let mime = header
            .trim_start_matches("data:")
            .split(';')
            .next()
            .unwrap_or_default();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| AppError::bad_request(format!("Invalid base64 image: {e}")))?;

        self.delete(previous).await?;

        let key = Self::new_key(directory, &extension_for_mime(mime));
        self.store
            .put(&key, mime, bytes)
            .await
            .map_err(AppError::storage)?;
        Ok(Some(key))
    }

    /// Persist an image field on create: data URIs are stored (and recorded
    /// in `pending`), other values pass through.
    pub async fn store_image(
        &self,
        image: Option<String>,
        directory: &str,
        pending: &mut PendingAssets,
    ) -> Result<Option<String>, AppError> {
        match image {
            Some(value) if value.starts_with(IMAGE_DATA_URI_PREFIX) => {
                let stored = self.store_base64(Some(&value), directory, None).await?;
                if let Some(key) = &stored {
                    pending.fresh.push(key.clone());
                }
                Ok(stored)
            }
            other => Ok(other),
        }
    }

    /// Resolve an image field on update against the currently stored value.
    ///
    /// Nothing is deleted here: a freshly stored upload and the replaced or
    /// cleared image are recorded in `pending`, to be settled once the owning
    /// record has been written.
    pub async fn resolve_image(
        &self,
        incoming: Tristate<String>,
        directory: &str,
        current: Option<&str>,
        pending: &mut PendingAssets,
    ) -> Result<Tristate<String>, AppError> {
        match incoming {
            Tristate::Unset => Ok(Tristate::Unset),
            Tristate::Null => {
                pending.replaced(current);
                Ok(Tristate::Null)
            }
            Tristate::Value(value) if value.starts_with(IMAGE_DATA_URI_PREFIX) => {
                let stored = self.store_base64(Some(&value), directory, None).await?;
                if let Some(key) = &stored {
                    pending.fresh.push(key.clone());
                }
                pending.replaced(current);
                Ok(stored.map_or(Tristate::Null, Tristate::Value))
            }
            Tristate::Value(value) => {
                if current != Some(value.as_str()) {
                    pending.replaced(current);
                }
                Ok(Tristate::Value(value))
            }
        }
    }

    /// URL a client can load for an image field.
    pub fn public_image(&self, image: Option<&str>) -> Option<String> {
        match image {
            Some(url) if is_external_url(url) => Some(url.to_string()),
            other => self.resolve_url(other),
        }
    }

    /// Keep complete attachments, storing any uploaded files. Entries
    /// missing a type, title or duration are dropped.
    pub async fn process_attachments(
        &self,
        attachments: Vec<AttachmentUpload>,
        directory: &str,
    ) -> Result<Vec<Attachment>, AppError> {
        let mut processed = Vec::with_capacity(attachments.len());

        for upload in attachments {
            let (Some(kind), Some(title), Some(duration)) =
                (upload.kind, upload.title, upload.duration)
            else {
                continue;
            };

            let url = match upload.file {
                Some(file) => {
                    self.store(Some(file), directory, upload.url.as_deref())
                        .await?
                }
                None => upload.url,
            };

            processed.push(Attachment {
                kind,
                title,
                duration,
                url,
            });
        }

        Ok(processed)
    }
}

/// Asset changes made while updating a record, held until the write is known
/// to have succeeded or failed.
#[derive(Debug, Default)]
#[must_use = "pending assets must be settled"]
pub struct PendingAssets {
    fresh: Vec<String>,
    stale: Vec<String>,
}

impl PendingAssets {
    fn replaced(&mut self, current: Option<&str>) {
        if let Some(current) = current.filter(|c| !c.is_empty()) {
            self.stale.push(current.to_string());
        }
    }

    /// On success, delete the images the record no longer points at. On
    /// failure, delete the uploads stored for it so the previous images stay
    /// the live ones. Cleanup errors are logged, never returned.
    pub async fn settle<T>(
        self,
        assets: &AssetResolver,
        outcome: Result<T, AppError>,
    ) -> Result<T, AppError> {
        let discard = if outcome.is_ok() { self.stale } else { self.fresh };
        for reference in discard {
            if let Err(e) = assets.delete(Some(&reference)).await {
                tracing::warn!(%reference, error = %e, "Failed to delete image");
            }
        }
        outcome
    }
}

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use catalog_types::{AppError, AssetResponse};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::assets::{is_external_url, AssetResolver, UploadedFile};

/// Query parameters for `DELETE /api/assets`.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AssetPathParams {
    /// Stored reference, as returned by the upload endpoint.
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AssetDeleteResponse {
    /// `false` when nothing was stored under the reference.
    pub deleted: bool,
}

/// Directory names are a single lowercase segment.
fn check_directory(directory: &str) -> Result<(), AppError> {
    let valid = !directory.is_empty()
        && directory.len() <= 64
        && directory
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AppError::bad_request(format!(
            "Invalid asset directory: {directory}"
        )))
    }
}

/// Stored references are relative keys without `.` or `..` segments.
fn check_reference(path: &str) -> Result<(), AppError> {
    if is_external_url(path) {
        return Ok(());
    }
    let valid = !path.is_empty()
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..");
    if valid {
        Ok(())
    } else {
        Err(AppError::bad_request(format!("Invalid asset path: {path}")))
    }
}

/// Upload a file (multipart field `file`) into `directory`. An optional
/// `previous` text field names an asset to replace; it is deleted first.
#[utoipa::path(
    post,
    path = "/api/assets/{directory}",
    params(("directory" = String, Path, description = "Target directory, e.g. `tags`")),
    request_body(content_type = "multipart/form-data", description = "Fields `file` and optional `previous`"),
    responses(
        (status = 201, description = "Asset stored", body = AssetResponse),
        (status = 400, description = "Malformed upload", body = AppError),
        (status = 422, description = "No file sent", body = AppError),
        (status = 502, description = "Storage backend failed", body = AppError)
    ),
    tag = "assets"
)]
#[tracing::instrument(skip(assets, multipart))]
pub async fn upload_asset(
    State(assets): State<AssetResolver>,
    Path(directory): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<AssetResponse>), AppError> {
    check_directory(&directory)?;

    let mut file: Option<UploadedFile> = None;
    let mut previous: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let original_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::bad_request(format!("Failed to read upload: {e}")))?;
                file = Some(UploadedFile {
                    original_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("previous") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::bad_request(format!("Invalid previous field: {e}")))?;
                previous = Some(text).filter(|t| !t.trim().is_empty());
            }
            _ => {}
        }
    }

    if file.is_none() {
        let mut fields = HashMap::new();
        fields.insert("file".to_string(), "The file field is required".to_string());
        return Err(AppError::validation("The file field is required", fields));
    }

    let path = assets
        .store(file, &directory, previous.as_deref())
        .await?
        .ok_or_else(|| AppError::internal("Upload produced no reference"))?;
    let url = assets.resolve_url(Some(&path));
    tracing::info!(%path, "Asset stored");

    Ok((StatusCode::CREATED, Json(AssetResponse { path, url })))
}

/// Delete a stored asset. Unknown references and external URLs report
/// `deleted: false`.
#[utoipa::path(
    delete,
    path = "/api/assets",
    params(AssetPathParams),
    responses(
        (status = 200, description = "Deletion result", body = AssetDeleteResponse),
        (status = 400, description = "Invalid path", body = AppError),
        (status = 502, description = "Storage backend failed", body = AppError)
    ),
    tag = "assets"
)]
pub async fn delete_asset(
    State(assets): State<AssetResolver>,
    Query(params): Query<AssetPathParams>,
) -> Result<Json<AssetDeleteResponse>, AppError> {
    check_reference(&params.path)?;
    let deleted = assets.delete(Some(&params.path)).await?;
    Ok(Json(AssetDeleteResponse { deleted }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_names_are_single_segments() {
        assert!(check_directory("tags").is_ok());
        assert!(check_directory("movie_posters-2").is_ok());
        assert!(check_directory("").is_err());
        assert!(check_directory("..").is_err());
        assert!(check_directory("Tags").is_err());
    }

    #[test]
    fn references_cannot_escape_storage() {
        assert!(check_reference("tags/a.png").is_ok());
        assert!(check_reference("https://cdn.example.com/a.png").is_ok());
        assert!(check_reference("../secrets").is_err());
        assert!(check_reference("/etc/passwd").is_err());
        assert!(check_reference("tags//a.png").is_err());
    }
}

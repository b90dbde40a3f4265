//! File handlers for the Web API.

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::header,
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::file::{UploadRequest, MAX_FILENAME_LENGTH};
use crate::web::dto::{
    ApiResponse, FileListQuery, FileListResponse, FileResponse, FileUploadResponse, UsageStats,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// Generate a safe Content-Disposition header value for file downloads.
///
/// This function sanitizes the filename to prevent header injection attacks
/// and uses RFC 5987 encoding for non-ASCII filenames.
///
/// # Security
///
/// The function:
/// - Removes control characters (including CR, LF which could cause header injection)
/// - Escapes double quotes and backslashes
/// - Uses RFC 5987 filename* parameter for proper Unicode support
fn content_disposition_header(filename: &str) -> String {
    // Sanitize filename for the basic filename parameter (ASCII fallback)
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control()) // Remove control characters (CR, LF, etc.)
        .map(|c| match c {
            '"' => '_',  // Replace double quotes
            '\\' => '_', // Replace backslashes
            _ => c,
        })
        .collect();

    // For ASCII-only filenames, use simple format
    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("attachment; filename=\"{}\"", filename);
    }

    // Use RFC 5987 encoding for non-ASCII or special characters
    // filename* parameter with UTF-8 encoding
    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// GET /api/files - List the caller's files.
///
/// With `?search=term`, the listing is narrowed to files whose name
/// contains the term (case-insensitive). The stats block always covers
/// all of the caller's files.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Query(query): Query<FileListQuery>,
) -> Result<Json<ApiResponse<FileListResponse>>, ApiError> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let listing = state.files.list(claims.sub, search).await?;

    let response = FileListResponse {
        files: listing.files.iter().map(FileResponse::from_record).collect(),
        stats: UsageStats::from_report(&listing.usage),
    };

    Ok(Json(ApiResponse::new(response)))
}

/// GET /api/usage - Get the caller's storage usage.
pub async fn usage(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<UsageStats>>, ApiError> {
    let usage = state.files.usage(claims.sub).await?;

    Ok(Json(ApiResponse::new(UsageStats::from_report(&usage))))
}

/// POST /api/files - Upload a file.
///
/// Request body: multipart/form-data with a "file" field. The declared
/// content type of the part is used as the file's MIME type; when the
/// client declares none it is guessed from the filename.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<FileUploadResponse>>, ApiError> {
    // Extract file from multipart
    let mut filename: Option<String> = None;
    let mut declared_type: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::debug!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            filename = field.file_name().map(|s| s.to_string());
            declared_type = field.content_type().map(|s| s.to_string());
            content = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| {
                        tracing::debug!("Failed to read file content: {}", e);
                        ApiError::bad_request("Failed to read file")
                    })?
                    .to_vec(),
            );
        }
    }

    let filename = filename
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .ok_or_else(|| ApiError::bad_request("No file provided"))?;
    let content = content.ok_or_else(|| ApiError::bad_request("No file content"))?;

    if filename.chars().count() > MAX_FILENAME_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Filename too long (max {MAX_FILENAME_LENGTH} characters)"
        )));
    }

    // Declared content type wins; fall back to a guess from the filename
    let mime_type = declared_type.unwrap_or_else(|| {
        mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .to_string()
    });

    let request = UploadRequest::new(filename, content).with_mime_type(mime_type);
    let record = state.files.upload(claims.sub, &request).await?;

    let response = FileUploadResponse {
        file: FileResponse::from_record(&record),
    };

    Ok(Json(ApiResponse::new(response)))
}

/// GET /api/files/:id/download - Download a file.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(file_id): Path<i64>,
) -> Result<Response<Body>, ApiError> {
    let download = state.files.download(claims.sub, file_id).await?;

    let response = Response::builder()
        .header(header::CONTENT_TYPE, download.record.mime_type.clone())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&download.record.original_name),
        )
        .header(header::CONTENT_LENGTH, download.content.len())
        .body(Body::from(download.content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })?;

    Ok(response)
}

/// DELETE /api/files/:id - Delete a file.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.files.delete(claims.sub, file_id).await?;

    Ok(Json(ApiResponse::new(())))
}

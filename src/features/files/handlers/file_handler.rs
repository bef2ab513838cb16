use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppQuery;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{FileRecordSummaryDto, MessageDto, UploadFileDto};
use crate::features::files::services::FileService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Upload a file for processing
///
/// Accepts multipart/form-data with a single `file` field. The response is
/// returned once the file is stored; its content is parsed in the background.
#[utoipa::path(
    post,
    path = "/api/files/upload",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 200, description = "File stored and queued for processing", body = ApiResponse<String>),
        (status = 400, description = "Unknown user, invalid file or malformed form"),
        (status = 401, description = "Authentication required"),
        (status = 413, description = "Request body too large"),
        (status = 500, description = "File could not be stored")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<String>>> {
    let owner = service.resolve_user(&user).await?;

    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name != "file" {
            debug!("Ignoring unknown field: {}", field_name);
            continue;
        }

        let file_name = field.file_name().unwrap_or("").to_string();
        let data = field.bytes().await.map_err(|e| {
            debug!("Failed to read file bytes: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        upload = Some((file_name, data.to_vec()));
    }

    let (file_name, data) =
        upload.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;

    let confirmation = service.upload(&owner, data, &file_name).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some(confirmation),
        None,
    )))
}

/// List uploaded files
///
/// Admins see every file, other users only their own. Results are ordered by
/// id; `sort` values other than `id` are ignored.
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of files", body = ApiResponse<Vec<FileRecordSummaryDto>>),
        (status = 400, description = "Unknown user or invalid query"),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_files(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    AppQuery(query): AppQuery<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<FileRecordSummaryDto>>>> {
    let requester = service.resolve_user(&user).await?;
    let page = service.list(&requester, &query).await?;

    Ok(Json(ApiResponse::success(
        Some(page.items.clone()),
        None,
        Some(Meta { total: page.total }),
    )))
}

/// Get a single file
#[utoipa::path(
    get,
    path = "/api/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File found", body = ApiResponse<FileRecordSummaryDto>),
        (status = 400, description = "File not found or not visible"),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<FileRecordSummaryDto>>> {
    let requester = service.resolve_user(&user).await?;
    let file = service.get(&requester, id).await?;
    Ok(Json(ApiResponse::success(Some(file), None, None)))
}

/// List the messages extracted from a file
#[utoipa::path(
    get,
    path = "/api/files/{id}/messages",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "Messages in extraction order", body = ApiResponse<Vec<MessageDto>>),
        (status = 400, description = "File not found or not visible"),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_messages(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<MessageDto>>>> {
    let requester = service.resolve_user(&user).await?;
    let messages = service.messages(&requester, id).await?;
    Ok(Json(ApiResponse::success(Some(messages), None, None)))
}

/// Delete a file together with its messages and stored content
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File deleted", body = ApiResponse<String>),
        (status = 400, description = "File not found"),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_file(
    _user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<String>>> {
    let confirmation = service.delete(id).await?;
    Ok(Json(ApiResponse::success(None, Some(confirmation), None)))
}

//! Upload handler

use axum::{
    extract::{Multipart, State},
    Json,
};
use chat_service::dto::UploadResponse;
use chat_service::{FileService, IncomingFile};

use crate::response::{ApiError, ApiResult, Created};
use crate::state::AppState;

/// Store every file part of a multipart body
///
/// POST /api/uploads
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Created<Json<UploadResponse>>> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        // Plain form fields carry no file name
        let Some(original_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field.bytes().await?;
        files.push(IncomingFile {
            original_name: Some(original_name),
            data: data.to_vec(),
        });
    }

    if files.is_empty() {
        return Err(ApiError::invalid_body("no file parts in upload"));
    }

    let service = FileService::new(state.service_context());
    let response = service.store_all(files).await?;
    Ok(Created(Json(response)))
}

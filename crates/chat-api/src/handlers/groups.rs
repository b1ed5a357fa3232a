//! Group handlers

use axum::{extract::State, Json};
use chat_service::dto::{ContainerResponse, CreateGroupRequest};
use chat_service::ContainerService;

use crate::extractors::{IdPath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Create a group with its invited members
///
/// POST /api/group
pub async fn create_group(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateGroupRequest>,
) -> ApiResult<Created<Json<ContainerResponse>>> {
    let service = ContainerService::new(state.service_context());
    let response = service.create_group(request).await?;
    Ok(Created(Json(response)))
}

/// GET /api/group/{id}
pub async fn get_group(
    State(state): State<AppState>,
    IdPath(group_id): IdPath,
) -> ApiResult<Json<ContainerResponse>> {
    let service = ContainerService::new(state.service_context());
    let response = service.get_group(group_id).await?;
    Ok(Json(response))
}

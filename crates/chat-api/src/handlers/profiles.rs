//! Profile handlers

use axum::{
    extract::{Path, State},
    Json,
};
use chat_service::dto::{ChatsResponse, CreateProfileRequest, ProfileResponse};
use chat_service::ProfileService;

use crate::extractors::{IdPath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Create a profile for an external identity
///
/// POST /api/user/create
pub async fn create_profile(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateProfileRequest>,
) -> ApiResult<Created<Json<ProfileResponse>>> {
    let service = ProfileService::new(state.service_context());
    let response = service.create_profile(request).await?;
    Ok(Created(Json(response)))
}

/// Look a profile up by its external identity
///
/// GET /api/user/{externalId}
pub async fn get_profile_by_external_id(
    State(state): State<AppState>,
    Path(external_id): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let service = ProfileService::new(state.service_context());
    let response = service.get_profile_by_external_id(&external_id).await?;
    Ok(Json(response))
}

/// PATCH /api/user/{id}/last-seen
pub async fn touch_last_seen(
    State(state): State<AppState>,
    IdPath(profile_id): IdPath,
) -> ApiResult<Json<ProfileResponse>> {
    let service = ProfileService::new(state.service_context());
    let response = service.touch_last_seen(profile_id).await?;
    Ok(Json(response))
}

/// Channels, groups and conversations the profile belongs to
///
/// GET /api/user/{id}/chats
pub async fn list_chats(
    State(state): State<AppState>,
    IdPath(profile_id): IdPath,
) -> ApiResult<Json<ChatsResponse>> {
    let service = ProfileService::new(state.service_context());
    let response = service.list_chats(profile_id).await?;
    Ok(Json(response))
}

//! Channel and search handlers

use axum::{extract::State, Json};
use chat_service::dto::{ActorRequest, ContainerResponse, CreateChannelRequest, SearchQuery, SearchResponse};
use chat_service::ContainerService;

use crate::extractors::{IdPath, ValidatedJson, ValidatedQuery};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Create channel; the owner is its first member
///
/// POST /api/channels
pub async fn create_channel(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateChannelRequest>,
) -> ApiResult<Created<Json<ContainerResponse>>> {
    let service = ContainerService::new(state.service_context());
    let response = service.create_channel(request).await?;
    Ok(Created(Json(response)))
}

/// GET /api/channels/{id}
pub async fn get_channel(
    State(state): State<AppState>,
    IdPath(channel_id): IdPath,
) -> ApiResult<Json<ContainerResponse>> {
    let service = ContainerService::new(state.service_context());
    let response = service.get_channel(channel_id).await?;
    Ok(Json(response))
}

/// Join a channel
///
/// POST /api/channels/{id}/members
pub async fn join_channel(
    State(state): State<AppState>,
    IdPath(channel_id): IdPath,
    ValidatedJson(request): ValidatedJson<ActorRequest>,
) -> ApiResult<Json<ContainerResponse>> {
    let service = ContainerService::new(state.service_context());
    let response = service.join_channel(channel_id, request.profile_id).await?;
    Ok(Json(response))
}

/// Channels and profiles whose name contains the query
///
/// GET /api/search?q=
pub async fn search(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let service = ContainerService::new(state.service_context());
    let response = service.search(&query.q).await?;
    Ok(Json(response))
}

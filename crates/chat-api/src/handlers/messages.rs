//! Message handlers
//!
//! The container routes are registered once per container kind; the kind
//! reaches the handler as a request extension.

use axum::{
    extract::State,
    Extension, Json,
};
use chat_core::ContainerKind;
use chat_service::dto::{
    ActorRequest, EditMessageRequest, MessagePageQuery, MessagePageResponse, MessageResponse,
    ReadReceiptResponse, SendMessageRequest,
};
use chat_service::{MessageService, PaginationService};

use crate::extractors::{IdPath, ValidatedJson, ValidatedQuery};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Post a message
///
/// POST /api/{kind}/{containerId}/messages
pub async fn send_message(
    State(state): State<AppState>,
    Extension(kind): Extension<ContainerKind>,
    IdPath(container_id): IdPath,
    ValidatedJson(request): ValidatedJson<SendMessageRequest>,
) -> ApiResult<Created<Json<MessageResponse>>> {
    let service = MessageService::new(state.service_context());
    let response = service.send_message(kind, container_id, request).await?;
    Ok(Created(Json(response)))
}

/// One page of history, newest first
///
/// GET /api/{kind}/{containerId}/messages?cursor=&limit=
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(kind): Extension<ContainerKind>,
    IdPath(container_id): IdPath,
    ValidatedQuery(query): ValidatedQuery<MessagePageQuery>,
) -> ApiResult<Json<MessagePageResponse>> {
    let service = PaginationService::new(state.service_context());
    let response = service.list_messages(kind, container_id, query).await?;
    Ok(Json(response))
}

/// PATCH /api/messages/{id}
pub async fn edit_message(
    State(state): State<AppState>,
    IdPath(message_id): IdPath,
    ValidatedJson(request): ValidatedJson<EditMessageRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = MessageService::new(state.service_context());
    let response = service.edit_message(message_id, request).await?;
    Ok(Json(response))
}

/// Soft delete; the tombstoned message is returned
///
/// DELETE /api/messages/{id}?profileId=
pub async fn delete_message(
    State(state): State<AppState>,
    IdPath(message_id): IdPath,
    ValidatedQuery(actor): ValidatedQuery<ActorRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = MessageService::new(state.service_context());
    let response = service.delete_message(message_id, actor.profile_id).await?;
    Ok(Json(response))
}

/// POST /api/messages/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    IdPath(message_id): IdPath,
    ValidatedJson(actor): ValidatedJson<ActorRequest>,
) -> ApiResult<Json<ReadReceiptResponse>> {
    let service = MessageService::new(state.service_context());
    let response = service.mark_read(message_id, actor.profile_id).await?;
    Ok(Json(response))
}

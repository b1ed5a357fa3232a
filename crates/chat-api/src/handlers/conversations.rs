//! Conversation handlers

use axum::{extract::State, Json};
use chat_service::dto::{ContainerResponse, ConversationPairQuery, ConversationResponse};
use chat_service::ContainerService;

use crate::extractors::{IdPath, ValidatedQuery};
use crate::response::ApiResult;
use crate::state::AppState;

/// Return the conversation between two profiles, creating it if needed
///
/// POST /api/create-conversation?memberOneId=&memberTwoId=
pub async fn create_conversation(
    State(state): State<AppState>,
    ValidatedQuery(pair): ValidatedQuery<ConversationPairQuery>,
) -> ApiResult<Json<ConversationResponse>> {
    let service = ContainerService::new(state.service_context());
    let response = service
        .get_or_create_conversation(pair.member_one_id, pair.member_two_id)
        .await?;
    Ok(Json(response))
}

/// GET /api/get-conversation?memberOneId=&memberTwoId=
pub async fn find_conversation(
    State(state): State<AppState>,
    ValidatedQuery(pair): ValidatedQuery<ConversationPairQuery>,
) -> ApiResult<Json<ConversationResponse>> {
    let service = ContainerService::new(state.service_context());
    let response = service
        .find_conversation(pair.member_one_id, pair.member_two_id)
        .await?;
    Ok(Json(response))
}

/// GET /api/conversation/{id}
pub async fn get_conversation(
    State(state): State<AppState>,
    IdPath(conversation_id): IdPath,
) -> ApiResult<Json<ContainerResponse>> {
    let service = ContainerService::new(state.service_context());
    let response = service.get_conversation(conversation_id).await?;
    Ok(Json(response))
}

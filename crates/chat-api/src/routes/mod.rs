//! Route definitions

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Extension, Router,
};
use chat_common::AppConfig;
use chat_core::ContainerKind;
use tower_http::services::ServeDir;

use crate::handlers::{channels, conversations, groups, health, messages, profiles, uploads};
use crate::state::AppState;

/// Most files accepted in one upload request
const MAX_FILES_PER_UPLOAD: usize = 10;

/// Multipart framing allowance on top of the file bytes
const UPLOAD_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the main router with all routes
pub fn create_router(config: &AppConfig) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(profile_routes())
        .merge(container_routes())
        .merge(message_routes())
        .merge(socket_routes())
        .nest("/api/uploads", upload_routes(config))
}

/// Profile routes
fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/api/user/create", post(profiles::create_profile))
        .route("/api/user/:id", get(profiles::get_profile_by_external_id))
        .route("/api/user/:id/last-seen", patch(profiles::touch_last_seen))
        .route("/api/user/:id/chats", get(profiles::list_chats))
}

/// Channel, group and conversation routes
fn container_routes() -> Router<AppState> {
    Router::new()
        .route("/api/channels", post(channels::create_channel))
        .route("/api/channels/:id", get(channels::get_channel))
        .route("/api/channels/:id/members", post(channels::join_channel))
        .route("/api/search", get(channels::search))
        .route("/api/group", post(groups::create_group))
        .route("/api/group/:id", get(groups::get_group))
        .route("/api/create-conversation", post(conversations::create_conversation))
        .route("/api/get-conversation", get(conversations::find_conversation))
        .route("/api/conversation/:id", get(conversations::get_conversation))
}

/// Message routes
///
/// `/api/{kind}/:id/messages` exists once per container kind.
fn message_routes() -> Router<AppState> {
    let router = ContainerKind::ALL.into_iter().fold(Router::new(), |router, kind| {
        router.route(
            &format!("/api/{kind}/:id/messages"),
            post(messages::send_message)
                .get(messages::list_messages)
                .layer(Extension(kind)),
        )
    });

    router
        .route(
            "/api/messages/:id",
            patch(messages::edit_message).delete(messages::delete_message),
        )
        .route("/api/messages/:id/read", post(messages::mark_read))
}

/// WebSocket endpoint; `/api/socket/io` is kept as an alias
fn socket_routes() -> Router<AppState> {
    Router::new()
        .route("/api/socket", get(chat_gateway::socket_handler))
        .route("/api/socket/io", get(chat_gateway::socket_handler))
}

/// Upload endpoint plus read-only serving of stored files
fn upload_routes(config: &AppConfig) -> Router<AppState> {
    let body_limit = config.storage.max_file_size_bytes() * MAX_FILES_PER_UPLOAD + UPLOAD_OVERHEAD_BYTES;

    Router::new()
        .route(
            "/",
            post(uploads::upload_files).layer(DefaultBodyLimit::max(body_limit)),
        )
        .fallback_service(ServeDir::new(&config.storage.upload_dir))
}

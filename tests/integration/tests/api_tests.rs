//! API Integration Tests
//!
//! Each test starts its own server on the in-memory store.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_error, assert_json, assert_status, create_channel, create_conversation, create_group,
    create_profile, fixtures::*, id_of, send_text, TestServer,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "healthy");
}

// ============================================================================
// Profile Tests
// ============================================================================

#[tokio::test]
async fn test_create_and_lookup_profile() {
    let server = TestServer::start().await.unwrap();
    let request = CreateProfileRequest::unique("ada");

    let response = server.post("/api/user/create", &request).await.unwrap();
    let created: Profile = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(created.name, "ada");
    assert!(!created.online);

    let response = server
        .get(&format!("/api/user/{}", request.external_id))
        .await
        .unwrap();
    let found: Profile = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.external_id, request.external_id);
}

#[tokio::test]
async fn test_duplicate_profile_conflicts() {
    let server = TestServer::start().await.unwrap();
    let request = CreateProfileRequest::unique("dup");

    server.post("/api/user/create", &request).await.unwrap();
    let response = server.post("/api/user/create", &request).await.unwrap();
    let code = assert_error(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(code, "PROFILE_ALREADY_EXISTS");
}

#[tokio::test]
async fn test_invalid_profile_is_rejected() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .post(
            "/api/user/create",
            &json!({"externalId": "x", "name": "", "email": "not-an-email"}),
        )
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"].is_object());
}

#[tokio::test]
async fn test_unknown_profile_is_not_found() {
    let server = TestServer::start().await.unwrap();
    let response = server.get("/api/user/nobody").await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_touch_last_seen() {
    let server = TestServer::start().await.unwrap();
    let ada = create_profile(&server, "ada").await.unwrap();

    let response = server
        .patch(&format!("/api/user/{}/last-seen", ada.id), &json!({}))
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(body["lastSeen"].is_string());
}

#[tokio::test]
async fn test_list_chats() {
    let server = TestServer::start().await.unwrap();
    let ada = create_profile(&server, "ada").await.unwrap();
    let bob = create_profile(&server, "bob").await.unwrap();

    create_conversation(&server, &ada, &bob).await.unwrap();
    create_group(&server, &ada, &[&bob]).await.unwrap();
    create_channel(&server, &ada, "news").await.unwrap();

    let response = server
        .get(&format!("/api/user/{}/chats", bob.id))
        .await
        .unwrap();
    let chats: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(chats["conversations"].as_array().unwrap().len(), 1);
    assert_eq!(chats["groups"].as_array().unwrap().len(), 1);
    // bob has not joined the channel
    assert!(chats["channels"].as_array().unwrap().is_empty());
}

// ============================================================================
// Container Tests
// ============================================================================

#[tokio::test]
async fn test_conversation_is_created_once() {
    let server = TestServer::start().await.unwrap();
    let ada = create_profile(&server, "ada").await.unwrap();
    let bob = create_profile(&server, "bob").await.unwrap();

    let first = create_conversation(&server, &ada, &bob).await.unwrap();
    // reversed pair resolves to the same conversation
    let second = create_conversation(&server, &bob, &ada).await.unwrap();
    assert_eq!(id_of(&first), id_of(&second));

    let response = server
        .get(&format!(
            "/api/get-conversation?memberOneId={}&memberTwoId={}",
            bob.id, ada.id
        ))
        .await
        .unwrap();
    let found: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(id_of(&found), id_of(&first));

    let response = server
        .get(&format!("/api/conversation/{}", id_of(&first)))
        .await
        .unwrap();
    let fetched: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(fetched["type"], "conversation");
}

#[tokio::test]
async fn test_self_conversation_is_rejected() {
    let server = TestServer::start().await.unwrap();
    let ada = create_profile(&server, "ada").await.unwrap();

    let response = server
        .post_empty(&format!(
            "/api/create-conversation?memberOneId={}&memberTwoId={}",
            ada.id, ada.id
        ))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "SELF_CONVERSATION");
}

#[tokio::test]
async fn test_group_includes_owner_and_members() {
    let server = TestServer::start().await.unwrap();
    let ada = create_profile(&server, "ada").await.unwrap();
    let bob = create_profile(&server, "bob").await.unwrap();

    let group = create_group(&server, &ada, &[&bob]).await.unwrap();
    assert_eq!(group["type"], "group");
    assert_eq!(group["members"].as_array().unwrap().len(), 2);

    let response = server
        .get(&format!("/api/group/{}", id_of(&group)))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_join_channel_and_search() {
    let server = TestServer::start().await.unwrap();
    let ada = create_profile(&server, "ada").await.unwrap();
    let bob = create_profile(&server, "bob").await.unwrap();
    let channel = create_channel(&server, &ada, "rustaceans").await.unwrap();

    let response = server
        .post(
            &format!("/api/channels/{}/members", id_of(&channel)),
            &json!({"profileId": bob.id}),
        )
        .await
        .unwrap();
    let joined: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(joined["members"].as_array().unwrap().len(), 2);

    let response = server.get("/api/search?q=rust").await.unwrap();
    let results: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(results["channels"].as_array().unwrap().len(), 1);

    let response = server.get("/api/search?q=").await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Message Tests
// ============================================================================

#[tokio::test]
async fn test_send_and_list_messages() {
    let server = TestServer::start().await.unwrap();
    let ada = create_profile(&server, "ada").await.unwrap();
    let bob = create_profile(&server, "bob").await.unwrap();
    let conversation = create_conversation(&server, &ada, &bob).await.unwrap();
    let id = id_of(&conversation);

    let sent = send_text(&server, "conversation", &id, &ada, "hello bob").await.unwrap();
    assert_eq!(sent.container_type, "conversation");
    assert_eq!(sent.container_id, id);
    assert_eq!(sent.owner_id, ada.id);
    assert!(!sent.is_read);

    let response = server
        .get(&format!("/api/conversation/{id}/messages"))
        .await
        .unwrap();
    let page: MessagePage = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].content.as_deref(), Some("hello bob"));
    assert!(page.next_cursor.is_none());
    assert_eq!(page.container["lastMessage"], "hello bob");
}

#[tokio::test]
async fn test_pagination_walks_history_newest_first() {
    let server = TestServer::start().await.unwrap();
    let ada = create_profile(&server, "ada").await.unwrap();
    let bob = create_profile(&server, "bob").await.unwrap();
    let group = create_group(&server, &ada, &[&bob]).await.unwrap();
    let id = id_of(&group);

    for i in 0..5 {
        send_text(&server, "group", &id, &ada, &format!("message {i}")).await.unwrap();
    }

    let response = server
        .get(&format!("/api/group/{id}/messages?limit=2"))
        .await
        .unwrap();
    let first: MessagePage = assert_json(response, StatusCode::OK).await.unwrap();
    let contents: Vec<_> = first.items.iter().filter_map(|m| m.content.clone()).collect();
    assert_eq!(contents, ["message 4", "message 3"]);
    let cursor = first.next_cursor.expect("full page has a cursor");

    let response = server
        .get(&format!("/api/group/{id}/messages?limit=2&cursor={cursor}"))
        .await
        .unwrap();
    let second: MessagePage = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(second.items[0].content.as_deref(), Some("message 2"));
    let cursor = second.next_cursor.unwrap();

    let response = server
        .get(&format!("/api/group/{id}/messages?limit=2&cursor={cursor}"))
        .await
        .unwrap();
    let last: MessagePage = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(last.items.len(), 1);
    assert!(last.next_cursor.is_none());
}

#[tokio::test]
async fn test_foreign_cursor_is_rejected() {
    let server = TestServer::start().await.unwrap();
    let ada = create_profile(&server, "ada").await.unwrap();
    let bob = create_profile(&server, "bob").await.unwrap();
    let conversation = create_conversation(&server, &ada, &bob).await.unwrap();
    let group = create_group(&server, &ada, &[&bob]).await.unwrap();

    let other = send_text(&server, "group", &id_of(&group), &ada, "elsewhere").await.unwrap();

    let response = server
        .get(&format!(
            "/api/conversation/{}/messages?cursor={}",
            id_of(&conversation),
            other.id
        ))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_CURSOR");
}

#[tokio::test]
async fn test_page_views_split_media_files_and_links() {
    let server = TestServer::start().await.unwrap();
    let ada = create_profile(&server, "ada").await.unwrap();
    let bob = create_profile(&server, "bob").await.unwrap();
    let id = id_of(&create_conversation(&server, &ada, &bob).await.unwrap());
    let path = format!("/api/conversation/{id}/messages");

    let response = server
        .post(
            &path,
            &json!({"profileId": ada.id, "files": {"type": "imgs", "fileUrls": ["a.png"]}}),
        )
        .await
        .unwrap();
    let photo: Message = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert!(photo.content.is_none());

    server
        .post(
            &path,
            &json!({"profileId": ada.id, "files": {"type": "files", "fileUrls": ["b.pdf"]}}),
        )
        .await
        .unwrap();
    send_text(&server, "conversation", &id, &bob, "see https://example.com").await.unwrap();

    let response = server.get(&path).await.unwrap();
    let page: MessagePage = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.media.len(), 1);
    assert_eq!(page.files.len(), 1);
    assert_eq!(page.links.len(), 1);
}

#[tokio::test]
async fn test_send_rules() {
    let server = TestServer::start().await.unwrap();
    let ada = create_profile(&server, "ada").await.unwrap();
    let bob = create_profile(&server, "bob").await.unwrap();
    let eve = create_profile(&server, "eve").await.unwrap();
    let conversation = id_of(&create_conversation(&server, &ada, &bob).await.unwrap());
    let channel = id_of(&create_channel(&server, &ada, "announcements").await.unwrap());

    // empty body
    let response = server
        .post(
            &format!("/api/conversation/{conversation}/messages"),
            &json!({"profileId": ada.id, "content": "   "}),
        )
        .await
        .unwrap();
    assert_eq!(
        assert_error(response, StatusCode::BAD_REQUEST).await.unwrap(),
        "EMPTY_MESSAGE"
    );

    // outsider
    let response = server
        .post(
            &format!("/api/conversation/{conversation}/messages"),
            &json!({"profileId": eve.id, "content": "hi"}),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    // channels take posts from their owner only
    server
        .post(
            &format!("/api/channels/{channel}/members"),
            &json!({"profileId": bob.id}),
        )
        .await
        .unwrap();
    let response = server
        .post(
            &format!("/api/channel/{channel}/messages"),
            &json!({"profileId": bob.id, "content": "hi"}),
        )
        .await
        .unwrap();
    assert_eq!(
        assert_error(response, StatusCode::FORBIDDEN).await.unwrap(),
        "NOT_CHANNEL_OWNER"
    );
    send_text(&server, "channel", &channel, &ada, "welcome").await.unwrap();

    // unknown container
    let response = server
        .post(
            "/api/group/12345/messages",
            &json!({"profileId": ada.id, "content": "hi"}),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

#[tokio::test]
async fn test_reply_must_stay_in_container() {
    let server = TestServer::start().await.unwrap();
    let ada = create_profile(&server, "ada").await.unwrap();
    let bob = create_profile(&server, "bob").await.unwrap();
    let conversation = id_of(&create_conversation(&server, &ada, &bob).await.unwrap());
    let group = id_of(&create_group(&server, &ada, &[&bob]).await.unwrap());

    let original = send_text(&server, "conversation", &conversation, &ada, "question").await.unwrap();
    let foreign = send_text(&server, "group", &group, &ada, "other").await.unwrap();

    let response = server
        .post(
            &format!("/api/conversation/{conversation}/messages"),
            &json!({"profileId": bob.id, "content": "answer", "replyId": original.id}),
        )
        .await
        .unwrap();
    let reply: Message = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(reply.reply_id.as_deref(), Some(original.id.as_str()));

    let response = server
        .post(
            &format!("/api/conversation/{conversation}/messages"),
            &json!({"profileId": bob.id, "content": "answer", "replyId": foreign.id}),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_edit_and_delete() {
    let server = TestServer::start().await.unwrap();
    let ada = create_profile(&server, "ada").await.unwrap();
    let bob = create_profile(&server, "bob").await.unwrap();
    let conversation = id_of(&create_conversation(&server, &ada, &bob).await.unwrap());
    let message = send_text(&server, "conversation", &conversation, &ada, "typo").await.unwrap();
    let path = format!("/api/messages/{}", message.id);

    // only the owner may edit
    let response = server
        .patch(&path, &json!({"profileId": bob.id, "content": "hijack"}))
        .await
        .unwrap();
    assert_eq!(
        assert_error(response, StatusCode::FORBIDDEN).await.unwrap(),
        "NOT_MESSAGE_OWNER"
    );

    let response = server
        .patch(&path, &json!({"profileId": ada.id, "content": "   "}))
        .await
        .unwrap();
    assert_eq!(
        assert_error(response, StatusCode::BAD_REQUEST).await.unwrap(),
        "EMPTY_MESSAGE"
    );

    let response = server
        .patch(&path, &json!({"profileId": ada.id, "content": "fixed"}))
        .await
        .unwrap();
    let edited: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(edited["content"], "fixed");
    assert!(edited["editedAt"].is_string());

    let response = server
        .delete(&format!("{path}?profileId={}", ada.id))
        .await
        .unwrap();
    let deleted: Message = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(deleted.deleted);
    assert_eq!(deleted.content.as_deref(), Some("This message has been deleted"));

    // deleted messages stay in history and cannot be edited
    let response = server
        .patch(&path, &json!({"profileId": ada.id, "content": "again"}))
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    let response = server
        .get(&format!("/api/conversation/{conversation}/messages"))
        .await
        .unwrap();
    let page: MessagePage = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(page.items[0].deleted);
}

#[tokio::test]
async fn test_read_receipts() {
    let server = TestServer::start().await.unwrap();
    let ada = create_profile(&server, "ada").await.unwrap();
    let bob = create_profile(&server, "bob").await.unwrap();
    let carol = create_profile(&server, "carol").await.unwrap();

    // conversation: one flag, flipped by the recipient only
    let conversation = id_of(&create_conversation(&server, &ada, &bob).await.unwrap());
    let message = send_text(&server, "conversation", &conversation, &ada, "ping").await.unwrap();
    let read_path = format!("/api/messages/{}/read", message.id);

    let response = server.post(&read_path, &json!({"profileId": ada.id})).await.unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server.post(&read_path, &json!({"profileId": bob.id})).await.unwrap();
    let receipt: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(receipt["changed"], true);

    let response = server.post(&read_path, &json!({"profileId": bob.id})).await.unwrap();
    let receipt: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(receipt["changed"], false);

    // group: a reader set
    let group = id_of(&create_group(&server, &ada, &[&bob, &carol]).await.unwrap());
    let message = send_text(&server, "group", &group, &ada, "hello all").await.unwrap();
    let read_path = format!("/api/messages/{}/read", message.id);
    for reader in [&bob, &carol] {
        let response = server.post(&read_path, &json!({"profileId": reader.id})).await.unwrap();
        assert_status(response, StatusCode::OK).await.unwrap();
    }

    let response = server
        .get(&format!("/api/group/{group}/messages"))
        .await
        .unwrap();
    let page: MessagePage = assert_json(response, StatusCode::OK).await.unwrap();
    let mut readers = page.items[0].read_by.clone();
    readers.sort();
    let mut expected = vec![bob.id.clone(), carol.id.clone()];
    expected.sort();
    assert_eq!(readers, expected);
}

// ============================================================================
// Upload Tests
// ============================================================================

#[tokio::test]
async fn test_upload_and_serve_file() {
    let server = TestServer::start().await.unwrap();

    let response = server
        .upload(&[("notes.txt", &b"hello"[..]), ("photo.png", &b"\x89PNG"[..])])
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::CREATED).await.unwrap();
    let urls = body["fileUrls"].as_array().unwrap();
    assert_eq!(urls.len(), 2);

    let name = urls[0].as_str().unwrap();
    assert!(name.ends_with(".txt"));

    let response = server.get(&format!("/api/uploads/{name}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"hello");
}

#[tokio::test]
async fn test_upload_limits() {
    let server = TestServer::start().await.unwrap();

    // limit is 1 MB in the test config
    let big = vec![0u8; 1024 * 1024 + 1];
    let response = server.upload(&[("big.bin", big.as_slice())]).await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();

    let response = server.upload(&[]).await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

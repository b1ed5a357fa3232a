//! Socket Integration Tests
//!
//! Drive real WebSocket clients against a server on the in-memory store and
//! check what the fan-out delivers to whom.
//!
//! Run with: cargo test -p integration-tests --test socket_tests

use std::time::Duration;

use integration_tests::{
    assert_json, create_conversation, create_group, create_profile, id_of, send_text, Profile,
    TestServer,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn fetch_profile(server: &TestServer, profile: &Profile) -> Profile {
    let response = server
        .get(&format!("/api/user/{}", profile.external_id))
        .await
        .unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

#[tokio::test]
async fn test_ping_pong() {
    let server = TestServer::start().await.unwrap();
    let mut socket = server.socket().await.unwrap();

    socket.send_json(&json!({"method": "ping"})).await.unwrap();
    let pong = socket.next_payload().await.unwrap();
    assert_eq!(pong, json!({"key": "pong"}));
}

#[tokio::test]
async fn test_bad_frames_keep_connection_open() {
    let server = TestServer::start().await.unwrap();
    let mut socket = server.socket().await.unwrap();

    socket.send_text("not json").await.unwrap();
    socket.send_json(&json!({"method": "subscribe"})).await.unwrap();
    socket.send_json(&json!({"method": "register"})).await.unwrap();

    socket.ping().await.unwrap();
}

#[tokio::test]
async fn test_register_tracks_presence() {
    let server = TestServer::start().await.unwrap();
    let ada = create_profile(&server, "ada").await.unwrap();

    let mut first = server.socket().await.unwrap();
    let mut second = server.socket().await.unwrap();
    first.register(&ada.id).await.unwrap();
    second.register(&ada.id).await.unwrap();
    assert!(fetch_profile(&server, &ada).await.online);

    // still online while one connection remains
    first.close().await.unwrap();
    second.ping().await.unwrap();
    assert!(fetch_profile(&server, &ada).await.online);

    second.close().await.unwrap();
    let mut offline = false;
    for _ in 0..50 {
        if !fetch_profile(&server, &ada).await.online {
            offline = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(offline, "profile should go offline after its last connection closes");
}

#[tokio::test]
async fn test_unknown_profile_stays_anonymous() {
    let server = TestServer::start().await.unwrap();
    let ada = create_profile(&server, "ada").await.unwrap();
    let bob = create_profile(&server, "bob").await.unwrap();
    let conversation = id_of(&create_conversation(&server, &ada, &bob).await.unwrap());

    let mut socket = server.socket().await.unwrap();
    socket.register("999999").await.unwrap();

    send_text(&server, "conversation", &conversation, &ada, "hi").await.unwrap();
    socket.expect_silence(Duration::from_millis(300)).await.unwrap();
}

#[tokio::test]
async fn test_message_fanout_reaches_members_only() {
    let server = TestServer::start().await.unwrap();
    let ada = create_profile(&server, "ada").await.unwrap();
    let bob = create_profile(&server, "bob").await.unwrap();
    let eve = create_profile(&server, "eve").await.unwrap();
    let conversation = id_of(&create_conversation(&server, &ada, &bob).await.unwrap());

    let mut bob_socket = server.socket().await.unwrap();
    let mut eve_socket = server.socket().await.unwrap();
    let mut anonymous = server.socket().await.unwrap();
    bob_socket.register(&bob.id).await.unwrap();
    eve_socket.register(&eve.id).await.unwrap();

    let message = send_text(&server, "conversation", &conversation, &ada, "hello bob")
        .await
        .unwrap();

    let created = bob_socket
        .expect_key(&format!("conversation:{conversation}:messages"))
        .await
        .unwrap();
    assert_eq!(created["data"]["id"], message.id.as_str());
    assert_eq!(created["data"]["content"], "hello bob");

    let notice = bob_socket
        .expect_key(&format!("user:{}:lastMessageUpdate", bob.id))
        .await
        .unwrap();
    assert_eq!(notice["data"]["containerType"], "conversation");
    assert_eq!(notice["data"]["containerId"], conversation.as_str());
    assert_eq!(notice["data"]["lastMessage"], "hello bob");

    eve_socket.expect_silence(Duration::from_millis(200)).await.unwrap();
    anonymous.expect_silence(Duration::from_millis(200)).await.unwrap();
}

#[tokio::test]
async fn test_update_and_read_events() {
    let server = TestServer::start().await.unwrap();
    let ada = create_profile(&server, "ada").await.unwrap();
    let bob = create_profile(&server, "bob").await.unwrap();
    let conversation = id_of(&create_conversation(&server, &ada, &bob).await.unwrap());
    let message = send_text(&server, "conversation", &conversation, &ada, "draft")
        .await
        .unwrap();

    let mut ada_socket = server.socket().await.unwrap();
    ada_socket.register(&ada.id).await.unwrap();

    server
        .patch(
            &format!("/api/messages/{}", message.id),
            &json!({"profileId": ada.id, "content": "final"}),
        )
        .await
        .unwrap();
    let update = ada_socket
        .expect_key(&format!("conversation:{conversation}:messages:update"))
        .await
        .unwrap();
    assert_eq!(update["data"]["content"], "final");

    server
        .post(
            &format!("/api/messages/{}/read", message.id),
            &json!({"profileId": bob.id}),
        )
        .await
        .unwrap();
    let read = ada_socket
        .expect_key(&format!("message:{}:read", message.id))
        .await
        .unwrap();
    assert_eq!(read["data"]["readerId"], bob.id.as_str());
    assert_eq!(read["data"]["messageId"], message.id.as_str());

    // a repeated receipt publishes nothing
    server
        .post(
            &format!("/api/messages/{}/read", message.id),
            &json!({"profileId": bob.id}),
        )
        .await
        .unwrap();
    ada_socket.expect_silence(Duration::from_millis(200)).await.unwrap();
}

#[tokio::test]
async fn test_group_created_notifies_invited_members() {
    let server = TestServer::start().await.unwrap();
    let ada = create_profile(&server, "ada").await.unwrap();
    let bob = create_profile(&server, "bob").await.unwrap();

    let mut bob_socket = server.socket().await.unwrap();
    bob_socket.register(&bob.id).await.unwrap();

    let group = create_group(&server, &ada, &[&bob]).await.unwrap();

    let created: Value = bob_socket
        .expect_key(&format!("user:{}:groupCreated", bob.id))
        .await
        .unwrap();
    assert_eq!(created["data"]["id"], id_of(&group).as_str());
}

#[tokio::test]
async fn test_socket_io_alias() {
    let server = TestServer::start().await.unwrap();
    let url = format!("ws://{}/api/socket/io", server.addr);
    let result = tokio_tungstenite::connect_async(url.as_str()).await;
    assert!(result.is_ok());
}

//! Test fixtures and data generators
//!
//! Provides reusable test data for integration tests.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::helpers::{assert_json, TestServer};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Create profile request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    pub external_id: String,
    pub name: String,
    pub email: Option<String>,
}

impl CreateProfileRequest {
    pub fn unique(name: &str) -> Self {
        let suffix = unique_suffix();
        Self {
            external_id: format!("ext-{name}-{suffix}"),
            name: name.to_string(),
            email: Some(format!("{name}{suffix}@example.com")),
        }
    }
}

/// Profile response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub external_id: String,
    pub name: String,
    pub online: bool,
}

/// Message response, the fields the tests look at
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub container_type: String,
    pub container_id: String,
    pub content: Option<String>,
    pub owner_id: String,
    pub reply_id: Option<String>,
    pub deleted: bool,
    pub is_read: bool,
    #[serde(default)]
    pub read_by: Vec<String>,
}

/// History page
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    pub items: Vec<Message>,
    pub next_cursor: Option<String>,
    pub media: Vec<Message>,
    pub files: Vec<Message>,
    pub links: Vec<Message>,
    pub container: Value,
}

pub async fn create_profile(server: &TestServer, name: &str) -> Result<Profile> {
    let response = server
        .post("/api/user/create", &CreateProfileRequest::unique(name))
        .await?;
    assert_json(response, StatusCode::CREATED).await
}

/// Returns the conversation body
pub async fn create_conversation(server: &TestServer, one: &Profile, two: &Profile) -> Result<Value> {
    let response = server
        .post_empty(&format!(
            "/api/create-conversation?memberOneId={}&memberTwoId={}",
            one.id, two.id
        ))
        .await?;
    assert_json(response, StatusCode::OK).await
}

pub async fn create_group(server: &TestServer, owner: &Profile, members: &[&Profile]) -> Result<Value> {
    let member_ids: Vec<&str> = members.iter().map(|p| p.id.as_str()).collect();
    let response = server
        .post(
            "/api/group",
            &json!({
                "name": format!("group-{}", unique_suffix()),
                "ownerId": owner.id,
                "memberIds": member_ids,
            }),
        )
        .await?;
    assert_json(response, StatusCode::CREATED).await
}

pub async fn create_channel(server: &TestServer, owner: &Profile, name: &str) -> Result<Value> {
    let response = server
        .post(
            "/api/channels",
            &json!({"name": name, "ownerId": owner.id, "description": "test channel"}),
        )
        .await?;
    assert_json(response, StatusCode::CREATED).await
}

pub async fn send_text(
    server: &TestServer,
    kind: &str,
    container_id: &str,
    sender: &Profile,
    content: &str,
) -> Result<Message> {
    let response = server
        .post(
            &format!("/api/{kind}/{container_id}/messages"),
            &json!({"profileId": sender.id, "content": content}),
        )
        .await?;
    assert_json(response, StatusCode::CREATED).await
}

/// `id` field of a container body
pub fn id_of(body: &Value) -> String {
    body["id"].as_str().unwrap_or_default().to_string()
}

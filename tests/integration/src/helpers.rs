//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers on the in-memory store,
//! making HTTP requests and driving socket clients.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chat_api::{create_app, create_app_state};
use chat_common::AppConfig;
use futures_util::{SinkExt, StreamExt};
use reqwest::{multipart, Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

/// How long a socket client waits for an expected payload
const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub upload_dir: PathBuf,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        Self::start_with(|_| None).await
    }

    /// Start a test server, overriding individual settings
    pub async fn start_with<F>(overrides: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let upload_dir = std::env::temp_dir().join(format!("chat-it-{}", uuid::Uuid::new_v4()));
        let config = test_config(&upload_dir, overrides)?;

        let state = create_app_state(config).await?;
        let app = create_app(state);

        // Port 0 lets the OS pick a free port
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            addr,
            client,
            upload_dir,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.post(self.url(path)).json(body).send().await?)
    }

    /// Make a POST request without a body; the path carries any query string
    pub async fn post_empty(&self, path: &str) -> Result<Response> {
        Ok(self.client.post(self.url(path)).send().await?)
    }

    /// Make a PATCH request with JSON body
    pub async fn patch<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.patch(self.url(path)).json(body).send().await?)
    }

    /// Make a DELETE request; the path carries any query string
    pub async fn delete(&self, path: &str) -> Result<Response> {
        Ok(self.client.delete(self.url(path)).send().await?)
    }

    /// Upload files as multipart form parts named `file`
    pub async fn upload(&self, files: &[(&str, &[u8])]) -> Result<Response> {
        let mut form = multipart::Form::new();
        for (name, data) in files {
            let part = multipart::Part::bytes(data.to_vec()).file_name((*name).to_string());
            form = form.part("file", part);
        }

        Ok(self
            .client
            .post(self.url("/api/uploads"))
            .multipart(form)
            .send()
            .await?)
    }

    /// Open a socket connection
    pub async fn socket(&self) -> Result<SocketClient> {
        let url = format!("ws://{}/api/socket", self.addr);
        let (stream, _) = connect_async(url.as_str())
            .await
            .context("socket handshake failed")?;
        Ok(SocketClient { stream })
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

/// Socket client speaking the `{"method", "data"}` frame format
pub struct SocketClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl SocketClient {
    /// Send a raw text frame
    pub async fn send_text(&mut self, text: impl Into<String>) -> Result<()> {
        self.stream.send(Message::Text(text.into())).await?;
        Ok(())
    }

    pub async fn send_json(&mut self, frame: &Value) -> Result<()> {
        self.send_text(frame.to_string()).await
    }

    /// Bind this connection to a profile
    ///
    /// Frames on one connection are handled in order, so the pong proves the
    /// registration has been processed.
    pub async fn register(&mut self, profile_id: &str) -> Result<()> {
        self.send_json(&json!({"method": "register", "data": {"id": profile_id}}))
            .await?;
        self.ping().await
    }

    /// Send a ping and wait for the pong
    pub async fn ping(&mut self) -> Result<()> {
        self.send_json(&json!({"method": "ping"})).await?;
        self.expect_key("pong").await.map(|_| ())
    }

    /// Next server payload
    pub async fn next_payload(&mut self) -> Result<Value> {
        loop {
            let frame = tokio::time::timeout(EVENT_TIMEOUT, self.stream.next())
                .await
                .context("timed out waiting for a payload")?
                .context("socket closed")??;

            if let Message::Text(text) = frame {
                return Ok(serde_json::from_str(&text)?);
            }
        }
    }

    /// Skip payloads until one with `key` arrives
    pub async fn expect_key(&mut self, key: &str) -> Result<Value> {
        loop {
            let payload = self.next_payload().await?;
            if payload["key"] == key {
                return Ok(payload);
            }
        }
    }

    /// Assert nothing arrives within `wait`
    pub async fn expect_silence(&mut self, wait: Duration) -> Result<()> {
        match tokio::time::timeout(wait, self.stream.next()).await {
            Err(_) => Ok(()),
            Ok(frame) => anyhow::bail!("unexpected frame: {frame:?}"),
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}

/// Test configuration on the in-memory store
pub fn test_config<F>(upload_dir: &std::path::Path, overrides: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let upload_dir = upload_dir.to_string_lossy().into_owned();
    let config = AppConfig::from_lookup(|key| {
        overrides(key).or_else(|| match key {
            "STORE_BACKEND" => Some("memory".to_string()),
            "UPLOAD_DIR" => Some(upload_dir.clone()),
            "MAX_FILE_SIZE_MB" => Some("1".to_string()),
            _ => None,
        })
    })
    .map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    Ok(config)
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(())
}

/// Assert an error response and return its `error.code`
pub async fn assert_error(response: Response, expected_status: StatusCode) -> Result<String> {
    let body: Value = assert_json(response, expected_status).await?;
    body["error"]["code"]
        .as_str()
        .map(String::from)
        .context("error body without a code")
}

//! Socket message formats

use chat_core::Snowflake;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::handlers::{HandlerError, HandlerResult};

/// A message received from a client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessage {
    /// Bind the connection to a profile
    Register { id: Snowflake },
    /// Liveness probe, answered with a `pong` key
    Ping,
}

#[derive(Deserialize)]
struct RawClientMessage {
    method: String,
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
struct RegisterData {
    id: Snowflake,
}

impl ClientMessage {
    /// Parse a text frame
    ///
    /// Malformed JSON and a `register` without a usable id are
    /// [`HandlerError::Malformed`]; a well-formed message with a method the
    /// server does not know is [`HandlerError::UnknownMethod`].
    pub fn from_json(text: &str) -> HandlerResult<Self> {
        let raw: RawClientMessage = serde_json::from_str(text)?;

        match raw.method.as_str() {
            "register" => {
                let data: RegisterData = serde_json::from_value(raw.data)?;
                Ok(Self::Register { id: data.id })
            }
            "ping" => Ok(Self::Ping),
            other => Err(HandlerError::UnknownMethod(other.to_string())),
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::Ping => "ping",
        }
    }
}

/// A payload pushed to a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerEvent {
    /// Routing key, e.g. `group:42:messages`
    pub key: String,

    /// Event type, e.g. `message.created`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl ServerEvent {
    #[must_use]
    pub fn new(key: impl Into<String>, event: impl Into<String>, data: Value) -> Self {
        Self {
            key: key.into(),
            event: Some(event.into()),
            data,
        }
    }

    /// Reply to a client `ping`
    #[must_use]
    pub fn pong() -> Self {
        Self {
            key: "pong".to_string(),
            event: None,
            data: Value::Null,
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

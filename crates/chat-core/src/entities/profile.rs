//! Profile entity - the identity record behind every message and membership

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Profile owned by the external identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: Snowflake,
    /// Identifier issued by the identity provider
    pub external_id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub email: Option<String>,
    pub online: bool,
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(id: Snowflake, external_id: String, name: String) -> Self {
        Self {
            id,
            external_id,
            name,
            image_url: None,
            email: None,
            online: false,
            last_seen: None,
            created_at: Utc::now(),
        }
    }

    /// Flip the presence flag. Going offline stamps `last_seen`.
    pub fn set_online(&mut self, online: bool) {
        self.online = online;
        if !online {
            self.last_seen = Some(Utc::now());
        }
    }

    #[inline]
    pub fn name_contains(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

//! Message entity - a post inside a channel, group or conversation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::container::{ContainerKind, ContainerRef};
use crate::value_objects::Snowflake;

/// Content written over a soft-deleted message
pub const TOMBSTONE: &str = "This message has been deleted";

/// Placeholder preview for messages that only carry files
const ATTACHMENT_PREVIEW: &str = "Attachment";

/// Declared type of a file bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Images, shown in the media view
    Imgs,
    /// Generic documents, shown in the files view
    Files,
    #[serde(other)]
    Other,
}

/// Files attached to a message, stored as an opaque JSON document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFiles {
    #[serde(rename = "type")]
    pub kind: FileKind,
    #[serde(rename = "fileUrls", default)]
    pub file_urls: Vec<String>,
}

impl MessageFiles {
    pub fn new(kind: FileKind, file_urls: Vec<String>) -> Self {
        Self { kind, file_urls }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.file_urls.is_empty()
    }
}

/// Read receipt state
///
/// Conversations have exactly one possible reader so a flag is enough.
/// Groups and channels have many readers and keep the set of reader ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadState {
    Flag(bool),
    Readers(BTreeSet<Snowflake>),
}

impl ReadState {
    /// Fresh unread state for a message in the given kind of container
    pub fn unread(kind: ContainerKind) -> Self {
        if kind.tracks_single_reader() {
            Self::Flag(false)
        } else {
            Self::Readers(BTreeSet::new())
        }
    }

    pub fn is_read(&self) -> bool {
        match self {
            Self::Flag(read) => *read,
            Self::Readers(readers) => !readers.is_empty(),
        }
    }

    pub fn readers(&self) -> Vec<Snowflake> {
        match self {
            Self::Flag(_) => Vec::new(),
            Self::Readers(readers) => readers.iter().copied().collect(),
        }
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub container: ContainerRef,
    pub owner_id: Snowflake,
    pub content: Option<String>,
    pub files: Option<MessageFiles>,
    pub reply_id: Option<Snowflake>,
    pub deleted: bool,
    pub read_state: ReadState,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

impl Message {
    pub fn new(
        id: Snowflake,
        container: ContainerRef,
        owner_id: Snowflake,
        content: Option<String>,
        files: Option<MessageFiles>,
    ) -> Self {
        Self {
            id,
            container,
            owner_id,
            content,
            files,
            reply_id: None,
            deleted: false,
            read_state: ReadState::unread(container.kind),
            created_at: Utc::now(),
            edited_at: None,
        }
    }

    pub fn with_reply(mut self, reply_id: Option<Snowflake>) -> Self {
        self.reply_id = reply_id;
        self
    }

    #[inline]
    pub fn is_reply(&self) -> bool {
        self.reply_id.is_some()
    }

    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }

    /// A message must carry text or files
    pub fn has_body(&self) -> bool {
        let has_text = self.content.as_deref().is_some_and(|c| !c.trim().is_empty());
        let has_files = self.files.as_ref().is_some_and(|f| !f.is_empty());
        has_text || has_files
    }

    pub fn edit(&mut self, content: String) {
        self.content = Some(content);
        self.edited_at = Some(Utc::now());
    }

    /// Soft delete: keep the row, drop the body
    pub fn tombstone(&mut self) {
        self.content = Some(TOMBSTONE.to_string());
        self.files = None;
        self.deleted = true;
        self.edited_at = Some(Utc::now());
    }

    /// Record `reader_id` as having read the message.
    ///
    /// Returns false when the state did not change (already read).
    pub fn mark_read_by(&mut self, reader_id: Snowflake) -> bool {
        match &mut self.read_state {
            ReadState::Flag(read) => {
                if *read {
                    false
                } else {
                    *read = true;
                    true
                }
            }
            ReadState::Readers(readers) => readers.insert(reader_id),
        }
    }

    pub fn is_read_by(&self, reader_id: Snowflake) -> bool {
        match &self.read_state {
            ReadState::Flag(read) => *read && reader_id != self.owner_id,
            ReadState::Readers(readers) => readers.contains(&reader_id),
        }
    }

    /// Preview used for the container's lastMessage cache
    ///
    /// Text is cut to `max_chars` characters with a trailing ellipsis; a
    /// message without text previews as a generic attachment label.
    pub fn preview(&self, max_chars: usize) -> String {
        match self.content.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(text) if text.chars().count() > max_chars => {
                let mut cut: String = text.chars().take(max_chars).collect();
                cut.push('…');
                cut
            }
            Some(text) => text.to_string(),
            None => ATTACHMENT_PREVIEW.to_string(),
        }
    }

    pub fn file_kind(&self) -> Option<FileKind> {
        self.files.as_ref().map(|f| f.kind)
    }

    pub fn has_link(&self) -> bool {
        self.content.as_deref().is_some_and(contains_link)
    }
}

/// True when `text` contains an `http://` or `https://` URL
///
/// A scheme only counts when at least one non-whitespace character follows it.
pub fn contains_link(text: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        text.match_indices(scheme).any(|(at, _)| {
            text[at + scheme.len()..]
                .chars()
                .next()
                .is_some_and(|c| !c.is_whitespace())
        })
    })
}

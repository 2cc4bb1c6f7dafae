//! Post drafts and the payload sent to the blog API.
//!
//! A [`PostDraft`] is the editor-side view of a post. It is validated into a
//! [`PostPayload`] before anything leaves the editor; empty titles or bodies
//! never produce a payload.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DraftError {
    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Content must not be empty")]
    EmptyContent,

    #[error("Unknown post status: {0} (expected published or draft)")]
    UnknownStatus(String),

    #[error("Failed to encode payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Publication state of a post.
#[derive(
    clap::ValueEnum, Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Published,
    Draft,
}

impl PostStatus {
    /// The other status.
    pub const fn toggle(self) -> Self {
        match self {
            Self::Published => Self::Draft,
            Self::Draft => Self::Published,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Draft => "draft",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published" => Ok(Self::Published),
            "draft" => Ok(Self::Draft),
            other => Err(DraftError::UnknownStatus(other.to_string())),
        }
    }
}

/// Editor-side state of a post being written or edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    /// Server id when editing an existing post; `None` for a new one.
    pub id: Option<u64>,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
            status: PostStatus::default(),
        }
    }

    #[must_use]
    pub const fn with_id(mut self, id: Option<u64>) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub const fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    pub const fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Check the draft and build the request payload.
    ///
    /// # Errors
    /// Returns [`DraftError::EmptyTitle`] or [`DraftError::EmptyContent`] when
    /// the trimmed field is empty. The title is checked first.
    pub fn validate(&self) -> Result<PostPayload, DraftError> {
        let title = self.title.trim();
        let content = self.content.trim();
        if title.is_empty() {
            return Err(DraftError::EmptyTitle);
        }
        if content.is_empty() {
            return Err(DraftError::EmptyContent);
        }
        Ok(PostPayload {
            id: self.id,
            title: title.to_string(),
            content: content.to_string(),
            status: self.status,
        })
    }
}

/// JSON body for creating or updating a post.
///
/// `id` is present only for an existing post, which is updated in place
/// rather than created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
}

impl PostPayload {
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, DraftError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_draft_defaults_to_published() {
        let draft = PostDraft::new("t", "c");
        assert_eq!(draft.status, PostStatus::Published);
        assert!(draft.is_new());
    }

    #[test]
    fn test_with_id_marks_existing_post() {
        let draft = PostDraft::new("t", "c").with_id(Some(7));
        assert!(!draft.is_new());
    }

    #[test]
    fn test_validate_trims_fields() {
        let draft = PostDraft::new("  Hello  ", "\n body \n").with_status(PostStatus::Draft);
        let payload = draft.validate().unwrap();
        assert_eq!(payload.title, "Hello");
        assert_eq!(payload.content, "body");
        assert_eq!(payload.status, PostStatus::Draft);
    }

    #[test]
    fn test_validate_rejects_blank_title_first() {
        let draft = PostDraft::new("   ", "");
        assert!(matches!(draft.validate(), Err(DraftError::EmptyTitle)));
    }

    #[test]
    fn test_validate_rejects_blank_content() {
        let draft = PostDraft::new("Title", " \n\t ");
        assert!(matches!(draft.validate(), Err(DraftError::EmptyContent)));
    }

    #[test]
    fn test_status_toggle_round_trips() {
        assert_eq!(PostStatus::Published.toggle(), PostStatus::Draft);
        assert_eq!(PostStatus::Draft.toggle().toggle(), PostStatus::Draft);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("draft".parse::<PostStatus>().unwrap(), PostStatus::Draft);
        assert_eq!(
            "published".parse::<PostStatus>().unwrap(),
            PostStatus::Published
        );
        let err = "archived".parse::<PostStatus>().unwrap_err();
        assert!(err.to_string().contains("archived"));
    }

    #[test]
    fn test_payload_json_uses_lowercase_status() {
        let payload = PostDraft::new("T", "C")
            .with_status(PostStatus::Draft)
            .validate()
            .unwrap();
        let json = payload.to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["title"], "T");
        assert_eq!(value["content"], "C");
        assert_eq!(value["status"], "draft");
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_payload_json_carries_existing_post_id() {
        let payload = PostDraft::new("T", "C")
            .with_id(Some(7))
            .validate()
            .unwrap();
        assert_eq!(payload.id, Some(7));
        let value: serde_json::Value =
            serde_json::from_str(&payload.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["id"], 7);
    }

    #[test]
    fn test_payload_deserializes_from_api_shape() {
        let payload: PostPayload =
            serde_json::from_str(r#"{"title":"a","content":"b","status":"published"}"#).unwrap();
        assert_eq!(payload.status, PostStatus::Published);
        assert_eq!(payload.id, None);
    }
}

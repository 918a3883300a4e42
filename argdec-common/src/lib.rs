//! Common types shared across Argdec crates.
//!
//! This crate defines the shared error type, the role-tagged chat message
//! used both in conversation logs and on the wire, and the centralised
//! `tracing` initialisation. It is intentionally lightweight so every crate
//! in the workspace can depend on it.

use serde::{Deserialize, Serialize};

pub mod observability;

/// Error types used across the Argdec system.
#[derive(thiserror::Error, Debug)]
pub enum ArgdecError {
    /// The completion service did not return usable text: transport
    /// failure, non-2xx status, or a malformed response body.
    #[error("completion service error: {0}")]
    Service(String),

    /// An operation of this kind is already in flight for the session.
    #[error("{0} request already in flight")]
    Busy(&'static str),

    /// The request did not complete within the bounded interval.
    #[error("completion request timed out")]
    Timeout,

    /// Configuration was incomplete or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Session lifecycle misuse (e.g. resubmitting the article, or a
    /// reaction targeting a message that does not exist).
    #[error("session error: {0}")]
    Session(String),
}

/// Convenient alias for results that use [`ArgdecError`].
pub type Result<T> = std::result::Result<T, ArgdecError>;

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry in a conversation log, and one element of a completion
/// request's message sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

//! Core data models used throughout Hriday Mitra.
//!
//! These types represent the knowledge base records, conversation turns,
//! match results, and user-visible notices that flow between the store,
//! the matcher, and the CLI / HTTP surfaces.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One stored question/answer pair.
///
/// Identity is positional: a record is addressed by its index in the
/// knowledge base, so deleting a record shifts every record after it.
/// Field order here is the key order written to the backing file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqRecord {
    pub question: String,
    pub answer: String,
    /// Any other keys found in the file, written back unchanged after the
    /// two known fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FaqRecord {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            extra: Map::new(),
        }
    }
}

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One role-tagged message in a session transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Outcome of matching one query against the knowledge base.
///
/// `answer` is `None` when no stored question cleared the threshold. The
/// best score is reported either way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub answer: Option<String>,
    pub score: f64,
}

impl MatchResult {
    pub fn none() -> Self {
        Self {
            answer: None,
            score: 0.0,
        }
    }

    pub fn is_match(&self) -> bool {
        self.answer.is_some()
    }
}

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Error,
    Warning,
    Success,
}

/// A user-visible message produced while handling an interaction.
///
/// Core operations never print; they hand notices back and the surface
/// (terminal or HTTP) decides how to show them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Print notices to stderr, one per line, prefixed with their level.
pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        let tag = match notice.level {
            NoticeLevel::Error => "error",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Success => "ok",
        };
        eprintln!("[{}] {}", tag, notice.message);
    }
}

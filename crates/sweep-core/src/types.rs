use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot content is cut to this many characters in reports.
const SNAPSHOT_CONTENT_CHARS: usize = 100;

/// Runtime state of the Discord session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Attempting to establish or re-establish the gateway connection.
    Connecting,

    /// Fully connected — scans may proceed.
    Ready,

    /// Gateway dropped; reconnecting. Scans fail fast until recovery.
    Degraded,

    /// Shut down for good (process exit).
    Closed,
}

impl ConnectionState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ConnectionState::Ready)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Ready => write!(f, "ready"),
            ConnectionState::Degraded => write!(f, "degraded"),
            ConnectionState::Closed => write!(f, "closed"),
        }
    }
}

/// The three text fields a message must contain to be deleted.
///
/// Serialized verbatim as the `search_criteria` echo in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub product_name: String,
    pub sku: String,
    pub size: String,
}

impl SearchCriteria {
    /// Whether `msg` should be deleted.
    ///
    /// Only webhook/bot-authored messages qualify, and all three fields must
    /// appear as case-insensitive substrings somewhere in the message text
    /// (plain content or any embed).
    pub fn matches(&self, msg: &CandidateMessage) -> bool {
        if !msg.author_is_webhook {
            return false;
        }
        let haystack = msg.search_text().to_lowercase();
        [&self.product_name, &self.sku, &self.size]
            .iter()
            .all(|needle| haystack.contains(&needle.to_lowercase()))
    }
}

/// Read-only snapshot of a platform message, taken at fetch time.
///
/// Matching logic works on this type only — serenity's own message type never
/// leaves the store layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateMessage {
    pub message_id: u64,

    /// Plain text content.
    pub content: String,

    /// Human-readable author tag (e.g. "restock-monitor#0000").
    pub author: String,

    /// Posted via a webhook or by a bot account — the only deletable kind.
    pub author_is_webhook: bool,

    /// RFC 3339 timestamp of when the message was posted.
    pub timestamp: String,

    /// Embed titles, descriptions, and field name/value pairs. Restock
    /// monitors usually put the product details here rather than in content.
    #[serde(default)]
    pub embed_text: Vec<String>,
}

impl CandidateMessage {
    /// All text the criteria are matched against.
    pub fn search_text(&self) -> String {
        if self.embed_text.is_empty() {
            return self.content.clone();
        }
        let mut text = self.content.clone();
        for chunk in &self.embed_text {
            text.push('\n');
            text.push_str(chunk);
        }
        text
    }

    /// Wire snapshot for the report, captured before deletion.
    pub fn snapshot(&self) -> DeletedMessage {
        DeletedMessage {
            message_id: self.message_id,
            content: truncate_content(&self.content),
            author: self.author.clone(),
            timestamp: self.timestamp.clone(),
        }
    }
}

fn truncate_content(content: &str) -> String {
    if content.chars().count() <= SNAPSHOT_CONTENT_CHARS {
        return content.to_string();
    }
    let cut: String = content.chars().take(SNAPSHOT_CONTENT_CHARS).collect();
    format!("{}...", cut)
}

/// One deleted message as reported to the HTTP caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedMessage {
    pub message_id: u64,
    pub content: String,
    pub author: String,
    pub timestamp: String,
}

/// Structured result of one deletion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionReport {
    pub success: bool,
    pub deleted_count: u32,
    pub messages_checked: u32,
    pub deleted_messages: Vec<DeletedMessage>,
    pub search_criteria: SearchCriteria,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeletionReport {
    /// A failure report with zeroed counts — used when the scan never ran.
    pub fn failure(criteria: SearchCriteria, error: impl Into<String>) -> Self {
        Self {
            success: false,
            deleted_count: 0,
            messages_checked: 0,
            deleted_messages: Vec::new(),
            search_criteria: criteria,
            error: Some(error.into()),
        }
    }
}

//! Database schema and record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// SQL schema for initialization
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    chat_id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL,
    node_id TEXT NOT NULL,
    message_id INTEGER,
    message_text TEXT NOT NULL,
    attributes TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS votes (
    chat_id TEXT NOT NULL,
    message_id INTEGER NOT NULL,
    vote TEXT NOT NULL,
    created_at TEXT NOT NULL,

    PRIMARY KEY (chat_id, message_id)
);

CREATE TABLE IF NOT EXISTS feedback (
    session_id TEXT NOT NULL,
    chat_id TEXT NOT NULL,
    topic_id TEXT NOT NULL,
    vote TEXT NOT NULL,
    created_at TEXT NOT NULL,

    PRIMARY KEY (session_id, chat_id)
);
"#;

/// Per-chat conversation state.
///
/// The only mutable state in the system: nodes are immutable configuration,
/// everything a conversation accumulates lives here. `session_id` changes on
/// every new conversation and guards conditional writes against stale
/// concurrent updates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub chat_id: String,
    pub session_id: String,
    /// Id of the node currently waiting for input. Must resolve in the
    /// node registry for as long as the session exists.
    pub node_id: String,
    /// Telegram id of the last prompt we sent, if any.
    pub message_id: Option<i64>,
    /// Text of the last prompt as the platform echoed it back.
    pub message_text: String,
    /// Free-form attribute bag; the only cross-node communication channel.
    pub attributes: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a fresh session for a chat. The node id and message fields are
    /// filled in once the first prompt has actually been delivered.
    pub fn start(chat_id: impl Into<String>, node_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            chat_id: chat_id.into(),
            session_id: uuid::Uuid::new_v4().to_string(),
            node_id: node_id.into(),
            message_id: None,
            message_text: String::new(),
            attributes: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }
}

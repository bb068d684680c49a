//! Trait abstractions for the engine's external collaborators
//!
//! The engine only sees these seams; production adapters over the database
//! and the Bot API live at the bottom of this file, mocks in `testing`.

use crate::db::Session;
use crate::municipality::Municipality;
use crate::telegram::{EditMessage, SendMessage, SentMessage, TransportError};
use crate::topics::ClassifyError;
use async_trait::async_trait;

/// Storage for per-chat conversation sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the session for a chat, if any
    async fn load(&self, chat_id: &str) -> Result<Option<Session>, String>;

    /// Persist a newly started session
    async fn create(&self, session: &Session) -> Result<(), String>;

    /// Persist a session after a transition; conditional on the stored
    /// session id still matching, to reject stale concurrent writes
    async fn update(&self, session: &Session) -> Result<(), String>;

    /// Remove a finished session; conditional on the session id matching
    async fn delete(&self, session: &Session) -> Result<(), String>;

    /// Remove whatever session a chat has (the /reset path)
    async fn delete_for_chat(&self, chat_id: &str) -> Result<(), String>;
}

/// Outbound message delivery
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Deliver a new message; returns the platform's view of it
    async fn send(&self, message: &SendMessage) -> Result<SentMessage, TransportError>;

    /// Edit a previously delivered message
    async fn edit(&self, message: &EditMessage) -> Result<(), TransportError>;
}

/// Maps free text onto the fixed topic label set
#[async_trait]
pub trait TopicClassifier: Send + Sync {
    /// Deterministic for a given model snapshot; returns a label from the
    /// fixed set or fails
    async fn classify(&self, text: &str) -> Result<String, ClassifyError>;
}

/// Postal-code → municipality lookup table
pub trait MunicipalityLookup: Send + Sync {
    fn lookup(&self, postal_code: &str) -> Option<Municipality>;
}

/// Audit log for votes on individual answers
#[async_trait]
pub trait VoteSink: Send + Sync {
    async fn save_vote(&self, chat_id: &str, message_id: i64, vote: &str) -> Result<(), String>;
}

/// Audit log for end-of-conversation feedback
#[async_trait]
pub trait FeedbackSink: Send + Sync {
    async fn save_feedback(
        &self,
        chat_id: &str,
        session_id: &str,
        topic_id: &str,
        vote: &str,
    ) -> Result<(), String>;
}

// ============================================================================
// Production Adapters
// ============================================================================

use crate::db::Database;

/// Adapter to use [`Database`] as the session store
#[derive(Clone)]
pub struct DatabaseSessions {
    db: Database,
}

impl DatabaseSessions {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for DatabaseSessions {
    async fn load(&self, chat_id: &str) -> Result<Option<Session>, String> {
        self.db.get_session(chat_id).map_err(|e| e.to_string())
    }

    async fn create(&self, session: &Session) -> Result<(), String> {
        self.db.insert_session(session).map_err(|e| e.to_string())
    }

    async fn update(&self, session: &Session) -> Result<(), String> {
        self.db.update_session(session).map_err(|e| e.to_string())
    }

    async fn delete(&self, session: &Session) -> Result<(), String> {
        self.db.delete_session(session).map_err(|e| e.to_string())
    }

    async fn delete_for_chat(&self, chat_id: &str) -> Result<(), String> {
        self.db
            .delete_session_for_chat(chat_id)
            .map_err(|e| e.to_string())
    }
}

/// Adapter to use [`Database`] as both audit sinks
#[derive(Clone)]
pub struct DatabaseAudit {
    db: Database,
}

impl DatabaseAudit {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VoteSink for DatabaseAudit {
    async fn save_vote(&self, chat_id: &str, message_id: i64, vote: &str) -> Result<(), String> {
        self.db
            .save_vote(chat_id, message_id, vote)
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl FeedbackSink for DatabaseAudit {
    async fn save_feedback(
        &self,
        chat_id: &str,
        session_id: &str,
        topic_id: &str,
        vote: &str,
    ) -> Result<(), String> {
        self.db
            .save_feedback(chat_id, session_id, topic_id, vote)
            .map_err(|e| e.to_string())
    }
}

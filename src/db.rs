//! Persistence for sessions and the vote/feedback audit log.
//!
//! Thin wrappers over SQLite; none of this contains decision logic.

mod schema;

pub use schema::*;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Stale session for chat {0}: session id did not match")]
    StaleSession(String),
    #[error("Refusing to persist incomplete session for chat {0}: {1}")]
    IncompleteSession(String, &'static str),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used by tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Session Operations ====================

    /// Get the session for a chat, if one exists
    pub fn get_session(&self, chat_id: &str) -> DbResult<Option<Session>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT chat_id, session_id, node_id, message_id, message_text, attributes, created_at, updated_at
             FROM sessions WHERE chat_id = ?1",
        )?;

        let mut rows = stmt.query_map(params![chat_id], |row| {
            Ok(Session {
                chat_id: row.get(0)?,
                session_id: row.get(1)?,
                node_id: row.get(2)?,
                message_id: row.get(3)?,
                message_text: row.get(4)?,
                attributes: parse_attributes(&row.get::<_, String>(5)?),
                created_at: parse_datetime(&row.get::<_, String>(6)?),
                updated_at: parse_datetime(&row.get::<_, String>(7)?),
            })
        })?;

        match rows.next() {
            Some(session) => Ok(Some(session?)),
            None => Ok(None),
        }
    }

    /// Insert a newly started session.
    ///
    /// A session is only persisted after its first prompt was delivered, so
    /// a missing message id or empty text means the caller skipped a step.
    pub fn insert_session(&self, session: &Session) -> DbResult<()> {
        if session.message_id.is_none() {
            return Err(DbError::IncompleteSession(
                session.chat_id.clone(),
                "no message id",
            ));
        }
        if session.message_text.is_empty() {
            return Err(DbError::IncompleteSession(
                session.chat_id.clone(),
                "empty message text",
            ));
        }

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO sessions (chat_id, session_id, node_id, message_id, message_text, attributes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                session.chat_id,
                session.session_id,
                session.node_id,
                session.message_id,
                session.message_text,
                attributes_to_json(&session.attributes),
                session.created_at.to_rfc3339(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Update a session, conditional on the stored session id still matching.
    ///
    /// A concurrent transition that replaced the session makes this a stale
    /// write, which is rejected rather than applied.
    pub fn update_session(&self, session: &Session) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE sessions
             SET node_id = ?1, message_id = ?2, message_text = ?3, attributes = ?4, updated_at = ?5
             WHERE chat_id = ?6 AND session_id = ?7",
            params![
                session.node_id,
                session.message_id,
                session.message_text,
                attributes_to_json(&session.attributes),
                Utc::now().to_rfc3339(),
                session.chat_id,
                session.session_id,
            ],
        )?;

        if updated == 0 {
            return Err(DbError::StaleSession(session.chat_id.clone()));
        }
        Ok(())
    }

    /// Delete a session, conditional on the stored session id still matching
    pub fn delete_session(&self, session: &Session) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM sessions WHERE chat_id = ?1 AND session_id = ?2",
            params![session.chat_id, session.session_id],
        )?;

        if deleted == 0 {
            return Err(DbError::StaleSession(session.chat_id.clone()));
        }
        Ok(())
    }

    /// Delete whatever session a chat has, unconditionally (the /reset path)
    pub fn delete_session_for_chat(&self, chat_id: &str) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM sessions WHERE chat_id = ?1", params![chat_id])?;
        Ok(())
    }

    // ==================== Audit Operations ====================

    /// Record a vote on a prompt message. Re-votes on the same message
    /// overwrite, so redelivered events stay idempotent.
    pub fn save_vote(&self, chat_id: &str, message_id: i64, vote: &str) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO votes (chat_id, message_id, vote, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (chat_id, message_id) DO UPDATE SET vote = excluded.vote",
            params![chat_id, message_id, vote, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Record end-of-conversation feedback
    pub fn save_feedback(
        &self,
        chat_id: &str,
        session_id: &str,
        topic_id: &str,
        vote: &str,
    ) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO feedback (session_id, chat_id, topic_id, vote, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (session_id, chat_id) DO UPDATE SET vote = excluded.vote, topic_id = excluded.topic_id",
            params![session_id, chat_id, topic_id, vote, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

fn attributes_to_json(attributes: &HashMap<String, String>) -> String {
    serde_json::to_string(attributes).unwrap_or_else(|_| "{}".to_string())
}

fn parse_attributes(s: &str) -> HashMap<String, String> {
    serde_json::from_str(s).unwrap_or_default()
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

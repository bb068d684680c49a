//! Webhook request and response types
//!
//! Inbound Telegram update shapes and their translation into the engine's
//! normalized message value.

use crate::engine::IncomingMessage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One webhook delivery from the platform
#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TgMessage>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

/// A user-authored message
#[derive(Debug, Deserialize)]
pub struct TgMessage {
    pub message_id: i64,
    #[serde(default)]
    pub text: Option<String>,
    pub chat: Chat,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
}

/// A button press on a message we sent earlier
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<TgMessage>,
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("update {0} carries neither a message nor a callback query")]
    UnknownShape(i64),
    #[error("message in update {0} has no text")]
    MissingText(i64),
    #[error("callback query {0} has no data")]
    MissingCallbackData(String),
    #[error("callback query {0} has no originating message")]
    MissingCallbackMessage(String),
}

impl Update {
    /// Normalize the platform event into the engine's message value
    pub fn into_incoming(self) -> Result<IncomingMessage, UpdateError> {
        if let Some(message) = self.message {
            let text = message.text.ok_or(UpdateError::MissingText(self.update_id))?;
            let mut incoming =
                IncomingMessage::text_message(message.chat.id.to_string(), first_name(&message.chat), text);
            incoming.message_id = Some(message.message_id);
            return Ok(incoming);
        }

        if let Some(callback) = self.callback_query {
            let data = callback
                .data
                .ok_or_else(|| UpdateError::MissingCallbackData(callback.id.clone()))?;
            let message = callback
                .message
                .ok_or(UpdateError::MissingCallbackMessage(callback.id))?;
            return Ok(IncomingMessage::callback(
                message.chat.id.to_string(),
                first_name(&message.chat),
                data,
            ));
        }

        Err(UpdateError::UnknownShape(self.update_id))
    }
}

fn first_name(chat: &Chat) -> String {
    chat.first_name.clone().unwrap_or_else(|| "there".to_string())
}

/// Body returned for every handled update
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub ok: bool,
}

/// Error envelope
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

//! Bot API payload types
//!
//! Wire shapes for `sendMessage` / `editMessageText`, translated from the
//! engine's transport-neutral prompts.

use crate::engine::{Button, Prompt};
use serde::{Deserialize, Serialize};

/// Outbound `sendMessage` call
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SendMessage {
    pub chat_id: String,
    pub text: String,
    pub reply_markup: ReplyMarkup,
}

impl SendMessage {
    pub fn from_prompt(chat_id: impl Into<String>, prompt: &Prompt) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: prompt.text.clone(),
            reply_markup: ReplyMarkup::from_rows(&prompt.rows),
        }
    }
}

/// Outbound `editMessageText` call
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EditMessage {
    pub chat_id: String,
    pub message_id: i64,
    pub text: String,
    pub reply_markup: ReplyMarkup,
}

impl EditMessage {
    /// Freeze a previously sent message: new text, no buttons
    pub fn locked(chat_id: impl Into<String>, message_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            message_id,
            text: text.into(),
            reply_markup: ReplyMarkup::empty(),
        }
    }
}

/// Inline keyboard attached to a message
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReplyMarkup {
    pub inline_keyboard: Vec<Vec<KeyboardButton>>,
}

impl ReplyMarkup {
    /// The platform requires an explicit empty row to clear a keyboard; a
    /// missing or zero-row array is rejected.
    pub fn empty() -> Self {
        Self {
            inline_keyboard: vec![vec![]],
        }
    }

    pub fn from_rows(rows: &[Vec<Button>]) -> Self {
        if rows.is_empty() {
            return Self::empty();
        }
        Self {
            inline_keyboard: rows
                .iter()
                .map(|row| row.iter().map(KeyboardButton::from_button).collect())
                .collect(),
        }
    }
}

/// Single inline keyboard button: either a callback or an external link
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct KeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl KeyboardButton {
    fn from_button(button: &Button) -> Self {
        match button {
            Button::Action { label, action } => Self {
                text: label.clone(),
                callback_data: Some(action.clone()),
                url: None,
            },
            Button::Link { label, url } => Self {
                text: label.clone(),
                callback_data: None,
                url: Some(url.clone()),
            },
        }
    }
}

/// The platform's view of a message we delivered
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SentMessage {
    pub message_id: i64,
    pub text: String,
}

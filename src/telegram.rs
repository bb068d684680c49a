//! Telegram transport layer
//!
//! Outbound Bot API client and the payload types shared with the engine.

mod client;
mod payload;

pub use client::{BotApi, TransportError};
pub use payload::{EditMessage, KeyboardButton, ReplyMarkup, SendMessage, SentMessage};

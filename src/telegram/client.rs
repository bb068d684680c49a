//! Bot API client
//!
//! Outbound half of the transport: delivers and edits messages over HTTPS.
//! Failures are surfaced to the driver, which abandons the transition; the
//! client itself never retries.

use super::payload::{EditMessage, SendMessage, SentMessage};
use crate::engine::traits::ChatTransport;
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const BASE_URL: &str = "https://api.telegram.org";

/// Transport error with the failing response attached where available
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("telegram request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("telegram returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("telegram rejected the call: {0}")]
    Rejected(String),
}

/// Telegram Bot API client
pub struct BotApi {
    client: Client,
    base_url: String,
}

impl BotApi {
    pub fn new(token: &str) -> Self {
        Self::with_base_url(token, BASE_URL)
    }

    /// Point the client at a different API host (tests, local bot server)
    pub fn with_base_url(token: &str, base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: format!("{}/bot{token}", base_url.trim_end_matches('/')),
        }
    }

    async fn call<B: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<R, TransportError> {
        let url = format!("{}/{method}", self.base_url);
        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: ApiEnvelope<R> = response.json().await?;
        if !envelope.ok {
            return Err(TransportError::Rejected(
                envelope
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            ));
        }
        envelope
            .result
            .ok_or_else(|| TransportError::Rejected("missing result".to_string()))
    }
}

#[async_trait]
impl ChatTransport for BotApi {
    async fn send(&self, message: &SendMessage) -> Result<SentMessage, TransportError> {
        let sent: ApiMessage = self.call("sendMessage", message).await?;
        Ok(SentMessage {
            message_id: sent.message_id,
            // Telegram echoes the delivered text back; fall back to what we
            // asked for if the field is absent.
            text: sent.text.unwrap_or_else(|| message.text.clone()),
        })
    }

    async fn edit(&self, message: &EditMessage) -> Result<(), TransportError> {
        let _: ApiMessage = self.call("editMessageText", message).await?;
        Ok(())
    }
}

/// Standard Bot API response envelope
#[derive(Debug, Deserialize)]
struct ApiEnvelope<R> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<R>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message_id: i64,
    #[serde(default)]
    text: Option<String>,
}

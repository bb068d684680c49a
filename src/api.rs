//! HTTP API: the webhook transport boundary

mod handlers;
mod types;

pub use handlers::create_router;
pub use types::{Update, UpdateError};

use crate::engine::ConversationDriver;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub driver: Arc<ConversationDriver>,
}

impl AppState {
    pub fn new(driver: Arc<ConversationDriver>) -> Self {
        Self { driver }
    }
}

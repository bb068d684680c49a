//! Engine error types

use crate::telegram::TransportError;
use crate::topics::ClassifyError;
use thiserror::Error;

/// Errors surfaced by the conversation driver.
///
/// Unknown node ids are hard failures with no runtime fallback; transport
/// failures abandon the transition so a redelivered event can retry it.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown node id: {0}")]
    UnknownNode(String),
    #[error("node {0} cannot render a prompt")]
    NotRenderable(String),
    #[error("no renderable node reached from {0}")]
    ResolutionExhausted(String),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error("session store: {0}")]
    SessionStore(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

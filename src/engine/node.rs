//! Node contract and shared types
//!
//! A node owns its presentation content, accepted-action set, normalization
//! rule, next-node computation, and close-time side effects. The variant set
//! is closed and known at registry-build time, so dispatch goes through one
//! enum rather than trait objects. Nodes are immutable after construction;
//! per-conversation state lives in the session alone.

use super::error::EngineError;
use super::feedback::FeedbackNode;
use super::options::OptionNode;
use super::postal::PostalLookupNode;
use super::topic::{TopicConfirmNode, TopicPredictionNode};
use crate::db::Session;

/// Session attribute keys the built-in and shipped declarative nodes use to
/// thread values between steps.
pub mod attrs {
    /// Written by topic prediction, read at feedback-close time.
    pub const TOPIC: &str = "topic";
    /// Written by the postal lookup node for every accepted code.
    pub const POSTAL_CODE: &str = "postal_code";
    /// Written by the postal lookup node on any successful resolution.
    pub const MUNICIPALITY_NAME: &str = "municipality_name";
    pub const MUNICIPALITY_LINK: &str = "municipality_link";
    /// Written only when the municipality has an adult-education link.
    pub const SERVICE_LINK: &str = "service_link";
}

/// Where a node sends the conversation once an action is handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The action was not understood; re-prompt without leaving the node.
    Repeat,
    /// The conversation is over; tear the session down.
    Home,
    /// Move to a concrete node.
    To(String),
}

/// How the incoming value reached us
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Typed message text.
    Text,
    /// Inline button press; the text is the button's action value.
    Callback,
}

/// Inbound message or button press, normalized by the transport layer
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub kind: ActionKind,
    pub chat_id: String,
    pub first_name: String,
    pub message_id: Option<i64>,
    pub text: String,
}

impl IncomingMessage {
    pub fn text_message(
        chat_id: impl Into<String>,
        first_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            kind: ActionKind::Text,
            chat_id: chat_id.into(),
            first_name: first_name.into(),
            message_id: None,
            text: text.into(),
        }
    }

    pub fn callback(
        chat_id: impl Into<String>,
        first_name: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            kind: ActionKind::Callback,
            chat_id: chat_id.into(),
            first_name: first_name.into(),
            message_id: None,
            text: action.into(),
        }
    }
}

/// A button in an inline keyboard row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Button {
    /// Presses echo `action` back through the transport. For generic nodes
    /// the action value is the target node id itself.
    Action { label: String, action: String },
    /// Opens an external URL; never a transition.
    Link { label: String, url: String },
}

impl Button {
    pub fn action(label: impl Into<String>, action: impl Into<String>) -> Self {
        Button::Action {
            label: label.into(),
            action: action.into(),
        }
    }

    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Button::Link {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// Content shown when a node becomes active
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub rows: Vec<Vec<Button>>,
}

impl Prompt {
    pub fn new(text: impl Into<String>, rows: Vec<Vec<Button>>) -> Self {
        Self {
            text: text.into(),
            rows,
        }
    }

    #[allow(dead_code)] // Constructor for API completeness
    pub fn text_only(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new())
    }
}

/// One step in the conversation graph.
///
/// The closed set of variants: a computed node (topic prediction), two
/// fixed-choice nodes (topic confirmation, feedback), and the two
/// data-driven node types authored in conversation definition files.
pub enum ChatNode {
    TopicPrediction(TopicPredictionNode),
    TopicConfirm(TopicConfirmNode),
    Feedback(FeedbackNode),
    Options(OptionNode),
    PostalLookup(PostalLookupNode),
}

impl ChatNode {
    /// Content to show when this node becomes active. `None` marks a node
    /// that never displays and only computes a transition.
    pub fn render(&self, session: &Session, message: &IncomingMessage, prefix: &str) -> Option<Prompt> {
        match self {
            ChatNode::TopicPrediction(_) => None,
            ChatNode::TopicConfirm(node) => Some(node.render(message, prefix)),
            ChatNode::Feedback(node) => Some(node.render(message, prefix)),
            ChatNode::Options(node) => Some(node.render(session, prefix)),
            ChatNode::PostalLookup(node) => Some(node.render(session, prefix)),
        }
    }

    /// Replacement text for the previous prompt once this node closes, or
    /// `None` when the previous message should stay untouched. The keyboard
    /// is always stripped by the edit itself.
    pub fn locked_render(&self, session: &Session, raw: &str) -> Option<String> {
        let action = self.normalize(raw.trim());
        match self {
            ChatNode::TopicPrediction(_) => None,
            ChatNode::TopicConfirm(node) => Some(node.locked_render(session, &action)),
            ChatNode::Feedback(node) => Some(node.locked_render(session, &action)),
            ChatNode::Options(node) => Some(node.locked_render(session, &action)),
            ChatNode::PostalLookup(node) => Some(node.locked_render(session, &action)),
        }
    }

    /// Node-specific canonicalization of raw input text
    pub fn normalize(&self, raw: &str) -> String {
        match self {
            ChatNode::TopicPrediction(_) => raw.to_string(),
            ChatNode::TopicConfirm(node) => node.normalize(raw),
            ChatNode::Feedback(node) => node.normalize(raw),
            ChatNode::Options(node) => node.normalize(raw),
            ChatNode::PostalLookup(node) => node.normalize(raw),
        }
    }

    /// Whether the normalized action is valid input for this node
    pub fn is_expected(&self, action: &str) -> bool {
        match self {
            // Free text has no wrong answer.
            ChatNode::TopicPrediction(_) => true,
            ChatNode::TopicConfirm(node) => node.is_expected(action),
            ChatNode::Feedback(node) => node.is_expected(action),
            ChatNode::Options(node) => node.is_expected(action),
            ChatNode::PostalLookup(node) => node.is_expected(action),
        }
    }

    /// Normalize, validate, and compute the transition for an incoming
    /// message. Unexpected actions yield [`Transition::Repeat`] without
    /// touching the session.
    pub async fn next_state(
        &self,
        session: &mut Session,
        message: &IncomingMessage,
    ) -> Result<Transition, EngineError> {
        let action = self.normalize(message.text.trim());
        if !self.is_expected(&action) {
            return Ok(Transition::Repeat);
        }

        match self {
            ChatNode::TopicPrediction(node) => node.next(session, message).await,
            ChatNode::TopicConfirm(node) => Ok(node.next(&action)),
            ChatNode::Feedback(_) => Ok(Transition::Home),
            ChatNode::Options(node) => Ok(node.next(&action)),
            ChatNode::PostalLookup(node) => Ok(node.next(session, &action)),
        }
    }

    /// Side effect executed exactly once when this node is left. Runs after
    /// the next prompt was delivered; failures are logged, never fatal.
    pub async fn on_close(&self, session: &Session, message: &IncomingMessage) {
        let action = self.normalize(message.text.trim());
        match self {
            ChatNode::TopicPrediction(_) | ChatNode::Options(_) | ChatNode::PostalLookup(_) => {}
            ChatNode::TopicConfirm(node) => node.on_close(session, &action).await,
            ChatNode::Feedback(node) => node.on_close(session, &action).await,
        }
    }
}

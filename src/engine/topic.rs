//! Topic prediction and confirmation nodes

use super::error::EngineError;
use super::node::{attrs, Button, IncomingMessage, Prompt, Transition};
use super::traits::{TopicClassifier, VoteSink};
use crate::db::Session;
use std::sync::Arc;

pub const GOOD_ANSWER: &str = "good_answer";
pub const BAD_ANSWER: &str = "bad_answer";

/// Registry id of the confirmation node for a topic
pub fn confirm_node_id(topic: &str) -> String {
    format!("check_topic_prediction_{topic}")
}

/// Registry id of the first content node for a topic
pub fn head_node_id(topic: &str) -> String {
    format!("head_topic_{topic}")
}

/// Where a rejected topic prediction sends the conversation.
///
/// Both behaviors exist in deployed configurations; which one runs is a
/// deployment choice, not node logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectTarget {
    /// Back to a topic-selection node.
    Reselect(String),
    /// End the conversation.
    Home,
}

/// Computed node: classifies the message text and routes to the matching
/// confirmation node. Never renders.
pub struct TopicPredictionNode {
    classifier: Arc<dyn TopicClassifier>,
}

impl TopicPredictionNode {
    pub fn new(classifier: Arc<dyn TopicClassifier>) -> Self {
        Self { classifier }
    }

    pub(crate) async fn next(
        &self,
        session: &mut Session,
        message: &IncomingMessage,
    ) -> Result<Transition, EngineError> {
        let topic = self.classifier.classify(&message.text).await?;
        session.set_attr(attrs::TOPIC, &topic);
        Ok(Transition::To(confirm_node_id(&topic)))
    }
}

/// Fixed-choice node asking the user to confirm a predicted topic
pub struct TopicConfirmNode {
    topic: String,
    reject_target: RejectTarget,
    votes: Arc<dyn VoteSink>,
}

impl TopicConfirmNode {
    pub fn new(
        topic: impl Into<String>,
        reject_target: RejectTarget,
        votes: Arc<dyn VoteSink>,
    ) -> Self {
        Self {
            topic: topic.into(),
            reject_target,
            votes,
        }
    }

    pub(crate) fn render(&self, message: &IncomingMessage, prefix: &str) -> Prompt {
        Prompt::new(
            format!(
                "{prefix}{}, you want to talk about: {}",
                message.first_name, self.topic
            ),
            vec![vec![
                Button::action("\u{1F44D}", GOOD_ANSWER),
                Button::action("\u{1F44E}", BAD_ANSWER),
            ]],
        )
    }

    pub(crate) fn locked_render(&self, session: &Session, action: &str) -> String {
        let vote = match action {
            GOOD_ANSWER => "\u{1F44D}",
            BAD_ANSWER => "\u{1F44E}",
            other => other,
        };
        format!("{}\n\nYou voted as {vote}", session.message_text)
    }

    pub(crate) fn normalize(&self, raw: &str) -> String {
        match raw.to_lowercase().as_str() {
            "yes" => GOOD_ANSWER.to_string(),
            "no" => BAD_ANSWER.to_string(),
            _ => raw.to_string(),
        }
    }

    pub(crate) fn is_expected(&self, action: &str) -> bool {
        action == GOOD_ANSWER || action == BAD_ANSWER
    }

    pub(crate) fn next(&self, action: &str) -> Transition {
        if action == GOOD_ANSWER {
            return Transition::To(head_node_id(&self.topic));
        }
        match &self.reject_target {
            RejectTarget::Reselect(node_id) => Transition::To(node_id.clone()),
            RejectTarget::Home => Transition::Home,
        }
    }

    pub(crate) async fn on_close(&self, session: &Session, action: &str) {
        let Some(message_id) = session.message_id else {
            tracing::warn!(chat_id = %session.chat_id, "No message id on session, skipping vote");
            return;
        };
        if let Err(error) = self.votes.save_vote(&session.chat_id, message_id, action).await {
            tracing::error!(chat_id = %session.chat_id, %error, "Failed to save vote");
        }
    }
}

//! End-of-conversation feedback node

use super::node::{attrs, Button, IncomingMessage, Prompt};
use super::traits::FeedbackSink;
use crate::db::Session;
use std::sync::Arc;

pub const GOOD_CONVERSATION: &str = "good_conversation";
pub const NORMAL_CONVERSATION: &str = "normal_conversation";
pub const BAD_CONVERSATION: &str = "bad_conversation";

/// Fixed-choice node collecting a rating for the finished conversation.
/// Closing always returns home.
pub struct FeedbackNode {
    feedback: Arc<dyn FeedbackSink>,
}

impl FeedbackNode {
    pub fn new(feedback: Arc<dyn FeedbackSink>) -> Self {
        Self { feedback }
    }

    pub(crate) fn render(&self, message: &IncomingMessage, prefix: &str) -> Prompt {
        Prompt::new(
            format!("{prefix}{}, how was it?", message.first_name),
            vec![vec![
                Button::action("\u{1F641}", BAD_CONVERSATION),
                Button::action("\u{1F610}", NORMAL_CONVERSATION),
                Button::action("\u{1F642}", GOOD_CONVERSATION),
            ]],
        )
    }

    pub(crate) fn locked_render(&self, session: &Session, action: &str) -> String {
        let vote = match action {
            BAD_CONVERSATION => "\u{1F641}",
            NORMAL_CONVERSATION => "\u{1F610}",
            GOOD_CONVERSATION => "\u{1F642}",
            other => other,
        };
        format!("{}\n\nYou voted as {vote}", session.message_text)
    }

    pub(crate) fn normalize(&self, raw: &str) -> String {
        match raw.to_lowercase().as_str() {
            "good" | "perfect" => GOOD_CONVERSATION.to_string(),
            "ok" => NORMAL_CONVERSATION.to_string(),
            "terrible" | "bad" => BAD_CONVERSATION.to_string(),
            _ => raw.to_string(),
        }
    }

    pub(crate) fn is_expected(&self, action: &str) -> bool {
        matches!(
            action,
            GOOD_CONVERSATION | NORMAL_CONVERSATION | BAD_CONVERSATION
        )
    }

    pub(crate) async fn on_close(&self, session: &Session, action: &str) {
        // The topic attribute is written by the prediction node; a
        // conversation that never passed through it has nothing to key the
        // feedback on, so the record is skipped rather than failing the
        // transition.
        let Some(topic) = session.attr(attrs::TOPIC) else {
            tracing::warn!(
                chat_id = %session.chat_id,
                "No topic attribute on session, skipping feedback"
            );
            return;
        };
        if let Err(error) = self
            .feedback
            .save_feedback(&session.chat_id, &session.session_id, topic, action)
            .await
        {
            tracing::error!(chat_id = %session.chat_id, %error, "Failed to save feedback");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::RecordingAudit;

    fn node_with_audit() -> (FeedbackNode, Arc<RecordingAudit>) {
        let audit = Arc::new(RecordingAudit::new());
        (FeedbackNode::new(audit.clone()), audit)
    }

    #[test]
    fn test_synonyms_normalize_to_canonical_actions() {
        let (node, _) = node_with_audit();
        assert_eq!(node.normalize("good"), GOOD_CONVERSATION);
        assert_eq!(node.normalize("Perfect"), GOOD_CONVERSATION);
        assert_eq!(node.normalize("OK"), NORMAL_CONVERSATION);
        assert_eq!(node.normalize("terrible"), BAD_CONVERSATION);
        assert_eq!(node.normalize("bad"), BAD_CONVERSATION);
        assert_eq!(node.normalize("meh"), "meh");
        assert!(!node.is_expected("meh"));
    }

    #[test]
    fn test_render_offers_one_button_per_action() {
        let (node, _) = node_with_audit();
        let message = IncomingMessage::text_message("42", "Anna", "anything");
        let prompt = node.render(&message, "");

        assert_eq!(prompt.text, "Anna, how was it?");
        assert_eq!(prompt.rows.len(), 1);
        let actions: Vec<_> = prompt.rows[0]
            .iter()
            .map(|button| match button {
                Button::Action { action, .. } => action.as_str(),
                Button::Link { .. } => panic!("feedback node has no links"),
            })
            .collect();
        assert_eq!(
            actions,
            vec![BAD_CONVERSATION, NORMAL_CONVERSATION, GOOD_CONVERSATION]
        );
    }

    #[tokio::test]
    async fn test_close_persists_feedback_keyed_by_topic() {
        let (node, audit) = node_with_audit();
        let mut session = Session::start("42", "feedback");
        session.set_attr(attrs::TOPIC, "bank");

        node.on_close(&session, GOOD_CONVERSATION).await;

        let records = audit.feedback();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, "42");
        assert_eq!(records[0].1, session.session_id);
        assert_eq!(records[0].2, "bank");
        assert_eq!(records[0].3, GOOD_CONVERSATION);
    }

    #[tokio::test]
    async fn test_close_without_topic_skips_feedback() {
        let (node, audit) = node_with_audit();
        let session = Session::start("42", "feedback");

        node.on_close(&session, GOOD_CONVERSATION).await;

        assert!(audit.feedback().is_empty());
    }
}

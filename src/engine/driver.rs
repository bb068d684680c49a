//! Conversation driver
//!
//! Orchestrates one transition per inbound event: look up the active node,
//! let it normalize and validate the action, deliver the next prompt, and
//! only after confirmed delivery run close hooks and persist the session.
//! A failed send leaves every piece of state exactly as it was, so a
//! redelivered event re-attempts the identical transition.

use super::error::EngineError;
use super::node::{ChatNode, IncomingMessage, Prompt, Transition};
use super::registry::NodeRegistry;
use super::traits::{ChatTransport, SessionStore};
use crate::db::Session;
use crate::telegram::{EditMessage, SendMessage};
use std::sync::Arc;

/// Commands handled outside the node graph
const SYSTEM_MESSAGES: [&str; 3] = ["/help", "/start", "/reset"];

/// Prefix for re-prompts after an unrecognized action
const REPEAT_PREFIX: &str = "Sorry, I didn't recognize your answer. Could you repeat?\n\n";

/// Upper bound on chained non-rendering nodes per transition; a longer
/// chain means the graph has a cycle of computed nodes.
const MAX_RESOLVE_HOPS: usize = 8;

/// What a call to [`ConversationDriver::advance`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// A new conversation started at the given node.
    Started { node_id: String },
    /// The session moved to the given node.
    Advanced { node_id: String },
    /// The action was not understood; the prompt was repeated.
    Repeated,
    /// The conversation finished and the session was deleted.
    Closed,
    /// Nothing to do (system message, or /reset without a session).
    Ignored,
}

/// Drives the conversation graph for one chat at a time
pub struct ConversationDriver {
    registry: Arc<NodeRegistry>,
    sessions: Arc<dyn SessionStore>,
    transport: Arc<dyn ChatTransport>,
    initial_node_id: String,
}

impl ConversationDriver {
    pub fn new(
        registry: Arc<NodeRegistry>,
        sessions: Arc<dyn SessionStore>,
        transport: Arc<dyn ChatTransport>,
        initial_node_id: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            sessions,
            transport,
            initial_node_id: initial_node_id.into(),
        }
    }

    /// Single entry point for the transport layer: apply one inbound
    /// message or button press to the chat's conversation.
    pub async fn advance(&self, message: &IncomingMessage) -> Result<AdvanceOutcome, EngineError> {
        let trimmed = message.text.trim();
        if SYSTEM_MESSAGES.contains(&trimmed) {
            return self.system_message(message, trimmed).await;
        }

        match self
            .sessions
            .load(&message.chat_id)
            .await
            .map_err(EngineError::SessionStore)?
        {
            None => self.start_conversation(message).await,
            Some(session) => self.step(session, message).await,
        }
    }

    async fn system_message(
        &self,
        message: &IncomingMessage,
        command: &str,
    ) -> Result<AdvanceOutcome, EngineError> {
        if command == "/reset" {
            self.sessions
                .delete_for_chat(&message.chat_id)
                .await
                .map_err(EngineError::SessionStore)?;
            tracing::info!(chat_id = %message.chat_id, "Session reset");
        }
        Ok(AdvanceOutcome::Ignored)
    }

    /// No session yet: seed the configured initial node, bootstrap through
    /// any purely computational nodes, and create the session only after
    /// the first prompt was delivered.
    async fn start_conversation(
        &self,
        message: &IncomingMessage,
    ) -> Result<AdvanceOutcome, EngineError> {
        let mut session = Session::start(&message.chat_id, &self.initial_node_id);

        let (node_id, prompt) = self
            .resolve_renderable(self.initial_node_id.clone(), &mut session, message)
            .await?;

        let sent = self.send(&message.chat_id, &prompt).await?;

        session.node_id = node_id.clone();
        session.message_id = Some(sent.message_id);
        session.message_text = sent.text;
        self.sessions
            .create(&session)
            .await
            .map_err(EngineError::SessionStore)?;

        tracing::info!(chat_id = %message.chat_id, node_id = %node_id, "Conversation started");
        Ok(AdvanceOutcome::Started { node_id })
    }

    async fn step(
        &self,
        session: Session,
        message: &IncomingMessage,
    ) -> Result<AdvanceOutcome, EngineError> {
        let mut session = session;
        let node = self
            .registry
            .get(&session.node_id)
            .ok_or_else(|| EngineError::UnknownNode(session.node_id.clone()))?;

        match node.next_state(&mut session, message).await? {
            Transition::Repeat => self.repeat(session, node, message).await,
            Transition::Home => self.go_home(session, node, message).await,
            Transition::To(next_id) => self.move_to(session, node, next_id, message).await,
        }
    }

    /// Unexpected action: re-send the active node's prompt with an apology
    /// and restore the previous message to its original content as the
    /// compensating edit. The node is not closed.
    async fn repeat(
        &self,
        mut session: Session,
        node: &ChatNode,
        message: &IncomingMessage,
    ) -> Result<AdvanceOutcome, EngineError> {
        let prompt = node
            .render(&session, message, REPEAT_PREFIX)
            .ok_or_else(|| EngineError::NotRenderable(session.node_id.clone()))?;

        let sent = self.send(&message.chat_id, &prompt).await?;

        if let Some(message_id) = session.message_id {
            let edit = EditMessage::locked(&session.chat_id, message_id, &session.message_text);
            if let Err(error) = self.transport.edit(&edit).await {
                tracing::warn!(chat_id = %session.chat_id, %error, "Failed to restore previous prompt");
            }
        }

        session.message_id = Some(sent.message_id);
        session.message_text = sent.text;
        self.sessions
            .update(&session)
            .await
            .map_err(EngineError::SessionStore)?;

        Ok(AdvanceOutcome::Repeated)
    }

    /// Terminal transition: close the active node, freeze its prompt, and
    /// delete the session.
    async fn go_home(
        &self,
        session: Session,
        node: &ChatNode,
        message: &IncomingMessage,
    ) -> Result<AdvanceOutcome, EngineError> {
        node.on_close(&session, message).await;
        self.lock_previous(&session, node, message).await;

        self.sessions
            .delete(&session)
            .await
            .map_err(EngineError::SessionStore)?;

        tracing::info!(chat_id = %session.chat_id, "Conversation closed");
        Ok(AdvanceOutcome::Closed)
    }

    async fn move_to(
        &self,
        mut session: Session,
        node: &ChatNode,
        next_id: String,
        message: &IncomingMessage,
    ) -> Result<AdvanceOutcome, EngineError> {
        let (next_id, prompt) = self
            .resolve_renderable(next_id, &mut session, message)
            .await?;

        let sent = self.send(&message.chat_id, &prompt).await?;

        // Delivery confirmed; now close the node we are leaving and freeze
        // its prompt before the session forgets the old message.
        node.on_close(&session, message).await;
        self.lock_previous(&session, node, message).await;

        session.node_id = next_id.clone();
        session.message_id = Some(sent.message_id);
        session.message_text = sent.text;
        self.sessions
            .update(&session)
            .await
            .map_err(EngineError::SessionStore)?;

        tracing::debug!(chat_id = %session.chat_id, node_id = %next_id, "Conversation advanced");
        Ok(AdvanceOutcome::Advanced { node_id: next_id })
    }

    /// Follow the graph from `node_id` through non-rendering nodes until
    /// one produces a prompt. Computed nodes consume the same incoming
    /// message they were reached with.
    async fn resolve_renderable(
        &self,
        node_id: String,
        session: &mut Session,
        message: &IncomingMessage,
    ) -> Result<(String, Prompt), EngineError> {
        let start_id = node_id;
        let mut node_id = start_id.clone();

        for _ in 0..MAX_RESOLVE_HOPS {
            let node = self
                .registry
                .get(&node_id)
                .ok_or_else(|| EngineError::UnknownNode(node_id.clone()))?;

            if let Some(prompt) = node.render(session, message, "") {
                return Ok((node_id, prompt));
            }

            match node.next_state(session, message).await? {
                Transition::To(next) => node_id = next,
                // A non-rendering node accepts every action, so neither
                // sentinel can legitimately come back here.
                Transition::Repeat | Transition::Home => {
                    return Err(EngineError::NotRenderable(node_id));
                }
            }
        }

        Err(EngineError::ResolutionExhausted(start_id))
    }

    async fn send(
        &self,
        chat_id: &str,
        prompt: &Prompt,
    ) -> Result<crate::telegram::SentMessage, EngineError> {
        let payload = SendMessage::from_prompt(chat_id, prompt);
        match self.transport.send(&payload).await {
            Ok(sent) => Ok(sent),
            Err(error) => {
                // Abandon the transition: nothing was persisted yet, so a
                // redelivered event retries from the same state.
                tracing::error!(chat_id = %chat_id, %error, "Failed to deliver prompt");
                Err(error.into())
            }
        }
    }

    async fn lock_previous(&self, session: &Session, node: &ChatNode, message: &IncomingMessage) {
        let Some(text) = node.locked_render(session, &message.text) else {
            return;
        };
        let Some(message_id) = session.message_id else {
            return;
        };
        let edit = EditMessage::locked(&session.chat_id, message_id, text);
        if let Err(error) = self.transport.edit(&edit).await {
            tracing::warn!(chat_id = %session.chat_id, %error, "Failed to freeze previous prompt");
        }
    }
}

//! Mock collaborators for testing
//!
//! These mocks enable driving full conversations without real I/O.

use super::driver::ConversationDriver;
use super::node::IncomingMessage;
use super::registry::{NodeDeps, NodeRegistry};
use super::topic::RejectTarget;
use super::traits::*;
use crate::db::Session;
use crate::municipality::Municipality;
use crate::telegram::{EditMessage, SendMessage, SentMessage, TransportError};
use crate::topics::ClassifyError;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

// ============================================================================
// Mock Transport
// ============================================================================

/// Transport that records every send/edit and can fail on demand
#[allow(dead_code)]
pub struct MockTransport {
    sends: Mutex<Vec<SendMessage>>,
    edits: Mutex<Vec<EditMessage>>,
    send_failures: Mutex<VecDeque<TransportError>>,
    next_message_id: Mutex<i64>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self {
            sends: Mutex::new(Vec::new()),
            edits: Mutex::new(Vec::new()),
            send_failures: Mutex::new(VecDeque::new()),
            next_message_id: Mutex::new(100),
        }
    }

    /// Make the next send fail with the given error
    pub fn queue_send_failure(&self, error: TransportError) {
        self.send_failures.lock().unwrap().push_back(error);
    }

    pub fn sent(&self) -> Vec<SendMessage> {
        self.sends.lock().unwrap().clone()
    }

    pub fn edited(&self) -> Vec<EditMessage> {
        self.edits.lock().unwrap().clone()
    }

    pub fn last_sent(&self) -> Option<SendMessage> {
        self.sends.lock().unwrap().last().cloned()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn send(&self, message: &SendMessage) -> Result<SentMessage, TransportError> {
        if let Some(error) = self.send_failures.lock().unwrap().pop_front() {
            return Err(error);
        }

        let mut id_guard = self.next_message_id.lock().unwrap();
        let message_id = *id_guard;
        *id_guard += 1;
        drop(id_guard);

        self.sends.lock().unwrap().push(message.clone());
        Ok(SentMessage {
            message_id,
            text: message.text.clone(),
        })
    }

    async fn edit(&self, message: &EditMessage) -> Result<(), TransportError> {
        self.edits.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// ============================================================================
// In-Memory Session Store
// ============================================================================

/// Session store backed by a map, with the same conditional-write
/// semantics as the database
#[allow(dead_code)]
pub struct InMemorySessions {
    sessions: Mutex<HashMap<String, Session>>,
}

#[allow(dead_code)]
impl InMemorySessions {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Put a session in place directly (test setup)
    pub fn seed(&self, session: Session) {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.chat_id.clone(), session);
    }

    pub fn snapshot(&self, chat_id: &str) -> Option<Session> {
        self.sessions.lock().unwrap().get(chat_id).cloned()
    }
}

impl Default for InMemorySessions {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessions {
    async fn load(&self, chat_id: &str) -> Result<Option<Session>, String> {
        Ok(self.snapshot(chat_id))
    }

    async fn create(&self, session: &Session) -> Result<(), String> {
        let mut sessions = self.sessions.lock().unwrap();
        if sessions.contains_key(&session.chat_id) {
            return Err(format!("session already exists for chat {}", session.chat_id));
        }
        sessions.insert(session.chat_id.clone(), session.clone());
        Ok(())
    }

    async fn update(&self, session: &Session) -> Result<(), String> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get(&session.chat_id) {
            Some(stored) if stored.session_id == session.session_id => {
                sessions.insert(session.chat_id.clone(), session.clone());
                Ok(())
            }
            _ => Err(format!("stale session for chat {}", session.chat_id)),
        }
    }

    async fn delete(&self, session: &Session) -> Result<(), String> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get(&session.chat_id) {
            Some(stored) if stored.session_id == session.session_id => {
                sessions.remove(&session.chat_id);
                Ok(())
            }
            _ => Err(format!("stale session for chat {}", session.chat_id)),
        }
    }

    async fn delete_for_chat(&self, chat_id: &str) -> Result<(), String> {
        self.sessions.lock().unwrap().remove(chat_id);
        Ok(())
    }
}

// ============================================================================
// Stub Classifier and Municipality Table
// ============================================================================

/// Classifier that always returns the same label, or always fails
#[allow(dead_code)]
pub struct StubClassifier {
    label: Option<String>,
}

#[allow(dead_code)]
impl StubClassifier {
    pub fn fixed(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }

    pub fn failing() -> Self {
        Self { label: None }
    }
}

#[async_trait]
impl TopicClassifier for StubClassifier {
    async fn classify(&self, _text: &str) -> Result<String, ClassifyError> {
        self.label.clone().ok_or(ClassifyError::Unmatched)
    }
}

/// Fixed postal-code table
#[allow(dead_code)]
pub struct StaticMunicipalities {
    by_code: HashMap<String, Municipality>,
}

#[allow(dead_code)]
impl StaticMunicipalities {
    pub fn new() -> Self {
        Self {
            by_code: HashMap::new(),
        }
    }

    pub fn with(mut self, code: impl Into<String>, municipality: Municipality) -> Self {
        self.by_code.insert(code.into(), municipality);
        self
    }
}

impl Default for StaticMunicipalities {
    fn default() -> Self {
        Self::new()
    }
}

impl MunicipalityLookup for StaticMunicipalities {
    fn lookup(&self, postal_code: &str) -> Option<Municipality> {
        self.by_code.get(postal_code).cloned()
    }
}

// ============================================================================
// Recording Audit Sinks
// ============================================================================

/// Vote and feedback sink that records everything it is handed
#[allow(dead_code)]
pub struct RecordingAudit {
    votes: Mutex<Vec<(String, i64, String)>>,
    feedback: Mutex<Vec<(String, String, String, String)>>,
}

#[allow(dead_code)]
impl RecordingAudit {
    pub fn new() -> Self {
        Self {
            votes: Mutex::new(Vec::new()),
            feedback: Mutex::new(Vec::new()),
        }
    }

    pub fn votes(&self) -> Vec<(String, i64, String)> {
        self.votes.lock().unwrap().clone()
    }

    pub fn feedback(&self) -> Vec<(String, String, String, String)> {
        self.feedback.lock().unwrap().clone()
    }
}

impl Default for RecordingAudit {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoteSink for RecordingAudit {
    async fn save_vote(&self, chat_id: &str, message_id: i64, vote: &str) -> Result<(), String> {
        self.votes
            .lock()
            .unwrap()
            .push((chat_id.to_string(), message_id, vote.to_string()));
        Ok(())
    }
}

#[async_trait]
impl FeedbackSink for RecordingAudit {
    async fn save_feedback(
        &self,
        chat_id: &str,
        session_id: &str,
        topic_id: &str,
        vote: &str,
    ) -> Result<(), String> {
        self.feedback.lock().unwrap().push((
            chat_id.to_string(),
            session_id.to_string(),
            topic_id.to_string(),
            vote.to_string(),
        ));
        Ok(())
    }
}

/// Collaborator set with inert defaults, for registry construction in tests
#[allow(dead_code)]
pub fn test_deps() -> NodeDeps {
    let audit = Arc::new(RecordingAudit::new());
    NodeDeps {
        classifier: Arc::new(StubClassifier::fixed("swedish")),
        municipalities: Arc::new(StaticMunicipalities::new()),
        votes: audit.clone(),
        feedback: audit,
    }
}

// ============================================================================
// Test Driver Builder
// ============================================================================

/// A driver wired to mocks, with handles kept for assertions
#[allow(dead_code)]
pub struct TestDriver {
    pub driver: ConversationDriver,
    pub transport: Arc<MockTransport>,
    pub sessions: Arc<InMemorySessions>,
    pub audit: Arc<RecordingAudit>,
}

#[allow(dead_code)]
impl TestDriver {
    pub fn builder() -> TestDriverBuilder {
        TestDriverBuilder::new()
    }
}

#[allow(dead_code)]
pub struct TestDriverBuilder {
    initial_node_id: String,
    reject_target: RejectTarget,
    flows: Vec<String>,
    classifier: Arc<dyn TopicClassifier>,
    municipalities: Arc<dyn MunicipalityLookup>,
}

#[allow(dead_code)]
impl TestDriverBuilder {
    pub fn new() -> Self {
        Self {
            initial_node_id: "static_topic".to_string(),
            reject_target: RejectTarget::Reselect("static_topic".to_string()),
            flows: Vec::new(),
            classifier: Arc::new(StubClassifier::fixed("swedish")),
            municipalities: Arc::new(StaticMunicipalities::new()),
        }
    }

    pub fn initial_node(mut self, node_id: impl Into<String>) -> Self {
        self.initial_node_id = node_id.into();
        self
    }

    pub fn reject_target(mut self, target: RejectTarget) -> Self {
        self.reject_target = target;
        self
    }

    pub fn flows(mut self, raw: impl Into<String>) -> Self {
        self.flows.push(raw.into());
        self
    }

    pub fn classifier(mut self, classifier: Arc<dyn TopicClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn municipalities(mut self, municipalities: StaticMunicipalities) -> Self {
        self.municipalities = Arc::new(municipalities);
        self
    }

    pub fn build(self) -> TestDriver {
        let transport = Arc::new(MockTransport::new());
        let sessions = Arc::new(InMemorySessions::new());
        let audit = Arc::new(RecordingAudit::new());

        let deps = NodeDeps {
            classifier: self.classifier,
            municipalities: self.municipalities,
            votes: audit.clone(),
            feedback: audit.clone(),
        };

        let mut registry = NodeRegistry::new(self.reject_target, &deps);
        for (index, raw) in self.flows.iter().enumerate() {
            registry
                .load_str(&format!("flows-{index}"), raw, &deps)
                .expect("test flows should parse");
        }

        let driver = ConversationDriver::new(
            Arc::new(registry),
            sessions.clone(),
            transport.clone(),
            self.initial_node_id,
        );

        TestDriver {
            driver,
            transport,
            sessions,
            audit,
        }
    }
}

impl Default for TestDriverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::driver::AdvanceOutcome;
    use crate::engine::node::attrs;
    use crate::engine::EngineError;
    use crate::topics::KeywordClassifier;

    /// Menu graph used across the driver tests.
    const TEST_FLOWS: &str = r#"{
        "static_topic": {
            "node_type": "option",
            "content": "What do you want to talk about?",
            "options": [
                [{"content": "Bank", "next_node_id": "head_topic_bank"}],
                [{"content": "Swedish", "next_node_id": "head_topic_swedish"}]
            ],
            "exit_node_id": "feedback",
            "exit_node_content": "I'm done"
        },
        "head_topic_bank": {
            "node_type": "option",
            "content": "Everything about banking in Sweden.",
            "links": [[{"content": "Bank guide", "url": "https://example.se/bank"}]],
            "options": [[{"content": "Done", "next_node_id": "feedback"}]]
        },
        "head_topic_swedish": {
            "node_type": "option",
            "content": "Everything about learning Swedish.",
            "options": [[{"content": "Done", "next_node_id": "feedback"}]]
        },
        "postal_lookup": {
            "node_type": "postal_lookup",
            "content": "Enter your postal code",
            "unknown_postal_node_id": "postal_unknown",
            "has_further_service_node_id": "postal_has_service",
            "no_further_service_node_id": "postal_no_service",
            "exit_node_id": "static_topic",
            "exit_node_content": "Back to topics"
        },
        "postal_unknown": {
            "node_type": "option",
            "content": "I don't know that postal code yet.",
            "options": [[{"content": "Try again", "next_node_id": "postal_lookup"}]]
        },
        "postal_has_service": {
            "node_type": "option",
            "content": "You live in <municipality_name>. Adult education: <service_link>",
            "options": [[{"content": "Done", "next_node_id": "feedback"}]]
        },
        "postal_no_service": {
            "node_type": "option",
            "content": "You live in <municipality_name>: <municipality_link>",
            "options": [[{"content": "Done", "next_node_id": "feedback"}]]
        }
    }"#;

    fn message(text: &str) -> IncomingMessage {
        IncomingMessage::text_message("42", "Anna", text)
    }

    /// A session as it would exist after a delivered prompt.
    fn session_at(node_id: &str) -> Session {
        let mut session = Session::start("42", node_id);
        session.message_id = Some(10);
        session.message_text = "Earlier prompt".to_string();
        session
    }

    fn solna() -> Municipality {
        Municipality {
            name: "Solna".to_string(),
            link: "https://www.solna.se".to_string(),
            service_link: Some("https://www.solna.se/vuxenutbildning".to_string()),
            postal_codes: vec!["16936".to_string()],
        }
    }

    #[tokio::test]
    async fn test_first_message_renders_the_initial_menu() {
        let harness = TestDriver::builder().flows(TEST_FLOWS).build();

        let outcome = harness.driver.advance(&message("hello")).await.unwrap();
        assert_eq!(
            outcome,
            AdvanceOutcome::Started {
                node_id: "static_topic".to_string()
            }
        );

        let session = harness.sessions.snapshot("42").unwrap();
        assert_eq!(session.node_id, "static_topic");
        assert_eq!(session.message_id, Some(100));
        assert_eq!(session.message_text, "What do you want to talk about?");

        // One inline button per option, action value = target node id.
        let sent = harness.transport.last_sent().unwrap();
        let first_row = &sent.reply_markup.inline_keyboard[0];
        assert_eq!(first_row[0].text, "Bank");
        assert_eq!(first_row[0].callback_data.as_deref(), Some("head_topic_bank"));
    }

    #[tokio::test]
    async fn test_prediction_bootstraps_to_confirmation_and_stashes_topic() {
        let harness = TestDriver::builder()
            .flows(TEST_FLOWS)
            .initial_node("make_topic_prediction")
            .classifier(Arc::new(KeywordClassifier::new()))
            .build();

        let outcome = harness
            .driver
            .advance(&message("I want to start SFI"))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            AdvanceOutcome::Started {
                node_id: "check_topic_prediction_swedish".to_string()
            }
        );

        let session = harness.sessions.snapshot("42").unwrap();
        assert_eq!(session.attr(attrs::TOPIC), Some("swedish"));

        let sent = harness.transport.last_sent().unwrap();
        assert_eq!(sent.text, "Anna, you want to talk about: swedish");
    }

    #[tokio::test]
    async fn test_confirmation_yes_advances_to_topic_head_and_saves_vote() {
        let harness = TestDriver::builder().flows(TEST_FLOWS).build();
        harness
            .sessions
            .seed(session_at("check_topic_prediction_swedish"));

        let outcome = harness.driver.advance(&message("yes")).await.unwrap();
        assert_eq!(
            outcome,
            AdvanceOutcome::Advanced {
                node_id: "head_topic_swedish".to_string()
            }
        );

        assert_eq!(
            harness.audit.votes(),
            vec![("42".to_string(), 10, "good_answer".to_string())]
        );

        // The confirmation prompt is frozen with the recorded vote.
        let edits = harness.transport.edited();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].message_id, 10);
        assert_eq!(edits[0].text, "Earlier prompt\n\nYou voted as \u{1F44D}");
        assert_eq!(edits[0].reply_markup.inline_keyboard, vec![Vec::new()]);
    }

    #[tokio::test]
    async fn test_confirmation_no_returns_to_topic_selection() {
        let harness = TestDriver::builder().flows(TEST_FLOWS).build();
        harness
            .sessions
            .seed(session_at("check_topic_prediction_swedish"));

        let outcome = harness.driver.advance(&message("no")).await.unwrap();
        assert_eq!(
            outcome,
            AdvanceOutcome::Advanced {
                node_id: "static_topic".to_string()
            }
        );
        assert_eq!(
            harness.audit.votes(),
            vec![("42".to_string(), 10, "bad_answer".to_string())]
        );
    }

    #[tokio::test]
    async fn test_unknown_postal_code_leaves_no_municipality_attributes() {
        let harness = TestDriver::builder().flows(TEST_FLOWS).build();
        harness.sessions.seed(session_at("postal_lookup"));

        let outcome = harness.driver.advance(&message("12345")).await.unwrap();
        assert_eq!(
            outcome,
            AdvanceOutcome::Advanced {
                node_id: "postal_unknown".to_string()
            }
        );

        let session = harness.sessions.snapshot("42").unwrap();
        assert_eq!(session.attr(attrs::POSTAL_CODE), Some("12345"));
        assert_eq!(session.attr(attrs::MUNICIPALITY_NAME), None);
        assert_eq!(session.attr(attrs::SERVICE_LINK), None);
    }

    #[tokio::test]
    async fn test_known_postal_code_substitutes_attributes_downstream() {
        let harness = TestDriver::builder()
            .flows(TEST_FLOWS)
            .municipalities(StaticMunicipalities::new().with("16936", solna()))
            .build();
        harness.sessions.seed(session_at("postal_lookup"));

        let outcome = harness.driver.advance(&message("169 36")).await.unwrap();
        assert_eq!(
            outcome,
            AdvanceOutcome::Advanced {
                node_id: "postal_has_service".to_string()
            }
        );

        let session = harness.sessions.snapshot("42").unwrap();
        assert_eq!(session.attr(attrs::MUNICIPALITY_NAME), Some("Solna"));
        assert_eq!(
            session.attr(attrs::MUNICIPALITY_LINK),
            Some("https://www.solna.se")
        );
        assert_eq!(
            session.attr(attrs::SERVICE_LINK),
            Some("https://www.solna.se/vuxenutbildning")
        );

        // The downstream node's template sees the freshly stashed values.
        let sent = harness.transport.last_sent().unwrap();
        assert_eq!(
            sent.text,
            "You live in Solna. Adult education: https://www.solna.se/vuxenutbildning"
        );
    }

    #[tokio::test]
    async fn test_typed_label_matches_button_value() {
        let harness = TestDriver::builder().flows(TEST_FLOWS).build();
        harness.sessions.seed(session_at("static_topic"));

        let outcome = harness.driver.advance(&message("bank")).await.unwrap();
        assert_eq!(
            outcome,
            AdvanceOutcome::Advanced {
                node_id: "head_topic_bank".to_string()
            }
        );

        let edits = harness.transport.edited();
        assert_eq!(edits[0].text, "Earlier prompt\n\nYour answer: Bank");
    }

    #[tokio::test]
    async fn test_unexpected_action_repeats_without_moving() {
        let harness = TestDriver::builder().flows(TEST_FLOWS).build();
        harness
            .sessions
            .seed(session_at("check_topic_prediction_swedish"));

        let outcome = harness
            .driver
            .advance(&message("tell me a joke"))
            .await
            .unwrap();
        assert_eq!(outcome, AdvanceOutcome::Repeated);

        let session = harness.sessions.snapshot("42").unwrap();
        assert_eq!(session.node_id, "check_topic_prediction_swedish");
        assert_eq!(session.message_id, Some(100));

        let sent = harness.transport.last_sent().unwrap();
        assert!(sent.text.starts_with("Sorry, I didn't recognize your answer."));

        // Compensating edit: the previous prompt is restored to its
        // original content, buttons removed.
        let edits = harness.transport.edited();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].message_id, 10);
        assert_eq!(edits[0].text, "Earlier prompt");

        // No close effects ran.
        assert!(harness.audit.votes().is_empty());
    }

    #[tokio::test]
    async fn test_feedback_close_deletes_session_and_records_feedback() {
        let harness = TestDriver::builder().flows(TEST_FLOWS).build();
        let mut session = session_at("feedback");
        session.set_attr(attrs::TOPIC, "bank");
        let session_id = session.session_id.clone();
        harness.sessions.seed(session);

        let outcome = harness.driver.advance(&message("good")).await.unwrap();
        assert_eq!(outcome, AdvanceOutcome::Closed);
        assert!(harness.sessions.snapshot("42").is_none());

        assert_eq!(
            harness.audit.feedback(),
            vec![(
                "42".to_string(),
                session_id,
                "bank".to_string(),
                "good_conversation".to_string()
            )]
        );

        let edits = harness.transport.edited();
        assert_eq!(edits[0].text, "Earlier prompt\n\nYou voted as \u{1F642}");
    }

    #[tokio::test]
    async fn test_feedback_without_topic_skips_record_but_still_closes() {
        let harness = TestDriver::builder().flows(TEST_FLOWS).build();
        harness.sessions.seed(session_at("feedback"));

        let outcome = harness.driver.advance(&message("good")).await.unwrap();
        assert_eq!(outcome, AdvanceOutcome::Closed);
        assert!(harness.audit.feedback().is_empty());
        assert!(harness.sessions.snapshot("42").is_none());
    }

    #[tokio::test]
    async fn test_failed_send_mutates_nothing() {
        let harness = TestDriver::builder().flows(TEST_FLOWS).build();
        let seeded = session_at("static_topic");
        harness.sessions.seed(seeded.clone());
        harness.transport.queue_send_failure(TransportError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        });

        let result = harness.driver.advance(&message("bank")).await;
        assert!(matches!(result, Err(EngineError::Transport(_))));

        // Session, previous message, and audit log are untouched.
        assert_eq!(harness.sessions.snapshot("42").unwrap(), seeded);
        assert!(harness.transport.edited().is_empty());
        assert!(harness.audit.votes().is_empty());
    }

    #[tokio::test]
    async fn test_replayed_event_produces_identical_outcome() {
        let harness = TestDriver::builder().flows(TEST_FLOWS).build();
        let seeded = session_at("static_topic");

        harness.sessions.seed(seeded.clone());
        let first = harness.driver.advance(&message("bank")).await.unwrap();
        let first_payload = harness.transport.last_sent().unwrap();

        // The platform redelivered the event against the same stored state.
        harness.sessions.seed(seeded);
        let second = harness.driver.advance(&message("bank")).await.unwrap();
        let second_payload = harness.transport.last_sent().unwrap();

        assert_eq!(first, second);
        assert_eq!(first_payload, second_payload);
    }

    #[tokio::test]
    async fn test_reset_deletes_the_session() {
        let harness = TestDriver::builder().flows(TEST_FLOWS).build();
        harness.sessions.seed(session_at("static_topic"));

        let outcome = harness.driver.advance(&message("/reset")).await.unwrap();
        assert_eq!(outcome, AdvanceOutcome::Ignored);
        assert!(harness.sessions.snapshot("42").is_none());
        assert!(harness.transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_other_system_messages_are_swallowed() {
        let harness = TestDriver::builder().flows(TEST_FLOWS).build();
        harness.sessions.seed(session_at("static_topic"));

        let outcome = harness.driver.advance(&message("/help")).await.unwrap();
        assert_eq!(outcome, AdvanceOutcome::Ignored);
        assert!(harness.sessions.snapshot("42").is_some());
    }

    #[tokio::test]
    async fn test_session_at_unknown_node_is_a_hard_error() {
        let harness = TestDriver::builder().flows(TEST_FLOWS).build();
        harness.sessions.seed(session_at("vanished_node"));

        let result = harness.driver.advance(&message("anything")).await;
        assert!(matches!(result, Err(EngineError::UnknownNode(id)) if id == "vanished_node"));
    }

    #[tokio::test]
    async fn test_failing_classifier_aborts_the_start() {
        let harness = TestDriver::builder()
            .flows(TEST_FLOWS)
            .initial_node("make_topic_prediction")
            .classifier(Arc::new(StubClassifier::failing()))
            .build();

        let result = harness.driver.advance(&message("hello")).await;
        assert!(matches!(result, Err(EngineError::Classify(_))));
        assert!(harness.sessions.snapshot("42").is_none());
    }
}

//! Declarative option node
//!
//! Data-driven branching: the node's entire transition table comes from a
//! conversation definition file. Labels resolve to target node ids, and the
//! target id doubles as the button's action value, so typed label text and
//! clicked buttons travel the same path.

use super::node::{Button, Prompt, Transition};
use crate::db::Session;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

/// Definition-file record for an option node
#[derive(Debug, Clone, Deserialize)]
pub struct OptionNodeDef {
    pub content: String,
    #[serde(default)]
    pub links: Vec<Vec<LinkDef>>,
    #[serde(default)]
    pub options: Vec<Vec<OptionDef>>,
    #[serde(default)]
    pub exit_node_id: Option<String>,
    #[serde(default)]
    pub exit_node_content: Option<String>,
}

/// A link button: label plus external URL, never a transition
#[derive(Debug, Clone, Deserialize)]
pub struct LinkDef {
    pub content: String,
    pub url: String,
}

/// An option button: label plus the node it transitions to
#[derive(Debug, Clone, Deserialize)]
pub struct OptionDef {
    pub content: String,
    pub next_node_id: String,
}

/// The reserved free-text keyword for the exit shortcut
const EXIT_KEYWORD: &str = "exit";
const DEFAULT_EXIT_LABEL: &str = "Exit";

#[derive(Debug, Clone)]
pub(crate) struct ExitShortcut {
    pub target: String,
    pub label: String,
}

impl ExitShortcut {
    pub(crate) fn from_def(node_id: Option<String>, content: Option<String>) -> Option<Self> {
        node_id.map(|target| ExitShortcut {
            target,
            label: content.unwrap_or_else(|| DEFAULT_EXIT_LABEL.to_string()),
        })
    }
}

/// Replace every `<key>` token in the template with the session attribute
/// value, where present. Unknown tokens are left as-is.
pub(crate) fn apply_session_params(template: &str, session: &Session) -> String {
    let mut text = template.to_string();
    for (key, value) in &session.attributes {
        text = text.replace(&format!("<{key}>"), value);
    }
    text
}

/// Declarative branching node built from an [`OptionNodeDef`]
pub struct OptionNode {
    content: String,
    links: Vec<Vec<LinkDef>>,
    options: Vec<Vec<OptionDef>>,
    exit: Option<ExitShortcut>,
    /// Lower-cased label → target node id.
    actions: HashMap<String, String>,
    /// Every id this node can transition to.
    targets: HashSet<String>,
}

impl OptionNode {
    pub fn new(def: OptionNodeDef) -> Self {
        let exit = ExitShortcut::from_def(def.exit_node_id, def.exit_node_content);

        let mut actions = HashMap::new();
        let mut targets = HashSet::new();
        for option in def.options.iter().flatten() {
            actions.insert(option.content.to_lowercase(), option.next_node_id.clone());
            targets.insert(option.next_node_id.clone());
        }
        if let Some(exit) = &exit {
            actions.insert(EXIT_KEYWORD.to_string(), exit.target.clone());
            actions.insert(exit.label.to_lowercase(), exit.target.clone());
            targets.insert(exit.target.clone());
        }

        Self {
            content: def.content,
            links: def.links,
            options: def.options,
            exit,
            actions,
            targets,
        }
    }

    fn label_for(&self, target: &str) -> Option<&str> {
        self.options
            .iter()
            .flatten()
            .find(|option| option.next_node_id == target)
            .map(|option| option.content.as_str())
    }

    fn is_exit(&self, action: &str) -> bool {
        self.exit
            .as_ref()
            .is_some_and(|exit| exit.target == action)
    }

    pub(crate) fn render(&self, session: &Session, prefix: &str) -> Prompt {
        let text = format!("{prefix}{}", apply_session_params(&self.content, session));

        // Link rows first, option rows below, exit shortcut last.
        let mut rows: Vec<Vec<Button>> = Vec::new();
        for row in &self.links {
            rows.push(
                row.iter()
                    .map(|link| Button::link(&link.content, &link.url))
                    .collect(),
            );
        }
        for row in &self.options {
            rows.push(
                row.iter()
                    .map(|option| Button::action(&option.content, &option.next_node_id))
                    .collect(),
            );
        }
        if let Some(exit) = &self.exit {
            rows.push(vec![Button::action(&exit.label, &exit.target)]);
        }

        Prompt::new(text, rows)
    }

    pub(crate) fn locked_render(&self, session: &Session, action: &str) -> String {
        if self.is_exit(action) {
            return session.message_text.clone();
        }
        let label = self.label_for(action).unwrap_or(action);
        format!("{}\n\nYour answer: {label}", session.message_text)
    }

    pub(crate) fn normalize(&self, raw: &str) -> String {
        match self.actions.get(&raw.to_lowercase()) {
            Some(target) => target.clone(),
            None => raw.to_string(),
        }
    }

    pub(crate) fn is_expected(&self, action: &str) -> bool {
        self.targets.contains(action)
    }

    /// The normalized value is a target node id by construction; all the
    /// branching lives in the option table.
    pub(crate) fn next(&self, action: &str) -> Transition {
        Transition::To(action.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def_from_json(raw: &str) -> OptionNodeDef {
        serde_json::from_str(raw).unwrap()
    }

    fn bank_menu() -> OptionNode {
        OptionNode::new(def_from_json(
            r#"{
                "content": "Hi <name>! What do you want to talk about?",
                "links": [[{"content": "About us", "url": "https://example.se"}]],
                "options": [[{"content": "Bank", "next_node_id": "head_topic_bank"}]],
                "exit_node_id": "feedback",
                "exit_node_content": "I'm done"
            }"#,
        ))
    }

    #[test]
    fn test_labels_resolve_case_insensitively() {
        let node = bank_menu();
        assert_eq!(node.normalize("bank"), "head_topic_bank");
        assert_eq!(node.normalize("BANK"), "head_topic_bank");
        // A clicked button echoes the target id, which resolves to itself.
        assert_eq!(node.normalize("head_topic_bank"), "head_topic_bank");
        assert!(node.is_expected("head_topic_bank"));
    }

    #[test]
    fn test_exit_keyword_and_label_resolve_to_exit_target() {
        let node = bank_menu();
        assert_eq!(node.normalize("exit"), "feedback");
        assert_eq!(node.normalize("Exit"), "feedback");
        assert_eq!(node.normalize("i'm done"), "feedback");
        assert!(node.is_expected("feedback"));
    }

    #[test]
    fn test_arbitrary_text_is_rejected() {
        let node = bank_menu();
        let normalized = node.normalize("tell me a joke");
        assert_eq!(normalized, "tell me a joke");
        assert!(!node.is_expected(&normalized));
    }

    #[test]
    fn test_empty_option_table_rejects_everything() {
        let node = OptionNode::new(def_from_json(r#"{"content": "Bye!"}"#));
        for input in ["exit", "yes", "", "head_topic_bank"] {
            assert!(!node.is_expected(&node.normalize(input)), "accepted {input:?}");
        }
    }

    #[test]
    fn test_render_substitutes_attributes_and_orders_rows() {
        let node = bank_menu();
        let mut session = Session::start("42", "static_topic");
        session.set_attr("name", "Anna");

        let prompt = node.render(&session, "");
        assert_eq!(prompt.text, "Hi Anna! What do you want to talk about?");
        assert_eq!(prompt.rows.len(), 3);
        assert!(matches!(&prompt.rows[0][0], Button::Link { url, .. } if url == "https://example.se"));
        assert!(
            matches!(&prompt.rows[1][0], Button::Action { label, action } if label == "Bank" && action == "head_topic_bank")
        );
        assert!(matches!(&prompt.rows[2][0], Button::Action { label, .. } if label == "I'm done"));
    }

    #[test]
    fn test_unset_attribute_tokens_are_left_alone() {
        let node = bank_menu();
        let session = Session::start("42", "static_topic");
        let prompt = node.render(&session, "");
        assert_eq!(prompt.text, "Hi <name>! What do you want to talk about?");
    }

    #[test]
    fn test_next_is_identity_on_the_normalized_value(){
        let node = bank_menu();
        assert_eq!(
            node.next("head_topic_bank"),
            Transition::To("head_topic_bank".to_string())
        );
    }

    #[test]
    fn test_locked_render_echoes_answer_except_for_exit() {
        let node = bank_menu();
        let mut session = Session::start("42", "static_topic");
        session.message_text = "What do you want to talk about?".to_string();

        assert_eq!(
            node.locked_render(&session, "head_topic_bank"),
            "What do you want to talk about?\n\nYour answer: Bank"
        );
        assert_eq!(
            node.locked_render(&session, "feedback"),
            "What do you want to talk about?"
        );
    }
}

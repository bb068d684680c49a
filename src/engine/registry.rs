//! Node registry and declarative conversation loading
//!
//! Built once at startup from the built-in nodes plus declarative
//! definition files, then read-only: the driver holds it behind an `Arc`
//! and looks nodes up by id on every transition.

use super::node::ChatNode;
use super::options::{OptionNode, OptionNodeDef};
use super::postal::{PostalLookupDef, PostalLookupNode};
use super::topic::{confirm_node_id, RejectTarget, TopicConfirmNode, TopicPredictionNode};
use super::feedback::FeedbackNode;
use super::traits::{FeedbackSink, MunicipalityLookup, TopicClassifier, VoteSink};
use crate::topics::TOPICS;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Fixed id of the topic-prediction entry node
pub const TOPIC_PREDICTION_NODE_ID: &str = "make_topic_prediction";
/// Fixed id of the feedback node
pub const FEEDBACK_NODE_ID: &str = "feedback";

/// One entry in a conversation definition file. The `node_type` tag selects
/// the variant; an unrecognized tag or a missing required field fails the
/// load, which aborts startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "node_type", rename_all = "snake_case")]
pub enum NodeDef {
    Option(OptionNodeDef),
    PostalLookup(PostalLookupDef),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read conversation file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse conversation file {source_name}: {source}")]
    Parse {
        source_name: String,
        source: serde_json::Error,
    },
}

/// Everything node construction needs from the outside world
#[derive(Clone)]
pub struct NodeDeps {
    pub classifier: Arc<dyn TopicClassifier>,
    pub municipalities: Arc<dyn MunicipalityLookup>,
    pub votes: Arc<dyn VoteSink>,
    pub feedback: Arc<dyn FeedbackSink>,
}

/// Immutable id → node map
pub struct NodeRegistry {
    nodes: HashMap<String, ChatNode>,
}

impl NodeRegistry {
    /// Create a registry holding the built-in nodes: the prediction entry
    /// node, one confirmation node per topic, and the feedback node.
    pub fn new(reject_target: RejectTarget, deps: &NodeDeps) -> Self {
        let mut registry = Self {
            nodes: HashMap::new(),
        };

        registry.insert(
            TOPIC_PREDICTION_NODE_ID,
            ChatNode::TopicPrediction(TopicPredictionNode::new(deps.classifier.clone())),
        );
        for topic in TOPICS {
            registry.insert(
                confirm_node_id(topic),
                ChatNode::TopicConfirm(TopicConfirmNode::new(
                    topic,
                    reject_target.clone(),
                    deps.votes.clone(),
                )),
            );
        }
        registry.insert(
            FEEDBACK_NODE_ID,
            ChatNode::Feedback(FeedbackNode::new(deps.feedback.clone())),
        );

        registry
    }

    /// Load one conversation definition file into the registry
    pub fn load_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        deps: &NodeDeps,
    ) -> Result<(), RegistryError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.load_str(&path.display().to_string(), &raw, deps)
    }

    /// Load conversation definitions from a JSON string
    pub fn load_str(
        &mut self,
        source_name: &str,
        raw: &str,
        deps: &NodeDeps,
    ) -> Result<(), RegistryError> {
        let defs: HashMap<String, NodeDef> =
            serde_json::from_str(raw).map_err(|source| RegistryError::Parse {
                source_name: source_name.to_string(),
                source,
            })?;

        for (node_id, def) in defs {
            let node = match def {
                NodeDef::Option(def) => ChatNode::Options(OptionNode::new(def)),
                NodeDef::PostalLookup(def) => {
                    ChatNode::PostalLookup(PostalLookupNode::new(def, deps.municipalities.clone()))
                }
            };
            self.insert(node_id, node);
        }
        Ok(())
    }

    fn insert(&mut self, node_id: impl Into<String>, node: ChatNode) {
        let node_id = node_id.into();
        if self.nodes.insert(node_id.clone(), node).is_some() {
            tracing::warn!(node_id = %node_id, "Node definition overrides an earlier one");
        }
    }

    pub fn get(&self, node_id: &str) -> Option<&ChatNode> {
        self.nodes.get(node_id)
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    #[allow(dead_code)] // Registry introspection utility
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[allow(dead_code)] // Paired with len
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

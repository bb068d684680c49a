//! Declarative postal-code lookup node
//!
//! Accepts a five-digit postal code, resolves it against the municipality
//! directory, stashes what it finds into the session attribute bag, and
//! routes to one of three configured downstream nodes. Downstream
//! declarative nodes read the stashed values through `<attribute>` tokens.

use super::node::{attrs, Button, Prompt, Transition};
use super::options::{apply_session_params, ExitShortcut};
use super::traits::MunicipalityLookup;
use crate::db::Session;
use serde::Deserialize;
use std::sync::Arc;

/// Definition-file record for a postal lookup node
#[derive(Debug, Clone, Deserialize)]
pub struct PostalLookupDef {
    pub content: String,
    pub unknown_postal_node_id: String,
    pub has_further_service_node_id: String,
    pub no_further_service_node_id: String,
    #[serde(default)]
    pub exit_node_id: Option<String>,
    #[serde(default)]
    pub exit_node_content: Option<String>,
}

/// Declarative lookup node built from a [`PostalLookupDef`]
pub struct PostalLookupNode {
    content: String,
    unknown_target: String,
    has_service_target: String,
    no_service_target: String,
    exit: Option<ExitShortcut>,
    municipalities: Arc<dyn MunicipalityLookup>,
}

impl PostalLookupNode {
    pub fn new(def: PostalLookupDef, municipalities: Arc<dyn MunicipalityLookup>) -> Self {
        Self {
            content: def.content,
            unknown_target: def.unknown_postal_node_id,
            has_service_target: def.has_further_service_node_id,
            no_service_target: def.no_further_service_node_id,
            exit: ExitShortcut::from_def(def.exit_node_id, def.exit_node_content),
            municipalities,
        }
    }

    fn is_exit(&self, action: &str) -> bool {
        self.exit
            .as_ref()
            .is_some_and(|exit| exit.target == action)
    }

    pub(crate) fn render(&self, session: &Session, prefix: &str) -> Prompt {
        let text = format!("{prefix}{}", apply_session_params(&self.content, session));
        let rows = match &self.exit {
            Some(exit) => vec![vec![Button::action(&exit.label, &exit.target)]],
            None => Vec::new(),
        };
        Prompt::new(text, rows)
    }

    pub(crate) fn locked_render(&self, session: &Session, action: &str) -> String {
        if self.is_exit(action) {
            return session.message_text.clone();
        }
        format!("{}\n\nYour answer: {action}", session.message_text)
    }

    /// Codes arrive in the conventional "123 45" spelling as often as not,
    /// so all whitespace is stripped before validation.
    pub(crate) fn normalize(&self, raw: &str) -> String {
        if let Some(exit) = &self.exit {
            if raw.eq_ignore_ascii_case("exit") || raw.eq_ignore_ascii_case(&exit.label) {
                return exit.target.clone();
            }
        }
        raw.chars().filter(|c| !c.is_whitespace()).collect()
    }

    pub(crate) fn is_expected(&self, action: &str) -> bool {
        if self.is_exit(action) {
            return true;
        }
        action.len() == 5 && action.chars().all(|c| c.is_ascii_digit())
    }

    pub(crate) fn next(&self, session: &mut Session, action: &str) -> Transition {
        if self.is_exit(action) {
            return Transition::To(action.to_string());
        }

        session.set_attr(attrs::POSTAL_CODE, action);
        let Some(municipality) = self.municipalities.lookup(action) else {
            return Transition::To(self.unknown_target.clone());
        };

        session.set_attr(attrs::MUNICIPALITY_NAME, &municipality.name);
        session.set_attr(attrs::MUNICIPALITY_LINK, &municipality.link);
        match municipality.service_link {
            Some(service_link) => {
                session.set_attr(attrs::SERVICE_LINK, service_link);
                Transition::To(self.has_service_target.clone())
            }
            None => Transition::To(self.no_service_target.clone()),
        }
    }
}

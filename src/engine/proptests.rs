//! Property-based tests for action normalization
//!
//! These pin the algebra the generic nodes rely on: declared labels always
//! survive normalize → is_expected, target ids are fixpoints of normalize,
//! and an empty option table rejects everything.

use super::options::{OptionDef, OptionNode, OptionNodeDef};
use super::postal::{PostalLookupDef, PostalLookupNode};
use super::testing::StaticMunicipalities;
use proptest::prelude::*;
use std::sync::Arc;

/// Labels start with an uppercase letter and stay alphabetic, target ids
/// carry an underscore; the two namespaces can never collide after
/// lower-casing, matching how real conversation files are written.
fn arb_options() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("[A-Z][a-z]{0,9}", "t_[a-z0-9]{1,8}"), 1..6)
}

fn option_node(options: &[(String, String)]) -> OptionNode {
    OptionNode::new(OptionNodeDef {
        content: "Pick one".to_string(),
        links: Vec::new(),
        options: vec![options
            .iter()
            .map(|(label, target)| OptionDef {
                content: label.clone(),
                next_node_id: target.clone(),
            })
            .collect()],
        exit_node_id: None,
        exit_node_content: None,
    })
}

fn postal_node() -> PostalLookupNode {
    PostalLookupNode::new(
        PostalLookupDef {
            content: "Code?".to_string(),
            unknown_postal_node_id: "postal_unknown".to_string(),
            has_further_service_node_id: "postal_has_service".to_string(),
            no_further_service_node_id: "postal_no_service".to_string(),
            exit_node_id: None,
            exit_node_content: None,
        },
        Arc::new(StaticMunicipalities::new()),
    )
}

proptest! {
    /// Every declared label is accepted, whatever its casing.
    #[test]
    fn option_labels_survive_normalization(options in arb_options()) {
        let node = option_node(&options);
        for (label, _) in &options {
            prop_assert!(node.is_expected(&node.normalize(label)));
            prop_assert!(node.is_expected(&node.normalize(&label.to_uppercase())));
        }
    }

    /// A clicked button echoes the target id; ids resolve to themselves.
    #[test]
    fn option_targets_are_normalize_fixpoints(options in arb_options()) {
        let node = option_node(&options);
        for (_, target) in &options {
            prop_assert_eq!(&node.normalize(target), target);
            prop_assert!(node.is_expected(target));
        }
    }

    /// Text outside the label and target namespaces is never accepted.
    #[test]
    fn option_rejects_foreign_text(options in arb_options(), text in "[0-9 ?!]{1,20}") {
        let node = option_node(&options);
        prop_assert!(!node.is_expected(&node.normalize(&text)));
    }

    /// With no options at all, rejection is vacuous.
    #[test]
    fn empty_option_table_rejects_everything(text in ".{0,30}") {
        let node = option_node(&[]);
        prop_assert!(!node.is_expected(&node.normalize(&text)));
    }

    /// Whitespace never changes which postal code is meant.
    #[test]
    fn postal_codes_accepted_in_any_spacing(code in "[0-9]{5}", split in 0usize..5) {
        let node = postal_node();
        let (head, tail) = {
            let mut chars = code.chars();
            let head: String = chars.by_ref().take(split).collect();
            let tail: String = chars.collect();
            (head, tail)
        };
        let spaced = format!(" {head} {tail} ");

        let normalized = node.normalize(spaced.trim());
        prop_assert_eq!(&normalized, &code);
        prop_assert!(node.is_expected(&normalized));
    }

    /// Anything that is not exactly five digits is rejected.
    #[test]
    fn postal_rejects_non_codes(text in "[a-z]{1,10}|[0-9]{1,4}|[0-9]{6,8}") {
        let node = postal_node();
        prop_assert!(!node.is_expected(&node.normalize(&text)));
    }
}

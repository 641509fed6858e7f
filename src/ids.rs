//! Identity assignment.
//!
//! Ids are one-way SHA-256 digests over colon-joined context strings. There is
//! no salt and no state: the same context always yields the same id, across
//! runs and processes. Continuity with an earlier analysis is the business of
//! an [`IdStrategy`], which may return a previously persisted id instead.

use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::model::LibraryAnalysis;

/// Hash ordered context strings into a global id.
pub fn assign_id(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(parts.join(":").as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Id of a pattern, from its context id alone.
pub fn pattern_id(context_id: &str) -> String {
    assign_id(&[context_id])
}

/// Id of an entity nested under `parent_id`.
pub fn nested_id(parent_id: &str, context_id: &str) -> String {
    assign_id(&[parent_id, context_id])
}

/// Caller-supplied id resolution, one method per id kind.
///
/// The defaults mint fresh ids.
pub trait IdStrategy: Send + Sync {
    fn pattern_id(&self, context_id: &str) -> String {
        pattern_id(context_id)
    }

    fn property_id(&self, pattern_id: &str, context_id: &str) -> String {
        nested_id(pattern_id, context_id)
    }

    fn slot_id(&self, pattern_id: &str, context_id: &str) -> String {
        nested_id(pattern_id, context_id)
    }

    fn enum_option_id(&self, property_id: &str, context_id: &str) -> String {
        nested_id(property_id, context_id)
    }
}

/// First-time analysis: always mint.
#[derive(Debug, Default, Clone, Copy)]
pub struct FreshIds;

impl IdStrategy for FreshIds {}

type PatternCallback = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;
type NestedCallback = Box<dyn Fn(&str, &str) -> Option<String> + Send + Sync>;

/// Four optional lookups. An absent callback, or one returning `None`, mints a
/// fresh id.
#[derive(Default)]
pub struct IdCallbacks {
    pub pattern: Option<PatternCallback>,
    pub property: Option<NestedCallback>,
    pub slot: Option<NestedCallback>,
    pub enum_option: Option<NestedCallback>,
}

impl IdStrategy for IdCallbacks {
    fn pattern_id(&self, context_id: &str) -> String {
        self.pattern
            .as_ref()
            .and_then(|assign| assign(context_id))
            .unwrap_or_else(|| pattern_id(context_id))
    }

    fn property_id(&self, pattern_id: &str, context_id: &str) -> String {
        self.property
            .as_ref()
            .and_then(|assign| assign(pattern_id, context_id))
            .unwrap_or_else(|| nested_id(pattern_id, context_id))
    }

    fn slot_id(&self, pattern_id: &str, context_id: &str) -> String {
        self.slot
            .as_ref()
            .and_then(|assign| assign(pattern_id, context_id))
            .unwrap_or_else(|| nested_id(pattern_id, context_id))
    }

    fn enum_option_id(&self, property_id: &str, context_id: &str) -> String {
        self.enum_option
            .as_ref()
            .and_then(|assign| assign(property_id, context_id))
            .unwrap_or_else(|| nested_id(property_id, context_id))
    }
}

/// Reuses the ids of a previously analyzed version of the same library.
#[derive(Debug, Default, Clone)]
pub struct PreviousLibraryIds {
    patterns: HashMap<String, String>,
    properties: HashMap<(String, String), String>,
    slots: HashMap<(String, String), String>,
    enum_options: HashMap<(String, String), String>,
}

impl PreviousLibraryIds {
    pub fn from_analysis(previous: &LibraryAnalysis) -> Self {
        let mut ids = Self::default();

        for analysis in &previous.patterns {
            let pattern = &analysis.pattern;
            ids.patterns
                .insert(pattern.context_id.clone(), pattern.id.clone());

            for slot in &pattern.slots {
                ids.slots.insert(
                    (pattern.id.clone(), slot.context_id.clone()),
                    slot.id.clone(),
                );
            }

            for property in previous.properties_of(pattern) {
                ids.properties.insert(
                    (pattern.id.clone(), property.context_id.clone()),
                    property.id.clone(),
                );
                if let crate::model::PropertyKind::Enum { options } = &property.kind {
                    for option in options {
                        ids.enum_options.insert(
                            (property.id.clone(), option.context_id.clone()),
                            option.id.clone(),
                        );
                    }
                }
            }
        }

        ids
    }
}

impl IdStrategy for PreviousLibraryIds {
    fn pattern_id(&self, context_id: &str) -> String {
        self.patterns
            .get(context_id)
            .cloned()
            .unwrap_or_else(|| pattern_id(context_id))
    }

    fn property_id(&self, pattern_id: &str, context_id: &str) -> String {
        lookup(&self.properties, pattern_id, context_id)
    }

    fn slot_id(&self, pattern_id: &str, context_id: &str) -> String {
        lookup(&self.slots, pattern_id, context_id)
    }

    fn enum_option_id(&self, property_id: &str, context_id: &str) -> String {
        lookup(&self.enum_options, property_id, context_id)
    }
}

fn lookup(table: &HashMap<(String, String), String>, parent: &str, context_id: &str) -> String {
    table
        .get(&(parent.to_string(), context_id.to_string()))
        .cloned()
        .unwrap_or_else(|| nested_id(parent, context_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_id_is_deterministic() {
        let first = assign_id(&["components/button", "Button"]);
        let second = assign_id(&["components/button", "Button"]);
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_assign_id_known_digest() {
        assert_eq!(
            assign_id(&["a", "b"]),
            "6783a31eabf68ccc0660f935c0826282bdd2241f3a80a9f2d10d59aea9ebb5d8"
        );
    }

    #[test]
    fn test_nested_ids_depend_on_parent() {
        let a = pattern_id("components/a:A");
        let b = pattern_id("components/b:B");
        assert_ne!(nested_id(&a, "x"), nested_id(&b, "x"));
    }

    #[test]
    fn test_renaming_one_local_leaves_siblings() {
        let parent = pattern_id("components/card:Card");
        let title = nested_id(&parent, "title");
        let body = nested_id(&parent, "body");
        let renamed = nested_id(&parent, "heading");
        assert_ne!(title, renamed);
        assert_eq!(body, nested_id(&parent, "body"));
    }

    #[test]
    fn test_callbacks_fall_back_to_fresh_ids() {
        let callbacks = IdCallbacks {
            pattern: Some(Box::new(|context| {
                (context == "known:Known").then(|| "legacy-id".to_string())
            })),
            ..Default::default()
        };
        assert_eq!(callbacks.pattern_id("known:Known"), "legacy-id");
        assert_eq!(callbacks.pattern_id("new:New"), pattern_id("new:New"));
        assert_eq!(callbacks.slot_id("p", "children"), nested_id("p", "children"));
    }
}

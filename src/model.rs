//! Analysis output model.
//!
//! Everything here is created fresh per analysis run and serialized as
//! camelCase JSON for the calling application.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ═══════════════════════════════════════════════════════════════════════════════
// DISCOVERY
// ═══════════════════════════════════════════════════════════════════════════════

/// One discovered declaration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternCandidate {
    /// Significant path joined with `/`. Not hashed.
    pub id: String,
    pub artifact_path: PathBuf,
    pub declaration_path: PathBuf,
    pub source_path: PathBuf,
    pub description: String,
    pub display_name: String,
}

// ═══════════════════════════════════════════════════════════════════════════════
// PATTERNS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    Pattern,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub context_id: String,
    pub id: String,
    pub name: String,
    pub description: String,
    pub property_ids: Vec<String>,
    pub slots: Vec<Slot>,
    #[serde(rename = "type")]
    pub kind: PatternKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl Pattern {
    pub fn slot(&self, property_name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.property_name == property_name)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub context_id: String,
    pub property_name: String,
    pub label: String,
    pub description: String,
    pub example: String,
    pub required: bool,
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
    #[serde(flatten)]
    pub kind: PropertyKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PropertyKind {
    Boolean,
    Enum {
        options: Vec<EnumOption>,
    },
    EventHandler {
        event: EventKind,
    },
    String,
    Number,
    Color,
    Asset,
    Href,
    /// Unrecognized shape. The raw type text is kept verbatim.
    Unknown {
        #[serde(rename = "typeText")]
        type_text: String,
    },
}

impl PropertyKind {
    pub fn name(&self) -> &'static str {
        match self {
            PropertyKind::Boolean => "boolean",
            PropertyKind::Enum { .. } => "enum",
            PropertyKind::EventHandler { .. } => "event-handler",
            PropertyKind::String => "string",
            PropertyKind::Number => "number",
            PropertyKind::Color => "color",
            PropertyKind::Asset => "asset",
            PropertyKind::Href => "href",
            PropertyKind::Unknown { .. } => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    Click,
    Change,
    Focus,
    Input,
    Keyboard,
    Generic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumOption {
    pub id: String,
    pub context_id: String,
    pub name: String,
    pub value: EnumValue,
    pub ordinal: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    Number(f64),
    String(String),
}

// ═══════════════════════════════════════════════════════════════════════════════
// SLOTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotQuantity {
    Single,
    Multiple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotKind {
    Children,
    Property,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: String,
    pub context_id: String,
    pub property_name: String,
    pub label: String,
    pub description: String,
    pub example: String,
    pub required: bool,
    pub hidden: bool,
    pub quantity: SlotQuantity,
    pub kind: SlotKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<ElementCandidate>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// DEFAULT CONTENT
// ═══════════════════════════════════════════════════════════════════════════════

/// Node of a default-content tree extracted from a `@default` example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementCandidate {
    pub id: String,
    pub parent: String,
    pub library_id: String,
    pub pattern_context_id: String,
    pub pattern_id: String,
    pub props: Vec<ElementPropCandidate>,
    pub children: Vec<ElementCandidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPropCandidate {
    pub property_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
    pub value: LiteralValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Boolean(bool),
    Number(f64),
    String(String),
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESULT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternAnalysis {
    /// Compiled implementation of the component.
    pub path: PathBuf,
    pub declaration_path: PathBuf,
    pub pattern: Pattern,
    /// Properties minted for this pattern. Properties shared with an earlier
    /// pattern appear only there.
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryAnalysis {
    pub id: String,
    pub path: PathBuf,
    pub package_file: serde_json::Value,
    pub patterns: Vec<PatternAnalysis>,
    pub bundle: String,
}

impl LibraryAnalysis {
    pub fn pattern(&self, name: &str) -> Option<&PatternAnalysis> {
        self.patterns.iter().find(|p| p.pattern.name == name)
    }

    pub fn property(&self, id: &str) -> Option<&Property> {
        self.patterns
            .iter()
            .flat_map(|p| p.properties.iter())
            .find(|p| p.id == id)
    }

    /// Properties referenced by a pattern, including shared ones.
    pub fn properties_of<'s>(&'s self, pattern: &'s Pattern) -> Vec<&'s Property> {
        pattern
            .property_ids
            .iter()
            .filter_map(|id| self.property(id))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub code: String,
    pub message: String,
    pub library_fault: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LibraryAnalysisResult {
    Success(LibraryAnalysis),
    Error { error: ErrorReport },
}

impl LibraryAnalysisResult {
    pub fn success(&self) -> Option<&LibraryAnalysis> {
        match self {
            LibraryAnalysisResult::Success(analysis) => Some(analysis),
            LibraryAnalysisResult::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorReport> {
        match self {
            LibraryAnalysisResult::Success(_) => None,
            LibraryAnalysisResult::Error { error } => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_property_serializes_type_text() {
        let property = Property {
            id: "p".into(),
            context_id: "tuple".into(),
            property_name: "tuple".into(),
            label: "tuple".into(),
            description: String::new(),
            example: String::new(),
            required: true,
            hidden: false,
            group: None,
            default_value: None,
            kind: PropertyKind::Unknown {
                type_text: "[number, string]".into(),
            },
        };
        let json = serde_json::to_value(&property).unwrap();
        assert_eq!(json["type"], "unknown");
        assert_eq!(json["typeText"], "[number, string]");
        assert_eq!(json["propertyName"], "tuple");
    }

    #[test]
    fn test_error_result_is_tagged() {
        let result = LibraryAnalysisResult::Error {
            error: ErrorReport {
                code: "PA-ERR-NO-COMPONENTS".into(),
                message: "no components".into(),
                library_fault: true,
            },
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["error"]["code"], "PA-ERR-NO-COMPONENTS");
    }
}

use serde::{Deserialize, Serialize};

use crate::error::AnalyzeError;

/// Analyzer configuration.
///
/// Every field has a default, so a partial JSON object is a valid
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzerOptions {
    /// Dedicated `package.json` key naming the typings entry.
    pub typings_entry_key: String,
    /// Extensions followed by the export discoverer.
    pub declaration_extensions: Vec<String>,
    /// Extensions probed for compiled component implementations.
    pub implementation_extensions: Vec<String>,
    /// Extensions probed for original component sources.
    pub source_extensions: Vec<String>,
    /// Framework-native renderable type names. Entries match either the last
    /// segment of a type reference or its full dotted name.
    pub slot_type_names: Vec<String>,
    /// Generic types whose first argument is a function component's props.
    pub component_type_names: Vec<String>,
    /// Base classes whose first type argument is a class component's props.
    pub class_component_names: Vec<String>,
    /// Return types that mark a plain function as a component.
    pub element_type_names: Vec<String>,
    /// Maximum element nesting accepted in a `@default` example.
    pub max_default_depth: usize,
    /// Scan compiled implementations for `children` references when no
    /// children slot is declared.
    pub scan_implementation_for_children: bool,
    /// Overrides the derived library id.
    pub library_id: Option<String>,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            typings_entry_key: "patternTypings".to_string(),
            declaration_extensions: strings(&[".d.ts"]),
            implementation_extensions: strings(&[".js", ".jsx", ".mjs", ".cjs"]),
            source_extensions: strings(&[".tsx", ".ts", ".jsx"]),
            slot_type_names: strings(&[
                "ReactNode",
                "ReactElement",
                "ReactChild",
                "ReactFragment",
                "ReactPortal",
                "JSX.Element",
            ]),
            component_type_names: strings(&[
                "FC",
                "SFC",
                "FunctionComponent",
                "StatelessComponent",
                "ComponentType",
                "ComponentClass",
                "ForwardRefExoticComponent",
                "MemoExoticComponent",
                "NamedExoticComponent",
                "ExoticComponent",
            ]),
            class_component_names: strings(&["Component", "PureComponent"]),
            element_type_names: strings(&["Element", "ReactElement", "ReactNode"]),
            max_default_depth: 16,
            scan_implementation_for_children: true,
            library_id: None,
        }
    }
}

impl AnalyzerOptions {
    pub fn from_json(json: &str) -> Result<Self, AnalyzeError> {
        serde_json::from_str(json).map_err(AnalyzeError::Options)
    }

    /// Whether a (possibly dotted) type name is on the slot allow-list.
    pub fn is_slot_type_name(&self, segments: &[String]) -> bool {
        matches_name_list(&self.slot_type_names, segments)
    }

    pub fn is_component_type_name(&self, segments: &[String]) -> bool {
        matches_name_list(&self.component_type_names, segments)
    }

    pub fn is_class_component_name(&self, segments: &[String]) -> bool {
        matches_name_list(&self.class_component_names, segments)
    }

    pub fn is_element_type_name(&self, segments: &[String]) -> bool {
        matches_name_list(&self.element_type_names, segments)
    }
}

fn matches_name_list(list: &[String], segments: &[String]) -> bool {
    let Some(last) = segments.last() else {
        return false;
    };
    let dotted = segments.join(".");
    list.iter().any(|entry| {
        if entry.contains('.') {
            *entry == dotted
        } else {
            entry == last
        }
    })
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(name: &str) -> Vec<String> {
        name.split('.').map(str::to_string).collect()
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options = AnalyzerOptions::from_json(r#"{ "maxDefaultDepth": 3 }"#).unwrap();
        assert_eq!(options.max_default_depth, 3);
        assert_eq!(options.typings_entry_key, "patternTypings");
        assert!(options.scan_implementation_for_children);
    }

    #[test]
    fn test_invalid_json_is_options_error() {
        let err = AnalyzerOptions::from_json("{ nope").unwrap_err();
        assert_eq!(err.code(), "PA-ERR-OPTIONS");
    }

    #[test]
    fn test_dotted_entries_match_full_name_only() {
        let options = AnalyzerOptions::default();
        assert!(options.is_slot_type_name(&segs("React.ReactNode")));
        assert!(options.is_slot_type_name(&segs("JSX.Element")));
        assert!(!options.is_slot_type_name(&segs("Element")));
        assert!(!options.is_slot_type_name(&segs("React.ReactText")));
    }
}

//! Node binding.

use napi_derive::napi;
use std::path::Path;

use crate::analyzer::Analyzer;
use crate::ids::PreviousLibraryIds;
use crate::model::LibraryAnalysis;
use crate::options::AnalyzerOptions;

/// Analyze the library at `root` and return the JSON-encoded result.
///
/// `previous_json` is an earlier successful analysis whose ids are reused.
#[napi]
pub fn analyze_library_native(
    root: String,
    options_json: Option<String>,
    previous_json: Option<String>,
) -> napi::Result<String> {
    let options = match options_json {
        Some(json) => {
            AnalyzerOptions::from_json(&json).map_err(|e| napi::Error::from_reason(e.to_string()))?
        }
        None => AnalyzerOptions::default(),
    };

    let mut analyzer = Analyzer::new().with_options(options);
    if let Some(json) = previous_json {
        let previous: LibraryAnalysis =
            serde_json::from_str(&json).map_err(|e| napi::Error::from_reason(e.to_string()))?;
        analyzer = analyzer.with_ids(PreviousLibraryIds::from_analysis(&previous));
    }

    let result = analyzer.analyze(Path::new(&root));
    serde_json::to_string(&result).map_err(|e| napi::Error::from_reason(e.to_string()))
}

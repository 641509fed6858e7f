//! Fixture libraries shared by the test modules.

use std::path::{Path, PathBuf};

use crate::analyzer::Analyzer;
use crate::declarations::{parse_declarations, DeclarationKind};
use crate::filesystem::MemoryFileSystem;
use crate::ids::IdStrategy;
use crate::model::{LibraryAnalysis, LibraryAnalysisResult};
use crate::options::AnalyzerOptions;
use crate::program::{MemberRef, SourceFile, TypeContext};

pub const ROOT: &str = "/lib";

/// Type context over in-memory declaration files. The first file is the
/// typings entry.
pub fn context(files: &[(&str, &str)]) -> TypeContext {
    let files = files
        .iter()
        .map(|(path, source)| SourceFile {
            path: PathBuf::from(path),
            module: parse_declarations(path, source),
        })
        .collect();
    TypeContext::new(
        Path::new(ROOT),
        Some("my-lib".to_string()),
        vec![".d.ts".to_string()],
        files,
    )
}

/// Member `member` of interface `interface`, searched in every file.
pub fn member<'c>(ctx: &'c TypeContext, interface: &str, member: &str) -> MemberRef<'c> {
    (0..ctx.file_count())
        .find_map(|file| {
            ctx.file(file)
                .module
                .declarations
                .iter()
                .find_map(|declaration| match &declaration.kind {
                    DeclarationKind::Interface { members, .. } if declaration.name == interface => {
                        members.iter().find(|m| m.name == member)
                    }
                    _ => None,
                })
                .map(|m| MemberRef {
                    file,
                    member: m,
                    optional: m.optional,
                })
        })
        .unwrap_or_else(|| panic!("no member {interface}.{member}"))
}

/// An in-memory component library rooted at [`ROOT`].
pub struct Library {
    fs: MemoryFileSystem,
    options: AnalyzerOptions,
}

impl Library {
    pub fn new(package_name: &str) -> Self {
        let package = format!(r#"{{ "name": "{package_name}", "types": "./index.d.ts" }}"#);
        Self {
            fs: MemoryFileSystem::new().with_file(format!("{ROOT}/package.json"), package),
            options: AnalyzerOptions::default(),
        }
    }

    /// Add a file, path relative to the library root.
    pub fn file(mut self, path: &str, contents: &str) -> Self {
        self.fs.add_file(format!("{ROOT}/{path}"), contents);
        self
    }

    /// Add `<stem>.d.ts` with an empty `<stem>.js` implementation.
    pub fn module(self, stem: &str, declarations: &str) -> Self {
        self.file(&format!("{stem}.d.ts"), declarations)
            .file(&format!("{stem}.js"), "")
    }

    pub fn options(mut self, options: AnalyzerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn analyzer(self) -> Analyzer {
        Analyzer::new().with_options(self.options).with_fs(self.fs)
    }

    pub fn analyze(self) -> LibraryAnalysisResult {
        self.analyzer().analyze(Path::new(ROOT))
    }

    pub fn analyze_with(self, ids: impl IdStrategy + 'static) -> LibraryAnalysisResult {
        self.analyzer().with_ids(ids).analyze(Path::new(ROOT))
    }

    /// Analyze and unwrap the success variant.
    pub fn analysis(self) -> LibraryAnalysis {
        match self.analyze() {
            LibraryAnalysisResult::Success(analysis) => analysis,
            LibraryAnalysisResult::Error { error } => {
                panic!("analysis failed: {} {}", error.code, error.message)
            }
        }
    }
}

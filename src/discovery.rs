//! Discovery Module
//!
//! Walks the declaration-file import graph of a library, starting at its
//! typings entry. Only relative imports and `export ... from` edges are
//! followed, so the walk never leaves the library.

use heck::ToTitleCase;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

use crate::declarations::parse_declarations;
use crate::error::AnalyzeError;
use crate::filesystem::{normalize_path, FileSystem};
use crate::jsdoc::parse_doc;
use crate::model::PatternCandidate;
use crate::options::AnalyzerOptions;
use crate::program::{is_relative, module_candidates, SourceFile};

// ═══════════════════════════════════════════════════════════════════════════════
// EXPORT DISCOVERY
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything found by one walk. `candidates[i]` describes `files[i]`, and the
/// typings entry comes first.
#[derive(Debug)]
pub struct Discovery {
    pub candidates: Vec<PatternCandidate>,
    pub files: Vec<SourceFile>,
}

pub struct ExportDiscoverer<'a> {
    fs: &'a dyn FileSystem,
    root: PathBuf,
    package_name: &'a str,
    options: &'a AnalyzerOptions,
}

impl<'a> ExportDiscoverer<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        root: &Path,
        package_name: &'a str,
        options: &'a AnalyzerOptions,
    ) -> Self {
        Self {
            fs,
            root: normalize_path(root),
            package_name,
            options,
        }
    }

    /// Discover every declaration file reachable from `entry`.
    ///
    /// Failing to read the entry is fatal. Any other unreadable file is logged
    /// and skipped.
    pub fn discover(&self, entry: &Path) -> Result<Discovery, AnalyzeError> {
        let entry = normalize_path(entry);
        let source = self
            .fs
            .read_to_string(&entry)
            .map_err(|source| AnalyzeError::Io {
                path: entry.clone(),
                source,
            })?;

        let mut discovery = Discovery {
            candidates: Vec::new(),
            files: Vec::new(),
        };
        let mut visited = HashSet::new();
        visited.insert(entry.clone());
        self.visit(entry, source, &mut visited, &mut discovery);

        debug!(
            files = discovery.files.len(),
            "declaration discovery finished"
        );
        Ok(discovery)
    }

    fn visit(
        &self,
        path: PathBuf,
        source: String,
        visited: &mut HashSet<PathBuf>,
        discovery: &mut Discovery,
    ) {
        let file_name = path.to_string_lossy().to_string();
        let module = parse_declarations(&file_name, &source);
        let dependencies = module.dependencies.clone();
        let description = parse_doc(module.file_doc.as_deref()).resolved_description();

        discovery
            .candidates
            .push(self.candidate(&path, description));
        discovery.files.push(SourceFile {
            path: path.clone(),
            module,
        });

        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        for specifier in dependencies.iter().filter(|s| is_relative(s)) {
            let target = module_candidates(&dir, specifier, &self.options.declaration_extensions)
                .into_iter()
                .find(|candidate| self.fs.exists(candidate));
            let Some(target) = target else {
                debug!(file = %file_name, specifier = %specifier, "no declaration file for import");
                continue;
            };
            if !visited.insert(target.clone()) {
                continue;
            }

            match self.fs.read_to_string(&target) {
                Ok(source) => self.visit(target, source, visited, discovery),
                Err(err) => {
                    warn!(file = %target.display(), error = %err, "skipping unreadable declaration file");
                }
            }
        }
    }

    fn candidate(&self, declaration_path: &Path, description: String) -> PatternCandidate {
        let segments = significant_path(&self.root, declaration_path, &self.options.declaration_extensions);
        let display_name = match segments.last() {
            Some(last) => last.to_title_case(),
            None => self.package_name.to_string(),
        };

        let stem = strip_extension(declaration_path, &self.options.declaration_extensions);
        let artifact_path = self
            .options
            .implementation_extensions
            .iter()
            .map(|ext| PathBuf::from(format!("{stem}{ext}")))
            .find(|path| self.fs.exists(path))
            .unwrap_or_else(|| PathBuf::from(format!("{stem}.js")));
        let source_path = self
            .options
            .source_extensions
            .iter()
            .map(|ext| PathBuf::from(format!("{stem}{ext}")))
            .find(|path| self.fs.exists(path))
            .unwrap_or_else(|| artifact_path.clone());

        PatternCandidate {
            id: segments.join("/"),
            artifact_path,
            declaration_path: declaration_path.to_path_buf(),
            source_path,
            description,
            display_name,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PATHS
// ═══════════════════════════════════════════════════════════════════════════════

/// Library-relative path segments with the extension removed, parent-escaping
/// segments dropped and a trailing `index` dropped.
pub fn significant_path(root: &Path, path: &Path, extensions: &[String]) -> Vec<String> {
    let stem = PathBuf::from(strip_extension(path, extensions));
    let relative = library_relative(root, &stem);

    let mut segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();
    if segments.last().map(String::as_str) == Some("index") {
        segments.pop();
    }
    segments
}

/// Path relative to the installed package (the part after
/// `node_modules/<pkg>/`), or else relative to the library root.
fn library_relative(root: &Path, path: &Path) -> PathBuf {
    let normalized = normalize_path(path);
    let components: Vec<_> = normalized.components().collect();
    if let Some(position) = components
        .iter()
        .rposition(|c| c.as_os_str() == "node_modules")
    {
        let mut rest = components[position + 1..].iter();
        if let Some(first) = rest.next() {
            // scoped packages span two segments
            if first.as_os_str().to_string_lossy().starts_with('@') {
                rest.next();
            }
            return rest.collect();
        }
    }

    match normalized.strip_prefix(root) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => pathdiff(root, &normalized),
    }
}

/// Relative path from `base` to `path`, both normalized and absolute.
fn pathdiff(base: &Path, path: &Path) -> PathBuf {
    let base: Vec<_> = base.components().collect();
    let target: Vec<_> = path.components().collect();
    let common = base
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &target[common..] {
        relative.push(component.as_os_str());
    }
    relative
}

fn strip_extension(path: &Path, extensions: &[String]) -> String {
    let text = path.to_string_lossy();
    extensions
        .iter()
        .find_map(|ext| text.strip_suffix(ext.as_str()))
        .map(str::to_string)
        .unwrap_or_else(|| {
            path.with_extension("")
                .to_string_lossy()
                .to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::MemoryFileSystem;

    fn exts() -> Vec<String> {
        vec![".d.ts".to_string()]
    }

    #[test]
    fn test_significant_path_strips_index_and_extension() {
        let root = Path::new("/lib");
        assert_eq!(
            significant_path(root, Path::new("/lib/components/button/index.d.ts"), &exts()),
            vec!["components", "button"]
        );
        assert!(significant_path(root, Path::new("/lib/index.d.ts"), &exts()).is_empty());
    }

    #[test]
    fn test_significant_path_drops_escaping_segments() {
        let root = Path::new("/lib/dist");
        assert_eq!(
            significant_path(root, Path::new("/lib/shared/card.d.ts"), &exts()),
            vec!["shared", "card"]
        );
    }

    #[test]
    fn test_significant_path_inside_node_modules() {
        let root = Path::new("/app");
        assert_eq!(
            significant_path(
                root,
                Path::new("/app/node_modules/@acme/ui/lib/icon-button.d.ts"),
                &exts()
            ),
            vec!["lib", "icon-button"]
        );
    }

    #[test]
    fn test_discovers_relative_graph_once() {
        let fs = MemoryFileSystem::new()
            .with_file(
                "/lib/index.d.ts",
                "export * from './button';\nexport * from './icon-button';\nimport 'react';",
            )
            .with_file("/lib/button.d.ts", "export * from './icon-button';")
            .with_file("/lib/button.js", "")
            .with_file("/lib/icon-button/index.d.ts", "export * from '../button';")
            .with_file("/lib/icon-button/index.tsx", "");
        let options = AnalyzerOptions::default();
        let discovery = ExportDiscoverer::new(&fs, Path::new("/lib"), "my-lib", &options)
            .discover(Path::new("/lib/index.d.ts"))
            .unwrap();

        let ids: Vec<_> = discovery.candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["", "button", "icon-button"]);
        assert_eq!(discovery.candidates[0].display_name, "my-lib");
        assert_eq!(discovery.candidates[2].display_name, "Icon Button");
        assert_eq!(discovery.candidates[1].artifact_path, PathBuf::from("/lib/button.js"));
        assert_eq!(discovery.candidates[1].source_path, PathBuf::from("/lib/button.js"));
        assert_eq!(
            discovery.candidates[2].artifact_path,
            PathBuf::from("/lib/icon-button/index.js")
        );
        assert_eq!(
            discovery.candidates[2].source_path,
            PathBuf::from("/lib/icon-button/index.tsx")
        );
    }

    #[test]
    fn test_missing_entry_is_fatal() {
        let fs = MemoryFileSystem::new();
        let options = AnalyzerOptions::default();
        let err = ExportDiscoverer::new(&fs, Path::new("/lib"), "my-lib", &options)
            .discover(Path::new("/lib/index.d.ts"))
            .unwrap_err();
        assert_eq!(err.code(), "PA-ERR-IO");
    }
}

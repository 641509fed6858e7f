//! Orchestrator
//!
//! One run: `package.json` → typings entry → discovery → shared type context →
//! fold over candidates → default content → bundle. The run either produces a
//! complete [`LibraryAnalysis`] or fails with the first fatal error.

use rayon::prelude::*;
use serde_json::Value;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::bundle::{BundleEntry, Bundler, ModuleMapBundler};
use crate::component::{exported_component, exported_components};
use crate::defaults::{DefaultExtractor, PatternLookup};
use crate::discovery::{Discovery, ExportDiscoverer};
use crate::error::AnalyzeError;
use crate::filesystem::{normalize_path, FileSystem, RealFileSystem};
use crate::ids::{assign_id, FreshIds, IdStrategy};
use crate::model::{
    ErrorReport, LibraryAnalysis, LibraryAnalysisResult, PatternAnalysis, PatternCandidate,
};
use crate::options::AnalyzerOptions;
use crate::pattern::{PatternBuild, PatternBuilder, PatternIdentity, SlotSource};
use crate::program::{DeclKey, FileId, MemberKey, TypeContext};

const PACKAGE_FILE: &str = "package.json";
const DEFAULT_TYPINGS: &str = "./index.d.ts";

pub struct Analyzer {
    options: AnalyzerOptions,
    ids: Box<dyn IdStrategy>,
    fs: Box<dyn FileSystem>,
    bundler: Box<dyn Bundler>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    /// Analyzer over the real file system, minting fresh ids.
    pub fn new() -> Self {
        Self {
            options: AnalyzerOptions::default(),
            ids: Box::new(FreshIds),
            fs: Box::new(RealFileSystem),
            bundler: Box::new(ModuleMapBundler),
        }
    }

    pub fn with_options(mut self, options: AnalyzerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_ids(mut self, ids: impl IdStrategy + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn with_fs(mut self, fs: impl FileSystem + 'static) -> Self {
        self.fs = Box::new(fs);
        self
    }

    pub fn with_bundler(mut self, bundler: impl Bundler + 'static) -> Self {
        self.bundler = Box::new(bundler);
        self
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    /// Analyze one library. Never panics: fatal errors and internal faults
    /// both become the error variant.
    #[instrument(skip(self, root), fields(root = %root.display()))]
    pub fn analyze(&self, root: &Path) -> LibraryAnalysisResult {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.try_analyze(root)));
        let error = match outcome {
            Ok(Ok(analysis)) => return LibraryAnalysisResult::Success(analysis),
            Ok(Err(error)) => error,
            Err(panic) => AnalyzeError::Internal(panic_message(panic.as_ref())),
        };

        warn!(code = error.code(), error = %error, "library analysis failed");
        LibraryAnalysisResult::Error {
            error: ErrorReport {
                code: error.code().to_string(),
                message: error.to_string(),
                library_fault: error.is_library_fault(),
            },
        }
    }

    /// Analyze several libraries in parallel, one context per library.
    pub fn analyze_all(&self, roots: &[PathBuf]) -> Vec<LibraryAnalysisResult> {
        roots.par_iter().map(|root| self.analyze(root)).collect()
    }

    pub fn try_analyze(&self, root: &Path) -> Result<LibraryAnalysis, AnalyzeError> {
        let root = normalize_path(root);
        let package_file = self.read_package(&root)?;
        let package_name = package_file
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);
        let display_package = package_name.clone().unwrap_or_else(|| {
            root.file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default()
        });
        let library_id = self
            .options
            .library_id
            .clone()
            .unwrap_or_else(|| assign_id(&[&format!("library:{display_package}")]));

        let entry = self.typings_entry(&root, &package_file)?;
        info!(package = %display_package, entry = %entry.display(), "analyzing library");

        let Discovery { candidates, files } =
            ExportDiscoverer::new(self.fs.as_ref(), &root, &display_package, &self.options)
                .discover(&entry)?;
        let ctx = TypeContext::new(
            &root,
            package_name,
            self.options.declaration_extensions.clone(),
            files,
        );
        let builder = PatternBuilder::new(
            &ctx,
            &self.options,
            self.ids.as_ref(),
            self.fs.as_ref(),
            &candidates,
        );

        let Registry {
            mut analyses,
            slot_sources,
            identities,
            ..
        } = candidates
            .iter()
            .enumerate()
            .fold(Registry::default(), |registry, (file, candidate)| {
                self.collect_file(&ctx, &builder, file, candidate, registry)
            });

        if analyses.is_empty() {
            return Err(AnalyzeError::NoComponents { root });
        }

        let lookup = RunLookup {
            ctx: &ctx,
            options: &self.options,
            builder: &builder,
            identities: &identities,
        };
        let extractor =
            DefaultExtractor::new(&ctx, &lookup, &library_id, self.options.max_default_depth);
        let mut defaults = 0usize;
        for (analysis, sources) in analyses.iter_mut().zip(&slot_sources) {
            for (slot, source) in analysis.pattern.slots.iter_mut().zip(sources) {
                slot.default_value = extractor.extract(&slot.id, source);
                defaults += usize::from(slot.default_value.is_some());
            }
        }

        let entries: Vec<BundleEntry> = analyses
            .iter()
            .map(|analysis| BundleEntry {
                id: analysis.pattern.id.clone(),
                path: analysis.path.clone(),
            })
            .collect();
        let bundle = self.bundler.bundle(self.fs.as_ref(), &entries)?;

        info!(
            files = ctx.file_count(),
            patterns = analyses.len(),
            properties = analyses.iter().map(|a| a.properties.len()).sum::<usize>(),
            defaults,
            "library analysis finished"
        );

        Ok(LibraryAnalysis {
            id: library_id,
            path: root,
            package_file,
            patterns: analyses,
            bundle,
        })
    }

    fn read_package(&self, root: &Path) -> Result<Value, AnalyzeError> {
        let path = root.join(PACKAGE_FILE);
        if !self.fs.exists(&path) {
            return Err(AnalyzeError::PackageNotFound { path });
        }
        let text = self
            .fs
            .read_to_string(&path)
            .map_err(|source| AnalyzeError::Io {
                path: path.clone(),
                source,
            })?;
        serde_json::from_str(&text).map_err(|source| AnalyzeError::InvalidPackage { path, source })
    }

    /// Typings entry: the dedicated key, then `types`/`typings`, then a
    /// declaration next to `main`, then `./index.d.ts`.
    fn typings_entry(&self, root: &Path, package: &Value) -> Result<PathBuf, AnalyzeError> {
        let field = |key: &str| package.get(key).and_then(Value::as_str);

        let declared = [self.options.typings_entry_key.as_str(), "types", "typings"]
            .into_iter()
            .find_map(field);
        if let Some(declared) = declared {
            let path = normalize_path(&root.join(declared));
            if !self.fs.exists(&path) {
                return Err(AnalyzeError::MissingEntry { path });
            }
            return Ok(path);
        }

        let from_main = field("main").and_then(|main| {
            let stem = [".js", ".jsx", ".mjs", ".cjs"]
                .iter()
                .find_map(|ext| main.strip_suffix(ext))
                .unwrap_or(main);
            self.options
                .declaration_extensions
                .iter()
                .map(|ext| normalize_path(&root.join(format!("{stem}{ext}"))))
                .find(|path| self.fs.exists(path))
        });
        if let Some(path) = from_main {
            return Ok(path);
        }

        let path = normalize_path(&root.join(DEFAULT_TYPINGS));
        if self.fs.exists(&path) {
            Ok(path)
        } else {
            Err(AnalyzeError::MissingEntry { path })
        }
    }

    /// Register the components exported by one discovered file.
    fn collect_file<'c>(
        &self,
        ctx: &'c TypeContext,
        builder: &PatternBuilder<'c>,
        file: FileId,
        candidate: &PatternCandidate,
        mut registry: Registry,
    ) -> Registry {
        for component in exported_components(ctx, &self.options, file) {
            let key = component.shape.key;
            if component.ignore {
                debug!(export = %component.export_name, candidate = %candidate.id, "ignored");
                continue;
            }
            if registry.identities.contains_key(&key) {
                debug!(export = %component.export_name, candidate = %candidate.id, "duplicate export skipped");
                continue;
            }

            let build = builder.build(&component, &registry.property_ids);
            debug!(
                pattern = %build.pattern.name,
                properties = build.pattern.property_ids.len(),
                slots = build.pattern.slots.len(),
                "pattern registered"
            );
            registry.register(key, build, candidate);
        }
        registry
    }
}

/// Run-scoped accumulator threaded through the candidate fold.
#[derive(Default)]
struct Registry {
    analyses: Vec<PatternAnalysis>,
    /// Parallel to `analyses`.
    slot_sources: Vec<Vec<SlotSource>>,
    identities: HashMap<DeclKey, PatternIdentity>,
    property_ids: HashMap<MemberKey, String>,
}

impl Registry {
    fn register(&mut self, key: DeclKey, build: PatternBuild, candidate: &PatternCandidate) {
        self.identities.insert(key, build.identity());
        for (member, property) in build.minted.iter().zip(&build.properties) {
            self.property_ids.insert(*member, property.id.clone());
        }
        self.slot_sources.push(build.slot_sources);
        self.analyses.push(PatternAnalysis {
            path: candidate.artifact_path.clone(),
            declaration_path: candidate.declaration_path.clone(),
            pattern: build.pattern,
            properties: build.properties,
        });
    }
}

/// Registered patterns first, anything else analyzed on demand.
struct RunLookup<'r> {
    ctx: &'r TypeContext,
    options: &'r AnalyzerOptions,
    builder: &'r PatternBuilder<'r>,
    identities: &'r HashMap<DeclKey, PatternIdentity>,
}

impl PatternLookup for RunLookup<'_> {
    fn identity(&self, key: DeclKey) -> Option<PatternIdentity> {
        if let Some(identity) = self.identities.get(&key) {
            return Some(identity.clone());
        }
        let component = exported_component(self.ctx, self.options, self.ctx.export_name_of(key), key)?;
        if component.ignore {
            return None;
        }
        Some(self.builder.build(&component, &HashMap::new()).identity())
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unexpected panic".to_string())
}

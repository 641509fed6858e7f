//! # Pattern Library Analyzer
//!
//! Reads the TypeScript declarations of a compiled UI component library and
//! produces a serializable description of every component ("pattern") it
//! exports: typed properties, content slots and default content.
//!
//! ## Run Invariants
//!
//! 1. **One Context Per Run**: every declaration file reachable from the
//!    typings entry is parsed once into a read-only `TypeContext` shared by all
//!    steps of the run.
//!
//! 2. **Explicit Accumulator**: patterns and property identities are collected
//!    in a run-scoped registry threaded through a fold. Nothing is global.
//!
//! 3. **Member Identity**: a props member declared once and shared by several
//!    components yields one property, minted by the first pattern that uses it.
//!
//! 4. **Stable Ids**: ids are SHA-256 digests of context strings. Continuity
//!    with an earlier analysis goes through an injected `IdStrategy`.
//!
//! 5. **All Or Nothing**: a run returns a complete analysis or the first fatal
//!    error. Unknown property shapes and broken `@default` examples are never
//!    fatal.

#[cfg(feature = "napi")]
mod native;

mod analyzer;
mod bundle;
mod classify;
mod component;
mod declarations;
mod defaults;
mod discovery;
mod error;
mod filesystem;
mod ids;
mod jsdoc;
mod markup;
mod model;
mod options;
mod pattern;
mod program;
mod slots;

#[cfg(test)]
mod defaults_tests;
#[cfg(test)]
mod slots_tests;
#[cfg(test)]
mod test_support;

#[cfg(feature = "napi")]
pub use native::analyze_library_native;

pub use analyzer::Analyzer;
pub use bundle::{BundleEntry, BundleError, Bundler, ModuleMapBundler};
pub use discovery::significant_path;
pub use error::AnalyzeError;
pub use filesystem::{normalize_path, FileSystem, MemoryFileSystem, RealFileSystem};
pub use ids::{assign_id, nested_id, pattern_id, FreshIds, IdCallbacks, IdStrategy, PreviousLibraryIds};
pub use jsdoc::{find_default_block, DocComment, DocTag};
pub use model::*;
pub use options::AnalyzerOptions;

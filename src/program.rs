//! Type Context
//!
//! One read-only view over every declaration file discovered for a library.
//! Resolves module specifiers, export and local names, qualified names and
//! aliases, and collects the apparent members of object-like types. Nothing
//! here mutates after construction, so one context is shared by every step of
//! a run.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::declarations::{
    DeclarationIr, DeclarationKind, ExportTarget, Imported, LiteralType, Member, ModuleIr,
    TypeExpr,
};
use crate::filesystem::normalize_path;

const MAX_TYPE_DEPTH: usize = 32;

pub type FileId = usize;

/// Identity of a declaration within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclKey {
    pub file: FileId,
    pub index: usize,
}

/// Identity of a property member within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberKey {
    pub file: FileId,
    pub span_start: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Declaration(DeclKey),
    /// The export namespace of a library file.
    Namespace(FileId),
    /// A name outside the library. An empty `path` is the module namespace.
    External { module: String, path: Vec<String> },
}

impl Symbol {
    /// Last segment of an external name.
    pub fn external_name(&self) -> Option<&str> {
        match self {
            Symbol::External { path, .. } => path.last().map(String::as_str),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Space {
    Type,
    Value,
    Any,
}

#[derive(Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    pub module: ModuleIr,
}

/// A member reached through some type, tagged with the file it was declared
/// in.
#[derive(Debug, Clone, Copy)]
pub struct MemberRef<'c> {
    pub file: FileId,
    pub member: &'c Member,
    /// Optionality after mapped wrappers such as `Partial`.
    pub optional: bool,
}

impl MemberRef<'_> {
    pub fn key(&self) -> MemberKey {
        MemberKey {
            file: self.file,
            span_start: self.member.span_start,
        }
    }
}

#[derive(Debug)]
pub struct TypeContext {
    root: PathBuf,
    package_name: Option<String>,
    entry: FileId,
    extensions: Vec<String>,
    files: Vec<SourceFile>,
    by_path: HashMap<PathBuf, FileId>,
}

impl TypeContext {
    /// Build a context. `files[0]` is the typings entry.
    pub fn new(
        root: &Path,
        package_name: Option<String>,
        extensions: Vec<String>,
        files: Vec<SourceFile>,
    ) -> Self {
        let by_path = files
            .iter()
            .enumerate()
            .map(|(id, file)| (normalize_path(&file.path), id))
            .collect();
        Self {
            root: normalize_path(root),
            package_name,
            entry: 0,
            extensions,
            files,
            by_path,
        }
    }

    pub fn entry(&self) -> FileId {
        self.entry
    }

    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id]
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn file_id(&self, path: &Path) -> Option<FileId> {
        self.by_path.get(&normalize_path(path)).copied()
    }

    pub fn declaration(&self, key: DeclKey) -> &DeclarationIr {
        &self.files[key.file].module.declarations[key.index]
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Module resolution
    // ───────────────────────────────────────────────────────────────────────────

    /// Resolve a module specifier used in `from` to a library file.
    pub fn resolve_module(&self, from: FileId, specifier: &str) -> Option<FileId> {
        if let Some(rest) = self.self_reference(specifier) {
            if rest.is_empty() {
                return Some(self.entry);
            }
            return module_candidates(&self.root, &format!("./{rest}"), &self.extensions)
                .into_iter()
                .find_map(|candidate| self.file_id(&candidate));
        }

        if !is_relative(specifier) {
            return None;
        }
        let dir = self.files[from].path.parent()?;
        module_candidates(dir, specifier, &self.extensions)
            .into_iter()
            .find_map(|candidate| self.file_id(&candidate))
    }

    /// Path inside the package when `specifier` names this library itself.
    fn self_reference<'s>(&self, specifier: &'s str) -> Option<&'s str> {
        let package = self.package_name.as_deref()?;
        let rest = specifier.strip_prefix(package)?;
        if rest.is_empty() {
            Some("")
        } else {
            rest.strip_prefix('/')
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Name resolution
    // ───────────────────────────────────────────────────────────────────────────

    pub fn resolve_export(&self, file: FileId, name: &str) -> Option<Symbol> {
        let mut visited = HashSet::new();
        self.resolve_export_guarded(file, name, &mut visited)
    }

    fn resolve_export_guarded(
        &self,
        file: FileId,
        name: &str,
        visited: &mut HashSet<(FileId, String)>,
    ) -> Option<Symbol> {
        if !visited.insert((file, name.to_string())) {
            return None;
        }
        let module = &self.files[file].module;

        for entry in module.exports.iter().filter(|e| e.exported == name) {
            let symbol = match &entry.target {
                ExportTarget::Local(local) => {
                    self.resolve_local_guarded(file, local, Space::Any, visited)
                }
                ExportTarget::Reexport { source, imported } => {
                    self.resolve_import(file, source, imported, visited)
                }
            };
            if symbol.is_some() {
                return symbol;
            }
        }

        if name == "default" {
            return None;
        }
        module.star_exports.iter().find_map(|source| {
            let target = self.resolve_module(file, source)?;
            self.resolve_export_guarded(target, name, visited)
        })
    }

    pub fn resolve_local(&self, file: FileId, name: &str, space: Space) -> Option<Symbol> {
        let mut visited = HashSet::new();
        self.resolve_local_guarded(file, name, space, &mut visited)
    }

    fn resolve_local_guarded(
        &self,
        file: FileId,
        name: &str,
        space: Space,
        visited: &mut HashSet<(FileId, String)>,
    ) -> Option<Symbol> {
        let module = &self.files[file].module;
        let declared = module.declarations.iter().position(|d| {
            d.name == name
                && match space {
                    Space::Type => d.kind.is_type(),
                    Space::Value => d.kind.is_value(),
                    Space::Any => true,
                }
        });
        if let Some(index) = declared {
            return Some(Symbol::Declaration(DeclKey { file, index }));
        }

        let binding = module.imports.iter().find(|i| i.local == name)?;
        self.resolve_import(file, &binding.source, &binding.imported, visited)
    }

    fn resolve_import(
        &self,
        file: FileId,
        source: &str,
        imported: &Imported,
        visited: &mut HashSet<(FileId, String)>,
    ) -> Option<Symbol> {
        match self.resolve_module(file, source) {
            Some(target) => match imported.export_name() {
                Some(name) => self.resolve_export_guarded(target, name, visited),
                None => Some(Symbol::Namespace(target)),
            },
            None => Some(Symbol::External {
                module: source.to_string(),
                path: imported
                    .export_name()
                    .map(|name| vec![name.to_string()])
                    .unwrap_or_default(),
            }),
        }
    }

    /// Resolve a possibly qualified name as seen from `file`.
    pub fn resolve_qualified(&self, file: FileId, segments: &[String], space: Space) -> Option<Symbol> {
        let (first, rest) = segments.split_first()?;
        let first_space = if rest.is_empty() { space } else { Space::Any };
        let mut symbol = self.resolve_local(file, first, first_space)?;
        for segment in rest {
            symbol = match symbol {
                Symbol::Namespace(target) => self.resolve_export(target, segment)?,
                Symbol::External { module, mut path } => {
                    path.push(segment.clone());
                    Symbol::External { module, path }
                }
                Symbol::Declaration(_) => return None,
            };
        }
        Some(symbol)
    }

    /// Resolve the target of a type reference.
    pub fn resolve_reference(&self, file: FileId, ty: &TypeExpr) -> Option<Symbol> {
        let TypeExpr::Reference { module, name, .. } = ty else {
            return None;
        };
        match module {
            Some(specifier) => {
                let (first, rest) = name.split_first()?;
                let mut symbol = match self.resolve_module(file, specifier) {
                    Some(target) => self.resolve_export(target, first)?,
                    None => Symbol::External {
                        module: specifier.clone(),
                        path: vec![first.clone()],
                    },
                };
                for segment in rest {
                    symbol = match symbol {
                        Symbol::Namespace(target) => self.resolve_export(target, segment)?,
                        Symbol::External { module, mut path } => {
                            path.push(segment.clone());
                            Symbol::External { module, path }
                        }
                        Symbol::Declaration(_) => return None,
                    };
                }
                Some(symbol)
            }
            None => self.resolve_qualified(file, name, Space::Type),
        }
    }

    /// Follow type aliases until a non-alias type is reached.
    pub fn resolve_alias<'c>(&'c self, file: FileId, ty: &'c TypeExpr) -> (FileId, &'c TypeExpr) {
        let mut current = (file, ty);
        for _ in 0..MAX_TYPE_DEPTH {
            match self.alias_target(current.0, current.1) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// One level of alias resolution.
    pub fn alias_target<'c>(
        &'c self,
        file: FileId,
        ty: &'c TypeExpr,
    ) -> Option<(FileId, &'c TypeExpr)> {
        let Some(Symbol::Declaration(key)) = self.resolve_reference(file, ty) else {
            return None;
        };
        match &self.declaration(key).kind {
            DeclarationKind::TypeAlias { ty } => Some((key.file, ty)),
            _ => None,
        }
    }

    /// Exports of `file` that name a declaration made in that same file.
    pub fn local_exports(&self, file: FileId) -> Vec<(String, DeclKey)> {
        let module = &self.files[file].module;
        module
            .exports
            .iter()
            .filter_map(|entry| {
                let ExportTarget::Local(local) = &entry.target else {
                    return None;
                };
                let index = module
                    .declarations
                    .iter()
                    .position(|d| &d.name == local && d.kind.is_value())
                    .or_else(|| module.declarations.iter().position(|d| &d.name == local))?;
                Some((entry.exported.clone(), DeclKey { file, index }))
            })
            .collect()
    }

    /// Name under which a declaration is exported from its own file.
    pub fn export_name_of(&self, key: DeclKey) -> String {
        self.local_exports(key.file)
            .into_iter()
            .find(|(_, k)| *k == key)
            .map(|(name, _)| name)
            .unwrap_or_else(|| self.declaration(key).name.clone())
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Members
    // ───────────────────────────────────────────────────────────────────────────

    /// Apparent members of an object-like type, own members first. A member
    /// name appears once: declarations shadow inherited members.
    pub fn apparent_members<'c>(&'c self, file: FileId, ty: &'c TypeExpr) -> Vec<MemberRef<'c>> {
        let mut members = Vec::new();
        self.collect_members(file, ty, &mut members, 0);
        members
    }

    fn collect_members<'c>(
        &'c self,
        file: FileId,
        ty: &'c TypeExpr,
        out: &mut Vec<MemberRef<'c>>,
        depth: usize,
    ) {
        if depth > MAX_TYPE_DEPTH {
            return;
        }
        match ty {
            TypeExpr::Object(members) => {
                for member in members {
                    push_member(out, file, member, member.optional);
                }
            }
            TypeExpr::Intersection(parts) => {
                for part in parts {
                    self.collect_members(file, part, out, depth + 1);
                }
            }
            TypeExpr::Reference { name, args, .. } => match self.resolve_reference(file, ty) {
                Some(Symbol::Declaration(key)) => {
                    self.collect_declaration_members(key, out, depth + 1)
                }
                _ => self.collect_wrapper_members(file, name, args, out, depth + 1),
            },
            _ => {}
        }
    }

    fn collect_declaration_members<'c>(
        &'c self,
        key: DeclKey,
        out: &mut Vec<MemberRef<'c>>,
        depth: usize,
    ) {
        match &self.declaration(key).kind {
            DeclarationKind::Interface { extends, members } => {
                for member in members {
                    push_member(out, key.file, member, member.optional);
                }
                for heritage in extends {
                    self.collect_members(key.file, heritage, out, depth);
                }
            }
            DeclarationKind::TypeAlias { ty } => self.collect_members(key.file, ty, out, depth),
            _ => {}
        }
    }

    /// Utility wrappers from outside the library that keep their argument's
    /// members.
    fn collect_wrapper_members<'c>(
        &'c self,
        file: FileId,
        name: &[String],
        args: &'c [TypeExpr],
        out: &mut Vec<MemberRef<'c>>,
        depth: usize,
    ) {
        let Some(inner) = args.first() else {
            return;
        };
        let wrapper = name.last().map(String::as_str).unwrap_or_default();
        let mut members = Vec::new();
        match wrapper {
            "Readonly" | "PropsWithChildren" | "PropsWithRef" | "PropsWithoutRef" | "Required"
            | "Partial" | "Omit" | "Pick" => self.collect_members(file, inner, &mut members, depth),
            _ => return,
        }

        let picked = args.get(1).map(string_literals).unwrap_or_default();
        for mut member in members {
            match wrapper {
                "Partial" => member.optional = true,
                "Required" => member.optional = false,
                "Omit" if picked.contains(&member.member.name.as_str()) => continue,
                "Pick" if !picked.contains(&member.member.name.as_str()) => continue,
                _ => {}
            }
            if !out.iter().any(|m| m.member.name == member.member.name) {
                out.push(member);
            }
        }
    }
}

fn push_member<'c>(out: &mut Vec<MemberRef<'c>>, file: FileId, member: &'c Member, optional: bool) {
    if out.iter().any(|m| m.member.name == member.name) {
        return;
    }
    out.push(MemberRef {
        file,
        member,
        optional,
    });
}

fn string_literals(ty: &TypeExpr) -> Vec<&str> {
    match ty {
        TypeExpr::Literal(LiteralType::String(value)) => vec![value.as_str()],
        TypeExpr::Union(parts) => parts.iter().flat_map(string_literals).collect(),
        _ => Vec::new(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MODULE SPECIFIERS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../") || specifier == "." || specifier == ".."
}

/// Candidate declaration files for a relative specifier, in probe order.
pub fn module_candidates(dir: &Path, specifier: &str, extensions: &[String]) -> Vec<PathBuf> {
    let base = normalize_path(&dir.join(specifier));
    let base_str = base.to_string_lossy().to_string();
    let mut candidates = Vec::new();

    if extensions.iter().any(|ext| base_str.ends_with(ext.as_str())) {
        candidates.push(base.clone());
    }

    // `./button.js` in declarations refers to `./button.d.ts`
    let stem = [".js", ".jsx", ".mjs", ".cjs"]
        .iter()
        .find_map(|ext| base_str.strip_suffix(ext))
        .unwrap_or(&base_str);

    for ext in extensions {
        candidates.push(PathBuf::from(format!("{stem}{ext}")));
    }
    for ext in extensions {
        candidates.push(base.join(format!("index{ext}")));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declarations::parse_declarations;

    fn context(files: &[(&str, &str)]) -> TypeContext {
        let files = files
            .iter()
            .map(|(path, source)| SourceFile {
                path: PathBuf::from(path),
                module: parse_declarations(path, source),
            })
            .collect();
        TypeContext::new(
            Path::new("/lib"),
            Some("my-lib".to_string()),
            vec![".d.ts".to_string()],
            files,
        )
    }

    #[test]
    fn test_module_candidates_probe_order() {
        let candidates = module_candidates(Path::new("/lib/src"), "./button", &[".d.ts".to_string()]);
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/lib/src/button.d.ts"),
                PathBuf::from("/lib/src/button/index.d.ts"),
            ]
        );
    }

    #[test]
    fn test_resolves_star_and_named_reexports() {
        let ctx = context(&[
            ("/lib/index.d.ts", "export * from './button';\nexport { Card as Panel } from './card';"),
            ("/lib/button.d.ts", "export declare const Button: FC<{}>;"),
            ("/lib/card.d.ts", "export declare const Card: FC<{}>;"),
        ]);

        assert_eq!(
            ctx.resolve_export(0, "Button"),
            Some(Symbol::Declaration(DeclKey { file: 1, index: 0 }))
        );
        assert_eq!(
            ctx.resolve_export(0, "Panel"),
            Some(Symbol::Declaration(DeclKey { file: 2, index: 0 }))
        );
        assert_eq!(ctx.resolve_export(0, "Missing"), None);
    }

    #[test]
    fn test_self_reference_resolves_to_entry() {
        let ctx = context(&[
            ("/lib/index.d.ts", "export * from './button';"),
            ("/lib/button.d.ts", "import * as Lib from 'my-lib';\nexport declare const Button: FC<{}>;"),
        ]);
        assert_eq!(ctx.resolve_module(1, "my-lib"), Some(0));
        assert_eq!(ctx.resolve_local(1, "Lib", Space::Any), Some(Symbol::Namespace(0)));
        assert_eq!(ctx.resolve_module(1, "my-lib-other"), None);
    }

    #[test]
    fn test_external_names_keep_their_path() {
        let ctx = context(&[(
            "/lib/index.d.ts",
            "import * as React from 'react';\nimport { ReactNode as Node } from 'react';",
        )]);
        let segments = vec!["React".to_string(), "ReactElement".to_string()];
        assert_eq!(
            ctx.resolve_qualified(0, &segments, Space::Type),
            Some(Symbol::External {
                module: "react".to_string(),
                path: vec!["ReactElement".to_string()],
            })
        );
        let node = ctx.resolve_qualified(0, &["Node".to_string()], Space::Type);
        assert_eq!(node.as_ref().and_then(Symbol::external_name), Some("ReactNode"));
    }

    #[test]
    fn test_apparent_members_shadow_inherited() {
        let ctx = context(&[(
            "/lib/index.d.ts",
            r#"
interface Base { size: number; tone: string; }
interface Props extends Base { size: string; label: string; }
type Wrapped = Props & { extra: boolean };
type Loose = Partial<Omit<Props, "tone">>;
"#,
        )]);
        let wrapped = TypeExpr::Reference {
            module: None,
            name: vec!["Wrapped".to_string()],
            args: Vec::new(),
        };
        let names: Vec<_> = ctx
            .apparent_members(0, &wrapped)
            .iter()
            .map(|m| (m.member.name.as_str(), m.member.type_text.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![("size", "string"), ("label", "string"), ("tone", "string"), ("extra", "boolean")]
        );

        let loose = TypeExpr::Reference {
            module: None,
            name: vec!["Loose".to_string()],
            args: Vec::new(),
        };
        let members = ctx.apparent_members(0, &loose);
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|m| m.optional));
    }

    #[test]
    fn test_alias_chain_resolves() {
        let ctx = context(&[(
            "/lib/index.d.ts",
            "type A = B;\ntype B = C;\ntype C = string;",
        )]);
        let a = TypeExpr::Reference {
            module: None,
            name: vec!["A".to_string()],
            args: Vec::new(),
        };
        let (_, resolved) = ctx.resolve_alias(0, &a);
        assert_eq!(resolved, &TypeExpr::Keyword(crate::declarations::Keyword::String));
    }
}

//! Default Content Extractor
//!
//! Reads the `@default` example of a slot and turns it into an
//! [`ElementCandidate`] tree. Every failure is local to the slot: the slot
//! simply gets no default.

use tracing::debug;

use crate::declarations::Imported;
use crate::ids::nested_id;
use crate::jsdoc::find_default_block;
use crate::markup::{parse_markup, MarkupElement, MarkupImport};
use crate::model::{ElementCandidate, ElementPropCandidate};
use crate::pattern::{PatternIdentity, SlotSource};
use crate::program::{DeclKey, FileId, Space, Symbol, TypeContext};

/// Pattern identities of referenced components.
pub trait PatternLookup {
    /// Identity of the pattern declared at `key`, or `None` when the
    /// declaration is not a component.
    fn identity(&self, key: DeclKey) -> Option<PatternIdentity>;
}

pub struct DefaultExtractor<'c> {
    ctx: &'c TypeContext,
    patterns: &'c dyn PatternLookup,
    library_id: &'c str,
    max_depth: usize,
}

impl<'c> DefaultExtractor<'c> {
    pub fn new(
        ctx: &'c TypeContext,
        patterns: &'c dyn PatternLookup,
        library_id: &'c str,
        max_depth: usize,
    ) -> Self {
        Self {
            ctx,
            patterns,
            library_id,
            max_depth,
        }
    }

    /// Default content of the slot `slot_id`.
    pub fn extract(&self, slot_id: &str, source: &SlotSource) -> Option<ElementCandidate> {
        let block = find_default_block(source.doc.as_deref()?)?;
        let module = match parse_markup(&block, self.max_depth) {
            Ok(module) => module,
            Err(err) => {
                debug!(slot = %slot_id, error = %err, "default example is not valid markup");
                return None;
            }
        };

        let scope = Scope {
            file: source.file,
            imports: &module.imports,
        };
        self.element(&scope, &module.root, nested_id(slot_id, "default"), slot_id)
    }

    fn element(
        &self,
        scope: &Scope<'_>,
        markup: &MarkupElement,
        id: String,
        parent: &str,
    ) -> Option<ElementCandidate> {
        let Some(identity) = self
            .resolve_tag(scope, &markup.name)
            .and_then(|key| self.patterns.identity(key))
        else {
            debug!(tag = %markup.tag(), parent = %parent, "default element is not a known component");
            return None;
        };

        let props = markup
            .attributes
            .iter()
            .filter_map(|attribute| {
                Some(ElementPropCandidate {
                    property_name: attribute.name.clone(),
                    property_id: identity.property_ids.get(&attribute.name).cloned(),
                    value: attribute.value.clone()?,
                })
            })
            .collect();

        let children = markup
            .children
            .iter()
            .enumerate()
            .map(|(index, child)| self.element(scope, child, nested_id(&id, &index.to_string()), &id))
            .collect::<Option<Vec<_>>>()?;

        Some(ElementCandidate {
            parent: parent.to_string(),
            library_id: self.library_id.to_string(),
            pattern_context_id: identity.context_id,
            pattern_id: identity.id,
            props,
            children,
            id,
        })
    }

    /// Resolve `Tag` or `Namespace.Tag`: example imports first, then the
    /// declaring file, then the library entry.
    fn resolve_tag(&self, scope: &Scope<'_>, name: &[String]) -> Option<DeclKey> {
        let (first, rest) = name.split_first()?;

        let symbol = match scope.imports.iter().find(|i| &i.local == first) {
            Some(import) => self.resolve_import(scope.file, import)?,
            None => self
                .ctx
                .resolve_local(scope.file, first, Space::Value)
                .or_else(|| self.ctx.resolve_export(self.ctx.entry(), first))?,
        };

        let symbol = match (symbol, rest) {
            (symbol, []) => symbol,
            (Symbol::Namespace(file), [member]) => self.ctx.resolve_export(file, member)?,
            _ => return None,
        };
        match symbol {
            Symbol::Declaration(key) => Some(key),
            _ => None,
        }
    }

    fn resolve_import(&self, file: FileId, import: &MarkupImport) -> Option<Symbol> {
        let target = self.ctx.resolve_module(file, &import.source)?;
        match &import.imported {
            Imported::Namespace => Some(Symbol::Namespace(target)),
            imported => self.ctx.resolve_export(target, imported.export_name()?),
        }
    }
}

struct Scope<'m> {
    file: FileId,
    imports: &'m [MarkupImport],
}

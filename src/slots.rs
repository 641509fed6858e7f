//! Slot Detector
//!
//! Decides whether a props member accepts nested renderable content and how
//! many children it takes.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingIdentifier, Declaration, ExportDefaultDeclarationKind, IdentifierName,
    IdentifierReference, Program, Statement,
};
use oxc_ast_visit::Visit;
use oxc_parser::Parser;
use oxc_span::SourceType;
use std::path::Path;
use tracing::{debug, warn};

use crate::declarations::{Keyword, TypeExpr};
use crate::filesystem::FileSystem;
use crate::jsdoc::DocComment;
use crate::model::{SlotKind, SlotQuantity};
use crate::options::AnalyzerOptions;
use crate::program::{FileId, MemberRef, Symbol, TypeContext};

/// Alias levels followed before giving up on a type.
const ALIAS_BUDGET: usize = 1;

pub const CHILDREN: &str = "children";

pub fn slot_kind(property_name: &str) -> SlotKind {
    if property_name == CHILDREN {
        SlotKind::Children
    } else {
        SlotKind::Property
    }
}

pub struct SlotDetector<'c> {
    ctx: &'c TypeContext,
    options: &'c AnalyzerOptions,
}

impl<'c> SlotDetector<'c> {
    pub fn new(ctx: &'c TypeContext, options: &'c AnalyzerOptions) -> Self {
        Self { ctx, options }
    }

    /// Cardinality of the slot this member denotes, or `None` for a plain
    /// property.
    pub fn detect(&self, member: &MemberRef<'_>, doc: &DocComment) -> Option<SlotQuantity> {
        let ty = member.member.ty.as_ref();

        if doc.has_tag("slot") {
            let quantity = ty
                .and_then(|ty| self.quantity(member.file, ty, ALIAS_BUDGET))
                .or_else(|| match ty {
                    Some(TypeExpr::Array(_)) => Some(SlotQuantity::Multiple),
                    _ => None,
                })
                .unwrap_or(SlotQuantity::Single);
            return Some(quantity);
        }

        if member.member.name == CHILDREN && is_unconstrained(ty) {
            return Some(SlotQuantity::Single);
        }

        self.quantity(member.file, ty?, ALIAS_BUDGET)
    }

    /// Whether a bare type is a slot type, ignoring documentation.
    #[cfg(test)]
    pub fn is_slot(&self, file: FileId, ty: &TypeExpr) -> bool {
        self.quantity(file, ty, ALIAS_BUDGET).is_some()
    }

    fn quantity(&self, file: FileId, ty: &TypeExpr, aliases: usize) -> Option<SlotQuantity> {
        match ty {
            TypeExpr::Array(element) => self
                .quantity(file, element, aliases)
                .map(|_| SlotQuantity::Multiple),
            TypeExpr::Union(parts) => {
                let mut result = None;
                for part in parts.iter().filter(|p| !p.is_nullish()) {
                    match self.quantity(file, part, aliases) {
                        Some(SlotQuantity::Multiple) => result = Some(SlotQuantity::Multiple),
                        Some(SlotQuantity::Single) => {
                            result.get_or_insert(SlotQuantity::Single);
                        }
                        None => {}
                    }
                }
                result
            }
            TypeExpr::Reference { name, args, .. } => {
                if self.options.is_slot_type_name(name) {
                    return Some(SlotQuantity::Single);
                }

                let symbol = self.ctx.resolve_reference(file, ty);
                let is_library_type = matches!(symbol, Some(Symbol::Declaration(_)));
                if !is_library_type && is_list_wrapper(name) && args.len() == 1 {
                    return self
                        .quantity(file, &args[0], aliases)
                        .map(|_| SlotQuantity::Multiple);
                }

                match symbol? {
                    Symbol::External { path, .. } => self
                        .options
                        .is_slot_type_name(&path)
                        .then_some(SlotQuantity::Single),
                    Symbol::Declaration(_) if aliases > 0 => {
                        let (alias_file, target) = self.ctx.alias_target(file, ty)?;
                        self.quantity(alias_file, target, aliases - 1)
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

fn is_list_wrapper(name: &[String]) -> bool {
    matches!(
        name.last().map(String::as_str),
        Some("Array") | Some("ReadonlyArray")
    )
}

fn is_unconstrained(ty: Option<&TypeExpr>) -> bool {
    matches!(
        ty,
        None | Some(TypeExpr::Keyword(Keyword::Any)) | Some(TypeExpr::Keyword(Keyword::Unknown))
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// IMPLEMENTATION SCAN
// ═══════════════════════════════════════════════════════════════════════════════

/// Whether the compiled implementation refers to `children` anywhere in the
/// declaration bound to `export_name`, or anywhere in the module when that
/// binding cannot be located.
pub fn implementation_uses_children(fs: &dyn FileSystem, artifact: &Path, export_name: &str) -> bool {
    let source = match fs.read_to_string(artifact) {
        Ok(source) => source,
        Err(err) => {
            debug!(artifact = %artifact.display(), error = %err, "implementation not readable");
            return false;
        }
    };

    let allocator = Allocator::default();
    let source_type = SourceType::from_path(artifact)
        .unwrap_or_default()
        .with_module(true)
        .with_jsx(true);
    let ret = Parser::new(&allocator, &source, source_type).parse();
    if ret.panicked {
        warn!(artifact = %artifact.display(), "implementation could not be parsed");
        return false;
    }

    let mut collector = ChildrenCollector::default();
    match binding_statement(&ret.program, export_name) {
        Some(statement) => collector.visit_statement(statement),
        None => collector.visit_program(&ret.program),
    }
    collector.found
}

#[derive(Default)]
struct ChildrenCollector {
    found: bool,
}

impl<'a> Visit<'a> for ChildrenCollector {
    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        if ident.name == CHILDREN {
            self.found = true;
        }
    }

    fn visit_identifier_name(&mut self, ident: &IdentifierName<'a>) {
        if ident.name == CHILDREN {
            self.found = true;
        }
    }

    fn visit_binding_identifier(&mut self, ident: &BindingIdentifier<'a>) {
        if ident.name == CHILDREN {
            self.found = true;
        }
    }
}

/// Top-level statement that declares the binding exported as `export_name`.
fn binding_statement<'p, 'a>(program: &'p Program<'a>, export_name: &str) -> Option<&'p Statement<'a>> {
    let mut local = export_name.to_string();

    for statement in &program.body {
        match statement {
            Statement::ExportDefaultDeclaration(export) if export_name == "default" => {
                match &export.declaration {
                    ExportDefaultDeclarationKind::Identifier(ident) => {
                        local = ident.name.to_string();
                    }
                    _ => return Some(statement),
                }
            }
            Statement::ExportNamedDeclaration(export) if export.source.is_none() => {
                if let Some(specifier) = export
                    .specifiers
                    .iter()
                    .find(|s| s.exported.name() == export_name)
                {
                    local = specifier.local.name().to_string();
                }
            }
            _ => {}
        }
    }

    program
        .body
        .iter()
        .find(|statement| statement_binds(statement, &local))
}

fn statement_binds(statement: &Statement<'_>, name: &str) -> bool {
    let declaration = match statement {
        Statement::ExportNamedDeclaration(export) => match &export.declaration {
            Some(declaration) => declaration,
            None => return false,
        },
        _ => match statement.as_declaration() {
            Some(declaration) => declaration,
            None => return false,
        },
    };

    match declaration {
        Declaration::VariableDeclaration(variables) => variables
            .declarations
            .iter()
            .any(|d| d.id.get_identifier_name().is_some_and(|n| n == name)),
        Declaration::FunctionDeclaration(function) => {
            function.id.as_ref().is_some_and(|id| id.name == name)
        }
        Declaration::ClassDeclaration(class) => class.id.as_ref().is_some_and(|id| id.name == name),
        _ => false,
    }
}

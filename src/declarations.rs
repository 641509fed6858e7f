//! Declaration Model
//!
//! Lowers a parsed `.d.ts` file into an owned, allocator-free model. Only the
//! shapes the analyzer reasons about are kept: imports, exports, top-level
//! declarations with their JSDoc text, and a structural view of type
//! expressions. Everything else collapses into `TypeExpr::Other`.

use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType};
use std::collections::HashMap;
use tracing::warn;

// ═══════════════════════════════════════════════════════════════════════════════
// MODEL
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct ModuleIr {
    pub imports: Vec<ImportBinding>,
    pub exports: Vec<ExportEntry>,
    /// Sources of `export * from "..."`.
    pub star_exports: Vec<String>,
    pub declarations: Vec<DeclarationIr>,
    /// Every module specifier the file references, in source order.
    pub dependencies: Vec<String>,
    /// File-level comment marked `@packageDocumentation`, `@module` or `@file`.
    pub file_doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportBinding {
    pub local: String,
    pub source: String,
    pub imported: Imported,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imported {
    Named(String),
    Default,
    Namespace,
}

impl Imported {
    fn from_name(name: &str) -> Self {
        if name == "default" {
            Imported::Default
        } else {
            Imported::Named(name.to_string())
        }
    }

    /// Export name this binding refers to, if it names a single export.
    pub fn export_name(&self) -> Option<&str> {
        match self {
            Imported::Named(name) => Some(name),
            Imported::Default => Some("default"),
            Imported::Namespace => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportEntry {
    pub exported: String,
    pub target: ExportTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportTarget {
    /// A binding of this file, declared or imported.
    Local(String),
    Reexport { source: String, imported: Imported },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationIr {
    pub name: String,
    pub span_start: u32,
    pub doc: Option<String>,
    pub kind: DeclarationKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationKind {
    Interface {
        extends: Vec<TypeExpr>,
        members: Vec<Member>,
    },
    TypeAlias {
        ty: TypeExpr,
    },
    Enum {
        members: Vec<EnumMemberIr>,
    },
    Class {
        extends: Option<TypeExpr>,
    },
    Function {
        params: Vec<Param>,
        returns: Option<TypeExpr>,
    },
    Variable {
        ty: Option<TypeExpr>,
    },
}

impl DeclarationKind {
    /// Declarations that live in the type namespace.
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            DeclarationKind::Interface { .. }
                | DeclarationKind::TypeAlias { .. }
                | DeclarationKind::Enum { .. }
                | DeclarationKind::Class { .. }
        )
    }

    /// Declarations that live in the value namespace.
    pub fn is_value(&self) -> bool {
        matches!(
            self,
            DeclarationKind::Enum { .. }
                | DeclarationKind::Class { .. }
                | DeclarationKind::Function { .. }
                | DeclarationKind::Variable { .. }
        )
    }
}

/// A property of an interface or object type.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub optional: bool,
    /// `None` when the member carries no annotation.
    pub ty: Option<TypeExpr>,
    pub type_text: String,
    pub doc: Option<String>,
    pub span_start: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMemberIr {
    pub name: String,
    pub init: EnumInit,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnumInit {
    None,
    String(String),
    Number(f64),
    /// Computed or otherwise non-literal initializer.
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Option<TypeExpr>,
    pub optional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Any,
    Unknown,
    Boolean,
    String,
    Number,
    BigInt,
    Null,
    Undefined,
    Void,
    Never,
    Object,
    Symbol,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralType {
    String(String),
    Number(f64),
    Boolean(bool),
    Template,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Keyword(Keyword),
    Literal(LiteralType),
    /// `A`, `A.B`, or `import("m").A` when `module` is set.
    Reference {
        module: Option<String>,
        name: Vec<String>,
        args: Vec<TypeExpr>,
    },
    Union(Vec<TypeExpr>),
    Intersection(Vec<TypeExpr>),
    Array(Box<TypeExpr>),
    Function {
        params: Vec<Param>,
        returns: Box<TypeExpr>,
    },
    Object(Vec<Member>),
    Other,
}

impl TypeExpr {
    pub fn is_nullish(&self) -> bool {
        matches!(
            self,
            TypeExpr::Keyword(Keyword::Null) | TypeExpr::Keyword(Keyword::Undefined)
        )
    }

    /// Reference to a single identifier with no module qualifier.
    pub fn simple_name(&self) -> Option<&str> {
        match self {
            TypeExpr::Reference {
                module: None, name, ..
            } if name.len() == 1 => Some(&name[0]),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARSING
// ═══════════════════════════════════════════════════════════════════════════════

/// Parse declaration source and lower it.
///
/// Syntax errors are logged. Whatever the parser recovered is
/// still lowered.
pub fn parse_declarations(file_name: &str, source: &str) -> ModuleIr {
    let allocator = Allocator::default();
    let source_type = SourceType::d_ts();
    let ret = Parser::new(&allocator, source, source_type).parse();

    if !ret.errors.is_empty() {
        warn!(
            file = file_name,
            errors = ret.errors.len(),
            "declaration file has syntax errors"
        );
    }

    let mut lowering = Lowering::new(source, &ret.program.comments);
    if ret.panicked {
        ModuleIr::default()
    } else {
        lowering.lower_program(&ret.program)
    }
}

const FILE_DOC_TAGS: [&str; 3] = ["@packageDocumentation", "@module", "@file"];

struct Lowering<'s> {
    source: &'s str,
    /// First JSDoc block attached to each token start.
    docs: HashMap<u32, String>,
    module: ModuleIr,
}

impl<'s> Lowering<'s> {
    fn new(source: &'s str, comments: &[Comment]) -> Self {
        let mut docs = HashMap::new();
        let mut module = ModuleIr::default();
        for comment in comments {
            if !comment.is_jsdoc() {
                continue;
            }
            let text = comment.content_span().source_text(source);
            if module.file_doc.is_none() && FILE_DOC_TAGS.iter().any(|tag| text.contains(tag)) {
                module.file_doc = Some(text.to_string());
                continue;
            }
            docs.entry(comment.attached_to)
                .or_insert_with(|| text.to_string());
        }
        Self {
            source,
            docs,
            module,
        }
    }

    fn doc_at(&self, start: u32) -> Option<String> {
        self.docs.get(&start).cloned()
    }

    fn lower_program(&mut self, program: &Program<'_>) -> ModuleIr {
        for statement in &program.body {
            self.lower_statement(statement);
        }
        std::mem::take(&mut self.module)
    }

    fn add_dependency(&mut self, source: &str) {
        if !self.module.dependencies.iter().any(|d| d == source) {
            self.module.dependencies.push(source.to_string());
        }
    }

    fn lower_statement(&mut self, statement: &Statement<'_>) {
        let anchor = statement.span().start;
        match statement {
            Statement::ImportDeclaration(import) => self.lower_import(import),
            Statement::ExportNamedDeclaration(export) => {
                if let Some(declaration) = &export.declaration {
                    for name in self.lower_declaration(declaration, anchor) {
                        self.module.exports.push(ExportEntry {
                            exported: name.clone(),
                            target: ExportTarget::Local(name),
                        });
                    }
                }

                if let Some(source) = &export.source {
                    let source = source.value.to_string();
                    self.add_dependency(&source);
                    for specifier in &export.specifiers {
                        self.module.exports.push(ExportEntry {
                            exported: specifier.exported.name().to_string(),
                            target: ExportTarget::Reexport {
                                source: source.clone(),
                                imported: Imported::from_name(&specifier.local.name()),
                            },
                        });
                    }
                } else {
                    for specifier in &export.specifiers {
                        self.module.exports.push(ExportEntry {
                            exported: specifier.exported.name().to_string(),
                            target: ExportTarget::Local(specifier.local.name().to_string()),
                        });
                    }
                }
            }
            Statement::ExportDefaultDeclaration(export) => self.lower_export_default(export, anchor),
            Statement::ExportAllDeclaration(export) => {
                let source = export.source.value.to_string();
                self.add_dependency(&source);
                match &export.exported {
                    Some(exported) => self.module.exports.push(ExportEntry {
                        exported: exported.name().to_string(),
                        target: ExportTarget::Reexport {
                            source,
                            imported: Imported::Namespace,
                        },
                    }),
                    None => self.module.star_exports.push(source),
                }
            }
            Statement::TSExportAssignment(assignment) => {
                if let Expression::Identifier(ident) = &assignment.expression {
                    self.module.exports.push(ExportEntry {
                        exported: "default".to_string(),
                        target: ExportTarget::Local(ident.name.to_string()),
                    });
                }
            }
            Statement::VariableDeclaration(_)
            | Statement::FunctionDeclaration(_)
            | Statement::ClassDeclaration(_)
            | Statement::TSTypeAliasDeclaration(_)
            | Statement::TSInterfaceDeclaration(_)
            | Statement::TSEnumDeclaration(_) => {
                if let Some(declaration) = statement.as_declaration() {
                    self.lower_declaration(declaration, anchor);
                }
            }
            _ => {}
        }
    }

    fn lower_import(&mut self, import: &ImportDeclaration<'_>) {
        let source = import.source.value.to_string();
        self.add_dependency(&source);
        let Some(specifiers) = &import.specifiers else {
            return;
        };
        for specifier in specifiers {
            let binding = match specifier {
                ImportDeclarationSpecifier::ImportSpecifier(s) => ImportBinding {
                    local: s.local.name.to_string(),
                    source: source.clone(),
                    imported: Imported::from_name(&s.imported.name()),
                },
                ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => ImportBinding {
                    local: s.local.name.to_string(),
                    source: source.clone(),
                    imported: Imported::Default,
                },
                ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => ImportBinding {
                    local: s.local.name.to_string(),
                    source: source.clone(),
                    imported: Imported::Namespace,
                },
            };
            self.module.imports.push(binding);
        }
    }

    fn lower_export_default(&mut self, export: &ExportDefaultDeclaration<'_>, anchor: u32) {
        let local = match &export.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(function) => {
                let name = function
                    .id
                    .as_ref()
                    .map(|id| id.name.to_string())
                    .unwrap_or_else(|| "default".to_string());
                self.push_function(&name, function, anchor);
                Some(name)
            }
            ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                let name = class
                    .id
                    .as_ref()
                    .map(|id| id.name.to_string())
                    .unwrap_or_else(|| "default".to_string());
                self.push_class(&name, class, anchor);
                Some(name)
            }
            ExportDefaultDeclarationKind::TSInterfaceDeclaration(interface) => {
                self.push_interface(interface, anchor);
                Some(interface.id.name.to_string())
            }
            ExportDefaultDeclarationKind::Identifier(ident) => Some(ident.name.to_string()),
            _ => None,
        };

        if let Some(local) = local {
            self.module.exports.push(ExportEntry {
                exported: "default".to_string(),
                target: ExportTarget::Local(local),
            });
        }
    }

    /// Lower one declaration, returning the names it binds.
    fn lower_declaration(&mut self, declaration: &Declaration<'_>, anchor: u32) -> Vec<String> {
        match declaration {
            Declaration::VariableDeclaration(variables) => {
                let doc = self.doc_at(anchor);
                let mut names = Vec::new();
                for declarator in &variables.declarations {
                    let Some(name) = declarator.id.get_identifier_name() else {
                        continue;
                    };
                    let ty = declarator
                        .type_annotation
                        .as_ref()
                        .map(|annotation| self.lower_type(&annotation.type_annotation));
                    self.module.declarations.push(DeclarationIr {
                        name: name.to_string(),
                        span_start: declarator.span.start,
                        doc: doc.clone(),
                        kind: DeclarationKind::Variable { ty },
                    });
                    names.push(name.to_string());
                }
                names
            }
            Declaration::FunctionDeclaration(function) => match &function.id {
                Some(id) => {
                    let name = id.name.to_string();
                    self.push_function(&name, function, anchor);
                    vec![name]
                }
                None => Vec::new(),
            },
            Declaration::ClassDeclaration(class) => match &class.id {
                Some(id) => {
                    let name = id.name.to_string();
                    self.push_class(&name, class, anchor);
                    vec![name]
                }
                None => Vec::new(),
            },
            Declaration::TSInterfaceDeclaration(interface) => {
                self.push_interface(interface, anchor);
                vec![interface.id.name.to_string()]
            }
            Declaration::TSTypeAliasDeclaration(alias) => {
                let ty = self.lower_type(&alias.type_annotation);
                self.module.declarations.push(DeclarationIr {
                    name: alias.id.name.to_string(),
                    span_start: alias.span.start,
                    doc: self.doc_at(anchor),
                    kind: DeclarationKind::TypeAlias { ty },
                });
                vec![alias.id.name.to_string()]
            }
            Declaration::TSEnumDeclaration(declaration) => {
                let members = declaration
                    .body
                    .members
                    .iter()
                    .filter_map(|member| self.lower_enum_member(member))
                    .collect();
                self.module.declarations.push(DeclarationIr {
                    name: declaration.id.name.to_string(),
                    span_start: declaration.span.start,
                    doc: self.doc_at(anchor),
                    kind: DeclarationKind::Enum { members },
                });
                vec![declaration.id.name.to_string()]
            }
            _ => Vec::new(),
        }
    }

    fn push_function(&mut self, name: &str, function: &Function<'_>, anchor: u32) {
        let mut params = self.lower_params(&function.params);
        if function.params.rest.is_some() {
            params.push(Param {
                name: "rest".to_string(),
                ty: None,
                optional: true,
            });
        }
        let returns = function
            .return_type
            .as_ref()
            .map(|annotation| self.lower_type(&annotation.type_annotation));
        self.module.declarations.push(DeclarationIr {
            name: name.to_string(),
            span_start: function.span.start,
            doc: self.doc_at(anchor),
            kind: DeclarationKind::Function { params, returns },
        });
    }

    fn push_class(&mut self, name: &str, class: &Class<'_>, anchor: u32) {
        let extends = class.super_class.as_ref().and_then(|super_class| {
            let name = expression_path(super_class)?;
            let args = class
                .super_type_arguments
                .as_ref()
                .map(|args| args.params.iter().map(|t| self.lower_type(t)).collect())
                .unwrap_or_default();
            Some(TypeExpr::Reference {
                module: None,
                name,
                args,
            })
        });
        self.module.declarations.push(DeclarationIr {
            name: name.to_string(),
            span_start: class.span.start,
            doc: self.doc_at(anchor),
            kind: DeclarationKind::Class { extends },
        });
    }

    fn push_interface(&mut self, interface: &TSInterfaceDeclaration<'_>, anchor: u32) {
        let extends = interface
            .extends
            .iter()
            .filter_map(|heritage| {
                let name = expression_path(&heritage.expression)?;
                let args = heritage
                    .type_arguments
                    .as_ref()
                    .map(|args| args.params.iter().map(|t| self.lower_type(t)).collect())
                    .unwrap_or_default();
                Some(TypeExpr::Reference {
                    module: None,
                    name,
                    args,
                })
            })
            .collect();
        let members = self.lower_signatures(&interface.body.body);
        self.module.declarations.push(DeclarationIr {
            name: interface.id.name.to_string(),
            span_start: interface.span.start,
            doc: self.doc_at(anchor),
            kind: DeclarationKind::Interface { extends, members },
        });
    }

    fn lower_enum_member(&self, member: &TSEnumMember<'_>) -> Option<EnumMemberIr> {
        let name = match &member.id {
            TSEnumMemberName::Identifier(ident) => ident.name.to_string(),
            TSEnumMemberName::String(lit) | TSEnumMemberName::ComputedString(lit) => {
                lit.value.to_string()
            }
            TSEnumMemberName::ComputedTemplateString(template) => {
                template.single_quasi()?.to_string()
            }
        };
        let init = match &member.initializer {
            None => EnumInit::None,
            Some(expression) => match numeric_value(expression) {
                Some(value) => EnumInit::Number(value),
                None => match expression {
                    Expression::StringLiteral(lit) => EnumInit::String(lit.value.to_string()),
                    _ => EnumInit::Other,
                },
            },
        };
        Some(EnumMemberIr {
            name,
            init,
            doc: self.doc_at(member.span.start),
        })
    }

    fn lower_signatures(&self, signatures: &[TSSignature<'_>]) -> Vec<Member> {
        signatures
            .iter()
            .filter_map(|signature| self.lower_signature(signature))
            .collect()
    }

    fn lower_signature(&self, signature: &TSSignature<'_>) -> Option<Member> {
        match signature {
            TSSignature::TSPropertySignature(property) => {
                let name = property.key.static_name()?.to_string();
                let (ty, type_text) = match &property.type_annotation {
                    Some(annotation) => (
                        Some(self.lower_type(&annotation.type_annotation)),
                        annotation
                            .type_annotation
                            .span()
                            .source_text(self.source)
                            .to_string(),
                    ),
                    None => (None, String::new()),
                };
                Some(Member {
                    name,
                    optional: property.optional,
                    ty,
                    type_text,
                    doc: self.doc_at(property.span.start),
                    span_start: property.span.start,
                })
            }
            TSSignature::TSMethodSignature(method) => {
                let name = method.key.static_name()?.to_string();
                let params = self.lower_params(&method.params);
                let returns = method
                    .return_type
                    .as_ref()
                    .map(|annotation| self.lower_type(&annotation.type_annotation))
                    .unwrap_or(TypeExpr::Keyword(Keyword::Any));
                let params_start = method.params.span.start;
                let type_text = Span::new(params_start, method.span.end)
                    .source_text(self.source)
                    .trim_end_matches(';')
                    .to_string();
                Some(Member {
                    name,
                    optional: method.optional,
                    ty: Some(TypeExpr::Function {
                        params,
                        returns: Box::new(returns),
                    }),
                    type_text,
                    doc: self.doc_at(method.span.start),
                    span_start: method.span.start,
                })
            }
            _ => None,
        }
    }

    fn lower_params(&self, params: &FormalParameters<'_>) -> Vec<Param> {
        params
            .items
            .iter()
            .enumerate()
            .map(|(index, param)| Param {
                name: param
                    .pattern
                    .get_identifier_name()
                    .map(|name| name.to_string())
                    .unwrap_or_else(|| format!("arg{index}")),
                ty: param
                    .type_annotation
                    .as_ref()
                    .map(|annotation| self.lower_type(&annotation.type_annotation)),
                optional: param.optional,
            })
            .collect()
    }

    fn lower_type(&self, ty: &TSType<'_>) -> TypeExpr {
        match ty {
            TSType::TSAnyKeyword(_) => TypeExpr::Keyword(Keyword::Any),
            TSType::TSUnknownKeyword(_) => TypeExpr::Keyword(Keyword::Unknown),
            TSType::TSBooleanKeyword(_) => TypeExpr::Keyword(Keyword::Boolean),
            TSType::TSStringKeyword(_) => TypeExpr::Keyword(Keyword::String),
            TSType::TSNumberKeyword(_) => TypeExpr::Keyword(Keyword::Number),
            TSType::TSBigIntKeyword(_) => TypeExpr::Keyword(Keyword::BigInt),
            TSType::TSNullKeyword(_) => TypeExpr::Keyword(Keyword::Null),
            TSType::TSUndefinedKeyword(_) => TypeExpr::Keyword(Keyword::Undefined),
            TSType::TSVoidKeyword(_) => TypeExpr::Keyword(Keyword::Void),
            TSType::TSNeverKeyword(_) => TypeExpr::Keyword(Keyword::Never),
            TSType::TSObjectKeyword(_) => TypeExpr::Keyword(Keyword::Object),
            TSType::TSSymbolKeyword(_) => TypeExpr::Keyword(Keyword::Symbol),
            TSType::TSLiteralType(literal) => match &literal.literal {
                TSLiteral::StringLiteral(lit) => {
                    TypeExpr::Literal(LiteralType::String(lit.value.to_string()))
                }
                TSLiteral::NumericLiteral(lit) => TypeExpr::Literal(LiteralType::Number(lit.value)),
                TSLiteral::BooleanLiteral(lit) => {
                    TypeExpr::Literal(LiteralType::Boolean(lit.value))
                }
                TSLiteral::TemplateLiteral(_) => TypeExpr::Literal(LiteralType::Template),
                TSLiteral::UnaryExpression(unary) => {
                    match numeric_value(&unary.argument) {
                        Some(value) if unary.operator == UnaryOperator::UnaryNegation => {
                            TypeExpr::Literal(LiteralType::Number(-value))
                        }
                        _ => TypeExpr::Other,
                    }
                }
                TSLiteral::BigIntLiteral(_) => TypeExpr::Other,
            },
            TSType::TSTemplateLiteralType(_) => TypeExpr::Literal(LiteralType::Template),
            TSType::TSParenthesizedType(inner) => self.lower_type(&inner.type_annotation),
            TSType::TSTypeOperatorType(operator) => match operator.operator {
                TSTypeOperatorOperator::Readonly => self.lower_type(&operator.type_annotation),
                _ => TypeExpr::Other,
            },
            TSType::TSArrayType(array) => {
                TypeExpr::Array(Box::new(self.lower_type(&array.element_type)))
            }
            TSType::TSUnionType(union) => {
                TypeExpr::Union(union.types.iter().map(|t| self.lower_type(t)).collect())
            }
            TSType::TSIntersectionType(intersection) => TypeExpr::Intersection(
                intersection
                    .types
                    .iter()
                    .map(|t| self.lower_type(t))
                    .collect(),
            ),
            TSType::TSFunctionType(function) => {
                let params = self.lower_params(&function.params);
                let returns = self.lower_type(&function.return_type.type_annotation);
                TypeExpr::Function {
                    params,
                    returns: Box::new(returns),
                }
            }
            TSType::TSTypeLiteral(literal) => {
                TypeExpr::Object(self.lower_signatures(&literal.members))
            }
            TSType::TSTypeReference(reference) => TypeExpr::Reference {
                module: None,
                name: type_name_path(&reference.type_name),
                args: reference
                    .type_arguments
                    .as_ref()
                    .map(|args| args.params.iter().map(|t| self.lower_type(t)).collect())
                    .unwrap_or_default(),
            },
            TSType::TSImportType(import) => match &import.qualifier {
                Some(qualifier) => TypeExpr::Reference {
                    module: Some(import.source.value.to_string()),
                    name: import_qualifier_path(qualifier),
                    args: import
                        .type_arguments
                        .as_ref()
                        .map(|args| args.params.iter().map(|t| self.lower_type(t)).collect())
                        .unwrap_or_default(),
                },
                None => TypeExpr::Other,
            },
            _ => TypeExpr::Other,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

fn type_name_path(name: &TSTypeName<'_>) -> Vec<String> {
    match name {
        TSTypeName::IdentifierReference(ident) => vec![ident.name.to_string()],
        TSTypeName::QualifiedName(qualified) => {
            let mut path = type_name_path(&qualified.left);
            path.push(qualified.right.name.to_string());
            path
        }
        TSTypeName::ThisExpression(_) => vec!["this".to_string()],
    }
}

fn import_qualifier_path(qualifier: &TSImportTypeQualifier<'_>) -> Vec<String> {
    match qualifier {
        TSImportTypeQualifier::Identifier(ident) => vec![ident.name.to_string()],
        TSImportTypeQualifier::QualifiedName(qualified) => {
            let mut path = import_qualifier_path(&qualified.left);
            path.push(qualified.right.name.to_string());
            path
        }
    }
}

/// `A` or `A.B.C` as path segments.
fn expression_path(expression: &Expression<'_>) -> Option<Vec<String>> {
    match expression {
        Expression::Identifier(ident) => Some(vec![ident.name.to_string()]),
        Expression::StaticMemberExpression(member) => {
            let mut path = expression_path(&member.object)?;
            path.push(member.property.name.to_string());
            Some(path)
        }
        _ => None,
    }
}

fn numeric_value(expression: &Expression<'_>) -> Option<f64> {
    match expression {
        Expression::NumericLiteral(lit) => Some(lit.value),
        Expression::UnaryExpression(unary) if unary.operator == UnaryOperator::UnaryNegation => {
            numeric_value(&unary.argument).map(|v| -v)
        }
        Expression::ParenthesizedExpression(inner) => numeric_value(&inner.expression),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'m>(module: &'m ModuleIr, name: &str) -> &'m DeclarationIr {
        module
            .declarations
            .iter()
            .find(|d| d.name == name)
            .unwrap()
    }

    #[test]
    fn test_lowers_interface_members_with_docs() {
        let module = parse_declarations(
            "button.d.ts",
            r#"
/** A button. */
export interface ButtonProps extends Base {
    /** Shown inside. */
    label: string;
    disabled?: boolean;
    onClick?(event: MouseEvent): void;
}
"#,
        );

        let props = find(&module, "ButtonProps");
        assert_eq!(props.doc.as_deref(), Some("* A button. "));
        let DeclarationKind::Interface { extends, members } = &props.kind else {
            panic!("expected interface");
        };
        assert_eq!(extends[0].simple_name(), Some("Base"));
        assert_eq!(members.len(), 3);
        assert_eq!(members[0].name, "label");
        assert_eq!(members[0].doc.as_deref(), Some("* Shown inside. "));
        assert!(members[1].optional);
        assert!(matches!(members[2].ty, Some(TypeExpr::Function { .. })));
        assert_eq!(
            module.exports,
            vec![ExportEntry {
                exported: "ButtonProps".to_string(),
                target: ExportTarget::Local("ButtonProps".to_string()),
            }]
        );
    }

    #[test]
    fn test_lowers_imports_and_reexports() {
        let module = parse_declarations(
            "index.d.ts",
            r#"
import * as React from "react";
import Default, { Named as Local } from "./named";
export { Button } from "./button";
export * from "./card";
export * as icons from "./icons";
"#,
        );

        assert_eq!(module.imports.len(), 3);
        assert_eq!(module.imports[0].imported, Imported::Namespace);
        assert_eq!(module.imports[1].imported, Imported::Default);
        assert_eq!(module.imports[2].local, "Local");
        assert_eq!(module.star_exports, vec!["./card".to_string()]);
        assert_eq!(
            module.dependencies,
            vec!["react", "./named", "./button", "./card", "./icons"]
        );
        assert!(module.exports.iter().any(|e| e.exported == "icons"
            && e.target
                == ExportTarget::Reexport {
                    source: "./icons".to_string(),
                    imported: Imported::Namespace,
                }));
    }

    #[test]
    fn test_enum_initializers() {
        let module = parse_declarations(
            "size.d.ts",
            "export declare enum Size { Small, Large = -2, Named = \"n\", Computed = 1 << 2 }",
        );
        let DeclarationKind::Enum { members } = &find(&module, "Size").kind else {
            panic!("expected enum");
        };
        assert_eq!(members[0].init, EnumInit::None);
        assert_eq!(members[1].init, EnumInit::Number(-2.0));
        assert_eq!(members[2].init, EnumInit::String("n".to_string()));
        assert_eq!(members[3].init, EnumInit::Other);
    }

    #[test]
    fn test_export_default_identifier() {
        let module = parse_declarations(
            "card.d.ts",
            "declare const Card: React.FC<CardProps>;\nexport default Card;",
        );
        assert_eq!(
            module.exports,
            vec![ExportEntry {
                exported: "default".to_string(),
                target: ExportTarget::Local("Card".to_string()),
            }]
        );
        let DeclarationKind::Variable { ty: Some(ty) } = &find(&module, "Card").kind else {
            panic!("expected typed variable");
        };
        let TypeExpr::Reference { name, args, .. } = ty else {
            panic!("expected reference");
        };
        assert_eq!(name, &vec!["React".to_string(), "FC".to_string()]);
        assert_eq!(args[0].simple_name(), Some("CardProps"));
    }
}

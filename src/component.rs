//! Component shape detection.
//!
//! A declaration is a component when it is a variable typed with a function
//! component type, a class extending a component base class, or a function of
//! at most one parameter returning an element type.

use crate::declarations::{DeclarationKind, Param, TypeExpr};
use crate::jsdoc::parse_doc;
use crate::options::AnalyzerOptions;
use crate::program::{DeclKey, FileId, TypeContext};

/// Wrapper types such as `MemoExoticComponent<ForwardRefExoticComponent<P>>`
/// are unwrapped at most this many times.
const MAX_WRAPPERS: usize = 4;

/// Props type of a component, with the file it must be resolved from.
#[derive(Debug, Clone, Copy)]
pub struct PropsType<'c> {
    pub file: FileId,
    pub ty: &'c TypeExpr,
}

#[derive(Debug, Clone, Copy)]
pub struct ComponentShape<'c> {
    pub key: DeclKey,
    /// `None` for components that take no props.
    pub props: Option<PropsType<'c>>,
}

/// One component exported by a discovered file.
#[derive(Debug, Clone)]
pub struct ExportedComponent<'c> {
    pub export_name: String,
    pub shape: ComponentShape<'c>,
    /// Marked `@ignore`.
    pub ignore: bool,
    pub description: String,
    pub icon: Option<String>,
    pub group: Option<String>,
    /// `@name` override.
    pub display_name: Option<String>,
}

/// Components among the local exports of `file`, in export order.
pub fn exported_components<'c>(
    ctx: &'c TypeContext,
    options: &AnalyzerOptions,
    file: FileId,
) -> Vec<ExportedComponent<'c>> {
    ctx.local_exports(file)
        .into_iter()
        .filter_map(|(export_name, key)| exported_component(ctx, options, export_name, key))
        .collect()
}

pub fn exported_component<'c>(
    ctx: &'c TypeContext,
    options: &AnalyzerOptions,
    export_name: String,
    key: DeclKey,
) -> Option<ExportedComponent<'c>> {
    let shape = component_shape(ctx, options, key)?;
    let doc = parse_doc(ctx.declaration(key).doc.as_deref());
    Some(ExportedComponent {
        export_name,
        shape,
        ignore: doc.has_tag("ignore"),
        description: doc.resolved_description(),
        icon: doc.tag_text("icon"),
        group: doc.tag_text("group"),
        display_name: doc.tag_text("name"),
    })
}

pub fn component_shape<'c>(
    ctx: &'c TypeContext,
    options: &AnalyzerOptions,
    key: DeclKey,
) -> Option<ComponentShape<'c>> {
    let props = match &ctx.declaration(key).kind {
        DeclarationKind::Variable { ty: Some(ty) } => typed_props(ctx, options, key.file, ty, 0)?,
        DeclarationKind::Class {
            extends: Some(TypeExpr::Reference { name, args, .. }),
        } if options.is_class_component_name(name) => args.first().map(|ty| PropsType {
            file: key.file,
            ty,
        }),
        DeclarationKind::Function { params, returns } => {
            function_props(ctx, options, key.file, params, returns.as_ref()?)?
        }
        _ => return None,
    };
    Some(ComponentShape { key, props })
}

/// Props of a value typed as a component, `Some(None)` for a propless one.
fn typed_props<'c>(
    ctx: &'c TypeContext,
    options: &AnalyzerOptions,
    file: FileId,
    ty: &'c TypeExpr,
    depth: usize,
) -> Option<Option<PropsType<'c>>> {
    if depth > MAX_WRAPPERS {
        return None;
    }
    let (file, ty) = ctx.resolve_alias(file, ty);
    match ty {
        TypeExpr::Reference { name, args, .. } if options.is_component_type_name(name) => {
            let Some(first) = args.first() else {
                return Some(None);
            };
            // memo(forwardRef(...)) nests component types
            if let Some(inner) = typed_props(ctx, options, file, first, depth + 1) {
                return Some(inner);
            }
            Some(Some(PropsType { file, ty: first }))
        }
        TypeExpr::Function { params, returns } => function_props(ctx, options, file, params, returns),
        _ => None,
    }
}

fn function_props<'c>(
    ctx: &'c TypeContext,
    options: &AnalyzerOptions,
    file: FileId,
    params: &'c [Param],
    returns: &'c TypeExpr,
) -> Option<Option<PropsType<'c>>> {
    if params.len() > 1 || !returns_element(ctx, options, file, returns) {
        return None;
    }
    Some(
        params
            .first()
            .and_then(|param| param.ty.as_ref())
            .map(|ty| PropsType { file, ty }),
    )
}

fn returns_element(ctx: &TypeContext, options: &AnalyzerOptions, file: FileId, ty: &TypeExpr) -> bool {
    match ty {
        TypeExpr::Reference { name, .. } => {
            options.is_element_type_name(name) || {
                let (alias_file, target) = ctx.resolve_alias(file, ty);
                !std::ptr::eq(target, ty) && returns_element(ctx, options, alias_file, target)
            }
        }
        TypeExpr::Union(parts) => parts
            .iter()
            .filter(|part| !part.is_nullish())
            .any(|part| returns_element(ctx, options, file, part)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declarations::parse_declarations;
    use crate::program::SourceFile;
    use std::path::{Path, PathBuf};

    fn context(source: &str) -> TypeContext {
        TypeContext::new(
            Path::new("/lib"),
            Some("my-lib".to_string()),
            vec![".d.ts".to_string()],
            vec![SourceFile {
                path: PathBuf::from("/lib/index.d.ts"),
                module: parse_declarations("/lib/index.d.ts", source),
            }],
        )
    }

    fn shape_of(ctx: &TypeContext, name: &str) -> Option<Option<String>> {
        let options = AnalyzerOptions::default();
        let module = &ctx.file(0).module;
        let index = module.declarations.iter().position(|d| d.name == name)?;
        component_shape(ctx, &options, DeclKey { file: 0, index }).map(|shape| {
            shape
                .props
                .and_then(|props| props.ty.simple_name().map(str::to_string))
        })
    }

    #[test]
    fn test_detects_component_shapes() {
        let ctx = context(
            r#"
import * as React from "react";
interface Props { label: string; }
export declare const A: React.FC<Props>;
export declare const B: React.MemoExoticComponent<React.ForwardRefExoticComponent<Props>>;
export declare class C extends React.Component<Props> {}
export declare function D(props: Props): JSX.Element | null;
export declare const E: React.FC;
export declare function notComponent(a: string, b: string): JSX.Element;
export declare const value: number;
"#,
        );
        assert_eq!(shape_of(&ctx, "A"), Some(Some("Props".to_string())));
        assert_eq!(shape_of(&ctx, "B"), Some(Some("Props".to_string())));
        assert_eq!(shape_of(&ctx, "C"), Some(Some("Props".to_string())));
        assert_eq!(shape_of(&ctx, "D"), Some(Some("Props".to_string())));
        assert_eq!(shape_of(&ctx, "E"), Some(None));
        assert_eq!(shape_of(&ctx, "notComponent"), None);
        assert_eq!(shape_of(&ctx, "value"), None);
    }
}

//! Default Content Extractor Tests
//!
//! Resolution runs against a stub lookup that treats every declared value as
//! a component, so these tests cover tag resolution and tree building only.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::declarations::DeclarationKind;
    use crate::defaults::{DefaultExtractor, PatternLookup};
    use crate::ids::nested_id;
    use crate::model::LiteralValue;
    use crate::pattern::{PatternIdentity, SlotSource};
    use crate::program::{DeclKey, TypeContext};
    use crate::test_support::context;

    const SLOT_ID: &str = "slot-1";
    const LIBRARY_ID: &str = "library-1";

    struct Stub<'c> {
        ctx: &'c TypeContext,
    }

    impl PatternLookup for Stub<'_> {
        fn identity(&self, key: DeclKey) -> Option<PatternIdentity> {
            let declaration = self.ctx.declaration(key);
            if !matches!(declaration.kind, DeclarationKind::Variable { .. }) {
                return None;
            }
            let mut property_ids = HashMap::new();
            property_ids.insert("label".to_string(), format!("{}-label", declaration.name));
            Some(PatternIdentity {
                context_id: declaration.name.clone(),
                id: format!("{}-id", declaration.name),
                property_ids,
            })
        }
    }

    fn library() -> TypeContext {
        context(&[
            (
                "/lib/index.d.ts",
                "export * from './card';\nexport * from './button';\nexport * from './icon';",
            ),
            (
                "/lib/card.d.ts",
                "import { Button as LocalButton } from './button';\nexport declare const Card: FC<{}>;",
            ),
            ("/lib/button.d.ts", "export declare const Button: FC<{}>;"),
            (
                "/lib/icon.d.ts",
                "export declare const Icon: FC<{}>;\nexport interface NotAComponent {}",
            ),
        ])
    }

    /// Raw comment holding one `@default` block.
    fn doc(block: &str) -> String {
        let body: Vec<String> = block.lines().map(|line| format!(" * {line}")).collect();
        format!("*\n * @default\n * ```tsx\n{}\n * ```\n ", body.join("\n"))
    }

    fn extract(ctx: &TypeContext, block: &str) -> Option<crate::model::ElementCandidate> {
        let stub = Stub { ctx };
        let extractor = DefaultExtractor::new(ctx, &stub, LIBRARY_ID, 16);
        let source = SlotSource {
            file: ctx.file_id(std::path::Path::new("/lib/card.d.ts")).unwrap(),
            doc: Some(doc(block)),
        };
        extractor.extract(SLOT_ID, &source)
    }

    #[test]
    fn test_block_import_resolves_relative_to_declaring_file() {
        let ctx = library();
        let root = extract(
            &ctx,
            "import { Button } from \"./button\";\nexport default () => <Button label=\"Go\" size={2} onClick={() => go()} />;",
        )
        .unwrap();

        assert_eq!(root.pattern_context_id, "Button");
        assert_eq!(root.pattern_id, "Button-id");
        assert_eq!(root.library_id, LIBRARY_ID);
        assert_eq!(root.id, nested_id(SLOT_ID, "default"));
        assert_eq!(root.parent, SLOT_ID);

        let props: Vec<_> = root
            .props
            .iter()
            .map(|p| (p.property_name.as_str(), p.property_id.as_deref(), p.value.clone()))
            .collect();
        assert_eq!(
            props,
            vec![
                ("label", Some("Button-label"), LiteralValue::String("Go".to_string())),
                ("size", None, LiteralValue::Number(2.0)),
            ]
        );
    }

    #[test]
    fn test_namespace_self_reference() {
        let ctx = library();
        let root = extract(
            &ctx,
            "import * as Lib from \"my-lib\";\nexport default () => <Lib.Icon />;",
        )
        .unwrap();
        assert_eq!(root.pattern_context_id, "Icon");
    }

    #[test]
    fn test_declaring_file_scope_then_entry() {
        let ctx = library();
        let local = extract(&ctx, "export default () => <LocalButton />;").unwrap();
        assert_eq!(local.pattern_context_id, "Button");

        let entry = extract(&ctx, "export default () => <Icon />;").unwrap();
        assert_eq!(entry.pattern_context_id, "Icon");
    }

    #[test]
    fn test_children_ids_nest_under_parent() {
        let ctx = library();
        let root = extract(
            &ctx,
            "export default () => (\n  <Card>\n    text\n    <Button disabled />\n    <Icon />\n  </Card>\n);",
        )
        .unwrap();

        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].id, nested_id(&root.id, "0"));
        assert_eq!(root.children[1].id, nested_id(&root.id, "1"));
        assert_eq!(root.children[1].parent, root.id);
        assert_eq!(
            root.children[0].props[0].value,
            LiteralValue::Boolean(true)
        );
    }

    #[test]
    fn test_unresolvable_tags_give_no_default() {
        let ctx = library();
        assert!(extract(&ctx, "export default () => <Missing />;").is_none());
        assert!(extract(
            &ctx,
            "import { Box } from \"other-lib\";\nexport default () => <Box />;"
        )
        .is_none());
        assert!(extract(&ctx, "export default () => <NotAComponent />;").is_none());
        assert!(extract(&ctx, "export default () => <Card><Missing /></Card>;").is_none());
    }

    #[test]
    fn test_broken_markup_gives_no_default() {
        let ctx = library();
        assert!(extract(&ctx, "export default (props) => <Card />;").is_none());
        assert!(extract(&ctx, "export default () => <Card>").is_none());
    }

    #[test]
    fn test_extraction_is_pure() {
        let ctx = library();
        let block = "export default () => <Card><Icon /></Card>;";
        assert_eq!(extract(&ctx, block), extract(&ctx, block));
    }

    #[test]
    fn test_missing_comment_gives_no_default() {
        let ctx = library();
        let stub = Stub { ctx: &ctx };
        let extractor = DefaultExtractor::new(&ctx, &stub, LIBRARY_ID, 16);
        let source = SlotSource { file: 0, doc: None };
        assert!(extractor.extract(SLOT_ID, &source).is_none());
    }
}

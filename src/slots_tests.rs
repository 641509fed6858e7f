//! Slot Detector Tests

#[cfg(test)]
mod tests {
    use crate::declarations::TypeExpr;
    use crate::jsdoc::parse_doc;
    use crate::model::{SlotKind, SlotQuantity};
    use crate::options::AnalyzerOptions;
    use crate::program::TypeContext;
    use crate::slots::{slot_kind, SlotDetector};
    use crate::test_support::{context, member};

    const LAYOUT: &str = r#"
import * as React from "react";
import { ReactNode } from "react";
import { Slot } from "./slot";

type Node = React.ReactNode;

export interface LayoutProps {
    header: React.ReactNode;
    items: ReactNode[];
    footer?: Node;
    sections: Node[];
    aside: Array<React.ReactElement>;
    frozen: ReadonlyArray<JSX.Element>;
    mixed: string | ReactNode[];
    maybe?: ReactNode | null;
    title: string;
    count: number[];
    /** @slot */
    custom: Slot;
    /** @slot */
    list: string[];
    children?: any;
    render: () => ReactNode;
}
"#;

    const SLOT: &str = "export interface Slot { id: string; }";

    fn ctx() -> TypeContext {
        context(&[("/lib/index.d.ts", LAYOUT), ("/lib/slot.d.ts", SLOT)])
    }

    fn detect(ctx: &TypeContext, name: &str) -> Option<SlotQuantity> {
        let options = AnalyzerOptions::default();
        let detector = SlotDetector::new(ctx, &options);
        let member = member(ctx, "LayoutProps", name);
        let doc = parse_doc(member.member.doc.as_deref());
        detector.detect(&member, &doc)
    }

    #[test]
    fn test_cardinality_of_aliased_nodes() {
        let ctx = ctx();
        assert_eq!(detect(&ctx, "footer"), Some(SlotQuantity::Single));
        assert_eq!(detect(&ctx, "sections"), Some(SlotQuantity::Multiple));
    }

    #[test]
    fn test_framework_types() {
        let ctx = ctx();
        assert_eq!(detect(&ctx, "header"), Some(SlotQuantity::Single));
        assert_eq!(detect(&ctx, "items"), Some(SlotQuantity::Multiple));
        assert_eq!(detect(&ctx, "maybe"), Some(SlotQuantity::Single));
    }

    #[test]
    fn test_list_wrappers_delegate_to_element() {
        let ctx = ctx();
        assert_eq!(detect(&ctx, "aside"), Some(SlotQuantity::Multiple));
        assert_eq!(detect(&ctx, "frozen"), Some(SlotQuantity::Multiple));
        assert_eq!(detect(&ctx, "count"), None);
    }

    #[test]
    fn test_union_is_slot_when_any_member_is() {
        let ctx = ctx();
        let options = AnalyzerOptions::default();
        let detector = SlotDetector::new(&ctx, &options);
        let mixed = member(&ctx, "LayoutProps", "mixed");
        let Some(TypeExpr::Union(parts)) = mixed.member.ty.as_ref() else {
            panic!("mixed is not a union");
        };

        let any_part = parts.iter().any(|part| detector.is_slot(mixed.file, part));
        assert_eq!(detector.is_slot(mixed.file, mixed.member.ty.as_ref().unwrap()), any_part);
        assert_eq!(detect(&ctx, "mixed"), Some(SlotQuantity::Multiple));
    }

    #[test]
    fn test_plain_members_are_not_slots() {
        let ctx = ctx();
        assert_eq!(detect(&ctx, "title"), None);
        assert_eq!(detect(&ctx, "render"), None);
    }

    #[test]
    fn test_slot_tag_forces_a_slot() {
        let ctx = ctx();
        assert_eq!(detect(&ctx, "custom"), Some(SlotQuantity::Single));
        assert_eq!(detect(&ctx, "list"), Some(SlotQuantity::Multiple));
    }

    #[test]
    fn test_untyped_children_is_a_slot() {
        let ctx = ctx();
        assert_eq!(detect(&ctx, "children"), Some(SlotQuantity::Single));
        assert_eq!(slot_kind("children"), SlotKind::Children);
        assert_eq!(slot_kind("header"), SlotKind::Property);
    }
}

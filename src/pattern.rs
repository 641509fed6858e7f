//! Pattern assembly.
//!
//! Turns one component declaration into a [`Pattern`]: classifies every props
//! member, splits slots from plain properties and assigns ids through the
//! injected [`IdStrategy`].

use std::collections::HashMap;
use tracing::debug;

use crate::classify::Classifier;
use crate::component::ExportedComponent;
use crate::filesystem::FileSystem;
use crate::ids::IdStrategy;
use crate::jsdoc::parse_doc;
use crate::model::{Pattern, PatternCandidate, PatternKind, Property, Slot, SlotKind, SlotQuantity};
use crate::options::AnalyzerOptions;
use crate::program::{DeclKey, FileId, MemberKey, TypeContext};
use crate::slots::{implementation_uses_children, slot_kind, SlotDetector, CHILDREN};

/// Where a slot was declared, kept for the default-content pass.
#[derive(Debug, Clone, Default)]
pub struct SlotSource {
    pub file: FileId,
    /// Raw documentation of the slot member.
    pub doc: Option<String>,
}

/// Ids a default-content element needs from its pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternIdentity {
    pub context_id: String,
    pub id: String,
    /// Property ids by property name, shared properties included.
    pub property_ids: HashMap<String, String>,
}

#[derive(Debug)]
pub struct PatternBuild {
    pub pattern: Pattern,
    /// Properties first minted by this pattern.
    pub properties: Vec<Property>,
    /// Member identities of `properties`, in the same order.
    pub minted: Vec<MemberKey>,
    /// One entry per `pattern.slots`.
    pub slot_sources: Vec<SlotSource>,
    pub property_ids: HashMap<String, String>,
}

impl PatternBuild {
    pub fn identity(&self) -> PatternIdentity {
        PatternIdentity {
            context_id: self.pattern.context_id.clone(),
            id: self.pattern.id.clone(),
            property_ids: self.property_ids.clone(),
        }
    }
}

pub struct PatternBuilder<'c> {
    ctx: &'c TypeContext,
    options: &'c AnalyzerOptions,
    ids: &'c dyn IdStrategy,
    fs: &'c dyn FileSystem,
    /// `candidates[i]` describes file `i` of the context.
    candidates: &'c [PatternCandidate],
}

impl<'c> PatternBuilder<'c> {
    pub fn new(
        ctx: &'c TypeContext,
        options: &'c AnalyzerOptions,
        ids: &'c dyn IdStrategy,
        fs: &'c dyn FileSystem,
        candidates: &'c [PatternCandidate],
    ) -> Self {
        Self {
            ctx,
            options,
            ids,
            fs,
            candidates,
        }
    }

    pub fn context_id(&self, key: DeclKey, export_name: &str) -> String {
        let candidate_id = self
            .candidates
            .get(key.file)
            .map(|c| c.id.as_str())
            .unwrap_or_default();
        format!("{candidate_id}:{export_name}")
    }

    /// Build the pattern of an exported component.
    ///
    /// Members listed in `shared` were already minted by an earlier pattern:
    /// their ids are reused and they are not returned as new properties.
    pub fn build(
        &self,
        component: &ExportedComponent<'c>,
        shared: &HashMap<MemberKey, String>,
    ) -> PatternBuild {
        let shape = &component.shape;
        let export_name = component.export_name.as_str();
        let declaration = self.ctx.declaration(shape.key);
        let candidate = self.candidates.get(shape.key.file);

        let context_id = self.context_id(shape.key, export_name);
        let pattern_id = self.ids.pattern_id(&context_id);
        let name = component.display_name.clone().unwrap_or_else(|| {
            if export_name != "default" {
                export_name.to_string()
            } else if declaration.name != "default" {
                declaration.name.clone()
            } else {
                candidate
                    .map(|c| c.display_name.clone())
                    .unwrap_or_else(|| export_name.to_string())
            }
        });

        let classifier = Classifier::new(self.ctx, self.ids);
        let detector = SlotDetector::new(self.ctx, self.options);
        let members = shape
            .props
            .map(|props| self.ctx.apparent_members(props.file, props.ty))
            .unwrap_or_default();

        let mut build = PatternBuild {
            pattern: Pattern {
                context_id,
                id: pattern_id.clone(),
                name,
                description: component.description.clone(),
                property_ids: Vec::new(),
                slots: Vec::new(),
                kind: PatternKind::Pattern,
                icon: component.icon.clone(),
                group: component.group.clone(),
            },
            properties: Vec::new(),
            minted: Vec::new(),
            slot_sources: Vec::new(),
            property_ids: HashMap::new(),
        };

        for member in &members {
            let member_doc = parse_doc(member.member.doc.as_deref());
            if member_doc.has_tag("ignore") {
                continue;
            }
            let property_name = &member.member.name;

            if let Some(quantity) = detector.detect(member, &member_doc) {
                build.pattern.slots.push(Slot {
                    id: self.ids.slot_id(&pattern_id, property_name),
                    context_id: property_name.clone(),
                    property_name: property_name.clone(),
                    label: member_doc
                        .tag_text("name")
                        .unwrap_or_else(|| property_name.clone()),
                    description: member_doc.resolved_description(),
                    example: member_doc.tag_text("example").unwrap_or_default(),
                    required: !member.optional,
                    hidden: member_doc.has_tag("hidden"),
                    quantity,
                    kind: slot_kind(property_name),
                    default_value: None,
                });
                build.slot_sources.push(SlotSource {
                    file: member.file,
                    doc: member.member.doc.clone(),
                });
                continue;
            }

            let key = member.key();
            let id = match shared.get(&key) {
                Some(id) => id.clone(),
                None => {
                    let property = classifier.classify(&pattern_id, member);
                    let id = property.id.clone();
                    build.properties.push(property);
                    build.minted.push(key);
                    id
                }
            };
            build.property_ids.insert(property_name.clone(), id.clone());
            build.pattern.property_ids.push(id);
        }

        let has_children_slot = build
            .pattern
            .slots
            .iter()
            .any(|slot| slot.kind == SlotKind::Children);
        if !has_children_slot && self.options.scan_implementation_for_children {
            if let Some(candidate) = candidate {
                if implementation_uses_children(self.fs, &candidate.artifact_path, export_name) {
                    debug!(pattern = %build.pattern.name, "children slot found in implementation");
                    build.pattern.slots.push(Slot {
                        id: self.ids.slot_id(&pattern_id, CHILDREN),
                        context_id: CHILDREN.to_string(),
                        property_name: CHILDREN.to_string(),
                        label: CHILDREN.to_string(),
                        description: String::new(),
                        example: String::new(),
                        required: false,
                        hidden: false,
                        quantity: SlotQuantity::Single,
                        kind: slot_kind(CHILDREN),
                        default_value: None,
                    });
                    build.slot_sources.push(SlotSource {
                        file: shape.key.file,
                        doc: None,
                    });
                }
            }
        }

        build
    }
}

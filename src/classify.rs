//! Type Classifier
//!
//! Maps a props member to a property kind. Classification is an ordered chain
//! of predicates over the member's normalized type; the first match wins.

use lazy_static::lazy_static;
use serde_json::Value;
use std::collections::HashMap;

use crate::declarations::{DeclarationKind, EnumInit, EnumMemberIr, Keyword, LiteralType, TypeExpr};
use crate::ids::IdStrategy;
use crate::jsdoc::{parse_doc, DocComment};
use crate::model::{EnumOption, EnumValue, EventKind, Property, PropertyKind};
use crate::program::{FileId, MemberRef, Symbol, TypeContext};

lazy_static! {
    /// Handler aliases shipped by UI frameworks.
    static ref EVENT_HANDLER_TYPES: HashMap<&'static str, EventKind> = {
        let mut m = HashMap::new();
        m.insert("MouseEventHandler", EventKind::Click);
        m.insert("PointerEventHandler", EventKind::Click);
        m.insert("ChangeEventHandler", EventKind::Change);
        m.insert("FocusEventHandler", EventKind::Focus);
        m.insert("KeyboardEventHandler", EventKind::Keyboard);
        m.insert("FormEventHandler", EventKind::Input);
        m.insert("EventHandler", EventKind::Generic);
        m.insert("ReactEventHandler", EventKind::Generic);
        m
    };

    /// Event parameter types accepted by a handler signature.
    static ref EVENT_TYPES: HashMap<&'static str, EventKind> = {
        let mut m = HashMap::new();
        m.insert("MouseEvent", EventKind::Click);
        m.insert("PointerEvent", EventKind::Click);
        m.insert("ChangeEvent", EventKind::Change);
        m.insert("FocusEvent", EventKind::Focus);
        m.insert("KeyboardEvent", EventKind::Keyboard);
        m.insert("FormEvent", EventKind::Input);
        m.insert("InputEvent", EventKind::Input);
        m.insert("SyntheticEvent", EventKind::Generic);
        m.insert("Event", EventKind::Generic);
        m
    };
}

/// `@control` values that refine a string property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Color,
    Asset,
    Href,
}

impl Control {
    fn from_doc(doc: &DocComment) -> Option<Self> {
        match doc.tag("control")?.trim().to_ascii_lowercase().as_str() {
            "color" => Some(Control::Color),
            "asset" | "image" => Some(Control::Asset),
            "href" | "link" | "url" => Some(Control::Href),
            _ => None,
        }
    }
}

/// A member type with nullish union members removed and aliases followed.
#[derive(Debug, Clone, Copy)]
struct Normalized<'c> {
    file: FileId,
    ty: &'c TypeExpr,
}

pub struct Classifier<'c> {
    ctx: &'c TypeContext,
    ids: &'c dyn IdStrategy,
}

impl<'c> Classifier<'c> {
    pub fn new(ctx: &'c TypeContext, ids: &'c dyn IdStrategy) -> Self {
        Self { ctx, ids }
    }

    /// Classify one member into a property owned by `pattern_id`.
    pub fn classify(&self, pattern_id: &str, member: &MemberRef<'c>) -> Property {
        let doc = parse_doc(member.member.doc.as_deref());
        let name = &member.member.name;
        let id = self.ids.property_id(pattern_id, name);
        let kind = self.kind_of(&id, member, &doc);
        let default_value = doc
            .tag_text("default")
            .and_then(|text| literal_default(&kind, &text));

        Property {
            context_id: name.clone(),
            property_name: name.clone(),
            label: doc.tag_text("name").unwrap_or_else(|| name.clone()),
            description: doc.resolved_description(),
            example: doc.tag_text("example").unwrap_or_default(),
            required: !member.optional,
            hidden: doc.has_tag("hidden"),
            group: doc.tag_text("group"),
            default_value,
            id,
            kind,
        }
    }

    fn kind_of(&self, property_id: &str, member: &MemberRef<'c>, doc: &DocComment) -> PropertyKind {
        let Some(ty) = member.member.ty.as_ref() else {
            return unknown(member);
        };
        let control = Control::from_doc(doc);
        let raw = Normalized {
            file: member.file,
            ty,
        };
        let normalized = self.normalize(member.file, ty);

        if self.is_boolean(normalized) {
            return PropertyKind::Boolean;
        }
        if let Some(members) = self.enum_members(normalized) {
            return PropertyKind::Enum {
                options: self.enum_options(property_id, members),
            };
        }
        if let Some(event) = self.event_handler(raw).or_else(|| self.event_handler(normalized)) {
            return PropertyKind::EventHandler { event };
        }
        if self.is_string(normalized) && control.is_none() {
            return PropertyKind::String;
        }
        if self.is_number(normalized) {
            return PropertyKind::Number;
        }
        if self.is_string(normalized) {
            return match control {
                Some(Control::Color) => PropertyKind::Color,
                Some(Control::Asset) => PropertyKind::Asset,
                Some(Control::Href) => PropertyKind::Href,
                None => PropertyKind::String,
            };
        }
        unknown(member)
    }

    fn normalize(&self, file: FileId, ty: &'c TypeExpr) -> Normalized<'c> {
        let (file, ty) = self.ctx.resolve_alias(file, ty);
        if let TypeExpr::Union(parts) = ty {
            let mut rest = parts.iter().filter(|t| !t.is_nullish());
            if let (Some(only), None) = (rest.next(), rest.next()) {
                return self.normalize(file, only);
            }
        }
        Normalized { file, ty }
    }

    /// Union members after dropping nullish parts, each normalized.
    fn union_parts(&self, ty: Normalized<'c>) -> Option<Vec<Normalized<'c>>> {
        let TypeExpr::Union(parts) = ty.ty else {
            return None;
        };
        Some(
            parts
                .iter()
                .filter(|t| !t.is_nullish())
                .map(|t| self.normalize(ty.file, t))
                .collect(),
        )
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Predicates
    // ───────────────────────────────────────────────────────────────────────────

    fn is_boolean(&self, ty: Normalized<'c>) -> bool {
        match ty.ty {
            TypeExpr::Keyword(Keyword::Boolean) | TypeExpr::Literal(LiteralType::Boolean(_)) => {
                true
            }
            TypeExpr::Union(_) => self
                .union_parts(ty)
                .is_some_and(|parts| parts.into_iter().all(|p| self.is_boolean(p))),
            _ => false,
        }
    }

    fn enum_members(&self, ty: Normalized<'c>) -> Option<&'c [EnumMemberIr]> {
        let Some(Symbol::Declaration(key)) = self.ctx.resolve_reference(ty.file, ty.ty) else {
            return None;
        };
        match &self.ctx.declaration(key).kind {
            DeclarationKind::Enum { members } => Some(members),
            _ => None,
        }
    }

    fn event_handler(&self, ty: Normalized<'c>) -> Option<EventKind> {
        match ty.ty {
            TypeExpr::Reference { name, .. } => {
                let syntactic = name.last()?;
                if let Some(kind) = EVENT_HANDLER_TYPES.get(syntactic.as_str()) {
                    return Some(*kind);
                }
                let resolved = self.ctx.resolve_reference(ty.file, ty.ty)?;
                EVENT_HANDLER_TYPES.get(resolved.external_name()?).copied()
            }
            TypeExpr::Function { params, returns } => {
                if !matches!(
                    returns.as_ref(),
                    TypeExpr::Keyword(Keyword::Void) | TypeExpr::Keyword(Keyword::Any)
                ) {
                    return None;
                }
                match params.as_slice() {
                    [] => Some(EventKind::Generic),
                    [param] => {
                        let TypeExpr::Reference { name, .. } = param.ty.as_ref()? else {
                            return None;
                        };
                        EVENT_TYPES.get(name.last()?.as_str()).copied()
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn is_string(&self, ty: Normalized<'c>) -> bool {
        match ty.ty {
            TypeExpr::Keyword(Keyword::String)
            | TypeExpr::Literal(LiteralType::String(_))
            | TypeExpr::Literal(LiteralType::Template) => true,
            TypeExpr::Union(_) => self
                .union_parts(ty)
                .is_some_and(|parts| parts.into_iter().all(|p| self.is_string(p))),
            _ => false,
        }
    }

    fn is_number(&self, ty: Normalized<'c>) -> bool {
        match ty.ty {
            TypeExpr::Keyword(Keyword::Number) | TypeExpr::Literal(LiteralType::Number(_)) => true,
            TypeExpr::Union(_) => self
                .union_parts(ty)
                .is_some_and(|parts| parts.into_iter().all(|p| self.is_number(p))),
            _ => false,
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Enum options
    // ───────────────────────────────────────────────────────────────────────────

    fn enum_options(&self, property_id: &str, members: &[EnumMemberIr]) -> Vec<EnumOption> {
        let mut next_auto = Some(0.0);
        members
            .iter()
            .enumerate()
            .map(|(index, member)| {
                let (value, ordinal) = match &member.init {
                    EnumInit::Number(n) => {
                        next_auto = Some(n + 1.0);
                        (EnumValue::Number(*n), *n as i64)
                    }
                    EnumInit::String(s) => {
                        next_auto = None;
                        (EnumValue::String(s.clone()), index as i64)
                    }
                    EnumInit::None => {
                        let value = next_auto.unwrap_or(index as f64);
                        next_auto = Some(value + 1.0);
                        (EnumValue::Number(value), index as i64)
                    }
                    EnumInit::Other => {
                        next_auto = None;
                        (EnumValue::Number(index as f64), index as i64)
                    }
                };
                let doc = parse_doc(member.doc.as_deref());
                EnumOption {
                    id: self.ids.enum_option_id(property_id, &member.name),
                    context_id: member.name.clone(),
                    name: doc.tag_text("name").unwrap_or_else(|| member.name.clone()),
                    value,
                    ordinal,
                    icon: doc.tag_text("icon"),
                }
            })
            .collect()
    }
}

fn unknown(member: &MemberRef<'_>) -> PropertyKind {
    PropertyKind::Unknown {
        type_text: member.member.type_text.clone(),
    }
}

/// Interpret a literal `@default` tag for a classified kind.
pub fn literal_default(kind: &PropertyKind, text: &str) -> Option<Value> {
    let text = text.trim();
    match kind {
        PropertyKind::Boolean => match text {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        PropertyKind::Number => {
            let number = text.parse::<f64>().ok()?;
            serde_json::Number::from_f64(number).map(Value::Number)
        }
        PropertyKind::String | PropertyKind::Color | PropertyKind::Asset | PropertyKind::Href => {
            Some(Value::String(unquote(text).to_string()))
        }
        PropertyKind::Enum { options } => {
            let wanted = unquote(text);
            let member = wanted.rsplit('.').next().unwrap_or(wanted);
            options
                .iter()
                .find(|option| {
                    option.context_id == member
                        || option.name == wanted
                        || match &option.value {
                            EnumValue::String(value) => value == wanted,
                            EnumValue::Number(value) => {
                                wanted.parse::<f64>().is_ok_and(|n| n == *value)
                            }
                        }
                })
                .map(|option| Value::String(option.id.clone()))
        }
        PropertyKind::EventHandler { .. } | PropertyKind::Unknown { .. } => None,
    }
}

fn unquote(text: &str) -> &str {
    for quote in ['"', '\'', '`'] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

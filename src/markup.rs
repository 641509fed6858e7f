//! Markup example parser.
//!
//! Accepts the restricted module shape used in `@default` blocks:
//!
//! ```text
//! import Button, { Icon as Glyph } from "./button";
//! import * as UI from "my-lib";
//!
//! export default () => (
//!     <Button variant="primary" size={2} disabled>
//!         <UI.Icon name="plus" />
//!     </Button>
//! );
//! ```
//!
//! Only literal attribute values are kept. Text and expression children are
//! skipped. Anything outside this grammar is an error.

use thiserror::Error;

use crate::declarations::Imported;
use crate::model::LiteralValue;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarkupError {
    #[error("expected {expected} at offset {offset}")]
    Expected { expected: &'static str, offset: usize },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("closing tag </{close}> does not match <{open}> at offset {offset}")]
    MismatchedClose {
        open: String,
        close: String,
        offset: usize,
    },

    #[error("elements nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkupModule {
    pub imports: Vec<MarkupImport>,
    pub root: MarkupElement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkupImport {
    pub local: String,
    pub source: String,
    pub imported: Imported,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkupElement {
    /// `Button` or `UI.Button` as segments.
    pub name: Vec<String>,
    pub attributes: Vec<MarkupAttribute>,
    pub children: Vec<MarkupElement>,
}

impl MarkupElement {
    pub fn tag(&self) -> String {
        self.name.join(".")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkupAttribute {
    pub name: String,
    /// `None` for values that are not literals.
    pub value: Option<LiteralValue>,
}

/// Parse a markup example module, nesting at most `max_depth` elements.
pub fn parse_markup(source: &str, max_depth: usize) -> Result<MarkupModule, MarkupError> {
    let mut cursor = Cursor::new(source);
    let mut imports = Vec::new();

    cursor.skip_trivia();
    while cursor.eat_keyword("import") {
        imports.extend(cursor.import_declaration()?);
        cursor.skip_trivia();
    }

    cursor.expect_keyword("export")?;
    cursor.expect_keyword("default")?;
    let root = cursor.component_function(max_depth)?;
    cursor.skip_trivia();
    cursor.eat(";");
    cursor.skip_trivia();
    if !cursor.at_end() {
        return Err(cursor.expected("end of example"));
    }

    Ok(MarkupModule { imports, root })
}

struct Cursor<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> Cursor<'s> {
    fn new(src: &'s str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'s str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn expected(&self, expected: &'static str) -> MarkupError {
        if self.at_end() {
            MarkupError::UnexpectedEnd { expected }
        } else {
            MarkupError::Expected {
                expected,
                offset: self.pos,
            }
        }
    }

    /// Skip whitespace and JS comments.
    fn skip_trivia(&mut self) {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();
            if trimmed.starts_with("//") {
                let end = trimmed.find('\n').unwrap_or(trimmed.len());
                self.pos += end;
            } else if trimmed.starts_with("/*") {
                match trimmed[2..].find("*/") {
                    Some(end) => self.pos += end + 4,
                    None => self.pos = self.src.len(),
                }
            } else {
                break;
            }
        }
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str, expected: &'static str) -> Result<(), MarkupError> {
        self.skip_trivia();
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.expected(expected))
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        self.skip_trivia();
        let rest = self.rest();
        if !rest.starts_with(keyword) {
            return false;
        }
        let boundary = rest[keyword.len()..]
            .chars()
            .next()
            .map_or(true, |c| !is_ident_char(c));
        if boundary {
            self.pos += keyword.len();
        }
        boundary
    }

    fn expect_keyword(&mut self, keyword: &'static str) -> Result<(), MarkupError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.expected(keyword))
        }
    }

    fn identifier(&mut self) -> Option<String> {
        self.skip_trivia();
        let start = self.pos;
        match self.peek() {
            Some(c) if is_ident_start(c) => {
                self.bump();
            }
            _ => return None,
        }
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        Some(self.src[start..self.pos].to_string())
    }

    fn expect_identifier(&mut self) -> Result<String, MarkupError> {
        self.identifier().ok_or_else(|| self.expected("identifier"))
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Module level
    // ───────────────────────────────────────────────────────────────────────────

    fn import_declaration(&mut self) -> Result<Vec<MarkupImport>, MarkupError> {
        let mut bindings = Vec::new();
        self.skip_trivia();

        // side-effect import
        if matches!(self.peek(), Some('"') | Some('\'')) {
            self.string_literal()?;
            self.skip_trivia();
            self.eat(";");
            return Ok(Vec::new());
        }

        if self.eat("*") {
            self.expect_keyword("as")?;
            bindings.push((self.expect_identifier()?, Imported::Namespace));
        } else {
            if self.peek() != Some('{') {
                bindings.push((self.expect_identifier()?, Imported::Default));
                self.skip_trivia();
                if self.eat(",") {
                    self.skip_trivia();
                }
            }
            if self.eat("{") {
                bindings.extend(self.named_imports()?);
            } else if self.eat("*") {
                self.expect_keyword("as")?;
                bindings.push((self.expect_identifier()?, Imported::Namespace));
            }
        }

        self.expect_keyword("from")?;
        self.skip_trivia();
        let source = self.string_literal()?;
        self.skip_trivia();
        self.eat(";");

        Ok(bindings
            .into_iter()
            .map(|(local, imported)| MarkupImport {
                local,
                source: source.clone(),
                imported,
            })
            .collect())
    }

    fn named_imports(&mut self) -> Result<Vec<(String, Imported)>, MarkupError> {
        let mut bindings = Vec::new();
        loop {
            self.skip_trivia();
            if self.eat("}") {
                return Ok(bindings);
            }
            let imported = self.expect_identifier()?;
            let local = if self.eat_keyword("as") {
                self.expect_identifier()?
            } else {
                imported.clone()
            };
            let imported = if imported == "default" {
                Imported::Default
            } else {
                Imported::Named(imported)
            };
            bindings.push((local, imported));
            self.skip_trivia();
            if !self.eat(",") {
                self.expect("}", "`}`")?;
                return Ok(bindings);
            }
        }
    }

    /// `() => <El/>`, `() => { return <El/>; }` or `function Name() { ... }`.
    fn component_function(&mut self, max_depth: usize) -> Result<MarkupElement, MarkupError> {
        if self.eat_keyword("function") {
            self.identifier();
            self.expect("(", "`(`")?;
            self.expect(")", "argument-free function")?;
            return self.block_body(max_depth);
        }

        self.expect("(", "`(`")?;
        self.expect(")", "argument-free function")?;
        self.expect("=>", "`=>`")?;
        self.skip_trivia();
        if self.peek() == Some('{') {
            self.bump();
            return self.block_body_after_brace(max_depth);
        }
        self.element_expression(max_depth)
    }

    fn block_body(&mut self, max_depth: usize) -> Result<MarkupElement, MarkupError> {
        self.expect("{", "`{`")?;
        self.block_body_after_brace(max_depth)
    }

    fn block_body_after_brace(&mut self, max_depth: usize) -> Result<MarkupElement, MarkupError> {
        self.expect_keyword("return")?;
        let element = self.element_expression(max_depth)?;
        self.skip_trivia();
        self.eat(";");
        self.expect("}", "`}`")?;
        Ok(element)
    }

    /// One element, optionally wrapped in parentheses.
    fn element_expression(&mut self, max_depth: usize) -> Result<MarkupElement, MarkupError> {
        self.skip_trivia();
        if self.eat("(") {
            let element = self.element_expression(max_depth)?;
            self.expect(")", "`)`")?;
            return Ok(element);
        }
        self.element(1, max_depth)
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Elements
    // ───────────────────────────────────────────────────────────────────────────

    fn element(&mut self, depth: usize, max_depth: usize) -> Result<MarkupElement, MarkupError> {
        if depth > max_depth {
            return Err(MarkupError::TooDeep { limit: max_depth });
        }
        self.expect("<", "element")?;
        let name = self.tag_name()?;
        let attributes = self.attributes()?;

        self.skip_trivia();
        if self.eat("/>") {
            return Ok(MarkupElement {
                name,
                attributes,
                children: Vec::new(),
            });
        }
        self.expect(">", "`>`")?;

        let mut children = Vec::new();
        loop {
            self.skip_text();
            if self.at_end() {
                return Err(self.expected("closing tag"));
            }
            if self.rest().starts_with("</") {
                let offset = self.pos;
                self.pos += 2;
                let close = self.tag_name()?;
                self.expect(">", "`>`")?;
                if close != name {
                    return Err(MarkupError::MismatchedClose {
                        open: name.join("."),
                        close: close.join("."),
                        offset,
                    });
                }
                return Ok(MarkupElement {
                    name,
                    attributes,
                    children,
                });
            }
            if self.peek() == Some('{') {
                self.skip_braced()?;
                continue;
            }
            children.push(self.element(depth + 1, max_depth)?);
        }
    }

    /// `Name` or `Namespace.Name`.
    fn tag_name(&mut self) -> Result<Vec<String>, MarkupError> {
        let mut name = vec![self.expect_identifier()?];
        if self.eat(".") {
            name.push(self.expect_identifier()?);
        }
        Ok(name)
    }

    fn attributes(&mut self) -> Result<Vec<MarkupAttribute>, MarkupError> {
        let mut attributes = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                Some('/') | Some('>') | None => return Ok(attributes),
                Some('{') => {
                    // spread attribute
                    self.skip_braced()?;
                }
                _ => {
                    let name = self.attribute_name()?;
                    self.skip_trivia();
                    let value = if self.eat("=") {
                        self.attribute_value()?
                    } else {
                        Some(LiteralValue::Boolean(true))
                    };
                    attributes.push(MarkupAttribute { name, value });
                }
            }
        }
    }

    fn attribute_name(&mut self) -> Result<String, MarkupError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| is_ident_char(c) || c == '-' || c == ':')
        {
            self.bump();
        }
        if start == self.pos {
            return Err(self.expected("attribute name"));
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn attribute_value(&mut self) -> Result<Option<LiteralValue>, MarkupError> {
        self.skip_trivia();
        match self.peek() {
            Some('"') | Some('\'') => {
                // JSX attribute strings have no escapes
                let quote = self.bump().unwrap_or('"');
                let start = self.pos;
                let end = self.rest().find(quote).ok_or_else(|| self.expected("closing quote"))?;
                self.pos += end + 1;
                Ok(Some(LiteralValue::String(self.src[start..start + end].to_string())))
            }
            Some('{') => {
                let start = self.pos;
                self.skip_braced()?;
                let inner = self.src[start + 1..self.pos - 1].trim();
                Ok(literal_expression(inner))
            }
            _ => Err(self.expected("attribute value")),
        }
    }

    /// Skip a `{...}` group, honouring nested braces and string literals.
    fn skip_braced(&mut self) -> Result<(), MarkupError> {
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                '"' | '\'' | '`' => {
                    self.string_literal()?;
                    continue;
                }
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        self.bump();
                        return Ok(());
                    }
                }
                _ => {}
            }
            self.bump();
        }
        Err(self.expected("`}`"))
    }

    fn skip_text(&mut self) {
        while let Some(c) = self.peek() {
            if c == '<' || c == '{' {
                break;
            }
            self.bump();
        }
    }

    fn string_literal(&mut self) -> Result<String, MarkupError> {
        let quote = match self.peek() {
            Some(q @ ('"' | '\'' | '`')) => q,
            _ => return Err(self.expected("string literal")),
        };
        self.bump();
        let mut value = String::new();
        while let Some(c) = self.bump() {
            match c {
                '\\' => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some(other) => value.push(other),
                    None => break,
                },
                c if c == quote => return Ok(value),
                c => value.push(c),
            }
        }
        Err(self.expected("closing quote"))
    }
}

/// Literal value of an attribute expression, one level inside `{...}`.
fn literal_expression(expression: &str) -> Option<LiteralValue> {
    match expression {
        "true" => return Some(LiteralValue::Boolean(true)),
        "false" => return Some(LiteralValue::Boolean(false)),
        _ => {}
    }

    if let Ok(number) = expression.parse::<f64>() {
        if number.is_finite() {
            return Some(LiteralValue::Number(number));
        }
    }

    let mut cursor = Cursor::new(expression);
    if matches!(cursor.peek(), Some('"') | Some('\'') | Some('`')) {
        let value = cursor.string_literal().ok()?;
        let is_template = expression.starts_with('`');
        if cursor.at_end() && !(is_template && value.contains("${")) {
            return Some(LiteralValue::String(value));
        }
    }
    None
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_imports_and_nested_elements() {
        let module = parse_markup(
            r#"
import Button, { Icon as Glyph } from "./button";
import * as UI from "@acme/ui";

export default () => (
    <Button variant="primary" size={2} disabled label={"Save"} onClick={() => save()}>
        Some text {/* a comment */}
        <Glyph name='plus' />
        <UI.Badge count={-1}></UI.Badge>
    </Button>
);
"#,
            16,
        )
        .unwrap();

        assert_eq!(module.imports.len(), 3);
        assert_eq!(module.imports[0].imported, Imported::Default);
        assert_eq!(module.imports[1].local, "Glyph");
        assert_eq!(module.imports[1].imported, Imported::Named("Icon".to_string()));
        assert_eq!(module.imports[2].source, "@acme/ui");

        let root = &module.root;
        assert_eq!(root.tag(), "Button");
        let values: Vec<_> = root
            .attributes
            .iter()
            .map(|a| (a.name.as_str(), a.value.clone()))
            .collect();
        assert_eq!(
            values,
            vec![
                ("variant", Some(LiteralValue::String("primary".to_string()))),
                ("size", Some(LiteralValue::Number(2.0))),
                ("disabled", Some(LiteralValue::Boolean(true))),
                ("label", Some(LiteralValue::String("Save".to_string()))),
                ("onClick", None),
            ]
        );
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[1].name, vec!["UI", "Badge"]);
        assert_eq!(
            root.children[1].attributes[0].value,
            Some(LiteralValue::Number(-1.0))
        );
    }

    #[test]
    fn test_function_form() {
        let module = parse_markup(
            "export default function Example() {\n  return <Card elevated={false} />;\n}",
            16,
        )
        .unwrap();
        assert_eq!(module.root.tag(), "Card");
        assert_eq!(
            module.root.attributes[0].value,
            Some(LiteralValue::Boolean(false))
        );
    }

    #[test]
    fn test_rejects_arguments_and_trailing_code() {
        assert!(parse_markup("export default (props) => <A />", 16).is_err());
        assert!(parse_markup("export default () => <A />; console.log(1);", 16).is_err());
        assert!(parse_markup("const x = 1; export default () => <A />", 16).is_err());
    }

    #[test]
    fn test_mismatched_close() {
        let err = parse_markup("export default () => <A><B></A></B>", 16).unwrap_err();
        assert!(matches!(err, MarkupError::MismatchedClose { .. }));
    }

    #[test]
    fn test_depth_limit() {
        let source = "export default () => <A><A><A /></A></A>";
        assert!(parse_markup(source, 3).is_ok());
        assert_eq!(
            parse_markup(source, 2).unwrap_err(),
            MarkupError::TooDeep { limit: 2 }
        );
    }
}

//! Documentation comment parsing.
//!
//! Works line by line on the content of a `/** ... */` block. Fenced code
//! blocks are opaque: a line starting with `@` inside a fence is content, not a
//! tag.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TAG_LINE: Regex = Regex::new(r"^@([A-Za-z][\w-]*)(?:\s+(.*))?$").unwrap();
    static ref FENCE: Regex = Regex::new(r"^(`{3,}|~{3,})").unwrap();
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocComment {
    pub description: String,
    pub tags: Vec<DocTag>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocTag {
    pub name: String,
    pub text: String,
}

impl DocComment {
    pub fn parse(raw: &str) -> Self {
        let mut description = Vec::new();
        let mut tags: Vec<(String, Vec<String>)> = Vec::new();
        let mut fence = FenceState::default();

        for line in comment_lines(raw) {
            let trimmed = line.trim();
            if !fence.is_open() {
                if let Some(caps) = TAG_LINE.captures(trimmed) {
                    let first = caps.get(2).map(|m| m.as_str().to_string());
                    tags.push((caps[1].to_string(), first.into_iter().collect()));
                    continue;
                }
            }
            fence.feed(trimmed);
            match tags.last_mut() {
                Some((_, lines)) => lines.push(line.to_string()),
                None => description.push(line.to_string()),
            }
        }

        Self {
            description: description.join("\n").trim().to_string(),
            tags: tags
                .into_iter()
                .map(|(name, lines)| DocTag {
                    name,
                    text: lines.join("\n").trim().to_string(),
                })
                .collect(),
        }
    }

    /// Text of the first tag with this name.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.text.as_str())
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }

    /// Non-empty text of a tag.
    pub fn tag_text(&self, name: &str) -> Option<String> {
        self.tag(name)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    }

    /// `@description` when present, else the free text before the first tag.
    pub fn resolved_description(&self) -> String {
        self.tag_text("description")
            .unwrap_or_else(|| self.description.clone())
    }
}

/// Parse an optional raw comment.
pub fn parse_doc(raw: Option<&str>) -> DocComment {
    raw.map(DocComment::parse).unwrap_or_default()
}

/// Content of the fenced block that follows a bare `@default` line. With
/// several such blocks the last one wins.
pub fn find_default_block(raw: &str) -> Option<String> {
    let lines = comment_lines(raw);
    let mut found = None;
    let mut fence = FenceState::default();
    let mut i = 0;

    while i < lines.len() {
        let trimmed = lines[i].trim();
        let starts_paragraph = i == 0 || lines[i - 1].trim().is_empty();
        if fence.is_open() || trimmed != "@default" || !starts_paragraph {
            fence.feed(trimmed);
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < lines.len() && lines[j].trim().is_empty() {
            j += 1;
        }
        let Some(opening) = lines.get(j).and_then(|l| FENCE.captures(l.trim())) else {
            i += 1;
            continue;
        };
        let marker = opening[1].to_string();

        let mut body = Vec::new();
        let mut k = j + 1;
        let mut closed = false;
        while k < lines.len() {
            if lines[k].trim().starts_with(&marker) {
                closed = true;
                break;
            }
            body.push(lines[k]);
            k += 1;
        }
        if closed {
            found = Some(body.join("\n"));
        }
        i = k + 1;
    }

    found
}

/// Comment content with the leading `*` gutter removed.
fn comment_lines(raw: &str) -> Vec<&str> {
    raw.lines()
        .map(|line| {
            let line = line.trim_start();
            let line = line.strip_prefix('*').unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line).trim_end()
        })
        .collect()
}

#[derive(Debug, Default)]
struct FenceState {
    open: Option<String>,
}

impl FenceState {
    fn is_open(&self) -> bool {
        self.open.is_some()
    }

    fn feed(&mut self, trimmed: &str) {
        let Some(caps) = FENCE.captures(trimmed) else {
            return;
        };
        let marker = &caps[1];
        match &self.open {
            Some(open) if marker.starts_with(open.as_str()) => self.open = None,
            Some(_) => {}
            None => self.open = Some(marker.to_string()),
        }
    }
}

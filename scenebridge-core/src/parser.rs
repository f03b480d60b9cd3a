//! Scene file parser
//!
//! Splits a `.tscn` file into bracketed blocks and loads them into a
//! [`SceneDocument`]. A block starts at a header line such as
//! `[node name="Body" type="Node2D" parent="."]` and runs up to the next header
//! line or the end of the file.
//!
//! Only `gd_scene`, `node` and `ext_resource` headers are interpreted. Every
//! other block kind is kept verbatim so merging never loses content the
//! exporter does not understand.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use crate::document::SceneDocument;
use crate::error::{ExportError, ExportResult, ParseError};

/// Extension of the scene files the parser accepts
pub const SCENE_EXTENSION: &str = "tscn";

fn header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| {
        Regex::new(r"^\[([A-Za-z_][A-Za-z0-9_]*)(?:\s+(.*?))?\]\s*$").expect("header pattern is valid")
    })
}

fn attribute_regex() -> &'static Regex {
    static ATTRIBUTE: OnceLock<Regex> = OnceLock::new();
    ATTRIBUTE.get_or_init(|| {
        Regex::new(r#"([A-Za-z_][A-Za-z0-9_]*)=("(?:[^"\\]|\\.)*"|[^\s\]]+)"#)
            .expect("attribute pattern is valid")
    })
}

/// One block of a scene file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    /// Header kind, e.g. `node`
    pub kind: String,
    /// Header attributes in source order
    pub attributes: HeaderAttributes,
    /// Full block text, header included
    pub text: String,
    /// 1-based line number of the header
    pub line: usize,
}

/// `key=value` pairs of a block header, values unquoted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderAttributes(Vec<(String, String)>);

impl HeaderAttributes {
    pub fn parse(source: &str) -> Self {
        let pairs = attribute_regex()
            .captures_iter(source)
            .map(|caps| (caps[1].to_string(), unquote(&caps[2])))
            .collect();
        Self(pairs)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn unquote(value: &str) -> String {
    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => value.to_string(),
    }
}

/// Split file text into blocks
pub fn split_blocks(text: &str) -> Vec<RawBlock> {
    let mut blocks: Vec<RawBlock> = Vec::new();
    let mut current: Option<(RawBlock, Vec<&str>)> = None;

    for (index, line) in text.lines().enumerate() {
        if let Some(caps) = header_regex().captures(line) {
            if let Some((mut block, lines)) = current.take() {
                block.text = lines.join("\n");
                blocks.push(block);
            }
            let block = RawBlock {
                kind: caps[1].to_string(),
                attributes: HeaderAttributes::parse(caps.get(2).map_or("", |m| m.as_str())),
                text: String::new(),
                line: index + 1,
            };
            current = Some((block, vec![line]));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        } else if !line.trim().is_empty() {
            tracing::warn!(line = index + 1, "Ignoring content before the first block header");
        }
    }

    if let Some((mut block, lines)) = current {
        block.text = lines.join("\n");
        blocks.push(block);
    }
    blocks
}

/// Leading integer of an `ext_resource` id (`3`, `"3"` and `"3_a8fk2"` all give 3)
fn resource_id(value: &str) -> Option<u32> {
    let digits: String = value.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Parse scene text into a document
///
/// `format` is used when the text has no `gd_scene` descriptor.
pub fn parse_scene(text: &str, format: u32) -> Result<SceneDocument, ParseError> {
    let mut document = SceneDocument::new(format);

    for block in split_blocks(text) {
        match block.kind.as_str() {
            "gd_scene" => {
                let format = block
                    .attributes
                    .get("format")
                    .and_then(|f| f.parse::<u32>().ok())
                    .ok_or_else(|| ParseError::new(block.line, "scene descriptor has no integer format"))?;
                document.set_format(format);
                document.set_uid(block.attributes.get("uid").map(str::to_string));
            }
            "node" => {
                let name = block
                    .attributes
                    .get("name")
                    .ok_or_else(|| ParseError::new(block.line, "node header has no name"))?
                    .to_string();
                let parent = block.attributes.get("parent").map(str::to_string);
                let path = document.insert_node(parent.as_deref(), &name, block.text);
                tracing::trace!(path = %path, "Parsed node");
            }
            "ext_resource" => {
                let key = block.attributes.get("id").unwrap_or_default();
                let id = resource_id(key)
                    .ok_or_else(|| ParseError::new(block.line, "ext_resource header has no integer id"))?;
                let key = key.to_string();
                let locator = block.attributes.get("path").unwrap_or_default().to_string();
                document.insert_resource(crate::document::ExternalResource {
                    id,
                    key,
                    locator,
                    text: block.text,
                });
            }
            kind => document.push_other_block(kind, &block.text),
        }
    }

    tracing::debug!(
        format = document.format(),
        nodes = document.node_count(),
        resources = document.resource_count(),
        other = document.other_blocks().len(),
        "Parsed scene"
    );
    Ok(document)
}

/// Whether `path` names an existing scene file the exporter can merge into
pub fn is_mergeable_scene(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == SCENE_EXTENSION)
}

/// Load the scene to merge into, or `None` if there is nothing to merge
pub fn load_existing(path: Option<&Path>, format: u32) -> ExportResult<Option<SceneDocument>> {
    let Some(path) = path.filter(|p| is_mergeable_scene(p)) else {
        if let Some(path) = path {
            tracing::info!(path = %path.display(), "Not an existing scene file, starting a new scene");
        }
        return Ok(None);
    };

    let text = std::fs::read_to_string(path).map_err(|e| ExportError::io(path, e))?;
    let document = parse_scene(&text, format).map_err(|e| e.with_path(path))?;
    tracing::info!(path = %path.display(), nodes = document.node_count(), "Loaded existing scene");
    Ok(Some(document))
}

//! YAML front-matter extraction.
//!
//! An article starts with a `---` line, a YAML mapping, and a closing `---`
//! line. One blank line after the closing delimiter separates the metadata
//! from the body and is not part of the body.

use folio_core::{Error, Result};
use serde::de::DeserializeOwned;
use yaml_serde::{Mapping, Value};

/// Line that opens and closes the front-matter block.
pub const DELIMITER: &str = "---";

const BOM: char = '\u{feff}';

/// Result of splitting a document into front matter and body.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontmatterResult<'a> {
    frontmatter: Option<Mapping>,
    raw: Option<&'a str>,
    body: &'a str,
}

impl<'a> FrontmatterResult<'a> {
    /// Parsed front matter, if the document had a block.
    pub fn frontmatter(&self) -> Option<&Mapping> {
        self.frontmatter.as_ref()
    }

    /// Raw YAML text between the delimiters.
    pub fn raw(&self) -> Option<&'a str> {
        self.raw
    }

    /// Body text following the block (or the whole document without one).
    pub fn body(&self) -> &'a str {
        self.body
    }

    /// Whether the document started with a front-matter block.
    pub fn has_frontmatter(&self) -> bool {
        self.frontmatter.is_some()
    }

    /// Look up a single front-matter field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.frontmatter.as_ref().and_then(|m| m.get(key))
    }

    /// Deserialize the front matter into a caller-defined type.
    ///
    /// Returns `Ok(None)` when the document has no front matter.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match &self.frontmatter {
            Some(mapping) => yaml_serde::from_value(Value::Mapping(mapping.clone()))
                .map(Some)
                .map_err(|e| Error::format(format!("invalid front matter: {e}"))),
            None => Ok(None),
        }
    }

    /// Split into the owned mapping and the body.
    pub fn into_parts(self) -> (Option<Mapping>, &'a str) {
        (self.frontmatter, self.body)
    }
}

/// Extract YAML front matter from markdown content.
///
/// - No opening `---` line: no front matter, the whole input is the body.
/// - Opening line but no closing line: [`Error::Format`].
/// - Block that is not a YAML mapping: [`Error::Format`].
/// - Empty block: empty mapping.
pub fn extract_frontmatter(content: &str) -> Result<FrontmatterResult<'_>> {
    let Some((raw, body)) = split(content)? else {
        return Ok(FrontmatterResult {
            frontmatter: None,
            raw: None,
            body: content,
        });
    };

    let mapping = parse_mapping(raw)?;
    log::trace!("extracted front matter with {} field(s)", mapping.len());

    Ok(FrontmatterResult {
        frontmatter: Some(mapping),
        raw: Some(raw),
        body,
    })
}

/// Return the body with any front matter removed.
///
/// Never fails: a document whose block cannot be split is returned as is.
pub fn strip_frontmatter(content: &str) -> &str {
    match split(content) {
        Ok(Some((_, body))) => body,
        _ => content,
    }
}

/// Locate the block, returning `(yaml, body)` slices.
fn split(content: &str) -> Result<Option<(&str, &str)>> {
    let content = content.strip_prefix(BOM).unwrap_or(content);

    let Some(rest) = strip_delimiter_line(content) else {
        return Ok(None);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if is_delimiter_line(line) {
            let raw = &rest[..offset];
            let after = &rest[offset + line.len()..];
            return Ok(Some((raw, strip_separator(after))));
        }
        offset += line.len();
    }

    Err(Error::format(
        "front matter opened with `---` but no closing `---` line was found",
    ))
}

fn strip_delimiter_line(content: &str) -> Option<&str> {
    let rest = content.strip_prefix(DELIMITER)?;
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}

fn is_delimiter_line(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

fn strip_separator(after: &str) -> &str {
    after
        .strip_prefix("\r\n")
        .or_else(|| after.strip_prefix('\n'))
        .unwrap_or(after)
}

fn parse_mapping(raw: &str) -> Result<Mapping> {
    if raw.trim().is_empty() {
        return Ok(Mapping::new());
    }

    let value: Value = yaml_serde::from_str(raw)
        .map_err(|e| Error::format(format!("front matter is not valid YAML: {e}")))?;

    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        other => Err(Error::format(format!(
            "front matter must be a mapping of fields, found {}",
            describe(&other)
        ))),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

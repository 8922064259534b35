//! Content extraction helpers.

use std::collections::HashSet;
use std::sync::LazyLock;

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use regex::Regex;

static NON_ID_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid id pattern"));

/// Normalize a string into an identifier (lowercase, dash separated).
///
/// ```
/// use folio_content::markdown::normalize_id;
///
/// assert_eq!(normalize_id("Deduplicating NgRx Reducers!"), "deduplicating-ngrx-reducers");
/// assert_eq!(normalize_id("2020-04-26_ngrx"), "2020-04-26-ngrx");
/// ```
pub fn normalize_id(input: &str) -> String {
    let lowered = input.to_lowercase();
    NON_ID_CHARS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Split a comma-separated string into trimmed, non-empty items.
pub fn parse_comma_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a keyword list written as a single string.
///
/// Accepts commas or semicolons as separators, strips surrounding quotes and
/// `#` prefixes, and drops duplicates while keeping the first spelling.
pub fn parse_keyword_list(input: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    input
        .split([',', ';'])
        .map(|s| s.trim().trim_matches(['"', '\'']).trim_start_matches('#').trim())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Return the markdown under the heading whose text matches `heading`
/// (case-insensitive), up to the next heading of the same or higher level.
///
/// The heading line itself is not included. Returns `None` when no heading
/// matches.
pub fn extract_section_content(content: &str, heading: &str) -> Option<String> {
    let wanted = heading.trim().to_lowercase();

    let mut in_heading: Option<(u8, String)> = None;
    let mut section: Option<(u8, usize)> = None;

    for (event, range) in Parser::new(content).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                let level = level as u8;
                if let Some((section_level, start)) = section {
                    if level <= section_level {
                        return Some(content[start..range.start].trim().to_string());
                    }
                }
                in_heading = Some((level, String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buf)) = in_heading.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, text)) = in_heading.take() {
                    if section.is_none() && text.trim().to_lowercase() == wanted {
                        section = Some((level, range.end));
                    }
                }
            }
            _ => {}
        }
    }

    section.map(|(_, start)| content[start..].trim().to_string())
}

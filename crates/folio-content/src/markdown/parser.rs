//! Block-level markdown parsing.
//!
//! [`Blocks`] walks an article body lazily and yields one [`Block`] per
//! top-level element. Fenced code is returned exactly as written, with its
//! language tag.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;

/// A hyperlink found in the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Link target.
    pub url: String,
    /// Visible link text.
    pub text: String,
}

/// A code snippet found in the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeSnippet {
    /// Language tag of a fenced block (first word of the info string).
    pub language: Option<String>,
    /// Snippet text, verbatim.
    pub code: String,
}

/// A top-level element of an article body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// `#`-style or setext heading.
    Heading { level: u8, text: String },
    /// Paragraph text, with the links it contains.
    Paragraph { text: String, links: Vec<Link> },
    /// Fenced or indented code.
    CodeBlock {
        language: Option<String>,
        info: Option<String>,
        code: String,
    },
    /// Table with a header row.
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Paragraph consisting of a single image.
    Image {
        url: String,
        alt: String,
        title: Option<String>,
    },
    /// Ordered or bulleted list; one string per item.
    List { ordered: bool, items: Vec<String> },
    /// Block quote, flattened to text.
    BlockQuote { text: String },
    /// Thematic break.
    Rule,
    /// Raw HTML block.
    Html { html: String },
}

impl Block {
    /// Plain text of the block (empty for rules).
    pub fn text(&self) -> String {
        match self {
            Block::Heading { text, .. }
            | Block::Paragraph { text, .. }
            | Block::BlockQuote { text } => text.clone(),
            Block::CodeBlock { code, .. } => code.clone(),
            Block::Table { header, rows } => std::iter::once(header)
                .chain(rows.iter())
                .map(|row| row.join(" | "))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Image { alt, .. } => alt.clone(),
            Block::List { items, .. } => items.join("\n"),
            Block::Rule => String::new(),
            Block::Html { html } => html.clone(),
        }
    }
}

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Lazy iterator over the top-level blocks of a markdown document.
pub struct Blocks<'a> {
    parser: Parser<'a>,
}

impl<'a> Blocks<'a> {
    /// Start walking `content`.
    pub fn new(content: &'a str) -> Self {
        Self {
            parser: Parser::new_ext(content, parser_options()),
        }
    }

    /// Collect the events of one top-level element, up to its matching end.
    fn collect_element(&mut self, first: Tag<'a>) -> (Tag<'a>, Vec<Event<'a>>) {
        let mut depth = 1usize;
        let mut events = Vec::new();
        for event in self.parser.by_ref() {
            match &event {
                Event::Start(_) => depth += 1,
                Event::End(_) => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            events.push(event);
        }
        (first, events)
    }
}

impl<'a> Iterator for Blocks<'a> {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        loop {
            match self.parser.next()? {
                Event::Start(tag) => {
                    let (tag, events) = self.collect_element(tag);
                    if let Some(block) = build_block(tag, &events) {
                        return Some(block);
                    }
                }
                Event::Rule => return Some(Block::Rule),
                Event::Html(html) => {
                    return Some(Block::Html {
                        html: html.to_string(),
                    });
                }
                _ => {}
            }
        }
    }
}

fn build_block(tag: Tag<'_>, events: &[Event<'_>]) -> Option<Block> {
    let block = match tag {
        Tag::Heading { level, .. } => Block::Heading {
            level: level as u8,
            text: inline_text(events),
        },
        Tag::Paragraph => match single_image(events) {
            Some(image) => image,
            None => Block::Paragraph {
                text: inline_text(events),
                links: links_in(events),
            },
        },
        Tag::CodeBlock(kind) => {
            let info = match kind {
                CodeBlockKind::Fenced(info) if !info.trim().is_empty() => {
                    Some(info.trim().to_string())
                }
                _ => None,
            };
            let language = info
                .as_deref()
                .and_then(|i| i.split([' ', ',', '{']).next())
                .filter(|l| !l.is_empty())
                .map(str::to_string);
            Block::CodeBlock {
                language,
                info,
                code: raw_text(events),
            }
        }
        Tag::Table(_) => table(events),
        Tag::List(start) => Block::List {
            ordered: start.is_some(),
            items: list_items(events),
        },
        Tag::BlockQuote(_) => Block::BlockQuote {
            text: inline_text(events),
        },
        Tag::HtmlBlock => Block::Html {
            html: raw_text(events),
        },
        _ => {
            let text = inline_text(events);
            if text.is_empty() {
                return None;
            }
            Block::Paragraph {
                text,
                links: links_in(events),
            }
        }
    };
    Some(block)
}

/// Concatenate text verbatim (code and HTML blocks).
fn raw_text(events: &[Event<'_>]) -> String {
    let mut out = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Html(t) | Event::InlineHtml(t) => out.push_str(t),
            _ => {}
        }
    }
    out
}

/// Flatten inline content into readable text.
fn inline_text(events: &[Event<'_>]) -> String {
    let mut out = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => out.push_str(t),
            Event::SoftBreak => out.push(' '),
            Event::HardBreak => out.push('\n'),
            Event::End(TagEnd::Paragraph) | Event::End(TagEnd::Item) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
    out.trim().to_string()
}

fn links_in(events: &[Event<'_>]) -> Vec<Link> {
    let mut links = Vec::new();
    let mut current: Option<(String, String)> = None;
    for event in events {
        match event {
            Event::Start(Tag::Link { dest_url, .. }) => {
                current = Some((dest_url.to_string(), String::new()));
            }
            Event::Text(t) | Event::Code(t) => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(t);
                }
            }
            Event::End(TagEnd::Link) => {
                if let Some((url, text)) = current.take() {
                    links.push(Link { url, text });
                }
            }
            _ => {}
        }
    }
    links
}

/// A paragraph whose only content is one image becomes an image block.
fn single_image(events: &[Event<'_>]) -> Option<Block> {
    let (url, title) = match events.first()? {
        Event::Start(Tag::Image {
            dest_url, title, ..
        }) => (dest_url.to_string(), title.to_string()),
        _ => return None,
    };

    let mut alt = String::new();
    let mut closed = false;
    for event in &events[1..] {
        match event {
            Event::End(TagEnd::Image) if !closed => closed = true,
            Event::Text(t) | Event::Code(t) if !closed => alt.push_str(t),
            Event::SoftBreak if !closed => alt.push(' '),
            Event::Text(t) if t.trim().is_empty() => {}
            _ if !closed => {}
            _ => return None,
        }
    }

    Some(Block::Image {
        url,
        alt,
        title: (!title.is_empty()).then_some(title),
    })
}

fn table(events: &[Event<'_>]) -> Block {
    let mut header = Vec::new();
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();

    for event in events {
        match event {
            Event::Start(Tag::TableCell) => cell.clear(),
            Event::Text(t) | Event::Code(t) => cell.push_str(t),
            Event::End(TagEnd::TableCell) => row.push(cell.trim().to_string()),
            Event::End(TagEnd::TableHead) => header = std::mem::take(&mut row),
            Event::End(TagEnd::TableRow) => rows.push(std::mem::take(&mut row)),
            _ => {}
        }
    }

    Block::Table { header, rows }
}

fn list_items(events: &[Event<'_>]) -> Vec<String> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, event) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::Item) => {
                if depth == 0 {
                    start = i + 1;
                }
                depth += 1;
            }
            Event::End(TagEnd::Item) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    items.push(inline_text(&events[start..i]));
                }
            }
            _ => {}
        }
    }

    items
}

/// Text of the first heading, if any.
pub fn extract_first_heading(content: &str) -> Option<String> {
    Blocks::new(content).find_map(|block| match block {
        Block::Heading { text, .. } => Some(text),
        _ => None,
    })
}

/// Text of the first paragraph, if any.
pub fn extract_first_paragraph(content: &str) -> Option<String> {
    Blocks::new(content).find_map(|block| match block {
        Block::Paragraph { text, .. } if !text.is_empty() => Some(text),
        _ => None,
    })
}

/// All readable text of the document, one block per line group.
pub fn extract_text_content(content: &str) -> String {
    Blocks::new(content)
        .map(|block| block.text())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Every hyperlink in the document, in order.
pub fn extract_links(content: &str) -> Vec<Link> {
    let events: Vec<Event<'_>> = Parser::new_ext(content, parser_options()).collect();
    links_in(&events)
}

/// Every code block in the document, in order.
pub fn extract_code_blocks(content: &str) -> Vec<CodeSnippet> {
    Blocks::new(content)
        .filter_map(|block| match block {
            Block::CodeBlock { language, code, .. } => Some(CodeSnippet { language, code }),
            _ => None,
        })
        .collect()
}

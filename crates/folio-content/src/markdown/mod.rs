//! Markdown parsing and front-matter extraction utilities.
//!
//! - [`frontmatter`]: YAML front-matter extraction
//! - [`parser`]: Block-level body parsing (headings, paragraphs, code, tables)
//! - [`helpers`]: Content helpers (ids, keyword lists, sections)
//!
//! # Design Philosophy
//!
//! These utilities return generic types (`yaml_serde::Mapping`, `String`,
//! [`Block`]) rather than the article record. [`crate::Article`] is built
//! on top of them.
//!
//! # Example
//!
//! ```rust
//! use folio_content::markdown::extract_frontmatter;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Header {
//!     title: String,
//!     category: Option<String>,
//! }
//!
//! let content = "---\ntitle: Hello\ncategory: test\n---\n\nBody text";
//! let result = extract_frontmatter(content).unwrap();
//!
//! let header: Option<Header> = result.deserialize().unwrap();
//! assert_eq!(header.unwrap().title, "Hello");
//! assert_eq!(result.body(), "Body text");
//! ```

pub mod frontmatter;
pub mod helpers;
pub mod parser;

// Re-export key types and functions
pub use frontmatter::{DELIMITER, FrontmatterResult, extract_frontmatter, strip_frontmatter};
pub use helpers::{
    extract_section_content, normalize_id, parse_comma_list, parse_keyword_list,
};
pub use parser::{
    Block, Blocks, CodeSnippet, Link, extract_code_blocks, extract_first_heading,
    extract_first_paragraph, extract_links, extract_text_content,
};

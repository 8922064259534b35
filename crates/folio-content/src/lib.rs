//! Front-matter extraction, article records, and markdown utilities.
//!
//! # Features
//!
//! - Front-matter extraction from markdown files ([`markdown::frontmatter`])
//! - The typed [`Article`] record and its serializer ([`article`])
//! - Lazy block-level parsing of article bodies ([`markdown::parser`])
//! - Loading and indexing a whole directory of articles ([`corpus`])

#![doc = include_str!("../README.md")]

pub mod article;
pub mod corpus;
pub mod markdown;

pub use article::{Article, ArticleMeta, serialize};
pub use corpus::{Corpus, LoadFailure};
pub use markdown::{Block, Blocks, FrontmatterResult, extract_frontmatter, strip_frontmatter};

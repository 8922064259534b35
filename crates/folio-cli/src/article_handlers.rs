//! Handler functions for article CLI commands.
//!
//! These functions implement `list`, `show`, `keywords`, `check`, and
//! `links`. Each handler renders to a `String` and prints it, so output can
//! be checked in tests.

use folio_content::{Article, Block, Corpus};
use folio_core::traits::ConfigProvider;
use folio_core::{Error, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::ARTICLES;

// ============================================================================
// Option types
// ============================================================================

/// Options for `list`.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Only articles with this keyword.
    pub keyword: Option<String>,
    /// Include hidden articles.
    pub include_hidden: bool,
    /// Maximum number of articles.
    pub limit: Option<usize>,
    /// Output JSON.
    pub json: bool,
}

/// Options for `show`.
#[derive(Debug, Clone, Default)]
pub struct ShowOptions {
    /// Article slug.
    pub slug: String,
    /// Output JSON.
    pub json: bool,
    /// Include the body's block outline.
    pub blocks: bool,
}

/// Listing entry, as printed by `list --json`.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleSummary {
    pub slug: String,
    pub title: String,
    pub published: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl From<&Article> for ArticleSummary {
    fn from(article: &Article) -> Self {
        Self {
            slug: article.slug(),
            title: article.title().to_string(),
            published: article.meta.published.to_string(),
            author: article.meta.author.clone(),
            keywords: article.meta.keywords.iter().cloned().collect(),
            hidden: article.is_hidden(),
            summary: article.summary(),
            path: article.path.clone(),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Resolve the article directory: `--dir` wins over configuration.
pub fn article_dir<C: ConfigProvider>(config: &C, dir: Option<&str>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(folio_core::util::paths::expand_tilde(dir)),
        None => config.content_path(ARTICLES),
    }
}

/// Load the corpus the configuration points at.
pub async fn load_corpus<C: ConfigProvider>(config: &C, dir: Option<&str>) -> Result<Corpus> {
    let dir = article_dir(config, dir)?;
    log::debug!("loading articles from {}", dir.display());
    Corpus::load(&dir, config.find_options()).await
}

fn find<'a>(corpus: &'a Corpus, slug: &str) -> Result<&'a Article> {
    corpus
        .get(slug)
        .ok_or_else(|| Error::not_found(format!("article '{slug}'")))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::serialization(e.to_string()))
}

// ============================================================================
// Renderers
// ============================================================================

/// Render the article listing.
pub fn render_list(corpus: &Corpus, options: &ListOptions) -> Result<String> {
    let mut articles = match &options.keyword {
        Some(keyword) => corpus.by_keyword(keyword, options.include_hidden),
        None => corpus.listing(options.include_hidden),
    };
    if let Some(limit) = options.limit {
        articles.truncate(limit);
    }

    if options.json {
        let summaries: Vec<ArticleSummary> = articles.into_iter().map(Into::into).collect();
        return to_json(&summaries);
    }

    if articles.is_empty() {
        return Ok("No articles found.".to_string());
    }

    let lines: Vec<String> = articles
        .iter()
        .map(|article| {
            let mut line = format!(
                "{}  {:<32}  {}",
                article.meta.published,
                article.slug(),
                article.title()
            );
            if article.is_hidden() {
                line.push_str("  (hidden)");
            }
            if !article.meta.keywords.is_empty() {
                let keywords: Vec<&str> =
                    article.meta.keywords.iter().map(String::as_str).collect();
                line.push_str(&format!("  [{}]", keywords.join(", ")));
            }
            line
        })
        .collect();
    Ok(lines.join("\n"))
}

/// Render one article.
pub fn render_show(corpus: &Corpus, options: &ShowOptions) -> Result<String> {
    let article = find(corpus, &options.slug)?;

    if options.json {
        return to_json(article);
    }

    let meta = &article.meta;
    let mut out = Vec::new();
    out.push(format!("Title:     {}", meta.title));
    out.push(format!("Slug:      {}", article.slug()));
    out.push(format!("Published: {}", meta.published));
    if let Some(author) = &meta.author {
        match &meta.mail {
            Some(mail) => out.push(format!("Author:    {author} <{mail}>")),
            None => out.push(format!("Author:    {author}")),
        }
    }
    if let Some(language) = &meta.language {
        out.push(format!("Language:  {language}"));
    }
    if !meta.keywords.is_empty() {
        let keywords: Vec<&str> = meta.keywords.iter().map(String::as_str).collect();
        out.push(format!("Keywords:  {}", keywords.join(", ")));
    }
    if let Some(thumbnail) = article.thumbnail_path() {
        out.push(format!("Thumbnail: {}", thumbnail.display()));
    }
    if meta.hidden {
        out.push("Hidden:    yes".to_string());
    }
    for (key, value) in &meta.extra {
        let key = format!("{}:", yaml_scalar(key));
        out.push(format!("{key:<10} {}", yaml_scalar(value)));
    }
    if let Some(path) = &article.path {
        out.push(format!("File:      {}", path.display()));
    }
    if let Some(summary) = article.summary() {
        out.push(String::new());
        out.push(summary);
    }

    if options.blocks {
        out.push(String::new());
        out.push("Blocks".to_string());
        out.push("======".to_string());
        out.extend(article.blocks().map(|block| describe_block(&block)));
    }

    Ok(out.join("\n"))
}

fn yaml_scalar<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(other) => other.to_string(),
        Err(_) => String::new(),
    }
}

/// One-line outline entry for a block.
fn describe_block(block: &Block) -> String {
    match block {
        Block::Heading { level, text } => format!("{} {text}", "#".repeat(*level as usize)),
        Block::Paragraph { text, links } => {
            let words = text.split_whitespace().count();
            if links.is_empty() {
                format!("paragraph ({words} words)")
            } else {
                format!("paragraph ({words} words, {} links)", links.len())
            }
        }
        Block::CodeBlock { language, code, .. } => format!(
            "code [{}] ({} lines)",
            language.as_deref().unwrap_or("text"),
            code.lines().count()
        ),
        Block::Table { header, rows } => {
            format!("table ({} columns, {} rows)", header.len(), rows.len())
        }
        Block::Image { url, .. } => format!("image {url}"),
        Block::List { ordered, items } => format!(
            "{} list ({} items)",
            if *ordered { "ordered" } else { "bulleted" },
            items.len()
        ),
        Block::BlockQuote { .. } => "quote".to_string(),
        Block::Rule => "rule".to_string(),
        Block::Html { .. } => "html".to_string(),
    }
}

/// Render the keyword index.
pub fn render_keywords(corpus: &Corpus, include_hidden: bool, json: bool) -> Result<String> {
    let index = corpus.keyword_index(include_hidden);
    if json {
        return to_json(&index);
    }
    if index.is_empty() {
        return Ok("No keywords found.".to_string());
    }

    let mut entries: Vec<(&String, &usize)> = index.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    let lines: Vec<String> = entries
        .into_iter()
        .map(|(keyword, count)| format!("{count:>4}  {keyword}"))
        .collect();
    Ok(lines.join("\n"))
}

/// Render the parse report; the flag is true when every file parsed.
pub fn render_check(corpus: &Corpus) -> (String, bool) {
    let mut out = Vec::new();
    for failure in corpus.failures() {
        out.push(format!("FAIL  {}: {}", failure.path.display(), failure.error));
    }
    out.push(format!(
        "{} article(s) parsed, {} failed",
        corpus.len(),
        corpus.failures().len()
    ));
    (out.join("\n"), corpus.failures().is_empty())
}

/// Render the links of one article.
pub fn render_links(corpus: &Corpus, slug: &str) -> Result<String> {
    let article = find(corpus, slug)?;
    let links = article.links();
    if links.is_empty() {
        return Ok(format!("No links in '{slug}'."));
    }
    let lines: Vec<String> = links
        .iter()
        .map(|link| format!("{}  {}", link.url, link.text))
        .collect();
    Ok(lines.join("\n"))
}

// ============================================================================
// Handlers
// ============================================================================

/// `folio list`
pub fn handle_list(corpus: &Corpus, options: ListOptions) -> Result<()> {
    println!("{}", render_list(corpus, &options)?);
    Ok(())
}

/// `folio show`
pub fn handle_show(corpus: &Corpus, options: ShowOptions) -> Result<()> {
    println!("{}", render_show(corpus, &options)?);
    Ok(())
}

/// `folio keywords`
pub fn handle_keywords(corpus: &Corpus, include_hidden: bool, json: bool) -> Result<()> {
    println!("{}", render_keywords(corpus, include_hidden, json)?);
    Ok(())
}

/// `folio check`: fails when any article is malformed.
pub fn handle_check(corpus: &Corpus) -> Result<()> {
    let (report, ok) = render_check(corpus);
    println!("{report}");
    if ok {
        Ok(())
    } else {
        Err(Error::format(format!(
            "{} article(s) failed to parse",
            corpus.failures().len()
        )))
    }
}

/// `folio links`
pub fn handle_links(corpus: &Corpus, slug: &str) -> Result<()> {
    println!("{}", render_links(corpus, slug)?);
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContentConfig, FolioConfig};
    use folio_core::FindOptions;
    use tempfile::TempDir;

    const NGRX: &str = r#"---
title: Sharing reducer logic with NgRx
author: Jane Doe
mail: jane@example.com
published: 2020-04-26
keywords:
  - NgRx
  - Redux
language: en
series: state
---

# Sharing reducer logic

Feature stores repeat [entity logic](https://ngrx.io/guide/entity) a lot.

```typescript
const reducer = createReducer(initialState);
```
"#;

    const PIPELINES: &str = "---\ntitle: Azure pipelines\npublished: 2021-02-01\nkeywords: [CI, Azure, Redux]\n---\n\nSet up a [pipeline](https://dev.azure.com).\n";

    const DRAFT: &str = "---\ntitle: Draft\npublished: 2022-01-01\nkeywords: [NgRx]\nhidden: true\n---\n\nWIP\n";

    fn corpus_dir() -> TempDir {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("ngrx.md"), NGRX).unwrap();
        std::fs::write(temp.path().join("pipelines.md"), PIPELINES).unwrap();
        std::fs::write(temp.path().join("draft.md"), DRAFT).unwrap();
        temp
    }

    async fn corpus(temp: &TempDir) -> Corpus {
        Corpus::load(temp.path(), FindOptions::markdown()).await.unwrap()
    }

    #[test]
    fn test_article_dir_override() {
        let config = FolioConfig {
            base_path: Some("/srv/blog".into()),
            ..Default::default()
        };
        assert_eq!(
            article_dir(&config, Some("/tmp/posts")).unwrap(),
            PathBuf::from("/tmp/posts")
        );
        assert_eq!(
            article_dir(&config, None).unwrap(),
            PathBuf::from("/srv/blog/articles")
        );
    }

    #[tokio::test]
    async fn test_load_corpus_from_config() {
        let temp = corpus_dir();
        let config = FolioConfig {
            content: ContentConfig {
                path: Some(temp.path().to_string_lossy().into_owned()),
                ..Default::default()
            },
            ..Default::default()
        };
        let corpus = load_corpus(&config, None).await.unwrap();
        assert_eq!(corpus.len(), 3);
    }

    #[tokio::test]
    async fn test_render_list_text() {
        let temp = corpus_dir();
        let corpus = corpus(&temp).await;

        let out = render_list(&corpus, &ListOptions::default()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("2021-02-01  pipelines"));
        assert!(lines[1].contains("Sharing reducer logic with NgRx"));
        assert!(lines[1].ends_with("[NgRx, Redux]"));
        assert!(!out.contains("Draft"));
    }

    #[tokio::test]
    async fn test_render_list_all_and_limit() {
        let temp = corpus_dir();
        let corpus = corpus(&temp).await;

        let options = ListOptions {
            include_hidden: true,
            limit: Some(1),
            ..Default::default()
        };
        let out = render_list(&corpus, &options).unwrap();
        assert_eq!(out.lines().count(), 1);
        assert!(out.contains("Draft"));
        assert!(out.contains("(hidden)"));
    }

    #[tokio::test]
    async fn test_render_list_keyword_json() {
        let temp = corpus_dir();
        let corpus = corpus(&temp).await;

        let options = ListOptions {
            keyword: Some("redux".into()),
            json: true,
            ..Default::default()
        };
        let out = render_list(&corpus, &options).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        let entries = parsed.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["slug"], "pipelines");
        assert_eq!(entries[1]["published"], "2020-04-26");
        assert_eq!(entries[1]["author"], "Jane Doe");
    }

    #[tokio::test]
    async fn test_render_list_empty() {
        let temp = corpus_dir();
        let corpus = corpus(&temp).await;

        let options = ListOptions {
            keyword: Some("rust".into()),
            ..Default::default()
        };
        assert_eq!(render_list(&corpus, &options).unwrap(), "No articles found.");
    }

    #[tokio::test]
    async fn test_render_show() {
        let temp = corpus_dir();
        let corpus = corpus(&temp).await;

        let options = ShowOptions {
            slug: "ngrx".into(),
            blocks: true,
            ..Default::default()
        };
        let out = render_show(&corpus, &options).unwrap();
        assert!(out.contains("Title:     Sharing reducer logic with NgRx"));
        assert!(out.contains("Author:    Jane Doe <jane@example.com>"));
        assert!(out.contains("Keywords:  NgRx, Redux"));
        assert!(out.contains("series:    state"));
        assert!(out.contains("# Sharing reducer logic"));
        assert!(out.contains("paragraph (7 words, 1 links)"));
        assert!(out.contains("code [typescript] (1 lines)"));
    }

    #[tokio::test]
    async fn test_render_show_json() {
        let temp = corpus_dir();
        let corpus = corpus(&temp).await;

        let options = ShowOptions {
            slug: "ngrx".into(),
            json: true,
            ..Default::default()
        };
        let out = render_show(&corpus, &options).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["meta"]["title"], "Sharing reducer logic with NgRx");
        assert_eq!(parsed["meta"]["series"], "state");
        assert!(
            parsed["body"]
                .as_str()
                .unwrap()
                .contains("```typescript")
        );
    }

    #[tokio::test]
    async fn test_render_show_missing() {
        let temp = corpus_dir();
        let corpus = corpus(&temp).await;

        let options = ShowOptions {
            slug: "nope".into(),
            ..Default::default()
        };
        assert!(render_show(&corpus, &options).unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_render_keywords() {
        let temp = corpus_dir();
        let corpus = corpus(&temp).await;

        let out = render_keywords(&corpus, false, false).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "   2  Redux");
        assert_eq!(lines.len(), 4);

        let out = render_keywords(&corpus, true, true).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["NgRx"], 2);
    }

    #[tokio::test]
    async fn test_check_reports_failures() {
        let temp = corpus_dir();
        std::fs::write(temp.path().join("broken.md"), "---\ntitle: unclosed\n").unwrap();
        let corpus = corpus(&temp).await;

        let (report, ok) = render_check(&corpus);
        assert!(!ok);
        assert!(report.contains("FAIL"));
        assert!(report.contains("broken.md"));
        assert!(report.contains("3 article(s) parsed, 1 failed"));
        assert!(handle_check(&corpus).unwrap_err().is_format());
    }

    #[tokio::test]
    async fn test_check_clean() {
        let temp = corpus_dir();
        let corpus = corpus(&temp).await;
        let (_, ok) = render_check(&corpus);
        assert!(ok);
        assert!(handle_check(&corpus).is_ok());
    }

    #[tokio::test]
    async fn test_render_links() {
        let temp = corpus_dir();
        let corpus = corpus(&temp).await;

        let out = render_links(&corpus, "pipelines").unwrap();
        assert_eq!(out, "https://dev.azure.com  pipeline");

        let out = render_links(&corpus, "draft").unwrap();
        assert_eq!(out, "No links in 'draft'.");
    }
}

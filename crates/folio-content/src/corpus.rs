//! Loading and indexing a directory of articles.
//!
//! A [`Corpus`] is what a publishing pipeline sees: every article under a
//! directory, with hidden entries filtered out of listings and keywords
//! counted for indexes. Files that fail to parse are reported, not fatal.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use folio_core::util::files::{exists, find_all_files};
use folio_core::{Error, FindOptions, Result};

use crate::article::Article;

/// A file that could not be loaded as an article.
#[derive(Debug)]
pub struct LoadFailure {
    /// File that failed.
    pub path: PathBuf,
    /// Why it failed.
    pub error: Error,
}

/// All articles found under one directory.
#[derive(Debug, Default)]
pub struct Corpus {
    root: PathBuf,
    articles: Vec<Article>,
    failures: Vec<LoadFailure>,
}

impl Corpus {
    /// Discover and parse every article under `root`.
    ///
    /// Returns [`Error::NotFound`] if `root` does not exist. Individual files
    /// that fail to read or parse are collected in [`Corpus::failures`].
    pub async fn load(root: impl AsRef<Path>, options: FindOptions) -> Result<Self> {
        let root = root.as_ref();
        if !exists(root).await {
            return Err(Error::not_found(format!(
                "article directory {}",
                root.display()
            )));
        }

        let files = find_all_files(root, options).await?;
        let mut corpus = Self {
            root: root.to_path_buf(),
            ..Default::default()
        };

        for file in files {
            match Article::from_file(&file.path).await {
                Ok(article) => {
                    log::debug!("loaded article '{}' from {}", article.slug(), file.path.display());
                    corpus.articles.push(article);
                }
                Err(error) => {
                    log::warn!("skipping {}: {error}", file.path.display());
                    corpus.failures.push(LoadFailure {
                        path: file.path,
                        error,
                    });
                }
            }
        }

        corpus.warn_duplicate_slugs();
        log::info!(
            "loaded {} article(s) from {} ({} failed)",
            corpus.articles.len(),
            root.display(),
            corpus.failures.len()
        );
        Ok(corpus)
    }

    /// Build a corpus from already-parsed articles.
    pub fn from_articles(articles: Vec<Article>) -> Self {
        Self {
            articles,
            ..Default::default()
        }
    }

    fn warn_duplicate_slugs(&self) {
        let mut seen: BTreeMap<String, &Article> = BTreeMap::new();
        for article in &self.articles {
            let slug = article.slug();
            match seen.get(&slug) {
                Some(first) => log::warn!(
                    "duplicate slug '{slug}' ({} and {}); lookups return the first",
                    describe_source(first),
                    describe_source(article)
                ),
                None => {
                    seen.insert(slug, article);
                }
            }
        }
    }

    /// Directory the corpus was loaded from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every parsed article, hidden ones included, in file order.
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// Files that could not be parsed.
    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    /// Number of parsed articles.
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    /// True when no article parsed.
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Articles for a listing, newest first (ties broken by title).
    pub fn listing(&self, include_hidden: bool) -> Vec<&Article> {
        let mut listed: Vec<&Article> = self
            .articles
            .iter()
            .filter(|a| include_hidden || !a.is_hidden())
            .collect();
        listed.sort_by(|a, b| {
            b.meta
                .published
                .cmp(&a.meta.published)
                .then_with(|| a.title().cmp(b.title()))
        });
        listed
    }

    /// Visible articles, newest first.
    pub fn published(&self) -> Vec<&Article> {
        self.listing(false)
    }

    /// Articles tagged with `keyword` (case-insensitive), newest first.
    pub fn by_keyword(&self, keyword: &str, include_hidden: bool) -> Vec<&Article> {
        self.listing(include_hidden)
            .into_iter()
            .filter(|a| a.has_keyword(keyword))
            .collect()
    }

    /// Keyword to article count.
    ///
    /// Keywords that differ only in case are counted together, under the
    /// spelling of the newest article that uses them.
    pub fn keyword_index(&self, include_hidden: bool) -> BTreeMap<String, usize> {
        let mut spellings: HashMap<String, String> = HashMap::new();
        let mut index = BTreeMap::new();
        for article in self.listing(include_hidden) {
            for keyword in &article.meta.keywords {
                let name = spellings
                    .entry(keyword.to_lowercase())
                    .or_insert_with(|| keyword.clone());
                *index.entry(name.clone()).or_insert(0) += 1;
            }
        }
        index
    }

    /// Look up an article by slug (hidden articles included).
    pub fn get(&self, slug: &str) -> Option<&Article> {
        let wanted = crate::markdown::normalize_id(slug);
        self.articles.iter().find(|a| a.slug() == wanted)
    }
}

fn describe_source(article: &Article) -> String {
    match &article.path {
        Some(path) => path.display().to_string(),
        None => format!("\"{}\"", article.title()),
    }
}

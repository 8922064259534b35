//! The article record.
//!
//! An [`Article`] is one blog post: typed front matter ([`ArticleMeta`]) plus
//! the markdown body exactly as written. Fields the record does not know about
//! are kept in [`ArticleMeta::extra`] and written back out on serialization.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use folio_core::util::files::read_file;
use folio_core::{Error, Result};
use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use yaml_serde::{Mapping, Value};

use crate::markdown::frontmatter::{DELIMITER, extract_frontmatter};
use crate::markdown::helpers::normalize_id;
use crate::markdown::parser::{
    Blocks, CodeSnippet, Link, extract_code_blocks, extract_first_paragraph, extract_links,
};

/// Stems that name a directory-per-article layout (`my-post/index.md`).
const INDEX_STEMS: &[&str] = &["index", "README", "readme", "_index"];

/// Front-matter keys with a typed field, in the order they are written.
const KNOWN_FIELDS: &[&str] = &[
    "title",
    "author",
    "mail",
    "published",
    "keywords",
    "language",
    "thumbnail",
    "hidden",
];

/// Front-matter fields of an article.
///
/// YAML types unquoted scalars, so `title: 1984` arrives as a number. Text
/// fields accept any scalar and store it as a string.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleMeta {
    /// Article title.
    pub title: String,

    /// Author display name.
    pub author: Option<String>,

    /// Author contact address.
    pub mail: Option<String>,

    /// Publication date.
    pub published: NaiveDate,

    /// Keywords, as a block list, a flow list, or one string separated by
    /// commas or semicolons.
    ///
    /// List items are kept exactly as written; items of the string form are
    /// trimmed. In both forms a later keyword that differs from an earlier
    /// one only in case is dropped.
    pub keywords: BTreeSet<String>,

    /// Language code of the body, e.g. `en`.
    pub language: Option<String>,

    /// Image shown in listings, relative to the article file.
    pub thumbnail: Option<PathBuf>,

    /// Unpublished entries are hidden from listings. Accepts a bool,
    /// `yes`/`no`/`on`/`off`, or `1`/`0`.
    pub hidden: bool,

    /// Every other field, keys and values as parsed (tags included).
    pub extra: Mapping,
}

impl ArticleMeta {
    /// Minimal metadata with a title and date.
    pub fn new(title: impl Into<String>, published: NaiveDate) -> Self {
        Self {
            title: title.into(),
            author: None,
            mail: None,
            published,
            keywords: BTreeSet::new(),
            language: None,
            thumbnail: None,
            hidden: false,
            extra: Mapping::new(),
        }
    }

    /// Split a front-matter mapping into the typed fields and `extra`.
    ///
    /// Fails with [`Error::Format`] if `title` or `published` is missing or a
    /// typed field holds an unusable value. Other keys never fail.
    pub fn from_mapping(mapping: Mapping) -> Result<Self> {
        let mut known: BTreeMap<&'static str, Value> = BTreeMap::new();
        let mut extra = Mapping::new();
        for (key, value) in mapping {
            let field = key
                .as_str()
                .and_then(|k| KNOWN_FIELDS.iter().find(|f| **f == k));
            match field {
                Some(field) => {
                    known.insert(*field, value);
                }
                None => {
                    extra.insert(key, value);
                }
            }
        }

        let title = take(&mut known, "title", |v| scalar_string::deserialize(v))?
            .ok_or_else(|| missing("title"))?;
        let published = take(&mut known, "published", |v| published_date::deserialize(v))?
            .ok_or_else(|| missing("published"))?;

        Ok(Self {
            title,
            author: take(&mut known, "author", |v| scalar_string::deserialize(v))?,
            mail: take(&mut known, "mail", |v| scalar_string::deserialize(v))?,
            published,
            keywords: take(&mut known, "keywords", |v| keyword_set::deserialize(v))?
                .unwrap_or_default(),
            language: take(&mut known, "language", |v| scalar_string::deserialize(v))?,
            thumbnail: take(&mut known, "thumbnail", |v| scalar_string::deserialize(v))?
                .map(PathBuf::from),
            hidden: take(&mut known, "hidden", |v| flag::deserialize(v))?.unwrap_or(false),
            extra,
        })
    }

    /// The generic field mapping: typed fields first, then `extra` in order.
    pub fn to_mapping(&self) -> Mapping {
        let mut mapping = Mapping::new();
        put(&mut mapping, "title", Value::String(self.title.clone()));
        if let Some(author) = &self.author {
            put(&mut mapping, "author", Value::String(author.clone()));
        }
        if let Some(mail) = &self.mail {
            put(&mut mapping, "mail", Value::String(mail.clone()));
        }
        put(
            &mut mapping,
            "published",
            Value::String(published_date::format(&self.published)),
        );
        if !self.keywords.is_empty() {
            let keywords = self.keywords.iter().cloned().map(Value::String).collect();
            put(&mut mapping, "keywords", Value::Sequence(keywords));
        }
        if let Some(language) = &self.language {
            put(&mut mapping, "language", Value::String(language.clone()));
        }
        if let Some(thumbnail) = &self.thumbnail {
            let thumbnail = thumbnail.to_string_lossy().into_owned();
            put(&mut mapping, "thumbnail", Value::String(thumbnail));
        }
        if self.hidden {
            put(&mut mapping, "hidden", Value::Bool(true));
        }
        for (key, value) in &self.extra {
            if !mapping.contains_key(key) {
                mapping.insert(key.clone(), value.clone());
            }
        }
        mapping
    }
}

impl Serialize for ArticleMeta {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_mapping().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ArticleMeta {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mapping = Mapping::deserialize(deserializer)?;
        Self::from_mapping(mapping).map_err(de::Error::custom)
    }
}

fn put(mapping: &mut Mapping, key: &str, value: Value) {
    mapping.insert(Value::String(key.to_string()), value);
}

fn missing(field: &str) -> Error {
    Error::format(format!("invalid front matter: missing field `{field}`"))
}

/// Remove and parse one typed field; absent and `null` are both `None`.
fn take<T>(
    known: &mut BTreeMap<&'static str, Value>,
    field: &str,
    parse: impl FnOnce(Value) -> std::result::Result<T, yaml_serde::Error>,
) -> Result<Option<T>> {
    match known.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parse(value)
            .map(Some)
            .map_err(|e| Error::format(format!("invalid front matter: `{field}`: {e}"))),
    }
}

/// A parsed article.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    /// Front matter.
    pub meta: ArticleMeta,
    /// Markdown body, verbatim.
    pub body: String,
    /// File the article was read from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Article {
    /// Build an article from metadata and body.
    pub fn new(meta: ArticleMeta, body: impl Into<String>) -> Self {
        Self {
            meta,
            body: body.into(),
            path: None,
        }
    }

    /// Parse the full text of an article file.
    ///
    /// Fails with [`Error::Format`] if the front matter is missing, not
    /// terminated, not valid YAML, or lacks a required field.
    pub fn parse(text: &str) -> Result<Self> {
        let (mapping, body) = extract_frontmatter(text)?.into_parts();
        let mapping = mapping.ok_or_else(|| {
            Error::format(format!(
                "article does not start with a `{DELIMITER}` front-matter block"
            ))
        })?;

        Ok(Self {
            meta: ArticleMeta::from_mapping(mapping)?,
            body: body.to_string(),
            path: None,
        })
    }

    /// Parse text that was read from `path`, recording the path.
    pub fn parse_with_path(text: &str, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut article = Self::parse(text).map_err(|e| match e {
            Error::Format(msg) => Error::format(format!("{}: {msg}", path.display())),
            other => other,
        })?;
        article.path = Some(path.to_path_buf());
        Ok(article)
    }

    /// Read and parse an article file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = read_file(path).await?;
        Self::parse_with_path(&text, path)
    }

    /// Front matter as a generic field mapping, unknown fields included.
    pub fn metadata(&self) -> Mapping {
        self.meta.to_mapping()
    }

    /// Render the article back to file text.
    pub fn to_markdown(&self) -> Result<String> {
        serialize(&self.metadata(), &self.body)
    }

    /// Identifier used to address the article.
    ///
    /// Taken from an explicit `slug` field, else the file name (or the
    /// directory name for `index.md` layouts), else the title.
    pub fn slug(&self) -> String {
        if let Some(slug) = self.meta.extra.get("slug").and_then(Value::as_str) {
            return normalize_id(slug);
        }

        let from_path = self.path.as_deref().and_then(|path| {
            let stem = path.file_stem()?.to_str()?;
            if INDEX_STEMS.contains(&stem) {
                path.parent()?.file_name()?.to_str()
            } else {
                Some(stem)
            }
        });

        match from_path {
            Some(name) => normalize_id(name),
            None => normalize_id(&self.meta.title),
        }
    }

    /// Article title.
    pub fn title(&self) -> &str {
        &self.meta.title
    }

    /// Whether the article is excluded from listings.
    pub fn is_hidden(&self) -> bool {
        self.meta.hidden
    }

    /// Case-insensitive keyword match.
    pub fn has_keyword(&self, keyword: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        self.meta
            .keywords
            .iter()
            .any(|k| k.to_lowercase() == keyword)
    }

    /// Lazily walk the body's blocks.
    pub fn blocks(&self) -> Blocks<'_> {
        Blocks::new(&self.body)
    }

    /// First paragraph of the body, for listings.
    pub fn summary(&self) -> Option<String> {
        extract_first_paragraph(&self.body)
    }

    /// Hyperlinks in the body.
    pub fn links(&self) -> Vec<Link> {
        extract_links(&self.body)
    }

    /// Code snippets in the body.
    pub fn code_blocks(&self) -> Vec<CodeSnippet> {
        extract_code_blocks(&self.body)
    }

    /// Thumbnail resolved against the article's directory.
    pub fn thumbnail_path(&self) -> Option<PathBuf> {
        let thumbnail = self.meta.thumbnail.as_ref()?;
        match self.path.as_deref().and_then(Path::parent) {
            Some(dir) if thumbnail.is_relative() => Some(dir.join(thumbnail)),
            _ => Some(thumbnail.clone()),
        }
    }
}

/// Write a metadata mapping and body as article file text.
///
/// The output parses back to the same mapping and body.
pub fn serialize(metadata: &Mapping, body: &str) -> Result<String> {
    let yaml = if metadata.is_empty() {
        String::new()
    } else {
        yaml_serde::to_string(metadata)
            .map_err(|e| Error::serialization(format!("front matter: {e}")))?
    };
    let yaml = yaml.strip_prefix("---\n").unwrap_or(&yaml);

    let mut out = String::with_capacity(yaml.len() + body.len() + 10);
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(yaml);
    if !yaml.is_empty() && !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push_str("\n\n");
    out.push_str(body);
    Ok(out)
}

mod published_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer, de::Error as _};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn format(date: &NaiveDate) -> String {
        date.format(FORMAT).to_string()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(raw.trim()).ok_or_else(|| {
            D::Error::custom(format!("invalid date `{raw}`, expected YYYY-MM-DD"))
        })
    }

    /// Dates may carry a time part, which is dropped.
    pub(super) fn parse(raw: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(raw, FORMAT)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
            .or_else(|| {
                ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"]
                    .iter()
                    .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
                    .map(|dt| dt.date())
            })
    }
}

/// Any YAML scalar as a string (`1984`, `true`, `2.5`).
mod scalar_string {
    use std::fmt;

    use serde::Deserializer;
    use serde::de::{self, Visitor};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        deserializer.deserialize_any(ScalarVisitor)
    }

    struct ScalarVisitor;

    impl<'de> Visitor<'de> for ScalarVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a plain scalar")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }
}

mod keyword_set {
    use std::collections::{BTreeSet, HashSet};
    use std::fmt;

    use serde::Deserializer;
    use serde::de::{self, SeqAccess, Visitor};
    use yaml_serde::Value;

    use crate::markdown::helpers::parse_keyword_list;

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeSet<String>, D::Error> {
        deserializer.deserialize_any(KeywordVisitor)
    }

    struct KeywordVisitor;

    impl<'de> Visitor<'de> for KeywordVisitor {
        type Value = BTreeSet<String>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a list of keywords or a comma-separated string")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(parse_keyword_list(v).into_iter().collect())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            self.visit_str(&v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            self.visit_str(&v.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(BTreeSet::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(BTreeSet::new())
        }

        /// Items are kept verbatim; only empty ones are skipped.
        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut seen = HashSet::new();
            let mut keywords = BTreeSet::new();
            while let Some(item) = seq.next_element::<Value>()? {
                let keyword = match item {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Null => continue,
                    _ => return Err(de::Error::custom("keywords must be plain values")),
                };
                if !keyword.is_empty() && seen.insert(keyword.to_lowercase()) {
                    keywords.insert(keyword);
                }
            }
            Ok(keywords)
        }
    }
}

mod flag {
    use std::fmt;

    use serde::Deserializer;
    use serde::de::{self, Visitor};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        deserializer.deserialize_any(FlagVisitor)
    }

    struct FlagVisitor;

    impl<'de> Visitor<'de> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("true, false, 1 or 0")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(E::custom(format!("invalid flag `{other}`"))),
            }
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            match u64::try_from(v) {
                Ok(v) => self.visit_u64(v),
                Err(_) => Err(E::custom(format!("invalid flag `{v}`"))),
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            match v.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" => Ok(true),
                "false" | "no" | "off" | "" => Ok(false),
                other => Err(E::custom(format!("invalid flag `{other}`"))),
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }

        fn visit_none<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }
    }
}

//! Async file utilities for discovering and reading article files.

use async_walkdir::WalkDir;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::{Error, Result};

/// Options for discovering files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// File extension to match (without dot), e.g., "md"
    pub extension: Option<String>,
    /// Maximum path depth below the base directory (None = unlimited).
    /// A file directly inside the base has depth 1.
    pub max_depth: Option<usize>,
}

impl FindOptions {
    /// Create options for finding markdown files.
    pub fn markdown() -> Self {
        Self {
            extension: Some("md".to_string()),
            max_depth: None,
        }
    }

    /// Match a different extension (leading dot is ignored).
    pub fn with_extension(mut self, extension: impl AsRef<str>) -> Self {
        self.extension = Some(extension.as_ref().trim_start_matches('.').to_string());
        self
    }

    /// Set maximum search depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    fn matches_extension(&self, path: &Path) -> bool {
        match &self.extension {
            Some(ext) => path.extension().and_then(|e| e.to_str()) == Some(ext.as_str()),
            None => true,
        }
    }

    fn within_depth(&self, base_path: &Path, path: &Path) -> bool {
        match self.max_depth {
            Some(max_depth) => {
                let depth = path
                    .strip_prefix(base_path)
                    .map(|p| p.components().count())
                    .unwrap_or(0);
                depth <= max_depth
            }
            None => true,
        }
    }
}

/// Information about a discovered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Full path to the file.
    pub path: PathBuf,
    /// File stem (filename without extension).
    pub stem: String,
    /// Path relative to the search base.
    pub relative_path: PathBuf,
}

/// Find all files matching criteria in a directory.
///
/// Results are sorted by path so repeated runs see the same order.
///
/// # Example
///
/// ```no_run
/// # use folio_core::util::files::{find_all_files, FindOptions};
/// # use std::path::Path;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let files = find_all_files(
///     Path::new("posts"),
///     FindOptions::markdown().with_max_depth(2)
/// ).await?;
/// # Ok(())
/// # }
/// ```
pub async fn find_all_files(base_path: &Path, options: FindOptions) -> Result<Vec<FileInfo>> {
    let mut files = Vec::new();
    let mut walker = WalkDir::new(base_path);

    while let Some(entry_result) = walker.next().await {
        let entry = entry_result.map_err(|e| Error::io_msg(e.to_string()))?;
        let path = entry.path();

        if path.is_dir() {
            continue;
        }

        if !options.within_depth(base_path, &path) || !options.matches_extension(&path) {
            continue;
        }

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        let relative_path = path.strip_prefix(base_path).unwrap_or(&path).to_path_buf();

        files.push(FileInfo {
            path: path.to_path_buf(),
            stem,
            relative_path,
        });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    log::debug!("found {} file(s) under {}", files.len(), base_path.display());
    Ok(files)
}

/// Read a file's contents as a string.
pub async fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .map_err(|e| Error::io_with_path(e, path))
}

/// Check if a path exists.
pub async fn exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

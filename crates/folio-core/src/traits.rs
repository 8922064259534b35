//! Core traits for Folio.
//!
//! The primary trait is [`ConfigProvider`], which abstracts where an article
//! collection lives and how its files are discovered.

use std::path::PathBuf;

use crate::Result;
use crate::util::files::FindOptions;

/// Trait for application configuration.
///
/// Commands and loaders only need to know the project identity, where the
/// articles are, and how to recognise article files.
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use folio_core::traits::ConfigProvider;
/// use folio_core::Result;
///
/// #[derive(Clone)]
/// struct BlogConfig {
///     root: PathBuf,
/// }
///
/// impl ConfigProvider for BlogConfig {
///     fn project_name(&self) -> &str {
///         "blog"
///     }
///
///     fn base_path(&self) -> Result<PathBuf> {
///         Ok(self.root.clone())
///     }
///
///     fn content_path(&self, content_type: &str) -> Result<PathBuf> {
///         Ok(self.root.join(content_type))
///     }
/// }
///
/// let config = BlogConfig { root: PathBuf::from("/srv/blog") };
/// assert_eq!(config.content_path("posts").unwrap(), PathBuf::from("/srv/blog/posts"));
/// assert_eq!(config.find_options().extension.as_deref(), Some("md"));
/// ```
pub trait ConfigProvider: Send + Sync + Clone + 'static {
    /// Project name, used for display and environment variable prefixes.
    fn project_name(&self) -> &str;

    /// Base path that relative content paths are resolved against.
    fn base_path(&self) -> Result<PathBuf>;

    /// Directory holding content of the given type (e.g. "articles").
    fn content_path(&self, content_type: &str) -> Result<PathBuf>;

    /// How article files are discovered under the content path.
    fn find_options(&self) -> FindOptions {
        FindOptions::markdown()
    }
}

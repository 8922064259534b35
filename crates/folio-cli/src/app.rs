//! FolioCli application.
//!
//! Generic over a [`ConfigProvider`] so an embedding site generator can
//! supply its own configuration while reusing the article commands.

use crate::article_handlers::{self, ListOptions, ShowOptions};
use crate::cli::{BaseCommand, CliArgs};
use crate::config::FolioConfig;
use crate::config_handlers;
use folio_content::Corpus;
use folio_core::Result;
use folio_core::traits::ConfigProvider;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ============================================================================
// FolioCli
// ============================================================================

/// CLI application parameterized over a config provider.
pub struct FolioCli<C: ConfigProvider> {
    name: String,
    config: Arc<C>,
    version: String,
}

impl FolioCli<FolioConfig> {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(name: impl Into<String>, args: &CliArgs) -> Result<Self> {
        let config = FolioConfig::load(args.config.as_deref())?;
        Ok(Self::new(name, config))
    }
}

impl<C: ConfigProvider> FolioCli<C> {
    /// Create a new CLI application.
    pub fn new(name: impl Into<String>, config: C) -> Self {
        Self {
            name: name.into(),
            config: Arc::new(config),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Override the version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Get a reference to the config provider.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` if set, otherwise defaults based on verbosity flags.
    /// Library crates log through `log`; the subscriber picks those records
    /// up through its `tracing-log` bridge.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // Ignore error if a subscriber is already set (e.g. in tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Run the CLI with the given arguments.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);
        let dir = args.dir.as_deref();

        match args.command {
            Some(BaseCommand::List {
                keyword,
                all,
                limit,
                json,
            }) => {
                let corpus = self.corpus(dir).await?;
                let options = ListOptions {
                    keyword,
                    include_hidden: all,
                    limit,
                    json,
                };
                article_handlers::handle_list(&corpus, options)
            }
            Some(BaseCommand::Show { slug, json, blocks }) => {
                let corpus = self.corpus(dir).await?;
                article_handlers::handle_show(&corpus, ShowOptions { slug, json, blocks })
            }
            Some(BaseCommand::Keywords { all, json }) => {
                let corpus = self.corpus(dir).await?;
                article_handlers::handle_keywords(&corpus, all, json)
            }
            Some(BaseCommand::Check) => {
                let corpus = self.corpus(dir).await?;
                article_handlers::handle_check(&corpus)
            }
            Some(BaseCommand::Links { slug }) => {
                let corpus = self.corpus(dir).await?;
                article_handlers::handle_links(&corpus, &slug)
            }
            Some(BaseCommand::Version) => {
                println!("{} {}", self.name, self.version);
                Ok(())
            }
            Some(BaseCommand::Config(config_cmd)) => {
                config_handlers::handle_config_command(args.config.as_deref(), config_cmd.command)
            }
            None => {
                println!("{} {} - use --help for usage", self.name, self.version);
                Ok(())
            }
        }
    }

    async fn corpus(&self, dir: Option<&str>) -> Result<Corpus> {
        let corpus = article_handlers::load_corpus(&*self.config, dir).await?;
        tracing::debug!(
            project = self.config.project_name(),
            articles = corpus.len(),
            failures = corpus.failures().len(),
            "corpus loaded"
        );
        Ok(corpus)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[derive(Clone)]
    struct TestConfig {
        base: PathBuf,
    }

    impl ConfigProvider for TestConfig {
        fn project_name(&self) -> &str {
            "test-app"
        }

        fn base_path(&self) -> Result<PathBuf> {
            Ok(self.base.clone())
        }

        fn content_path(&self, content_type: &str) -> Result<PathBuf> {
            Ok(self.base.join(content_type))
        }
    }

    fn test_config() -> TestConfig {
        TestConfig {
            base: PathBuf::from("/tmp/folio-test"),
        }
    }

    /// A base directory with an `articles/` folder holding one good and,
    /// optionally, one malformed article.
    fn site(with_broken: bool) -> (TempDir, TestConfig) {
        let temp = TempDir::new().unwrap();
        let articles = temp.path().join("articles");
        std::fs::create_dir_all(&articles).unwrap();
        std::fs::write(
            articles.join("hello.md"),
            "---\ntitle: Hello\npublished: 2024-03-01\nkeywords: [intro]\n---\n\nSee [docs](https://example.com).\n",
        )
        .unwrap();
        if with_broken {
            std::fs::write(articles.join("broken.md"), "no front matter here\n").unwrap();
        }
        let config = TestConfig {
            base: temp.path().to_path_buf(),
        };
        (temp, config)
    }

    #[test]
    fn test_folio_cli_new() {
        let cli = FolioCli::new("my-app", test_config());
        assert_eq!(cli.name, "my-app");
        assert_eq!(cli.config().project_name(), "test-app");
    }

    #[test]
    fn test_folio_cli_with_version() {
        let cli = FolioCli::new("my-app", test_config()).with_version("1.2.3");
        assert_eq!(cli.version, "1.2.3");
    }

    #[tokio::test]
    async fn test_run_version_command() {
        let cli = FolioCli::new("test-app", test_config()).with_version("0.1.0");
        let args = CliArgs::parse_from(["test", "version"]);
        assert!(cli.run(args).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_no_command() {
        let cli = FolioCli::new("test-app", test_config());
        let args = CliArgs::parse_from(["test"]);
        assert!(cli.run(args).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_article_commands() {
        let (_temp, config) = site(false);
        let cli = FolioCli::new("test-app", config);

        for argv in [
            vec!["test", "list"],
            vec!["test", "list", "--keyword", "INTRO", "--json"],
            vec!["test", "show", "hello", "--blocks"],
            vec!["test", "keywords", "--json"],
            vec!["test", "links", "hello"],
            vec!["test", "check"],
        ] {
            let args = CliArgs::parse_from(argv.clone());
            assert!(cli.run(args).await.is_ok(), "failed: {argv:?}");
        }
    }

    #[tokio::test]
    async fn test_run_show_unknown_slug() {
        let (_temp, config) = site(false);
        let cli = FolioCli::new("test-app", config);
        let args = CliArgs::parse_from(["test", "show", "missing"]);
        assert!(cli.run(args).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_run_check_fails_on_malformed() {
        let (_temp, config) = site(true);
        let cli = FolioCli::new("test-app", config);
        let args = CliArgs::parse_from(["test", "check"]);
        assert!(cli.run(args).await.unwrap_err().is_format());
    }

    #[tokio::test]
    async fn test_run_dir_override() {
        let (temp, _) = site(false);
        let cli = FolioCli::new("test-app", test_config());
        let dir = temp.path().join("articles");
        let args = CliArgs::parse_from(["test", "--dir", dir.to_str().unwrap(), "list"]);
        assert!(cli.run(args).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_missing_article_dir() {
        let cli = FolioCli::new("test-app", test_config());
        let args = CliArgs::parse_from(["test", "--dir", "/nonexistent/folio/articles", "list"]);
        assert!(cli.run(args).await.unwrap_err().is_not_found());
    }

    #[test]
    fn test_init_logging_variants() {
        let cli = FolioCli::new("test", test_config());
        cli.init_logging(false, false);
        cli.init_logging(true, false);
        cli.init_logging(false, true);
    }

    #[test]
    fn test_folio_cli_from_args_with_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
                project_name = "from-file"
                [content]
                extension = "markdown"
            "#,
        )
        .unwrap();

        let args = CliArgs::parse_from(["test", "--config", path.to_str().unwrap()]);
        let cli = FolioCli::from_args("test-app", &args).unwrap();
        assert_eq!(cli.config().project_name(), "from-file");
        assert_eq!(cli.config().content.extension, "markdown");
    }

    #[tokio::test]
    async fn test_config_command_dispatch() {
        let cli = FolioCli::new("test-app", test_config());
        let args = CliArgs::parse_from(["test", "config", "path"]);
        assert!(cli.run(args).await.is_ok());
    }
}

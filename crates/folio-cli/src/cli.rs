//! CLI argument parsing and command definitions.

use clap::{Parser, Subcommand};

// ============================================================================
// CLI argument types
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "folio", author, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "FOLIO_CONFIG")]
    pub config: Option<String>,

    /// Article directory (overrides the configured content path).
    #[arg(short, long)]
    pub dir: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<BaseCommand>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum BaseCommand {
    /// List articles, newest first.
    List {
        /// Only articles tagged with this keyword (case-insensitive).
        #[arg(short, long)]
        keyword: Option<String>,

        /// Include hidden articles.
        #[arg(short, long)]
        all: bool,

        /// Show at most this many articles.
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show one article's metadata.
    Show {
        /// Article slug.
        slug: String,

        /// Output JSON (metadata and body).
        #[arg(long)]
        json: bool,

        /// List the body's blocks.
        #[arg(short, long)]
        blocks: bool,
    },

    /// Count articles per keyword.
    Keywords {
        /// Include hidden articles.
        #[arg(short, long)]
        all: bool,

        /// Output JSON.
        #[arg(long)]
        json: bool,
    },

    /// Parse every article and report malformed ones.
    Check,

    /// List the hyperlinks in one article.
    Links {
        /// Article slug.
        slug: String,
    },

    /// Print version information.
    Version,

    /// Configuration operations.
    Config(ConfigCommand),
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Get a configuration value by dotted key.
    Get {
        /// Dotted key (e.g., "content.path").
        key: String,
    },

    /// Set a configuration value by dotted key.
    Set {
        /// Dotted key (e.g., "content.path").
        key: String,

        /// Value to set.
        value: String,
    },

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },

    /// Export configuration as environment variables.
    Export {
        /// Format as Docker --env flags.
        #[arg(long)]
        docker_env: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================

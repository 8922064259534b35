//! CLI for Folio article collections.
//!
//! # Key Abstractions
//!
//! - `FolioCli<C>`: CLI application parameterized over a config provider
//! - `FolioConfig`: file + environment configuration
//! - Handlers for article and config subcommands

#![doc = include_str!("../README.md")]

pub mod app;
pub mod article_handlers;
pub mod cli;
pub mod config;
pub mod config_handlers;

pub use app::FolioCli;
pub use cli::{BaseCommand, CliArgs};
pub use config::FolioConfig;

//! CLI module - Command-line interface for Photorelay
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Photorelay - caching Unsplash proxy
/// Serves a user's photos enriched with view and download statistics
#[derive(Parser)]
#[command(name = "photorelay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    #[command(alias = "daemon")]
    Serve,

    /// Run the pipeline once and print the JSON result
    Fetch {
        /// Page to fetch
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Fetch collections instead of photos
        #[arg(long)]
        collections: bool,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Validate and print the effective configuration
    CheckConfig,
}

pub use commands::*;

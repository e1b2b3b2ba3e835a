//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// grab - cached, integrity-verified downloads
#[derive(Parser)]
#[command(name = "grab")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cached, integrity-verified downloads with lazy archive extraction")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the cache directory
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Download a file into the cache unless a verified copy is already there
    Fetch {
        /// Name of the file inside the cache directory
        filename: String,

        /// http(s) URL to download from
        url: String,

        /// Expected SHA-256 digest (hex, any case)
        sha256: String,
    },

    /// Extract a zip archive next to itself unless the path already exists
    #[command(alias = "x")]
    Extract {
        /// Path to the zip archive
        archive: PathBuf,

        /// Path relative to the archive directory that must be present
        path: String,
    },

    /// Fetch an archive, then extract it and print the selected path
    Get {
        /// Name of the archive inside the cache directory
        filename: String,

        /// http(s) URL to download from
        url: String,

        /// Expected SHA-256 digest (hex, any case)
        sha256: String,

        /// Path relative to the cache directory that must be present
        path: String,
    },

    /// Print the SHA-256 digest of a file
    Hash {
        /// File to hash
        file: PathBuf,
    },
}

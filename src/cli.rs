//! Command-line interface definitions for newsstand.
//!
//! Flags override whatever the YAML config file sets. Most options can also
//! come from environment variables.

use crate::sources::SourceId;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Crawl every source into ./articles
/// newsstand -o ./articles
///
/// # Only two sources, at most 50 pages each, without writing anything
/// newsstand -s eldiario -s 20minutos --max-pages 50 --dry-run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, env = "NEWSSTAND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output directory for the JSON-lines article files
    #[arg(short, long, env = "NEWSSTAND_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Sources to crawl (repeatable); all enabled sources when omitted
    #[arg(short, long = "source", value_enum)]
    pub sources: Vec<SourceId>,

    /// Stop each source after this many fetched pages
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Log assembled records instead of storing them
    #[arg(long)]
    pub dry_run: bool,
}

/// Output directory used when neither the CLI nor the config names one.
pub const DEFAULT_OUTPUT_DIR: &str = "./articles";

//! Storage sinks for assembled article records.
//!
//! The pipeline only knows the [`StorageSink`] trait. Two sinks ship:
//! - [`JsonLinesSink`]: appends one JSON object per line under a date directory
//! - [`LogSink`]: logs each record and stores nothing (`--dry-run`)
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! └── 2025-05-06/
//!     └── articles.jsonl
//! ```
//!
//! Inserts are append-only. Crawling the same article on two different runs
//! stores it twice; within one run the crawl worker never fetches a URL twice.

use crate::models::{ArticleRecord, Author};
use crate::utils::truncate_for_log;
use chrono::Local;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// Errors a sink can report for a single insert.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Destination for assembled records.
///
/// Must tolerate concurrent, unordered inserts from independent source
/// workers.
pub trait StorageSink {
    async fn insert(&self, record: &ArticleRecord) -> Result<(), StorageError>;
}

/// Appends records as JSON lines to `<dir>/<YYYY-MM-DD>/articles.jsonl`.
#[derive(Debug)]
pub struct JsonLinesSink {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// File the next insert goes to.
    pub fn current_file(&self) -> PathBuf {
        dated_file(&self.dir, &Local::now().date_naive().to_string())
    }
}

fn dated_file(dir: &Path, date: &str) -> PathBuf {
    dir.join(date).join("articles.jsonl")
}

impl StorageSink for JsonLinesSink {
    #[instrument(level = "debug", skip_all, fields(url = %record.url))]
    async fn insert(&self, record: &ArticleRecord) -> Result<(), StorageError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let path = self.current_file();
        // One writer at a time keeps lines from interleaving.
        let _guard = self.write_lock.lock().await;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&path).await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        debug!(path = %path.display(), "Appended record");
        Ok(())
    }
}

/// Sink that only logs what it would have stored.
#[derive(Debug, Default)]
pub struct LogSink;

impl StorageSink for LogSink {
    async fn insert(&self, record: &ArticleRecord) -> Result<(), StorageError> {
        info!(
            url = %record.url,
            title = %truncate_for_log(record.title.as_deref().unwrap_or_default(), 120),
            body = %truncate_for_log(&record.body, 200),
            newspaper = %record.newspaper,
            date = ?record.date,
            authors = ?record.author.as_ref().map(Author::names),
            tags = record.tags.len(),
            "Dry run: record not stored"
        );
        Ok(())
    }
}

/// In-memory sink used by tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: std::sync::Mutex<Vec<ArticleRecord>>,
    pub fail: bool,
}

#[cfg(test)]
impl MemorySink {
    pub fn failing() -> Self {
        Self {
            records: Default::default(),
            fail: true,
        }
    }

    pub fn take(&self) -> Vec<ArticleRecord> {
        std::mem::take(&mut *self.records.lock().unwrap())
    }
}

#[cfg(test)]
impl StorageSink for MemorySink {
    async fn insert(&self, record: &ArticleRecord) -> Result<(), StorageError> {
        if self.fail {
            return Err(StorageError::Io(std::io::Error::other("sink offline")));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

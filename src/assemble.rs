//! Turning raw extractions into canonical article records.
//!
//! Assembly never fails: an unparseable date becomes `null`, missing nodes
//! become empty values, and the record always carries every schema key. The
//! only error that can come out of this module is the storage sink refusing
//! the finished record.

use crate::context::RunContext;
use crate::dates;
use crate::models::{ArticleRecord, RawExtraction};
use crate::normalize::{collapse_authors, dedup_tags, join_paragraphs};
use crate::profile::SourceProfile;
use crate::storage::{StorageError, StorageSink};
use tracing::{debug, error, instrument, warn};

/// Build the canonical record for one article page.
///
/// # Arguments
///
/// * `raw` - Field values as the source's adapter found them
/// * `profile` - Supplies the date format family
/// * `ctx` - Tags the warnings logged for missing or malformed fields
///
/// # Returns
///
/// A record with every field present. Missing values become `None` or empty
/// text; this never fails.
pub fn assemble(raw: RawExtraction, profile: &SourceProfile, ctx: &RunContext) -> ArticleRecord {
    let date = dates::parse(raw.date.as_deref(), profile.date_format, ctx);
    let author = collapse_authors(raw.authors);
    let body = join_paragraphs(&raw.paragraphs);

    if raw.title.is_none() {
        warn!(source = %ctx.source, run = %ctx.run_id, url = %raw.url, "Article has no title");
    }
    if body.is_empty() {
        warn!(source = %ctx.source, run = %ctx.run_id, url = %raw.url, "Article has no body text");
    }

    ArticleRecord {
        title: raw.title,
        subtitle: raw.subtitle,
        category: raw.category,
        tags: dedup_tags(raw.tags, &[]),
        date,
        author,
        references: raw.references,
        newspaper: raw.newspaper,
        country: raw.country,
        summary: raw.summary,
        body,
        url: raw.url.to_string(),
    }
}

/// Assemble a record and hand it to `sink` exactly once.
///
/// A sink failure is logged and returned; it is not retried.
#[instrument(level = "debug", skip_all, fields(source = %ctx.source, url = %raw.url))]
pub async fn assemble_and_store<S: StorageSink>(
    raw: RawExtraction,
    profile: &SourceProfile,
    ctx: &RunContext,
    sink: &S,
) -> Result<ArticleRecord, StorageError> {
    let record = assemble(raw, profile, ctx);
    match sink.insert(&record).await {
        Ok(()) => {
            debug!("Stored article");
            Ok(record)
        }
        Err(e) => {
            error!(run = %ctx.run_id, error = %e, "Storage sink rejected article");
            Err(e)
        }
    }
}

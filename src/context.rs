//! Per-source reporting context.
//!
//! A [`RunContext`] is handed explicitly to the date parser and the assembler
//! so that every warning they emit names the source and crawl run it belongs
//! to, instead of relying on a process-wide logger configuration.

use chrono::Utc;
use rand::{Rng, rng};

/// Identifies one crawl run of one source in log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Source identifier, e.g. `"eldiario"`.
    pub source: String,
    /// Run identifier shared by every record of this crawl.
    pub run_id: String,
}

impl RunContext {
    /// Start a new run for `source`.
    ///
    /// The run id is the UTC start time plus a short random suffix, so two
    /// sources started in the same second still get distinct ids.
    pub fn new(source: &str) -> Self {
        let suffix: u16 = rng().random();
        Self {
            source: source.to_string(),
            run_id: format!("{}-{:04x}", Utc::now().format("%Y%m%dT%H%M%S"), suffix),
        }
    }

    /// Context with a fixed run id.
    #[cfg(test)]
    pub fn with_run_id(source: &str, run_id: &str) -> Self {
        Self {
            source: source.to_string(),
            run_id: run_id.to_string(),
        }
    }
}

//! Locale-aware parsing of article publication dates.
//!
//! Every source prints its dates differently, so each source profile names
//! one [`DateFormat`] family and the raw text is parsed against exactly that
//! family. Parsing never fails the pipeline: absent or malformed text yields
//! `None` and a warning tagged with the caller's [`RunContext`].
//!
//! | Family | Example |
//! |--------|---------|
//! | [`DateFormat::SpanishLongForm`] | `20 de enero de 2021` |
//! | [`DateFormat::SlashYmd`] | `2021/01/20` |
//! | [`DateFormat::DottedDmyTrailing`] | `20.01.2021 - 10:32h` |
//! | [`DateFormat::SlashDmyTime`] | `20/01/2021 10:32` |

use crate::context::RunContext;
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::warn;

static SPANISH_MONTHS: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    [
        "enero",
        "febrero",
        "marzo",
        "abril",
        "mayo",
        "junio",
        "julio",
        "agosto",
        "septiembre",
        "octubre",
        "noviembre",
        "diciembre",
    ]
    .into_iter()
    .zip(1..)
    .collect()
});

/// Date text layouts understood by [`parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `D de MONTH de Y` with a Spanish month name.
    SpanishLongForm,
    /// `Y/M/D`.
    SlashYmd,
    /// `D.M.Y`, optionally followed by ` - <anything>`.
    DottedDmyTrailing,
    /// `D/M/Y`, optionally followed by a space and a time of day.
    SlashDmyTime,
}

/// Map a Spanish month name to its number, ignoring case.
pub fn month_number(name: &str) -> Option<u32> {
    SPANISH_MONTHS.get(name.trim().to_lowercase().as_str()).copied()
}

/// Parse raw date text using the given format family.
///
/// Returns midnight of the parsed calendar day, or `None` (with a logged
/// warning) when the text is missing or does not fit the family.
pub fn parse(raw: Option<&str>, format: DateFormat, ctx: &RunContext) -> Option<NaiveDateTime> {
    let Some(text) = raw else {
        warn!(source = %ctx.source, run = %ctx.run_id, ?format, "Date text missing; storing null date");
        return None;
    };

    let parsed = match format {
        DateFormat::SpanishLongForm => parse_spanish_long(text),
        DateFormat::SlashYmd => NaiveDate::parse_from_str(text.trim(), "%Y/%m/%d").ok(),
        DateFormat::DottedDmyTrailing => {
            let head = text.split('-').next().unwrap_or_default().trim();
            NaiveDate::parse_from_str(head, "%d.%m.%Y").ok()
        }
        DateFormat::SlashDmyTime => {
            let head = text.trim().split(' ').next().unwrap_or_default();
            NaiveDate::parse_from_str(head, "%d/%m/%Y").ok()
        }
    };

    match parsed {
        Some(date) => date.and_hms_opt(0, 0, 0),
        None => {
            warn!(source = %ctx.source, run = %ctx.run_id, ?format, raw = %text, "Unrecognized date text; storing null date");
            None
        }
    }
}

/// `D de MONTH de Y`, any Unicode whitespace between the tokens.
fn parse_spanish_long(text: &str) -> Option<NaiveDate> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let [day, de1, month, de2, year] = tokens.as_slice() else {
        return None;
    };
    if !de1.eq_ignore_ascii_case("de") || !de2.eq_ignore_ascii_case("de") {
        return None;
    }
    let month = month_number(month)?;
    NaiveDate::parse_from_str(&format!("{day}.{month}.{year}"), "%d.%m.%Y").ok()
}

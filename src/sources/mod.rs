//! News sources and their extraction adapters.
//!
//! Each source is described by data (a [`SourceProfile`] built from a const
//! rule table) plus one [`ExtractionAdapter`] that knows the source's page
//! layout. Both are looked up by [`SourceId`].
//!
//! # Supported Sources
//!
//! | Source | Module | Date format | Category |
//! |--------|--------|-------------|----------|
//! | El Diario | [`eldiario`] | `20 de enero de 2021` | first path segment |
//! | Heraldo de Aragón | [`heraldo`] | `2021/01/20`, read from the URL | second path segment |
//! | OK Diario | [`okdiario`] | `20/01/2021 10:32` | first path segment |
//! | 20minutos | [`veinteminutos`] | `20.01.2021 - 10:32h` | section heading |
//!
//! Adapters never fail: a selector that finds nothing leaves the field empty.

use crate::models::RawExtraction;
use crate::profile::{ProfileError, SourceProfile};
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use std::str::FromStr;
use url::Url;

pub mod eldiario;
pub mod heraldo;
pub mod okdiario;
pub mod veinteminutos;

/// Country code shared by every shipped source.
pub const COUNTRY_ES: &str = "ES";

/// Identifier of a supported source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum SourceId {
    #[value(name = "eldiario")]
    ElDiario,
    #[value(name = "heraldo")]
    Heraldo,
    #[value(name = "okdiario")]
    OkDiario,
    #[value(name = "20minutos")]
    VeinteMinutos,
}

impl SourceId {
    pub const ALL: [SourceId; 4] = [
        SourceId::ElDiario,
        SourceId::Heraldo,
        SourceId::OkDiario,
        SourceId::VeinteMinutos,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::ElDiario => "eldiario",
            SourceId::Heraldo => "heraldo",
            SourceId::OkDiario => "okdiario",
            SourceId::VeinteMinutos => "20minutos",
        }
    }

    /// Default crawl profile for this source.
    pub fn profile(&self) -> Result<SourceProfile, ProfileError> {
        match self {
            SourceId::ElDiario => eldiario::profile(),
            SourceId::Heraldo => heraldo::profile(),
            SourceId::OkDiario => okdiario::profile(),
            SourceId::VeinteMinutos => veinteminutos::profile(),
        }
    }

    /// Extraction adapter for this source's article pages.
    pub fn adapter(&self) -> Result<Box<dyn ExtractionAdapter>, ProfileError> {
        Ok(match self {
            SourceId::ElDiario => Box::new(eldiario::ElDiario::new()?),
            SourceId::Heraldo => Box::new(heraldo::Heraldo::new()?),
            SourceId::OkDiario => Box::new(okdiario::OkDiario::new()?),
            SourceId::VeinteMinutos => Box::new(veinteminutos::VeinteMinutos::new()?),
        })
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown source `{s}`"))
    }
}

/// A fetched page ready for extraction.
pub struct FetchedPage {
    /// Final URL of the page, after redirects.
    pub url: Url,
    pub document: Html,
}

impl FetchedPage {
    pub fn parse(url: Url, html: &str) -> Self {
        Self {
            url,
            document: Html::parse_document(html),
        }
    }
}

/// Turns a fetched article page into raw field values.
///
/// Implementations hold their compiled selectors and must treat every
/// missing node as an empty value rather than an error.
pub trait ExtractionAdapter: Send + Sync {
    fn extract(&self, page: &FetchedPage) -> RawExtraction;
}

/// Compile a field selector.
pub(crate) fn selector(css: &str) -> Result<Selector, ProfileError> {
    Selector::parse(css).map_err(|e| ProfileError::Field {
        css: css.to_string(),
        message: e.to_string(),
    })
}

/// Full text of an element with whitespace runs collapsed.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of the first node matching `sel`, or `None` when absent or blank.
pub(crate) fn first_text(document: &Html, sel: &Selector) -> Option<String> {
    document
        .select(sel)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}

/// Texts of every node matching `sel`, in document order.
pub(crate) fn all_texts(document: &Html, sel: &Selector) -> Vec<String> {
    document.select(sel).map(element_text).collect()
}

//! Data models for scraped pages and the normalized article record.
//!
//! This module defines the core data structures that flow through the pipeline:
//! - [`RawExtraction`]: Field values read straight off one article page
//! - [`ArticleRecord`]: The canonical, schema-complete record handed to storage
//! - [`Author`]: A single byline or an ordered list of them
//!
//! Every [`ArticleRecord`] serializes with the full key set, even when a value
//! is missing, so downstream consumers can rely on a stable schema.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use url::Url;

/// Unnormalized field values read from a single fetched article page.
///
/// Produced by a source's extraction adapter and consumed immediately by the
/// assembler. Selector misses show up as `None` or empty vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct RawExtraction {
    /// The fully-resolved page URL.
    pub url: Url,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    /// Category token, either a path segment or a section heading.
    pub category: Option<String>,
    /// Body paragraphs in document order.
    pub paragraphs: Vec<String>,
    /// Tag texts as found on the page, duplicates and separators included.
    pub tags: Vec<String>,
    /// Date text exactly as the page shows it.
    pub date: Option<String>,
    /// Bylines in discovery order.
    pub authors: Vec<String>,
    pub references: String,
    pub summary: String,
    pub newspaper: String,
    pub country: String,
}

impl RawExtraction {
    /// Create an empty extraction for `url` carrying the source constants.
    pub fn new(url: Url, newspaper: &str, country: &str) -> Self {
        Self {
            url,
            title: None,
            subtitle: None,
            category: None,
            paragraphs: Vec::new(),
            tags: Vec::new(),
            date: None,
            authors: Vec::new(),
            references: String::new(),
            summary: String::new(),
            newspaper: newspaper.to_string(),
            country: country.to_string(),
        }
    }
}

/// Article author: one byline, or several in the order they appeared.
///
/// Serialized untagged so a single author is stored as a plain string and
/// multiple authors as an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Author {
    One(String),
    Many(Vec<String>),
}

impl Author {
    /// All bylines in order.
    pub fn names(&self) -> Vec<&str> {
        match self {
            Author::One(s) => vec![s.as_str()],
            Author::Many(v) => v.iter().map(|s| s.as_str()).collect(),
        }
    }
}

/// The canonical, persisted article record.
///
/// Field names and shapes are the interchange contract with downstream
/// consumers: `tags` is ordered and duplicate-free, `date` is an ISO-8601
/// timestamp or `null`, `author` is a string, a list of strings, or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub date: Option<NaiveDateTime>,
    pub author: Option<Author>,
    pub references: String,
    pub newspaper: String,
    pub country: String,
    pub summary: String,
    pub body: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record() -> ArticleRecord {
        ArticleRecord {
            title: Some("Titular".to_string()),
            subtitle: None,
            category: Some("politica".to_string()),
            tags: vec!["Política".to_string()],
            date: NaiveDate::from_ymd_opt(2022, 3, 15).and_then(|d| d.and_hms_opt(0, 0, 0)),
            author: Some(Author::One("Ana Pérez".to_string())),
            references: String::new(),
            newspaper: "El Diario".to_string(),
            country: "ES".to_string(),
            summary: String::new(),
            body: "A. B. C.".to_string(),
            url: "https://www.eldiario.es/politica/titular".to_string(),
        }
    }

    #[test]
    fn test_raw_extraction_new_is_empty() {
        let url = Url::parse("https://okdiario.com/espana/x").unwrap();
        let raw = RawExtraction::new(url.clone(), "Ok Diario", "ES");
        assert_eq!(raw.url, url);
        assert!(raw.title.is_none());
        assert!(raw.paragraphs.is_empty());
        assert_eq!(raw.newspaper, "Ok Diario");
        assert_eq!(raw.references, "");
    }

    #[test]
    fn test_record_serializes_every_key() {
        let mut r = record();
        r.title = None;
        r.date = None;
        r.author = None;
        let value = serde_json::to_value(&r).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "title", "subtitle", "category", "tags", "date", "author", "references",
            "newspaper", "country", "summary", "body", "url",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        assert_eq!(obj.len(), 12);
        assert!(obj["date"].is_null());
        assert!(obj["author"].is_null());
    }

    #[test]
    fn test_date_serializes_as_iso8601() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["date"], "2022-03-15T00:00:00");
    }

    #[test]
    fn test_author_shapes() {
        let one = serde_json::to_value(Author::One("Ana".to_string())).unwrap();
        assert_eq!(one, serde_json::json!("Ana"));

        let many = Author::Many(vec!["Ana".to_string(), "Luis".to_string()]);
        let json = serde_json::to_value(&many).unwrap();
        assert_eq!(json, serde_json::json!(["Ana", "Luis"]));

        let back: Author = serde_json::from_value(json).unwrap();
        assert_eq!(back.names(), vec!["Ana", "Luis"]);
    }
}

//! Normalization helpers shared by every source.
//!
//! These are small pure functions that turn raw page values into the shapes
//! the canonical record expects: duplicate-free tag lists, collapsed author
//! lists, path-derived categories and single-spaced bodies.

use crate::models::Author;
use itertools::Itertools;
use url::Url;

/// Trim tags, drop empties and sentinel tokens, and remove repeats while
/// keeping the first-seen order.
///
/// Applying this to its own output returns the same list.
///
/// # Examples
///
/// ```ignore
/// let tags = vec!["Política".into(), "Política".into(), "\u{a0}\u{a0}/\u{a0}\u{a0}".into()];
/// assert_eq!(dedup_tags(tags, &["/"]), vec!["Política"]);
/// ```
pub fn dedup_tags<I>(tags: I, sentinels: &[&str]) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && !sentinels.contains(&t.as_str()))
        .unique()
        .collect()
}

/// Collapse bylines into the record's author shape.
///
/// No names gives `None`, exactly one gives a scalar, two or more keep their
/// discovery order as a list.
pub fn collapse_authors<I>(authors: I) -> Option<Author>
where
    I: IntoIterator<Item = String>,
{
    let mut names: Vec<String> = authors
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();
    match names.len() {
        0 => None,
        1 => names.pop().map(Author::One),
        _ => Some(Author::Many(names)),
    }
}

/// Category token at a fixed path-segment index of `url`.
///
/// Index 0 is the first segment after the host, so for
/// `https://www.heraldo.es/noticias/aragon/2021/01/20/x.html` index 1 is
/// `"aragon"`.
pub fn category_from_path(url: &Url, index: usize) -> Option<String> {
    url.path_segments()?
        .nth(index)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Join paragraphs with single spaces in document order, skipping blanks.
pub fn join_paragraphs<I, S>(paragraphs: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    paragraphs
        .into_iter()
        .filter_map(|p| {
            let p = p.as_ref().trim();
            (!p.is_empty()).then(|| p.to_string())
        })
        .join(" ")
}

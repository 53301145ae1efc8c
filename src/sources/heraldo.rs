//! Heraldo de Aragón (heraldo.es) crawl rules and article adapter.
//!
//! Article pages carry no machine-readable date node, but every article URL
//! embeds its publication day as `YYYY/M/D`, so the date is read from there.
//! Articles may list several authors.

use super::{COUNTRY_ES, ExtractionAdapter, FetchedPage, SourceId, all_texts, first_text, selector};
use crate::dates::DateFormat;
use crate::models::RawExtraction;
use crate::normalize::{category_from_path, dedup_tags};
use crate::profile::{Classification, ProfileError, RuleSpec, SourceProfile};
use regex::Regex;
use scraper::Selector;

pub const NEWSPAPER: &str = "Heraldo Aragon";

const DENY: &[&str] = &["/opinion", "/fotos", "/videos", "/horoscopo", "/multimedia"];

const RULES: &[RuleSpec] = &[
    RuleSpec {
        name: "heraldo-sections",
        scope: Some("ul.default-hamburger1-menu li"),
        allow: None,
        deny: DENY,
        deny_domains: &["guia.heraldo.es"],
        outcome: Classification::Navigate,
    },
    RuleSpec {
        name: "heraldo-articles",
        scope: Some("div.article-details > h1.title > a"),
        allow: None,
        deny: DENY,
        deny_domains: &[],
        outcome: Classification::Extract,
    },
];

const DATE_IN_URL: &str = r"\d{4}/\d+/\d+";

pub fn profile() -> Result<SourceProfile, ProfileError> {
    SourceProfile::build(
        SourceId::Heraldo,
        NEWSPAPER,
        &["https://www.heraldo.es/"],
        &["heraldo.es"],
        RULES,
        DateFormat::SlashYmd,
    )
}

pub struct Heraldo {
    title: Selector,
    subtitle: Selector,
    body: Selector,
    tags: Selector,
    authors: Selector,
    date_in_url: Regex,
}

impl Heraldo {
    pub fn new() -> Result<Self, ProfileError> {
        Ok(Self {
            title: selector("h1.title")?,
            subtitle: selector("p.epigraph")?,
            body: selector(r#"div[class*="content-modules"] > p"#)?,
            tags: selector("ul.tags-container > li")?,
            authors: selector("ul.list-authors > li")?,
            date_in_url: Regex::new(DATE_IN_URL).map_err(|source| ProfileError::Pattern {
                rule: "heraldo-date".to_string(),
                source,
            })?,
        })
    }
}

impl ExtractionAdapter for Heraldo {
    fn extract(&self, page: &FetchedPage) -> RawExtraction {
        let doc = &page.document;
        let mut raw = RawExtraction::new(page.url.clone(), NEWSPAPER, COUNTRY_ES);

        raw.title = first_text(doc, &self.title);
        raw.subtitle = first_text(doc, &self.subtitle);
        raw.category = category_from_path(&page.url, 1);
        raw.paragraphs = all_texts(doc, &self.body);
        raw.tags = dedup_tags(all_texts(doc, &self.tags), &[]);
        raw.date = self
            .date_in_url
            .find(page.url.path())
            .map(|m| m.as_str().to_string());
        raw.authors = all_texts(doc, &self.authors);

        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    const ARTICLE: &str = r#"
        <html><body>
          <h1 class="title " id="m48-47-49">Nieve en el Pirineo</h1>
          <p class="epigraph" id="m53-52-54">Cortes en varias carreteras</p>
          <ul class="list-authors"><li> Luis Gil </li><li>Marta Sanz</li></ul>
          <div class="content-modules wrapper">
            <p>Primer párrafo.</p>
            <div><p>Pie de foto.</p></div>
            <p>Segundo párrafo.</p>
          </div>
          <ul class="tags-container"><li>Huesca</li><li> Nieve </li><li>Huesca</li></ul>
        </body></html>
    "#;

    fn page(path: &str, html: &str) -> FetchedPage {
        let url = Url::parse("https://www.heraldo.es").unwrap().join(path).unwrap();
        FetchedPage::parse(url, html)
    }

    #[test]
    fn test_extract_article() {
        let p = page("/noticias/aragon/huesca/2021/01/20/nieve-pirineo-1234.html", ARTICLE);
        let raw = Heraldo::new().unwrap().extract(&p);
        assert_eq!(raw.title.as_deref(), Some("Nieve en el Pirineo"));
        assert_eq!(raw.subtitle.as_deref(), Some("Cortes en varias carreteras"));
        assert_eq!(raw.category.as_deref(), Some("aragon"));
        assert_eq!(raw.paragraphs, vec!["Primer párrafo.", "Segundo párrafo."]);
        assert_eq!(raw.tags, vec!["Huesca", "Nieve"]);
        assert_eq!(raw.date.as_deref(), Some("2021/01/20"));
        assert_eq!(raw.authors, vec!["Luis Gil", "Marta Sanz"]);
        assert_eq!(raw.newspaper, "Heraldo Aragon");
    }

    #[test]
    fn test_url_without_date() {
        let p = page("/noticias/aragon/sin-fecha.html", "<html></html>");
        let raw = Heraldo::new().unwrap().extract(&p);
        assert!(raw.date.is_none());
        assert!(raw.authors.is_empty());
    }
}

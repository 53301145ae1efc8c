//! El Diario (eldiario.es) crawl rules and article adapter.
//!
//! Sections are discovered from the tablet main menu; articles from the
//! `ni-title` headings on section pages. Dates are printed in Spanish long
//! form (`20 de enero de 2021`).

use super::{COUNTRY_ES, ExtractionAdapter, FetchedPage, SourceId, all_texts, first_text, selector};
use crate::dates::DateFormat;
use crate::models::RawExtraction;
use crate::normalize::{category_from_path, dedup_tags};
use crate::profile::{Classification, ProfileError, RuleSpec, SourceProfile};
use scraper::Selector;

pub const NEWSPAPER: &str = "El Diario";

/// Blog, opinion and multimedia sections that never hold regular news.
const DENY: &[&str] = &[
    "/redaccion",
    "/opinion",
    "/fotos",
    "/videos",
    "/opinionsocios",
    "/blog",
    "/blogs",
    "/contracorriente",
    "/carnecruda",
    "/arsenioescolar",
    "/ultima-llamada",
    "/retrones",
    "/comoyporque",
    "/tumejoryo",
    "/cienciacritica",
    "/caballodenietzsche",
    "/contrapoder",
    "/interferencias",
    "/micromachismos",
    "/campobase",
    "/piedrasdepapel",
    "/murcia-y-aparte",
    "/emprende-a-diario",
    "/palabras-clave",
    "/edcreativo",
    "/de-ciencia",
];

const RULES: &[RuleSpec] = &[
    RuleSpec {
        name: "eldiario-sections",
        scope: Some("div.cmp-main-menu-tablet > div > ul li"),
        allow: None,
        deny: DENY,
        deny_domains: &["vertele.eldiario.es"],
        outcome: Classification::Navigate,
    },
    RuleSpec {
        name: "eldiario-articles",
        scope: Some("h2.ni-title"),
        allow: None,
        deny: DENY,
        deny_domains: &[],
        outcome: Classification::Extract,
    },
];

/// Tag separator glyph rendered between tag items.
const TAG_SENTINELS: &[&str] = &["/"];

pub fn profile() -> Result<SourceProfile, ProfileError> {
    SourceProfile::build(
        SourceId::ElDiario,
        NEWSPAPER,
        &["https://www.eldiario.es/"],
        &["eldiario.es"],
        RULES,
        DateFormat::SpanishLongForm,
    )
}

pub struct ElDiario {
    title: Selector,
    subtitle: Selector,
    body: Selector,
    tags: Selector,
    date: Selector,
    author_link: Selector,
    author_text: Selector,
}

impl ElDiario {
    pub fn new() -> Result<Self, ProfileError> {
        Ok(Self {
            title: selector("h1.title")?,
            subtitle: selector("div.news-header > ul.footer > li")?,
            body: selector(r#"div[class*="partner-wrapper article-page__body-row"] > div > p"#)?,
            tags: selector("ul.tags-wrapper > li")?,
            date: selector("div.date-comments-wrapper > time > span")?,
            author_link: selector("div.info-wrapper > p > a")?,
            author_text: selector("div.info-wrapper > p")?,
        })
    }
}

impl ExtractionAdapter for ElDiario {
    fn extract(&self, page: &FetchedPage) -> RawExtraction {
        let doc = &page.document;
        let mut raw = RawExtraction::new(page.url.clone(), NEWSPAPER, COUNTRY_ES);

        raw.title = first_text(doc, &self.title);
        raw.subtitle = first_text(doc, &self.subtitle);
        raw.category = category_from_path(&page.url, 0);
        raw.paragraphs = all_texts(doc, &self.body);
        raw.tags = dedup_tags(all_texts(doc, &self.tags), TAG_SENTINELS);
        raw.date = first_text(doc, &self.date);
        // Linked byline first, plain byline text otherwise.
        raw.authors = first_text(doc, &self.author_link)
            .or_else(|| first_text(doc, &self.author_text))
            .into_iter()
            .collect();

        raw
    }
}

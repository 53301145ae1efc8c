//! OK Diario (okdiario.com) crawl rules and article adapter.

use super::{COUNTRY_ES, ExtractionAdapter, FetchedPage, SourceId, all_texts, first_text, selector};
use crate::dates::DateFormat;
use crate::models::RawExtraction;
use crate::normalize::{category_from_path, dedup_tags};
use crate::profile::{Classification, ProfileError, RuleSpec, SourceProfile};
use scraper::Selector;

pub const NEWSPAPER: &str = "Ok Diario";

const DENY: &[&str] = &[
    "/opinion",
    "/fotos",
    "/videos",
    "/look",
    "/trailer",
    "/diariomadridista",
    "/podcast",
    "/ok-vs-ko",
    "/loteria",
    "/recetas",
    "/howto",
];

const RULES: &[RuleSpec] = &[
    RuleSpec {
        name: "okdiario-sections",
        scope: Some("ul.okdiario-secciones-menu-navegacion-ul li"),
        allow: None,
        deny: DENY,
        deny_domains: &["okjuridico.okdiario.com"],
        outcome: Classification::Navigate,
    },
    RuleSpec {
        name: "okdiario-articles",
        scope: Some(r#"article[class*="article fillContain"]"#),
        allow: None,
        deny: DENY,
        deny_domains: &[],
        outcome: Classification::Extract,
    },
];

/// Label that heads the topic list.
const TAG_SENTINELS: &[&str] = &["Temas:"];

pub fn profile() -> Result<SourceProfile, ProfileError> {
    SourceProfile::build(
        SourceId::OkDiario,
        NEWSPAPER,
        &["https://okdiario.com/"],
        &["okdiario.com"],
        RULES,
        DateFormat::SlashDmyTime,
    )
}

pub struct OkDiario {
    title: Selector,
    subtitle: Selector,
    body: Selector,
    tags: Selector,
    date: Selector,
    author: Selector,
}

impl OkDiario {
    pub fn new() -> Result<Self, ProfileError> {
        Ok(Self {
            title: selector("h1.entry-title")?,
            subtitle: selector("header.entry-header > span.pre-title")?,
            body: selector("div.entry-content#contentid-0 > p")?,
            tags: selector("div.topics > ul > li")?,
            date: selector("time.date")?,
            author: selector("li.author-name > strong > a")?,
        })
    }
}

impl ExtractionAdapter for OkDiario {
    fn extract(&self, page: &FetchedPage) -> RawExtraction {
        let doc = &page.document;
        let mut raw = RawExtraction::new(page.url.clone(), NEWSPAPER, COUNTRY_ES);

        raw.title = first_text(doc, &self.title);
        raw.subtitle = first_text(doc, &self.subtitle);
        raw.category = category_from_path(&page.url, 0);
        raw.paragraphs = all_texts(doc, &self.body);
        raw.tags = dedup_tags(all_texts(doc, &self.tags), TAG_SENTINELS);
        raw.date = first_text(doc, &self.date);
        raw.authors = first_text(doc, &self.author).into_iter().collect();

        raw
    }
}

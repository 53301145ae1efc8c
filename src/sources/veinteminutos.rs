//! 20minutos (20minutos.es) crawl rules and article adapter.
//!
//! Unlike the other sources, 20minutos paginates its section listings with
//! numeric path segments, so a trailing unscoped rule follows those. The
//! category comes from the section heading rather than the URL, and the
//! subtitle is the intro bullet list joined into one line. Articles carry no
//! tag list.

use super::{COUNTRY_ES, ExtractionAdapter, FetchedPage, SourceId, all_texts, first_text, selector};
use crate::dates::DateFormat;
use crate::models::RawExtraction;
use crate::normalize::join_paragraphs;
use crate::profile::{Classification, ProfileError, RuleSpec, SourceProfile};
use scraper::Selector;

pub const NEWSPAPER: &str = "20minutos";

const DENY_DOMAINS: &[&str] = &["blogs.20minutos.es"];
const DENY: &[&str] = &["/archivo", "/opinion", "/fotos", "/videos"];

const RULES: &[RuleSpec] = &[
    RuleSpec {
        name: "20minutos-sections",
        scope: Some("div.sections-col > ul > li"),
        allow: None,
        deny: &["/archivo", "/gonzoo", "/gastronomia", "/opinion", "/fotos", "/videos"],
        deny_domains: DENY_DOMAINS,
        outcome: Classification::Navigate,
    },
    RuleSpec {
        name: "20minutos-articles",
        scope: Some(r#"article[class*="media"]"#),
        allow: Some("/noticia"),
        deny: DENY,
        deny_domains: DENY_DOMAINS,
        outcome: Classification::Extract,
    },
    RuleSpec {
        name: "20minutos-pages",
        scope: None,
        allow: Some(r"/(\d+)"),
        deny: DENY,
        deny_domains: DENY_DOMAINS,
        outcome: Classification::Navigate,
    },
];

pub fn profile() -> Result<SourceProfile, ProfileError> {
    SourceProfile::build(
        SourceId::VeinteMinutos,
        NEWSPAPER,
        &["https://www.20minutos.es/"],
        &["20minutos.es"],
        RULES,
        DateFormat::DottedDmyTrailing,
    )
}

pub struct VeinteMinutos {
    section_heading: Selector,
    section_menu: Selector,
    title: Selector,
    intro: Selector,
    body: Selector,
    date: Selector,
    author: Selector,
}

impl VeinteMinutos {
    pub fn new() -> Result<Self, ProfileError> {
        Ok(Self {
            section_heading: selector(r#"ul[class*="section-menu-small"] h1"#)?,
            section_menu: selector(r#"ul[class*="default-menu"] li:first-child a"#)?,
            title: selector("h1.article-title")?,
            intro: selector("section.article-titles > div.article-intro li")?,
            body: selector(r#"div[class*="article-text"] > p"#)?,
            date: selector("section.article-titles span.article-date > a")?,
            author: selector("section.article-titles > span.article-author strong")?,
        })
    }
}

impl ExtractionAdapter for VeinteMinutos {
    fn extract(&self, page: &FetchedPage) -> RawExtraction {
        let doc = &page.document;
        let mut raw = RawExtraction::new(page.url.clone(), NEWSPAPER, COUNTRY_ES);

        // Section heading first, first main-menu entry otherwise.
        raw.category = first_text(doc, &self.section_heading)
            .or_else(|| first_text(doc, &self.section_menu));
        raw.title = first_text(doc, &self.title);
        let intro = join_paragraphs(all_texts(doc, &self.intro));
        raw.subtitle = (!intro.is_empty()).then_some(intro);
        raw.paragraphs = all_texts(doc, &self.body);
        raw.date = first_text(doc, &self.date);
        raw.authors = first_text(doc, &self.author).into_iter().collect();

        raw
    }
}

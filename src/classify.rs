//! Link discovery and rule-based URL classification.
//!
//! [`discover_links`] pulls every anchor out of a fetched page and records
//! which rule regions it was found in. [`classify`] then decides, per link,
//! whether the crawl should follow it, extract it, or drop it. The first rule
//! that matches wins; a link no rule accepts is ignored.

use crate::profile::{Classification, Rule, SourceProfile, host_within};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use tracing::trace;
use url::Url;

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("static selector"));

/// A link found on a fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    /// Absolute URL, fragment removed.
    pub url: Url,
    /// CSS selectors of the rule regions the anchor sits inside.
    pub scopes: Vec<String>,
}

impl CandidateLink {
    /// A link with no region information.
    #[cfg(test)]
    pub fn bare(url: Url) -> Self {
        Self {
            url,
            scopes: Vec::new(),
        }
    }

    fn in_scope(&self, css: &str) -> bool {
        self.scopes.iter().any(|s| s == css)
    }
}

/// Collect every distinct http(s) link on a page, in document order.
///
/// Relative hrefs are resolved against `base`; hrefs that do not resolve are
/// skipped. When the same URL appears under several anchors their regions
/// are merged.
///
/// # Arguments
///
/// * `document` - The parsed page
/// * `base` - URL the page was served from
/// * `profile` - Source whose rule regions are recorded on each link
///
/// # Returns
///
/// One [`CandidateLink`] per distinct URL, fragment stripped.
pub fn discover_links(document: &Html, base: &Url, profile: &SourceProfile) -> Vec<CandidateLink> {
    let mut links: Vec<CandidateLink> = Vec::new();
    let mut index: HashMap<Url, usize> = HashMap::new();

    for anchor in document.select(&ANCHOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(mut url) = base.join(href.trim()) else {
            continue;
        };
        if !matches!(url.scheme(), "http" | "https") {
            continue;
        }
        url.set_fragment(None);

        let scopes = scopes_of(&anchor, &profile.rules);
        match index.get(&url).copied() {
            Some(i) => {
                let link = &mut links[i];
                for s in scopes {
                    if !link.scopes.contains(&s) {
                        link.scopes.push(s);
                    }
                }
            }
            None => {
                index.insert(url.clone(), links.len());
                links.push(CandidateLink { url, scopes });
            }
        }
    }

    links
}

/// Regions (by CSS text) that contain `anchor`, the anchor itself included.
fn scopes_of(anchor: &ElementRef<'_>, rules: &[Rule]) -> Vec<String> {
    let mut found = Vec::new();
    for scope in rules.iter().filter_map(|r| r.scope.as_ref()) {
        if found.contains(&scope.css) {
            continue;
        }
        let inside = scope.selector.matches(anchor)
            || anchor
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|el| scope.selector.matches(&el));
        if inside {
            found.push(scope.css.clone());
        }
    }
    found
}

/// Decide what the crawl does with `link`.
///
/// Offsite links are ignored outright. Otherwise rules are tried in
/// declaration order and the first match decides.
///
/// # Returns
///
/// The matching rule's outcome, or [`Classification::Ignore`] when no rule
/// accepts the link.
pub fn classify(profile: &SourceProfile, link: &CandidateLink) -> Classification {
    let Some(host) = link.url.host_str() else {
        return Classification::Ignore;
    };
    if !profile.allows_host(host) {
        return Classification::Ignore;
    }

    match profile.rules.iter().find(|rule| rule_matches(rule, host, link)) {
        Some(rule) => {
            trace!(rule = %rule.name, url = %link.url, outcome = ?rule.outcome, "Rule matched");
            rule.outcome
        }
        None => Classification::Ignore,
    }
}

fn rule_matches(rule: &Rule, host: &str, link: &CandidateLink) -> bool {
    if rule.deny_domains.iter().any(|d| host_within(host, d)) {
        return false;
    }
    if let Some(scope) = &rule.scope {
        if !link.in_scope(&scope.css) {
            return false;
        }
    }
    let path = link.url.path();
    if rule.deny.iter().any(|re| re.is_match(path)) {
        return false;
    }
    match &rule.allow {
        Some(re) => re.is_match(path),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::DateFormat;
    use crate::profile::RuleSpec;
    use crate::sources::SourceId;

    const RULES: &[RuleSpec] = &[
        RuleSpec {
            name: "sections",
            scope: Some("nav.menu"),
            allow: None,
            deny: &["/opinion", "/fotos"],
            deny_domains: &["blogs.diario.es"],
            outcome: Classification::Navigate,
        },
        RuleSpec {
            name: "articles",
            scope: Some("h2.headline"),
            allow: Some(r"/noticia"),
            deny: &["/opinion"],
            deny_domains: &["blogs.diario.es"],
            outcome: Classification::Extract,
        },
        RuleSpec {
            name: "pagination",
            scope: None,
            allow: Some(r"/(\d+)"),
            deny: &[],
            deny_domains: &["blogs.diario.es"],
            outcome: Classification::Navigate,
        },
    ];

    const PAGE: &str = r#"
        <html><body>
          <nav class="menu"><ul>
            <li><a href="/politica">Política</a></li>
            <li><a href="/opinion">Opinión</a></li>
            <li><a href="https://blogs.diario.es/politica">Blog</a></li>
          </ul></nav>
          <h2 class="headline"><a href="/noticia/uno#comentarios">Uno</a></h2>
          <h2 class="headline"><a href="/politica">Política otra vez</a></h2>
          <a href="/portada/2">Más</a>
          <a href="https://otro.com/noticia/x">Fuera</a>
          <a href="mailto:redaccion@diario.es">Correo</a>
        </body></html>
    "#;

    fn profile() -> SourceProfile {
        SourceProfile::build(
            SourceId::VeinteMinutos,
            "Diario",
            &["https://www.diario.es/"],
            &["diario.es"],
            RULES,
            DateFormat::DottedDmyTrailing,
        )
        .unwrap()
    }

    fn link(url: &str, scopes: &[&str]) -> CandidateLink {
        CandidateLink {
            url: Url::parse(url).unwrap(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_discover_links_resolves_and_merges() {
        let profile = profile();
        let base = Url::parse("https://www.diario.es/").unwrap();
        let doc = Html::parse_document(PAGE);
        let links = discover_links(&doc, &base, &profile);

        let urls: Vec<&str> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.diario.es/politica",
                "https://www.diario.es/opinion",
                "https://blogs.diario.es/politica",
                "https://www.diario.es/noticia/uno",
                "https://www.diario.es/portada/2",
                "https://otro.com/noticia/x",
            ]
        );
        assert_eq!(links[0].scopes, vec!["nav.menu".to_string(), "h2.headline".to_string()]);
        assert_eq!(links[3].scopes, vec!["h2.headline".to_string()]);
        assert!(links[4].scopes.is_empty());
    }

    #[test]
    fn test_classify_page_links() {
        let profile = profile();
        let base = Url::parse("https://www.diario.es/").unwrap();
        let doc = Html::parse_document(PAGE);
        let got: Vec<Classification> = discover_links(&doc, &base, &profile)
            .iter()
            .map(|l| classify(&profile, l))
            .collect();
        assert_eq!(
            got,
            vec![
                Classification::Navigate,
                Classification::Ignore,
                Classification::Ignore,
                Classification::Extract,
                Classification::Navigate,
                Classification::Ignore,
            ]
        );
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let profile = profile();
        // Matches both the menu rule and the article rule; menu is declared first.
        let l = link("https://www.diario.es/noticia/dos", &["nav.menu", "h2.headline"]);
        assert_eq!(classify(&profile, &l), Classification::Navigate);
    }

    #[test]
    fn test_denied_domain_overrides_allow() {
        let profile = profile();
        let l = link("https://blogs.diario.es/noticia/123", &["h2.headline"]);
        assert_eq!(classify(&profile, &l), Classification::Ignore);
    }

    #[test]
    fn test_deny_path_falls_through_to_later_rule() {
        let profile = profile();
        // Denied by both scoped rules, still accepted by the unscoped numeric rule.
        let l = link("https://www.diario.es/opinion/2024", &["nav.menu", "h2.headline"]);
        assert_eq!(classify(&profile, &l), Classification::Navigate);
    }

    #[test]
    fn test_unmatched_link_is_ignored() {
        let profile = profile();
        let l = CandidateLink::bare(Url::parse("https://www.diario.es/contacto").unwrap());
        assert_eq!(classify(&profile, &l), Classification::Ignore);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let profile = profile();
        let l = link("https://www.diario.es/noticia/tres", &["h2.headline"]);
        let first = classify(&profile, &l);
        for _ in 0..5 {
            assert_eq!(classify(&profile, &l), first);
        }
        assert_eq!(first, Classification::Extract);
    }
}

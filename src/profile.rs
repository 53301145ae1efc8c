//! Static, per-source crawl configuration.
//!
//! A [`SourceProfile`] is built once at startup from a source's rule table
//! and never mutated afterwards. Rules are declared as plain data
//! ([`RuleSpec`]) and compiled into [`Rule`]s, which is the only step that
//! can fail: an invalid regex or CSS selector in a rule table is reported as
//! a [`ProfileError`].

use crate::dates::DateFormat;
use crate::sources::SourceId;
use regex::Regex;
use scraper::Selector;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Default outbound identification string.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Ubuntu Chromium/71.0.3578.80 Chrome/71.0.3578.80 Safari/537.36";

/// Default minimum spacing between two requests to the same source.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// Errors raised while compiling a source's rule table.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("rule `{rule}`: invalid pattern: {source}")]
    Pattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
    #[error("rule `{rule}`: invalid selector `{css}`: {message}")]
    Selector {
        rule: String,
        css: String,
        message: String,
    },
    #[error("invalid field selector `{css}`: {message}")]
    Field { css: String, message: String },
    #[error("invalid seed url `{url}`: {source}")]
    Seed {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// What to do with a discovered link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Listing or section page: fetch it and classify its links.
    Navigate,
    /// Article page: fetch it and run the source's extraction adapter.
    Extract,
    /// Not part of the crawl.
    Ignore,
}

/// Declarative form of a [`Rule`], suitable for `const` rule tables.
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    pub name: &'static str,
    /// CSS selector of the page region the link must sit in.
    pub scope: Option<&'static str>,
    /// Regex the link path must match.
    pub allow: Option<&'static str>,
    /// Regexes that reject a link path when any of them matches.
    pub deny: &'static [&'static str],
    /// Hosts (and their subdomains) the rule never matches.
    pub deny_domains: &'static [&'static str],
    /// `Navigate` or `Extract`.
    pub outcome: Classification,
}

/// Page region a rule is restricted to.
#[derive(Debug, Clone)]
pub struct Scope {
    pub css: String,
    pub selector: Selector,
}

/// A compiled link-matching rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub scope: Option<Scope>,
    pub allow: Option<Regex>,
    pub deny: Vec<Regex>,
    pub deny_domains: Vec<String>,
    pub outcome: Classification,
}

impl RuleSpec {
    /// Compile patterns and selectors.
    pub fn build(&self) -> Result<Rule, ProfileError> {
        let pattern = |p: &str| {
            Regex::new(p).map_err(|source| ProfileError::Pattern {
                rule: self.name.to_string(),
                source,
            })
        };

        let scope = match self.scope {
            Some(css) => Some(Scope {
                css: css.to_string(),
                selector: Selector::parse(css).map_err(|e| ProfileError::Selector {
                    rule: self.name.to_string(),
                    css: css.to_string(),
                    message: e.to_string(),
                })?,
            }),
            None => None,
        };

        Ok(Rule {
            name: self.name.to_string(),
            scope,
            allow: self.allow.map(pattern).transpose()?,
            deny: self.deny.iter().map(|&p| pattern(p)).collect::<Result<_, _>>()?,
            deny_domains: self.deny_domains.iter().map(|d| d.to_string()).collect(),
            outcome: self.outcome,
        })
    }
}

/// Immutable crawl configuration of one source.
#[derive(Debug, Clone)]
pub struct SourceProfile {
    pub id: SourceId,
    /// Human-readable newspaper name.
    pub name: String,
    pub seed_urls: Vec<Url>,
    pub allowed_domains: Vec<String>,
    /// Link rules in declaration order; the first match wins.
    pub rules: Vec<Rule>,
    pub delay: Duration,
    pub user_agent: String,
    pub date_format: DateFormat,
    /// Stop after this many fetched pages.
    pub max_pages: Option<usize>,
}

impl SourceProfile {
    /// Compile a profile from its static description.
    pub fn build(
        id: SourceId,
        name: &str,
        seeds: &[&str],
        allowed_domains: &[&str],
        rules: &[RuleSpec],
        date_format: DateFormat,
    ) -> Result<Self, ProfileError> {
        let seed_urls = seeds
            .iter()
            .map(|s| {
                Url::parse(s).map_err(|source| ProfileError::Seed {
                    url: s.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id,
            name: name.to_string(),
            seed_urls,
            allowed_domains: allowed_domains.iter().map(|d| d.to_string()).collect(),
            rules: rules.iter().map(RuleSpec::build).collect::<Result<_, _>>()?,
            delay: DEFAULT_DELAY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            date_format,
            max_pages: None,
        })
    }

    /// Whether `host` belongs to one of the allowed domains.
    pub fn allows_host(&self, host: &str) -> bool {
        self.allowed_domains.iter().any(|d| host_within(host, d))
    }
}

/// True when `host` equals `domain` or is one of its subdomains.
pub fn host_within(host: &str, domain: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let domain = domain.to_ascii_lowercase();
    host == domain || host.ends_with(&format!(".{domain}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAV: RuleSpec = RuleSpec {
        name: "menu",
        scope: Some("nav.menu li"),
        allow: None,
        deny: &["/opinion", "/fotos"],
        deny_domains: &["blogs.example.es"],
        outcome: Classification::Navigate,
    };

    #[test]
    fn test_rule_spec_builds() {
        let rule = NAV.build().unwrap();
        assert_eq!(rule.name, "menu");
        assert_eq!(rule.scope.as_ref().map(|s| s.css.as_str()), Some("nav.menu li"));
        assert_eq!(rule.deny.len(), 2);
        assert_eq!(rule.outcome, Classification::Navigate);
    }

    #[test]
    fn test_bad_pattern_is_reported() {
        let spec = RuleSpec {
            allow: Some("/(\\d+"),
            ..NAV
        };
        let err = spec.build().unwrap_err();
        assert!(matches!(err, ProfileError::Pattern { .. }));
        assert!(err.to_string().contains("menu"));
    }

    #[test]
    fn test_bad_selector_is_reported() {
        let spec = RuleSpec {
            scope: Some("div[[["),
            ..NAV
        };
        assert!(matches!(spec.build(), Err(ProfileError::Selector { .. })));
    }

    #[test]
    fn test_host_within() {
        assert!(host_within("example.es", "example.es"));
        assert!(host_within("www.example.es", "example.es"));
        assert!(host_within("WWW.Example.es", "example.es"));
        assert!(!host_within("badexample.es", "example.es"));
        assert!(!host_within("example.es.evil.com", "example.es"));
    }

    #[test]
    fn test_profile_build() {
        let profile = SourceProfile::build(
            SourceId::ElDiario,
            "Example",
            &["https://www.example.es/"],
            &["example.es"],
            &[NAV],
            DateFormat::SlashYmd,
        )
        .unwrap();
        assert_eq!(profile.seed_urls.len(), 1);
        assert_eq!(profile.delay, DEFAULT_DELAY);
        assert!(profile.allows_host("www.example.es"));
        assert!(!profile.allows_host("other.com"));
    }

    #[test]
    fn test_profile_rejects_bad_seed() {
        let err = SourceProfile::build(
            SourceId::ElDiario,
            "Example",
            &["not a url"],
            &["example.es"],
            &[],
            DateFormat::SlashYmd,
        )
        .unwrap_err();
        assert!(matches!(err, ProfileError::Seed { .. }));
    }
}

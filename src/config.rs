//! YAML configuration for crawl runs.
//!
//! Every key is optional; anything left out keeps the built-in source
//! defaults. Command-line flags are applied on top of the loaded file.
//!
//! ```yaml
//! output_dir: ./articles
//! delay_ms: 1500
//! max_pages: 400
//! sources:
//!   heraldo:
//!     enabled: false
//!   20minutos:
//!     seed_urls:
//!       - https://www.20minutos.es/nacional/
//!     max_pages: 100
//! ```

use crate::profile::SourceProfile;
use crate::sources::SourceId;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument};
use url::Url;

/// Errors raised while loading or applying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("unknown source `{0}` in config")]
    UnknownSource(String),
    #[error("invalid seed url `{url}` for {source_id}: {source}")]
    Seed {
        source_id: SourceId,
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory the JSON-lines sink writes under.
    pub output_dir: Option<PathBuf>,
    /// Outbound identification string for every source.
    pub user_agent: Option<String>,
    /// Politeness delay for every source, in milliseconds.
    pub delay_ms: Option<u64>,
    /// Page budget for every source.
    pub max_pages: Option<usize>,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Per-source overrides keyed by source id.
    pub sources: BTreeMap<String, SourceSettings>,
}

/// Overrides for a single source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceSettings {
    pub enabled: bool,
    pub seed_urls: Option<Vec<String>>,
    pub delay_ms: Option<u64>,
    pub max_pages: Option<usize>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            seed_urls: None,
            delay_ms: None,
            max_pages: None,
        }
    }
}

impl Config {
    /// Load `path`, or return defaults when no path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            debug!("No config file given; using defaults");
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file is a valid, empty config.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Reject source keys that name no known source.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for key in self.sources.keys() {
            key.parse::<SourceId>()
                .map_err(|_| ConfigError::UnknownSource(key.clone()))?;
        }
        Ok(())
    }

    fn settings(&self, id: SourceId) -> Option<&SourceSettings> {
        self.sources
            .iter()
            .find(|(k, _)| k.parse::<SourceId>().ok() == Some(id))
            .map(|(_, v)| v)
    }

    /// Whether the config leaves `id` switched on.
    pub fn is_enabled(&self, id: SourceId) -> bool {
        self.settings(id).is_none_or(|s| s.enabled)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(30))
    }

    /// Apply global then per-source overrides to a built-in profile.
    pub fn apply(&self, profile: &mut SourceProfile) -> Result<(), ConfigError> {
        if let Some(ua) = &self.user_agent {
            profile.user_agent = ua.clone();
        }
        if let Some(ms) = self.delay_ms {
            profile.delay = Duration::from_millis(ms);
        }
        if self.max_pages.is_some() {
            profile.max_pages = self.max_pages;
        }

        let Some(settings) = self.settings(profile.id) else {
            return Ok(());
        };
        if let Some(seeds) = &settings.seed_urls {
            profile.seed_urls = seeds
                .iter()
                .map(|s| {
                    Url::parse(s).map_err(|source| ConfigError::Seed {
                        source_id: profile.id,
                        url: s.clone(),
                        source,
                    })
                })
                .collect::<Result<_, _>>()?;
        }
        if let Some(ms) = settings.delay_ms {
            profile.delay = Duration::from_millis(ms);
        }
        if settings.max_pages.is_some() {
            profile.max_pages = settings.max_pages;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
output_dir: ./out
delay_ms: 1500
max_pages: 400
sources:
  heraldo:
    enabled: false
  20minutos:
    seed_urls:
      - https://www.20minutos.es/nacional/
    delay_ms: 3000
    max_pages: 10
"#;

    #[test]
    fn test_parse_config() {
        let config = Config::from_yaml(YAML).unwrap();
        config.validate().unwrap();
        assert_eq!(config.output_dir, Some(PathBuf::from("./out")));
        assert!(!config.is_enabled(SourceId::Heraldo));
        assert!(config.is_enabled(SourceId::ElDiario));
        assert!(config.is_enabled(SourceId::VeinteMinutos));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }

    #[test]
    fn test_apply_overrides() {
        let config = Config::from_yaml(YAML).unwrap();

        let mut profile = SourceId::VeinteMinutos.profile().unwrap();
        config.apply(&mut profile).unwrap();
        assert_eq!(profile.delay, Duration::from_millis(3000));
        assert_eq!(profile.max_pages, Some(10));
        assert_eq!(profile.seed_urls[0].as_str(), "https://www.20minutos.es/nacional/");

        let mut profile = SourceId::OkDiario.profile().unwrap();
        config.apply(&mut profile).unwrap();
        assert_eq!(profile.delay, Duration::from_millis(1500));
        assert_eq!(profile.max_pages, Some(400));
        assert_eq!(profile.seed_urls[0].as_str(), "https://okdiario.com/");
    }

    #[test]
    fn test_unknown_source_rejected() {
        let config = Config::from_yaml("sources:\n  elpais:\n    enabled: true\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::UnknownSource(s)) if s == "elpais"));
    }

    #[test]
    fn test_bad_seed_rejected() {
        let config = Config::from_yaml("sources:\n  okdiario:\n    seed_urls: [\"nope\"]\n").unwrap();
        let mut profile = SourceId::OkDiario.profile().unwrap();
        assert!(matches!(config.apply(&mut profile), Err(ConfigError::Seed { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("newsstand.yaml");
        std::fs::write(&path, YAML).unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.max_pages, Some(400));

        let missing = dir.path().join("missing.yaml");
        assert!(matches!(Config::load(Some(&missing)), Err(ConfigError::Read { .. })));
    }
}

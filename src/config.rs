//! TOML configuration.
//!
//! Every section is optional. A missing file at the default location means
//! "use defaults"; a missing file at an explicitly requested path is an
//! error.
//!
//! ```toml
//! [store]
//! path = "./data/shopping_list.json"
//!
//! [matching]
//! fuzzy_threshold = 0.85
//!
//! [extractor]
//! provider = "heuristic"   # heuristic | openai | ollama | disabled
//!
//! [categorizer]
//! provider = "keyword"     # keyword | openai | ollama | disabled
//! ```

use anyhow::{bail, Context, Result};
use larder_core::normalize::DEFAULT_FUZZY_THRESHOLD;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default = "default_extractor")]
    pub extractor: ServiceConfig,
    #[serde(default = "default_categorizer")]
    pub categorizer: ServiceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./data/shopping_list.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct MatchingConfig {
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

fn default_fuzzy_threshold() -> f64 {
    DEFAULT_FUZZY_THRESHOLD
}

/// Settings for one collaborator service (extractor or categorizer).
///
/// `model`, `url`, `timeout_secs`, and `max_retries` only matter for the
/// LLM-backed providers.
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl ServiceConfig {
    pub fn with_provider(provider: &str) -> Self {
        Self {
            provider: provider.to_string(),
            model: None,
            url: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }

    pub fn is_llm(&self) -> bool {
        matches!(self.provider.as_str(), "openai" | "ollama")
    }
}

fn default_extractor() -> ServiceConfig {
    ServiceConfig::with_provider("heuristic")
}
fn default_categorizer() -> ServiceConfig {
    ServiceConfig::with_provider("keyword")
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}

impl Config {
    /// Defaults for running without a config file: offline heuristic
    /// extraction and keyword categorization.
    pub fn minimal() -> Self {
        Self {
            store: StoreConfig::default(),
            matching: MatchingConfig::default(),
            extractor: default_extractor(),
            categorizer: default_categorizer(),
        }
    }
}

/// Load configuration from `path`, or defaults when `path` is `None` and
/// the default location has no file.
pub fn load_config_or_default(path: Option<&Path>, default_path: &Path) -> Result<Config> {
    match path {
        Some(p) => load_config(p),
        None if default_path.exists() => load_config(default_path),
        None => Ok(Config::minimal()),
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if !(0.0..=1.0).contains(&config.matching.fuzzy_threshold) {
        bail!("matching.fuzzy_threshold must be in [0.0, 1.0]");
    }

    if config.store.path.as_os_str().is_empty() {
        bail!("store.path must not be empty");
    }

    match config.extractor.provider.as_str() {
        "heuristic" | "openai" | "ollama" | "disabled" => {}
        other => bail!(
            "Unknown extractor provider: '{}'. Must be heuristic, openai, ollama, or disabled.",
            other
        ),
    }

    match config.categorizer.provider.as_str() {
        "keyword" | "openai" | "ollama" | "disabled" => {}
        other => bail!(
            "Unknown categorizer provider: '{}'. Must be keyword, openai, ollama, or disabled.",
            other
        ),
    }

    for (section, service) in [
        ("extractor", &config.extractor),
        ("categorizer", &config.categorizer),
    ] {
        if service.is_llm() && service.model.is_none() {
            bail!(
                "{}.model must be specified when provider is '{}'",
                section,
                service.provider
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_src)?;
        validate(&config)?;
        Ok(config)
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.store.path, PathBuf::from("./data/shopping_list.json"));
        assert_eq!(config.matching.fuzzy_threshold, 0.85);
        assert_eq!(config.extractor.provider, "heuristic");
        assert_eq!(config.categorizer.provider, "keyword");
        assert_eq!(config.extractor.max_retries, 3);
    }

    #[test]
    fn test_threshold_out_of_range() {
        let err = parse("[matching]\nfuzzy_threshold = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("fuzzy_threshold"));
    }

    #[test]
    fn test_unknown_provider() {
        let err = parse("[extractor]\nprovider = \"magic\"\n").unwrap_err();
        assert!(err.to_string().contains("Unknown extractor provider"));
        let err = parse("[categorizer]\nprovider = \"heuristic\"\n").unwrap_err();
        assert!(err.to_string().contains("Unknown categorizer provider"));
    }

    #[test]
    fn test_llm_provider_requires_model() {
        let err = parse("[extractor]\nprovider = \"ollama\"\n").unwrap_err();
        assert!(err.to_string().contains("extractor.model"));

        let config = parse(
            "[extractor]\nprovider = \"ollama\"\nmodel = \"llama3.2\"\nurl = \"http://127.0.0.1:11434\"\n",
        )
        .unwrap();
        assert_eq!(config.extractor.model.as_deref(), Some("llama3.2"));
        assert_eq!(config.extractor.timeout_secs, 30);
    }

    #[test]
    fn test_missing_default_file_falls_back() {
        let tmp = tempfile::TempDir::new().unwrap();
        let absent = tmp.path().join("larder.toml");
        let config = load_config_or_default(None, &absent).unwrap();
        assert_eq!(config.extractor.provider, "heuristic");
        assert!(load_config_or_default(Some(&absent), &absent).is_err());
    }
}

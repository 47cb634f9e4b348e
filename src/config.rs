//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$SPAMLENS_CONFIG` (environment variable)
//! 2. `~/.config/spamlens/config.toml` (Linux/macOS)
//!    `%APPDATA%\spamlens\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classifier::DEFAULT_TOP_N;
use crate::parser::extract::DEFAULT_MAX_MESSAGE_SIZE;

/// Name of the log file inside the cache directory.
pub const LOG_FILE_NAME: &str = "spamlens.log";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Locations of the pre-trained model files.
    pub artifacts: ArtifactsConfig,
    /// Label mapping and explanation size.
    pub classifier: ClassifierConfig,
    /// Tokenizer tweaks.
    pub tokenizer: TokenizerConfig,
    /// Input limits.
    pub limits: LimitsConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Artifact locations. Unset paths resolve next to the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// JSON linear model.
    pub model_path: Option<PathBuf>,
    /// JSON count vectorizer.
    pub vectorizer_path: Option<PathBuf>,
}

/// Classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Model class label that means "spam". Compared case-sensitively.
    pub positive_label: String,
    /// Number of features in each explanation.
    pub top_features: usize,
}

/// Tokenizer settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Words dropped in addition to the built-in English stopwords.
    pub extra_stopwords: Vec<String>,
}

/// Input limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum raw message size in bytes (default: 10485760 = 10 MB).
    pub max_message_size: usize,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            positive_label: "spam".to_string(),
            top_features: DEFAULT_TOP_N,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    match config_file_path() {
        Some(path) if path.exists() => load_config_from(&path),
        _ => Config::default(),
    }
}

/// Load configuration from `path`, falling back to defaults on any error.
pub fn load_config_from(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<Config>(&contents) {
            Ok(cfg) => {
                tracing::info!(path = %path.display(), "Loaded config");
                cfg
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to parse config, using defaults"
                );
                Config::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to read config file, using defaults"
            );
            Config::default()
        }
    }
}

/// Save configuration to `path`, creating parent directories.
pub fn save_config(config: &Config, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    // 1. Environment variable override
    if let Ok(env_path) = std::env::var("SPAMLENS_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    // 2. Standard config directory
    dirs::config_dir().map(|d| d.join("spamlens").join("config.toml"))
}

/// Directory holding the default artifact files.
pub fn artifact_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("spamlens")
}

/// Resolved model path.
pub fn model_path(config: &Config) -> PathBuf {
    config
        .artifacts
        .model_path
        .clone()
        .unwrap_or_else(|| artifact_dir().join("model.json"))
}

/// Resolved vectorizer path.
pub fn vectorizer_path(config: &Config) -> PathBuf {
    config
        .artifacts
        .vectorizer_path
        .clone()
        .unwrap_or_else(|| artifact_dir().join("vectorizer.json"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("spamlens")
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.classifier.positive_label, "spam");
        assert_eq!(cfg.classifier.top_features, 15);
        assert_eq!(cfg.limits.max_message_size, 10 * 1024 * 1024);
        assert!(cfg.tokenizer.extra_stopwords.is_empty());
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let mut cfg = Config::default();
        cfg.artifacts.model_path = Some(PathBuf::from("/srv/model.json"));
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.classifier.positive_label, cfg.classifier.positive_label);
        assert_eq!(parsed.artifacts.model_path, cfg.artifacts.model_path);
        assert_eq!(parsed.limits.max_message_size, cfg.limits.max_message_size);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[classifier]
positive_label = "1"

[tokenizer]
extra_stopwords = ["unsubscribe"]
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.classifier.positive_label, "1");
        assert_eq!(cfg.tokenizer.extra_stopwords, vec!["unsubscribe"]);
        // Other fields use defaults
        assert_eq!(cfg.classifier.top_features, 15);
        assert_eq!(cfg.general.log_level, "warn");
    }

    #[test]
    fn test_load_config_from_invalid_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();
        let cfg = load_config_from(&path);
        assert_eq!(cfg.classifier.positive_label, "spam");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.classifier.top_features = 5;
        save_config(&cfg, &path).unwrap();
        assert_eq!(load_config_from(&path).classifier.top_features, 5);
    }

    #[test]
    fn test_explicit_artifact_paths_win() {
        let mut cfg = Config::default();
        cfg.artifacts.vectorizer_path = Some(PathBuf::from("v.json"));
        assert_eq!(vectorizer_path(&cfg), PathBuf::from("v.json"));
        assert!(model_path(&cfg).ends_with("model.json"));
    }
}

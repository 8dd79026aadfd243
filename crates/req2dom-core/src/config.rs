use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::analyzer::AnalyzerKind;
use crate::lexicon::Locale;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Invalid completion endpoint: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Remote completion service dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionProvider {
    /// Local Ollama server (`/api/generate`)
    #[default]
    Ollama,
    /// OpenAI chat completions
    OpenAi,
    /// DeepSeek, OpenAI-compatible
    DeepSeek,
    /// OpenRouter, OpenAI-compatible
    OpenRouter,
    /// Google Gemini `generateContent`
    Gemini,
}

impl CompletionProvider {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenAi => "openai",
            Self::DeepSeek => "deepseek",
            Self::OpenRouter => "openrouter",
            Self::Gemini => "gemini",
        }
    }

    #[must_use]
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Ollama => "http://localhost:11434/api/generate",
            Self::OpenAi => "https://api.openai.com/v1/chat/completions",
            Self::DeepSeek => "https://api.deepseek.com/v1/chat/completions",
            Self::OpenRouter => "https://openrouter.ai/api/v1/chat/completions",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta/models",
        }
    }

    #[must_use]
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Ollama => "llama3",
            Self::OpenAi => "gpt-4o-mini",
            Self::DeepSeek => "deepseek-chat",
            Self::OpenRouter => "mistralai/mistral-7b-instruct",
            Self::Gemini => "gemini-1.5-flash",
        }
    }

    /// Environment variable holding the API key, if the provider needs one.
    #[must_use]
    pub fn api_key_var(&self) -> Option<&'static str> {
        match self {
            Self::Ollama => None,
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::DeepSeek => Some("DEEPSEEK_API_KEY"),
            Self::OpenRouter => Some("OPENROUTER_API_KEY"),
            Self::Gemini => Some("GEMINI_API_KEY"),
        }
    }

    /// Local models are slow to answer; hosted ones get a tighter bound.
    #[must_use]
    pub fn default_timeout_secs(&self) -> u64 {
        match self {
            Self::Ollama => 120,
            _ => 45,
        }
    }

    pub fn is_openai_compatible(&self) -> bool {
        matches!(self, Self::OpenAi | Self::DeepSeek | Self::OpenRouter)
    }
}

impl std::fmt::Display for CompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CompletionProvider {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAi),
            "deepseek" => Ok(Self::DeepSeek),
            "openrouter" => Ok(Self::OpenRouter),
            "gemini" => Ok(Self::Gemini),
            _ => Err(crate::Error::InvalidProvider(s.to_string())),
        }
    }
}

/// Heuristic extraction limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum class candidates kept per document
    pub max_classes: usize,
    /// Maximum attributes per class
    pub max_attributes: usize,
    /// Maximum relationships per model
    pub max_relationships: usize,
    /// Minimum statistical importance for a noun to qualify
    pub statistical_threshold: f64,
    /// Inject generic entities when fewer than two candidates qualify
    pub inject_fallback: bool,
    /// Similarity at or above which two class names are merged
    pub fuzzy_threshold: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_classes: 5,
            max_attributes: 8,
            max_relationships: 3,
            statistical_threshold: 0.3,
            inject_fallback: true,
            fuzzy_threshold: 0.85,
        }
    }
}

/// Remote completion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub provider: CompletionProvider,
    /// Overrides the provider's default endpoint
    pub endpoint: Option<String>,
    /// Overrides the provider's default model
    pub model: Option<String>,
    /// Never written back out
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub connect_timeout_seconds: u64,
    /// Overrides the provider's default request timeout
    pub timeout_seconds: Option<u64>,
    pub temperature: f32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: CompletionProvider::default(),
            endpoint: None,
            model: None,
            api_key: None,
            connect_timeout_seconds: 10,
            timeout_seconds: None,
            temperature: 0.1,
        }
    }
}

impl CompletionConfig {
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.provider.default_endpoint())
    }

    #[must_use]
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    #[must_use]
    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
            .unwrap_or_else(|| self.provider.default_timeout_secs())
    }
}

/// Diagram geometry, in diagram units
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub origin_x: u32,
    pub origin_y: u32,
    pub vertex_width: u32,
    /// Height of the class name header
    pub header_height: u32,
    /// Height added per attribute row
    pub row_height: u32,
    /// Vertical gap between stacked classes
    pub spacing: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            origin_x: 40,
            origin_y: 40,
            vertex_width: 160,
            header_height: 26,
            row_height: 30,
            spacing: 40,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analyzer: AnalyzerKind,
    pub locale: Locale,
    pub extraction: ExtractionConfig,
    pub completion: CompletionConfig,
    pub layout: LayoutConfig,
}

impl Config {
    /// `<config_dir>/req2dom/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("req2dom").join("config.toml"))
    }

    /// Defaults, then the TOML file (the explicit path, else the default
    /// path when it exists), then environment overrides.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path().filter(|p| p.exists()),
        };

        let mut config = match file {
            Some(path) => {
                let text = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::Io { path, source })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Applies `REQ2DOM_*` overrides and the provider API key. The lookup
    /// is injected so callers can supply something other than the process
    /// environment.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> ConfigResult<()> {
        fn invalid(key: &str, value: &str) -> ConfigError {
            ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            }
        }

        if let Some(v) = var("REQ2DOM_ANALYZER") {
            self.analyzer = v.parse().map_err(|_| invalid("REQ2DOM_ANALYZER", &v))?;
        }
        if let Some(v) = var("REQ2DOM_LOCALE") {
            self.locale = v.parse().map_err(|_| invalid("REQ2DOM_LOCALE", &v))?;
        }
        if let Some(v) = var("REQ2DOM_COMPLETION_PROVIDER") {
            self.completion.provider = v
                .parse()
                .map_err(|_| invalid("REQ2DOM_COMPLETION_PROVIDER", &v))?;
        }
        if let Some(v) = var("REQ2DOM_COMPLETION_ENDPOINT") {
            self.completion.endpoint = Some(v);
        }
        if let Some(v) = var("REQ2DOM_COMPLETION_MODEL") {
            self.completion.model = Some(v);
        }
        if let Some(v) = var("REQ2DOM_COMPLETION_TIMEOUT") {
            let secs = v
                .parse()
                .map_err(|_| invalid("REQ2DOM_COMPLETION_TIMEOUT", &v))?;
            self.completion.timeout_seconds = Some(secs);
        }
        if self.completion.api_key.is_none() {
            self.completion.api_key = self.completion.provider.api_key_var().and_then(var);
        }
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let ex = &self.extraction;
        if ex.max_classes == 0 || ex.max_attributes == 0 || ex.max_relationships == 0 {
            return Err(ConfigError::Invalid(
                "extraction caps must be greater than zero".to_string(),
            ));
        }
        for (name, value) in [
            ("statistical_threshold", ex.statistical_threshold),
            ("fuzzy_threshold", ex.fuzzy_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    key: format!("extraction.{name}"),
                    value: value.to_string(),
                });
            }
        }
        if self.completion.timeout_seconds() == 0 || self.completion.connect_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "completion timeouts must be greater than zero".to_string(),
            ));
        }
        url::Url::parse(self.completion.endpoint())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_validate() {
        let config = Config::default();
        assert_eq!(config.analyzer, AnalyzerKind::Pattern);
        assert_eq!(config.locale, Locale::Portuguese);
        assert_eq!(config.extraction.max_classes, 5);
        assert_eq!(config.completion.timeout_seconds(), 120);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_partial_override() {
        let config = Config::from_toml_str(
            r#"
            analyzer = "syntactic"
            locale = "en"

            [extraction]
            max_classes = 3

            [completion]
            provider = "gemini"
            "#,
        )
        .unwrap();

        assert_eq!(config.analyzer, AnalyzerKind::Syntactic);
        assert_eq!(config.locale, Locale::English);
        assert_eq!(config.extraction.max_classes, 3);
        assert_eq!(config.extraction.max_attributes, 8);
        assert_eq!(config.completion.provider, CompletionProvider::Gemini);
        assert_eq!(config.completion.model(), "gemini-1.5-flash");
        assert_eq!(config.completion.timeout_seconds(), 45);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("REQ2DOM_ANALYZER", "hybrid"),
                ("REQ2DOM_COMPLETION_PROVIDER", "openai"),
                ("REQ2DOM_COMPLETION_TIMEOUT", "30"),
                ("OPENAI_API_KEY", "sk-test"),
            ]))
            .unwrap();

        assert_eq!(config.analyzer, AnalyzerKind::Hybrid);
        assert_eq!(config.completion.provider, CompletionProvider::OpenAi);
        assert_eq!(config.completion.timeout_seconds(), 30);
        assert_eq!(config.completion.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_env_rejects_bad_values() {
        let mut config = Config::default();
        let err = config
            .apply_env(env(&[("REQ2DOM_LOCALE", "klingon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_validate_rejects() {
        let mut config = Config::default();
        config.extraction.max_classes = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.extraction.statistical_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.completion.timeout_seconds = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.completion.endpoint = Some("not a url".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[layout]\nvertex_width = 200\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.layout.vertex_width, 200);
        assert_eq!(config.layout.row_height, 30);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let err = Config::load(Some(Path::new("/nonexistent/req2dom.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_api_key_never_serialized() {
        let mut config = Config::default();
        config.completion.api_key = Some("secret".to_string());
        let text = toml::to_string(&config).unwrap();
        assert!(!text.contains("secret"));
    }
}

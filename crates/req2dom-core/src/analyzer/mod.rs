mod completion;
mod heuristic;
mod hybrid;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::annotate::AnnotationError;
use crate::config::Config;
use crate::json::JsonExtractError;
use crate::model::DomainModel;
use crate::normalize::{RequirementDocument, TextNormalizer};

pub use completion::{
    extraction_prompt, refinement_prompt, CompletionAnalyzer, CompletionClient, CompletionError,
    CompletionResult, HttpCompletionClient,
};
pub use heuristic::HeuristicAnalyzer;
pub use hybrid::HybridAnalyzer;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Annotation failed: {0}")]
    Annotation(#[from] AnnotationError),
    #[error("Completion failed: {0}")]
    Completion(#[from] CompletionError),
    #[error("Unreadable completion output: {0}")]
    Json(#[from] JsonExtractError),
    #[error("{0} is not a heuristic analyzer")]
    NotHeuristic(AnalyzerKind),
}

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Which analyzer a pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerKind {
    /// Vocabulary, entity spans and capitalization; word patterns
    #[default]
    Pattern,
    /// Vocabulary, entity spans and statistical importance
    Statistical,
    /// Vocabulary and syntactic roles; every relationship layer
    Syntactic,
    /// Remote text completion only
    Completion,
    /// Syntactic pass refined by a completion pass
    Hybrid,
}

impl AnalyzerKind {
    pub const ALL: [Self; 5] = [
        Self::Pattern,
        Self::Statistical,
        Self::Syntactic,
        Self::Completion,
        Self::Hybrid,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pattern => "pattern",
            Self::Statistical => "statistical",
            Self::Syntactic => "syntactic",
            Self::Completion => "completion",
            Self::Hybrid => "hybrid",
        }
    }

    pub fn is_heuristic(&self) -> bool {
        matches!(self, Self::Pattern | Self::Statistical | Self::Syntactic)
    }

    pub fn needs_completion(&self) -> bool {
        matches!(self, Self::Completion | Self::Hybrid)
    }
}

impl std::fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AnalyzerKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| crate::Error::InvalidAnalyzerKind(s.to_string()))
    }
}

/// Wire form of an analyzer result: `{"content": ...}` or `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerOutput {
    /// Canonical model JSON
    Content(String),
    Error(String),
}

impl AnalyzerOutput {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// A collaborator failed and a degraded result was used in its place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub failed: AnalyzerKind,
    pub used: AnalyzerKind,
    pub reason: String,
}

impl Substitution {
    #[must_use]
    pub fn new(failed: AnalyzerKind, used: AnalyzerKind, reason: impl Into<String>) -> Self {
        Self {
            failed,
            used,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    pub model: DomainModel,
    pub substitutions: Vec<Substitution>,
    /// Generic classes injected because too few candidates qualified
    pub fallback_classes: Vec<String>,
}

impl Analysis {
    #[must_use]
    pub fn new(model: DomainModel) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_substitution(mut self, substitution: Substitution) -> Self {
        self.substitutions.push(substitution);
        self
    }

    pub fn used_fallback(&self) -> bool {
        !self.fallback_classes.is_empty()
    }
}

#[async_trait::async_trait]
pub trait Analyzer: Send + Sync {
    fn kind(&self) -> AnalyzerKind;

    async fn analyze(&self, document: &RequirementDocument) -> AnalyzerResult<Analysis>;

    /// Runs on raw text and reports through the wire contract; failures
    /// become `{"error": ...}` instead of propagating.
    async fn analyze_text(&self, text: &str) -> AnalyzerOutput {
        let document = TextNormalizer::new().normalize(text);
        let result = match self.analyze(&document).await {
            Ok(analysis) => analysis.model.to_json().map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match result {
            Ok(content) => AnalyzerOutput::Content(content),
            Err(message) => {
                tracing::warn!(analyzer = %self.kind(), error = %message, "Analyzer failed");
                AnalyzerOutput::Error(message)
            }
        }
    }
}

/// Builds the analyzer named in `config`.
pub fn from_config(config: &Config) -> AnalyzerResult<Box<dyn Analyzer>> {
    let kind = config.analyzer;
    if kind.is_heuristic() {
        return Ok(Box::new(HeuristicAnalyzer::from_config(kind, config)?));
    }

    let client: Arc<dyn CompletionClient> = Arc::new(HttpCompletionClient::from_config(&config.completion)?);
    let completion = CompletionAnalyzer::new(client, config.locale).with_fuzzy_threshold(config.extraction.fuzzy_threshold);

    Ok(match kind {
        AnalyzerKind::Hybrid => {
            let heuristic = HeuristicAnalyzer::from_config(AnalyzerKind::Syntactic, config)?;
            Box::new(HybridAnalyzer::new(heuristic, completion))
        }
        _ => Box::new(completion),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Hybrid".parse::<AnalyzerKind>().unwrap(), AnalyzerKind::Hybrid);
        assert!("spacy".parse::<AnalyzerKind>().is_err());
        assert_eq!(AnalyzerKind::default(), AnalyzerKind::Pattern);
        assert!(AnalyzerKind::Statistical.is_heuristic());
        assert!(AnalyzerKind::Hybrid.needs_completion());
    }

    #[test]
    fn test_output_wire_format() {
        let ok = serde_json::to_value(AnalyzerOutput::Content("{}".into())).unwrap();
        assert_eq!(ok, serde_json::json!({"content": "{}"}));

        let err: AnalyzerOutput = serde_json::from_str(r#"{"error": "timeout"}"#).unwrap();
        assert_eq!(err, AnalyzerOutput::Error("timeout".into()));
        assert!(err.is_error());
    }

    #[test]
    fn test_from_config_heuristic() {
        let config = Config::default();
        let analyzer = from_config(&config).unwrap();
        assert_eq!(analyzer.kind(), AnalyzerKind::Pattern);
    }

    #[test]
    fn test_from_config_missing_key() {
        let mut config = Config::default();
        config.analyzer = AnalyzerKind::Completion;
        config.completion.provider = crate::config::CompletionProvider::OpenAi;
        config.completion.api_key = None;
        assert!(matches!(
            from_config(&config),
            Err(AnalyzerError::Completion(CompletionError::MissingApiKey(_)))
        ));
    }
}

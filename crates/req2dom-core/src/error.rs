use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid attribute type: {0}")]
    InvalidAttributeType(String),

    #[error("Invalid relationship kind: {0}")]
    InvalidRelationshipKind(String),

    #[error("Invalid analyzer kind: {0}")]
    InvalidAnalyzerKind(String),

    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    #[error("Invalid completion provider: {0}")]
    InvalidProvider(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Annotation error: {0}")]
    Annotation(#[from] crate::annotate::AnnotationError),

    #[error("Analyzer error: {0}")]
    Analyzer(#[from] crate::analyzer::AnalyzerError),

    #[error("Completion error: {0}")]
    Completion(#[from] crate::analyzer::CompletionError),

    #[error("JSON extraction error: {0}")]
    JsonExtract(#[from] crate::json::JsonExtractError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod analyzer;
pub mod annotate;
pub mod config;
pub mod dedup;
pub mod error;
pub mod extract;
pub mod json;
pub mod lexicon;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod serialize;
pub mod text;
pub mod validate;

pub use analyzer::{
    Analysis, Analyzer, AnalyzerError, AnalyzerKind, AnalyzerOutput, CompletionAnalyzer, CompletionClient, CompletionError,
    HeuristicAnalyzer, HttpCompletionClient, HybridAnalyzer, Substitution,
};
pub use annotate::{AnnotatedDocument, Annotator, PatternAnnotator};
pub use config::{CompletionConfig, CompletionProvider, Config, ExtractionConfig, LayoutConfig};
pub use dedup::{Deduplicator, ExactMatchResolver, FuzzyMatchResolver, NameResolver};
pub use error::{Error, Result};
pub use json::{extract_json, extract_model};
pub use lexicon::{Lexicon, Locale};
pub use merge::merge;
pub use model::{
    Attribute, AttributeType, Bound, Cardinality, ClassEntity, DomainModel, Relationship, RelationshipKind,
};
pub use normalize::{RequirementDocument, RequirementUnit, TextNormalizer};
pub use pipeline::{Pipeline, PipelineError, PipelineOutput, PipelineStats};
pub use serialize::{Diagram, DiagramSerializer};
pub use validate::ModelValidator;

use std::path::Path;
use std::time::Instant;

use thiserror::Error;
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::analyzer::{self, Analyzer, AnalyzerError, AnalyzerKind, Substitution};
use crate::config::{Config, LayoutConfig};
use crate::lexicon::Locale;
use crate::model::DomainModel;
use crate::normalize::{RequirementDocument, TextNormalizer};
use crate::serialize::{Diagram, DiagramSerializer};
use crate::validate::ModelValidator;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Analyzer error: {0}")]
    Analyzer(#[from] AnalyzerError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub requirement_units: usize,
    pub labeled_units: usize,
    pub classes: usize,
    pub attributes: usize,
    pub relationships: usize,
    pub dropped_edges: usize,
    pub duration_ms: u64,
}

impl PipelineStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

pub struct PipelineOutput {
    pub run_id: Uuid,
    pub document: RequirementDocument,
    pub model: DomainModel,
    pub diagram: Diagram,
    pub substitutions: Vec<Substitution>,
    pub fallback_classes: Vec<String>,
    pub stats: PipelineStats,
}

impl PipelineOutput {
    pub fn xml(&self) -> &str {
        &self.diagram.xml
    }

    pub fn was_degraded(&self) -> bool {
        !self.substitutions.is_empty()
    }
}

/// normalize → analyze → validate → serialize. Each run owns all of its
/// intermediate state, so one pipeline can serve concurrent requests.
pub struct Pipeline {
    normalizer: TextNormalizer,
    analyzer: Box<dyn Analyzer>,
    validator: ModelValidator,
    serializer: DiagramSerializer,
}

impl Pipeline {
    #[must_use]
    pub fn new(analyzer: Box<dyn Analyzer>, locale: Locale) -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            analyzer,
            validator: ModelValidator::new(locale.lexicon()),
            serializer: DiagramSerializer::default(),
        }
    }

    pub fn from_config(config: &Config) -> PipelineResult<Self> {
        let analyzer = analyzer::from_config(config)?;
        Ok(Self::new(analyzer, config.locale).with_layout(config.layout))
    }

    #[must_use]
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.serializer = DiagramSerializer::new(layout);
        self
    }

    pub fn analyzer_kind(&self) -> AnalyzerKind {
        self.analyzer.kind()
    }

    pub async fn run(&self, text: &str) -> PipelineResult<PipelineOutput> {
        let run_id = Uuid::now_v7();
        let span = tracing::info_span!("pipeline", %run_id, analyzer = %self.analyzer.kind());
        self.run_inner(run_id, text).instrument(span).await
    }

    pub async fn run_file(&self, path: &Path) -> PipelineResult<PipelineOutput> {
        let text = tokio::fs::read_to_string(path).await?;
        self.run(&text).await
    }

    async fn run_inner(&self, run_id: Uuid, text: &str) -> PipelineResult<PipelineOutput> {
        let start = Instant::now();
        let mut stats = PipelineStats::new();

        let document = self.normalizer.normalize(text);
        stats.requirement_units = document.len();
        stats.labeled_units = document.labeled_count();

        let analysis = self.analyzer.analyze(&document).await?;
        let model = self.validator.validate(analysis.model);
        let diagram = self.serializer.serialize(&model);

        stats.classes = model.len();
        stats.attributes = model.attribute_count();
        stats.relationships = model.relationship_count();
        stats.dropped_edges = diagram.dropped_edges;
        stats.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            units = stats.requirement_units,
            classes = stats.classes,
            attributes = stats.attributes,
            relationships = stats.relationships,
            dropped_edges = stats.dropped_edges,
            substitutions = analysis.substitutions.len(),
            duration_ms = stats.duration_ms,
            "Pipeline complete"
        );

        Ok(PipelineOutput {
            run_id,
            document,
            model,
            diagram,
            substitutions: analysis.substitutions,
            fallback_classes: analysis.fallback_classes,
            stats,
        })
    }
}

use tracing::{debug, info};

use super::{Analysis, Analyzer, AnalyzerError, AnalyzerKind, AnalyzerResult};
use crate::annotate::{AnnotatedDocument, Annotator, PatternAnnotator};
use crate::config::{Config, ExtractionConfig};
use crate::dedup::Deduplicator;
use crate::extract::{
    AttributeInference, CandidateExtractor, RelationshipExtractor, RelationshipLayer, ScoringStrategy,
};
use crate::lexicon::{Lexicon, Locale};
use crate::model::{ClassEntity, DomainModel};
use crate::normalize::RequirementDocument;
use crate::validate::ModelValidator;

/// Annotator-driven extraction: candidates, attributes, relationships,
/// then deduplication and validation.
pub struct HeuristicAnalyzer {
    kind: AnalyzerKind,
    lexicon: &'static Lexicon,
    annotator: Box<dyn Annotator>,
    candidates: CandidateExtractor,
    attributes: AttributeInference,
    relationships: RelationshipExtractor,
    dedup: Deduplicator,
    validator: ModelValidator,
}

impl HeuristicAnalyzer {
    pub fn new(kind: AnalyzerKind, locale: Locale, extraction: &ExtractionConfig) -> AnalyzerResult<Self> {
        let (strategies, layers) = match kind {
            AnalyzerKind::Pattern => (
                vec![
                    ScoringStrategy::DomainVocabulary,
                    ScoringStrategy::NamedEntity,
                    ScoringStrategy::CapitalizedWord,
                ],
                vec![RelationshipLayer::Lexical, RelationshipLayer::DomainRule],
            ),
            AnalyzerKind::Statistical => (
                vec![
                    ScoringStrategy::DomainVocabulary,
                    ScoringStrategy::NamedEntity,
                    ScoringStrategy::Statistical,
                ],
                vec![RelationshipLayer::Lexical, RelationshipLayer::DomainRule],
            ),
            AnalyzerKind::Syntactic => (
                vec![ScoringStrategy::DomainVocabulary, ScoringStrategy::SyntacticRole],
                vec![
                    RelationshipLayer::Syntactic,
                    RelationshipLayer::Lexical,
                    RelationshipLayer::DomainRule,
                ],
            ),
            other => return Err(AnalyzerError::NotHeuristic(other)),
        };

        let lexicon = locale.lexicon();
        Ok(Self {
            kind,
            lexicon,
            annotator: Box::new(PatternAnnotator::new(locale)),
            candidates: CandidateExtractor::new(lexicon)
                .with_strategies(strategies)
                .with_max_candidates(extraction.max_classes)
                .with_statistical_threshold(extraction.statistical_threshold)
                .with_fallback(extraction.inject_fallback),
            attributes: AttributeInference::new(lexicon).with_max_attributes(extraction.max_attributes),
            relationships: RelationshipExtractor::new(lexicon)
                .with_layers(layers)
                .with_max_relationships(extraction.max_relationships),
            dedup: Deduplicator::fuzzy(lexicon, extraction.fuzzy_threshold),
            validator: ModelValidator::new(lexicon),
        })
    }

    pub fn from_config(kind: AnalyzerKind, config: &Config) -> AnalyzerResult<Self> {
        Self::new(kind, config.locale, &config.extraction)
    }

    /// Swaps in another linguistic backend.
    #[must_use]
    pub fn with_annotator(mut self, annotator: Box<dyn Annotator>) -> Self {
        self.annotator = annotator;
        self
    }

    pub fn lexicon(&self) -> &'static Lexicon {
        self.lexicon
    }

    /// The synchronous core, over an already annotated document.
    pub fn extract(&self, doc: &AnnotatedDocument) -> Analysis {
        let candidates = self.candidates.extract(doc);
        let fallback_classes: Vec<String> = candidates
            .iter()
            .filter(|c| c.is_fallback())
            .map(|c| c.name.clone())
            .collect();

        let mut model = DomainModel::new();
        for candidate in &candidates {
            debug!(
                class = %candidate.name,
                score = candidate.score,
                origin = candidate.origin.as_str(),
                "Class candidate"
            );
            let attributes = self.attributes.infer(&candidate.name, doc);
            model.classes.push(ClassEntity::new(candidate.name.clone()).with_attributes(attributes));
        }

        let names = model.class_names();
        for sourced in self.relationships.extract(&names, doc) {
            if let Some(class) = model.class_mut(&sourced.source) {
                class.relationships.push(sourced.relationship);
            }
        }

        let model = self.validator.validate(self.dedup.deduplicate(model));
        Analysis {
            model,
            substitutions: Vec::new(),
            fallback_classes,
        }
    }
}

#[async_trait::async_trait]
impl Analyzer for HeuristicAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        self.kind
    }

    async fn analyze(&self, document: &RequirementDocument) -> AnalyzerResult<Analysis> {
        let annotated = self.annotator.annotate(&document.analysis_text())?;
        let analysis = self.extract(&annotated);
        info!(
            analyzer = %self.kind,
            annotator = self.annotator.name(),
            sentences = annotated.sentences.len(),
            classes = analysis.model.len(),
            relationships = analysis.model.relationship_count(),
            fallback = analysis.used_fallback(),
            "Heuristic analysis complete"
        );
        Ok(analysis)
    }
}

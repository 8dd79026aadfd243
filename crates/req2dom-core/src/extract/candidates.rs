use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::annotate::{AnnotatedDocument, DependencyRole, PartOfSpeech, Sentence, Token};
use crate::lexicon::Lexicon;
use crate::text::{capitalize, fold};

const VOCABULARY_BONUS: f64 = 5.0;
const NAMED_ENTITY_SCORE: f64 = 2.0;
const CAPITALIZED_SCORE: f64 = 1.5;
const COLLOCATION_WINDOW: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginStrategy {
    DomainVocabulary,
    NamedEntity,
    SyntacticRole,
    Statistical,
    CapitalizedWord,
    /// Injected generic entity, not found in the text
    Fallback,
}

impl OriginStrategy {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DomainVocabulary => "domain_vocabulary",
            Self::NamedEntity => "named_entity",
            Self::SyntacticRole => "syntactic_role",
            Self::Statistical => "statistical",
            Self::CapitalizedWord => "capitalized_word",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassCandidate {
    pub name: String,
    pub score: f64,
    pub origin: OriginStrategy,
}

impl ClassCandidate {
    #[must_use]
    pub fn new(name: impl Into<String>, score: f64, origin: OriginStrategy) -> Self {
        Self {
            name: name.into(),
            score,
            origin,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == OriginStrategy::Fallback
    }
}

/// Independent scoring strategies a candidate extractor can combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoringStrategy {
    /// Fixed bonus for curated business-entity nouns
    DomainVocabulary,
    /// Person, organization and product entity spans
    NamedEntity,
    /// Subject, object and root role weights times occurrence count
    SyntacticRole,
    /// Weighted frequency, role importance, modifiers and collocations
    Statistical,
    /// Capitalized nouns in mid-sentence position
    CapitalizedWord,
}

#[derive(Debug, Default)]
struct Tally {
    display: String,
    score: f64,
    best: Option<(OriginStrategy, f64)>,
}

impl Tally {
    fn add(&mut self, origin: OriginStrategy, score: f64) {
        self.score += score;
        if self.best.is_none_or(|(_, s)| score > s) {
            self.best = Some((origin, score));
        }
    }
}

/// Keyed by folded lemma, in first-seen order.
#[derive(Default)]
struct Scores(IndexMap<String, Tally>);

impl Scores {
    fn register(&mut self, key: &str, display: &str) {
        self.0.entry(key.to_string()).or_insert_with(|| Tally {
            display: display.to_string(),
            ..Tally::default()
        });
    }

    fn add(&mut self, key: &str, origin: OriginStrategy, score: f64) {
        if let Some(tally) = self.0.get_mut(key) {
            tally.add(origin, score);
        }
    }
}

/// Produces ranked class-name candidates from an annotated document.
pub struct CandidateExtractor {
    lexicon: &'static Lexicon,
    strategies: Vec<ScoringStrategy>,
    max_candidates: usize,
    statistical_threshold: f64,
    inject_fallback: bool,
}

impl CandidateExtractor {
    #[must_use]
    pub fn new(lexicon: &'static Lexicon) -> Self {
        Self {
            lexicon,
            strategies: vec![ScoringStrategy::DomainVocabulary, ScoringStrategy::SyntacticRole],
            max_candidates: 5,
            statistical_threshold: 0.3,
            inject_fallback: true,
        }
    }

    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<ScoringStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    #[must_use]
    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = max;
        self
    }

    #[must_use]
    pub fn with_statistical_threshold(mut self, threshold: f64) -> Self {
        self.statistical_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, inject: bool) -> Self {
        self.inject_fallback = inject;
        self
    }

    /// Ranked by descending score, ties in first-seen order, capped. When
    /// fewer than two candidates qualify and injection is enabled, the
    /// locale's generic entities are appended with origin `Fallback`, up
    /// to the cap.
    pub fn extract(&self, doc: &AnnotatedDocument) -> Vec<ClassCandidate> {
        let mut scores = Scores::default();
        for token in doc.tokens() {
            if self.is_eligible(token) {
                scores.register(&token.folded_lemma(), &token.lemma);
            }
        }

        for strategy in &self.strategies {
            match strategy {
                ScoringStrategy::DomainVocabulary => self.score_vocabulary(doc, &mut scores),
                ScoringStrategy::NamedEntity => self.score_entities(doc, &mut scores),
                ScoringStrategy::SyntacticRole => self.score_roles(doc, &mut scores),
                ScoringStrategy::Statistical => self.score_statistics(doc, &mut scores),
                ScoringStrategy::CapitalizedWord => self.score_capitalized(doc, &mut scores),
            }
        }

        let mut candidates: Vec<ClassCandidate> = scores
            .0
            .into_values()
            .filter_map(|tally| {
                let (origin, _) = tally.best?;
                Some(ClassCandidate::new(
                    class_name(&tally.display),
                    tally.score,
                    origin,
                ))
            })
            .collect();

        // stable: equal scores keep first-seen order
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(self.max_candidates);

        // injection never pushes the result past the cap
        let wanted = self.max_candidates.min(2);
        if candidates.len() < wanted && self.inject_fallback {
            for name in self.lexicon.fallback_entities {
                if candidates.len() >= wanted {
                    break;
                }
                if !candidates.iter().any(|c| fold(&c.name) == fold(name)) {
                    tracing::debug!(entity = name, "Injecting fallback entity");
                    candidates.push(ClassCandidate::new(name, 0.0, OriginStrategy::Fallback));
                }
            }
        }

        candidates
    }

    fn is_eligible(&self, token: &Token) -> bool {
        token.pos.is_nominal()
            && token.lemma.chars().count() >= 3
            && token.lemma.chars().all(char::is_alphabetic)
            && !self.lexicon.is_stop_word(&token.lemma)
            && !self.lexicon.is_attribute_word(&token.lemma)
    }

    fn score_vocabulary(&self, doc: &AnnotatedDocument, scores: &mut Scores) {
        let mut seen = HashSet::new();
        for token in doc.tokens() {
            let key = token.folded_lemma();
            if self.is_eligible(token)
                && self.lexicon.is_vocabulary(&key)
                && seen.insert(key.clone())
            {
                scores.add(&key, OriginStrategy::DomainVocabulary, VOCABULARY_BONUS);
            }
        }
    }

    fn score_entities(&self, doc: &AnnotatedDocument, scores: &mut Scores) {
        for sentence in &doc.sentences {
            for span in sentence.entities.iter().filter(|s| s.is_class_like()) {
                let display = span
                    .text
                    .split_whitespace()
                    .map(|w| w.to_lowercase())
                    .collect::<Vec<_>>()
                    .join(" ");
                if display.chars().count() < 3 || self.lexicon.is_stop_word(&display) {
                    continue;
                }
                let key = fold(&display);
                scores.register(&key, &display);
                scores.add(&key, OriginStrategy::NamedEntity, NAMED_ENTITY_SCORE);
            }
        }
    }

    /// Per occurrence weight 1, plus 3 as subject, 2 as object and 2 at
    /// the root; the summed weight is multiplied by the occurrence count.
    fn score_roles(&self, doc: &AnnotatedDocument, scores: &mut Scores) {
        let mut weights: IndexMap<String, (f64, usize)> = IndexMap::new();
        for token in doc.tokens().filter(|t| self.is_eligible(t)) {
            let weight = 1.0
                + match token.dep {
                    DependencyRole::Subject => 3.0,
                    DependencyRole::Object | DependencyRole::IndirectObject => 2.0,
                    DependencyRole::Root => 2.0,
                    _ => 0.0,
                };
            let entry = weights.entry(token.folded_lemma()).or_insert((0.0, 0));
            entry.0 += weight;
            entry.1 += 1;
        }
        for (key, (sum, count)) in weights {
            scores.add(&key, OriginStrategy::SyntacticRole, sum * count as f64);
        }
    }

    /// 0.3 × normalized frequency + 0.4 × fraction of important roles +
    /// 0.2 × distinct modifiers + 0.1 × distinct collocations. Modifier
    /// and collocation counts are normalized by the document maximum.
    /// Nouns under the threshold contribute nothing.
    fn score_statistics(&self, doc: &AnnotatedDocument, scores: &mut Scores) {
        #[derive(Default)]
        struct Stats {
            count: usize,
            important: usize,
            modifiers: HashSet<String>,
            collocations: HashSet<String>,
        }

        let mut stats: IndexMap<String, Stats> = IndexMap::new();
        for sentence in &doc.sentences {
            for (i, token) in sentence.tokens.iter().enumerate() {
                if !self.is_eligible(token) {
                    continue;
                }
                let entry = stats.entry(token.folded_lemma()).or_default();
                entry.count += 1;
                if token.dep.is_important() {
                    entry.important += 1;
                }
                for (_, dependent) in sentence.dependents(i) {
                    if dependent.dep.is_modifier() {
                        entry.modifiers.insert(dependent.folded_lemma());
                    }
                }
                entry.collocations.extend(collocations(sentence, i));
            }
        }

        let max_of = |f: &dyn Fn(&Stats) -> usize| stats.values().map(f).max().unwrap_or(0).max(1);
        let max_count = max_of(&|s| s.count) as f64;
        let max_modifiers = max_of(&|s| s.modifiers.len()) as f64;
        let max_collocations = max_of(&|s| s.collocations.len()) as f64;

        for (key, s) in &stats {
            let frequency = s.count as f64 / max_count;
            let importance = s.important as f64 / s.count as f64;
            let modifiers = s.modifiers.len() as f64 / max_modifiers;
            let collocation = s.collocations.len() as f64 / max_collocations;
            let score =
                0.3 * frequency + 0.4 * importance + 0.2 * modifiers + 0.1 * collocation;
            if score >= self.statistical_threshold {
                scores.add(key, OriginStrategy::Statistical, score);
            }
        }
    }

    fn score_capitalized(&self, doc: &AnnotatedDocument, scores: &mut Scores) {
        for sentence in &doc.sentences {
            let first = sentence
                .tokens
                .iter()
                .position(|t| t.text.chars().any(char::is_alphabetic));
            for (i, token) in sentence.tokens.iter().enumerate() {
                let capitalized = token.text.chars().next().is_some_and(char::is_uppercase);
                if capitalized && Some(i) != first && self.is_eligible(token) {
                    scores.add(
                        &token.folded_lemma(),
                        OriginStrategy::CapitalizedWord,
                        CAPITALIZED_SCORE,
                    );
                }
            }
        }
    }
}

/// Content words within a small window of token `i`.
fn collocations(sentence: &Sentence, i: usize) -> Vec<String> {
    let start = i.saturating_sub(COLLOCATION_WINDOW);
    let end = (i + COLLOCATION_WINDOW + 1).min(sentence.tokens.len());
    (start..end)
        .filter(|&j| j != i)
        .map(|j| &sentence.tokens[j])
        .filter(|t| {
            matches!(
                t.pos,
                PartOfSpeech::Noun
                    | PartOfSpeech::ProperNoun
                    | PartOfSpeech::Verb
                    | PartOfSpeech::Adjective
            )
        })
        .map(Token::folded_lemma)
        .collect()
}

/// `"nota fiscal"` becomes `"NotaFiscal"`.
fn class_name(display: &str) -> String {
    display.split_whitespace().map(capitalize).collect()
}

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::annotate::{AnnotatedDocument, DependencyRole, PartOfSpeech, Sentence, Token};
use crate::lexicon::{Lexicon, VerbRule};
use crate::model::{Cardinality, Relationship, RelationshipKind};
use crate::text::fold;

static WORD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\p{L}+(?:-\p{L}+)*|\d+").ok());

/// How far past a cue the lexical layer looks for the target class.
const TARGET_WINDOW: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipLayer {
    /// Verb table over subject and object dependencies
    Syntactic,
    /// Word patterns over the lowercased sentence
    Lexical,
    /// Person-to-everything edges when nothing else was found
    DomainRule,
}

/// A relationship together with the class that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcedRelationship {
    pub source: String,
    pub relationship: Relationship,
    pub layer: RelationshipLayer,
}

impl SourcedRelationship {
    #[must_use]
    pub fn new(source: impl Into<String>, relationship: Relationship, layer: RelationshipLayer) -> Self {
        Self {
            source: source.into(),
            relationship,
            layer,
        }
    }

    pub fn target(&self) -> &str {
        &self.relationship.target
    }

    pub fn kind(&self) -> RelationshipKind {
        self.relationship.kind
    }
}

/// Maps words onto the known class names.
struct ClassIndex<'a> {
    lexicon: &'a Lexicon,
    entries: Vec<(String, &'a str)>,
}

impl<'a> ClassIndex<'a> {
    fn new(lexicon: &'a Lexicon, class_names: &'a [String]) -> Self {
        let entries = class_names
            .iter()
            .map(|name| (fold(&lexicon.singularize(&name.to_lowercase())), name.as_str()))
            .collect();
        Self { lexicon, entries }
    }

    fn lookup(&self, key: &str) -> Option<&'a str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, name)| *name)
    }

    fn resolve_word(&self, word: &str) -> Option<&'a str> {
        let lower = word.to_lowercase();
        self.lookup(&fold(&lower))
            .or_else(|| self.lookup(&fold(&self.lexicon.singularize(&lower))))
    }

    fn resolve_token(&self, token: &Token) -> Option<&'a str> {
        if !token.pos.is_nominal() {
            return None;
        }
        self.lookup(&token.folded_lemma())
            .or_else(|| self.resolve_word(&token.text))
    }
}

/// Proposes typed, cardinality-annotated relationships between known
/// classes.
pub struct RelationshipExtractor {
    lexicon: &'static Lexicon,
    layers: Vec<RelationshipLayer>,
    max_relationships: usize,
}

impl RelationshipExtractor {
    #[must_use]
    pub fn new(lexicon: &'static Lexicon) -> Self {
        Self {
            lexicon,
            layers: vec![
                RelationshipLayer::Syntactic,
                RelationshipLayer::Lexical,
                RelationshipLayer::DomainRule,
            ],
            max_relationships: 3,
        }
    }

    #[must_use]
    pub fn with_layers(mut self, layers: Vec<RelationshipLayer>) -> Self {
        self.layers = layers;
        self
    }

    #[must_use]
    pub fn with_max_relationships(mut self, max: usize) -> Self {
        self.max_relationships = max;
        self
    }

    /// Runs the enabled layers in order, then deduplicates and caps. The
    /// domain-rule layer only fires when the other layers found nothing.
    pub fn extract(&self, class_names: &[String], doc: &AnnotatedDocument) -> Vec<SourcedRelationship> {
        if class_names.len() < 2 {
            return Vec::new();
        }
        let index = ClassIndex::new(self.lexicon, class_names);
        let mut found = Vec::new();

        if self.layers.contains(&RelationshipLayer::Syntactic) {
            for sentence in &doc.sentences {
                self.syntactic(sentence, &index, &mut found);
            }
        }
        if self.layers.contains(&RelationshipLayer::Lexical) {
            for sentence in &doc.sentences {
                self.lexical(sentence, &index, &mut found);
            }
        }
        if found.is_empty() && self.layers.contains(&RelationshipLayer::DomainRule) {
            self.domain_rule(class_names, doc, &mut found);
        }

        let mut unique = deduplicate(found);
        unique.truncate(self.max_relationships);
        tracing::debug!(relationships = unique.len(), "Extracted relationships");
        unique
    }

    fn syntactic(&self, sentence: &Sentence, index: &ClassIndex<'_>, out: &mut Vec<SourcedRelationship>) {
        let tokens = &sentence.tokens;
        let mentioned: HashSet<&str> = tokens.iter().filter_map(|t| index.resolve_token(t)).collect();
        if mentioned.len() < 2 {
            return;
        }
        let sentence_subject = tokens.iter().position(|t| t.dep == DependencyRole::Subject);
        let folded = sentence.folded();

        for (v, verb) in tokens.iter().enumerate() {
            if verb.pos != PartOfSpeech::Verb {
                continue;
            }
            let Some(rule) = self
                .lexicon
                .verb_rule(&verb.text)
                .or_else(|| self.lexicon.verb_rule(&verb.lemma))
            else {
                continue;
            };

            let subject = sentence
                .dependents(v)
                .find(|(_, t)| t.dep == DependencyRole::Subject)
                .map(|(i, _)| i)
                .or(sentence_subject);
            let Some(source) = subject.and_then(|i| index.resolve_token(&tokens[i])) else {
                continue;
            };

            let mut objects: Vec<usize> = sentence
                .dependents(v)
                .filter(|(_, t)| {
                    matches!(t.dep, DependencyRole::Object | DependencyRole::IndirectObject)
                })
                .map(|(i, _)| i)
                .collect();
            let conjuncts: Vec<usize> = objects
                .iter()
                .flat_map(|&o| {
                    sentence
                        .dependents(o)
                        .filter(|(_, t)| t.dep == DependencyRole::Conjunct)
                        .map(|(i, _)| i)
                })
                .collect();
            objects.extend(conjuncts);

            for o in objects {
                let Some(target) = index.resolve_token(&tokens[o]) else {
                    continue;
                };
                if target == source {
                    continue;
                }
                let cardinality = self.cardinality(&folded, tokens, o, rule.cardinality);
                out.push(SourcedRelationship::new(
                    source,
                    Relationship::new(rule.kind, target, cardinality),
                    RelationshipLayer::Syntactic,
                ));
            }
        }
    }

    /// Patterns: `X is a Y` (inheritance), `each X has Y` (composition),
    /// `X <table verb> Y`, and `X of Y` (association `*..1`).
    fn lexical(&self, sentence: &Sentence, index: &ClassIndex<'_>, out: &mut Vec<SourcedRelationship>) {
        let Some(word_re) = WORD.as_ref() else {
            return;
        };
        let lowered = sentence.text.to_lowercase();
        let words: Vec<&str> = word_re.find_iter(&lowered).map(|m| m.as_str()).collect();
        let classes: Vec<Option<&str>> = words.iter().map(|w| index.resolve_word(w)).collect();
        let folded = sentence.folded();
        let lex = self.lexicon;

        let class_before = |i: usize| {
            (0..i)
                .rev()
                .take(TARGET_WINDOW)
                .find_map(|j| classes[j].map(|c| (j, c)))
        };
        let class_after = |i: usize| {
            (i + 1..words.len())
                .take(TARGET_WINDOW)
                .find_map(|j| classes[j].map(|c| (j, c)))
        };
        let mut push = |source: &str, target: &str, kind, cardinality| {
            if source != target {
                out.push(SourcedRelationship::new(
                    source,
                    Relationship::new(kind, target, cardinality),
                    RelationshipLayer::Lexical,
                ));
            }
        };

        for cue in lex.inheritance_cues {
            let cue_words: Vec<&str> = cue.split_whitespace().collect();
            for i in 0..words.len() {
                if words[i..].starts_with(&cue_words) {
                    let end = i + cue_words.len() - 1;
                    if let (Some((_, source)), Some((_, target))) = (class_before(i), class_after(end)) {
                        push(source, target, RelationshipKind::Inheritance, Cardinality::ONE_TO_ONE);
                    }
                }
            }
        }

        for (i, word) in words.iter().enumerate() {
            if classes[i].is_some() {
                continue;
            }
            let folded_word = fold(word);

            if lex.each_words.contains(&folded_word.as_str()) {
                let Some(source) = classes.get(i + 1).copied().flatten() else {
                    continue;
                };
                let has_verb = (i + 2..words.len())
                    .take(3)
                    .find(|&j| lex.verb_rule(words[j]).is_some_and(is_possessive));
                if let Some((j, target)) = has_verb.and_then(class_after) {
                    let cardinality = self.word_cardinality(&folded, &words, j, Cardinality::ONE_TO_MANY);
                    push(source, target, RelationshipKind::Composition, cardinality);
                }
                continue;
            }

            if let Some(rule) = lex.verb_rule(word) {
                if let (Some((_, source)), Some((j, target))) = (class_before(i), class_after(i)) {
                    let cardinality = self.word_cardinality(&folded, &words, j, rule.cardinality);
                    push(source, target, rule.kind, cardinality);
                }
                continue;
            }

            if lex.of_connectors.contains(&folded_word.as_str()) && i > 0 {
                let Some(source) = classes[i - 1] else {
                    continue;
                };
                let mut j = i + 1;
                if words.get(j).is_some_and(|w| lex.is_determiner(w)) {
                    j += 1;
                }
                if let Some(target) = classes.get(j).copied().flatten() {
                    push(source, target, RelationshipKind::Association, Cardinality::MANY_TO_ONE);
                }
            }
        }
    }

    /// Person-like classes get a `control` edge (when any management verb
    /// occurs) or an `association` edge toward every other class, `1..n`.
    /// Without any person-like class the first class links to the rest.
    fn domain_rule(&self, class_names: &[String], doc: &AnnotatedDocument, out: &mut Vec<SourcedRelationship>) {
        let lex = self.lexicon;
        let managed = doc.tokens().any(|t| lex.is_management_verb(&t.text));
        let kind = if managed {
            RelationshipKind::Control
        } else {
            RelationshipKind::Association
        };

        let persons: Vec<&String> = class_names.iter().filter(|c| lex.is_person(c)).collect();
        let sources: Vec<&String> = if persons.is_empty() {
            class_names.iter().take(1).collect()
        } else {
            persons
        };

        for source in &sources {
            for target in class_names {
                if sources.contains(&target) {
                    continue;
                }
                out.push(SourcedRelationship::new(
                    source.as_str(),
                    Relationship::new(kind, target.clone(), Cardinality::ONE_TO_MANY),
                    RelationshipLayer::DomainRule,
                ));
            }
        }
    }

    /// Digit right before the target, then a quantifier phrase in the
    /// sentence, then the default.
    fn cardinality(&self, folded: &str, tokens: &[Token], target: usize, default: Cardinality) -> Cardinality {
        let digit = tokens[..target]
            .iter()
            .rev()
            .find(|t| t.pos != PartOfSpeech::Adjective)
            .filter(|t| t.pos == PartOfSpeech::Numeral)
            .and_then(|t| t.text.parse().ok());
        self.resolve_cardinality(folded, digit, default)
    }

    fn word_cardinality(&self, folded: &str, words: &[&str], target: usize, default: Cardinality) -> Cardinality {
        let digit = target
            .checked_sub(1)
            .and_then(|i| words[i].parse().ok());
        self.resolve_cardinality(folded, digit, default)
    }

    fn resolve_cardinality(&self, folded: &str, digit: Option<u32>, default: Cardinality) -> Cardinality {
        if let Some(n) = digit {
            return Cardinality::up_to(n);
        }
        self.lexicon.quantifier_in(folded).unwrap_or(default)
    }
}

fn is_possessive(rule: &VerbRule) -> bool {
    rule.kind == RelationshipKind::Composition
}

/// Keeps the first of: a `(source, target, kind)` triple, its exact
/// reverse, and any second edge for the same ordered pair.
fn deduplicate(found: Vec<SourcedRelationship>) -> Vec<SourcedRelationship> {
    let mut seen_triples: HashSet<(String, String, RelationshipKind)> = HashSet::new();
    let mut seen_pairs: HashSet<(String, String)> = HashSet::new();
    let mut unique = Vec::new();

    for rel in found {
        let source = fold(&rel.source);
        let target = fold(rel.target());
        let triple = (source.clone(), target.clone(), rel.kind());
        let reverse = (target.clone(), source.clone(), rel.kind());
        if seen_triples.contains(&triple)
            || seen_triples.contains(&reverse)
            || seen_pairs.contains(&(source.clone(), target.clone()))
        {
            continue;
        }
        seen_triples.insert(triple);
        seen_pairs.insert((source, target));
        unique.push(rel);
    }
    unique
}

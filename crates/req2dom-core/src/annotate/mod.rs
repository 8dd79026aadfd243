mod pattern;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::text::fold;

pub use pattern::PatternAnnotator;

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("Annotator unavailable: {0}")]
    Unavailable(String),
    #[error("Annotation failed: {0}")]
    Failed(String),
}

pub type AnnotationResult<T> = Result<T, AnnotationError>;

/// Universal part-of-speech tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartOfSpeech {
    Noun,
    ProperNoun,
    Verb,
    Auxiliary,
    Adjective,
    Determiner,
    Adposition,
    Conjunction,
    Pronoun,
    Adverb,
    Numeral,
    Punctuation,
    Other,
}

impl PartOfSpeech {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Noun => "NOUN",
            Self::ProperNoun => "PROPN",
            Self::Verb => "VERB",
            Self::Auxiliary => "AUX",
            Self::Adjective => "ADJ",
            Self::Determiner => "DET",
            Self::Adposition => "ADP",
            Self::Conjunction => "CCONJ",
            Self::Pronoun => "PRON",
            Self::Adverb => "ADV",
            Self::Numeral => "NUM",
            Self::Punctuation => "PUNCT",
            Self::Other => "X",
        }
    }

    pub fn is_nominal(&self) -> bool {
        matches!(self, Self::Noun | Self::ProperNoun)
    }
}

/// Universal dependency relations, reduced to what extraction reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyRole {
    Root,
    Subject,
    Object,
    IndirectObject,
    Oblique,
    NominalModifier,
    Conjunct,
    Determiner,
    AdjectivalModifier,
    Auxiliary,
    Case,
    Punctuation,
    Other,
}

impl DependencyRole {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Subject => "nsubj",
            Self::Object => "obj",
            Self::IndirectObject => "iobj",
            Self::Oblique => "obl",
            Self::NominalModifier => "nmod",
            Self::Conjunct => "conj",
            Self::Determiner => "det",
            Self::AdjectivalModifier => "amod",
            Self::Auxiliary => "aux",
            Self::Case => "case",
            Self::Punctuation => "punct",
            Self::Other => "dep",
        }
    }

    /// Roles that mark a noun as a participant rather than a modifier.
    pub fn is_important(&self) -> bool {
        matches!(
            self,
            Self::Root | Self::Subject | Self::Object | Self::IndirectObject
        )
    }

    pub fn is_modifier(&self) -> bool {
        matches!(self, Self::Determiner | Self::AdjectivalModifier)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub lemma: String,
    pub pos: PartOfSpeech,
    pub dep: DependencyRole,
    /// Index of the head token within the sentence; `None` for the root.
    pub head: Option<usize>,
}

impl Token {
    #[must_use]
    pub fn new(text: impl Into<String>, lemma: impl Into<String>, pos: PartOfSpeech) -> Self {
        Self {
            text: text.into(),
            lemma: lemma.into(),
            pos,
            dep: DependencyRole::Other,
            head: None,
        }
    }

    #[must_use]
    pub fn with_dep(mut self, dep: DependencyRole, head: Option<usize>) -> Self {
        self.dep = dep;
        self.head = head;
        self
    }

    pub fn folded_lemma(&self) -> String {
        fold(&self.lemma)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityLabel {
    Person,
    Organization,
    Product,
    Other,
}

/// Named-entity span over token indices `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    pub label: EntityLabel,
    pub start: usize,
    pub end: usize,
}

impl EntitySpan {
    pub fn is_class_like(&self) -> bool {
        matches!(
            self.label,
            EntityLabel::Person | EntityLabel::Organization | EntityLabel::Product
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub text: String,
    pub tokens: Vec<Token>,
    pub entities: Vec<EntitySpan>,
}

impl Sentence {
    #[must_use]
    pub fn new(text: impl Into<String>, tokens: Vec<Token>) -> Self {
        Self {
            text: text.into(),
            tokens,
            entities: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_entities(mut self, entities: Vec<EntitySpan>) -> Self {
        self.entities = entities;
        self
    }

    pub fn root(&self) -> Option<usize> {
        self.tokens
            .iter()
            .position(|t| t.dep == DependencyRole::Root)
    }

    /// Tokens whose head is `index`.
    pub fn dependents(&self, index: usize) -> impl Iterator<Item = (usize, &Token)> {
        self.tokens
            .iter()
            .enumerate()
            .filter(move |(_, t)| t.head == Some(index))
    }

    pub fn folded(&self) -> String {
        fold(&self.text)
    }
}

/// Read-only linguistic view of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedDocument {
    pub sentences: Vec<Sentence>,
}

impl AnnotatedDocument {
    #[must_use]
    pub fn new(sentences: Vec<Sentence>) -> Self {
        Self { sentences }
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.sentences.iter().flat_map(|s| s.tokens.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.iter().all(|s| s.tokens.is_empty())
    }
}

/// Pluggable linguistic analysis: sentences, tokens, lemmas, tags,
/// dependencies and entity spans.
pub trait Annotator: Send + Sync {
    fn name(&self) -> &str;

    fn annotate(&self, text: &str) -> AnnotationResult<AnnotatedDocument>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence_navigation() {
        let sentence = Sentence::new(
            "clientes fazem pedidos",
            vec![
                Token::new("clientes", "cliente", PartOfSpeech::Noun)
                    .with_dep(DependencyRole::Subject, Some(1)),
                Token::new("fazem", "fazer", PartOfSpeech::Verb).with_dep(DependencyRole::Root, None),
                Token::new("pedidos", "pedido", PartOfSpeech::Noun)
                    .with_dep(DependencyRole::Object, Some(1)),
            ],
        );

        assert_eq!(sentence.root(), Some(1));
        let deps: Vec<_> = sentence.dependents(1).map(|(i, _)| i).collect();
        assert_eq!(deps, vec![0, 2]);
    }

    #[test]
    fn test_role_classes() {
        assert!(DependencyRole::Subject.is_important());
        assert!(!DependencyRole::NominalModifier.is_important());
        assert!(DependencyRole::AdjectivalModifier.is_modifier());
        assert_eq!(DependencyRole::Object.as_str(), "obj");
        assert_eq!(PartOfSpeech::ProperNoun.as_str(), "PROPN");
    }
}

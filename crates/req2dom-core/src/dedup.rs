use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lexicon::Lexicon;
use crate::model::{ClassEntity, DomainModel, Relationship};
use crate::text::fold;

/// Shorter names must cover this share of the longer one to count as a
/// substring overlap ("Produto" / "Produtos" yes, "Item" / "ItemPedido" no).
const SUBSTRING_COVERAGE: f64 = 0.75;
const SUBSTRING_SCORE: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    ExactMatch,
    FuzzyMatch,
}

impl ResolutionStrategy {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExactMatch => "exact_match",
            Self::FuzzyMatch => "fuzzy_match",
        }
    }
}

/// Decides whether two class names denote the same class.
pub trait NameResolver: Send + Sync {
    fn strategy(&self) -> ResolutionStrategy;

    fn similarity_score(&self, a: &str, b: &str) -> f64;

    /// Index of the best match for `name` among `existing`. An exact
    /// case-insensitive hit always wins.
    fn find_match(&self, name: &str, existing: &[String]) -> Option<usize>;
}

pub struct ExactMatchResolver;

impl NameResolver for ExactMatchResolver {
    fn strategy(&self) -> ResolutionStrategy {
        ResolutionStrategy::ExactMatch
    }

    fn similarity_score(&self, a: &str, b: &str) -> f64 {
        if fold(a) == fold(b) {
            1.0
        } else {
            0.0
        }
    }

    fn find_match(&self, name: &str, existing: &[String]) -> Option<usize> {
        let key = fold(name);
        existing.iter().position(|n| fold(n) == key)
    }
}

/// Singular/plural forms, substring overlaps and close spellings.
pub struct FuzzyMatchResolver {
    lexicon: &'static Lexicon,
    threshold: f64,
}

impl FuzzyMatchResolver {
    #[must_use]
    pub fn new(lexicon: &'static Lexicon, threshold: f64) -> Self {
        Self { lexicon, threshold }
    }

    fn key(&self, name: &str) -> String {
        fold(&self.lexicon.singularize(&name.to_lowercase()))
    }
}

impl NameResolver for FuzzyMatchResolver {
    fn strategy(&self) -> ResolutionStrategy {
        ResolutionStrategy::FuzzyMatch
    }

    #[allow(clippy::cast_precision_loss)]
    fn similarity_score(&self, a: &str, b: &str) -> f64 {
        let (a, b) = (self.key(a), self.key(b));
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        if a == b {
            return 1.0;
        }

        let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
        if long.contains(short.as_str())
            && short.chars().count() as f64 / long.chars().count() as f64 >= SUBSTRING_COVERAGE
        {
            return SUBSTRING_SCORE;
        }

        strsim::normalized_levenshtein(&a, &b)
    }

    fn find_match(&self, name: &str, existing: &[String]) -> Option<usize> {
        let exact = fold(name);
        if let Some(index) = existing.iter().position(|n| fold(n) == exact) {
            return Some(index);
        }

        let mut best: Option<(usize, f64)> = None;
        for (index, candidate) in existing.iter().enumerate() {
            let score = self.similarity_score(name, candidate);
            if score >= self.threshold && best.map_or(true, |(_, s)| score > s) {
                best = Some((index, score));
            }
        }
        best.map(|(index, _)| index)
    }
}

/// Collapses near-duplicate classes, attributes and relationships into a
/// canonical set. Running it on its own output changes nothing.
pub struct Deduplicator {
    resolver: Box<dyn NameResolver>,
}

impl Deduplicator {
    #[must_use]
    pub fn new(resolver: Box<dyn NameResolver>) -> Self {
        Self { resolver }
    }

    #[must_use]
    pub fn fuzzy(lexicon: &'static Lexicon, threshold: f64) -> Self {
        Self::new(Box::new(FuzzyMatchResolver::new(lexicon, threshold)))
    }

    pub fn resolver(&self) -> &dyn NameResolver {
        self.resolver.as_ref()
    }

    pub fn deduplicate(&self, model: DomainModel) -> DomainModel {
        let before = model.len();
        let mut kept: Vec<ClassEntity> = Vec::with_capacity(model.len());
        let mut names: Vec<String> = Vec::with_capacity(model.len());

        // first-seen name is canonical; later aliases fold into it
        for mut class in model.classes {
            match self.resolver.find_match(&class.name, &names) {
                Some(index) => {
                    let canonical = &mut kept[index];
                    debug!(alias = %class.name, canonical = %canonical.name, "Merging duplicate class");
                    for attribute in class.attributes {
                        canonical.push_attribute(attribute);
                    }
                    canonical.relationships.extend(class.relationships);
                }
                None => {
                    for attribute in std::mem::take(&mut class.attributes) {
                        class.push_attribute(attribute);
                    }
                    names.push(class.name.clone());
                    kept.push(class);
                }
            }
        }

        let mut seen: HashSet<(String, String, &'static str)> = HashSet::new();

        for class in &mut kept {
            let relationships = std::mem::take(&mut class.relationships);
            for mut relationship in relationships {
                if let Some(index) = self.resolver.find_match(&relationship.target, &names) {
                    relationship.target.clone_from(&names[index]);
                }
                if fold(&relationship.target) == fold(&class.name) || relationship.target.trim().is_empty() {
                    continue;
                }
                if Self::is_duplicate(&mut seen, &class.name, &relationship) {
                    continue;
                }
                class.relationships.push(relationship);
            }
        }

        if kept.len() < before {
            debug!(before, after = kept.len(), "Deduplicated classes");
        }
        DomainModel { classes: kept }
    }

    fn is_duplicate(
        seen: &mut HashSet<(String, String, &'static str)>,
        source: &str,
        relationship: &Relationship,
    ) -> bool {
        let source = fold(source);
        let target = fold(&relationship.target);
        let kind = relationship.kind.as_str();
        if seen.contains(&(target.clone(), source.clone(), kind)) {
            return true;
        }
        !seen.insert((source, target, kind))
    }
}

impl std::fmt::Debug for Deduplicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deduplicator")
            .field("strategy", &self.resolver.strategy().as_str())
            .finish()
    }
}

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::lexicon::Lexicon;

/// Enumeration marker: an upper-case code, a sequence number and a
/// separator, as in `RF03.` or `RNF12:`.
static MARKER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{2,4})(\d+)\s*[.:)\-]").ok());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementUnit {
    /// Marker code without its number, e.g. `RF`
    pub code: Option<String>,
    /// Sequence number as written, e.g. `03`
    pub sequence: Option<String>,
    pub text: String,
}

impl RequirementUnit {
    #[must_use]
    pub fn unlabeled(text: impl Into<String>) -> Self {
        Self {
            code: None,
            sequence: None,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn labeled(code: impl Into<String>, sequence: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            sequence: Some(sequence.into()),
            text: text.into(),
        }
    }

    /// `Requisito 03` for labeled units.
    pub fn label(&self, lexicon: &Lexicon) -> Option<String> {
        self.sequence
            .as_ref()
            .map(|seq| format!("{} {seq}", lexicon.requirement_label))
    }

    pub fn is_labeled(&self) -> bool {
        self.sequence.is_some()
    }
}

/// Ordered requirement units; immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementDocument {
    units: Vec<RequirementUnit>,
}

impl RequirementDocument {
    #[must_use]
    pub fn new(units: Vec<RequirementUnit>) -> Self {
        Self { units }
    }

    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(vec![RequirementUnit::unlabeled(text)])
    }

    pub fn units(&self) -> &[RequirementUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.iter().all(|u| u.text.trim().is_empty())
    }

    pub fn labeled_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_labeled()).count()
    }

    /// Unit texts without labels, one per line. This is what the
    /// heuristic stages read, so labels never surface as candidates.
    pub fn analysis_text(&self) -> String {
        self.units
            .iter()
            .map(|u| u.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Human-readable form: each labeled unit prefixed by its ordinal
    /// label. A document without markers renders as its original text.
    pub fn render(&self, lexicon: &Lexicon) -> String {
        self.units
            .iter()
            .map(|u| match u.label(lexicon) {
                Some(label) => format!("{label}: {}", u.text),
                None => u.text.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Splits a document into requirement units at enumeration markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer;

impl TextNormalizer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Never fails. Text before the first marker becomes an unlabeled
    /// unit; without any marker the whole input is one unlabeled unit.
    pub fn normalize(&self, text: &str) -> RequirementDocument {
        let Some(marker) = MARKER.as_ref() else {
            return RequirementDocument::from_text(text);
        };

        let matches: Vec<_> = marker.captures_iter(text).collect();
        if matches.is_empty() {
            return RequirementDocument::from_text(text);
        }

        let mut units = Vec::with_capacity(matches.len() + 1);

        let first_start = matches[0].get(0).map_or(0, |m| m.start());
        let preamble = text[..first_start].trim();
        if !preamble.is_empty() {
            units.push(RequirementUnit::unlabeled(preamble));
        }

        for (i, caps) in matches.iter().enumerate() {
            let (Some(whole), Some(code), Some(seq)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            let end = matches
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(text.len(), |m| m.start());
            let body = collapse_whitespace(&text[whole.end()..end]);
            units.push(RequirementUnit::labeled(code.as_str(), seq.as_str(), body));
        }

        tracing::debug!(units = units.len(), "Normalized requirement document");
        RequirementDocument::new(units)
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

use crate::annotate::{AnnotatedDocument, PartOfSpeech, Sentence, Token};
use crate::lexicon::{EntityCategory, Lexicon};
use crate::model::{Attribute, AttributeType};
use crate::text::{camel_case, fold, identifier_parts};

const CONTEXT_LIMIT: usize = 2;
const MAX_PHRASE_WORDS: usize = 3;

/// Matched as substrings of the folded name.
const DATE_TOKENS: &[&str] = &["date", "data", "birth", "nascimento", "year"];
const TIME_TOKENS: &[&str] = &["time", "hora", "horario"];
const DOUBLE_TOKENS: &[&str] = &[
    "price", "preco", "cost", "custo", "value", "valor", "salary", "salario", "amount",
    "montante", "saldo", "balance",
];
const INTEGER_TOKENS: &[&str] = &[
    "quantity", "quantidade", "number", "numero", "count", "contagem",
];
const BOOLEAN_TOKENS: &[&str] = &[
    "active", "ativo", "available", "disponivel", "approved", "aprovado", "enabled",
];
/// Matched against whole identifier parts only.
const DATE_PARTS: &[&str] = &["ano", "dt"];
const INTEGER_PARTS: &[&str] = &["id", "age", "idade", "qtd", "num", "nr"];

/// Substring type rules for free-form attribute names.
#[must_use]
pub fn infer_type(name: &str) -> AttributeType {
    let folded = fold(name);
    let parts = identifier_parts(name);
    let has = |tokens: &[&str]| tokens.iter().any(|t| folded.contains(t));
    let has_part = |tokens: &[&str]| parts.iter().any(|p| tokens.contains(&p.as_str()));

    let date = has(DATE_TOKENS) || has_part(DATE_PARTS);
    let time = has(TIME_TOKENS);

    if folded.contains("timestamp") || (date && time) {
        AttributeType::DateTime
    } else if date {
        AttributeType::Date
    } else if has(DOUBLE_TOKENS) {
        AttributeType::Double
    } else if has(INTEGER_TOKENS) || has_part(INTEGER_PARTS) {
        AttributeType::Integer
    } else if has(BOOLEAN_TOKENS) {
        AttributeType::Boolean
    } else if time {
        AttributeType::Time
    } else {
        AttributeType::String
    }
}

/// Builds the typed attribute list for one entity.
pub struct AttributeInference {
    lexicon: &'static Lexicon,
    max_attributes: usize,
}

impl AttributeInference {
    #[must_use]
    pub fn new(lexicon: &'static Lexicon) -> Self {
        Self {
            lexicon,
            max_attributes: 8,
        }
    }

    #[must_use]
    pub fn with_max_attributes(mut self, max: usize) -> Self {
        self.max_attributes = max;
        self
    }

    /// Basic attributes first, then names enumerated for the entity in
    /// the text, then the entity category's attributes. Generic entities
    /// also pick up to two contextual keywords from sentences mentioning
    /// them. Deduplicated by name, case-insensitively, and capped.
    pub fn infer(&self, entity_name: &str, doc: &AnnotatedDocument) -> Vec<Attribute> {
        let lex = self.lexicon;
        let key = self.entity_key(entity_name);
        let mentioning: Vec<&Sentence> = doc
            .sentences
            .iter()
            .filter(|s| mentions(s, &key))
            .collect();

        let mut attributes: Vec<Attribute> = Vec::new();
        let push = |attributes: &mut Vec<Attribute>, attribute: Attribute| {
            if !attributes
                .iter()
                .any(|a| a.name.eq_ignore_ascii_case(&attribute.name))
            {
                attributes.push(attribute);
            }
        };

        for (name, ty) in lex.basic_attributes {
            push(&mut attributes, Attribute::new(*name, *ty));
        }

        for sentence in &mentioning {
            for attribute in self.enumerated(sentence, &key) {
                push(&mut attributes, attribute);
            }
        }

        let category = lex.category_of(entity_name);
        for (name, ty) in lex.category_attributes(category) {
            push(&mut attributes, Attribute::new(*name, *ty));
        }

        if category == EntityCategory::Generic {
            let mut added = 0;
            for token in mentioning.iter().flat_map(|s| s.tokens.iter()) {
                if added >= CONTEXT_LIMIT {
                    break;
                }
                let Some(ty) = lex.context_type(&token.lemma) else {
                    continue;
                };
                let name = camel_case(&token.lemma);
                if !attributes.iter().any(|a| a.name.eq_ignore_ascii_case(&name)) {
                    push(&mut attributes, Attribute::new(name, ty));
                    added += 1;
                }
            }
        }

        attributes.truncate(self.max_attributes);
        attributes
    }

    fn entity_key(&self, entity_name: &str) -> String {
        fold(&self.lexicon.singularize(&entity_name.to_lowercase()))
    }

    fn type_of(&self, name: &str) -> AttributeType {
        self.lexicon
            .context_type(name)
            .unwrap_or_else(|| infer_type(name))
    }

    /// Attribute names listed after a possession or provision cue whose
    /// owner (the closest candidate noun before the cue) is the entity:
    /// "os produtos têm nome, descrição e preço".
    fn enumerated(&self, sentence: &Sentence, key: &str) -> Vec<Attribute> {
        let lex = self.lexicon;
        let tokens = &sentence.tokens;
        let mut found = Vec::new();

        for (cue, token) in tokens.iter().enumerate() {
            if !lex.is_list_cue(&token.text) || self.owner_before(tokens, cue).as_deref() != Some(key) {
                continue;
            }

            let mut phrase: Vec<&Token> = Vec::new();
            let mut items: Vec<Vec<&Token>> = Vec::new();
            for next in &tokens[cue + 1..] {
                let ends_item = next.text == "," || next.pos == PartOfSpeech::Conjunction;
                let ends_list = matches!(next.pos, PartOfSpeech::Verb | PartOfSpeech::Auxiliary)
                    || (next.pos == PartOfSpeech::Punctuation && !ends_item && next.text != ":");
                if ends_item || ends_list {
                    if !phrase.is_empty() {
                        items.push(std::mem::take(&mut phrase));
                    }
                    if ends_list {
                        break;
                    }
                    continue;
                }
                if matches!(next.pos, PartOfSpeech::Determiner | PartOfSpeech::Punctuation) {
                    continue;
                }
                phrase.push(next);
            }
            if !phrase.is_empty() {
                items.push(phrase);
            }

            for item in items {
                if let Some(attribute) = self.item_attribute(&item) {
                    found.push(attribute);
                }
            }
        }
        found
    }

    fn item_attribute(&self, item: &[&Token]) -> Option<Attribute> {
        let lex = self.lexicon;
        let head = item.iter().find(|t| t.pos.is_nominal())?;
        if item.len() > MAX_PHRASE_WORDS {
            return None;
        }
        // another entity, not an attribute of this one
        if lex.is_vocabulary(&head.lemma) && !lex.is_attribute_word(&head.lemma) {
            return None;
        }
        let phrase = item
            .iter()
            .map(|t| {
                if t.pos.is_nominal() {
                    t.lemma.as_str()
                } else {
                    t.text.as_str()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        let name = camel_case(&phrase);
        if name.chars().count() < 2 {
            return None;
        }
        let ty = self.type_of(&name);
        Some(Attribute::new(name, ty))
    }

    /// Folded lemma of the closest nominal before `cue` that could name a
    /// class.
    fn owner_before(&self, tokens: &[Token], cue: usize) -> Option<String> {
        tokens[..cue]
            .iter()
            .rev()
            .find(|t| t.pos.is_nominal() && !self.lexicon.is_attribute_word(&t.lemma))
            .map(Token::folded_lemma)
    }
}

fn mentions(sentence: &Sentence, key: &str) -> bool {
    sentence.tokens.iter().any(|t| t.folded_lemma() == key) || sentence.folded().contains(key)
}

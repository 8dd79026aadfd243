use super::{
    AnnotatedDocument, AnnotationResult, Annotator, DependencyRole, EntityLabel, EntitySpan,
    PartOfSpeech, Sentence, Token,
};
use crate::lexicon::{EntityCategory, Lexicon, Locale};
use crate::text::fold;

const CLITICS: &[&str] = &["se", "lo", "la", "los", "las", "me", "te", "lhe", "lhes", "nos"];

/// Lexicon-driven annotator: no model files, no external process.
///
/// Tags come from closed-class word lists and a little morphology, and
/// dependencies are approximated positionally: the last nominal before
/// the main verb is its subject, the first nominal after a verb is that
/// verb's object, enumerated nominals are conjuncts of the first one and
/// nominals introduced by a preposition modify the preceding nominal.
pub struct PatternAnnotator {
    lexicon: &'static Lexicon,
}

impl PatternAnnotator {
    #[must_use]
    pub fn new(locale: Locale) -> Self {
        Self {
            lexicon: locale.lexicon(),
        }
    }

    #[must_use]
    pub fn lexicon(&self) -> &'static Lexicon {
        self.lexicon
    }

    fn annotate_sentence(&self, text: &str) -> Sentence {
        let words = tokenize(text);
        let mut tokens = self.tag(&words);
        attach(&mut tokens);
        let entities = self.entities(&tokens);
        Sentence::new(text, tokens).with_entities(entities)
    }

    fn tag(&self, words: &[String]) -> Vec<Token> {
        let lex = self.lexicon;
        let first_word = words
            .iter()
            .position(|w| w.chars().any(char::is_alphabetic));
        let mut tokens: Vec<Token> = Vec::with_capacity(words.len());

        for (i, word) in words.iter().enumerate() {
            let lower = word.to_lowercase();
            let (base, has_clitic) = split_clitic(&lower);
            let prev = tokens.last().map(|t| t.pos);
            let pos = self.part_of_speech(word, base, has_clitic, prev, Some(i) == first_word);

            let lemma = match pos {
                PartOfSpeech::Noun | PartOfSpeech::ProperNoun => lex.singularize(base),
                PartOfSpeech::Verb => lex
                    .verb_rule(base)
                    .map_or_else(|| base.to_string(), |rule| rule.lemma().to_string()),
                _ => base.to_string(),
            };
            tokens.push(Token::new(word.clone(), lemma, pos));
        }
        tokens
    }

    fn part_of_speech(
        &self,
        word: &str,
        base: &str,
        has_clitic: bool,
        prev: Option<PartOfSpeech>,
        sentence_initial: bool,
    ) -> PartOfSpeech {
        use PartOfSpeech as P;
        let lex = self.lexicon;

        if !word.chars().any(char::is_alphanumeric) {
            return P::Punctuation;
        }
        if word.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
            return P::Numeral;
        }
        if has_clitic {
            return P::Verb;
        }
        if lex.is_auxiliary(base) {
            return P::Auxiliary;
        }
        if lex.is_determiner(base) {
            return P::Determiner;
        }
        if lex.is_preposition(base) {
            return P::Adposition;
        }
        if lex.is_conjunction(base) {
            return P::Conjunction;
        }
        if lex.is_pronoun(base) {
            return P::Pronoun;
        }
        if lex.is_adverb(base) {
            return P::Adverb;
        }

        let singular = lex.singularize(base);
        let nominal_context = matches!(prev, Some(P::Determiner | P::Adposition | P::Adjective));
        let nounish = lex.is_vocabulary(&singular) || lex.is_attribute_word(&singular);

        if lex.is_known_verb(base) && !nominal_context && !(prev == Some(P::Verb) && nounish) {
            return P::Verb;
        }
        if nounish {
            return P::Noun;
        }
        if lex.is_adjective(base) {
            return P::Adjective;
        }
        if self.looks_verbal(base, prev) {
            return P::Verb;
        }
        if !sentence_initial && word.chars().next().is_some_and(char::is_uppercase) {
            return P::ProperNoun;
        }
        if word.chars().any(char::is_alphabetic) {
            P::Noun
        } else {
            P::Other
        }
    }

    fn looks_verbal(&self, base: &str, prev: Option<PartOfSpeech>) -> bool {
        let folded = fold(base);
        let long = folded.chars().count() >= 5;
        let after_verbal = matches!(
            prev,
            Some(PartOfSpeech::Auxiliary | PartOfSpeech::Verb | PartOfSpeech::Adposition)
        );
        match self.lexicon.locale {
            Locale::Portuguese => {
                (long && folded.ends_with("ndo"))
                    || (long
                        && after_verbal
                        && ["ar", "er", "ir"].iter().any(|s| folded.ends_with(s)))
            }
            Locale::English => {
                prev == Some(PartOfSpeech::Auxiliary) || (long && folded.ends_with("ing"))
            }
        }
    }

    /// Runs of proper nouns, labelled by lexical category.
    fn entities(&self, tokens: &[Token]) -> Vec<EntitySpan> {
        let mut spans = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            if tokens[i].pos != PartOfSpeech::ProperNoun {
                i += 1;
                continue;
            }
            let start = i;
            while i < tokens.len() && tokens[i].pos == PartOfSpeech::ProperNoun {
                i += 1;
            }
            let text = tokens[start..i]
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let label = match self.lexicon.category_of(&text) {
                EntityCategory::Person => EntityLabel::Person,
                EntityCategory::Product => EntityLabel::Product,
                _ => EntityLabel::Organization,
            };
            spans.push(EntitySpan {
                text,
                label,
                start,
                end: i,
            });
        }
        spans
    }
}

impl Default for PatternAnnotator {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

impl Annotator for PatternAnnotator {
    fn name(&self) -> &str {
        "pattern"
    }

    fn annotate(&self, text: &str) -> AnnotationResult<AnnotatedDocument> {
        let sentences = split_sentences(text)
            .iter()
            .map(|s| self.annotate_sentence(s))
            .collect();
        Ok(AnnotatedDocument::new(sentences))
    }
}

fn split_clitic(lower: &str) -> (&str, bool) {
    match lower.rsplit_once('-') {
        Some((base, clitic)) if CLITICS.contains(&clitic) && !base.is_empty() => (base, true),
        _ => (lower, false),
    }
}

fn split_sentences(text: &str) -> Vec<String> {
    fn flush(out: &mut Vec<String>, current: &mut String) {
        let trimmed = current.trim();
        if trimmed.chars().any(char::is_alphanumeric) {
            out.push(trimmed.to_string());
        }
        current.clear();
    }

    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' || c == '\r' {
            flush(&mut sentences, &mut current);
            continue;
        }
        current.push(c);
        if matches!(c, '.' | '!' | '?' | ';') && chars.peek().is_none_or(|n| n.is_whitespace()) {
            flush(&mut sentences, &mut current);
        }
    }
    flush(&mut sentences, &mut current);
    sentences
}

fn tokenize(sentence: &str) -> Vec<String> {
    let chars: Vec<char> = sentence.chars().collect();
    let mut tokens = Vec::new();
    let mut word = String::new();

    for (i, &c) in chars.iter().enumerate() {
        let next_alnum = chars.get(i + 1).is_some_and(|n| n.is_alphanumeric());
        let joins_word = !word.is_empty()
            && next_alnum
            && (c == '-' || c == '\'' || (c == '.' && word.chars().all(|w| w.is_ascii_digit())));

        if c.is_alphanumeric() || joins_word {
            word.push(c);
            continue;
        }
        if !word.is_empty() {
            tokens.push(std::mem::take(&mut word));
        }
        if !c.is_whitespace() {
            tokens.push(c.to_string());
        }
    }
    if !word.is_empty() {
        tokens.push(word);
    }
    tokens
}

fn next_nominal(tokens: &[Token], from: usize) -> Option<usize> {
    tokens
        .iter()
        .enumerate()
        .skip(from + 1)
        .take_while(|(_, t)| t.pos != PartOfSpeech::Verb && t.pos != PartOfSpeech::Punctuation)
        .find(|(_, t)| t.pos.is_nominal())
        .map(|(i, _)| i)
}

fn is_list_separator(token: &Token) -> bool {
    token.pos == PartOfSpeech::Conjunction || token.text == ","
}

/// Index of the closest token before `i` that is not a determiner or
/// adjective.
fn previous_content(tokens: &[Token], i: usize) -> Option<usize> {
    (0..i).rev().find(|&j| {
        !matches!(
            tokens[j].pos,
            PartOfSpeech::Determiner | PartOfSpeech::Adjective
        )
    })
}

fn attach(tokens: &mut [Token]) {
    use DependencyRole as D;
    use PartOfSpeech as P;

    let root = tokens
        .iter()
        .position(|t| t.pos == P::Verb)
        .or_else(|| tokens.iter().position(|t| t.pos == P::Auxiliary))
        .or_else(|| tokens.iter().position(|t| t.pos.is_nominal()));
    let Some(root) = root else {
        return;
    };
    tokens[root].dep = D::Root;
    tokens[root].head = None;

    for i in 0..tokens.len() {
        if i == root {
            continue;
        }
        let (dep, head) = match tokens[i].pos {
            P::Determiner => (D::Determiner, next_nominal(tokens, i)),
            P::Adposition => (D::Case, next_nominal(tokens, i)),
            P::Adjective => {
                let prev_nominal = i
                    .checked_sub(1)
                    .filter(|&j| tokens[j].pos.is_nominal());
                (
                    D::AdjectivalModifier,
                    prev_nominal.or_else(|| next_nominal(tokens, i)),
                )
            }
            P::Auxiliary => (D::Auxiliary, Some(root)),
            P::Punctuation => (D::Punctuation, Some(root)),
            _ => (D::Other, Some(root)),
        };
        tokens[i].dep = dep;
        tokens[i].head = head.or(Some(root));
    }

    let has_case = |tokens: &[Token], i: usize| {
        tokens
            .iter()
            .any(|t| t.dep == D::Case && t.head == Some(i))
    };

    let subject = (0..root)
        .filter(|&i| {
            (tokens[i].pos.is_nominal() || tokens[i].pos == P::Pronoun) && !has_case(tokens, i)
        })
        .last();

    let mut governor = root;
    let mut governed_with_object: Vec<usize> = Vec::new();
    let mut list_head: Option<usize> = None;
    let mut last_nominal: Option<usize> = None;

    for i in 0..tokens.len() {
        let pos = tokens[i].pos;
        if pos == P::Verb {
            if i >= root {
                governor = i;
            }
            list_head = None;
            continue;
        }
        if pos == P::Punctuation && tokens[i].text != "," {
            list_head = None;
            continue;
        }
        if i == root || !(pos.is_nominal() || pos == P::Pronoun) {
            continue;
        }

        let in_list = list_head.is_some()
            && previous_content(tokens, i).is_some_and(|j| is_list_separator(&tokens[j]));

        let (dep, head) = if in_list {
            (D::Conjunct, list_head)
        } else if has_case(tokens, i) {
            match last_nominal {
                Some(n) => (D::NominalModifier, Some(n)),
                None => (D::Oblique, Some(governor)),
            }
        } else if i < root {
            if Some(i) == subject {
                (D::Subject, Some(root))
            } else {
                (D::Other, Some(root))
            }
        } else if governed_with_object.contains(&governor) {
            (D::Other, Some(governor))
        } else {
            governed_with_object.push(governor);
            (D::Object, Some(governor))
        };

        tokens[i].dep = dep;
        tokens[i].head = head;
        if !in_list {
            list_head = Some(i);
        }
        last_nominal = Some(i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(locale: Locale, text: &str) -> Sentence {
        let doc = PatternAnnotator::new(locale).annotate(text).unwrap();
        assert_eq!(doc.sentences.len(), 1, "expected one sentence in {text:?}");
        doc.sentences.into_iter().next().unwrap()
    }

    fn find<'a>(s: &'a Sentence, text: &str) -> &'a Token {
        s.tokens.iter().find(|t| t.text == text).unwrap()
    }

    #[test]
    fn test_sentence_split() {
        let sentences = split_sentences("O cliente faz pedidos. O preço é 2.5 euros!\nNova linha");
        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[1], "O preço é 2.5 euros!");
    }

    #[test]
    fn test_tokenize_keeps_hyphenated_words() {
        let tokens = tokenize("registar-se, fornecendo e-mail e 2.5.");
        assert_eq!(tokens, vec!["registar-se", ",", "fornecendo", "e-mail", "e", "2.5", "."]);
    }

    #[test]
    fn test_portuguese_subject_and_list() {
        let s = sentence(
            Locale::Portuguese,
            "O cliente deve poder registar-se fornecendo nome, email e telefone.",
        );

        let cliente = find(&s, "cliente");
        assert_eq!(cliente.pos, PartOfSpeech::Noun);
        assert_eq!(cliente.dep, DependencyRole::Subject);

        let root = s.root().unwrap();
        assert_eq!(s.tokens[root].text, "registar-se");
        assert_eq!(s.tokens[root].lemma, "registar");

        let nome_idx = s.tokens.iter().position(|t| t.text == "nome").unwrap();
        assert_eq!(s.tokens[nome_idx].dep, DependencyRole::Object);
        assert_eq!(find(&s, "email").dep, DependencyRole::Conjunct);
        assert_eq!(find(&s, "telefone").head, Some(nome_idx));
    }

    #[test]
    fn test_plural_lemmas_and_verb_rule() {
        let s = sentence(Locale::Portuguese, "Os produtos têm nome, descrição e preço.");
        let produtos = find(&s, "produtos");
        assert_eq!(produtos.lemma, "produto");
        assert_eq!(produtos.dep, DependencyRole::Subject);
        let tem = find(&s, "têm");
        assert_eq!(tem.pos, PartOfSpeech::Verb);
        assert_eq!(tem.dep, DependencyRole::Root);
    }

    #[test]
    fn test_determiner_makes_noun() {
        let s = sentence(Locale::Portuguese, "O cliente efetua a reserva do quarto.");
        assert_eq!(find(&s, "reserva").pos, PartOfSpeech::Noun);
        assert_eq!(find(&s, "reserva").dep, DependencyRole::Object);
        assert_eq!(find(&s, "quarto").dep, DependencyRole::NominalModifier);
    }

    #[test]
    fn test_english_object() {
        let s = sentence(Locale::English, "Each customer places orders.");
        assert_eq!(find(&s, "customer").dep, DependencyRole::Subject);
        assert_eq!(find(&s, "places").dep, DependencyRole::Root);
        assert_eq!(find(&s, "orders").lemma, "order");
        assert_eq!(find(&s, "orders").dep, DependencyRole::Object);
    }

    #[test]
    fn test_proper_noun_entities() {
        let s = sentence(Locale::English, "The customer contacts Acme Corp daily.");
        assert_eq!(s.entities.len(), 1);
        assert_eq!(s.entities[0].text, "Acme Corp");
        assert_eq!(s.entities[0].label, EntityLabel::Organization);
    }

    #[test]
    fn test_empty_text() {
        let doc = PatternAnnotator::default().annotate("  ").unwrap();
        assert!(doc.is_empty());
    }
}

//! Locale-specific word lists driving every heuristic stage.
//!
//! All lookups compare accent-folded lowercase forms, so list entries are
//! stored folded.

use serde::{Deserialize, Serialize};

use crate::model::{AttributeType, Cardinality, RelationshipKind};
use crate::text::fold;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Locale {
    #[default]
    Portuguese,
    English,
}

impl Locale {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Portuguese => "pt",
            Self::English => "en",
        }
    }

    #[must_use]
    pub fn lexicon(&self) -> &'static Lexicon {
        match self {
            Self::Portuguese => &PORTUGUESE,
            Self::English => &ENGLISH,
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Locale {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pt" | "pt-pt" | "pt-br" | "pt_pt" | "pt_br" | "portuguese" | "portugues" => {
                Ok(Self::Portuguese)
            }
            "en" | "en-us" | "en-gb" | "en_us" | "en_gb" | "english" => Ok(Self::English),
            _ => Err(crate::Error::InvalidLocale(s.to_string())),
        }
    }
}

impl TryFrom<String> for Locale {
    type Error = crate::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Locale> for String {
    fn from(l: Locale) -> Self {
        l.as_str().to_string()
    }
}

/// Coarse entity classification used by attribute inference and the
/// domain-rule relationship fallback. Variants are listed in priority
/// order: the first category whose word list matches a name wins, and
/// `Generic` is the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityCategory {
    Person,
    Product,
    Transaction,
    Education,
    Document,
    Generic,
}

impl EntityCategory {
    pub const PRIORITY: [Self; 5] = [
        Self::Person,
        Self::Product,
        Self::Transaction,
        Self::Education,
        Self::Document,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Product => "product",
            Self::Transaction => "transaction",
            Self::Education => "education",
            Self::Document => "document",
            Self::Generic => "generic",
        }
    }
}

/// A verb and its inflected forms mapped onto a relationship kind.
#[derive(Debug, Clone, Copy)]
pub struct VerbRule {
    pub forms: &'static [&'static str],
    pub kind: RelationshipKind,
    pub cardinality: Cardinality,
}

impl VerbRule {
    #[must_use]
    pub fn lemma(&self) -> &'static str {
        self.forms.first().copied().unwrap_or_default()
    }
}

type Typed = (&'static str, AttributeType);

#[derive(Debug)]
pub struct Lexicon {
    pub locale: Locale,
    pub requirement_label: &'static str,
    pub domain_vocabulary: &'static [&'static str],
    pub stop_words: &'static [&'static str],
    pub person: &'static [&'static str],
    pub product: &'static [&'static str],
    pub transaction: &'static [&'static str],
    pub education: &'static [&'static str],
    pub document: &'static [&'static str],
    pub basic_attributes: &'static [Typed],
    pub person_attributes: &'static [Typed],
    pub product_attributes: &'static [Typed],
    pub transaction_attributes: &'static [Typed],
    pub education_attributes: &'static [Typed],
    pub document_attributes: &'static [Typed],
    pub generic_attributes: &'static [Typed],
    pub context_keywords: &'static [Typed],
    /// Nouns that name attributes rather than classes.
    pub attribute_words: &'static [&'static str],
    pub verbs: &'static [VerbRule],
    pub management_verbs: &'static [&'static str],
    pub common_verbs: &'static [&'static str],
    pub auxiliaries: &'static [&'static str],
    pub copulas: &'static [&'static str],
    pub determiners: &'static [&'static str],
    pub prepositions: &'static [&'static str],
    pub conjunctions: &'static [&'static str],
    pub pronouns: &'static [&'static str],
    pub adverbs: &'static [&'static str],
    pub adjectives: &'static [&'static str],
    /// Words introducing an enumerated attribute list.
    pub list_cues: &'static [&'static str],
    pub of_connectors: &'static [&'static str],
    pub each_words: &'static [&'static str],
    /// Lowercase but not folded: folding "é" would collide with "e".
    pub inheritance_cues: &'static [&'static str],
    pub quantifiers: &'static [(&'static str, Cardinality)],
    pub fallback_entities: [&'static str; 2],
}

fn contains(list: &[&str], folded: &str) -> bool {
    list.iter().any(|w| *w == folded)
}

impl Lexicon {
    #[must_use]
    pub fn for_locale(locale: Locale) -> &'static Self {
        locale.lexicon()
    }

    pub fn is_vocabulary(&self, word: &str) -> bool {
        contains(self.domain_vocabulary, &fold(word))
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        contains(self.stop_words, &fold(word))
    }

    pub fn is_attribute_word(&self, word: &str) -> bool {
        let folded = fold(word);
        contains(self.attribute_words, &folded)
            || self.context_keywords.iter().any(|(k, _)| fold(k) == folded)
            || self.basic_attributes.iter().any(|(k, _)| fold(k) == folded)
    }

    pub fn is_person(&self, name: &str) -> bool {
        self.category_of(name) == EntityCategory::Person
    }

    /// First category (in priority order) whose word list occurs in the
    /// folded name.
    pub fn category_of(&self, name: &str) -> EntityCategory {
        let folded = fold(name);
        EntityCategory::PRIORITY
            .into_iter()
            .find(|category| {
                self.category_words(*category)
                    .iter()
                    .any(|w| folded.contains(*w))
            })
            .unwrap_or(EntityCategory::Generic)
    }

    #[must_use]
    pub fn category_words(&self, category: EntityCategory) -> &'static [&'static str] {
        match category {
            EntityCategory::Person => self.person,
            EntityCategory::Product => self.product,
            EntityCategory::Transaction => self.transaction,
            EntityCategory::Education => self.education,
            EntityCategory::Document => self.document,
            EntityCategory::Generic => &[],
        }
    }

    #[must_use]
    pub fn category_attributes(&self, category: EntityCategory) -> &'static [Typed] {
        match category {
            EntityCategory::Person => self.person_attributes,
            EntityCategory::Product => self.product_attributes,
            EntityCategory::Transaction => self.transaction_attributes,
            EntityCategory::Education => self.education_attributes,
            EntityCategory::Document => self.document_attributes,
            EntityCategory::Generic => self.generic_attributes,
        }
    }

    pub fn context_type(&self, word: &str) -> Option<AttributeType> {
        let folded = fold(word);
        self.context_keywords
            .iter()
            .find(|(k, _)| fold(k) == folded)
            .map(|(_, t)| *t)
    }

    pub fn verb_rule(&self, word: &str) -> Option<&'static VerbRule> {
        let folded = fold(word);
        self.verbs.iter().find(|rule| contains(rule.forms, &folded))
    }

    pub fn is_management_verb(&self, word: &str) -> bool {
        contains(self.management_verbs, &fold(word))
    }

    /// Copulas whose folded form collides with a conjunction or
    /// determiner ("é", "está") are matched on the raw word.
    pub fn is_auxiliary(&self, word: &str) -> bool {
        let lowered = word.to_lowercase();
        contains(self.copulas, &lowered) || contains(self.auxiliaries, &fold(word))
    }

    pub fn is_known_verb(&self, word: &str) -> bool {
        let folded = fold(word);
        self.verb_rule(&folded).is_some()
            || contains(self.common_verbs, &folded)
            || contains(self.management_verbs, &folded)
    }

    pub fn is_determiner(&self, word: &str) -> bool {
        contains(self.determiners, &fold(word))
    }

    pub fn is_preposition(&self, word: &str) -> bool {
        contains(self.prepositions, &fold(word))
    }

    pub fn is_conjunction(&self, word: &str) -> bool {
        contains(self.conjunctions, &fold(word))
    }

    pub fn is_pronoun(&self, word: &str) -> bool {
        contains(self.pronouns, &fold(word))
    }

    pub fn is_adverb(&self, word: &str) -> bool {
        contains(self.adverbs, &fold(word))
    }

    pub fn is_adjective(&self, word: &str) -> bool {
        contains(self.adjectives, &fold(word))
    }

    pub fn is_list_cue(&self, word: &str) -> bool {
        contains(self.list_cues, &fold(word))
    }

    /// Looks for an explicit quantifier phrase in a folded sentence.
    pub fn quantifier_in(&self, folded_sentence: &str) -> Option<Cardinality> {
        self.quantifiers
            .iter()
            .find(|(phrase, _)| {
                folded_sentence
                    .match_indices(phrase)
                    .any(|(i, _)| is_word_boundary(folded_sentence, i, phrase.len()))
            })
            .map(|(_, c)| *c)
    }

    /// Reduces a plural noun to its singular form using the locale's
    /// regular inflection rules. Case is preserved only for unchanged
    /// words; callers pass lowercase.
    #[must_use]
    pub fn singularize(&self, word: &str) -> String {
        match self.locale {
            Locale::Portuguese => singularize_pt(word),
            Locale::English => singularize_en(word),
        }
    }
}

fn is_word_boundary(haystack: &str, start: usize, len: usize) -> bool {
    let before = haystack[..start].chars().next_back();
    let after = haystack[start + len..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

fn replace_suffix(word: &str, suffix: &str, with: &str) -> Option<String> {
    word.strip_suffix(suffix).map(|stem| format!("{stem}{with}"))
}

fn singularize_pt(word: &str) -> String {
    if word.chars().count() <= 3 {
        return word.to_string();
    }
    for (suffix, with) in [
        ("ões", "ão"),
        ("ães", "ão"),
        ("oes", "ao"),
        ("ais", "al"),
        ("éis", "el"),
        ("óis", "ol"),
        ("ns", "m"),
        ("res", "r"),
        ("zes", "z"),
        ("ses", "s"),
    ] {
        if let Some(singular) = replace_suffix(word, suffix, with) {
            return singular;
        }
    }
    if word.ends_with("us") || word.ends_with("ês") || word.ends_with("is") {
        return word.to_string();
    }
    word.strip_suffix('s').unwrap_or(word).to_string()
}

fn singularize_en(word: &str) -> String {
    match word {
        "people" => return "person".to_string(),
        "children" => return "child".to_string(),
        _ => {}
    }
    if word.chars().count() <= 3 {
        return word.to_string();
    }
    if let Some(singular) = replace_suffix(word, "ies", "y") {
        return singular;
    }
    for suffix in ["sses", "ches", "shes", "xes", "zes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    word.strip_suffix('s').unwrap_or(word).to_string()
}

use AttributeType as T;
use RelationshipKind as K;

static PORTUGUESE: Lexicon = Lexicon {
    locale: Locale::Portuguese,
    requirement_label: "Requisito",
    domain_vocabulary: &[
        "cliente", "utilizador", "usuario", "funcionario", "administrador", "gestor", "medico",
        "enfermeiro", "professor", "estudante", "aluno", "paciente", "fornecedor", "autor",
        "produto", "servico", "item", "artigo", "mercadoria", "pedido", "encomenda", "reserva",
        "consulta", "marcacao", "pagamento", "fatura", "conta", "carrinho", "categoria", "livro",
        "emprestimo", "curso", "disciplina", "aula", "turma", "documento", "relatorio",
        "ficheiro", "evento", "bilhete", "quarto", "hotel", "veiculo", "loja", "empresa",
        "departamento", "projeto", "tarefa", "mensagem", "notificacao", "avaliacao",
        "inventario", "venda", "compra", "entrega", "biblioteca", "sala", "voo", "viagem",
    ],
    stop_words: &[
        "sistema", "dado", "dados", "informacao", "processo", "forma", "modo", "vez", "tempo",
        "lugar", "coisa", "exemplo", "numero", "valor", "nivel", "parte", "meio", "erro",
        "resultado", "condicao", "requisito", "funcionalidade", "aplicacao", "possibilidade",
    ],
    person: &[
        "utilizador", "usuario", "cliente", "funcionario", "admin", "administrador", "gestor",
        "medico", "enfermeiro", "professor", "estudante", "aluno", "paciente",
    ],
    product: &["produto", "item", "artigo", "servico", "mercadoria", "bem"],
    transaction: &["pedido", "encomenda", "reserva", "consulta", "marcacao"],
    education: &["aula", "disciplina", "curso", "modulo", "formacao"],
    document: &["documento", "relatorio", "ficheiro", "arquivo", "imagem"],
    basic_attributes: &[("id", T::Integer), ("nome", T::String), ("descricao", T::String)],
    person_attributes: &[
        ("email", T::String),
        ("telefone", T::String),
        ("endereco", T::String),
        ("ativo", T::Boolean),
    ],
    product_attributes: &[
        ("preco", T::Double),
        ("disponivel", T::Boolean),
        ("codigo", T::String),
    ],
    transaction_attributes: &[("data", T::Date), ("estado", T::String), ("valor", T::Double)],
    education_attributes: &[
        ("codigo", T::String),
        ("creditos", T::Integer),
        ("ativo", T::Boolean),
    ],
    document_attributes: &[
        ("formato", T::String),
        ("tamanho", T::Integer),
        ("dataUpload", T::Date),
    ],
    generic_attributes: &[("estado", T::String), ("dataCriacao", T::Date)],
    context_keywords: &[
        ("data", T::Date),
        ("hora", T::Time),
        ("dataHora", T::DateTime),
        ("preco", T::Double),
        ("valor", T::Double),
        ("custo", T::Double),
        ("quantidade", T::Integer),
        ("numero", T::Integer),
        ("total", T::Integer),
        ("descricao", T::String),
        ("observacao", T::String),
        ("comentario", T::String),
        ("estado", T::String),
        ("status", T::String),
        ("tipo", T::String),
        ("email", T::String),
        ("telefone", T::String),
        ("endereco", T::String),
        ("codigo", T::String),
        ("referencia", T::String),
        ("ativo", T::Boolean),
        ("disponivel", T::Boolean),
        ("visivel", T::Boolean),
    ],
    attribute_words: &[
        "nome", "apelido", "morada", "senha", "password", "idade", "titulo", "nif", "cpf",
        "telemovel", "celular", "salario", "nascimento", "isbn", "stock", "saldo", "nota",
        "creditos", "formato", "tamanho", "duracao", "capacidade", "marca", "modelo", "cor",
        "username", "login", "id", "identificador",
    ],
    verbs: &[
        VerbRule {
            forms: &["ter", "tem", "possui", "possuem", "possuir", "tinha"],
            kind: K::Composition,
            cardinality: Cardinality::ONE_TO_MANY,
        },
        VerbRule {
            forms: &["conter", "contem", "inclui", "incluem", "incluir"],
            kind: K::Composition,
            cardinality: Cardinality::ONE_TO_MANY,
        },
        VerbRule {
            forms: &[
                "usar", "usa", "usam", "utiliza", "utilizam", "utilizar", "acede", "acedem",
                "aceder", "acessa", "acessam", "acessar", "consultar", "consultam",
            ],
            kind: K::Dependency,
            cardinality: Cardinality::ONE_TO_ONE,
        },
        VerbRule {
            forms: &[
                "gerir", "gere", "gerem", "gerencia", "gerenciam", "gerenciar", "controla",
                "controlam", "controlar", "administra", "administram", "administrar",
                "supervisiona", "supervisionam", "supervisionar",
            ],
            kind: K::Aggregation,
            cardinality: Cardinality::ONE_TO_MANY,
        },
        VerbRule {
            forms: &[
                "criar", "cria", "criam", "gera", "geram", "gerar", "produz", "produzem",
                "produzir", "emite", "emitem", "emitir",
            ],
            kind: K::Dependency,
            cardinality: Cardinality::ZERO_TO_MANY,
        },
        VerbRule {
            forms: &["pertencer", "pertence", "pertencem"],
            kind: K::Association,
            cardinality: Cardinality::MANY_TO_ONE,
        },
        VerbRule {
            forms: &[
                "fazer", "faz", "fazem", "efetua", "efetuam", "efetuar", "realiza", "realizam",
                "realizar", "compra", "compram", "comprar", "reserva", "reservam", "reservar",
                "requisita", "requisitam", "requisitar",
            ],
            kind: K::Association,
            cardinality: Cardinality::ONE_TO_MANY,
        },
    ],
    management_verbs: &[
        "gere", "gerem", "gerir", "gerencia", "gerenciar", "controla", "controlam", "controlar",
        "administra", "administrar", "supervisiona", "supervisionar", "aprova", "aprovar",
    ],
    common_verbs: &[
        "permite", "permitir", "registar", "registrar", "regista", "registam", "editar", "edita",
        "remover", "remove", "visualizar", "visualiza", "ver", "fornecer", "fornece",
        "fornecendo", "indicar", "indicando", "associar", "associa", "enviar", "envia",
        "receber", "recebe", "pesquisar", "pesquisa", "listar", "lista", "alterar", "altera",
        "apagar", "apaga", "adicionar", "adiciona", "atualizar", "atualiza", "efetuar",
        "escolher", "escolhe", "selecionar", "seleciona", "avaliar", "avalia", "pagar", "paga",
        "inscrever", "inscreve", "cancelar", "cancela", "guardar", "guarda", "contendo",
        "incluindo", "informando",
    ],
    auxiliaries: &[
        "deve", "devem", "devera", "deverao", "pode", "podem", "podera", "poderao", "poder",
        "vai", "vao", "ser", "sao", "estao", "foi", "sera", "estar",
    ],
    copulas: &["é", "está"],
    determiners: &[
        "o", "a", "os", "as", "um", "uma", "uns", "umas", "cada", "todo", "toda", "todos",
        "todas", "este", "esta", "estes", "estas", "esse", "essa", "esses", "essas", "seu",
        "sua", "seus", "suas", "qualquer", "varios", "varias", "algum", "alguma", "nenhum",
    ],
    prepositions: &[
        "de", "da", "do", "das", "dos", "em", "na", "no", "nas", "nos", "para", "por", "pelo",
        "pela", "pelos", "pelas", "com", "sem", "sobre", "entre", "ao", "aos", "até", "num",
        "numa", "ate",
    ],
    conjunctions: &["e", "ou", "mas", "nem"],
    pronouns: &["ele", "ela", "eles", "elas", "se", "que", "quem", "qual", "isso", "lhe"],
    adverbs: &[
        "nao", "tambem", "apenas", "so", "sempre", "ja", "ainda", "mais", "menos", "como",
        "quando", "onde", "bem", "depois", "antes",
    ],
    adjectives: &[
        "novo", "nova", "ativo", "registado", "registrado", "disponivel", "principal", "unico",
        "unica", "valido", "valida", "proprio", "propria", "diversos", "diversas",
    ],
    list_cues: &[
        "tem", "ter", "possui", "possuem", "contem", "inclui", "incluem", "com", "fornecendo",
        "fornece", "indicando", "informando", "contendo", "incluindo", "guarda", "regista",
    ],
    of_connectors: &["de", "da", "do", "das", "dos"],
    each_words: &["cada"],
    inheritance_cues: &["é um tipo de", "é uma", "é um", "herda de", "estende"],
    quantifiers: &[
        ("exatamente um", Cardinality::ONE_TO_ONE),
        ("exatamente uma", Cardinality::ONE_TO_ONE),
        ("apenas um", Cardinality::ONE_TO_ONE),
        ("apenas uma", Cardinality::ONE_TO_ONE),
        ("um unico", Cardinality::ONE_TO_ONE),
        ("uma unica", Cardinality::ONE_TO_ONE),
        ("pelo menos um", Cardinality::ONE_TO_MANY),
        ("pelo menos uma", Cardinality::ONE_TO_MANY),
        ("um ou mais", Cardinality::ONE_TO_MANY),
        ("uma ou mais", Cardinality::ONE_TO_MANY),
        ("zero ou um", Cardinality::ZERO_TO_ONE),
        ("zero ou uma", Cardinality::ZERO_TO_ONE),
        ("um ou zero", Cardinality::ZERO_TO_ONE),
        ("no maximo um", Cardinality::ZERO_TO_ONE),
        ("no maximo uma", Cardinality::ZERO_TO_ONE),
    ],
    fallback_entities: ["Utilizador", "Sistema"],
};

static ENGLISH: Lexicon = Lexicon {
    locale: Locale::English,
    requirement_label: "Requirement",
    domain_vocabulary: &[
        "customer", "client", "user", "employee", "administrator", "admin", "manager",
        "doctor", "nurse", "teacher", "professor", "student", "patient", "supplier", "author",
        "product", "service", "item", "article", "order", "booking", "reservation",
        "appointment", "payment", "invoice", "account", "cart", "category", "book", "loan",
        "course", "lesson", "document", "report", "file", "event", "ticket", "room", "hotel",
        "vehicle", "store", "company", "department", "project", "task", "message",
        "notification", "review", "inventory", "sale", "purchase", "delivery", "library",
        "flight", "trip",
    ],
    stop_words: &[
        "system", "data", "information", "process", "way", "mode", "time", "place", "thing",
        "example", "number", "value", "level", "part", "means", "error", "result", "condition",
        "requirement", "feature", "application", "ability",
    ],
    person: &[
        "user", "customer", "client", "employee", "admin", "manager", "doctor", "nurse",
        "teacher", "professor", "student", "pupil", "patient",
    ],
    product: &["product", "item", "article", "service", "merchandise", "good"],
    transaction: &["order", "booking", "reservation", "appointment"],
    education: &["lesson", "subject", "course", "module", "training"],
    document: &["document", "report", "file", "archive", "image"],
    basic_attributes: &[("id", T::Integer), ("name", T::String), ("description", T::String)],
    person_attributes: &[
        ("email", T::String),
        ("phone", T::String),
        ("address", T::String),
        ("active", T::Boolean),
    ],
    product_attributes: &[
        ("price", T::Double),
        ("available", T::Boolean),
        ("code", T::String),
    ],
    transaction_attributes: &[("date", T::Date), ("status", T::String), ("value", T::Double)],
    education_attributes: &[
        ("code", T::String),
        ("credits", T::Integer),
        ("active", T::Boolean),
    ],
    document_attributes: &[
        ("format", T::String),
        ("size", T::Integer),
        ("uploadDate", T::Date),
    ],
    generic_attributes: &[("status", T::String), ("creationDate", T::Date)],
    context_keywords: &[
        ("date", T::Date),
        ("time", T::Time),
        ("timestamp", T::DateTime),
        ("price", T::Double),
        ("value", T::Double),
        ("cost", T::Double),
        ("quantity", T::Integer),
        ("number", T::Integer),
        ("total", T::Integer),
        ("description", T::String),
        ("note", T::String),
        ("comment", T::String),
        ("status", T::String),
        ("state", T::String),
        ("type", T::String),
        ("email", T::String),
        ("phone", T::String),
        ("address", T::String),
        ("code", T::String),
        ("reference", T::String),
        ("active", T::Boolean),
        ("available", T::Boolean),
        ("visible", T::Boolean),
    ],
    attribute_words: &[
        "name", "surname", "password", "age", "title", "salary", "birthday", "birthdate",
        "isbn", "stock", "balance", "grade", "credits", "format", "size", "duration",
        "capacity", "brand", "model", "color", "username", "login", "id", "identifier",
    ],
    verbs: &[
        VerbRule {
            forms: &["have", "has", "own", "owns", "had"],
            kind: K::Composition,
            cardinality: Cardinality::ONE_TO_MANY,
        },
        VerbRule {
            forms: &["contain", "contains", "include", "includes"],
            kind: K::Composition,
            cardinality: Cardinality::ONE_TO_MANY,
        },
        VerbRule {
            forms: &["use", "uses", "access", "accesses", "consult", "consults"],
            kind: K::Dependency,
            cardinality: Cardinality::ONE_TO_ONE,
        },
        VerbRule {
            forms: &[
                "manage", "manages", "control", "controls", "administer", "administers",
                "supervise", "supervises",
            ],
            kind: K::Aggregation,
            cardinality: Cardinality::ONE_TO_MANY,
        },
        VerbRule {
            forms: &[
                "create", "creates", "generate", "generates", "produce", "produces", "issue",
                "issues",
            ],
            kind: K::Dependency,
            cardinality: Cardinality::ZERO_TO_MANY,
        },
        VerbRule {
            forms: &["belong", "belongs"],
            kind: K::Association,
            cardinality: Cardinality::MANY_TO_ONE,
        },
        VerbRule {
            forms: &[
                "place", "places", "make", "makes", "perform", "performs", "buy", "buys",
                "book", "books", "borrow", "borrows",
            ],
            kind: K::Association,
            cardinality: Cardinality::ONE_TO_MANY,
        },
    ],
    management_verbs: &[
        "manage", "manages", "control", "controls", "administer", "administers", "supervise",
        "supervises", "approve", "approves",
    ],
    common_verbs: &[
        "allow", "allows", "register", "registers", "edit", "edits", "remove", "removes",
        "view", "views", "see", "provide", "provides", "providing", "send", "sends", "receive",
        "receives", "search", "searches", "list", "lists", "update", "updates", "delete",
        "deletes", "add", "adds", "select", "selects", "rate", "rates", "pay", "pays", "enroll",
        "enrolls", "cancel", "cancels", "store", "stores", "containing", "including",
        "specifying",
    ],
    auxiliaries: &[
        "must", "should", "can", "could", "may", "will", "shall", "is", "are", "be", "was",
        "were", "to", "does", "do", "able",
    ],
    copulas: &["is", "are"],
    determiners: &[
        "the", "a", "an", "each", "every", "all", "this", "that", "these", "those", "its",
        "their", "his", "her", "any", "some", "several", "many", "no",
    ],
    prepositions: &[
        "of", "from", "in", "on", "at", "for", "by", "with", "without", "to", "about", "into",
        "between", "through",
    ],
    conjunctions: &["and", "or", "but", "nor"],
    pronouns: &["it", "they", "he", "she", "who", "which", "them", "himself", "herself"],
    adverbs: &[
        "not", "also", "only", "always", "already", "still", "more", "less", "when", "where",
        "how", "then", "daily",
    ],
    adjectives: &[
        "new", "active", "registered", "available", "main", "unique", "valid", "own", "various",
    ],
    list_cues: &[
        "has", "have", "with", "contains", "includes", "providing", "provides", "including",
        "containing", "specifying", "stores",
    ],
    of_connectors: &["of", "from"],
    each_words: &["each", "every"],
    inheritance_cues: &["is a kind of", "is a type of", "is an", "is a", "inherits from", "extends"],
    quantifiers: &[
        ("exactly one", Cardinality::ONE_TO_ONE),
        ("only one", Cardinality::ONE_TO_ONE),
        ("a single", Cardinality::ONE_TO_ONE),
        ("at least one", Cardinality::ONE_TO_MANY),
        ("one or more", Cardinality::ONE_TO_MANY),
        ("zero or one", Cardinality::ZERO_TO_ONE),
        ("at most one", Cardinality::ZERO_TO_ONE),
    ],
    fallback_entities: ["User", "System"],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_parse() {
        assert_eq!("pt-BR".parse::<Locale>().unwrap(), Locale::Portuguese);
        assert_eq!("english".parse::<Locale>().unwrap(), Locale::English);
        assert!("fr".parse::<Locale>().is_err());
        assert_eq!(Locale::default(), Locale::Portuguese);
    }

    #[test]
    fn test_singularize_portuguese() {
        let lex = Locale::Portuguese.lexicon();
        assert_eq!(lex.singularize("clientes"), "cliente");
        assert_eq!(lex.singularize("produtos"), "produto");
        assert_eq!(lex.singularize("professores"), "professor");
        assert_eq!(lex.singularize("reservações"), "reservação");
        assert_eq!(lex.singularize("itens"), "item");
        assert_eq!(lex.singularize("hospitais"), "hospital");
        assert_eq!(lex.singularize("status"), "status");
        assert_eq!(lex.singularize("mês"), "mês");
        assert_eq!(lex.singularize("cliente"), "cliente");
    }

    #[test]
    fn test_singularize_english() {
        let lex = Locale::English.lexicon();
        assert_eq!(lex.singularize("customers"), "customer");
        assert_eq!(lex.singularize("categories"), "category");
        assert_eq!(lex.singularize("addresses"), "address");
        assert_eq!(lex.singularize("boxes"), "box");
        assert_eq!(lex.singularize("status"), "status");
        assert_eq!(lex.singularize("people"), "person");
    }

    #[test]
    fn test_category_priority() {
        let lex = Locale::Portuguese.lexicon();
        assert_eq!(lex.category_of("Cliente"), EntityCategory::Person);
        assert_eq!(lex.category_of("Produto"), EntityCategory::Product);
        assert_eq!(lex.category_of("Encomenda"), EntityCategory::Transaction);
        assert_eq!(lex.category_of("Curso"), EntityCategory::Education);
        assert_eq!(lex.category_of("Relatório"), EntityCategory::Document);
        assert_eq!(lex.category_of("Hotel"), EntityCategory::Generic);
        // person wins over product when both occur
        assert_eq!(lex.category_of("ClienteProduto"), EntityCategory::Person);
    }

    #[test]
    fn test_verb_rules() {
        let lex = Locale::Portuguese.lexicon();
        let rule = lex.verb_rule("contém").unwrap();
        assert_eq!(rule.kind, RelationshipKind::Composition);
        assert_eq!(rule.lemma(), "conter");
        assert_eq!(lex.verb_rule("pertence").unwrap().cardinality, Cardinality::MANY_TO_ONE);
        assert!(lex.verb_rule("corre").is_none());

        let en = Locale::English.lexicon();
        assert_eq!(en.verb_rule("uses").unwrap().kind, RelationshipKind::Dependency);
    }

    #[test]
    fn test_quantifier_phrases() {
        let lex = Locale::Portuguese.lexicon();
        assert_eq!(
            lex.quantifier_in("cada pedido tem pelo menos um produto"),
            Some(Cardinality::ONE_TO_MANY)
        );
        assert_eq!(
            lex.quantifier_in("um cliente tem no maximo um carrinho"),
            Some(Cardinality::ZERO_TO_ONE)
        );
        assert_eq!(lex.quantifier_in("o cliente faz pedidos"), None);

        let en = Locale::English.lexicon();
        assert_eq!(
            en.quantifier_in("each order has at least one item"),
            Some(Cardinality::ONE_TO_MANY)
        );
    }

    #[test]
    fn test_attribute_words() {
        let lex = Locale::Portuguese.lexicon();
        assert!(lex.is_attribute_word("nome"));
        assert!(lex.is_attribute_word("preço"));
        assert!(lex.is_attribute_word("Descrição"));
        assert!(!lex.is_attribute_word("cliente"));
        assert_eq!(lex.context_type("preço"), Some(AttributeType::Double));
        assert_eq!(lex.context_type("dataHora"), Some(AttributeType::DateTime));
    }
}

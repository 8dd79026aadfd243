use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AttributeType {
    String,
    Integer,
    Double,
    Boolean,
    Date,
    Time,
    DateTime,
}

impl AttributeType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Double => "Double",
            Self::Boolean => "Boolean",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::DateTime => "DateTime",
        }
    }

    /// Maps the loose type names completion services tend to emit
    /// ("int", "float", "LocalDate", ...) onto the closed set. Anything
    /// unrecognised becomes `String`.
    #[must_use]
    pub fn from_loose(s: &str) -> Self {
        let lowered = s.trim().to_lowercase().replace(['_', ' '], "");
        match lowered.as_str() {
            "integer" | "int" | "long" | "short" | "byte" | "bigint" | "inteiro" => Self::Integer,
            "double" | "float" | "decimal" | "real" | "number" | "bigdecimal" | "money"
            | "currency" | "numeric" => Self::Double,
            "boolean" | "bool" | "booleano" => Self::Boolean,
            "date" | "localdate" | "data" => Self::Date,
            "time" | "localtime" | "hora" => Self::Time,
            "datetime" | "timestamp" | "localdatetime" | "datahora" | "instant" => Self::DateTime,
            _ => Self::String,
        }
    }
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AttributeType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "String" => Ok(Self::String),
            "Integer" => Ok(Self::Integer),
            "Double" => Ok(Self::Double),
            "Boolean" => Ok(Self::Boolean),
            "Date" => Ok(Self::Date),
            "Time" => Ok(Self::Time),
            "DateTime" => Ok(Self::DateTime),
            _ => Err(crate::Error::InvalidAttributeType(s.to_string())),
        }
    }
}

impl From<String> for AttributeType {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_else(|_| Self::from_loose(&s))
    }
}

impl From<AttributeType> for String {
    fn from(t: AttributeType) -> Self {
        t.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(rename = "nome", default)]
    pub name: String,
    #[serde(rename = "tipo", default = "default_attribute_type")]
    pub attribute_type: AttributeType,
}

const fn default_attribute_type() -> AttributeType {
    AttributeType::String
}

impl Attribute {
    #[must_use]
    pub fn new(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attribute_type,
        }
    }

    /// Rendering used for diagram cells: `name: Type`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}: {}", self.name, self.attribute_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationshipKind {
    Association,
    Composition,
    Aggregation,
    Dependency,
    Inheritance,
    Control,
}

impl RelationshipKind {
    /// Wire name used in the canonical extraction schema.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Association => "associacao",
            Self::Composition => "composicao",
            Self::Aggregation => "agregacao",
            Self::Dependency => "dependencia",
            Self::Inheritance => "heranca",
            Self::Control => "controle",
        }
    }

    /// Accepts Portuguese and English spellings, with or without accents.
    /// Unknown kinds degrade to `Association`.
    #[must_use]
    pub fn from_loose(s: &str) -> Self {
        let folded = crate::text::fold(s);
        let key = folded.trim();
        if key.starts_with("compos") {
            Self::Composition
        } else if key.starts_with("agreg") || key.starts_with("aggreg") {
            Self::Aggregation
        } else if key.starts_with("depend") || key == "uses" || key == "usa" {
            Self::Dependency
        } else if key.starts_with("heran")
            || key.starts_with("inherit")
            || key.starts_with("generaliz")
            || key.starts_with("extend")
        {
            Self::Inheritance
        } else if key.starts_with("control") {
            Self::Control
        } else {
            Self::Association
        }
    }
}

impl std::fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RelationshipKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "associacao" => Ok(Self::Association),
            "composicao" => Ok(Self::Composition),
            "agregacao" => Ok(Self::Aggregation),
            "dependencia" => Ok(Self::Dependency),
            "heranca" => Ok(Self::Inheritance),
            "controle" => Ok(Self::Control),
            _ => Err(crate::Error::InvalidRelationshipKind(s.to_string())),
        }
    }
}

impl From<String> for RelationshipKind {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_else(|_| Self::from_loose(&s))
    }
}

impl From<RelationshipKind> for String {
    fn from(k: RelationshipKind) -> Self {
        k.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    Count(u32),
    /// Unbounded upper end, written `n`.
    Many,
    /// Unbounded end written `*`.
    Star,
}

impl Bound {
    fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        match token {
            "*" => Some(Self::Star),
            "n" | "N" | "m" | "M" | "many" => Some(Self::Many),
            _ => token.parse().ok().map(Self::Count),
        }
    }
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::Many => f.write_str("n"),
            Self::Star => f.write_str("*"),
        }
    }
}

/// A `low..high` multiplicity pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Cardinality {
    pub low: Bound,
    pub high: Bound,
}

impl Cardinality {
    pub const ONE_TO_ONE: Self = Self::new(Bound::Count(1), Bound::Count(1));
    pub const ZERO_TO_ONE: Self = Self::new(Bound::Count(0), Bound::Count(1));
    pub const ZERO_TO_MANY: Self = Self::new(Bound::Count(0), Bound::Many);
    pub const ONE_TO_MANY: Self = Self::new(Bound::Count(1), Bound::Many);
    pub const ONE_TO_STAR: Self = Self::new(Bound::Count(1), Bound::Star);
    pub const MANY_TO_ONE: Self = Self::new(Bound::Star, Bound::Count(1));

    #[must_use]
    pub const fn new(low: Bound, high: Bound) -> Self {
        Self { low, high }
    }

    /// `0..N` for an explicit numeric upper bound.
    #[must_use]
    pub const fn up_to(n: u32) -> Self {
        Self::new(Bound::Count(0), Bound::Count(n))
    }

    /// Parses `low..high`; a single bound `b` is read as `b..b`, except a
    /// bare unbounded marker which is read as `0..b`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some((low, high)) = s.split_once("..") {
            return Some(Self::new(Bound::parse(low)?, Bound::parse(high)?));
        }
        match Bound::parse(s)? {
            b @ Bound::Count(_) => Some(Self::new(b, b)),
            b => Some(Self::new(Bound::Count(0), b)),
        }
    }

    /// Source-end and target-end label text.
    #[must_use]
    pub fn split(&self) -> (String, String) {
        (self.low.to_string(), self.high.to_string())
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Self::ZERO_TO_MANY
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.low, self.high)
    }
}

impl From<String> for Cardinality {
    fn from(s: String) -> Self {
        Self::parse(&s).unwrap_or_else(|| {
            tracing::debug!(cardinality = %s, "Unreadable cardinality, using default");
            Self::default()
        })
    }
}

impl From<Cardinality> for String {
    fn from(c: Cardinality) -> Self {
        c.to_string()
    }
}

/// Owned by its source class; `target` is a by-name reference that may
/// not resolve inside the same model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(rename = "tipo", default = "default_relationship_kind")]
    pub kind: RelationshipKind,
    #[serde(rename = "alvo", default)]
    pub target: String,
    #[serde(rename = "cardinalidade", default)]
    pub cardinality: Cardinality,
}

const fn default_relationship_kind() -> RelationshipKind {
    RelationshipKind::Association
}

impl Relationship {
    #[must_use]
    pub fn new(kind: RelationshipKind, target: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            kind,
            target: target.into(),
            cardinality,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassEntity {
    #[serde(rename = "nome", default)]
    pub name: String,
    #[serde(rename = "atributos", default)]
    pub attributes: Vec<Attribute>,
    #[serde(rename = "relacionamentos", default)]
    pub relationships: Vec<Relationship>,
}

impl ClassEntity {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            relationships: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.push_attribute(attribute);
        self
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: impl IntoIterator<Item = Attribute>) -> Self {
        for attribute in attributes {
            self.push_attribute(attribute);
        }
        self
    }

    #[must_use]
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes
            .iter()
            .any(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Appends unless an attribute with the same name (case-insensitive)
    /// is already present. Returns whether it was added.
    pub fn push_attribute(&mut self, attribute: Attribute) -> bool {
        if self.has_attribute(&attribute.name) {
            return false;
        }
        self.attributes.push(attribute);
        true
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// Root aggregate of one extraction request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DomainModel {
    #[serde(default)]
    pub classes: Vec<ClassEntity>,
}

impl DomainModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_class(mut self, class: ClassEntity) -> Self {
        self.classes.push(class);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn class(&self, name: &str) -> Option<&ClassEntity> {
        self.classes.iter().find(|c| c.is_named(name))
    }

    pub fn class_mut(&mut self, name: &str) -> Option<&mut ClassEntity> {
        self.classes.iter_mut().find(|c| c.is_named(name))
    }

    pub fn class_names(&self) -> Vec<String> {
        self.classes.iter().map(|c| c.name.clone()).collect()
    }

    pub fn attribute_count(&self) -> usize {
        self.classes.iter().map(|c| c.attributes.len()).sum()
    }

    pub fn relationship_count(&self) -> usize {
        self.classes.iter().map(|c| c.relationships.len()).sum()
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

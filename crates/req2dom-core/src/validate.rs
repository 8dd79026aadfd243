use tracing::debug;

use crate::lexicon::Lexicon;
use crate::model::{Attribute, AttributeType, DomainModel};

/// Enforces the structural minimum of a canonical model. Never fails and
/// validating twice yields the same model.
#[derive(Debug, Clone, Copy)]
pub struct ModelValidator {
    lexicon: &'static Lexicon,
}

impl ModelValidator {
    #[must_use]
    pub fn new(lexicon: &'static Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn validate(&self, mut model: DomainModel) -> DomainModel {
        let before = model.len();
        model.classes.retain(|class| class.name.trim().chars().count() > 1);
        if model.len() < before {
            debug!(dropped = before - model.len(), "Dropped classes with short names");
        }

        for class in &mut model.classes {
            class.attributes.retain(|a| !a.name.trim().is_empty());
            if class.attributes.is_empty() {
                class.attributes = self.default_attributes();
            }
        }
        model
    }

    fn default_attributes(&self) -> Vec<Attribute> {
        let name = self
            .lexicon
            .basic_attributes
            .iter()
            .find(|(_, ty)| *ty == AttributeType::String)
            .map_or("name", |(name, _)| *name);
        vec![
            Attribute::new("id", AttributeType::Integer),
            Attribute::new(name, AttributeType::String),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Locale;
    use crate::model::ClassEntity;

    #[test]
    fn test_short_names_dropped() {
        let model = DomainModel::new()
            .with_class(ClassEntity::new("X"))
            .with_class(ClassEntity::new("  "))
            .with_class(ClassEntity::new("Aluno"));
        let result = ModelValidator::new(Locale::Portuguese.lexicon()).validate(model);
        assert_eq!(result.class_names(), vec!["Aluno"]);
    }

    #[test]
    fn test_default_attributes_follow_locale() {
        let model = DomainModel::new().with_class(ClassEntity::new("Aluno"));
        let pt = ModelValidator::new(Locale::Portuguese.lexicon()).validate(model.clone());
        assert_eq!(pt.classes[0].attributes[0].label(), "id: Integer");
        assert_eq!(pt.classes[0].attributes[1].label(), "nome: String");

        let en = ModelValidator::new(Locale::English.lexicon()).validate(model);
        assert_eq!(en.classes[0].attributes[1].name, "name");
    }

    #[test]
    fn test_relationships_missing_from_json() {
        let model = DomainModel::from_json(r#"{"classes": [{"nome": "Aluno", "atributos": []}]}"#).unwrap();
        let result = ModelValidator::new(Locale::Portuguese.lexicon()).validate(model);
        assert!(result.classes[0].relationships.is_empty());
        assert_eq!(result.classes[0].attributes.len(), 2);
    }

    #[test]
    fn test_idempotent() {
        let validator = ModelValidator::new(Locale::English.lexicon());
        let model = DomainModel::new()
            .with_class(ClassEntity::new("A"))
            .with_class(ClassEntity::new("Book").with_attribute(Attribute::new("", AttributeType::String)));
        let once = validator.validate(model);
        assert_eq!(validator.validate(once.clone()), once);
    }
}

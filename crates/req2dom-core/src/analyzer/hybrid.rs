use tracing::{info, warn};

use super::{refinement_prompt, Analysis, Analyzer, AnalyzerKind, AnalyzerResult, CompletionAnalyzer, HeuristicAnalyzer, Substitution};
use crate::merge::merge;
use crate::normalize::RequirementDocument;

/// Heuristic pass refined by a completion pass, merged with the refined
/// model as the base. When the completion side fails the heuristic model
/// is returned and the substitution recorded.
pub struct HybridAnalyzer {
    heuristic: HeuristicAnalyzer,
    completion: CompletionAnalyzer,
}

impl HybridAnalyzer {
    #[must_use]
    pub fn new(heuristic: HeuristicAnalyzer, completion: CompletionAnalyzer) -> Self {
        Self { heuristic, completion }
    }
}

#[async_trait::async_trait]
impl Analyzer for HybridAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Hybrid
    }

    async fn analyze(&self, document: &RequirementDocument) -> AnalyzerResult<Analysis> {
        let preliminary = self.heuristic.analyze(document).await?;

        let requirements = document.render(self.completion.lexicon());
        let prompt = refinement_prompt(&requirements, &preliminary.model, self.completion.locale());

        match self.completion.request_model(&prompt).await {
            Ok(refined) => {
                let model = merge(preliminary.model, refined);
                info!(classes = model.len(), "Hybrid analysis complete");
                Ok(Analysis {
                    model,
                    substitutions: preliminary.substitutions,
                    fallback_classes: preliminary.fallback_classes,
                })
            }
            Err(e) => {
                warn!(
                    error = %e,
                    used = %self.heuristic.kind(),
                    "Refinement failed, keeping heuristic model"
                );
                let substitution = Substitution::new(AnalyzerKind::Completion, self.heuristic.kind(), e.to_string());
                Ok(preliminary.with_substitution(substitution))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{CompletionClient, CompletionError, CompletionResult};
    use crate::config::ExtractionConfig;
    use crate::lexicon::Locale;
    use crate::normalize::TextNormalizer;
    use std::sync::{Arc, Mutex};

    struct Scripted {
        reply: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl CompletionClient for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, prompt: &str) -> CompletionResult<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .clone()
                .ok_or_else(|| CompletionError::Connection("connection refused".into()))
        }
    }

    fn hybrid(reply: Option<&str>) -> (HybridAnalyzer, Arc<Scripted>) {
        let client = Arc::new(Scripted {
            reply: reply.map(str::to_string),
            prompts: Mutex::new(Vec::new()),
        });
        let heuristic =
            HeuristicAnalyzer::new(AnalyzerKind::Syntactic, Locale::Portuguese, &ExtractionConfig::default()).unwrap();
        let completion = CompletionAnalyzer::new(client.clone(), Locale::Portuguese);
        (HybridAnalyzer::new(heuristic, completion), client)
    }

    const TEXT: &str = "RF01. O cliente deve poder registar-se fornecendo nome, email e telefone. \
RF02. Os produtos têm nome, descrição e preço.";

    #[tokio::test]
    async fn test_refined_model_is_merged() {
        let reply = r#"{"classes": [
            {"nome": "Cliente", "atributos": [{"nome": "nif", "tipo": "String"}],
             "relacionamentos": [{"tipo": "associacao", "alvo": "Encomenda", "cardinalidade": "1..*"}]},
            {"nome": "Encomenda", "atributos": [{"nome": "data", "tipo": "Date"}]}
        ]}"#;
        let (analyzer, client) = hybrid(Some(reply));
        let document = TextNormalizer::new().normalize(TEXT);
        let analysis = analyzer.analyze(&document).await.unwrap();

        let names = analysis.model.class_names();
        assert_eq!(&names[..2], ["Cliente", "Encomenda"]);
        assert!(names.contains(&"Produto".to_string()));

        let cliente = analysis.model.class("Cliente").unwrap();
        assert_eq!(cliente.attributes[0].name, "nif");
        assert!(cliente.has_attribute("telefone"));
        assert_eq!(cliente.relationships[0].target, "Encomenda");
        assert!(analysis.substitutions.is_empty());

        let prompts = client.prompts.lock().unwrap();
        assert!(prompts[0].contains("Análise preliminar"));
        assert!(prompts[0].contains("\"nome\": \"Cliente\""));
    }

    #[tokio::test]
    async fn test_failure_records_substitution() {
        let (analyzer, _) = hybrid(None);
        let document = TextNormalizer::new().normalize(TEXT);
        let analysis = analyzer.analyze(&document).await.unwrap();

        assert!(analysis.model.class("Cliente").is_some());
        assert_eq!(analysis.substitutions.len(), 1);
        let substitution = &analysis.substitutions[0];
        assert_eq!(substitution.failed, AnalyzerKind::Completion);
        assert_eq!(substitution.used, AnalyzerKind::Syntactic);
        assert!(substitution.reason.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_unreadable_reply_records_substitution() {
        let (analyzer, _) = hybrid(Some("Sorry, I can't."));
        let analysis = analyzer
            .analyze(&TextNormalizer::new().normalize(TEXT))
            .await
            .unwrap();
        assert_eq!(analysis.substitutions.len(), 1);
    }
}

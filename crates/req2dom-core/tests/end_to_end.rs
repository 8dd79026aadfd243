use std::sync::{Arc, Mutex};

use req2dom_core::analyzer::CompletionResult;
use req2dom_core::{
    Analyzer, AnalyzerError, AnalyzerKind, CompletionAnalyzer, CompletionClient, CompletionError, Config,
    DiagramSerializer, DomainModel, ExtractionConfig, HeuristicAnalyzer, HybridAnalyzer, Locale, Pipeline,
    PipelineError, RelationshipKind,
};

const REQUIREMENTS: &str = "RF01. O cliente deve poder registar-se fornecendo nome, email e telefone. \
RF02. Os produtos têm nome, descrição e preço.";

/// Replays canned replies in order; an exhausted script behaves like an
/// unreachable service.
struct ScriptedClient {
    replies: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().rev().map(|r| (*r).to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CompletionClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> CompletionResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| CompletionError::Connection("connection refused".to_string()))
    }
}

fn completion_pipeline(client: Arc<ScriptedClient>) -> Pipeline {
    let analyzer = CompletionAnalyzer::new(client, Locale::Portuguese);
    Pipeline::new(Box::new(analyzer), Locale::Portuguese)
}

fn hybrid_pipeline(client: Arc<ScriptedClient>) -> Pipeline {
    let heuristic =
        HeuristicAnalyzer::new(AnalyzerKind::Syntactic, Locale::Portuguese, &ExtractionConfig::default()).unwrap();
    let completion = CompletionAnalyzer::new(client, Locale::Portuguese);
    Pipeline::new(Box::new(HybridAnalyzer::new(heuristic, completion)), Locale::Portuguese)
}

fn attribute_names(model: &DomainModel, class: &str) -> Vec<String> {
    model
        .class(class)
        .map(|c| c.attributes.iter().map(|a| a.name.clone()).collect())
        .unwrap_or_default()
}

// --- Heuristic path ---

#[tokio::test]
async fn test_requirements_become_diagram() {
    let pipeline = Pipeline::from_config(&Config::default()).unwrap();
    let output = pipeline.run(REQUIREMENTS).await.unwrap();

    assert_eq!(output.model.class_names(), ["Cliente", "Produto"]);
    let cliente = attribute_names(&output.model, "Cliente");
    assert_eq!(cliente[0], "id");
    for expected in ["nome", "email", "telefone"] {
        assert!(cliente.iter().any(|a| a == expected), "{cliente:?}");
    }
    let produto = attribute_names(&output.model, "Produto");
    for expected in ["nome", "descricao", "preco"] {
        assert!(produto.iter().any(|a| a == expected), "{produto:?}");
    }

    assert_eq!(output.diagram.vertices, 2);
    assert_eq!(output.diagram.edges, 1);
    assert!(output.xml().contains(r#"value="preco: Double""#));
    assert!(output.xml().contains(r#"source="class-1" target="class-2""#));
    assert_eq!(output.stats.relationships, 1);
    assert!(!output.was_degraded());
}

#[tokio::test]
async fn test_english_requirements() {
    let config = Config {
        locale: Locale::English,
        ..Config::default()
    };
    let pipeline = Pipeline::from_config(&config).unwrap();
    let output = pipeline
        .run("REQ01. The customer places an order. REQ02. Each order has a payment.")
        .await
        .unwrap();

    assert_eq!(output.stats.labeled_units, 2);
    let names = output.model.class_names();
    assert!(names.contains(&"Customer".to_string()), "{names:?}");
    assert!(names.contains(&"Order".to_string()), "{names:?}");
}

#[tokio::test]
async fn test_canonical_json_round_trips_through_render() {
    let pipeline = Pipeline::from_config(&Config::default()).unwrap();
    let output = pipeline.run(REQUIREMENTS).await.unwrap();

    let json = output.model.to_json().unwrap();
    let rendered = DiagramSerializer::default().serialize_json(&json);
    assert!(!rendered.is_diagnostic());
    assert_eq!(rendered.xml, output.diagram.xml);
}

// --- Completion path ---

#[tokio::test]
async fn test_completion_reply_in_fence() {
    let reply = "Claro! Aqui está o modelo:\n```json\n{\"classes\": [\
{\"nome\": \"Pedido\", \"atributos\": [{\"nome\": \"data\", \"tipo\": \"Date\"}], \
\"relacionamentos\": [{\"tipo\": \"composicao\", \"alvo\": \"Item\", \"cardinalidade\": \"1..*\"}]}, \
{\"nome\": \"Item\", \"atributos\": [{\"nome\": \"quantidade\", \"tipo\": \"Integer\"}]}]}\n```";
    let client = ScriptedClient::new(&[reply]);
    let output = completion_pipeline(client.clone()).run(REQUIREMENTS).await.unwrap();

    assert_eq!(output.model.class_names(), ["Pedido", "Item"]);
    let pedido = output.model.class("Pedido").unwrap();
    assert_eq!(pedido.relationships[0].kind, RelationshipKind::Composition);
    assert_eq!(output.diagram.edges, 1);
    assert!(output.xml().contains("startArrow=diamondThin"));

    let prompts = client.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Requisito 01: O cliente"));
}

#[tokio::test]
async fn test_completion_empty_model() {
    let client = ScriptedClient::new(&["```json\n{\"classes\": []}\n```"]);
    let output = completion_pipeline(client).run(REQUIREMENTS).await.unwrap();

    assert!(output.model.is_empty());
    assert_eq!(output.diagram.vertices, 0);
    assert!(!output.diagram.is_diagnostic());
}

#[tokio::test]
async fn test_completion_repeated_attributes_collapse() {
    let reply = r#"{"classes": [{"nome": "Cliente", "atributos": [
        {"nome": "email", "tipo": "String"},
        {"nome": "email", "tipo": "String"},
        {"nome": "Email", "tipo": "String"}]}]}"#;
    let output = completion_pipeline(ScriptedClient::new(&[reply])).run(REQUIREMENTS).await.unwrap();

    assert_eq!(attribute_names(&output.model, "Cliente"), ["email"]);
    assert_eq!(output.xml().matches("email: String").count(), 1);
}

#[tokio::test]
async fn test_unresolved_target_is_dropped() {
    let reply = r#"{"classes": [{"nome": "Livro", "atributos": [{"nome": "titulo", "tipo": "String"}],
        "relacionamentos": [{"tipo": "associacao", "alvo": "Fantasma", "cardinalidade": "0..n"}]}]}"#;
    let output = completion_pipeline(ScriptedClient::new(&[reply]))
        .run("RF01. A biblioteca guarda livros.")
        .await
        .unwrap();

    assert_eq!(output.diagram.vertices, 1);
    assert_eq!(output.diagram.edges, 0);
    assert_eq!(output.stats.dropped_edges, 1);
}

#[tokio::test]
async fn test_completion_failure_is_an_error() {
    let result = completion_pipeline(ScriptedClient::new(&[])).run(REQUIREMENTS).await;
    assert!(matches!(
        result,
        Err(PipelineError::Analyzer(AnalyzerError::Completion(CompletionError::Connection(_))))
    ));
}

#[tokio::test]
async fn test_completion_failure_on_the_wire() {
    let analyzer = CompletionAnalyzer::new(ScriptedClient::new(&[]), Locale::Portuguese);
    let output = analyzer.analyze_text(REQUIREMENTS).await;
    assert!(output.is_error());

    let wire = serde_json::to_value(&output).unwrap();
    let message = wire["error"].as_str().unwrap();
    assert!(message.contains("connection refused"), "{message}");
}

// --- Hybrid path ---

#[tokio::test]
async fn test_hybrid_merges_refinement() {
    let reply = r#"{"classes": [
        {"nome": "Cliente", "atributos": [{"nome": "nif", "tipo": "String"}],
         "relacionamentos": [{"tipo": "associacao", "alvo": "Encomenda", "cardinalidade": "1..*"}]},
        {"nome": "Encomenda", "atributos": [{"nome": "data", "tipo": "Date"}]}
    ]}"#;
    let client = ScriptedClient::new(&[reply]);
    let output = hybrid_pipeline(client.clone()).run(REQUIREMENTS).await.unwrap();

    let names = output.model.class_names();
    assert_eq!(&names[..2], ["Cliente", "Encomenda"]);
    assert!(names.contains(&"Produto".to_string()));

    let cliente = attribute_names(&output.model, "Cliente");
    assert!(cliente.contains(&"nif".to_string()));
    assert!(cliente.contains(&"email".to_string()));
    assert!(!output.was_degraded());
    assert_eq!(client.prompts().len(), 1);
}

#[tokio::test]
async fn test_hybrid_degrades_to_heuristic() {
    let output = hybrid_pipeline(ScriptedClient::new(&[])).run(REQUIREMENTS).await.unwrap();

    assert!(output.was_degraded());
    assert_eq!(output.substitutions[0].failed, AnalyzerKind::Completion);
    assert_eq!(output.substitutions[0].used, AnalyzerKind::Syntactic);
    assert!(output.model.class("Cliente").is_some());
    assert!(output.model.class("Produto").is_some());
}

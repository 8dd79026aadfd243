use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use super::{Analysis, Analyzer, AnalyzerKind, AnalyzerResult};
use crate::config::{CompletionConfig, CompletionProvider};
use crate::dedup::Deduplicator;
use crate::json::extract_model;
use crate::lexicon::{Lexicon, Locale};
use crate::model::DomainModel;
use crate::normalize::RequirementDocument;

/// Longest slice of an error body kept in `CompletionError::Status`.
const ERROR_BODY_LIMIT: usize = 300;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Missing API key: set {0}")]
    MissingApiKey(&'static str),
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Cannot reach completion service: {0}")]
    Connection(String),
    #[error("Completion service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid endpoint: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type CompletionResult<T> = Result<T, CompletionError>;

/// Free-text completion: prompt in, text out.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> CompletionResult<String>;
}

/// `reqwest` client for the supported provider dialects. One attempt per
/// call; retrying is up to the caller.
pub struct HttpCompletionClient {
    client: Client,
    provider: CompletionProvider,
    endpoint: Url,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    timeout_seconds: u64,
}

impl HttpCompletionClient {
    pub fn from_config(config: &CompletionConfig) -> CompletionResult<Self> {
        let provider = config.provider;
        let api_key = config.api_key.clone().filter(|k| !k.trim().is_empty());
        if let (Some(var), None) = (provider.api_key_var(), &api_key) {
            return Err(CompletionError::MissingApiKey(var));
        }

        let endpoint = Url::parse(config.endpoint())?;
        let timeout_seconds = config.timeout_seconds();
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            provider,
            endpoint,
            model: config.model().to_string(),
            api_key,
            temperature: config.temperature,
            timeout_seconds,
        })
    }

    pub fn provider(&self) -> CompletionProvider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, prompt: &str) -> CompletionResult<reqwest::RequestBuilder> {
        let builder = match self.provider {
            CompletionProvider::Ollama => self.client.post(self.endpoint.clone()).json(&json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false,
                "options": { "temperature": self.temperature },
            })),
            CompletionProvider::Gemini => {
                let base = self.endpoint.as_str().trim_end_matches('/');
                let mut url = Url::parse(&format!("{base}/{}:generateContent", self.model))?;
                if let Some(key) = &self.api_key {
                    url.query_pairs_mut().append_pair("key", key);
                }
                self.client.post(url).json(&json!({
                    "contents": [{ "parts": [{ "text": prompt }] }],
                    "generationConfig": { "temperature": self.temperature },
                }))
            }
            CompletionProvider::OpenAi | CompletionProvider::DeepSeek | CompletionProvider::OpenRouter => {
                let mut builder = self.client.post(self.endpoint.clone()).json(&json!({
                    "model": self.model,
                    "messages": [{ "role": "user", "content": prompt }],
                    "temperature": self.temperature,
                }));
                if let Some(key) = &self.api_key {
                    builder = builder.bearer_auth(key);
                }
                builder
            }
        };
        Ok(builder)
    }

    fn send_error(&self, error: reqwest::Error) -> CompletionError {
        if error.is_timeout() {
            CompletionError::Timeout(self.timeout_seconds)
        } else if error.is_connect() {
            CompletionError::Connection(error.to_string())
        } else {
            CompletionError::Http(error)
        }
    }
}

#[async_trait::async_trait]
impl CompletionClient for HttpCompletionClient {
    fn name(&self) -> &str {
        self.provider.as_str()
    }

    async fn complete(&self, prompt: &str) -> CompletionResult<String> {
        debug!(provider = %self.provider, model = %self.model, chars = prompt.len(), "Sending completion request");

        let response = self
            .request(prompt)?
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.send_error(e))?;
        if !status.is_success() {
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let text = parse_response(self.provider, &body)?;
        info!(provider = %self.provider, chars = text.len(), "Completion received");
        Ok(text)
    }
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

fn parse_response(provider: CompletionProvider, body: &str) -> CompletionResult<String> {
    let malformed = |e: serde_json::Error| CompletionError::MalformedResponse(e.to_string());
    let text = match provider {
        CompletionProvider::Ollama => serde_json::from_str::<OllamaResponse>(body).map_err(malformed)?.response,
        CompletionProvider::Gemini => serde_json::from_str::<GeminiResponse>(body)
            .map_err(malformed)?
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect::<String>())
            .ok_or_else(|| CompletionError::MalformedResponse("no candidates".into()))?,
        CompletionProvider::OpenAi | CompletionProvider::DeepSeek | CompletionProvider::OpenRouter => {
            serde_json::from_str::<ChatResponse>(body)
                .map_err(malformed)?
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .ok_or_else(|| CompletionError::MalformedResponse("no choices".into()))?
        }
    };
    Ok(text)
}

const SCHEMA: &str = r#"{
  "classes": [
    {
      "nome": "ClassName",
      "atributos": [{"nome": "attributeName", "tipo": "String|Integer|Double|Boolean|Date|Time|DateTime"}],
      "relacionamentos": [{"tipo": "associacao|composicao|agregacao|dependencia|heranca|controle", "alvo": "OtherClass", "cardinalidade": "1..n"}]
    }
  ]
}"#;

/// Prompt asking for the canonical model of `requirements`.
#[must_use]
pub fn extraction_prompt(requirements: &str, locale: Locale) -> String {
    match locale {
        Locale::Portuguese => format!(
            "Analise os seguintes requisitos e extraia as classes de domínio, os seus atributos e relacionamentos.\n\
             Responda apenas com JSON válido, sem texto adicional, neste formato:\n{SCHEMA}\n\n\
             Requisitos:\n{requirements}\n"
        ),
        Locale::English => format!(
            "Analyze the following requirements and extract the domain classes, their attributes and relationships.\n\
             Answer with valid JSON only, no extra text, in this format:\n{SCHEMA}\n\n\
             Requirements:\n{requirements}\n"
        ),
    }
}

/// Prompt asking to validate and complete a preliminary model.
#[must_use]
pub fn refinement_prompt(requirements: &str, preliminary: &DomainModel, locale: Locale) -> String {
    let classes = serde_json::to_string_pretty(&preliminary.classes).unwrap_or_else(|_| "[]".into());
    match locale {
        Locale::Portuguese => format!(
            "Refine o modelo de domínio para os requisitos abaixo.\n\n\
             Requisitos:\n{requirements}\n\n\
             Análise preliminar:\n{classes}\n\n\
             Valide as classes identificadas, adicione as classes em falta, corrija nomes e tipos dos atributos \
             e identifique os relacionamentos importantes.\n\
             Responda apenas com JSON válido neste formato:\n{SCHEMA}\n"
        ),
        Locale::English => format!(
            "Refine the domain model for the requirements below.\n\n\
             Requirements:\n{requirements}\n\n\
             Preliminary analysis:\n{classes}\n\n\
             Validate the classes found, add missing classes, fix attribute names and types \
             and identify the important relationships.\n\
             Answer with valid JSON only in this format:\n{SCHEMA}\n"
        ),
    }
}

/// Asks a completion service for the whole model.
pub struct CompletionAnalyzer {
    client: Arc<dyn CompletionClient>,
    locale: Locale,
    dedup: Deduplicator,
}

impl CompletionAnalyzer {
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>, locale: Locale) -> Self {
        Self {
            client,
            locale,
            dedup: Deduplicator::fuzzy(locale.lexicon(), 0.85),
        }
    }

    #[must_use]
    pub fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.dedup = Deduplicator::fuzzy(self.locale.lexicon(), threshold);
        self
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn lexicon(&self) -> &'static Lexicon {
        self.locale.lexicon()
    }

    /// Sends `prompt` and decodes the reply as a deduplicated model.
    pub async fn request_model(&self, prompt: &str) -> AnalyzerResult<DomainModel> {
        let reply = self.client.complete(prompt).await?;
        let model = extract_model(&reply)?;
        Ok(self.dedup.deduplicate(model))
    }
}

#[async_trait::async_trait]
impl Analyzer for CompletionAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Completion
    }

    async fn analyze(&self, document: &RequirementDocument) -> AnalyzerResult<Analysis> {
        let prompt = extraction_prompt(&document.render(self.lexicon()), self.locale);
        let model = self.request_model(&prompt).await?;
        info!(
            client = self.client.name(),
            classes = model.len(),
            relationships = model.relationship_count(),
            "Completion analysis complete"
        );
        Ok(Analysis::new(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::AnalyzerError;
    use crate::json::JsonExtractError;
    use crate::normalize::TextNormalizer;
    use std::sync::Mutex;

    struct Scripted {
        reply: CompletionResult<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn ok(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl CompletionClient for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, prompt: &str) -> CompletionResult<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(_) => Err(CompletionError::Timeout(1)),
            }
        }
    }

    #[test]
    fn test_parse_dialects() {
        assert_eq!(
            parse_response(CompletionProvider::Ollama, r#"{"model":"llama3","response":"hi","done":true}"#).unwrap(),
            "hi"
        );
        assert_eq!(
            parse_response(
                CompletionProvider::OpenRouter,
                r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"hello"}}]}"#
            )
            .unwrap(),
            "hello"
        );
        assert_eq!(
            parse_response(
                CompletionProvider::Gemini,
                r#"{"candidates":[{"content":{"parts":[{"text":"a"},{"text":"b"}],"role":"model"}}]}"#
            )
            .unwrap(),
            "ab"
        );
        assert!(matches!(
            parse_response(CompletionProvider::OpenAi, r#"{"choices":[]}"#),
            Err(CompletionError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_response(CompletionProvider::Ollama, "<html>"),
            Err(CompletionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_client_config() {
        let mut config = CompletionConfig::default();
        let client = HttpCompletionClient::from_config(&config).unwrap();
        assert_eq!(client.provider(), CompletionProvider::Ollama);
        assert_eq!(client.model(), "llama3");

        config.provider = CompletionProvider::Gemini;
        assert!(matches!(
            HttpCompletionClient::from_config(&config),
            Err(CompletionError::MissingApiKey("GEMINI_API_KEY"))
        ));

        config.api_key = Some("k".into());
        config.endpoint = Some("not a url".into());
        assert!(matches!(
            HttpCompletionClient::from_config(&config),
            Err(CompletionError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let config = CompletionConfig {
            endpoint: Some("http://127.0.0.1:9/api/generate".into()),
            connect_timeout_seconds: 2,
            timeout_seconds: Some(5),
            ..CompletionConfig::default()
        };
        let client = HttpCompletionClient::from_config(&config).unwrap();
        let result = client.complete("hello").await;
        assert!(matches!(
            result,
            Err(CompletionError::Connection(_) | CompletionError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_analyzer_uses_labeled_text() {
        let client = Scripted::ok(
            "Claro! ```json\n{\"classes\": [{\"nome\": \"Livro\", \"atributos\": [{\"nome\": \"isbn\", \"tipo\": \"String\"}]}, {\"nome\": \"Livros\"}]}\n```",
        );
        let analyzer = CompletionAnalyzer::new(client.clone(), Locale::Portuguese);
        let document = TextNormalizer::new().normalize("RF01. O leitor requisita livros.");

        let analysis = analyzer.analyze(&document).await.unwrap();
        assert_eq!(analysis.model.class_names(), vec!["Livro"]);
        assert!(analysis.substitutions.is_empty());

        let prompts = client.prompts.lock().unwrap();
        assert!(prompts[0].contains("Requisito 01: O leitor requisita livros."));
        assert!(prompts[0].contains("\"relacionamentos\""));
    }

    #[tokio::test]
    async fn test_analyzer_errors() {
        let garbage = CompletionAnalyzer::new(Scripted::ok("I cannot help with that."), Locale::English);
        let result = garbage.analyze(&RequirementDocument::from_text("Users borrow books.")).await;
        assert!(matches!(result, Err(AnalyzerError::Json(JsonExtractError::NotFound))));

        let down = Arc::new(Scripted {
            reply: Err(CompletionError::Timeout(1)),
            prompts: Mutex::new(Vec::new()),
        });
        let analyzer = CompletionAnalyzer::new(down, Locale::English);
        let output = analyzer.analyze_text("Users borrow books.").await;
        assert_eq!(
            output,
            crate::analyzer::AnalyzerOutput::Error("Completion failed: Request timed out after 1s".into())
        );
    }

    #[test]
    fn test_prompts_follow_locale() {
        let model = DomainModel::new().with_class(crate::model::ClassEntity::new("Book"));
        let prompt = refinement_prompt("Users borrow books.", &model, Locale::English);
        assert!(prompt.starts_with("Refine the domain model"));
        assert!(prompt.contains("\"nome\": \"Book\""));
        assert!(extraction_prompt("x", Locale::Portuguese).contains("Requisitos:\nx"));
    }
}

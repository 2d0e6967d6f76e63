//! Generative backend seam and the OpenAI-compatible client

use async_trait::async_trait;
use riskdesk_core::{CustomerContext, Error, Result, SupportRequest};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Everything a backend needs to produce one candidate decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPrompt {
    /// Instruction contract, including the customer's name
    pub instructions: String,

    pub question: String,

    /// Account facts, when the context lookup succeeded
    pub context: Option<CustomerContext>,
}

impl GenerationPrompt {
    pub fn new(instructions: String, request: &SupportRequest, context: Option<&CustomerContext>) -> Self {
        Self {
            instructions,
            question: request.question.trim().to_string(),
            context: context.cloned(),
        }
    }

    /// The user turn: the question plus whatever account facts are known
    pub fn user_message(&self) -> String {
        match &self.context {
            Some(ctx) => format!(
                "{}\n\nAccount balance{}: {}",
                self.question,
                if ctx.includes_pending {
                    " (including pending transactions)"
                } else {
                    " (excluding pending transactions)"
                },
                ctx.balance
            ),
            None => format!("{}\n\nAccount balance: unavailable", self.question),
        }
    }
}

/// A text-generation service that answers with a decision-shaped payload.
///
/// Output is untrusted: the orchestrator validates every response.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Return the raw candidate text for `prompt`
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String>;

    fn name(&self) -> &str;
}

/// Connection settings for an OpenAI-compatible chat completions API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API base URL, without the `/chat/completions` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Never read from or written to config files
    #[serde(skip)]
    pub api_key: String,

    #[serde(default)]
    pub temperature: f32,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: String::new(),
            temperature: 0.0,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Backend speaking the OpenAI chat completions protocol in JSON mode
pub struct OpenAiBackend {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::config("generative backend requires an API key"));
        }

        // No client-side timeout: each call is bounded by the orchestrator.
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl GenerativeBackend for OpenAiBackend {
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<String> {
        let user = prompt.user_message();
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.instructions,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: self.config.temperature,
        };

        debug!(model = %self.config.model, "Sending generative request");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::backend(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::backend(format!("backend returned {}", status)));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::backend(format!("malformed completion: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| Error::backend("backend returned no choices"))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

//! Chat-completion client for the question-answering endpoint.
//!
//! Sends a system instruction carrying the current records plus the user's
//! question to an Azure OpenAI deployment and returns the reply text. Calls
//! are never retried; failures surface as `CompletionError`, whose display
//! text is what the chat endpoint returns to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{
    CompletionConfig, COMPLETION_CONNECT_TIMEOUT_SECS, COMPLETION_TEMPERATURE, USER_AGENT,
};

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// The API answered with a non-success status.
    #[error("Error al obtener respuesta: {0}")]
    Status(u16),

    /// The request could not be sent or the reply could not be read.
    #[error("Error al conectar con Azure OpenAI: {0}")]
    Transport(String),

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

/// Anything that can turn a system instruction and a question into a reply.
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    async fn complete(&self, system: &str, question: &str) -> Result<String, CompletionError>;
}

/// Fixed instruction wrapped around the rendered records.
pub fn system_prompt(records: &str) -> String {
    format!(
        "Eres un asistente que proporciona información sobre la tragedia de la discoteca Jet Set en República Dominicana. \
         Analiza cuidadosamente la siguiente información actualizada sobre las víctimas:\n\n\
         {records}\n\n\
         Cuando te pregunten por una persona específica:\n\
         1. Busca exactamente si esa persona aparece en la lista de fallecidos o de pacientes en hospitales.\n\
         2. Si la persona está en la lista de fallecidos, expresa tus condolencias.\n\
         3. Si la persona está en un hospital, indica el hospital y su edad si está disponible.\n\
         4. Si la persona no aparece en ninguna lista, indica claramente que no tienes información sobre esa persona.\n\
         5. Responde con empatía y precisión, esta información es muy sensible."
    )
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Azure OpenAI chat-completions client.
pub struct AzureChatClient {
    client: Client,
    url: String,
    api_key: String,
}

impl AzureChatClient {
    pub fn new(config: &CompletionConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(COMPLETION_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| CompletionError::Client(e.to_string()))?;

        Ok(Self {
            client,
            url: config.chat_url(),
            api_key: config.api_key.clone().unwrap_or_default(),
        })
    }
}

#[async_trait]
impl ChatCompleter for AzureChatClient {
    async fn complete(&self, system: &str, question: &str) -> Result<String, CompletionError> {
        let request = ChatCompletionRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: question,
                },
            ],
            temperature: COMPLETION_TEMPERATURE,
            stream: false,
        };

        let response = self
            .client
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Completion API returned an error");
            return Err(CompletionError::Status(status.as_u16()));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| CompletionError::Transport("no content in completion response".to_string()))
    }
}

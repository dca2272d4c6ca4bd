use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::application::tooling::ToolSpec;
use crate::domain::types::{ChatMessage, MessageRole};

#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stop: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub message: ChatMessage,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("model provider returned invalid response: {0}")]
    InvalidResponse(String),
    #[error("model provider failed: {0}")]
    Backend(String),
}

impl ModelError {
    pub fn user_message(&self) -> String {
        match self {
            ModelError::Network(err) => {
                if err.is_connect() {
                    "Could not reach the model service. Make sure the Ollama server is running and reachable."
                        .to_string()
                } else if err.is_timeout() {
                    "The model request timed out. Try again shortly.".to_string()
                } else if let Some(status) = err.status() {
                    match status {
                        StatusCode::NOT_FOUND => {
                            "Model endpoint not found (404). Check that the server exposes /api/chat."
                                .to_string()
                        }
                        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                            "The model service is currently unavailable. Try again later.".to_string()
                        }
                        _ => format!(
                            "The model request failed with status {}. Try again later.",
                            status.as_u16()
                        ),
                    }
                } else {
                    "A network error occurred while contacting the model service.".to_string()
                }
            }
            ModelError::InvalidResponse(_) => {
                "The model service returned a response that could not be processed.".to_string()
            }
            ModelError::Backend(_) => {
                "The model backend reported a failure. Try again later.".to_string()
            }
        }
    }
}

/// Free-text planning backend: one prompt in, one reply out.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn invoke(&self, request: ModelRequest) -> Result<ModelResponse, ModelError>;
}

/// One entry of a native tool-calling trace, in the order the backend
/// produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    ToolCall {
        name: String,
        arguments: Map<String, Value>,
    },
    Assistant {
        content: String,
    },
}

#[derive(Debug, Clone)]
pub struct ToolRunRequest {
    pub input: String,
    pub tools: Vec<ToolSpec>,
    pub system_prompt: Option<String>,
}

/// Backend that drives the whole plan/act/observe cycle itself and reports
/// back a structured trace.
#[async_trait]
pub trait ToolCallingProvider: Send + Sync {
    async fn run_with_tools(&self, request: ToolRunRequest) -> Result<Vec<TraceEvent>, ModelError>;
}

#[derive(Clone)]
pub struct OllamaClient {
    http: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            http: client,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        let trimmed = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{trimmed}/{path}")
    }
}

#[async_trait]
impl ModelProvider for OllamaClient {
    async fn invoke(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let url = self.endpoint("/api/chat");
        let payload = OllamaChatRequest::from(&request);
        info!(
            model = request.model.as_str(),
            url = %url,
            messages = request.messages.len(),
            "Sending request to model provider"
        );
        let response: OllamaChatResponse = self
            .http
            .post(url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!("Received response from model provider");

        let message = response
            .message
            .ok_or_else(|| ModelError::InvalidResponse("missing message field".into()))?;

        let role = MessageRole::from_str(message.role.as_str())
            .ok_or_else(|| ModelError::InvalidResponse("unknown role in response".into()))?;

        Ok(ModelResponse {
            message: ChatMessage::new(role, message.content),
        })
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    stop: Vec<String>,
}

impl From<&ModelRequest> for OllamaChatRequest {
    fn from(value: &ModelRequest) -> Self {
        Self {
            model: value.model.clone(),
            messages: value
                .messages
                .iter()
                .map(|msg| OllamaChatMessage {
                    role: msg.role.as_str().to_string(),
                    content: msg.content.clone(),
                })
                .collect(),
            stream: false,
            options: (!value.stop.is_empty()).then(|| OllamaOptions {
                stop: value.stop.clone(),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaChatMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_paths_correctly() {
        let client = OllamaClient::new("http://localhost:11434/");
        assert_eq!(
            client.endpoint("/api/chat"),
            "http://localhost:11434/api/chat"
        );
    }

    #[test]
    fn request_conversion_preserves_roles_and_stop_sequences() {
        let request = ModelRequest {
            model: "gemma3:4b".into(),
            messages: vec![
                ChatMessage::new(MessageRole::System, "stay concise"),
                ChatMessage::new(MessageRole::User, "hi"),
            ],
            stop: vec!["Observation:".into()],
        };
        let payload = OllamaChatRequest::from(&request);
        let roles: Vec<_> = payload.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user"]);
        assert_eq!(
            payload.options.expect("options present").stop,
            vec!["Observation:".to_string()]
        );
    }

    #[test]
    fn user_messages_stay_presentable() {
        let invalid = ModelError::InvalidResponse("missing message field".into());
        assert!(invalid.user_message().contains("could not be processed"));

        let backend = ModelError::Backend("executor crashed".into());
        assert!(backend.user_message().contains("model backend"));
    }

    #[test]
    fn empty_stop_list_omits_options() {
        let request = ModelRequest {
            model: "llama3".into(),
            messages: vec![ChatMessage::new(MessageRole::User, "hi")],
            stop: Vec::new(),
        };
        let payload = OllamaChatRequest::from(&request);
        assert!(payload.options.is_none());
    }
}

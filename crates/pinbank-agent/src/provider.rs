//! Chat provider implementations
//!
//! The agent talks to any OpenAI-compatible chat-completions endpoint; the
//! defaults point at Gemini's compatibility surface, which is what the
//! system this replaces used.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Trait for chat-completion providers
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider name, for logs
    fn name(&self) -> &'static str;

    /// Complete a conversation
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}

// ============================================================================
// OpenAI-compatible provider
// ============================================================================

/// Configuration for an OpenAI-compatible endpoint
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("PINBANK_LLM_BASE_URL").unwrap_or_else(|_| {
                "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
            }),
            api_key: std::env::var("PINBANK_LLM_API_KEY")
                .ok()
                .or_else(|| std::env::var("GEMINI_API_KEY").ok()),
            model: std::env::var("PINBANK_LLM_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
        }
    }
}

/// OpenAI-compatible chat-completions provider
pub struct OpenAiCompatProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Build a provider from `PINBANK_LLM_*` environment variables,
    /// loading `.env` first
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::new(ProviderConfig::default())
    }
}

#[derive(Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: WireFunctionCall,
}

#[derive(Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded argument object, per the chat-completions wire format
    arguments: String,
}

#[derive(Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction,
}

#[derive(Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Deserialize)]
struct WireResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

fn to_wire_message(message: &Message) -> WireMessage {
    let role = match message.role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
        MessageRole::Tool => "tool",
    };

    let tool_calls = if message.tool_calls.is_empty() {
        None
    } else {
        Some(
            message
                .tool_calls
                .iter()
                .map(|call| WireToolCall {
                    id: call.id.clone(),
                    kind: "function".to_string(),
                    function: WireFunctionCall {
                        name: call.name.clone(),
                        arguments: call.arguments.to_string(),
                    },
                })
                .collect(),
        )
    };

    WireMessage {
        role,
        content: if message.content.is_empty() && tool_calls.is_some() {
            None
        } else {
            Some(message.content.clone())
        },
        tool_calls,
        tool_call_id: message.tool_call_id.clone(),
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatProvider {
    fn name(&self) -> &'static str {
        "openai_compat"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system {
            messages.push(WireMessage {
                role: "system",
                content: Some(system.clone()),
                tool_calls: None,
                tool_call_id: None,
            });
        }
        messages.extend(request.messages.iter().map(to_wire_message));

        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(
                request
                    .tools
                    .iter()
                    .map(|spec| WireTool {
                        kind: "function",
                        function: WireFunction {
                            name: spec.name.clone(),
                            description: spec.description.clone(),
                            parameters: spec.parameters.clone(),
                        },
                    })
                    .collect(),
            )
        };

        let wire_request = WireRequest {
            model: self.config.model.clone(),
            messages,
            tools,
            temperature: request.temperature,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        let mut builder = self.client.post(&url).json(&wire_request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| AgentError::NetworkError {
            message: e.to_string(),
        })?;

        if !response.status().is_success() {
            return Err(AgentError::RequestFailed {
                message: format!("HTTP {}", response.status()),
            });
        }

        let wire_response: WireResponse =
            response.json().await.map_err(|e| AgentError::InvalidResponse {
                message: e.to_string(),
            })?;

        let choice = wire_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::InvalidResponse {
                message: "response contained no choices".to_string(),
            })?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                let arguments = serde_json::from_str(&call.function.arguments).map_err(|e| {
                    AgentError::InvalidResponse {
                        message: format!("malformed tool arguments: {e}"),
                    }
                })?;
                Ok(ToolCall {
                    id: call.id,
                    name: call.function.name,
                    arguments,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
        })
    }
}

// ============================================================================
// Scripted provider (tests)
// ============================================================================

/// A provider that replays a fixed sequence of responses
pub struct ScriptedProvider {
    responses: std::sync::Mutex<std::collections::VecDeque<CompletionResponse>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses.into_iter().collect()),
        }
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse> {
        self.responses
            .lock()
            .map_err(|_| AgentError::RequestFailed {
                message: "scripted provider poisoned".to_string(),
            })?
            .pop_front()
            .ok_or_else(|| AgentError::RequestFailed {
                message: "scripted provider exhausted".to_string(),
            })
    }
}

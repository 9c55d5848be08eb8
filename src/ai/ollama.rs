//! HTTP client for a locally hosted Ollama endpoint.
//!
//! Both operations degrade rather than fail: `generate_text` maps every
//! transport or parse error to a visible fallback string, and
//! `vision_extract` maps them to absent fields. Callers never see an `Err`
//! from this module.

use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Prefix of the fallback string returned when the dialogue model cannot
/// be reached or its reply cannot be parsed.
pub const ERROR_MARKER: &str = "\u{26a0}\u{fe0f} Local model error:";

const CHAT_TIMEOUT: Duration = Duration::from_secs(120);
const VISION_TIMEOUT: Duration = Duration::from_secs(180);

const VISION_INSTRUCTION: &str = "List visible objects, colors, and the scene as strict JSON \
     with keys: objects (list), colors (list), scene (string). \
     Keep lists short. Do not invent unseen things.";

/// Extracted image attributes: `(objects, colors, scene)`, each
/// independently absent when the vision model did not provide it.
pub type ImageAttributes = (Option<Vec<String>>, Option<Vec<String>>, Option<String>);

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<MessageContent>,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: String,
}

/// Client for the local model-serving endpoint.
pub struct OllamaClient {
    base_url: String,
    client: Client,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::builder().build().unwrap_or_default(),
        }
    }

    /// Generate a dialogue reply, clamped to at most two non-empty lines.
    ///
    /// Never fails: any transport, status, or parse problem yields a string
    /// starting with [`ERROR_MARKER`].
    pub async fn generate_text(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
    ) -> String {
        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                    images: None,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                    images: None,
                },
            ],
            stream: false,
        };

        match self.chat(&request, CHAT_TIMEOUT).await {
            Ok(content) => clamp_two_lines(&content),
            Err(e) => format!("{ERROR_MARKER} {e}"),
        }
    }

    /// Ask the vision model to describe an image as JSON and pull out the
    /// `(objects, colors, scene)` attributes.
    ///
    /// Never fails: a total failure yields `(None, None, None)`.
    pub async fn vision_extract(&self, image_bytes: &[u8], model: &str) -> ImageAttributes {
        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: VISION_INSTRUCTION.to_string(),
                images: Some(vec![STANDARD.encode(image_bytes)]),
            }],
            stream: false,
        };

        let content = match self.chat(&request, VISION_TIMEOUT).await {
            Ok(content) => content,
            Err(e) => {
                log::warn!("vision request failed: {}", e);
                return (None, None, None);
            }
        };

        let data = parse_json_lenient(&content);
        (
            string_list(&data, "objects"),
            string_list(&data, "colors"),
            data.get("scene")
                .and_then(|v| v.as_str())
                .map(str::to_string),
        )
    }

    async fn chat(&self, request: &ChatRequest, timeout: Duration) -> Result<String, String> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| format!("Ollama request failed: {}. Is Ollama running?", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("Ollama API error ({}): {}", status, body));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse Ollama response: {}", e))?;

        Ok(body.message.map(|m| m.content).unwrap_or_default())
    }
}

/// Trim each line, drop empty ones, keep at most the first two. A reply
/// with no non-empty lines passes through trimmed.
fn clamp_two_lines(content: &str) -> String {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        content.trim().to_string()
    } else {
        lines[..lines.len().min(2)].join("\n")
    }
}

/// Parse the model output as JSON; on failure fall back to the outermost
/// `{...}` substring. A known-lossy heuristic, not a JSON repair pass.
fn parse_json_lenient(content: &str) -> serde_json::Value {
    serde_json::from_str(content).unwrap_or_else(|_| {
        match (content.find('{'), content.rfind('}')) {
            (Some(start), Some(end)) if end > start => {
                serde_json::from_str(&content[start..=end]).unwrap_or(serde_json::Value::Null)
            }
            _ => serde_json::Value::Null,
        }
    })
}

fn string_list(data: &serde_json::Value, key: &str) -> Option<Vec<String>> {
    data.get(key)?.as_array().map(|items| {
        items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()
    })
}

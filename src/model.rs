use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::{AnalysisError, Result};

/// One prompt in, one reply out. Implementations must be safe to share
/// between threads analyzing different documents.
pub trait ModelClient: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String>;
}

impl<T: ModelClient + ?Sized> ModelClient for Box<T> {
    fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt)
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    content: String,
}

/// Non-streaming client for an Ollama-compatible `/api/chat` endpoint.
pub struct OllamaClient {
    http: Client,
    endpoint: String,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| AnalysisError::ModelUnavailable(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: settings.model_endpoint.trim_end_matches('/').to_string(),
            model: settings.model_name.clone(),
            timeout: settings.timeout,
        })
    }

    fn map_transport_error(&self, e: reqwest::Error) -> AnalysisError {
        if e.is_timeout() {
            AnalysisError::ModelTimeout(self.timeout)
        } else {
            AnalysisError::ModelUnavailable(e.to_string())
        }
    }
}

impl ModelClient for OllamaClient {
    fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/chat", self.endpoint);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        debug!("Model request to {url} (model={}, {} chars)", self.model, prompt.len());
        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(AnalysisError::ModelUnavailable(format!(
                "model API error ({status}): {body}"
            )));
        }

        let reply: ChatReply = response
            .json()
            .map_err(|e| AnalysisError::MalformedModelOutput(e.to_string()))?;
        debug!("Model reply: {} chars", reply.message.content.len());
        Ok(reply.message.content)
    }
}

/// Stands in for the model when it is switched off; every call is unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledModel;

impl ModelClient for DisabledModel {
    fn complete(&self, _prompt: &str) -> Result<String> {
        Err(AnalysisError::ModelUnavailable("model disabled".to_string()))
    }
}

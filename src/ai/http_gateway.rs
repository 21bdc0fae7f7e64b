use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::AiGatewayConfig;
use crate::errors::{AppError, AppResult};

use super::{AiGateway, ChatMessage, ChatPrompt};

const SERVICE_NAME: &str = "ai_gateway";

/// Chat-completions client over HTTP
pub struct HttpAiGateway {
    client: Client,
    url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl HttpAiGateway {
    pub fn from_config(config: &AiGatewayConfig) -> AppResult<Self> {
        let timeout = config
            .timeout()
            .map_err(|e| AppError::configuration(e.to_string()))?;
        let api_key = config.resolved_api_key();
        if api_key.is_none() {
            warn!("No AI gateway API key configured; requests will be sent unauthenticated");
        }
        Self::new(config.url.clone(), api_key, config.model.clone(), timeout)
    }

    pub fn new(
        url: String,
        api_key: Option<String>,
        model: String,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url,
            api_key,
            model,
        })
    }

    /// Map gateway status codes to the errors clients handle specially
    fn status_error(status: StatusCode, body: &str) -> AppError {
        match status {
            StatusCode::TOO_MANY_REQUESTS => AppError::RateLimited,
            StatusCode::PAYMENT_REQUIRED => AppError::CreditsExhausted,
            _ => AppError::external_service(
                SERVICE_NAME,
                format!("HTTP {}: {}", status.as_u16(), truncate(body, 500)),
            ),
        }
    }
}

#[async_trait]
impl AiGateway for HttpAiGateway {
    async fn complete(&self, prompt: ChatPrompt) -> AppResult<String> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: &prompt.messages,
            temperature: prompt.temperature,
        };

        debug!(
            model = %self.model,
            messages = prompt.messages.len(),
            multimodal = prompt.has_image(),
            "Sending chat completion request"
        );

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            AppError::external_service(SERVICE_NAME, format!("request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("AI gateway returned {}", status);
            return Err(Self::status_error(status, &text));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            AppError::external_service(SERVICE_NAME, format!("unreadable response: {e}"))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::external_service(SERVICE_NAME, "completion had no content"))
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_status_codes_map_to_coded_errors() {
        assert!(matches!(
            HttpAiGateway::status_error(StatusCode::TOO_MANY_REQUESTS, ""),
            AppError::RateLimited
        ));
        assert!(matches!(
            HttpAiGateway::status_error(StatusCode::PAYMENT_REQUIRED, ""),
            AppError::CreditsExhausted
        ));
        assert!(matches!(
            HttpAiGateway::status_error(StatusCode::BAD_GATEWAY, "upstream down"),
            AppError::ExternalService { .. }
        ));
    }

    #[test]
    fn request_body_uses_configured_model() {
        let messages = vec![ChatMessage::user("hello")];
        let body = ChatCompletionRequest {
            model: "test-model",
            messages: &messages,
            temperature: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "test-model");
        assert_eq!(json["messages"][0]["content"], "hello");
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn long_bodies_are_truncated_on_char_boundary() {
        assert_eq!(truncate("ééé", 2), "éé");
        assert_eq!(truncate("ab", 5), "ab");
    }
}

//! AI completion gateway
//!
//! The service delegates image understanding and text generation to an
//! OpenAI-compatible chat-completions endpoint. Everything above this module
//! talks to the [`AiGateway`] trait so tests can substitute a scripted fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppResult;

pub mod http_gateway;
pub mod prompts;
pub mod response_parser;

pub use http_gateway::HttpAiGateway;
pub use response_parser::extract_json_object;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// Plain text or a list of multimodal parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: MessageContent::Text(text.into()),
        }
    }

    /// A user turn carrying an instruction and one image
    pub fn user_with_image(text: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image_url.into(),
                    },
                },
            ]),
        }
    }

    /// Concatenated text parts, used for logging and by test fakes
    pub fn text(&self) -> String {
        match &self.content {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// A completion request without the model, which the gateway fills in
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatPrompt {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
}

impl ChatPrompt {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn has_image(&self) -> bool {
        self.messages.iter().any(|message| {
            matches!(&message.content, MessageContent::Parts(parts)
                if parts.iter().any(|part| matches!(part, ContentPart::ImageUrl { .. })))
        })
    }
}

/// A chat-completions backend
#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Send the prompt and return the text of the first choice
    async fn complete(&self, prompt: ChatPrompt) -> AppResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multimodal_message_serializes_in_chat_completions_shape() {
        let message = ChatMessage::user_with_image("describe", "data:image/png;base64,AAAA");
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "role": "user",
                "content": [
                    {"type": "text", "text": "describe"},
                    {"type": "image_url", "image_url": {"url": "data:image/png;base64,AAAA"}}
                ]
            })
        );
    }

    #[test]
    fn text_skips_image_parts() {
        let message = ChatMessage::user_with_image("describe", "data:image/png;base64,AAAA");
        assert_eq!(message.text(), "describe");
        assert!(ChatPrompt::new(vec![message]).has_image());
        assert!(!ChatPrompt::new(vec![ChatMessage::user("hi")]).has_image());
    }
}

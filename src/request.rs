//! Chat-completion [`ChatRequest`] types.

use std::num::NonZeroU16;

use crate::{Model, Tone};
use serde::{Deserialize, Serialize};

pub mod message;
pub use message::{Message, Role};

/// Request body for the chat-completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(any(feature = "partial-eq", test), derive(PartialEq))]
pub struct ChatRequest {
    /// [`Model`] to use for inference.
    pub model: Model,
    /// Input [`Message`]s, in order. Press releases always send a system
    /// message followed by a single user message.
    pub messages: Vec<Message>,
    /// Sampling temperature. Serialized as the [`Tone`]'s temperature, so only
    /// 0.3, 0.7 and 1.0 can ever be sent.
    pub temperature: Tone,
    /// Max tokens to generate.
    pub max_tokens: NonZeroU16,
}

impl ChatRequest {
    /// Create a request with a system instruction and a user prompt.
    pub fn new<S, P>(
        model: Model,
        system: S,
        prompt: P,
        temperature: Tone,
        max_tokens: NonZeroU16,
    ) -> Self
    where
        S: Into<String>,
        P: Into<String>,
    {
        Self {
            model,
            messages: vec![Message::system(system), Message::user(prompt)],
            temperature,
            max_tokens,
        }
    }

    /// Set the [`model`].
    ///
    /// [`model`]: ChatRequest::model
    pub fn model<M>(mut self, model: M) -> Self
    where
        M: Into<Model>,
    {
        self.model = model.into();
        self
    }

    /// The first [`Role::System`] message content, if any.
    pub fn system(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
    }

    /// The last [`Role::User`] message content, if any.
    pub fn prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_body() {
        let request = ChatRequest::new(
            Model::Gpt4,
            "system text",
            "user text",
            Tone::Concise,
            NonZeroU16::new(4000).unwrap(),
        );

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gpt-4",
                "messages": [
                    {"role": "system", "content": "system text"},
                    {"role": "user", "content": "user text"},
                ],
                "temperature": 0.3f32,
                "max_tokens": 4000,
            })
        );
    }

    #[test]
    fn test_accessors() {
        let request = ChatRequest::new(
            Model::default(),
            "sys",
            "hello",
            Tone::Balanced,
            NonZeroU16::new(10).unwrap(),
        )
        .model(Model::Gpt4o);

        assert_eq!(request.system(), Some("sys"));
        assert_eq!(request.prompt(), Some("hello"));
        assert_eq!(request.model, Model::Gpt4o);
    }
}

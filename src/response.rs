//! Chat-completion [`ChatCompletion`] types and the [`Generation`] outcome.

use derive_more::derive::IsVariant;
use serde::{Deserialize, Serialize};

use crate::{client, request::Role};

/// Successful response body from the chat-completion endpoint. Only the
/// fields this crate reads are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(any(feature = "partial-eq", test), derive(PartialEq))]
pub struct ChatCompletion {
    /// Unique `id` for the completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Model that actually served the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Completions. Only the first is used.
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Token accounting for this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ChatCompletion {
    /// Text of the first choice, if there is a choice and it has content.
    pub fn first_text(&self) -> Option<&str> {
        self.choices.first()?.message.content.as_deref()
    }
}

/// A single completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(any(feature = "partial-eq", test), derive(PartialEq))]
pub struct Choice {
    /// Index of the choice.
    #[serde(default)]
    pub index: u32,
    /// The generated message.
    pub message: ChoiceMessage,
    /// Why the model stopped, for example `stop` or `length`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Generated message. `content` is `null` on refusals and tool calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(any(feature = "partial-eq", test), derive(PartialEq))]
pub struct ChoiceMessage {
    /// Author, normally [`Role::Assistant`].
    pub role: Role,
    /// Generated text.
    #[serde(default)]
    pub content: Option<String>,
}

/// Usage statistics for a single completion.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[cfg_attr(any(feature = "partial-eq", test), derive(PartialEq))]
pub struct Usage {
    /// Number of input tokens used.
    pub prompt_tokens: u64,
    /// Number of output tokens generated.
    pub completion_tokens: u64,
    /// Sum of the two.
    pub total_tokens: u64,
}

/// Soft failures: the service answered but there is nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Warning {
    /// 2xx response without any usable choice.
    #[display("⚠️ 응답을 생성하지 못했습니다.")]
    EmptyResponse,
}

/// What went wrong on a [`Generation::Failure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum FailureKind {
    /// Connection, TLS or body transfer failed.
    #[display("transport")]
    Transport,
    /// The request-scoped timeout elapsed.
    #[display("timeout")]
    Timeout,
    /// The service answered with a non-2xx status.
    #[display("service")]
    Service,
    /// A 2xx body that could not be decoded.
    #[display("parse")]
    Parse,
}

/// Outcome of one generation request. Callers branch on the variant; the
/// [`Display`] impl renders the user-facing text for each.
///
/// [`Display`]: std::fmt::Display
#[derive(Debug, Clone, PartialEq, Eq, IsVariant)]
pub enum Generation {
    /// Generated prose, verbatim.
    Success(String),
    /// The service answered with nothing usable.
    Warning(Warning),
    /// The request failed. `detail` describes the underlying error.
    Failure {
        #[allow(missing_docs)]
        kind: FailureKind,
        #[allow(missing_docs)]
        detail: String,
    },
}

impl Generation {
    /// Prefix of the rendered [`Generation::Failure`] text.
    pub const FAILURE_PREFIX: &'static str = "❌ OpenAI API 요청 중 오류 발생: ";

    /// Classify the result of a chat-completion call.
    pub fn from_result(result: client::Result<ChatCompletion>) -> Self {
        match result {
            Ok(completion) => match completion.first_text() {
                Some(text) => Self::Success(text.to_string()),
                None => Self::Warning(Warning::EmptyResponse),
            },
            Err(error) => Self::from(error),
        }
    }

    /// Generated text, if this is a [`Generation::Success`].
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Success(text) => Some(text),
            _ => None,
        }
    }

    /// Convert into the generated text, if this is a [`Generation::Success`].
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Success(text) => Some(text),
            _ => None,
        }
    }
}

impl From<client::Error> for Generation {
    fn from(error: client::Error) -> Self {
        let kind = match &error {
            client::Error::HTTP(e) if e.is_timeout() => FailureKind::Timeout,
            client::Error::HTTP(e) if e.is_decode() => FailureKind::Parse,
            client::Error::HTTP(_) => FailureKind::Transport,
            client::Error::Parse(_) => FailureKind::Parse,
            client::Error::Api { .. } | client::Error::Status { .. } => {
                FailureKind::Service
            }
        };

        Self::Failure {
            kind,
            detail: error.to_string(),
        }
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success(text) => f.write_str(text),
            Self::Warning(warning) => write!(f, "{}", warning),
            Self::Failure { detail, .. } => {
                write!(f, "{}{}", Self::FAILURE_PREFIX, detail)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub const RESPONSE_JSON: &str = r#"{
    "id": "chatcmpl-123",
    "object": "chat.completion",
    "created": 1677652288,
    "model": "gpt-4o-mini",
    "choices": [{
        "index": 0,
        "message": {
            "role": "assistant",
            "content": "X"
        },
        "finish_reason": "stop"
    }],
    "usage": {
        "prompt_tokens": 9,
        "completion_tokens": 12,
        "total_tokens": 21
    }
}"#;

    pub const EMPTY_RESPONSE_JSON: &str = r#"{
    "id": "chatcmpl-456",
    "object": "chat.completion",
    "model": "gpt-4o-mini",
    "choices": []
}"#;

    #[test]
    fn deserialize_completion() {
        let completion: ChatCompletion =
            serde_json::from_str(RESPONSE_JSON).unwrap();
        assert_eq!(completion.id.as_deref(), Some("chatcmpl-123"));
        assert_eq!(completion.choices.len(), 1);
        assert_eq!(completion.choices[0].message.role, Role::Assistant);
        assert_eq!(completion.usage.unwrap().total_tokens, 21);
    }

    #[test]
    fn test_success_is_verbatim() {
        let completion: ChatCompletion =
            serde_json::from_str(RESPONSE_JSON).unwrap();
        let generation = Generation::from_result(Ok(completion));
        assert_eq!(generation, Generation::Success("X".to_string()));
        assert_eq!(generation.to_string(), "X");
        assert_eq!(generation.text(), Some("X"));
    }

    #[test]
    fn test_zero_choices_is_warning() {
        let completion: ChatCompletion =
            serde_json::from_str(EMPTY_RESPONSE_JSON).unwrap();
        let generation = Generation::from_result(Ok(completion));
        assert_eq!(generation, Generation::Warning(Warning::EmptyResponse));
        assert_eq!(generation.to_string(), "⚠️ 응답을 생성하지 못했습니다.");
        assert!(generation.into_text().is_none());
    }

    #[test]
    fn test_null_content_is_warning() {
        let completion: ChatCompletion = serde_json::from_str(
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":null}}]}"#,
        )
        .unwrap();
        assert!(Generation::from_result(Ok(completion)).is_warning());
    }

    #[test]
    fn test_service_failure() {
        let error = client::Error::Status {
            status: 503,
            body: "upstream unavailable".to_string(),
        };
        let generation = Generation::from_result(Err(error));

        match &generation {
            Generation::Failure { kind, detail } => {
                assert_eq!(*kind, FailureKind::Service);
                assert!(detail.contains("upstream unavailable"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(generation.to_string().starts_with(Generation::FAILURE_PREFIX));
    }

    #[test]
    fn test_parse_failure() {
        let error = serde_json::from_str::<ChatCompletion>("not json")
            .map_err(client::Error::from);
        let generation = Generation::from_result(error);
        assert!(matches!(
            generation,
            Generation::Failure {
                kind: FailureKind::Parse,
                ..
            }
        ));
    }
}

//! A [`request::Message`] and associated types. The API returns the assistant
//! reply in the same shape inside a [`response::Choice`].
//!
//! [`request::Message`]: crate::request::Message
//! [`response::Choice`]: crate::response::Choice

use serde::{Deserialize, Serialize};

/// Role of the [`Message`] author.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Instructions the model gives special attention to.
    System,
    /// From the user.
    User,
    /// From the AI.
    Assistant,
}

/// A message in a [`ChatRequest`].
///
/// A message is rendered as markdown with a [heading] indicating the [`Role`]
/// of the author.
///
/// [`ChatRequest`]: crate::request::ChatRequest
/// [heading]: Message::HEADING
#[derive(Debug, Clone, Serialize, Deserialize, derive_more::Display)]
#[cfg_attr(any(feature = "partial-eq", test), derive(PartialEq))]
#[display("{}{}\n\n{}", Self::HEADING, role, content)]
pub struct Message {
    /// Who is providing the content.
    pub role: Role,
    /// The content of the message.
    pub content: String,
}

impl Message {
    /// Heading for the message when rendered as markdown using [`Display`].
    ///
    /// [`Display`]: std::fmt::Display
    pub const HEADING: &'static str = "### ";

    /// A [`Role::System`] message.
    pub fn system<S>(content: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// A [`Role::User`] message.
    pub fn user<S>(content: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

impl<S> From<(Role, S)> for Message
where
    S: Into<String>,
{
    fn from((role, content): (Role, S)) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub const MESSAGE_JSON: &str =
        r#"{"role": "user", "content": "Hello, world"}"#;

    #[test]
    fn deserialize_message() {
        let message: Message = serde_json::from_str(MESSAGE_JSON).unwrap();
        assert_eq!(message, Message::user("Hello, world"));
        assert_eq!(message.to_string(), "### User\n\nHello, world");
    }

    #[test]
    fn serialize_role() {
        let json = serde_json::to_value(Message::system("be brief")).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "be brief");
    }
}

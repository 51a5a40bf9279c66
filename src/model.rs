//! [`Model`] to use for inference.
use serde::{Deserialize, Serialize};

/// Model to use for inference. Anything the provider serves but isn't listed
/// here can be used through [`Model::Custom`].
#[derive(
    Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub enum Model {
    /// GPT-4. Used by the briefing form.
    #[serde(rename = "gpt-4")]
    Gpt4,
    /// GPT-4o
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    /// GPT-4o mini. This is the default model.
    #[default]
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    /// Any other model identifier, sent as is.
    #[serde(untagged)]
    Custom(String),
}

impl Model {
    /// Wire identifier of the model.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Gpt4 => "gpt-4",
            Self::Gpt4o => "gpt-4o",
            Self::Gpt4oMini => "gpt-4o-mini",
            Self::Custom(id) => id,
        }
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "gpt-4" => Self::Gpt4,
            "gpt-4o" => Self::Gpt4o,
            "gpt-4o-mini" => Self::Gpt4oMini,
            other => Self::Custom(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize() {
        assert_eq!(serde_json::to_string(&Model::Gpt4).unwrap(), "\"gpt-4\"");
        assert_eq!(
            serde_json::to_string(&Model::Custom("o3-mini".into())).unwrap(),
            "\"o3-mini\""
        );
    }

    #[test]
    fn test_deserialize() {
        let model: Model = serde_json::from_str("\"gpt-4o-mini\"").unwrap();
        assert_eq!(model, Model::Gpt4oMini);
        let model: Model = serde_json::from_str("\"gpt-4-0613\"").unwrap();
        assert_eq!(model, Model::Custom("gpt-4-0613".into()));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("gpt-4o".parse::<Model>().unwrap(), Model::Gpt4o);
        assert_eq!(
            "local-llama".parse::<Model>().unwrap().to_string(),
            "local-llama"
        );
    }
}

//! Writing [`Tone`] and its sampling temperature.

use serde::{Deserialize, Serialize};

/// How plain or elaborate the generated prose should be. This is the only way
/// to choose a sampling temperature, so a request can never carry anything but
/// one of the three values below.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    derive_more::Display,
    derive_more::IsVariant,
)]
pub enum Tone {
    /// "단순명료": short and plain. Temperature 0.3.
    #[display("단순명료")]
    Concise,
    /// "보통설명": moderately descriptive. Temperature 0.7.
    #[default]
    #[display("보통설명")]
    Balanced,
    /// "상세한설명": detailed. Temperature 1.0.
    #[display("상세한설명")]
    Detailed,
}

impl Tone {
    /// All tones, in the order they are offered to the user.
    pub const ALL: [Tone; 3] = [Self::Concise, Self::Balanced, Self::Detailed];

    /// Sampling temperature for this tone.
    pub const fn temperature(self) -> f32 {
        match self {
            Self::Concise => 0.3,
            Self::Balanced => 0.7,
            Self::Detailed => 1.0,
        }
    }

    /// Korean label shown to the user.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Concise => "단순명료",
            Self::Balanced => "보통설명",
            Self::Detailed => "상세한설명",
        }
    }
}

/// Input did not name one of the [`Tone`]s.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown tone `{0}` (expected 단순명료, 보통설명 or 상세한설명)")]
pub struct UnknownTone(pub String);

impl std::str::FromStr for Tone {
    type Err = UnknownTone;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "단순명료" | "concise" => Ok(Self::Concise),
            "보통설명" | "balanced" => Ok(Self::Balanced),
            "상세한설명" | "detailed" => Ok(Self::Detailed),
            other => Err(UnknownTone(other.to_string())),
        }
    }
}

impl Serialize for Tone {
    /// A [`Tone`] goes over the wire as its temperature.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f32(self.temperature())
    }
}

impl<'de> Deserialize<'de> for Tone {
    /// Only the three exact temperatures are accepted back.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f32::deserialize(deserializer)?;
        Tone::ALL
            .into_iter()
            .find(|tone| (tone.temperature() - value).abs() < f32::EPSILON)
            .ok_or_else(|| {
                serde::de::Error::custom(format!(
                    "temperature {value} is not one of 0.3, 0.7, 1.0"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_mapping() {
        assert_eq!("단순명료".parse::<Tone>().unwrap().temperature(), 0.3);
        assert_eq!("보통설명".parse::<Tone>().unwrap().temperature(), 0.7);
        assert_eq!("상세한설명".parse::<Tone>().unwrap().temperature(), 1.0);
    }

    #[test]
    fn test_only_enumerated_temperatures() {
        for tone in Tone::ALL {
            assert!([0.3, 0.7, 1.0].contains(&tone.temperature()));
        }
    }

    #[test]
    fn test_unknown_tone() {
        assert_eq!(
            "0.9".parse::<Tone>().unwrap_err(),
            UnknownTone("0.9".to_string())
        );
    }

    #[test]
    fn test_serde() {
        assert_eq!(serde_json::to_string(&Tone::Concise).unwrap(), "0.3");
        let tone: Tone = serde_json::from_str("1.0").unwrap();
        assert_eq!(tone, Tone::Detailed);
        assert!(serde_json::from_str::<Tone>("0.5").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Tone::Balanced.to_string(), "보통설명");
        assert_eq!(Tone::Detailed.label(), "상세한설명");
    }
}

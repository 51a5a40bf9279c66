//! [`Key`] is a wrapper around a provider API key.

use zeroize::Zeroizing;

/// Error for a key that can never be accepted by the API.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidKey {
    /// The key is empty after trimming.
    #[error("API key is empty")]
    Empty,
    /// The key contains whitespace, so it can't go into a header.
    #[error("API key contains whitespace at byte {at}")]
    Whitespace {
        /// Byte offset of the first whitespace character.
        at: usize,
    },
    /// The key contains a character that is not visible ASCII.
    #[error("API key contains a non-printable or non-ASCII character at byte {at}")]
    NotPrintable {
        /// Byte offset of the offending character.
        at: usize,
    },
}

/// Stores an API key. The key is zeroized on drop and never shown by
/// [`Debug`]. The [`Display`] implementation writes out the key, so **be sure
/// to zeroize whatever you write it to**.
///
/// [`Debug`]: std::fmt::Debug
/// [`Display`]: std::fmt::Display
pub struct Key {
    secret: Zeroizing<String>,
    // `Bearer {secret}`, marked sensitive.
    bearer: reqwest::header::HeaderValue,
}

impl Key {
    /// Read the key.
    pub fn read(&self) -> &str {
        self.secret.as_str()
    }

    /// `Authorization` header value for this key, marked as sensitive so it
    /// doesn't end up in logs.
    pub(crate) fn bearer(&self) -> reqwest::header::HeaderValue {
        self.bearer.clone()
    }
}

impl TryFrom<String> for Key {
    type Error = InvalidKey;

    /// Create a new key from a string. The string is zeroized after
    /// conversion.
    fn try_from(s: String) -> Result<Self, Self::Error> {
        let s = Zeroizing::new(s);
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidKey::Empty);
        }

        if let Some(at) = trimmed.find(char::is_whitespace) {
            return Err(InvalidKey::Whitespace { at });
        }

        if let Some(at) = trimmed.find(|c: char| !c.is_ascii_graphic()) {
            return Err(InvalidKey::NotPrintable { at });
        }

        // Zeroized on drop
        let value = Zeroizing::new(format!("Bearer {}", trimmed));
        let mut bearer = reqwest::header::HeaderValue::from_str(&value)
            .map_err(|_| InvalidKey::NotPrintable { at: 0 })?;
        bearer.set_sensitive(true);

        Ok(Self {
            secret: Zeroizing::new(trimmed.to_string()),
            bearer,
        })
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Key(<redacted>)")
    }
}

impl std::fmt::Display for Key {
    /// Write out the key. Make sure to zeroize whatever you write it to if at
    /// all possible.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.read())
    }
}

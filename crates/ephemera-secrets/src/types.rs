//! Secret record and wire types.

use ephemera_core::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A one-time secret.
///
/// The same shape is persisted and exchanged; which fields are populated
/// depends on where the value is in its lifecycle. At rest `text` holds the
/// base64 ciphertext and `password` is empty.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub text: String,

    #[serde(default, skip_serializing_if = "SecretString::is_empty")]
    pub password: SecretString,

    #[serde(default)]
    pub views: u32,
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("id", &self.id)
            .field("text", &"[REDACTED]")
            .field("password", &self.password)
            .field("views", &self.views)
            .finish()
    }
}

/// Credentials returned once at creation and supplied on lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdPassword {
    pub id: String,
    pub password: SecretString,
}

/// Plaintext and remaining views.
///
/// On creation `views` may arrive as a JSON number or a numeric string.
#[derive(Clone, Serialize, Deserialize)]
pub struct TextViews {
    pub text: String,
    #[serde(deserialize_with = "views_from_int_or_string")]
    pub views: i64,
}

impl fmt::Debug for TextViews {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextViews")
            .field("text", &"[REDACTED]")
            .field("views", &self.views)
            .finish()
    }
}

impl From<Secret> for TextViews {
    fn from(secret: Secret) -> Self {
        Self {
            text: secret.text,
            views: i64::from(secret.views),
        }
    }
}

fn views_from_int_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString {
        Int(i64),
        Str(String),
    }

    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(n) => Ok(n),
        IntOrString::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("views must be a number, got '{s}'"))),
    }
}

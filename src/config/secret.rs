//! Credentials held by the configuration
//!
//! The upstream API key and the hash salt are wrapped in [`SecretString`]:
//! the value is zeroized on drop, `Debug` output is redacted, and reading it
//! takes an explicit `expose_secret()` call.
//!
//! ```rust
//! use cloak::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let key = secret_string("sk-live-123".to_string());
//! assert_eq!(key.expose_secret(), "sk-live-123");
//! assert!(!format!("{key:?}").contains("sk-live-123"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String payload of a [`SecretString`]
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}

// Needed so `CloakConfig` can derive `Serialize`; the init templates never
// contain real credentials.
impl SerializableSecret for SecretValue {}

impl SecretValue {
    /// True for a configured but empty credential
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw bytes, for keyed hashing
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SecretValue {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for SecretValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Zeroizing, redacted string credential
pub type SecretString = Secret<SecretValue>;

/// Wrap a plain string as a credential
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

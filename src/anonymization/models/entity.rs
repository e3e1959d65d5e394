//! Entity type identifiers

use crate::domain::{CloakError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known entity type names
///
/// Detectors are free to emit other types; these are the ones the built-in
/// recognizers and the usual NER models produce.
pub mod kinds {
    pub const PERSON: &str = "PERSON";
    pub const LOCATION: &str = "LOCATION";
    pub const ORG: &str = "ORG";
    pub const EMAIL_ADDRESS: &str = "EMAIL_ADDRESS";
    pub const PHONE_NUMBER: &str = "PHONE_NUMBER";
    pub const CREDIT_CARD: &str = "CREDIT_CARD";
    pub const IP_ADDRESS: &str = "IP_ADDRESS";
    pub const URL: &str = "URL";
    pub const US_SSN: &str = "US_SSN";
    pub const DATE_TIME: &str = "DATE_TIME";
    pub const RANDOM_SECRET: &str = "RANDOM_SECRET";
    pub const USERNAME: &str = "USERNAME";
}

/// Category tag of a detected PII value (`PERSON`, `EMAIL_ADDRESS`, ...)
///
/// The name becomes part of the label syntax `<ENTITY_TYPE_index>`, so it is
/// restricted to an uppercase identifier: `[A-Z][A-Z0-9_]*`. Lowercase input
/// is upper-cased on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityType(String);

impl EntityType {
    /// Create a validated entity type
    ///
    /// # Errors
    ///
    /// Returns [`CloakError::InvalidInput`] if the name is empty or contains
    /// anything other than ASCII letters, digits and underscores, or does not
    /// start with a letter.
    pub fn new(name: impl AsRef<str>) -> Result<Self> {
        let upper = name.as_ref().trim().to_ascii_uppercase();

        let mut chars = upper.chars();
        match chars.next() {
            Some(c) if c.is_ascii_uppercase() => {}
            _ => {
                return Err(CloakError::InvalidInput(format!(
                    "Invalid entity type '{}': must start with a letter",
                    name.as_ref()
                )))
            }
        }
        if !chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_') {
            return Err(CloakError::InvalidInput(format!(
                "Invalid entity type '{}': only letters, digits and underscores are allowed",
                name.as_ref()
            )));
        }

        Ok(Self(upper))
    }

    /// Entity type name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EntityType {
    type Error = CloakError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for EntityType {
    type Error = CloakError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<EntityType> for String {
    fn from(value: EntityType) -> Self {
        value.0
    }
}

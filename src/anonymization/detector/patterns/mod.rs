//! Pattern library for the regex recognizer

use crate::anonymization::models::EntityType;
use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Pattern definition from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct PatternDefinition {
    /// Regex patterns for this group
    pub patterns: Vec<String>,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    /// Entity type reported for matches
    pub entity_type: String,
    /// Optional post-match check
    #[serde(default)]
    pub validator: Option<Validator>,
}

/// Checks applied to a regex match before it is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validator {
    /// Luhn checksum over the digits of the match
    Luhn,
}

impl Validator {
    /// Whether `candidate` passes the check
    pub fn accepts(&self, candidate: &str) -> bool {
        match self {
            Validator::Luhn => luhn_valid(candidate),
        }
    }
}

fn luhn_valid(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() < 12 {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

/// Compiled pattern with metadata
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Group name from the library
    pub name: String,
    /// Compiled regex
    pub regex: Regex,
    /// Entity type reported for matches
    pub entity_type: EntityType,
    /// Confidence score
    pub confidence: f32,
    /// Optional post-match check
    pub validator: Option<Validator>,
}

/// Pattern library container
#[derive(Debug, Deserialize)]
struct PatternLibrary {
    // Sorted by group name so detection order does not depend on hashing
    patterns: BTreeMap<String, PatternDefinition>,
}

/// Pattern registry for the regex recognizer
#[derive(Debug)]
pub struct PatternRegistry {
    patterns: Vec<CompiledPattern>,
    patterns_by_entity: HashMap<EntityType, Vec<CompiledPattern>>,
}

impl PatternRegistry {
    /// Create a new pattern registry from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read pattern library: {}",
                path.as_ref().display()
            )
        })?;

        Self::from_toml(&content)
    }

    /// Create a pattern registry from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let library: PatternLibrary =
            toml::from_str(content).context("Failed to parse pattern library TOML")?;

        let mut patterns = Vec::new();
        let mut patterns_by_entity: HashMap<EntityType, Vec<CompiledPattern>> = HashMap::new();

        for (name, def) in library.patterns {
            let entity_type = EntityType::new(&def.entity_type).with_context(|| {
                format!(
                    "Invalid entity type in pattern '{}': {}",
                    name, def.entity_type
                )
            })?;

            if !(0.0..=1.0).contains(&def.confidence) {
                anyhow::bail!(
                    "Confidence for pattern '{name}' must be between 0.0 and 1.0, got {}",
                    def.confidence
                );
            }

            for pattern_str in &def.patterns {
                let regex = Regex::new(pattern_str)
                    .with_context(|| format!("Invalid regex in pattern '{name}': {pattern_str}"))?;

                let compiled = CompiledPattern {
                    name: name.clone(),
                    regex,
                    entity_type: entity_type.clone(),
                    confidence: def.confidence,
                    validator: def.validator,
                };

                patterns.push(compiled.clone());
                patterns_by_entity
                    .entry(entity_type.clone())
                    .or_default()
                    .push(compiled);
            }
        }

        Ok(Self {
            patterns,
            patterns_by_entity,
        })
    }

    /// Create a default pattern registry with built-in patterns
    pub fn default_patterns() -> Result<Self> {
        // Use embedded default patterns
        let default_toml = include_str!("../../../../patterns/pii_patterns.toml");
        Self::from_toml(default_toml)
    }

    /// Get all patterns
    pub fn all_patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Get patterns for a specific entity type
    pub fn patterns_for(&self, entity_type: &EntityType) -> Option<&[CompiledPattern]> {
        self.patterns_by_entity
            .get(entity_type)
            .map(|v| v.as_slice())
    }

    /// Entity types this registry can report
    pub fn entity_types(&self) -> Vec<EntityType> {
        let mut types: Vec<EntityType> = self.patterns_by_entity.keys().cloned().collect();
        types.sort();
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::kinds;

    fn entity(name: &str) -> EntityType {
        EntityType::new(name).unwrap()
    }

    #[test]
    fn test_load_default_patterns() {
        let registry = PatternRegistry::default_patterns().unwrap();
        assert!(!registry.all_patterns().is_empty());

        let types = registry.entity_types();
        for expected in [
            kinds::EMAIL_ADDRESS,
            kinds::PHONE_NUMBER,
            kinds::CREDIT_CARD,
            kinds::IP_ADDRESS,
            kinds::URL,
            kinds::US_SSN,
        ] {
            assert!(types.contains(&entity(expected)), "missing {expected}");
        }
    }

    #[test]
    fn test_email_pattern() {
        let registry = PatternRegistry::default_patterns().unwrap();
        let email_patterns = registry
            .patterns_for(&entity(kinds::EMAIL_ADDRESS))
            .unwrap();
        assert!(!email_patterns.is_empty());

        let pattern = &email_patterns[0];
        assert!(pattern.regex.is_match("test@example.com"));
        assert!(!pattern.regex.is_match("not-an-email"));
    }

    #[test]
    fn test_phone_pattern() {
        let registry = PatternRegistry::default_patterns().unwrap();
        let phone_patterns = registry.patterns_for(&entity(kinds::PHONE_NUMBER)).unwrap();
        assert!(!phone_patterns.is_empty());

        let text = "Call me at (555) 123-4567";
        let has_match = phone_patterns.iter().any(|p| p.regex.is_match(text));
        assert!(has_match);
    }

    #[test]
    fn test_luhn_validator() {
        assert!(Validator::Luhn.accepts("4111 1111 1111 1111"));
        assert!(Validator::Luhn.accepts("4012-8888-8888-1881"));
        assert!(!Validator::Luhn.accepts("4111 1111 1111 1112"));
        assert!(!Validator::Luhn.accepts("1234"));
    }

    #[test]
    fn test_custom_library() {
        let toml = r#"
            [patterns.badge]
            entity_type = "badge_id"
            confidence = 0.7
            patterns = ['\bBDG-\d{6}\b']
        "#;
        let registry = PatternRegistry::from_toml(toml).unwrap();
        let patterns = registry.patterns_for(&entity("BADGE_ID")).unwrap();
        assert_eq!(patterns.len(), 1);
        assert!(patterns[0].regex.is_match("badge BDG-123456"));
    }

    #[test]
    fn test_invalid_library_is_rejected() {
        let bad_regex = r#"
            [patterns.broken]
            entity_type = "BROKEN"
            confidence = 0.7
            patterns = ['(unclosed']
        "#;
        assert!(PatternRegistry::from_toml(bad_regex).is_err());

        let bad_confidence = r#"
            [patterns.loud]
            entity_type = "LOUD"
            confidence = 1.5
            patterns = ['x']
        "#;
        assert!(PatternRegistry::from_toml(bad_confidence).is_err());

        let bad_type = r#"
            [patterns.odd]
            entity_type = "not a type"
            confidence = 0.5
            patterns = ['x']
        "#;
        assert!(PatternRegistry::from_toml(bad_type).is_err());
    }
}

//! Regex-based PII recognizer

use super::{patterns::PatternRegistry, Recognizer};
use crate::anonymization::models::{EntityType, Span};
use crate::domain::{CloakError, Result};
use std::path::Path;
use std::sync::Arc;

/// Regex-based PII recognizer
///
/// Every match of a library pattern is reported with the pattern's fixed
/// confidence.
pub struct RegexDetector {
    pattern_registry: Arc<PatternRegistry>,
}

impl RegexDetector {
    /// Create a new regex detector with default patterns
    pub fn new() -> Result<Self> {
        let registry = PatternRegistry::default_patterns()
            .map_err(|e| CloakError::Configuration(format!("{e:#}")))?;
        Ok(Self::with_registry(registry))
    }

    /// Create a regex detector from a pattern library file
    pub fn from_file(path: &Path) -> Result<Self> {
        let registry = PatternRegistry::from_file(path)
            .map_err(|e| CloakError::Configuration(format!("{e:#}")))?;
        Ok(Self::with_registry(registry))
    }

    /// Create a new regex detector with custom pattern registry
    pub fn with_registry(registry: PatternRegistry) -> Self {
        Self {
            pattern_registry: Arc::new(registry),
        }
    }

    /// Detect PII in a string value
    fn detect_in_string(&self, text: &str) -> Vec<Span> {
        let mut spans = Vec::new();

        for pattern in self.pattern_registry.all_patterns() {
            for matched in pattern.regex.find_iter(text) {
                if matched.is_empty() {
                    continue;
                }
                if let Some(validator) = pattern.validator {
                    if !validator.accepts(matched.as_str()) {
                        tracing::trace!(pattern = %pattern.name, "Match rejected by validator");
                        continue;
                    }
                }
                spans.push(Span::new(
                    matched.start(),
                    matched.end(),
                    pattern.entity_type.clone(),
                    pattern.confidence,
                ));
            }
        }

        drop_nested(spans)
    }
}

/// Remove matches that lie inside a longer match of the same entity type
///
/// A local number such as `123-4567` is also found inside `(555) 123-4567`.
fn drop_nested(spans: Vec<Span>) -> Vec<Span> {
    spans
        .iter()
        .filter(|inner| {
            !spans.iter().any(|outer| {
                outer.entity_type == inner.entity_type
                    && outer.len() > inner.len()
                    && outer.start <= inner.start
                    && inner.end <= outer.end
            })
        })
        .cloned()
        .collect()
}

impl Recognizer for RegexDetector {
    fn name(&self) -> &str {
        "regex"
    }

    fn supported_entities(&self) -> Vec<EntityType> {
        self.pattern_registry.entity_types()
    }

    fn analyze(&self, text: &str, _language: &str) -> Result<Vec<Span>> {
        Ok(self.detect_in_string(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::kinds;

    fn detect(text: &str) -> Vec<Span> {
        RegexDetector::new().unwrap().analyze(text, "en").unwrap()
    }

    fn values<'a>(text: &'a str, spans: &[Span], entity_type: &str) -> Vec<&'a str> {
        spans
            .iter()
            .filter(|s| s.entity_type.as_str() == entity_type)
            .map(|s| s.value(text))
            .collect()
    }

    #[test]
    fn test_detect_email() {
        let text = "Contact: john.doe@example.com";
        let spans = detect(text);
        assert_eq!(
            values(text, &spans, kinds::EMAIL_ADDRESS),
            vec!["john.doe@example.com"]
        );
    }

    #[test]
    fn test_detect_phone() {
        let text = "Call (555) 123-4567 or +1234567890.";
        let spans = detect(text);
        assert_eq!(
            values(text, &spans, kinds::PHONE_NUMBER),
            vec!["(555) 123-4567", "+1234567890"]
        );
    }

    #[test]
    fn test_detect_local_and_country_code_phone() {
        let text = "Bob's number is 555-1234, office +1 (555) 123-4567.";
        let spans = detect(text);
        assert_eq!(
            values(text, &spans, kinds::PHONE_NUMBER),
            vec!["+1 (555) 123-4567", "555-1234"]
        );
    }

    #[test]
    fn test_nested_match_of_same_type_is_dropped() {
        let text = "Dial 555-123-4567 now";
        let spans = detect(text);
        assert_eq!(values(text, &spans, kinds::PHONE_NUMBER), vec!["555-123-4567"]);
    }

    #[test]
    fn test_credit_card_requires_luhn() {
        let text = "valid 4111 1111 1111 1111, invalid 4111 1111 1111 1112";
        let spans = detect(text);
        assert_eq!(
            values(text, &spans, kinds::CREDIT_CARD),
            vec!["4111 1111 1111 1111"]
        );
    }

    #[test]
    fn test_detect_ip_url_ssn() {
        let text = "Host 192.168.1.10 serves https://example.com/a?b=1. SSN 123-45-6789";
        let spans = detect(text);
        assert_eq!(values(text, &spans, kinds::IP_ADDRESS), vec!["192.168.1.10"]);
        assert_eq!(
            values(text, &spans, kinds::URL),
            vec!["https://example.com/a?b=1"]
        );
        assert_eq!(values(text, &spans, kinds::US_SSN), vec!["123-45-6789"]);
    }

    #[test]
    fn test_plain_text_has_no_spans() {
        assert!(detect("This is just a normal sentence.").is_empty());
    }

    #[test]
    fn test_spans_are_valid_for_multibyte_text() {
        let text = "Grüße an zoë@example.de";
        for span in detect(text) {
            span.validate(text).unwrap();
        }
    }
}

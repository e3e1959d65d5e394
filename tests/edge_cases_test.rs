//! Edge case tests for detection, substitution and restoration

use cloak::anonymization::detector::SpanDetector;
use cloak::anonymization::{
    AnonymizationConfig, AnonymizationEngine, EntityType, Span,
};
use cloak::domain::{CloakError, Result};
use serde_json::json;
use std::sync::Arc;
use test_case::test_case;

/// Detector whose backing service is down
struct OfflineDetector;

impl SpanDetector for OfflineDetector {
    fn detect(&self, _text: &str, _language: &str, _score_threshold: f32) -> Result<Vec<Span>> {
        Err(CloakError::Detection("NER service unreachable".to_string()))
    }
}

/// Detector that reports nothing, for tests that pass spans directly
struct SilentDetector;

impl SpanDetector for SilentDetector {
    fn detect(&self, _text: &str, _language: &str, _score_threshold: f32) -> Result<Vec<Span>> {
        Ok(Vec::new())
    }
}

fn default_engine() -> AnonymizationEngine {
    AnonymizationEngine::new(AnonymizationConfig::default()).unwrap()
}

fn span_engine() -> AnonymizationEngine {
    AnonymizationEngine::with_detector(AnonymizationConfig::default(), Arc::new(SilentDetector))
        .unwrap()
}

fn person(start: usize, end: usize) -> Span {
    Span::new(start, end, EntityType::new("PERSON").unwrap(), 0.9)
}

#[test_case("1!23456A" ; "digits symbol and uppercase")]
#[test_case("hunter2!" ; "word digit and symbol")]
#[test_case("P@ssword" ; "symbol substitution")]
#[test_case("sk-123abcXYZ" ; "api key prefix")]
#[test_case("Zx8#Fg7*" ; "four character classes")]
fn test_random_secrets_are_labeled(secret: &str) {
    let mut engine = default_engine();

    let alone = engine.anonymize_text(secret).unwrap();
    assert_eq!(alone.text, "<RANDOM_SECRET_0>");

    let sentence = format!("My password is {secret}");
    let labeled = engine.anonymize_text(&sentence).unwrap();
    assert_eq!(labeled.text, "My password is <RANDOM_SECRET_0>");
    assert_eq!(engine.deanonymize_text(&labeled.text, &labeled.items), sentence);
}

#[test]
fn test_empty_text() {
    let mut engine = default_engine();
    let result = engine.anonymize_text("").unwrap();
    assert_eq!(result.text, "");
    assert!(result.items.is_empty());
    assert!(engine.mapping().is_empty());
}

#[test]
fn test_multibyte_text_keeps_char_boundaries() {
    let mut engine = default_engine();
    let text = "Grüße, schreib an anna@example.de 👋";

    let result = engine.anonymize_text(text).unwrap();

    assert_eq!(result.text, "Grüße, schreib an <EMAIL_ADDRESS_0> 👋");
    assert_eq!(engine.deanonymize_text(&result.text, &result.items), text);
}

#[test]
fn test_overlapping_spans_keep_earliest_longest() {
    let mut engine = span_engine();
    let text = "Ada Lovelace visited London";
    let spans = vec![
        person(0, 3),
        person(4, 12),
        person(0, 12),
        Span::new(21, 27, EntityType::new("LOCATION").unwrap(), 0.8),
    ];

    let result = engine.substitute(text, &spans).unwrap();

    assert_eq!(result.text, "<PERSON_0> visited <LOCATION_0>");
    assert_eq!(engine.stats().overlaps_discarded, 2);
    assert_eq!(
        engine.mapping().reverse_lookup("<PERSON_0>"),
        Some("Ada Lovelace")
    );
}

#[test]
fn test_out_of_bounds_span_substitutes_nothing() {
    let mut engine = span_engine();

    let err = engine
        .substitute("short", &[person(0, 2), person(0, 50)])
        .unwrap_err();

    assert!(matches!(err, CloakError::InvalidInput(_)));
    assert!(engine.mapping().is_empty());
}

#[test]
fn test_span_inside_a_character_is_rejected() {
    let mut engine = span_engine();

    // 'é' occupies bytes 1..3
    let err = engine.substitute("héllo", &[person(0, 2)]).unwrap_err();
    assert!(matches!(err, CloakError::InvalidInput(_)));

    let err = engine.substitute("hello", &[person(2, 2)]).unwrap_err();
    assert!(matches!(err, CloakError::InvalidInput(_)));
}

#[test]
fn test_character_offsets_from_external_detectors() {
    let mut engine = span_engine();
    let text = "Zoë Ångström called";

    let span =
        Span::from_char_offsets(text, 0, 12, EntityType::new("person").unwrap(), 0.9).unwrap();
    let result = engine.substitute(text, &[span]).unwrap();

    assert_eq!(result.text, "<PERSON_0> called");
}

#[test]
fn test_malformed_detector_output() {
    let err = Span::parse_many(&json!([{"start": 0, "entity_type": "PERSON"}])).unwrap_err();
    assert!(matches!(err, CloakError::InvalidInput(_)));
}

#[test]
fn test_new_values_never_reuse_earlier_indices() {
    let mut engine = span_engine();

    engine.substitute("Carol", &[person(0, 5)]).unwrap();
    let second = engine
        .substitute(
            "Alice, Bob and Carol",
            &[person(15, 20), person(7, 10), person(0, 5)],
        )
        .unwrap();
    let third = engine.substitute("Dave", &[person(0, 4)]).unwrap();

    assert_eq!(second.text, "<PERSON_1>, <PERSON_2> and <PERSON_0>");
    assert_eq!(third.text, "<PERSON_3>");
}

#[test]
fn test_unknown_tokens_pass_through() {
    let engine = default_engine();
    let text = "<PERSON_7> emailed <EMAIL_ADDRESS_2>";

    assert_eq!(engine.deanonymize_text(text, &[]), text);
    assert_eq!(engine.deanonymize(&json!({"reply": text})), json!({"reply": text}));
    assert_eq!(engine.stats().unknown_tokens, 4);
}

#[test]
fn test_existing_labels_are_not_detected_again() {
    let mut engine = default_engine();
    let text = "Ticket <USERNAME_3> reopened by <RANDOM_SECRET_0>";

    let result = engine.anonymize_text(text).unwrap();

    assert_eq!(result.text, text);
    assert!(engine.mapping().is_empty());
}

#[test]
fn test_dry_run_detects_without_replacing() {
    let config = AnonymizationConfig {
        dry_run: true,
        ..Default::default()
    };
    let mut engine = AnonymizationEngine::new(config).unwrap();

    let result = engine.anonymize_text("Mail ana@example.com").unwrap();

    assert_eq!(result.text, "Mail ana@example.com");
    assert!(result.items.is_empty());
    assert!(engine.mapping().is_empty());
    assert!(engine.stats().spans_detected >= 1);
    assert_eq!(engine.stats().substitutions, 0);
}

#[test]
fn test_detector_failure_is_an_anonymization_failure() {
    let mut engine =
        AnonymizationEngine::with_detector(AnonymizationConfig::default(), Arc::new(OfflineDetector))
            .unwrap();

    let err = engine
        .anonymize(&json!({"messages": [{"content": "hello"}]}))
        .unwrap_err();

    assert!(matches!(err, CloakError::Detection(_)));
    assert!(err.is_anonymization_failure());
    assert!(!err.is_retryable());
}

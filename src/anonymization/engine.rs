//! Main anonymization engine
//!
//! This module provides the [`AnonymizationEngine`] that ties detection,
//! labeling, restoration and audit logging together for one session.
//!
//! # Architecture
//!
//! The engine coordinates four components:
//! - **Detector**: finds PII spans in each string (shared, immutable)
//! - **Anonymizer**: the label strategy selected by configuration
//! - **Mapping store**: real value to label table, owned by this engine
//! - **Audit Logger**: records every anonymize call with hashed values
//!
//! Labels issued by one engine can only be restored by the same engine. Build
//! one engine per request or session.
//!
//! # Examples
//!
//! ```no_run
//! use cloak::anonymization::{AnonymizationEngine, config::AnonymizationConfig};
//! use serde_json::json;
//!
//! # fn example() -> cloak::domain::Result<()> {
//! let mut engine = AnonymizationEngine::new(AnonymizationConfig::default())?;
//!
//! let request = json!({
//!     "model": "gpt-4o",
//!     "messages": [{"role": "user", "content": "Mail john.doe@example.com"}]
//! });
//!
//! let anonymized = engine.anonymize(&request)?;
//! assert_eq!(
//!     anonymized["messages"][0]["content"],
//!     "Mail <EMAIL_ADDRESS_0>"
//! );
//! assert_eq!(engine.deanonymize(&anonymized), request);
//! # Ok(())
//! # }
//! ```

use crate::anonymization::{
    anonymizer::{
        counter::CounterStrategy, hashing::HashStrategy, redaction::RedactionStrategy, Anonymizer,
    },
    audit::{AuditEvent, AuditLogger, AuditSubstitution},
    config::{AnonymizationConfig, AnonymizationStrategy, DetectionConfig},
    detector::{CompositeDetector, SpanDetector},
    mapping::EntityMappingStore,
    models::{AnonymizationStats, AnonymizedText, Span, SubstitutionItem},
    restore::{restore, RestoreOutcome},
    substitution::{self, resolve_overlaps},
    walker::{walk_anonymize, walk_deanonymize},
};
use crate::domain::{CloakError, Result};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

const DEFAULT_LANGUAGE: &str = "en";

/// Main anonymization engine
///
/// Holds mutable per-session state (the mapping store and label counters),
/// so anonymizing takes `&mut self`. Restoring only reads the store.
pub struct AnonymizationEngine {
    config: AnonymizationConfig,
    detector: Arc<dyn SpanDetector>,
    language: String,
    score_threshold: f32,
    anonymizer: Box<dyn Anonymizer>,
    store: EntityMappingStore,
    stats: AnonymizationStats,
    tokens_restored: AtomicUsize,
    unknown_tokens: AtomicUsize,
    audit_logger: Option<AuditLogger>,
    request_id: Option<Uuid>,
}

impl AnonymizationEngine {
    /// Create an engine with the default detector
    ///
    /// # Errors
    ///
    /// Returns [`CloakError::Configuration`] if the configuration is invalid
    /// or the audit log cannot be prepared.
    pub fn new(config: AnonymizationConfig) -> Result<Self> {
        Self::from_config(config, &DetectionConfig::default())
    }

    /// Create an engine with a detector built from `detection`
    pub fn from_config(config: AnonymizationConfig, detection: &DetectionConfig) -> Result<Self> {
        detection.validate().map_err(|e| {
            CloakError::Configuration(format!("Invalid detection configuration: {e:#}"))
        })?;
        let detector = Arc::new(CompositeDetector::from_config(detection)?);

        Ok(Self::with_detector(config, detector)?
            .with_detection_settings(&detection.language, detection.score_threshold))
    }

    /// Create an engine around an existing detector
    ///
    /// Detection runs with language `en` and no score threshold until
    /// [`with_detection_settings`](Self::with_detection_settings) says otherwise.
    pub fn with_detector(
        config: AnonymizationConfig,
        detector: Arc<dyn SpanDetector>,
    ) -> Result<Self> {
        config.validate().map_err(|e| {
            CloakError::Configuration(format!("Invalid anonymization configuration: {e:#}"))
        })?;

        let anonymizer = build_anonymizer(&config)?;

        // Create audit logger if enabled
        let audit_logger = if config.audit.enabled {
            Some(
                AuditLogger::new(config.audit.log_path.clone(), config.audit.json_format, true)
                    .map_err(|e| CloakError::Configuration(format!("{e:#}")))?,
            )
        } else {
            None
        };

        tracing::debug!(
            strategy = %config.strategy,
            dry_run = config.dry_run,
            audit = audit_logger.is_some(),
            "Created anonymization engine"
        );

        Ok(Self {
            config,
            detector,
            language: DEFAULT_LANGUAGE.to_string(),
            score_threshold: 0.0,
            anonymizer,
            store: EntityMappingStore::new(),
            stats: AnonymizationStats::default(),
            tokens_restored: AtomicUsize::new(0),
            unknown_tokens: AtomicUsize::new(0),
            audit_logger,
            request_id: None,
        })
    }

    /// Set the language and score threshold passed to the detector
    pub fn with_detection_settings(mut self, language: &str, score_threshold: f32) -> Self {
        self.language = language.to_string();
        self.score_threshold = score_threshold;
        self
    }

    /// Tag every audit entry and log line from this engine with `request_id`
    ///
    /// Without one, each anonymize call gets its own id.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Anonymize every string in a JSON payload
    ///
    /// Returns a new tree; `payload` is not modified. Object keys, numbers,
    /// booleans and nulls are copied as they are.
    ///
    /// # Errors
    ///
    /// Returns [`CloakError::Detection`] if the detector fails and
    /// [`CloakError::InvalidInput`] if it reports spans that do not fit the
    /// text. No partially anonymized payload is returned in either case.
    pub fn anonymize(&mut self, payload: &Value) -> Result<Value> {
        let started = Instant::now();
        let mut audit = Vec::new();

        let anonymized = walk_anonymize(payload, &mut |text: &str| {
            self.process(text, None, &mut audit).map(|result| result.text)
        })?;

        self.finish_call(started, audit)?;
        Ok(anonymized)
    }

    /// Anonymize a single string, returning the record of what was replaced
    pub fn anonymize_text(&mut self, text: &str) -> Result<AnonymizedText> {
        let started = Instant::now();
        let mut audit = Vec::new();

        let result = self.process(text, None, &mut audit)?;

        self.finish_call(started, audit)?;
        Ok(result)
    }

    /// Label spans the caller already detected
    ///
    /// For callers running their own NER. The spans go through the same
    /// validation and overlap policy as detector output.
    pub fn substitute(&mut self, text: &str, spans: &[Span]) -> Result<AnonymizedText> {
        let started = Instant::now();
        let mut audit = Vec::new();

        let result = self.process(text, Some(spans), &mut audit)?;

        self.finish_call(started, audit)?;
        Ok(result)
    }

    /// Restore every label in a JSON payload
    ///
    /// Unknown label-shaped tokens are left untouched.
    pub fn deanonymize(&self, payload: &Value) -> Value {
        walk_deanonymize(payload, &mut |text: &str| {
            let outcome = restore(text, &self.store);
            self.count_restore(&outcome);
            outcome.text
        })
    }

    /// Restore labels in a string produced by [`anonymize_text`](Self::anonymize_text)
    ///
    /// Items whose label is still found at its recorded position are restored
    /// first; any other label in the text goes through the mapping store.
    pub fn deanonymize_text(&self, labeled: &str, items: &[SubstitutionItem]) -> String {
        let mut ordered: Vec<&SubstitutionItem> = items.iter().collect();
        ordered.sort_by_key(|item| item.start);

        let mut output = String::with_capacity(labeled.len());
        let mut cursor = 0;

        for item in ordered {
            let in_place = item.start >= cursor
                && labeled.get(item.start..item.end) == Some(item.label.as_str());
            if !in_place {
                continue;
            }
            let Some(value) = self.store.reverse_lookup(&item.label) else {
                continue;
            };

            let outcome = restore(&labeled[cursor..item.start], &self.store);
            self.count_restore(&outcome);
            output.push_str(&outcome.text);
            output.push_str(value);
            self.tokens_restored.fetch_add(1, Ordering::Relaxed);
            cursor = item.end;
        }

        let outcome = restore(&labeled[cursor..], &self.store);
        self.count_restore(&outcome);
        output.push_str(&outcome.text);
        output
    }

    /// Read access to the mapping store
    pub fn mapping(&self) -> &EntityMappingStore {
        &self.store
    }

    /// Counters accumulated over this engine's lifetime
    pub fn stats(&self) -> AnonymizationStats {
        AnonymizationStats {
            tokens_restored: self.tokens_restored.load(Ordering::Relaxed),
            unknown_tokens: self.unknown_tokens.load(Ordering::Relaxed),
            ..self.stats.clone()
        }
    }

    /// Check if in dry-run mode
    pub fn is_dry_run(&self) -> bool {
        self.config.dry_run
    }

    /// Label strategy in use
    pub fn strategy(&self) -> AnonymizationStrategy {
        self.config.strategy
    }

    /// Detect and label one string
    fn process(
        &mut self,
        text: &str,
        spans: Option<&[Span]>,
        audit: &mut Vec<AuditSubstitution>,
    ) -> Result<AnonymizedText> {
        if text.is_empty() {
            return Ok(AnonymizedText::unchanged(text));
        }

        let detected;
        let spans = match spans {
            Some(spans) => spans,
            None => {
                detected = self
                    .detector
                    .detect(text, &self.language, self.score_threshold)?;
                detected.as_slice()
            }
        };

        if self.config.dry_run {
            for span in spans {
                span.validate(text)?;
            }
            let (accepted, discarded) = resolve_overlaps(spans);
            self.stats
                .record_pass(spans.len(), discarded, &AnonymizedText::unchanged(text));
            for span in &accepted {
                tracing::debug!(
                    entity_type = %span.entity_type,
                    score = span.score,
                    "Dry run detection"
                );
                audit.push(AuditSubstitution::new(
                    &span.entity_type,
                    None,
                    span.score,
                    span.value(text),
                ));
            }
            return Ok(AnonymizedText::unchanged(text));
        }

        let outcome =
            substitution::substitute(text, spans, self.anonymizer.as_mut(), &mut self.store)?;

        self.stats
            .record_pass(spans.len(), outcome.discarded, &outcome.result);
        for (span, item) in outcome.accepted.iter().zip(&outcome.result.items) {
            audit.push(AuditSubstitution::new(
                &span.entity_type,
                Some(item.label.clone()),
                span.score,
                span.value(text),
            ));
        }

        Ok(outcome.result)
    }

    /// Write the audit entry for a finished call
    fn finish_call(&self, started: Instant, substitutions: Vec<AuditSubstitution>) -> Result<()> {
        let request_id = self.request_id.unwrap_or_else(Uuid::new_v4);
        let processing_time_ms = started.elapsed().as_millis() as u64;

        tracing::debug!(
            request_id = %request_id,
            substitutions = substitutions.len(),
            mappings = self.store.len(),
            dry_run = self.config.dry_run,
            processing_time_ms = processing_time_ms,
            "Anonymization call complete"
        );

        if let Some(ref logger) = self.audit_logger {
            let event = AuditEvent {
                timestamp: chrono::Utc::now(),
                request_id,
                strategy: self.config.strategy.to_string(),
                dry_run: self.config.dry_run,
                processing_time_ms,
                substitutions_count: substitutions.len(),
                substitutions,
            };
            logger
                .log_event(&event)
                .map_err(|e| CloakError::Io(format!("{e:#}")))?;
        }

        Ok(())
    }

    fn count_restore(&self, outcome: &RestoreOutcome) {
        self.tokens_restored
            .fetch_add(outcome.restored, Ordering::Relaxed);
        self.unknown_tokens.fetch_add(outcome.unknown, Ordering::Relaxed);
    }
}

/// Create the label strategy selected by configuration
fn build_anonymizer(config: &AnonymizationConfig) -> Result<Box<dyn Anonymizer>> {
    Ok(match config.strategy {
        AnonymizationStrategy::Counter => Box::new(CounterStrategy::new()),
        AnonymizationStrategy::Hash => {
            let salt = config.hash_salt.clone().ok_or_else(|| {
                CloakError::Configuration(
                    "anonymization.hash_salt is required for the hash strategy".to_string(),
                )
            })?;
            Box::new(HashStrategy::new(salt))
        }
        AnonymizationStrategy::Redact => Box::new(RedactionStrategy::new()),
    })
}

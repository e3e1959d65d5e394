//! Detector combining several recognizers

use super::{
    AccountHandleRecognizer, DenyListRecognizer, RandomSecretRecognizer, Recognizer,
    RegexDetector, SpanDetector,
};
use crate::anonymization::config::DetectionConfig;
use crate::anonymization::models::{EntityType, Span};
use crate::anonymization::restore::TOKEN_PATTERN;
use crate::domain::{CloakError, Result};
use std::collections::{HashMap, HashSet};

/// Runs every recognizer and post-processes their spans
///
/// Post-processing, in order: drop spans under the threshold, rename aliased
/// entity types, drop types outside the allow-list, and drop spans that sit
/// inside an existing label so already labeled text is left alone.
pub struct CompositeDetector {
    recognizers: Vec<Box<dyn Recognizer>>,
    aliases: HashMap<EntityType, EntityType>,
    allowed: Option<HashSet<EntityType>>,
}

impl CompositeDetector {
    /// Create an empty detector
    pub fn new() -> Self {
        Self {
            recognizers: Vec::new(),
            aliases: HashMap::new(),
            allowed: None,
        }
    }

    /// Build the detector described by a detection config
    pub fn from_config(config: &DetectionConfig) -> Result<Self> {
        let mut detector = Self::new();

        let regex = match &config.pattern_library {
            Some(path) => RegexDetector::from_file(path)?,
            None => RegexDetector::new()?,
        };
        detector = detector.with_recognizer(Box::new(regex));

        if config.random_secret.enabled {
            detector = detector.with_recognizer(Box::new(
                RandomSecretRecognizer::with_min_length(config.random_secret.min_length)?,
            ));
        }

        if config.account_handle.enabled {
            detector = detector.with_recognizer(Box::new(AccountHandleRecognizer::with_settings(
                config.account_handle.min_length,
                config.account_handle.keywords.clone(),
            )?));
        }

        for list in &config.deny_lists {
            detector = detector.with_recognizer(Box::new(DenyListRecognizer::new(
                EntityType::new(&list.entity_type)?,
                &list.values,
                list.case_sensitive,
                list.score,
            )?));
        }

        for (from, to) in &config.entity_aliases {
            detector = detector.with_alias(EntityType::new(from)?, EntityType::new(to)?);
        }

        if !config.entities.is_empty() {
            let allowed = config
                .entities
                .iter()
                .map(EntityType::new)
                .collect::<Result<Vec<_>>>()?;
            detector = detector.with_allowed_entities(allowed);
        }

        tracing::debug!(
            recognizers = detector.recognizers.len(),
            aliases = detector.aliases.len(),
            "Built composite detector"
        );

        Ok(detector)
    }

    /// Add a recognizer; recognizers run in insertion order
    pub fn with_recognizer(mut self, recognizer: Box<dyn Recognizer>) -> Self {
        self.recognizers.push(recognizer);
        self
    }

    /// Report `from` spans as `to`
    pub fn with_alias(mut self, from: EntityType, to: EntityType) -> Self {
        self.aliases.insert(from, to);
        self
    }

    /// Only report these entity types (after aliasing)
    pub fn with_allowed_entities(mut self, entities: impl IntoIterator<Item = EntityType>) -> Self {
        self.allowed = Some(entities.into_iter().collect());
        self
    }

    /// Entity types the recognizers can report, after aliasing
    pub fn supported_entities(&self) -> Vec<EntityType> {
        let mut types: Vec<EntityType> = self
            .recognizers
            .iter()
            .flat_map(|r| r.supported_entities())
            .map(|t| self.aliases.get(&t).cloned().unwrap_or(t))
            .filter(|t| self.allowed.as_ref().map_or(true, |a| a.contains(t)))
            .collect();
        types.sort();
        types.dedup();
        types
    }
}

impl Default for CompositeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl SpanDetector for CompositeDetector {
    fn detect(&self, text: &str, language: &str, score_threshold: f32) -> Result<Vec<Span>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let labels: Vec<(usize, usize)> = TOKEN_PATTERN
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect();

        let mut spans = Vec::new();
        for recognizer in &self.recognizers {
            let found = recognizer.analyze(text, language).map_err(|e| {
                CloakError::Detection(format!("Recognizer '{}' failed: {e}", recognizer.name()))
            })?;

            for mut span in found {
                if span.score < score_threshold {
                    continue;
                }
                if let Some(alias) = self.aliases.get(&span.entity_type) {
                    span.entity_type = alias.clone();
                }
                if let Some(allowed) = &self.allowed {
                    if !allowed.contains(&span.entity_type) {
                        continue;
                    }
                }
                if labels
                    .iter()
                    .any(|&(start, end)| span.start >= start && span.end <= end)
                {
                    continue;
                }
                spans.push(span);
            }
        }

        tracing::debug!(
            language = %language,
            spans = spans.len(),
            "Detection complete"
        );

        Ok(spans)
    }
}

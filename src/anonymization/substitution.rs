//! Text substitution
//!
//! Replaces detected spans with labels. Spans are computed against the
//! original text but applied to a string that grows or shrinks with every
//! replacement, so each span is shifted by the accumulated length difference
//! of the replacements before it.
//!
//! Overlapping spans are resolved first-match-wins: earliest start first,
//! longest first among equal starts, detector order last. A span touching
//! anything already accepted is dropped.

use crate::anonymization::anonymizer::Anonymizer;
use crate::anonymization::mapping::EntityMappingStore;
use crate::anonymization::models::{AnonymizedText, Span, SubstitutionItem};
use crate::anonymization::ordering::OrderingHint;
use crate::domain::Result;

/// Result of one substitution pass
#[derive(Debug, Clone)]
pub struct SubstitutionOutcome {
    /// Labeled text and the record of what was replaced
    pub result: AnonymizedText,
    /// Spans that were replaced, in the same order as `result.items`
    pub accepted: Vec<Span>,
    /// Number of spans dropped by the overlap policy
    pub discarded: usize,
}

/// Drop overlapping spans, returning the survivors in reading order
///
/// The second element is the number of spans dropped.
pub fn resolve_overlaps(spans: &[Span]) -> (Vec<Span>, usize) {
    let mut order: Vec<usize> = (0..spans.len()).collect();
    // Stable sort keeps detector order for identical (start, len)
    order.sort_by(|&a, &b| {
        spans[a]
            .start
            .cmp(&spans[b].start)
            .then_with(|| spans[b].len().cmp(&spans[a].len()))
    });

    let mut accepted: Vec<Span> = Vec::with_capacity(spans.len());
    let mut consumed_until = 0usize;
    for idx in order {
        let span = &spans[idx];
        if !accepted.is_empty() && span.start < consumed_until {
            tracing::debug!(
                start = span.start,
                end = span.end,
                entity_type = %span.entity_type,
                "Discarding overlapping span"
            );
            continue;
        }
        consumed_until = span.end;
        accepted.push(span.clone());
    }

    let discarded = spans.len() - accepted.len();
    (accepted, discarded)
}

/// Replace every accepted span in `text` with a label from `anonymizer`
///
/// # Errors
///
/// Returns [`CloakError::InvalidInput`](crate::domain::CloakError::InvalidInput)
/// if any span does not describe a valid range of `text`. Nothing is
/// substituted in that case.
pub fn substitute(
    text: &str,
    spans: &[Span],
    anonymizer: &mut dyn Anonymizer,
    store: &mut EntityMappingStore,
) -> Result<SubstitutionOutcome> {
    for span in spans {
        span.validate(text)?;
    }

    if text.is_empty() || spans.is_empty() {
        return Ok(SubstitutionOutcome {
            result: AnonymizedText::unchanged(text),
            accepted: Vec::new(),
            discarded: 0,
        });
    }

    let (accepted, discarded) = resolve_overlaps(spans);

    let mut hint = OrderingHint::build(text, &accepted, store);
    anonymizer.prepare(&mut hint);

    let mut output = text.to_string();
    let mut items = Vec::with_capacity(accepted.len());
    let mut offset: isize = 0;

    for span in &accepted {
        let value = span.value(text);
        let label = anonymizer.anonymize(store, &span.entity_type, value, &hint);

        let start = (span.start as isize + offset) as usize;
        let end = (span.end as isize + offset) as usize;
        output.replace_range(start..end, &label);

        items.push(SubstitutionItem {
            start,
            end: start + label.len(),
            entity_type: span.entity_type.clone(),
            label: label.clone(),
            score: span.score,
            operator: anonymizer.name().to_string(),
        });

        offset += label.len() as isize - span.len() as isize;
    }

    Ok(SubstitutionOutcome {
        result: AnonymizedText {
            text: output,
            items,
        },
        accepted,
        discarded,
    })
}

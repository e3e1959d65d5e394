//! Label restoration
//!
//! Scans labeled text for anything shaped like a label and swaps known labels
//! back to their real values. Unknown label-shaped tokens are left as they
//! are: they may be labels from another engine or ordinary user text.
//!
//! Labels are self-delimiting, so no offset bookkeeping is needed here.
//!
//! Known limitation: user text that happens to contain a label this engine
//! issued (for instance `<PERSON_0>` typed verbatim) is restored as well.

use crate::anonymization::mapping::EntityMappingStore;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

/// Matches counter labels (`<PERSON_0>`) and hash labels (`<PERSON_1a2b3c4d>`)
pub static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<[A-Z][A-Z0-9_]*_(?:[0-9]+|[0-9a-f]{8,64})>").expect("valid label pattern")
});

/// Restored text plus what happened to the tokens in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOutcome {
    /// Text with known labels replaced
    pub text: String,
    /// Labels replaced by their real value
    pub restored: usize,
    /// Label-shaped tokens left untouched
    pub unknown: usize,
}

/// Restore labels using an arbitrary lookup
pub fn restore_with<'a, F>(text: &str, mut lookup: F) -> RestoreOutcome
where
    F: FnMut(&str) -> Option<&'a str>,
{
    let mut restored = 0;
    let mut unknown = 0;

    let replaced = TOKEN_PATTERN.replace_all(text, |caps: &Captures| {
        let token = &caps[0];
        match lookup(token) {
            Some(value) => {
                restored += 1;
                value.to_string()
            }
            None => {
                unknown += 1;
                tracing::debug!(token = %token, "Leaving unknown label untouched");
                token.to_string()
            }
        }
    });

    let text = match replaced {
        Cow::Borrowed(_) => text.to_string(),
        Cow::Owned(s) => s,
    };

    RestoreOutcome {
        text,
        restored,
        unknown,
    }
}

/// Restore labels issued by `store`
pub fn restore(text: &str, store: &EntityMappingStore) -> RestoreOutcome {
    restore_with(text, |token| store.reverse_lookup(token))
}

/// Label-shaped tokens in `text`, in order of appearance
pub fn find_tokens(text: &str) -> Vec<&str> {
    TOKEN_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
}

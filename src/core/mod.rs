//! Request orchestration for Cloak.
//!
//! [`ForwardingProxy`] runs the full round trip for one chat-completion call:
//!
//! 1. **Validate**: the payload must look like a chat-completion request
//! 2. **Anonymize**: a fresh engine labels every string in the payload
//! 3. **Forward**: the labeled payload goes to the [`ChatBackend`](crate::adapters::upstream::ChatBackend)
//! 4. **Restore**: labels in the response are replaced with the real values

pub mod proxy;

pub use proxy::{ForwardReport, ForwardingProxy};

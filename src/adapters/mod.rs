//! External system integrations for Cloak.
//!
//! - [`upstream`] - the downstream chat-completion API
//!
//! Adapters isolate network dependencies behind traits so the proxy can be
//! tested with in-process backends.

pub mod upstream;

//! CLI command implementations
//!
//! Commands return a process exit code:
//! - 0: success
//! - 2: configuration error
//! - 3: the input could not be anonymized
//! - 4: the upstream API failed or rejected the request
//! - 5: anything else

pub mod anonymize;
pub mod forward;
pub mod init;
pub mod validate;

use crate::config::{load_config, load_config_from_str, CloakConfig};
use crate::domain::{CloakError, Result};
use std::path::Path;

/// Exit code for a failed command
pub fn exit_code_for(error: &CloakError) -> i32 {
    match error {
        CloakError::Configuration(_) => 2,
        CloakError::InvalidInput(_) | CloakError::Detection(_) => 3,
        CloakError::Transport(_) => 4,
        CloakError::Serialization(_) | CloakError::Io(_) | CloakError::Other(_) => 5,
    }
}

/// Load the configuration file, or defaults plus `CLOAK_*` overrides when the
/// file does not exist
pub(crate) fn load_or_default(config_path: &str) -> Result<CloakConfig> {
    if Path::new(config_path).exists() {
        load_config(config_path)
    } else {
        tracing::info!(config_path = %config_path, "No configuration file found, using defaults");
        load_config_from_str("")
    }
}

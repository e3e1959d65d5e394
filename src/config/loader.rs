//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::CloakConfig;
use crate::config::secret_string;
use crate::domain::errors::CloakError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var placeholder regex is valid")
});

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into CloakConfig
/// 4. Applies environment variable overrides (CLOAK_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`CloakError::Configuration`] if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use cloak::config::loader::load_config;
///
/// let config = load_config("cloak.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<CloakConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CloakError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        CloakError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Loads configuration from TOML text
///
/// Runs the same substitution, override and validation steps as [`load_config`].
pub fn load_config_from_str(contents: &str) -> Result<CloakConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: CloakConfig = toml::from_str(&contents)
        .map_err(|e| CloakError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        CloakError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error listing every referenced environment variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let processed = ENV_VAR_PATTERN.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });
        lines.push(processed.into_owned());
    }

    if !missing_vars.is_empty() {
        return Err(CloakError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn parse_bool(name: &str, val: &str) -> Result<bool> {
    val.parse().map_err(|_| {
        CloakError::Configuration(format!("Invalid {name} value '{val}': expected true or false"))
    })
}

/// Applies environment variable overrides using CLOAK_* prefix
///
/// Environment variables follow the pattern: CLOAK_<SECTION>_<KEY>
/// For example: CLOAK_UPSTREAM_URL, CLOAK_ANONYMIZATION_STRATEGY
fn apply_env_overrides(config: &mut CloakConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("CLOAK_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Detection and anonymization sections own their overrides
    config
        .detection
        .apply_env_overrides()
        .map_err(|e| CloakError::Configuration(format!("{e:#}")))?;
    config
        .anonymization
        .apply_env_overrides()
        .map_err(|e| CloakError::Configuration(format!("{e:#}")))?;

    // Upstream overrides; a URL alone is enough to create the section
    if let Ok(val) = std::env::var("CLOAK_UPSTREAM_URL") {
        config.upstream.get_or_insert_with(Default::default).url = val;
    }
    if let Some(ref mut upstream) = config.upstream {
        if let Ok(val) = std::env::var("CLOAK_UPSTREAM_API_KEY") {
            upstream.api_key = Some(secret_string(val));
        }
        if let Ok(val) = std::env::var("CLOAK_UPSTREAM_TIMEOUT_SECONDS") {
            upstream.timeout_seconds = val.parse().map_err(|_| {
                CloakError::Configuration(format!(
                    "Invalid CLOAK_UPSTREAM_TIMEOUT_SECONDS value '{val}'"
                ))
            })?;
        }
        if let Ok(val) = std::env::var("CLOAK_UPSTREAM_TLS_VERIFY") {
            upstream.tls_verify = parse_bool("CLOAK_UPSTREAM_TLS_VERIFY", &val)?;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("CLOAK_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_bool("CLOAK_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("CLOAK_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("CLOAK_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

use thiserror::Error;

/// Errors raised while reading process environment variables.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvVarError {
    /// An environment variable required by the application is not set.
    #[error("Missing environment variable: {0}")]
    Missing(String),

    /// The variable is set but is not valid unicode.
    #[error("Environment variable {0} is not valid unicode")]
    NotUnicode(String),
}

/// Reads an environment variable, returning a structured error if it's missing.
///
/// This is a thin wrapper around `std::env::var` that provides a more
/// ergonomic and specific error type for missing variables.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
pub fn get_env_var(name: &str) -> Result<String, EnvVarError> {
    match std::env::var(name) {
        Ok(value) => Ok(value),
        Err(std::env::VarError::NotPresent) => Err(EnvVarError::Missing(name.to_string())),
        Err(std::env::VarError::NotUnicode(_)) => Err(EnvVarError::NotUnicode(name.to_string())),
    }
}

/// Reads an optional override. Unset and blank values both mean "no override".
pub fn env_override(name: &str) -> Result<Option<String>, EnvVarError> {
    match get_env_var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(EnvVarError::Missing(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

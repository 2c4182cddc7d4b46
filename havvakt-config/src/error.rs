//! Configuration load and validation errors.
//!
//! All of these are fatal at startup: the monitor refuses to run with a
//! config it cannot read or that fails validation. File I/O goes through
//! figment, so read failures surface as [`ConfigError::Parsing`].

use std::path::PathBuf;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// One or more fields failed validation, listed per field.
    #[error("invalid configuration:\n{}", format_validation_errors(.0))]
    Validation(#[source] ValidationErrors),

    /// Figment could not read or deserialize a layer.
    #[error("configuration parsing error: {0}")]
    Parsing(#[from] figment::Error),
}

fn format_validation_errors(errors: &ValidationErrors) -> String {
    use std::fmt::Write;

    let mut output = String::new();
    for (field, errors) in errors.field_errors() {
        let _ = writeln!(output, "field '{field}':");
        for error in errors {
            let message = match &error.message {
                Some(msg) => msg.to_string(),
                None => error.code.to_string(),
            };
            let _ = writeln!(output, "  - {message}");
        }
    }
    output
}

impl From<ValidationErrors> for ConfigError {
    fn from(errors: ValidationErrors) -> Self {
        ConfigError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn validation_errors_list_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("check_interval_secs", ValidationError::new("range"));
        let message = ConfigError::from(errors).to_string();
        assert!(message.contains("check_interval_secs"));
        assert!(message.contains("range"));
    }
}

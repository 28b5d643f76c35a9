//! Configuration error domain.

use std::path::PathBuf;

use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Errors from loading or validating the layered configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// One or more tunables fell outside their allowed range. The message
    /// lists every offending setting as a dotted section path, matching the
    /// `PARKSIDE_SECTION__SETTING` environment override naming.
    #[error("invalid configuration:\n{}", render_settings(.0))]
    Validation(#[source] ValidationErrors),

    #[error("configuration merge failed: {0}")]
    Parsing(#[from] figment::Error),
}

/// Flatten nested section errors into sorted `section.setting: message`
/// lines. The config is one nested struct per section, so the interesting
/// errors are always one level down.
fn render_settings(errors: &ValidationErrors) -> String {
    let mut lines = Vec::new();
    collect_settings(None, errors, &mut lines);
    lines.sort();
    lines.join("\n")
}

fn collect_settings(prefix: Option<&str>, errors: &ValidationErrors, lines: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{field}"),
            None => field.to_string(),
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    lines.push(format!("  {path}: {message}"));
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                collect_settings(Some(&path), nested, lines);
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_settings(Some(&format!("{path}[{index}]")), nested, lines);
                }
            }
        }
    }
}

impl From<ValidationErrors> for ConfigError {
    fn from(errors: ValidationErrors) -> Self {
        ConfigError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParksideConfig;
    use validator::Validate;

    #[test]
    fn validation_message_names_each_offending_setting_path() {
        let mut config = ParksideConfig::default();
        config.scheduler.chunk_size = 0;
        config.display.top_k = 0;

        let err = ConfigError::from(config.validate().unwrap_err());
        let message = err.to_string();

        assert!(message.contains("scheduler.chunk_size"), "{message}");
        assert!(message.contains("display.top_k"), "{message}");
    }

    #[test]
    fn missing_file_error_carries_the_path() {
        let err = ConfigError::FileNotFound(PathBuf::from("config/absent.yaml"));

        assert!(err.to_string().contains("config/absent.yaml"));
    }
}

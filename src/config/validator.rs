// Startup validation of the shell configuration.
// Invalid settings fail fast before the first prompt is printed.

use crate::config::types::{Result, ShellConfig, ShellError};

/// Validation result with detailed errors
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate config at startup.
///
/// Errors are fatal; warnings are returned for the caller to log.
pub fn validate_config(config: &ShellConfig) -> Result<ValidationResult> {
    let mut result = ValidationResult::default();

    if config.prompt.trim().is_empty() {
        result.add_error("prompt must not be empty".to_string());
    }

    if config.shell_path.as_os_str().is_empty() {
        result.add_error("shell_path must not be empty".to_string());
    } else if !config.shell_path.is_absolute() {
        result.add_error(format!(
            "shell_path must be absolute: {}",
            config.shell_path.display()
        ));
    } else if !config.shell_path.exists() {
        result.add_warning(format!(
            "shell_path {} does not exist; external commands will fail",
            config.shell_path.display()
        ));
    }

    if config.copy_buffer_size == 0 {
        result.add_error("copy_buffer_size must be greater than zero".to_string());
    }

    if !result.is_valid() {
        return Err(ShellError::Config(format!(
            "config validation failed:\n{}",
            result.errors.join("\n")
        )));
    }

    Ok(result)
}

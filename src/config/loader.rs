/// Configuration loading from an optional JSON file plus command-line overrides
use crate::config::types::{Result, ShellConfig, ShellError};
use std::path::{Path, PathBuf};

/// Values given on the command line; each one wins over the file.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub prompt: Option<String>,
    pub shell_path: Option<PathBuf>,
}

impl ShellConfig {
    /// Load configuration from a JSON file. Missing keys keep their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ShellError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| ShellError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Resolve the effective configuration: defaults, then the file, then overrides.
    pub fn resolve(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };

        if let Some(prompt) = overrides.prompt {
            config.prompt = prompt;
        }
        if let Some(shell_path) = overrides.shell_path {
            config.shell_path = shell_path;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "prompt": "tiny" }}"#).unwrap();

        let config = ShellConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.prompt, "tiny");
        assert_eq!(config.copy_buffer_size, 4096);
    }

    #[test]
    fn test_overrides_win_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "prompt": "tiny", "copy_buffer_size": 512 }}"#).unwrap();

        let overrides = ConfigOverrides {
            prompt: Some("cli".to_string()),
            shell_path: None,
        };
        let config = ShellConfig::resolve(Some(file.path()), overrides).unwrap();
        assert_eq!(config.prompt, "cli");
        assert_eq!(config.copy_buffer_size, 512);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = ShellConfig::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ShellError::Config(_)));
    }
}

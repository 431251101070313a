// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML configuration for the encoder.
//!
//! ```yaml
//! hostname: "db1.example.com"   # optional, defaults to the resolved FQDN
//! static_types: false           # optional, defaults to true
//! ```

use serde::Deserialize;
use std::fmt;
use std::path::Path;

use crate::value::TypeMode;

/// Encoder configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EncoderConfig {
    /// Value of the implicit `host` tag. None = resolve the FQDN.
    #[serde(default)]
    pub hostname: Option<String>,
    /// Append the `i` suffix to integers. None = default (true).
    #[serde(default)]
    pub static_types: Option<bool>,
}

/// Configuration parsing errors.
#[derive(Debug)]
pub enum ConfigError {
    /// YAML parsing failed.
    Yaml(serde_yaml::Error),
    /// File I/O failed.
    Io(std::io::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Yaml(e) => write!(f, "YAML parse error: {}", e),
            ConfigError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Yaml(e) => Some(e),
            ConfigError::Io(e) => Some(e),
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Yaml(e)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl EncoderConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: EncoderConfig = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Parse configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Rendering mode selected by `static_types`.
    pub fn type_mode(&self) -> TypeMode {
        match self.static_types {
            Some(false) => TypeMode::Untyped,
            _ => TypeMode::Static,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL_YAML: &str = r#"
hostname: "db1.example.com"
static_types: false
"#;

    #[test]
    fn test_config_parse_full() {
        let config = EncoderConfig::from_yaml(FULL_YAML).expect("parse full yaml");
        assert_eq!(config.hostname.as_deref(), Some("db1.example.com"));
        assert_eq!(config.static_types, Some(false));
        assert_eq!(config.type_mode(), TypeMode::Untyped);
    }

    #[test]
    fn test_config_parse_empty_uses_defaults() {
        let config = EncoderConfig::from_yaml("{}").expect("parse empty yaml");
        assert!(config.hostname.is_none());
        assert_eq!(config.type_mode(), TypeMode::Static);
    }

    #[test]
    fn test_config_rejects_unknown_keys() {
        let err = EncoderConfig::from_yaml("hostnme: typo\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
        assert!(err.to_string().starts_with("YAML parse error"));
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(FULL_YAML.as_bytes()).expect("write");

        let config = EncoderConfig::from_file(file.path()).expect("load");
        assert_eq!(config.hostname.as_deref(), Some("db1.example.com"));
    }

    #[test]
    fn test_config_missing_file() {
        let err = EncoderConfig::from_file(Path::new("/nonexistent/fluxline.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

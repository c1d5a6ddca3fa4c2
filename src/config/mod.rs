mod schema;

pub use schema::{Config, DEFAULT_BASE_URL};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/studrank/)
pub fn get_config_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Could not determine home directory");
    home.join(".config").join("studrank")
}

/// Get the default config file path (~/.config/studrank/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file.
///
/// A missing file at the default path is not an error: the tool talks to a
/// fixed public API and runs fine on built-in defaults. An explicitly given
/// path must exist, and a malformed file is always an error.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let (config_path, explicit) = match path {
        Some(p) => (p, true),
        None => (get_config_path(), false),
    };

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    Ok(config)
}

/// Validate a loaded config at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
        errors.push(format!(
            "base_url: '{}' must start with http:// or https://",
            config.base_url
        ));
    }

    if config.request_timeout_secs == 0 {
        errors.push("request_timeout_secs: must be at least 1".to_string());
    }

    if config.max_concurrent_fetches == 0 {
        errors.push("max_concurrent_fetches: must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_ok() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_bad_url() {
        let config = Config {
            base_url: "iis.bsuir.by".to_string(),
            ..Config::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].contains("base_url"));
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let config = Config {
            base_url: "ftp://nope".to_string(),
            request_timeout_secs: 0,
            max_concurrent_fetches: 0,
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_missing_default_config_is_defaults() {
        // Default path almost certainly absent in test environments; if the
        // file does exist this still must not error.
        assert!(load_config(None).is_ok());
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let path = PathBuf::from("/nonexistent/studrank-config.yaml");
        assert!(load_config(Some(path)).is_err());
    }
}

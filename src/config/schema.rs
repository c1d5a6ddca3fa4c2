use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://iis.bsuir.by/api/v1";

/// Tool configuration.
///
/// Every field has a default, so the config file is optional. Example YAML:
/// ```yaml
/// base_url: "https://iis.bsuir.by/api/v1"
/// request_timeout_secs: 15
/// max_concurrent_fetches: 8
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root of the rating API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// How many per-student detail requests run at once
    #[serde(default = "default_concurrency")]
    pub max_concurrent_fetches: usize,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_concurrency() -> usize {
    8
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_timeout(),
            max_concurrent_fetches: default_concurrency(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.max_concurrent_fetches, 8);
    }

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_yaml_overrides() {
        let yaml = "max_concurrent_fetches: 2\n";
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.max_concurrent_fetches, 2);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "retries: 3\n";
        assert!(serde_saphyr::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = Config::default();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }
}

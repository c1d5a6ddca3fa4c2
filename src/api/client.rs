use std::time::Duration;

use anyhow::{Context, Result};

/// HTTP client plus the base URL every endpoint hangs off of
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub http: reqwest::Client,
    pub base_url: String,
}

/// Create a client for the rating API
pub fn create_client(base_url: &str, timeout_secs: u64) -> Result<ApiClient> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("Failed to create HTTP client")?;

    Ok(ApiClient {
        http,
        base_url: base_url.trim_end_matches('/').to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = create_client("https://iis.bsuir.by/api/v1/", 15).unwrap();
        assert_eq!(client.base_url, "https://iis.bsuir.by/api/v1");
    }
}

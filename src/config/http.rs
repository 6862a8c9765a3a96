//! HTTP Client Configuration
//!
//! Configuration for the exchange REST client.

use std::time::Duration;

/// Exchange REST client configuration
///
/// ## Environment Variables
///
/// - `KUCOIN_BASE_URL`: API base URL (default: https://api.kucoin.com)
/// - `HTTP_TIMEOUT_SECS`: Request timeout in seconds (default: 10)
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// API base URL
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl HttpConfig {
    /// Load HTTP configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if `HTTP_TIMEOUT_SECS` is set but not a valid integer
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let base_url = std::env::var("KUCOIN_BASE_URL")
            .unwrap_or_else(|_| "https://api.kucoin.com".to_string());

        let timeout_secs: u64 = std::env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.kucoin.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

//! API Credential Management
//!
//! Secure handling of KuCoin API credentials loaded from environment
//! variables. Credentials are never logged at INFO/WARN levels and are
//! masked when displayed.

use std::fmt;

/// Secure string wrapper that masks sensitive data in logs
///
/// Debug output shows only `SecretString(***)` and Display shows the
/// truncated form `first4...last4`.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: String) -> Self {
        SecretString(value)
    }

    /// Returns a reference to the inner string
    ///
    /// **Security Warning**: Only use this when actually needed for request
    /// signing. Never log or display the returned value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Returns a masked version of the secret for safe logging
    pub fn masked(&self) -> String {
        let s = &self.0;
        if s.len() <= 8 {
            return "***".to_string();
        }
        format!("{}...{}", &s[..4], &s[s.len() - 4..])
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString(***)")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        SecretString::new(s)
    }
}

/// KuCoin API credentials loaded from environment variables
///
/// KuCoin signs requests with three values: the API key, the secret signing
/// key, and the account passphrase (itself signed under key version 2).
#[derive(Clone, Debug)]
pub struct Credentials {
    /// API key (public identifier)
    pub api_key: SecretString,
    /// Secret signing key
    pub secret_key: SecretString,
    /// Account API passphrase
    pub passphrase: SecretString,
}

impl Credentials {
    /// Loads credentials from environment variables
    ///
    /// Reads `KUCOIN_API_KEY`, `KUCOIN_API_SECRET` and `KUCOIN_API_PASSPHRASE`.
    /// Trims whitespace and validates non-empty.
    pub fn from_env() -> Result<Self, String> {
        let api_key = require_env("KUCOIN_API_KEY")?;
        let secret_key = require_env("KUCOIN_API_SECRET")?;
        let passphrase = require_env("KUCOIN_API_PASSPHRASE")?;

        Ok(Self {
            api_key: SecretString::new(api_key),
            secret_key: SecretString::new(secret_key),
            passphrase: SecretString::new(passphrase),
        })
    }
}

fn require_env(name: &str) -> Result<String, String> {
    let value = std::env::var(name)
        .map_err(|_| format!("{} not set. Export it before trading.", name))?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(format!("{} is empty after trimming whitespace", name));
    }
    Ok(value)
}

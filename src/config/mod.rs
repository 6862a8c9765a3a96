//! Configuration management
//!
//! Environment-driven configuration for the exchange client: API
//! credentials and HTTP settings.

pub mod credentials;
pub mod http;

pub use credentials::{Credentials, SecretString};
pub use http::HttpConfig;

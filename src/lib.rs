// Library exports for pumpwatch

pub mod error;

pub mod book; // Order book snapshotting, ranking and price-impact queries
pub mod config; // Configuration management
pub mod exchange; // Exchange connectivity (KuCoin REST client)
pub mod position; // Single-position lifecycle state machine

pub use error::{AnalyzerError, ExchangeError, PositionError};

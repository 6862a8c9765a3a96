//! Position records for persistence collaborators

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One mark-to-market observation, appended once per evaluation
///
/// Suitable for append-only logging of an open position's life.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSnapshot {
    /// Term coin held (empty until the position has been opened)
    pub coin: String,

    /// Filled quantity, base units
    pub size: f64,

    /// size x ask - fees, quote currency
    pub last_valuation: f64,

    /// Ask price of the evaluated ticker
    pub last_ask: f64,

    /// Last traded price of the evaluated ticker
    pub last_price: f64,

    /// last_valuation - cost, quote currency
    pub unrealized_pnl: f64,

    /// Ticker time
    pub timestamp: DateTime<Utc>,
}

/// Final (or last known) closing state of a position
///
/// Returned by every `close()` call; repeated calls report the same
/// summary without touching the exchange again.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClosingSummary {
    /// Average sell fill price (infinity while never closed)
    pub closing_price: f64,

    /// closing_price - opening_price
    pub price_delta: f64,

    /// Realized PnL: size x closing_price - cost - fees
    pub pnl: f64,

    /// Cumulative fees over the position's life, quote currency
    pub fees: f64,
}

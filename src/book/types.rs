//! Order book data structures
//!
//! Core entities for point-in-time order book analysis. A snapshot is
//! captured once per fetch and never mutated; the next fetch supersedes it.

use serde::{Deserialize, Serialize};

use crate::exchange::types::OrderBookData;

/// Side of the order book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy side, best (highest) bid first after sorting
    Bids,

    /// Sell side, best (lowest) ask first after sorting
    Asks,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Bids => "bids",
            Side::Asks => "asks",
        }
    }
}

/// A price/quantity pair on one side of the book
///
/// Invariant: both fields are strictly positive. Levels that do not satisfy
/// this (zero-quantity deletions on some exchanges) are dropped at snapshot
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderLevel {
    pub price: f64,
    pub quantity: f64,
}

/// Immutable order book capture at one instant
///
/// `bids` and `asks` keep the order the exchange delivered them in; the
/// analyzer sorts per side on demand so that tie-breaks stay stable with
/// respect to the input sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    /// Trading pair symbol (e.g., "XYZ-USDT")
    pub symbol: String,

    /// Reference price at capture time, used for factor and base-volume math
    pub last_price: f64,

    /// Bid levels
    pub bids: Vec<OrderLevel>,

    /// Ask levels
    pub asks: Vec<OrderLevel>,

    /// Capture time (milliseconds since Unix epoch)
    pub timestamp: i64,
}

impl OrderBookSnapshot {
    /// Build a snapshot from raw exchange depth data and a reference price
    ///
    /// Levels with non-positive price or quantity are dropped, as are levels
    /// whose string fields fail to parse.
    pub fn from_depth(symbol: &str, depth: &OrderBookData, last_price: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            last_price,
            bids: parse_levels(&depth.bids),
            asks: parse_levels(&depth.asks),
            timestamp: depth.time,
        }
    }

    pub fn side(&self, side: Side) -> &[OrderLevel] {
        match side {
            Side::Bids => &self.bids,
            Side::Asks => &self.asks,
        }
    }
}

fn parse_levels(raw: &[(String, String)]) -> Vec<OrderLevel> {
    raw.iter()
        .filter_map(|(price, qty)| {
            let price = price.parse::<f64>().ok()?;
            let quantity = qty.parse::<f64>().ok()?;
            (price > 0.0 && quantity > 0.0).then_some(OrderLevel { price, quantity })
        })
        .collect()
}

/// One sorted order level annotated with ranking statistics
///
/// `cumulative_base_volume` is a running sum from the best price outward,
/// restarted independently per side, and is monotonically non-decreasing
/// along the sorted sequence. `volume_z_score` is NaN when the side has
/// fewer than 2 levels or zero base-volume variance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RankedLevel {
    pub side: Side,

    pub price: f64,

    pub quantity: f64,

    /// price / last_price, dimensionless distance from the reference price
    pub factor: f64,

    /// quantity x last_price, the level's value in quote currency
    pub base_volume: f64,

    /// Running sum of `base_volume` from the best price outward
    pub cumulative_base_volume: f64,

    /// (base_volume - mean) / stddev over the side's base volumes
    pub volume_z_score: f64,
}

/// Tabular ranked-level row for persistence or charting collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedLevelRecord {
    /// Capture time, RFC 3339
    pub timestamp: chrono::DateTime<chrono::Utc>,

    pub symbol: String,

    pub side: Side,

    pub price: f64,

    pub factor: f64,

    pub volume: f64,

    pub base_volume: f64,

    pub cumulative_base_volume: f64,

    pub volume_z_score: f64,
}

impl RankedLevelRecord {
    pub fn new(snapshot: &OrderBookSnapshot, level: &RankedLevel) -> Self {
        Self {
            timestamp: chrono::Utc::now(),
            symbol: snapshot.symbol.clone(),
            side: level.side,
            price: level.price,
            factor: level.factor,
            volume: level.quantity,
            base_volume: level.base_volume,
            cumulative_base_volume: level.cumulative_base_volume,
            volume_z_score: level.volume_z_score,
        }
    }
}

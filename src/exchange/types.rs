//! Exchange API type definitions
//!
//! Wire types for KuCoin REST responses plus the in-memory shapes the core
//! consumes. Prices and quantities arrive as strings to preserve precision
//! and are parsed at the boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ExchangeError;

/// KuCoin response envelope
///
/// Every endpoint wraps its payload in `{"code": "200000", "data": ...}`;
/// any other code is an API-level failure.
///
/// # Example Response
/// ```json
/// {
///   "code": "200000",
///   "data": { "orderId": "5bd6e9286d99522a52e458de" }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub code: String,
    pub msg: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Unwraps the payload, turning a non-success code into an API error
    pub fn into_data(self) -> Result<T, ExchangeError> {
        if self.code != "200000" {
            return Err(ExchangeError::Api {
                code: self.code,
                message: self.msg.unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        self.data.ok_or_else(|| {
            ExchangeError::ParseError("success response carried no data".to_string())
        })
    }
}

/// Response from /api/v1/market/orderbook/level2_100
///
/// Full depth for one symbol. Bids are delivered best (highest) first,
/// asks best (lowest) first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBookData {
    /// Snapshot time (milliseconds since Unix epoch)
    pub time: i64,
    /// Bid levels [price, quantity]
    pub bids: Vec<(String, String)>,
    /// Ask levels [price, quantity]
    pub asks: Vec<(String, String)>,
}

/// Response from /api/v1/market/orderbook/level1 (best bid/offer)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level1Data {
    /// Quote time (milliseconds since Unix epoch)
    pub time: i64,
    /// Last traded price
    pub price: String,
    /// Best bid price
    pub best_bid: String,
    /// Best ask price
    pub best_ask: String,
}

/// Point-in-time quote consumed by the core components
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticker {
    /// Trading pair symbol (e.g., "XYZ-USDT")
    pub symbol: String,
    /// Best bid price
    pub bid: f64,
    /// Best ask price
    pub ask: f64,
    /// Last traded price
    pub last: f64,
    /// Quote time (milliseconds since Unix epoch)
    pub time: i64,
    /// Quote time, RFC 3339
    pub datetime: DateTime<Utc>,
}

impl Ticker {
    /// Parse an exchange level-1 quote into a ticker
    pub fn from_level1(symbol: &str, data: &Level1Data) -> Result<Self, ExchangeError> {
        let datetime = DateTime::from_timestamp_millis(data.time).ok_or_else(|| {
            ExchangeError::ParseError(format!("invalid quote timestamp: {}", data.time))
        })?;
        Ok(Self {
            symbol: symbol.to_string(),
            bid: parse_price(&data.best_bid, "bestBid")?,
            ask: parse_price(&data.best_ask, "bestAsk")?,
            last: parse_price(&data.price, "price")?,
            time: data.time,
            datetime,
        })
    }
}

fn parse_price(value: &str, field: &str) -> Result<f64, ExchangeError> {
    value
        .parse::<f64>()
        .map_err(|_| ExchangeError::ParseError(format!("invalid {} value: {:?}", field, value)))
}

/// Response from POST /api/v1/orders
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub order_id: String,
}

/// Response from GET /api/v1/orders/{order-id}
///
/// Only the fields the core reads; the raw payload travels alongside for
/// the audit trail.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub id: String,
    pub symbol: String,
    /// Quote currency spent (buys) or received (sells)
    pub deal_funds: String,
    /// Base quantity filled
    pub deal_size: String,
    pub fee: String,
    pub fee_currency: String,
    /// True while the order still rests on the book
    pub is_active: bool,
    /// Placement time (milliseconds since Unix epoch)
    pub created_at: i64,
}

/// A single fee charge on a fill, in quote currency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fee {
    pub cost: f64,
    pub currency: String,
}

/// A filled (or rejected) order as seen by the position state machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderFill {
    pub order_id: String,

    pub symbol: String,

    /// Average fill price (deal funds / deal size); 0 when nothing filled
    pub price: f64,

    /// Base quantity filled
    pub filled: f64,

    /// Fee charges on this fill
    pub fees: Vec<Fee>,

    /// Placement time, RFC 3339
    pub datetime: DateTime<Utc>,

    /// True if the order is still resting (not fully executed)
    pub is_active: bool,

    /// Raw exchange payload, passed through untouched for audit persistence
    pub raw: serde_json::Value,
}

impl OrderFill {
    /// Build a fill from a parsed order detail plus its raw payload
    pub fn from_detail(detail: &OrderDetail, raw: serde_json::Value) -> Result<Self, ExchangeError> {
        let deal_funds = parse_price(&detail.deal_funds, "dealFunds")?;
        let deal_size = parse_price(&detail.deal_size, "dealSize")?;
        let fee = parse_price(&detail.fee, "fee")?;
        let datetime = DateTime::from_timestamp_millis(detail.created_at).ok_or_else(|| {
            ExchangeError::ParseError(format!("invalid order timestamp: {}", detail.created_at))
        })?;

        let price = if deal_size > 0.0 {
            deal_funds / deal_size
        } else {
            0.0
        };

        Ok(Self {
            order_id: detail.id.clone(),
            symbol: detail.symbol.clone(),
            price,
            filled: deal_size,
            fees: vec![Fee {
                cost: fee,
                currency: detail.fee_currency.clone(),
            }],
            datetime,
            is_active: detail.is_active,
            raw,
        })
    }

    /// Sum of fee costs on this fill
    pub fn fee_cost(&self) -> f64 {
        self.fees.iter().map(|fee| fee.cost).sum()
    }
}

/// One account row from GET /api/v1/accounts
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountData {
    pub currency: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub available: String,
}

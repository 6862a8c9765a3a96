//! Exchange connectivity
//!
//! The [`Exchange`] trait is the seam between the trading core and a
//! concrete venue: order book and ticker fetches, market order placement,
//! fill queries and balance lookups. [`KucoinClient`] is the REST
//! implementation; tests drive the core with scripted stand-ins.

pub mod client;
pub mod symbols;
pub mod types;

pub use client::KucoinClient;
pub use symbols::ExchangeId;
pub use types::{Fee, OrderBookData, OrderFill, Ticker};

use crate::book::OrderBookSnapshot;
use crate::error::ExchangeError;

/// Operations the trading core consumes from a venue
///
/// Implementations attempt each call exactly once and surface failures;
/// retry and backoff policy belongs to the caller.
#[allow(async_fn_in_trait)]
pub trait Exchange {
    /// Fetch full order book depth for a symbol
    async fn fetch_order_book(&self, symbol: &str) -> Result<OrderBookData, ExchangeError>;

    /// Fetch the current best bid/offer quote for a symbol
    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker, ExchangeError>;

    /// Place a market buy order for `size` base units, returning the order id
    async fn create_market_buy_order(
        &self,
        symbol: &str,
        size: f64,
    ) -> Result<String, ExchangeError>;

    /// Place a market sell order for `size` base units, returning the order id
    async fn create_market_sell_order(
        &self,
        symbol: &str,
        size: f64,
    ) -> Result<String, ExchangeError>;

    /// Query the fill state of a previously placed order
    async fn fetch_order(&self, order_id: &str, symbol: &str) -> Result<OrderFill, ExchangeError>;

    /// Get the available trade balance for a currency
    async fn fetch_balance(&self, currency: &str) -> Result<f64, ExchangeError>;
}

/// Capture an order book snapshot together with its reference price
///
/// Fetches the depth and the latest ticker in sequence and binds them into
/// one immutable snapshot for the analyzer.
pub async fn fetch_snapshot<E: Exchange>(
    exchange: &E,
    symbol: &str,
) -> Result<OrderBookSnapshot, ExchangeError> {
    let depth = exchange.fetch_order_book(symbol).await?;
    let ticker = exchange.fetch_ticker(symbol).await?;
    Ok(OrderBookSnapshot::from_depth(symbol, &depth, ticker.last))
}

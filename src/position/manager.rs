//! Position lifecycle state machine
//!
//! Owns at most one open trade: CLOSED -> OPEN -> CLOSED, terminal. A new
//! position must be constructed for a new trade. Each transition delegates
//! order placement to the exchange and attempts it exactly once; failures
//! propagate to the caller, which owns any retry policy. The manager never
//! masks a failed close, since an unreported failed close would leave a
//! real position open while the caller believes it closed.
//!
//! A single instance must not be mutated by concurrent callers; `open`,
//! `evaluate` and `close` are meant to run on one logical thread of
//! control per position.

use crate::error::{ExchangeError, PositionError};
use crate::exchange::symbols::ExchangeId;
use crate::exchange::types::Ticker;
use crate::exchange::Exchange;
use crate::position::records::{ClosingSummary, PositionSnapshot};

/// Drawdown-from-peak percentage below which an auto-close fires
pub const DEFAULT_MAX_DRAWDOWN_PCT: f64 = 98.0;

/// A single market position in one coin / base-currency pair
///
/// Monetary fields are in the base currency. `opening_price` and
/// `closing_price` start at +infinity ("unset"); `pnl` and `max_pnl` start
/// at -infinity so the first evaluation always establishes the peak.
#[derive(Debug)]
pub struct Position<E: Exchange> {
    exchange: E,
    exchange_id: ExchangeId,
    base_currency: String,
    auto_close: bool,
    max_drawdown_pct: f64,

    coin: Option<String>,
    symbol: Option<String>,
    is_open: bool,
    /// Raw fill payloads, append-only, for audit trail persistence
    order_list: Vec<serde_json::Value>,
    opening_price: f64,
    closing_price: f64,
    fees: f64,
    size: f64,
    cost: f64,
    max_pnl: f64,
    pnl: f64,
    last_valuation: f64,
    last_ticker: Option<Ticker>,
    price_delta: f64,
}

impl<E: Exchange> Position<E> {
    /// Create a closed position bound to one venue and base currency
    ///
    /// Auto-close is enabled with the default drawdown limit; use
    /// [`with_auto_close`](Self::with_auto_close) and
    /// [`with_max_drawdown_pct`](Self::with_max_drawdown_pct) to adjust.
    pub fn new(exchange: E, exchange_id: ExchangeId, base_currency: impl Into<String>) -> Self {
        Self {
            exchange,
            exchange_id,
            base_currency: base_currency.into(),
            auto_close: true,
            max_drawdown_pct: DEFAULT_MAX_DRAWDOWN_PCT,
            coin: None,
            symbol: None,
            is_open: false,
            order_list: Vec::new(),
            opening_price: f64::INFINITY,
            closing_price: f64::INFINITY,
            fees: 0.0,
            size: 0.0,
            cost: 0.0,
            max_pnl: f64::NEG_INFINITY,
            pnl: f64::NEG_INFINITY,
            last_valuation: 0.0,
            last_ticker: None,
            price_delta: 0.0,
        }
    }

    pub fn with_auto_close(mut self, auto_close: bool) -> Self {
        self.auto_close = auto_close;
        self
    }

    pub fn with_max_drawdown_pct(mut self, max_drawdown_pct: f64) -> Self {
        self.max_drawdown_pct = max_drawdown_pct;
        self
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    pub fn coin(&self) -> Option<&str> {
        self.coin.as_deref()
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    pub fn opening_price(&self) -> f64 {
        self.opening_price
    }

    pub fn closing_price(&self) -> f64 {
        self.closing_price
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn fees(&self) -> f64 {
        self.fees
    }

    pub fn pnl(&self) -> f64 {
        self.pnl
    }

    pub fn max_pnl(&self) -> f64 {
        self.max_pnl
    }

    pub fn last_valuation(&self) -> f64 {
        self.last_valuation
    }

    pub fn price_delta(&self) -> f64 {
        self.price_delta
    }

    /// Ticker seen by the most recent `open` or `evaluate`
    pub fn last_ticker(&self) -> Option<&Ticker> {
        self.last_ticker.as_ref()
    }

    /// Raw fill payloads in placement order
    pub fn order_list(&self) -> &[serde_json::Value] {
        &self.order_list
    }

    /// Open the position at market rate, committing `balance` base currency
    /// to the given coin
    ///
    /// Fetches the current ticker, buys `balance / bid` base units at
    /// market, then queries the fill to set the opening price, size and
    /// fees. Returns the ticker observed at decision time. A rejected or
    /// partially-unfilled order fails with [`PositionError::OpenRejected`];
    /// retries belong to the caller.
    pub async fn open(&mut self, balance: f64, coin: &str) -> Result<Ticker, PositionError> {
        if self.is_open {
            return Err(PositionError::AlreadyOpen {
                symbol: self.symbol.clone().unwrap_or_default(),
            });
        }
        if balance <= 0.0 {
            return Err(PositionError::InvalidBalance { balance });
        }

        let symbol = self.exchange_id.make_symbol(coin, &self.base_currency);
        self.coin = Some(coin.to_string());
        self.symbol = Some(symbol.clone());
        self.cost = balance;

        let ticker = self.exchange.fetch_ticker(&symbol).await?;
        if ticker.bid <= 0.0 {
            return Err(ExchangeError::ParseError(format!(
                "non-positive bid {} for {}",
                ticker.bid, symbol
            ))
            .into());
        }

        let amount = balance / ticker.bid;
        let order_id = self.exchange.create_market_buy_order(&symbol, amount).await?;
        self.is_open = true;

        let fill = self.exchange.fetch_order(&order_id, &symbol).await?;
        if fill.is_active || fill.filled <= 0.0 {
            self.is_open = false;
            let reason = if fill.filled <= 0.0 {
                "rejected"
            } else {
                "partially unfilled"
            };
            return Err(PositionError::OpenRejected {
                order_id,
                filled: fill.filled,
                reason: reason.to_string(),
            });
        }

        self.opening_price = fill.price;
        self.size = fill.filled;
        self.fees += fill.fee_cost();
        self.order_list.push(fill.raw.clone());

        tracing::info!(
            price = self.opening_price,
            size = self.size,
            coin,
            datetime = %fill.datetime,
            "market order filled"
        );

        self.last_ticker = Some(ticker.clone());
        Ok(ticker)
    }

    /// Mark the position to market against the provided ticker
    ///
    /// Updates the running valuation, PnL and peak PnL, and returns an
    /// observation record for append-only logging. When auto-close is
    /// enabled and the PnL has fallen below `max_drawdown_pct` percent of
    /// the peak, the position is closed immediately. The drawdown ratio is
    /// only a valid signal once the peak is positive; while `max_pnl <= 0`
    /// the auto-close check is skipped. On an already-closed position this
    /// updates fields only.
    pub async fn evaluate(&mut self, ticker: &Ticker) -> Result<PositionSnapshot, PositionError> {
        self.last_valuation = self.size * ticker.ask - self.fees;
        self.pnl = self.last_valuation - self.cost;
        if self.pnl > self.max_pnl {
            self.max_pnl = self.pnl;
        }
        self.last_ticker = Some(ticker.clone());

        let snapshot = PositionSnapshot {
            coin: self.coin.clone().unwrap_or_default(),
            size: self.size,
            last_valuation: self.last_valuation,
            last_ask: ticker.ask,
            last_price: ticker.last,
            unrealized_pnl: self.pnl,
            timestamp: ticker.datetime,
        };

        if self.is_open && self.auto_close && self.max_pnl > 0.0 {
            let drawdown_pct = self.pnl / self.max_pnl * 100.0;
            if drawdown_pct < self.max_drawdown_pct {
                tracing::info!(
                    pnl = self.pnl,
                    max_pnl = self.max_pnl,
                    drawdown_pct,
                    "drawdown limit hit, closing position"
                );
                self.close().await?;
            }
        }

        Ok(snapshot)
    }

    /// Close the position at market rate
    ///
    /// Sells the full size, waits for the fill, and settles the realized
    /// PnL and price delta. Calling `close` on an already-closed position
    /// is a no-op that still reports the last known closing summary.
    pub async fn close(&mut self) -> Result<ClosingSummary, PositionError> {
        if self.is_open {
            let symbol = self.symbol.clone().ok_or_else(|| {
                ExchangeError::InternalError("open position without a symbol".to_string())
            })?;

            let order_id = self
                .exchange
                .create_market_sell_order(&symbol, self.size)
                .await?;
            self.is_open = false;

            let fill = self.exchange.fetch_order(&order_id, &symbol).await?;
            self.order_list.push(fill.raw.clone());
            self.closing_price = fill.price;
            self.fees += fill.fee_cost();

            let closing_valuation = self.size * self.closing_price;
            self.pnl = closing_valuation - self.cost - self.fees;
            self.price_delta = self.closing_price - self.opening_price;

            tracing::info!(
                closing_price = self.closing_price,
                price_delta = self.price_delta,
                pnl = self.pnl,
                base_currency = %self.base_currency,
                "closed position"
            );
        }

        Ok(ClosingSummary {
            closing_price: self.closing_price,
            price_delta: self.price_delta,
            pnl: self.pnl,
            fees: self.fees,
        })
    }
}

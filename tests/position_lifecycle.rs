//! Position lifecycle integration tests
//!
//! Drives the CLOSED -> OPEN -> CLOSED state machine with a scripted
//! exchange stand-in: queued tickers and fills, plus a log of every order
//! placed, so each test asserts both the position state and the exchange
//! traffic it caused.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use chrono::DateTime;
use pumpwatch::error::{ExchangeError, PositionError};
use pumpwatch::exchange::types::{Fee, OrderBookData, OrderFill, Ticker};
use pumpwatch::exchange::{Exchange, ExchangeId};
use pumpwatch::position::Position;

#[derive(Debug, Clone, PartialEq)]
struct PlacedOrder {
    side: &'static str,
    symbol: String,
    size: f64,
}

/// Scripted exchange: hands out queued tickers and fills in order and
/// records every order placement.
#[derive(Debug, Clone, Default)]
struct MockExchange {
    tickers: Rc<RefCell<VecDeque<Ticker>>>,
    fills: Rc<RefCell<VecDeque<OrderFill>>>,
    placed: Rc<RefCell<Vec<PlacedOrder>>>,
}

impl MockExchange {
    fn push_ticker(&self, ticker: Ticker) {
        self.tickers.borrow_mut().push_back(ticker);
    }

    fn push_fill(&self, fill: OrderFill) {
        self.fills.borrow_mut().push_back(fill);
    }

    fn placed_orders(&self) -> Vec<PlacedOrder> {
        self.placed.borrow().clone()
    }

    fn record_order(&self, side: &'static str, symbol: &str, size: f64) -> String {
        let mut placed = self.placed.borrow_mut();
        placed.push(PlacedOrder {
            side,
            symbol: symbol.to_string(),
            size,
        });
        format!("ord-{}", placed.len())
    }
}

impl Exchange for MockExchange {
    async fn fetch_order_book(&self, _symbol: &str) -> Result<OrderBookData, ExchangeError> {
        Err(ExchangeError::InternalError("not scripted".to_string()))
    }

    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker, ExchangeError> {
        self.tickers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ExchangeError::InternalError(format!("no scripted ticker for {}", symbol)))
    }

    async fn create_market_buy_order(
        &self,
        symbol: &str,
        size: f64,
    ) -> Result<String, ExchangeError> {
        Ok(self.record_order("buy", symbol, size))
    }

    async fn create_market_sell_order(
        &self,
        symbol: &str,
        size: f64,
    ) -> Result<String, ExchangeError> {
        Ok(self.record_order("sell", symbol, size))
    }

    async fn fetch_order(&self, order_id: &str, _symbol: &str) -> Result<OrderFill, ExchangeError> {
        self.fills
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ExchangeError::InternalError(format!("no scripted fill for {}", order_id)))
    }

    async fn fetch_balance(&self, _currency: &str) -> Result<f64, ExchangeError> {
        Ok(1000.0)
    }
}

fn ticker(bid: f64, ask: f64, last: f64) -> Ticker {
    let time = 1_699_564_800_000;
    Ticker {
        symbol: "XYZ-USDT".to_string(),
        bid,
        ask,
        last,
        time,
        datetime: DateTime::from_timestamp_millis(time).unwrap(),
    }
}

fn fill(price: f64, filled: f64, fee: f64) -> OrderFill {
    let raw = serde_json::json!({
        "dealFunds": (price * filled).to_string(),
        "dealSize": filled.to_string(),
        "fee": fee.to_string(),
    });
    OrderFill {
        order_id: "ord".to_string(),
        symbol: "XYZ-USDT".to_string(),
        price,
        filled,
        fees: vec![Fee {
            cost: fee,
            currency: "USDT".to_string(),
        }],
        datetime: DateTime::from_timestamp_millis(1_699_564_800_000).unwrap(),
        is_active: false,
        raw,
    }
}

fn position(exchange: MockExchange) -> Position<MockExchange> {
    Position::new(exchange, ExchangeId::Kucoin, "USDT")
}

#[tokio::test]
async fn open_maps_fill_fields_onto_the_position() {
    let exchange = MockExchange::default();
    exchange.push_ticker(ticker(10.0, 10.05, 10.0));
    exchange.push_fill(fill(10.0, 99.5, 1.0));

    let mut position = position(exchange.clone());
    let balance = exchange.fetch_balance("USDT").await.unwrap();
    let seen = position.open(balance, "XYZ").await.unwrap();

    assert!(position.is_open());
    assert_eq!(position.symbol(), Some("XYZ-USDT"));
    assert_eq!(position.opening_price(), 10.0);
    assert_eq!(position.size(), 99.5);
    assert_eq!(position.fees(), 1.0);
    assert_eq!(position.cost(), 1000.0);
    assert_eq!(position.order_list().len(), 1);
    assert_eq!(seen.bid, 10.0);

    // Sized the buy as balance / bid
    let placed = exchange.placed_orders();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].side, "buy");
    assert_eq!(placed[0].symbol, "XYZ-USDT");
    assert!((placed[0].size - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn open_on_open_position_is_rejected() {
    let exchange = MockExchange::default();
    exchange.push_ticker(ticker(10.0, 10.05, 10.0));
    exchange.push_fill(fill(10.0, 100.0, 1.0));

    let mut position = position(exchange);
    position.open(1000.0, "XYZ").await.unwrap();

    let err = position.open(500.0, "ABC").await.unwrap_err();
    assert!(matches!(err, PositionError::AlreadyOpen { .. }));
    assert!(position.is_open());
}

#[tokio::test]
async fn open_requires_positive_balance() {
    let mut position = position(MockExchange::default());
    let err = position.open(0.0, "XYZ").await.unwrap_err();
    assert!(matches!(err, PositionError::InvalidBalance { .. }));
    assert!(!position.is_open());
}

#[tokio::test]
async fn open_propagates_a_rejected_order() {
    let exchange = MockExchange::default();
    exchange.push_ticker(ticker(10.0, 10.05, 10.0));
    exchange.push_fill(fill(0.0, 0.0, 0.0));

    let mut position = position(exchange);
    let err = position.open(1000.0, "XYZ").await.unwrap_err();

    assert!(matches!(err, PositionError::OpenRejected { .. }));
    assert!(!position.is_open());
}

#[tokio::test]
async fn open_propagates_exchange_failures() {
    // No scripted ticker: the fetch fails and the position stays closed
    let mut position = position(MockExchange::default());
    let err = position.open(1000.0, "XYZ").await.unwrap_err();
    assert!(matches!(err, PositionError::Exchange(_)));
    assert!(!position.is_open());
}

#[tokio::test]
async fn evaluate_at_entry_price_yields_minus_fees() {
    let exchange = MockExchange::default();
    exchange.push_ticker(ticker(10.0, 10.0, 10.0));
    // size x price recovers the cost exactly, so only fees are lost
    exchange.push_fill(fill(10.0, 100.0, 1.0));

    let mut position = position(exchange);
    position.open(1000.0, "XYZ").await.unwrap();

    let snapshot = position.evaluate(&ticker(10.0, 10.0, 10.0)).await.unwrap();

    assert_eq!(position.pnl(), -1.0);
    assert_eq!(position.pnl(), -position.fees());
    assert_eq!(snapshot.unrealized_pnl, -1.0);
    assert_eq!(snapshot.last_valuation, 999.0);
    assert_eq!(snapshot.coin, "XYZ");
    // A position that never went into profit must not auto-close
    assert!(position.is_open());
}

#[tokio::test]
async fn evaluate_is_idempotent_for_the_same_ticker() {
    let exchange = MockExchange::default();
    exchange.push_ticker(ticker(10.0, 10.05, 10.0));
    exchange.push_fill(fill(10.0, 100.0, 1.0));

    let mut position = position(exchange);
    position.open(1000.0, "XYZ").await.unwrap();

    let quote = ticker(10.2, 10.3, 10.25);
    position.evaluate(&quote).await.unwrap();
    let pnl = position.pnl();
    let max_pnl = position.max_pnl();

    position.evaluate(&quote).await.unwrap();
    assert_eq!(position.pnl(), pnl);
    assert_eq!(position.max_pnl(), max_pnl);
}

#[tokio::test]
async fn auto_close_fires_when_drawdown_breaches_the_limit() {
    let exchange = MockExchange::default();
    exchange.push_ticker(ticker(10.0, 10.0, 10.0));
    exchange.push_fill(fill(10.0, 100.0, 0.0));

    let mut position = position(exchange.clone());
    position.open(1000.0, "XYZ").await.unwrap();

    // Pump: peak PnL established at +1000
    position.evaluate(&ticker(19.9, 20.0, 20.0)).await.unwrap();
    assert_eq!(position.max_pnl(), 1000.0);
    assert!(position.is_open());

    // Dump: PnL falls to 5% of the peak, well under the 98% limit
    exchange.push_fill(fill(10.5, 100.0, 0.0));
    position.evaluate(&ticker(10.4, 10.5, 10.5)).await.unwrap();

    assert!(!position.is_open());
    assert_eq!(position.closing_price(), 10.5);
    assert_eq!(position.pnl(), 50.0);
    assert_eq!(position.price_delta(), 0.5);

    let placed = exchange.placed_orders();
    assert_eq!(placed.len(), 2);
    assert_eq!(placed[1].side, "sell");
    assert_eq!(placed[1].size, 100.0);
}

#[tokio::test]
async fn auto_close_never_fires_while_peak_pnl_is_not_positive() {
    let exchange = MockExchange::default();
    exchange.push_ticker(ticker(10.0, 10.0, 10.0));
    exchange.push_fill(fill(10.0, 100.0, 1.0));

    let mut position = position(exchange.clone());
    position.open(1000.0, "XYZ").await.unwrap();

    // Straight underwater from the first evaluation: the drawdown ratio is
    // sign-inverted in this regime and must be ignored
    position.evaluate(&ticker(8.9, 9.0, 9.0)).await.unwrap();
    position.evaluate(&ticker(7.9, 8.0, 8.0)).await.unwrap();

    assert!(position.is_open());
    assert!(position.max_pnl() <= 0.0);
    assert_eq!(exchange.placed_orders().len(), 1);
}

#[tokio::test]
async fn drawdown_within_the_limit_keeps_the_position_open() {
    let exchange = MockExchange::default();
    exchange.push_ticker(ticker(10.0, 10.0, 10.0));
    exchange.push_fill(fill(10.0, 100.0, 0.0));

    let mut position = position(exchange.clone());
    position.open(1000.0, "XYZ").await.unwrap();

    position.evaluate(&ticker(19.9, 20.0, 20.0)).await.unwrap();
    // PnL 990 of peak 1000 = 99%, above the 98% limit
    position.evaluate(&ticker(19.8, 19.9, 19.9)).await.unwrap();

    assert!(position.is_open());
    assert_eq!(exchange.placed_orders().len(), 1);
}

#[tokio::test]
async fn manual_close_settles_realized_pnl() {
    let exchange = MockExchange::default();
    exchange.push_ticker(ticker(10.0, 10.0, 10.0));
    exchange.push_fill(fill(10.0, 100.0, 1.0));

    let mut position = position(exchange.clone());
    position.open(1000.0, "XYZ").await.unwrap();

    exchange.push_fill(fill(12.0, 100.0, 1.2));
    let summary = position.close().await.unwrap();

    assert!(!position.is_open());
    assert_eq!(summary.closing_price, 12.0);
    // 100 x 12 - 1000 - (1 + 1.2)
    assert!((summary.pnl - 197.8).abs() < 1e-9);
    assert_eq!(summary.price_delta, 2.0);
    assert_eq!(summary.fees, 2.2);
    assert_eq!(position.order_list().len(), 2);
}

#[tokio::test]
async fn close_is_an_idempotent_no_op_once_closed() {
    let exchange = MockExchange::default();
    exchange.push_ticker(ticker(10.0, 10.0, 10.0));
    exchange.push_fill(fill(10.0, 100.0, 1.0));

    let mut position = position(exchange.clone());
    position.open(1000.0, "XYZ").await.unwrap();

    exchange.push_fill(fill(12.0, 100.0, 1.2));
    let first = position.close().await.unwrap();
    let second = position.close().await.unwrap();

    assert_eq!(first.closing_price, second.closing_price);
    assert_eq!(first.pnl, second.pnl);
    // The second call placed no order
    assert_eq!(exchange.placed_orders().len(), 2);
}

#[tokio::test]
async fn close_before_open_reports_the_unset_summary() {
    let mut position = position(MockExchange::default());
    let summary = position.close().await.unwrap();
    assert!(summary.closing_price.is_infinite());
    assert!(!position.is_open());
}

#[tokio::test]
async fn evaluate_after_close_updates_fields_without_reclosing() {
    let exchange = MockExchange::default();
    exchange.push_ticker(ticker(10.0, 10.0, 10.0));
    exchange.push_fill(fill(10.0, 100.0, 0.0));

    let mut position = position(exchange.clone());
    position.open(1000.0, "XYZ").await.unwrap();
    position.evaluate(&ticker(19.9, 20.0, 20.0)).await.unwrap();

    exchange.push_fill(fill(20.0, 100.0, 0.0));
    position.close().await.unwrap();

    // A late ticker after the close updates the valuation only
    let snapshot = position.evaluate(&ticker(5.0, 5.0, 5.0)).await.unwrap();
    assert!(!position.is_open());
    assert_eq!(snapshot.last_ask, 5.0);
    assert_eq!(exchange.placed_orders().len(), 2);
}

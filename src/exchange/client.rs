//! KuCoin HTTP Client
//!
//! HTTP client wrapper for the KuCoin REST API. Provides timeout
//! configuration, user-agent headers, and v2 request signing
//! (HMAC-SHA256 over `timestamp + method + path + body`, base64 encoded,
//! with the passphrase itself signed).

use hmac::{Hmac, Mac};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::{Credentials, HttpConfig};
use crate::error::ExchangeError;
use crate::exchange::types::{
    AccountData, ApiResponse, Level1Data, OrderBookData, OrderCreated, OrderDetail, OrderFill,
    Ticker,
};
use crate::exchange::Exchange;

type HmacSha256 = Hmac<Sha256>;

/// KuCoin REST API HTTP client
///
/// Wraps `reqwest::Client` with base URL, timeout, user-agent and optional
/// API credentials. Market-data endpoints work without credentials; order
/// placement and account queries require them.
#[derive(Clone)]
pub struct KucoinClient {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl std::fmt::Debug for KucoinClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KucoinClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials.as_ref().map(|_| "***"))
            .finish()
    }
}

impl KucoinClient {
    /// Creates a new client with default settings (no credentials)
    pub fn new() -> Self {
        Self::with_config(HttpConfig::default())
    }

    /// Creates a new client from an explicit HTTP configuration
    pub fn with_config(config: HttpConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent("pumpwatch/0.1.0")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.base_url,
            credentials: None,
        }
    }

    /// Creates a new client with API credentials from environment
    ///
    /// Reads `KUCOIN_API_KEY`, `KUCOIN_API_SECRET` and `KUCOIN_API_PASSPHRASE`.
    /// Falls back to public-endpoint-only mode when they are not all set.
    pub fn with_credentials() -> Self {
        let mut client = Self::new();
        client.credentials = Credentials::from_env().ok();
        client
    }

    /// Returns the configured base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Gets current timestamp in milliseconds
    fn get_timestamp() -> Result<u64, ExchangeError> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .map_err(|e| ExchangeError::ParseError(format!("System time error: {}", e)))
    }

    fn credentials(&self) -> Result<&Credentials, ExchangeError> {
        self.credentials.as_ref().ok_or_else(|| {
            ExchangeError::InvalidRequest("API credentials not configured".to_string())
        })
    }

    fn hmac_base64(secret: &str, payload: &str) -> Result<String, ExchangeError> {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| ExchangeError::ParseError(format!("Invalid secret key: {}", e)))?;
        mac.update(payload.as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }

    /// Sends a signed request to a private endpoint
    ///
    /// KuCoin v2 signing: `KC-API-SIGN` is the base64 HMAC-SHA256 of
    /// `timestamp + method + path + body` under the secret key, and
    /// `KC-API-PASSPHRASE` is the passphrase signed the same way.
    async fn signed_request(
        &self,
        method: reqwest::Method,
        path_and_query: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, ExchangeError> {
        let credentials = self.credentials()?;
        let timestamp = Self::get_timestamp()?;

        let body_text = match &body {
            Some(value) => value.to_string(),
            None => String::new(),
        };
        let payload = format!("{}{}{}{}", timestamp, method.as_str(), path_and_query, body_text);

        let secret = credentials.secret_key.expose_secret();
        let signature = Self::hmac_base64(secret, &payload)?;
        let passphrase = Self::hmac_base64(secret, credentials.passphrase.expose_secret())?;

        let url = format!("{}{}", self.base_url, path_and_query);
        let mut request = self
            .client
            .request(method, &url)
            .header("KC-API-KEY", credentials.api_key.expose_secret())
            .header("KC-API-SIGN", signature)
            .header("KC-API-TIMESTAMP", timestamp.to_string())
            .header("KC-API-PASSPHRASE", passphrase)
            .header("KC-API-KEY-VERSION", "2");

        if body.is_some() {
            request = request
                .header("Content-Type", "application/json")
                .body(body_text);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ExchangeError::from(response.error_for_status().unwrap_err()));
        }
        Ok(response)
    }

    async fn public_get(&self, path_and_query: &str) -> Result<reqwest::Response, ExchangeError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ExchangeError::from(response.error_for_status().unwrap_err()));
        }
        Ok(response)
    }

    /// Places a market order and returns the exchange order id
    async fn create_market_order(
        &self,
        symbol: &str,
        side: &str,
        size: f64,
    ) -> Result<String, ExchangeError> {
        let body = serde_json::json!({
            "clientOid": uuid::Uuid::new_v4().to_string(),
            "side": side,
            "symbol": symbol,
            "type": "market",
            "size": size.to_string(),
        });

        tracing::debug!(symbol, side, size, "placing market order");

        let response = self
            .signed_request(reqwest::Method::POST, "/api/v1/orders", Some(body))
            .await?;
        let created: ApiResponse<OrderCreated> = response.json().await?;
        Ok(created.into_data()?.order_id)
    }
}

impl Default for KucoinClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Exchange for KucoinClient {
    /// Get full order book depth
    ///
    /// Calls GET /api/v1/market/orderbook/level2_100
    async fn fetch_order_book(&self, symbol: &str) -> Result<OrderBookData, ExchangeError> {
        let path = format!("/api/v1/market/orderbook/level2_100?symbol={}", symbol);
        let response = self.public_get(&path).await?;

        let book: ApiResponse<OrderBookData> = response.json().await?;
        book.into_data()
    }

    /// Get the best bid/offer quote for a symbol
    ///
    /// Calls GET /api/v1/market/orderbook/level1
    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker, ExchangeError> {
        let path = format!("/api/v1/market/orderbook/level1?symbol={}", symbol);
        let response = self.public_get(&path).await?;

        let level1: ApiResponse<Level1Data> = response.json().await?;
        Ticker::from_level1(symbol, &level1.into_data()?)
    }

    /// Place a market buy order for `size` base units
    async fn create_market_buy_order(
        &self,
        symbol: &str,
        size: f64,
    ) -> Result<String, ExchangeError> {
        self.create_market_order(symbol, "buy", size).await
    }

    /// Place a market sell order for `size` base units
    async fn create_market_sell_order(
        &self,
        symbol: &str,
        size: f64,
    ) -> Result<String, ExchangeError> {
        self.create_market_order(symbol, "sell", size).await
    }

    /// Query an order's fill state
    ///
    /// Calls GET /api/v1/orders/{order-id}. The raw payload is kept on the
    /// returned fill for audit persistence. `symbol` is part of the generic
    /// interface; KuCoin resolves orders by id alone.
    async fn fetch_order(&self, order_id: &str, _symbol: &str) -> Result<OrderFill, ExchangeError> {
        let path = format!("/api/v1/orders/{}", order_id);
        let response = self
            .signed_request(reqwest::Method::GET, &path, None)
            .await?;

        let envelope: ApiResponse<serde_json::Value> = response.json().await?;
        let raw = envelope.into_data()?;
        let detail: OrderDetail = serde_json::from_value(raw.clone())?;
        OrderFill::from_detail(&detail, raw)
    }

    /// Get the available trade-account balance for a currency
    ///
    /// Calls GET /api/v1/accounts filtered to the trade account type.
    async fn fetch_balance(&self, currency: &str) -> Result<f64, ExchangeError> {
        let path = format!("/api/v1/accounts?currency={}&type=trade", currency);
        let response = self
            .signed_request(reqwest::Method::GET, &path, None)
            .await?;

        let accounts: ApiResponse<Vec<AccountData>> = response.json().await?;
        let accounts = accounts.into_data()?;

        let account = accounts
            .iter()
            .find(|account| account.currency == currency && account.account_type == "trade")
            .ok_or_else(|| {
                ExchangeError::InvalidRequest(format!("no trade account for {}", currency))
            })?;

        account.available.parse::<f64>().map_err(|_| {
            ExchangeError::ParseError(format!(
                "invalid available balance: {:?}",
                account.available
            ))
        })
    }
}

use thiserror::Error;

/// Errors from order book transforms and cumulative-depth lookups
///
/// These are local and recoverable: callers routinely retry with a
/// different side or a smaller target volume.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("invalid snapshot: {side} side is empty")]
    InvalidSnapshot { side: &'static str },

    #[error(
        "volume exceeds book depth: requested {requested} but {side} side holds {available}"
    )]
    DepthExceeded {
        side: &'static str,
        requested: f64,
        available: f64,
    },
}

/// Errors from the position lifecycle state machine
///
/// Exchange failures are always surfaced to the caller; the state machine
/// never masks a failed close.
#[derive(Error, Debug)]
pub enum PositionError {
    #[error("position is already open on {symbol}")]
    AlreadyOpen { symbol: String },

    #[error("opening balance must be positive, got {balance}")]
    InvalidBalance { balance: f64 },

    #[error("open failed: order {order_id} reported {filled} filled ({reason})")]
    OpenRejected {
        order_id: String,
        filled: f64,
        reason: String,
    },

    #[error("exchange operation failed: {0}")]
    Exchange(#[from] ExchangeError),
}

/// Errors from exchange connectivity (REST client)
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("rate limit exceeded: {0}")]
    RateLimitError(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("exchange API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("internal error: {0}")]
    InternalError(String),
}

impl ExchangeError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExchangeError::ConnectionError(_) | ExchangeError::RateLimitError(_)
        )
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ExchangeError::ConnectionError(_) => "connection_error",
            ExchangeError::RateLimitError(_) => "rate_limit",
            ExchangeError::ParseError(_) => "parse_error",
            ExchangeError::InvalidRequest(_) => "invalid_request",
            ExchangeError::Api { .. } => "api_error",
            ExchangeError::InternalError(_) => "internal_error",
        }
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExchangeError::ConnectionError(
                "Request timeout. Please check your internet connection.".to_string(),
            )
        } else if err.is_connect() {
            ExchangeError::ConnectionError(
                "Failed to connect to the exchange API. Please check your internet connection."
                    .to_string(),
            )
        } else if let Some(status) = err.status() {
            match status.as_u16() {
                429 => ExchangeError::RateLimitError(
                    "Too many requests to the exchange API. Retry after 60 seconds.".to_string(),
                ),
                403 => ExchangeError::ConnectionError(
                    "Request rejected by the exchange firewall. Reduce request frequency."
                        .to_string(),
                ),
                500..=599 => ExchangeError::ConnectionError(format!(
                    "Exchange server error (HTTP {}). Please try again later.",
                    status.as_u16()
                )),
                _ => ExchangeError::InternalError(format!("HTTP error: {}", status)),
            }
        } else {
            ExchangeError::InternalError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::ParseError(format!("JSON parsing failed: {}", err))
    }
}

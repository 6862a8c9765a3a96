//! Symbol naming conventions per exchange
//!
//! Pair separators differ between venues ("-" on KuCoin, "/" elsewhere).
//! This is configuration data keyed by exchange identifier, kept outside
//! the core components.

use std::fmt;
use std::str::FromStr;

/// Supported trading venues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeId {
    Kucoin,
    KucoinFutures,
    BinanceFutures,
    Bitstamp,
}

impl ExchangeId {
    /// Separator between term coin and base currency in this venue's symbols
    pub fn separator(&self) -> char {
        match self {
            ExchangeId::Kucoin | ExchangeId::KucoinFutures => '-',
            ExchangeId::BinanceFutures | ExchangeId::Bitstamp => '/',
        }
    }

    /// Format a trading pair symbol for this venue
    pub fn make_symbol(&self, term_coin: &str, base_currency: &str) -> String {
        format!("{}{}{}", term_coin, self.separator(), base_currency)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeId::Kucoin => "kucoin",
            ExchangeId::KucoinFutures => "kucoin_f",
            ExchangeId::BinanceFutures => "binance_f",
            ExchangeId::Bitstamp => "bitstamp",
        }
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExchangeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kucoin" => Ok(ExchangeId::Kucoin),
            "kucoin_f" => Ok(ExchangeId::KucoinFutures),
            "binance_f" => Ok(ExchangeId::BinanceFutures),
            "bitstamp" => Ok(ExchangeId::Bitstamp),
            other => Err(format!("Unsupported exchange {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_conventions() {
        assert_eq!(ExchangeId::Kucoin.make_symbol("XYZ", "USDT"), "XYZ-USDT");
        assert_eq!(ExchangeId::KucoinFutures.make_symbol("XYZ", "USDT"), "XYZ-USDT");
        assert_eq!(ExchangeId::BinanceFutures.make_symbol("XYZ", "USDT"), "XYZ/USDT");
        assert_eq!(ExchangeId::Bitstamp.make_symbol("BTC", "USD"), "BTC/USD");
    }

    #[test]
    fn test_parse_round_trip() {
        for id in [
            ExchangeId::Kucoin,
            ExchangeId::KucoinFutures,
            ExchangeId::BinanceFutures,
            ExchangeId::Bitstamp,
        ] {
            assert_eq!(id.as_str().parse::<ExchangeId>().unwrap(), id);
        }
        assert!("mtgox".parse::<ExchangeId>().is_err());
    }
}

//! Position lifecycle management
//!
//! One position per trade, explicitly owned by the session that created
//! it: market open, repeated mark-to-market evaluation with peak-PnL
//! tracking, and automatic close when drawdown from the peak exceeds the
//! configured limit.

pub mod manager;
pub mod records;

pub use manager::{Position, DEFAULT_MAX_DRAWDOWN_PCT};
pub use records::{ClosingSummary, PositionSnapshot};

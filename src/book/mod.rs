//! Order book snapshotting and ranking
//!
//! Pure, stateless transforms over point-in-time snapshots: sorting,
//! cumulative base-volume views, z-score anomaly ranking and price-impact
//! lookups. Exchange connectivity delivers the snapshots; persistence
//! collaborators consume the exported records.

pub mod analyzer;
pub mod types;

pub use analyzer::{
    factor_after_volume, price_after_volume, rank_top_anomalies, ranked_records, sort_side,
    to_ranked_view, volume_above_factor,
};
pub use types::{OrderBookSnapshot, OrderLevel, RankedLevel, RankedLevelRecord, Side};

//! Order book transformation and statistical ranking
//!
//! Turns a raw snapshot into sorted, cumulative, z-scored views of one side
//! of the book. The central query pattern is price impact: "how far would a
//! market order of notional size V move the price, and what price would it
//! fill at". `price_after_volume` and `factor_after_volume` are two views
//! over the same cumulative-sum lookup so their results cannot diverge.
//!
//! All transforms are pure functions over an explicit snapshot argument;
//! there is no cached state, so parallel invocations across symbols need no
//! locking.

use statrs::statistics::Statistics;

use crate::book::types::{OrderBookSnapshot, OrderLevel, RankedLevel, RankedLevelRecord, Side};
use crate::error::AnalyzerError;

/// Sort one side of the book by price
///
/// Asks sort ascending (cheapest first), bids descending (highest first).
/// Equal prices keep their input order (stable sort, no tie-break field).
pub fn sort_side(snapshot: &OrderBookSnapshot, side: Side) -> Vec<OrderLevel> {
    let mut levels = snapshot.side(side).to_vec();
    match side {
        Side::Asks => levels.sort_by(|a, b| a.price.total_cmp(&b.price)),
        Side::Bids => levels.sort_by(|a, b| b.price.total_cmp(&a.price)),
    }
    levels
}

/// Annotate one sorted side with factor, base volume, cumulative base volume
/// and base-volume z-score
///
/// The cumulative sum runs from the best price outward. The z-score is NaN
/// for every level when the side has fewer than 2 levels or zero variance.
fn ranked_side(snapshot: &OrderBookSnapshot, side: Side) -> Vec<RankedLevel> {
    let sorted = sort_side(snapshot, side);

    let base_volumes: Vec<f64> = sorted
        .iter()
        .map(|level| level.quantity * snapshot.last_price)
        .collect();

    // Sample standard deviation, matching the ranking the sampler stores.
    // statrs yields NaN for a single observation, which is exactly the
    // "undefined statistic" marker the callers expect.
    let mean = base_volumes.iter().mean();
    let std_dev = base_volumes.iter().std_dev();

    let mut cumulative = 0.0;
    sorted
        .iter()
        .zip(base_volumes.iter())
        .map(|(level, &base_volume)| {
            cumulative += base_volume;
            let volume_z_score = if std_dev.is_finite() && std_dev > 0.0 {
                (base_volume - mean) / std_dev
            } else {
                f64::NAN
            };
            RankedLevel {
                side,
                price: level.price,
                quantity: level.quantity,
                factor: level.price / snapshot.last_price,
                base_volume,
                cumulative_base_volume: cumulative,
                volume_z_score,
            }
        })
        .collect()
}

/// Ranked view of one side, or of both sides concatenated bids-then-asks
///
/// The cumulative base volume restarts independently per side.
pub fn to_ranked_view(snapshot: &OrderBookSnapshot, side: Option<Side>) -> Vec<RankedLevel> {
    match side {
        Some(side) => ranked_side(snapshot, side),
        None => {
            let mut view = ranked_side(snapshot, Side::Bids);
            view.extend(ranked_side(snapshot, Side::Asks));
            view
        }
    }
}

/// The `top_n` levels with the highest base-volume z-score, descending
///
/// Ties (including NaN scores on zero-variance books) keep the sorted book
/// order. Returns an empty vector when the side has fewer than 2 levels,
/// since the z-score is undefined there.
pub fn rank_top_anomalies(
    snapshot: &OrderBookSnapshot,
    side: Side,
    top_n: usize,
) -> Vec<RankedLevel> {
    if snapshot.side(side).len() < 2 {
        return Vec::new();
    }

    let mut ranked = ranked_side(snapshot, side);
    ranked.sort_by(|a, b| {
        // NaN sorts last so defined scores always outrank undefined ones
        let ka = finite_or_lowest(a.volume_z_score);
        let kb = finite_or_lowest(b.volume_z_score);
        kb.total_cmp(&ka)
    });
    ranked.truncate(top_n);
    ranked
}

fn finite_or_lowest(value: f64) -> f64 {
    if value.is_nan() {
        f64::NEG_INFINITY
    } else {
        value
    }
}

/// Sum of quantities (base units, not notional) of levels priced above
/// `last_price x factor`
///
/// Returns 0 when no level clears the threshold.
pub fn volume_above_factor(snapshot: &OrderBookSnapshot, side: Side, factor: f64) -> f64 {
    let threshold = snapshot.last_price * factor;
    snapshot
        .side(side)
        .iter()
        .filter(|level| level.price > threshold)
        .map(|level| level.quantity)
        .sum()
}

/// Shared cumulative-sum lookup backing the price-impact queries
///
/// Finds the last level, in sorted order, whose cumulative base volume does
/// not exceed `target_base_volume`. A target below the first level's volume
/// (including zero) resolves to the best price. A target beyond total book
/// depth is `DepthExceeded`, signaled distinctly from an empty book.
fn level_at_volume(
    snapshot: &OrderBookSnapshot,
    side: Side,
    target_base_volume: f64,
) -> Result<RankedLevel, AnalyzerError> {
    let ranked = ranked_side(snapshot, side);
    let last = ranked
        .last()
        .ok_or(AnalyzerError::InvalidSnapshot { side: side.as_str() })?;

    if target_base_volume > last.cumulative_base_volume {
        return Err(AnalyzerError::DepthExceeded {
            side: side.as_str(),
            requested: target_base_volume,
            available: last.cumulative_base_volume,
        });
    }

    Ok(*ranked
        .iter()
        .rev()
        .find(|level| level.cumulative_base_volume <= target_base_volume)
        .unwrap_or(&ranked[0]))
}

/// Execution price of a market order of the given notional size against
/// this side
pub fn price_after_volume(
    snapshot: &OrderBookSnapshot,
    side: Side,
    target_base_volume: f64,
) -> Result<f64, AnalyzerError> {
    level_at_volume(snapshot, side, target_base_volume).map(|level| level.price)
}

/// Same cumulative lookup as [`price_after_volume`], expressed as a factor
/// of the reference price
pub fn factor_after_volume(
    snapshot: &OrderBookSnapshot,
    side: Side,
    target_base_volume: f64,
) -> Result<f64, AnalyzerError> {
    level_at_volume(snapshot, side, target_base_volume).map(|level| level.factor)
}

/// Ranked-level rows for tabular storage or charting
pub fn ranked_records(snapshot: &OrderBookSnapshot, side: Option<Side>) -> Vec<RankedLevelRecord> {
    to_ranked_view(snapshot, side)
        .iter()
        .map(|level| RankedLevelRecord::new(snapshot, level))
        .collect()
}

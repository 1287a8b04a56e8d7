//! Candidate resolution: pick one winning timestamp.
//!
//! Ranking, highest first:
//! 1. confidence of the source kind (meta > structured > pdf > text)
//! 2. later `resolved_at` (the most recent repost wins)
//! 3. lower `pattern_rank` (earlier meta key, alias, or text pattern)
//! 4. lexicographically smaller label, then raw value, then location
//!
//! The full ordering makes the winner independent of candidate order.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use postdate_shared::{NormalizedCandidate, ResolvedDate};

/// Resolve the winning candidate, or `None` when there is nothing to pick.
pub fn resolve(
    candidates: &[NormalizedCandidate],
    analysis_time: DateTime<Utc>,
) -> Option<ResolvedDate> {
    let winner = candidates.iter().max_by(|a, b| rank(a, b))?;
    let (elapsed_days, future_suspect) = elapsed_days(winner.resolved_at, analysis_time);

    Some(ResolvedDate {
        timestamp: winner.resolved_at,
        source_kind: winner.source_kind,
        source_label: winner.source_label.clone(),
        raw_value: winner.raw_value.clone(),
        elapsed_days,
        future_suspect,
    })
}

/// Whole days from `timestamp` to `analysis_time`, clamped at zero.
///
/// The flag is set when `timestamp` lies after `analysis_time`.
pub fn elapsed_days(timestamp: DateTime<Utc>, analysis_time: DateTime<Utc>) -> (u64, bool) {
    let days = (analysis_time - timestamp).num_days();
    (days.max(0) as u64, timestamp > analysis_time)
}

/// `Greater` means `a` outranks `b`.
fn rank(a: &NormalizedCandidate, b: &NormalizedCandidate) -> Ordering {
    a.confidence
        .cmp(&b.confidence)
        .then_with(|| a.resolved_at.cmp(&b.resolved_at))
        .then_with(|| b.pattern_rank.cmp(&a.pattern_rank))
        .then_with(|| b.source_label.cmp(&a.source_label))
        .then_with(|| b.raw_value.cmp(&a.raw_value))
        .then_with(|| b.location_hint.cmp(&a.location_hint))
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reduces the wheels drawn for one race state into per-item counts.

use std::borrow::Borrow;

use item_wheel_core::{ItemStats, ItemWheel};

/// Counts, for every item, the number of wheels that list it at least once.
///
/// Duplicates within a single wheel contribute once, so the count of an item
/// never exceeds the number of wheels supplied. Items that appear on no wheel
/// are absent from the result.
pub fn aggregate<I>(wheels: I) -> ItemStats
where
    I: IntoIterator,
    I::Item: Borrow<ItemWheel>,
{
    let mut stats = ItemStats::new();
    for wheel in wheels {
        for item in wheel.borrow().distinct() {
            stats.record(item);
        }
    }
    stats
}

/// Probability that `count` of `wheels_per_state` wheels offer an item.
#[must_use]
pub fn encounter_rate(count: u8, wheels_per_state: usize) -> f64 {
    if wheels_per_state == 0 {
        return 0.0;
    }
    f64::from(count) / wheels_per_state as f64
}

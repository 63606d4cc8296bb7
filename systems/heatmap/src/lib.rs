#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reshapes the statistics table into dense per-item probability grids.

use std::ops::Range;

use item_wheel_core::{GlobalStatsTable, ItemId, Layout, RaceProgress};
use item_wheel_system_aggregation::encounter_rate;

/// Dense probability grid for one item, rows by race position and columns
/// by half-lap progress.
#[derive(Clone, Debug, PartialEq)]
pub struct HeatmapGrid {
    item: ItemId,
    positions: Range<u8>,
    progress: Range<u8>,
    values: Vec<f64>,
}

impl HeatmapGrid {
    /// Item the grid describes.
    #[must_use]
    pub const fn item(&self) -> ItemId {
        self.item
    }

    /// Number of race position rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.positions.len()
    }

    /// Number of half-lap progress columns.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.progress.len()
    }

    /// Race position of the first row.
    #[must_use]
    pub fn first_position(&self) -> u8 {
        self.positions.start
    }

    /// Progress of the first column.
    #[must_use]
    pub fn first_progress(&self) -> RaceProgress {
        RaceProgress::from_half_laps(self.progress.start)
    }

    /// Probability at the given row and column, if inside the grid.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        if row >= self.rows() || column >= self.columns() {
            return None;
        }
        self.values.get(row * self.columns() + column).copied()
    }

    /// Iterates rows top to bottom.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.values.chunks(self.columns().max(1))
    }
}

/// Builds the grid for `item` over the given position and half-lap ranges.
///
/// Counts missing from `stats` read as zero. No applicability filtering is
/// performed here.
#[must_use]
pub fn build_grid(
    stats: &GlobalStatsTable,
    item: ItemId,
    positions: Range<u8>,
    progress: Range<u8>,
    wheels_per_state: usize,
) -> HeatmapGrid {
    let mut values = Vec::with_capacity(positions.len() * progress.len());
    for position in positions.clone() {
        for step in progress.clone() {
            let count = stats.count(RaceProgress::from_half_laps(step), position, item);
            values.push(encounter_rate(count, wheels_per_state));
        }
    }

    HeatmapGrid {
        item,
        positions,
        progress,
        values,
    }
}

/// Builds the grid covering the whole domain enumerated by `layout`.
#[must_use]
pub fn build_layout_grid(stats: &GlobalStatsTable, item: ItemId, layout: &Layout) -> HeatmapGrid {
    build_grid(
        stats,
        item,
        0..layout.position_count,
        0..layout.progress_steps(),
        layout.wheels_per_state,
    )
}

/// Discrete colour bucket used when presenting a grid value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProbabilityBucket {
    /// The item is never offered.
    Never,
    /// Roughly one wheel in three offers the item.
    Low,
    /// Roughly two wheels in three offer the item.
    High,
    /// Every wheel offers the item.
    Always,
}

impl ProbabilityBucket {
    /// All buckets from lowest to highest.
    pub const ALL: [Self; 4] = [Self::Never, Self::Low, Self::High, Self::Always];

    /// Splits `0.0..=1.0` into four equal bins.
    #[must_use]
    pub fn from_probability(value: f64) -> Self {
        let clamped = value.clamp(0.0, 1.0);
        let bin = (clamped * 4.0).floor() as usize;
        Self::ALL[bin.min(3)]
    }

    /// Legend label of the bucket.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Never => "0%",
            Self::Low => "33.3%",
            Self::High => "66.6%",
            Self::Always => "100%",
        }
    }
}

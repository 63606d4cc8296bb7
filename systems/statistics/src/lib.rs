#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Statistics system that evaluates every reachable race state.
//!
//! Each state is resolved, its wheels fetched and aggregated, and the counts
//! written into a [`GlobalStatsTable`]. States are independent of each other,
//! so [`build_global_stats_parallel`] evaluates them on the rayon pool and
//! merges the results on the calling thread.

use item_wheel_core::{GlobalStatsTable, ItemStats, Layout, RaceState, WheelError};
use item_wheel_system_aggregation::aggregate;
use item_wheel_system_lookup::{fetch_wheels, resolve_state};
use item_wheel_tables::ItemTables;
use log::debug;
use rayon::prelude::*;

/// Counts the items offered to a player in `state`.
pub fn state_stats(
    tables: &ItemTables,
    layout: &Layout,
    state: RaceState,
) -> Result<ItemStats, WheelError> {
    let start_index = resolve_state(layout, state);
    let wheels = fetch_wheels(tables, layout, start_index)?;
    let stats = aggregate(wheels);
    debug!(
        "lap={} halfway={} position={} lookup_start={} items={}",
        state.lap_count(),
        state.halfway(),
        state.race_position(),
        start_index,
        stats.len()
    );
    Ok(stats)
}

/// Builds the statistics table over every state enumerated by `layout`.
///
/// Fails when the layout cannot be enumerated, or on the first state whose
/// wheels cannot be fetched.
pub fn build_global_stats(
    tables: &ItemTables,
    layout: &Layout,
) -> Result<GlobalStatsTable, WheelError> {
    layout.validate()?;
    let mut table = GlobalStatsTable::new();
    for state in layout.states() {
        let stats = state_stats(tables, layout, state)?;
        table.insert_state(state, &stats);
    }
    Ok(table)
}

/// Parallel counterpart of [`build_global_stats`] producing an identical table.
pub fn build_global_stats_parallel(
    tables: &ItemTables,
    layout: &Layout,
) -> Result<GlobalStatsTable, WheelError> {
    layout.validate()?;
    let states: Vec<RaceState> = layout.states().collect();
    let evaluated: Vec<(RaceState, ItemStats)> = states
        .par_iter()
        .map(|state| state_stats(tables, layout, *state).map(|stats| (*state, stats)))
        .collect::<Result<Vec<_>, WheelError>>()?;

    let mut table = GlobalStatsTable::new();
    for (state, stats) in &evaluated {
        table.insert_state(*state, stats);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::state_stats;
    use item_wheel_core::{ItemId, ItemWheel, Layout, RaceState, TableKind, WheelError};
    use item_wheel_tables::{ItemTables, RedirectTable, WheelTable};

    fn wheel(values: &[u8]) -> ItemWheel {
        values
            .iter()
            .map(|value| ItemId::new(*value).expect("valid item"))
            .collect()
    }

    #[test]
    fn first_state_reads_first_three_redirects() {
        let tables = ItemTables::new(
            WheelTable::new(vec![wheel(&[0x00, 0x01]), wheel(&[0x01, 0x02])]),
            RedirectTable::new(vec![0, 1, 0]),
        );

        let stats = state_stats(&tables, &Layout::default(), RaceState::unchecked(0, false, 0))
            .expect("in range");

        let counts: Vec<(u8, u8)> = stats.iter().map(|(item, count)| (item.get(), count)).collect();
        assert_eq!(counts, vec![(0x00, 2), (0x01, 2), (0x02, 1)]);
    }

    #[test]
    fn out_of_domain_state_fails() {
        let tables = ItemTables::new(
            WheelTable::new(vec![wheel(&[0x00])]),
            RedirectTable::new(vec![0; 3]),
        );

        assert!(matches!(
            state_stats(&tables, &Layout::default(), RaceState::unchecked(0, false, 1)),
            Err(WheelError::IndexOutOfRange {
                table: TableKind::Redirect,
                index: 3,
                ..
            })
        ));
    }
}

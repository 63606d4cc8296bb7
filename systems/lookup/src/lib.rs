#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure lookup system that maps race states onto the dumped item wheels.
//!
//! Resolution mirrors the game's own pointer arithmetic:
//!
//! ```text
//! lookup = ((lap * 2) + halfway) * stride + position * wheels_per_state
//! ```
//!
//! The resulting lookup index selects `wheels_per_state` consecutive redirect
//! entries, each of which names the wheel drawn for that slot.

use item_wheel_core::{ItemWheel, Layout, RaceState, WheelError};
use item_wheel_tables::{query, ItemTables};

/// Computes the first redirect entry used for a race state.
///
/// Inputs are taken as supplied and are not range checked; an index outside
/// the redirect table is reported by [`fetch_wheels`].
#[must_use]
pub fn resolve_start_index(
    layout: &Layout,
    lap_count: u8,
    halfway: bool,
    race_position: u8,
) -> usize {
    let block = usize::from(lap_count) * 2 + usize::from(halfway);
    block * layout.stride as usize + usize::from(race_position) * layout.wheels_per_state
}

/// Resolves the start index of an already constructed [`RaceState`].
#[must_use]
pub fn resolve_state(layout: &Layout, state: RaceState) -> usize {
    resolve_start_index(
        layout,
        state.lap_count(),
        state.halfway(),
        state.race_position(),
    )
}

/// Fetches the wheels drawn from `start_index` onwards.
///
/// Always yields exactly `layout.wheels_per_state` wheels, or fails with
/// [`WheelError::IndexOutOfRange`] when either table is too short.
pub fn fetch_wheels<'t>(
    tables: &'t ItemTables,
    layout: &Layout,
    start_index: usize,
) -> Result<Vec<&'t ItemWheel>, WheelError> {
    (0..layout.wheels_per_state)
        .map(|offset| {
            let lookup_index = start_index + offset;
            let wheel_offset = query::wheel_offset(tables, lookup_index)?;
            query::wheel(tables, wheel_offset)
        })
        .collect()
}

/// Location of one drawn wheel inside the dump, for diagnostic output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WheelSlot<'t> {
    /// Index into the redirect table.
    pub lookup_index: usize,
    /// Index into the wheel table read from the redirect entry.
    pub wheel_offset: usize,
    /// Memory address of the wheel definition.
    pub address: u64,
    /// Wheel definition.
    pub wheel: &'t ItemWheel,
}

/// Same traversal as [`fetch_wheels`], keeping the indices and addresses.
pub fn trace_wheels<'t>(
    tables: &'t ItemTables,
    layout: &Layout,
    start_index: usize,
) -> Result<Vec<WheelSlot<'t>>, WheelError> {
    (0..layout.wheels_per_state)
        .map(|offset| {
            let lookup_index = start_index + offset;
            let wheel_offset = query::wheel_offset(tables, lookup_index)?;
            let wheel = query::wheel(tables, wheel_offset)?;
            Ok(WheelSlot {
                lookup_index,
                wheel_offset,
                address: layout.wheel_address(wheel_offset),
                wheel,
            })
        })
        .collect()
}

//! Console formatting of per-state lookups.

use std::fmt;

use item_wheel_core::{ItemId, ItemStats, RaceState};
use item_wheel_system_aggregation::encounter_rate;
use item_wheel_system_lookup::WheelSlot;

const SECTION_RULE: &str =
    "--------------------------------------------------------------------------------";
const BLOCK_RULE: &str = "-----------------------";
const ROW_RULE: &str = "+-----------------------+----------+";
const TABLE_FOOTER: &str = "+----------------------------------+";

/// Everything printed for one race state.
#[derive(Clone, Debug)]
pub struct StateReport<'t> {
    state: RaceState,
    start_index: usize,
    slots: Vec<WheelSlot<'t>>,
    stats: ItemStats,
    wheels_per_state: usize,
    show_wheels: bool,
}

impl<'t> StateReport<'t> {
    /// Bundles the resolved lookup of `state` for printing.
    #[must_use]
    pub fn new(
        state: RaceState,
        start_index: usize,
        slots: Vec<WheelSlot<'t>>,
        stats: ItemStats,
        wheels_per_state: usize,
    ) -> Self {
        Self {
            state,
            start_index,
            slots,
            stats,
            wheels_per_state,
            show_wheels: true,
        }
    }

    /// Omits the per-wheel diagnostics.
    #[must_use]
    pub fn without_wheels(mut self) -> Self {
        self.show_wheels = false;
        self
    }
}

impl fmt::Display for StateReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n\n{SECTION_RULE}")?;
        writeln!(f, "Lap:       {}", u16::from(self.state.lap_count()) + 1)?;
        writeln!(f, "Halfway:   {}", self.state.halfway())?;
        writeln!(f, "Position:  {}", self.state.race_position())?;
        writeln!(f, "{BLOCK_RULE}\n")?;
        writeln!(f, "lookup start index: {}", self.start_index)?;

        if self.show_wheels {
            for slot in &self.slots {
                write_slot(f, slot)?;
            }
        }

        for row in percentage_rows(&self.stats, self.wheels_per_state) {
            writeln!(f, "{ROW_RULE}")?;
            writeln!(f, "{row}")?;
        }
        writeln!(f, "{TABLE_FOOTER}")?;
        writeln!(f, "{SECTION_RULE}")
    }
}

fn write_slot(f: &mut fmt::Formatter<'_>, slot: &WheelSlot<'_>) -> fmt::Result {
    writeln!(f, "{BLOCK_RULE}")?;
    writeln!(f, "lookupIdx:   {}", slot.lookup_index)?;
    writeln!(f, "wheelOffset: {}", slot.wheel_offset)?;
    writeln!(f, "StartAddr:   {:#x}", slot.address)?;
    writeln!(f, "{BLOCK_RULE}")?;
    writeln!(f, "Wheel: {}", slot.wheel)?;
    for item in slot.wheel.items() {
        writeln!(f, "    {}", item.name())?;
    }
    writeln!(f)
}

/// Encounter percentage rows for every applicable item, sorted by text.
///
/// Items absent from `stats` are listed at `0.00 %`.
#[must_use]
pub fn percentage_rows(stats: &ItemStats, wheels_per_state: usize) -> Vec<String> {
    let mut rows: Vec<String> = ItemId::applicable()
        .map(|item| {
            let percent = encounter_rate(stats.count(item), wheels_per_state) * 100.0;
            format!("| {:<21} | {:>6} % |", item.name(), format!("{percent:.2}"))
        })
        .collect();
    rows.sort();
    rows
}

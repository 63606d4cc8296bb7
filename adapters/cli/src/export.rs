use item_wheel_core::{GlobalStatsTable, Layout, StatsRecord};
use serde::{Deserialize, Serialize};

/// JSON document written by the `export` command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct StatsExport {
    /// Layout the table was built with.
    pub(crate) layout: Layout,
    /// Non-zero counts in (progress, position, item) order.
    pub(crate) records: Vec<StatsRecord>,
}

impl StatsExport {
    /// Captures the table together with the layout that produced it.
    #[must_use]
    pub(crate) fn new(layout: Layout, table: &GlobalStatsTable) -> Self {
        Self {
            layout,
            records: table.records(),
        }
    }

    /// Pretty printed JSON encoding.
    pub(crate) fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the item wheel analysis engine.
//!
//! This crate defines the vocabulary that connects the dump adapters, the
//! immutable lookup tables, and the pure systems. Adapters parse the dumped
//! tables into [`ItemWheel`] values and redirect indices, systems resolve a
//! [`RaceState`] into wheels and reduce them into [`ItemStats`], and the
//! statistics builder folds every state into a [`GlobalStatsTable`] that
//! reporting and rendering adapters consume read-only.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of lookup entries between consecutive (lap, halfway) blocks.
pub const STRIDE: u32 = 0x1e;
/// Number of wheels drawn for a single race state.
pub const WHEELS_PER_STATE: usize = 3;
/// Number of laps covered by the dumped layout.
pub const LAP_COUNT: u8 = 3;
/// Number of race positions covered by the dumped layout.
pub const POSITION_COUNT: u8 = 10;
/// Address of the redirect table in the dumped memory image.
pub const REDIRECT_BASE_ADDRESS: u32 = 0x800e_4498;
/// Address of the first wheel definition in the dumped memory image.
pub const WHEEL_BASE_ADDRESS: u32 = 0x8008_d0c0;
/// Size in bytes of a single wheel definition in the dumped memory image.
pub const WHEEL_ENTRY_SIZE: u32 = 8;
/// Largest lap count whose half-lap progress still fits in a `u8`.
pub const MAX_LAP_COUNT: u8 = u8::MAX / 2;

/// Whether a catalog entry can be encountered during a normal race.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Applicability {
    /// The item can be drawn in normal play and is reported.
    NormalPlay,
    /// The item only exists in two player mode and is excluded from reports.
    TwoPlayerOnly,
}

struct CatalogEntry {
    name: &'static str,
    applicability: Applicability,
}

const fn normal(name: &'static str) -> CatalogEntry {
    CatalogEntry {
        name,
        applicability: Applicability::NormalPlay,
    }
}

const fn two_player(name: &'static str) -> CatalogEntry {
    CatalogEntry {
        name,
        applicability: Applicability::TwoPlayerOnly,
    }
}

const CATALOG: [CatalogEntry; 0x12] = [
    normal("Bomb"),
    normal("Fireball"),
    normal("Missile"),
    normal("Turbo"),
    normal("Jump"),
    normal("Crazy Mushroom"),
    normal("Stealth Field"),
    normal("Big, Bigger, Biggest!"),
    normal("Tiny, Tiny, Tiny!"),
    normal("Oil Slick"),
    normal("Pandora's Box"),
    normal("Dynamite"),
    normal("Super Shield"),
    two_player("2 Player Only (0x0D)"),
    normal("Wonder Clock"),
    normal("32t Weight"),
    normal("Power Up"),
    two_player("2 Player Only (0x11)"),
];

/// Identifier of a power-up item as stored in the wheel dump.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct ItemId(u8);

impl ItemId {
    /// Smallest identifier defined by the catalog.
    pub const MIN: Self = Self(0x00);
    /// Largest identifier defined by the catalog.
    pub const MAX: Self = Self(0x11);

    /// Validates a raw identifier against the catalog range.
    pub fn new(value: u8) -> Result<Self, WheelError> {
        if value > Self::MAX.0 {
            return Err(WheelError::MalformedItemId {
                value: format!("{value:#04x}"),
            });
        }
        Ok(Self(value))
    }

    /// Parses a hex encoded identifier such as `0A` or `0x0a`.
    pub fn from_hex(text: &str) -> Result<Self, WheelError> {
        let trimmed = text.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let malformed = || WheelError::MalformedItemId {
            value: trimmed.to_owned(),
        };
        if digits.is_empty() {
            return Err(malformed());
        }
        let value = u8::from_str_radix(digits, 16).map_err(|_| malformed())?;
        Self::new(value).map_err(|_| malformed())
    }

    /// Retrieves the raw identifier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Display name of the item.
    #[must_use]
    pub fn name(&self) -> &'static str {
        CATALOG[usize::from(self.0)].name
    }

    /// Whether the item can appear in normal play.
    #[must_use]
    pub fn applicability(&self) -> Applicability {
        CATALOG[usize::from(self.0)].applicability
    }

    /// Convenience check for [`Applicability::NormalPlay`].
    #[must_use]
    pub fn is_applicable(&self) -> bool {
        self.applicability() == Applicability::NormalPlay
    }

    /// Iterates every catalog entry in identifier order.
    pub fn all() -> impl Iterator<Item = ItemId> {
        (Self::MIN.0..=Self::MAX.0).map(Self)
    }

    /// Iterates the catalog entries that appear in normal play.
    pub fn applicable() -> impl Iterator<Item = ItemId> {
        Self::all().filter(ItemId::is_applicable)
    }
}

impl TryFrom<u8> for ItemId {
    type Error = WheelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ItemId> for u8 {
    fn from(item: ItemId) -> Self {
        item.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}", self.0)
    }
}

/// One spin wheel: the ordered outcomes a single virtual slot can produce.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemWheel {
    items: Vec<ItemId>,
}

impl ItemWheel {
    /// Creates a wheel from its dumped entries.
    #[must_use]
    pub fn new(items: Vec<ItemId>) -> Self {
        Self { items }
    }

    /// Entries in dump order, duplicates included.
    #[must_use]
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Distinct items present on the wheel.
    #[must_use]
    pub fn distinct(&self) -> BTreeSet<ItemId> {
        self.items.iter().copied().collect()
    }
}

impl FromIterator<ItemId> for ItemWheel {
    fn from_iter<I: IntoIterator<Item = ItemId>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for ItemWheel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, item) in self.items.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{item}'")?;
        }
        f.write_str("]")
    }
}

/// Race progress measured in half laps.
///
/// Stored as an integer so it can key the statistics table exactly; a lap
/// count of `n` maps to `2n` and passing the halfway marker adds one.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RaceProgress(u8);

impl RaceProgress {
    /// Combines a zero-based lap count with the halfway flag.
    ///
    /// `lap_count` must be below [`MAX_LAP_COUNT`].
    #[must_use]
    pub const fn new(lap_count: u8, halfway: bool) -> Self {
        Self(lap_count * 2 + halfway as u8)
    }

    /// Wraps a raw half-lap step, as used for heatmap columns.
    #[must_use]
    pub const fn from_half_laps(half_laps: u8) -> Self {
        Self(half_laps)
    }

    /// Number of completed half laps.
    #[must_use]
    pub const fn half_laps(&self) -> u8 {
        self.0
    }

    /// Progress expressed in laps, e.g. `1.5` halfway through the second lap.
    #[must_use]
    pub fn as_laps(&self) -> f32 {
        f32::from(self.0) / 2.0
    }
}

impl fmt::Display for RaceProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.as_laps())
    }
}

/// A player's position in the race used to pick item wheels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RaceState {
    lap_count: u8,
    halfway: bool,
    race_position: u8,
}

impl RaceState {
    /// Creates a state after checking it against the layout's domain.
    ///
    /// `lap_count` is zero-based. `race_position` is the raw position value
    /// of the dumped layout and must be below [`Layout::position_count`].
    pub fn new(
        lap_count: u8,
        halfway: bool,
        race_position: u8,
        layout: &Layout,
    ) -> Result<Self, WheelError> {
        let laps = layout.lap_count.min(MAX_LAP_COUNT);
        if lap_count >= laps || race_position >= layout.position_count {
            return Err(WheelError::InvalidRaceState {
                lap_count,
                race_position,
            });
        }
        Ok(Self::unchecked(lap_count, halfway, race_position))
    }

    /// Creates a state without validating it.
    #[must_use]
    pub const fn unchecked(lap_count: u8, halfway: bool, race_position: u8) -> Self {
        Self {
            lap_count,
            halfway,
            race_position,
        }
    }

    /// Zero-based lap count.
    #[must_use]
    pub const fn lap_count(&self) -> u8 {
        self.lap_count
    }

    /// Whether the halfway marker of the current lap has been passed.
    #[must_use]
    pub const fn halfway(&self) -> bool {
        self.halfway
    }

    /// Raw race position.
    #[must_use]
    pub const fn race_position(&self) -> u8 {
        self.race_position
    }

    /// Progress axis value for the statistics table.
    #[must_use]
    pub const fn progress(&self) -> RaceProgress {
        RaceProgress::new(self.lap_count, self.halfway)
    }
}

/// Fixed constants describing the dumped memory layout.
///
/// None of these can be derived from the data; the defaults are the values
/// verified against the game's lookup code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Lookup entries per (lap, halfway) block.
    pub stride: u32,
    /// Wheels drawn per race state.
    pub wheels_per_state: usize,
    /// Laps enumerated by the statistics builder.
    pub lap_count: u8,
    /// Race positions enumerated by the statistics builder.
    pub position_count: u8,
    /// Memory address of the redirect table, for diagnostics only.
    pub redirect_base_address: u32,
    /// Memory address of the wheel table, for diagnostics only.
    pub wheel_base_address: u32,
    /// Size of one wheel definition in bytes, for diagnostics only.
    pub wheel_entry_size: u32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            stride: STRIDE,
            wheels_per_state: WHEELS_PER_STATE,
            lap_count: LAP_COUNT,
            position_count: POSITION_COUNT,
            redirect_base_address: REDIRECT_BASE_ADDRESS,
            wheel_base_address: WHEEL_BASE_ADDRESS,
            wheel_entry_size: WHEEL_ENTRY_SIZE,
        }
    }
}

impl Layout {
    /// Checks that the enumerated domain fits the `u8` progress and count
    /// types used by the statistics table.
    pub fn validate(&self) -> Result<(), WheelError> {
        check_range("lap_count", u64::from(self.lap_count), 1, u64::from(MAX_LAP_COUNT))?;
        check_range("position_count", u64::from(self.position_count), 1, u64::from(u8::MAX))?;
        check_range("wheels_per_state", self.wheels_per_state as u64, 1, u64::from(u8::MAX))
    }

    /// Number of half-lap columns covered by the enumeration.
    #[must_use]
    pub const fn progress_steps(&self) -> u8 {
        self.lap_count.saturating_mul(2)
    }

    /// Number of states enumerated by the statistics builder.
    #[must_use]
    pub const fn state_count(&self) -> usize {
        self.progress_steps() as usize * self.position_count as usize
    }

    /// Iterates every race state in lap, halfway, position order.
    pub fn states(&self) -> impl Iterator<Item = RaceState> {
        let positions = self.position_count;
        (0..self.lap_count).flat_map(move |lap| {
            [false, true].into_iter().flat_map(move |halfway| {
                (0..positions).map(move |position| RaceState::unchecked(lap, halfway, position))
            })
        })
    }

    /// Memory address of the wheel definition at `wheel_offset`.
    #[must_use]
    pub fn wheel_address(&self, wheel_offset: usize) -> u64 {
        u64::from(self.wheel_base_address)
            + wheel_offset as u64 * u64::from(self.wheel_entry_size)
    }

    /// Memory address of the redirect entry at `lookup_index`.
    #[must_use]
    pub fn redirect_address(&self, lookup_index: usize) -> u64 {
        u64::from(self.redirect_base_address) + lookup_index as u64
    }
}

fn check_range(field: &'static str, value: u64, min: u64, max: u64) -> Result<(), WheelError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(WheelError::InvalidLayout {
            field,
            value,
            min,
            max,
        })
    }
}

/// Per-item count of wheels that list the item at least once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStats {
    counts: BTreeMap<ItemId, u8>,
}

impl ItemStats {
    /// Creates an empty set of counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one more wheel containing `item`.
    pub fn record(&mut self, item: ItemId) {
        *self.counts.entry(item).or_insert(0) += 1;
    }

    /// Number of wheels containing `item`; zero when absent.
    #[must_use]
    pub fn count(&self, item: ItemId) -> u8 {
        self.counts.get(&item).copied().unwrap_or(0)
    }

    /// Iterates recorded items in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, u8)> + '_ {
        self.counts.iter().map(|(item, count)| (*item, *count))
    }

    /// Number of distinct items recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no item was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl FromIterator<(ItemId, u8)> for ItemStats {
    fn from_iter<I: IntoIterator<Item = (ItemId, u8)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

/// Key of a single cell in the [`GlobalStatsTable`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct StatsKey {
    /// Progress axis value.
    pub progress: RaceProgress,
    /// Race position axis value.
    pub race_position: u8,
    /// Item the count refers to.
    pub item: ItemId,
}

impl StatsKey {
    /// Creates a key from its components.
    #[must_use]
    pub const fn new(progress: RaceProgress, race_position: u8, item: ItemId) -> Self {
        Self {
            progress,
            race_position,
            item,
        }
    }
}

/// Flat, serialisable view of one statistics table entry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatsRecord {
    /// Progress in laps.
    pub progress: f32,
    /// Race position.
    pub position: u8,
    /// Raw item identifier.
    pub item: u8,
    /// Wheels containing the item.
    pub count: u8,
}

/// Wheel counts for every (progress, position, item) triple of the domain.
///
/// Items absent from every wheel of a state have no entry and read as zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GlobalStatsTable {
    entries: BTreeMap<StatsKey, u8>,
}

impl GlobalStatsTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the counts produced for one race state.
    ///
    /// Existing entries for the same key are overwritten, never accumulated.
    pub fn insert_state(&mut self, state: RaceState, stats: &ItemStats) {
        let progress = state.progress();
        for (item, count) in stats.iter() {
            let key = StatsKey::new(progress, state.race_position(), item);
            let _ = self.entries.insert(key, count);
        }
    }

    /// Count stored for the triple, if any.
    #[must_use]
    pub fn get(&self, key: &StatsKey) -> Option<u8> {
        self.entries.get(key).copied()
    }

    /// Count stored for the triple, defaulting to zero.
    #[must_use]
    pub fn count(&self, progress: RaceProgress, race_position: u8, item: ItemId) -> u8 {
        self.get(&StatsKey::new(progress, race_position, item))
            .unwrap_or(0)
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (StatsKey, u8)> + '_ {
        self.entries.iter().map(|(key, count)| (*key, *count))
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flattens the table into serialisable records in key order.
    #[must_use]
    pub fn records(&self) -> Vec<StatsRecord> {
        self.iter()
            .map(|(key, count)| StatsRecord {
                progress: key.progress.as_laps(),
                position: key.race_position,
                item: key.item.get(),
                count,
            })
            .collect()
    }
}

/// Table addressed by an out of range index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableKind {
    /// The lookup index to wheel offset indirection table.
    Redirect,
    /// The wheel definition table.
    Wheel,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redirect => f.write_str("redirect"),
            Self::Wheel => f.write_str("wheel"),
        }
    }
}

/// Failures raised while resolving race states against the dumped tables.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WheelError {
    /// An index exceeded the bounds of one of the tables.
    #[error("{table} index {index} is out of range for a table of {len} entries")]
    IndexOutOfRange {
        /// Table that was addressed.
        table: TableKind,
        /// Offending index.
        index: usize,
        /// Length of the addressed table.
        len: usize,
    },
    /// A wheel entry is not a catalog item identifier.
    #[error("'{value}' is not a valid item identifier")]
    MalformedItemId {
        /// Text of the offending entry.
        value: String,
    },
    /// The race state lies outside the enumerated domain.
    #[error("race state with lap {lap_count} and position {race_position} is outside the layout")]
    InvalidRaceState {
        /// Zero-based lap count supplied.
        lap_count: u8,
        /// Race position supplied.
        race_position: u8,
    },
    /// A layout constant lies outside the range the tables can represent.
    #[error("layout {field} = {value} is outside {min}..={max}")]
    InvalidLayout {
        /// Name of the offending field.
        field: &'static str,
        /// Value supplied.
        value: u64,
        /// Smallest accepted value.
        min: u64,
        /// Largest accepted value.
        max: u64,
    },
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Immutable lookup tables reconstructed from the item wheel dumps.
//!
//! The tables are loaded once by an adapter and never mutated afterwards.
//! Systems read them exclusively through the [`query`] module, which performs
//! bounds checking and reports [`WheelError::IndexOutOfRange`] instead of
//! clamping.

use item_wheel_core::{ItemWheel, TableKind, WheelError};

/// Wheel definitions indexed by wheel offset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WheelTable {
    wheels: Vec<ItemWheel>,
}

impl WheelTable {
    /// Creates a table from wheels in dump order.
    #[must_use]
    pub fn new(wheels: Vec<ItemWheel>) -> Self {
        Self { wheels }
    }

    /// Number of wheels in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.wheels.len()
    }

    /// Whether the table holds no wheels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wheels.is_empty()
    }

    /// Wheels in dump order.
    #[must_use]
    pub fn as_slice(&self) -> &[ItemWheel] {
        &self.wheels
    }
}

impl FromIterator<ItemWheel> for WheelTable {
    fn from_iter<I: IntoIterator<Item = ItemWheel>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Wheel offsets indexed by lookup index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RedirectTable {
    offsets: Vec<usize>,
}

impl RedirectTable {
    /// Creates a table from offsets in dump order.
    #[must_use]
    pub fn new(offsets: Vec<usize>) -> Self {
        Self { offsets }
    }

    /// Number of lookup entries in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether the table holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Offsets in dump order.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.offsets
    }
}

impl FromIterator<usize> for RedirectTable {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// The wheel and redirect tables of a single dump.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemTables {
    wheels: WheelTable,
    redirects: RedirectTable,
}

impl ItemTables {
    /// Pairs the two tables without validating them.
    ///
    /// Out of range redirects surface lazily through [`query`]; call
    /// [`ItemTables::validate`] to reject them up front.
    #[must_use]
    pub fn new(wheels: WheelTable, redirects: RedirectTable) -> Self {
        Self { wheels, redirects }
    }

    /// Wheel definitions.
    #[must_use]
    pub fn wheels(&self) -> &WheelTable {
        &self.wheels
    }

    /// Redirect entries.
    #[must_use]
    pub fn redirects(&self) -> &RedirectTable {
        &self.redirects
    }

    /// Checks that every redirect addresses an existing wheel.
    pub fn validate(&self) -> Result<(), WheelError> {
        let len = self.wheels.len();
        match self.redirects.offsets.iter().find(|offset| **offset >= len) {
            Some(&index) => Err(WheelError::IndexOutOfRange {
                table: TableKind::Wheel,
                index,
                len,
            }),
            None => Ok(()),
        }
    }
}

/// Bounds-checked read access to [`ItemTables`].
pub mod query {
    use item_wheel_core::{ItemWheel, TableKind, WheelError};

    use super::ItemTables;

    /// Reads the wheel offset stored at `lookup_index`.
    pub fn wheel_offset(tables: &ItemTables, lookup_index: usize) -> Result<usize, WheelError> {
        let offsets = tables.redirects.as_slice();
        offsets
            .get(lookup_index)
            .copied()
            .ok_or(WheelError::IndexOutOfRange {
                table: TableKind::Redirect,
                index: lookup_index,
                len: offsets.len(),
            })
    }

    /// Reads the wheel stored at `wheel_offset`.
    pub fn wheel(tables: &ItemTables, wheel_offset: usize) -> Result<&ItemWheel, WheelError> {
        let wheels = tables.wheels.as_slice();
        wheels.get(wheel_offset).ok_or(WheelError::IndexOutOfRange {
            table: TableKind::Wheel,
            index: wheel_offset,
            len: wheels.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{query, ItemTables, RedirectTable, WheelTable};
    use item_wheel_core::{ItemId, ItemWheel, TableKind, WheelError};

    fn wheel(values: &[u8]) -> ItemWheel {
        values
            .iter()
            .map(|value| ItemId::new(*value).expect("valid item"))
            .collect()
    }

    #[test]
    fn validate_rejects_dangling_redirect() {
        let tables = ItemTables::new(
            WheelTable::new(vec![wheel(&[0]), wheel(&[1])]),
            RedirectTable::new(vec![0, 1, 2]),
        );

        assert_eq!(
            tables.validate(),
            Err(WheelError::IndexOutOfRange {
                table: TableKind::Wheel,
                index: 2,
                len: 2,
            })
        );
    }

    #[test]
    fn validate_accepts_consistent_tables() {
        let tables = ItemTables::new(
            WheelTable::new(vec![wheel(&[0])]),
            RedirectTable::new(vec![0, 0]),
        );
        assert_eq!(tables.validate(), Ok(()));
        assert_eq!(tables.wheels().len(), 1);
        assert_eq!(tables.redirects().len(), 2);
    }

    #[test]
    fn query_reports_table_that_overflowed() {
        let tables = ItemTables::new(
            WheelTable::new(vec![wheel(&[4])]),
            RedirectTable::new(vec![0]),
        );

        assert_eq!(query::wheel_offset(&tables, 0), Ok(0));
        assert_eq!(query::wheel(&tables, 0), Ok(&wheel(&[4])));
        assert!(matches!(
            query::wheel_offset(&tables, 1),
            Err(WheelError::IndexOutOfRange {
                table: TableKind::Redirect,
                index: 1,
                len: 1,
            })
        ));
        assert!(matches!(
            query::wheel(&tables, 5),
            Err(WheelError::IndexOutOfRange {
                table: TableKind::Wheel,
                ..
            })
        ));
    }
}

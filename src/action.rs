//! The action lifecycle shared by columns, selections, and queries.
//!
//! Every node in the graph — a column, a selection, or a query — is an
//! [`Action`]: it may be varied immediately after construction, it is
//! initialized once per assigned partition, it is driven forward one entry at
//! a time, and it is finalized once the partition (or, for queries, the
//! slot's whole run — see [`crate::player`]) is done.

use crate::error::EngineResult;

/// Index of a worker slot. Slots are numbered `0..N` where `N` is the
/// configured thread count; a slot's lifetime is the whole run, spanning
/// every partition dispatched to it.
pub type Slot = usize;

/// A logical row index into the dataset's entry space.
pub type Entry = u64;

/// Lifecycle shared by column, selection, and query nodes.
///
/// Default no-op bodies mirror the spec's description of `execute` being a
/// no-op for selections (whose `passed`/`weight` are computed on demand) and
/// of most columns needing no partition-level setup beyond the per-entry
/// dirty-flag reset that [`crate::column::ColumnComputation`] handles itself.
pub trait Action: Send {
    /// Select the named variation for this (non-nominal) instance. Called
    /// immediately after construction for every variant in a [`crate::varied::Varied`]
    /// map; nominal instances never receive this call.
    fn vary(&mut self, _name: &str) {}

    /// Prepare for a new partition `[begin, end)` on the given slot.
    fn initialize(&mut self, _slot: Slot, _begin: Entry, _end: Entry) -> EngineResult<()> {
        Ok(())
    }

    /// Advance to entry `entry` within the current partition.
    fn execute(&mut self, _slot: Slot, _entry: Entry) -> EngineResult<()> {
        Ok(())
    }

    /// Tear down after the current partition (columns/selections) or after
    /// the slot's last partition (queries; see [`crate::player::Player`]).
    fn finalize(&mut self, _slot: Slot) -> EngineResult<()> {
        Ok(())
    }
}

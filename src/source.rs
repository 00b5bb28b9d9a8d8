//! The dataset source contract (§6 "Dataset source" / "Column reader").
//!
//! A [`DatasetSource`] is the engine's one external collaborator: it hands
//! out partitions of the logical entry space and, per slot, readers for
//! named fields. It is shared by every slot, so every method must be safe to
//! call concurrently from distinct slots (the contract in §5's
//! "Shared-resource policy").
//!
//! [`InMemorySource`] is a reference implementation used by tests and
//! examples; it carries no special status over a third-party source.

use crate::action::{Entry, Slot};
use crate::error::{EngineError, EngineResult};
use crate::value::Dynamic;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-field reader handed out by a [`DatasetSource`]. `value` must reflect
/// whatever entry the source's cursor for `slot` was last advanced to via
/// [`DatasetSource::execute`].
pub trait ColumnReader: Send + Sync {
    fn value(&self, slot: Slot, entry: Entry) -> EngineResult<Dynamic>;
}

/// External collaborator owning the dataset's rows and partitioning.
pub trait DatasetSource: Send + Sync {
    /// Prepare `n` independent per-slot cursors.
    fn parallelize(&self, n: usize) -> EngineResult<()>;

    /// Non-overlapping half-open entry ranges covering the logical entry
    /// space. Ordering is arbitrary but stable within one call.
    fn partition(&self) -> EngineResult<Vec<(Entry, Entry)>>;

    /// A typed reader for the named field, scoped to `slot`.
    fn read_column(&self, slot: Slot, name: &str) -> EngineResult<Arc<dyn ColumnReader>>;

    fn initialize(&self, slot: Slot, begin: Entry, end: Entry) -> EngineResult<()>;

    /// Advance the slot's cursor so that subsequent `ColumnReader::value`
    /// calls reflect `entry`.
    fn execute(&self, slot: Slot, entry: Entry) -> EngineResult<()>;

    fn finalize(&self, slot: Slot) -> EngineResult<()>;
}

/// An in-process, columnar reference dataset source over `Vec`s keyed by
/// field name. Each slot gets its own cursor (a plain `Cell<Entry>`-free
/// design: `execute` just records the current entry per slot, `value` reads
/// straight out of the shared column vectors by index — safe for concurrent
/// slots since reads never alias a write).
pub struct InMemorySource {
    len: usize,
    columns: HashMap<String, Arc<dyn IndexedColumn>>,
    target_partition_size: usize,
}

/// A column backing store indexable by entry, independent of value type.
trait IndexedColumn: Send + Sync {
    fn value(&self, entry: Entry) -> EngineResult<Dynamic>;
}

struct TypedColumn<V> {
    data: Vec<V>,
}

impl<V: Clone + Send + Sync + 'static> IndexedColumn for TypedColumn<V> {
    fn value(&self, entry: Entry) -> EngineResult<Dynamic> {
        self.data
            .get(entry as usize)
            .cloned()
            .map(Dynamic::new)
            .ok_or_else(|| EngineError::Source(format!("entry {entry} out of range")))
    }
}

struct InMemoryReader {
    column: Arc<dyn IndexedColumn>,
}

impl ColumnReader for InMemoryReader {
    fn value(&self, _slot: Slot, entry: Entry) -> EngineResult<Dynamic> {
        self.column.value(entry)
    }
}

impl InMemorySource {
    /// Start building a source with `len` rows, `target_partition_size`
    /// entries per partition (0 = one partition for the whole dataset).
    pub fn new(len: usize, target_partition_size: usize) -> Self {
        InMemorySource {
            len,
            columns: HashMap::new(),
            target_partition_size,
        }
    }

    /// Register a typed column. Panics if `data.len() != len` — this is a
    /// build-time contract violation, not a runtime error.
    pub fn with_column<V: Clone + Send + Sync + 'static>(
        mut self,
        name: impl Into<String>,
        data: Vec<V>,
    ) -> Self {
        assert_eq!(
            data.len(),
            self.len,
            "column length must match the source's declared row count"
        );
        self.columns
            .insert(name.into(), Arc::new(TypedColumn { data }));
        self
    }
}

impl DatasetSource for InMemorySource {
    fn parallelize(&self, _n: usize) -> EngineResult<()> {
        // Per-slot state here is just "which entry am I on", tracked by the
        // caller (Player) via the `entry` argument to `execute`/`value` — no
        // cursor object to allocate per slot.
        Ok(())
    }

    fn partition(&self) -> EngineResult<Vec<(Entry, Entry)>> {
        if self.len == 0 {
            return Ok(Vec::new());
        }
        let chunk = if self.target_partition_size == 0 {
            self.len
        } else {
            self.target_partition_size
        };
        let mut out = Vec::new();
        let mut begin = 0usize;
        while begin < self.len {
            let end = (begin + chunk).min(self.len);
            out.push((begin as Entry, end as Entry));
            begin = end;
        }
        Ok(out)
    }

    fn read_column(&self, _slot: Slot, name: &str) -> EngineResult<Arc<dyn ColumnReader>> {
        let column = self.columns.get(name).ok_or_else(|| EngineError::ColumnUnavailable {
            name: name.to_string(),
            reason: "no such field on this dataset source".to_string(),
        })?;
        Ok(Arc::new(InMemoryReader {
            column: Arc::clone(column),
        }))
    }

    fn initialize(&self, _slot: Slot, _begin: Entry, _end: Entry) -> EngineResult<()> {
        Ok(())
    }

    fn execute(&self, _slot: Slot, _entry: Entry) -> EngineResult<()> {
        Ok(())
    }

    fn finalize(&self, _slot: Slot) -> EngineResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_cover_the_whole_range_without_overlap() {
        let source = InMemorySource::new(1000, 250);
        let parts = source.partition().unwrap();
        assert_eq!(parts, vec![(0, 250), (250, 500), (500, 750), (750, 1000)]);
    }

    #[test]
    fn zero_rows_yields_zero_partitions() {
        let source = InMemorySource::new(0, 100);
        assert!(source.partition().unwrap().is_empty());
    }

    #[test]
    fn reads_back_registered_column_values() {
        let source = InMemorySource::new(3, 0).with_column("x", vec![10i64, 20, 30]);
        let reader = source.read_column(0, "x").unwrap();
        let v = reader.value(0, 1).unwrap();
        assert_eq!(v.downcast_ref::<i64>(), Some(&20));
    }

    #[test]
    fn missing_column_is_fail_fast() {
        let source = InMemorySource::new(3, 0);
        assert!(source.read_column(0, "nope").is_err());
    }
}

//! Per-slot player: one column computation, one selection cutflow, one
//! query experiment, driven entry-by-entry over whatever partitions the
//! processor dispatches to this slot.
//!
//! Columns and selections are stateless enough that `initialize`/`finalize`
//! run once per partition; queries, whose accumulators must persist across
//! every partition a slot processes before the final merge, are initialized
//! once before the slot's first partition and finalized once after its
//! last — see [`crate::processor::Processor`], which owns that boundary.

use crate::action::{Entry, Slot};
use crate::column::ColumnComputation;
use crate::error::EngineResult;
use crate::query::QueryExperiment;
use crate::selection::SelectionCutflow;
use crate::source::DatasetSource;
use std::sync::Arc;

pub struct Player {
    slot: Slot,
    source: Arc<dyn DatasetSource>,
    columns: ColumnComputation,
    selections: SelectionCutflow,
    queries: QueryExperiment,
    scale: f64,
}

impl Player {
    pub fn new(
        slot: Slot,
        source: Arc<dyn DatasetSource>,
        columns: ColumnComputation,
        selections: SelectionCutflow,
        queries: QueryExperiment,
        scale: f64,
    ) -> Self {
        Player {
            slot,
            source,
            columns,
            selections,
            queries,
            scale,
        }
    }

    pub fn initialize_queries(&mut self) -> EngineResult<()> {
        // Queries have no real partition boundaries of their own; `0, 0` is
        // a placeholder range, matching §4.5's "one init before the slot's
        // first partition" (queries don't read `begin`/`end`).
        self.queries.initialize_all(self.slot, 0, 0)
    }

    pub fn finalize_queries(&mut self) -> EngineResult<()> {
        self.queries.finalize_all(self.slot)
    }

    /// Run one partition `[begin, end)` to completion: source/column/
    /// selection initialize, the per-entry loop, then source/column/
    /// selection finalize.
    #[tracing::instrument(level = "debug", skip(self), fields(slot = self.slot, begin, end))]
    pub fn run_partition(&mut self, begin: Entry, end: Entry) -> EngineResult<()> {
        self.source.initialize(self.slot, begin, end)?;
        self.columns.initialize_all(self.slot, begin, end)?;
        self.selections.initialize_all(self.slot, begin, end)?;

        for entry in begin..end {
            self.source.execute(self.slot, entry)?;
            self.columns.execute_all(self.slot, entry)?;
            self.queries
                .execute_entry(&self.columns, &self.selections, self.slot, entry, self.scale)?;
        }

        self.selections.finalize_all(self.slot)?;
        self.columns.finalize_all(self.slot)?;
        self.source.finalize(self.slot)?;
        tracing::debug!(slot = self.slot, entries = end - begin, "partition complete");
        Ok(())
    }

    pub fn queries(&self) -> &QueryExperiment {
        &self.queries
    }

    pub fn into_queries(self) -> QueryExperiment {
        self.queries
    }
}

//! Dataset processor: dispatches partitions to *N* worker threads through a
//! shared queue, then merges each query's per-slot results on the joining
//! thread.
//!
//! Concurrency *N* is set via `multithread::enable(N)`/`disable()` on
//! [`crate::dataflow::Dataflow`]; `disable()` runs the whole analysis in the
//! caller's thread (`N = 1`, no spawn). The partition queue is a
//! `crossbeam_channel` MPMC channel: the main thread is the sole producer,
//! every worker thread is a consumer — matching the "mutex-protected,
//! single producer before dispatch, multiple consumers" resource policy.

use crate::action::{Entry, Slot};
use crate::column::ColumnComputation;
use crate::error::{EngineError, EngineResult};
use crate::player::Player;
use crate::query::{QueryExperiment, QueryId};
use crate::selection::SelectionCutflow;
use crate::source::DatasetSource;
use crate::value::Dynamic;
use std::sync::Arc;

/// A factory replayed once per slot to build that slot's independent copy
/// of the action graph — the mechanism behind "slot-local action graphs are
/// structurally identical and address-correspondent" (§4.5): every slot
/// calls the *same* ordered closures, so the Nth call always produces the
/// Nth node regardless of which slot is building.
pub type GraphFactory = Arc<
    dyn Fn(Slot) -> EngineResult<(ColumnComputation, SelectionCutflow, QueryExperiment)> + Send + Sync,
>;

pub struct Processor {
    threads: usize,
    global_scale: f64,
    head_limit: Option<u64>,
}

impl Processor {
    pub fn new(threads: usize, global_scale: f64, head_limit: Option<u64>) -> Self {
        Processor {
            threads: threads.max(1),
            global_scale,
            head_limit,
        }
    }

    /// Run the full analysis: gather partitions from `source`, cap them by
    /// `head_limit` if set, dispatch to `self.threads` slots, join, and
    /// merge every query's per-slot results.
    pub fn run(
        &self,
        source: Arc<dyn DatasetSource>,
        build: GraphFactory,
    ) -> EngineResult<Vec<(QueryId, Dynamic)>> {
        source.parallelize(self.threads)?;
        let mut partitions = source.partition()?;
        if let Some(limit) = self.head_limit {
            partitions = truncate_to_head(partitions, limit);
        }
        tracing::info!(
            threads = self.threads,
            partitions = partitions.len(),
            head_limit = ?self.head_limit,
            "starting run"
        );

        if partitions.is_empty() {
            // "no partitions" is a no-op run; queries still finalize with
            // their identity accumulators (§4.9).
            let (_, _, queries) = build(0)?;
            return Ok((0..queries.len())
                .map(|i| (QueryId(i), queries.result(QueryId(i))))
                .collect());
        }

        if self.threads == 1 {
            let (columns, selections, queries) = build(0)?;
            let mut player = Player::new(0, Arc::clone(&source), columns, selections, queries, self.global_scale);
            player.initialize_queries()?;
            for (begin, end) in partitions {
                player.run_partition(begin, end)?;
            }
            player.finalize_queries()?;
            let queries = player.into_queries();
            return Ok((0..queries.len())
                .map(|i| (QueryId(i), queries.result(QueryId(i))))
                .collect());
        }

        let (tx, rx) = crossbeam_channel::unbounded::<(Entry, Entry)>();
        for p in partitions {
            tx.send(p).expect("receivers outlive the sender");
        }
        drop(tx);

        let results: Vec<EngineResult<QueryExperiment>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..self.threads)
                .map(|slot| {
                    let rx = rx.clone();
                    let source = Arc::clone(&source);
                    let build = Arc::clone(&build);
                    let scale = self.global_scale;
                    scope.spawn(move || -> EngineResult<QueryExperiment> {
                        tracing::debug!(slot, "worker started");
                        let (columns, selections, queries) = build(slot)?;
                        let mut player = Player::new(slot, source, columns, selections, queries, scale);
                        player.initialize_queries()?;
                        while let Ok((begin, end)) = rx.recv() {
                            player.run_partition(begin, end)?;
                        }
                        player.finalize_queries()?;
                        tracing::debug!(slot, "worker finished");
                        Ok(player.into_queries())
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| match h.join() {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::error!("worker thread panicked");
                        Err(EngineError::WorkerPanic("slot thread panicked".to_string()))
                    }
                })
                .collect()
        });

        // Propagate the first error; per §7's failure policy, no partial
        // results are reported when any slot fails.
        let mut per_slot = Vec::with_capacity(results.len());
        for r in results {
            per_slot.push(r?);
        }

        let query_count = per_slot.first().map(QueryExperiment::len).unwrap_or(0);
        let mut merged = Vec::with_capacity(query_count);
        for i in 0..query_count {
            let id = QueryId(i);
            let slot_results: Vec<Dynamic> = per_slot.iter().map(|q| q.result(id)).collect();
            let reduced = per_slot[0].merge(id, slot_results)?;
            merged.push((id, reduced));
        }
        Ok(merged)
    }
}

/// Truncate a partition list so the total entry count across it equals
/// `limit`, splitting the partition that straddles the boundary (§4.6
/// step 3 / the `head` decision in the engine's design notes).
fn truncate_to_head(partitions: Vec<(Entry, Entry)>, limit: u64) -> Vec<(Entry, Entry)> {
    let mut out = Vec::new();
    let mut remaining = limit;
    for (begin, end) in partitions {
        if remaining == 0 {
            break;
        }
        let len = end - begin;
        if len <= remaining {
            out.push((begin, end));
            remaining -= len;
        } else {
            out.push((begin, begin + remaining));
            remaining = 0;
        }
    }
    out
}

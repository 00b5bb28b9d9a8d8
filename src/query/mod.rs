//! Query experiment: accumulators bound to a selection, optionally fed
//! column tuples on every passing entry.
//!
//! A query's lifecycle is split into two stages, mirroring the spec's
//! `make`/`book` split:
//!
//! - [`Booker`] is a pure configurator: constructor state plus zero or more
//!   registered fill-column tuples (`.fill(cols)`), collected before any
//!   selection is known.
//! - [`QueryExperiment::book`] instantiates the accumulator, binds it to a
//!   selection, and replays the registered fills onto it.
//!
//! Per-entry, `count`/`fill` run once per passing entry (see
//! [`QueryExperiment::execute_entry`]); `result`/`merge` happen after a
//! slot's last partition, in [`crate::processor`].

use crate::action::Action;
use crate::column::{ColumnComputation, ColumnId};
use crate::error::{EngineError, EngineResult};
use crate::selection::{SelectionCutflow, SelectionId};
use crate::value::Dynamic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryId(pub(crate) usize);

/// An accumulator a query node wraps. `Result` is whatever per-slot summary
/// the accumulator produces; `merge` reduces one result per slot into one
/// final result and must be associative and commutative (§6 "Query
/// implementation").
pub trait Accumulate: Action {
    type Result: Send + Sync + 'static;

    /// Invoked once per passing entry with `scale * selection.weight()`.
    fn count(&mut self, w: f64);

    /// Invoked once per passing entry per registered fill-tuple, for
    /// fillable queries. Default: not fillable.
    fn fill(&mut self, _values: &[Dynamic], _w: f64) -> EngineResult<()> {
        Ok(())
    }

    /// `Some(arity)` for fillable queries; `None` otherwise. Used to
    /// validate fill-tuple arity at `book` time.
    fn arity(&self) -> Option<usize> {
        None
    }

    fn result(&self) -> Self::Result;

    fn merge(results: Vec<Self::Result>) -> Self::Result;
}

/// A pure configurator: how to build one per-slot instance of `Q`, plus the
/// fill-column tuples registered before any selection is known. The factory
/// is `Arc`-shared (not boxed) so one `Booker` can be replayed once per slot
/// by [`crate::dataflow::Dataflow`] without rebuilding it from scratch.
pub struct Booker<Q> {
    factory: std::sync::Arc<dyn Fn() -> Q + Send + Sync>,
    fills: Vec<Vec<ColumnId>>,
}

impl<Q> Clone for Booker<Q> {
    fn clone(&self) -> Self {
        Booker {
            factory: std::sync::Arc::clone(&self.factory),
            fills: self.fills.clone(),
        }
    }
}

impl<Q: Accumulate> Booker<Q> {
    pub fn new(factory: impl Fn() -> Q + Send + Sync + 'static) -> Self {
        Booker {
            factory: std::sync::Arc::new(factory),
            fills: Vec::new(),
        }
    }

    /// Register one fill-column tuple, validated against `Q::arity()` only
    /// once a probe instance exists — we build one eagerly here since
    /// `Booker` carries no live `Q` yet.
    pub fn fill(mut self, name: &str, cols: Vec<ColumnId>) -> EngineResult<Self> {
        let probe = (self.factory)();
        if let Some(expected) = probe.arity() {
            if cols.len() != expected {
                return Err(EngineError::FillArityMismatch {
                    query: name.to_string(),
                    expected,
                    actual: cols.len(),
                });
            }
        }
        self.fills.push(cols);
        Ok(self)
    }
}

/// Object-safe facade over one concrete [`Accumulate`] instance, erasing its
/// `Result` type behind [`Dynamic`] so [`QueryExperiment`] can store
/// heterogeneous queries in one `Vec`.
trait QueryNodeDyn: Action {
    fn selection(&self) -> SelectionId;
    fn fill_tuples(&self) -> &[Vec<ColumnId>];
    fn count(&mut self, w: f64);
    fn fill(&mut self, values: &[Dynamic], w: f64) -> EngineResult<()>;
    fn result_dynamic(&self) -> Dynamic;
    fn merge_dynamic(&self, results: Vec<Dynamic>) -> EngineResult<Dynamic>;
}

struct QueryWrapper<Q: Accumulate> {
    inner: Q,
    selection: SelectionId,
    fills: Vec<Vec<ColumnId>>,
}

impl<Q: Accumulate> Action for QueryWrapper<Q> {
    fn vary(&mut self, name: &str) {
        self.inner.vary(name);
    }

    fn initialize(
        &mut self,
        slot: crate::action::Slot,
        begin: crate::action::Entry,
        end: crate::action::Entry,
    ) -> EngineResult<()> {
        self.inner.initialize(slot, begin, end)
    }

    fn execute(&mut self, slot: crate::action::Slot, entry: crate::action::Entry) -> EngineResult<()> {
        self.inner.execute(slot, entry)
    }

    fn finalize(&mut self, slot: crate::action::Slot) -> EngineResult<()> {
        self.inner.finalize(slot)
    }
}

impl<Q: Accumulate + 'static> QueryNodeDyn for QueryWrapper<Q> {
    fn selection(&self) -> SelectionId {
        self.selection
    }

    fn fill_tuples(&self) -> &[Vec<ColumnId>] {
        &self.fills
    }

    fn count(&mut self, w: f64) {
        self.inner.count(w);
    }

    fn fill(&mut self, values: &[Dynamic], w: f64) -> EngineResult<()> {
        self.inner.fill(values, w)
    }

    fn result_dynamic(&self) -> Dynamic {
        Dynamic::new(self.inner.result())
    }

    fn merge_dynamic(&self, results: Vec<Dynamic>) -> EngineResult<Dynamic> {
        let typed: Vec<Q::Result> = results
            .into_iter()
            .map(|d| {
                d.downcast_cloned::<Q::Result>().ok_or_else(|| EngineError::Evaluation {
                    column: "<query result>".to_string(),
                    entry: 0,
                    reason: "result type mismatch during merge".to_string(),
                })
            })
            .collect::<EngineResult<_>>()?;
        Ok(Dynamic::new(Q::merge(typed)))
    }
}

/// Owns every query node for one slot.
#[derive(Default)]
pub struct QueryExperiment {
    nodes: Vec<Box<dyn QueryNodeDyn>>,
}

impl QueryExperiment {
    pub fn new() -> Self {
        QueryExperiment { nodes: Vec::new() }
    }

    /// Instantiate `booker`'s accumulator, bind it to `selection`, and carry
    /// its registered fill-tuples forward for the entry loop.
    pub fn book<Q: Accumulate + 'static>(&mut self, booker: Booker<Q>, selection: SelectionId) -> QueryId {
        let inner = (booker.factory)();
        let wrapper = QueryWrapper {
            inner,
            selection,
            fills: booker.fills,
        };
        self.nodes.push(Box::new(wrapper));
        QueryId(self.nodes.len() - 1)
    }

    /// Run one entry across every booked query: if its selection passes,
    /// `count(scale * weight)`, then replay every registered fill-tuple.
    pub fn execute_entry(
        &mut self,
        columns: &ColumnComputation,
        selections: &SelectionCutflow,
        slot: crate::action::Slot,
        entry: crate::action::Entry,
        scale: f64,
    ) -> EngineResult<()> {
        for node in &mut self.nodes {
            let sel = node.selection();
            if !selections.passed(sel, columns, slot, entry)? {
                continue;
            }
            let w = scale * selections.weight(sel, columns, slot, entry)?;
            node.count(w);
            let tuples_len = node.fill_tuples().len();
            for i in 0..tuples_len {
                let cols = node.fill_tuples()[i].clone();
                let mut values = Vec::with_capacity(cols.len());
                for col in &cols {
                    values.push(columns.value(*col, slot, entry)?);
                }
                node.fill(&values, w)?;
            }
        }
        Ok(())
    }

    pub fn initialize_all(
        &mut self,
        slot: crate::action::Slot,
        begin: crate::action::Entry,
        end: crate::action::Entry,
    ) -> EngineResult<()> {
        for node in &mut self.nodes {
            node.initialize(slot, begin, end)?;
        }
        Ok(())
    }

    pub fn finalize_all(&mut self, slot: crate::action::Slot) -> EngineResult<()> {
        for node in &mut self.nodes {
            node.finalize(slot)?;
        }
        Ok(())
    }

    pub fn result(&self, id: QueryId) -> Dynamic {
        self.nodes[id.0].result_dynamic()
    }

    pub fn merge(&self, id: QueryId, results: Vec<Dynamic>) -> EngineResult<Dynamic> {
        self.nodes[id.0].merge_dynamic(results)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

//! The lazy dataflow front-end: the handles and builder methods a user
//! actually calls. Every builder method records one *build step* — a
//! closure replayed once per slot at analysis time — rather than mutating a
//! live graph, so the same ordered recipe produces structurally identical,
//! address-correspondent graphs in every slot (§4.5).
//!
//! Triggering analysis ([`Dataflow::analyze`]) is idempotent: once run, the
//! cached per-query results are reused until a new column/selection/query is
//! recorded, which marks the cache dirty again.

use crate::action::Slot;
use crate::column::{ColumnComputation, ColumnId};
use crate::error::{EngineError, EngineResult};
use crate::processor::{GraphFactory, Processor};
use crate::query::{Accumulate, Booker, QueryExperiment, QueryId};
use crate::selection::{SelectionCutflow, SelectionId};
use crate::source::DatasetSource;
use crate::value::Dynamic;
use crate::varied::Varied;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;

type BuildStep = Arc<
    dyn Fn(Slot, &mut ColumnComputation, &mut SelectionCutflow, &mut QueryExperiment) -> EngineResult<()>
        + Send
        + Sync,
>;

/// A typed handle into every slot's copy of one column node.
pub struct LazyColumn<V> {
    id: ColumnId,
    _marker: PhantomData<fn() -> V>,
}

impl<V> Clone for LazyColumn<V> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<V> Copy for LazyColumn<V> {}

impl<V> LazyColumn<V> {
    fn new(id: ColumnId) -> Self {
        LazyColumn {
            id,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> ColumnId {
        self.id
    }
}

/// A typed handle into every slot's copy of one selection node.
#[derive(Clone, Copy)]
pub struct LazySelection {
    id: SelectionId,
}

impl LazySelection {
    fn new(id: SelectionId) -> Self {
        LazySelection { id }
    }

    pub fn id(&self) -> SelectionId {
        self.id
    }
}

/// A typed handle into every slot's copy of one query node.
pub struct LazyQuery<Q> {
    id: QueryId,
    _marker: PhantomData<fn() -> Q>,
}

impl<Q> Clone for LazyQuery<Q> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<Q> Copy for LazyQuery<Q> {}

impl<Q> LazyQuery<Q> {
    fn new(id: QueryId) -> Self {
        LazyQuery {
            id,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> QueryId {
        self.id
    }
}

/// The front-end a user builds an analysis against: load one dataset
/// source, declare columns/selections/queries, then demand results.
pub struct Dataflow {
    source: Option<Arc<dyn DatasetSource>>,
    threads: usize,
    head_limit: Option<u64>,
    global_weight: f64,
    seen_keywords: HashSet<&'static str>,
    steps: Vec<BuildStep>,
    next_column: usize,
    next_selection: usize,
    next_query: usize,
    cached: RefCell<Option<Vec<(QueryId, Dynamic)>>>,
    dirty: Cell<bool>,
}

impl Default for Dataflow {
    fn default() -> Self {
        Self::new()
    }
}

impl Dataflow {
    pub fn new() -> Self {
        Dataflow {
            source: None,
            threads: 1,
            head_limit: None,
            global_weight: 1.0,
            seen_keywords: HashSet::new(),
            steps: Vec::new(),
            next_column: 0,
            next_selection: 0,
            next_query: 0,
            cached: RefCell::new(None),
            dirty: Cell::new(true),
        }
    }

    // -- configuration keywords, unique per constructor (§4.7) --

    /// Run across `n` worker slots. `n == 0` defers to the host machine's
    /// core count (the same "0 = all available CPU cores" convention
    /// [`crate::config::ExecutionConfig::default_threads`] uses).
    pub fn multithread_enable(&mut self, n: usize) -> EngineResult<&mut Self> {
        self.claim_keyword("multithread")?;
        self.threads = if n == 0 { num_cpus::get() } else { n };
        Ok(self)
    }

    pub fn multithread_disable(&mut self) -> EngineResult<&mut Self> {
        self.claim_keyword("multithread")?;
        self.threads = 1;
        Ok(self)
    }

    pub fn head(&mut self, n_rows: u64) -> EngineResult<&mut Self> {
        self.claim_keyword("head")?;
        self.head_limit = Some(n_rows);
        Ok(self)
    }

    pub fn weight(&mut self, w: f64) -> EngineResult<&mut Self> {
        self.claim_keyword("weight")?;
        self.global_weight = w;
        Ok(self)
    }

    fn claim_keyword(&mut self, name: &'static str) -> EngineResult<()> {
        if !self.seen_keywords.insert(name) {
            return Err(EngineError::DuplicateOption(name));
        }
        Ok(())
    }

    /// Load the dataset source. Loading a second time silently replaces the
    /// first — a documented contract violation, not a detected error
    /// (§4.7's "loading twice").
    pub fn load(&mut self, source: Arc<dyn DatasetSource>) -> &mut Self {
        self.source = Some(source);
        self
    }

    fn mark_dirty(&mut self) {
        self.dirty.set(true);
    }

    fn push_step(
        &mut self,
        step: impl Fn(Slot, &mut ColumnComputation, &mut SelectionCutflow, &mut QueryExperiment) -> EngineResult<()>
            + Send
            + Sync
            + 'static,
    ) {
        self.steps.push(Arc::new(step));
        self.mark_dirty();
    }

    // -- columns --

    /// A reader column pulling `name` from the loaded dataset source.
    pub fn column<V: Send + Sync + 'static>(&mut self, name: impl Into<String>) -> EngineResult<LazyColumn<V>> {
        let source = self
            .source
            .clone()
            .ok_or_else(|| EngineError::Source("no dataset source loaded; call load() first".to_string()))?;
        let name = name.into();
        let id = ColumnId(self.next_column);
        self.next_column += 1;
        self.push_step(move |slot, columns, _selections, _queries| {
            let reader = source.read_column(slot, &name)?;
            columns.read(name.clone(), reader);
            Ok(())
        });
        Ok(LazyColumn::new(id))
    }

    /// A fixed column, constant for the whole run.
    pub fn constant<V: Clone + Send + Sync + 'static>(&mut self, value: V) -> LazyColumn<V> {
        let id = ColumnId(self.next_column);
        self.next_column += 1;
        self.push_step(move |_slot, columns, _selections, _queries| {
            columns.assign(value.clone());
            Ok(())
        });
        LazyColumn::new(id)
    }

    /// A pure function of one input column.
    pub fn equate1<A, R>(
        &mut self,
        name: impl Into<String>,
        input: LazyColumn<A>,
        f: impl Fn(&A) -> R + Send + Sync + 'static,
    ) -> LazyColumn<R>
    where
        A: 'static,
        R: Send + Sync + 'static,
    {
        let id = ColumnId(self.next_column);
        self.next_column += 1;
        let name = name.into();
        let input_id = input.id();
        let f = Arc::new(f);
        self.push_step(move |_slot, columns, _selections, _queries| {
            let f = Arc::clone(&f);
            columns.equate1::<A, R>(name.clone(), input_id, move |a| (f)(a));
            Ok(())
        });
        LazyColumn::new(id)
    }

    /// A pure function of two input columns.
    pub fn equate2<A, B, R>(
        &mut self,
        name: impl Into<String>,
        a: LazyColumn<A>,
        b: LazyColumn<B>,
        f: impl Fn(&A, &B) -> R + Send + Sync + 'static,
    ) -> LazyColumn<R>
    where
        A: 'static,
        B: 'static,
        R: Send + Sync + 'static,
    {
        let id = ColumnId(self.next_column);
        self.next_column += 1;
        let name = name.into();
        let (a_id, b_id) = (a.id(), b.id());
        let f = Arc::new(f);
        self.push_step(move |_slot, columns, _selections, _queries| {
            let f = Arc::clone(&f);
            columns.equate2::<A, B, R>(name.clone(), a_id, b_id, move |a, b| (f)(a, b));
            Ok(())
        });
        LazyColumn::new(id)
    }

    /// A pure function of three input columns.
    pub fn equate3<A, B, C, R>(
        &mut self,
        name: impl Into<String>,
        a: LazyColumn<A>,
        b: LazyColumn<B>,
        c: LazyColumn<C>,
        f: impl Fn(&A, &B, &C) -> R + Send + Sync + 'static,
    ) -> LazyColumn<R>
    where
        A: 'static,
        B: 'static,
        C: 'static,
        R: Send + Sync + 'static,
    {
        let id = ColumnId(self.next_column);
        self.next_column += 1;
        let name = name.into();
        let (a_id, b_id, c_id) = (a.id(), b.id(), c.id());
        let f = Arc::new(f);
        self.push_step(move |_slot, columns, _selections, _queries| {
            let f = Arc::clone(&f);
            columns.equate3::<A, B, C, R>(name.clone(), a_id, b_id, c_id, move |a, b, c| (f)(a, b, c));
            Ok(())
        });
        LazyColumn::new(id)
    }

    /// A stateful user-defined column: `state_factory` builds one fresh `S`
    /// per slot (the `Evaluator` from the spec's glossary is this pairing,
    /// wired atomically here rather than as a separate deferred step).
    pub fn define1<A, S, R>(
        &mut self,
        name: impl Into<String>,
        input: LazyColumn<A>,
        state_factory: impl Fn() -> S + Send + Sync + 'static,
        f: impl Fn(&mut S, &A) -> EngineResult<R> + Send + Sync + 'static,
    ) -> LazyColumn<R>
    where
        A: 'static,
        S: Send + 'static,
        R: Send + Sync + 'static,
    {
        let id = ColumnId(self.next_column);
        self.next_column += 1;
        let name = name.into();
        let input_id = input.id();
        let f = Arc::new(f);
        self.push_step(move |_slot, columns, _selections, _queries| {
            let state = state_factory();
            let f = Arc::clone(&f);
            columns.define1::<A, S, R>(name.clone(), input_id, state, move |s, a| (f)(s, a));
            Ok(())
        });
        LazyColumn::new(id)
    }

    /// A type-narrowing/widening view of another column.
    pub fn convert<From, To>(
        &mut self,
        input: LazyColumn<From>,
        f: impl Fn(&From) -> To + Send + Sync + 'static,
    ) -> LazyColumn<To>
    where
        From: 'static,
        To: Send + Sync + 'static,
    {
        let id = ColumnId(self.next_column);
        self.next_column += 1;
        let input_id = input.id();
        let f = Arc::new(f);
        self.push_step(move |_slot, columns, _selections, _queries| {
            let f = Arc::clone(&f);
            columns.convert::<From, To>(input_id, move |v| (f)(v));
            Ok(())
        });
        LazyColumn::new(id)
    }

    // -- selections --

    /// Wrap an existing boolean column as a cut.
    pub fn apply_cut(&mut self, parent: Option<LazySelection>, decision: LazyColumn<bool>) -> LazySelection {
        let id = SelectionId(self.next_selection);
        self.next_selection += 1;
        let parent_id = parent.map(|p| p.id());
        let decision_id = decision.id();
        self.push_step(move |_slot, _columns, selections, _queries| {
            selections.apply_cut(parent_id, decision_id);
            Ok(())
        });
        LazySelection::new(id)
    }

    /// Wrap an existing real-valued column as a weight.
    pub fn apply_weight(&mut self, parent: Option<LazySelection>, decision: LazyColumn<f64>) -> LazySelection {
        let id = SelectionId(self.next_selection);
        self.next_selection += 1;
        let parent_id = parent.map(|p| p.id());
        let decision_id = decision.id();
        self.push_step(move |_slot, _columns, selections, _queries| {
            selections.apply_weight(parent_id, decision_id);
            Ok(())
        });
        LazySelection::new(id)
    }

    /// Build a decision column from one input and wrap it as a cut in one
    /// step — the `select<cut>(parent, fn)` applicator, materialized
    /// immediately since its single input is already known.
    pub fn select_cut1<A>(
        &mut self,
        name: impl Into<String>,
        parent: Option<LazySelection>,
        input: LazyColumn<A>,
        f: impl Fn(&A) -> bool + Send + Sync + 'static,
    ) -> LazySelection
    where
        A: 'static,
    {
        let name = name.into();
        let decision = self.equate1(name, input, f);
        self.apply_cut(parent, decision)
    }

    /// Build a decision column from one input and wrap it as a weight.
    pub fn select_weight1<A>(
        &mut self,
        name: impl Into<String>,
        parent: Option<LazySelection>,
        input: LazyColumn<A>,
        f: impl Fn(&A) -> f64 + Send + Sync + 'static,
    ) -> LazySelection
    where
        A: 'static,
    {
        let name = name.into();
        let decision = self.equate1(name, input, f);
        self.apply_weight(parent, decision)
    }

    // -- queries --

    /// Start a booker for accumulator `Q`, built fresh once per slot.
    pub fn make<Q: Accumulate + 'static>(&self, factory: impl Fn() -> Q + Send + Sync + 'static) -> Booker<Q> {
        Booker::new(factory)
    }

    /// Bind a booker to a selection, replaying its registered fills.
    pub fn book<Q: Accumulate + 'static>(&mut self, booker: Booker<Q>, selection: LazySelection) -> LazyQuery<Q> {
        let id = QueryId(self.next_query);
        self.next_query += 1;
        let selection_id = selection.id();
        self.push_step(move |_slot, _columns, _selections, queries| {
            queries.book(booker.clone(), selection_id);
            Ok(())
        });
        LazyQuery::new(id)
    }

    // -- variation propagation --
    //
    // A `Varied<LazyColumn<V>>`/`Varied<LazySelection>`/`Varied<LazyQuery<Q>>`
    // is just the ordinary handle type wrapped by `crate::varied::Varied`;
    // nothing about `LazyColumn`/`LazySelection`/`LazyQuery` changes. These
    // helpers apply the usual builder calls once per nominal-or-named
    // variant via `Varied::map`/`zip_with`, which is exactly the "operations
    // on varied handles propagate per-variation" rule from the variation
    // algebra: the result's variation-name set is the union of its inputs'.

    /// Propagate `equate1` across every variant of a varied input column.
    pub fn equate1_varied<A, R>(
        &mut self,
        name: impl Into<String>,
        input: Varied<LazyColumn<A>>,
        f: impl Fn(&A) -> R + Send + Sync + Clone + 'static,
    ) -> Varied<LazyColumn<R>>
    where
        A: 'static,
        R: Send + Sync + 'static,
    {
        let name = name.into();
        input.map(|lazy| self.equate1(name.clone(), *lazy, f.clone()))
    }

    /// Propagate `apply_cut` across a varied decision column and (optionally)
    /// a varied parent selection; the result's variation names are the union
    /// of both operands'.
    pub fn apply_cut_varied(
        &mut self,
        parent: Option<Varied<LazySelection>>,
        decision: Varied<LazyColumn<bool>>,
    ) -> Varied<LazySelection> {
        match parent {
            None => decision.map(|d| self.apply_cut(None, *d)),
            Some(parent) => parent.zip_with(&decision, |p, d| self.apply_cut(Some(*p), *d)),
        }
    }

    /// Propagate `apply_weight` the same way [`Self::apply_cut_varied`] does.
    pub fn apply_weight_varied(
        &mut self,
        parent: Option<Varied<LazySelection>>,
        decision: Varied<LazyColumn<f64>>,
    ) -> Varied<LazySelection> {
        match parent {
            None => decision.map(|d| self.apply_weight(None, *d)),
            Some(parent) => parent.zip_with(&decision, |p, d| self.apply_weight(Some(*p), *d)),
        }
    }

    /// Bind a varied booker (e.g. one whose fill columns differ per variant)
    /// to a varied selection. The terminal's variation names are the union
    /// of the booker's and the selection's — "booking a varied query at a
    /// varied selection yields a varied terminal whose variation names are
    /// the union of the two."
    pub fn book_varied<Q: Accumulate + 'static>(
        &mut self,
        booker: Varied<Booker<Q>>,
        selection: Varied<LazySelection>,
    ) -> Varied<LazyQuery<Q>> {
        booker.zip_with(&selection, |b, sel| self.book(b.clone(), *sel))
    }

    // -- result demand --

    /// Trigger analysis if the cache is stale, then return one query's
    /// merged result.
    pub fn result<Q: Accumulate + 'static>(&self, query: LazyQuery<Q>) -> EngineResult<Q::Result>
    where
        Q::Result: Clone,
    {
        self.analyze()?;
        let cached = self.cached.borrow();
        let results = cached.as_ref().expect("analyze populates the cache");
        let (_, dynamic) = results
            .iter()
            .find(|(id, _)| *id == query.id())
            .ok_or_else(|| EngineError::UnbookedQuery(format!("{:?}", query.id())))?;
        dynamic
            .downcast_cloned::<Q::Result>()
            .ok_or_else(|| EngineError::Evaluation {
                column: "<query result>".to_string(),
                entry: 0,
                reason: "result type mismatch".to_string(),
            })
    }

    /// Build a cutflow report: one [`crate::args::YieldEntry`] per named
    /// selection, each carrying its unweighted pass count and summed weight
    /// — the `yield(sels…)` argument type from the public surface.
    pub fn yield_report(&mut self, sels: &[(&str, LazySelection)]) -> EngineResult<crate::args::YieldTable> {
        let mut rows = Vec::with_capacity(sels.len());
        for (name, sel) in sels {
            let count_q = self.book(self.make(crate::queries::Count::new), *sel);
            let weight_q = self.book(self.make(crate::queries::SumOfWeights::new), *sel);
            rows.push(crate::args::YieldEntry {
                name: (*name).to_string(),
                passed: self.result(count_q)?,
                sum_of_weights: self.result(weight_q)?,
            });
        }
        Ok(rows)
    }

    /// The varied counterpart of [`Self::result`]: resolves the nominal
    /// query plus every named variant, producing a `Varied<Q::Result>` whose
    /// variation names match `query`'s exactly.
    pub fn result_varied<Q: Accumulate + 'static>(&self, query: Varied<LazyQuery<Q>>) -> EngineResult<Varied<Q::Result>>
    where
        Q::Result: Clone,
    {
        let nominal = self.result(*query.nominal_ref())?;
        let mut out = Varied::nominal(nominal);
        for name in query.variation_names() {
            let value = self.result(*query.variation(&name))?;
            out = out.with_variation(name, value);
        }
        Ok(out)
    }

    fn analyze(&self) -> EngineResult<()> {
        if !self.dirty.get() && self.cached.borrow().is_some() {
            tracing::debug!("result demand served from cache");
            return Ok(());
        }
        let source = self
            .source
            .clone()
            .ok_or_else(|| EngineError::Source("no dataset source loaded; call load() first".to_string()))?;
        let factory = self.make_factory();
        let processor = Processor::new(self.threads, self.global_weight, self.head_limit);
        let results = processor.run(source, factory)?;
        tracing::info!(queries = results.len(), "analysis complete");
        *self.cached.borrow_mut() = Some(results);
        self.dirty.set(false);
        Ok(())
    }

    fn make_factory(&self) -> GraphFactory {
        let steps: Arc<Vec<BuildStep>> = Arc::new(self.steps.clone());
        Arc::new(move |slot| {
            let mut columns = ColumnComputation::new();
            let mut selections = SelectionCutflow::new();
            let mut queries = QueryExperiment::new();
            for step in steps.iter() {
                step(slot, &mut columns, &mut selections, &mut queries)?;
            }
            Ok((columns, selections, queries))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{CategoryYield, Count, SumOfWeights, WeightedMean};
    use crate::source::InMemorySource;

    fn toy_source() -> Arc<dyn DatasetSource> {
        Arc::new(
            InMemorySource::new(6, 0)
                .with_column("pt", vec![10.0, 20.0, 5.0, 40.0, 15.0, 60.0])
                .with_column("category", vec![
                    "signal".to_string(),
                    "signal".to_string(),
                    "background".to_string(),
                    "signal".to_string(),
                    "background".to_string(),
                    "signal".to_string(),
                ]),
        )
    }

    #[test]
    fn yield_by_category_counts_entries_passing_a_cut() {
        let mut flow = Dataflow::new();
        flow.load(toy_source());
        let pt: LazyColumn<f64> = flow.column("pt").unwrap();
        let category: LazyColumn<String> = flow.column("category").unwrap();
        let sel = flow.select_cut1("pt_gt_10", None, pt, |x| *x > 10.0);
        let booker = flow
            .make(CategoryYield::new)
            .fill("category_yield", vec![category.id()])
            .unwrap();
        let q = flow.book(booker, sel);
        let result = flow.result(q).unwrap();
        assert_eq!(result.get("signal").copied(), Some(3.0));
        assert_eq!(result.get("background").copied(), Some(1.0));
    }

    #[test]
    fn weighted_mean_query_over_a_fill_column() {
        let mut flow = Dataflow::new();
        flow.load(toy_source());
        let pt: LazyColumn<f64> = flow.column("pt").unwrap();
        let always = flow.constant(true);
        let sel = flow.apply_cut(None, always);
        let booker = flow.make(WeightedMean::new).fill("mean_pt", vec![pt.id()]).unwrap();
        let q = flow.book(booker, sel);
        let mean = flow.result(q).unwrap();
        let expected = (10.0 + 20.0 + 5.0 + 40.0 + 15.0 + 60.0) / 6.0;
        assert_eq!(mean.mean(), expected);
    }

    #[test]
    fn result_demand_is_cached_until_a_new_query_is_booked() {
        let mut flow = Dataflow::new();
        flow.load(toy_source());
        let pt: LazyColumn<f64> = flow.column("pt").unwrap();
        let always = flow.constant(true);
        let sel = flow.apply_cut(None, always);
        let booker = flow.make(Count::new);
        let q1 = flow.book(booker, sel);
        assert_eq!(flow.result(q1).unwrap(), 6);
        assert!(!flow.dirty.get());

        let booker2 = flow.make(SumOfWeights::new);
        let q2 = flow.book(booker2, sel);
        assert!(flow.dirty.get());
        assert_eq!(flow.result(q2).unwrap(), 6.0);
        assert!(!flow.dirty.get());
        let _ = pt;
    }

    #[test]
    fn duplicate_keyword_option_is_rejected() {
        let mut flow = Dataflow::new();
        flow.multithread_enable(2).unwrap();
        assert!(flow.multithread_disable().is_err());
    }

    #[test]
    fn head_limits_total_entries_processed() {
        let mut flow = Dataflow::new();
        flow.load(toy_source());
        flow.head(3).unwrap();
        let always = flow.constant(true);
        let sel = flow.apply_cut(None, always);
        let booker = flow.make(Count::new);
        let q = flow.book(booker, sel);
        assert_eq!(flow.result(q).unwrap(), 3);
    }

    #[test]
    fn multithreaded_run_gives_the_same_total_as_single_threaded() {
        let mut flow = Dataflow::new();
        flow.load(Arc::new(
            InMemorySource::new(1000, 37).with_column("w", vec![1.0; 1000]),
        ));
        flow.multithread_enable(4).unwrap();
        let _w: LazyColumn<f64> = flow.column("w").unwrap();
        let always = flow.constant(true);
        let sel = flow.apply_cut(None, always);
        let booker = flow.make(Count::new);
        let q = flow.book(booker, sel);
        assert_eq!(flow.result(q).unwrap(), 1000);
    }

    #[test]
    fn variation_propagates_through_equate_and_selection_to_a_varied_terminal() {
        let mut flow = Dataflow::new();
        flow.load(toy_source());
        let pt: LazyColumn<f64> = flow.column("pt").unwrap();
        let pt_scaled = flow.equate1("pt_x2", pt, |x| x * 2.0);
        let pt_varied = crate::args::vary(pt, vec![crate::args::variation("scale", pt_scaled)]);

        let decision_varied = flow.equate1_varied("gt_30", pt_varied, |x| *x > 30.0);
        let sel_varied = flow.apply_cut_varied(None, decision_varied);

        let booker = Varied::nominal(flow.make(Count::new));
        let q_varied = flow.book_varied(booker, sel_varied);

        let result = flow.result_varied(q_varied).unwrap();
        assert_eq!(result.variation_names(), vec!["scale".to_string()]);
        // pt > 30: 40, 60 pass -> 2
        assert_eq!(*result.nominal_ref(), 2);
        // pt * 2 > 30 <=> pt > 15: 20, 40, 60 pass -> 3
        assert_eq!(*result.variation("scale"), 3);
    }

    #[test]
    fn yield_report_summarizes_a_cutflow() {
        let mut flow = Dataflow::new();
        flow.load(toy_source());
        let pt: LazyColumn<f64> = flow.column("pt").unwrap();
        let always = flow.constant(true);
        let baseline = flow.apply_cut(None, always);
        let tight = flow.select_cut1("pt_gt_10", Some(baseline), pt, |x| *x > 10.0);

        let table = flow.yield_report(&[("baseline", baseline), ("tight", tight)]).unwrap();
        assert_eq!(table[0].name, "baseline");
        assert_eq!(table[0].passed, 6);
        assert_eq!(table[0].sum_of_weights, 6.0);
        assert_eq!(table[1].name, "tight");
        assert_eq!(table[1].passed, 4);
        assert_eq!(table[1].sum_of_weights, 4.0);
    }
}

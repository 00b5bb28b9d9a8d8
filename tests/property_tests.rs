//! Property-based invariant tests (proptest): cutflow soundness and
//! merge associativity for the reference accumulators.

use cutflow::column::{ColumnComputation, ColumnId};
use cutflow::query::Accumulate;
use cutflow::queries::{CategoryYield, Count, Histogram1D, SumOfWeights, WeightedMean, WeightedMeanResult};
use cutflow::selection::SelectionCutflow;
use cutflow::value::Dynamic;
use cutflow::{Entry, Slot};
use proptest::prelude::*;
use std::sync::Arc;

/// A decision column backed by a plain `Vec`, indexed by entry — the
/// minimal stand-in for a `DatasetSource`-provided reader these tests need.
struct VecReader<T> {
    data: Vec<T>,
}

impl<T: Clone + Send + Sync + 'static> cutflow::ColumnReader for VecReader<T> {
    fn value(&self, _slot: Slot, entry: Entry) -> cutflow::EngineResult<Dynamic> {
        Ok(Dynamic::new(self.data[entry as usize].clone()))
    }
}

fn indexed_column<T: Clone + Send + Sync + 'static>(columns: &mut ColumnComputation, name: &str, data: Vec<T>) -> ColumnId {
    columns.read(name, Arc::new(VecReader { data }))
}

proptest! {
    /// A child cut can only pass where its parent passed, and an
    /// intervening weight node never changes whether its parent passed nor
    /// a descendant cut's weight — exactly the rules documented on
    /// `SelectionCutflow`: `child.passed == parent.passed && local`,
    /// `weight` node's own `passed` always mirrors its parent's.
    #[test]
    fn cutflow_child_never_passes_without_its_parent(
        cuts in prop::collection::vec(any::<bool>(), 1..30),
        weights in prop::collection::vec(-5.0f64..5.0, 1..30),
        children in prop::collection::vec(any::<bool>(), 1..30),
    ) {
        let n = cuts.len().min(weights.len()).min(children.len());
        let cuts = cuts[..n].to_vec();
        let weights = weights[..n].to_vec();
        let children = children[..n].to_vec();

        let mut columns = ColumnComputation::new();
        let cut_col = indexed_column(&mut columns, "cut", cuts.clone());
        let weight_col = indexed_column(&mut columns, "weight", weights.clone());
        let child_col = indexed_column(&mut columns, "child", children.clone());

        let mut selections = SelectionCutflow::new();
        let root_cut = selections.apply_cut(None, cut_col);
        let root_weight = selections.apply_weight(Some(root_cut), weight_col);
        let child_cut = selections.apply_cut(Some(root_weight), child_col);

        for entry in 0..n as u64 {
            columns.execute_all(0, entry).unwrap();
            let root_passed = selections.passed(root_cut, &columns, 0, entry).unwrap();
            let weight_node_passed = selections.passed(root_weight, &columns, 0, entry).unwrap();
            let weight_node_weight = selections.weight(root_weight, &columns, 0, entry).unwrap();
            let child_passed = selections.passed(child_cut, &columns, 0, entry).unwrap();
            let child_weight = selections.weight(child_cut, &columns, 0, entry).unwrap();

            let i = entry as usize;
            prop_assert_eq!(root_passed, cuts[i]);
            prop_assert_eq!(weight_node_passed, root_passed, "a weight node never changes whether its parent passed");
            // a weight node's own weight is its parent's weight times its local
            // decision, independent of whether the root cut passed: the root
            // cut's own weight is always 1.0 regardless of its `passed`.
            prop_assert_eq!(weight_node_weight, weights[i]);
            if child_passed {
                prop_assert!(weight_node_passed, "child cut passed but its parent did not");
            }
            prop_assert_eq!(child_passed, weight_node_passed && children[i]);
            prop_assert_eq!(child_weight, weight_node_weight, "a cut node never changes its parent's weight");
        }
    }

    /// `SumOfWeights::merge` is associative: merging the whole list at once
    /// agrees with merging any way of splitting it into two groups first.
    #[test]
    fn sum_of_weights_merge_is_associative(
        values in prop::collection::vec(-100.0f64..100.0, 0..50),
        split_at in 0usize..50,
    ) {
        let split_at = split_at.min(values.len());
        let (left, right) = values.split_at(split_at);

        let whole = sum_of_weights_of(&values);
        let split = SumOfWeights::merge(vec![sum_of_weights_of(left), sum_of_weights_of(right)]);
        prop_assert!((whole - split).abs() < 1e-6);
    }

    /// `Count::merge` is associative the same way, over any partition of a
    /// sequence of per-entry flags into three groups.
    #[test]
    fn count_merge_is_associative_across_three_groups(
        flags in prop::collection::vec(any::<bool>(), 0..60),
        a in 0usize..60,
        b in 0usize..60,
    ) {
        let mut cuts = [a.min(flags.len()), b.min(flags.len())];
        cuts.sort_unstable();
        let (g1, rest) = flags.split_at(cuts[0]);
        let (g2, g3) = rest.split_at(cuts[1] - cuts[0]);

        let whole = count_of(&flags);
        let grouped = Count::merge(vec![count_of(g1), count_of(g2), count_of(g3)]);
        prop_assert_eq!(whole, grouped);
    }

    /// Histogram merging is bin-wise addition, so merging a whole fill
    /// sequence at once agrees with merging any split of it.
    #[test]
    fn histogram_merge_is_associative(
        values in prop::collection::vec(0.0f64..10.0, 0..80),
        split_at in 0usize..80,
    ) {
        let split_at = split_at.min(values.len());
        let (left, right) = values.split_at(split_at);

        let whole = histogram_of(&values);
        let split = Histogram1D::merge(vec![histogram_of(left), histogram_of(right)]);
        prop_assert_eq!(whole.bins, split.bins);
        prop_assert!((whole.underflow - split.underflow).abs() < 1e-9);
        prop_assert!((whole.overflow - split.overflow).abs() < 1e-9);
    }

    /// `WeightedMean::merge` sums `(sum_wx, sum_w)` component-wise, so its
    /// mean is exact for any split of the fill sequence into groups — unlike
    /// averaging per-group means, which only agrees when every group carries
    /// the same weight mass.
    #[test]
    fn weighted_mean_merge_is_associative(
        entries in prop::collection::vec((-50.0f64..50.0, 0.01f64..20.0), 1..60),
        split_at in 0usize..60,
    ) {
        let split_at = split_at.min(entries.len());
        let (left, right) = entries.split_at(split_at);

        let whole = weighted_mean_of(&entries);
        let split = WeightedMean::merge(vec![weighted_mean_of(left), weighted_mean_of(right)]);
        prop_assert!((whole.mean() - split.mean()).abs() < 1e-6);
    }

    /// `CategoryYield::merge` sums per-key totals regardless of how the
    /// fills were grouped into slots first.
    #[test]
    fn category_yield_merge_is_associative(
        entries in prop::collection::vec((0usize..4, 0.0f64..10.0), 0..60),
        split_at in 0usize..60,
    ) {
        let split_at = split_at.min(entries.len());
        let (left, right) = entries.split_at(split_at);

        let whole = category_yield_of(&entries);
        let split = CategoryYield::merge(vec![category_yield_of(left), category_yield_of(right)]);

        for cat in ["a", "b", "c", "d"] {
            let w = whole.get(cat).copied().unwrap_or(0.0);
            let s = split.get(cat).copied().unwrap_or(0.0);
            prop_assert!((w - s).abs() < 1e-6, "category {} diverges: {} vs {}", cat, w, s);
        }
    }
}

fn sum_of_weights_of(values: &[f64]) -> f64 {
    let mut acc = SumOfWeights::new();
    for &v in values {
        acc.count(v);
    }
    acc.result()
}

fn count_of(flags: &[bool]) -> u64 {
    let mut acc = Count::new();
    for &f in flags {
        if f {
            acc.count(1.0);
        }
    }
    acc.result()
}

fn histogram_of(values: &[f64]) -> cutflow::queries::HistogramResult {
    let mut h = Histogram1D::new(10, 0.0, 10.0);
    for &v in values {
        h.fill(&[Dynamic::new(v)], 1.0).unwrap();
    }
    h.result()
}

fn weighted_mean_of(entries: &[(f64, f64)]) -> WeightedMeanResult {
    let mut acc = WeightedMean::new();
    for &(x, w) in entries {
        acc.fill(&[Dynamic::new(x)], w).unwrap();
    }
    acc.result()
}

fn category_yield_of(entries: &[(usize, f64)]) -> std::collections::HashMap<String, f64> {
    let categories = ["a", "b", "c", "d"];
    let mut acc = CategoryYield::new();
    for &(idx, w) in entries {
        let cat = categories[idx % categories.len()].to_string();
        acc.fill(&[Dynamic::new(cat)], w).unwrap();
    }
    acc.result()
}

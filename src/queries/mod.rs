//! Reference [`crate::query::Accumulate`] implementations.
//!
//! These ship alongside the core purely as test/example fixtures — they
//! carry no special status over a third-party accumulator.
//!
//! # Example
//!
//! ```
//! use cutflow::queries::SumOfWeights;
//! use cutflow::query::Accumulate;
//!
//! let mut acc = SumOfWeights::new();
//! acc.count(1.0);
//! acc.count(2.5);
//! assert_eq!(acc.result(), 3.5);
//! ```

use crate::action::Action;
use crate::query::Accumulate;
use crate::value::Dynamic;
use std::collections::HashMap;

/// Sum of the per-entry weights of every passing entry.
#[derive(Debug, Default, Clone)]
pub struct SumOfWeights {
    total: f64,
}

impl SumOfWeights {
    pub fn new() -> Self {
        SumOfWeights::default()
    }
}

impl Action for SumOfWeights {}

impl Accumulate for SumOfWeights {
    type Result = f64;

    fn count(&mut self, w: f64) {
        self.total += w;
    }

    fn result(&self) -> f64 {
        self.total
    }

    fn merge(results: Vec<f64>) -> f64 {
        results.into_iter().sum()
    }
}

/// Number of passing entries, unweighted.
#[derive(Debug, Default, Clone)]
pub struct Count {
    total: u64,
}

impl Count {
    pub fn new() -> Self {
        Count::default()
    }
}

impl Action for Count {}

impl Accumulate for Count {
    type Result = u64;

    fn count(&mut self, _w: f64) {
        self.total += 1;
    }

    fn result(&self) -> u64 {
        self.total
    }

    fn merge(results: Vec<u64>) -> u64 {
        results.into_iter().sum()
    }
}

/// Weighted mean over one fill column: `sum(w * x) / sum(w)`.
///
/// Not fillable by `count` alone — the value to average comes from the sole
/// registered fill-tuple.
#[derive(Debug, Default, Clone)]
pub struct WeightedMean {
    sum_wx: f64,
    sum_w: f64,
}

impl WeightedMean {
    pub fn new() -> Self {
        WeightedMean::default()
    }
}

impl Action for WeightedMean {}

/// `sum(w*x)` and `sum(w)` kept apart so merging across slots stays exact —
/// dividing early and re-averaging loses the per-slot weight mass.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct WeightedMeanResult {
    pub sum_wx: f64,
    pub sum_w: f64,
}

impl WeightedMeanResult {
    pub fn mean(&self) -> f64 {
        if self.sum_w == 0.0 {
            0.0
        } else {
            self.sum_wx / self.sum_w
        }
    }
}

impl Accumulate for WeightedMean {
    type Result = WeightedMeanResult;

    fn count(&mut self, _w: f64) {}

    fn fill(&mut self, values: &[Dynamic], w: f64) -> crate::error::EngineResult<()> {
        let x = *values[0]
            .downcast_ref::<f64>()
            .ok_or_else(|| crate::error::EngineError::Evaluation {
                column: "<weighted mean fill>".to_string(),
                entry: 0,
                reason: "expected f64 fill value".to_string(),
            })?;
        self.sum_wx += w * x;
        self.sum_w += w;
        Ok(())
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }

    fn result(&self) -> WeightedMeanResult {
        WeightedMeanResult {
            sum_wx: self.sum_wx,
            sum_w: self.sum_w,
        }
    }

    fn merge(results: Vec<WeightedMeanResult>) -> WeightedMeanResult {
        let mut acc = WeightedMeanResult::default();
        for r in results {
            acc.sum_wx += r.sum_wx;
            acc.sum_w += r.sum_w;
        }
        acc
    }
}

/// Collects every fill value passed to it, in arrival order. Useful for
/// single-threaded ordering checks; multi-threaded merges simply
/// concatenate slots in slot order, which is not a stable global entry
/// order.
#[derive(Debug, Default, Clone)]
pub struct Series<T> {
    values: Vec<T>,
}

impl<T> Series<T> {
    pub fn new() -> Self {
        Series { values: Vec::new() }
    }
}

impl<T: Send> Action for Series<T> {}

impl<T: Clone + Send + Sync + 'static> Accumulate for Series<T> {
    type Result = Vec<T>;

    fn count(&mut self, _w: f64) {}

    fn fill(&mut self, values: &[Dynamic], _w: f64) -> crate::error::EngineResult<()> {
        let v = values[0]
            .downcast_cloned::<T>()
            .ok_or_else(|| crate::error::EngineError::Evaluation {
                column: "<series fill>".to_string(),
                entry: 0,
                reason: "fill value type mismatch".to_string(),
            })?;
        self.values.push(v);
        Ok(())
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }

    fn result(&self) -> Vec<T> {
        self.values.clone()
    }

    fn merge(results: Vec<Vec<T>>) -> Vec<T> {
        results.into_iter().flatten().collect()
    }
}

/// Fixed-width histogram over one fill column.
#[derive(Debug, Clone)]
pub struct Histogram1D {
    low: f64,
    high: f64,
    bin_width: f64,
    bins: Vec<f64>,
    underflow: f64,
    overflow: f64,
}

impl Histogram1D {
    pub fn new(bins: usize, low: f64, high: f64) -> Self {
        assert!(bins > 0, "histogram needs at least one bin");
        assert!(high > low, "histogram range must be non-empty");
        Histogram1D {
            low,
            high,
            bin_width: (high - low) / bins as f64,
            bins: vec![0.0; bins],
            underflow: 0.0,
            overflow: 0.0,
        }
    }

    pub fn bins(&self) -> &[f64] {
        &self.bins
    }

    pub fn underflow(&self) -> f64 {
        self.underflow
    }

    pub fn overflow(&self) -> f64 {
        self.overflow
    }
}

impl Action for Histogram1D {}

/// Merged histogram state: bin contents plus under/overflow, addable
/// bin-by-bin across slots.
#[derive(Debug, Clone)]
pub struct HistogramResult {
    pub bins: Vec<f64>,
    pub underflow: f64,
    pub overflow: f64,
}

impl Accumulate for Histogram1D {
    type Result = HistogramResult;

    fn count(&mut self, _w: f64) {}

    fn fill(&mut self, values: &[Dynamic], w: f64) -> crate::error::EngineResult<()> {
        let x = *values[0]
            .downcast_ref::<f64>()
            .ok_or_else(|| crate::error::EngineError::Evaluation {
                column: "<histogram fill>".to_string(),
                entry: 0,
                reason: "expected f64 fill value".to_string(),
            })?;
        if x < self.low {
            self.underflow += w;
        } else if x >= self.high {
            self.overflow += w;
        } else {
            let idx = ((x - self.low) / self.bin_width) as usize;
            let idx = idx.min(self.bins.len() - 1);
            self.bins[idx] += w;
        }
        Ok(())
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }

    fn result(&self) -> HistogramResult {
        HistogramResult {
            bins: self.bins.clone(),
            underflow: self.underflow,
            overflow: self.overflow,
        }
    }

    fn merge(results: Vec<HistogramResult>) -> HistogramResult {
        let mut iter = results.into_iter();
        let mut acc = iter.next().unwrap_or(HistogramResult {
            bins: Vec::new(),
            underflow: 0.0,
            overflow: 0.0,
        });
        for r in iter {
            for (a, b) in acc.bins.iter_mut().zip(r.bins.iter()) {
                *a += b;
            }
            acc.underflow += r.underflow;
            acc.overflow += r.overflow;
        }
        acc
    }
}

/// Categorical yield: sum of weights keyed by a category label read from
/// one fill column. Grounded on the same small-accumulator shape as
/// [`Histogram1D`], keyed by `String` rather than binned range.
#[derive(Debug, Default, Clone)]
pub struct CategoryYield {
    totals: HashMap<String, f64>,
}

impl CategoryYield {
    pub fn new() -> Self {
        CategoryYield::default()
    }

    pub fn get(&self, category: &str) -> f64 {
        self.totals.get(category).copied().unwrap_or(0.0)
    }
}

impl Action for CategoryYield {}

impl Accumulate for CategoryYield {
    type Result = HashMap<String, f64>;

    fn count(&mut self, _w: f64) {}

    fn fill(&mut self, values: &[Dynamic], w: f64) -> crate::error::EngineResult<()> {
        let category = values[0]
            .downcast_ref::<String>()
            .ok_or_else(|| crate::error::EngineError::Evaluation {
                column: "<category yield fill>".to_string(),
                entry: 0,
                reason: "expected String fill value".to_string(),
            })?;
        *self.totals.entry(category.clone()).or_insert(0.0) += w;
        Ok(())
    }

    fn arity(&self) -> Option<usize> {
        Some(1)
    }

    fn result(&self) -> HashMap<String, f64> {
        self.totals.clone()
    }

    fn merge(results: Vec<HashMap<String, f64>>) -> HashMap<String, f64> {
        let mut acc: HashMap<String, f64> = HashMap::new();
        for r in results {
            for (k, v) in r {
                *acc.entry(k).or_insert(0.0) += v;
            }
        }
        acc
    }
}

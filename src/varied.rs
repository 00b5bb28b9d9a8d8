//! Variation algebra: a nominal value plus a name-keyed map of alternates,
//! and the propagation rules that let operations on varied handles fan out
//! per-variation without the caller threading variation names through every
//! call.
//!
//! ## Architecture
//!
//! ```text
//! Varied<T> { nominal: T, variants: OrderedMap<String, T> }
//!
//! unary op:     op(v)        -> Varied { nominal: op(v.nom), variants: { n: op(v[n]) for n in names(v) } }
//! binary op: op(a, b)        -> Varied { nominal: op(a.nom, b.nom),
//!                                        variants: { n: op(a.get(n), b.get(n)) for n in names(a) ∪ names(b) } }
//! ```
//!
//! `a.get(n)` falls back to `a.nominal` when `a` has no variant named `n` —
//! this is the "fallback" testable property from the spec: a variation
//! absent on one operand but present on the other still produces a variant,
//! built from the present operand's alternate and the absent operand's
//! nominal.

use std::collections::HashMap;

/// An insertion-ordered string-keyed map, used to keep `variation_names()`
/// iteration stable (first-declared-first-iterated) without pulling in an
/// extra dependency for something this small.
#[derive(Debug, Clone, Default)]
pub struct OrderedMap<V> {
    order: Vec<String>,
    index: HashMap<String, usize>,
    values: Vec<V>,
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        OrderedMap {
            order: Vec::new(),
            index: HashMap::new(),
            values: Vec::new(),
        }
    }

    /// Insert or overwrite the value for `name`, preserving the original
    /// insertion position on overwrite.
    pub fn insert(&mut self, name: impl Into<String>, value: V) {
        let name = name.into();
        if let Some(&i) = self.index.get(&name) {
            self.values[i] = value;
        } else {
            self.index.insert(name.clone(), self.values.len());
            self.order.push(name);
            self.values.push(value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.index.get(name).map(|&i| &self.values[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.order.iter().map(move |k| (k.as_str(), self.get(k).expect("key present")))
    }
}

/// A nominal value of type `T` plus zero or more named alternates.
///
/// Terminal queries additionally expose `[name]`-style lookup that raises on
/// a missing name (see [`Varied::require`]); every other consumer uses
/// [`Varied::variation`], which silently falls back to nominal.
#[derive(Debug, Clone)]
pub struct Varied<T> {
    nominal: T,
    variants: OrderedMap<T>,
}

impl<T> Varied<T> {
    /// Wrap a plain value with no variations.
    pub fn nominal(value: T) -> Self {
        Varied {
            nominal: value,
            variants: OrderedMap::new(),
        }
    }

    /// Build a varied handle from a nominal value and a map of named
    /// alternates of the same kind. Mirrors the `vary(arg, {name -> alt, ..})`
    /// surface described in the spec.
    pub fn from_map(nominal: T, variants: OrderedMap<T>) -> Self {
        Varied { nominal, variants }
    }

    /// Freeze an alternate into the nominal slot (the `nominal<Col>(lazy)`
    /// wrapper): the result carries no variations.
    pub fn freeze(value: T) -> Self {
        Self::nominal(value)
    }

    pub fn nominal_ref(&self) -> &T {
        &self.nominal
    }

    pub fn into_nominal(self) -> T {
        self.nominal
    }

    /// Add or replace one named alternate.
    pub fn with_variation(mut self, name: impl Into<String>, value: T) -> Self {
        self.variants.insert(name, value);
        self
    }

    pub fn has_variation(&self, name: &str) -> bool {
        self.variants.contains(name)
    }

    pub fn variation_names(&self) -> Vec<String> {
        self.variants.keys().map(str::to_owned).collect()
    }

    /// Resolve a variation, falling back to nominal when absent.
    pub fn variation(&self, name: &str) -> &T {
        self.variants.get(name).unwrap_or(&self.nominal)
    }

    /// Resolve a variation, raising a descriptive error when absent. This is
    /// the `[name]` accessor on terminal queries.
    pub fn require(&self, name: &str) -> Result<&T, crate::error::EngineError> {
        self.variants
            .get(name)
            .ok_or_else(|| crate::error::EngineError::UnknownVariation {
                name: name.to_string(),
                available: self.variation_names(),
            })
    }

    /// Apply a unary operation, producing a varied result with the same
    /// variation-name set.
    pub fn map<U>(&self, mut op: impl FnMut(&T) -> U) -> Varied<U> {
        let nominal = op(&self.nominal);
        let mut variants = OrderedMap::new();
        for name in self.variants.keys() {
            variants.insert(name, op(self.variants.get(name).expect("key present")));
        }
        Varied { nominal, variants }
    }

    /// Apply a binary operation across two varied operands. The result's
    /// variation-name set is the union of both operands'; each variant uses
    /// the present operand's alternate and falls back to nominal on the
    /// operand where that name is absent.
    pub fn zip_with<U, R>(&self, other: &Varied<U>, mut op: impl FnMut(&T, &U) -> R) -> Varied<R> {
        let nominal = op(&self.nominal, &other.nominal);
        let mut names: Vec<&str> = self.variants.keys().collect();
        for n in other.variants.keys() {
            if !names.contains(&n) {
                names.push(n);
            }
        }
        let mut variants = OrderedMap::new();
        for name in names {
            variants.insert(name, op(self.variation(name), other.variation(name)));
        }
        Varied { nominal, variants }
    }
}

/// Union a list of varied operands' name sets, propagating an n-ary build
/// function the same way [`Varied::zip_with`] does for two operands. Used by
/// the dataflow front-end for operations with more than two column inputs
/// (e.g. `equate` over an arbitrary-arity expression).
pub fn propagate<T, R>(inputs: &[Varied<T>], mut build: impl FnMut(&[&T]) -> R) -> Varied<R> {
    let nominal_inputs: Vec<&T> = inputs.iter().map(Varied::nominal_ref).collect();
    let nominal = build(&nominal_inputs);

    let mut names: Vec<String> = Vec::new();
    for v in inputs {
        for n in v.variants.keys() {
            if !names.iter().any(|x| x == n) {
                names.push(n.to_string());
            }
        }
    }

    let mut variants = OrderedMap::new();
    for name in &names {
        let resolved: Vec<&T> = inputs.iter().map(|v| v.variation(name)).collect();
        variants.insert(name.clone(), build(&resolved));
    }
    Varied { nominal, variants }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unary_map_preserves_name_set() {
        let v = Varied::nominal(1).with_variation("scale", 2).with_variation("smear", 3);
        let doubled = v.map(|x| x * 2);
        assert_eq!(*doubled.nominal_ref(), 2);
        assert_eq!(*doubled.variation("scale"), 4);
        assert_eq!(*doubled.variation("smear"), 6);
        assert_eq!(doubled.variation_names(), vec!["scale", "smear"]);
    }

    #[test]
    fn binary_zip_unions_names_and_falls_back_to_nominal() {
        let a = Varied::nominal(10).with_variation("scale", 20);
        let b = Varied::nominal(1).with_variation("smear", 2);
        let sum = a.zip_with(&b, |x, y| x + y);
        assert_eq!(*sum.nominal_ref(), 11);
        assert_eq!(sum.variation_names(), vec!["scale", "smear"]);
        // scale: a has it (20), b falls back to nominal (1) -> 21
        assert_eq!(*sum.variation("scale"), 21);
        // smear: a falls back to nominal (10), b has it (2) -> 12
        assert_eq!(*sum.variation("smear"), 12);
    }

    #[test]
    fn missing_variation_falls_back_silently() {
        let v = Varied::nominal(7).with_variation("scale", 9);
        assert_eq!(*v.variation("nonexistent"), 7);
    }

    #[test]
    fn require_errors_on_missing_name() {
        let v = Varied::nominal(7).with_variation("scale", 9);
        assert!(v.require("scale").is_ok());
        assert!(v.require("smear").is_err());
    }

    #[test]
    fn propagate_handles_nary_inputs() {
        let a = Varied::nominal(1).with_variation("x", 10);
        let b = Varied::nominal(2).with_variation("y", 20);
        let c = Varied::nominal(3);
        let summed = propagate(&[a, b, c], |vals| vals.iter().copied().sum::<i32>());
        assert_eq!(*summed.nominal_ref(), 6);
        assert_eq!(summed.variation_names(), vec!["x", "y"]);
        assert_eq!(*summed.variation("x"), 10 + 2 + 3);
        assert_eq!(*summed.variation("y"), 1 + 20 + 3);
    }
}

//! User-facing argument sugar for the variation algebra and cutflow
//! reporting — the small wrapper types that sit on top of
//! [`crate::dataflow::Dataflow`]'s builder methods.

use crate::varied::{OrderedMap, Varied};

/// Freeze a plain value into a varied handle with no alternates — the
/// `nominal<Col>(lazy)` wrapper from the spec's variation surface.
pub fn nominal<T>(value: T) -> Varied<T> {
    Varied::nominal(value)
}

/// One named alternate, the `variation<V>(lazy)` wrapper: supplies the
/// alternate value for `name` inside a `vary(...)` call.
pub struct Variation<T> {
    pub name: String,
    pub value: T,
}

pub fn variation<T>(name: impl Into<String>, value: T) -> Variation<T> {
    Variation {
        name: name.into(),
        value,
    }
}

/// Build a varied handle from a nominal value and a list of named
/// alternates — `vary(arg, {name -> alternate, ...})`.
pub fn vary<T>(nominal: T, variations: Vec<Variation<T>>) -> Varied<T> {
    let mut map = OrderedMap::new();
    for v in variations {
        map.insert(v.name, v.value);
    }
    Varied::from_map(nominal, map)
}

/// One row of a `yield(sels...)` report: a selection's name alongside its
/// unweighted pass count and summed weight.
#[derive(Debug, Clone, PartialEq)]
pub struct YieldEntry {
    pub name: String,
    pub passed: u64,
    pub sum_of_weights: f64,
}

pub type YieldTable = Vec<YieldEntry>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vary_builds_a_varied_handle_from_named_alternates() {
        let v = vary(1, vec![variation("scale", 2), variation("smear", 3)]);
        assert_eq!(*v.nominal_ref(), 1);
        assert_eq!(*v.variation("scale"), 2);
        assert_eq!(*v.variation("smear"), 3);
    }

    #[test]
    fn nominal_freezes_with_no_variations() {
        let v = nominal(7);
        assert!(v.variation_names().is_empty());
        assert_eq!(*v.nominal_ref(), 7);
    }
}

//! Type-erased value passing between column nodes.
//!
//! Column nodes are generic over their result type at the public API, but the
//! per-slot graph stores heterogeneous nodes in one arena (see
//! [`crate::column::ColumnComputation`]), so values crossing node boundaries
//! are carried as [`Dynamic`] and downcast back to a concrete type at the
//! point of use (an equation's inputs, a selection's decision, a query's fill
//! tuple).

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A type-erased, cheaply-cloned value produced by a column node.
#[derive(Clone)]
pub struct Dynamic(Arc<dyn Any + Send + Sync>);

impl Dynamic {
    pub fn new<V: Send + Sync + 'static>(value: V) -> Self {
        Dynamic(Arc::new(value))
    }

    /// Downcast to a concrete type, returning `None` on mismatch.
    pub fn downcast_ref<V: 'static>(&self) -> Option<&V> {
        self.0.downcast_ref::<V>()
    }

    /// Downcast to a concrete, `Clone`-able type.
    pub fn downcast_cloned<V: Clone + 'static>(&self) -> Option<V> {
        self.downcast_ref::<V>().cloned()
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Dynamic").field(&"..").finish()
    }
}

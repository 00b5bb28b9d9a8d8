//! # cutflow
//!
//! A declarative, lazy, DAG-based engine for tabular-data analyses: columns
//! feed selections (cut/weight cutflow trees), selections gate queries
//! (accumulators), and the whole graph is replicated once per worker thread
//! so multi-threaded runs need no locking inside the per-entry loop.
//!
//! ## Architecture
//!
//! ```text
//! DatasetSource
//!     │ partition() -> [(begin,end)...]
//!     ▼
//! Processor (N worker threads, shared partition queue)
//!     │ one Player per slot, replaying the same build steps
//!     ▼
//! Player
//!     ├── ColumnComputation  (reader/fixed/equation/definition/conversion)
//!     ├── SelectionCutflow   (cut/weight DAG, passed()/weight() on demand)
//!     └── QueryExperiment    (accumulators bound to selections + fills)
//!     │ entry loop: source.execute(slot, e) -> columns dirty -> queries run
//!     ▼
//! join barrier -> per-query merge(slot results) -> Dataflow::result()
//! ```
//!
//! ## Usage
//!
//! ```
//! use cutflow::dataflow::Dataflow;
//! use cutflow::queries::SumOfWeights;
//! use cutflow::source::InMemorySource;
//! use std::sync::Arc;
//!
//! let source = Arc::new(
//!     InMemorySource::new(4, 0).with_column("pt", vec![10.0, 20.0, 5.0, 40.0]),
//! );
//!
//! let mut flow = Dataflow::new();
//! flow.load(source);
//! let pt = flow.column::<f64>("pt").unwrap();
//! let sel = flow.select_cut1("pt_gt_10", None, pt, |x| *x > 10.0);
//! let booker = flow.make(SumOfWeights::new);
//! let yield_query = flow.book(booker, sel);
//!
//! assert_eq!(flow.result(yield_query).unwrap(), 2.0);
//! ```

pub mod action;
pub mod args;
pub mod column;
pub mod config;
pub mod dataflow;
pub mod error;
pub mod player;
pub mod processor;
pub mod query;
pub mod queries;
pub mod selection;
pub mod source;
pub mod value;
pub mod varied;

pub use action::{Action, Entry, Slot};
pub use config::EngineConfig;
pub use dataflow::{Dataflow, LazyColumn, LazyQuery, LazySelection};
pub use error::{EngineError, EngineResult};
pub use query::{Accumulate, Booker};
pub use source::{ColumnReader, DatasetSource, InMemorySource};
pub use value::Dynamic;
pub use varied::Varied;

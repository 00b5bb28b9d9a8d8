//! Crate-wide error type.

use thiserror::Error;

/// Errors raised by graph construction, execution, or variation resolution.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A dataflow keyword argument was passed more than once.
    #[error("duplicate configuration option: {0}")]
    DuplicateOption(&'static str),

    /// A dataflow keyword argument name is not recognized.
    #[error("unknown configuration option: {0}")]
    UnknownOption(String),

    /// A query was booked with a fill-column tuple whose arity does not
    /// match the query's expected fill arity.
    #[error("query '{query}' expects {expected} fill columns, got {actual}")]
    FillArityMismatch {
        query: String,
        expected: usize,
        actual: usize,
    },

    /// A query was constructed but never bound to a selection via `book`.
    #[error("query '{0}' was never booked at a selection")]
    UnbookedQuery(String),

    /// A terminal's `[name]` accessor was used with a variation name that
    /// does not exist on that terminal.
    #[error("variation '{name}' not found; available: {available:?}")]
    UnknownVariation {
        name: String,
        available: Vec<String>,
    },

    /// The dataset source could not produce a reader for the requested field.
    #[error("column '{name}' not available from dataset source: {reason}")]
    ColumnUnavailable { name: String, reason: String },

    /// The dataset source failed during `initialize`/`execute`/`finalize`.
    #[error("dataset source error: {0}")]
    Source(String),

    /// A user-supplied expression or definition panicked or returned an error
    /// while evaluating an entry.
    #[error("error evaluating column '{column}' at entry {entry}: {reason}")]
    Evaluation {
        column: String,
        entry: u64,
        reason: String,
    },

    /// A worker thread panicked; its payload (if any) is captured as text.
    #[error("worker thread panicked: {0}")]
    WorkerPanic(String),

    /// Loading configuration from figment/toml failed.
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),
}

/// Crate-wide result alias.
pub type EngineResult<T> = Result<T, EngineError>;

//! Error types returned by the shuffle engine and the precomputation store.

use thiserror::Error;

/// Caller precondition violations detected by the shuffle engine.
///
/// All of these are reported before any output is computed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShuffleError {
    /// Occurs when shuffling zero rows
    #[error("Empty shuffle")]
    EmptyShuffle,

    /// Occurs when the input rows hold no ciphertexts
    #[error("Input rows are empty")]
    EmptyRow,

    /// Occurs when input rows do not all have the same number of ciphertexts
    #[error("Input row {row} has {found} ciphertexts, expected {expected}")]
    MismatchedRowLength {
        /// Index of the offending row
        row: usize,
        /// Length of the first row
        expected: usize,
        /// Length of the offending row
        found: usize,
    },

    /// Occurs when a precomputed table is supplied but has no rows
    #[error("Precomputed table is empty")]
    EmptyPrecomputedTable,

    /// Occurs when a precomputed row cannot cover every ciphertext of an input row
    #[error("Precomputed row {row} has width {width}, at least {required} required")]
    PrecomputedRowTooNarrow {
        /// Index of the table row
        row: usize,
        /// Width of the table row
        width: usize,
        /// Length of the input rows
        required: usize,
    },

    /// Occurs when a permutation built from explicit values is not a bijection
    #[error("Invalid permutation")]
    InvalidPermutation,
}

/// Failures of the precomputation store.
///
/// A missing table file is not an error; see
/// [`read_precomputed_file`](crate::precompute::read_precomputed_file).
#[derive(Error, Debug)]
pub enum PrecomputeError {
    /// Reading or writing the table file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The table blob could not be serialized or parsed
    #[error("Table encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    /// The configuration is not valid JSON for its type
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// A stored pair does not decompress to group elements
    #[error("Invalid point at row {row}, column {column}")]
    InvalidPoint {
        /// Table row
        row: usize,
        /// Position in the row
        column: usize,
    },

    /// A stored scalar is not canonically encoded
    #[error("Non-canonical scalar at row {row}, column {column}")]
    InvalidScalar {
        /// Table row
        row: usize,
        /// Position in the row
        column: usize,
    },

    /// Ciphertext and scalar sequences of a row differ in length.
    #[error("Malformed precomputed row {row}")]
    MalformedRow {
        /// Table row
        row: usize,
    },

    /// The stored table has no rows
    #[error("Precomputed table is empty")]
    EmptyTable,

    /// A stored row is narrower than the configured line size
    #[error("Stored table row {row} has width {width}, at least {required} required")]
    TableTooNarrow {
        /// Table row
        row: usize,
        /// Width of the stored row
        width: usize,
        /// Configured line size
        required: usize,
    },
}

//! Precomputed shuffling randomness.
//!
//! Tables of `(t*g, t*h)` pairs with their scalars `t` replace the two scalar
//! multiplications per ciphertext of a fresh shuffle. A server derives its
//! table from a secret, stores it at a configured path and reloads it on the
//! next run.

pub mod encoding;
pub mod precompute;
pub mod stream;

// Re-export
pub use self::{
    encoding::{decode_table, encode_table, EncodedRow, EncodedTable},
    precompute::{
        create_precomputed_randomize, precomputation_writing_for_shuffling,
        precompute_for_shuffling, read_precomputed_file, PrecomputedRow, PRECOMPUTED_ROWS,
        PRECOMPUTED_WIDTH_FACTOR,
    },
    stream::{SharedStream, XofStream},
};

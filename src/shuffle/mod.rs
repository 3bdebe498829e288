/// Permutation and the shuffle engine.
pub mod shuffle;

// Re-export
pub use self::shuffle::{shuffle_sequence, Permutation, Shuffle};

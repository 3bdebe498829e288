#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// ElGamal ciphertexts over the Ristretto group.
///
/// Provides the ciphertext type the shuffle permutes, together with encryption,
/// decryption and the two re-randomization laws.
pub mod elgamal;

/// Error types for the shuffle engine and the precomputation store.
pub mod error;

/// Generic cryptographic key management traits.
///
/// Defines common interfaces for public and secret key operations that
/// are implemented by specific cryptographic schemes.
pub mod keys;

/// Precomputed re-randomization material.
///
/// Generation from a seeded stream, byte encoding, and the file-backed store
/// servers load at startup.
pub mod precompute;

/// Ristretto group key management.
pub mod ristretto;

/// Permutation and re-randomization of ciphertext batches.
pub mod shuffle;

/// Configuration helpers.
pub mod util;

// Re-export commonly used types for convenience
pub use elgamal::{CipherText, CipherVector};
pub use error::{PrecomputeError, ShuffleError};
pub use precompute::{
    precomputation_writing_for_shuffling, read_precomputed_file, PrecomputedRow,
};
pub use ristretto::{RistrettoPublicKey, RistrettoSecretKey};
pub use shuffle::{shuffle_sequence, Permutation, Shuffle};

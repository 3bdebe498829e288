//! ElGamal encryption over the Ristretto group.
//!
//! Ciphertexts here are the unit the shuffle permutes and re-randomizes.

/// ElGamal ciphertext implementation and API.
pub mod elgamal;

pub use self::elgamal::{encrypt_vector, CipherText, CipherTextError, CipherVector};

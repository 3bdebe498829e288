use crate::ristretto::{RistrettoPublicKey, RistrettoSecretKey};
use core::ops::{Add, Sub};
use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_TABLE,
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
};
use rand::{CryptoRng, Rng};
use thiserror::Error;

/// Length of a marshaled ciphertext: two compressed points.
pub const CIPHERTEXT_LENGTH: usize = 64;

/// Errors decoding a marshaled [`CipherText`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CipherTextError {
    /// The encoding does not have the length of two compressed points
    #[error("ciphertext encoding must be 64 bytes, got {0}")]
    InvalidLength(usize),
    /// A component does not decompress to a group element
    #[error("ciphertext component is not a valid ristretto point")]
    InvalidPoint,
}

/// ElGamal ciphertext `(K, C) = (r*G, m*G + r*H)`.
///
/// `k` is the ephemeral key component and `c` the masked message.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CipherText {
    pub(crate) k: RistrettoPoint,
    pub(crate) c: RistrettoPoint,
}

/// One party's row of ciphertexts.
pub type CipherVector = Vec<CipherText>;

impl CipherText {
    /// Builds a ciphertext from its two components.
    pub fn new(k: RistrettoPoint, c: RistrettoPoint) -> CipherText {
        CipherText { k, c }
    }

    /// Ephemeral key component `K`.
    pub fn k(&self) -> &RistrettoPoint {
        &self.k
    }

    /// Masked message component `C`.
    pub fn c(&self) -> &RistrettoPoint {
        &self.c
    }

    /// Creates a ciphertext of `m` under `p` with randomness `rscalar`.
    // k = r*G
    // c = m*G + r*H (where H is the public key point)
    pub fn encrypt(p: &RistrettoPublicKey, m: Scalar, rscalar: Scalar) -> CipherText {
        let k = &rscalar * &RISTRETTO_BASEPOINT_TABLE;
        let mg = &m * &RISTRETTO_BASEPOINT_TABLE;
        let rh = rscalar * p.as_point();
        CipherText::new(k, mg + rh)
    }

    /// Encrypts `m` with randomness drawn from `rng`.
    pub fn encrypt_random<R: Rng + CryptoRng>(
        p: &RistrettoPublicKey,
        m: Scalar,
        rng: &mut R,
    ) -> CipherText {
        CipherText::encrypt(p, m, Scalar::random(rng))
    }

    /// Decrypts to `m*G`. Recovering `m` itself needs a discrete log.
    pub fn decrypt(&self, pr: &RistrettoSecretKey) -> RistrettoPoint {
        self.c - pr.as_scalar() * self.k
    }

    /// Fresh re-randomization: `(K + a*g, C + b*h)`.
    pub fn rerandomize(
        &self,
        a: &Scalar,
        b: &Scalar,
        g: &RistrettoPoint,
        h: &RistrettoPoint,
    ) -> CipherText {
        CipherText::new(self.k + a * g, self.c + b * h)
    }

    /// Re-randomization with a precomputed `(t*g, t*h)` pair; no scalar multiplication.
    pub fn add_delta(&self, delta: &CipherText) -> CipherText {
        *self + *delta
    }

    /// Compressed `K` followed by compressed `C`.
    pub fn to_bytes(&self) -> [u8; CIPHERTEXT_LENGTH] {
        let mut out = [0u8; CIPHERTEXT_LENGTH];
        out[..32].copy_from_slice(self.k.compress().as_bytes());
        out[32..].copy_from_slice(self.c.compress().as_bytes());
        out
    }

    /// Parses the 64-byte form produced by [`CipherText::to_bytes`].
    pub fn from_bytes(slice: &[u8]) -> Result<CipherText, CipherTextError> {
        if slice.len() != CIPHERTEXT_LENGTH {
            return Err(CipherTextError::InvalidLength(slice.len()));
        }
        let k = CompressedRistretto::from_slice(&slice[..32])
            .decompress()
            .ok_or(CipherTextError::InvalidPoint)?;
        let c = CompressedRistretto::from_slice(&slice[32..])
            .decompress()
            .ok_or(CipherTextError::InvalidPoint)?;
        Ok(CipherText::new(k, c))
    }
}

/// Encrypts each value of `ms` with fresh randomness.
pub fn encrypt_vector<R: Rng + CryptoRng>(
    p: &RistrettoPublicKey,
    ms: &[u64],
    rng: &mut R,
) -> CipherVector {
    ms.iter()
        .map(|m| CipherText::encrypt_random(p, Scalar::from(*m), rng))
        .collect()
}

// ------- CipherText Add, Sub ------- //

impl Add<CipherText> for CipherText {
    type Output = CipherText;

    fn add(self, other: CipherText) -> CipherText {
        CipherText::new(self.k + other.k, self.c + other.c)
    }
}

impl Sub<CipherText> for CipherText {
    type Output = CipherText;

    fn sub(self, other: CipherText) -> CipherText {
        CipherText::new(self.k - other.k, self.c - other.c)
    }
}

// ------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------

use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_TABLE,
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
    traits::Identity,
};
use rand::{CryptoRng, Rng};

use crate::keys::{PublicKey, SecretKey};

const SCALAR_LENGTH: usize = 32;
const PUBLIC_KEY_LENGTH: usize = 32;

// ------- SecretKey ------- //

/// ElGamal secret key, a scalar.
#[derive(Debug, Clone)]
pub struct RistrettoSecretKey(pub(crate) Scalar);

impl RistrettoSecretKey {
    /// The underlying scalar.
    pub fn as_scalar(&self) -> &Scalar {
        &self.0
    }
}

impl SecretKey for RistrettoSecretKey {
    fn key_length() -> usize {
        SCALAR_LENGTH
    }

    fn random<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        RistrettoSecretKey(Scalar::random(rng))
    }

    /// Rejects slices of the wrong length and non-canonical scalars.
    fn from_bytes(slice: &[u8]) -> Option<Self> {
        if slice.len() != SCALAR_LENGTH {
            return None;
        }
        let mut bytes = [0u8; SCALAR_LENGTH];
        bytes.copy_from_slice(slice);
        Scalar::from_canonical_bytes(bytes).map(RistrettoSecretKey)
    }

    fn as_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }
}

// ------- PublicKey ------- //

/// ElGamal public key `h = sk * G`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RistrettoPublicKey(pub(crate) RistrettoPoint);

impl RistrettoPublicKey {
    /// The underlying point.
    pub fn as_point(&self) -> &RistrettoPoint {
        &self.0
    }

    /// Sums the keys of several servers into the collective key the shuffled
    /// batch is encrypted under.
    pub fn collective<'a, I>(keys: I) -> RistrettoPublicKey
    where
        I: IntoIterator<Item = &'a RistrettoPublicKey>,
    {
        RistrettoPublicKey(
            keys.into_iter()
                .fold(RistrettoPoint::identity(), |acc, k| acc + k.0),
        )
    }
}

impl PublicKey for RistrettoPublicKey {
    type K = RistrettoSecretKey;

    fn from_secret_key(k: &Self::K) -> RistrettoPublicKey {
        RistrettoPublicKey(&k.0 * &RISTRETTO_BASEPOINT_TABLE)
    }

    fn key_length() -> usize {
        PUBLIC_KEY_LENGTH
    }

    fn as_bytes(&self) -> [u8; 32] {
        self.0.compress().to_bytes()
    }

    fn from_bytes(slice: &[u8]) -> Option<Self> {
        if slice.len() != PUBLIC_KEY_LENGTH {
            return None;
        }
        CompressedRistretto::from_slice(slice)
            .decompress()
            .map(RistrettoPublicKey)
    }

    fn verify_keypair(&self, privkey: &Self::K) -> Result<(), &'static str> {
        if self.0 == &privkey.0 * &RISTRETTO_BASEPOINT_TABLE {
            Ok(())
        } else {
            Err("Error::KeyPairMismatch")
        }
    }
}

// ------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------

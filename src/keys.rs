use rand::{CryptoRng, Rng};

/// A secret key of an encryption scheme.
pub trait SecretKey: Sized {
    /// Length of the byte form.
    fn key_length() -> usize;
    /// Samples a fresh key.
    fn random<R: Rng + CryptoRng>(rng: &mut R) -> Self;
    /// Parses a key, `None` when the bytes are not a valid key.
    fn from_bytes(slice: &[u8]) -> Option<Self>;
    /// Byte form of the key.
    fn as_bytes(&self) -> [u8; 32];
}

/// A public key derived from a [`SecretKey`].
pub trait PublicKey: Sized {
    /// Matching secret key type.
    type K: SecretKey;

    /// Derives the public key of `k`.
    fn from_secret_key(k: &Self::K) -> Self;

    /// Length of the byte form.
    fn key_length() -> usize;

    /// Byte form of the key.
    fn as_bytes(&self) -> [u8; 32];

    /// Parses a key, `None` when the bytes are not a valid key.
    fn from_bytes(slice: &[u8]) -> Option<Self>;

    /// Checks that `privkey` is the secret key of `self`.
    fn verify_keypair(&self, privkey: &Self::K) -> Result<(), &'static str>;
}

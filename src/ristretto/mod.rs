/// Ristretto secret and public keys.
pub mod keys;
// Re-export
pub use self::keys::{RistrettoPublicKey, RistrettoSecretKey};

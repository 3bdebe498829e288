//! Randomness sources for table generation.

use curve25519_dalek::scalar::Scalar;
use parking_lot::Mutex;
use rand::{CryptoRng, RngCore};
use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake256,
};

type ShakeReader = <Shake256 as ExtendableOutput>::Reader;

/// Deterministic byte stream: SHAKE256 absorbing a seed, then squeezed on demand.
///
/// Two streams built from the same seed yield the same bytes, so tables
/// generated from a server secret can be rebuilt after the file is lost.
pub struct XofStream {
    reader: ShakeReader,
}

impl XofStream {
    /// Absorbs `seed`.
    pub fn new(seed: &[u8]) -> XofStream {
        let mut hasher = Shake256::default();
        hasher.update(seed);
        XofStream {
            reader: hasher.finalize_xof(),
        }
    }
}

impl RngCore for XofStream {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.reader.read(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for XofStream {}

/// A stream shared by concurrent workers. Every draw holds the lock.
pub struct SharedStream<S> {
    inner: Mutex<S>,
}

impl<S: RngCore + CryptoRng> SharedStream<S> {
    /// Wraps `stream`.
    pub fn new(stream: S) -> Self {
        SharedStream {
            inner: Mutex::new(stream),
        }
    }

    /// Draws one uniform scalar under the lock.
    pub fn pick_scalar(&self) -> Scalar {
        let mut stream = self.inner.lock();
        Scalar::random(&mut *stream)
    }

    /// Returns the wrapped stream.
    pub fn into_inner(self) -> S {
        self.inner.into_inner()
    }
}

// ------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn same_seed_same_stream_test() {
        let mut a = XofStream::new(b"server-secret");
        let mut b = XofStream::new(b"server-secret");
        let mut c = XofStream::new(b"other-secret");
        let sa: Vec<_> = (0..4).map(|_| Scalar::random(&mut a)).collect();
        let sb: Vec<_> = (0..4).map(|_| Scalar::random(&mut b)).collect();
        let sc: Vec<_> = (0..4).map(|_| Scalar::random(&mut c)).collect();
        assert_eq!(sa, sb);
        assert_ne!(sa, sc);
    }

    #[test]
    fn shared_stream_follows_inner_order_test() {
        let shared = SharedStream::new(XofStream::new(b"seed"));
        let mut plain = XofStream::new(b"seed");
        for _ in 0..3 {
            assert_eq!(shared.pick_scalar(), Scalar::random(&mut plain));
        }
        let mut rest = shared.into_inner();
        assert_eq!(rest.next_u64(), plain.next_u64());
    }
}

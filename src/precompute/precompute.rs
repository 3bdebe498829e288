//! Generation and loading of shuffling tables.

use std::fs::File;
use std::io;
use std::path::Path;

use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT, ristretto::RistrettoPoint, scalar::Scalar,
};
use rand::{CryptoRng, RngCore};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::encoding::{read_table, write_table_file};
use super::stream::{SharedStream, XofStream};
use crate::{
    elgamal::{CipherText, CipherVector},
    error::PrecomputeError,
    ristretto::RistrettoPublicKey,
};

const LOG_TARGET: &str = "neffshuffle::precompute";

/// Number of rows in a table generated for shuffling.
pub const PRECOMPUTED_ROWS: usize = 10;
/// Generated rows are this many times wider than the requested line size.
pub const PRECOMPUTED_WIDTH_FACTOR: usize = 2;

/// Reusable shuffling randomness: `cipher_v[w] = (s[w]*g, s[w]*h)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecomputedRow {
    cipher_v: CipherVector,
    s: Vec<Scalar>,
}

impl PrecomputedRow {
    // callers guarantee equal lengths
    pub(crate) fn from_parts(cipher_v: CipherVector, s: Vec<Scalar>) -> PrecomputedRow {
        debug_assert_eq!(cipher_v.len(), s.len());
        PrecomputedRow { cipher_v, s }
    }

    /// Computes the row for the given scalars.
    pub fn from_scalars(g: &RistrettoPoint, h: &RistrettoPoint, s: Vec<Scalar>) -> PrecomputedRow {
        let cipher_v = s.iter().map(|t| CipherText::new(t * g, t * h)).collect();
        PrecomputedRow { cipher_v, s }
    }

    /// The `(t*g, t*h)` pairs, added to ciphertexts by a precomputed shuffle.
    pub fn cipher_v(&self) -> &[CipherText] {
        &self.cipher_v
    }

    /// The scalars `t` behind each pair, reported as blinding factors.
    pub fn s(&self) -> &[Scalar] {
        &self.s
    }

    /// Number of pairs in the row.
    pub fn width(&self) -> usize {
        self.s.len()
    }

    /// Checks every pair against its scalar under `g` and `h`.
    pub fn verify(&self, g: &RistrettoPoint, h: &RistrettoPoint) -> bool {
        self.cipher_v.len() == self.s.len()
            && self
                .cipher_v
                .iter()
                .zip(self.s.iter())
                .all(|(ct, t)| ct.k == t * g && ct.c == t * h)
    }
}

/// Generates `row_count` rows of width `line_size` from `stream`.
///
/// Scalars are drawn in row-major order under the lock of a [`SharedStream`],
/// so the table is a deterministic function of the stream whatever the size of
/// the rayon pool. Only the two multiplications per entry run in parallel.
pub fn create_precomputed_randomize<S>(
    g: &RistrettoPoint,
    h: &RistrettoPoint,
    stream: &mut S,
    line_size: usize,
    row_count: usize,
) -> Vec<PrecomputedRow>
where
    S: RngCore + CryptoRng + Send,
{
    let shared = SharedStream::new(stream);
    let scalars: Vec<Vec<Scalar>> = (0..row_count)
        .map(|_| (0..line_size).map(|_| shared.pick_scalar()).collect())
        .collect();

    scalars
        .into_par_iter()
        .map(|s| {
            let cipher_v = s.par_iter().map(|t| CipherText::new(t * g, t * h)).collect();
            PrecomputedRow { cipher_v, s }
        })
        .collect()
}

// seeds the stream with the marshaled secret; base point and collective key as generators
fn generate_from_secret(
    secret: &Scalar,
    collective_key: &RistrettoPublicKey,
    line_size: usize,
) -> Vec<PrecomputedRow> {
    let mut stream = XofStream::new(secret.as_bytes());
    create_precomputed_randomize(
        &RISTRETTO_BASEPOINT_POINT,
        collective_key.as_point(),
        &mut stream,
        line_size * PRECOMPUTED_WIDTH_FACTOR,
        PRECOMPUTED_ROWS,
    )
}

/// Generates the shuffling table of `identity` from `secret` and writes it to `file_path`.
pub fn precompute_for_shuffling<P: AsRef<Path>>(
    identity: &str,
    file_path: P,
    secret: &Scalar,
    collective_key: &RistrettoPublicKey,
    line_size: usize,
) -> Result<Vec<PrecomputedRow>, PrecomputeError> {
    let file_path = file_path.as_ref();
    info!(
        target: LOG_TARGET,
        %identity,
        file = %file_path.display(),
        line_size,
        "precomputes for shuffling"
    );
    let table = generate_from_secret(secret, collective_key, line_size);
    write_table_file(file_path, &table)?;
    Ok(table)
}

/// Returns the shuffling table of `identity`.
///
/// Without `use_file` the table is regenerated from `secret` and the filesystem
/// is not touched. With `use_file` the table stored at `file_path` is loaded,
/// or generated and stored there when the file does not exist.
///
/// # Errors
///
/// - `TableTooNarrow` if a stored row is narrower than `line_size`
/// - `EmptyTable` if the stored table has no rows
/// - I/O and decoding failures of the stored table
pub fn precomputation_writing_for_shuffling<P: AsRef<Path>>(
    use_file: bool,
    file_path: P,
    identity: &str,
    secret: &Scalar,
    collective_key: &RistrettoPublicKey,
    line_size: usize,
) -> Result<Vec<PrecomputedRow>, PrecomputeError> {
    if !use_file {
        debug!(target: LOG_TARGET, %identity, line_size, "regenerating shuffling table");
        return Ok(generate_from_secret(secret, collective_key, line_size));
    }

    let file_path = file_path.as_ref();
    match read_precomputed_file(file_path)? {
        Some(table) => {
            check_width(&table, line_size)?;
            info!(
                target: LOG_TARGET,
                %identity,
                file = %file_path.display(),
                rows = table.len(),
                "loaded shuffling table"
            );
            Ok(table)
        }
        None => {
            warn!(
                target: LOG_TARGET,
                %identity,
                file = %file_path.display(),
                "no shuffling table on disk"
            );
            precompute_for_shuffling(identity, file_path, secret, collective_key, line_size)
        }
    }
}

/// Loads the table stored at `file_path`, or `None` when there is no such file.
pub fn read_precomputed_file<P: AsRef<Path>>(
    file_path: P,
) -> Result<Option<Vec<PrecomputedRow>>, PrecomputeError> {
    let file = match File::open(file_path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    read_table(file).map(Some)
}

fn check_width(table: &[PrecomputedRow], required: usize) -> Result<(), PrecomputeError> {
    if table.is_empty() {
        return Err(PrecomputeError::EmptyTable);
    }
    match table.iter().position(|row| row.width() < required) {
        Some(row) => Err(PrecomputeError::TableTooNarrow {
            row,
            width: table[row].width(),
            required,
        }),
        None => Ok(()),
    }
}

// ------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------

//! Byte form of precomputed tables and its file persistence.
//!
//! A table is written as one bincode blob: a sequence of rows, each row a
//! sequence of `(K, C)` compressed points and a parallel sequence of canonical
//! scalars, all 32 bytes wide.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use curve25519_dalek::{ristretto::CompressedRistretto, scalar::Scalar};
use serde_derive::{Deserialize, Serialize};

use super::precompute::PrecomputedRow;
use crate::{elgamal::CipherText, error::PrecomputeError};

/// Serialized form of a [`PrecomputedRow`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EncodedRow {
    /// Compressed `(K, C)` points of each pair.
    pub cipher_v: Vec<([u8; 32], [u8; 32])>,
    /// Canonical bytes of each scalar.
    pub s: Vec<[u8; 32]>,
}

/// Serialized form of a whole table.
pub type EncodedTable = Vec<EncodedRow>;

/// Converts a table to its byte form.
pub fn encode_table(table: &[PrecomputedRow]) -> EncodedTable {
    table
        .iter()
        .map(|row| EncodedRow {
            cipher_v: row
                .cipher_v()
                .iter()
                .map(|ct| (ct.k().compress().to_bytes(), ct.c().compress().to_bytes()))
                .collect(),
            s: row.s().iter().map(|s| s.to_bytes()).collect(),
        })
        .collect()
}

/// Parses a table, rejecting invalid points, non-canonical scalars and rows
/// whose two sequences differ in length.
pub fn decode_table(encoded: &[EncodedRow]) -> Result<Vec<PrecomputedRow>, PrecomputeError> {
    encoded
        .iter()
        .enumerate()
        .map(|(row, e)| decode_row(row, e))
        .collect()
}

fn decode_row(row: usize, encoded: &EncodedRow) -> Result<PrecomputedRow, PrecomputeError> {
    if encoded.cipher_v.len() != encoded.s.len() {
        return Err(PrecomputeError::MalformedRow { row });
    }
    let cipher_v = encoded
        .cipher_v
        .iter()
        .enumerate()
        .map(|(column, (k, c))| {
            let k = CompressedRistretto(*k).decompress();
            let c = CompressedRistretto(*c).decompress();
            match (k, c) {
                (Some(k), Some(c)) => Ok(CipherText::new(k, c)),
                _ => Err(PrecomputeError::InvalidPoint { row, column }),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    let s = encoded
        .s
        .iter()
        .enumerate()
        .map(|(column, bytes)| {
            Scalar::from_canonical_bytes(*bytes)
                .ok_or(PrecomputeError::InvalidScalar { row, column })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PrecomputedRow::from_parts(cipher_v, s))
}

/// Writes the table as a bincode blob.
pub fn write_table<W: Write>(writer: W, table: &[PrecomputedRow]) -> Result<(), PrecomputeError> {
    let mut writer = BufWriter::new(writer);
    bincode::serialize_into(&mut writer, &encode_table(table))?;
    writer.flush()?;
    Ok(())
}

/// Reads a table written by [`write_table`].
pub fn read_table<R: Read>(reader: R) -> Result<Vec<PrecomputedRow>, PrecomputeError> {
    let encoded: EncodedTable = bincode::deserialize_from(BufReader::new(reader))?;
    decode_table(&encoded)
}

/// Writes the table to `path`, replacing any previous file.
///
/// The blob goes to a temporary file in the same directory first and is then
/// renamed over `path`, so a failed write leaves the previous table in place.
pub fn write_table_file<P: AsRef<Path>>(
    path: P,
    table: &[PrecomputedRow],
) -> Result<(), PrecomputeError> {
    replace_file(path.as_ref(), |file| write_table(file, table))
}

fn replace_file<F>(path: &Path, write: F) -> Result<(), PrecomputeError>
where
    F: FnOnce(&mut File) -> Result<(), PrecomputeError>,
{
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------

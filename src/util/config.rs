//! Configuration of a server's precomputation store.
//!
//! The table location is explicit configuration; a table found there is
//! reused as long as it is wide enough for the configured line size.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use curve25519_dalek::scalar::Scalar;
use serde_derive::{Deserialize, Serialize};

use crate::{
    error::PrecomputeError,
    precompute::{precomputation_writing_for_shuffling, PrecomputedRow},
    ristretto::RistrettoPublicKey,
};

/// Precomputation settings, usually read from a JSON file.
///
/// Missing fields take their [`Default`] values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecomputeConfig {
    /// Name of the server, used in logs.
    pub identity: String,
    /// Persist the table at `file_path` instead of regenerating it on every start.
    pub use_file: bool,
    /// Where the table is stored.
    pub file_path: PathBuf,
    /// Number of ciphertexts per shuffled row.
    pub line_size: usize,
}

impl Default for PrecomputeConfig {
    fn default() -> PrecomputeConfig {
        PrecomputeConfig {
            identity: String::from("server"),
            use_file: false,
            file_path: PathBuf::from("precomputed_shuffle.bin"),
            line_size: 1,
        }
    }
}

impl PrecomputeConfig {
    /// Parses a configuration from JSON text.
    pub fn from_json_str(s: &str) -> Result<PrecomputeConfig, PrecomputeError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Reads a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<PrecomputeConfig, PrecomputeError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Loads or generates the table this configuration describes.
    pub fn load_table(
        &self,
        secret: &Scalar,
        collective_key: &RistrettoPublicKey,
    ) -> Result<Vec<PrecomputedRow>, PrecomputeError> {
        precomputation_writing_for_shuffling(
            self.use_file,
            &self.file_path,
            &self.identity,
            secret,
            collective_key,
            self.line_size,
        )
    }
}

// ------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------

use anyhow::{ensure, Context, Result};
use curve25519_dalek::{constants::RISTRETTO_BASEPOINT_POINT, scalar::Scalar};
use neffshuffle::{
    elgamal::encrypt_vector,
    keys::{PublicKey, SecretKey},
    shuffle::Shuffle,
    util::PrecomputeConfig,
    CipherVector, RistrettoPublicKey, RistrettoSecretKey,
};
use rand::rngs::OsRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SERVERS: usize = 3;
const CLIENTS: usize = 6;

pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // optional path to a JSON PrecomputeConfig
    let config = match std::env::args().nth(1) {
        Some(path) => PrecomputeConfig::from_json_file(&path)
            .with_context(|| format!("reading config {}", path))?,
        None => PrecomputeConfig {
            line_size: 4,
            ..PrecomputeConfig::default()
        },
    };

    // lets create the servers' keys and the collective key
    let sks: Vec<RistrettoSecretKey> = (0..SERVERS).map(|_| SecretKey::random(&mut OsRng)).collect();
    let pks: Vec<RistrettoPublicKey> = sks.iter().map(RistrettoPublicKey::from_secret_key).collect();
    let collective_key = RistrettoPublicKey::collective(&pks);
    let collective_sk = RistrettoSecretKey::from_bytes(
        &sks.iter()
            .fold(Scalar::zero(), |acc, sk| acc + sk.as_scalar())
            .to_bytes(),
    )
    .context("summing secret keys")?;

    // every client contributes one row of line_size values
    let inputs: Vec<CipherVector> = (0..CLIENTS)
        .map(|c| {
            let values: Vec<u64> = (0..config.line_size).map(|j| (c * 100 + j) as u64).collect();
            encrypt_vector(&collective_key, &values, &mut OsRng)
        })
        .collect();

    let secret = Scalar::random(&mut OsRng);
    let table = config.load_table(&secret, &collective_key)?;
    info!(
        rows = table.len(),
        width = table.first().map_or(0, |row| row.width()),
        "precomputed table ready"
    );

    let g = RISTRETTO_BASEPOINT_POINT;
    let h = *collective_key.as_point();
    for precomputed in [None, Some(table.as_slice())] {
        let shuffle = Shuffle::shuffle_sequence(&mut OsRng, &inputs, &g, &h, precomputed)?;
        let pi = shuffle.permutation().as_slice();
        for (i, row) in shuffle.outputs().iter().enumerate() {
            for (out, inp) in row.iter().zip(inputs[pi[i]].iter()) {
                ensure!(
                    out.decrypt(&collective_sk) == inp.decrypt(&collective_sk),
                    "output {} does not decrypt like input {}",
                    i,
                    pi[i]
                );
            }
        }
        info!(
            precomputed = precomputed.is_some(),
            permutation = ?pi,
            first = %hex::encode(shuffle.outputs()[0][0].to_bytes()),
            "shuffled batch"
        );
    }
    Ok(())
}

//! Permutation and re-randomization of a batch of ciphertext rows.
//!
//! Each output row is a re-randomization of the input row selected by a
//! uniformly random permutation. The permutation and the blinding scalars are
//! kept so that a proof of shuffle can later be built over them.

use crate::{
    elgamal::{CipherText, CipherVector},
    error::ShuffleError,
    precompute::PrecomputedRow,
};
use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use rand::rngs::OsRng;
use rand::{CryptoRng, Rng};
use rayon::prelude::*;
use tracing::debug;

const LOG_TARGET: &str = "neffshuffle::shuffle";

/// Output slot to input row mapping, a bijection on `[0, n)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    perm: Vec<usize>,
}

impl Permutation {
    /// Draws a uniform permutation of `n` elements (Fisher-Yates).
    pub fn new<R: Rng + CryptoRng>(rng: &mut R, n: usize) -> Self {
        let mut permutation: Vec<usize> = (0..n).collect();
        for i in (1..permutation.len()).rev() {
            // invariant: elements with index > i have been locked in place.
            permutation.swap(i, rng.gen_range(0, i + 1));
        }
        Self { perm: permutation }
    }

    /// Set the permutation explicitly. Fails unless `perm` is a bijection on `[0, perm.len())`.
    pub fn from_vec(perm: Vec<usize>) -> Result<Self, ShuffleError> {
        let mut seen = vec![false; perm.len()];
        for &p in perm.iter() {
            if p >= perm.len() || seen[p] {
                return Err(ShuffleError::InvalidPermutation);
            }
            seen[p] = true;
        }
        Ok(Self { perm })
    }

    /// Inverse permutation, maps input row to output slot.
    pub fn invert(&self) -> Permutation {
        let mut inverse = vec![0; self.perm.len()];
        for (i, p) in self.perm.iter().enumerate() {
            inverse[*p] = i;
        }
        Permutation { perm: inverse }
    }

    /// Reorders `items` so that slot `i` holds `items[pi[i]]`.
    ///
    /// Returns `None` unless `items` has exactly one element per slot.
    pub fn apply<T: Clone>(&self, items: &[T]) -> Option<Vec<T>> {
        if items.len() != self.perm.len() {
            return None;
        }
        self.perm.iter().map(|p| items.get(*p).cloned()).collect()
    }

    /// `pi[i]` for every output slot `i`.
    pub fn as_slice(&self) -> &[usize] {
        &self.perm
    }

    /// Number of elements permuted.
    pub fn len(&self) -> usize {
        self.perm.len()
    }

    /// True for the permutation of zero elements.
    pub fn is_empty(&self) -> bool {
        self.perm.is_empty()
    }
}

/// A shuffled batch together with the secrets used to produce it.
#[derive(Debug, Clone)]
pub struct Shuffle {
    outputs: Vec<CipherVector>, //After shuffle and re-randomization   k x NQ
    pi: Permutation,            //outputs[i] comes from inputs[pi[i]]
    beta: Vec<Vec<Scalar>>,     //Blinding scalars applied to outputs[i]   k x NQ
}

impl Shuffle {
    /// Permutes and re-randomizes `inputs`.
    ///
    /// `g` and `h` are the generators of the re-encryption, typically the base
    /// point and the collective public key. `rng` draws the permutation and,
    /// when `precomputed` is given, the table row used for each output slot.
    /// Fresh blinding scalars are drawn inside each worker from `OsRng`.
    ///
    /// With a table, output row `i` adds the first NQ pairs of a uniformly
    /// chosen table row to its ciphertexts and reports that row's scalars as
    /// `beta[i]`. Every table row must be at least NQ wide.
    ///
    /// # Errors
    ///
    /// - `EmptyShuffle` if `inputs` is empty
    /// - `EmptyRow` if the rows hold no ciphertexts
    /// - `MismatchedRowLength` if the rows differ in length
    /// - `EmptyPrecomputedTable` if an empty table is supplied
    /// - `PrecomputedRowTooNarrow` if a table row is narrower than the input rows
    pub fn shuffle_sequence<R: Rng + CryptoRng>(
        rng: &mut R,
        inputs: &[CipherVector],
        g: &RistrettoPoint,
        h: &RistrettoPoint,
        precomputed: Option<&[PrecomputedRow]>,
    ) -> Result<Self, ShuffleError> {
        let nq = check_inputs(inputs)?;
        let k = inputs.len();

        // Pick a precomputed row for each output slot, independently of pi
        let chosen: Option<Vec<&PrecomputedRow>> = match precomputed {
            Some(table) => {
                check_table(table, nq)?;
                Some(
                    (0..k)
                        .map(|_| &table[rng.gen_range(0, table.len())])
                        .collect(),
                )
            }
            None => None,
        };

        let pi = Permutation::new(rng, k);
        debug!(
            target: LOG_TARGET,
            rows = k,
            width = nq,
            precomputed = chosen.is_some(),
            "shuffling sequence"
        );

        let perm = pi.as_slice();
        let shuffled: Vec<(CipherVector, Vec<Scalar>)> = (0..k)
            .into_par_iter()
            .map(|i| {
                let row = &inputs[perm[i]];
                match &chosen {
                    Some(rows) => shuffle_row_precomputed(row, rows[i]),
                    None => shuffle_row_fresh(row, g, h),
                }
            })
            .collect();
        let (outputs, beta) = shuffled.into_iter().unzip();

        Ok(Shuffle { outputs, pi, beta })
    }

    /// Shuffled rows, `outputs[i]` re-randomizes `inputs[pi[i]]`.
    pub fn outputs(&self) -> &[CipherVector] {
        &self.outputs
    }

    /// The permutation `pi`.
    pub fn permutation(&self) -> &Permutation {
        &self.pi
    }

    /// Blinding scalars, `beta[i]` applied to `outputs[i]`.
    pub fn beta(&self) -> &[Vec<Scalar>] {
        &self.beta
    }

    /// Splits into outputs, permutation and blinding scalars.
    pub fn into_parts(self) -> (Vec<CipherVector>, Permutation, Vec<Vec<Scalar>>) {
        (self.outputs, self.pi, self.beta)
    }
}

/// Free-function form of [`Shuffle::shuffle_sequence`].
pub fn shuffle_sequence<R: Rng + CryptoRng>(
    rng: &mut R,
    inputs: &[CipherVector],
    g: &RistrettoPoint,
    h: &RistrettoPoint,
    precomputed: Option<&[PrecomputedRow]>,
) -> Result<Shuffle, ShuffleError> {
    Shuffle::shuffle_sequence(rng, inputs, g, h, precomputed)
}

// returns NQ, the common row length
fn check_inputs(inputs: &[CipherVector]) -> Result<usize, ShuffleError> {
    let first = inputs.first().ok_or(ShuffleError::EmptyShuffle)?;
    let nq = first.len();
    if nq == 0 {
        return Err(ShuffleError::EmptyRow);
    }
    for (row, input) in inputs.iter().enumerate() {
        if input.len() != nq {
            return Err(ShuffleError::MismatchedRowLength {
                row,
                expected: nq,
                found: input.len(),
            });
        }
    }
    Ok(nq)
}

fn check_table(table: &[PrecomputedRow], nq: usize) -> Result<(), ShuffleError> {
    if table.is_empty() {
        return Err(ShuffleError::EmptyPrecomputedTable);
    }
    for (row, pre) in table.iter().enumerate() {
        if pre.width() < nq {
            return Err(ShuffleError::PrecomputedRowTooNarrow {
                row,
                width: pre.width(),
                required: nq,
            });
        }
    }
    Ok(())
}

fn shuffle_row_fresh(
    row: &[CipherText],
    g: &RistrettoPoint,
    h: &RistrettoPoint,
) -> (CipherVector, Vec<Scalar>) {
    let rerandomized: Vec<(CipherText, Scalar)> = row
        .par_iter()
        .map(|ct| {
            let b = Scalar::random(&mut OsRng);
            (ct.rerandomize(&b, &b, g, h), b)
        })
        .collect();
    rerandomized.into_iter().unzip()
}

fn shuffle_row_precomputed(
    row: &[CipherText],
    pre: &PrecomputedRow,
) -> (CipherVector, Vec<Scalar>) {
    let nq = row.len();
    let outputs = row
        .par_iter()
        .zip(pre.cipher_v()[..nq].par_iter())
        .map(|(ct, delta)| ct.add_delta(delta))
        .collect();
    (outputs, pre.s()[..nq].to_vec())
}

// ------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        elgamal::encrypt_vector,
        keys::{PublicKey, SecretKey},
        precompute::create_precomputed_randomize,
        ristretto::{RistrettoPublicKey, RistrettoSecretKey},
    };
    use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
    use itertools::Itertools;
    use std::collections::HashMap;

    fn setup(k: usize, nq: usize) -> (RistrettoSecretKey, RistrettoPublicKey, Vec<CipherVector>) {
        let mut rng = rand::thread_rng();
        let sk: RistrettoSecretKey = SecretKey::random(&mut rng);
        let pk = RistrettoPublicKey::from_secret_key(&sk);
        let inputs = (0..k)
            .map(|i| {
                let values: Vec<u64> = (0..nq).map(|j| (10 * i + j) as u64).collect();
                encrypt_vector(&pk, &values, &mut rng)
            })
            .collect();
        (sk, pk, inputs)
    }

    fn assert_bijection(pi: &Permutation, n: usize) {
        let mut sorted = pi.as_slice().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn permutation_test() {
        let pi = Permutation::new(&mut OsRng, 9);
        assert_eq!(pi.len(), 9);
        assert_bijection(&pi, 9);
        assert!(Permutation::new(&mut OsRng, 0).is_empty());
    }

    #[test]
    fn inverse_permutation_test() {
        let pi = Permutation::new(&mut OsRng, 9);
        let inv = pi.invert();
        for i in 0..9 {
            assert_eq!(inv.as_slice()[pi.as_slice()[i]], i);
        }
        let items: Vec<usize> = (100..109).collect();
        let permuted = pi.apply(&items).unwrap();
        assert_eq!(inv.apply(&permuted), Some(items));
    }

    #[test]
    fn permutation_from_vec_test() {
        let pi = Permutation::from_vec(vec![2, 0, 1]).unwrap();
        assert_eq!(pi.apply(&['a', 'b', 'c']), Some(vec!['c', 'a', 'b']));
        assert_eq!(pi.apply(&['a', 'b']), None);
        assert_eq!(pi.apply(&['a', 'b', 'c', 'd']), None);
        assert_eq!(
            Permutation::from_vec(vec![0, 0, 1]),
            Err(ShuffleError::InvalidPermutation)
        );
        assert_eq!(
            Permutation::from_vec(vec![0, 3, 1]),
            Err(ShuffleError::InvalidPermutation)
        );
    }

    #[test]
    fn permutation_uniformity_test() {
        // chi-square over the 6 permutations of 3 elements, 5 degrees of freedom
        let trials = 60_000;
        let mut rng = rand::thread_rng();
        let mut counts: HashMap<Vec<usize>, usize> = (0..3usize)
            .permutations(3)
            .map(|p| (p, 0))
            .collect();
        for _ in 0..trials {
            let pi = Permutation::new(&mut rng, 3);
            *counts.get_mut(pi.as_slice()).unwrap() += 1;
        }
        assert_eq!(counts.len(), 6);
        let expected = trials as f64 / 6.0;
        let chi_square: f64 = counts
            .values()
            .map(|&o| (o as f64 - expected).powi(2) / expected)
            .sum();
        // p < 0.0001 critical value is 25.74
        assert!(chi_square < 25.74, "chi-square {}", chi_square);
    }

    #[test]
    fn shuffle_sequence_rederive_test() {
        let (_, pk, inputs) = setup(3, 2);
        let g = RISTRETTO_BASEPOINT_POINT;
        let h = *pk.as_point();
        let shuffle = shuffle_sequence(&mut OsRng, &inputs, &g, &h, None).unwrap();

        assert_eq!(shuffle.outputs().len(), 3);
        assert!(shuffle.outputs().iter().all(|row| row.len() == 2));
        assert_bijection(shuffle.permutation(), 3);
        assert!(shuffle.beta().iter().all(|b| b.len() == 2));

        let perm = shuffle.permutation().as_slice();
        for i in 0..3 {
            for j in 0..2 {
                let b = shuffle.beta()[i][j];
                let expected = CipherText::new(
                    inputs[perm[i]][j].k + b * g,
                    inputs[perm[i]][j].c + b * h,
                );
                assert_eq!(shuffle.outputs()[i][j], expected);
            }
        }
    }

    #[test]
    fn shuffle_keeps_plaintexts_test() {
        let (sk, pk, inputs) = setup(5, 3);
        let shuffle = Shuffle::shuffle_sequence(
            &mut rand::thread_rng(),
            &inputs,
            &RISTRETTO_BASEPOINT_POINT,
            pk.as_point(),
            None,
        )
        .unwrap();
        let (outputs, pi, _) = shuffle.into_parts();
        let expected = pi.apply(&inputs).unwrap();
        for (out, inp) in outputs.iter().zip(expected.iter()) {
            for (o, i) in out.iter().zip(inp.iter()) {
                assert_ne!(o, i);
                assert_eq!(o.decrypt(&sk), i.decrypt(&sk));
            }
        }
    }

    #[test]
    fn shuffle_precomputed_test() {
        let (sk, pk, inputs) = setup(4, 2);
        let g = RISTRETTO_BASEPOINT_POINT;
        let h = *pk.as_point();
        let mut rng = rand::thread_rng();
        let table = create_precomputed_randomize(&g, &h, &mut OsRng, 4, 3);

        let shuffle = shuffle_sequence(&mut rng, &inputs, &g, &h, Some(table.as_slice())).unwrap();
        let perm = shuffle.permutation().as_slice();
        for i in 0..4 {
            // beta[i] is the prefix of one of the table rows
            let source = table
                .iter()
                .find(|row| &row.s()[..2] == shuffle.beta()[i].as_slice())
                .expect("beta comes from the table");
            for j in 0..2 {
                let input = inputs[perm[i]][j];
                let output = shuffle.outputs()[i][j];
                assert_eq!(output, input + source.cipher_v()[j]);
                let b = shuffle.beta()[i][j];
                assert_eq!(output - input, CipherText::new(b * g, b * h));
                assert_eq!(output.decrypt(&sk), input.decrypt(&sk));
            }
        }
    }

    #[test]
    fn mismatched_rows_test() {
        let (_, pk, mut inputs) = setup(3, 2);
        inputs[2].pop();
        let result = shuffle_sequence(
            &mut OsRng,
            &inputs,
            &RISTRETTO_BASEPOINT_POINT,
            pk.as_point(),
            None,
        );
        assert_eq!(
            result.unwrap_err(),
            ShuffleError::MismatchedRowLength {
                row: 2,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn empty_inputs_test() {
        let (_, pk, _) = setup(0, 0);
        let g = RISTRETTO_BASEPOINT_POINT;
        let result = shuffle_sequence(&mut OsRng, &[], &g, pk.as_point(), None);
        assert_eq!(result.unwrap_err(), ShuffleError::EmptyShuffle);
        let result = shuffle_sequence(&mut OsRng, &[vec![], vec![]], &g, pk.as_point(), None);
        assert_eq!(result.unwrap_err(), ShuffleError::EmptyRow);
    }

    #[test]
    fn narrow_precomputed_table_test() {
        let (_, pk, inputs) = setup(3, 3);
        let g = RISTRETTO_BASEPOINT_POINT;
        let h = *pk.as_point();
        let table = create_precomputed_randomize(&g, &h, &mut OsRng, 2, 2);
        let result = shuffle_sequence(&mut OsRng, &inputs, &g, &h, Some(table.as_slice()));
        assert_eq!(
            result.unwrap_err(),
            ShuffleError::PrecomputedRowTooNarrow {
                row: 0,
                width: 2,
                required: 3
            }
        );
        let result = shuffle_sequence(&mut OsRng, &inputs, &g, &h, Some(&[][..]));
        assert_eq!(result.unwrap_err(), ShuffleError::EmptyPrecomputedTable);
    }
}

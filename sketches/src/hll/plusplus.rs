// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::hash::Hash;

use crate::error::Error;
use crate::hash::DEFAULT_SKETCH_SEED;
use crate::hash::SketchHasher;
use crate::hll::BiasTable;
use crate::hll::MAX_PRECISION;
use crate::hll::MIN_PRECISION;
use crate::hll::linear_counting;
use crate::hll::rank;
use crate::hll::raw_estimate;
use crate::traits::CardinalityEstimator;

/// Published thresholds for switching from linear counting to the
/// corrected raw estimate, indexed by `precision - 4`.
const THRESHOLD: [u32; 15] = [
    10,      // precision 4
    20,      // precision 5
    40,      // precision 6
    80,      // precision 7
    220,     // precision 8
    400,     // precision 9
    900,     // precision 10
    1800,    // precision 11
    3100,    // precision 12
    6500,    // precision 13
    11500,   // precision 14
    20000,   // precision 15
    50000,   // precision 16
    120000,  // precision 17
    350000,  // precision 18
];

/// HyperLogLog++ cardinality estimator.
///
/// Replaces the classic corrections with the published empirical
/// machinery: linear counting below a per-precision threshold, then the
/// raw estimate corrected by a bias looked up in a [`BiasTable`]. The
/// table is a replaceable parameter; where it holds no data for the
/// sketch's precision, the estimator falls back to the bias-free
/// histogram form, which needs no empirical constants.
///
/// The 64-bit hash space makes the classic large-range correction
/// unnecessary.
#[derive(Debug, Clone, PartialEq)]
pub struct HyperLogLogPlusPlus {
    hasher: SketchHasher,
    precision: u8,
    registers: Vec<u8>,
    bias_table: BiasTable,
}

impl HyperLogLogPlusPlus {
    /// Creates a sketch with precision `p`, the default seed, and the
    /// built-in bias table for that precision.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind)
    /// when precision is outside `[4, 18]`.
    pub fn new(precision: u8) -> Result<Self, Error> {
        Self::with_seed(precision, DEFAULT_SKETCH_SEED)
    }

    /// Creates a sketch with precision `p` over an explicit seed.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind)
    /// when precision is outside `[4, 18]`.
    pub fn with_seed(precision: u8, seed: u64) -> Result<Self, Error> {
        Self::with_bias_table(precision, seed, BiasTable::builtin(precision))
    }

    /// Creates a sketch with an explicit bias table, for callers carrying
    /// the full published data for their precision.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind)
    /// when precision is outside `[4, 18]`.
    pub fn with_bias_table(precision: u8, seed: u64, bias_table: BiasTable) -> Result<Self, Error> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            return Err(Error::invalid_argument(
                "precision must be in the inclusive range [4, 18]",
            )
            .with_context("precision", precision));
        }

        Ok(Self {
            hasher: SketchHasher::with_seed(seed),
            precision,
            registers: vec![0; 1_usize << precision],
            bias_table,
        })
    }

    /// Returns the configured precision.
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Returns the number of registers (`2^precision`).
    pub fn register_count(&self) -> usize {
        self.registers.len()
    }

    /// Returns the hash seed.
    pub fn seed(&self) -> u64 {
        self.hasher.seed()
    }

    /// Returns the theoretical relative error: `1.04 / sqrt(m)`.
    pub fn expected_relative_error(&self) -> f64 {
        1.04 / (self.register_count() as f64).sqrt()
    }

    /// Returns `true` if no item has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.registers.iter().all(|&register| register == 0)
    }

    /// Adds one item to the sketch.
    pub fn add<T: Hash>(&mut self, item: &T) {
        let hash = self.hasher.hash64(item);
        let index = (hash >> (64 - u32::from(self.precision))) as usize;
        let rank = rank(hash, self.precision);

        if rank > self.registers[index] {
            self.registers[index] = rank;
        }
    }

    /// Returns the estimated cardinality as `f64`.
    pub fn estimate(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }

        let m = self.register_count();
        let zeros = self.registers.iter().filter(|&&r| r == 0).count();
        if zeros > 0 {
            let lc = linear_counting(m, zeros);
            if lc <= f64::from(THRESHOLD[(self.precision - MIN_PRECISION) as usize]) {
                return lc;
            }
        }

        if self.bias_table.is_empty() {
            return self.histogram_estimate();
        }

        let raw = raw_estimate(&self.registers);
        if raw <= 5.0 * m as f64 {
            raw - self.bias_table.bias_for(raw)
        } else {
            raw
        }
    }

    /// Returns the estimated cardinality rounded to `u64`.
    pub fn count(&self) -> u64 {
        self.estimate().round() as u64
    }

    /// Merges another sketch into this one by register-wise max.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::IncompatibleMerge`](crate::error::ErrorKind)
    /// when precision or seed differs.
    pub fn merge(&mut self, other: &Self) -> Result<(), Error> {
        if self.precision != other.precision {
            return Err(Error::incompatible_merge("precision must match for merge")
                .with_context("left", self.precision)
                .with_context("right", other.precision));
        }
        if self.hasher != other.hasher {
            return Err(Error::incompatible_merge("hash seed must match for merge"));
        }

        for (left, right) in self.registers.iter_mut().zip(other.registers.iter()) {
            *left = (*left).max(*right);
        }
        Ok(())
    }

    /// Bias-free estimator over the register-value histogram (Ertl's
    /// sigma/tau form). Accurate across the full range without empirical
    /// data, used whenever the bias table has no points.
    fn histogram_estimate(&self) -> f64 {
        let m = self.register_count();
        let q = 64 - u32::from(self.precision);
        let histogram = self.register_histogram(q);

        let mut denominator =
            m as f64 * tau(1.0 - f64::from(histogram[q as usize + 1]) / m as f64);
        for k in (1..=q).rev() {
            denominator += f64::from(histogram[k as usize]);
            denominator *= 0.5;
        }
        denominator += m as f64 * sigma(f64::from(histogram[0]) / m as f64);

        let m_sq_alpha_inf = (m as f64 / (2.0 * std::f64::consts::LN_2)) * m as f64;
        m_sq_alpha_inf / denominator
    }

    /// Histogram[v] = number of registers holding value v, for v in
    /// `0..=q+1`.
    fn register_histogram(&self, q: u32) -> Vec<u32> {
        let mut histogram = vec![0_u32; q as usize + 2];
        for &register in &self.registers {
            histogram[register as usize] += 1;
        }
        histogram
    }
}

impl CardinalityEstimator for HyperLogLogPlusPlus {
    fn add<T: Hash>(&mut self, item: &T) {
        HyperLogLogPlusPlus::add(self, item)
    }

    fn estimate(&self) -> f64 {
        HyperLogLogPlusPlus::estimate(self)
    }

    fn merge(&mut self, other: &Self) -> Result<(), Error> {
        HyperLogLogPlusPlus::merge(self, other)
    }

    fn memory_bytes(&self) -> usize {
        self.registers.len() * size_of::<u8>()
    }

    fn fill_ratio(&self) -> f64 {
        let nonzero = self.registers.iter().filter(|&&r| r != 0).count();
        nonzero as f64 / self.registers.len() as f64
    }

    fn relative_error(&self) -> f64 {
        self.expected_relative_error()
    }
}

/// Sigma series for the zero-register share:
/// `sigma(x) = x + sum_k x^(2^k) * 2^(k-1)`.
fn sigma(x: f64) -> f64 {
    debug_assert!((0.0..=1.0).contains(&x));
    if x == 1.0 {
        return f64::INFINITY;
    }

    let mut sigma_x = x;
    let mut x_pow = x;
    let mut y = 1.0;
    loop {
        let prev = sigma_x;
        x_pow *= x_pow;
        sigma_x += x_pow * y;
        y += y;
        if sigma_x == prev {
            return sigma_x;
        }
    }
}

/// Tau series for the saturated-register share:
/// `tau(x) = (1 - x - sum_k (1 - x^(2^-k))^2 * 2^-k) / 3`.
fn tau(x: f64) -> f64 {
    debug_assert!((0.0..=1.0).contains(&x));
    if x == 0.0 || x == 1.0 {
        return 0.0;
    }

    let mut tau_x = 1.0 - x;
    let mut x_root = x;
    let mut y = 1.0;
    loop {
        let prev = tau_x;
        x_root = x_root.sqrt();
        y /= 2.0;
        tau_x -= (1.0 - x_root).powi(2) * y;
        if tau_x == prev {
            return tau_x / 3.0;
        }
    }
}

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

//! HyperLogLog cardinality estimators.
//!
//! Both variants route each hashed item to one of `m = 2^p` registers by
//! its top `p` bits and keep, per register, the maximum rank (position of
//! the leftmost 1-bit) observed in the remaining bits. The harmonic mean
//! of `2^-register` across all registers yields the raw estimate, scaled
//! by the `alpha_m` bias-correction constant.
//!
//! - [`HyperLogLog`] applies the classic corrections: linear counting in
//!   the small range and a large-range correction for the 64-bit hash
//!   space.
//! - [`HyperLogLogPlusPlus`] applies the published empirical machinery:
//!   linear counting below a per-precision threshold, then bias
//!   subtraction from a replaceable lookup table, with a bias-free
//!   histogram estimator for precisions the table does not cover.
//!
//! Merging takes the register-wise maximum, which makes merge
//! commutative, associative, and idempotent, and makes the merged sketch
//! indistinguishable from one fed the union of both input streams.
//!
//! # References
//!
//! - Flajolet et al. (2007). "HyperLogLog: the analysis of a near-optimal
//!   cardinality estimation algorithm"
//! - Heule, Nunkesser and Hall (2013). "HyperLogLog in Practice"
//! - Ertl (2017). "New cardinality estimation algorithms for HyperLogLog
//!   sketches"

mod bias;
mod plusplus;
mod sketch;

pub use self::bias::BiasTable;
pub use self::plusplus::HyperLogLogPlusPlus;
pub use self::sketch::HyperLogLog;

pub(crate) const MIN_PRECISION: u8 = 4;
pub(crate) const MAX_PRECISION: u8 = 18;

/// Returns the bias-correction constant for register count `m`.
pub(crate) fn alpha(m: usize) -> f64 {
    match m {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / m as f64),
    }
}

/// Returns the rank of the first set bit in the hash suffix (1-indexed),
/// capped by the suffix width.
pub(crate) fn rank(hash: u64, precision: u8) -> u8 {
    let suffix = hash << precision;
    let max_rank = 64 - u32::from(precision) + 1;
    let rank = suffix.leading_zeros() + 1;
    rank.min(max_rank) as u8
}

/// Linear counting estimator `m * ln(m / zeros)` for the small range.
pub(crate) fn linear_counting(m: usize, zeros: usize) -> f64 {
    debug_assert!(zeros > 0 && zeros <= m);
    (m as f64) * ((m as f64) / (zeros as f64)).ln()
}

/// Raw estimate: harmonic mean of `2^-register`, scaled by `alpha_m * m^2`.
pub(crate) fn raw_estimate(registers: &[u8]) -> f64 {
    let harmonic_sum = registers
        .iter()
        .map(|&register| 2_f64.powi(-i32::from(register)))
        .sum::<f64>();
    let m = registers.len() as f64;
    alpha(registers.len()) * m * m / harmonic_sum
}

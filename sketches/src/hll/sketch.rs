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
use crate::hll::MAX_PRECISION;
use crate::hll::MIN_PRECISION;
use crate::hll::linear_counting;
use crate::hll::rank;
use crate::hll::raw_estimate;
use crate::traits::CardinalityEstimator;

/// Approximate distinct counter using the classic HyperLogLog estimator
/// with small-range linear counting and 64-bit large-range correction.
///
/// # Example
/// ```rust
/// use sketches::hll::HyperLogLog;
///
/// let mut hll = HyperLogLog::new(12)?;
/// for i in 0..10_000_u64 {
///     hll.add(&i);
/// }
///
/// let estimate = hll.count();
/// assert!(estimate > 9_000 && estimate < 11_000);
/// # Ok::<(), sketches::error::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HyperLogLog {
    pub(super) hasher: SketchHasher,
    pub(super) precision: u8,
    pub(super) registers: Vec<u8>,
}

impl HyperLogLog {
    /// Creates a HyperLogLog with precision `p` and the default seed.
    ///
    /// Register count is `2^p`. Valid range is `[4, 18]`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind)
    /// when precision is out of range.
    pub fn new(precision: u8) -> Result<Self, Error> {
        Self::with_seed(precision, DEFAULT_SKETCH_SEED)
    }

    /// Creates a HyperLogLog with precision `p` over an explicit seed.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind)
    /// when precision is out of range.
    pub fn with_seed(precision: u8, seed: u64) -> Result<Self, Error> {
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
        })
    }

    /// Creates a HyperLogLog from a target relative error.
    ///
    /// The target must be in `(0, 1)`. Internally this computes
    /// `p = ceil(log2((1.04 / error)^2))`, clamped to `[4, 18]`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind)
    /// when `relative_error` is invalid.
    pub fn with_error_rate(relative_error: f64) -> Result<Self, Error> {
        if !relative_error.is_finite() || relative_error <= 0.0 || relative_error >= 1.0 {
            return Err(Error::invalid_argument(
                "relative_error must be finite and strictly between 0 and 1",
            )
            .with_context("relative_error", relative_error));
        }

        let required_registers = (1.04 / relative_error).powi(2);
        let raw_precision = required_registers.log2().ceil() as u8;
        Self::new(raw_precision.clamp(MIN_PRECISION, MAX_PRECISION))
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

        let m = self.register_count() as f64;
        let raw = raw_estimate(&self.registers);
        let zero_registers = self.registers.iter().filter(|&&r| r == 0).count();

        // Small-range correction (linear counting).
        let corrected_small = if raw <= 2.5 * m && zero_registers > 0 {
            linear_counting(self.register_count(), zero_registers)
        } else {
            raw
        };

        // Large-range correction in the 64-bit hash space.
        let two_to_64 = (u64::MAX as f64) + 1.0;
        if corrected_small > two_to_64 / 30.0 {
            let ratio = (corrected_small / two_to_64).min(1.0 - f64::EPSILON);
            -two_to_64 * (1.0 - ratio).ln()
        } else {
            corrected_small
        }
    }

    /// Returns the estimated cardinality rounded to `u64`.
    pub fn count(&self) -> u64 {
        self.estimate().round() as u64
    }

    /// Merges another HyperLogLog into this sketch by register-wise max.
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
}

impl CardinalityEstimator for HyperLogLog {
    fn add<T: Hash>(&mut self, item: &T) {
        HyperLogLog::add(self, item)
    }

    fn estimate(&self) -> f64 {
        HyperLogLog::estimate(self)
    }

    fn merge(&mut self, other: &Self) -> Result<(), Error> {
        HyperLogLog::merge(self, other)
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

#[cfg(test)]
mod tests {
    use super::HyperLogLog;

    #[test]
    fn test_precision_range_is_enforced() {
        assert!(HyperLogLog::new(3).is_err());
        assert!(HyperLogLog::new(4).is_ok());
        assert!(HyperLogLog::new(18).is_ok());
        assert!(HyperLogLog::new(19).is_err());
    }

    #[test]
    fn test_error_rate_constructor_validates_input() {
        assert!(HyperLogLog::with_error_rate(0.0).is_err());
        assert!(HyperLogLog::with_error_rate(1.0).is_err());
        assert!(HyperLogLog::with_error_rate(f64::NAN).is_err());
        assert!(HyperLogLog::with_error_rate(0.05).is_ok());
    }

    #[test]
    fn test_empty_sketch_estimates_zero() {
        let hll = HyperLogLog::new(12).unwrap();
        assert!(hll.is_empty());
        assert_eq!(hll.count(), 0);
    }

    #[test]
    fn test_duplicate_insertions_do_not_grow_cardinality() {
        let mut hll = HyperLogLog::new(12).unwrap();
        for _ in 0..1_000 {
            hll.add(&"same-key");
        }
        assert!(hll.count() <= 3);
    }

    #[test]
    fn test_estimate_is_reasonable_for_medium_cardinality() {
        let mut hll = HyperLogLog::new(12).unwrap();
        let exact = 10_000_u64;

        for value in 0..exact {
            hll.add(&value);
        }

        let estimate = hll.count();
        let relative_error = (estimate as f64 - exact as f64).abs() / exact as f64;
        assert!(
            relative_error <= 0.10,
            "estimate={estimate} exact={exact} rel_error={relative_error}"
        );
    }

    #[test]
    fn test_merge_combines_observations() {
        let mut left = HyperLogLog::new(12).unwrap();
        let mut right = HyperLogLog::new(12).unwrap();

        for value in 0_u64..7_500 {
            left.add(&value);
        }
        for value in 7_500_u64..15_000 {
            right.add(&value);
        }

        left.merge(&right).unwrap();
        let estimate = left.count();
        let exact = 15_000_u64;
        let relative_error = (estimate as f64 - exact as f64).abs() / exact as f64;
        assert!(
            relative_error <= 0.12,
            "estimate={estimate} exact={exact} rel_error={relative_error}"
        );
    }

    #[test]
    fn test_merge_rejects_mismatched_precision() {
        let mut left = HyperLogLog::new(10).unwrap();
        let right = HyperLogLog::new(11).unwrap();
        assert!(left.merge(&right).is_err());
    }

    #[test]
    fn test_merge_rejects_mismatched_seed() {
        let mut left = HyperLogLog::with_seed(12, 1).unwrap();
        let right = HyperLogLog::with_seed(12, 2).unwrap();
        assert!(left.merge(&right).is_err());
    }

    #[test]
    fn test_expected_error_matches_register_count() {
        let hll = HyperLogLog::new(10).unwrap();
        let expected = 1.04 / (hll.register_count() as f64).sqrt();
        assert!((hll.expected_relative_error() - expected).abs() < 1e-12);
    }
}

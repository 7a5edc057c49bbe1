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
use crate::traits::FrequencySketch;

const MAX_TABLE_ENTRIES: usize = 1 << 30;

/// Count Sketch for unbiased signed frequency estimation.
///
/// A table of `num_hashes` rows by `num_buckets` signed counters, with an
/// independent `{+1, -1}` sign hash per row. Estimates are the median of
/// the sign-corrected row counters.
#[derive(Debug, Clone, PartialEq)]
pub struct CountSketch {
    num_hashes: u8,
    num_buckets: u32,
    hasher: SketchHasher,
    index_hashers: Vec<SketchHasher>,
    sign_hashers: Vec<SketchHasher>,
    total_weight: u64,
    counts: Vec<i64>,
}

impl CountSketch {
    /// Creates a new Count Sketch with the default seed.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind) if
    /// `num_hashes` is 0, `num_buckets` is less than 3, or the total
    /// table size exceeds the supported limit.
    pub fn new(num_hashes: u8, num_buckets: u32) -> Result<Self, Error> {
        Self::with_seed(num_hashes, num_buckets, DEFAULT_SKETCH_SEED)
    }

    /// Creates a new Count Sketch with the provided seed.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind) if
    /// `num_hashes` is 0, `num_buckets` is less than 3, or the total
    /// table size exceeds the supported limit.
    pub fn with_seed(num_hashes: u8, num_buckets: u32, seed: u64) -> Result<Self, Error> {
        if num_hashes == 0 {
            return Err(Error::invalid_argument("num_hashes must be at least 1"));
        }
        if num_buckets < 3 {
            return Err(Error::invalid_argument("num_buckets must be at least 3")
                .with_context("num_buckets", num_buckets));
        }
        let entries = num_hashes as usize * num_buckets as usize;
        if entries >= MAX_TABLE_ENTRIES {
            return Err(Error::invalid_argument(format!(
                "num_hashes * num_buckets must be < {MAX_TABLE_ENTRIES}"
            )));
        }

        let hasher = SketchHasher::with_seed(seed);
        // Two independent families per row: index selection and sign.
        let mut row_seeds = hasher.derive_row_seeds(2 * num_hashes as usize);
        let sign_hashers = row_seeds
            .split_off(num_hashes as usize)
            .into_iter()
            .map(SketchHasher::with_seed)
            .collect();
        let index_hashers = row_seeds.into_iter().map(SketchHasher::with_seed).collect();

        Ok(CountSketch {
            num_hashes,
            num_buckets,
            hasher,
            index_hashers,
            sign_hashers,
            total_weight: 0,
            counts: vec![0; entries],
        })
    }

    /// Returns the number of hash functions (rows) used by the sketch.
    pub fn num_hashes(&self) -> u8 {
        self.num_hashes
    }

    /// Returns the number of buckets per hash function.
    pub fn num_buckets(&self) -> u32 {
        self.num_buckets
    }

    /// Returns the seed used by the sketch.
    pub fn seed(&self) -> u64 {
        self.hasher.seed()
    }

    /// Returns the total absolute weight inserted into the sketch.
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Returns true if the sketch has not seen any non-zero updates.
    pub fn is_empty(&self) -> bool {
        self.total_weight == 0
    }

    /// Suggests the number of buckets to achieve the given relative error.
    ///
    /// Count Sketch needs `3/eps^2` buckets for an `eps`-relative error
    /// guarantee, quadratically more than Count-Min for the same target.
    ///
    /// # Panics
    ///
    /// Panics if `relative_error` is not positive.
    pub fn suggest_num_buckets(relative_error: f64) -> u32 {
        assert!(relative_error > 0.0, "relative_error must be positive");
        (3.0 / (relative_error * relative_error)).ceil() as u32
    }

    /// Suggests the number of hashes to achieve the given confidence.
    ///
    /// # Panics
    ///
    /// Panics if `confidence` is not in [0, 1].
    pub fn suggest_num_hashes(confidence: f64) -> u8 {
        assert!(
            (0.0..=1.0).contains(&confidence),
            "confidence must be between 0 and 1.0 (inclusive)"
        );
        if confidence == 1.0 {
            return 127;
        }
        let hashes = (1.0 / (1.0 - confidence)).ln().ceil();
        hashes.clamp(1.0, 127.0) as u8
    }

    /// Updates the sketch with a signed delta for the item.
    ///
    /// Negative deltas subtract, enabling difference estimation between
    /// two streams fed into the same sketch.
    pub fn update<T: Hash>(&mut self, item: &T, delta: i64) {
        if delta == 0 {
            return;
        }
        self.total_weight = self.total_weight.saturating_add(delta.unsigned_abs());

        let num_buckets = self.num_buckets as usize;
        for row in 0..self.num_hashes as usize {
            let bucket = (self.index_hashers[row].hash64(item) % self.num_buckets as u64) as usize;
            let index = row * num_buckets + bucket;
            let signed = delta.saturating_mul(self.sign(row, item));
            self.counts[index] = self.counts[index].saturating_add(signed);
        }
    }

    /// Returns the estimated frequency of the given item: the median of
    /// the sign-corrected row counters.
    ///
    /// Unbiased, but can under- or over-estimate the true count.
    pub fn estimate<T: Hash>(&self, item: &T) -> i64 {
        let num_buckets = self.num_buckets as usize;
        let mut corrected: Vec<i64> = (0..self.num_hashes as usize)
            .map(|row| {
                let bucket =
                    (self.index_hashers[row].hash64(item) % self.num_buckets as u64) as usize;
                let index = row * num_buckets + bucket;
                self.counts[index].saturating_mul(self.sign(row, item))
            })
            .collect();
        corrected.sort_unstable();

        let mid = corrected.len() / 2;
        if corrected.len() % 2 == 1 {
            corrected[mid]
        } else {
            // Even row counts average the two central values.
            (corrected[mid - 1] + corrected[mid]) / 2
        }
    }

    /// Merges another sketch into this one by element-wise addition.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::IncompatibleMerge`](crate::error::ErrorKind)
    /// when the sketches differ in shape or seed.
    pub fn merge(&mut self, other: &CountSketch) -> Result<(), Error> {
        if self.num_hashes != other.num_hashes
            || self.num_buckets != other.num_buckets
            || self.hasher != other.hasher
        {
            return Err(Error::incompatible_merge(
                "sketches differ in shape or seed",
            ));
        }

        for (dst, src) in self.counts.iter_mut().zip(other.counts.iter()) {
            *dst = dst.saturating_add(*src);
        }
        self.total_weight = self.total_weight.saturating_add(other.total_weight);
        Ok(())
    }

    /// The row's `{+1, -1}` sign for an item.
    fn sign<T: Hash>(&self, row: usize, item: &T) -> i64 {
        if self.sign_hashers[row].hash64(item) & 1 == 0 {
            1
        } else {
            -1
        }
    }
}

impl FrequencySketch for CountSketch {
    fn update<T: Hash>(&mut self, item: &T, delta: u64) {
        CountSketch::update(self, item, delta.min(i64::MAX as u64) as i64);
    }

    fn estimate<T: Hash>(&self, item: &T) -> i64 {
        CountSketch::estimate(self, item)
    }

    fn memory_bytes(&self) -> usize {
        self.counts.len() * size_of::<i64>()
    }

    fn fill_ratio(&self) -> f64 {
        let nonzero = self.counts.iter().filter(|&&count| count != 0).count();
        nonzero as f64 / self.counts.len() as f64
    }

    /// Two-sided error bound: `sqrt(3/num_buckets) * total_weight`, the
    /// L1-weight form of the Count Sketch guarantee.
    fn error_bound(&self) -> f64 {
        (3.0 / self.num_buckets as f64).sqrt() * self.total_weight as f64
    }
}

#[cfg(test)]
mod tests {
    use super::CountSketch;
    use crate::error::ErrorKind;

    #[test]
    fn test_init_defaults() {
        let sketch = CountSketch::new(3, 64).unwrap();
        assert_eq!(sketch.num_hashes(), 3);
        assert_eq!(sketch.num_buckets(), 64);
        assert_eq!(sketch.seed(), 9001);
        assert!(sketch.is_empty());
        assert_eq!(sketch.estimate(&"missing"), 0);
    }

    #[test]
    fn test_single_key_exact() {
        let mut sketch = CountSketch::new(5, 256).unwrap();
        sketch.update(&"key", 100);
        assert_eq!(sketch.estimate(&"key"), 100);
    }

    #[test]
    fn test_signed_updates() {
        let mut sketch = CountSketch::new(5, 256).unwrap();
        sketch.update(&"cat", 5);
        sketch.update(&"cat", -2);
        assert_eq!(sketch.estimate(&"cat"), 3);
        assert_eq!(sketch.total_weight(), 7);
    }

    #[test]
    fn test_difference_estimation_goes_negative() {
        let mut sketch = CountSketch::new(5, 256).unwrap();
        // Stream A adds, stream B subtracts: B saw "gone" more often.
        sketch.update(&"gone", 3);
        sketch.update(&"gone", -10);
        assert_eq!(sketch.estimate(&"gone"), -7);
    }

    #[test]
    fn test_estimates_are_near_truth_under_load() {
        let mut sketch = CountSketch::with_seed(7, 1024, 11).unwrap();
        for i in 0_u64..10_000 {
            sketch.update(&(i % 100), 1);
        }
        // Each key appears 100 times; the median estimate stays within
        // the coarse two-sided bound for this shape.
        for key in 0_u64..100 {
            let estimate = sketch.estimate(&key);
            assert!(
                (estimate - 100).abs() <= 80,
                "key={key} estimate={estimate}"
            );
        }
    }

    #[test]
    fn test_merge() {
        let mut left = CountSketch::new(5, 256).unwrap();
        let mut right = CountSketch::new(5, 256).unwrap();
        left.update(&"a", 10);
        right.update(&"a", 4);
        right.update(&"b", 4);
        left.merge(&right).unwrap();
        assert_eq!(left.estimate(&"a"), 14);
        assert_eq!(left.estimate(&"b"), 4);
    }

    #[test]
    fn test_merge_incompatible_seed() {
        let mut left = CountSketch::with_seed(5, 256, 1).unwrap();
        let right = CountSketch::with_seed(5, 256, 2).unwrap();
        let err = left.merge(&right).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleMerge);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(CountSketch::new(0, 64).is_err());
        assert!(CountSketch::new(3, 2).is_err());
    }
}

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
use crate::hash::splitmix64;
use crate::traits::MembershipFilter;
use crate::traits::MembershipQuery;

/// Fingerprint slots per bucket.
const BUCKET_SLOTS: usize = 4;
/// Default bound on the eviction walk.
const DEFAULT_MAX_KICKS: usize = 500;
/// Target load factor used when sizing from an expected item count.
const DESIGN_LOAD_FACTOR: f64 = 0.95;

/// Approximate set-membership filter with support for deletion.
///
/// Stores nonzero fingerprints in 4-slot buckets; zero marks an empty
/// slot. The bucket count is a power of two so the partial-key alternate
/// index stays in range under XOR.
///
/// A failed insert rolls its eviction walk back, so the filter is exactly
/// in its pre-call state when `CapacityExceeded` is returned.
#[derive(Debug, Clone)]
pub struct CuckooFilter {
    hasher: SketchHasher,
    buckets: Vec<[u16; BUCKET_SLOTS]>,
    fingerprint_bits: u8,
    max_kicks: usize,
    inserted_items: u64,
    rng_state: u64,
}

impl CuckooFilter {
    /// Creates a filter from expected inserts and target false-positive
    /// rate, with the default seed.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind) for
    /// invalid inputs.
    pub fn new(expected_items: usize, false_positive_rate: f64) -> Result<Self, Error> {
        Self::with_seed(expected_items, false_positive_rate, DEFAULT_SKETCH_SEED)
    }

    /// Creates a filter from expected inserts and target false-positive
    /// rate over an explicit seed.
    ///
    /// The fingerprint width is chosen as `ceil(log2(1/fpp)) + log2(2b)`
    /// bits (b = 4 slots per bucket), the smallest width whose
    /// `2b / 2^f` false-positive bound meets the target; the bucket count
    /// is the next power of two fitting `expected_items` at a 0.95 design
    /// load factor.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind) for
    /// invalid inputs.
    pub fn with_seed(
        expected_items: usize,
        false_positive_rate: f64,
        seed: u64,
    ) -> Result<Self, Error> {
        if expected_items == 0 {
            return Err(Error::invalid_argument(
                "expected_items must be greater than zero",
            ));
        }
        if !false_positive_rate.is_finite()
            || false_positive_rate <= 0.0
            || false_positive_rate >= 1.0
        {
            return Err(Error::invalid_argument(
                "false_positive_rate must be finite and strictly between 0 and 1",
            )
            .with_context("false_positive_rate", false_positive_rate));
        }

        let fingerprint_bits = (((1.0 / false_positive_rate).log2().ceil() as i32) + 3)
            .clamp(4, 16) as u8;
        let bucket_count = ((expected_items as f64 / BUCKET_SLOTS as f64) / DESIGN_LOAD_FACTOR)
            .ceil() as usize;
        let bucket_count = bucket_count.max(2).next_power_of_two();

        Self::with_parameters(bucket_count, fingerprint_bits, DEFAULT_MAX_KICKS, seed)
    }

    /// Creates a filter from explicit parameters.
    ///
    /// `bucket_count` must be a non-zero power of two; each bucket holds
    /// four fingerprints.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind) for
    /// invalid values.
    pub fn with_parameters(
        bucket_count: usize,
        fingerprint_bits: u8,
        max_kicks: usize,
        seed: u64,
    ) -> Result<Self, Error> {
        if bucket_count == 0 || !bucket_count.is_power_of_two() {
            return Err(Error::invalid_argument(
                "bucket_count must be a non-zero power of two",
            )
            .with_context("bucket_count", bucket_count));
        }
        if fingerprint_bits == 0 || fingerprint_bits > 16 {
            return Err(Error::invalid_argument(
                "fingerprint_bits must be in the inclusive range [1, 16]",
            ));
        }
        if max_kicks == 0 {
            return Err(Error::invalid_argument("max_kicks must be greater than zero"));
        }

        Ok(Self {
            hasher: SketchHasher::with_seed(seed),
            buckets: vec![[0; BUCKET_SLOTS]; bucket_count],
            fingerprint_bits,
            max_kicks,
            inserted_items: 0,
            rng_state: splitmix64(seed ^ 0xD6E8_FD93_5E7A_4A6D),
        })
    }

    /// Returns the number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the total number of fingerprint slots.
    pub fn slot_count(&self) -> usize {
        self.buckets.len() * BUCKET_SLOTS
    }

    /// Returns the fingerprint width in bits.
    pub fn fingerprint_bits(&self) -> u8 {
        self.fingerprint_bits
    }

    /// Returns the number of successful insertions minus deletions.
    pub fn len(&self) -> u64 {
        self.inserted_items
    }

    /// Returns `true` when no items are present.
    pub fn is_empty(&self) -> bool {
        self.inserted_items == 0
    }

    /// Returns the hash seed.
    pub fn seed(&self) -> u64 {
        self.hasher.seed()
    }

    /// Inserts one item into the filter.
    ///
    /// If both candidate buckets are full, a bounded random eviction walk
    /// relocates existing fingerprints between their candidate buckets. An
    /// explicit loop counter bounds the walk (no recursion); when the
    /// bound is exceeded the walk is rolled back and
    /// [`ErrorKind::CapacityExceeded`](crate::error::ErrorKind) is
    /// returned with the filter in its exact pre-call state. The caller
    /// must rebuild at a larger size, not retry.
    pub fn insert<T: Hash>(&mut self, item: &T) -> Result<(), Error> {
        let fingerprint = self.hasher.fingerprint(item, self.fingerprint_bits);
        let index_a = self.primary_index(item);
        let index_b = self.alternate_index(index_a, fingerprint);

        if self.insert_into_bucket(index_a, fingerprint)
            || self.insert_into_bucket(index_b, fingerprint)
        {
            self.inserted_items += 1;
            return Ok(());
        }

        let mut current = fingerprint;
        let mut bucket = if (self.next_u64() & 1) == 0 {
            index_a
        } else {
            index_b
        };
        // Records every swap of the walk; a failed insert is undone by
        // replaying the swaps in reverse (a swap is its own inverse).
        let mut path: Vec<(usize, usize)> = Vec::new();

        for _ in 0..self.max_kicks {
            let slot = (self.next_u64() as usize) % BUCKET_SLOTS;
            std::mem::swap(&mut current, &mut self.buckets[bucket][slot]);
            path.push((bucket, slot));
            bucket = self.alternate_index(bucket, current);

            if self.insert_into_bucket(bucket, current) {
                self.inserted_items += 1;
                return Ok(());
            }
        }

        for &(bucket, slot) in path.iter().rev() {
            std::mem::swap(&mut current, &mut self.buckets[bucket][slot]);
        }
        debug_assert_eq!(current, fingerprint);

        Err(Error::capacity_exceeded(
            "eviction walk exhausted; rebuild the filter at a larger capacity",
        )
        .with_context("max_kicks", self.max_kicks)
        .with_context("load_factor", self.load_factor()))
    }

    /// Returns `true` if the item is possibly in the set.
    pub fn contains<T: Hash>(&self, item: &T) -> bool {
        let fingerprint = self.hasher.fingerprint(item, self.fingerprint_bits);
        let index_a = self.primary_index(item);
        let index_b = self.alternate_index(index_a, fingerprint);
        self.buckets[index_a].contains(&fingerprint) || self.buckets[index_b].contains(&fingerprint)
    }

    /// Deletes one item instance.
    ///
    /// Returns `true` if a matching fingerprint was removed. The caller
    /// must guarantee the item was previously inserted (see the module
    /// docs for the hazard).
    pub fn delete<T: Hash>(&mut self, item: &T) -> bool {
        let fingerprint = self.hasher.fingerprint(item, self.fingerprint_bits);
        let index_a = self.primary_index(item);
        let index_b = self.alternate_index(index_a, fingerprint);

        if self.remove_from_bucket(index_a, fingerprint)
            || self.remove_from_bucket(index_b, fingerprint)
        {
            self.inserted_items -= 1;
            return true;
        }
        false
    }

    /// Returns current slot utilization in `[0, 1]`.
    pub fn load_factor(&self) -> f64 {
        self.inserted_items as f64 / self.slot_count() as f64
    }

    fn insert_into_bucket(&mut self, bucket_index: usize, fingerprint: u16) -> bool {
        for slot in &mut self.buckets[bucket_index] {
            if *slot == 0 {
                *slot = fingerprint;
                return true;
            }
        }
        false
    }

    fn remove_from_bucket(&mut self, bucket_index: usize, fingerprint: u16) -> bool {
        for slot in &mut self.buckets[bucket_index] {
            if *slot == fingerprint {
                *slot = 0;
                return true;
            }
        }
        false
    }

    fn primary_index<T: Hash>(&self, item: &T) -> usize {
        (self.hasher.hash64(item) as usize) & (self.buckets.len() - 1)
    }

    fn alternate_index(&self, index: usize, fingerprint: u16) -> usize {
        let hashed_fingerprint = self.hasher.hash_fingerprint(fingerprint) as usize;
        (index ^ hashed_fingerprint) & (self.buckets.len() - 1)
    }

    /// Seedable victim-selection stream; the seed is a constructor
    /// parameter so eviction choices are reproducible in tests.
    fn next_u64(&mut self) -> u64 {
        self.rng_state = splitmix64(self.rng_state);
        self.rng_state
    }
}

impl MembershipQuery for CuckooFilter {
    fn contains<T: Hash>(&self, item: &T) -> bool {
        CuckooFilter::contains(self, item)
    }

    fn memory_bytes(&self) -> usize {
        self.buckets.len() * BUCKET_SLOTS * size_of::<u16>()
    }

    fn fill_ratio(&self) -> f64 {
        self.load_factor()
    }

    /// False-positive bound at the current load: a negative query probes
    /// `2b` slots of which a `load_factor` fraction hold fingerprints,
    /// each matching with probability `2^-f`.
    fn false_positive_rate(&self) -> f64 {
        let denominator = (1_u64 << self.fingerprint_bits) as f64;
        ((2.0 * BUCKET_SLOTS as f64 * self.load_factor()) / denominator).min(1.0)
    }
}

impl MembershipFilter for CuckooFilter {
    fn insert<T: Hash>(&mut self, item: &T) -> Result<(), Error> {
        CuckooFilter::insert(self, item)
    }
}

#[cfg(test)]
mod tests {
    use super::CuckooFilter;
    use crate::error::ErrorKind;

    #[test]
    fn test_constructor_validates_parameters() {
        assert!(CuckooFilter::new(0, 0.01).is_err());
        assert!(CuckooFilter::new(100, 0.0).is_err());
        assert!(CuckooFilter::new(100, 1.0).is_err());
        assert!(CuckooFilter::with_parameters(3, 8, 100, 1).is_err());
        assert!(CuckooFilter::with_parameters(8, 0, 100, 1).is_err());
        assert!(CuckooFilter::with_parameters(8, 8, 0, 1).is_err());
    }

    #[test]
    fn test_insert_contains_delete_roundtrip() {
        let mut filter = CuckooFilter::new(1_000, 0.01).unwrap();
        filter.insert(&"alice").unwrap();
        assert!(filter.contains(&"alice"));
        assert!(filter.delete(&"alice"));
        assert!(!filter.contains(&"alice"));
        assert!(filter.is_empty());
    }

    #[test]
    fn test_load_factor_increases_with_inserts() {
        let mut filter = CuckooFilter::new(1_000, 0.01).unwrap();
        let before = filter.load_factor();
        for value in 0_u64..300 {
            filter.insert(&value).unwrap();
        }
        assert!(filter.load_factor() > before);
    }

    #[test]
    fn test_tiny_filter_reports_capacity_exceeded() {
        let mut filter = CuckooFilter::with_parameters(2, 8, 50, 7).unwrap();
        let mut failures = 0;
        for value in 0_u64..100 {
            if let Err(err) = filter.insert(&value) {
                assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
                failures += 1;
            }
        }
        assert!(failures > 0);
    }

    #[test]
    fn test_failed_insert_leaves_state_unchanged() {
        let mut filter = CuckooFilter::with_parameters(2, 8, 25, 7).unwrap();
        let mut accepted = Vec::new();
        let mut overflowed = false;
        for value in 0_u64..100 {
            match filter.insert(&value) {
                Ok(()) => accepted.push(value),
                Err(_) => {
                    overflowed = true;
                    break;
                }
            }
        }
        assert!(overflowed, "tiny filter should overflow");

        // A failed insert must roll back every relocation it attempted:
        // all previously accepted items are still reported present.
        for value in &accepted {
            assert!(filter.contains(value), "lost {value} after failed insert");
        }
        assert_eq!(filter.len(), accepted.len() as u64);
    }

    #[test]
    fn test_empirical_false_positive_rate_is_reasonable() {
        let mut filter = CuckooFilter::new(2_000, 0.01).unwrap();
        for value in 0_u64..2_000 {
            filter.insert(&value).unwrap();
        }

        let mut false_positives = 0_u64;
        let trials = 2_000_u64;
        for value in 20_000_u64..(20_000 + trials) {
            if filter.contains(&value) {
                false_positives += 1;
            }
        }

        let rate = false_positives as f64 / trials as f64;
        assert!(rate < 0.05, "rate={rate}");
    }

    #[test]
    fn test_deleting_unknown_item_returns_false() {
        let mut filter = CuckooFilter::new(100, 0.01).unwrap();
        assert!(!filter.delete(&"ghost"));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let build = || {
            let mut filter = CuckooFilter::with_seed(500, 0.01, 42).unwrap();
            for value in 0_u64..400 {
                filter.insert(&value).unwrap();
            }
            filter
        };
        let a = build();
        let b = build();
        assert_eq!(a.buckets, b.buckets);
    }
}

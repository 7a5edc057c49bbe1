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

/// Count-Min sketch for estimating item frequencies.
///
/// A table of `num_hashes` rows by `num_buckets` unsigned counters.
/// Updates add weight to one counter per row; the estimate is the minimum
/// over the touched counters, which never under-estimates the true count
/// and over-estimates by at most `e/num_buckets * total_weight` with high
/// probability.
#[derive(Debug, Clone, PartialEq)]
pub struct CountMinSketch {
    num_hashes: u8,
    num_buckets: u32,
    hasher: SketchHasher,
    row_hashers: Vec<SketchHasher>,
    conservative: bool,
    total_weight: u64,
    counts: Vec<u64>,
}

impl CountMinSketch {
    /// Creates a new Count-Min sketch with the default seed.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind) if
    /// `num_hashes` is 0, `num_buckets` is less than 3, or the total
    /// table size exceeds the supported limit.
    pub fn new(num_hashes: u8, num_buckets: u32) -> Result<Self, Error> {
        Self::with_seed(num_hashes, num_buckets, DEFAULT_SKETCH_SEED)
    }

    /// Creates a new Count-Min sketch with the provided seed.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind) if
    /// `num_hashes` is 0, `num_buckets` is less than 3, or the total
    /// table size exceeds the supported limit.
    pub fn with_seed(num_hashes: u8, num_buckets: u32, seed: u64) -> Result<Self, Error> {
        let entries = entries_for_config(num_hashes, num_buckets)?;
        let hasher = SketchHasher::with_seed(seed);
        let row_hashers = hasher
            .derive_row_seeds(num_hashes as usize)
            .into_iter()
            .map(SketchHasher::with_seed)
            .collect();

        Ok(CountMinSketch {
            num_hashes,
            num_buckets,
            hasher,
            row_hashers,
            conservative: false,
            total_weight: 0,
            counts: vec![0; entries],
        })
    }

    /// Switches the sketch to the conservative-update rule.
    ///
    /// Must be selected at construction time, before any updates. A
    /// conservative sketch refuses [`merge`](Self::merge).
    pub fn with_conservative_update(mut self) -> Self {
        debug_assert!(self.is_empty());
        self.conservative = true;
        self
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

    /// Returns true when the conservative-update rule is active.
    pub fn is_conservative(&self) -> bool {
        self.conservative
    }

    /// Returns the total weight inserted into the sketch.
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Returns the relative error (epsilon) implied by the number of
    /// buckets.
    pub fn relative_error(&self) -> f64 {
        std::f64::consts::E / self.num_buckets as f64
    }

    /// Returns true if the sketch has not seen any updates.
    pub fn is_empty(&self) -> bool {
        self.total_weight == 0
    }

    /// Suggests the number of buckets to achieve the given relative error.
    ///
    /// # Panics
    ///
    /// Panics if `relative_error` is negative.
    pub fn suggest_num_buckets(relative_error: f64) -> u32 {
        assert!(relative_error >= 0.0, "relative_error must be at least 0");
        (std::f64::consts::E / relative_error).ceil() as u32
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

    /// Updates the sketch with `delta` occurrences of the item.
    ///
    /// Deltas are unsigned by contract: counters can only grow, which is
    /// what keeps the estimate an upper bound of the true count.
    pub fn update<T: Hash>(&mut self, item: &T, delta: u64) {
        if delta == 0 {
            return;
        }
        self.total_weight = self.total_weight.saturating_add(delta);

        if self.conservative {
            let indexes = self.table_indexes(item);
            let minimum = indexes.iter().map(|&i| self.counts[i]).min().unwrap_or(0);
            let target = minimum.saturating_add(delta);
            // Only counters below the raised minimum move; counters that
            // other keys pushed higher already dominate the estimate.
            for index in indexes {
                if self.counts[index] < target {
                    self.counts[index] = target;
                }
            }
        } else {
            for index in self.table_indexes(item) {
                self.counts[index] = self.counts[index].saturating_add(delta);
            }
        }
    }

    /// Returns the estimated frequency of the given item: the minimum
    /// across the item's row counters.
    pub fn estimate<T: Hash>(&self, item: &T) -> u64 {
        self.table_indexes(item)
            .into_iter()
            .map(|index| self.counts[index])
            .min()
            .unwrap_or(0)
    }

    /// Returns the upper bound on the true frequency of the given item.
    ///
    /// The estimate itself: Count-Min never under-estimates.
    pub fn upper_bound<T: Hash>(&self, item: &T) -> u64 {
        self.estimate(item)
    }

    /// Returns the lower bound on the true frequency of the given item.
    pub fn lower_bound<T: Hash>(&self, item: &T) -> u64 {
        let error = (self.relative_error() * self.total_weight as f64) as u64;
        self.estimate(item).saturating_sub(error)
    }

    /// Merges another sketch into this one by element-wise addition.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::IncompatibleMerge`](crate::error::ErrorKind)
    /// when the sketches differ in shape or seed, or when either uses the
    /// conservative-update rule: conservative counters depend on update
    /// order, so adding two tables no longer bounds the union stream.
    pub fn merge(&mut self, other: &CountMinSketch) -> Result<(), Error> {
        if self.conservative || other.conservative {
            return Err(Error::incompatible_merge(
                "conservative-update sketches are not mergeable",
            ));
        }
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

    fn table_indexes<T: Hash>(&self, item: &T) -> Vec<usize> {
        let num_buckets = self.num_buckets as usize;
        self.row_hashers
            .iter()
            .enumerate()
            .map(|(row, hasher)| {
                let bucket = (hasher.hash64(item) % self.num_buckets as u64) as usize;
                row * num_buckets + bucket
            })
            .collect()
    }
}

impl FrequencySketch for CountMinSketch {
    fn update<T: Hash>(&mut self, item: &T, delta: u64) {
        CountMinSketch::update(self, item, delta);
    }

    fn estimate<T: Hash>(&self, item: &T) -> i64 {
        CountMinSketch::estimate(self, item).min(i64::MAX as u64) as i64
    }

    fn memory_bytes(&self) -> usize {
        self.counts.len() * size_of::<u64>()
    }

    fn fill_ratio(&self) -> f64 {
        let nonzero = self.counts.iter().filter(|&&count| count > 0).count();
        nonzero as f64 / self.counts.len() as f64
    }

    /// Absolute over-estimation bound with high probability:
    /// `e/num_buckets * total_weight`.
    fn error_bound(&self) -> f64 {
        self.relative_error() * self.total_weight as f64
    }
}

fn entries_for_config(num_hashes: u8, num_buckets: u32) -> Result<usize, Error> {
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
    Ok(entries)
}

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

use super::BloomFilter;
use crate::error::Error;
use crate::hash::DEFAULT_SKETCH_SEED;
use crate::hash::SketchHasher;

pub const MIN_NUM_BITS: u64 = 1;
pub const MAX_NUM_BITS: u64 = (i32::MAX as u64) * 64;
pub const MIN_NUM_HASHES: u16 = 1;
pub const MAX_NUM_HASHES: u16 = i16::MAX as u16;

/// Builder for creating [`BloomFilter`] instances.
///
/// Provides two construction modes:
/// - [`with_accuracy()`](Self::with_accuracy): specify target items and
///   false positive rate (recommended)
/// - [`with_size()`](Self::with_size): specify requested bit count and
///   hash functions (manual)
#[derive(Debug, Clone)]
pub struct BloomFilterBuilder {
    num_bits: u64,
    num_hashes: u16,
    seed: u64,
}

impl BloomFilterBuilder {
    /// Creates a builder with optimal parameters for a target accuracy.
    ///
    /// Automatically calculates the number of bits and hash functions to
    /// achieve the desired false positive probability for a given number
    /// of items.
    ///
    /// # Arguments
    ///
    /// - `max_items`: maximum expected number of distinct items
    /// - `fpp`: target false positive probability (e.g., 0.01 for 1%)
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind) if
    /// `max_items` is 0 or `fpp` is not in (0.0, 1.0).
    ///
    /// # Examples
    ///
    /// ```
    /// # use sketches::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_accuracy(10_000, 0.01)?
    ///     .seed(42)
    ///     .build();
    /// # Ok::<(), sketches::error::Error>(())
    /// ```
    pub fn with_accuracy(max_items: u64, fpp: f64) -> Result<Self, Error> {
        if max_items == 0 {
            return Err(Error::invalid_argument("max_items must be greater than 0"));
        }
        if !fpp.is_finite() || fpp <= 0.0 || fpp >= 1.0 {
            return Err(Error::invalid_argument(
                "fpp must be finite and strictly between 0 and 1",
            )
            .with_context("fpp", fpp));
        }

        let num_bits = Self::suggest_num_bits(max_items, fpp);
        let num_hashes = Self::suggest_num_hashes(max_items, num_bits);

        Ok(BloomFilterBuilder {
            num_bits,
            num_hashes,
            seed: DEFAULT_SKETCH_SEED,
        })
    }

    /// Creates a builder with manual size specification.
    ///
    /// The underlying storage is word-based, so the actual capacity is
    /// rounded up to the next multiple of 64 bits.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind) if
    /// `num_bits` or `num_hashes` is outside its supported range.
    pub fn with_size(num_bits: u64, num_hashes: u16) -> Result<Self, Error> {
        if !(MIN_NUM_BITS..=MAX_NUM_BITS).contains(&num_bits) {
            return Err(
                Error::invalid_argument(format!("num_bits must be in [1, {MAX_NUM_BITS}]"))
                    .with_context("num_bits", num_bits),
            );
        }
        if !(MIN_NUM_HASHES..=MAX_NUM_HASHES).contains(&num_hashes) {
            return Err(Error::invalid_argument(format!(
                "num_hashes must be in [1, {MAX_NUM_HASHES}]"
            ))
            .with_context("num_hashes", num_hashes));
        }

        Ok(BloomFilterBuilder {
            num_bits,
            num_hashes,
            seed: DEFAULT_SKETCH_SEED,
        })
    }

    /// Sets a custom hash seed (default: 9001).
    ///
    /// **Important**: filters with different seeds cannot be unioned.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builds the Bloom filter.
    pub fn build(self) -> BloomFilter {
        let num_words = self.num_bits.div_ceil(64) as usize;

        BloomFilter {
            hasher: SketchHasher::with_seed(self.seed),
            num_hashes: self.num_hashes,
            capacity_bits: num_words as u64 * 64,
            num_bits_set: 0,
            bit_array: vec![0u64; num_words],
        }
    }

    /// Suggests the number of bits given max items and target FPP.
    ///
    /// Formula: `m = -n * ln(p) / (ln(2)^2)`
    pub fn suggest_num_bits(max_items: u64, fpp: f64) -> u64 {
        let n = max_items as f64;
        let ln2_squared = std::f64::consts::LN_2 * std::f64::consts::LN_2;

        let bits = (-n * fpp.ln() / ln2_squared).ceil() as u64;
        bits.clamp(MIN_NUM_BITS, MAX_NUM_BITS)
    }

    /// Suggests the number of hash functions given max items and bit count.
    ///
    /// Formula: `k = (m/n) * ln(2)`
    pub fn suggest_num_hashes(max_items: u64, num_bits: u64) -> u16 {
        let m = num_bits as f64;
        let n = max_items as f64;

        // Ceil to avoid selecting too few hashes.
        let k = (m / n * std::f64::consts::LN_2).ceil();
        k.clamp(f64::from(MIN_NUM_HASHES), f64::from(MAX_NUM_HASHES)) as u16
    }
}

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
use crate::traits::MembershipQuery;

/// Bounded number of reseeded construction attempts before giving up.
const MAX_BUILD_ATTEMPTS: u64 = 10;
/// Space overhead factor of the three-block table.
const CAPACITY_FACTOR: f64 = 1.23;

/// Immutable membership filter with fingerprint-width-bounded false
/// positives.
///
/// Built once from the full key set via peeling; read-only afterwards.
/// Implements only the query side of the membership interface.
#[derive(Debug, Clone)]
pub struct XorFilter {
    /// The provider of the construction round that peeled successfully.
    hasher: SketchHasher,
    fingerprints: Vec<u16>,
    fingerprint_bits: u8,
    block_length: usize,
    num_keys: usize,
}

impl XorFilter {
    /// Builds a filter over the given key set with the default seed.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind) for
    /// an out-of-range fingerprint width, or
    /// [`ErrorKind::ConstructionFailed`](crate::error::ErrorKind) when
    /// peeling stalled in every bounded attempt, which duplicate keys in
    /// the input force at any seed; the caller must deduplicate.
    pub fn build<T: Hash>(keys: &[T], fingerprint_bits: u8) -> Result<Self, Error> {
        Self::build_with_seed(keys, fingerprint_bits, DEFAULT_SKETCH_SEED)
    }

    /// Builds a filter over the given key set and seed.
    ///
    /// # Errors
    ///
    /// See [`build`](Self::build).
    pub fn build_with_seed<T: Hash>(
        keys: &[T],
        fingerprint_bits: u8,
        seed: u64,
    ) -> Result<Self, Error> {
        if !(1..=16).contains(&fingerprint_bits) {
            return Err(Error::invalid_argument(
                "fingerprint_bits must be in the inclusive range [1, 16]",
            )
            .with_context("fingerprint_bits", fingerprint_bits));
        }

        let capacity = Self::table_capacity(keys.len());
        let block_length = capacity / 3;
        let base = SketchHasher::with_seed(seed);

        for round in 0..MAX_BUILD_ATTEMPTS {
            let hasher = if round == 0 { base } else { base.reseed(round) };
            if let Some(fingerprints) =
                Self::try_build(keys, fingerprint_bits, block_length, &hasher)
            {
                return Ok(Self {
                    hasher,
                    fingerprints,
                    fingerprint_bits,
                    block_length,
                    num_keys: keys.len(),
                });
            }
        }

        Err(Error::construction_failed(
            "peeling stalled in every attempt; deduplicate the key set or resize",
        )
        .with_context("attempts", MAX_BUILD_ATTEMPTS)
        .with_context("keys", keys.len()))
    }

    /// Returns `true` if the key is possibly in the build set.
    ///
    /// For keys of the build set the answer is `true` with probability 1.
    pub fn contains<T: Hash>(&self, key: &T) -> bool {
        let fingerprint = self.hasher.fingerprint(key, self.fingerprint_bits);
        let [s0, s1, s2] = Self::slots(&self.hasher, key, self.block_length);
        fingerprint == self.fingerprints[s0] ^ self.fingerprints[s1] ^ self.fingerprints[s2]
    }

    /// Returns the number of keys the filter was built from.
    pub fn len(&self) -> usize {
        self.num_keys
    }

    /// Returns `true` when the filter was built from an empty key set.
    pub fn is_empty(&self) -> bool {
        self.num_keys == 0
    }

    /// Returns the fingerprint width in bits.
    pub fn fingerprint_bits(&self) -> u8 {
        self.fingerprint_bits
    }

    /// Returns the total number of fingerprint slots.
    pub fn slot_count(&self) -> usize {
        self.fingerprints.len()
    }

    /// Returns the seed of the construction round that succeeded.
    pub fn seed(&self) -> u64 {
        self.hasher.seed()
    }

    /// Table size: `1.23 * n` rounded up to a multiple of 3, with a floor
    /// that keeps each block non-empty.
    fn table_capacity(num_keys: usize) -> usize {
        let min_capacity = ((num_keys as f64) * CAPACITY_FACTOR).ceil() as usize;
        (min_capacity.div_ceil(3)).max(1) * 3
    }

    /// The three candidate slots of a key, one in each third of the table.
    fn slots<T: Hash>(hasher: &SketchHasher, key: &T, block_length: usize) -> [usize; 3] {
        let (h0, h1) = hasher.hash_pair(key);
        let h2 = h0.rotate_left(32) ^ h1.rotate_left(16);
        [
            (h0 % block_length as u64) as usize,
            block_length + (h1 % block_length as u64) as usize,
            2 * block_length + (h2 % block_length as u64) as usize,
        ]
    }

    /// One peeling attempt; `None` when some keys never became uniquely
    /// assigned.
    fn try_build<T: Hash>(
        keys: &[T],
        fingerprint_bits: u8,
        block_length: usize,
        hasher: &SketchHasher,
    ) -> Option<Vec<u16>> {
        let capacity = block_length * 3;
        let mut key_slots = Vec::with_capacity(keys.len());
        let mut key_fingerprints = Vec::with_capacity(keys.len());
        let mut slot_keys: Vec<Vec<usize>> = vec![Vec::new(); capacity];

        for (idx, key) in keys.iter().enumerate() {
            let slots = Self::slots(hasher, key, block_length);
            for &slot in &slots {
                slot_keys[slot].push(idx);
            }
            key_slots.push(slots);
            key_fingerprints.push(hasher.fingerprint(key, fingerprint_bits));
        }

        // Peel: pop slots referenced by exactly one remaining key.
        let mut stack: Vec<usize> = Vec::new();
        let mut queued = vec![false; capacity];
        for (slot, assigned) in slot_keys.iter().enumerate() {
            if assigned.len() == 1 {
                queued[slot] = true;
                stack.push(slot);
            }
        }

        let mut order: Vec<(usize, usize)> = Vec::with_capacity(keys.len());
        while let Some(slot) = stack.pop() {
            if slot_keys[slot].len() != 1 {
                continue;
            }
            let key_idx = slot_keys[slot][0];
            order.push((key_idx, slot));

            for &other in &key_slots[key_idx] {
                if other == slot {
                    continue;
                }
                slot_keys[other].retain(|&k| k != key_idx);
                if slot_keys[other].len() == 1 && !queued[other] {
                    queued[other] = true;
                    stack.push(other);
                }
            }
        }

        if order.len() != keys.len() {
            return None;
        }

        // Assign in reverse peel order: each key's other two slots are
        // already final when its own slot is written.
        let mut fingerprints = vec![0_u16; capacity];
        for &(key_idx, slot) in order.iter().rev() {
            let [s0, s1, s2] = key_slots[key_idx];
            let others = fingerprints[s0] ^ fingerprints[s1] ^ fingerprints[s2];
            // fingerprints[slot] is still zero here, so xor-ing over all
            // three slots leaves exactly the other two.
            fingerprints[slot] = key_fingerprints[key_idx] ^ others;
        }

        Some(fingerprints)
    }
}

impl MembershipQuery for XorFilter {
    fn contains<T: Hash>(&self, item: &T) -> bool {
        XorFilter::contains(self, item)
    }

    fn memory_bytes(&self) -> usize {
        self.fingerprints.len() * size_of::<u16>()
    }

    fn fill_ratio(&self) -> f64 {
        self.num_keys as f64 / self.fingerprints.len() as f64
    }

    /// Bounded by the fingerprint width only: `2^-f`.
    fn false_positive_rate(&self) -> f64 {
        1.0 / (1_u64 << self.fingerprint_bits) as f64
    }
}

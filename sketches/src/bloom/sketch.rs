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
use crate::hash::SketchHasher;
use crate::traits::MembershipFilter;
use crate::traits::MembershipQuery;

/// A standard Bloom filter.
///
/// Uses a single contiguous bit array packed into `u64` words and double
/// hashing for generating the k probe positions from two base hashes.
///
/// Use [`super::BloomFilterBuilder`] to construct instances.
#[derive(Debug, Clone, PartialEq)]
pub struct BloomFilter {
    /// Seeded hash provider fixed for the filter's lifetime
    pub(super) hasher: SketchHasher,
    /// Number of hash functions to use (k)
    pub(super) num_hashes: u16,
    /// Total number of bits in the filter (m)
    pub(super) capacity_bits: u64,
    /// Count of bits set to 1
    pub(super) num_bits_set: u64,
    /// Bit array packed into u64 words
    pub(super) bit_array: Vec<u64>,
}

impl BloomFilter {
    /// Tests whether an item is possibly in the set.
    ///
    /// Returns:
    /// - `true`: item was **possibly** inserted (or false positive)
    /// - `false`: item was **definitely not** inserted
    pub fn contains<T: Hash>(&self, item: &T) -> bool {
        if self.is_empty() {
            return false;
        }

        let pair = self.hasher.hash_pair(item);
        self.check_bits(pair)
    }

    /// Inserts an item into the filter.
    ///
    /// After insertion, `contains(item)` will always return `true`.
    pub fn insert<T: Hash>(&mut self, item: &T) {
        let pair = self.hasher.hash_pair(item);
        self.set_bits(pair);
    }

    /// Tests and inserts an item in a single operation.
    ///
    /// Returns whether the item was possibly already in the set before
    /// insertion. More efficient than `contains()` followed by `insert()`
    /// because the hashes are computed once.
    pub fn contains_and_insert<T: Hash>(&mut self, item: &T) -> bool {
        let pair = self.hasher.hash_pair(item);
        let was_present = self.check_bits(pair);
        self.set_bits(pair);
        was_present
    }

    /// Resets the filter to its initial empty state.
    ///
    /// Clears all bits while preserving capacity and configuration.
    pub fn reset(&mut self) {
        self.bit_array.fill(0);
        self.num_bits_set = 0
    }

    /// Merges another filter into this one via bitwise OR (union).
    ///
    /// After merging, this filter will recognize items from either filter
    /// (plus any false positives from either).
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::IncompatibleMerge`](crate::error::ErrorKind)
    /// when the filters differ in size, hash count, or seed.
    pub fn union(&mut self, other: &BloomFilter) -> Result<(), Error> {
        if !self.is_compatible(other) {
            return Err(Error::incompatible_merge(
                "filters differ in capacity, hash count, or seed",
            ));
        }

        // Count bits during union operation (single pass)
        let mut num_bits_set = 0;
        for (word, other_word) in self.bit_array.iter_mut().zip(&other.bit_array) {
            *word |= *other_word;
            num_bits_set += u64::from(word.count_ones());
        }
        self.num_bits_set = num_bits_set;
        Ok(())
    }

    /// Returns whether the filter is empty (no items inserted).
    pub fn is_empty(&self) -> bool {
        self.num_bits_set == 0
    }

    /// Returns the number of bits set to 1.
    ///
    /// Useful for monitoring filter saturation.
    pub fn bits_used(&self) -> u64 {
        self.num_bits_set
    }

    /// Returns the total number of bits in the filter (capacity).
    pub fn capacity(&self) -> u64 {
        self.capacity_bits
    }

    /// Returns the number of hash functions used.
    pub fn num_hashes(&self) -> u16 {
        self.num_hashes
    }

    /// Returns the hash seed.
    pub fn seed(&self) -> u64 {
        self.hasher.seed()
    }

    /// Checks if two filters are compatible for union.
    pub fn is_compatible(&self, other: &BloomFilter) -> bool {
        self.capacity_bits == other.capacity_bits
            && self.num_hashes == other.num_hashes
            && self.hasher == other.hasher
    }

    /// Checks if all k bits are set for the given hash pair.
    fn check_bits(&self, pair: (u64, u64)) -> bool {
        for i in 1..=u32::from(self.num_hashes) {
            let bit_index = SketchHasher::index_at(pair, i, self.capacity_bits);
            if !self.get_bit(bit_index) {
                return false;
            }
        }
        true
    }

    /// Sets all k bits for the given hash pair.
    fn set_bits(&mut self, pair: (u64, u64)) {
        for i in 1..=u32::from(self.num_hashes) {
            let bit_index = SketchHasher::index_at(pair, i, self.capacity_bits);
            self.set_bit(bit_index);
        }
    }

    fn get_bit(&self, bit_index: u64) -> bool {
        let word_index = (bit_index >> 6) as usize;
        let mask = 1u64 << (bit_index & 63);
        (self.bit_array[word_index] & mask) != 0
    }

    /// Sets a single bit and updates the count if it wasn't already set.
    fn set_bit(&mut self, bit_index: u64) {
        let word_index = (bit_index >> 6) as usize;
        let mask = 1u64 << (bit_index & 63);

        if (self.bit_array[word_index] & mask) == 0 {
            self.bit_array[word_index] |= mask;
            self.num_bits_set += 1;
        }
    }
}

impl MembershipQuery for BloomFilter {
    fn contains<T: Hash>(&self, item: &T) -> bool {
        BloomFilter::contains(self, item)
    }

    fn memory_bytes(&self) -> usize {
        self.bit_array.len() * size_of::<u64>()
    }

    /// Returns the current load factor (fraction of bits set).
    ///
    /// Values near 0.5 indicate the filter is at its design fill; values
    /// above it indicate degraded false positive rates.
    fn fill_ratio(&self) -> f64 {
        self.num_bits_set as f64 / self.capacity_bits as f64
    }

    /// Estimates the false positive probability at the current fill.
    ///
    /// Uses the approximation `load_factor^k`: the probability that all k
    /// probes of an absent key land on set bits, assuming uniform bit
    /// distribution.
    fn false_positive_rate(&self) -> f64 {
        self.fill_ratio().powf(f64::from(self.num_hashes))
    }
}

impl MembershipFilter for BloomFilter {
    fn insert<T: Hash>(&mut self, item: &T) -> Result<(), Error> {
        BloomFilter::insert(self, item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::bloom::BloomFilterBuilder;
    use crate::traits::MembershipQuery;

    #[test]
    fn test_builder_with_accuracy() {
        let filter = BloomFilterBuilder::with_accuracy(1000, 0.01).unwrap().build();
        assert!(filter.capacity() >= 9000);
        assert_eq!(filter.num_hashes(), 7);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_builder_with_size() {
        let filter = BloomFilterBuilder::with_size(1024, 5).unwrap().build();
        assert_eq!(filter.capacity(), 1024);
        assert_eq!(filter.num_hashes(), 5);
    }

    #[test]
    fn test_insert_and_contains() {
        let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01).unwrap().build();

        assert!(!filter.contains(&"apple"));
        filter.insert(&"apple");
        assert!(filter.contains(&"apple"));
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_contains_and_insert() {
        let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01).unwrap().build();

        let was_present = filter.contains_and_insert(&42_u64);
        assert!(!was_present);

        let was_present = filter.contains_and_insert(&42_u64);
        assert!(was_present);
    }

    #[test]
    fn test_reset() {
        let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01).unwrap().build();
        filter.insert(&"test");
        assert!(!filter.is_empty());

        filter.reset();
        assert!(filter.is_empty());
        assert!(!filter.contains(&"test"));
    }

    #[test]
    fn test_union() {
        let mut f1 = BloomFilterBuilder::with_accuracy(100, 0.01)
            .unwrap()
            .seed(123)
            .build();
        let mut f2 = BloomFilterBuilder::with_accuracy(100, 0.01)
            .unwrap()
            .seed(123)
            .build();

        f1.insert(&"a");
        f2.insert(&"b");

        f1.union(&f2).unwrap();
        assert!(f1.contains(&"a"));
        assert!(f1.contains(&"b"));
    }

    #[test]
    fn test_union_incompatible_seeds() {
        let mut f1 = BloomFilterBuilder::with_accuracy(100, 0.01)
            .unwrap()
            .seed(123)
            .build();
        let f2 = BloomFilterBuilder::with_accuracy(100, 0.01)
            .unwrap()
            .seed(456)
            .build();

        assert!(!f1.is_compatible(&f2));
        assert!(f1.union(&f2).is_err());
    }

    #[test]
    fn test_statistics() {
        let mut filter = BloomFilterBuilder::with_size(1000, 5).unwrap().build();
        assert_eq!(filter.bits_used(), 0);
        assert_eq!(filter.fill_ratio(), 0.0);

        filter.insert(&"test");
        assert!(filter.bits_used() > 0);
        assert!(filter.fill_ratio() > 0.0);
        assert!(filter.false_positive_rate() > 0.0);
        assert!(filter.memory_bytes() >= 1000 / 8);
    }

    #[test]
    fn test_invalid_max_items() {
        assert!(BloomFilterBuilder::with_accuracy(0, 0.01).is_err());
    }

    #[test]
    fn test_invalid_fpp() {
        assert!(BloomFilterBuilder::with_accuracy(100, 1.5).is_err());
        assert!(BloomFilterBuilder::with_accuracy(100, 0.0).is_err());
        assert!(BloomFilterBuilder::with_accuracy(100, 1.0).is_err());
    }
}

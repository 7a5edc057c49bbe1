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

//! Workload generation for benchmarking the sketch structures.
//!
//! Provides uniform, skewed (Zipfian), time-series and adversarial key
//! distributions, each seeded for reproducibility, plus the positive and
//! negative query sets the accuracy measurements need.

use std::collections::HashSet;
use std::fmt;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::Distribution;
use rand_distr::Zipf;

/// A dataset for benchmarking with inserted items and query sets.
#[derive(Clone)]
pub struct Dataset {
    /// Items to insert into the data structure
    pub inserted: Vec<u64>,
    /// Query items that ARE in the inserted set (for true positives)
    pub queries_present: Vec<u64>,
    /// Query items that ARE NOT in the inserted set (for false positives)
    pub queries_absent: Vec<u64>,
}

impl Dataset {
    /// Generates a dataset of uniformly random items.
    ///
    /// # Examples
    ///
    /// ```
    /// use sketches_bench::workload::Dataset;
    ///
    /// let dataset = Dataset::uniform(10_000, 42);
    /// assert_eq!(dataset.inserted.len(), 10_000);
    /// assert_eq!(dataset.queries_present.len(), 1_000); // 10% of inserted
    /// assert_eq!(dataset.queries_absent.len(), 1_000);
    /// ```
    pub fn uniform(n: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let inserted: Vec<u64> = (0..n).map(|_| rng.random()).collect();
        Self::with_queries(inserted, &mut rng)
    }

    /// Generates a dataset with a Zipfian (power-law) distribution.
    ///
    /// Common in real-world streams where a few items are very frequent
    /// and most items are rare (web traffic, word frequencies). Frequency
    /// sketches are measured against exactly this shape.
    ///
    /// # Arguments
    ///
    /// * `n` - number of insertions (with duplicates)
    /// * `cardinality` - number of unique items in the universe
    /// * `alpha` - Zipfian exponent (1.0 = classic Zipf, higher = more skewed)
    /// * `seed` - random seed for reproducibility
    pub fn zipfian(n: usize, cardinality: usize, alpha: f64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let zipf = Zipf::new(cardinality as f64, alpha).expect("Invalid Zipfian parameters");

        let inserted: Vec<u64> = (0..n).map(|_| zipf.sample(&mut rng) as u64).collect();
        Self::with_queries(inserted, &mut rng)
    }

    /// Generates a time-series-like dataset: monotonically increasing
    /// timestamps with bounded jitter between arrivals.
    ///
    /// Stresses structures with locally clustered, ever-growing keys
    /// (hash mixing has to spread what the key space does not).
    pub fn time_series(n: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut timestamp = 1_600_000_000_000_u64;
        let inserted: Vec<u64> = (0..n)
            .map(|_| {
                timestamp += rng.random_range(1..=1_000);
                timestamp
            })
            .collect();
        Self::with_queries(inserted, &mut rng)
    }

    /// Generates an adversarial dataset: keys that share their entire low
    /// half and differ only in the high bits.
    ///
    /// A hash family that mixes the high bits poorly degenerates here,
    /// which is exactly what this workload is for.
    pub fn adversarial(n: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let low = 0x5EED_F00D_u64;
        let inserted: Vec<u64> = (0..n).map(|i| ((i as u64) << 32) | low).collect();
        Self::with_queries(inserted, &mut rng)
    }

    /// Generates a small dataset for quick tests.
    pub fn small(seed: u64) -> Self {
        Self::uniform(1_000, seed)
    }

    /// Generates a medium dataset for standard benchmarks.
    pub fn medium(seed: u64) -> Self {
        Self::uniform(100_000, seed)
    }

    /// Generates a large dataset for stress testing.
    pub fn large(seed: u64) -> Self {
        Self::uniform(1_000_000, seed)
    }

    /// Returns the number of unique inserted items.
    pub fn cardinality(&self) -> usize {
        let set: HashSet<u64> = self.inserted.iter().copied().collect();
        set.len()
    }

    /// Returns the distinct inserted items, for construction-only filters.
    pub fn distinct_inserted(&self) -> Vec<u64> {
        let mut keys = self.inserted.clone();
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    /// Returns statistics about the dataset.
    pub fn stats(&self) -> DatasetStats {
        let unique_items = self.cardinality();
        let total_items = self.inserted.len();
        let duplication_rate = 1.0 - (unique_items as f64 / total_items as f64);

        DatasetStats {
            total_items,
            unique_items,
            duplication_rate,
            queries_present: self.queries_present.len(),
            queries_absent: self.queries_absent.len(),
        }
    }

    /// Samples 10% of the inserted items as positive queries and draws an
    /// equal number of keys outside the inserted set as negative queries.
    fn with_queries(inserted: Vec<u64>, rng: &mut StdRng) -> Self {
        let n = inserted.len();
        let queries_present: Vec<u64> = inserted.iter().step_by(10).copied().take(n / 10).collect();

        let inserted_set: HashSet<u64> = inserted.iter().copied().collect();
        let mut queries_absent = Vec::with_capacity(n / 10);
        while queries_absent.len() < n / 10 {
            let item: u64 = rng.random();
            if !inserted_set.contains(&item) {
                queries_absent.push(item);
            }
        }

        Dataset {
            inserted,
            queries_present,
            queries_absent,
        }
    }
}

/// Statistics about a dataset.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    /// Total number of insertions
    pub total_items: usize,
    /// Number of unique items
    pub unique_items: usize,
    /// Fraction of duplicate insertions (0.0 = all unique)
    pub duplication_rate: f64,
    /// Number of positive query items
    pub queries_present: usize,
    /// Number of negative query items
    pub queries_absent: usize,
}

impl fmt::Display for DatasetStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dataset Stats:\n  Total: {}\n  Unique: {}\n  Duplication: {:.1}%\n  Queries: {} present, {} absent",
            self.total_items,
            self.unique_items,
            self.duplication_rate * 100.0,
            self.queries_present,
            self.queries_absent
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_dataset() {
        let dataset = Dataset::uniform(10_000, 42);

        assert_eq!(dataset.inserted.len(), 10_000);
        assert_eq!(dataset.queries_present.len(), 1_000);
        assert_eq!(dataset.queries_absent.len(), 1_000);

        let inserted_set: HashSet<u64> = dataset.inserted.iter().copied().collect();
        for item in &dataset.queries_present {
            assert!(inserted_set.contains(item));
        }
        for item in &dataset.queries_absent {
            assert!(!inserted_set.contains(item));
        }
    }

    #[test]
    fn test_zipfian_dataset_is_skewed() {
        let dataset = Dataset::zipfian(100_000, 10_000, 1.07, 42);

        assert_eq!(dataset.inserted.len(), 100_000);
        // Zipfian streams repeat their head keys heavily.
        assert!(dataset.cardinality() < 10_000);
        assert!(dataset.stats().duplication_rate > 0.5);
    }

    #[test]
    fn test_time_series_is_monotone() {
        let dataset = Dataset::time_series(10_000, 42);
        for window in dataset.inserted.windows(2) {
            assert!(window[0] < window[1]);
        }
    }

    #[test]
    fn test_adversarial_shares_low_bits() {
        let dataset = Dataset::adversarial(1_000, 42);
        let low = dataset.inserted[0] & 0xFFFF_FFFF;
        assert!(dataset.inserted.iter().all(|key| key & 0xFFFF_FFFF == low));
        assert_eq!(dataset.cardinality(), 1_000);
    }

    #[test]
    fn test_reproducible_for_fixed_seed() {
        let a = Dataset::uniform(1_000, 7);
        let b = Dataset::uniform(1_000, 7);
        assert_eq!(a.inserted, b.inserted);
        assert_eq!(a.queries_absent, b.queries_absent);
    }

    #[test]
    fn test_convenience_constructors() {
        assert_eq!(Dataset::small(42).inserted.len(), 1_000);
        assert_eq!(Dataset::medium(42).inserted.len(), 100_000);
    }
}

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

//! Bloom filter implementations for probabilistic set membership testing.
//!
//! A Bloom filter is a space-efficient probabilistic data structure used to
//! test whether an element is a member of a set. False positive matches are
//! possible, but false negatives are not: a query returns either "possibly
//! in set" or "definitely not in set".
//!
//! # Properties
//!
//! - **No false negatives**: if an item was inserted, `contains()` will
//!   always return `true`
//! - **Possible false positives**: `contains()` may return `true` for items
//!   never inserted
//! - **Fixed size**: sizing happens at construction; growth requires
//!   building a new filter
//! - **No delete**: bits are shared between keys, so clearing them is
//!   unsound
//!
//! # Usage
//!
//! ```rust
//! use sketches::bloom::BloomFilterBuilder;
//!
//! // Create a filter sized for 1000 items with 1% false positive rate
//! let mut filter = BloomFilterBuilder::with_accuracy(1000, 0.01)?.build();
//!
//! filter.insert(&"apple");
//! filter.insert(&42_u64);
//!
//! assert!(filter.contains(&"apple")); // true - definitely inserted
//! assert!(!filter.contains(&"grape")); // false - never inserted (probably)
//! # Ok::<(), sketches::error::Error>(())
//! ```
//!
//! # Blocked variant
//!
//! [`BlockedBloomFilter`] partitions the bit array into 512-bit
//! (cache-line-sized) blocks and confines all k probes of a key to a single
//! block, so an operation touches one cache line instead of k. The cost is
//! a small accuracy loss from uneven key-to-block distribution.
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/time trade-offs in hash coding with
//!   allowable errors"
//! - Kirsch and Mitzenmacher (2008). "Less Hashing, Same Performance:
//!   Building a Better Bloom Filter"
//! - Putze, Sanders and Singler (2009). "Cache-, Hash- and Space-Efficient
//!   Bloom Filters"

mod blocked;
mod builder;
mod sketch;

pub use self::blocked::BlockedBloomFilter;
pub use self::builder::BloomFilterBuilder;
pub use self::sketch::BloomFilter;

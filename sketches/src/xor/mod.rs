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

//! XOR filter: an immutable membership filter built once from a full key
//! set.
//!
//! Construction maps every key to three slots (one per third of the
//! table, a 3-partite hypergraph), then *peels*: repeatedly find a slot
//! referenced by exactly one remaining key, record that (key, slot)
//! assignment, and remove the key. When all keys peel, the fingerprint
//! array is filled in reverse peel order so that for every build key the
//! XOR of its three slots equals its fingerprint.
//!
//! If peeling stalls (which duplicate keys force at every seed),
//! construction restarts with a reseeded hash provider up to a bounded
//! number of attempts and then fails with `ConstructionFailed`.
//!
//! Queries are exact on the build set (zero false negatives by
//! construction) and false positives on other keys are bounded by the
//! fingerprint width alone: `2^-fingerprint_bits`. There is no insert or
//! delete after construction.
//!
//! # Usage
//!
//! ```rust
//! use sketches::xor::XorFilter;
//!
//! let keys: Vec<u64> = (0..1000).collect();
//! let filter = XorFilter::build(&keys, 16)?;
//!
//! assert!(filter.contains(&42_u64));
//! # Ok::<(), sketches::error::Error>(())
//! ```
//!
//! # References
//!
//! - Graf and Lemire (2020). "Xor Filters: Faster and Smaller Than Bloom
//!   and Cuckoo Filters"

mod sketch;

pub use self::sketch::XorFilter;

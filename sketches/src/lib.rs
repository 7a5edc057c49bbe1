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

//! Approximate, hash-based data structures ("sketches") that trade
//! exactness for bounded error and bounded memory, by contract rather
//! than by accident.
//!
//! Three families, each behind a capability trait in [`traits`]:
//!
//! - **Membership filters**: "possibly present / definitely absent" with
//!   a bounded false-positive rate. [`bloom::BloomFilter`],
//!   [`bloom::BlockedBloomFilter`], [`cuckoo::CuckooFilter`],
//!   [`quotient::QuotientFilter`], and the build-once [`xor::XorFilter`].
//! - **Frequency sketches**: "estimated count of item X" with bounded
//!   error. [`countmin::CountMinSketch`] (with a conservative-update
//!   variant) and [`countsketch::CountSketch`].
//! - **Cardinality estimators**: "estimated number of distinct items"
//!   with bounded relative error. [`hll::HyperLogLog`] and
//!   [`hll::HyperLogLogPlusPlus`].
//!
//! Every structure fixes its capacity and error parameters at
//! construction; growth means building a new instance. Each instance owns
//! its backing arrays and its seeded [`hash::SketchHasher`]; there is no
//! process-wide hashing state, so structures never interfere with each
//! other.
//!
//! # Usage
//!
//! ```rust
//! use sketches::bloom::BloomFilterBuilder;
//! use sketches::hll::HyperLogLog;
//!
//! let mut filter = BloomFilterBuilder::with_accuracy(10_000, 0.01)?.build();
//! filter.insert(&"apple");
//! assert!(filter.contains(&"apple"));
//!
//! let mut distinct = HyperLogLog::new(14)?;
//! for i in 0..1_000_u64 {
//!     distinct.add(&i);
//! }
//! assert!(distinct.count() > 900 && distinct.count() < 1_100);
//! # Ok::<(), sketches::error::Error>(())
//! ```
//!
//! # Concurrency
//!
//! Every operation runs to completion on the caller's thread; there are
//! no internal locks and no blocking. Mutation takes `&mut self`, so safe
//! code cannot race a shared instance; callers that share a structure
//! across threads must bring their own synchronization. Read-only
//! operations on an instance that is not concurrently mutated are safe
//! from any number of threads. Sketches that support `merge` (HyperLogLog
//! variants, the frequency sketches, Bloom `union`) can instead be
//! sharded one-instance-per-thread and merged afterwards.

pub mod bloom;
pub mod countmin;
pub mod countsketch;
pub mod cuckoo;
pub mod error;
pub mod hash;
pub mod hll;
pub mod quotient;
pub mod traits;
pub mod xor;

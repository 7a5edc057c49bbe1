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

//! Cuckoo filter for approximate set membership with deletions.
//!
//! Compared to Bloom filters, cuckoo filters support deletion while keeping
//! a compact in-memory representation: each key is represented by a short
//! fingerprint stored in one of two candidate buckets.
//!
//! # Partial-key cuckoo hashing
//!
//! The two candidate buckets of a key are
//!
//! ```text
//! i1 = h(key)
//! i2 = i1 XOR h(fingerprint)
//! ```
//!
//! Because the alternate bucket is derived from the fingerprint's own hash
//! rather than the key, an occupant can be relocated between its two
//! buckets without access to the original key.
//!
//! # Deletion hazard
//!
//! `delete` removes one matching fingerprint. The caller must guarantee the
//! key was previously inserted and not already deleted: deleting a key that
//! was never inserted can remove another key's colliding fingerprint and
//! create false negatives. This is a documented correctness hazard, not a
//! runtime error.
//!
//! # Usage
//!
//! ```rust
//! use sketches::cuckoo::CuckooFilter;
//!
//! let mut filter = CuckooFilter::new(10_000, 0.01)?;
//! filter.insert(&"alice")?;
//! assert!(filter.contains(&"alice"));
//! assert!(filter.delete(&"alice"));
//! assert!(!filter.contains(&"alice"));
//! # Ok::<(), sketches::error::Error>(())
//! ```
//!
//! # References
//!
//! - Fan, Andersen, Kaminsky and Mitzenmacher (2014). "Cuckoo Filter:
//!   Practically Better Than Bloom"

mod sketch;

pub use self::sketch::CuckooFilter;

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

//! Quotient filter for approximate set membership with deletions.
//!
//! Each key's fingerprint is split into a q-bit *quotient* (its home slot)
//! and an r-bit *remainder* (the stored value). Remainders that collide on
//! a quotient form a sorted *run*; runs pushed out of their home slots by
//! earlier runs form linear-probing *clusters*. Three metadata bits per
//! slot encode the layout:
//!
//! - `is_occupied`: some key's home slot is here (describes the slot
//!   index, not the slot's current content)
//! - `is_continuation`: this slot's remainder continues the run started to
//!   its left
//! - `is_shifted`: this slot's remainder is not in its home slot
//!
//! # Capacity policy
//!
//! The structure never degrades silently: inserting into a full table
//! returns `CapacityExceeded`. Well before that point, cluster lengths
//! (and thus operation cost) grow superlinearly once the load factor
//! passes roughly 0.8-0.9, so callers are expected to pre-size using
//! [`QuotientFilter::load_factor`].
//!
//! # Deletion hazard
//!
//! As with the cuckoo filter, deleting a key that was never inserted can
//! remove a colliding key's remainder and create false negatives; callers
//! must only delete keys they previously inserted.
//!
//! # References
//!
//! - Bender et al. (2012). "Don't Thrash: How to Cache Your Hash on Flash"

mod sketch;

pub use self::sketch::QuotientFilter;

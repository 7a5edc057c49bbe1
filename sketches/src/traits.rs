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

//! Capability interfaces per sketch family.
//!
//! There is deliberately no shared base type: each variant is a distinct
//! concrete type implementing the interface of its family, and consumers
//! (the benchmark harness above all) are generic over these traits rather
//! than over a type hierarchy.
//!
//! The introspection accessors on every trait are read-only and
//! side-effect free, O(1) or O(size), and exist so an external harness can
//! compare a structure's theoretical contract against empirical
//! measurements without reaching into its internals.

use std::hash::Hash;

use crate::error::Error;

/// Read side of an approximate membership structure.
///
/// `contains` answers "possibly present" / "definitely absent". Structures
/// that are built once from a full key set (XOR filter) implement only
/// this query surface.
pub trait MembershipQuery {
    /// Tests whether an item is possibly in the set.
    fn contains<T: Hash>(&self, item: &T) -> bool;

    /// Returns the size in bytes of the backing storage.
    fn memory_bytes(&self) -> usize;

    /// Returns the fraction of bits/slots currently in use, in `[0, 1]`.
    fn fill_ratio(&self) -> f64;

    /// Returns the theoretical false-positive probability given the
    /// structure's current state.
    fn false_positive_rate(&self) -> f64;
}

/// An incrementally updatable membership filter.
///
/// Implementations offer no internal locking: mutating a shared instance
/// from several threads requires external synchronization, which the
/// `&mut self` receivers enforce in safe code.
pub trait MembershipFilter: MembershipQuery {
    /// Inserts an item.
    ///
    /// Bounded-relocation structures (Cuckoo, Quotient) return
    /// [`ErrorKind::CapacityExceeded`](crate::error::ErrorKind) when the
    /// item cannot be placed; the structure is then unchanged and the
    /// caller must rebuild at a larger size rather than retry.
    fn insert<T: Hash>(&mut self, item: &T) -> Result<(), Error>;
}

/// An approximate frequency counter.
pub trait FrequencySketch {
    /// Adds `delta` occurrences of `item`.
    fn update<T: Hash>(&mut self, item: &T, delta: u64);

    /// Returns the estimated occurrence count of `item`.
    ///
    /// Signed because Count Sketch both supports negative updates through
    /// its own wider API and can under-estimate.
    fn estimate<T: Hash>(&self, item: &T) -> i64;

    /// Returns the size in bytes of the backing counter table.
    fn memory_bytes(&self) -> usize;

    /// Returns the fraction of counters that are nonzero, in `[0, 1]`.
    fn fill_ratio(&self) -> f64;

    /// Returns the absolute error bound implied by the table shape and the
    /// total weight observed so far.
    fn error_bound(&self) -> f64;
}

/// An approximate distinct counter.
pub trait CardinalityEstimator: Sized {
    /// Observes one item.
    fn add<T: Hash>(&mut self, item: &T);

    /// Returns the estimated number of distinct items observed.
    fn estimate(&self) -> f64;

    /// Merges another estimator of identical shape and seed into this one.
    ///
    /// Merge is commutative, associative and idempotent; mismatched
    /// precision or seed yields
    /// [`ErrorKind::IncompatibleMerge`](crate::error::ErrorKind).
    fn merge(&mut self, other: &Self) -> Result<(), Error>;

    /// Returns the size in bytes of the backing register array.
    fn memory_bytes(&self) -> usize;

    /// Returns the fraction of registers that are nonzero, in `[0, 1]`.
    fn fill_ratio(&self) -> f64;

    /// Returns the theoretical relative standard error of the estimate.
    fn relative_error(&self) -> f64;
}

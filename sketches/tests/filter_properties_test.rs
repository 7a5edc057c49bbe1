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

//! Cross-filter membership properties: inserted keys are always found,
//! for any sequence of interleaved inserts and deletes respecting
//! program order.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use sketches::bloom::BlockedBloomFilter;
use sketches::bloom::BloomFilterBuilder;
use sketches::cuckoo::CuckooFilter;
use sketches::quotient::QuotientFilter;
use sketches::traits::MembershipFilter;
use sketches::traits::MembershipQuery;
use sketches::xor::XorFilter;

fn random_keys(n: usize, seed: u64) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut keys: Vec<u64> = (0..n).map(|_| rng.random()).collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}

fn assert_no_false_negatives<F: MembershipFilter>(filter: &mut F, keys: &[u64]) {
    for key in keys {
        filter.insert(key).unwrap();
    }
    for key in keys {
        assert!(filter.contains(key), "false negative for {key}");
    }
}

#[test]
fn test_bloom_has_no_false_negatives() {
    let mut filter = BloomFilterBuilder::with_accuracy(5_000, 0.01).unwrap().build();
    assert_no_false_negatives(&mut filter, &random_keys(5_000, 1));
}

#[test]
fn test_blocked_bloom_has_no_false_negatives() {
    let mut filter = BlockedBloomFilter::new(5_000, 0.01).unwrap();
    assert_no_false_negatives(&mut filter, &random_keys(5_000, 2));
}

#[test]
fn test_cuckoo_has_no_false_negatives() {
    let mut filter = CuckooFilter::new(5_000, 0.01).unwrap();
    assert_no_false_negatives(&mut filter, &random_keys(4_000, 3));
}

#[test]
fn test_quotient_has_no_false_negatives() {
    let mut filter = QuotientFilter::new(5_000, 0.01).unwrap();
    assert_no_false_negatives(&mut filter, &random_keys(4_000, 4));
}

#[test]
fn test_xor_has_no_false_negatives() {
    let keys = random_keys(5_000, 5);
    let filter = XorFilter::build(&keys, 16).unwrap();
    for key in &keys {
        assert!(filter.contains(key), "false negative for {key}");
    }
}

#[test]
fn test_cuckoo_interleaved_inserts_and_deletes() {
    let mut filter = CuckooFilter::new(2_000, 0.01).unwrap();
    let keys = random_keys(1_500, 6);

    for key in &keys {
        filter.insert(key).unwrap();
    }
    // Delete every other key, in program order.
    for key in keys.iter().step_by(2) {
        assert!(filter.delete(key));
    }
    // Keys never deleted must still be present.
    for key in keys.iter().skip(1).step_by(2) {
        assert!(filter.contains(key), "false negative for {key}");
    }

    // Reinserting deleted keys restores membership.
    for key in keys.iter().step_by(2) {
        filter.insert(key).unwrap();
    }
    for key in &keys {
        assert!(filter.contains(key), "false negative for {key}");
    }
}

#[test]
fn test_quotient_interleaved_inserts_and_deletes() {
    // Wide remainders keep whole-fingerprint collisions (which alias
    // distinct keys under set semantics) out of the picture.
    let mut filter = QuotientFilter::with_parameters(12, 24, 42).unwrap();
    let keys = random_keys(1_200, 7);

    for key in &keys {
        filter.insert(key).unwrap();
    }
    for key in keys.iter().step_by(2) {
        filter.delete(key);
    }
    for key in keys.iter().skip(1).step_by(2) {
        assert!(filter.contains(key), "false negative for {key}");
    }

    for key in keys.iter().step_by(2) {
        filter.insert(key).unwrap();
    }
    for key in &keys {
        assert!(filter.contains(key), "false negative for {key}");
    }
}

#[test]
fn test_introspection_accessors_are_consistent() {
    let mut filter = BloomFilterBuilder::with_accuracy(1_000, 0.01).unwrap().build();
    assert_eq!(filter.fill_ratio(), 0.0);
    assert!(filter.memory_bytes() > 0);

    for key in random_keys(1_000, 8) {
        filter.insert(&key);
    }
    assert!(filter.fill_ratio() > 0.0 && filter.fill_ratio() < 1.0);
    // At design fill the realized rate sits in the neighborhood of the
    // configured target.
    assert!(filter.false_positive_rate() > 0.0005);
    assert!(filter.false_positive_rate() < 0.05);
}

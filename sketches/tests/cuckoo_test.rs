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

//! Cuckoo filter capacity behavior at its design load factor.

use sketches::cuckoo::CuckooFilter;
use sketches::error::ErrorKind;

#[test]
fn test_design_load_inserts_succeed() {
    // Spec scenario: a filter with bucket capacity for 1,000 items at a
    // 0.95 load-factor ceiling (256 four-slot buckets = 1,024 slots).
    // Inserting 950 distinct keys must all succeed; one more key may
    // legitimately fail with CapacityExceeded.
    let mut filter = CuckooFilter::with_parameters(256, 12, 500, 9001).unwrap();
    assert_eq!(filter.slot_count(), 1_024);

    for value in 0_u64..950 {
        filter
            .insert(&value)
            .unwrap_or_else(|err| panic!("insert {value} failed below design load: {err}"));
    }
    assert_eq!(filter.len(), 950);
    assert!(filter.load_factor() > 0.9);

    for value in 0_u64..950 {
        assert!(filter.contains(&value), "false negative for {value}");
    }

    // Past the design load the filter may refuse; if it does, the error
    // is the typed capacity signal and the state is untouched.
    if let Err(err) = filter.insert(&950_u64) {
        assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
        assert_eq!(filter.len(), 950);
    }
}

#[test]
fn test_rebuild_larger_after_capacity_exceeded() {
    let mut small = CuckooFilter::with_parameters(8, 12, 100, 1).unwrap();
    let mut inserted = Vec::new();
    let mut value = 0_u64;
    let overflow = loop {
        match small.insert(&value) {
            Ok(()) => inserted.push(value),
            Err(_) => break value,
        }
        value += 1;
    };

    // The caller contract: rebuild at a larger size and replay.
    let mut bigger = CuckooFilter::with_parameters(32, 12, 500, 1).unwrap();
    for value in &inserted {
        bigger.insert(value).unwrap();
    }
    bigger.insert(&overflow).unwrap();
    for value in inserted.iter().chain(std::iter::once(&overflow)) {
        assert!(bigger.contains(value));
    }
}

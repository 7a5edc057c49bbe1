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

//! Measurement drivers, generic over the library's family traits.
//!
//! The library itself has no timing, no locking and no budgets; this
//! module owns all of that. Concurrent throughput is measured the way the
//! structures support it: mergeable estimators are sharded one instance
//! per thread and merged afterwards, non-mergeable filters go behind a
//! mutex.

use std::collections::HashMap;
use std::hint::black_box;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use sketches::traits::CardinalityEstimator;
use sketches::traits::FrequencySketch;
use sketches::traits::MembershipFilter;
use sketches::traits::MembershipQuery;

use crate::workload::Dataset;

/// An operation count with the wall-clock time it took.
#[derive(Debug, Clone, Copy)]
pub struct Measurement {
    pub operations: u64,
    pub elapsed: Duration,
}

impl Measurement {
    /// Operations per second.
    pub fn throughput(&self) -> f64 {
        if self.elapsed.is_zero() {
            return 0.0;
        }
        self.operations as f64 / self.elapsed.as_secs_f64()
    }

    /// Mean nanoseconds per operation.
    pub fn mean_latency_nanos(&self) -> f64 {
        if self.operations == 0 {
            return 0.0;
        }
        self.elapsed.as_nanos() as f64 / self.operations as f64
    }
}

/// Space, time and accuracy measurements of one membership filter.
#[derive(Debug, Clone)]
pub struct FilterReport {
    pub name: String,
    /// Time to populate the structure (inserts, or construction for the
    /// build-once filters).
    pub build: Measurement,
    pub query: Measurement,
    pub empirical_fpp: f64,
    pub theoretical_fpp: f64,
    pub memory_bytes: usize,
    pub bits_per_key: f64,
    pub fill_ratio: f64,
}

/// Drives an updatable filter through inserts and queries.
///
/// Inserts that fail with a capacity error are skipped, not fatal: the
/// point of the harness is to report behavior at the configured size.
pub fn measure_filter<F: MembershipFilter>(
    name: &str,
    filter: &mut F,
    dataset: &Dataset,
    query_budget: Duration,
) -> FilterReport {
    let keys = dataset.distinct_inserted();

    let start = Instant::now();
    let mut inserted = 0_u64;
    for key in &keys {
        if filter.insert(key).is_ok() {
            inserted += 1;
        }
    }
    let build = Measurement {
        operations: inserted,
        elapsed: start.elapsed(),
    };

    measure_query_surface(name, filter, dataset, build, query_budget)
}

/// Measures the query surface of an already-populated filter; used
/// directly for construction-only structures, with `build` holding the
/// construction timing.
pub fn measure_query_surface<F: MembershipQuery>(
    name: &str,
    filter: &F,
    dataset: &Dataset,
    build: Measurement,
    query_budget: Duration,
) -> FilterReport {
    let query = timed_queries(filter, &dataset.queries_present, query_budget);

    let mut false_positives = 0_u64;
    for key in &dataset.queries_absent {
        if filter.contains(key) {
            false_positives += 1;
        }
    }
    let empirical_fpp = false_positives as f64 / dataset.queries_absent.len().max(1) as f64;

    let unique = dataset.cardinality().max(1);
    FilterReport {
        name: name.to_string(),
        build,
        query,
        empirical_fpp,
        theoretical_fpp: filter.false_positive_rate(),
        memory_bytes: filter.memory_bytes(),
        bits_per_key: (filter.memory_bytes() * 8) as f64 / unique as f64,
        fill_ratio: filter.fill_ratio(),
    }
}

/// Space, time and accuracy measurements of one frequency sketch.
#[derive(Debug, Clone)]
pub struct FrequencyReport {
    pub name: String,
    pub update: Measurement,
    pub estimate: Measurement,
    /// Mean absolute estimation error over the distinct keys.
    pub mean_absolute_error: f64,
    /// The structure's own error bound at its current state.
    pub theoretical_bound: f64,
    pub memory_bytes: usize,
    pub fill_ratio: f64,
}

/// Drives a frequency sketch through the full stream, then compares
/// per-key estimates against exact counts.
pub fn measure_frequency<S: FrequencySketch>(
    name: &str,
    sketch: &mut S,
    dataset: &Dataset,
) -> FrequencyReport {
    let start = Instant::now();
    for key in &dataset.inserted {
        sketch.update(key, 1);
    }
    let update = Measurement {
        operations: dataset.inserted.len() as u64,
        elapsed: start.elapsed(),
    };

    let mut truth: HashMap<u64, u64> = HashMap::new();
    for key in &dataset.inserted {
        *truth.entry(*key).or_insert(0) += 1;
    }

    let start = Instant::now();
    let mut absolute_error_sum = 0.0_f64;
    for (key, count) in &truth {
        let estimate = sketch.estimate(key);
        absolute_error_sum += (estimate as f64 - *count as f64).abs();
    }
    let estimate = Measurement {
        operations: truth.len() as u64,
        elapsed: start.elapsed(),
    };

    FrequencyReport {
        name: name.to_string(),
        update,
        estimate,
        mean_absolute_error: absolute_error_sum / truth.len().max(1) as f64,
        theoretical_bound: sketch.error_bound(),
        memory_bytes: sketch.memory_bytes(),
        fill_ratio: sketch.fill_ratio(),
    }
}

/// Space, time and accuracy measurements of one cardinality estimator.
#[derive(Debug, Clone)]
pub struct CardinalityReport {
    pub name: String,
    pub add: Measurement,
    pub estimate: f64,
    pub exact: usize,
    pub observed_relative_error: f64,
    pub theoretical_relative_error: f64,
    pub memory_bytes: usize,
}

/// Feeds the whole stream into an estimator and compares the estimate
/// against the exact distinct count.
pub fn measure_cardinality<E: CardinalityEstimator>(
    name: &str,
    estimator: &mut E,
    dataset: &Dataset,
) -> CardinalityReport {
    let start = Instant::now();
    for key in &dataset.inserted {
        estimator.add(key);
    }
    let add = Measurement {
        operations: dataset.inserted.len() as u64,
        elapsed: start.elapsed(),
    };

    let exact = dataset.cardinality();
    let estimate = estimator.estimate();
    CardinalityReport {
        name: name.to_string(),
        add,
        estimate,
        exact,
        observed_relative_error: (estimate - exact as f64).abs() / exact.max(1) as f64,
        theoretical_relative_error: estimator.relative_error(),
        memory_bytes: estimator.memory_bytes(),
    }
}

/// Concurrent cardinality throughput via sharding: one private instance
/// per thread, merged afterwards. No locks anywhere; merge is what makes
/// this sound.
pub fn sharded_cardinality<E, F>(
    make: F,
    dataset: &Dataset,
    threads: usize,
) -> (f64, Measurement)
where
    E: CardinalityEstimator + Send,
    F: Fn() -> E + Sync,
{
    let threads = threads.max(1);
    let chunk_size = dataset.inserted.len().div_ceil(threads);
    let make = &make;

    let start = Instant::now();
    let shards: Vec<E> = std::thread::scope(|scope| {
        let handles: Vec<_> = dataset
            .inserted
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    let mut shard = make();
                    for key in chunk {
                        shard.add(key);
                    }
                    shard
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    let elapsed = start.elapsed();

    let mut shards = shards.into_iter();
    let mut merged = shards.next().expect("at least one shard");
    for shard in shards {
        merged.merge(&shard).expect("shards share precision and seed");
    }

    (
        merged.estimate(),
        Measurement {
            operations: dataset.inserted.len() as u64,
            elapsed,
        },
    )
}

/// Concurrent filter throughput for structures without merge: external
/// mutual exclusion around every insert, which is the supported
/// discipline for Cuckoo and Quotient filters.
pub fn locked_filter_inserts<F>(filter: F, dataset: &Dataset, threads: usize) -> (F, Measurement)
where
    F: MembershipFilter + Send,
{
    let threads = threads.max(1);
    let chunk_size = dataset.inserted.len().div_ceil(threads);
    let shared = Mutex::new(filter);
    let shared_ref = &shared;

    let start = Instant::now();
    std::thread::scope(|scope| {
        for chunk in dataset.inserted.chunks(chunk_size) {
            scope.spawn(move || {
                for key in chunk {
                    let mut guard = shared_ref.lock().unwrap();
                    let _ = guard.insert(key);
                }
            });
        }
    });
    let elapsed = start.elapsed();

    (
        shared.into_inner().unwrap(),
        Measurement {
            operations: dataset.inserted.len() as u64,
            elapsed,
        },
    )
}

/// Repeats passes over the query set until the wall-clock budget is
/// spent; the library has no timeout semantics of its own, so the budget
/// lives entirely out here.
fn timed_queries<F: MembershipQuery>(
    filter: &F,
    queries: &[u64],
    budget: Duration,
) -> Measurement {
    if queries.is_empty() {
        return Measurement {
            operations: 0,
            elapsed: Duration::ZERO,
        };
    }

    let start = Instant::now();
    let mut operations = 0_u64;
    let mut hits = 0_u64;
    loop {
        for key in queries {
            if filter.contains(key) {
                hits += 1;
            }
        }
        operations += queries.len() as u64;
        if start.elapsed() >= budget {
            break;
        }
    }
    black_box(hits);

    Measurement {
        operations,
        elapsed: start.elapsed(),
    }
}

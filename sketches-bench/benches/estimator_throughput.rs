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

use std::hint::black_box;

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use rand::Rng;
use sketches::countmin::CountMinSketch;
use sketches::countsketch::CountSketch;
use sketches::hll::HyperLogLog;
use sketches::hll::HyperLogLogPlusPlus;

fn countmin_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("countmin_update");

    for buckets in [256_u32, 4_096, 65_536] {
        group.bench_with_input(
            BenchmarkId::from_parameter(buckets),
            &buckets,
            |b, &buckets| {
                let mut sketch = CountMinSketch::new(5, buckets).unwrap();
                let mut rng = rand::rng();
                b.iter(|| {
                    let item: u64 = rng.random_range(0..100_000);
                    sketch.update(black_box(&item), 1);
                });
            },
        );
    }
    group.finish();
}

fn countmin_estimate(c: &mut Criterion) {
    let mut sketch = CountMinSketch::new(5, 4_096).unwrap();
    for i in 0_u64..100_000 {
        sketch.update(&(i % 10_000), 1);
    }

    c.bench_function("countmin_estimate", |b| {
        let mut rng = rand::rng();
        b.iter(|| {
            let item: u64 = rng.random_range(0..10_000);
            black_box(sketch.estimate(&item));
        });
    });
}

fn countsketch_update(c: &mut Criterion) {
    let mut sketch = CountSketch::new(5, 4_096).unwrap();
    c.bench_function("countsketch_update", |b| {
        let mut rng = rand::rng();
        b.iter(|| {
            let item: u64 = rng.random_range(0..100_000);
            sketch.update(black_box(&item), 1);
        });
    });
}

fn hll_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("hll_add");

    for precision in [12_u8, 14, 16] {
        group.bench_with_input(
            BenchmarkId::from_parameter(precision),
            &precision,
            |b, &precision| {
                let mut hll = HyperLogLog::new(precision).unwrap();
                let mut rng = rand::rng();
                b.iter(|| {
                    let item: u64 = rng.random();
                    hll.add(black_box(&item));
                });
            },
        );
    }
    group.finish();
}

fn hll_estimate(c: &mut Criterion) {
    let mut hll = HyperLogLog::new(14).unwrap();
    let mut plusplus = HyperLogLogPlusPlus::new(14).unwrap();
    for i in 0_u64..100_000 {
        hll.add(&i);
        plusplus.add(&i);
    }

    c.bench_function("hll_estimate", |b| {
        b.iter(|| black_box(hll.estimate()));
    });
    c.bench_function("hllpp_estimate", |b| {
        b.iter(|| black_box(plusplus.estimate()));
    });
}

criterion_group!(
    benches,
    countmin_update,
    countmin_estimate,
    countsketch_update,
    hll_add,
    hll_estimate
);
criterion_main!(benches);

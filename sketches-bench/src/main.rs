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

use std::time::Duration;
use std::time::Instant;

use clap::Parser;
use clap::ValueEnum;
use sketches::bloom::BlockedBloomFilter;
use sketches::bloom::BloomFilterBuilder;
use sketches::countmin::CountMinSketch;
use sketches::countsketch::CountSketch;
use sketches::cuckoo::CuckooFilter;
use sketches::hll::HyperLogLog;
use sketches::hll::HyperLogLogPlusPlus;
use sketches::quotient::QuotientFilter;
use sketches::xor::XorFilter;
use sketches_bench::measure;
use sketches_bench::measure::Measurement;
use sketches_bench::report;
use sketches_bench::workload::Dataset;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Workload {
    Uniform,
    Zipfian,
    TimeSeries,
    Adversarial,
}

/// Benchmark harness for the sketches crate.
#[derive(Debug, Parser)]
#[command(name = "sketches-bench", version, about)]
struct Cli {
    /// Workload shape to generate.
    #[arg(long, value_enum, default_value_t = Workload::Uniform)]
    workload: Workload,

    /// Number of insertions in the generated workload.
    #[arg(long, default_value_t = 100_000)]
    items: usize,

    /// Seed for workload generation and every structure under test.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Target false-positive rate for the membership filters.
    #[arg(long, default_value_t = 0.01)]
    fpp: f64,

    /// Only run structures whose name contains this substring.
    #[arg(long)]
    only: Option<String>,

    /// Threads for the concurrent-throughput section.
    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Wall-clock budget per query-throughput measurement, milliseconds.
    #[arg(long, default_value_t = 200)]
    query_budget_ms: u64,

    /// Print dataset statistics before the result tables.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let dataset = match cli.workload {
        Workload::Uniform => Dataset::uniform(cli.items, cli.seed),
        Workload::Zipfian => Dataset::zipfian(cli.items, (cli.items / 10).max(10), 1.07, cli.seed),
        Workload::TimeSeries => Dataset::time_series(cli.items, cli.seed),
        Workload::Adversarial => Dataset::adversarial(cli.items, cli.seed),
    };

    if cli.verbose {
        println!("{}\n", dataset.stats());
    }

    let selected = |name: &str| {
        cli.only
            .as_deref()
            .map(|needle| name.contains(needle))
            .unwrap_or(true)
    };
    let budget = Duration::from_millis(cli.query_budget_ms);
    let unique = dataset.cardinality();

    let mut filter_reports = Vec::new();
    if selected("bloom") {
        let mut filter = BloomFilterBuilder::with_accuracy(unique as u64, cli.fpp)
            .expect("bloom parameters")
            .seed(cli.seed)
            .build();
        filter_reports.push(measure::measure_filter("bloom", &mut filter, &dataset, budget));
    }
    if selected("blocked-bloom") {
        let mut filter =
            BlockedBloomFilter::with_seed(unique as u64, cli.fpp, cli.seed).expect("blocked bloom");
        filter_reports.push(measure::measure_filter(
            "blocked-bloom",
            &mut filter,
            &dataset,
            budget,
        ));
    }
    if selected("cuckoo") {
        let mut filter = CuckooFilter::with_seed(unique, cli.fpp, cli.seed).expect("cuckoo");
        filter_reports.push(measure::measure_filter("cuckoo", &mut filter, &dataset, budget));
    }
    if selected("quotient") {
        let mut filter = QuotientFilter::with_seed(unique, cli.fpp, cli.seed).expect("quotient");
        filter_reports.push(measure::measure_filter(
            "quotient",
            &mut filter,
            &dataset,
            budget,
        ));
    }
    if selected("xor") {
        let keys = dataset.distinct_inserted();
        let start = Instant::now();
        let filter = XorFilter::build_with_seed(&keys, 16, cli.seed).expect("xor construction");
        let build = Measurement {
            operations: keys.len() as u64,
            elapsed: start.elapsed(),
        };
        filter_reports.push(measure::measure_query_surface(
            "xor", &filter, &dataset, build, budget,
        ));
    }
    if !filter_reports.is_empty() {
        println!("{}", report::render_filter_reports(&filter_reports));
    }

    let mut frequency_reports = Vec::new();
    if selected("count-min") {
        let mut sketch = CountMinSketch::with_seed(5, 4096, cli.seed).expect("count-min");
        frequency_reports.push(measure::measure_frequency("count-min", &mut sketch, &dataset));
    }
    if selected("count-min-cu") {
        let mut sketch = CountMinSketch::with_seed(5, 4096, cli.seed)
            .expect("count-min")
            .with_conservative_update();
        frequency_reports.push(measure::measure_frequency(
            "count-min-cu",
            &mut sketch,
            &dataset,
        ));
    }
    if selected("count-sketch") {
        let mut sketch = CountSketch::with_seed(5, 4096, cli.seed).expect("count-sketch");
        frequency_reports.push(measure::measure_frequency(
            "count-sketch",
            &mut sketch,
            &dataset,
        ));
    }
    if !frequency_reports.is_empty() {
        println!("{}", report::render_frequency_reports(&frequency_reports));
    }

    let mut cardinality_reports = Vec::new();
    if selected("hll") {
        let mut estimator = HyperLogLog::with_seed(14, cli.seed).expect("hll");
        cardinality_reports.push(measure::measure_cardinality("hll", &mut estimator, &dataset));
    }
    if selected("hll++") {
        let mut estimator = HyperLogLogPlusPlus::with_seed(14, cli.seed).expect("hll++");
        cardinality_reports.push(measure::measure_cardinality(
            "hll++",
            &mut estimator,
            &dataset,
        ));
    }
    if !cardinality_reports.is_empty() {
        println!("{}", report::render_cardinality_reports(&cardinality_reports));
    }

    if cli.threads > 1 && selected("hll") {
        let seed = cli.seed;
        let (estimate, measurement) = measure::sharded_cardinality(
            || HyperLogLog::with_seed(14, seed).expect("hll shard"),
            &dataset,
            cli.threads,
        );
        println!(
            "sharded hll ({} threads): {:.0} adds/s, estimate {estimate:.0} (exact {unique})",
            cli.threads,
            measurement.throughput(),
        );
    }
    if cli.threads > 1 && selected("cuckoo") {
        let filter = CuckooFilter::with_seed(unique, cli.fpp, cli.seed).expect("cuckoo");
        let (_, measurement) = measure::locked_filter_inserts(filter, &dataset, cli.threads);
        println!(
            "locked cuckoo ({} threads): {:.0} inserts/s under external mutex",
            cli.threads,
            measurement.throughput(),
        );
    }
}

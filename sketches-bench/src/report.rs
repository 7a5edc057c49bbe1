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

//! Plaintext report tables for the measurement results.

use std::fmt::Write as _;

use crate::measure::CardinalityReport;
use crate::measure::FilterReport;
use crate::measure::FrequencyReport;

/// Renders the membership-filter comparison table.
pub fn render_filter_reports(reports: &[FilterReport]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16} {:>12} {:>12} {:>10} {:>10} {:>10} {:>7}",
        "filter", "build op/s", "query op/s", "fpp(emp)", "fpp(theo)", "bits/key", "fill"
    );
    for report in reports {
        let _ = writeln!(
            out,
            "{:<16} {:>12.0} {:>12.0} {:>10.5} {:>10.5} {:>10.1} {:>7.3}",
            report.name,
            report.build.throughput(),
            report.query.throughput(),
            report.empirical_fpp,
            report.theoretical_fpp,
            report.bits_per_key,
            report.fill_ratio,
        );
    }
    out
}

/// Renders the frequency-sketch comparison table.
pub fn render_frequency_reports(reports: &[FrequencyReport]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20} {:>12} {:>12} {:>12} {:>12} {:>10}",
        "sketch", "update op/s", "est op/s", "mean |err|", "bound", "bytes"
    );
    for report in reports {
        let _ = writeln!(
            out,
            "{:<20} {:>12.0} {:>12.0} {:>12.2} {:>12.1} {:>10}",
            report.name,
            report.update.throughput(),
            report.estimate.throughput(),
            report.mean_absolute_error,
            report.theoretical_bound,
            report.memory_bytes,
        );
    }
    out
}

/// Renders the cardinality-estimator comparison table.
pub fn render_cardinality_reports(reports: &[CardinalityReport]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16} {:>12} {:>12} {:>10} {:>10} {:>10} {:>8}",
        "estimator", "add op/s", "estimate", "exact", "err(obs)", "err(theo)", "bytes"
    );
    for report in reports {
        let _ = writeln!(
            out,
            "{:<16} {:>12.0} {:>12.0} {:>10} {:>10.4} {:>10.4} {:>8}",
            report.name,
            report.add.throughput(),
            report.estimate,
            report.exact,
            report.observed_relative_error,
            report.theoretical_relative_error,
            report.memory_bytes,
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::measure::FilterReport;
    use crate::measure::Measurement;

    use super::render_filter_reports;

    #[test]
    fn test_table_has_header_and_rows() {
        let report = FilterReport {
            name: "bloom".to_string(),
            build: Measurement {
                operations: 1_000,
                elapsed: Duration::from_millis(10),
            },
            query: Measurement {
                operations: 10_000,
                elapsed: Duration::from_millis(5),
            },
            empirical_fpp: 0.0101,
            theoretical_fpp: 0.0100,
            memory_bytes: 1_280,
            bits_per_key: 10.2,
            fill_ratio: 0.482,
        };

        let table = render_filter_reports(&[report]);
        let mut lines = table.lines();
        assert!(lines.next().unwrap().contains("query op/s"));
        assert!(lines.next().unwrap().starts_with("bloom"));
    }
}

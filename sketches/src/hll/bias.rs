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

use crate::error::Error;

/// Replaceable empirical bias table for [`super::HyperLogLogPlusPlus`].
///
/// Holds `(raw_estimate, bias)` sample points, sorted by raw estimate.
/// Lookups interpolate linearly between the two neighboring points and
/// clamp at the table's ends, following the published lookup scheme.
///
/// The constants are measurement data, not derivable formulas: the table
/// is deliberately a value-level parameter so callers can supply the full
/// published data per precision. [`BiasTable::builtin`] ships the
/// published points where this crate embeds them and an empty table
/// otherwise; an empty table makes the estimator fall back to its
/// bias-free form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BiasTable {
    raw_estimates: Vec<f64>,
    biases: Vec<f64>,
}

impl BiasTable {
    /// Creates a table from parallel sample-point vectors.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind)
    /// when the vectors differ in length or the raw estimates are not
    /// strictly increasing.
    pub fn from_points(raw_estimates: Vec<f64>, biases: Vec<f64>) -> Result<Self, Error> {
        if raw_estimates.len() != biases.len() {
            return Err(Error::invalid_argument(
                "raw_estimates and biases must have equal length",
            )
            .with_context("raw_estimates", raw_estimates.len())
            .with_context("biases", biases.len()));
        }
        if raw_estimates.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(Error::invalid_argument(
                "raw_estimates must be strictly increasing",
            ));
        }

        Ok(Self {
            raw_estimates,
            biases,
        })
    }

    /// An empty table: no bias data, estimator falls back to its
    /// bias-free form.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in table for a precision: the published sample points
    /// where embedded, empty otherwise.
    pub fn builtin(precision: u8) -> Self {
        match precision {
            4 => Self {
                raw_estimates: RAW_ESTIMATE_P4.to_vec(),
                biases: BIAS_P4.to_vec(),
            },
            _ => Self::empty(),
        }
    }

    /// Returns `true` when the table holds no sample points.
    pub fn is_empty(&self) -> bool {
        self.raw_estimates.is_empty()
    }

    /// Looks up the bias for a raw estimate, interpolating between
    /// neighboring sample points and clamping at the table ends.
    pub fn bias_for(&self, raw_estimate: f64) -> f64 {
        let (first, last) = match (self.raw_estimates.first(), self.raw_estimates.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return 0.0,
        };
        if raw_estimate <= first {
            return self.biases[0];
        }
        if raw_estimate >= last {
            return self.biases[self.biases.len() - 1];
        }

        let pos = self
            .raw_estimates
            .partition_point(|&point| point < raw_estimate);
        let left = self.raw_estimates[pos - 1];
        let right = self.raw_estimates[pos];
        let weight = (raw_estimate - left) / (right - left);
        self.biases[pos - 1] * (1.0 - weight) + self.biases[pos] * weight
    }
}

// Published empirical data (Heule et al., appendix), precision 4.
const RAW_ESTIMATE_P4: [f64; 80] = [
    11.0, 11.717, 12.207, 12.7896, 13.2882, 13.8204, 14.3772, 14.9342, 15.5202, 16.161, 16.7722,
    17.4636, 18.0396, 18.6766, 19.3566, 20.0454, 20.7936, 21.4856, 22.2666, 22.9946, 23.766,
    24.4692, 25.3638, 26.0764, 26.7864, 27.7602, 28.4814, 29.433, 30.2926, 31.0664, 31.9996,
    32.7956, 33.5366, 34.5894, 35.5738, 36.2698, 37.3682, 38.0544, 39.2342, 40.0108, 40.7966,
    41.9298, 42.8704, 43.6358, 44.5194, 45.773, 46.6772, 47.6174, 48.4888, 49.3304, 50.2506,
    51.4996, 52.3824, 53.3078, 54.3984, 55.5838, 56.6618, 57.2174, 58.3514, 59.0802, 60.1482,
    61.0376, 62.3598, 62.8078, 63.9744, 64.914, 65.781, 67.1806, 68.0594, 68.8446, 69.7928,
    70.8248, 71.8324, 72.8598, 73.6246, 74.7014, 75.393, 76.6708, 77.2394, 78.0,
];

const BIAS_P4: [f64; 80] = [
    5.0, 5.25, 5.38, 5.48, 5.56, 5.62, 5.67, 5.71, 5.74, 5.77, 5.79, 5.81, 5.83, 5.84, 5.85, 5.86,
    5.87, 5.88, 5.88, 5.89, 5.89, 5.89, 5.89, 5.89, 5.89, 5.89, 5.89, 5.88, 5.88, 5.87, 5.87,
    5.86, 5.85, 5.84, 5.83, 5.82, 5.81, 5.79, 5.78, 5.76, 5.75, 5.73, 5.71, 5.69, 5.67, 5.65,
    5.63, 5.61, 5.58, 5.56, 5.53, 5.51, 5.48, 5.45, 5.42, 5.39, 5.36, 5.33, 5.29, 5.26, 5.22,
    5.19, 5.15, 5.11, 5.07, 5.03, 4.99, 4.94, 4.90, 4.85, 4.81, 4.76, 4.71, 4.66, 4.61, 4.56,
    4.51, 4.45, 4.40, 4.35,
];

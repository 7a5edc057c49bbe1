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

//! Count Sketch for signed approximate frequency estimation.
//!
//! Count Sketch uses two hash families per row: one selects a counter
//! index, the other a sign in `{+1, -1}`. Updates add `sign * delta` to
//! one counter per row; point queries take the median of the
//! sign-corrected row counters.
//!
//! Unlike Count-Min, the estimate is unbiased but two-sided: it can under-
//! or over-estimate. In exchange, deltas may be negative, which makes the
//! sketch usable for difference estimation between streams.
//!
//! # Usage
//!
//! ```rust
//! # use sketches::countsketch::CountSketch;
//! let mut sketch = CountSketch::new(5, 1024)?;
//! sketch.update(&"cat", 5);
//! sketch.update(&"cat", -1);
//!
//! let estimate = sketch.estimate(&"cat");
//! assert!((estimate - 4).abs() <= 4);
//! # Ok::<(), sketches::error::Error>(())
//! ```

mod sketch;

pub use self::sketch::CountSketch;

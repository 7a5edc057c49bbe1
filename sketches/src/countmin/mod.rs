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

//! Count-Min sketch implementation for frequency estimation.
//!
//! The Count-Min sketch provides approximate frequency counts for
//! streaming data with configurable relative error and confidence bounds.
//! Counters are unsigned and updates are non-negative, so for every key
//! the estimate is greater than or equal to the true count.
//!
//! # Usage
//!
//! ```rust
//! # use sketches::countmin::CountMinSketch;
//! let mut sketch = CountMinSketch::new(5, 256)?;
//! sketch.update(&"apple", 1);
//! sketch.update(&"banana", 3);
//! assert!(sketch.estimate(&"banana") >= 3);
//! # Ok::<(), sketches::error::Error>(())
//! ```
//!
//! # Configuration Helpers
//!
//! ```rust
//! # use sketches::countmin::CountMinSketch;
//! let buckets = CountMinSketch::suggest_num_buckets(0.01);
//! let hashes = CountMinSketch::suggest_num_hashes(0.99);
//! let _sketch = CountMinSketch::new(hashes, buckets)?;
//! # Ok::<(), sketches::error::Error>(())
//! ```
//!
//! # Conservative update
//!
//! [`CountMinSketch::with_conservative_update`] switches the sketch to
//! only raise the counters that currently sit at the row minimum, which
//! reduces over-estimation for skewed streams. The trade-off is that a
//! conservative sketch is no longer trivially mergeable and refuses
//! `merge`.

mod sketch;

pub use self::sketch::CountMinSketch;

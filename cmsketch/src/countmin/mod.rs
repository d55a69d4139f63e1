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

//! Count-Min sketch for frequency estimation.
//!
//! The sketch keeps a single vector of saturating counters. Each item is
//! hashed with SipHash-2-4 under two per-sketch secret keys, and further
//! positions are derived by enhanced double hashing, so an adversary who
//! does not know the keys cannot aim collisions at chosen items.
//!
//! # Usage
//!
//! ```rust
//! use cmsketch::countmin::CountMinSketch;
//!
//! let mut sketch = CountMinSketch::new(8000, 1).unwrap();
//!
//! sketch.increment("apple");
//! sketch.increment("apple");
//!
//! assert!(sketch.estimate("apple") >= 2);
//! assert_eq!(sketch.estimate("never seen"), 0);
//! ```
//!
//! # Configuration Helpers
//!
//! ```rust
//! use cmsketch::countmin::CountMinSketchBuilder;
//!
//! let sketch = CountMinSketchBuilder::with_accuracy(10_000, 0.01)
//!     .unwrap()
//!     .granularity(4)
//!     .build()
//!     .unwrap();
//! assert_eq!(sketch.width(), 46052);
//! ```

mod params;
mod sketch;
mod vector;

pub use self::params::COUNTER_BYTES;
pub use self::params::checked_vector_byte_size;
pub use self::params::compute_vector_byte_size;
pub use self::params::optimal_depth;
pub use self::sketch::CountMinSketch;
pub use self::sketch::CountMinSketchBuilder;

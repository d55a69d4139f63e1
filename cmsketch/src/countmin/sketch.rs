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

use std::fmt;

use tracing::debug;
use tracing::trace;
use tracing::warn;

use super::params::COUNTER_BYTES;
use super::params::checked_vector_byte_size;
use super::params::optimal_depth;
use super::vector::CounterVector;
use crate::common::KeySource;
use crate::common::OsKeySource;
use crate::error::Error;
use crate::hash::DoubleHasher;

/// A Count-Min sketch over byte-string items.
///
/// Every item maps to `depth` counters out of `width`, chosen by SipHash-2-4
/// under two secret keys drawn when the sketch is built. Estimates never
/// fall below the true count of an item; collisions can only push them up.
///
/// The sketch has no interior synchronization: [`increment`](Self::increment)
/// takes `&mut self`, so share it across threads behind a lock.
pub struct CountMinSketch {
    hasher: DoubleHasher,
    counters: CounterVector,
    depth: usize,
}

impl CountMinSketch {
    /// Creates a sketch with a `vector_size_bytes` counter budget, using
    /// `items_count` as the depth granularity.
    ///
    /// The vector holds `vector_size_bytes / 8` counters, and never fewer
    /// than one. Keys are drawn from the operating system CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the counter vector cannot be allocated or the
    /// random source fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmsketch::countmin::CountMinSketch;
    ///
    /// let mut sketch = CountMinSketch::new(800, 10).unwrap();
    /// assert_eq!(sketch.width(), 100);
    ///
    /// sketch.increment("apple");
    /// assert!(sketch.estimate("apple") >= 1);
    /// ```
    pub fn new(vector_size_bytes: usize, items_count: usize) -> Result<Self, Error> {
        CountMinSketchBuilder::with_size(vector_size_bytes)
            .granularity(items_count)
            .build()
    }

    /// Returns a builder for creating a sketch.
    pub fn builder(vector_size_bytes: usize) -> CountMinSketchBuilder {
        CountMinSketchBuilder::with_size(vector_size_bytes)
    }

    /// Counts one occurrence of `item`.
    ///
    /// Returns `true` if any of the item's counters was already saturated
    /// and therefore left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cmsketch::countmin::CountMinSketch;
    /// let mut sketch = CountMinSketch::new(8000, 1).unwrap();
    /// let overflow = sketch.increment(b"apple");
    /// assert!(!overflow);
    /// ```
    pub fn increment(&mut self, item: impl AsRef<[u8]>) -> bool {
        let mut overflow = false;
        for slot in self
            .hasher
            .positions(item.as_ref(), self.depth, self.counters.len())
        {
            overflow |= self.counters.increment(slot);
        }
        if overflow {
            trace!("count-min counter saturated");
        }
        overflow
    }

    /// Returns the estimated count of `item`: the smallest of its counters.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cmsketch::countmin::CountMinSketch;
    /// let mut sketch = CountMinSketch::new(8000, 1).unwrap();
    /// assert_eq!(sketch.estimate("zzz"), 0);
    ///
    /// for _ in 0..3 {
    ///     sketch.increment("apple");
    /// }
    /// assert!(sketch.estimate("apple") >= 3);
    /// ```
    pub fn estimate(&self, item: impl AsRef<[u8]>) -> u64 {
        self.hasher
            .positions(item.as_ref(), self.depth, self.counters.len())
            .map(|slot| self.counters.get(slot))
            .min()
            .unwrap_or(0)
    }

    /// Returns the number of counters (the sketch width).
    pub fn width(&self) -> usize {
        self.counters.len()
    }

    /// Returns the number of hash rounds per operation.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the size of the counter vector in bytes.
    pub fn vector_size_bytes(&self) -> usize {
        self.counters.len() * COUNTER_BYTES
    }

    /// Returns whether nothing has been counted yet.
    pub fn is_empty(&self) -> bool {
        self.counters.is_zero()
    }
}

impl fmt::Debug for CountMinSketch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountMinSketch")
            .field("width", &self.width())
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

/// Builder for creating [`CountMinSketch`] instances.
///
/// Provides two construction modes:
/// - [`with_size()`](Self::with_size): Specify the counter vector byte budget
/// - [`with_accuracy()`](Self::with_accuracy): Derive the budget from an
///   expected item count and a target false positive probability
#[derive(Debug, Clone)]
pub struct CountMinSketchBuilder {
    vector_size_bytes: usize,
    granularity: usize,
}

impl CountMinSketchBuilder {
    /// Creates a builder for a sketch with a `vector_size_bytes` counter
    /// budget and a granularity of 1.
    pub fn with_size(vector_size_bytes: usize) -> Self {
        CountMinSketchBuilder {
            vector_size_bytes,
            granularity: 1,
        }
    }

    /// Creates a builder sized for `items_count` items at a target false
    /// positive probability, using `items_count` as the granularity.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigInvalid` error under the same conditions as
    /// [`checked_vector_byte_size`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use cmsketch::countmin::CountMinSketchBuilder;
    /// let sketch = CountMinSketchBuilder::with_accuracy(1000, 0.01)
    ///     .unwrap()
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(sketch.width(), 4605);
    /// assert_eq!(sketch.depth(), 1);
    /// ```
    pub fn with_accuracy(
        items_count: usize,
        target_false_positive_probability: f64,
    ) -> Result<Self, Error> {
        let vector_size_bytes =
            checked_vector_byte_size(items_count, target_false_positive_probability)?;
        Ok(CountMinSketchBuilder {
            vector_size_bytes,
            granularity: items_count,
        })
    }

    /// Sets the granularity that divides the depth.
    pub fn granularity(mut self, granularity: usize) -> Self {
        self.granularity = granularity;
        self
    }

    /// Builds the sketch with keys from the operating system CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the counter vector cannot be allocated or the
    /// random source fails.
    pub fn build(self) -> Result<CountMinSketch, Error> {
        self.build_with_key_source(OsKeySource)
    }

    /// Builds the sketch with keys drawn from `source`.
    ///
    /// Two sketches built from sources that yield the same keys place every
    /// item in the same slots.
    ///
    /// # Errors
    ///
    /// Returns an error if the counter vector cannot be allocated or
    /// `source` fails.
    pub fn build_with_key_source(
        self,
        mut source: impl KeySource,
    ) -> Result<CountMinSketch, Error> {
        let mut width = self.vector_size_bytes / COUNTER_BYTES;
        if width == 0 {
            warn!(
                vector_size_bytes = self.vector_size_bytes,
                "count-min byte budget is smaller than one counter, using a single counter"
            );
            width = 1;
        }
        let depth = optimal_depth(width, self.granularity);
        let counters = CounterVector::zeroed(width)?;
        let key_a = source.next_key()?;
        let key_b = source.next_key()?;

        debug!(width, depth, "created count-min sketch");
        Ok(CountMinSketch {
            hasher: DoubleHasher::new(key_a, key_b),
            counters,
            depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::KEY_BYTES;

    struct FixedKeys(u8);

    impl KeySource for FixedKeys {
        fn fill_key(&mut self, key: &mut [u8; KEY_BYTES]) -> Result<(), Error> {
            key.fill(self.0);
            self.0 = self.0.wrapping_add(1);
            Ok(())
        }
    }

    fn fixed_sketch(vector_size_bytes: usize, granularity: usize) -> CountMinSketch {
        CountMinSketchBuilder::with_size(vector_size_bytes)
            .granularity(granularity)
            .build_with_key_source(FixedKeys(1))
            .unwrap()
    }

    #[test]
    fn test_new_sizing() {
        let sketch = CountMinSketch::new(800, 10).unwrap();
        assert_eq!(sketch.width(), 100);
        assert_eq!(sketch.depth(), 1);
        assert_eq!(sketch.vector_size_bytes(), 800);
        assert!(sketch.is_empty());
    }

    #[test]
    fn test_new_truncates_partial_counter() {
        let sketch = CountMinSketch::new(807, 1).unwrap();
        assert_eq!(sketch.width(), 100);
    }

    #[test]
    fn test_tiny_budget_uses_one_counter() {
        let sketch = CountMinSketch::new(3, 10).unwrap();
        assert_eq!(sketch.width(), 1);
        assert_eq!(sketch.depth(), 1);
    }

    #[test]
    fn test_zero_budget_and_granularity() {
        let sketch = CountMinSketch::new(0, 0).unwrap();
        assert_eq!(sketch.width(), 1);
        assert_eq!(sketch.depth(), 1);

        // granularity 0 is raised to 1: ceil(ln(3)) = 2
        let sketch = CountMinSketch::new(24, 0).unwrap();
        assert_eq!(sketch.width(), 3);
        assert_eq!(sketch.depth(), 2);
    }

    #[test]
    fn test_same_keys_same_layout() {
        let mut a = fixed_sketch(8000, 1);
        let b = fixed_sketch(8000, 1);
        assert_eq!(a.depth(), 7);

        a.increment("apple");
        let slots_a: Vec<usize> = a.hasher.positions(b"apple", a.depth, a.width()).collect();
        let slots_b: Vec<usize> = b.hasher.positions(b"apple", b.depth, b.width()).collect();
        assert_eq!(slots_a, slots_b);
        for slot in slots_a {
            assert!(a.counters.get(slot) >= 1);
        }
    }

    #[test]
    fn test_increment_touches_depth_slots() {
        let mut sketch = fixed_sketch(8000, 1);
        sketch.increment("apple");

        let touched: u64 = (0..sketch.width()).map(|i| sketch.counters.get(i)).sum();
        assert_eq!(touched, sketch.depth() as u64);
    }

    #[test]
    fn test_saturated_counters_report_overflow() {
        let mut sketch = fixed_sketch(8, 1);
        sketch.counters.fill(u64::MAX - 1);

        assert!(!sketch.increment("apple"));
        assert_eq!(sketch.estimate("apple"), u64::MAX);

        for _ in 0..3 {
            assert!(sketch.increment("apple"));
            assert_eq!(sketch.estimate("apple"), u64::MAX);
        }
        assert_eq!(sketch.estimate("banana"), u64::MAX);
    }

    #[test]
    fn test_overflow_if_any_round_saturates() {
        let mut sketch = fixed_sketch(8000, 1);
        assert!(!sketch.increment("apple"));

        // saturate only the first round's slot
        let first = sketch
            .hasher
            .positions(b"apple", sketch.depth, sketch.width())
            .next()
            .unwrap();
        sketch.counters.set(first, u64::MAX);

        assert!(sketch.increment("apple"));
        assert!(sketch.estimate("apple") >= 2);
    }

    #[test]
    fn test_key_source_failure() {
        struct Broken;

        impl KeySource for Broken {
            fn fill_key(&mut self, _: &mut [u8; KEY_BYTES]) -> Result<(), Error> {
                Err(Error::new(
                    crate::error::ErrorKind::RandomSourceUnavailable,
                    "no entropy",
                ))
            }
        }

        let err = CountMinSketchBuilder::with_size(64)
            .build_with_key_source(Broken)
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::RandomSourceUnavailable);
    }

    #[test]
    fn test_debug_hides_keys() {
        let sketch = fixed_sketch(80, 1);
        assert_eq!(
            format!("{sketch:?}"),
            "CountMinSketch { width: 10, depth: 3, .. }"
        );
    }
}

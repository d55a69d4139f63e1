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

/// Fixed-length array of saturating 64-bit counters.
///
/// Counters only ever grow: an increment on a counter already at
/// `u64::MAX` leaves it unchanged and reports the overflow.
pub(super) struct CounterVector {
    counters: Box<[u64]>,
}

impl CounterVector {
    /// Allocates `entries` zeroed counters, failing instead of aborting when
    /// the allocation cannot be satisfied.
    pub(super) fn zeroed(entries: usize) -> Result<Self, Error> {
        let mut counters = Vec::new();
        counters
            .try_reserve_exact(entries)
            .map_err(|err| Error::allocation_failed(entries).set_source(err))?;
        counters.resize(entries, 0);
        Ok(CounterVector {
            counters: counters.into_boxed_slice(),
        })
    }

    pub(super) fn len(&self) -> usize {
        self.counters.len()
    }

    /// Increments the counter at `index`; returns `true` if it was already
    /// saturated.
    pub(super) fn increment(&mut self, index: usize) -> bool {
        let counter = &mut self.counters[index];
        match counter.checked_add(1) {
            Some(value) => {
                *counter = value;
                false
            }
            None => true,
        }
    }

    pub(super) fn get(&self, index: usize) -> u64 {
        self.counters[index]
    }

    pub(super) fn is_zero(&self) -> bool {
        self.counters.iter().all(|&count| count == 0)
    }

    #[cfg(test)]
    pub(super) fn set(&mut self, index: usize, value: u64) {
        self.counters[index] = value;
    }

    #[cfg(test)]
    pub(super) fn fill(&mut self, value: u64) {
        self.counters.iter_mut().for_each(|count| *count = value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_zeroed() {
        let counters = CounterVector::zeroed(16).unwrap();
        assert_eq!(counters.len(), 16);
        assert!(counters.is_zero());
        assert!((0..16).all(|i| counters.get(i) == 0));
    }

    #[test]
    fn test_increment() {
        let mut counters = CounterVector::zeroed(4).unwrap();
        assert!(!counters.increment(2));
        assert!(!counters.increment(2));
        assert_eq!(counters.get(2), 2);
        assert_eq!(counters.get(1), 0);
        assert!(!counters.is_zero());
    }

    #[test]
    fn test_increment_saturates() {
        let mut counters = CounterVector::zeroed(2).unwrap();
        counters.fill(u64::MAX - 1);

        assert!(!counters.increment(0));
        assert_eq!(counters.get(0), u64::MAX);

        // ensure clamped
        for _ in 0..3 {
            assert!(counters.increment(0));
            assert_eq!(counters.get(0), u64::MAX);
        }
        assert_eq!(counters.get(1), u64::MAX - 1);
    }

    #[test]
    fn test_allocation_failure() {
        let result = CounterVector::zeroed(usize::MAX);
        assert!(matches!(
            result,
            Err(ref err) if err.kind() == ErrorKind::AllocationFailed
        ));
    }
}

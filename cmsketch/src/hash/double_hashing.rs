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

//! Enhanced double hashing (Kirsch-Mitzenmacher).
//!
//! Two keyed hash evaluations stand in for `k` independent hash functions:
//! round 0 is `h0`, round 1 is `h1`, and every later round `i` is
//! `h0 + ((i * h1) mod P)` with `P = 2^64 - 59`. Products and sums wrap at
//! 64 bits, which keeps positions bit-compatible with deployed sketches.

use super::KeyedHash;
use crate::common::KEY_BYTES;

/// Largest prime below 2^64.
const MODULUS: u64 = 0xffff_ffff_ffff_ffc5;

/// Derives per-round positions from two secret SipHash keys.
pub(crate) struct DoubleHasher {
    keyed: [KeyedHash; 2],
}

impl DoubleHasher {
    pub(crate) fn new(key_a: [u8; KEY_BYTES], key_b: [u8; KEY_BYTES]) -> Self {
        DoubleHasher {
            keyed: [KeyedHash::new(&key_a), KeyedHash::new(&key_b)],
        }
    }

    /// Returns the raw 64-bit hash of `item` for `round`, before reduction
    /// into a slot index.
    #[cfg(test)]
    pub(crate) fn position(&self, item: &[u8], round: usize) -> u64 {
        let hashes = self.base_hashes(item, round + 1);
        round_hash(&hashes, round)
    }

    /// Returns the slot indexes touched by `item` over `depth` rounds in a
    /// vector of `width` slots.
    pub(crate) fn positions(&self, item: &[u8], depth: usize, width: usize) -> Positions {
        debug_assert!(width > 0, "width must be non-zero");
        Positions {
            hashes: self.base_hashes(item, depth),
            round: 0,
            depth,
            width: width as u64,
        }
    }

    // h1 is only needed when more than one round runs.
    fn base_hashes(&self, item: &[u8], rounds: usize) -> [u64; 2] {
        let h0 = self.keyed[0].hash(item);
        let h1 = if rounds > 1 {
            self.keyed[1].hash(item)
        } else {
            0
        };
        [h0, h1]
    }
}

fn round_hash(hashes: &[u64; 2], round: usize) -> u64 {
    match round {
        0 | 1 => hashes[round],
        _ => hashes[0].wrapping_add((round as u64).wrapping_mul(hashes[1]) % MODULUS),
    }
}

/// Iterator over the slot indexes of one item, one per round.
#[derive(Debug, Clone)]
pub(crate) struct Positions {
    hashes: [u64; 2],
    round: usize,
    depth: usize,
    width: u64,
}

impl Iterator for Positions {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.round >= self.depth {
            return None;
        }
        let hash = round_hash(&self.hashes, self.round);
        self.round += 1;
        Some((hash % self.width) as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.depth.saturating_sub(self.round);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Positions {}

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

//! Sizing helpers for Count-Min sketches.

use crate::error::Error;

/// Width in bytes of one sketch counter.
pub const COUNTER_BYTES: usize = size_of::<u64>();

/// Computes a counter vector size in bytes for `items_count` items and a
/// target false positive probability.
///
/// The result is `round(items_count * ln(p)) * COUNTER_BYTES`. For `p` in
/// `(0, 1)` the logarithm is negative, and the negative rounded value is
/// reinterpreted as an unsigned count with the multiplication wrapping, so
/// the returned byte count is enormous. This is kept for compatibility with
/// existing deployments; use [`checked_vector_byte_size`] for a validated
/// size.
///
/// # Examples
///
/// ```
/// use cmsketch::countmin::compute_vector_byte_size;
///
/// assert_eq!(compute_vector_byte_size(1000, 0.01), 36840usize.wrapping_neg());
/// ```
pub fn compute_vector_byte_size(
    items_count: usize,
    target_false_positive_probability: f64,
) -> usize {
    let rounded = (items_count as f64 * target_false_positive_probability.ln()).round();
    (rounded as i64 as usize).wrapping_mul(COUNTER_BYTES)
}

/// Computes a counter vector size in bytes for `items_count` items and a
/// target false positive probability, rejecting inputs the unchecked form
/// silently turns into huge sizes.
///
/// The result is `round(items_count * -ln(p)) * COUNTER_BYTES`.
///
/// # Errors
///
/// Returns a `ConfigInvalid` error if `items_count` is 0, if the probability
/// is not strictly between 0 and 1, or if the size does not fit in `usize`.
///
/// # Examples
///
/// ```
/// use cmsketch::countmin::checked_vector_byte_size;
///
/// assert_eq!(checked_vector_byte_size(1000, 0.01).unwrap(), 36840);
/// assert!(checked_vector_byte_size(1000, 1.5).is_err());
/// ```
pub fn checked_vector_byte_size(
    items_count: usize,
    target_false_positive_probability: f64,
) -> Result<usize, Error> {
    let p = target_false_positive_probability;
    if items_count == 0 {
        return Err(Error::config_invalid("items_count must be greater than 0"));
    }
    if !(p > 0.0 && p < 1.0) {
        return Err(
            Error::config_invalid("false positive probability must be in (0, 1)")
                .with_context("probability", p),
        );
    }

    let magnitude = (items_count as f64 * -p.ln()).round();
    let overflow = || {
        Error::config_invalid("vector size overflows usize")
            .with_context("items_count", items_count)
            .with_context("probability", p)
    };
    if magnitude >= usize::MAX as f64 {
        return Err(overflow());
    }
    (magnitude as usize)
        .checked_mul(COUNTER_BYTES)
        .ok_or_else(overflow)
}

/// Computes the number of hash rounds for a vector of `slot_count` slots.
///
/// `granularity` is first capped to `slot_count`, otherwise raised to 1,
/// and the depth is `ceil(ln(slot_count) / granularity)`, never below 1.
///
/// # Examples
///
/// ```
/// use cmsketch::countmin::optimal_depth;
///
/// assert_eq!(optimal_depth(100, 10), 1);
/// assert_eq!(optimal_depth(1000, 1), 7);
/// ```
pub fn optimal_depth(slot_count: usize, granularity: usize) -> usize {
    let granularity = if granularity >= slot_count {
        slot_count
    } else if granularity < 1 {
        1
    } else {
        granularity
    };
    // NaN and negative infinity both convert to 0 here.
    let depth = ((slot_count as f64).ln() / granularity as f64).ceil() as usize;
    depth.max(1)
}

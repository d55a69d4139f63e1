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

//! Secret key material for keyed hashing.

use crate::error::Error;
use crate::error::ErrorKind;

/// Width in bytes of a SipHash key.
pub const KEY_BYTES: usize = 16;

/// Source of secret key bytes for sketches.
///
/// Keys drawn here decide every hash position of a sketch, so production
/// sources must be cryptographically secure. Deterministic sources are
/// only meant for reproducing an existing sketch layout.
pub trait KeySource {
    /// Fills `key` with fresh key material.
    fn fill_key(&mut self, key: &mut [u8; KEY_BYTES]) -> Result<(), Error>;

    /// Draws a fresh key.
    fn next_key(&mut self) -> Result<[u8; KEY_BYTES], Error> {
        let mut key = [0u8; KEY_BYTES];
        self.fill_key(&mut key)?;
        Ok(key)
    }
}

/// Operating system CSPRNG backed key source.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsKeySource;

impl KeySource for OsKeySource {
    fn fill_key(&mut self, key: &mut [u8; KEY_BYTES]) -> Result<(), Error> {
        getrandom::getrandom(key).map_err(|err| {
            Error::new(
                ErrorKind::RandomSourceUnavailable,
                "failed to draw sketch key from the operating system",
            )
            .set_source(err)
        })
    }
}

impl<S: KeySource + ?Sized> KeySource for &mut S {
    fn fill_key(&mut self, key: &mut [u8; KEY_BYTES]) -> Result<(), Error> {
        (**self).fill_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_keys_differ() {
        let mut source = OsKeySource;
        let a = source.next_key().unwrap();
        let b = source.next_key().unwrap();
        assert_ne!(a, b);
    }
}

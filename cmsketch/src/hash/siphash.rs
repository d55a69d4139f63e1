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

use siphasher::sip::SipHasher24;

use crate::common::KEY_BYTES;

/// SipHash-2-4 keyed with a 128-bit secret, producing 64-bit hashes.
///
/// Output matches the reference SipHash-2-4 (and libsodium's
/// `crypto_shorthash_siphash24` read as a little-endian integer).
pub(crate) struct KeyedHash {
    hasher: SipHasher24,
}

impl KeyedHash {
    pub(crate) fn new(key: &[u8; KEY_BYTES]) -> Self {
        KeyedHash {
            hasher: SipHasher24::new_with_key(key),
        }
    }

    pub(crate) fn hash(&self, bytes: &[u8]) -> u64 {
        self.hasher.hash(bytes)
    }
}

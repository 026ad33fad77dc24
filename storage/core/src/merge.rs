// Copyright (c) 2022 RBB S.r.l
// opensource@mintlayer.org
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://github.com/mintlayer/mintlayer-core/blob/master/LICENSE
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Merge operators combine a stored value with merge operands

/// Combines an existing value with a sequence of merge operands.
pub trait MergeOperator: Send + Sync {
    /// Produce the new value. `existing` is `None` if the key is not present.
    fn full_merge(&self, key: &[u8], existing: Option<&[u8]>, operands: &[&[u8]]) -> Vec<u8>;
}

/// Interpret up to 8 bytes as a little-endian integer. Shorter inputs are zero-extended, longer
/// ones truncated.
pub fn read_i64_le(bytes: &[u8]) -> i64 {
    let mut buf = [0u8; 8];
    let len = bytes.len().min(8);
    buf[..len].copy_from_slice(&bytes[..len]);
    i64::from_le_bytes(buf)
}

/// Counter merge: the value and all operands are signed 64-bit little-endian integers that are
/// added together. Overflow wraps around.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CounterMerge;

impl MergeOperator for CounterMerge {
    fn full_merge(&self, key: &[u8], existing: Option<&[u8]>, operands: &[&[u8]]) -> Vec<u8> {
        let widths_ok = existing.iter().chain(operands).all(|v| v.len() == 8);
        if !widths_ok {
            logging::log::warn!(
                "Counter merge on key {key:x?} with values that are not 8 bytes wide"
            );
        }

        let initial = existing.map_or(0, read_i64_le);
        operands
            .iter()
            .fold(initial, |acc, op| acc.wrapping_add(read_i64_le(op)))
            .to_le_bytes()
            .to_vec()
    }
}

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

//! Store usage statistics

use serde::{Deserialize, Serialize};

/// Snapshot of store usage counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Point reads issued
    pub point_gets: u64,
    /// Scan requests, one per cursor seek
    pub queries: u64,
    /// Result pages fetched, including continuation pages
    pub pages: u64,
    /// Records returned by point reads and scans
    pub items_read: u64,
    /// Batches committed
    pub transactions: u64,
    /// Write intents committed
    pub items_written: u64,
    /// Failed requests
    pub errors: u64,
}

impl StoreStats {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn json_snapshot() {
        let stats = StoreStats {
            point_gets: 3,
            transactions: 1,
            ..Default::default()
        };
        let json = stats.to_json().unwrap();
        assert!(json.contains("\"point_gets\":3"));
        assert_eq!(serde_json::from_str::<StoreStats>(&json).unwrap(), stats);
    }
}

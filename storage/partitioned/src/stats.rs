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

use std::sync::atomic::{AtomicU64, Ordering};

use storage_core::StoreStats;

/// Usage counters shared by all readers, writers and cursors of a store
#[derive(Default)]
pub struct StatsCounters {
    point_gets: AtomicU64,
    queries: AtomicU64,
    pages: AtomicU64,
    items_read: AtomicU64,
    transactions: AtomicU64,
    items_written: AtomicU64,
    errors: AtomicU64,
}

fn bump(counter: &AtomicU64, n: u64) {
    counter.fetch_add(n, Ordering::Relaxed);
}

impl StatsCounters {
    pub fn point_get(&self, found: bool) {
        bump(&self.point_gets, 1);
        bump(&self.items_read, found as u64);
    }

    /// A page was fetched. `first` is set for the initial page of a scan.
    pub fn page(&self, first: bool, items: usize) {
        bump(&self.queries, first as u64);
        bump(&self.pages, 1);
        bump(&self.items_read, items as u64);
    }

    pub fn transaction(&self, items: usize) {
        bump(&self.transactions, 1);
        bump(&self.items_written, items as u64);
    }

    pub fn error(&self) {
        bump(&self.errors, 1);
    }

    pub fn snapshot(&self) -> StoreStats {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        StoreStats {
            point_gets: load(&self.point_gets),
            queries: load(&self.queries),
            pages: load(&self.pages),
            items_read: load(&self.items_read),
            transactions: load(&self.transactions),
            items_written: load(&self.items_written),
            errors: load(&self.errors),
        }
    }
}

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

use std::sync::atomic::{AtomicUsize, Ordering};

use storage_emulator::{Emulator, EmulatorConfig};
use storage_partitioned::{PartitionedStore, PartitionedStoreConfig};

const TABLE: &str = "kv";

// Tiny pages force cursors through the continuation path on almost every step
const PAGE_SIZES: [usize; 4] = [1, 2, 7, 1000];

fn main() {
    let store_config = PartitionedStoreConfig::new(TABLE, "local");

    // Backend creation procedure
    let counter = AtomicUsize::new(0);
    let create_backend = move || {
        // Each test case gets its own emulated database, page sizes rotate between cases
        let seq_no = counter.fetch_add(1, Ordering::AcqRel);
        let emulator_config = EmulatorConfig {
            page_size: PAGE_SIZES[seq_no % PAGE_SIZES.len()],
            ..EmulatorConfig::default()
        };
        let emulator = Emulator::with_table(emulator_config, TABLE);
        PartitionedStore::new(emulator, &store_config).expect("store creation to succeed")
    };

    storage_backend_test_suite::main(create_backend).exit()
}

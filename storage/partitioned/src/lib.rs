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

//! Ordered key-value store on top of a partitioned query database.
//!
//! All records of a store share one partition and are ordered by their sort key, which is the
//! store key. Prefix and range cursors are emulated with paginated queries, batches are
//! committed as single atomic write transactions, and counter keys keep their values as native
//! numbers so that merges become atomic additions in the backend.

mod batch;
pub mod codec;
pub mod config;
pub mod error;
mod iterator;
mod reader;
mod stats;
mod store;
mod writer;

pub use batch::{PartitionedBatch, PendingWrite};
pub use codec::{FirstByteClassifier, KeyClassifier};
pub use config::{PartitionedStoreConfig, StoreSettings, DEFAULT_PARTITION, MAX_TRANSACTION_ITEMS};
pub use iterator::PartitionedIterator;
pub use reader::PartitionedReader;
pub use store::PartitionedStore;
pub use writer::PartitionedWriter;

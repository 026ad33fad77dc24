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

//! Ordered byte-key stores.
//!
//! The [storage_partitioned] adapter exposes a partition of a partitioned query database as an
//! ordered key-value store. [open_store] selects between it and the in-memory store based on
//! configuration and returns an [AnyStore] implementing the common [KvStore] contract.

mod config;
mod store;

pub use config::{StoreBackendKind, StoreBackendParseError, StoreConfig};
pub use store::{open_store, AnyBatch, AnyIterator, AnyReader, AnyStore, AnyWriter};

pub use storage_core::{
    Data, Error, Fatal, KvBatch, KvIterator, KvReader, KvStore, KvWriter, Recoverable, Result,
    StoreStats,
};
pub use storage_inmemory::InMemoryStore;
pub use storage_partitioned::{PartitionedStore, PartitionedStoreConfig};

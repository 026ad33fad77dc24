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

//! Protocol of a partitioned, query-based database.
//!
//! Records live in partitions and are ordered by a sort key within a partition. The database
//! supports point reads, paginated single-partition queries restricted by a key condition and
//! a post-filter, and bounded atomic multi-item write transactions.

pub mod error;
pub mod request;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::BackendError;
pub use request::{
    ContinuationToken, GetItemRequest, QueryPage, QueryRequest, TransactWriteRequest, WriteItem,
};
pub use types::{
    AttributeType, AttributeValue, FilterExpression, Item, ItemKey, KeyCondition, KeySchema,
};

pub type Result<T> = std::result::Result<T, BackendError>;

/// Client of a partitioned query database
pub trait PartitionBackend: Send + Sync {
    /// Point read. Absent records are `Ok(None)`.
    fn get_item(&self, request: GetItemRequest) -> Result<Option<Item>>;

    /// Fetch one page of records matching the key condition, then apply the filter to it.
    fn query(&self, request: QueryRequest) -> Result<QueryPage>;

    /// Apply all items atomically, or none of them.
    fn transact_write(&self, request: TransactWriteRequest) -> Result<()>;

    /// Key attribute types of the table
    fn describe_key_schema(&self, table: &str) -> Result<KeySchema>;
}

impl<B: PartitionBackend + ?Sized> PartitionBackend for std::sync::Arc<B> {
    fn get_item(&self, request: GetItemRequest) -> Result<Option<Item>> {
        self.as_ref().get_item(request)
    }

    fn query(&self, request: QueryRequest) -> Result<QueryPage> {
        self.as_ref().query(request)
    }

    fn transact_write(&self, request: TransactWriteRequest) -> Result<()> {
        self.as_ref().transact_write(request)
    }

    fn describe_key_schema(&self, table: &str) -> Result<KeySchema> {
        self.as_ref().describe_key_schema(table)
    }
}

/// Creates backend clients for a region, optionally at an overridden endpoint
pub trait BackendConnector {
    type Backend: PartitionBackend;

    fn connect(&self, region: &str, endpoint: Option<&str>) -> Result<Self::Backend>;
}

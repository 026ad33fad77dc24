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

//! A mock version of the partitioned query backend.

use crate::{GetItemRequest, Item, KeySchema, QueryPage, QueryRequest, TransactWriteRequest};

mockall::mock! {
    /// A mock object for a partitioned query backend
    pub Backend {}

    impl crate::PartitionBackend for Backend {
        fn get_item(&self, request: GetItemRequest) -> crate::Result<Option<Item>>;
        fn query(&self, request: QueryRequest) -> crate::Result<QueryPage>;
        fn transact_write(&self, request: TransactWriteRequest) -> crate::Result<()>;
        fn describe_key_schema(&self, table: &str) -> crate::Result<KeySchema>;
    }
}

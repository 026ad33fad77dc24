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

//! Request and response shapes of the backend protocol

use std::time::Instant;

use crate::types::{AttributeValue, Data, FilterExpression, Item, ItemKey, KeyCondition};

/// Opaque token to resume a paginated query. Holds the last evaluated sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationToken(pub Data);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetItemRequest {
    pub table: String,
    pub key: ItemKey,
    pub consistent_read: bool,
    pub deadline: Option<Instant>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub table: String,
    pub partition: String,
    pub key_condition: KeyCondition,
    pub filter: Option<FilterExpression>,
    pub exclusive_start_key: Option<ContinuationToken>,
    pub consistent_read: bool,
    /// Maximum number of records evaluated for this page, before filtering
    pub limit: Option<usize>,
    pub deadline: Option<Instant>,
}

/// One page of query results, ordered by sort key. A missing continuation token means there
/// are no more pages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryPage {
    pub items: Vec<Item>,
    pub last_evaluated_key: Option<ContinuationToken>,
}

/// One item of a write transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteItem {
    /// Replace the whole record
    Put { table: String, item: Item },
    /// Remove the record, absent records are not an error
    Delete { table: String, key: ItemKey },
    /// Add `delta` to the numeric value, creating it from zero if absent, and set the filter key
    Add {
        table: String,
        key: ItemKey,
        delta: i64,
        filter_key: Data,
    },
}

impl WriteItem {
    pub fn table(&self) -> &str {
        match self {
            Self::Put { table, .. } | Self::Delete { table, .. } | Self::Add { table, .. } => table,
        }
    }

    pub fn key(&self) -> ItemKey {
        match self {
            Self::Put { item, .. } => item.key(),
            Self::Delete { key, .. } | Self::Add { key, .. } => key.clone(),
        }
    }

    /// Value written by a put, if this is a put
    pub fn put_value(&self) -> Option<&AttributeValue> {
        match self {
            Self::Put { item, .. } => item.value.as_ref(),
            Self::Delete { .. } | Self::Add { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactWriteRequest {
    pub items: Vec<WriteItem>,
    pub deadline: Option<Instant>,
}

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

//! Records, key conditions and filters of a partitioned query database.

use serde::{Deserialize, Serialize};

pub type Data = Vec<u8>;

/// Value attribute of a record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttributeValue {
    /// Opaque byte blob
    Binary(Data),
    /// Number in its decimal text form
    Number(String),
}

impl AttributeValue {
    pub fn number(n: i64) -> Self {
        Self::Number(n.to_string())
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(b) => Some(b),
            Self::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<&str> {
        match self {
            Self::Binary(_) => None,
            Self::Number(n) => Some(n),
        }
    }
}

/// Primary key of a record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub partition: String,
    pub sort_key: Data,
}

impl ItemKey {
    pub fn new(partition: impl Into<String>, sort_key: impl Into<Data>) -> Self {
        Self {
            partition: partition.into(),
            sort_key: sort_key.into(),
        }
    }
}

/// A stored record.
///
/// `filter_key` duplicates the sort key since filter expressions cannot refer to key attributes.
/// `value` is absent on records that were never given one, which readers treat as corrupt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub partition: String,
    pub sort_key: Data,
    pub filter_key: Option<Data>,
    pub value: Option<AttributeValue>,
}

impl Item {
    pub fn new(partition: impl Into<String>, sort_key: Data, value: AttributeValue) -> Self {
        Self {
            partition: partition.into(),
            filter_key: Some(sort_key.clone()),
            sort_key,
            value: Some(value),
        }
    }

    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.partition.clone(), self.sort_key.clone())
    }
}

/// Condition on the sort key, evaluated by the index before any limit applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCondition {
    /// Every record in the partition
    All,
    /// `begins_with(sk, prefix)`
    BeginsWith(Data),
    /// `sk >= start`
    AtLeast(Data),
    /// `sk < end`
    LessThan(Data),
    /// `sk BETWEEN low AND high`, both ends inclusive
    Between(Data, Data),
}

impl KeyCondition {
    pub fn matches(&self, sort_key: &[u8]) -> bool {
        match self {
            Self::All => true,
            Self::BeginsWith(prefix) => sort_key.starts_with(prefix),
            Self::AtLeast(start) => sort_key >= start.as_slice(),
            Self::LessThan(end) => sort_key < end.as_slice(),
            Self::Between(low, high) => sort_key >= low.as_slice() && sort_key <= high.as_slice(),
        }
    }
}

/// Condition on the duplicated filter key, evaluated on each page after the limit applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpression {
    BeginsWith(Data),
    LessThan(Data),
}

impl FilterExpression {
    /// Records without a filter key never pass a filter.
    pub fn matches(&self, filter_key: Option<&[u8]>) -> bool {
        match (self, filter_key) {
            (_, None) => false,
            (Self::BeginsWith(prefix), Some(k)) => k.starts_with(prefix),
            (Self::LessThan(end), Some(k)) => k < end.as_slice(),
        }
    }
}

/// Type of a key attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeType {
    String,
    Number,
    Binary,
}

/// Key attribute types of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySchema {
    pub partition_key: AttributeType,
    pub sort_key: AttributeType,
}

impl KeySchema {
    /// Binary sort keys are ordered bytewise.
    pub fn is_bytewise_ordered(&self) -> bool {
        self.sort_key == AttributeType::Binary
    }
}

impl Default for KeySchema {
    fn default() -> Self {
        Self {
            partition_key: AttributeType::String,
            sort_key: AttributeType::Binary,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn key_conditions() {
        assert!(KeyCondition::All.matches(b""));
        assert!(KeyCondition::BeginsWith(b"ab".to_vec()).matches(b"abc"));
        assert!(!KeyCondition::BeginsWith(b"ab".to_vec()).matches(b"a"));
        assert!(KeyCondition::AtLeast(b"b".to_vec()).matches(b"b"));
        assert!(!KeyCondition::AtLeast(b"b".to_vec()).matches(b"az"));
        assert!(KeyCondition::LessThan(b"b".to_vec()).matches(b"az"));
        assert!(!KeyCondition::LessThan(b"b".to_vec()).matches(b"b"));

        let between = KeyCondition::Between(b"b".to_vec(), b"d".to_vec());
        assert!(between.matches(b"b"));
        assert!(between.matches(b"d"));
        assert!(!between.matches(b"d\x00"));
    }

    #[test]
    fn filters_need_filter_key() {
        let filter = FilterExpression::BeginsWith(Vec::new());
        assert!(filter.matches(Some(b"x")));
        assert!(!filter.matches(None));
        assert!(!FilterExpression::LessThan(b"m".to_vec()).matches(Some(b"m")));
    }

    #[test]
    fn item_duplicates_sort_key() {
        let item = Item::new("p", b"key".to_vec(), AttributeValue::number(-3));
        assert_eq!(item.filter_key.as_deref(), Some(&b"key"[..]));
        assert_eq!(item.value.as_ref().and_then(AttributeValue::as_number), Some("-3"));
        assert_eq!(item.key(), ItemKey::new("p", b"key".to_vec()));
    }
}

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

//! Write batches.
//!
//! A batch keeps at most one pending write per key. Sets and deletes replace whatever is pending
//! for the key. Merges are folded into the pending write:
//!
//! | pending            | after `merge(d)`    |
//! |--------------------|---------------------|
//! | nothing            | `Add(d)`            |
//! | `Add(a)`           | `Add(a + d)`        |
//! | `Put(number n)`    | `Put(number n + d)` |
//! | `Delete`           | `Put(number d)`     |
//! | `Put(blob b)`      | `Put(number b + d)` |
//!
//! A blob is read as a little-endian counter, as the merge operator of the in-memory store does.
//! Arithmetic wraps around on overflow.

use std::{collections::BTreeMap, sync::Arc};

use itertools::Itertools;
use storage_core::{Data, KvBatch};
use storage_query_backend::{AttributeValue, Item, ItemKey, WriteItem};

use crate::codec::{self, KeyClassifier};

/// The single pending write of a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingWrite {
    Put(AttributeValue),
    Delete,
    /// Atomic addition to the stored number
    Add(i64),
}

impl PendingWrite {
    fn merge(self, key: &[u8], delta: i64) -> Self {
        match self {
            Self::Add(acc) => Self::Add(acc.wrapping_add(delta)),
            Self::Delete => Self::Put(AttributeValue::number(delta)),
            Self::Put(AttributeValue::Number(n)) => match codec::parse_number(&n) {
                Some(n) => Self::Put(AttributeValue::number(n.wrapping_add(delta))),
                None => Self::Add(delta),
            },
            Self::Put(AttributeValue::Binary(blob)) => {
                let n = codec::counter_from_le(key, &blob);
                Self::Put(AttributeValue::number(n.wrapping_add(delta)))
            }
        }
    }
}

pub struct PartitionedBatch {
    table: String,
    partition: String,
    classifier: Arc<dyn KeyClassifier>,
    writes: BTreeMap<Data, PendingWrite>,
}

impl PartitionedBatch {
    pub(crate) fn new(
        table: String,
        partition: String,
        classifier: Arc<dyn KeyClassifier>,
    ) -> Self {
        Self {
            table,
            partition,
            classifier,
            writes: BTreeMap::new(),
        }
    }

    pub(crate) fn is_for(&self, table: &str, partition: &str) -> bool {
        self.table == table && self.partition == partition
    }

    /// Pending write of given key
    pub fn pending(&self, key: &[u8]) -> Option<&PendingWrite> {
        self.writes.get(key)
    }

    /// Turn the pending writes into transaction items, in key order
    pub(crate) fn into_write_items(self) -> Vec<WriteItem> {
        let Self {
            table,
            partition,
            writes,
            ..
        } = self;

        writes
            .into_iter()
            .map(|(key, write)| match write {
                PendingWrite::Put(value) => WriteItem::Put {
                    table: table.clone(),
                    item: Item::new(partition.clone(), key, value),
                },
                PendingWrite::Delete => WriteItem::Delete {
                    table: table.clone(),
                    key: ItemKey::new(partition.clone(), key),
                },
                PendingWrite::Add(delta) => WriteItem::Add {
                    table: table.clone(),
                    key: ItemKey::new(partition.clone(), key.clone()),
                    delta,
                    filter_key: key,
                },
            })
            .collect_vec()
    }
}

impl KvBatch for PartitionedBatch {
    fn set(&mut self, key: &[u8], value: &[u8]) {
        let value = codec::encode(self.classifier.as_ref(), key, value);
        self.writes.insert(key.to_vec(), PendingWrite::Put(value));
    }

    fn delete(&mut self, key: &[u8]) {
        self.writes.insert(key.to_vec(), PendingWrite::Delete);
    }

    fn merge(&mut self, key: &[u8], operand: &[u8]) {
        let delta = codec::counter_from_le(key, operand);
        let write = match self.writes.remove(key) {
            Some(pending) => pending.merge(key, delta),
            None => PendingWrite::Add(delta),
        };
        self.writes.insert(key.to_vec(), write);
    }

    fn reset(&mut self) {
        self.writes.clear();
    }

    fn len(&self) -> usize {
        self.writes.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::codec::FirstByteClassifier;
    use rstest::rstest;

    fn batch() -> PartitionedBatch {
        PartitionedBatch::new("t".into(), "p".into(), Arc::new(FirstByteClassifier::default()))
    }

    fn le(n: i64) -> [u8; 8] {
        n.to_le_bytes()
    }

    #[test]
    fn merges_coalesce() {
        let mut batch = batch();
        batch.merge(b"tk", &le(1));
        batch.merge(b"tk", &le(2));
        batch.merge(b"tk", &le(-1));
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.pending(b"tk"), Some(&PendingWrite::Add(2)));
    }

    #[rstest]
    #[case::onto_add(PendingWrite::Add(4), PendingWrite::Add(7))]
    #[case::onto_number(
        PendingWrite::Put(AttributeValue::number(10)),
        PendingWrite::Put(AttributeValue::number(13))
    )]
    #[case::onto_delete(PendingWrite::Delete, PendingWrite::Put(AttributeValue::number(3)))]
    #[case::onto_blob(
        PendingWrite::Put(AttributeValue::Binary(vec![1])),
        PendingWrite::Put(AttributeValue::number(4))
    )]
    #[case::onto_wide_blob(
        PendingWrite::Put(AttributeValue::Binary(vec![0xff; 9])),
        PendingWrite::Put(AttributeValue::number(2))
    )]
    #[case::wrapping(PendingWrite::Add(i64::MAX), PendingWrite::Add(i64::MIN + 2))]
    fn merge_rules(#[case] pending: PendingWrite, #[case] expected: PendingWrite) {
        assert_eq!(pending.merge(b"k", 3), expected);
    }

    #[test]
    fn set_and_delete_replace() {
        let mut batch = batch();
        batch.merge(b"tk", &le(5));
        batch.set(b"tk", &le(9));
        assert_eq!(batch.pending(b"tk"), Some(&PendingWrite::Put(AttributeValue::number(9))));

        batch.delete(b"tk");
        assert_eq!(batch.pending(b"tk"), Some(&PendingWrite::Delete));

        batch.merge(b"tk", &le(2));
        assert_eq!(batch.pending(b"tk"), Some(&PendingWrite::Put(AttributeValue::number(2))));

        batch.set(b"doc", b"blob");
        assert_eq!(
            batch.pending(b"doc"),
            Some(&PendingWrite::Put(AttributeValue::Binary(b"blob".to_vec())))
        );
        assert_eq!(batch.len(), 2);

        batch.reset();
        assert!(batch.is_empty());
    }

    #[test]
    fn write_items_in_key_order() {
        let mut batch = batch();
        batch.set(b"b", b"1");
        batch.merge(b"tc", &le(-4));
        batch.delete(b"a");

        let items = batch.into_write_items();
        assert_eq!(
            items,
            vec![
                WriteItem::Delete {
                    table: "t".into(),
                    key: ItemKey::new("p", b"a".to_vec()),
                },
                WriteItem::Put {
                    table: "t".into(),
                    item: Item::new("p", b"b".to_vec(), AttributeValue::Binary(b"1".to_vec())),
                },
                WriteItem::Add {
                    table: "t".into(),
                    key: ItemKey::new("p", b"tc".to_vec()),
                    delta: -4,
                    filter_key: b"tc".to_vec(),
                },
            ]
        );
    }
}

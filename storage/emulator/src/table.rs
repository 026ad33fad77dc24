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

//! Contents of one emulated table

use std::collections::BTreeMap;

use storage_query_backend::{
    AttributeValue, BackendError, ContinuationToken, Item, ItemKey, KeySchema, QueryPage,
    QueryRequest, Result, WriteItem,
};

type Data = Vec<u8>;

// Records of one partition, ordered by sort key
type Partition = BTreeMap<Data, Item>;

pub struct Table {
    schema: KeySchema,
    partitions: BTreeMap<String, Partition>,
}

// Parse a stored number, accepting the unsigned form for values above the signed range
fn parse_number(text: &str) -> Option<i64> {
    text.parse::<i64>().ok().or_else(|| text.parse::<u64>().ok().map(|n| n as i64))
}

impl Table {
    pub fn new(schema: KeySchema) -> Self {
        Self {
            schema,
            partitions: BTreeMap::new(),
        }
    }

    pub fn schema(&self) -> KeySchema {
        self.schema
    }

    pub fn get(&self, key: &ItemKey) -> Option<&Item> {
        self.partitions.get(&key.partition)?.get(&key.sort_key)
    }

    pub fn items(&self, partition: &str) -> impl Iterator<Item = &Item> {
        self.partitions.get(partition).into_iter().flat_map(|p| p.values())
    }

    /// Evaluate up to `limit` records matching the key condition, then filter them.
    pub fn query(&self, request: &QueryRequest, limit: usize) -> Result<QueryPage> {
        use storage_query_backend::KeyCondition;

        if let KeyCondition::Between(low, high) = &request.key_condition {
            if low > high {
                return Err(BackendError::Validation(
                    "Invalid KeyConditionExpression: BETWEEN bounds out of order".into(),
                ));
            }
        }

        let partition = match self.partitions.get(&request.partition) {
            Some(partition) => partition,
            None => return Ok(QueryPage::default()),
        };

        let after = request.exclusive_start_key.as_ref().map(|t| t.0.as_slice());
        let evaluated: Vec<&Item> = partition
            .iter()
            .filter(|(k, _)| after.is_none_or(|after| k.as_slice() > after))
            .filter(|(k, _)| request.key_condition.matches(k))
            .map(|(_, item)| item)
            .take(limit)
            .collect();

        let last_evaluated_key = match evaluated.last() {
            Some(last) if evaluated.len() == limit => {
                Some(ContinuationToken(last.sort_key.clone()))
            }
            _ => None,
        };

        let items = evaluated
            .into_iter()
            .filter(|item| {
                request.filter.as_ref().is_none_or(|f| f.matches(item.filter_key.as_deref()))
            })
            .cloned()
            .collect();

        Ok(QueryPage {
            items,
            last_evaluated_key,
        })
    }

    /// Check a transaction item can be applied to the current contents
    pub fn check(&self, item: &WriteItem) -> Result<()> {
        match item {
            WriteItem::Put { item, .. } if item.value.is_none() => Err(BackendError::Validation(
                "Put item is missing the value attribute".into(),
            )),
            WriteItem::Put { .. } | WriteItem::Delete { .. } => Ok(()),
            WriteItem::Add { key, .. } => match self.get(key).and_then(|i| i.value.as_ref()) {
                None => Ok(()),
                Some(AttributeValue::Number(n)) if parse_number(n).is_some() => Ok(()),
                Some(_) => Err(BackendError::TransactionCanceled(
                    "ConditionalCheckFailed: ADD operand type does not match the stored value"
                        .into(),
                )),
            },
        }
    }

    /// Apply an item previously accepted by [Table::check]
    pub fn apply(&mut self, item: WriteItem) {
        match item {
            WriteItem::Put { item, .. } => {
                let partition = self.partitions.entry(item.partition.clone()).or_default();
                partition.insert(item.sort_key.clone(), item);
            }
            WriteItem::Delete { key, .. } => {
                if let Some(partition) = self.partitions.get_mut(&key.partition) {
                    partition.remove(&key.sort_key);
                }
            }
            WriteItem::Add {
                key,
                delta,
                filter_key,
                ..
            } => {
                let partition = self.partitions.entry(key.partition.clone()).or_default();
                let record = partition.entry(key.sort_key.clone()).or_insert_with(|| Item {
                    partition: key.partition,
                    sort_key: key.sort_key,
                    filter_key: None,
                    value: None,
                });
                let current = record
                    .value
                    .as_ref()
                    .and_then(AttributeValue::as_number)
                    .and_then(parse_number)
                    .unwrap_or(0);
                record.value = Some(AttributeValue::number(current.wrapping_add(delta)));
                record.filter_key = Some(filter_key);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use storage_query_backend::{FilterExpression, KeyCondition};

    fn table_with(keys: &[&str]) -> Table {
        let mut table = Table::new(KeySchema::default());
        for k in keys {
            table.apply(WriteItem::Put {
                table: "t".into(),
                item: Item::new("p", k.as_bytes().to_vec(), AttributeValue::Binary(vec![1])),
            });
        }
        table
    }

    fn query(condition: KeyCondition, filter: Option<FilterExpression>) -> QueryRequest {
        QueryRequest {
            table: "t".into(),
            partition: "p".into(),
            key_condition: condition,
            filter,
            exclusive_start_key: None,
            consistent_read: true,
            limit: None,
            deadline: None,
        }
    }

    fn keys(page: &QueryPage) -> Vec<&[u8]> {
        page.items.iter().map(|i| i.sort_key.as_slice()).collect()
    }

    #[test]
    fn limit_applies_before_filter() {
        let table = table_with(&["a", "b", "c", "d"]);
        let request = query(
            KeyCondition::Between(b"a".to_vec(), b"c".to_vec()),
            Some(FilterExpression::LessThan(b"b".to_vec())),
        );

        let page = table.query(&request, 2).unwrap();
        assert_eq!(keys(&page), [b"a"]);
        assert_eq!(page.last_evaluated_key, Some(ContinuationToken(b"b".to_vec())));

        let request = QueryRequest {
            exclusive_start_key: page.last_evaluated_key,
            ..request
        };
        let page = table.query(&request, 2).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.last_evaluated_key, None);
    }

    #[test]
    fn inverted_between_is_rejected() {
        let table = table_with(&["a"]);
        let request = query(KeyCondition::Between(b"b".to_vec(), b"a".to_vec()), None);
        assert!(matches!(table.query(&request, 10), Err(BackendError::Validation(_))));
    }

    #[test]
    fn add_creates_and_accumulates() {
        let mut table = Table::new(KeySchema::default());
        let add = |delta| WriteItem::Add {
            table: "t".into(),
            key: ItemKey::new("p", b"tc".to_vec()),
            delta,
            filter_key: b"tc".to_vec(),
        };
        table.apply(add(5));
        table.apply(add(-7));
        let item = table.get(&ItemKey::new("p", b"tc".to_vec())).unwrap();
        assert_eq!(item.value, Some(AttributeValue::number(-2)));
        assert_eq!(item.filter_key.as_deref(), Some(&b"tc"[..]));
    }

    #[test]
    fn add_onto_blob_is_refused() {
        let table = table_with(&["x"]);
        let add = WriteItem::Add {
            table: "t".into(),
            key: ItemKey::new("p", b"x".to_vec()),
            delta: 1,
            filter_key: b"x".to_vec(),
        };
        assert!(matches!(table.check(&add), Err(BackendError::TransactionCanceled(_))));
    }
}

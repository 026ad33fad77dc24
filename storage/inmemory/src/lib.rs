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

//! Ordered key-value store kept in process memory

use std::{collections::BTreeMap, sync::Arc};

use logging::log;
use parking_lot::{Mutex, RwLock};
use storage_core::{
    util::{MapPrefixIter, SliceRange},
    CounterMerge, Data, Error, KvBatch, KvIterator, KvReader, KvStore, KvWriter, MergeOperator,
    Result, StoreStats,
};

struct Inner {
    map: RwLock<BTreeMap<Data, Data>>,
    merge: Box<dyn MergeOperator>,
    stats: Mutex<StoreStats>,
}

/// In-memory store. Clones share the same contents.
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

impl InMemoryStore {
    /// New empty store using counter merges
    pub fn new() -> Self {
        Self::with_merge_operator(CounterMerge)
    }

    pub fn with_merge_operator(merge: impl MergeOperator + 'static) -> Self {
        let inner = Inner {
            map: RwLock::new(BTreeMap::new()),
            merge: Box::new(merge),
            stats: Mutex::new(StoreStats::default()),
        };
        Self {
            inner: Arc::new(inner),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore").field("len", &self.inner.map.read().len()).finish()
    }
}

impl KvStore for InMemoryStore {
    type Reader = InMemoryReader;
    type Writer = InMemoryWriter;

    fn reader(&self) -> Result<InMemoryReader> {
        Ok(InMemoryReader {
            inner: Arc::clone(&self.inner),
        })
    }

    fn writer(&self) -> Result<InMemoryWriter> {
        Ok(InMemoryWriter {
            inner: Arc::clone(&self.inner),
        })
    }

    fn stats(&self) -> StoreStats {
        *self.inner.stats.lock()
    }
}

pub struct InMemoryReader {
    inner: Arc<Inner>,
}

impl KvReader for InMemoryReader {
    type Iter = InMemoryIterator;

    fn get(&self, key: &[u8]) -> Result<Option<Data>> {
        let value = self.inner.map.read().get(key).cloned();
        let mut stats = self.inner.stats.lock();
        stats.point_gets += 1;
        stats.items_read += value.is_some() as u64;
        Ok(value)
    }

    fn prefix_iterator(&self, prefix: &[u8]) -> InMemoryIterator {
        InMemoryIterator::new(Arc::clone(&self.inner), Bounds::Prefix(prefix.to_vec()))
    }

    fn range_iterator(&self, start: &[u8], end: Option<&[u8]>) -> InMemoryIterator {
        let bounds = Bounds::Range {
            start: start.to_vec(),
            end: end.map(<[u8]>::to_vec),
        };
        InMemoryIterator::new(Arc::clone(&self.inner), bounds)
    }
}

enum Bounds {
    Prefix(Data),
    Range { start: Data, end: Option<Data> },
}

/// Cursor over a snapshot of the entries taken at the last seek
pub struct InMemoryIterator {
    inner: Arc<Inner>,
    bounds: Bounds,
    entries: Vec<(Data, Data)>,
    pos: usize,
}

impl InMemoryIterator {
    fn new(inner: Arc<Inner>, bounds: Bounds) -> Self {
        let mut this = Self {
            inner,
            bounds,
            entries: Vec::new(),
            pos: 0,
        };
        this.seek(&[]);
        this
    }
}

impl KvIterator for InMemoryIterator {
    fn seek(&mut self, key: &[u8]) {
        let map = self.inner.map.read();
        let owned = |(k, v): (&Data, &Data)| (k.clone(), v.clone());

        self.pos = 0;
        self.entries = match &mut self.bounds {
            // Seeking outside of the prefix finds nothing
            Bounds::Prefix(prefix) if !key.is_empty() && !key.starts_with(prefix.as_slice()) => {
                Vec::new()
            }
            Bounds::Prefix(prefix) => {
                MapPrefixIter::new(&*map, prefix.as_slice(), key).map(owned).collect()
            }
            Bounds::Range { start, end } => {
                if key > start.as_slice() {
                    *start = key.to_vec();
                }
                match end.as_deref() {
                    Some(end) if start.as_slice() >= end => Vec::new(),
                    end => {
                        let range = SliceRange::half_open(start.as_slice(), end);
                        map.range(range).map(owned).collect()
                    }
                }
            }
        };
        drop(map);

        let mut stats = self.inner.stats.lock();
        stats.queries += 1;
        stats.pages += 1;
        stats.items_read += self.entries.len() as u64;
    }

    fn next(&mut self) {
        if self.pos < self.entries.len() {
            self.pos += 1;
        }
    }

    fn current(&self) -> Option<(&[u8], &[u8])> {
        self.entries.get(self.pos).map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    fn error(&self) -> Option<&Error> {
        None
    }

    fn close(&mut self) -> Result<()> {
        self.entries = Vec::new();
        self.pos = 0;
        Ok(())
    }
}

// Pending changes to one key. `base` replaces the stored value before operands are merged in.
#[derive(Default)]
struct PendingKey {
    base: Option<Option<Data>>,
    operands: Vec<Data>,
}

/// Set of writes applied atomically by [InMemoryWriter]
pub struct InMemoryBatch {
    owner: Arc<Inner>,
    writes: BTreeMap<Data, PendingKey>,
}

impl KvBatch for InMemoryBatch {
    fn set(&mut self, key: &[u8], value: &[u8]) {
        let pending = PendingKey {
            base: Some(Some(value.to_vec())),
            operands: Vec::new(),
        };
        self.writes.insert(key.to_vec(), pending);
    }

    fn delete(&mut self, key: &[u8]) {
        let pending = PendingKey {
            base: Some(None),
            operands: Vec::new(),
        };
        self.writes.insert(key.to_vec(), pending);
    }

    fn merge(&mut self, key: &[u8], operand: &[u8]) {
        self.writes.entry(key.to_vec()).or_default().operands.push(operand.to_vec());
    }

    fn reset(&mut self) {
        self.writes.clear();
    }

    fn len(&self) -> usize {
        self.writes.len()
    }
}

pub struct InMemoryWriter {
    inner: Arc<Inner>,
}

impl KvWriter for InMemoryWriter {
    type Batch = InMemoryBatch;

    fn new_batch(&self) -> InMemoryBatch {
        InMemoryBatch {
            owner: Arc::clone(&self.inner),
            writes: BTreeMap::new(),
        }
    }

    fn execute_batch(&self, batch: InMemoryBatch) -> Result<()> {
        if !Arc::ptr_eq(&batch.owner, &self.inner) {
            return Err(Error::invalid_argument(
                "Batch was created by a writer of another store",
            ));
        }

        let count = batch.writes.len();
        let mut map = self.inner.map.write();
        for (key, pending) in batch.writes {
            let base = match pending.base {
                Some(base) => base,
                None => map.get(&key).cloned(),
            };
            let value = if pending.operands.is_empty() {
                base
            } else {
                let operands: Vec<&[u8]> = pending.operands.iter().map(|o| o.as_slice()).collect();
                Some(self.inner.merge.full_merge(&key, base.as_deref(), &operands))
            };
            match value {
                Some(value) => map.insert(key, value),
                None => map.remove(&key),
            };
        }
        drop(map);

        log::trace!("Applied batch of {count} writes");
        let mut stats = self.inner.stats.lock();
        stats.transactions += 1;
        stats.items_written += count as u64;
        Ok(())
    }
}

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

//! The ordered key-value store contract.
//!
//! Keys are ordered byte-lexicographically. A store hands out readers and writers. Readers serve
//! point lookups and create cursors over a prefix or a half-open key range. Writers create
//! batches of Set/Delete/Merge intents which are then executed atomically.

use crate::{Data, Error, Result, StoreStats};

/// Forward cursor over an ordered sequence of key-value entries.
///
/// A freshly created cursor is already positioned on the first entry within its bounds (or is
/// invalid if there is none). Backend failures do not panic; they invalidate the cursor and are
/// kept for inspection via [KvIterator::error] and [KvIterator::close].
pub trait KvIterator {
    /// Position the cursor at the first entry with key `>= key` within the cursor bounds.
    /// An empty key restarts from the beginning of the bounds.
    fn seek(&mut self, key: &[u8]);

    /// Advance to the next entry. Has no effect on an invalid cursor.
    fn next(&mut self);

    /// The entry under the cursor, `None` if the cursor is invalid.
    fn current(&self) -> Option<(&[u8], &[u8])>;

    fn key(&self) -> Option<&[u8]> {
        self.current().map(|(k, _)| k)
    }

    fn value(&self) -> Option<&[u8]> {
        self.current().map(|(_, v)| v)
    }

    fn valid(&self) -> bool {
        self.current().is_some()
    }

    /// First error encountered by the cursor, if any.
    fn error(&self) -> Option<&Error>;

    /// Release buffered state and report the recorded error.
    fn close(&mut self) -> Result<()>;

    /// Consume the cursor as a standard iterator over owned entries.
    fn entries(self) -> Entries<Self>
    where
        Self: Sized,
    {
        Entries::new(self)
    }
}

/// Adapts a [KvIterator] to [Iterator]. The recorded cursor error, if any, is yielded as the
/// last item.
pub struct Entries<I> {
    cursor: I,
    started: bool,
    done: bool,
}

impl<I: KvIterator> Entries<I> {
    fn new(cursor: I) -> Self {
        Self {
            cursor,
            started: false,
            done: false,
        }
    }
}

impl<I: KvIterator> Iterator for Entries<I> {
    type Item = Result<(Data, Data)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.started {
            self.cursor.next();
        }
        self.started = true;

        match self.cursor.current() {
            Some((k, v)) => Some(Ok((k.to_vec(), v.to_vec()))),
            None => {
                self.done = true;
                self.cursor.close().err().map(Err)
            }
        }
    }
}

/// Read access to a store
pub trait KvReader {
    type Iter: KvIterator;

    /// Get value associated with given key. Absence is `Ok(None)`.
    fn get(&self, key: &[u8]) -> Result<Option<Data>>;

    /// Look up a number of keys. Results are in the order of the requested keys.
    fn multi_get(&self, keys: &[&[u8]]) -> Result<Vec<Option<Data>>> {
        keys.iter().map(|key| self.get(key)).collect()
    }

    /// Cursor over all entries with keys starting with `prefix`
    fn prefix_iterator(&self, prefix: &[u8]) -> Self::Iter;

    /// Cursor over entries with keys in `[start, end)`. An empty `start` means unbounded below,
    /// no `end` means unbounded above.
    fn range_iterator(&self, start: &[u8], end: Option<&[u8]>) -> Self::Iter;

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A set of pending write intents
pub trait KvBatch {
    fn set(&mut self, key: &[u8], value: &[u8]);

    fn delete(&mut self, key: &[u8]);

    /// Merge a signed 8-byte little-endian operand into the value stored under `key`.
    fn merge(&mut self, key: &[u8], operand: &[u8]);

    /// Drop all pending intents
    fn reset(&mut self);

    /// Number of distinct keys with a pending intent
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Write access to a store
pub trait KvWriter {
    type Batch: KvBatch;

    fn new_batch(&self) -> Self::Batch;

    /// Apply all intents of the batch atomically.
    fn execute_batch(&self, batch: Self::Batch) -> Result<()>;

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// An ordered key-value store
pub trait KvStore: Send + Sync {
    type Reader: KvReader;
    type Writer: KvWriter;

    fn reader(&self) -> Result<Self::Reader>;

    fn writer(&self) -> Result<Self::Writer>;

    fn stats(&self) -> StoreStats;

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

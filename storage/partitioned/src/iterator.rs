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

//! Forward cursor emulated on top of paginated queries.
//!
//! A cursor buffers one page of records at a time. The first page of a scan is requested by
//! `seek`, further pages are requested by `next` using the continuation token of the previous
//! page. Prefix and range cursors share this logic and only differ in how the query is built.

use std::sync::Arc;

use logging::log;
use storage_core::{Data, Error, KvIterator, Result};
use storage_query_backend::{
    ContinuationToken, FilterExpression, Item, KeyCondition, PartitionBackend, QueryRequest,
};

use crate::{codec, error::process_backend_error, store::StoreInner};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Bounds {
    /// Keys starting with the prefix
    Prefix(Data),
    /// Keys in `[start, end)`, empty start and missing end mean unbounded
    Range { start: Data, end: Option<Data> },
}

/// Key condition and filter of the running scan
#[derive(Debug, Clone, PartialEq, Eq)]
struct Scan {
    condition: KeyCondition,
    filter: Option<FilterExpression>,
}

impl Bounds {
    /// Query for the entries at or after `key`, `None` if there cannot be any.
    fn scan_from(&mut self, key: &[u8]) -> Option<Scan> {
        match self {
            Self::Prefix(prefix) => {
                if key.len() <= prefix.len() {
                    // Seeking to the prefix itself, or to nothing, starts from the beginning
                    return (key.is_empty() || key == prefix.as_slice()).then(|| Scan {
                        condition: KeyCondition::BeginsWith(prefix.clone()),
                        filter: None,
                    });
                }
                key.starts_with(prefix).then(|| Scan {
                    condition: KeyCondition::AtLeast(key.to_vec()),
                    filter: Some(FilterExpression::BeginsWith(prefix.clone())),
                })
            }
            Self::Range { start, end } => {
                if key > start.as_slice() {
                    *start = key.to_vec();
                }
                match end {
                    Some(end) if *start >= *end => None,
                    Some(end) if start.is_empty() => Some(Scan {
                        condition: KeyCondition::LessThan(end.clone()),
                        filter: None,
                    }),
                    // Between is inclusive, the filter drops the end key itself
                    Some(end) => Some(Scan {
                        condition: KeyCondition::Between(start.clone(), end.clone()),
                        filter: Some(FilterExpression::LessThan(end.clone())),
                    }),
                    None if start.is_empty() => Some(Scan {
                        condition: KeyCondition::All,
                        filter: None,
                    }),
                    None => Some(Scan {
                        condition: KeyCondition::AtLeast(start.clone()),
                        filter: None,
                    }),
                }
            }
        }
    }
}

/// Cursor over a prefix or a key range of a partitioned store
pub struct PartitionedIterator<B> {
    store: Arc<StoreInner<B>>,
    bounds: Bounds,
    scan: Option<Scan>,
    token: Option<ContinuationToken>,
    page: Vec<Item>,
    index: usize,
    current: Option<(Data, Data)>,
    error: Option<Error>,
}

impl<B: PartitionBackend> PartitionedIterator<B> {
    fn new(store: Arc<StoreInner<B>>, bounds: Bounds) -> Self {
        let mut this = Self {
            store,
            bounds,
            scan: None,
            token: None,
            page: Vec::new(),
            index: 0,
            current: None,
            error: None,
        };
        this.seek(&[]);
        this
    }

    pub(crate) fn prefix(store: Arc<StoreInner<B>>, prefix: Data) -> Self {
        Self::new(store, Bounds::Prefix(prefix))
    }

    pub(crate) fn range(store: Arc<StoreInner<B>>, start: Data, end: Option<Data>) -> Self {
        Self::new(store, Bounds::Range { start, end })
    }

    fn reset(&mut self) {
        self.scan = None;
        self.token = None;
        self.page = Vec::new();
        self.index = 0;
        self.current = None;
    }

    fn record_error(&mut self, err: Error) {
        log::warn!("Cursor over {:?} failed: {err}", self.bounds);
        self.current = None;
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    // Fetch the next page of the running scan into the buffer
    fn fetch(&mut self, first: bool) -> Result<()> {
        let scan = match &self.scan {
            Some(scan) => scan.clone(),
            None => return Ok(()),
        };
        let settings = &self.store.settings;
        let request = QueryRequest {
            table: settings.table.clone(),
            partition: settings.partition.clone(),
            key_condition: scan.condition,
            filter: scan.filter,
            exclusive_start_key: self.token.take(),
            consistent_read: true,
            limit: settings.page_size,
            deadline: settings.deadline(),
        };

        let page = self.store.backend.query(request).map_err(|e| {
            self.store.stats.error();
            process_backend_error(e)
        })?;
        log::trace!(
            "Fetched page of {} items, more: {}",
            page.items.len(),
            page.last_evaluated_key.is_some(),
        );
        self.store.stats.page(first, page.items.len());

        self.page = page.items;
        self.token = page.last_evaluated_key;
        self.index = 0;
        Ok(())
    }

    // Expose the buffered record at the current index, or invalidate the cursor
    fn materialize(&mut self) {
        self.current = None;
        let item = match self.page.get(self.index) {
            Some(item) => item,
            None => return,
        };
        match codec::decode(item) {
            Ok(value) => self.current = Some((item.sort_key.clone(), value)),
            Err(e) => self.record_error(e),
        }
    }
}

impl<B: PartitionBackend> KvIterator for PartitionedIterator<B> {
    fn seek(&mut self, key: &[u8]) {
        self.reset();
        self.scan = self.bounds.scan_from(key);
        if self.scan.is_none() {
            return;
        }

        match self.fetch(true) {
            Ok(()) => self.materialize(),
            Err(e) => self.record_error(e),
        }
    }

    fn next(&mut self) {
        if self.current.is_none() {
            return;
        }

        self.index += 1;
        if self.index >= self.page.len() {
            if self.token.is_none() {
                self.current = None;
                return;
            }
            // An empty continuation page ends the scan
            if let Err(e) = self.fetch(false) {
                self.record_error(e);
                return;
            }
        }
        self.materialize();
    }

    fn current(&self) -> Option<(&[u8], &[u8])> {
        self.current.as_ref().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    fn close(&mut self) -> Result<()> {
        self.reset();
        self.error.take().map_or(Ok(()), Err)
    }
}

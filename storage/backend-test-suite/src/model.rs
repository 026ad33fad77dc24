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

//! A dead-simple reference implementation of an ordered key-value store

use std::collections::BTreeMap;

use storage_core::{Data, KvBatch};

/// A modifying action to apply to a store or a model
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum WriteAction {
    /// Write data
    Set(Data, Data),
    /// Delete data
    Del(Data),
    /// Add to a counter
    Merge(Data, i64),
}

impl WriteAction {
    pub fn key(&self) -> &[u8] {
        match self {
            Self::Set(k, _) | Self::Del(k) | Self::Merge(k, _) => k,
        }
    }

    /// Record the action in a batch
    pub fn apply_to(&self, batch: &mut impl KvBatch) {
        match self {
            Self::Set(k, v) => batch.set(k, v),
            Self::Del(k) => batch.delete(k),
            Self::Merge(k, delta) => batch.merge(k, &delta.to_le_bytes()),
        }
    }
}

/// Reference model of store contents
#[derive(Default, Debug, PartialEq, Eq, Clone)]
pub struct Model(BTreeMap<Data, Data>);

impl Model {
    /// New empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// New model pre-populated by contents resulting by applying a sequence of actions
    pub fn from_actions<T: IntoIterator<Item = WriteAction>>(iter: T) -> Self {
        let mut this = Self::default();
        this.extend(iter);
        this
    }

    /// Apply given action
    pub fn apply_action(&mut self, action: WriteAction) {
        match action {
            WriteAction::Set(key, val) => {
                let _ = self.0.insert(key, val);
            }
            WriteAction::Del(key) => {
                let _ = self.0.remove(&key);
            }
            WriteAction::Merge(key, delta) => {
                let current = self.0.get(&key).map_or(0, |v| storage_core::merge::read_i64_le(v));
                let _ = self.0.insert(key, current.wrapping_add(delta).to_le_bytes().to_vec());
            }
        }
    }

    /// Get value associated with given key
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&[u8]> {
        self.0.get(key.as_ref()).map(|v| v.as_ref())
    }

    /// Entries with keys starting with `prefix`, in key order
    pub fn prefix(&self, prefix: &[u8]) -> Vec<(Data, Data)> {
        storage_core::util::MapPrefixIter::new(&self.0, prefix, prefix)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Entries with keys in `[start, end)`, in key order
    pub fn range(&self, start: &[u8], end: Option<&[u8]>) -> Vec<(Data, Data)> {
        if end.is_some_and(|end| start >= end) {
            return Vec::new();
        }
        self.0
            .range(storage_core::util::SliceRange::half_open(start, end))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Get the inner map
    pub fn inner(&self) -> &BTreeMap<Data, Data> {
        &self.0
    }
}

impl Extend<WriteAction> for Model {
    fn extend<T: IntoIterator<Item = WriteAction>>(&mut self, iter: T) {
        iter.into_iter().for_each(|action| self.apply_action(action))
    }
}

impl FromIterator<(Data, Data)> for Model {
    fn from_iter<T: IntoIterator<Item = (Data, Data)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

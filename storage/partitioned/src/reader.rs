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

use std::sync::Arc;

use logging::log;
use storage_core::{Data, KvReader, Result};
use storage_query_backend::{GetItemRequest, ItemKey, PartitionBackend};

use crate::{codec, error::process_backend_error, iterator::PartitionedIterator, store::StoreInner};

/// Point lookups and cursor construction
pub struct PartitionedReader<B> {
    store: Arc<StoreInner<B>>,
}

impl<B: PartitionBackend> PartitionedReader<B> {
    pub(crate) fn new(store: Arc<StoreInner<B>>) -> Self {
        Self { store }
    }
}

impl<B: PartitionBackend> KvReader for PartitionedReader<B> {
    type Iter = PartitionedIterator<B>;

    fn get(&self, key: &[u8]) -> Result<Option<Data>> {
        let settings = &self.store.settings;
        let request = GetItemRequest {
            table: settings.table.clone(),
            key: ItemKey::new(settings.partition.clone(), key),
            consistent_read: true,
            deadline: settings.deadline(),
        };

        log::trace!("Point read of key {key:x?}");
        let item = self.store.backend.get_item(request).map_err(|e| {
            self.store.stats.error();
            process_backend_error(e)
        })?;
        self.store.stats.point_get(item.is_some());

        item.as_ref().map(codec::decode).transpose()
    }

    fn prefix_iterator(&self, prefix: &[u8]) -> Self::Iter {
        PartitionedIterator::prefix(Arc::clone(&self.store), prefix.to_vec())
    }

    fn range_iterator(&self, start: &[u8], end: Option<&[u8]>) -> Self::Iter {
        PartitionedIterator::range(
            Arc::clone(&self.store),
            start.to_vec(),
            end.map(<[u8]>::to_vec),
        )
    }
}

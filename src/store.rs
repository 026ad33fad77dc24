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

//! Store variants selected by configuration

use storage_core::{
    Data, Error, KvBatch, KvIterator, KvReader, KvStore, KvWriter, Result, StoreStats,
};
use storage_inmemory::{
    InMemoryBatch, InMemoryIterator, InMemoryReader, InMemoryStore, InMemoryWriter,
};
use storage_partitioned::{
    PartitionedBatch, PartitionedIterator, PartitionedReader, PartitionedStore, PartitionedWriter,
};
use storage_query_backend::{BackendConnector, PartitionBackend};

use crate::config::{StoreBackendKind, StoreConfig};

/// Open the store described by `config`. The connector is used only by partitioned stores.
pub fn open_store<C: BackendConnector>(
    config: &StoreConfig,
    connector: &C,
) -> Result<AnyStore<C::Backend>> {
    logging::log::debug!("Opening {:?} store", config.kind());
    match config {
        StoreConfig::Partitioned(config) => {
            PartitionedStore::open_with(config, connector).map(AnyStore::Partitioned)
        }
        StoreConfig::InMemory => Ok(AnyStore::InMemory(InMemoryStore::new())),
    }
}

/// Any of the supported stores
pub enum AnyStore<B> {
    Partitioned(PartitionedStore<B>),
    InMemory(InMemoryStore),
}

impl<B> Clone for AnyStore<B> {
    fn clone(&self) -> Self {
        match self {
            AnyStore::Partitioned(s) => AnyStore::Partitioned(s.clone()),
            AnyStore::InMemory(s) => AnyStore::InMemory(s.clone()),
        }
    }
}

impl<B> std::fmt::Debug for AnyStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnyStore::Partitioned(s) => f.debug_tuple("Partitioned").field(s).finish(),
            AnyStore::InMemory(s) => f.debug_tuple("InMemory").field(s).finish(),
        }
    }
}

impl<B> AnyStore<B> {
    pub fn kind(&self) -> StoreBackendKind {
        match self {
            AnyStore::Partitioned(_) => StoreBackendKind::Partitioned,
            AnyStore::InMemory(_) => StoreBackendKind::InMemory,
        }
    }
}

impl<B> From<PartitionedStore<B>> for AnyStore<B> {
    fn from(store: PartitionedStore<B>) -> Self {
        AnyStore::Partitioned(store)
    }
}

impl<B> From<InMemoryStore> for AnyStore<B> {
    fn from(store: InMemoryStore) -> Self {
        AnyStore::InMemory(store)
    }
}

impl<B: PartitionBackend> KvStore for AnyStore<B> {
    type Reader = AnyReader<B>;
    type Writer = AnyWriter<B>;

    fn reader(&self) -> Result<Self::Reader> {
        match self {
            AnyStore::Partitioned(s) => s.reader().map(AnyReader::Partitioned),
            AnyStore::InMemory(s) => s.reader().map(AnyReader::InMemory),
        }
    }

    fn writer(&self) -> Result<Self::Writer> {
        match self {
            AnyStore::Partitioned(s) => s.writer().map(AnyWriter::Partitioned),
            AnyStore::InMemory(s) => s.writer().map(AnyWriter::InMemory),
        }
    }

    fn stats(&self) -> StoreStats {
        match self {
            AnyStore::Partitioned(s) => s.stats(),
            AnyStore::InMemory(s) => s.stats(),
        }
    }

    fn close(&self) -> Result<()> {
        match self {
            AnyStore::Partitioned(s) => s.close(),
            AnyStore::InMemory(s) => s.close(),
        }
    }
}

pub enum AnyReader<B> {
    Partitioned(PartitionedReader<B>),
    InMemory(InMemoryReader),
}

impl<B: PartitionBackend> KvReader for AnyReader<B> {
    type Iter = AnyIterator<B>;

    fn get(&self, key: &[u8]) -> Result<Option<Data>> {
        match self {
            AnyReader::Partitioned(r) => r.get(key),
            AnyReader::InMemory(r) => r.get(key),
        }
    }

    fn multi_get(&self, keys: &[&[u8]]) -> Result<Vec<Option<Data>>> {
        match self {
            AnyReader::Partitioned(r) => r.multi_get(keys),
            AnyReader::InMemory(r) => r.multi_get(keys),
        }
    }

    fn prefix_iterator(&self, prefix: &[u8]) -> Self::Iter {
        match self {
            AnyReader::Partitioned(r) => AnyIterator::Partitioned(r.prefix_iterator(prefix)),
            AnyReader::InMemory(r) => AnyIterator::InMemory(r.prefix_iterator(prefix)),
        }
    }

    fn range_iterator(&self, start: &[u8], end: Option<&[u8]>) -> Self::Iter {
        match self {
            AnyReader::Partitioned(r) => AnyIterator::Partitioned(r.range_iterator(start, end)),
            AnyReader::InMemory(r) => AnyIterator::InMemory(r.range_iterator(start, end)),
        }
    }

    fn close(&self) -> Result<()> {
        match self {
            AnyReader::Partitioned(r) => r.close(),
            AnyReader::InMemory(r) => r.close(),
        }
    }
}

pub enum AnyIterator<B> {
    Partitioned(PartitionedIterator<B>),
    InMemory(InMemoryIterator),
}

impl<B: PartitionBackend> KvIterator for AnyIterator<B> {
    fn seek(&mut self, key: &[u8]) {
        match self {
            AnyIterator::Partitioned(i) => i.seek(key),
            AnyIterator::InMemory(i) => i.seek(key),
        }
    }

    fn next(&mut self) {
        match self {
            AnyIterator::Partitioned(i) => i.next(),
            AnyIterator::InMemory(i) => i.next(),
        }
    }

    fn current(&self) -> Option<(&[u8], &[u8])> {
        match self {
            AnyIterator::Partitioned(i) => i.current(),
            AnyIterator::InMemory(i) => i.current(),
        }
    }

    fn error(&self) -> Option<&Error> {
        match self {
            AnyIterator::Partitioned(i) => i.error(),
            AnyIterator::InMemory(i) => i.error(),
        }
    }

    fn close(&mut self) -> Result<()> {
        match self {
            AnyIterator::Partitioned(i) => i.close(),
            AnyIterator::InMemory(i) => i.close(),
        }
    }
}

pub enum AnyWriter<B> {
    Partitioned(PartitionedWriter<B>),
    InMemory(InMemoryWriter),
}

impl<B: PartitionBackend> KvWriter for AnyWriter<B> {
    type Batch = AnyBatch;

    fn new_batch(&self) -> Self::Batch {
        match self {
            AnyWriter::Partitioned(w) => AnyBatch::Partitioned(w.new_batch()),
            AnyWriter::InMemory(w) => AnyBatch::InMemory(w.new_batch()),
        }
    }

    fn execute_batch(&self, batch: Self::Batch) -> Result<()> {
        match (self, batch) {
            (AnyWriter::Partitioned(w), AnyBatch::Partitioned(b)) => w.execute_batch(b),
            (AnyWriter::InMemory(w), AnyBatch::InMemory(b)) => w.execute_batch(b),
            (_, _) => Err(Error::invalid_argument(
                "Batch was created by a different kind of store",
            )),
        }
    }

    fn close(&self) -> Result<()> {
        match self {
            AnyWriter::Partitioned(w) => w.close(),
            AnyWriter::InMemory(w) => w.close(),
        }
    }
}

pub enum AnyBatch {
    Partitioned(PartitionedBatch),
    InMemory(InMemoryBatch),
}

impl KvBatch for AnyBatch {
    fn set(&mut self, key: &[u8], value: &[u8]) {
        match self {
            AnyBatch::Partitioned(b) => b.set(key, value),
            AnyBatch::InMemory(b) => b.set(key, value),
        }
    }

    fn delete(&mut self, key: &[u8]) {
        match self {
            AnyBatch::Partitioned(b) => b.delete(key),
            AnyBatch::InMemory(b) => b.delete(key),
        }
    }

    fn merge(&mut self, key: &[u8], operand: &[u8]) {
        match self {
            AnyBatch::Partitioned(b) => b.merge(key, operand),
            AnyBatch::InMemory(b) => b.merge(key, operand),
        }
    }

    fn reset(&mut self) {
        match self {
            AnyBatch::Partitioned(b) => b.reset(),
            AnyBatch::InMemory(b) => b.reset(),
        }
    }

    fn len(&self) -> usize {
        match self {
            AnyBatch::Partitioned(b) => b.len(),
            AnyBatch::InMemory(b) => b.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use storage_core::{Fatal, Recoverable};
    use storage_emulator::{Emulator, EmulatorConfig, EmulatorConnector};
    use storage_partitioned::PartitionedStoreConfig;
    use test_utils::assert_matches;

    fn connector() -> EmulatorConnector {
        EmulatorConnector::new(Emulator::with_table(EmulatorConfig::default(), "kv"))
    }

    fn partitioned_config() -> StoreConfig {
        PartitionedStoreConfig::new("kv", "local").into()
    }

    #[rstest]
    #[case(partitioned_config(), StoreBackendKind::Partitioned)]
    #[case(StoreConfig::InMemory, StoreBackendKind::InMemory)]
    fn write_and_read_back(#[case] config: StoreConfig, #[case] kind: StoreBackendKind) {
        let store = open_store(&config, &connector()).unwrap();
        assert_eq!(store.kind(), kind);

        let writer = store.writer().unwrap();
        let mut batch = writer.new_batch();
        batch.set(b"a1", b"x");
        batch.set(b"a2", b"y");
        batch.merge(b"tc", &5i64.to_le_bytes());
        batch.merge(b"tc", &(-2i64).to_le_bytes());
        assert_eq!(batch.len(), 3);
        writer.execute_batch(batch).unwrap();

        let reader = store.reader().unwrap();
        assert_eq!(reader.get(b"a1").unwrap(), Some(b"x".to_vec()));
        assert_eq!(reader.get(b"zz").unwrap(), None);
        assert_eq!(reader.get(b"tc").unwrap(), Some(3i64.to_le_bytes().to_vec()));

        let keys: Vec<_> = reader
            .prefix_iterator(b"a")
            .entries()
            .map(|e| e.map(|(k, _)| k))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(keys, vec![b"a1".to_vec(), b"a2".to_vec()]);

        let mut cursor = reader.range_iterator(b"a2", Some(b"b"));
        assert_eq!(cursor.current(), Some((&b"a2"[..], &b"y"[..])));
        cursor.next();
        assert!(!cursor.valid());
        assert_eq!(cursor.close(), Ok(()));

        assert_eq!(store.close(), Ok(()));
    }

    #[test]
    fn partitioned_store_shares_emulated_table() {
        let connector = connector();
        let store = open_store(&partitioned_config(), &connector).unwrap();

        let writer = store.writer().unwrap();
        let mut batch = writer.new_batch();
        batch.set(b"k", b"v");
        writer.execute_batch(batch).unwrap();

        let items = connector
            .emulator()
            .items("kv", storage_partitioned::DEFAULT_PARTITION)
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(store.stats().transactions, 1);
    }

    #[test]
    fn batch_of_other_kind_is_rejected() {
        let partitioned = open_store(&partitioned_config(), &connector()).unwrap();
        let in_memory = open_store(&StoreConfig::InMemory, &connector()).unwrap();

        let mut batch = in_memory.writer().unwrap().new_batch();
        batch.set(b"k", b"v");

        assert_matches!(
            partitioned.writer().unwrap().execute_batch(batch),
            Err(Error::Fatal(Fatal::InvalidArgument(_)))
        );
        assert_eq!(partitioned.reader().unwrap().get(b"k").unwrap(), None);
    }

    #[test]
    fn open_partitioned_without_region() {
        let mut config = PartitionedStoreConfig::new("kv", "local");
        config.region = None;
        assert_matches!(
            open_store(&config.into(), &connector()),
            Err(Error::Fatal(Fatal::InvalidConfig(_)))
        );
    }

    #[test]
    fn open_partitioned_missing_table() {
        let config = PartitionedStoreConfig::new("other", "local").into();
        assert_matches!(
            open_store(&config, &connector()),
            Err(Error::Recoverable(Recoverable::BackendUnavailable(_)))
        );
    }

    #[test]
    fn open_partitioned_bad_endpoint() {
        let mut config = PartitionedStoreConfig::new("kv", "local");
        config.endpoint = Some("ftp://localhost".into());
        assert_matches!(
            open_store(&config.into(), &connector()),
            Err(Error::Recoverable(Recoverable::BackendUnavailable(_)))
        );
    }
}

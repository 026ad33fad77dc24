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
use storage_core::{Error, KvBatch, KvWriter, Result};
use storage_query_backend::{PartitionBackend, TransactWriteRequest};

use crate::{batch::PartitionedBatch, error::process_backend_error, store::StoreInner};

/// Creates batches and commits them as single backend transactions
pub struct PartitionedWriter<B> {
    store: Arc<StoreInner<B>>,
}

impl<B: PartitionBackend> PartitionedWriter<B> {
    pub(crate) fn new(store: Arc<StoreInner<B>>) -> Self {
        Self { store }
    }
}

impl<B: PartitionBackend> KvWriter for PartitionedWriter<B> {
    type Batch = PartitionedBatch;

    fn new_batch(&self) -> PartitionedBatch {
        let settings = &self.store.settings;
        PartitionedBatch::new(
            settings.table.clone(),
            settings.partition.clone(),
            Arc::clone(&self.store.classifier),
        )
    }

    fn execute_batch(&self, batch: PartitionedBatch) -> Result<()> {
        let settings = &self.store.settings;

        if !batch.is_for(&settings.table, &settings.partition) {
            return Err(Error::invalid_argument(
                "Batch was created by a writer of another store",
            ));
        }

        let count = batch.len();
        if count == 0 {
            return Ok(());
        }
        if count > settings.max_transaction_items {
            return Err(Error::invalid_argument(format!(
                "Batch writes {count} keys, at most {} are allowed",
                settings.max_transaction_items
            )));
        }

        log::debug!("Executing batch of {count} writes");
        let request = TransactWriteRequest {
            items: batch.into_write_items(),
            deadline: settings.deadline(),
        };
        self.store.backend.transact_write(request).map_err(|e| {
            self.store.stats.error();
            process_backend_error(e)
        })?;

        self.store.stats.transaction(count);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{PartitionedStore, PartitionedStoreConfig};
    use rstest::rstest;
    use storage_core::{Fatal, KvReader, KvStore};
    use storage_emulator::{Emulator, EmulatorConfig};
    use storage_failing::{FailOp, FailingBackend, FailureConfig, FailureMode};
    use storage_query_backend::{mock::MockBackend, AttributeValue, BackendError, Item, KeySchema};
    use test_utils::{
        assert_matches,
        random::{make_seedable_rng, Rng, Seed},
    };

    fn config() -> PartitionedStoreConfig {
        PartitionedStoreConfig {
            max_transaction_items: Some(10),
            ..PartitionedStoreConfig::new("t", "r")
        }
    }

    fn store() -> PartitionedStore<Emulator> {
        let emu = Emulator::with_table(EmulatorConfig::default(), "t");
        PartitionedStore::new(emu, &config()).unwrap()
    }

    fn mock_store(backend: impl FnOnce(&mut MockBackend)) -> PartitionedStore<MockBackend> {
        let mut mock = MockBackend::new();
        mock.expect_describe_key_schema().returning(|_| Ok(KeySchema::default()));
        backend(&mut mock);
        PartitionedStore::new(mock, &config()).unwrap()
    }

    #[test]
    fn merge_then_get() {
        let store = store();
        let writer = store.writer().unwrap();

        let mut batch = writer.new_batch();
        batch.merge(b"tk", &1i64.to_le_bytes());
        batch.merge(b"tk", &2i64.to_le_bytes());
        batch.merge(b"tk", &(-1i64).to_le_bytes());
        writer.execute_batch(batch).unwrap();

        let reader = store.reader().unwrap();
        assert_eq!(reader.get(b"tk"), Ok(Some(2i64.to_le_bytes().to_vec())));

        let stats = store.stats();
        assert_eq!(stats.transactions, 1);
        assert_eq!(stats.items_written, 1);
    }

    #[rstest]
    #[trace]
    #[case(Seed::from_entropy())]
    fn counters_accumulate_across_batches(#[case] seed: Seed) {
        let mut rng = make_seedable_rng(seed);
        let store = store();
        let writer = store.writer().unwrap();

        let mut expected = 0i64;
        for _ in 0..rng.gen_range(1..10) {
            let mut batch = writer.new_batch();
            for _ in 0..rng.gen_range(1..5) {
                let delta = rng.gen::<i64>();
                expected = expected.wrapping_add(delta);
                batch.merge(b"tcount", &delta.to_le_bytes());
            }
            writer.execute_batch(batch).unwrap();
        }

        let value = store.reader().unwrap().get(b"tcount").unwrap();
        assert_eq!(value, Some(expected.to_le_bytes().to_vec()));
    }

    #[test]
    fn empty_batch_makes_no_request() {
        let store = mock_store(|mock| {
            mock.expect_transact_write().never();
        });
        let writer = store.writer().unwrap();
        assert_eq!(writer.execute_batch(writer.new_batch()), Ok(()));
    }

    #[test]
    fn oversized_batch_is_rejected() {
        let store = mock_store(|mock| {
            mock.expect_transact_write().never();
        });
        let writer = store.writer().unwrap();

        let mut batch = writer.new_batch();
        for i in 0..11u8 {
            batch.set(&[i], b"v");
        }
        assert_matches!(
            writer.execute_batch(batch),
            Err(Error::Fatal(Fatal::InvalidArgument(_)))
        );
    }

    #[test]
    fn batch_of_another_store_is_rejected() {
        let store = mock_store(|mock| {
            mock.expect_transact_write().never();
        });
        let other = {
            let emu = Emulator::with_table(EmulatorConfig::default(), "t");
            let config = PartitionedStoreConfig {
                partition: Some("other".into()),
                ..config()
            };
            PartitionedStore::new(emu, &config).unwrap()
        };

        let mut batch = other.writer().unwrap().new_batch();
        batch.set(b"k", b"v");
        assert_matches!(
            store.writer().unwrap().execute_batch(batch),
            Err(Error::Fatal(Fatal::InvalidArgument(_)))
        );
    }

    #[test]
    fn rejected_transaction_leaves_no_trace() {
        let emu = Emulator::with_table(EmulatorConfig::default(), "t");
        let failing = FailingBackend::new(
            emu.clone(),
            FailureConfig::new(FailOp::TransactWrite, FailureMode::AfterCalls(1))
                .with_error(BackendError::TransactionCanceled("conflict".into())),
            Seed::from_entropy(),
        );
        let store = PartitionedStore::new(failing, &config()).unwrap();
        let writer = store.writer().unwrap();

        let mut batch = writer.new_batch();
        batch.set(b"a", b"1");
        batch.merge(b"tn", &5i64.to_le_bytes());
        writer.execute_batch(batch).unwrap();

        let mut batch = writer.new_batch();
        batch.set(b"a", b"2");
        batch.set(b"b", b"3");
        batch.delete(b"tn");
        assert_matches!(
            writer.execute_batch(batch),
            Err(Error::Recoverable(storage_core::Recoverable::TransactionFailed(_)))
        );

        let reader = store.reader().unwrap();
        assert_eq!(reader.get(b"a"), Ok(Some(b"1".to_vec())));
        assert_eq!(reader.get(b"b"), Ok(None));
        assert_eq!(reader.get(b"tn"), Ok(Some(5i64.to_le_bytes().to_vec())));
        assert_eq!(store.stats().errors, 1);
        assert_eq!(emu.items("t", "default").unwrap().len(), 2);
    }

    #[test]
    fn delete_is_idempotent() {
        let store = store();
        let writer = store.writer().unwrap();

        for _ in 0..2 {
            let mut batch = writer.new_batch();
            batch.delete(b"missing");
            writer.execute_batch(batch).unwrap();
        }
        assert_eq!(store.reader().unwrap().get(b"missing"), Ok(None));
    }

    #[test]
    fn merge_onto_stored_blob_fails_whole_batch() {
        let emu = Emulator::with_table(EmulatorConfig::default(), "t");
        let blob = Item::new("default", b"tblob".to_vec(), AttributeValue::Binary(b"?".to_vec()));
        emu.insert_raw("t", blob).unwrap();
        let store = PartitionedStore::new(emu, &config()).unwrap();
        let writer = store.writer().unwrap();

        let mut batch = writer.new_batch();
        batch.set(b"x", b"y");
        batch.merge(b"tblob", &1i64.to_le_bytes());
        assert_matches!(writer.execute_batch(batch), Err(e) if e.is_recoverable());
        assert_eq!(store.reader().unwrap().get(b"x"), Ok(None));
        assert_eq!(store.reader().unwrap().get(b"tblob"), Ok(Some(b"?".to_vec())));
    }
}

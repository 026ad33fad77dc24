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
use storage_core::{Error, KvStore, Result, StoreStats};
use storage_query_backend::{AttributeType, BackendConnector, PartitionBackend};

use crate::{
    codec::{FirstByteClassifier, KeyClassifier},
    config::{PartitionedStoreConfig, StoreSettings},
    error::process_backend_error,
    reader::PartitionedReader,
    stats::StatsCounters,
    writer::PartitionedWriter,
};

/// State shared by a store and everything it hands out
pub(crate) struct StoreInner<B> {
    pub settings: StoreSettings,
    pub backend: B,
    pub classifier: Arc<dyn KeyClassifier>,
    pub stats: StatsCounters,
}

/// Ordered key-value store kept in one partition of a partitioned query backend
pub struct PartitionedStore<B> {
    inner: Arc<StoreInner<B>>,
}

impl<B> Clone for PartitionedStore<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B> std::fmt::Debug for PartitionedStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionedStore").field("settings", &self.inner.settings).finish()
    }
}

impl<B: PartitionBackend> PartitionedStore<B> {
    /// Open a store with the default counter classification
    pub fn new(backend: B, config: &PartitionedStoreConfig) -> Result<Self> {
        Self::new_with_classifier(backend, config, FirstByteClassifier::default())
    }

    pub fn new_with_classifier(
        backend: B,
        config: &PartitionedStoreConfig,
        classifier: impl KeyClassifier + 'static,
    ) -> Result<Self> {
        let settings = config.validate()?;
        check_key_schema(&backend, &settings.table)?;

        log::info!(
            "Opened partitioned store, table {}, partition {}, region {}",
            settings.table,
            settings.partition,
            settings.region,
        );

        let inner = StoreInner {
            settings,
            backend,
            classifier: Arc::new(classifier),
            stats: StatsCounters::default(),
        };
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Connect to the configured region and endpoint, then open the store
    pub fn open_with<C: BackendConnector<Backend = B>>(
        config: &PartitionedStoreConfig,
        connector: &C,
    ) -> Result<Self> {
        let settings = config.validate()?;
        let backend = connector
            .connect(&settings.region, settings.endpoint.as_deref())
            .map_err(process_backend_error)?;
        Self::new(backend, config)
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.inner.settings
    }

    pub fn backend(&self) -> &B {
        &self.inner.backend
    }
}

// Iteration relies on the backend ordering sort keys bytewise
fn check_key_schema(backend: &impl PartitionBackend, table: &str) -> Result<()> {
    let schema = backend.describe_key_schema(table).map_err(process_backend_error)?;
    if schema.partition_key != AttributeType::String || !schema.is_bytewise_ordered() {
        return Err(Error::invalid_config(format!(
            "Table {table} must have a string partition key and a binary sort key, found {schema:?}"
        )));
    }
    Ok(())
}

impl<B: PartitionBackend> KvStore for PartitionedStore<B> {
    type Reader = PartitionedReader<B>;
    type Writer = PartitionedWriter<B>;

    fn reader(&self) -> Result<Self::Reader> {
        Ok(PartitionedReader::new(Arc::clone(&self.inner)))
    }

    fn writer(&self) -> Result<Self::Writer> {
        Ok(PartitionedWriter::new(Arc::clone(&self.inner)))
    }

    fn stats(&self) -> StoreStats {
        self.inner.stats.snapshot()
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

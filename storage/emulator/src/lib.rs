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

//! In-process emulation of a partitioned query database.
//!
//! Tables keep records bytewise ordered by sort key within each partition. Queries return pages
//! of at most `page_size` evaluated records together with a continuation token whenever the
//! page limit was reached, and filters are applied to a page after the limit. Transactions are
//! validated as a whole before any of their items is applied.

mod table;

use std::{collections::BTreeMap, sync::Arc, time::Duration, time::Instant};

use logging::log;
use parking_lot::RwLock;
use storage_query_backend::{
    BackendConnector, BackendError, GetItemRequest, Item, KeySchema, PartitionBackend, QueryPage,
    QueryRequest, Result, TransactWriteRequest,
};

use table::Table;

/// Emulator limits and behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmulatorConfig {
    /// Maximum number of records evaluated per query page
    pub page_size: usize,
    /// Maximum number of items in one write transaction
    pub max_transaction_items: usize,
    /// Simulated round trip time of every request
    pub latency: Duration,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            page_size: 1000,
            max_transaction_items: 100,
            latency: Duration::ZERO,
        }
    }
}

/// Handle to an emulated database. Clones share the same tables.
#[derive(Clone)]
pub struct Emulator {
    tables: Arc<RwLock<BTreeMap<String, Table>>>,
    config: EmulatorConfig,
}

impl Emulator {
    pub fn new(config: EmulatorConfig) -> Self {
        Self {
            tables: Arc::new(RwLock::new(BTreeMap::new())),
            config,
        }
    }

    /// Emulator with a single table using string partition keys and binary sort keys
    pub fn with_table(config: EmulatorConfig, table: &str) -> Self {
        let this = Self::new(config);
        this.create_table(table, KeySchema::default());
        this
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    /// Create a table. Returns false if a table of that name already exists.
    pub fn create_table(&self, name: &str, schema: KeySchema) -> bool {
        let mut tables = self.tables.write();
        if tables.contains_key(name) {
            return false;
        }
        tables.insert(name.to_owned(), Table::new(schema));
        true
    }

    /// Store a record as is, bypassing transaction validation
    pub fn insert_raw(&self, table: &str, item: Item) -> Result<()> {
        let mut tables = self.tables.write();
        let table = Self::table_mut(&mut tables, table)?;
        table.apply(storage_query_backend::WriteItem::Put {
            table: String::new(),
            item,
        });
        Ok(())
    }

    /// All records of a partition in sort key order
    pub fn items(&self, table: &str, partition: &str) -> Result<Vec<Item>> {
        let tables = self.tables.read();
        let table = Self::table(&tables, table)?;
        Ok(table.items(partition).cloned().collect())
    }

    fn table<'a>(tables: &'a BTreeMap<String, Table>, name: &str) -> Result<&'a Table> {
        tables
            .get(name)
            .ok_or_else(|| BackendError::ResourceNotFound(format!("Table {name} does not exist")))
    }

    fn table_mut<'a>(
        tables: &'a mut BTreeMap<String, Table>,
        name: &str,
    ) -> Result<&'a mut Table> {
        tables
            .get_mut(name)
            .ok_or_else(|| BackendError::ResourceNotFound(format!("Table {name} does not exist")))
    }

    // Simulate the round trip and enforce the request deadline
    fn round_trip(&self, deadline: Option<Instant>) -> Result<()> {
        if !self.config.latency.is_zero() {
            std::thread::sleep(self.config.latency);
        }
        match deadline {
            Some(deadline) if Instant::now() >= deadline => Err(BackendError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new(EmulatorConfig::default())
    }
}

impl PartitionBackend for Emulator {
    fn get_item(&self, request: GetItemRequest) -> Result<Option<Item>> {
        self.round_trip(request.deadline)?;
        log::trace!("GetItem {:?}", request.key);
        let tables = self.tables.read();
        Ok(Self::table(&tables, &request.table)?.get(&request.key).cloned())
    }

    fn query(&self, request: QueryRequest) -> Result<QueryPage> {
        self.round_trip(request.deadline)?;
        let limit = match request.limit {
            Some(0) => return Err(BackendError::Validation("Limit must be positive".into())),
            Some(limit) => limit.min(self.config.page_size),
            None => self.config.page_size,
        };

        let tables = self.tables.read();
        let page = Self::table(&tables, &request.table)?.query(&request, limit)?;
        log::trace!(
            "Query {:?} returned {} items, more: {}",
            request.key_condition,
            page.items.len(),
            page.last_evaluated_key.is_some(),
        );
        Ok(page)
    }

    fn transact_write(&self, request: TransactWriteRequest) -> Result<()> {
        self.round_trip(request.deadline)?;

        let count = request.items.len();
        if count == 0 || count > self.config.max_transaction_items {
            return Err(BackendError::Validation(format!(
                "Transaction must contain between 1 and {} items, got {count}",
                self.config.max_transaction_items
            )));
        }

        let mut keys = std::collections::BTreeSet::new();
        for item in &request.items {
            if !keys.insert((item.table().to_owned(), item.key())) {
                return Err(BackendError::Validation(
                    "Transaction contains multiple operations on one item".into(),
                ));
            }
        }

        let mut tables = self.tables.write();
        for item in &request.items {
            Self::table(&tables, item.table())?.check(item)?;
        }
        for item in request.items {
            Self::table_mut(&mut tables, item.table())?.apply(item);
        }

        log::trace!("Transaction of {count} items committed");
        Ok(())
    }

    fn describe_key_schema(&self, table: &str) -> Result<KeySchema> {
        self.round_trip(None)?;
        let tables = self.tables.read();
        Ok(Self::table(&tables, table)?.schema())
    }
}

/// Hands out clients of one shared emulator
#[derive(Clone, Default)]
pub struct EmulatorConnector {
    emulator: Emulator,
}

impl EmulatorConnector {
    pub fn new(emulator: Emulator) -> Self {
        Self { emulator }
    }

    pub fn emulator(&self) -> &Emulator {
        &self.emulator
    }
}

impl BackendConnector for EmulatorConnector {
    type Backend = Emulator;

    fn connect(&self, region: &str, endpoint: Option<&str>) -> Result<Emulator> {
        if region.is_empty() {
            return Err(BackendError::Validation("Region must not be empty".into()));
        }
        if let Some(endpoint) = endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(BackendError::Transport(format!(
                    "Unsupported endpoint scheme: {endpoint}"
                )));
            }
        }
        log::debug!("Connected to emulated region {region}, endpoint {endpoint:?}");
        Ok(self.emulator.clone())
    }
}

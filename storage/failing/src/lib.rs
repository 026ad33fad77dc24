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

//! A backend wrapper that injects failures into selected operations

use std::sync::atomic::{AtomicU64, Ordering};

use enumflags2::{bitflags, BitFlags};
use logging::log;
use parking_lot::Mutex;
use storage_query_backend::{
    BackendError, GetItemRequest, Item, KeySchema, PartitionBackend, QueryPage, QueryRequest,
    Result, TransactWriteRequest,
};
use test_utils::random::{make_seedable_rng, Rng, RngCore, Seed};

/// Backend operations that can be made to fail
#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOp {
    GetItem,
    Query,
    TransactWrite,
    DescribeKeySchema,
}

/// When a selected operation fails
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailureMode {
    Always,
    /// Let the given number of selected calls through, then fail every one after
    AfterCalls(u64),
    /// Fail each selected call with the given probability
    Probability(f64),
}

#[derive(Debug, Clone)]
pub struct FailureConfig {
    pub ops: BitFlags<FailOp>,
    pub mode: FailureMode,
    pub error: BackendError,
}

impl FailureConfig {
    pub fn new(ops: impl Into<BitFlags<FailOp>>, mode: FailureMode) -> Self {
        Self {
            ops: ops.into(),
            mode,
            error: BackendError::Transport("injected failure".into()),
        }
    }

    pub fn with_error(self, error: BackendError) -> Self {
        Self { error, ..self }
    }
}

pub struct FailingBackend<B> {
    inner: B,
    config: FailureConfig,
    calls: AtomicU64,
    failures: AtomicU64,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl<B: PartitionBackend> FailingBackend<B> {
    pub fn new(inner: B, config: FailureConfig, seed: Seed) -> Self {
        Self {
            inner,
            config,
            calls: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            rng: Mutex::new(Box::new(make_seedable_rng(seed))),
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Number of failures injected so far
    pub fn injected_failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    fn check(&self, op: FailOp) -> Result<()> {
        if !self.config.ops.contains(op) {
            return Ok(());
        }

        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        let fail = match self.config.mode {
            FailureMode::Always => true,
            FailureMode::AfterCalls(n) => call >= n,
            FailureMode::Probability(p) => self.rng.lock().gen_bool(p.clamp(0.0, 1.0)),
        };

        if fail {
            self.failures.fetch_add(1, Ordering::Relaxed);
            log::debug!("Injecting failure into {op:?}");
            return Err(self.config.error.clone());
        }
        Ok(())
    }
}

impl<B: PartitionBackend> PartitionBackend for FailingBackend<B> {
    fn get_item(&self, request: GetItemRequest) -> Result<Option<Item>> {
        self.check(FailOp::GetItem)?;
        self.inner.get_item(request)
    }

    fn query(&self, request: QueryRequest) -> Result<QueryPage> {
        self.check(FailOp::Query)?;
        self.inner.query(request)
    }

    fn transact_write(&self, request: TransactWriteRequest) -> Result<()> {
        self.check(FailOp::TransactWrite)?;
        self.inner.transact_write(request)
    }

    fn describe_key_schema(&self, table: &str) -> Result<KeySchema> {
        self.check(FailOp::DescribeKeySchema)?;
        self.inner.describe_key_schema(table)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;
    use storage_emulator::{Emulator, EmulatorConfig};
    use storage_query_backend::{ItemKey, KeyCondition};

    fn get_request() -> GetItemRequest {
        GetItemRequest {
            table: "t".into(),
            key: ItemKey::new("p", b"k".to_vec()),
            consistent_read: true,
            deadline: None,
        }
    }

    fn query_request() -> QueryRequest {
        QueryRequest {
            table: "t".into(),
            partition: "p".into(),
            key_condition: KeyCondition::All,
            filter: None,
            exclusive_start_key: None,
            consistent_read: true,
            limit: None,
            deadline: None,
        }
    }

    fn backend(config: FailureConfig) -> FailingBackend<Emulator> {
        let emu = Emulator::with_table(EmulatorConfig::default(), "t");
        FailingBackend::new(emu, config, Seed::from_entropy())
    }

    #[test]
    fn only_selected_ops_fail() {
        let backend = backend(FailureConfig::new(FailOp::Query, FailureMode::Always));
        assert_eq!(backend.get_item(get_request()), Ok(None));
        assert!(backend.query(query_request()).is_err());
        assert_eq!(backend.injected_failures(), 1);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(3)]
    fn fail_after_calls(#[case] n: u64) {
        let ops = FailOp::GetItem | FailOp::Query;
        let backend = backend(FailureConfig::new(ops, FailureMode::AfterCalls(n)));
        for _ in 0..n {
            assert!(backend.get_item(get_request()).is_ok());
        }
        assert!(backend.query(query_request()).is_err());
        assert!(backend.get_item(get_request()).is_err());
    }

    #[test]
    fn custom_error() {
        let config = FailureConfig::new(FailOp::GetItem, FailureMode::Always)
            .with_error(BackendError::Throttled("slow down".into()));
        let backend = backend(config);
        assert_eq!(
            backend.get_item(get_request()),
            Err(BackendError::Throttled("slow down".into()))
        );
    }

    #[rstest]
    #[case(0.0, 0)]
    #[case(1.0, 50)]
    fn probability_extremes(#[case] p: f64, #[case] expected: u64) {
        let backend = backend(FailureConfig::new(FailOp::GetItem, FailureMode::Probability(p)));
        for _ in 0..50 {
            let _ = backend.get_item(get_request());
        }
        assert_eq!(backend.injected_failures(), expected);
    }
}

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

// Re-export a bunch of often used items
pub use crate::model::{Model, WriteAction};
pub use storage_core::{
    Data, Error, KvBatch, KvIterator, KvReader, KvStore, KvWriter, Result, StoreStats,
};

pub use std::{mem::drop, sync::Arc, thread};

/// A function to construct a fresh, empty store
pub trait StoreFn<S>: Fn() -> S + Send + Sync + 'static {}
impl<S, F: Fn() -> S + Send + Sync + 'static> StoreFn<S> for F {}

/// Little-endian encoding of a counter value or merge operand
pub fn le(n: i64) -> Data {
    n.to_le_bytes().to_vec()
}

/// Apply writes in a single batch
pub fn write<S: KvStore>(store: &S, f: impl FnOnce(&mut <S::Writer as KvWriter>::Batch)) {
    let writer = store.writer().expect("writer to open");
    let mut batch = writer.new_batch();
    f(&mut batch);
    writer.execute_batch(batch).expect("batch to commit");
}

/// Set a number of keys to the given values in a single batch
pub fn populate<S: KvStore>(store: &S, entries: &[(&str, &str)]) {
    write(store, |batch| {
        for (k, v) in entries {
            batch.set(k.as_bytes(), v.as_bytes());
        }
    })
}

/// Drain a cursor into owned entries, failing on cursor errors
pub fn collect<I: KvIterator>(cursor: I) -> Vec<(Data, Data)> {
    cursor.entries().collect::<Result<_>>().expect("cursor to succeed")
}

/// Drain a cursor into its keys, as strings
pub fn collect_keys<I: KvIterator>(cursor: I) -> Vec<String> {
    collect(cursor)
        .into_iter()
        .map(|(k, _)| String::from_utf8(k).expect("utf-8 key"))
        .collect()
}

/// Run tests with store using proptest
pub fn using_proptest<S: KvStore, F: StoreFn<S>, T: proptest::prelude::Strategy>(
    source_file: &'static str,
    store_fn: impl std::ops::Deref<Target = F>,
    strategy: T,
    test: impl Fn(S, T::Value),
) {
    let config = {
        let mut config = proptest::prelude::ProptestConfig::with_source_file(source_file);
        // Decrease the number of test cases. By default, this is 256 / 8 = 32.
        config.cases /= 8;
        config
    };
    let mut runner = proptest::test_runner::TestRunner::new(config);
    let result = runner.run(&strategy, |val| {
        test(store_fn(), val);
        Ok(())
    });
    result.unwrap_or_else(|e| panic!("{}{}", &e, &runner))
}

/// Test helper function not exported with the prelude
pub mod support {
    use super::*;
    use libtest_mimic::Trial;

    /// Create the test list
    pub fn create_tests<S: KvStore + 'static, F: StoreFn<S>>(
        store_fn: Arc<F>,
        tests: impl IntoIterator<Item = (&'static str, fn(Arc<F>))>,
    ) -> impl Iterator<Item = Trial> {
        tests.into_iter().map(move |(name, test)| {
            let store_fn = Arc::clone(&store_fn);
            let test_fn = move || {
                test(store_fn);
                Ok(())
            };
            Trial::test(name, test_fn)
        })
    }
}

macro_rules! tests {
    ($($name:path),* $(,)?) => {
        pub fn tests<S: $crate::prelude::KvStore + 'static, F: $crate::prelude::StoreFn<S>>(
            store_fn: Arc<F>,
        ) -> impl std::iter::Iterator<Item = libtest_mimic::Trial> {
            $crate::prelude::support::create_tests(store_fn, [
                $((concat!(module_path!(), "::", stringify!($name)), $name as fn(Arc<F>)),)*
            ])
        }
    }
}

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

//! Contract tests for ordered key-value stores.
//!
//! Each store implementation runs the suite from an integration test with `harness = false`,
//! passing a function that creates a fresh empty store for every test case.

#[macro_use]
pub mod prelude;
pub mod model;

mod basic;
mod concurrent;
mod property;

use prelude::*;

/// Run the test suite against stores created by `store_fn`
pub fn main<S: KvStore + 'static, F: StoreFn<S>>(store_fn: F) -> libtest_mimic::Conclusion {
    logging::init_logging();

    let args = libtest_mimic::Arguments::from_args();
    let store_fn = Arc::new(store_fn);

    let tests = std::iter::empty()
        .chain(basic::tests(Arc::clone(&store_fn)))
        .chain(concurrent::tests(Arc::clone(&store_fn)))
        .chain(property::tests(store_fn))
        .collect();

    libtest_mimic::run(&args, tests)
}

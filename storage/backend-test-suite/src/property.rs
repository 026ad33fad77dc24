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

use crate::prelude::*;
use proptest::prelude::*;

mod gen {
    use super::*;

    const ALPHABET: &[u8] = b"abc\x00\xff";

    // Generate key from a set of keys with given cardinality. Lower cardinality encourages
    // generation of conflicting keys, causing value overwrites and deletions to be more likely.
    pub fn blob_key(key_cardinality: u32) -> impl Strategy<Value = Data> {
        (0..key_cardinality).prop_map(|x| format!("{x:x}").into())
    }

    pub fn counter_key(key_cardinality: u32) -> impl Strategy<Value = Data> {
        (0..key_cardinality).prop_map(|x| format!("t{x:x}").into())
    }

    pub fn action(key_cardinality: u32) -> impl Strategy<Value = WriteAction> {
        prop_oneof![
            (blob_key(key_cardinality), any::<Data>()).prop_map(|(k, v)| WriteAction::Set(k, v)),
            blob_key(key_cardinality).prop_map(WriteAction::Del),
            (counter_key(key_cardinality), any::<i64>())
                .prop_map(|(k, v)| WriteAction::Set(k, le(v))),
            counter_key(key_cardinality).prop_map(WriteAction::Del),
            (counter_key(key_cardinality), any::<i64>())
                .prop_map(|(k, d)| WriteAction::Merge(k, d)),
        ]
    }

    pub fn batches(key_cardinality: u32) -> impl Strategy<Value = Vec<Vec<WriteAction>>> {
        proptest::collection::vec(proptest::collection::vec(action(key_cardinality), 0..40), 1..4)
    }

    // Short key over a small alphabet, so that keys often share prefixes
    pub fn short_key(len: std::ops::Range<usize>) -> impl Strategy<Value = Data> {
        proptest::collection::vec(proptest::sample::select(ALPHABET), len)
    }

    pub fn entries() -> impl Strategy<Value = std::collections::BTreeMap<Data, Data>> {
        proptest::collection::btree_map(short_key(1..5), any::<Data>(), 0..60)
    }
}

fn populate_from<S: KvStore>(store: &S, entries: &std::collections::BTreeMap<Data, Data>) {
    write(store, |batch| entries.iter().for_each(|(k, v)| batch.set(k, v)));
}

fn batches_match_model<S: KvStore, F: StoreFn<S>>(store_fn: Arc<F>) {
    using_proptest(file!(), store_fn, gen::batches(30), |store, batches| {
        let mut model = Model::new();
        for actions in batches {
            write(&store, |batch| actions.iter().for_each(|a| a.apply_to(batch)));
            model.extend(actions);
        }

        let reader = store.reader().unwrap();
        assert_eq!(collect(reader.prefix_iterator(&[])), model.prefix(&[]));
        for key in model.inner().keys() {
            assert_eq!(reader.get(key).unwrap().as_deref(), model.get(key));
        }
    })
}

fn prefix_is_complete<S: KvStore, F: StoreFn<S>>(store_fn: Arc<F>) {
    let strategy = (gen::entries(), gen::short_key(0..3));
    using_proptest(file!(), store_fn, strategy, |store, (entries, prefix)| {
        populate_from(&store, &entries);
        let model: Model = entries.into_iter().collect();

        let reader = store.reader().unwrap();
        let found = collect(reader.prefix_iterator(&prefix));
        assert!(found.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(found, model.prefix(&prefix));
    })
}

fn range_is_half_open<S: KvStore, F: StoreFn<S>>(store_fn: Arc<F>) {
    let strategy = (
        gen::entries(),
        gen::short_key(0..3),
        proptest::option::of(gen::short_key(1..4)),
    );
    using_proptest(file!(), store_fn, strategy, |store, (entries, start, end)| {
        populate_from(&store, &entries);
        let model: Model = entries.into_iter().collect();

        let reader = store.reader().unwrap();
        let mut cursor = reader.range_iterator(&start, end.as_deref());
        let mut found = Vec::new();
        while let Some((k, v)) = cursor.current() {
            found.push((k.to_vec(), v.to_vec()));
            cursor.next();
        }
        assert_eq!(cursor.close(), Ok(()));
        assert_eq!(found, model.range(&start, end.as_deref()));
    })
}

fn seek_never_goes_back<S: KvStore, F: StoreFn<S>>(store_fn: Arc<F>) {
    let strategy = (
        gen::entries(),
        gen::short_key(0..3),
        proptest::option::of(gen::short_key(1..4)),
        gen::short_key(1..4),
    );
    using_proptest(file!(), store_fn, strategy, |store, (entries, start, end, seek)| {
        populate_from(&store, &entries);
        let model: Model = entries.into_iter().collect();

        let reader = store.reader().unwrap();
        let mut cursor = reader.range_iterator(&start, end.as_deref());
        cursor.next();
        cursor.seek(&seek);

        let from = std::cmp::max(&start, &seek);
        assert_eq!(collect(cursor), model.range(from, end.as_deref()));
    })
}

tests![
    batches_match_model,
    prefix_is_complete,
    range_is_half_open,
    seek_never_goes_back,
];

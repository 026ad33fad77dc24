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

const TEST_KEY: &[u8] = b"foo";
const COUNTER_KEY: &[u8] = b"tcount";

fn setup<S: KvStore>(store: S, init: &[u8]) -> Arc<S> {
    write(&store, |batch| batch.set(TEST_KEY, init));
    Arc::new(store)
}

fn read_write_race<S: KvStore + 'static, F: StoreFn<S>>(store_fn: Arc<F>) {
    let store = setup(store_fn(), &[0]);

    let thr0 = thread::spawn({
        let store = Arc::clone(&store);
        move || write(&*store, |batch| batch.set(TEST_KEY, &[2]))
    });

    let value = store.reader().unwrap().get(TEST_KEY).unwrap().unwrap();
    assert!(value == [0] || value == [2]);

    thr0.join().unwrap();
    assert_eq!(store.reader().unwrap().get(TEST_KEY), Ok(Some(vec![2])));
}

fn concurrent_merges_add_up<S: KvStore + 'static, F: StoreFn<S>>(store_fn: Arc<F>) {
    const THREADS: i64 = 4;
    const ROUNDS: i64 = 10;
    let store = Arc::new(store_fn());

    let threads: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..ROUNDS {
                    write(&*store, |batch| batch.merge(COUNTER_KEY, &le(t + 1)));
                }
            })
        })
        .collect();
    threads.into_iter().for_each(|t| t.join().unwrap());

    let expected = ROUNDS * (1..=THREADS).sum::<i64>();
    assert_eq!(store.reader().unwrap().get(COUNTER_KEY), Ok(Some(le(expected))));
}

fn threaded_reads_consistent<S: KvStore + 'static, F: StoreFn<S>>(store_fn: Arc<F>) {
    let val = [0x77, 0x88, 0x99].as_ref();
    let store = setup(store_fn(), val);

    let threads: Vec<_> = (0..2)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.reader().unwrap().get(TEST_KEY).unwrap().unwrap())
        })
        .collect();

    for thr in threads {
        assert_eq!(thr.join().unwrap(), val);
    }
}

fn write_different_keys_and_iterate<S: KvStore + 'static, F: StoreFn<S>>(store_fn: Arc<F>) {
    let store = Arc::new(store_fn());

    let threads: Vec<_> = [(0x01u8, 0xf1u8), (0x02, 0xf2)]
        .into_iter()
        .map(|(k, v)| {
            let store = Arc::clone(&store);
            thread::spawn(move || write(&*store, |batch| batch.set(&[k], &[v])))
        })
        .collect();
    threads.into_iter().for_each(|t| t.join().unwrap());

    let contents = collect(store.reader().unwrap().prefix_iterator(&[]));
    assert_eq!(contents, [(vec![0x01], vec![0xf1]), (vec![0x02], vec![0xf2])]);
}

fn cursors_are_independent<S: KvStore + 'static, F: StoreFn<S>>(store_fn: Arc<F>) {
    let store = Arc::new(store_fn());
    write(&*store, |batch| {
        for i in 0..20u8 {
            batch.set(&[b'k', i], &[i]);
        }
    });

    let threads: Vec<_> = (0..4u8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let reader = store.reader().unwrap();
                let mut cursor = reader.range_iterator(&[b'k', t], Some(&[b'k', t + 10][..]));
                let mut count = 0;
                let mut last: Option<Data> = None;
                while let Some(key) = cursor.key() {
                    assert!(last.as_deref().is_none_or(|last| last < key));
                    last = Some(key.to_vec());
                    count += 1;
                    cursor.next();
                }
                assert_eq!(cursor.close(), Ok(()));
                count
            })
        })
        .collect();

    for thr in threads {
        assert_eq!(thr.join().unwrap(), 10);
    }
}

tests![
    concurrent_merges_add_up,
    cursors_are_independent,
    read_write_race,
    threaded_reads_consistent,
    write_different_keys_and_iterate,
];

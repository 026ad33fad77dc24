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

//! Some basic tests

use crate::prelude::*;

fn set_and_get<S: KvStore, F: StoreFn<S>>(store_fn: Arc<F>) {
    let store = store_fn();

    populate(&store, &[("hello", "world")]);

    let reader = store.reader().unwrap();
    assert_eq!(reader.get(b"hello"), Ok(Some(b"world".to_vec())));
    assert_eq!(reader.get(b"hell"), Ok(None));
    assert_eq!(reader.get(b"hello\x00"), Ok(None));
}

fn set_twice_in_batch_last_wins<S: KvStore, F: StoreFn<S>>(store_fn: Arc<F>) {
    let store = store_fn();

    write(&store, |batch| {
        batch.set(b"hello", b"a");
        batch.set(b"hello", b"b");
        assert_eq!(batch.len(), 1);
    });

    let reader = store.reader().unwrap();
    assert_eq!(reader.get(b"hello"), Ok(Some(b"b".to_vec())));
}

fn empty_values_and_binary_keys<S: KvStore, F: StoreFn<S>>(store_fn: Arc<F>) {
    let store = store_fn();

    write(&store, |batch| {
        batch.set(&[0x00], &[]);
        batch.set(&[0xff, 0x00], &[0x00]);
        batch.set(&[0x01], &[0xff; 300]);
    });

    let reader = store.reader().unwrap();
    assert_eq!(reader.get(&[0x00]), Ok(Some(vec![])));
    assert_eq!(reader.get(&[0xff, 0x00]), Ok(Some(vec![0x00])));
    assert_eq!(reader.get(&[0x01]), Ok(Some(vec![0xff; 300])));

    let keys: Vec<_> = collect(reader.prefix_iterator(&[])).into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, [vec![0x00u8], vec![0x01], vec![0xff, 0x00]]);
}

fn multi_get_preserves_order<S: KvStore, F: StoreFn<S>>(store_fn: Arc<F>) {
    let store = store_fn();

    populate(&store, &[("a", "1"), ("c", "3")]);

    let reader = store.reader().unwrap();
    let keys: [&[u8]; 4] = [b"c", b"b", b"a", b"c"];
    assert_eq!(
        reader.multi_get(&keys),
        Ok(vec![Some(b"3".to_vec()), None, Some(b"1".to_vec()), Some(b"3".to_vec())])
    );
}

const ENTRIES: [(&str, &str); 10] = [
    ("aa", "0"),
    ("ab", "1"),
    ("ac", "2"),
    ("aca", "3"),
    ("acb", "4"),
    ("b", "5"),
    ("bb", "6"),
    ("bf", "7"),
    ("bz", "8"),
    ("x", "9"),
];

fn iterate_over_prefixes<S: KvStore, F: StoreFn<S>>(store_fn: Arc<F>) {
    let store = store_fn();
    populate(&store, &ENTRIES);
    let reader = store.reader().unwrap();

    // Check for a non-existent prefix
    assert!(!reader.prefix_iterator(b"foo").valid());

    // Check for items that are supposed to be present
    let check = |range: std::ops::RangeInclusive<usize>, prefix: &[u8]| {
        let vals: Vec<_> =
            collect(reader.prefix_iterator(prefix)).into_iter().map(|x| x.1).collect();
        let expected: Vec<_> = range.map(|x| Data::from(x.to_string())).collect();
        assert_eq!(vals, expected, "prefix={:?}", prefix);
    };

    check(0..=9, b"");
    check(0..=4, b"a");
    check(0..=0, b"aa");
    check(2..=4, b"ac");
    check(5..=8, b"b");
    check(9..=9, b"x");
}

fn prefix_seek<S: KvStore, F: StoreFn<S>>(store_fn: Arc<F>) {
    let store = store_fn();
    populate(&store, &ENTRIES);
    let reader = store.reader().unwrap();

    let mut cursor = reader.prefix_iterator(b"a");
    cursor.seek(b"ac");
    assert_eq!(cursor.key(), Some(&b"ac"[..]));
    cursor.seek(b"abz");
    assert_eq!(cursor.key(), Some(&b"ac"[..]));
    cursor.seek(b"b");
    assert!(!cursor.valid());
    cursor.seek(b"");
    assert_eq!(collect_keys(cursor), ["aa", "ab", "ac", "aca", "acb"]);
}

fn iterate_over_ranges<S: KvStore, F: StoreFn<S>>(store_fn: Arc<F>) {
    let store = store_fn();
    populate(&store, &ENTRIES);
    let reader = store.reader().unwrap();

    let check = |start: &str, end: Option<&str>, expected: &[&str]| {
        let cursor = reader.range_iterator(start.as_bytes(), end.map(str::as_bytes));
        assert_eq!(collect_keys(cursor), expected, "range={start:?}..{end:?}");
    };

    check("", None, &["aa", "ab", "ac", "aca", "acb", "b", "bb", "bf", "bz", "x"]);
    check("ac", Some("b"), &["ac", "aca", "acb"]);
    check("ab", Some("ac"), &["ab"]);
    check("", Some("ab"), &["aa"]);
    check("bc", None, &["bf", "bz", "x"]);
    check("acb", Some("acb\x00"), &["acb"]);
    check("c", Some("x"), &[]);
}

fn empty_and_inverted_ranges<S: KvStore, F: StoreFn<S>>(store_fn: Arc<F>) {
    let store = store_fn();
    populate(&store, &ENTRIES);
    let reader = store.reader().unwrap();

    for (start, end) in [("b", "b"), ("x", "a"), ("bz", "b")] {
        let mut cursor = reader.range_iterator(start.as_bytes(), Some(end.as_bytes()));
        assert!(!cursor.valid());
        cursor.next();
        assert!(!cursor.valid());
        assert_eq!(cursor.error(), None);
        assert_eq!(cursor.close(), Ok(()));
    }
}

fn range_seek_restarts<S: KvStore, F: StoreFn<S>>(store_fn: Arc<F>) {
    let store = store_fn();
    populate(&store, &ENTRIES);
    let reader = store.reader().unwrap();

    let mut cursor = reader.range_iterator(b"ab", Some(b"bz"));
    cursor.next();
    cursor.next();
    assert_eq!(cursor.key(), Some(&b"aca"[..]));

    cursor.seek(b"b");
    assert_eq!(cursor.key(), Some(&b"b"[..]));

    // Seeking backwards never revisits keys below an earlier seek
    cursor.seek(b"ab");
    assert_eq!(cursor.key(), Some(&b"b"[..]));
    assert_eq!(collect_keys(cursor), ["b", "bb", "bf"]);
}

fn merges_coalesce<S: KvStore, F: StoreFn<S>>(store_fn: Arc<F>) {
    let store = store_fn();

    write(&store, |batch| {
        batch.merge(b"tk", &le(1));
        batch.merge(b"tk", &le(2));
        batch.merge(b"tk", &le(-1));
        assert_eq!(batch.len(), 1);
    });
    assert_eq!(store.reader().unwrap().get(b"tk"), Ok(Some(le(2))));

    write(&store, |batch| batch.merge(b"tk", &le(-5)));
    assert_eq!(store.reader().unwrap().get(b"tk"), Ok(Some(le(-3))));
}

fn merge_after_set_and_delete<S: KvStore, F: StoreFn<S>>(store_fn: Arc<F>) {
    let store = store_fn();

    write(&store, |batch| {
        batch.set(b"ta", &le(40));
        batch.merge(b"ta", &le(2));
        batch.merge(b"tb", &le(7));
        batch.delete(b"tb");
        batch.merge(b"tb", &le(3));
    });

    let reader = store.reader().unwrap();
    assert_eq!(reader.get(b"ta"), Ok(Some(le(42))));
    assert_eq!(reader.get(b"tb"), Ok(Some(le(3))));
}

fn merge_after_blob_set<S: KvStore, F: StoreFn<S>>(store_fn: Arc<F>) {
    let store = store_fn();

    // A blob under a plain key is read as a little-endian counter by the merge
    write(&store, |batch| {
        batch.set(b"x", &[5]);
        batch.merge(b"x", &le(2));
        batch.set(b"y", &[0xff; 9]);
        batch.merge(b"y", &le(3));
        batch.merge(b"y", &le(1));
    });

    let reader = store.reader().unwrap();
    assert_eq!(reader.get(b"x"), Ok(Some(le(7))));
    assert_eq!(reader.get(b"y"), Ok(Some(le(3))));
}

fn counters_wrap<S: KvStore, F: StoreFn<S>>(store_fn: Arc<F>) {
    let store = store_fn();

    write(&store, |batch| batch.set(b"tmax", &le(i64::MAX)));
    write(&store, |batch| batch.merge(b"tmax", &le(1)));
    assert_eq!(store.reader().unwrap().get(b"tmax"), Ok(Some(le(i64::MIN))));
}

fn delete_is_idempotent<S: KvStore, F: StoreFn<S>>(store_fn: Arc<F>) {
    let store = store_fn();
    populate(&store, &[("a", "1")]);

    for _ in 0..2 {
        write(&store, |batch| batch.delete(b"a"));
        assert_eq!(store.reader().unwrap().get(b"a"), Ok(None));
    }
    write(&store, |batch| batch.delete(b"never-written"));
    assert!(!store.reader().unwrap().prefix_iterator(b"").valid());
}

fn reset_discards_writes<S: KvStore, F: StoreFn<S>>(store_fn: Arc<F>) {
    let store = store_fn();

    write(&store, |batch| {
        batch.set(b"a", b"1");
        batch.merge(b"tc", &le(1));
        batch.reset();
        assert!(batch.is_empty());
        batch.set(b"b", b"2");
    });

    let reader = store.reader().unwrap();
    assert_eq!(reader.get(b"a"), Ok(None));
    assert_eq!(reader.get(b"tc"), Ok(None));
    assert_eq!(reader.get(b"b"), Ok(Some(b"2".to_vec())));
}

fn dropped_batch_has_no_effect<S: KvStore, F: StoreFn<S>>(store_fn: Arc<F>) {
    let store = store_fn();

    let writer = store.writer().unwrap();
    let mut batch = writer.new_batch();
    batch.set(b"a", b"1");
    drop(batch);
    assert_eq!(writer.close(), Ok(()));

    assert_eq!(store.reader().unwrap().get(b"a"), Ok(None));
}

fn stats_and_close<S: KvStore, F: StoreFn<S>>(store_fn: Arc<F>) {
    let store = store_fn();
    populate(&store, &[("a", "1"), ("b", "2")]);

    let reader = store.reader().unwrap();
    assert_eq!(reader.get(b"a"), Ok(Some(b"1".to_vec())));
    assert_eq!(collect(reader.prefix_iterator(b"")).len(), 2);
    assert_eq!(reader.close(), Ok(()));

    let stats = store.stats();
    assert_eq!(stats.transactions, 1);
    assert_eq!(stats.items_written, 2);
    assert_eq!(stats.point_gets, 1);
    assert_eq!(stats.items_read, 3);
    assert!(stats.to_json().is_ok());

    assert_eq!(store.close(), Ok(()));
    assert_eq!(store.close(), Ok(()));
}

tests![
    counters_wrap,
    delete_is_idempotent,
    dropped_batch_has_no_effect,
    empty_and_inverted_ranges,
    empty_values_and_binary_keys,
    iterate_over_prefixes,
    iterate_over_ranges,
    merge_after_blob_set,
    merge_after_set_and_delete,
    merges_coalesce,
    multi_get_preserves_order,
    prefix_seek,
    range_seek_restarts,
    reset_discards_writes,
    set_and_get,
    set_twice_in_batch_last_wins,
    stats_and_close,
];

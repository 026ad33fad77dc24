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

//! Helpers for implementing stores on top of ordered maps

use std::{collections::BTreeMap, ops::Bound};

/// Range over slices usable with [BTreeMap::range] on maps keyed by `Vec<T>`.
///
/// `my_map.range(my_slice..)` does not compile because `Vec<T>` only implements `Borrow<[T]>`,
/// this type bridges the gap without allocating.
pub struct SliceRange<'a, T> {
    pub start: Bound<&'a [T]>,
    pub end: Bound<&'a [T]>,
}

impl<'a, T> SliceRange<'a, T> {
    /// Half-open range `[start, end)`, with `None` meaning unbounded above.
    pub fn half_open(start: &'a [T], end: Option<&'a [T]>) -> Self {
        Self {
            start: Bound::Included(start),
            end: end.map_or(Bound::Unbounded, Bound::Excluded),
        }
    }
}

impl<T> std::ops::RangeBounds<[T]> for SliceRange<'_, T> {
    fn start_bound(&self) -> Bound<&[T]> {
        self.start
    }

    fn end_bound(&self) -> Bound<&[T]> {
        self.end
    }
}

/// Iterator over entries of a [BTreeMap] with keys starting with a prefix, beginning at the
/// first key `>= from`.
pub struct MapPrefixIter<'m, V> {
    inner: std::collections::btree_map::Range<'m, Vec<u8>, V>,
    prefix: &'m [u8],
}

impl<'m, V> MapPrefixIter<'m, V> {
    pub fn new(map: &'m BTreeMap<Vec<u8>, V>, prefix: &'m [u8], from: &'m [u8]) -> Self {
        let start = std::cmp::max(prefix, from);
        let inner = map.range(SliceRange {
            start: Bound::Included(start),
            end: Bound::Unbounded,
        });
        Self { inner, prefix }
    }
}

impl<'m, V> Iterator for MapPrefixIter<'m, V> {
    type Item = (&'m Vec<u8>, &'m V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().filter(|(k, _)| k.starts_with(self.prefix))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> BTreeMap<Vec<u8>, u32> {
        [&b"a"[..], b"ab", b"abc", b"ac", b"b"]
            .iter()
            .enumerate()
            .map(|(i, k)| (k.to_vec(), i as u32))
            .collect()
    }

    #[test]
    fn prefix_iteration() {
        let map = sample();
        let vals: Vec<_> = MapPrefixIter::new(&map, b"ab", b"").map(|(_, v)| *v).collect();
        assert_eq!(vals, [1, 2]);
        let vals: Vec<_> = MapPrefixIter::new(&map, b"a", b"abb").map(|(_, v)| *v).collect();
        assert_eq!(vals, [2, 3]);
        assert_eq!(MapPrefixIter::new(&map, b"x", b"").count(), 0);
    }

    #[test]
    fn half_open_range() {
        let map = sample();
        let range = SliceRange::half_open(&b"ab"[..], Some(&b"ac"[..]));
        let vals: Vec<_> = map.range(range).map(|(_, v)| *v).collect();
        assert_eq!(vals, [1, 2]);
        let range = SliceRange::half_open(&b"ac"[..], None);
        let vals: Vec<_> = map.range(range).map(|(_, v)| *v).collect();
        assert_eq!(vals, [3, 4]);
    }
}

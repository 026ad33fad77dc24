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

pub mod random;

use std::collections::BTreeSet;

use random::Rng;

/// Random byte string with length in given range.
pub fn random_bytes(rng: &mut impl Rng, len: std::ops::Range<usize>) -> Vec<u8> {
    if len.is_empty() {
        return Vec::new();
    }
    let len = rng.gen_range(len);
    (0..len).map(|_| rng.gen::<u8>()).collect()
}

/// Random key starting with given prefix. The suffix is at least one byte long.
pub fn random_key_with_prefix(rng: &mut impl Rng, prefix: &[u8], max_suffix_len: usize) -> Vec<u8> {
    let mut key = prefix.to_vec();
    key.extend(random_bytes(rng, 1..max_suffix_len.max(1) + 1));
    key
}

/// A set of `count` distinct random keys drawn from a small alphabet, so that keys frequently
/// share prefixes.
pub fn random_keys(rng: &mut impl Rng, count: usize, max_len: usize) -> BTreeSet<Vec<u8>> {
    const ALPHABET: &[u8] = b"abct\x00\xff";
    let max_len = max_len.max(1);
    let mut keys = BTreeSet::new();
    // Bounded number of attempts, small alphabets with short keys cannot produce many distinct keys
    for _ in 0..count.saturating_mul(16) {
        if keys.len() == count {
            break;
        }
        let len = rng.gen_range(1..=max_len);
        let key = (0..len).map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())]).collect();
        keys.insert(key);
    }
    keys
}

#[macro_export]
macro_rules! assert_matches_return_val {
    ($in:expr, $pattern:pat $(if $guard:expr)?, $out:expr) => {
        {
            let to_match = $in;
            match to_match {
                $pattern $(if $guard)? => $out,
                _ => {
                    panic!(
                        "Assertion failed: expression {:?} doesn't match pattern {}",
                        to_match,
                        stringify!($pattern)
                    )
                }
            }
        }
    };
}

#[macro_export]
macro_rules! assert_matches {
    ($in:expr, $pattern:pat $(if $guard:expr)?) => {
        $crate::assert_matches_return_val!($in, $pattern $(if $guard)?, ())
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{make_seedable_rng, Seed};
    use rstest::rstest;

    #[derive(Debug)]
    enum TestEnum {
        E1(usize),
        E2,
    }

    #[test]
    fn assert_matches_return_val_success() {
        let val = assert_matches_return_val!(TestEnum::E1(123), TestEnum::E1(x), x);
        assert_eq!(val, 123);
    }

    #[test]
    #[should_panic]
    fn assert_matches_failure() {
        assert_matches!(TestEnum::E1(123), TestEnum::E2);
    }

    #[rstest]
    #[trace]
    #[case(Seed::from_entropy())]
    fn random_key_keeps_prefix(#[case] seed: Seed) {
        let mut rng = make_seedable_rng(seed);

        for _ in 0..100 {
            let key = random_key_with_prefix(&mut rng, b"pre", 5);
            assert!(key.starts_with(b"pre"));
            assert!(key.len() > 3 && key.len() <= 8);
        }
    }

    #[rstest]
    #[trace]
    #[case(Seed::from_entropy())]
    fn random_keys_are_bounded(#[case] seed: Seed) {
        let mut rng = make_seedable_rng(seed);

        let keys = random_keys(&mut rng, 20, 4);
        assert!(keys.len() <= 20);
        assert!(keys.iter().all(|k| !k.is_empty() && k.len() <= 4));
    }
}

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

//! Mapping between store values and the backend value attribute.
//!
//! Values of counter keys are 8-byte little-endian integers stored as native numbers, so that
//! the backend can add to them atomically. Every other value is stored as an opaque blob.

use logging::log;
use storage_core::{Data, Error, Result};
use storage_query_backend::{AttributeValue, Item};

/// Decides which keys hold counters
pub trait KeyClassifier: Send + Sync {
    fn is_counter(&self, key: &[u8]) -> bool;
}

impl<F: Fn(&[u8]) -> bool + Send + Sync> KeyClassifier for F {
    fn is_counter(&self, key: &[u8]) -> bool {
        self(key)
    }
}

/// Counter keys are the ones starting with a given byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirstByteClassifier(pub u8);

impl Default for FirstByteClassifier {
    fn default() -> Self {
        Self(b't')
    }
}

impl KeyClassifier for FirstByteClassifier {
    fn is_counter(&self, key: &[u8]) -> bool {
        key.first() == Some(&self.0)
    }
}

/// Read a counter value or merge operand. Values that are not 8 bytes wide are zero-extended or
/// truncated.
pub fn counter_from_le(key: &[u8], bytes: &[u8]) -> i64 {
    if bytes.len() != 8 {
        log::warn!(
            "Counter value of key {key:x?} is {} bytes wide, expected 8",
            bytes.len()
        );
    }
    storage_core::merge::read_i64_le(bytes)
}

/// Parse a numeric attribute. Numbers beyond the signed range are read as their unsigned bit
/// pattern.
pub fn parse_number(text: &str) -> Option<i64> {
    text.parse::<i64>().ok().or_else(|| text.parse::<u64>().ok().map(|n| n as i64))
}

/// Encode the value to be stored under `key`
pub fn encode(classifier: &dyn KeyClassifier, key: &[u8], value: &[u8]) -> AttributeValue {
    if classifier.is_counter(key) {
        AttributeValue::number(counter_from_le(key, value))
    } else {
        AttributeValue::Binary(value.to_vec())
    }
}

/// Decode the value of a stored record
pub fn decode(item: &Item) -> Result<Data> {
    match &item.value {
        Some(AttributeValue::Binary(data)) => Ok(data.clone()),
        Some(AttributeValue::Number(text)) => parse_number(text)
            .map(|n| n.to_le_bytes().to_vec())
            .ok_or_else(|| {
                Error::corrupt_record(format!(
                    "Key {:x?} holds an unparsable number '{text}'",
                    item.sort_key
                ))
            }),
        None => Err(Error::corrupt_record(format!(
            "Key {:x?} has no value",
            item.sort_key
        ))),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;
    use test_utils::random::{make_seedable_rng, Rng, Seed};

    fn item(value: Option<AttributeValue>) -> Item {
        Item {
            partition: "p".into(),
            sort_key: b"k".to_vec(),
            filter_key: Some(b"k".to_vec()),
            value,
        }
    }

    #[test]
    fn first_byte_classifier() {
        let classifier = FirstByteClassifier::default();
        assert!(classifier.is_counter(b"t"));
        assert!(classifier.is_counter(b"term"));
        assert!(!classifier.is_counter(b"xt"));
        assert!(!classifier.is_counter(b""));
    }

    #[test]
    fn closure_classifier() {
        let classifier = |key: &[u8]| key.ends_with(b"#n");
        assert!(classifier.is_counter(b"doc#n"));
        assert_eq!(
            encode(&classifier, b"doc", &[1, 0, 0, 0, 0, 0, 0, 0]),
            AttributeValue::Binary(vec![1, 0, 0, 0, 0, 0, 0, 0])
        );
    }

    #[rstest]
    #[trace]
    #[case(Seed::from_entropy())]
    fn counter_round_trip(#[case] seed: Seed) {
        let mut rng = make_seedable_rng(seed);
        let classifier = FirstByteClassifier::default();

        for _ in 0..100 {
            let value = rng.gen::<u64>().to_le_bytes();
            let encoded = encode(&classifier, b"tcount", &value);
            assert!(encoded.as_number().is_some());
            assert_eq!(decode(&item(Some(encoded))).unwrap(), value);
        }
    }

    #[test]
    fn counter_encoding_is_signed() {
        let classifier = FirstByteClassifier::default();
        let encoded = encode(&classifier, b"t", &u64::MAX.to_le_bytes());
        assert_eq!(encoded, AttributeValue::Number("-1".into()));
    }

    #[rstest]
    #[case(&[5], 5)]
    #[case(&[1, 2, 3, 4, 5, 6, 7, 8, 9], 0x0807060504030201)]
    fn odd_width_counters(#[case] value: &[u8], #[case] expected: i64) {
        let encoded = encode(&FirstByteClassifier::default(), b"t", value);
        assert_eq!(encoded, AttributeValue::number(expected));
    }

    #[test]
    fn blobs_are_verbatim() {
        let value = b"\x00opaque\xff".to_vec();
        let encoded = encode(&FirstByteClassifier::default(), b"doc", &value);
        assert_eq!(encoded, AttributeValue::Binary(value.clone()));
        assert_eq!(decode(&item(Some(encoded))), Ok(value));
    }

    #[rstest]
    #[case("18446744073709551615", u64::MAX)]
    #[case("-2", (-2i64) as u64)]
    #[case("0", 0)]
    fn numbers_decode_little_endian(#[case] text: &str, #[case] expected: u64) {
        let decoded = decode(&item(Some(AttributeValue::Number(text.into())))).unwrap();
        assert_eq!(decoded, expected.to_le_bytes());
    }

    #[rstest]
    #[case(None)]
    #[case(Some(AttributeValue::Number("1.5".into())))]
    #[case(Some(AttributeValue::Number("".into())))]
    fn corrupt_records(#[case] value: Option<AttributeValue>) {
        assert!(matches!(
            decode(&item(value)),
            Err(Error::Fatal(storage_core::Fatal::CorruptRecord(_)))
        ));
    }
}

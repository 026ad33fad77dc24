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

//! Store configuration

use serde::{Deserialize, Serialize};
use storage_core::{Error, Result};
use storage_partitioned::PartitionedStoreConfig;

/// Kind of store to open
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StoreBackendKind {
    Partitioned,
    InMemory,
}

impl std::str::FromStr for StoreBackendKind {
    type Err = StoreBackendParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "partitioned" => Ok(StoreBackendKind::Partitioned),
            "inmemory" | "in-memory" => Ok(StoreBackendKind::InMemory),
            name => {
                let name = name.into();
                Err(StoreBackendParseError::Unrecognized { name })
            }
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum StoreBackendParseError {
    #[error("Unrecognized store backend '{name}'")]
    Unrecognized { name: String },
}

/// Store configuration, tagged by the `backend` field.
///
/// ```toml
/// backend = "partitioned"
/// table_name = "kv"
/// region = "eu-central-1"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "backend", rename_all = "kebab-case")]
pub enum StoreConfig {
    Partitioned(PartitionedStoreConfig),
    InMemory,
}

impl StoreConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::invalid_config(e.to_string()))
    }

    pub fn kind(&self) -> StoreBackendKind {
        match self {
            StoreConfig::Partitioned(_) => StoreBackendKind::Partitioned,
            StoreConfig::InMemory => StoreBackendKind::InMemory,
        }
    }
}

impl From<PartitionedStoreConfig> for StoreConfig {
    fn from(config: PartitionedStoreConfig) -> Self {
        StoreConfig::Partitioned(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use storage_core::Fatal;
    use test_utils::assert_matches;

    #[rstest]
    #[case("partitioned", Ok(StoreBackendKind::Partitioned))]
    #[case("inmemory", Ok(StoreBackendKind::InMemory))]
    #[case("in-memory", Ok(StoreBackendKind::InMemory))]
    #[case(
        "sled",
        Err(StoreBackendParseError::Unrecognized { name: "sled".into() })
    )]
    fn parse_kind(
        #[case] s: &str,
        #[case] expected: std::result::Result<StoreBackendKind, StoreBackendParseError>,
    ) {
        assert_eq!(s.parse::<StoreBackendKind>(), expected);
    }

    #[test]
    fn partitioned_from_toml() {
        let config = StoreConfig::from_toml_str(
            r#"
            backend = "partitioned"
            table_name = "kv"
            region = "eu-central-1"
            page_size = 50
            "#,
        )
        .unwrap();

        let mut expected = PartitionedStoreConfig::new("kv", "eu-central-1");
        expected.page_size = Some(50);
        assert_eq!(config, StoreConfig::Partitioned(expected));
        assert_eq!(config.kind(), StoreBackendKind::Partitioned);
    }

    #[test]
    fn in_memory_from_toml() {
        let config = StoreConfig::from_toml_str(r#"backend = "in-memory""#).unwrap();
        assert_eq!(config, StoreConfig::InMemory);
        assert_eq!(config.kind(), StoreBackendKind::InMemory);
    }

    #[rstest]
    #[case("")]
    #[case(r#"backend = "sled""#)]
    #[case("backend = \"partitioned\"\ntable = \"kv\"")]
    fn bad_toml(#[case] s: &str) {
        assert_matches!(
            StoreConfig::from_toml_str(s),
            Err(Error::Fatal(Fatal::InvalidConfig(_)))
        );
    }
}

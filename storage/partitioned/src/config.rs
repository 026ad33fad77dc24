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

//! Partitioned store configuration

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use storage_core::{Error, Result};

/// Partition used when the configuration does not name one
pub const DEFAULT_PARTITION: &str = "default";

/// Upper bound on the number of items in one backend write transaction
pub const MAX_TRANSACTION_ITEMS: usize = 100;

/// Partitioned store configuration, as read from a configuration file
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct PartitionedStoreConfig {
    /// Name of the backend table. Required.
    pub table_name: Option<String>,
    /// Backend region. Required.
    pub region: Option<String>,
    /// Partition holding all records of the store
    pub partition: Option<String>,
    /// Override of the backend endpoint
    pub endpoint: Option<String>,
    /// Maximum number of records per query page
    pub page_size: Option<usize>,
    /// Maximum number of distinct keys in one batch
    pub max_transaction_items: Option<usize>,
    /// Deadline of each backend request
    pub request_timeout_ms: Option<u64>,
}

impl PartitionedStoreConfig {
    pub fn new(table_name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            table_name: Some(table_name.into()),
            region: Some(region.into()),
            ..Default::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::invalid_config(e.to_string()))
    }

    /// Check the configuration and fill in defaults
    pub fn validate(&self) -> Result<StoreSettings> {
        fn required(value: &Option<String>, name: &str) -> Result<String> {
            match value.as_deref() {
                Some(v) if !v.is_empty() => Ok(v.to_owned()),
                _ => Err(Error::invalid_config(format!("{name} must be set"))),
            }
        }

        let table = required(&self.table_name, "table_name")?;
        let region = required(&self.region, "region")?;

        let partition = match self.partition.as_deref() {
            None | Some("") => DEFAULT_PARTITION.to_owned(),
            Some(p) => p.to_owned(),
        };

        if self.page_size == Some(0) {
            return Err(Error::invalid_config("page_size must be positive"));
        }

        let max_transaction_items = self.max_transaction_items.unwrap_or(MAX_TRANSACTION_ITEMS);
        if !(1..=MAX_TRANSACTION_ITEMS).contains(&max_transaction_items) {
            return Err(Error::invalid_config(format!(
                "max_transaction_items must be between 1 and {MAX_TRANSACTION_ITEMS}"
            )));
        }

        let request_timeout = match self.request_timeout_ms {
            Some(0) => return Err(Error::invalid_config("request_timeout_ms must be positive")),
            ms => ms.map(Duration::from_millis),
        };

        Ok(StoreSettings {
            table,
            region,
            partition,
            endpoint: self.endpoint.clone().filter(|e| !e.is_empty()),
            page_size: self.page_size,
            max_transaction_items,
            request_timeout,
        })
    }
}

/// Validated, immutable store settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub table: String,
    pub region: String,
    pub partition: String,
    pub endpoint: Option<String>,
    pub page_size: Option<usize>,
    pub max_transaction_items: usize,
    pub request_timeout: Option<Duration>,
}

impl StoreSettings {
    /// Deadline for a request issued now
    pub fn deadline(&self) -> Option<Instant> {
        self.request_timeout.map(|t| Instant::now() + t)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;
    use storage_core::Fatal;
    use test_utils::assert_matches;

    #[test]
    fn parse_full() {
        let config = PartitionedStoreConfig::from_toml_str(
            r#"
            table_name = "index"
            region = "eu-central-1"
            partition = "docs"
            endpoint = "http://localhost:8000"
            page_size = 25
            max_transaction_items = 50
            request_timeout_ms = 1500
            "#,
        )
        .unwrap();

        let settings = config.validate().unwrap();
        assert_eq!(settings.table, "index");
        assert_eq!(settings.region, "eu-central-1");
        assert_eq!(settings.partition, "docs");
        assert_eq!(settings.endpoint.as_deref(), Some("http://localhost:8000"));
        assert_eq!(settings.page_size, Some(25));
        assert_eq!(settings.max_transaction_items, 50);
        assert_eq!(settings.request_timeout, Some(Duration::from_millis(1500)));
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    fn default_partition(#[case] partition: Option<&str>) {
        let config = PartitionedStoreConfig {
            partition: partition.map(str::to_owned),
            ..PartitionedStoreConfig::new("t", "r")
        };
        let settings = config.validate().unwrap();
        assert_eq!(settings.partition, DEFAULT_PARTITION);
        assert_eq!(settings.max_transaction_items, MAX_TRANSACTION_ITEMS);
        assert_eq!(settings.deadline(), None);
    }

    #[rstest]
    #[case("region = \"r\"")]
    #[case("table_name = \"t\"")]
    #[case("table_name = \"\"\nregion = \"r\"")]
    #[case("table_name = \"t\"\nregion = \"r\"\npage_size = 0")]
    #[case("table_name = \"t\"\nregion = \"r\"\nmax_transaction_items = 101")]
    #[case("table_name = \"t\"\nregion = \"r\"\nrequest_timeout_ms = 0")]
    #[case("table_name = \"t\"\nregion = \"r\"\ncolor = \"blue\"")]
    #[case("table_name = 5")]
    fn invalid(#[case] toml: &str) {
        let result = PartitionedStoreConfig::from_toml_str(toml).and_then(|c| c.validate());
        assert_matches!(result, Err(Error::Fatal(Fatal::InvalidConfig(_))));
    }
}

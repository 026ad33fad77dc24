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

use thiserror::Error;

use crate::utils::{get_from_env, GetFromEnvError};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextColoring {
    On,
    Off,
    Auto,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogStyle {
    Text(TextColoring),
    Json,
}

impl LogStyle {
    pub fn parse(str: &str) -> Result<LogStyle, LogStyleParseError> {
        match str.to_lowercase().as_str() {
            "json" => Ok(LogStyle::Json),
            "text" => Ok(LogStyle::Text(TextColoring::Auto)),
            "text-colored" => Ok(LogStyle::Text(TextColoring::On)),
            "text-uncolored" => Ok(LogStyle::Text(TextColoring::Off)),
            other => Err(LogStyleParseError::UnrecognizedFormat(other.to_owned())),
        }
    }
}

pub fn get_log_style_from_env(env_var_name: &str) -> Result<Option<LogStyle>, LogStyleParseError> {
    get_from_env(env_var_name)?.map(|val| LogStyle::parse(&val)).transpose()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LogStyleParseError {
    #[error("Unrecognized format: {0}")]
    UnrecognizedFormat(String),
    #[error("Env var error: {0:?}")]
    GetFromEnvError(#[from] GetFromEnvError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_styles() {
        assert_eq!(LogStyle::parse("text"), Ok(LogStyle::Text(TextColoring::Auto)));
        assert_eq!(LogStyle::parse("text-colored"), Ok(LogStyle::Text(TextColoring::On)));
        assert_eq!(
            LogStyle::parse("text-uncolored"),
            Ok(LogStyle::Text(TextColoring::Off))
        );
        assert_eq!(LogStyle::parse("json"), Ok(LogStyle::Json));
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(LogStyle::parse("tEXt"), Ok(LogStyle::Text(TextColoring::Auto)));
        assert_eq!(LogStyle::parse("jSoN"), Ok(LogStyle::Json));
    }

    #[test]
    fn parse_rejects_unknown_style() {
        assert_eq!(
            LogStyle::parse("yaml"),
            Err(LogStyleParseError::UnrecognizedFormat("yaml".to_owned()))
        );
    }

    // Make the name verbose so that it doesn't conflict with env variables used by other tests.
    static TEST_ENV_VAR: &str = "SORTKV_LOG_STYLE_TEST_ENV_VAR";

    #[test]
    fn style_from_env() {
        std::env::set_var(TEST_ENV_VAR, "text-colored");
        assert_eq!(
            get_log_style_from_env(TEST_ENV_VAR),
            Ok(Some(LogStyle::Text(TextColoring::On)))
        );

        std::env::remove_var(TEST_ENV_VAR);
        assert_eq!(get_log_style_from_env(TEST_ENV_VAR), Ok(None));
    }
}

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

mod log_style;
mod utils;

pub use log;

pub use log_style::{get_log_style_from_env, LogStyle, LogStyleParseError, TextColoring};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Env var that selects the output format, see [LogStyle::parse] for accepted values.
pub const LOG_STYLE_ENV_VAR_NAME: &str = "SORTKV_LOG_STYLE";

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "info";

static INITIALIZE_LOGGER_ONCE_FLAG: std::sync::Once = std::sync::Once::new();

/// Initialize logging to stderr.
///
/// The filter is taken from `RUST_LOG`, the output style from [LOG_STYLE_ENV_VAR_NAME].
/// Records emitted through the `log` facade are forwarded to the subscriber.
/// Calling this more than once is harmless, only the first call has an effect.
pub fn init_logging() {
    INITIALIZE_LOGGER_ONCE_FLAG.call_once(|| {
        let style = match get_log_style_from_env(LOG_STYLE_ENV_VAR_NAME) {
            Ok(style) => style.unwrap_or(LogStyle::Text(TextColoring::Auto)),
            Err(err) => {
                eprintln!("Ignoring bad {LOG_STYLE_ENV_VAR_NAME} value: {err}");
                LogStyle::Text(TextColoring::Auto)
            }
        };
        init_logging_impl(style);
    });
}

fn init_logging_impl(style: LogStyle) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(filter);

    // Another subscriber may already be installed (e.g. by a test harness), that is fine.
    let _ = match style {
        LogStyle::Json => {
            registry.with(fmt::layer().json().with_writer(std::io::stderr)).try_init()
        }
        LogStyle::Text(coloring) => {
            let ansi = match coloring {
                TextColoring::On => true,
                TextColoring::Off => false,
                TextColoring::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
            };
            registry
                .with(fmt::layer().with_ansi(ansi).with_writer(std::io::stderr))
                .try_init()
        }
    };
}

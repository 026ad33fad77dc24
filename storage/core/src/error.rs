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

//! Storage errors

/// Recoverable store error. Retrying the operation later may succeed.
#[derive(Debug, Ord, PartialOrd, PartialEq, Eq, Clone, thiserror::Error)]
pub enum Recoverable {
    /// The backend could not be reached or refused to serve the request (transport failure,
    /// authentication failure, throttling). The backend message is kept verbatim.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend rejected a write transaction and none of its effects have taken place.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// The request did not complete before its deadline.
    #[error("Request deadline exceeded")]
    TimedOut,
}

/// Fatal store error. Retrying the same operation will fail the same way.
#[derive(Debug, Ord, PartialOrd, PartialEq, Eq, Clone, thiserror::Error)]
pub enum Fatal {
    /// A stored record has neither a binary nor a numeric value, or the number cannot be parsed.
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    /// The store configuration is missing required settings or is not usable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The operation was invoked with an argument it cannot accept.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Store error
#[derive(Debug, Ord, PartialOrd, PartialEq, Eq, Clone, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Recoverable(#[from] Recoverable),
    #[error("{0}")]
    Fatal(#[from] Fatal),
}

impl Error {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable(_))
    }

    pub fn backend_unavailable(msg: impl Into<String>) -> Self {
        Recoverable::BackendUnavailable(msg.into()).into()
    }

    pub fn corrupt_record(msg: impl Into<String>) -> Self {
        Fatal::CorruptRecord(msg.into()).into()
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Fatal::InvalidConfig(msg.into()).into()
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Fatal::InvalidArgument(msg.into()).into()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn classification() {
        assert!(Error::backend_unavailable("throttled").is_recoverable());
        assert!(Error::from(Recoverable::TimedOut).is_recoverable());
        assert!(!Error::corrupt_record("no value").is_recoverable());
        assert!(!Error::invalid_config("no table").is_recoverable());
    }

    #[test]
    fn messages_are_kept_verbatim() {
        let err = Error::backend_unavailable("ProvisionedThroughputExceeded: slow down");
        assert_eq!(
            err.to_string(),
            "Backend unavailable: ProvisionedThroughputExceeded: slow down"
        );
    }
}

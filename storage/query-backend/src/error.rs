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

/// Errors reported by a partitioned query backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Request throttled: {0}")]
    Throttled(String),
    #[error("Access denied: {0}")]
    AccessDenied(String),
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Transaction canceled: {0}")]
    TransactionCanceled(String),
    #[error("Deadline exceeded")]
    DeadlineExceeded,
}

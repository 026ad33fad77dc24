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

use storage_core::error::{Fatal, Recoverable};
use storage_query_backend::BackendError;

/// Map a backend error into a storage error. Backend messages are kept verbatim.
pub fn process_backend_error(err: BackendError) -> storage_core::Error {
    match err {
        // The backend cannot serve us right now, the caller may retry later
        BackendError::Throttled(_)
        | BackendError::AccessDenied(_)
        | BackendError::Transport(_)
        | BackendError::ResourceNotFound(_) => {
            Recoverable::BackendUnavailable(err.to_string()).into()
        }

        // Nothing from the transaction has been applied
        BackendError::TransactionCanceled(msg) => Recoverable::TransactionFailed(msg).into(),

        BackendError::DeadlineExceeded => Recoverable::TimedOut.into(),

        // The request itself is malformed, retrying will not help
        BackendError::Validation(msg) => Fatal::InvalidArgument(msg).into(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(BackendError::Throttled("x".into()), true)]
    #[case(BackendError::AccessDenied("x".into()), true)]
    #[case(BackendError::Transport("x".into()), true)]
    #[case(BackendError::ResourceNotFound("x".into()), true)]
    #[case(BackendError::TransactionCanceled("x".into()), true)]
    #[case(BackendError::DeadlineExceeded, true)]
    #[case(BackendError::Validation("x".into()), false)]
    fn classification(#[case] err: BackendError, #[case] recoverable: bool) {
        assert_eq!(process_backend_error(err).is_recoverable(), recoverable);
    }

    #[test]
    fn message_is_verbatim() {
        let err = process_backend_error(BackendError::Throttled("rate exceeded".into()));
        assert_eq!(
            err,
            Recoverable::BackendUnavailable("Request throttled: rate exceeded".into()).into()
        );
    }
}

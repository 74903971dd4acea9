//! Bounded retry with re-authentication between attempts.
//!
//! Provider failures (expired sessions, dropped connections) are recovered by
//! minting a fresh session and running the same operation again. The
//! [`ReauthPolicy`] bounds the attempts (two by default: the original call
//! plus one retry); [`with_reauth`] drives an operation under that policy.
//!
//! # Example
//!
//! ```no_run
//! use harvester_core::drive::{
//!     Authenticator, DriveApi, DriveError, GoogleDriveClient, StaticTokenAuthenticator,
//!     list_files_in_folder,
//! };
//! use harvester_core::retry::{ReauthPolicy, with_reauth};
//!
//! # async fn example() -> Result<(), DriveError> {
//! let api = GoogleDriveClient::new()?;
//! let auth = StaticTokenAuthenticator::new("token");
//! let mut session = auth.authenticate().await?;
//! let ids = with_reauth(&ReauthPolicy::default(), &auth, &mut session, |session| {
//!     let api = &api;
//!     async move { list_files_in_folder(api, &session, "FOLDER_ID").await }
//! })
//! .await?;
//! println!("{} files", ids.len());
//! # Ok(())
//! # }
//! ```

use std::fmt::Display;
use std::future::Future;

use tracing::{debug, warn};

use crate::drive::{Authenticator, DriveError, Session};

/// Default maximum attempts (initial call plus one retry).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Decision after a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Acquire a new session and run the operation again.
    Reauthenticate {
        /// Which attempt this will be (1-indexed, so the first retry is 2).
        attempt: u32,
    },

    /// Propagate the error.
    GiveUp {
        /// Human-readable reason why no retry is attempted.
        reason: String,
    },
}

/// How many times an operation may run before its error propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReauthPolicy {
    max_attempts: u32,
}

impl Default for ReauthPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl ReauthPolicy {
    /// Creates a policy with a custom attempt cap (at least 1).
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decides what to do after attempt number `attempt` (1-indexed) failed.
    #[must_use]
    pub fn should_retry(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::GiveUp {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }
        RetryDecision::Reauthenticate {
            attempt: attempt + 1,
        }
    }
}

/// Runs `operation` under `policy`, re-authenticating between attempts.
///
/// The operation receives a clone of the current session. After a failure
/// that the policy allows to retry, `session` is replaced (not merged) with a
/// freshly minted one and the operation runs again.
///
/// # Errors
///
/// Returns the operation's error from the final attempt, or the
/// authentication error if minting a new session fails.
pub async fn with_reauth<T, E, F, Fut>(
    policy: &ReauthPolicy,
    auth: &dyn Authenticator,
    session: &mut Session,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut(Session) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: From<DriveError> + Display,
{
    let mut attempt = 1;
    loop {
        let error = match operation(session.clone()).await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        match policy.should_retry(attempt) {
            RetryDecision::GiveUp { reason } => {
                debug!(attempt, reason = %reason, "not retrying");
                return Err(error);
            }
            RetryDecision::Reauthenticate { attempt: next } => {
                warn!(
                    attempt,
                    error = %error,
                    "Operation failed; re-authenticating and retrying"
                );
                *session = auth.authenticate().await.map_err(E::from)?;
                attempt = next;
            }
        }
    }
}

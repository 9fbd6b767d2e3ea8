//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Per-call context: deadline, cancellation and metadata.

use crate::CallError;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// String key/value pairs sent alongside a call.
pub type Metadata = HashMap<String, String>;

/// Carries a call's deadline, cancellation signal and outgoing metadata.
///
/// Contexts are cheap to clone; clones share the same cancellation token.
/// [`CallContext::child`] derives a context that is cancelled with its
/// parent but can also be cancelled on its own.
///
/// Deadlines use [`tokio::time::Instant`], so they follow a paused test
/// clock.
///
/// # Examples
///
/// ```rust
/// use microrpc::CallContext;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let ctx = CallContext::new()
///     .with_timeout(Duration::from_secs(2))
///     .with_metadata("x-request-id", "42");
///
/// assert!(ctx.deadline().is_some());
/// assert!(!ctx.is_done());
///
/// ctx.cancel();
/// assert!(ctx.check().is_err());
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    token: CancellationToken,
    metadata: Metadata,
}

impl CallContext {
    /// A context with no deadline that is never cancelled unless asked to.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the context to `timeout` from now.
    ///
    /// An existing earlier deadline is kept.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.with_deadline(deadline)
    }

    /// Bounds the context to `deadline`.
    ///
    /// An existing earlier deadline is kept.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Replaces the cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Adds an outgoing metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// A context sharing this deadline and metadata whose token is a child of
    /// this one.
    pub fn child(&self) -> Self {
        Self {
            deadline: self.deadline,
            token: self.token.child_token(),
            metadata: self.metadata.clone(),
        }
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline, saturating at zero.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Outgoing metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Cancels this context and all of its children.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the context was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns `true` once the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Returns `true` if the context is cancelled or expired.
    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.is_expired()
    }

    /// Fails with the reason the context is done, if it is.
    ///
    /// Cancellation wins when both apply.
    pub fn check(&self) -> Result<(), CallError> {
        if self.is_cancelled() {
            Err(CallError::Cancelled)
        } else if self.is_expired() {
            Err(CallError::DeadlineExceeded)
        } else {
            Ok(())
        }
    }

    /// Resolves once the context is cancelled or its deadline passes,
    /// yielding the matching error.
    ///
    /// Never resolves for a context with neither a deadline nor a
    /// cancellation.
    pub async fn done(&self) -> CallError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.token.cancelled() => CallError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => CallError::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                CallError::Cancelled
            }
        }
    }
}

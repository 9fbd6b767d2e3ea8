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

//! The retry backoff trait.

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

/// Decides how long the call controller waits before the next attempt.
///
/// `attempt` counts completed failed attempts, starting at 0 for the delay
/// before the first retry. The wait itself is bounded by the call's
/// context: a delay longer than the remaining deadline ends the call with
/// `DeadlineExceeded`.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use microrpc::backoff::Backoff;
/// use std::time::Duration;
///
/// #[derive(Debug)]
/// struct Linear(Duration);
///
/// #[async_trait]
/// impl Backoff for Linear {
///     async fn next_delay(&self, attempt: u32) -> Duration {
///         self.0 * (attempt + 1)
///     }
///
///     fn name(&self) -> &str {
///         "Linear"
///     }
/// }
/// ```
#[async_trait]
pub trait Backoff: Send + Sync + Debug {
    /// Delay before retry number `attempt + 1`.
    async fn next_delay(&self, attempt: u32) -> Duration;

    /// Short name for logs.
    fn name(&self) -> &str;
}

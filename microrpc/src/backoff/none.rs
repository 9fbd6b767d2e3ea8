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

//! Immediate retries.

use crate::backoff::Backoff;
use async_trait::async_trait;
use std::time::Duration;

/// Retries immediately, without waiting between attempts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBackoff;

#[async_trait]
impl Backoff for NoBackoff {
    async fn next_delay(&self, _attempt: u32) -> Duration {
        Duration::ZERO
    }

    fn name(&self) -> &str {
        "none"
    }
}

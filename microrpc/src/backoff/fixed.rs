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

//! Constant delay between attempts.

use crate::backoff::Backoff;
use async_trait::async_trait;
use std::time::Duration;

/// Waits the same amount of time before every retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay(Duration);

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self(delay)
    }

    pub fn delay(&self) -> Duration {
        self.0
    }
}

#[async_trait]
impl Backoff for FixedDelay {
    async fn next_delay(&self, _attempt: u32) -> Duration {
        self.0
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

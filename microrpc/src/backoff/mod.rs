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

//! Delays between retry attempts.
//!
//! A call's [`CallOptions`](crate::client::CallOptions) carry one
//! [`Backoff`]. The default, [`NoBackoff`], retries immediately.
//! [`FixedDelay`] and [`ExponentialBackoff`] space attempts out.

mod exponential;
mod fixed;
mod none;
mod traits;

pub use self::exponential::ExponentialBackoff;
pub use self::fixed::FixedDelay;
pub use self::none::NoBackoff;
pub use self::traits::Backoff;

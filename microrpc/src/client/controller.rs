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

//! The retry loop that drives attempts against a call's context.

use crate::CallError;
use crate::client::{CallHandler, CallOptions, Request, Response};
use crate::context::CallContext;
use crate::observability::CallMetrics;
use std::sync::Arc;

#[cfg(feature = "observability")]
use tracing::{debug, warn};

/// Runs up to `options.retries + 1` attempts of `handler`.
///
/// Each attempt is spawned on its own task and raced against `ctx`. When the
/// context finishes first the controller returns at once; the attempt is
/// neither aborted nor joined and finishes on its own, releasing whatever it
/// leased. The first successful attempt ends the loop. A failure that
/// [`CallError::is_retryable`] rejects ends it too; otherwise the error is
/// kept and the next attempt starts after the backoff delay. When every
/// attempt failed the last error is returned.
///
/// `ctx` must already carry the call's deadline.
pub(crate) async fn drive(
    ctx: &CallContext,
    handler: Arc<dyn CallHandler>,
    request: &Request,
    options: Arc<CallOptions>,
    metrics: &CallMetrics,
) -> Result<Response, CallError> {
    let mut last_error = None;

    for attempt in 0..=options.retries {
        if attempt > 0 {
            metrics.record_retry();
            let delay = options.backoff.next_delay(attempt - 1).await;
            if !delay.is_zero() {
                #[cfg(feature = "observability")]
                debug!(attempt, delay_ms = delay.as_millis() as u64, "backing off");
                tokio::select! {
                    biased;
                    err = ctx.done() => return Err(err),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        let task = tokio::spawn(handler.call(ctx.clone(), request.clone(), Arc::clone(&options)));

        let outcome = tokio::select! {
            biased;
            err = ctx.done() => {
                #[cfg(feature = "observability")]
                debug!(attempt, error = %err, "call context finished before the attempt");
                return Err(err);
            }
            joined = task => joined.map_err(|e| CallError::Internal {
                message: format!("attempt {attempt} did not complete: {e}"),
            })?,
        };

        match outcome {
            Ok(response) => return Ok(response),
            Err(e) if e.is_retryable() => {
                #[cfg(feature = "observability")]
                warn!(
                    attempt,
                    retries = options.retries,
                    error = %e,
                    "attempt failed"
                );
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| CallError::Internal {
        message: "no attempt was made".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backoff::FixedDelay;
    use crate::client::handler_fn;
    use crate::transport::TransportError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn request() -> Request {
        Request::new("svc", "Svc.Do", "application/json", Arc::new(()))
    }

    /// Fails with a transport error until call number `succeed_on`.
    fn flaky(succeed_on: u32, calls: Arc<AtomicU32>) -> Arc<dyn CallHandler> {
        handler_fn(move |_ctx, _request, _options| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n >= succeed_on {
                    Ok(Response::default())
                } else {
                    Err(CallError::Transport(TransportError::connection_lost("reset")))
                }
            }
        })
    }

    #[tokio::test]
    async fn test_succeeds_on_last_allowed_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let metrics = CallMetrics::new();
        let options = Arc::new(CallOptions::default().with_retries(2));
        let ctx = CallContext::new().with_timeout(Duration::from_secs(5));

        drive(&ctx, flaky(3, Arc::clone(&calls)), &request(), options, &metrics)
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(metrics.total_retries(), 2);
    }

    #[tokio::test]
    async fn test_returns_last_error_when_attempts_run_out() {
        let calls = Arc::new(AtomicU32::new(0));
        let metrics = CallMetrics::new();
        let options = Arc::new(CallOptions::default().with_retries(1));
        let ctx = CallContext::new().with_timeout(Duration::from_secs(5));

        let err = drive(&ctx, flaky(3, Arc::clone(&calls)), &request(), options, &metrics)
            .await
            .unwrap_err();
        assert!(matches!(err, CallError::Transport(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_the_loop() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let handler = handler_fn(move |_ctx, _request, _options| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(CallError::invalid_argument("bad")) }
        });
        let options = Arc::new(CallOptions::default().with_retries(5));
        let ctx = CallContext::new().with_timeout(Duration::from_secs(5));

        let err = drive(&ctx, handler, &request(), options, &CallMetrics::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CallError::InvalidArgument { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_attempt_is_internal() {
        let handler = handler_fn(|_ctx, _request, _options| async {
            if true {
                panic!("attempt blew up");
            }
            Ok(Response::default())
        });
        let options = Arc::new(CallOptions::default().with_retries(3));
        let ctx = CallContext::new().with_timeout(Duration::from_secs(5));

        let err = drive(&ctx, handler, &request(), options, &CallMetrics::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CallError::Internal { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_wins_over_slow_attempt() {
        let handler = handler_fn(|_ctx, _request, _options| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(Response::default())
        });
        let options = Arc::new(CallOptions::default());
        let ctx = CallContext::new().with_timeout(Duration::from_millis(100));

        let err = drive(&ctx, handler, &request(), options, &CallMetrics::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CallError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_cancellation_is_reported() {
        let handler = handler_fn(|ctx: CallContext, _request, _options| async move {
            ctx.cancel();
            std::future::pending::<()>().await;
            Ok(Response::default())
        });
        let options = Arc::new(CallOptions::default());
        let ctx = CallContext::new().with_timeout(Duration::from_secs(5));

        let err = drive(&ctx, handler, &request(), options, &CallMetrics::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CallError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_is_bounded_by_deadline() {
        let calls = Arc::new(AtomicU32::new(0));
        let options = Arc::new(
            CallOptions::default()
                .with_retries(3)
                .with_backoff(Arc::new(FixedDelay::new(Duration::from_secs(1)))),
        );
        let ctx = CallContext::new().with_timeout(Duration::from_millis(500));

        let err = drive(&ctx, flaky(10, Arc::clone(&calls)), &request(), options, &CallMetrics::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CallError::DeadlineExceeded));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Polling primitives.

use crate::error::WaitError;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// Poll `condition` on every tick of `interval` until it yields a value, a
/// message arrives on `done`, or `timeout` expires.
///
/// A zero `timeout` means no timeout. The first tick fires after one full
/// interval.
pub async fn poll_until<T, F, Fut>(
    interval: Duration,
    mut done: Option<mpsc::Receiver<T>>,
    timeout: Duration,
    mut condition: F,
) -> Result<T, WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // interval() fires immediately; consume that so the first poll waits.
    ticker.tick().await;

    let bounded = !timeout.is_zero();
    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(value) = condition().await {
                    return Ok(value);
                }
            }
            message = recv_or_pending(&mut done) => {
                return Ok(message);
            }
            _ = &mut deadline, if bounded => {
                return Err(WaitError::Timeout);
            }
        }
    }
}

/// [`poll_until`] without a timeout.
pub async fn poll_forever<T, F, Fut>(
    interval: Duration,
    done: Option<mpsc::Receiver<T>>,
    condition: F,
) -> Result<T, WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    poll_until(interval, done, Duration::ZERO, condition).await
}

/// Run `condition` once, bounded by `timeout`.
///
/// A zero `timeout` reports [`WaitError::Timeout`] immediately without
/// invoking the condition.
pub async fn wait_until<T, F, Fut>(timeout: Duration, condition: F) -> Result<T, WaitError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    if timeout.is_zero() {
        return Err(WaitError::Timeout);
    }
    tokio::time::timeout(timeout, condition())
        .await
        .map_err(|_| WaitError::Timeout)
}

/// Retry `condition` up to `retries` times with `(attempt + 1) * interval`
/// backoff between attempts. Returns the first success, or
/// [`WaitError::Timeout`] when the budget is exhausted — including a zero
/// budget, which never invokes the condition.
pub async fn poll_retry<T, E, F, Fut>(
    retries: usize,
    interval: Duration,
    mut condition: F,
) -> Result<T, WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    for attempt in 0..retries {
        match condition().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                tracing::warn!(attempt, error = %err, "condition attempt failed");
            }
        }
        if attempt + 1 < retries {
            tokio::time::sleep(interval * (attempt as u32 + 1)).await;
        }
    }
    Err(WaitError::Timeout)
}

async fn recv_or_pending<T>(rx: &mut Option<mpsc::Receiver<T>>) -> T {
    match rx {
        Some(rx) => match rx.recv().await {
            Some(value) => value,
            // Sender dropped without a message — treat as "no done signal".
            None => std::future::pending().await,
        },
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "poll_tests.rs"]
mod tests;

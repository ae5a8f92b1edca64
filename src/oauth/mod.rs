//! Bounded-retry authorization-code exchange.
//!
//! The exchange walks `AwaitingCode -> Exchanging -> {Succeeded, Retrying,
//! Failed}`: each failed attempt moves to `Retrying` with a linearly
//! increasing delay (attempt x delay unit) until the attempt budget is
//! spent, at which point the last error is surfaced to the caller.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Observable phases of the exchange, used for structured logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangePhase {
    Exchanging,
    Retrying,
    Succeeded,
    Failed,
}

impl ExchangePhase {
    fn as_str(self) -> &'static str {
        match self {
            ExchangePhase::Exchanging => "exchanging",
            ExchangePhase::Retrying => "retrying",
            ExchangePhase::Succeeded => "succeeded",
            ExchangePhase::Failed => "failed",
        }
    }
}

/// Run `attempt_fn` up to `max_attempts` times, sleeping
/// `attempt x delay_unit` after each failure except the last. The final
/// error is returned unchanged.
pub async fn exchange_with_retry<T, E, F, Fut>(
    max_attempts: u32,
    delay_unit: Duration,
    mut attempt_fn: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1u32;
    loop {
        tracing::debug!(attempt, phase = ExchangePhase::Exchanging.as_str(), "authorization code exchange");
        match attempt_fn().await {
            Ok(value) => {
                tracing::debug!(attempt, phase = ExchangePhase::Succeeded.as_str(), "authorization code exchange");
                return Ok(value);
            }
            Err(e) if attempt >= max_attempts => {
                tracing::warn!(attempt, phase = ExchangePhase::Failed.as_str(), error = %e, "authorization code exchange");
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(attempt, phase = ExchangePhase::Retrying.as_str(), error = %e, "authorization code exchange");
                tokio::time::sleep(delay_unit * attempt).await;
                attempt += 1;
            }
        }
    }
}

/// Primary/fallback substitution for interchangeable backends
///
/// The primary attempt is time-boxed; the fallback runs at most once and only
/// when the primary failed or timed out. The fallback has no timeout of its own.
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::timeout::{with_timeout_result, TimeoutError};

/// Which attempt produced the value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Primary,
    Fallback,
}

#[derive(Debug)]
pub struct FallbackOutcome<T> {
    pub value: T,
    pub attempt: Attempt,
    /// Why the primary was abandoned, when the fallback produced the value
    pub primary_error: Option<String>,
    pub elapsed: Duration,
}

impl<T> FallbackOutcome<T> {
    pub fn used_fallback(&self) -> bool {
        self.attempt == Attempt::Fallback
    }
}

#[derive(Debug, thiserror::Error)]
#[error("primary failed ({primary}); fallback failed ({fallback})")]
pub struct FallbackError<E> {
    pub primary: TimeoutError<E>,
    pub fallback: E,
}

/// Run `primary` under `primary_timeout`; on error or timeout run `fallback` once.
pub async fn with_fallback<P, PFut, F, FFut, T, E>(
    primary_timeout: Duration,
    primary: P,
    fallback: F,
) -> Result<FallbackOutcome<T>, FallbackError<E>>
where
    P: FnOnce() -> PFut,
    PFut: Future<Output = Result<T, E>>,
    F: FnOnce() -> FFut,
    FFut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let start = Instant::now();

    let primary_error = match with_timeout_result(primary_timeout, primary()).await {
        Ok(value) => {
            return Ok(FallbackOutcome {
                value,
                attempt: Attempt::Primary,
                primary_error: None,
                elapsed: start.elapsed(),
            })
        }
        Err(err) => err,
    };

    warn!(
        timed_out = primary_error.is_elapsed(),
        error = %primary_error,
        "Primary attempt abandoned, switching to fallback"
    );

    match fallback().await {
        Ok(value) => {
            info!(elapsed_ms = start.elapsed().as_millis() as u64, "Fallback attempt succeeded");
            Ok(FallbackOutcome {
                value,
                attempt: Attempt::Fallback,
                primary_error: Some(primary_error.to_string()),
                elapsed: start.elapsed(),
            })
        }
        Err(fallback) => Err(FallbackError {
            primary: primary_error,
            fallback,
        }),
    }
}

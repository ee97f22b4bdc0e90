/// Resilience patterns for outbound provider calls
///
/// This library provides:
/// - **Timeout**: Enforces a time limit on a single external call
/// - **Fallback**: Time-boxed primary attempt with a one-shot substitute
///
/// # Example: Primary provider with fallback
///
/// ```rust,no_run
/// use resilience::with_fallback;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let outcome = with_fallback(
///         Duration::from_secs(30),
///         || async { Ok::<_, String>("primary") },
///         || async { Ok::<_, String>("fallback") },
///     )
///     .await;
///     assert!(outcome.is_ok());
/// }
/// ```

pub mod fallback;
pub mod timeout;

// Re-export main types for convenience
pub use fallback::{with_fallback, Attempt, FallbackError, FallbackOutcome};
pub use timeout::{with_timeout_result, TimeoutError};

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

/// Time budget for a single collaborator call. Every call is retried exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    pub timeout: Duration,
}

impl CallPolicy {
    pub const ATTEMPTS: u32 = 2;

    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GuardError {
    #[error("{collaborator} failed: {message}")]
    Failed {
        collaborator: &'static str,
        message: String,
    },
    #[error("{collaborator} did not answer within {timeout:?}")]
    TimedOut {
        collaborator: &'static str,
        timeout: Duration,
    },
    #[error("{collaborator} worker aborted: {message}")]
    Aborted {
        collaborator: &'static str,
        message: String,
    },
}

/// Runs a blocking collaborator call on the blocking pool under `policy`.
///
/// A failure or a timeout triggers one more attempt; the second error is returned.
/// A timed-out attempt keeps running in the background until it returns on its own.
pub async fn guarded<T, E, F>(
    policy: CallPolicy,
    collaborator: &'static str,
    call: F,
) -> Result<T, GuardError>
where
    F: Fn() -> Result<T, E> + Send + Sync + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
{
    let call = Arc::new(call);
    let mut attempt = 1;

    loop {
        let task = Arc::clone(&call);
        let outcome =
            tokio::time::timeout(policy.timeout, tokio::task::spawn_blocking(move || task())).await;

        let error = match outcome {
            Ok(Ok(Ok(value))) => return Ok(value),
            Ok(Ok(Err(error))) => GuardError::Failed {
                collaborator,
                message: error.to_string(),
            },
            Ok(Err(join_error)) => GuardError::Aborted {
                collaborator,
                message: join_error.to_string(),
            },
            Err(_) => GuardError::TimedOut {
                collaborator,
                timeout: policy.timeout,
            },
        };

        if attempt >= CallPolicy::ATTEMPTS {
            return Err(error);
        }
        warn!(collaborator, attempt, %error, "collaborator call failed, retrying once");
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn second_attempt_can_succeed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let result = guarded(CallPolicy::default(), "classifier", move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err("cold start")
            } else {
                Ok(0.82)
            }
        })
        .await;

        assert_eq!(result, Ok(0.82));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn retries_exactly_once_before_giving_up() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<f64, _> = guarded(CallPolicy::default(), "regressor", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<f64, _>("model file truncated")
        })
        .await;

        assert_eq!(
            result,
            Err(GuardError::Failed {
                collaborator: "regressor",
                message: "model file truncated".to_string(),
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn slow_calls_time_out_on_both_attempts() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let policy = CallPolicy::new(Duration::from_millis(20));

        let result = guarded(policy, "fallback", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(150));
            Ok::<_, String>("late answer")
        })
        .await;

        assert_eq!(
            result,
            Err(GuardError::TimedOut {
                collaborator: "fallback",
                timeout: Duration::from_millis(20),
            })
        );
        // abandoned attempts still run to completion on the blocking pool
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}

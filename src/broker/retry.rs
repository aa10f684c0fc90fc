use std::future::Future;
use std::time::Duration;

/// Delivery retry policy applied around the consumer handler, not inside it.
/// Defaults mirror the listener-container settings this queue was deployed
/// with: 3 attempts, exponential backoff from 1s doubling up to a 10s cap.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1000),
            multiplier: 2.0,
            max_delay: Duration::from_millis(10_000),
        }
    }
}

impl RetryPolicy {
    /// Backoff slept after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let ms = self.initial_delay.as_millis() as f64 * self.multiplier.powi(exp as i32);
        Duration::from_millis((ms as u64).min(self.max_delay.as_millis() as u64))
    }
}

/// Run `op` until it succeeds or the attempt budget is exhausted, sleeping
/// the policy's backoff between attempts. Returns the last error on
/// exhaustion so the caller can dead-letter with it.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt: u32 = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= policy.max_attempts.max(1) => {
                tracing::error!(attempt, error = %err, "delivery attempts exhausted");
                return Err(err);
            }
            Err(err) => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "delivery attempt failed, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_sequence_doubles_from_one_second() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(4000));
    }

    #[test]
    fn backoff_is_capped_at_max_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(5), Duration::from_millis(10_000));
        assert_eq!(policy.delay_for(12), Duration::from_millis(10_000));
    }

    #[tokio::test(start_paused = true)]
    async fn stops_retrying_after_first_success() {
        let policy = RetryPolicy::default();
        let mut calls = 0u32;
        let result: Result<u32, String> = with_retry(&policy, |attempt| {
            calls += 1;
            async move {
                if attempt < 2 {
                    Err("transient".to_string())
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_last_error_after_exhaustion() {
        let policy = RetryPolicy::default();
        let mut calls = 0u32;
        let result: Result<(), String> = with_retry(&policy, |attempt| {
            calls += 1;
            async move { Err(format!("failure on attempt {attempt}")) }
        })
        .await;

        assert_eq!(result, Err("failure on attempt 3".to_string()));
        assert_eq!(calls, 3);
    }
}

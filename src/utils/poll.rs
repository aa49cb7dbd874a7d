//! Attempt-bounded, cancellable polling of remote jobs.

use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// How often and how long to poll a remote job.
///
/// Defaults to 10 attempts two seconds apart, roughly a 20 second budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of checks, including the first one.
    pub max_attempts: u32,
    /// Delay between two checks.
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(2),
        }
    }
}

impl PollPolicy {
    /// Create a policy with the given attempt count and interval.
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Set the maximum number of checks.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the delay between checks.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Worst-case time spent sleeping between checks.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

/// Verdict of a single check.
#[derive(Debug, Clone, PartialEq)]
pub enum PollStep<T> {
    /// The job reached a state the caller accepts; stop polling.
    Ready(T),
    /// The job is still running; check again after the interval.
    Pending,
}

/// Successful outcome of [`poll_until`].
#[derive(Debug, Clone, PartialEq)]
pub struct Polled<T> {
    /// Value produced by the final check.
    pub value: T,
    /// Number of checks performed.
    pub attempts: u32,
    /// Time spent polling.
    pub elapsed: Duration,
}

/// Why [`poll_until`] stopped without a ready value.
#[derive(Debug, Error)]
pub enum PollError<E> {
    /// A check failed; polling stops immediately.
    #[error(transparent)]
    Check(E),

    /// Every attempt came back pending.
    #[error(
        "still pending after {attempts} attempts ({:.1}s)",
        elapsed.as_secs_f64()
    )]
    Exhausted {
        /// Number of checks performed.
        attempts: u32,
        /// Time spent polling.
        elapsed: Duration,
    },

    /// The cancellation token fired.
    #[error(
        "cancelled after {attempts} attempts ({:.1}s)",
        elapsed.as_secs_f64()
    )]
    Cancelled {
        /// Number of checks started before cancellation.
        attempts: u32,
        /// Time spent polling.
        elapsed: Duration,
    },
}

/// Run `check` until it reports [`PollStep::Ready`], fails, runs out of
/// attempts or `cancel` fires.
///
/// `check` receives the 1-based attempt number. There is no sleep before the
/// first check nor after the last one. Cancellation interrupts both the sleep
/// and an in-flight check.
///
/// ```rust
/// use esim_gateway::{PollPolicy, PollStep, poll_until};
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let policy = PollPolicy::new(5, Duration::from_millis(1));
/// let polled = poll_until(policy, &CancellationToken::new(), |attempt| async move {
///     Ok::<_, std::convert::Infallible>(if attempt == 3 {
///         PollStep::Ready("done")
///     } else {
///         PollStep::Pending
///     })
/// })
/// .await
/// .unwrap();
///
/// assert_eq!(polled.value, "done");
/// assert_eq!(polled.attempts, 3);
/// # }
/// ```
pub async fn poll_until<T, E, F, Fut>(
    policy: PollPolicy,
    cancel: &CancellationToken,
    mut check: F,
) -> Result<Polled<T>, PollError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<PollStep<T>, E>>,
{
    let start = Instant::now();
    let mut attempts = 0;

    while attempts < policy.max_attempts {
        if attempts > 0 {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(PollError::Cancelled { attempts, elapsed: start.elapsed() });
                }
                _ = tokio::time::sleep(policy.interval) => {}
            }
        }

        if cancel.is_cancelled() {
            return Err(PollError::Cancelled {
                attempts,
                elapsed: start.elapsed(),
            });
        }

        attempts += 1;
        let step = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(PollError::Cancelled { attempts, elapsed: start.elapsed() });
            }
            step = check(attempts) => step,
        };

        match step.map_err(PollError::Check)? {
            PollStep::Ready(value) => {
                return Ok(Polled {
                    value,
                    attempts,
                    elapsed: start.elapsed(),
                });
            }
            PollStep::Pending => {}
        }
    }

    Err(PollError::Exhausted {
        attempts,
        elapsed: start.elapsed(),
    })
}

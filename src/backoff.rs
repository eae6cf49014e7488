//! Retry a fallible async operation through a fixed, saturating backoff
//! schedule, cancellable mid-sleep via a `tokio::sync::watch` flag.

use std::time::Duration;

use tokio::sync::watch;

use crate::constants::BACKOFF_SCHEDULE;

/// Drives retries of a fallible operation through [`BACKOFF_SCHEDULE`],
/// saturating at the last entry and observing cancellation between sleeps.
#[derive(Debug, Clone)]
pub struct Backoff {
    cancel: watch::Receiver<bool>,
}

/// Outcome of [`Backoff::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation succeeded.
    Succeeded,
    /// Cancellation was observed before the operation succeeded.
    Cancelled,
}

impl Backoff {
    /// Construct a driver that observes `cancel` between sleeps. When the
    /// watched value becomes `true`, any in-flight wait aborts within one
    /// schedule tick without retrying.
    pub fn new(cancel: watch::Receiver<bool>) -> Self {
        Self { cancel }
    }

    /// The delay for the `k`-th consecutive failure (0-indexed), saturating
    /// at the schedule's last entry.
    pub fn delay_for_attempt(attempt: usize) -> Duration {
        let idx = attempt.min(BACKOFF_SCHEDULE.len() - 1);
        BACKOFF_SCHEDULE[idx]
    }

    /// Invoke `op` repeatedly until it returns `Ok`, sleeping the schedule's
    /// delay between attempts. Returns [`Outcome::Cancelled`] if the
    /// cancellation signal fires during a sleep; otherwise runs until
    /// success (no bound on total elapsed time).
    pub async fn run<F, Fut, T, E>(&mut self, mut op: F) -> (Outcome, Option<T>)
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 0usize;
        loop {
            if *self.cancel.borrow() {
                return (Outcome::Cancelled, None);
            }
            match op().await {
                Ok(value) => return (Outcome::Succeeded, Some(value)),
                Err(e) => {
                    let delay = Self::delay_for_attempt(attempt);
                    tracing::warn!(attempt, ?delay, error = %e, "operation failed, backing off");
                    attempt += 1;

                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = self.cancel.changed() => {
                            if *self.cancel.borrow() {
                                return (Outcome::Cancelled, None);
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn schedule_saturates() {
        assert_eq!(Backoff::delay_for_attempt(0), Duration::from_secs(10));
        assert_eq!(Backoff::delay_for_attempt(1), Duration::from_secs(30));
        assert_eq!(Backoff::delay_for_attempt(2), Duration::from_secs(60));
        assert_eq!(Backoff::delay_for_attempt(3), Duration::from_secs(300));
        assert_eq!(Backoff::delay_for_attempt(4), Duration::from_secs(600));
        assert_eq!(Backoff::delay_for_attempt(5), Duration::from_secs(600));
        assert_eq!(Backoff::delay_for_attempt(100), Duration::from_secs(600));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_success_then_returns() {
        let (_tx, rx) = watch::channel(false);
        let mut backoff = Backoff::new(rx);
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts2 = attempts.clone();

        let (outcome, value) = backoff
            .run(move || {
                let attempts = attempts2.clone();
                async move {
                    let n = attempts.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err("transient")
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(outcome, Outcome::Succeeded);
        assert_eq!(value, Some(2));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_aborts_within_one_tick() {
        let (tx, rx) = watch::channel(false);
        let mut backoff = Backoff::new(rx);

        let handle = tokio::spawn(async move {
            backoff
                .run(|| async { Err::<(), _>("always fails") })
                .await
        });

        tokio::task::yield_now().await;
        tx.send(true).unwrap();

        let (outcome, value) = handle.await.unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(value, None);
    }
}

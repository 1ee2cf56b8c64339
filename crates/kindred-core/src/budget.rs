//! Cancellation and deadline checks for long-running searches

use crate::error::{Error, Result};
use crate::limits::BUDGET_CHECK_INTERVAL;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Caller-held handle that aborts searches sharing it
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Per-query budget checked at every frontier expansion
///
/// Owned by the single worker running the query.
#[derive(Debug)]
pub struct SearchBudget {
    token: Option<CancellationToken>,
    deadline: Option<Instant>,
    started: Instant,
    ticks: Cell<usize>,
}

impl SearchBudget {
    /// Budget that never expires
    pub fn unlimited() -> Self {
        Self {
            token: None,
            deadline: None,
            started: Instant::now(),
            ticks: Cell::new(0),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(self.started + timeout);
        self
    }

    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time left before the deadline, if one is set
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_cancellable(&self) -> bool {
        self.token.is_some()
    }

    /// Fail if the query was cancelled or ran past its deadline
    pub fn check(&self) -> Result<()> {
        if self.token.as_ref().is_some_and(CancellationToken::is_cancelled) {
            return Err(Error::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(Error::Timeout {
                    elapsed_ms: self.elapsed().as_millis() as u64,
                });
            }
        }
        Ok(())
    }

    /// Count one expanded individual, checking every few hundred
    pub fn tick(&self) -> Result<()> {
        let ticks = self.ticks.get() + 1;
        self.ticks.set(ticks);
        if ticks % BUDGET_CHECK_INTERVAL == 0 {
            self.check()
        } else {
            Ok(())
        }
    }
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self::unlimited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_token_fails_check() {
        let token = CancellationToken::new();
        let budget = SearchBudget::unlimited().with_token(token.clone());
        assert!(budget.check().is_ok());

        token.cancel();
        assert!(matches!(budget.check(), Err(Error::Cancelled)));
    }

    #[test]
    fn test_expired_deadline_times_out() {
        let budget = SearchBudget::unlimited().with_timeout(Duration::ZERO);
        assert!(matches!(budget.check(), Err(Error::Timeout { .. })));
    }

    #[test]
    fn test_remaining_time() {
        assert!(SearchBudget::unlimited().remaining().is_none());

        let budget = SearchBudget::unlimited().with_timeout(Duration::from_secs(60));
        let left = budget.remaining().unwrap();
        assert!(left > Duration::from_secs(59) && left <= Duration::from_secs(60));
        assert_eq!(
            SearchBudget::unlimited().with_timeout(Duration::ZERO).remaining(),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn test_tick_checks_periodically() {
        let token = CancellationToken::new();
        token.cancel();
        let budget = SearchBudget::unlimited().with_token(token);

        for _ in 1..BUDGET_CHECK_INTERVAL {
            assert!(budget.tick().is_ok());
        }
        assert!(budget.tick().is_err());
    }
}

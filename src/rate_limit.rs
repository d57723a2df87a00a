use std::time::{Duration, Instant};

use dashmap::DashMap;

const MAX_FAILURES: u32 = 5;
const WINDOW: Duration = Duration::from_secs(15 * 60);

struct FailureWindow {
    count: u32,
    started: Instant,
}

/// Per-email login brute-force limiter: 5 failures per 15-minute window.
/// Only failed attempts count; a successful login does not consume budget.
pub struct LoginRateLimiter {
    entries: DashMap<String, FailureWindow>,
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Check if a login attempt for this email is allowed. Returns the
    /// retry-after in seconds when blocked. Does not increment the counter;
    /// call `record_failure` after a failed verification.
    pub fn check(&self, email: &str) -> Result<(), u64> {
        let Some(entry) = self.entries.get(email) else {
            return Ok(());
        };

        let elapsed = entry.started.elapsed();
        if elapsed > WINDOW {
            return Ok(());
        }

        if entry.count >= MAX_FAILURES {
            return Err(WINDOW.as_secs().saturating_sub(elapsed.as_secs()));
        }

        Ok(())
    }

    pub fn record_failure(&self, email: &str) {
        let mut entry = self.entries.entry(email.to_string()).or_insert(FailureWindow {
            count: 0,
            started: Instant::now(),
        });

        if entry.started.elapsed() > WINDOW {
            entry.count = 1;
            entry.started = Instant::now();
        } else {
            entry.count += 1;
        }
    }

    /// Remove entries whose window expired long ago.
    pub fn cleanup(&self, max_age: Duration) {
        self.entries
            .retain(|_, w| w.started.elapsed() < max_age);
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_until_failure_budget_exhausted() {
        let limiter = LoginRateLimiter::new();
        for _ in 0..MAX_FAILURES {
            assert!(limiter.check("a@b.c").is_ok());
            limiter.record_failure("a@b.c");
        }
        assert!(limiter.check("a@b.c").is_err());
    }

    #[test]
    fn failures_are_scoped_per_email() {
        let limiter = LoginRateLimiter::new();
        for _ in 0..MAX_FAILURES {
            limiter.record_failure("a@b.c");
        }
        assert!(limiter.check("other@b.c").is_ok());
    }
}

//! Sliding-window rate limiting with escalating lockout.
//!
//! Tracks login attempts per `(action, client address, identity)` key. A key
//! that exhausts its window budget gets a hard lockout for a fixed cooldown;
//! the lock is never cleared early, not even by a subsequent correct
//! password. All state is process-local and resets on restart.

use dashmap::DashMap;
use std::time::{Duration, Instant};

use crate::config::AuthConfig;

/// Process-scoped attempt/lock state. One instance lives in the gateway
/// state; components receive it by reference, never through a global.
pub struct AttemptTracker {
    /// Attempt timestamps per key, pruned to the trailing window on check
    attempts: DashMap<String, Vec<Instant>>,
    /// Lock expiry per key
    locks: DashMap<String, Instant>,
    window: Duration,
    max_attempts: usize,
    lockout: Duration,
}

impl AttemptTracker {
    pub fn new(window_secs: u64, max_attempts: usize, lockout_secs: u64) -> Self {
        Self {
            attempts: DashMap::new(),
            locks: DashMap::new(),
            window: Duration::from_secs(window_secs),
            max_attempts,
            lockout: Duration::from_secs(lockout_secs),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.rate_limit_window_secs,
            config.rate_limit_max_attempts,
            config.lockout_secs,
        )
    }

    /// Compose the throttle key for an attempt.
    pub fn attempt_key(action: &str, client_addr: &str, identity: &str) -> String {
        format!("{}:{}:{}", action, client_addr, identity)
    }

    /// Check the sliding window for `key` and record this attempt if it is
    /// within budget. Returns `false` when the budget is exhausted; the
    /// failing attempt is NOT recorded, so it does not count toward a later
    /// window.
    pub fn check_rate(&self, key: &str) -> bool {
        self.check_rate_at(key, Instant::now())
    }

    /// Explicit-clock variant of [`check_rate`](Self::check_rate) for
    /// deterministic tests.
    ///
    /// Prune, check and append all happen under the per-key entry guard, so
    /// two concurrent requests sharing a key cannot both pass when only one
    /// slot remains.
    pub fn check_rate_at(&self, key: &str, now: Instant) -> bool {
        let mut entry = self.attempts.entry(key.to_string()).or_default();
        entry.retain(|&t| now.duration_since(t) < self.window);
        if entry.len() >= self.max_attempts {
            return false;
        }
        entry.push(now);
        true
    }

    /// Lock `key` for the configured cooldown, overwriting any existing lock.
    pub fn lock(&self, key: &str) {
        self.lock_at(key, Instant::now());
    }

    /// Explicit-clock variant of [`lock`](Self::lock).
    pub fn lock_at(&self, key: &str, now: Instant) {
        self.locks.insert(key.to_string(), now + self.lockout);
    }

    /// Whether `key` is currently locked. An expired lock is removed here,
    /// on first check past its expiry; there is no background sweep.
    pub fn is_locked(&self, key: &str) -> bool {
        self.is_locked_at(key, Instant::now())
    }

    /// Explicit-clock variant of [`is_locked`](Self::is_locked).
    pub fn is_locked_at(&self, key: &str, now: Instant) -> bool {
        let expired = match self.locks.get(key) {
            None => return false,
            Some(expiry) => now >= *expiry,
        };
        if expired {
            self.locks.remove(key);
            return false;
        }
        true
    }

    /// Number of keys with recorded attempts.
    pub fn tracked_keys(&self) -> usize {
        self.attempts.len()
    }

    /// Number of keys with a lock entry (expired entries included until
    /// their next check).
    pub fn locked_keys(&self) -> usize {
        self.locks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn tracker(max: usize) -> AttemptTracker {
        AttemptTracker::new(60, max, 300)
    }

    #[test]
    fn test_allows_under_limit() {
        let t = tracker(5);
        let now = Instant::now();
        for _ in 0..5 {
            assert!(t.check_rate_at("login:1.2.3.4:a@b.c", now));
        }
    }

    #[test]
    fn test_blocks_over_limit_without_recording() {
        let t = tracker(3);
        let now = Instant::now();
        let key = "login:1.2.3.4:a@b.c";
        assert!(t.check_rate_at(key, now));
        assert!(t.check_rate_at(key, now));
        assert!(t.check_rate_at(key, now));
        assert!(!t.check_rate_at(key, now));

        // The rejected attempt did not consume a slot: once one recorded
        // timestamp ages out, exactly one new attempt fits again.
        let later = now + Duration::from_secs(61);
        assert!(t.check_rate_at(key, later));
    }

    #[test]
    fn test_window_slides() {
        let t = tracker(2);
        let now = Instant::now();
        let key = "login:1.2.3.4:a@b.c";
        assert!(t.check_rate_at(key, now));
        assert!(t.check_rate_at(key, now));
        assert!(!t.check_rate_at(key, now + Duration::from_secs(30)));
        // Past the window both old attempts are pruned
        assert!(t.check_rate_at(key, now + Duration::from_secs(61)));
    }

    #[test]
    fn test_keys_are_independent() {
        let t = tracker(1);
        let now = Instant::now();
        assert!(t.check_rate_at("login:1.2.3.4:a@b.c", now));
        assert!(!t.check_rate_at("login:1.2.3.4:a@b.c", now));
        assert!(t.check_rate_at("login:5.6.7.8:a@b.c", now));
        assert!(t.check_rate_at("login:1.2.3.4:other@b.c", now));
    }

    #[test]
    fn test_lock_until_expiry() {
        let t = tracker(15);
        let now = Instant::now();
        let key = "login:1.2.3.4:a@b.c";
        assert!(!t.is_locked_at(key, now));

        t.lock_at(key, now);
        assert!(t.is_locked_at(key, now));
        assert!(t.is_locked_at(key, now + Duration::from_secs(299)));
        // Past expiry the entry is lazily removed
        assert!(!t.is_locked_at(key, now + Duration::from_secs(301)));
        assert_eq!(t.locked_keys(), 0);
    }

    #[test]
    fn test_relock_overwrites_expiry() {
        let t = tracker(15);
        let now = Instant::now();
        let key = "login:1.2.3.4:a@b.c";
        t.lock_at(key, now);
        t.lock_at(key, now + Duration::from_secs(200));
        // Expiry extended by the second lock
        assert!(t.is_locked_at(key, now + Duration::from_secs(400)));
        assert!(!t.is_locked_at(key, now + Duration::from_secs(501)));
    }

    #[test]
    fn test_attempt_key_format() {
        assert_eq!(
            AttemptTracker::attempt_key("login", "1.2.3.4", "a@b.c"),
            "login:1.2.3.4:a@b.c"
        );
    }

    #[test]
    fn test_concurrent_checks_respect_budget() {
        let t = Arc::new(tracker(10));
        let key = "login:1.2.3.4:a@b.c";

        let mut handles = vec![];
        for _ in 0..32 {
            let t = Arc::clone(&t);
            handles.push(thread::spawn(move || {
                u32::from(t.check_rate("login:1.2.3.4:a@b.c"))
            }));
        }

        let passed: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        // Exactly the budget passes, no double-count race
        assert_eq!(passed, 10);
        assert!(!t.check_rate(key));
    }
}

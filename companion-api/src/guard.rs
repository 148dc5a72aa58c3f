//! Stale-fetch guard.
//!
//! The app refetches after every mutation and on every tab switch; two
//! overlapping fetches can finish out of order, and a late response must not
//! clobber the newer one. Each fetch takes a generation token before the
//! request goes out; the response is applied only if the token is still
//! current when it lands.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct FetchGuard {
    generation: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchToken(u64);

impl FetchGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch, invalidating every token issued before.
    pub fn begin(&self) -> FetchToken {
        FetchToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Should a response carrying `token` still be applied?
    pub fn is_current(&self, token: FetchToken) -> bool {
        self.generation.load(Ordering::SeqCst) == token.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_token_wins() {
        let guard = FetchGuard::new();
        let first = guard.begin();
        let second = guard.begin();
        assert!(!guard.is_current(first));
        assert!(guard.is_current(second));
    }

    #[test]
    fn token_survives_until_the_next_fetch() {
        let guard = FetchGuard::new();
        let t = guard.begin();
        assert!(guard.is_current(t));
        assert!(guard.is_current(t));
        guard.begin();
        assert!(!guard.is_current(t));
    }
}

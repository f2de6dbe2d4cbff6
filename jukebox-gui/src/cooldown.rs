use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Per-actor rate limiter.
///
/// Timestamps come from the tokio clock, so paused test time drives it too.
pub struct CooldownTracker<K> {
    cooldown: Duration,
    last_triggered: Mutex<HashMap<K, Instant>>,
}

impl<K: Eq + Hash> CooldownTracker<K> {
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_triggered: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Records a trigger for `actor` and returns `true` if its last one is at
    /// least a cooldown old. Otherwise nothing changes and `false` is returned.
    pub fn test(&self, actor: K) -> bool {
        let now = Instant::now();
        let mut last_triggered = self.last_triggered.lock();
        match last_triggered.get(&actor) {
            Some(last) if now.duration_since(*last) < self.cooldown => false,
            _ => {
                last_triggered.insert(actor, now);
                true
            }
        }
    }

    /// How long `actor` still has to wait. Zero if it may act right away.
    #[must_use]
    pub fn remaining_wait(&self, actor: &K) -> Duration {
        self.last_triggered
            .lock()
            .get(actor)
            .map_or(Duration::ZERO, |last| {
                self.cooldown.saturating_sub(last.elapsed())
            })
    }

    /// Forgets every actor.
    pub fn unregister(&self) {
        self.last_triggered.lock().clear();
    }

    #[must_use]
    pub fn tracked(&self) -> usize {
        self.last_triggered.lock().len()
    }
}

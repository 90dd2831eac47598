use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Deferred auto-archive scheduler.
///
/// When a toggle completes the last open item of a group, the caller arms a
/// deadline here instead of archiving immediately; the delay is the user's
/// confirmation window. Re-opening an item before the deadline fires cancels
/// the pending archive. The scheduler only tracks deadlines; the actual
/// status mutation happens through `Store::archive_group` when the driving
/// loop drains `due()`.
pub struct AutoArchiver {
    delay: Duration,
    pending: HashMap<String, Instant>,
}

impl AutoArchiver {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: HashMap::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm (or re-arm) the archive deadline for a group.
    pub fn schedule(&mut self, group_id: &str) {
        self.pending
            .insert(group_id.to_string(), Instant::now() + self.delay);
    }

    /// Disarm a pending archive, if any.
    pub fn cancel(&mut self, group_id: &str) {
        self.pending.remove(group_id);
    }

    pub fn is_pending(&self, group_id: &str) -> bool {
        self.pending.contains_key(group_id)
    }

    /// Drain and return the ids whose deadline has passed as of `now`.
    pub fn due(&mut self, now: Instant) -> Vec<String> {
        let expired: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            self.pending.remove(id);
        }
        expired
    }
}

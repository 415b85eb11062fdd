use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerPurpose {
    SubscribeRetry,
    SyncHeartbeat,
}

/// A timer that came due, addressed to the widget that scheduled it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expired {
    pub handle: TimerHandle,
    pub owner: String,
    pub purpose: TimerPurpose,
}

#[derive(Debug, Clone)]
struct Entry {
    handle: TimerHandle,
    owner: String,
    purpose: TimerPurpose,
    due: Duration,
}

/// Deterministic one-shot timers on the screen's logical clock.
///
/// The clock only moves when the host calls `pop_due`/`advance_to`, so every
/// timer fires on the event loop and never concurrently with widget code.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_handle: u64,
    pending: Vec<Entry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, owner: &str, purpose: TimerPurpose, after: Duration) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.pending.push(Entry {
            handle,
            owner: owner.to_string(),
            purpose,
            due: self.now + after,
        });
        handle
    }

    /// Returns false when the timer already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|e| e.handle != handle);
        self.pending.len() != before
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|e| e.handle == handle)
    }

    pub fn pending_for(&self, owner: &str) -> usize {
        self.pending.iter().filter(|e| e.owner == owner).count()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.pending.iter().map(|e| e.due).min()
    }

    /// Removes and returns the earliest timer due at or before `until`,
    /// moving the clock to its due time. Timers scheduled while handling it
    /// are measured from that instant.
    pub fn pop_due(&mut self, until: Duration) -> Option<Expired> {
        let position = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= until)
            .min_by_key(|(_, e)| (e.due, e.handle))
            .map(|(i, _)| i)?;
        let entry = self.pending.remove(position);
        self.now = self.now.max(entry.due);
        Some(Expired {
            handle: entry.handle,
            owner: entry.owner,
            purpose: entry.purpose,
        })
    }

    pub fn advance_to(&mut self, instant: Duration) {
        self.now = self.now.max(instant);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_due_order_and_moves_the_clock() {
        let mut timers = TimerQueue::new();
        let late = timers.schedule("w1", TimerPurpose::SubscribeRetry, Duration::from_secs(7));
        let early = timers.schedule("w2", TimerPurpose::SyncHeartbeat, Duration::from_secs(2));

        let until = Duration::from_secs(10);
        assert_eq!(timers.pop_due(until).map(|e| e.handle), Some(early));
        assert_eq!(timers.now(), Duration::from_secs(2));
        assert_eq!(timers.pop_due(until).map(|e| e.handle), Some(late));
        assert_eq!(timers.pop_due(until), None);
        timers.advance_to(until);
        assert_eq!(timers.now(), until);
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut timers = TimerQueue::new();
        let handle = timers.schedule("w1", TimerPurpose::SubscribeRetry, Duration::from_secs(1));
        assert!(timers.cancel(handle));
        assert!(!timers.cancel(handle));
        assert_eq!(timers.pop_due(Duration::from_secs(5)), None);
    }
}

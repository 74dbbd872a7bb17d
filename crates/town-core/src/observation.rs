//! Shared Observation Log
//!
//! A time-windowed, append-only list of world observations that every agent
//! perceives. Growth is tracked per tick so that only the last `W` ticks of
//! observations survive.

use std::collections::VecDeque;

/// Append-only observation list with tick-based retention.
#[derive(Debug, Clone)]
pub struct ObservationLog {
    /// Observations, oldest first
    entries: Vec<String>,
    /// Observations appended during each of the last `window` committed ticks
    tick_sizes: VecDeque<usize>,
    /// Appends since the last commit
    pending: usize,
    /// Leading observations not attributed to any tick (initial statuses)
    untracked: usize,
    /// Retention window, in ticks
    window: usize,
}

impl ObservationLog {
    /// Creates an empty log keeping `window` ticks of history.
    ///
    /// A window of zero is clamped to one.
    pub fn new(window: usize) -> Self {
        Self {
            entries: Vec::new(),
            tick_sizes: VecDeque::with_capacity(window.max(1) + 1),
            pending: 0,
            untracked: 0,
            window: window.max(1),
        }
    }

    /// Records an observation made before the first tick.
    ///
    /// Seeds are evicted together with the oldest tracked tick.
    pub fn seed(&mut self, observation: impl Into<String>) {
        debug_assert!(
            self.tick_sizes.is_empty() && self.pending == 0,
            "seeding after ticks started"
        );
        self.entries.push(observation.into());
        self.untracked += 1;
    }

    /// Appends an observation to the current tick.
    pub fn append(&mut self, observation: impl Into<String>) {
        self.entries.push(observation.into());
        self.pending += 1;
    }

    /// Closes the current tick and applies retention.
    ///
    /// Returns how many observations were evicted.
    pub fn commit_tick(&mut self) -> usize {
        self.tick_sizes.push_back(self.pending);
        self.pending = 0;

        if self.tick_sizes.len() <= self.window {
            return 0;
        }

        let oldest = self.tick_sizes.pop_front().unwrap_or(0);
        let evicted = (self.untracked + oldest).min(self.entries.len());
        self.entries.drain(..evicted);
        self.untracked = 0;
        evicted
    }

    /// All retained observations, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// The most recent `count` observations.
    pub fn recent(&self, count: usize) -> &[String] {
        let start = self.entries.len().saturating_sub(count);
        &self.entries[start..]
    }

    /// Per-tick growth for the committed ticks still in the window.
    pub fn tick_sizes(&self) -> impl ExactSizeIterator<Item = usize> + '_ {
        self.tick_sizes.iter().copied()
    }

    /// Appends made since the last commit.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Number of initial observations still retained.
    pub fn untracked(&self) -> usize {
        self.untracked
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(log: &mut ObservationLog, count: usize, label: &str) -> usize {
        for i in 0..count {
            log.append(format!("{}-{}", label, i));
        }
        log.commit_tick()
    }

    #[test]
    fn test_empty_tick_occupies_a_slot() {
        let mut log = ObservationLog::new(3);
        log.seed("Alice is baking");
        log.seed("Bob is fishing");

        assert_eq!(log.commit_tick(), 0);
        assert_eq!(log.tick_sizes().collect::<Vec<_>>(), vec![0]);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_eviction_drops_oldest_tick() {
        let mut log = ObservationLog::new(2);

        assert_eq!(tick(&mut log, 3, "t1"), 0);
        assert_eq!(tick(&mut log, 2, "t2"), 0);
        assert_eq!(tick(&mut log, 1, "t3"), 3);

        assert_eq!(log.tick_sizes().collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(log.entries(), &["t2-0", "t2-1", "t3-0"]);
    }

    #[test]
    fn test_seeds_leave_with_first_eviction() {
        let mut log = ObservationLog::new(1);
        log.seed("Alice is baking");

        assert_eq!(tick(&mut log, 2, "t1"), 0);
        assert_eq!(log.len(), 3);

        // Seeds plus the first tick go together
        assert_eq!(tick(&mut log, 1, "t2"), 3);
        assert_eq!(log.entries(), &["t2-0"]);
        assert_eq!(log.untracked(), 0);
    }

    #[test]
    fn test_window_invariant_holds_over_many_ticks() {
        let mut log = ObservationLog::new(4);
        log.seed("a");
        log.seed("b");

        for n in 0..40usize {
            tick(&mut log, (n * 7) % 5, "x");
            assert!(log.tick_sizes().len() <= log.window());
            let tracked: usize = log.tick_sizes().sum();
            assert_eq!(log.len(), tracked + log.untracked());
        }
        assert_eq!(log.untracked(), 0);
    }

    #[test]
    fn test_zero_window_is_clamped() {
        let log = ObservationLog::new(0);
        assert_eq!(log.window(), 1);
    }

    #[test]
    fn test_recent() {
        let mut log = ObservationLog::new(2);
        log.append("one");
        log.append("two");
        log.append("three");
        assert_eq!(log.recent(2), &["two", "three"]);
        assert_eq!(log.recent(10).len(), 3);
        assert_eq!(log.pending(), 3);
    }
}

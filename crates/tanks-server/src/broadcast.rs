//! Priority broadcast categories, grounded on the teacher's `Timer`/
//! `TimerConfig` (`crates/gameroom/src/timer.rs`): deadline-tracking structs
//! generalized from a single decision deadline to the four per-category
//! cadences of spec.md §4.1/§12 decision #4 (60/30/10/1 Hz).

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// The simulation tick itself; driven by `TickScheduler`, not this type,
    /// listed here only so the category table is complete.
    Tick,
    /// Reserved for urgent per-socket unicast (e.g. immediate damage
    /// feedback) — spec.md §12 decision #4 notes the original left this
    /// category unwired; tracked here but nothing currently publishes to it.
    Fast,
    /// The `gameState`/`playerState` broadcast cadence.
    Broadcast,
    /// Slow periodic pushes (e.g. `balanceSettings` resync).
    Slow,
}

#[derive(Debug, Clone, Copy)]
pub struct PriorityConfig {
    pub fast: Duration,
    pub broadcast: Duration,
    pub slow: Duration,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            fast: Duration::from_millis(1000 / 30),
            broadcast: Duration::from_millis(100),
            slow: Duration::from_secs(1),
        }
    }
}

/// Tracks one deadline per non-tick category, advancing it each time `due`
/// reports it has elapsed — the same "`deadline: Option<Instant>`, checked
/// then reset" shape as the teacher's `Timer`, with three instances instead
/// of one.
pub struct PriorityScheduler {
    config: PriorityConfig,
    fast_deadline: Instant,
    broadcast_deadline: Instant,
    slow_deadline: Instant,
}

impl PriorityScheduler {
    pub fn new() -> Self {
        let now = Instant::now();
        let config = PriorityConfig::default();
        Self {
            fast_deadline: now + config.fast,
            broadcast_deadline: now + config.broadcast,
            slow_deadline: now + config.slow,
        }
    }

    /// Returns whether `category`'s deadline has passed; if so, advances it
    /// to the next period from now (not from the missed deadline, avoiding a
    /// burst of catch-up fires after a stall).
    pub fn due(&mut self, category: Category) -> bool {
        let now = Instant::now();
        let (deadline, period) = match category {
            Category::Tick => return false,
            Category::Fast => (&mut self.fast_deadline, self.config.fast),
            Category::Broadcast => (&mut self.broadcast_deadline, self.config.broadcast),
            Category::Slow => (&mut self.slow_deadline, self.config.slow),
        };
        if now >= *deadline {
            *deadline = now + period;
            true
        } else {
            false
        }
    }
}

impl Default for PriorityScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_not_due_immediately_after_construction() {
        let mut scheduler = PriorityScheduler::new();
        assert!(!scheduler.due(Category::Broadcast));
    }

    #[test]
    fn tick_category_is_never_due_here() {
        let mut scheduler = PriorityScheduler::new();
        assert!(!scheduler.due(Category::Tick));
    }
}

//! Whole-second game clock with deferred, cancellable start

use tracing::debug;

/// Identifies one scheduled start; only the most recent ticket can activate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartTicket(u64);

/// Phase of the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    /// Not counting and nothing scheduled
    #[default]
    Stopped,
    /// A start has been scheduled but not yet fired
    Pending,
    /// Counting (unless paused)
    Running,
}

/// The round clock
#[derive(Debug, Default)]
pub struct GameTimer {
    elapsed_secs: u64,
    phase: Phase,
    paused: bool,
    generation: u64,
}

impl GameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whole seconds counted this round
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Whether the clock has started (paused or not)
    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Whether a deferred start is outstanding
    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.phase == Phase::Pending
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Reset to zero and schedule a start
    ///
    /// Any earlier ticket, and any running count, is cancelled. The caller
    /// is responsible for delivering the ticket back via [`activate`] once
    /// the countdown has elapsed.
    ///
    /// [`activate`]: GameTimer::activate
    pub fn schedule_start(&mut self) -> StartTicket {
        self.generation += 1;
        self.elapsed_secs = 0;
        self.phase = Phase::Pending;
        self.paused = false;
        debug!(generation = self.generation, "timer start scheduled");
        StartTicket(self.generation)
    }

    /// Start counting if `ticket` is still the current schedule
    ///
    /// Returns `false` for superseded or cancelled tickets.
    pub fn activate(&mut self, ticket: StartTicket) -> bool {
        if self.phase != Phase::Pending || ticket.0 != self.generation {
            debug!(ticket = ticket.0, current = self.generation, "stale timer ticket ignored");
            return false;
        }
        self.phase = Phase::Running;
        true
    }

    /// Count one second; returns the new elapsed value if it advanced
    pub fn tick(&mut self) -> Option<u64> {
        if self.phase != Phase::Running || self.paused {
            return None;
        }
        self.elapsed_secs += 1;
        Some(self.elapsed_secs)
    }

    /// Stop counting without losing the elapsed value
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Continue counting from the same elapsed value
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Stop the clock and cancel any pending start
    pub fn stop(&mut self) {
        self.generation += 1;
        self.phase = Phase::Stopped;
        self.paused = false;
    }

    /// Stop the clock and zero the count
    pub fn reset(&mut self) {
        self.stop();
        self.elapsed_secs = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> GameTimer {
        let mut timer = GameTimer::new();
        let ticket = timer.schedule_start();
        assert!(timer.activate(ticket));
        timer
    }

    #[test]
    fn test_no_counting_before_activation() {
        let mut timer = GameTimer::new();
        timer.schedule_start();
        assert!(timer.is_pending());
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.elapsed_secs(), 0);
    }

    #[test]
    fn test_counts_after_delayed_start() {
        let mut timer = started();
        for _ in 0..5 {
            timer.tick();
        }
        assert_eq!(timer.elapsed_secs(), 5);
    }

    #[test]
    fn test_pause_resume_keeps_count() {
        let mut timer = started();
        for _ in 0..5 {
            timer.tick();
        }
        timer.pause();
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.elapsed_secs(), 5);
        timer.resume();
        assert_eq!(timer.tick(), Some(6));
    }

    #[test]
    fn test_new_schedule_cancels_prior() {
        let mut timer = GameTimer::new();
        let first = timer.schedule_start();
        let second = timer.schedule_start();
        assert!(!timer.activate(first));
        assert!(timer.activate(second));
    }

    #[test]
    fn test_reschedule_resets_running_count() {
        let mut timer = started();
        timer.tick();
        timer.tick();
        let ticket = timer.schedule_start();
        assert_eq!(timer.elapsed_secs(), 0);
        assert!(!timer.is_running());
        assert!(timer.activate(ticket));
        assert_eq!(timer.tick(), Some(1));
    }

    #[test]
    fn test_stop_cancels_pending() {
        let mut timer = GameTimer::new();
        let ticket = timer.schedule_start();
        timer.stop();
        assert!(!timer.activate(ticket));
        assert!(!timer.is_running());
    }

    #[test]
    fn test_reset_zeroes() {
        let mut timer = started();
        timer.tick();
        timer.reset();
        assert_eq!(timer.elapsed_secs(), 0);
        assert_eq!(timer.tick(), None);
    }
}

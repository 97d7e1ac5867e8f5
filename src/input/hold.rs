//! Hold-to-confirm gestures
//!
//! A gesture fires once the face has stayed pushed to one side for the hold
//! duration. Holds are keyed by direction: returning to the dead zone or
//! swinging to the other side cancels the outstanding one. Only one hold can
//! be outstanding at a time, and after firing the detector stays quiet until
//! the face comes back inside the dead zone.

use std::time::{Duration, Instant};

use tracing::debug;

/// Side the face is pushed toward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldDirection {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoldState {
    Idle,
    Holding { direction: HoldDirection, since: Instant },
    /// Fired; waiting for the face to return to the dead zone
    Spent,
}

/// Tracks a single outstanding hold gesture
#[derive(Debug)]
pub struct HoldDetector {
    threshold: f32,
    duration: Duration,
    state: HoldState,
}

impl HoldDetector {
    pub fn new(threshold: f32, duration: Duration) -> Self {
        Self {
            threshold,
            duration,
            state: HoldState::Idle,
        }
    }

    /// Direction of the hold currently being timed, if any
    #[cfg(test)]
    pub fn pending(&self) -> Option<HoldDirection> {
        match self.state {
            HoldState::Holding { direction, .. } => Some(direction),
            _ => None,
        }
    }

    /// Feed the latest offset reading and check for expiry
    pub fn observe(&mut self, offset: f32, now: Instant) -> Option<HoldDirection> {
        let current = self.direction_of(offset);

        match (self.state, current) {
            (HoldState::Spent, None) => self.state = HoldState::Idle,
            (HoldState::Spent, Some(_)) => {}
            (HoldState::Idle, Some(direction)) => {
                debug!(?direction, "hold started");
                self.state = HoldState::Holding { direction, since: now };
            }
            (HoldState::Idle, None) => {}
            (HoldState::Holding { direction, .. }, Some(next)) if next != direction => {
                debug!(from = ?direction, to = ?next, "hold switched sides");
                self.state = HoldState::Holding { direction: next, since: now };
            }
            (HoldState::Holding { direction, .. }, None) => {
                debug!(?direction, "hold cancelled");
                self.state = HoldState::Idle;
            }
            (HoldState::Holding { .. }, Some(_)) => {}
        }

        self.poll(now)
    }

    /// Fire an outstanding hold whose deadline has passed
    ///
    /// Every reading goes through `observe`, which cancels or switches the
    /// hold as soon as the face leaves its side, so a hold still in
    /// `Holding` always matches the latest reading.
    pub fn poll(&mut self, now: Instant) -> Option<HoldDirection> {
        let HoldState::Holding { direction, since } = self.state else {
            return None;
        };
        if now.duration_since(since) < self.duration {
            return None;
        }
        debug!(?direction, "hold confirmed");
        self.state = HoldState::Spent;
        Some(direction)
    }

    /// Drop any outstanding hold and re-arm
    pub fn reset(&mut self) {
        self.state = HoldState::Idle;
    }

    fn direction_of(&self, offset: f32) -> Option<HoldDirection> {
        if offset > self.threshold {
            Some(HoldDirection::Right)
        } else if offset < -self.threshold {
            Some(HoldDirection::Left)
        } else {
            None
        }
    }
}

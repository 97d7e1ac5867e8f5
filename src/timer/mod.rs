//! Game clock module
//!
//! Counts whole seconds of play. Starting is deferred: the controller
//! schedules a start after the countdown and the clock only activates if
//! that schedule is still the current one.

mod game_timer;

pub use game_timer::{GameTimer, StartTicket};

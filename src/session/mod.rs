//! Session module
//!
//! An explicit state machine for the four screens:
//! - Intro: title screen
//! - ModeSelect: choose voice or face control
//! - TrackingInfo: input is live, instructions shown
//! - Game: Playing, Paused or AwardShown
//!
//! and the controller that serializes every mutation onto one queue.

mod controller;
mod machine;

pub use controller::{Command, Controller, UiAction};
pub use machine::{InputMode, SessionState};

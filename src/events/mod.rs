//! Events module for session observers
//!
//! Every visible change in the session is published as a [`SessionEvent`]
//! so a renderer can follow along without touching controller state.

use serde::{Deserialize, Serialize};

use crate::session::{InputMode, SessionState};

/// Events emitted by the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Session moved between states
    StateChanged {
        from: SessionState,
        to: SessionState,
        /// Screen number the new state renders on (1-4)
        screen: u8,
    },

    /// An input subsystem came up
    InputStarted { mode: InputMode },

    /// An input subsystem was torn down
    InputStopped { mode: InputMode },

    /// An input subsystem failed to start; the feature stays off
    InputFailed { mode: InputMode, reason: String },

    /// Countdown before the clock starts
    CountdownStarted { seconds: u64 },

    /// Countdown finished and the ball was served
    RoundStarted,

    /// Clock advanced by one second
    ClockTick { elapsed_secs: u64 },

    Paused { elapsed_secs: u64 },

    Resumed { elapsed_secs: u64 },

    /// Ball got past the paddle
    RoundLost {
        elapsed_secs: u64,
        /// Whether the round lasted long enough for the award
        award: bool,
    },

    /// Award screen shown with the final time
    AwardShown { elapsed_secs: u64 },

    /// Fresh round requested by a restart command or "Done"
    RoundRestarted {
        /// Clock value of the round being abandoned
        previous_secs: u64,
    },

    /// Recent recognized voice tokens, oldest first
    TranscriptUpdated { recent: Vec<String> },

    /// A noisy token was discarded and recognition started over
    RecognitionRestarted,

    /// Face center reference recalibrated
    Recentered { center: f32 },
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEvent::StateChanged { from, to, screen } => {
                write!(f, "STATE_CHANGED ({from} -> {to}, screen {screen})")
            }
            SessionEvent::InputStarted { mode } => write!(f, "INPUT_STARTED ({mode})"),
            SessionEvent::InputStopped { mode } => write!(f, "INPUT_STOPPED ({mode})"),
            SessionEvent::InputFailed { mode, reason } => {
                write!(f, "INPUT_FAILED ({mode}: {reason})")
            }
            SessionEvent::CountdownStarted { seconds } => {
                write!(f, "COUNTDOWN_STARTED ({seconds}s)")
            }
            SessionEvent::RoundStarted => write!(f, "ROUND_STARTED"),
            SessionEvent::ClockTick { elapsed_secs } => write!(f, "CLOCK_TICK ({elapsed_secs}s)"),
            SessionEvent::Paused { elapsed_secs } => write!(f, "PAUSED ({elapsed_secs}s)"),
            SessionEvent::Resumed { elapsed_secs } => write!(f, "RESUMED ({elapsed_secs}s)"),
            SessionEvent::RoundLost {
                elapsed_secs,
                award,
            } => write!(f, "ROUND_LOST ({elapsed_secs}s, award={award})"),
            SessionEvent::AwardShown { elapsed_secs } => {
                write!(f, "AWARD_SHOWN ({elapsed_secs}s)")
            }
            SessionEvent::RoundRestarted { previous_secs } => {
                write!(f, "ROUND_RESTARTED (after {previous_secs}s)")
            }
            SessionEvent::TranscriptUpdated { recent } => {
                write!(f, "TRANSCRIPT_UPDATED ({})", recent.join(" "))
            }
            SessionEvent::RecognitionRestarted => write!(f, "RECOGNITION_RESTARTED"),
            SessionEvent::Recentered { center } => write!(f, "RECENTERED ({center:.3})"),
        }
    }
}

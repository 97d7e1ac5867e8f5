//! Session state machine
//!
//! Handles navigation between the intro, mode select, tracking info and game
//! screens, plus pause, award and restart on the game screen. Transitions
//! return the side effect the controller must carry out.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::events::SessionEvent;

/// Where the session is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Title screen
    #[default]
    Intro,
    /// Choosing between voice and face control
    ModeSelect,
    /// Instructions for the chosen input; input is live
    TrackingInfo,
    /// Round in progress (or counting down)
    Playing,
    /// Round frozen by a pause command
    Paused,
    /// Round ended after surviving long enough
    AwardShown,
}

impl SessionState {
    /// Screen this state renders on
    pub fn screen(self) -> u8 {
        match self {
            SessionState::Intro => 1,
            SessionState::ModeSelect => 2,
            SessionState::TrackingInfo => 3,
            SessionState::Playing | SessionState::Paused | SessionState::AwardShown => 4,
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Intro => write!(f, "Intro"),
            SessionState::ModeSelect => write!(f, "ModeSelect"),
            SessionState::TrackingInfo => write!(f, "TrackingInfo"),
            SessionState::Playing => write!(f, "Playing"),
            SessionState::Paused => write!(f, "Paused"),
            SessionState::AwardShown => write!(f, "AwardShown"),
        }
    }
}

/// How the paddle is steered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    Voice,
    Face,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputMode::Voice => write!(f, "voice"),
            InputMode::Face => write!(f, "face"),
        }
    }
}

/// Work the controller performs after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Bring up the recognizer for this mode
    StartInput(InputMode),
    /// Tear down the recognizer for this mode
    StopInput(InputMode),
    /// Reset the ball and clock, then count down to a new round
    BeginRound,
    /// Stop the clock and put the ball away
    StopRound,
    /// Freeze the clock and physics
    PauseRound,
    /// Unfreeze the clock and physics
    ResumeRound,
    /// Freeze the clock and physics, keeping the time for display
    ShowAward,
}

/// Rejected transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("{action} is not available in {state}")]
    NotAllowed {
        action: &'static str,
        state: SessionState,
    },

    #[error("no input mode selected")]
    NoModeSelected,
}

/// The session state machine
pub struct SessionMachine {
    state: SessionState,
    mode: Option<InputMode>,
    /// Time the current state was entered
    state_entered_at: Instant,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionMachine {
    pub fn new(event_tx: broadcast::Sender<SessionEvent>) -> Self {
        Self {
            state: SessionState::Intro,
            mode: None,
            state_entered_at: Instant::now(),
            event_tx,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Input mode chosen on the mode select screen
    pub fn mode(&self) -> Option<InputMode> {
        self.mode
    }

    /// Choose the input mode; only possible on the mode select screen
    pub fn select_mode(&mut self, mode: InputMode) -> Result<(), TransitionError> {
        if self.state != SessionState::ModeSelect {
            return Err(self.not_allowed("select mode"));
        }
        info!(%mode, "input mode selected");
        self.mode = Some(mode);
        Ok(())
    }

    /// Forward navigation
    pub fn next(&mut self) -> Result<Option<Effect>, TransitionError> {
        match self.state {
            SessionState::Intro => {
                self.transition_to(SessionState::ModeSelect);
                Ok(None)
            }
            SessionState::ModeSelect => {
                let mode = self.mode.ok_or(TransitionError::NoModeSelected)?;
                self.transition_to(SessionState::TrackingInfo);
                Ok(Some(Effect::StartInput(mode)))
            }
            SessionState::TrackingInfo => {
                self.transition_to(SessionState::Playing);
                Ok(Some(Effect::BeginRound))
            }
            _ => Err(self.not_allowed("next")),
        }
    }

    /// Backward navigation
    pub fn back(&mut self) -> Result<Option<Effect>, TransitionError> {
        match self.state {
            SessionState::Intro => Ok(None),
            SessionState::ModeSelect => {
                self.transition_to(SessionState::Intro);
                Ok(None)
            }
            SessionState::TrackingInfo => {
                self.transition_to(SessionState::ModeSelect);
                Ok(self.mode.map(Effect::StopInput))
            }
            SessionState::Playing | SessionState::Paused | SessionState::AwardShown => {
                self.transition_to(SessionState::TrackingInfo);
                Ok(Some(Effect::StopRound))
            }
        }
    }

    pub fn pause(&mut self) -> Result<Option<Effect>, TransitionError> {
        if self.state != SessionState::Playing {
            return Err(self.not_allowed("pause"));
        }
        self.transition_to(SessionState::Paused);
        Ok(Some(Effect::PauseRound))
    }

    pub fn resume(&mut self) -> Result<Option<Effect>, TransitionError> {
        if self.state != SessionState::Paused {
            return Err(self.not_allowed("resume"));
        }
        self.transition_to(SessionState::Playing);
        Ok(Some(Effect::ResumeRound))
    }

    /// Start a fresh round from anywhere on the game screen
    pub fn restart(&mut self) -> Result<Option<Effect>, TransitionError> {
        match self.state {
            SessionState::Playing => Ok(Some(Effect::BeginRound)),
            SessionState::Paused | SessionState::AwardShown => {
                self.transition_to(SessionState::Playing);
                Ok(Some(Effect::BeginRound))
            }
            _ => Err(self.not_allowed("restart")),
        }
    }

    /// Dismiss the award screen into a fresh round
    pub fn dismiss_award(&mut self) -> Result<Option<Effect>, TransitionError> {
        if self.state != SessionState::AwardShown {
            return Err(self.not_allowed("done"));
        }
        self.restart()
    }

    /// The ball got past the paddle
    pub fn round_lost(&mut self, award: bool) -> Result<Option<Effect>, TransitionError> {
        if self.state != SessionState::Playing {
            return Err(self.not_allowed("round lost"));
        }
        if award {
            self.transition_to(SessionState::AwardShown);
            Ok(Some(Effect::ShowAward))
        } else {
            debug!("round lost before award time, starting over");
            Ok(Some(Effect::BeginRound))
        }
    }

    fn not_allowed(&self, action: &'static str) -> TransitionError {
        TransitionError::NotAllowed {
            action,
            state: self.state,
        }
    }

    /// Perform a state transition
    fn transition_to(&mut self, new_state: SessionState) {
        let old_state = self.state;
        let duration_ms = self.state_entered_at.elapsed().as_millis() as u64;

        info!(
            from = %old_state,
            to = %new_state,
            duration_ms = duration_ms,
            "state transition"
        );

        self.state = new_state;
        self.state_entered_at = Instant::now();

        let event = SessionEvent::StateChanged {
            from: old_state,
            to: new_state,
            screen: new_state.screen(),
        };
        debug!(?event, "emitting state event");
        let _ = self.event_tx.send(event);
    }
}

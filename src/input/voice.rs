//! Voice command normalization
//!
//! Turns recognizer tokens into paddle slots or playback controls, and keeps
//! the short list of recent transcriptions shown on the game screen.

use std::collections::VecDeque;

use tracing::debug;

/// How many recognized tokens are kept for display
pub const RECENT_CAPACITY: usize = 4;

/// Playback control spoken during a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Pause,
    Resume,
    Restart,
}

/// A recognized voice command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceCommand {
    /// Move the paddle to slot `1..=9`
    Slot(u8),
    Control(ControlAction),
}

/// Map one token to a command
///
/// Tokens are compared case-insensitively. The homophones below are what
/// the recognizer actually produces for spoken digits.
pub fn normalize(token: &str) -> Option<VoiceCommand> {
    let token = token.trim().to_lowercase();
    let command = match token.as_str() {
        "1" | "one" => VoiceCommand::Slot(1),
        "2" | "two" | "too" | "to" => VoiceCommand::Slot(2),
        "3" | "three" => VoiceCommand::Slot(3),
        "4" | "four" | "for" | "or" => VoiceCommand::Slot(4),
        "5" | "five" => VoiceCommand::Slot(5),
        "6" | "six" => VoiceCommand::Slot(6),
        "7" | "seven" => VoiceCommand::Slot(7),
        "8" | "eight" | "it" => VoiceCommand::Slot(8),
        "9" | "nine" => VoiceCommand::Slot(9),
        "pause" | "stop" => VoiceCommand::Control(ControlAction::Pause),
        "resume" | "continue" | "play" => VoiceCommand::Control(ControlAction::Resume),
        "restart" => VoiceCommand::Control(ControlAction::Restart),
        _ => return None,
    };
    Some(command)
}

/// What the controller should do with a transcript update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptOutcome {
    /// Nothing new since the last update
    Unchanged,
    Command(VoiceCommand),
    /// Token was noise; the recognition pass should start over
    RestartRecognition,
}

/// Per-session voice state: recent tokens and the current recognition pass
#[derive(Debug, Default)]
pub struct VoiceControl {
    recent: VecDeque<String>,
    /// Number of tokens of the current pass already consumed
    consumed: usize,
}

impl VoiceControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent recognized tokens, oldest first
    pub fn recent(&self) -> impl Iterator<Item = &str> {
        self.recent.iter().map(String::as_str)
    }

    /// Handle a transcript from the recognizer
    ///
    /// The recognizer reports the whole pass so far; only the newest token
    /// is considered, and only once.
    pub fn handle_transcript(&mut self, tokens: &[String]) -> TranscriptOutcome {
        if tokens.len() < self.consumed {
            // Shorter than what we've seen: the recognizer began a new pass
            self.consumed = 0;
        }
        if tokens.is_empty() || tokens.len() == self.consumed {
            return TranscriptOutcome::Unchanged;
        }
        self.consumed = tokens.len();

        let Some(last) = tokens.last() else {
            return TranscriptOutcome::Unchanged;
        };

        match normalize(last) {
            Some(command) => {
                self.push_recent(last.trim().to_lowercase());
                TranscriptOutcome::Command(command)
            }
            None => {
                debug!(token = %last, "unrecognized token, restarting recognition");
                self.clear();
                TranscriptOutcome::RestartRecognition
            }
        }
    }

    /// Forget the current pass and the display buffer
    pub fn clear(&mut self) {
        self.recent.clear();
        self.consumed = 0;
    }

    fn push_recent(&mut self, token: String) {
        if self.recent.len() == RECENT_CAPACITY {
            self.recent.pop_front();
        }
        self.recent.push_back(token);
    }
}

//! Input module for paddle control
//!
//! Normalizes speech tokens and face tracking frames into paddle targets
//! and playback gestures, and defines the seams to the external
//! recognizers.

mod console;
mod engine;
mod face;
mod hold;
mod voice;

pub use console::ConsoleFeed;
pub use engine::{ConsoleFace, FaceEngine, SpeechEngine};
#[cfg(test)]
pub use engine::InputError;
pub use face::{FaceControl, FaceFrame, FaceGesture};
pub use voice::{ControlAction, TranscriptOutcome, VoiceCommand, VoiceControl};

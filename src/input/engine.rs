//! Seams for the external recognizers
//!
//! Speech-to-text and face tracking run outside this crate. The controller
//! only starts, stops and (for speech) restarts them; their output arrives
//! as commands on the controller's queue.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

/// Errors raised while bringing an input subsystem up
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("speech recognition setup failed: {0}")]
    SpeechSetup(String),

    #[error("camera session setup failed: {0}")]
    CameraSetup(String),

    #[error("input subsystem is already running")]
    AlreadyRunning,

    #[error("failed to spawn input thread: {0}")]
    ThreadSpawn(String),
}

/// A speech recognizer producing transcripts for the controller
pub trait SpeechEngine: Send {
    /// Begin recording and recognizing
    fn start(&mut self) -> Result<(), InputError>;

    /// Stop recording
    fn stop(&mut self);

    /// Throw away the current pass and begin a new one
    fn restart_pass(&mut self) -> Result<(), InputError>;
}

/// A face tracker producing per-frame readings for the controller
pub trait FaceEngine: Send {
    /// Configure the camera session and start tracking
    fn start(&mut self) -> Result<(), InputError>;

    /// Stop tracking
    fn stop(&mut self);
}

/// Recognizer whose output is typed into the console feed
///
/// Shares the pass counter with the feed: every bump makes the feed drop
/// the words it has accumulated so far.
#[derive(Debug)]
pub struct ConsoleSpeech {
    pass: Arc<AtomicU64>,
}

impl ConsoleSpeech {
    pub fn new(pass: Arc<AtomicU64>) -> Self {
        Self { pass }
    }

    fn next_pass(&self) -> u64 {
        self.pass.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl SpeechEngine for ConsoleSpeech {
    fn start(&mut self) -> Result<(), InputError> {
        let pass = self.next_pass();
        info!(pass, "console speech input ready");
        Ok(())
    }

    fn stop(&mut self) {
        let pass = self.next_pass();
        info!(pass, "console speech input stopped");
    }

    fn restart_pass(&mut self) -> Result<(), InputError> {
        let pass = self.next_pass();
        debug!(pass, "new recognition pass");
        Ok(())
    }
}

/// Face tracker whose frames are typed into the console feed
#[derive(Debug, Default)]
pub struct ConsoleFace;

impl FaceEngine for ConsoleFace {
    fn start(&mut self) -> Result<(), InputError> {
        info!("console face input ready");
        Ok(())
    }

    fn stop(&mut self) {
        info!("console face input stopped");
    }
}

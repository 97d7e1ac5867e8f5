//! Single-writer session controller
//!
//! Owns the state machine, the clock, both input normalizers and the game
//! loop. Everything that wants to change session state sends a [`Command`]
//! to one queue; [`Controller::run`] applies them one at a time.

use std::time::{Duration, Instant};

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use super::machine::{Effect, InputMode, SessionMachine, SessionState, TransitionError};
use crate::config::Config;
use crate::events::SessionEvent;
use crate::game::{FrameOutcome, GameLoop, PaddleTarget, PhysicsEngine};
use crate::input::{
    ControlAction, FaceControl, FaceEngine, FaceFrame, FaceGesture, SpeechEngine,
    TranscriptOutcome, VoiceCommand, VoiceControl,
};
use crate::timer::{GameTimer, StartTicket};

/// Navigation and buttons from the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Next,
    Back,
    SelectMode(InputMode),
    Recenter,
    Pause,
    Resume,
    Restart,
    /// "Done" on the award screen
    Done,
}

/// Everything the controller reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ui(UiAction),
    /// Tokens recognized so far in the current speech pass
    Transcript(Vec<String>),
    /// One face tracking frame, stamped when it was captured
    Face { frame: FaceFrame, at: Instant },
    /// One-second clock tick
    Tick,
    /// Physics frame
    Frame { dt: Duration, at: Instant },
    /// Countdown elapsed for a scheduled start
    TimerReady(StartTicket),
}

/// A command to deliver back to the controller after a delay
#[derive(Debug, Clone, PartialEq)]
pub struct Deferred {
    pub delay: Duration,
    pub command: Command,
}

/// The session controller
pub struct Controller<P> {
    config: Config,
    machine: SessionMachine,
    timer: GameTimer,
    game: GameLoop<P>,
    voice: VoiceControl,
    face: FaceControl,
    speech: Box<dyn SpeechEngine>,
    camera: Box<dyn FaceEngine>,
    /// Speech recognizer is up
    recording: bool,
    /// Face tracker is up
    tracking: bool,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl<P: PhysicsEngine> Controller<P> {
    pub fn new(
        config: Config,
        engine: P,
        speech: Box<dyn SpeechEngine>,
        camera: Box<dyn FaceEngine>,
        event_tx: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            face: FaceControl::new(&config),
            config,
            machine: SessionMachine::new(event_tx.clone()),
            timer: GameTimer::new(),
            game: GameLoop::new(engine),
            voice: VoiceControl::new(),
            speech,
            camera,
            recording: false,
            tracking: false,
            event_tx,
        }
    }

    pub fn state(&self) -> SessionState {
        self.machine.state()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.timer.elapsed_secs()
    }

    /// Run the controller, processing commands until every sender is gone
    ///
    /// `scheduler` is used to deliver deferred commands; it is weak so it
    /// does not keep the queue open on its own.
    pub async fn run(
        &mut self,
        mut command_rx: mpsc::Receiver<Command>,
        scheduler: mpsc::WeakSender<Command>,
    ) {
        info!("controller started in Intro state");

        while let Some(command) = command_rx.recv().await {
            for deferred in self.handle(command) {
                let scheduler = scheduler.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(deferred.delay).await;
                    if let Some(tx) = scheduler.upgrade() {
                        let _ = tx.send(deferred.command).await;
                    }
                });
            }
        }

        info!("controller stopped");
    }

    /// Apply one command
    pub fn handle(&mut self, command: Command) -> Vec<Deferred> {
        match command {
            Command::Ui(action) => self.handle_ui(action),
            Command::Transcript(tokens) => self.handle_transcript(&tokens),
            Command::Face { frame, at } => self.handle_face(frame, at),
            Command::Tick => {
                if let Some(elapsed_secs) = self.timer.tick() {
                    self.emit(SessionEvent::ClockTick { elapsed_secs });
                }
                Vec::new()
            }
            Command::Frame { dt, at } => self.handle_frame(dt, at),
            Command::TimerReady(ticket) => {
                if self.state() == SessionState::Playing && self.timer.activate(ticket) {
                    self.game.launch();
                    info!("countdown finished, ball served");
                    self.emit(SessionEvent::RoundStarted);
                }
                Vec::new()
            }
        }
    }

    fn handle_ui(&mut self, action: UiAction) -> Vec<Deferred> {
        debug!(?action, "ui action");
        let result = match action {
            UiAction::Next => self.machine.next(),
            UiAction::Back => self.machine.back(),
            UiAction::SelectMode(mode) => self.machine.select_mode(mode).map(|()| None),
            UiAction::Recenter => {
                self.recenter();
                Ok(None)
            }
            UiAction::Pause => return self.control(ControlAction::Pause),
            UiAction::Resume => return self.control(ControlAction::Resume),
            UiAction::Restart => return self.control(ControlAction::Restart),
            UiAction::Done => {
                let result = self.machine.dismiss_award();
                return self.restart_round(result);
            }
        };
        self.apply_transition(result)
    }

    fn handle_transcript(&mut self, tokens: &[String]) -> Vec<Deferred> {
        if self.machine.mode() != Some(InputMode::Voice) || !self.recording {
            debug!("transcript ignored, voice input inactive");
            return Vec::new();
        }

        match self.voice.handle_transcript(tokens) {
            TranscriptOutcome::Unchanged => Vec::new(),
            TranscriptOutcome::Command(command) => {
                let recent = self.voice.recent().map(str::to_string).collect();
                self.emit(SessionEvent::TranscriptUpdated { recent });
                match command {
                    VoiceCommand::Slot(slot) => {
                        if let Some(target) = PaddleTarget::from_slot(slot) {
                            debug!(slot, "paddle slot selected");
                            self.game.set_target(target);
                        }
                        Vec::new()
                    }
                    VoiceCommand::Control(action) => self.control(action),
                }
            }
            TranscriptOutcome::RestartRecognition => {
                if let Err(e) = self.speech.restart_pass() {
                    error!(?e, "failed to restart recognition pass");
                }
                self.emit(SessionEvent::TranscriptUpdated { recent: Vec::new() });
                self.emit(SessionEvent::RecognitionRestarted);
                Vec::new()
            }
        }
    }

    fn handle_face(&mut self, frame: FaceFrame, at: Instant) -> Vec<Deferred> {
        if self.machine.mode() != Some(InputMode::Face) || !self.tracking {
            return Vec::new();
        }

        let paused = self.state() == SessionState::Paused;
        let reading = self.face.handle_frame(frame, paused, at);
        self.game.set_target(reading.target);

        match reading.gesture {
            Some(gesture) => self.face_gesture(gesture),
            None => Vec::new(),
        }
    }

    fn handle_frame(&mut self, dt: Duration, at: Instant) -> Vec<Deferred> {
        if self.tracking && self.state() == SessionState::Paused {
            if let Some(gesture) = self.face.poll(at) {
                return self.face_gesture(gesture);
            }
        }

        let live = self.state() == SessionState::Playing
            && self.timer.is_running()
            && !self.timer.is_paused();
        if !live {
            return Vec::new();
        }

        match self.game.frame(dt) {
            FrameOutcome::InPlay => Vec::new(),
            FrameOutcome::Lost => self.round_lost(),
        }
    }

    fn face_gesture(&mut self, gesture: FaceGesture) -> Vec<Deferred> {
        debug!(?gesture, "face gesture");
        match gesture {
            FaceGesture::Pause => self.control(ControlAction::Pause),
            FaceGesture::Resume => self.control(ControlAction::Resume),
            FaceGesture::Restart => self.control(ControlAction::Restart),
        }
    }

    fn control(&mut self, action: ControlAction) -> Vec<Deferred> {
        let result = match action {
            ControlAction::Pause if !self.timer.is_running() => {
                debug!("pause ignored, round clock not running");
                return Vec::new();
            }
            ControlAction::Pause => self.machine.pause(),
            ControlAction::Resume => self.machine.resume(),
            ControlAction::Restart => {
                let result = self.machine.restart();
                return self.restart_round(result);
            }
        };
        self.apply_transition(result)
    }

    fn restart_round(&mut self, result: Result<Option<Effect>, TransitionError>) -> Vec<Deferred> {
        if result.is_ok() {
            let previous_secs = self.timer.elapsed_secs();
            info!(previous_secs, "round restarted");
            self.emit(SessionEvent::RoundRestarted { previous_secs });
        }
        self.apply_transition(result)
    }

    fn round_lost(&mut self) -> Vec<Deferred> {
        let elapsed_secs = self.timer.elapsed_secs();
        let award = elapsed_secs >= self.award_threshold();
        info!(elapsed_secs, award, "round lost");
        self.emit(SessionEvent::RoundLost {
            elapsed_secs,
            award,
        });
        let result = self.machine.round_lost(award);
        self.apply_transition(result)
    }

    fn award_threshold(&self) -> u64 {
        match self.machine.mode() {
            Some(InputMode::Face) => self.config.face_award_secs,
            _ => self.config.voice_award_secs,
        }
    }

    fn recenter(&mut self) {
        if !self.tracking {
            debug!("recenter ignored, face tracking inactive");
            return;
        }
        if let Some(center) = self.face.recenter() {
            self.emit(SessionEvent::Recentered { center });
        }
    }

    fn apply_transition(&mut self, result: Result<Option<Effect>, TransitionError>) -> Vec<Deferred> {
        match result {
            Ok(Some(effect)) => self.apply(effect),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(%e, "transition rejected");
                Vec::new()
            }
        }
    }

    /// Carry out the side effect of a transition
    fn apply(&mut self, effect: Effect) -> Vec<Deferred> {
        debug!(?effect, "applying effect");
        match effect {
            Effect::StartInput(mode) => {
                self.start_input(mode);
                Vec::new()
            }
            Effect::StopInput(mode) => {
                self.stop_input(mode);
                Vec::new()
            }
            Effect::BeginRound => {
                self.game.reset_round();
                let ticket = self.timer.schedule_start();
                let seconds = self.config.countdown.as_secs();
                self.emit(SessionEvent::CountdownStarted { seconds });
                vec![Deferred {
                    delay: self.config.countdown,
                    command: Command::TimerReady(ticket),
                }]
            }
            Effect::StopRound => {
                self.timer.reset();
                self.game.reset_round();
                Vec::new()
            }
            Effect::PauseRound => {
                self.timer.pause();
                self.game.set_paused(true);
                self.emit(SessionEvent::Paused {
                    elapsed_secs: self.timer.elapsed_secs(),
                });
                Vec::new()
            }
            Effect::ResumeRound => {
                self.timer.resume();
                self.game.set_paused(false);
                self.emit(SessionEvent::Resumed {
                    elapsed_secs: self.timer.elapsed_secs(),
                });
                Vec::new()
            }
            Effect::ShowAward => {
                self.timer.pause();
                self.game.set_paused(true);
                self.emit(SessionEvent::AwardShown {
                    elapsed_secs: self.timer.elapsed_secs(),
                });
                Vec::new()
            }
        }
    }

    fn start_input(&mut self, mode: InputMode) {
        let result = match mode {
            InputMode::Voice => self.speech.start(),
            InputMode::Face => self.camera.start(),
        };

        match result {
            Ok(()) => {
                match mode {
                    InputMode::Voice => {
                        self.voice.clear();
                        self.recording = true;
                    }
                    InputMode::Face => {
                        self.face.clear();
                        self.tracking = true;
                    }
                }
                info!(%mode, "input started");
                self.emit(SessionEvent::InputStarted { mode });
            }
            Err(e) => {
                error!(%mode, ?e, "failed to start input");
                self.emit(SessionEvent::InputFailed {
                    mode,
                    reason: e.to_string(),
                });
            }
        }
    }

    fn stop_input(&mut self, mode: InputMode) {
        match mode {
            InputMode::Voice if self.recording => {
                self.speech.stop();
                self.recording = false;
                self.voice.clear();
            }
            InputMode::Face if self.tracking => {
                self.camera.stop();
                self.tracking = false;
                self.face.clear();
            }
            _ => return,
        }
        info!(%mode, "input stopped");
        self.emit(SessionEvent::InputStopped { mode });
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.event_tx.send(event);
    }

    #[cfg(test)]
    pub fn game_mut(&mut self) -> &mut GameLoop<P> {
        &mut self.game
    }

    #[cfg(test)]
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    #[cfg(test)]
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    #[cfg(test)]
    pub fn paddle_target(&self) -> PaddleTarget {
        self.game.target()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::game::{ArenaSim, Point};
    use crate::input::InputError;

    const FRAME: Duration = Duration::from_millis(100);

    #[derive(Default, Clone)]
    struct FakeSpeech {
        fail: bool,
        restarts: Arc<AtomicUsize>,
    }

    impl SpeechEngine for FakeSpeech {
        fn start(&mut self) -> Result<(), InputError> {
            if self.fail {
                return Err(InputError::SpeechSetup("denied".to_string()));
            }
            Ok(())
        }

        fn stop(&mut self) {}

        fn restart_pass(&mut self) -> Result<(), InputError> {
            self.restarts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeCamera {
        fail: bool,
    }

    impl FaceEngine for FakeCamera {
        fn start(&mut self) -> Result<(), InputError> {
            if self.fail {
                return Err(InputError::CameraSetup("no camera".to_string()));
            }
            Ok(())
        }

        fn stop(&mut self) {}
    }

    fn controller_with(
        speech: FakeSpeech,
        camera: FakeCamera,
    ) -> (Controller<ArenaSim>, broadcast::Receiver<SessionEvent>) {
        let (tx, rx) = broadcast::channel(256);
        let controller = Controller::new(
            Config::default(),
            ArenaSim::new(),
            Box::new(speech),
            Box::new(camera),
            tx,
        );
        (controller, rx)
    }

    fn controller() -> (Controller<ArenaSim>, broadcast::Receiver<SessionEvent>) {
        controller_with(FakeSpeech::default(), FakeCamera::default())
    }

    fn ui(c: &mut Controller<ArenaSim>, action: UiAction) -> Vec<Deferred> {
        c.handle(Command::Ui(action))
    }

    fn say(c: &mut Controller<ArenaSim>, words: &[&str]) -> Vec<Deferred> {
        c.handle(Command::Transcript(
            words.iter().map(|w| (*w).to_string()).collect(),
        ))
    }

    /// Drive to the game screen and fire the countdown
    fn start_game(c: &mut Controller<ArenaSim>, mode: InputMode) {
        ui(c, UiAction::Next);
        ui(c, UiAction::SelectMode(mode));
        ui(c, UiAction::Next);
        let deferred = ui(c, UiAction::Next);
        assert_eq!(deferred.len(), 1);
        assert_eq!(deferred[0].delay, Duration::from_secs(5));
        c.handle(deferred[0].command.clone());
        assert!(c.timer.is_running());
    }

    fn tick(c: &mut Controller<ArenaSim>, n: u64) {
        for _ in 0..n {
            c.handle(Command::Tick);
        }
    }

    fn lose_ball(c: &mut Controller<ArenaSim>) -> Vec<Deferred> {
        c.game_mut().set_target(PaddleTarget::from_slot(1).unwrap());
        c.game_mut()
            .engine_mut()
            .place_ball(Point::new(0.9, 0.15), Point::new(0.0, -1.0));
        c.handle(Command::Frame {
            dt: FRAME,
            at: Instant::now(),
        })
    }

    fn face_at(c: &mut Controller<ArenaSim>, center_x: f32, at: Instant) -> Vec<Deferred> {
        c.handle(Command::Face {
            frame: FaceFrame {
                center_x,
                mouth_opening: 0.0,
            },
            at,
        })
    }

    fn drain(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[test]
    fn test_navigation_starts_and_stops_input() {
        let (mut c, _) = controller();
        ui(&mut c, UiAction::Next);
        ui(&mut c, UiAction::SelectMode(InputMode::Voice));
        ui(&mut c, UiAction::Next);
        assert_eq!(c.state(), SessionState::TrackingInfo);
        assert!(c.is_recording());
        ui(&mut c, UiAction::Back);
        assert_eq!(c.state(), SessionState::ModeSelect);
        assert!(!c.is_recording());
    }

    #[test]
    fn test_speech_setup_failure_leaves_flag_off() {
        let speech = FakeSpeech {
            fail: true,
            ..FakeSpeech::default()
        };
        let (mut c, mut rx) = controller_with(speech, FakeCamera::default());
        ui(&mut c, UiAction::Next);
        ui(&mut c, UiAction::SelectMode(InputMode::Voice));
        ui(&mut c, UiAction::Next);
        assert_eq!(c.state(), SessionState::TrackingInfo);
        assert!(!c.is_recording());
        assert!(drain(&mut rx)
            .iter()
            .any(|e| matches!(e, SessionEvent::InputFailed { mode: InputMode::Voice, .. })));
        // Transcripts are ignored while the recognizer is down
        say(&mut c, &["nine"]);
        assert_eq!(c.paddle_target(), PaddleTarget::CENTER);
    }

    #[test]
    fn test_camera_setup_failure_leaves_flag_off() {
        let (mut c, _) = controller_with(FakeSpeech::default(), FakeCamera { fail: true });
        ui(&mut c, UiAction::Next);
        ui(&mut c, UiAction::SelectMode(InputMode::Face));
        ui(&mut c, UiAction::Next);
        assert!(!c.is_tracking());
        assert_eq!(c.state(), SessionState::TrackingInfo);
    }

    #[test]
    fn test_clock_waits_for_countdown() {
        let (mut c, _) = controller();
        ui(&mut c, UiAction::Next);
        ui(&mut c, UiAction::SelectMode(InputMode::Voice));
        ui(&mut c, UiAction::Next);
        let deferred = ui(&mut c, UiAction::Next);
        tick(&mut c, 3);
        assert_eq!(c.elapsed_secs(), 0);
        c.handle(deferred[0].command.clone());
        tick(&mut c, 5);
        assert_eq!(c.elapsed_secs(), 5);
    }

    #[test]
    fn test_voice_slot_moves_paddle() {
        let (mut c, _) = controller();
        start_game(&mut c, InputMode::Voice);
        say(&mut c, &["it"]);
        assert_eq!(c.paddle_target(), PaddleTarget::from_slot(8).unwrap());
    }

    #[test]
    fn test_voice_noise_restarts_recognition() {
        let speech = FakeSpeech::default();
        let restarts = Arc::clone(&speech.restarts);
        let (mut c, mut rx) = controller_with(speech, FakeCamera::default());
        start_game(&mut c, InputMode::Voice);
        say(&mut c, &["two"]);
        say(&mut c, &["two", "nine"]);
        drain(&mut rx);
        say(&mut c, &["two", "nine", "banana"]);
        assert_eq!(restarts.load(Ordering::SeqCst), 1);
        let events = drain(&mut rx);
        assert!(events.contains(&SessionEvent::TranscriptUpdated { recent: Vec::new() }));
        assert!(events.contains(&SessionEvent::RecognitionRestarted));
    }

    #[test]
    fn test_voice_restart_mid_round() {
        let (mut c, mut rx) = controller();
        start_game(&mut c, InputMode::Voice);
        tick(&mut c, 12);
        let deferred = say(&mut c, &["restart"]);
        assert_eq!(c.state(), SessionState::Playing);
        assert_eq!(c.elapsed_secs(), 0);
        assert_eq!(deferred.len(), 1);
        assert!(drain(&mut rx).contains(&SessionEvent::RoundRestarted { previous_secs: 12 }));
        c.handle(deferred[0].command.clone());
        tick(&mut c, 2);
        assert_eq!(c.elapsed_secs(), 2);
    }

    #[test]
    fn test_restart_ignored_before_game() {
        let (mut c, mut rx) = controller();
        ui(&mut c, UiAction::Next);
        let deferred = ui(&mut c, UiAction::Restart);
        assert!(deferred.is_empty());
        assert_eq!(c.state(), SessionState::ModeSelect);
        assert!(!drain(&mut rx)
            .iter()
            .any(|e| matches!(e, SessionEvent::RoundRestarted { .. })));
    }

    #[test]
    fn test_voice_pause_resume_keeps_clock() {
        let (mut c, _) = controller();
        start_game(&mut c, InputMode::Voice);
        tick(&mut c, 5);
        say(&mut c, &["pause"]);
        assert_eq!(c.state(), SessionState::Paused);
        tick(&mut c, 3);
        assert_eq!(c.elapsed_secs(), 5);
        say(&mut c, &["pause", "resume"]);
        assert_eq!(c.state(), SessionState::Playing);
        tick(&mut c, 1);
        assert_eq!(c.elapsed_secs(), 6);
    }

    #[test]
    fn test_pause_ignored_during_countdown() {
        let (mut c, _) = controller();
        ui(&mut c, UiAction::Next);
        ui(&mut c, UiAction::SelectMode(InputMode::Voice));
        ui(&mut c, UiAction::Next);
        ui(&mut c, UiAction::Next);
        ui(&mut c, UiAction::Pause);
        assert_eq!(c.state(), SessionState::Playing);
    }

    #[test]
    fn test_loss_before_threshold_starts_new_round() {
        let (mut c, mut rx) = controller();
        start_game(&mut c, InputMode::Voice);
        tick(&mut c, 29);
        let deferred = lose_ball(&mut c);
        assert_eq!(c.state(), SessionState::Playing);
        assert_eq!(c.elapsed_secs(), 0);
        assert_eq!(deferred.len(), 1);
        assert!(!c.timer.is_running());
        let events = drain(&mut rx);
        assert!(events.contains(&SessionEvent::RoundLost {
            elapsed_secs: 29,
            award: false,
        }));
        assert!(!events
            .iter()
            .any(|e| matches!(e, SessionEvent::AwardShown { .. })));
    }

    #[test]
    fn test_loss_at_threshold_shows_award() {
        let (mut c, mut rx) = controller();
        start_game(&mut c, InputMode::Voice);
        tick(&mut c, 30);
        let deferred = lose_ball(&mut c);
        assert!(deferred.is_empty());
        assert_eq!(c.state(), SessionState::AwardShown);
        assert_eq!(c.elapsed_secs(), 30);
        tick(&mut c, 4);
        assert_eq!(c.elapsed_secs(), 30);
        assert!(drain(&mut rx).contains(&SessionEvent::AwardShown { elapsed_secs: 30 }));
    }

    #[test]
    fn test_face_mode_uses_longer_threshold() {
        let (mut c, _) = controller();
        start_game(&mut c, InputMode::Face);
        tick(&mut c, 30);
        lose_ball(&mut c);
        assert_eq!(c.state(), SessionState::Playing);
        assert_eq!(c.elapsed_secs(), 0);
    }

    #[test]
    fn test_award_done_starts_fresh_round() {
        let (mut c, _) = controller();
        start_game(&mut c, InputMode::Voice);
        tick(&mut c, 31);
        lose_ball(&mut c);
        let deferred = ui(&mut c, UiAction::Done);
        assert_eq!(c.state(), SessionState::Playing);
        assert_eq!(c.elapsed_secs(), 0);
        c.handle(deferred[0].command.clone());
        tick(&mut c, 1);
        assert_eq!(c.elapsed_secs(), 1);
    }

    #[test]
    fn test_back_from_game_clears_round() {
        let (mut c, _) = controller();
        start_game(&mut c, InputMode::Voice);
        tick(&mut c, 7);
        say(&mut c, &["stop"]);
        assert_eq!(c.state(), SessionState::Paused);
        ui(&mut c, UiAction::Back);
        assert_eq!(c.state(), SessionState::TrackingInfo);
        assert!(!c.timer.is_running());
        assert!(!c.timer.is_paused());
        assert_eq!(c.elapsed_secs(), 0);
        // Input stays live on the tracking info screen
        assert!(c.is_recording());
    }

    #[test]
    fn test_stale_countdown_ignored_after_back() {
        let (mut c, _) = controller();
        ui(&mut c, UiAction::Next);
        ui(&mut c, UiAction::SelectMode(InputMode::Voice));
        ui(&mut c, UiAction::Next);
        let deferred = ui(&mut c, UiAction::Next);
        ui(&mut c, UiAction::Back);
        c.handle(deferred[0].command.clone());
        tick(&mut c, 2);
        assert_eq!(c.elapsed_secs(), 0);
    }

    #[test]
    fn test_face_hold_right_resumes_once() {
        let (mut c, mut rx) = controller();
        start_game(&mut c, InputMode::Face);
        let t0 = Instant::now();
        face_at(&mut c, 0.5, t0);
        ui(&mut c, UiAction::Recenter);
        c.handle(Command::Face {
            frame: FaceFrame {
                center_x: 0.5,
                mouth_opening: 0.4,
            },
            at: t0,
        });
        assert_eq!(c.state(), SessionState::Paused);
        drain(&mut rx);

        for ms in (100..=3000).step_by(100) {
            face_at(&mut c, 0.7, t0 + Duration::from_millis(ms));
        }
        assert_eq!(c.state(), SessionState::Playing);
        let resumes = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::Resumed { .. }))
            .count();
        assert_eq!(resumes, 1);
    }

    #[test]
    fn test_face_hold_cancelled_by_return() {
        let (mut c, _) = controller();
        start_game(&mut c, InputMode::Face);
        let t0 = Instant::now();
        ui(&mut c, UiAction::Pause);
        assert_eq!(c.state(), SessionState::Paused);
        face_at(&mut c, 0.7, t0);
        face_at(&mut c, 0.55, t0 + Duration::from_millis(1500));
        c.handle(Command::Frame {
            dt: FRAME,
            at: t0 + Duration::from_secs(3),
        });
        assert_eq!(c.state(), SessionState::Paused);
    }

    #[test]
    fn test_face_hold_left_restarts_via_frame_poll() {
        let (mut c, _) = controller();
        start_game(&mut c, InputMode::Face);
        tick(&mut c, 12);
        ui(&mut c, UiAction::Pause);
        let t0 = Instant::now();
        face_at(&mut c, 0.2, t0);
        let deferred = c.handle(Command::Frame {
            dt: FRAME,
            at: t0 + Duration::from_secs(2),
        });
        assert_eq!(c.state(), SessionState::Playing);
        assert_eq!(c.elapsed_secs(), 0);
        assert_eq!(deferred.len(), 1);
    }

    #[test]
    fn test_recenter_zero_offset_is_center() {
        let (mut c, mut rx) = controller();
        start_game(&mut c, InputMode::Face);
        let now = Instant::now();
        face_at(&mut c, 0.8, now);
        ui(&mut c, UiAction::Recenter);
        face_at(&mut c, 0.8, now);
        assert_eq!(c.paddle_target().value(), 0.0);
        assert!(drain(&mut rx)
            .iter()
            .any(|e| matches!(e, SessionEvent::Recentered { .. })));
    }

    #[test]
    fn test_run_loop_processes_queue() {
        let (mut c, _) = controller();
        let (tx, rx) = mpsc::channel(8);
        let scheduler = tx.downgrade();
        tokio_test::block_on(async {
            tx.send(Command::Ui(UiAction::Next)).await.unwrap();
            tx.send(Command::Ui(UiAction::SelectMode(InputMode::Voice)))
                .await
                .unwrap();
            tx.send(Command::Ui(UiAction::Next)).await.unwrap();
            drop(tx);
            c.run(rx, scheduler).await;
        });
        assert_eq!(c.state(), SessionState::TrackingInfo);
        assert!(c.is_recording());
    }
}

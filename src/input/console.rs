//! Line-oriented console feed
//!
//! Stands in for the UI and the capture devices: reads commands from stdin
//! on a dedicated thread and forwards them to the controller queue.
//!
//! ```text
//! next | back | mode voice | mode face | recenter
//! pause | resume | restart | done
//! say <words...>          speech recognizer output
//! face <min_x> <width> <height> [<upper_x> <upper_y> <lower_x> <lower_y>]
//!                         face bounding box, optional inner-lip landmarks
//! ```
//!
//! Spoken words accumulate into one recognition pass until the paired
//! [`ConsoleSpeech`] engine is restarted or stopped.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::engine::{ConsoleSpeech, InputError};
use super::face::FaceFrame;
use crate::game::Point;
use crate::session::{Command, InputMode, UiAction};

/// One parsed console line
#[derive(Debug, Clone, PartialEq)]
enum Line {
    Ui(UiAction),
    Say(Vec<String>),
    Face(FaceFrame),
}

fn parse_line(line: &str) -> Option<Line> {
    let mut words = line.split_whitespace();
    let head = words.next()?.to_lowercase();

    let parsed = match head.as_str() {
        "next" => Line::Ui(UiAction::Next),
        "back" => Line::Ui(UiAction::Back),
        "recenter" => Line::Ui(UiAction::Recenter),
        "pause" => Line::Ui(UiAction::Pause),
        "resume" => Line::Ui(UiAction::Resume),
        "restart" => Line::Ui(UiAction::Restart),
        "done" => Line::Ui(UiAction::Done),
        "mode" => match words.next()?.to_lowercase().as_str() {
            "voice" => Line::Ui(UiAction::SelectMode(InputMode::Voice)),
            "face" => Line::Ui(UiAction::SelectMode(InputMode::Face)),
            _ => return None,
        },
        "say" => {
            let tokens: Vec<String> = words.map(str::to_lowercase).collect();
            if tokens.is_empty() {
                return None;
            }
            Line::Say(tokens)
        }
        "face" => {
            let numbers = words
                .map(|w| w.parse::<f32>().ok())
                .collect::<Option<Vec<f32>>>()?;
            let (upper_lip, lower_lip) = match numbers.len() {
                3 => (Point::default(), Point::default()),
                7 => (
                    Point::new(numbers[3], numbers[4]),
                    Point::new(numbers[5], numbers[6]),
                ),
                _ => return None,
            };
            Line::Face(FaceFrame::from_landmarks(
                numbers[0], numbers[1], numbers[2], upper_lip, lower_lip,
            ))
        }
        _ => return None,
    };
    Some(parsed)
}

/// Words of the current recognition pass, as a recognizer would report them
#[derive(Debug, Default)]
struct TranscriptBuffer {
    words: Vec<String>,
    pass: u64,
}

impl TranscriptBuffer {
    /// Append words heard during `pass`, starting over if the pass changed
    fn push(&mut self, words: Vec<String>, pass: u64) -> Vec<String> {
        if pass != self.pass {
            debug!(from = self.pass, to = pass, "recognition pass changed, transcript cleared");
            self.words.clear();
            self.pass = pass;
        }
        self.words.extend(words);
        self.words.clone()
    }
}

/// Reads stdin and feeds the controller
pub struct ConsoleFeed {
    command_tx: mpsc::Sender<Command>,
    running: Arc<AtomicBool>,
    /// Recognition pass, bumped by the paired speech engine
    pass: Arc<AtomicU64>,
}

impl ConsoleFeed {
    pub fn new(command_tx: mpsc::Sender<Command>) -> Self {
        Self {
            command_tx,
            running: Arc::new(AtomicBool::new(false)),
            pass: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Speech engine whose restarts reset this feed's transcript
    pub fn speech_engine(&self) -> ConsoleSpeech {
        ConsoleSpeech::new(Arc::clone(&self.pass))
    }

    /// Start reading on a dedicated thread
    ///
    /// The thread exits at end of input, when the controller queue closes,
    /// or after `stop()` once the next line arrives.
    pub fn start(&self) -> Result<(), InputError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(InputError::AlreadyRunning);
        }

        let command_tx = self.command_tx.clone();
        let running = Arc::clone(&self.running);
        let pass = Arc::clone(&self.pass);

        thread::Builder::new()
            .name("console-feed".to_string())
            .spawn(move || {
                info!("console feed thread started");
                let stdin = std::io::stdin();
                read_lines(stdin.lock(), &command_tx, &running, &pass);
                running.store(false, Ordering::SeqCst);
                info!("console feed thread stopped");
            })
            .map_err(|e| InputError::ThreadSpawn(e.to_string()))?;

        Ok(())
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

fn read_lines(
    reader: impl BufRead,
    command_tx: &mpsc::Sender<Command>,
    running: &AtomicBool,
    pass: &AtomicU64,
) {
    let mut transcript = TranscriptBuffer::default();

    for line in reader.lines() {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(?e, "failed to read console line");
                break;
            }
        };

        let command = match parse_line(&line) {
            Some(Line::Ui(action)) => Command::Ui(action),
            Some(Line::Say(tokens)) => {
                Command::Transcript(transcript.push(tokens, pass.load(Ordering::SeqCst)))
            }
            Some(Line::Face(frame)) => Command::Face {
                frame,
                at: Instant::now(),
            },
            None => {
                if !line.trim().is_empty() {
                    warn!(%line, "unrecognized console input");
                }
                continue;
            }
        };

        debug!(?command, "console command");
        if command_tx.blocking_send(command).is_err() {
            warn!("failed to send console command - channel closed?");
            break;
        }
    }
}

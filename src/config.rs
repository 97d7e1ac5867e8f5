//! Configuration loading and management

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Runtime tunables for the session controller
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Countdown between entering the game screen and the clock starting
    pub countdown: Duration,

    /// Seconds a voice-controlled round must survive to earn the award
    pub voice_award_secs: u64,

    /// Seconds a face-controlled round must survive to earn the award
    pub face_award_secs: u64,

    /// Mouth opening above which a face frame counts as a pause request
    pub mouth_open_threshold: f32,

    /// Offset from the center reference that arms a hold gesture
    pub hold_offset_threshold: f32,

    /// How long a hold gesture must be sustained to fire
    pub hold_duration: Duration,

    /// Scale from raw face offset to paddle range
    pub face_gain: f32,

    /// Physics frames per second forwarded to the game loop
    pub frame_rate: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            countdown: Duration::from_secs(5),
            voice_award_secs: 30,
            face_award_secs: 60,
            mouth_open_threshold: 0.25,
            hold_offset_threshold: 0.1,
            hold_duration: Duration::from_secs(2),
            face_gain: 3.0,
            frame_rate: 60,
        }
    }
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, falling back to defaults
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            countdown: Duration::from_secs(parse_or(
                &lookup,
                "PONG_COUNTDOWN_SECS",
                defaults.countdown.as_secs(),
            )?),
            voice_award_secs: parse_or(&lookup, "PONG_VOICE_AWARD_SECS", defaults.voice_award_secs)?,
            face_award_secs: parse_or(&lookup, "PONG_FACE_AWARD_SECS", defaults.face_award_secs)?,
            mouth_open_threshold: parse_or(
                &lookup,
                "PONG_MOUTH_OPEN_THRESHOLD",
                defaults.mouth_open_threshold,
            )?,
            hold_offset_threshold: parse_or(
                &lookup,
                "PONG_HOLD_OFFSET_THRESHOLD",
                defaults.hold_offset_threshold,
            )?,
            hold_duration: Duration::from_millis(parse_or(
                &lookup,
                "PONG_HOLD_MS",
                defaults.hold_duration.as_millis() as u64,
            )?),
            face_gain: parse_or(&lookup, "PONG_FACE_GAIN", defaults.face_gain)?,
            frame_rate: parse_or(&lookup, "PONG_FRAME_RATE", defaults.frame_rate)?.max(1),
        })
    }

    /// Interval between physics frames
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_rate))
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}

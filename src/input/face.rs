//! Face position normalization
//!
//! Converts per-frame face tracking output into a paddle target relative to
//! a user-calibrated center, and recognizes the pause and hold gestures.

use std::time::Instant;

use tracing::{debug, info};

use super::hold::{HoldDetector, HoldDirection};
use crate::config::Config;
use crate::game::{PaddleTarget, Point};

/// One frame of face tracking output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceFrame {
    /// Midpoint of the face bounding box, normalized to `[0, 1]`
    pub center_x: f32,
    /// Mouth opening relative to face height
    pub mouth_opening: f32,
}

impl FaceFrame {
    /// Build a frame from the bounding box and two inner-lip landmarks
    pub fn from_landmarks(
        box_min_x: f32,
        box_width: f32,
        box_height: f32,
        upper_lip: Point,
        lower_lip: Point,
    ) -> Self {
        Self {
            center_x: box_min_x + box_width / 2.0,
            mouth_opening: mouth_opening(upper_lip, lower_lip, box_height),
        }
    }
}

/// Distance between inner-lip landmarks, normalized by face height
pub fn mouth_opening(upper_lip: Point, lower_lip: Point, face_height: f32) -> f32 {
    if face_height <= f32::EPSILON {
        return 0.0;
    }
    upper_lip.distance(lower_lip) / face_height
}

/// Gesture recognized from a face frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceGesture {
    /// Mouth opened wide
    Pause,
    /// Held to the right while paused
    Resume,
    /// Held to the left while paused
    Restart,
}

/// Result of handling one face frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceReading {
    pub target: PaddleTarget,
    pub gesture: Option<FaceGesture>,
}

/// Per-session face state: center reference and the hold detector
#[derive(Debug)]
pub struct FaceControl {
    center: f32,
    latest_x: Option<f32>,
    gain: f32,
    mouth_threshold: f32,
    hold: HoldDetector,
}

impl FaceControl {
    pub fn new(config: &Config) -> Self {
        Self {
            center: 0.5,
            latest_x: None,
            gain: config.face_gain,
            mouth_threshold: config.mouth_open_threshold,
            hold: HoldDetector::new(config.hold_offset_threshold, config.hold_duration),
        }
    }

    /// Current center reference
    #[cfg(test)]
    pub fn center(&self) -> f32 {
        self.center
    }

    /// Make the latest reading the new center; returns it if there was one
    pub fn recenter(&mut self) -> Option<f32> {
        let x = self.latest_x?;
        self.center = x;
        self.hold.reset();
        info!(center = x, "face center recalibrated");
        Some(x)
    }

    /// Raw offset of a reading from the center reference
    pub fn offset(&self, center_x: f32) -> f32 {
        center_x - self.center
    }

    /// Handle one frame
    ///
    /// Hold gestures are only tracked while `paused`; the mouth gesture only
    /// while not paused.
    pub fn handle_frame(&mut self, frame: FaceFrame, paused: bool, now: Instant) -> FaceReading {
        let x = frame.center_x.clamp(0.0, 1.0);
        self.latest_x = Some(x);
        let offset = self.offset(x);
        let target = PaddleTarget::from_offset(offset * self.gain);

        let gesture = if paused {
            self.hold.observe(offset, now).map(gesture_for)
        } else {
            self.hold.reset();
            (frame.mouth_opening > self.mouth_threshold).then(|| {
                debug!(opening = frame.mouth_opening, "mouth open");
                FaceGesture::Pause
            })
        };

        FaceReading { target, gesture }
    }

    /// Check an outstanding hold without a new frame
    pub fn poll(&mut self, now: Instant) -> Option<FaceGesture> {
        self.hold.poll(now).map(gesture_for)
    }

    /// Forget readings and outstanding holds, keeping the center
    pub fn clear(&mut self) {
        self.latest_x = None;
        self.hold.reset();
    }
}

fn gesture_for(direction: HoldDirection) -> FaceGesture {
    match direction {
        HoldDirection::Right => FaceGesture::Resume,
        HoldDirection::Left => FaceGesture::Restart,
    }
}

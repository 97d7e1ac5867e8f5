//! Paddle target positions
//!
//! The paddle lives on a normalized horizontal axis from -1.0 (left wall)
//! to 1.0 (right wall), with 0.0 at the center of the arena.

/// Number of discrete voice-selectable paddle slots
pub const SLOT_COUNT: u8 = 9;

/// Where the paddle should be on the next physics frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PaddleTarget(f32);

impl PaddleTarget {
    /// Center of the arena
    pub const CENTER: Self = Self(0.0);

    /// Target for a voice slot in `1..=9`, evenly spaced wall to wall
    ///
    /// Returns `None` for slots outside that range.
    pub fn from_slot(slot: u8) -> Option<Self> {
        if !(1..=SLOT_COUNT).contains(&slot) {
            return None;
        }
        let half = f32::from(SLOT_COUNT / 2);
        Some(Self((f32::from(slot) - half - 1.0) / half))
    }

    /// Target for a continuous offset, clamped to the arena
    pub fn from_offset(offset: f32) -> Self {
        if offset.is_nan() {
            return Self::CENTER;
        }
        Self(offset.clamp(-1.0, 1.0))
    }

    /// Normalized horizontal position
    pub fn value(self) -> f32 {
        self.0
    }
}

//! Physics engine seam and a small kinematic arena
//!
//! The real game renders through an external engine. The controller only
//! needs to read ball and paddle positions, move the paddle and serve the
//! ball, so that is all [`PhysicsEngine`] exposes.

use std::time::Duration;

/// A point in arena coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// What the game loop needs from a 2D physics engine
///
/// Horizontal positions are normalized to `[-1.0, 1.0]`; the ball travels
/// upward from the paddle and is lost once it drops below the paddle line.
pub trait PhysicsEngine: Send {
    /// Current ball center
    fn ball_position(&self) -> Point;

    /// Vertical position of the paddle's top edge
    fn paddle_line(&self) -> f32;

    /// Move the paddle to a normalized horizontal position
    fn move_paddle(&mut self, x: f32);

    /// Put the ball back at its serve position, at rest
    fn reset_ball(&mut self);

    /// Apply the round-start impulse to the ball
    fn launch_ball(&mut self);

    /// Freeze or unfreeze the simulation
    fn set_paused(&mut self, paused: bool);

    /// Advance the simulation; engines that step themselves can ignore this
    fn step(&mut self, dt: Duration);
}

/// Height of the arena; the paddle sits near `y = 0`
const ARENA_HEIGHT: f32 = 2.0;
const PADDLE_LINE: f32 = 0.1;
const PADDLE_HALF_WIDTH: f32 = 0.2;
const SERVE_POSITION: Point = Point { x: 0.0, y: 1.0 };
const LAUNCH_VELOCITY: Point = Point { x: 0.45, y: 0.9 };

/// A headless kinematic arena: walls on three sides, paddle on the fourth
#[derive(Debug, Clone)]
pub struct ArenaSim {
    ball: Point,
    velocity: Point,
    paddle_x: f32,
    paused: bool,
}

impl Default for ArenaSim {
    fn default() -> Self {
        Self::new()
    }
}

impl ArenaSim {
    pub fn new() -> Self {
        Self {
            ball: SERVE_POSITION,
            velocity: Point::default(),
            paddle_x: 0.0,
            paused: false,
        }
    }

    /// Current paddle position
    #[cfg(test)]
    pub fn paddle_x(&self) -> f32 {
        self.paddle_x
    }

    /// Whether the ball is in motion
    #[cfg(test)]
    pub fn is_moving(&self) -> bool {
        self.velocity != Point::default()
    }

    #[cfg(test)]
    pub fn place_ball(&mut self, ball: Point, velocity: Point) {
        self.ball = ball;
        self.velocity = velocity;
    }
}

impl PhysicsEngine for ArenaSim {
    fn ball_position(&self) -> Point {
        self.ball
    }

    fn paddle_line(&self) -> f32 {
        PADDLE_LINE
    }

    fn move_paddle(&mut self, x: f32) {
        self.paddle_x = x.clamp(-1.0, 1.0);
    }

    fn reset_ball(&mut self) {
        self.ball = SERVE_POSITION;
        self.velocity = Point::default();
    }

    fn launch_ball(&mut self) {
        self.velocity = LAUNCH_VELOCITY;
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn step(&mut self, dt: Duration) {
        if self.paused {
            return;
        }
        let dt = dt.as_secs_f32();
        let prev = self.ball;
        self.ball.x += self.velocity.x * dt;
        self.ball.y += self.velocity.y * dt;

        if self.ball.x <= -1.0 || self.ball.x >= 1.0 {
            self.ball.x = self.ball.x.clamp(-1.0, 1.0);
            self.velocity.x = -self.velocity.x;
        }
        if self.ball.y >= ARENA_HEIGHT {
            self.ball.y = ARENA_HEIGHT;
            self.velocity.y = -self.velocity.y.abs();
        }

        // Paddle bounce only when crossing the line from above
        let crossing = prev.y >= PADDLE_LINE && self.ball.y < PADDLE_LINE;
        if crossing && (self.ball.x - self.paddle_x).abs() <= PADDLE_HALF_WIDTH {
            self.ball.y = PADDLE_LINE;
            self.velocity.y = self.velocity.y.abs();
        }
    }
}

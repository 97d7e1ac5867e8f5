//! Bridges the session to the physics engine
//!
//! Each frame forwards the active paddle target and reports whether the
//! ball got past the paddle.

use std::time::Duration;

use tracing::debug;

use super::paddle::PaddleTarget;
use super::physics::PhysicsEngine;

/// Result of forwarding one physics frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Ball still in play
    InPlay,
    /// Ball crossed the paddle line
    Lost,
}

/// Per-frame adapter between the controller and a [`PhysicsEngine`]
pub struct GameLoop<P> {
    engine: P,
    target: PaddleTarget,
}

impl<P: PhysicsEngine> GameLoop<P> {
    pub fn new(engine: P) -> Self {
        Self {
            engine,
            target: PaddleTarget::CENTER,
        }
    }

    /// Latest target the paddle is steering toward
    #[cfg(test)]
    pub fn target(&self) -> PaddleTarget {
        self.target
    }

    /// Record a new paddle target; applied on the next frame
    pub fn set_target(&mut self, target: PaddleTarget) {
        self.target = target;
    }

    /// Forward one frame: move the paddle, step, then check for a loss
    pub fn frame(&mut self, dt: Duration) -> FrameOutcome {
        self.engine.move_paddle(self.target.value());
        self.engine.step(dt);

        let ball = self.engine.ball_position();
        if ball.y < self.engine.paddle_line() {
            debug!(x = ball.x, y = ball.y, "ball crossed paddle line");
            FrameOutcome::Lost
        } else {
            FrameOutcome::InPlay
        }
    }

    /// Put the ball back at its serve position and unfreeze the simulation
    pub fn reset_round(&mut self) {
        self.engine.reset_ball();
        self.engine.set_paused(false);
    }

    /// Serve the ball
    pub fn launch(&mut self) {
        self.engine.launch_ball();
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.engine.set_paused(paused);
    }

    #[cfg(test)]
    pub fn engine(&self) -> &P {
        &self.engine
    }

    #[cfg(test)]
    pub fn engine_mut(&mut self) -> &mut P {
        &mut self.engine
    }
}

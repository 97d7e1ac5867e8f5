//! Game module: paddle targets, the physics seam, and the per-frame adapter

mod loop_adapter;
mod paddle;
mod physics;

pub use loop_adapter::{FrameOutcome, GameLoop};
pub use paddle::PaddleTarget;
pub use physics::{ArenaSim, PhysicsEngine, Point};

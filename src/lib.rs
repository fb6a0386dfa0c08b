//! Twinstick Arena - deterministic simulation core for a top-down
//! multiplayer arena shooter
//!
//! Core modules:
//! - `sim`: Fixed-timestep simulation (particle pools, collision grid,
//!   ships, walls, power-ups)
//! - `render`: Snapshot types a presentation layer turns into draw calls
//!
//! The crate owns no window, GPU, or input device. A frontend feeds the
//! latest controller state in, calls [`sim::ArenaState::update`] once per
//! tick, and reads render snapshots back out.

pub mod render;
pub mod sim;

pub use render::{QuadInstance, collect_quads};
pub use sim::{ArenaState, Frames, PadSnapshot};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Playable world rectangle, centered on the origin.
    pub const WORLD_WIDTH: f32 = 340.0;
    pub const WORLD_HEIGHT: f32 = 180.0;

    /// Particles flagged to die off-screen are culled past these bounds,
    /// a comfortable margin outside the world rectangle.
    pub const OFFSCREEN_HALF_WIDTH: f32 = 250.0;
    pub const OFFSCREEN_HALF_HEIGHT: f32 = 150.0;

    /// Slots per particle layer (shots, explosions, background).
    pub const LAYER_CAPACITY: usize = 1000;

    /// Collision grid cell edge length, in world units.
    pub const GRID_CELL_SIZE: f32 = 10.0;

    /// Pre-allocated controller slots.
    pub const MAX_PLAYERS: usize = 4;
    pub const MAX_POWERUPS: usize = 2;

    /// First score to reach this wins the match.
    pub const WIN_SCORE: u32 = 5;
}

/// Half extents of the world rectangle.
#[inline]
pub fn world_half_extents() -> Vec2 {
    Vec2::new(consts::WORLD_WIDTH / 2.0, consts::WORLD_HEIGHT / 2.0)
}

/// Clamp a position into the playable world rectangle.
#[inline]
pub fn clamp_to_world(pos: Vec2) -> Vec2 {
    let half = world_half_extents();
    pos.clamp(-half, half)
}

/// True if a position lies outside the playable world rectangle.
#[inline]
pub fn outside_world(pos: Vec2) -> bool {
    let half = world_half_extents();
    pos.x.abs() > half.x || pos.y.abs() > half.y
}

//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only, expressed in frame units
//! - Seeded RNG only, owned by the arena state
//! - Stable iteration order (pool slot / player slot)
//! - No rendering or platform dependencies

pub mod arena;
pub mod background;
pub mod color;
pub mod grid;
pub mod pad;
pub mod particle;
pub mod pool;
pub mod powerup;
pub mod ship;
pub mod time;
pub mod wall;

pub use arena::ArenaState;
pub use background::Background;
pub use color::Color;
pub use grid::CollisionGrid;
pub use pad::{Button, GamePad, PadSnapshot};
pub use particle::{FADE_DELTA, FADE_FRAMES, Particle, ParticleKind};
pub use pool::ParticlePool;
pub use powerup::PowerUp;
pub use ship::{BULLET_SPEED, RESPAWN_FRAMES, SHIP_RADIUS, Ship, ShipDowned, Weapon};
pub use time::{FRAMES_PER_SECOND, Frames};
pub use wall::WallSegment;

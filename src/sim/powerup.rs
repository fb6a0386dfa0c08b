//! Weapon power-ups
//!
//! A fixed handful of pickups cycle around the map: count down, appear at
//! a clear spot with a flourish, sparkle until an active ship wanders
//! close, hand over a random special weapon, and start counting again.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::color::Color;
use super::pool::ParticlePool;
use super::ship::Ship;
use super::time::{FRAMES_PER_SECOND, Frames};
use super::wall::WallSegment;
use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};

/// Base frames between a pickup being taken and reappearing.
const RESPAWN_FRAMES: f32 = 3.0 * FRAMES_PER_SECOND;
/// Extra random delay on top of the base.
const RESPAWN_VARIANCE: f32 = 3.0 * FRAMES_PER_SECOND;
/// Ships this close grab the pickup.
const PICKUP_RADIUS_SQUARED: f32 = 5.0 * 5.0;
/// Placement attempts before giving up for a second.
const PLACEMENT_TRIES: u32 = 10;
/// Keep placements out of the outermost strip of the map.
const PLACEMENT_MARGIN: f32 = 0.45;
/// Never appear this close to an active ship.
const MIN_SHIP_DISTANCE_SQUARED: f32 = 10.0 * 10.0;

const ANNOUNCE_BURST_COUNT: usize = 50;

pub struct PowerUp {
    pub pos: Vec2,
    /// Drives the render spin and alpha pulse.
    pub rotation: f32,
    respawn_timer: Frames,
}

impl Default for PowerUp {
    fn default() -> Self {
        PowerUp {
            pos: Vec2::ZERO,
            rotation: 0.0,
            respawn_timer: Frames::new(RESPAWN_FRAMES),
        }
    }
}

impl PowerUp {
    pub fn is_spawned(&self) -> bool {
        self.respawn_timer.expired()
    }

    pub fn update(
        &mut self,
        dt: Frames,
        ships: &mut [Ship],
        walls: &[WallSegment],
        explosions: &mut ParticlePool,
        rng: &mut Pcg32,
    ) {
        if !self.respawn_timer.expired() {
            self.respawn_timer -= dt;
            if self.respawn_timer.expired() {
                self.respawn_timer = Frames::ZERO;
                self.pick_new_location(ships, walls, rng);
                if self.respawn_timer.expired() {
                    // Found a spot: announce it.
                    explosions.ring_burst(
                        self.pos,
                        Color::WHITE,
                        1.0,
                        1.0,
                        ANNOUNCE_BURST_COUNT,
                        rng,
                    );
                }
            }
        }

        self.rotation += dt.get();

        if self.is_spawned() {
            // A one-particle sparkle per tick keeps the pickup visible.
            explosions.ring_burst(self.pos, Color::WHITE, 0.05, 0.25, 1, rng);

            for ship in ships.iter_mut() {
                if ship.active
                    && ship.is_spawned()
                    && self.pos.distance_squared(ship.pos) < PICKUP_RADIUS_SQUARED
                {
                    ship.give_random_weapon(explosions, rng);
                    self.respawn_timer =
                        Frames::new(rng.random_range(RESPAWN_FRAMES..=RESPAWN_FRAMES + RESPAWN_VARIANCE));
                    break;
                }
            }
        }
    }

    /// Roll a location inside the inner map, rejecting spots inside a
    /// wall or on top of an active ship. If every try fails, stay down
    /// and retry in a second.
    fn pick_new_location(&mut self, ships: &[Ship], walls: &[WallSegment], rng: &mut Pcg32) {
        for _ in 0..PLACEMENT_TRIES {
            let candidate = Vec2::new(
                rng.random_range(-WORLD_WIDTH * PLACEMENT_MARGIN..=WORLD_WIDTH * PLACEMENT_MARGIN),
                rng.random_range(
                    -WORLD_HEIGHT * PLACEMENT_MARGIN..=WORLD_HEIGHT * PLACEMENT_MARGIN,
                ),
            );
            let in_wall = walls.iter().any(|w| w.contains(candidate));
            let near_ship = ships.iter().any(|s| {
                s.active && candidate.distance_squared(s.pos) < MIN_SHIP_DISTANCE_SQUARED
            });
            if !in_wall && !near_ship {
                self.pos = candidate;
                return;
            }
        }
        self.respawn_timer = Frames::from_secs(1.0);
    }
}

//! Arena simulation driver
//!
//! Owns every subsystem and advances them once per tick in a fixed order:
//! background, explosion physics, shot physics, active ships, walls,
//! power-ups, and finally the controller frame-advance. The order is
//! load-bearing - button edges are detected against the previous tick's
//! latched state, so pads must advance only after every ship has read
//! them.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::background::Background;
use super::color::Color;
use super::pad::{Button, GamePad, PadSnapshot};
use super::pool::ParticlePool;
use super::powerup::PowerUp;
use super::ship::Ship;
use super::time::{FRAMES_PER_SECOND, Frames};
use super::wall::WallSegment;
use crate::consts::{
    LAYER_CAPACITY, MAX_PLAYERS, MAX_POWERUPS, WIN_SCORE, WORLD_HEIGHT, WORLD_WIDTH,
};

/// Fixed identity color per controller slot.
const PLAYER_COLORS: [Color; MAX_PLAYERS] = [
    Color::from_rgba8(255, 0, 0, 255),
    Color::from_rgba8(0, 255, 0, 255),
    Color::from_rgba8(255, 255, 0, 255),
    Color::from_rgba8(0, 0, 255, 255),
];

/// Y-button backdrop tint duration.
const TINT_FRAMES: f32 = 3.0 * FRAMES_PER_SECOND;
/// Victory flash: fade-in and hold durations.
const WIN_FLASH_FRAMES: f32 = 1.5 * FRAMES_PER_SECOND;
const WIN_HOLD_FRAMES: f32 = 4.0 * FRAMES_PER_SECOND;

/// The whole simulation. Explicitly constructed and passed around; there
/// is no global instance.
pub struct ArenaState {
    pub seed: u64,
    rng: Pcg32,
    background: Background,
    explosions: ParticlePool,
    shots: ParticlePool,
    ships: [Ship; MAX_PLAYERS],
    pads: [GamePad; MAX_PLAYERS],
    walls: Vec<WallSegment>,
    powerups: [PowerUp; MAX_POWERUPS],
    wall_scratch: Vec<u16>,
}

impl ArenaState {
    pub fn new(seed: u64) -> Self {
        ArenaState {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            background: Background::default(),
            explosions: ParticlePool::new(LAYER_CAPACITY, false),
            // Shots carry the collision grid; everything that can hurt a
            // ship lives here.
            shots: ParticlePool::new(LAYER_CAPACITY, true),
            ships: std::array::from_fn(|i| Ship::new(i, PLAYER_COLORS[i])),
            pads: [GamePad::default(); MAX_PLAYERS],
            walls: build_map(),
            powerups: std::array::from_fn(|_| PowerUp::default()),
            wall_scratch: Vec::new(),
        }
    }

    /// Advance the simulation by a frame delta (elapsed time normalized
    /// to the nominal 60 Hz rate).
    pub fn update(&mut self, dt: Frames) {
        {
            let Self {
                background,
                explosions,
                shots,
                rng,
                ..
            } = self;
            background.update(dt, rng);
            explosions.update(dt);
            shots.update_with_effects(dt, explosions, rng);
        }

        for i in 0..MAX_PLAYERS {
            let downed = {
                let Self {
                    ships,
                    pads,
                    shots,
                    explosions,
                    background,
                    rng,
                    ..
                } = self;
                let ship = &mut ships[i];
                if !ship.active {
                    continue;
                }
                if pads[i].was_pressed(Button::Y) {
                    background.transition_to(ship.color, Frames::new(TINT_FRAMES));
                }
                ship.update(&pads[i], dt, shots, explosions, rng)
            };
            if let Some(downed) = downed
                && let Some(killer) = downed.credit
            {
                self.score_point(killer);
            }
        }

        {
            let Self {
                walls,
                ships,
                shots,
                explosions,
                rng,
                wall_scratch,
                ..
            } = self;
            for wall in walls.iter() {
                wall.resolve_shots(shots, explosions, rng, wall_scratch);
                wall.push_out_ships(&mut ships[..]);
            }
        }

        {
            let Self {
                powerups,
                ships,
                walls,
                explosions,
                rng,
                ..
            } = self;
            for powerup in powerups.iter_mut() {
                powerup.update(dt, &mut ships[..], walls, explosions, rng);
            }
        }

        // Last, so press/release edges survive until every ship has seen
        // them this tick.
        for pad in self.pads.iter_mut() {
            pad.advance_frame();
        }
    }

    /// Convenience wrapper converting an elapsed wall-clock interval.
    pub fn update_secs(&mut self, elapsed_secs: f32) {
        self.update(Frames::from_secs(elapsed_secs));
    }

    /// Latch fresh controller state for a slot, activating its ship.
    /// May be called any number of times between ticks; only the newest
    /// snapshot is read.
    pub fn handle_pad_input(&mut self, slot: usize, snapshot: PadSnapshot) {
        if slot >= MAX_PLAYERS {
            log::warn!("ignoring input for out-of-range pad slot {slot}");
            return;
        }
        self.ships[slot].active = true;
        self.pads[slot].latch(snapshot);
    }

    /// Remember which physical device feeds a slot, for disconnects.
    pub fn connect_device(&mut self, slot: usize, device_id: u32) {
        if slot >= MAX_PLAYERS {
            return;
        }
        log::info!("device {device_id} bound to player {slot}");
        self.pads[slot].bind_device(device_id);
        self.ships[slot].active = true;
    }

    /// A device went away: its ship goes inactive but keeps its slot.
    pub fn disconnect_device(&mut self, device_id: u32) {
        for (i, pad) in self.pads.iter_mut().enumerate() {
            if pad.device() == Some(device_id) {
                log::info!("device {device_id} removed, deactivating player {i}");
                pad.unbind();
                self.ships[i].deactivate();
            }
        }
    }

    /// Credit a kill. Reaching the winning score ends the match: every
    /// other active ship is blown up into a long respawn, scores reset,
    /// and the backdrop flashes the winner's color.
    pub fn score_point(&mut self, killer: usize) {
        if killer >= MAX_PLAYERS || !self.ships[killer].active {
            return;
        }
        self.ships[killer].score += 1;
        if self.ships[killer].score < WIN_SCORE {
            return;
        }

        log::info!("match over: player {killer} reached {WIN_SCORE} points");
        let winner_color = self.ships[killer].color;
        {
            let Self {
                ships,
                explosions,
                rng,
                ..
            } = self;
            for (i, ship) in ships.iter_mut().enumerate() {
                if i != killer && ship.active {
                    ship.explode_for_match_end(explosions, rng);
                }
            }
            ships[killer].score = 0;
        }
        self.background.flash(
            winner_color,
            Frames::new(WIN_FLASH_FRAMES),
            Frames::new(WIN_HOLD_FRAMES),
        );
    }

    pub fn active_player_count(&self) -> usize {
        self.ships.iter().filter(|s| s.active).count()
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn explosions(&self) -> &ParticlePool {
        &self.explosions
    }

    pub fn shots(&self) -> &ParticlePool {
        &self.shots
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn walls(&self) -> &[WallSegment] {
        &self.walls
    }

    pub fn powerups(&self) -> &[PowerUp] {
        &self.powerups
    }
}

/// The fixed arena map: interior obstacles plus a wall ring just outside
/// the world rectangle so nothing escapes the playfield.
fn build_map() -> Vec<WallSegment> {
    vec![
        WallSegment::new(40.0, 80.0, 20.0, 60.0),
        WallSegment::new(-40.0, -80.0, 20.0, 60.0),
        WallSegment::new(80.0, -50.0, 20.0, 20.0),
        WallSegment::new(-80.0, 50.0, 20.0, 20.0),
        WallSegment::new(110.0, 30.0, 20.0, 20.0),
        WallSegment::new(-110.0, -30.0, 20.0, 20.0),
        WallSegment::new(0.0, 0.0, 60.0, 20.0),
        // Boundary ring.
        WallSegment::new(0.0, WORLD_HEIGHT / 2.0 + 10.0, WORLD_WIDTH + 40.0, 20.0),
        WallSegment::new(0.0, -WORLD_HEIGHT / 2.0 - 10.0, WORLD_WIDTH + 40.0, 20.0),
        WallSegment::new(WORLD_WIDTH / 2.0 + 10.0, 0.0, 20.0, WORLD_HEIGHT + 40.0),
        WallSegment::new(-WORLD_WIDTH / 2.0 - 10.0, 0.0, 20.0, WORLD_HEIGHT + 40.0),
    ]
}

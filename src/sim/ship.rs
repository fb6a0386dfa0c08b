//! Player ship actor
//!
//! One ship per controller slot, pre-allocated and never destroyed;
//! connection toggles `active`. The per-tick state machine covers the
//! respawn countdown, invincibility, stick-driven movement with drag,
//! weapon recharge and firing, and the hit check against the shot pool.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::color::Color;
use super::pad::{Button, GamePad};
use super::particle::ParticleKind;
use super::pool::ParticlePool;
use super::time::{FRAMES_PER_SECOND, Frames};
use crate::clamp_to_world;

/// Collision radius against projectiles, also the render size.
pub const SHIP_RADIUS: f32 = 5.0;
/// Base projectile speed, world units per frame.
pub const BULLET_SPEED: f32 = 2.5;
/// Frames a downed ship waits before respawning.
pub const RESPAWN_FRAMES: f32 = 2.0 * FRAMES_PER_SECOND;

const MOVE_SPEED: f32 = 1.0;
const DRAG: f32 = 0.95;
const MIN_SPEED: f32 = 0.05;
const DEADZONE: f32 = 0.1;
const INVINCIBILITY_FRAMES: f32 = 2.0 * FRAMES_PER_SECOND;
const MATCH_END_RESPAWN_FRAMES: f32 = 5.0 * FRAMES_PER_SECOND;
/// Respawn positions are rolled inside this half-extent square.
const RESPAWN_HALF_EXTENT: f32 = 100.0;
const DEATH_BURST_COUNT: usize = 100;

const BULLET_FUSE: f32 = 500.0;
const BULLET_SIZE: f32 = 0.75;
const BULLET_ASPECT: f32 = 3.0;
/// Bullets start this many velocity steps ahead of the ship so a fresh
/// shot cannot clip its own hull.
const BULLET_OFFSET_STEPS: f32 = 3.0;
const ROCKET_SPEED: f32 = 2.0;
const ROCKET_SIZE: f32 = 2.0;
const ROCKET_ASPECT: f32 = 2.0;

const RECHARGE_BASE: f32 = 0.25 * FRAMES_PER_SECOND;
const RECHARGE_MACHINE: f32 = 2.0;
const RECHARGE_SHOT: f32 = 1.0 * FRAMES_PER_SECOND;
const RECHARGE_ARROW: f32 = 0.5 * FRAMES_PER_SECOND;
const RECHARGE_SCATTER: f32 = 8.0;
const RECHARGE_ROCKET: f32 = 0.75 * FRAMES_PER_SECOND;

/// The active weapon; every non-base weapon comes from a power-up and is
/// lost on respawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Weapon {
    #[default]
    Base,
    Machine,
    Shot,
    Arrow,
    Scatter,
    Rocket,
}

impl Weapon {
    /// A uniformly random non-base weapon, for power-up pickups.
    pub fn random_special(rng: &mut Pcg32) -> Weapon {
        match rng.random_range(0..5) {
            0 => Weapon::Machine,
            1 => Weapon::Shot,
            2 => Weapon::Arrow,
            3 => Weapon::Scatter,
            _ => Weapon::Rocket,
        }
    }
}

/// Raised when an enemy projectile destroys this ship.
#[derive(Debug, Clone, Copy)]
pub struct ShipDowned {
    /// Shot owner to credit with the kill, when the projectile had one.
    pub credit: Option<usize>,
}

pub struct Ship {
    pub index: usize,
    pub pos: Vec2,
    /// Displacement per nominal frame.
    pub vel: Vec2,
    /// Unit facing; persists while the stick is idle.
    pub heading: Vec2,
    /// Unit aim; falls back to `heading` when the aim stick is idle.
    pub aim: Vec2,
    pub color: Color,
    pub weapon: Weapon,
    pub score: u32,
    /// Controller connected. Inactive ships are skipped entirely.
    pub active: bool,
    respawn_timer: Frames,
    invincibility_timer: Frames,
    recharge: Frames,
    /// Two-cycle counter for the scatter weapon's alternating pattern.
    scatter_counter: u8,
}

impl Ship {
    pub fn new(index: usize, color: Color) -> Self {
        Ship {
            index,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            heading: Vec2::Y,
            aim: Vec2::Y,
            color,
            weapon: Weapon::Base,
            score: 0,
            active: false,
            // Ships spawn almost immediately once a controller connects.
            respawn_timer: Frames::new(1.0),
            invincibility_timer: Frames::ZERO,
            recharge: Frames::ZERO,
            scatter_counter: 0,
        }
    }

    /// Waiting ships are not drawn, not moved, and cannot be hit.
    pub fn is_spawned(&self) -> bool {
        self.respawn_timer.expired()
    }

    pub fn is_invincible(&self) -> bool {
        !self.invincibility_timer.expired()
    }

    /// Invincibility frames remaining, for the render blink.
    pub fn invincibility_left(&self) -> Frames {
        self.invincibility_timer
    }

    /// Advance one tick. Returns the kill event when an enemy projectile
    /// downed this ship.
    pub fn update(
        &mut self,
        pad: &GamePad,
        dt: Frames,
        shots: &mut ParticlePool,
        explosions: &mut ParticlePool,
        rng: &mut Pcg32,
    ) -> Option<ShipDowned> {
        if !self.respawn_timer.expired() {
            self.respawn_timer -= dt;
            if self.respawn_timer.expired() {
                self.respawn_timer = Frames::ZERO;
                self.spawn_at_random(explosions, rng);
            } else {
                return None;
            }
        }

        self.invincibility_timer = (self.invincibility_timer - dt).floor_zero();
        self.recharge -= dt;

        self.integrate_movement(pad, dt, explosions, rng);

        let aim_stick = pad.current().aim_axis;
        let aim_mag = aim_stick.length();
        if aim_mag > DEADZONE {
            self.aim = aim_stick / aim_mag;
        } else {
            // Idle aim stick: keep firing along the heading.
            self.aim = self.heading;
        }
        if (aim_mag > DEADZONE || pad.is_down(Button::A)) && self.recharge.expired() {
            self.fire(shots);
        }

        self.check_shot_collision(shots, explosions, rng)
    }

    fn spawn_at_random(&mut self, explosions: &mut ParticlePool, rng: &mut Pcg32) {
        self.pos = Vec2::new(
            rng.random_range(-RESPAWN_HALF_EXTENT..=RESPAWN_HALF_EXTENT),
            rng.random_range(-RESPAWN_HALF_EXTENT..=RESPAWN_HALF_EXTENT),
        );
        explosions.ring_burst(self.pos, self.color, 1.0, 1.0, DEATH_BURST_COUNT, rng);
        self.invincibility_timer = Frames::new(INVINCIBILITY_FRAMES);
        self.weapon = Weapon::Base;
    }

    fn integrate_movement(
        &mut self,
        pad: &GamePad,
        dt: Frames,
        explosions: &mut ParticlePool,
        rng: &mut Pcg32,
    ) {
        let stick = pad.current().move_axis;
        let mag = stick.length();
        if mag > DEADZONE {
            self.heading = stick / mag;
            // Stick magnitudes above 1 clamp to unit speed.
            self.vel = if mag > 1.0 {
                (stick / mag) * MOVE_SPEED
            } else {
                stick * MOVE_SPEED
            };
            explosions.exhaust_trail(self.pos, self.heading, self.color, 1, rng);
        }

        self.pos += self.vel * dt.get();
        self.vel *= DRAG.powf(dt.get());
        if self.vel.length() < MIN_SPEED {
            self.vel = Vec2::ZERO;
        }
        self.pos = clamp_to_world(self.pos);
    }

    fn aim_or_default(&self) -> Vec2 {
        if self.aim.length_squared() == 0.0 {
            Vec2::Y
        } else {
            self.aim
        }
    }

    fn fire(&mut self, shots: &mut ParticlePool) {
        match self.weapon {
            Weapon::Base => self.fire_volley(shots, 1, 0.0, 1.0, RECHARGE_BASE),
            Weapon::Machine => self.fire_volley(shots, 1, 0.0, 1.0, RECHARGE_MACHINE),
            Weapon::Shot => self.fire_volley(shots, 20, 20.0, 1.0, RECHARGE_SHOT),
            Weapon::Arrow => {
                self.fire_volley(shots, 2, 9.0, 0.85, RECHARGE_ARROW);
                self.fire_volley(shots, 2, 6.0, 0.90, RECHARGE_ARROW);
                self.fire_volley(shots, 2, 3.0, 0.95, RECHARGE_ARROW);
                self.fire_volley(shots, 1, 0.0, 1.0, RECHARGE_ARROW);
            }
            Weapon::Scatter => {
                self.fire_volley(shots, 1, 0.0, 1.0, RECHARGE_SCATTER);
                self.scatter_counter = (self.scatter_counter + 1) % 2;
                if self.scatter_counter == 0 {
                    self.fire_volley(shots, 2, 15.0, 0.95, RECHARGE_SCATTER);
                }
            }
            Weapon::Rocket => self.fire_rocket(shots),
        }
    }

    /// Spawn `count` bullets fanned evenly across `spread_deg`, centered
    /// on the aim direction.
    fn fire_volley(
        &mut self,
        shots: &mut ParticlePool,
        count: usize,
        spread_deg: f32,
        speed_scale: f32,
        recharge: f32,
    ) {
        self.recharge = Frames::new(recharge);
        let aim = self.aim_or_default();
        for i in 0..count {
            let angle_deg = if count > 1 {
                -spread_deg / 2.0 + i as f32 * spread_deg / (count as f32 - 1.0)
            } else {
                0.0
            };
            let dir = Vec2::from_angle(angle_deg.to_radians()).rotate(aim);
            if let Some(p) = shots.spawn(Frames::new(BULLET_FUSE)) {
                p.vel = dir * BULLET_SPEED * speed_scale;
                p.pos = self.pos + p.vel * BULLET_OFFSET_STEPS;
                p.color = self.color;
                p.alpha = 1.0;
                p.size = BULLET_SIZE;
                p.aspect = BULLET_ASPECT;
                p.rotate_to_heading = true;
                p.owner = Some(self.index);
            }
        }
    }

    fn fire_rocket(&mut self, shots: &mut ParticlePool) {
        self.recharge = Frames::new(RECHARGE_ROCKET);
        let aim = self.aim_or_default();
        if let Some(p) = shots.spawn(Frames::new(BULLET_FUSE)) {
            p.kind = ParticleKind::Rocket;
            p.vel = aim * ROCKET_SPEED;
            p.pos = self.pos + p.vel * BULLET_OFFSET_STEPS;
            p.color = self.color;
            p.alpha = 1.0;
            p.size = ROCKET_SIZE;
            p.aspect = ROCKET_ASPECT;
            p.rotate_to_heading = true;
            p.owner = Some(self.index);
        }
    }

    /// Look for an overlapping enemy projectile. Own shots never hit; an
    /// enemy shot detonates on contact even against an invincible ship,
    /// but only a vulnerable ship goes down.
    fn check_shot_collision(
        &mut self,
        shots: &mut ParticlePool,
        explosions: &mut ParticlePool,
        rng: &mut Pcg32,
    ) -> Option<ShipDowned> {
        let slot = shots.first_in_circle(self.pos, SHIP_RADIUS)?;
        let owner = shots.get(slot).owner;
        if owner == Some(self.index) {
            return None;
        }
        shots.detonate(slot, explosions, rng);
        if self.is_invincible() {
            return None;
        }

        explosions.ring_burst(self.pos, self.color, 1.0, 1.0, DEATH_BURST_COUNT, rng);
        explosions.ring_burst(self.pos, self.color, 0.5, 2.0, DEATH_BURST_COUNT, rng);
        self.respawn_timer = Frames::new(RESPAWN_FRAMES);
        self.score = self.score.saturating_sub(1);
        Some(ShipDowned { credit: owner })
    }

    /// Power-up pickup: swap to a random special weapon with a flourish.
    pub fn give_random_weapon(&mut self, explosions: &mut ParticlePool, rng: &mut Pcg32) {
        self.weapon = Weapon::random_special(rng);
        explosions.ring_burst(self.pos, self.color, 1.0, 1.0, DEATH_BURST_COUNT, rng);
    }

    /// Losing ships go out with a bang and sit out the celebration.
    pub fn explode_for_match_end(&mut self, explosions: &mut ParticlePool, rng: &mut Pcg32) {
        explosions.ring_burst(self.pos, self.color, 1.0, 1.0, DEATH_BURST_COUNT, rng);
        explosions.ring_burst(self.pos, self.color, 0.5, 2.0, DEATH_BURST_COUNT, rng);
        self.respawn_timer = Frames::new(MATCH_END_RESPAWN_FRAMES);
        self.score = 0;
    }

    /// Controller disconnected: the ship stops updating but keeps its
    /// slot and state.
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::pad::PadSnapshot;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    fn pools() -> (ParticlePool, ParticlePool) {
        (ParticlePool::new(1000, true), ParticlePool::new(1000, false))
    }

    /// Tick a fresh ship once so the initial 1-frame respawn elapses.
    fn spawned_ship(
        shots: &mut ParticlePool,
        explosions: &mut ParticlePool,
        rng: &mut Pcg32,
    ) -> Ship {
        let mut ship = Ship::new(0, Color::WHITE);
        ship.active = true;
        let pad = GamePad::default();
        ship.update(&pad, Frames::new(1.0), shots, explosions, rng);
        assert!(ship.is_spawned());
        ship
    }

    fn aim_pad(aim: Vec2) -> GamePad {
        let mut pad = GamePad::default();
        pad.latch(PadSnapshot {
            aim_axis: aim,
            ..Default::default()
        });
        pad
    }

    #[test]
    fn test_respawn_after_one_frame() {
        let (mut shots, mut explosions) = pools();
        let mut rng = rng();
        let mut ship = Ship::new(0, Color::WHITE);
        ship.active = true;
        assert!(!ship.is_spawned());

        let pad = GamePad::default();
        ship.update(&pad, Frames::new(1.0), &mut shots, &mut explosions, &mut rng);
        assert!(ship.is_spawned());
        assert!(ship.is_invincible());
        assert!(ship.pos.x.abs() <= 100.0 && ship.pos.y.abs() <= 100.0);
        assert_eq!(ship.weapon, Weapon::Base);
        // The spawn flourish went into the explosion layer.
        assert!(explosions.active_count() > 0);
    }

    #[test]
    fn test_base_gun_fires_one_bullet_then_recharges() {
        let (mut shots, mut explosions) = pools();
        let mut rng = rng();
        let mut ship = spawned_ship(&mut shots, &mut explosions, &mut rng);
        ship.pos = Vec2::ZERO;

        let pad = aim_pad(Vec2::new(1.0, 0.0));
        ship.update(&pad, Frames::new(1.0), &mut shots, &mut explosions, &mut rng);
        assert_eq!(shots.active_count(), 1);
        let bullet = shots.iter_active().next().unwrap();
        assert!((bullet.vel.length() - BULLET_SPEED).abs() < 1e-4);
        assert_eq!(bullet.owner, Some(0));
        assert!(!ship.recharge.expired());

        // Recharge has not elapsed: no second bullet.
        ship.update(&pad, Frames::new(1.0), &mut shots, &mut explosions, &mut rng);
        assert_eq!(shots.active_count(), 1);
    }

    #[test]
    fn test_fire_button_uses_heading_when_aim_idle() {
        let (mut shots, mut explosions) = pools();
        let mut rng = rng();
        let mut ship = spawned_ship(&mut shots, &mut explosions, &mut rng);
        ship.heading = Vec2::new(-1.0, 0.0);

        let mut pad = GamePad::default();
        let mut snap = PadSnapshot::default();
        snap.buttons[Button::A as usize] = true;
        pad.latch(snap);

        ship.update(&pad, Frames::new(1.0), &mut shots, &mut explosions, &mut rng);
        assert_eq!(shots.active_count(), 1);
        let bullet = shots.iter_active().next().unwrap();
        assert!(bullet.vel.x < 0.0 && bullet.vel.y.abs() < 1e-4);
    }

    #[test]
    fn test_shotgun_spread() {
        let (mut shots, mut explosions) = pools();
        let mut rng = rng();
        let mut ship = spawned_ship(&mut shots, &mut explosions, &mut rng);
        ship.weapon = Weapon::Shot;

        let pad = aim_pad(Vec2::new(0.0, 1.0));
        ship.update(&pad, Frames::new(1.0), &mut shots, &mut explosions, &mut rng);
        assert_eq!(shots.active_count(), 20);
        // Spread is centered on the aim: symmetric extremes around +y.
        let max_x = shots
            .iter_active()
            .map(|p| p.vel.x)
            .fold(f32::MIN, f32::max);
        let min_x = shots
            .iter_active()
            .map(|p| p.vel.x)
            .fold(f32::MAX, f32::min);
        assert!((max_x + min_x).abs() < 1e-3);
        assert!(max_x > 0.0);
    }

    #[test]
    fn test_scatter_alternates_side_shots() {
        let (mut shots, mut explosions) = pools();
        let mut rng = rng();
        let mut ship = spawned_ship(&mut shots, &mut explosions, &mut rng);
        ship.weapon = Weapon::Scatter;
        ship.pos = Vec2::ZERO;

        let pad = aim_pad(Vec2::new(1.0, 0.0));
        ship.update(&pad, Frames::new(1.0), &mut shots, &mut explosions, &mut rng);
        assert_eq!(shots.active_count(), 1);

        ship.recharge = Frames::ZERO;
        ship.update(&pad, Frames::new(1.0), &mut shots, &mut explosions, &mut rng);
        assert_eq!(shots.active_count(), 4, "second trigger adds side shots");
    }

    #[test]
    fn test_rocket_weapon_spawns_rocket() {
        let (mut shots, mut explosions) = pools();
        let mut rng = rng();
        let mut ship = spawned_ship(&mut shots, &mut explosions, &mut rng);
        ship.weapon = Weapon::Rocket;

        let pad = aim_pad(Vec2::new(0.0, 1.0));
        ship.update(&pad, Frames::new(1.0), &mut shots, &mut explosions, &mut rng);
        assert_eq!(shots.active_count(), 1);
        let rocket = shots.iter_active().next().unwrap();
        assert_eq!(rocket.kind, ParticleKind::Rocket);
        assert_eq!(rocket.owner, Some(0));
    }

    #[test]
    fn test_own_shot_does_not_hit() {
        let (mut shots, mut explosions) = pools();
        let mut rng = rng();
        let mut ship = spawned_ship(&mut shots, &mut explosions, &mut rng);
        ship.pos = Vec2::ZERO;
        ship.invincibility_timer = Frames::ZERO;

        {
            let p = shots.spawn(Frames::new(100.0)).unwrap();
            p.pos = Vec2::new(1.0, 0.0);
            p.owner = Some(0);
        }
        shots.update(Frames::ZERO);

        let pad = GamePad::default();
        let event = ship.update(&pad, Frames::new(1.0), &mut shots, &mut explosions, &mut rng);
        assert!(event.is_none());
        assert_eq!(shots.active_count(), 1, "own bullet passes through");
        assert!(ship.is_spawned());
    }

    #[test]
    fn test_enemy_shot_downs_ship() {
        let (mut shots, mut explosions) = pools();
        let mut rng = rng();
        let mut ship = spawned_ship(&mut shots, &mut explosions, &mut rng);
        ship.pos = Vec2::ZERO;
        ship.invincibility_timer = Frames::ZERO;
        ship.score = 2;

        {
            let p = shots.spawn(Frames::new(100.0)).unwrap();
            p.pos = Vec2::new(1.0, 0.0);
            p.owner = Some(3);
        }
        shots.update(Frames::ZERO);

        let pad = GamePad::default();
        let event = ship.update(&pad, Frames::new(1.0), &mut shots, &mut explosions, &mut rng);
        let downed = event.expect("enemy shot should down the ship");
        assert_eq!(downed.credit, Some(3));
        assert!(!ship.is_spawned());
        assert_eq!(ship.score, 1, "victim loses a point");
        // The bullet detonated into smoke.
        assert!(explosions.active_count() > 0);
    }

    #[test]
    fn test_invincible_ship_pops_shot_without_dying() {
        let (mut shots, mut explosions) = pools();
        let mut rng = rng();
        let mut ship = spawned_ship(&mut shots, &mut explosions, &mut rng);
        ship.pos = Vec2::ZERO;
        assert!(ship.is_invincible());

        {
            let p = shots.spawn(Frames::new(100.0)).unwrap();
            p.pos = Vec2::new(1.0, 0.0);
            p.owner = Some(2);
        }
        shots.update(Frames::ZERO);

        let pad = GamePad::default();
        let event = ship.update(&pad, Frames::new(1.0), &mut shots, &mut explosions, &mut rng);
        assert!(event.is_none());
        assert!(ship.is_spawned());
        assert_eq!(shots.active_count(), 0, "shot detonates on the shield");
    }

    #[test]
    fn test_movement_drag_and_snap() {
        let (mut shots, mut explosions) = pools();
        let mut rng = rng();
        let mut ship = spawned_ship(&mut shots, &mut explosions, &mut rng);
        ship.pos = Vec2::ZERO;

        let mut pad = GamePad::default();
        pad.latch(PadSnapshot {
            move_axis: Vec2::new(1.0, 0.0),
            ..Default::default()
        });
        ship.update(&pad, Frames::new(1.0), &mut shots, &mut explosions, &mut rng);
        assert!(ship.pos.x > 0.0);
        assert_eq!(ship.heading, Vec2::new(1.0, 0.0));

        // Release the stick: drag decays the velocity to a stop.
        pad.latch(PadSnapshot::default());
        for _ in 0..100 {
            ship.update(&pad, Frames::new(1.0), &mut shots, &mut explosions, &mut rng);
        }
        assert_eq!(ship.vel, Vec2::ZERO);
        assert_eq!(ship.heading, Vec2::new(1.0, 0.0), "heading persists at rest");
    }

    #[test]
    fn test_overdriven_stick_clamps_to_unit_speed() {
        let (mut shots, mut explosions) = pools();
        let mut rng = rng();
        let mut ship = spawned_ship(&mut shots, &mut explosions, &mut rng);

        let mut pad = GamePad::default();
        pad.latch(PadSnapshot {
            move_axis: Vec2::new(3.0, 4.0),
            ..Default::default()
        });
        ship.update(&pad, Frames::new(1.0), &mut shots, &mut explosions, &mut rng);
        // Velocity right after integration carries one frame of drag.
        assert!(ship.vel.length() <= MOVE_SPEED);
    }
}

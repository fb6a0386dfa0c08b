//! Fixed-capacity particle pool
//!
//! All particles live in a preallocated slot array; spawning recycles the
//! first inactive slot after a rotating cursor, so a freshly freed slot is
//! not immediately reused while stale grid entries may still point at it.
//! A full pool drops the spawn request silently - losing a cosmetic
//! particle is acceptable degradation, never an error.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::color::Color;
use super::grid::CollisionGrid;
use super::particle::{Particle, ParticleKind};
use super::time::Frames;
use crate::consts::{GRID_CELL_SIZE, WORLD_HEIGHT, WORLD_WIDTH};
use crate::{clamp_to_world, outside_world};

// Ring burst: cosmetic radial puff, used for respawns, deaths, pickups.
const RING_BURST_SPEED_SCALE: f32 = 1.5;
const RING_BURST_MIN_FUSE: f32 = 15.0;
const RING_BURST_MAX_FUSE: f32 = 45.0;
const RING_BURST_MIN_SIZE: f32 = 0.5;
const RING_BURST_MAX_SIZE: f32 = 2.0;
const RING_BURST_MAX_ALPHA: f32 = 0.25;

// Smoke: the small puff a normal projectile leaves when it detonates.
const SMOKE_COUNT: usize = 5;
const SMOKE_SPEED_SCALE: f32 = 1.5;
const SMOKE_MIN_SPEED: f32 = 0.1;
const SMOKE_MAX_SPEED: f32 = 0.5;
const SMOKE_MIN_FUSE: f32 = 10.0;
const SMOKE_MAX_FUSE: f32 = 20.0;
const SMOKE_MIN_SIZE: f32 = 0.5;
const SMOKE_MAX_SIZE: f32 = 2.0;
const SMOKE_MAX_ALPHA: f32 = 0.25;

// Shrapnel: the hazardous burst a rocket detonates into.
const SHRAPNEL_COUNT: usize = 100;
const SHRAPNEL_MIN_SPEED: f32 = 0.5;
const SHRAPNEL_MAX_SPEED: f32 = 1.5;
const SHRAPNEL_MIN_FUSE: i32 = 5;
const SHRAPNEL_MAX_FUSE: i32 = 45;
const SHRAPNEL_SIZE: f32 = 0.75;
const SHRAPNEL_ASPECT: f32 = 3.0;
const SHRAPNEL_OFFSET_STEPS: f32 = 3.0;

// Exhaust: trail particles behind rockets and moving ships.
const EXHAUST_SOURCE_VELOCITY_SCALE: f32 = -0.5;
const EXHAUST_VELOCITY_VARIANCE: f32 = 0.1;
const EXHAUST_SOURCE_OFFSET_STEPS: f32 = 2.0;
const EXHAUST_MIN_FUSE: f32 = 15.0;
const EXHAUST_MAX_FUSE: f32 = 60.0;
const EXHAUST_MIN_SIZE: f32 = 1.0;
const EXHAUST_MAX_SIZE: f32 = 2.0;
const EXHAUST_MAX_ALPHA: f32 = 0.25;

/// Random unit direction for a burst. Samples the unit square and
/// normalizes; a zero-length sample substitutes +x rather than dividing
/// by zero.
fn burst_direction(rng: &mut Pcg32) -> Vec2 {
    let v = Vec2::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0));
    let mag = v.length();
    if mag == 0.0 { Vec2::X } else { v / mag }
}

/// A rocket detonation recorded mid-sweep; the shrapnel burst is spawned
/// after the sweep so newly spawned particles are not advanced twice.
struct Impact {
    pos: Vec2,
    color: Color,
    owner: Option<usize>,
}

/// Fixed-capacity pool of particles, optionally backed by a collision
/// grid for broad-phase queries.
pub struct ParticlePool {
    slots: Box<[Particle]>,
    last_open: usize,
    grid: Option<CollisionGrid>,
    impacts: Vec<Impact>,
}

impl ParticlePool {
    /// A pool with `capacity` slots. Pass `with_grid` for layers whose
    /// particles are queried for collisions (shots); purely cosmetic
    /// layers skip the rebuild cost.
    pub fn new(capacity: usize, with_grid: bool) -> Self {
        ParticlePool {
            slots: vec![Particle::default(); capacity].into_boxed_slice(),
            last_open: 0,
            grid: with_grid
                .then(|| CollisionGrid::new(WORLD_WIDTH, WORLD_HEIGHT, GRID_CELL_SIZE)),
            impacts: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|p| p.is_active()).count()
    }

    pub fn get(&self, slot: u16) -> &Particle {
        &self.slots[slot as usize]
    }

    pub fn get_mut(&mut self, slot: u16) -> &mut Particle {
        &mut self.slots[slot as usize]
    }

    /// Every active particle, in slot order.
    pub fn iter_active(&self) -> impl Iterator<Item = &Particle> {
        self.slots.iter().filter(|p| p.is_active())
    }

    /// First free slot after the cursor, scanning circularly. `None` once
    /// every slot is live.
    fn next_open_slot(&mut self) -> Option<usize> {
        let len = self.slots.len();
        let mut i = (self.last_open + 1) % len;
        while i != self.last_open {
            if !self.slots[i].is_active() {
                self.last_open = i;
                return Some(i);
            }
            i = (i + 1) % len;
        }
        log::debug!("particle pool exhausted ({len} slots)");
        None
    }

    /// Claim a slot, reset it to defaults with the given fuse, and hand it
    /// back for configuration. `None` means the pool is full and the spawn
    /// is silently skipped.
    pub fn spawn(&mut self, fuse: Frames) -> Option<&mut Particle> {
        let slot = self.next_open_slot()?;
        let p = &mut self.slots[slot];
        p.reset(fuse);
        Some(p)
    }

    /// Advance every active particle and rebuild the grid. Used by layers
    /// that never hold rockets.
    pub fn update(&mut self, dt: Frames) {
        for p in self.slots.iter_mut() {
            if p.is_active() {
                p.update(dt);
            }
        }
        self.rebuild_grid();
    }

    /// Advance every active particle, running rocket side effects: one
    /// exhaust particle per rocket per tick into `explosions`, and a
    /// shrapnel detonation into this pool when a rocket reaches the world
    /// boundary.
    pub fn update_with_effects(
        &mut self,
        dt: Frames,
        explosions: &mut ParticlePool,
        rng: &mut Pcg32,
    ) {
        let mut impacts = std::mem::take(&mut self.impacts);
        for i in 0..self.slots.len() {
            let p = &mut self.slots[i];
            if !p.is_active() {
                continue;
            }
            p.update(dt);
            if p.kind == ParticleKind::Rocket && p.is_active() {
                if outside_world(p.pos) {
                    p.pos = clamp_to_world(p.pos);
                    let impact = Impact {
                        pos: p.pos,
                        color: p.color,
                        owner: p.owner,
                    };
                    p.deactivate();
                    impacts.push(impact);
                } else {
                    let (pos, vel, color) = (p.pos, p.vel, p.color);
                    explosions.exhaust_trail(pos, vel, color, 1, rng);
                }
            }
        }
        for impact in impacts.drain(..) {
            self.shrapnel_burst(impact.pos, impact.color, impact.owner, SHRAPNEL_COUNT, rng);
        }
        self.impacts = impacts;
        self.rebuild_grid();
    }

    fn rebuild_grid(&mut self) {
        let Self { grid, slots, .. } = self;
        if let Some(grid) = grid.as_mut() {
            grid.clear();
            for (i, p) in slots.iter().enumerate() {
                if p.is_active() {
                    grid.add(i as u16, p.pos);
                }
            }
        }
    }

    /// Detonate the particle in `slot`: deactivate it, then spawn its
    /// collision effect - smoke into `explosions` for normal particles, a
    /// shrapnel burst into this pool (owner attributed, still hazardous)
    /// for rockets.
    pub fn detonate(&mut self, slot: u16, explosions: &mut ParticlePool, rng: &mut Pcg32) {
        let p = &mut self.slots[slot as usize];
        if !p.is_active() {
            return;
        }
        let (pos, color, owner, kind) = (p.pos, p.color, p.owner, p.kind);
        p.deactivate();
        match kind {
            ParticleKind::Rocket => self.shrapnel_burst(pos, color, owner, SHRAPNEL_COUNT, rng),
            ParticleKind::Normal => explosions.smoke_burst(pos, color, rng),
        }
    }

    /// First active particle whose center lies within the circle, if any.
    ///
    /// Broad-phase over the grid, then an exact distance test. Returns the
    /// first candidate, not the nearest. `None` when this pool has no grid.
    pub fn first_in_circle(&mut self, center: Vec2, radius: f32) -> Option<u16> {
        let Self { grid, slots, .. } = self;
        let grid = grid.as_mut()?;
        let hits = grid.query_rect(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
        );
        let radius_squared = radius * radius;
        hits.iter().copied().find(|&slot| {
            let p = &slots[slot as usize];
            p.is_active() && p.pos.distance_squared(center) <= radius_squared
        })
    }

    /// Append the broad-phase candidate set for a centered rectangle onto
    /// `out`. The candidates are a superset; callers must do the exact
    /// containment test.
    pub fn copy_potential_hits(
        &mut self,
        center: Vec2,
        width: f32,
        height: f32,
        out: &mut Vec<u16>,
    ) {
        let Self { grid, .. } = self;
        if let Some(grid) = grid.as_mut() {
            let hits = grid.query_rect(
                center.x - width / 2.0,
                center.y - height / 2.0,
                center.x + width / 2.0,
                center.y + height / 2.0,
            );
            out.extend_from_slice(hits);
        }
    }

    /// Cosmetic radial burst of slow fading squares around a point.
    pub fn ring_burst(
        &mut self,
        center: Vec2,
        color: Color,
        min_speed: f32,
        max_speed: f32,
        count: usize,
        rng: &mut Pcg32,
    ) {
        for _ in 0..count {
            let dir = burst_direction(rng);
            let speed = rng.random_range(min_speed..=max_speed);
            let fuse = rng.random_range(RING_BURST_MIN_FUSE..=RING_BURST_MAX_FUSE);
            let size = rng.random_range(RING_BURST_MIN_SIZE..=RING_BURST_MAX_SIZE);
            if let Some(p) = self.spawn(Frames::new(fuse)) {
                p.pos = center;
                p.vel = dir * speed * RING_BURST_SPEED_SCALE;
                p.color = color;
                p.alpha = 1.0;
                p.max_alpha = RING_BURST_MAX_ALPHA;
                p.size = size;
            }
        }
    }

    /// The small smoke puff of a normal projectile detonation.
    pub fn smoke_burst(&mut self, center: Vec2, color: Color, rng: &mut Pcg32) {
        for _ in 0..SMOKE_COUNT {
            let dir = burst_direction(rng);
            let speed = rng.random_range(SMOKE_MIN_SPEED..=SMOKE_MAX_SPEED);
            let fuse = rng.random_range(SMOKE_MIN_FUSE..=SMOKE_MAX_FUSE);
            let size = rng.random_range(SMOKE_MIN_SIZE..=SMOKE_MAX_SIZE);
            if let Some(p) = self.spawn(Frames::new(fuse)) {
                p.pos = center;
                p.vel = dir * speed * SMOKE_SPEED_SCALE;
                p.color = color;
                p.alpha = 1.0;
                p.max_alpha = SMOKE_MAX_ALPHA;
                p.size = size;
            }
        }
    }

    /// Hazardous radial shrapnel. Spawned into the pool the projectiles
    /// live in, so fragments keep hitting ships; the owner is inherited
    /// for scoring attribution.
    pub fn shrapnel_burst(
        &mut self,
        center: Vec2,
        color: Color,
        owner: Option<usize>,
        count: usize,
        rng: &mut Pcg32,
    ) {
        for _ in 0..count {
            let dir = burst_direction(rng);
            let speed = rng.random_range(SHRAPNEL_MIN_SPEED..=SHRAPNEL_MAX_SPEED);
            let fuse = rng.random_range(SHRAPNEL_MIN_FUSE..=SHRAPNEL_MAX_FUSE) as f32;
            if let Some(p) = self.spawn(Frames::new(fuse)) {
                p.vel = dir * speed;
                p.pos = center + p.vel * SHRAPNEL_OFFSET_STEPS;
                p.color = color;
                p.alpha = 1.0;
                p.size = SHRAPNEL_SIZE;
                p.aspect = SHRAPNEL_ASPECT;
                p.rotate_to_heading = true;
                p.owner = owner;
            }
        }
    }

    /// Trail particles behind a moving source, drifting backwards from
    /// its direction of travel with a little randomized variance.
    pub fn exhaust_trail(
        &mut self,
        source_pos: Vec2,
        source_vel: Vec2,
        color: Color,
        count: usize,
        rng: &mut Pcg32,
    ) {
        for _ in 0..count {
            let fuse = rng.random_range(EXHAUST_MIN_FUSE..=EXHAUST_MAX_FUSE);
            let size = rng.random_range(EXHAUST_MIN_SIZE..=EXHAUST_MAX_SIZE);
            let variance = Vec2::new(
                rng.random_range(-EXHAUST_VELOCITY_VARIANCE..=EXHAUST_VELOCITY_VARIANCE),
                rng.random_range(-EXHAUST_VELOCITY_VARIANCE..=EXHAUST_VELOCITY_VARIANCE),
            );
            if let Some(p) = self.spawn(Frames::new(fuse)) {
                p.pos = source_pos - source_vel * EXHAUST_SOURCE_OFFSET_STEPS;
                p.vel = source_vel * EXHAUST_SOURCE_VELOCITY_SCALE + variance;
                p.color = color;
                p.alpha = 1.0;
                p.max_alpha = EXHAUST_MAX_ALPHA;
                p.size = size;
            }
        }
    }
}

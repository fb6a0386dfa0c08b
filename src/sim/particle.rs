//! Pooled particle entity
//!
//! One struct covers every short-lived thing in the arena: bullets,
//! shrapnel, smoke, exhaust, background squares. A particle is active
//! exactly while its fuse is positive; inactive slots are free pool
//! storage and must never be rendered or collided against.

use glam::Vec2;

use super::color::Color;
use super::time::Frames;
use crate::consts::{OFFSCREEN_HALF_HEIGHT, OFFSCREEN_HALF_WIDTH};

/// Frames spent fading in at the start of a particle's life and fading
/// out at the end (one nominal second).
pub const FADE_FRAMES: f32 = 60.0;
/// Alpha change per frame during a fade.
pub const FADE_DELTA: f32 = 1.0 / FADE_FRAMES;

/// Rockets stop accelerating once their speed squared passes this.
const ROCKET_MAX_SPEED_SQUARED: f32 = 6.0 * 6.0;
/// Per-frame velocity gain while a rocket is below max speed.
const ROCKET_ACCELERATION: f32 = 1.05;

/// Particle behavior variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticleKind {
    /// Drifts, fades, dies.
    #[default]
    Normal,
    /// Self-propelled: accelerates toward max speed, leaves an exhaust
    /// trail, and detonates into shrapnel at the world boundary.
    Rocket,
}

/// One pooled simulation entity.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub pos: Vec2,
    /// Displacement per nominal frame.
    pub vel: Vec2,
    /// Remaining lifetime; the particle is active while this is positive.
    pub fuse: Frames,
    pub size: f32,
    pub aspect: f32,
    pub color: Color,
    /// Live fade value in [0, 1], driven by the fade envelope.
    pub alpha: f32,
    /// Render-time alpha multiplier; the fade envelope is scaled by this.
    pub max_alpha: f32,
    /// Ship slot credited when this particle kills, if any.
    pub owner: Option<usize>,
    /// Cull the particle once it drifts past the off-screen margin.
    pub die_offscreen: bool,
    /// Orient the render quad along the velocity vector.
    pub rotate_to_heading: bool,
    pub kind: ParticleKind,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            fuse: Frames::ZERO,
            size: 1.0,
            aspect: 1.0,
            color: Color::WHITE,
            alpha: 0.0,
            max_alpha: 1.0,
            owner: None,
            die_offscreen: true,
            rotate_to_heading: false,
            kind: ParticleKind::Normal,
        }
    }
}

impl Particle {
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.fuse.expired()
    }

    /// Force the particle inactive, freeing its pool slot.
    #[inline]
    pub fn deactivate(&mut self) {
        self.fuse = Frames::ZERO;
    }

    /// Return the slot to defaults with a fresh fuse. Alpha starts at
    /// zero so the fade-in envelope applies; spawners that need instant
    /// visibility set it afterwards.
    pub fn reset(&mut self, fuse: Frames) {
        *self = Particle {
            fuse,
            ..Particle::default()
        };
    }

    /// Advance position, fuse, and the fade envelope by `dt` frames.
    ///
    /// Alpha rises while the remaining fuse is outside the fade window and
    /// falls once inside it, clamped to [0, 1]; a particle that lives at
    /// least two windows fades in, holds, and fades back to exactly zero
    /// as the fuse runs out.
    pub fn update(&mut self, dt: Frames) {
        self.pos += self.vel * dt.get();
        self.fuse -= dt;

        if self.fuse.get() < FADE_FRAMES {
            self.alpha -= FADE_DELTA * dt.get();
        } else {
            self.alpha += FADE_DELTA * dt.get();
        }
        self.alpha = self.alpha.clamp(0.0, 1.0);

        if self.die_offscreen
            && (self.pos.x.abs() > OFFSCREEN_HALF_WIDTH
                || self.pos.y.abs() > OFFSCREEN_HALF_HEIGHT)
        {
            self.deactivate();
        }

        if self.kind == ParticleKind::Rocket
            && self.vel.length_squared() <= ROCKET_MAX_SPEED_SQUARED
        {
            self.vel *= ROCKET_ACCELERATION.powf(dt.get());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawned(fuse: f32) -> Particle {
        let mut p = Particle::default();
        p.reset(Frames::new(fuse));
        p
    }

    #[test]
    fn test_active_iff_fuse_positive() {
        let mut p = spawned(2.0);
        assert!(p.is_active());
        p.update(Frames::new(1.0));
        assert!(p.is_active());
        p.update(Frames::new(1.0));
        assert!(!p.is_active());
    }

    #[test]
    fn test_position_integration() {
        let mut p = spawned(120.0);
        p.vel = Vec2::new(1.0, 0.0);
        for _ in 0..60 {
            p.update(Frames::new(1.0));
        }
        assert_eq!(p.pos, Vec2::new(60.0, 0.0));
        assert!(p.is_active());
        for _ in 0..120 {
            p.update(Frames::new(1.0));
        }
        assert!(!p.is_active());
    }

    #[test]
    fn test_fade_envelope() {
        // Lifetime of exactly two fade windows: rise for one, fall for one.
        let mut p = spawned(2.0 * FADE_FRAMES);
        let mut last_alpha = p.alpha;
        for _ in 0..FADE_FRAMES as u32 {
            p.update(Frames::new(1.0));
            assert!(p.alpha > last_alpha, "alpha should rise during fade-in");
            last_alpha = p.alpha;
        }
        assert!((p.alpha - 1.0).abs() < 1e-4);
        for _ in 0..FADE_FRAMES as u32 {
            p.update(Frames::new(1.0));
            assert!(p.alpha < last_alpha, "alpha should fall during fade-out");
            last_alpha = p.alpha;
        }
        assert!(p.alpha.abs() < 1e-4, "alpha reaches zero with the fuse");
        assert!(!p.is_active());
    }

    #[test]
    fn test_fade_plateau() {
        // A long-lived particle holds full alpha between the windows.
        let mut p = spawned(4.0 * FADE_FRAMES);
        for _ in 0..2 * FADE_FRAMES as u32 {
            p.update(Frames::new(1.0));
        }
        assert_eq!(p.alpha, 1.0);
    }

    #[test]
    fn test_die_offscreen() {
        let mut p = spawned(1000.0);
        p.vel = Vec2::new(10.0, 0.0);
        for _ in 0..40 {
            p.update(Frames::new(1.0));
        }
        assert!(!p.is_active(), "particle past the margin should be culled");

        let mut p = spawned(1000.0);
        p.vel = Vec2::new(10.0, 0.0);
        p.die_offscreen = false;
        for _ in 0..40 {
            p.update(Frames::new(1.0));
        }
        assert!(p.is_active());
    }

    #[test]
    fn test_rocket_accelerates_to_cap() {
        let mut p = spawned(1000.0);
        p.die_offscreen = false;
        p.kind = ParticleKind::Rocket;
        p.vel = Vec2::new(2.0, 0.0);
        let mut last_speed = p.vel.length();
        for _ in 0..30 {
            p.update(Frames::new(1.0));
            let speed = p.vel.length();
            if last_speed * last_speed <= ROCKET_MAX_SPEED_SQUARED {
                assert!(speed > last_speed);
            }
            last_speed = speed;
        }
        // One last gain is applied as the cap is crossed, never more.
        assert!(last_speed <= 6.0 * ROCKET_ACCELERATION);
    }
}

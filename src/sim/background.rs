//! Scrolling background layer
//!
//! A non-colliding particle pool of big soft squares drifting up the map,
//! all tinted with a shared background color. The color can transition
//! smoothly to a new target, optionally holding there before returning -
//! that's the match-end victory flash.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::color::Color;
use super::pool::ParticlePool;
use super::time::Frames;
use crate::consts::{LAYER_CAPACITY, WORLD_HEIGHT, WORLD_WIDTH};

const SQUARE_MIN_FUSE: f32 = 120.0;
const SQUARE_MAX_FUSE: f32 = 300.0;
const SQUARE_MIN_SIZE: f32 = 5.0;
const SQUARE_MAX_SIZE: f32 = 30.0;
const SQUARE_MIN_VELOCITY_Y: f32 = 0.5;
const SQUARE_MAX_VELOCITY_Y: f32 = 1.5;
const SQUARE_MAX_ALPHA: f32 = 0.25;
/// Squares enter below the bottom edge, up to this far down.
const SPAWN_DEPTH: f32 = 30.0;

fn default_color() -> Color {
    Color::rgb(0.0, 0.0, 0.5)
}

pub struct Background {
    pool: ParticlePool,
    current: Color,
    original: Color,
    target: Color,
    transition_total: Frames,
    transition_elapsed: Frames,
    hold_remaining: Frames,
}

impl Default for Background {
    fn default() -> Self {
        Background {
            pool: ParticlePool::new(LAYER_CAPACITY, false),
            current: default_color(),
            original: default_color(),
            target: default_color(),
            transition_total: Frames::ZERO,
            transition_elapsed: Frames::ZERO,
            hold_remaining: Frames::ZERO,
        }
    }
}

impl Background {
    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn current_color(&self) -> Color {
        self.current
    }

    /// Fade the backdrop to a new color over `duration` and stay there.
    pub fn transition_to(&mut self, target: Color, duration: Frames) {
        self.start_transition(target, duration, Frames::ZERO);
    }

    /// Fade to `target`, hold it for `hold`, then fade back to the color
    /// the backdrop had before the flash.
    pub fn flash(&mut self, target: Color, duration: Frames, hold: Frames) {
        self.start_transition(target, duration, hold);
    }

    fn start_transition(&mut self, target: Color, duration: Frames, hold: Frames) {
        self.original = self.current;
        self.target = target;
        self.transition_elapsed = Frames::ZERO;
        if duration.expired() {
            self.current = target;
            self.transition_total = Frames::ZERO;
        } else {
            self.transition_total = duration;
        }
        self.hold_remaining = hold.floor_zero();
    }

    pub fn update(&mut self, dt: Frames, rng: &mut Pcg32) {
        // One fresh square per tick; old ones time out at about the same
        // rate, keeping the population steady.
        self.add_square(rng);

        if !self.transition_total.expired() && self.transition_elapsed < self.transition_total {
            self.transition_elapsed += dt;
            if self.transition_elapsed >= self.transition_total {
                self.current = self.target;
                if self.hold_remaining.expired() {
                    self.transition_total = Frames::ZERO;
                    self.transition_elapsed = Frames::ZERO;
                }
            } else {
                let ratio = self.transition_elapsed.get() / self.transition_total.get();
                self.current = Color::lerp(self.original, self.target, ratio);
            }
        } else if !self.hold_remaining.expired() {
            self.hold_remaining -= dt;
            if self.hold_remaining.expired() {
                // Flash over: head back to where we were.
                let duration = self.transition_total;
                let original = self.original;
                self.start_transition(original, duration, Frames::ZERO);
            }
        }

        // The whole layer wears the current backdrop color; fade alpha is
        // per-particle and untouched.
        let current = self.current;
        self.pool.update(dt);
        for slot in 0..self.pool.capacity() {
            let p = self.pool.get_mut(slot as u16);
            if p.is_active() {
                p.color = current;
            }
        }
    }

    fn add_square(&mut self, rng: &mut Pcg32) {
        let fuse = rng.random_range(SQUARE_MIN_FUSE..=SQUARE_MAX_FUSE);
        let x = rng.random_range(-WORLD_WIDTH / 2.0..=WORLD_WIDTH / 2.0);
        let y = rng.random_range(-WORLD_HEIGHT / 2.0 - SPAWN_DEPTH..=0.0);
        let vel_y = rng.random_range(SQUARE_MIN_VELOCITY_Y..=SQUARE_MAX_VELOCITY_Y);
        let size = rng.random_range(SQUARE_MIN_SIZE..=SQUARE_MAX_SIZE);
        let color = self.current;
        if let Some(p) = self.pool.spawn(Frames::new(fuse)) {
            p.pos = Vec2::new(x, y);
            p.vel = Vec2::new(0.0, vel_y);
            p.color = color;
            p.size = size;
            // Squares drift well past the top before their fuse runs out.
            p.die_offscreen = false;
            p.max_alpha = SQUARE_MAX_ALPHA;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(5)
    }

    #[test]
    fn test_population_grows_then_holds() {
        let mut bg = Background::default();
        let mut rng = rng();
        for _ in 0..10 {
            bg.update(Frames::new(1.0), &mut rng);
        }
        assert_eq!(bg.pool().active_count(), 10);
    }

    #[test]
    fn test_transition_reaches_target() {
        let mut bg = Background::default();
        let mut rng = rng();
        let target = Color::rgb(1.0, 0.0, 0.0);
        bg.transition_to(target, Frames::new(10.0));
        for _ in 0..10 {
            bg.update(Frames::new(1.0), &mut rng);
        }
        assert_eq!(bg.current_color(), target);
        // And it stays there.
        bg.update(Frames::new(100.0), &mut rng);
        assert_eq!(bg.current_color(), target);
    }

    #[test]
    fn test_flash_returns_to_original() {
        let mut bg = Background::default();
        let mut rng = rng();
        let original = bg.current_color();
        let target = Color::rgb(0.0, 1.0, 0.0);
        bg.flash(target, Frames::new(10.0), Frames::new(20.0));

        for _ in 0..10 {
            bg.update(Frames::new(1.0), &mut rng);
        }
        assert_eq!(bg.current_color(), target);

        // Hold, then fade home.
        for _ in 0..40 {
            bg.update(Frames::new(1.0), &mut rng);
        }
        assert_eq!(bg.current_color(), original);
    }

    #[test]
    fn test_active_squares_repainted() {
        let mut bg = Background::default();
        let mut rng = rng();
        bg.update(Frames::new(1.0), &mut rng);
        let target = Color::rgb(1.0, 1.0, 0.0);
        bg.transition_to(target, Frames::ZERO);
        bg.update(Frames::new(1.0), &mut rng);
        assert!(bg.pool().iter_active().all(|p| p.color == target));
    }
}

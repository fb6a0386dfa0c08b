//! Static wall obstacles
//!
//! Axis-aligned rectangles built once with the map. Each tick a wall
//! detonates the projectiles that ended up inside it and shoves
//! overlapping ships back out.

use glam::Vec2;
use rand_pcg::Pcg32;

use super::pool::ParticlePool;
use super::ship::Ship;

/// Margin ships are left outside the wall surface after a push-out.
const PUSH_OUT_MARGIN: f32 = 0.1;
/// Half-step refinement passes when walking a projectile back to the
/// wall surface.
const WALK_BACK_ITERATIONS: u32 = 3;

/// One immutable axis-aligned wall.
#[derive(Debug, Clone, Copy)]
pub struct WallSegment {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl WallSegment {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        WallSegment {
            center: Vec2::new(x, y),
            half_extents: Vec2::new(width / 2.0, height / 2.0),
        }
    }

    pub fn width(&self) -> f32 {
        self.half_extents.x * 2.0
    }

    pub fn height(&self) -> f32 {
        self.half_extents.y * 2.0
    }

    /// Boundary-inclusive point-in-rectangle test.
    pub fn contains(&self, point: Vec2) -> bool {
        let d = point - self.center;
        d.x.abs() <= self.half_extents.x && d.y.abs() <= self.half_extents.y
    }

    /// Detonate every shot whose position ended up inside the wall.
    ///
    /// Candidates come from the broad-phase grid; each hit is first walked
    /// back along its velocity in three half-step refinements to land near
    /// the entry point, then detonated there. The bisection is an accepted
    /// approximation of the crossing point, not exact intersection math.
    pub fn resolve_shots(
        &self,
        shots: &mut ParticlePool,
        explosions: &mut ParticlePool,
        rng: &mut Pcg32,
        scratch: &mut Vec<u16>,
    ) {
        scratch.clear();
        shots.copy_potential_hits(self.center, self.width(), self.height(), scratch);

        for &slot in scratch.iter() {
            let embedded = {
                let p = shots.get_mut(slot);
                if !p.is_active() || !self.contains(p.pos) {
                    false
                } else {
                    let mut step = -0.5f32;
                    for _ in 0..WALK_BACK_ITERATIONS {
                        p.pos += p.vel * step;
                        step = if self.contains(p.pos) {
                            -step.abs() * 0.5
                        } else {
                            step.abs() * 0.5
                        };
                    }
                    true
                }
            };
            if embedded {
                shots.detonate(slot, explosions, rng);
            }
        }
    }

    /// Eject any active ship whose exact position is inside the wall.
    ///
    /// The exit axis is picked by comparing the offset from the wall
    /// center scaled by the orthogonal extent - a stylized response that
    /// favors the long face, not true penetration depth.
    pub fn push_out_ships(&self, ships: &mut [Ship]) {
        for ship in ships.iter_mut() {
            if !ship.active || !self.contains(ship.pos) {
                continue;
            }
            let rel = ship.pos - self.center;
            let px = rel.x * self.height();
            let py = rel.y * self.width();

            if px.abs() > py.abs() {
                ship.pos.x = if px >= 0.0 {
                    self.center.x + self.half_extents.x + PUSH_OUT_MARGIN
                } else {
                    self.center.x - self.half_extents.x - PUSH_OUT_MARGIN
                };
            } else {
                ship.pos.y = if py >= 0.0 {
                    self.center.y + self.half_extents.y + PUSH_OUT_MARGIN
                } else {
                    self.center.y - self.half_extents.y - PUSH_OUT_MARGIN
                };
            }
        }
    }
}

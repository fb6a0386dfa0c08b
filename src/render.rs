//! Render snapshots
//!
//! The simulation never issues draw calls. Instead it flattens its state
//! into [`QuadInstance`] records - position, extents, orientation, packed
//! color - that a presentation layer can upload as-is and turn into
//! whatever geometry it likes. Instances are appended in back-to-front
//! draw order.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::{ArenaState, Color, ParticlePool, PowerUp, SHIP_RADIUS, Ship, WallSegment};

/// Wall bars render a little thicker than their edge.
const WALL_BAR_THICKNESS: f32 = 2.0;
const WALL_COLOR: Color = Color::from_rgba8(255, 255, 255, 255);

/// One renderable quad, GPU-upload ready.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct QuadInstance {
    pub pos: [f32; 2],
    /// Extents: `[width, height]` in world units.
    pub size: [f32; 2],
    /// Orientation vector; `(0, 1)` renders axis-aligned.
    pub heading: [f32; 2],
    /// Packed RGBA with the live fade alpha premultiplied in.
    pub color: u32,
}

/// Flatten the whole arena into draw-ordered quads: background, walls,
/// power-ups, explosions, ships, shots (shots on top).
pub fn collect_quads(state: &ArenaState, out: &mut Vec<QuadInstance>) {
    collect_pool(state.background().pool(), out);
    for wall in state.walls() {
        collect_wall(wall, out);
    }
    for powerup in state.powerups() {
        collect_powerup(powerup, out);
    }
    collect_pool(state.explosions(), out);
    for ship in state.ships() {
        if ship.active {
            collect_ship(ship, out);
        }
    }
    collect_pool(state.shots(), out);
}

fn collect_pool(pool: &ParticlePool, out: &mut Vec<QuadInstance>) {
    for p in pool.iter_active() {
        let heading = if p.rotate_to_heading && p.vel != Vec2::ZERO {
            p.vel
        } else {
            Vec2::Y
        };
        out.push(QuadInstance {
            pos: p.pos.into(),
            size: [p.size * p.aspect, p.size],
            heading: heading.into(),
            color: p.color.with_alpha(p.alpha * p.max_alpha).packed(),
        });
    }
}

fn collect_ship(ship: &Ship, out: &mut Vec<QuadInstance>) {
    if !ship.is_spawned() {
        return;
    }

    // Blink while invincible by darkening every other 10-frame window.
    let mut color = ship.color;
    if ship.is_invincible() && (ship.invincibility_left().get() / 10.0) as i32 % 2 == 0 {
        color = color.darken(0.3);
    }
    out.push(QuadInstance {
        pos: ship.pos.into(),
        size: [SHIP_RADIUS, SHIP_RADIUS],
        heading: ship.heading.into(),
        color: color.packed(),
    });

    // Score pips hover around the hull, one corner per point up to four.
    const PIP_OFFSETS: [Vec2; 4] = [
        Vec2::new(-5.0, 5.0),
        Vec2::new(5.0, 5.0),
        Vec2::new(-5.0, -5.0),
        Vec2::new(5.0, -5.0),
    ];
    for (i, offset) in PIP_OFFSETS.iter().enumerate() {
        if ship.score as usize > i {
            out.push(QuadInstance {
                pos: (ship.pos + *offset).into(),
                size: [1.0, 1.0],
                heading: [0.0, 1.0],
                color: ship.color.packed(),
            });
        }
    }
}

fn collect_wall(wall: &WallSegment, out: &mut Vec<QuadInstance>) {
    let (cx, cy) = (wall.center.x, wall.center.y);
    let (hw, hh) = (wall.half_extents.x, wall.half_extents.y);
    let vertical = [WALL_BAR_THICKNESS, wall.height() + WALL_BAR_THICKNESS];
    let horizontal = [wall.width() + WALL_BAR_THICKNESS, WALL_BAR_THICKNESS];
    let bars = [
        ([cx - hw, cy], vertical),
        ([cx + hw, cy], vertical),
        ([cx, cy - hh], horizontal),
        ([cx, cy + hh], horizontal),
    ];
    for (pos, size) in bars {
        out.push(QuadInstance {
            pos,
            size,
            heading: [0.0, 1.0],
            color: WALL_COLOR.packed(),
        });
    }
}

fn collect_powerup(powerup: &PowerUp, out: &mut Vec<QuadInstance>) {
    if !powerup.is_spawned() {
        return;
    }
    // Slow spin with a gentle alpha pulse.
    let spin = powerup.rotation * 0.05;
    let alpha = ((powerup.rotation * 0.15).sin() + 2.0) / 3.0;
    out.push(QuadInstance {
        pos: powerup.pos.into(),
        size: [3.0, 3.0],
        heading: [spin.sin(), spin.cos()],
        color: Color::WHITE.with_alpha(alpha).packed(),
    });
}

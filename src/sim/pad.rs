//! Latched controller state
//!
//! The frontend pushes raw twin-stick snapshots in whenever its input
//! layer produces them - zero or more times between ticks. The simulation
//! only ever reads the latest snapshot per slot, and compares against the
//! previous tick's buttons for press/release edges. Axes arrive already
//! mapped to world orientation (+y up); device-specific translation is
//! not this crate's job.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Gamepad buttons the simulation cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Fire.
    A,
    B,
    X,
    /// Re-tint the background to the ship's color.
    Y,
}

pub const BUTTON_COUNT: usize = 4;

/// Raw controller state for one slot at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PadSnapshot {
    /// Left stick: movement.
    pub move_axis: Vec2,
    /// Right stick: aim.
    pub aim_axis: Vec2,
    /// Button states, indexed by [`Button`].
    pub buttons: [bool; BUTTON_COUNT],
}

/// One controller slot: the latest snapshot plus last tick's buttons for
/// edge detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct GamePad {
    current: PadSnapshot,
    previous_buttons: [bool; BUTTON_COUNT],
    device: Option<u32>,
}

impl GamePad {
    /// Overwrite the current snapshot. Called whenever new input arrives;
    /// only the newest state before a tick is ever observed.
    pub fn latch(&mut self, snapshot: PadSnapshot) {
        self.current = snapshot;
    }

    pub fn current(&self) -> &PadSnapshot {
        &self.current
    }

    pub fn is_down(&self, button: Button) -> bool {
        self.current.buttons[button as usize]
    }

    /// Down now, but not last tick.
    pub fn was_pressed(&self, button: Button) -> bool {
        self.current.buttons[button as usize] && !self.previous_buttons[button as usize]
    }

    /// Up now, but down last tick.
    pub fn was_released(&self, button: Button) -> bool {
        !self.current.buttons[button as usize] && self.previous_buttons[button as usize]
    }

    /// Copy the current buttons into the previous-tick latch. Must run
    /// after every ship has consumed input for the tick; buttons only
    /// change when an event arrives, so the buffers cannot simply be
    /// swapped.
    pub fn advance_frame(&mut self) {
        self.previous_buttons = self.current.buttons;
    }

    pub fn bind_device(&mut self, device_id: u32) {
        self.device = Some(device_id);
    }

    pub fn unbind(&mut self) {
        self.device = None;
    }

    pub fn device(&self) -> Option<u32> {
        self.device
    }
}

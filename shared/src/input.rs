//! Input state: raw key/pointer events in, one stable [`MoveIntent`] snapshot per frame out.
//!
//! Semantics
//! - Movement keys and sprint are level-triggered: true while held.
//! - Jump is edge-triggered and sticky: a press sets a pending request that stays set,
//!   even after the key is released, until the controller consumes it.
//! - Pointer motion accumulates into yaw/pitch deltas only while the pointer is captured.
//!   Each snapshot drains the accumulated deltas.
//!
//! The state is an explicit object owned by the host and handed to the simulation every
//! frame, so the core stays testable without a windowing system.

use crate::constants::DEFAULT_LOOK_SENSITIVITY;

/// Logical keys the core understands. Hosts map their physical bindings onto these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Backward,
    Left,
    Right,
    Jump,
    Sprint,
}

/// Per-frame intent consumed by the character controller.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveIntent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub sprint: bool,
    /// Cleared by the controller when the jump is applied.
    pub jump_requested: bool,
    /// Camera yaw change for this frame (radians, positive turns left).
    pub yaw_delta: f32,
    /// Camera pitch change for this frame (radians, positive looks up).
    pub pitch_delta: f32,
}

impl MoveIntent {
    /// Net forward contribution: +1 forward, -1 backward, 0 when both or neither are held.
    #[inline]
    pub fn forward_axis(&self) -> f32 {
        axis(self.forward, self.backward)
    }

    /// Net sideways contribution: +1 left, -1 right, 0 when both or neither are held.
    #[inline]
    pub fn left_axis(&self) -> f32 {
        axis(self.left, self.right)
    }

    /// Whether the held keys produce any net planar movement.
    #[inline]
    pub fn has_movement(&self) -> bool {
        self.forward_axis() != 0.0 || self.left_axis() != 0.0
    }

    /// Whether sprint applies: sprint held while moving forward.
    #[inline]
    pub fn is_sprinting(&self) -> bool {
        self.sprint && self.forward_axis() > 0.0
    }
}

#[inline]
fn axis(positive: bool, negative: bool) -> f32 {
    (positive as i8 - negative as i8) as f32
}

#[derive(Clone, Debug)]
pub struct InputState {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    sprint: bool,
    jump_pending: bool,
    pointer_captured: bool,
    look_sensitivity: f32,
    yaw_delta: f32,
    pitch_delta: f32,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(DEFAULT_LOOK_SENSITIVITY)
    }
}

impl InputState {
    pub fn new(look_sensitivity: f32) -> Self {
        Self {
            forward: false,
            backward: false,
            left: false,
            right: false,
            sprint: false,
            jump_pending: false,
            pointer_captured: false,
            look_sensitivity,
            yaw_delta: 0.0,
            pitch_delta: 0.0,
        }
    }

    pub fn press(&mut self, key: Key) {
        match key {
            Key::Jump => self.jump_pending = true,
            _ => *self.level_mut(key) = true,
        }
    }

    /// Releasing jump does not cancel a pending request.
    pub fn release(&mut self, key: Key) {
        if key != Key::Jump {
            *self.level_mut(key) = false;
        }
    }

    fn level_mut(&mut self, key: Key) -> &mut bool {
        match key {
            Key::Forward => &mut self.forward,
            Key::Backward => &mut self.backward,
            Key::Left => &mut self.left,
            Key::Right => &mut self.right,
            Key::Sprint => &mut self.sprint,
            Key::Jump => &mut self.jump_pending,
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        match key {
            Key::Forward => self.forward,
            Key::Backward => self.backward,
            Key::Left => self.left,
            Key::Right => self.right,
            Key::Sprint => self.sprint,
            Key::Jump => self.jump_pending,
        }
    }

    #[inline]
    pub fn jump_pending(&self) -> bool {
        self.jump_pending
    }

    /// Captures or releases the pointer. Releasing drops any look motion not yet consumed.
    pub fn set_pointer_captured(&mut self, captured: bool) {
        self.pointer_captured = captured;
        if !captured {
            self.yaw_delta = 0.0;
            self.pitch_delta = 0.0;
        }
    }

    #[inline]
    pub fn pointer_captured(&self) -> bool {
        self.pointer_captured
    }

    /// Accumulates raw pointer motion (screen units, +y down). Ignored while not captured.
    pub fn pointer_motion(&mut self, dx: f32, dy: f32) {
        if !self.pointer_captured || !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.yaw_delta -= dx * self.look_sensitivity;
        self.pitch_delta -= dy * self.look_sensitivity;
    }

    /// Produces this frame's intent and drains the accumulated look deltas.
    ///
    /// The pending jump is copied, not drained: call [`InputState::acknowledge`] with the
    /// intent after the controller ran so a consumed jump is cleared.
    pub fn snapshot(&mut self) -> MoveIntent {
        let intent = MoveIntent {
            forward: self.forward,
            backward: self.backward,
            left: self.left,
            right: self.right,
            sprint: self.sprint,
            jump_requested: self.jump_pending,
            yaw_delta: self.yaw_delta,
            pitch_delta: self.pitch_delta,
        };
        self.yaw_delta = 0.0;
        self.pitch_delta = 0.0;
        intent
    }

    /// Clears the pending jump if the controller consumed it from `intent`.
    pub fn acknowledge(&mut self, intent: &MoveIntent) {
        if self.jump_pending && !intent.jump_requested {
            self.jump_pending = false;
        }
    }
}

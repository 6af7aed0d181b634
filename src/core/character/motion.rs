//=========================================================================
// Motion
//=========================================================================
//
// Movement, orientation and viewport boundary handling.
//
// Two boundary mechanisms coexist:
// - `reaches_wall` / `turn_if_reach_wall`: user-driven, reverses direction
// - `clamp_to`: applied by every draw, forces the position back inside
//
// A character can therefore turn one frame before the clamp engages.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::{Character, CharacterState};
use crate::core::backend::Viewport;
use crate::core::geometry::{angle_towards, DVec2};

//=== Aim =================================================================

/// Target of [`Character::point_towards`].
#[derive(Debug, Clone, Copy)]
pub enum Aim<'a> {
    /// Current pointer position.
    Pointer,
    /// Center of another character.
    Character(&'a Character),
    Point(DVec2),
}

//=== CharacterState ======================================================

impl CharacterState {
    /// Reverses the forward vector and mirrors the costume.
    pub(super) fn turn(&mut self) {
        self.vector = -self.vector;
        self.scale_x = -self.scale_x;
    }

    pub(super) fn reaches_wall(&self, viewport: Viewport) -> bool {
        let (width, height) = self.size();
        let max_x = f64::from(viewport.width) - width;
        let max_y = f64::from(viewport.height) - height;
        let DVec2 { x, y } = self.position;
        x < 0.0 || x >= max_x || y < 0.0 || y >= max_y
    }

    pub(super) fn clamp_to(&mut self, viewport: Viewport) {
        let (width, height) = self.size();
        let (view_w, view_h) = (f64::from(viewport.width), f64::from(viewport.height));

        self.position.x = clamp_axis(self.position.x, width, view_w);
        self.position.y = clamp_axis(self.position.y, height, view_h);
    }
}

/// Pulls one axis back inside `[0, limit - size]`.
pub(super) fn clamp_axis(pos: f64, size: f64, limit: f64) -> f64 {
    if pos < 0.0 {
        0.0
    } else if pos + size >= limit {
        limit - size
    } else {
        pos
    }
}

//=== Character ===========================================================

impl Character {
    /// Moves `steps` along the forward vector.
    pub fn move_by(&self, steps: f64) {
        let mut state = self.state();
        let delta = state.vector * steps;
        state.position += delta;
    }

    /// Turns around: negates the forward vector and mirrors the costume.
    pub fn turn(&self) {
        self.state().turn();
    }

    /// Adds `degrees` to the orientation.
    pub fn rotate(&self, degrees: f64) {
        let mut state = self.state();
        let angle = state.angle + degrees;
        state.set_angle(angle);
    }

    /// Sets the orientation; any real value is wrapped into [0, 360).
    pub fn set_angle(&self, degrees: f64) {
        self.state().set_angle(degrees);
    }

    /// Turns so the forward vector points from this character's center at
    /// `aim`.
    pub fn point_towards(&self, aim: Aim<'_>) {
        let target = match aim {
            Aim::Pointer => self.env().pointer(),
            Aim::Character(other) => other.rect().center(),
            Aim::Point(point) => point,
        };
        let mut state = self.state();
        let degrees = angle_towards(state.rect().center(), target);
        state.set_angle(degrees);
    }

    /// True when the costume touches or crosses a viewport edge.
    pub fn reaches_wall(&self) -> bool {
        let viewport = self.env().renderer.viewport();
        self.state().reaches_wall(viewport)
    }

    /// Turns around when [`reaches_wall`](Self::reaches_wall) holds.
    pub fn turn_if_reach_wall(&self) {
        let viewport = self.env().renderer.viewport();
        let mut state = self.state();
        if state.reaches_wall(viewport) {
            state.turn();
        }
    }

    /// Distance from the costume center to `(x, y)`, truncated to whole
    /// pixels.
    pub fn distance(&self, x: f64, y: f64) -> i64 {
        self.rect().center().distance(DVec2::new(x, y)) as i64
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

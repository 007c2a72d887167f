//! Value to needle rotation mapping.
//!
//! Rotations are in degrees, counter-clockwise from the positive x axis with
//! y pointing up, so `270` points straight down. The minimum value sits at
//! `270 - H` and values grow clockwise towards the maximum at `270 + H`, where
//! `H` is half of the sector opening. The band `(270 - H, 270 + H)` is the gap
//! between the two ends where the needle never rests.

use crate::edge::{DIAL_BOTTOM, EdgeState, GapCrossing};
use crate::error::ConfigError;
use crate::range::{Extreme, RangeModel};

/// Normalises a rotation into `[0, 360)`.
pub fn clamp_rotation(rotation: f64) -> f64 {
    let r = rotation.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360
    if r >= 360.0 { 0.0 } else { r }
}

/// Signed difference `a - b` wrapped into `(-180, 180]`.
fn wrapped_difference(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    if d > 180.0 { d - 360.0 } else { d }
}

/// Needle state owned by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationState {
    /// Committed needle rotation, always the image of the current value.
    pub rotation: f64,
    /// Drag input not yet consumed by a step change.
    pub accumulated: f64,
    pub edge: EdgeState,
}

/// Outcome of proposing a new rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationUpdate {
    pub value_changed: bool,
    pub crossing: Option<GapCrossing>,
    /// Rotation after dead-zone clamping, before quantisation.
    pub proposed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationMapper {
    half_opening: f64,
}

impl RotationMapper {
    pub fn new(half_opening: f64) -> Result<Self, ConfigError> {
        if half_opening.is_finite() && half_opening > 0.0 && half_opening < 180.0 {
            Ok(Self { half_opening })
        } else {
            Err(ConfigError::InvalidOpenAngle(2.0 * half_opening))
        }
    }

    pub fn half_opening(&self) -> f64 {
        self.half_opening
    }

    /// Angular extent between the minimum and maximum ends.
    pub fn max_sweep(&self) -> f64 {
        360.0 - 2.0 * self.half_opening
    }

    /// Rotation of the minimum end; sweeps start here.
    pub fn start_rotation(&self) -> f64 {
        DIAL_BOTTOM - self.half_opening
    }

    pub fn value_to_rotation(&self, range: &RangeModel) -> f64 {
        clamp_rotation(self.start_rotation() - range.ratio() * self.max_sweep())
    }

    /// Sweep from the minimum end to `rotation`. Not clamped.
    pub fn rotation_to_sweep(&self, rotation: f64, at_max: bool) -> f64 {
        let sweep = self.start_rotation() - rotation;
        if rotation == DIAL_BOTTOM && at_max {
            self.max_sweep()
        } else if rotation > DIAL_BOTTOM {
            sweep + 360.0
        } else {
            sweep
        }
    }

    pub fn rotation_to_valid_value(&self, range: &RangeModel, rotation: f64) -> f64 {
        let sweep = self.rotation_to_sweep(clamp_rotation(rotation), range.is_at(Extreme::Max));
        range.value_at_ratio(sweep / self.max_sweep())
    }

    pub fn in_dead_zone(&self, rotation: f64) -> bool {
        wrapped_difference(rotation, DIAL_BOTTOM).abs() < self.half_opening
    }

    /// Pins a rotation inside the gap to the edge `previous` is on or past.
    pub fn clamp_to_dead_zone(&self, previous: f64, proposed: f64) -> f64 {
        if !self.in_dead_zone(proposed) {
            return proposed;
        }
        let side = wrapped_difference(previous, DIAL_BOTTOM);
        if side <= -self.half_opening {
            self.start_rotation()
        } else if side >= self.half_opening {
            clamp_rotation(DIAL_BOTTOM + self.half_opening)
        } else {
            proposed
        }
    }

    /// Commits `proposed` through the dead zone, the gap-crossing state
    /// machine and step quantisation, then re-derives the needle from the value.
    pub fn apply_rotation(
        &self,
        range: &mut RangeModel,
        state: &mut RotationState,
        proposed: f64,
    ) -> RotationUpdate {
        let previous = state.rotation;
        let proposed = self.clamp_to_dead_zone(previous, clamp_rotation(proposed));

        let from = state.edge.resolve(previous);
        let to = EdgeState::classify(proposed);
        let crossing = from.crossing(
            to,
            proposed - previous,
            range.is_at(Extreme::Min),
            range.is_at(Extreme::Max),
        );

        let value = match crossing {
            Some(crossing) => {
                log::trace!("Gap crossing {crossing:?} from {previous} to {proposed}");
                range.extreme(crossing.target())
            }
            None => self.rotation_to_valid_value(range, proposed),
        };

        let value_changed = range.set_value(value);
        state.rotation = self.value_to_rotation(range);
        state.edge = EdgeState::classify(state.rotation);
        if crossing.is_some() || state.rotation != previous {
            state.accumulated = 0.0;
        }

        RotationUpdate {
            value_changed,
            crossing,
            proposed,
        }
    }

    /// Adds drag input to the accumulator and commits the resulting rotation.
    pub fn add_rotation_change(
        &self,
        range: &mut RangeModel,
        state: &mut RotationState,
        delta: f64,
    ) -> RotationUpdate {
        if !delta.is_finite() {
            return RotationUpdate {
                value_changed: false,
                crossing: None,
                proposed: state.rotation,
            };
        }
        state.accumulated += delta;
        let proposed = state.rotation + state.accumulated;
        self.apply_rotation(range, state, proposed)
    }

    /// Fresh state for the range's current value.
    pub fn state_for(&self, range: &RangeModel) -> RotationState {
        RotationState {
            rotation: self.value_to_rotation(range),
            accumulated: 0.0,
            edge: EdgeState::Idle,
        }
    }
}

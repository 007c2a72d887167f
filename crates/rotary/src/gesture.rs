use geo::Coord;
use std::f64::consts::{PI, TAU};

/// Turns pointer drags around the dial centre into needle rotation changes.
///
/// Angular movement is scaled by the pointer's distance from the centre over
/// `sensitivity_radius`, so the dial is fine-grained close in and coarse far out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureTranslator {
    pub sensitivity_radius: f64,
}

impl GestureTranslator {
    pub fn new(sensitivity_radius: f64) -> Self {
        Self { sensitivity_radius }
    }

    /// Rotation change in degrees, positive counter-clockwise on screen.
    pub fn rotation_delta(
        &self,
        center: Coord<f64>,
        previous: Coord<f64>,
        current: Coord<f64>,
    ) -> f64 {
        rotation_delta(center, previous, current, self.sensitivity_radius)
    }
}

/// Vector from `center` to a screen point, with y flipped so up is positive.
fn relative(center: Coord<f64>, point: Coord<f64>) -> Coord<f64> {
    Coord {
        x: point.x - center.x,
        y: -(point.y - center.y),
    }
}

pub fn rotation_delta(
    center: Coord<f64>,
    previous: Coord<f64>,
    current: Coord<f64>,
    sensitivity_radius: f64,
) -> f64 {
    let v = relative(center, current);
    let v_prev = relative(center, previous);

    let length = v.x.hypot(v.y);
    let prev_length = v_prev.x.hypot(v_prev.y);
    let degenerate = sensitivity_radius.is_nan() || sensitivity_radius <= 0.0;
    if degenerate || length == 0.0 || prev_length == 0.0 {
        return 0.0;
    }

    let mut delta = v.y.atan2(v.x) - v_prev.y.atan2(v_prev.x);
    // undo the jump across the atan2 branch cut
    if delta > PI {
        delta -= TAU;
    } else if delta <= -PI {
        delta += TAU;
    }

    let scaled = delta.to_degrees() * (length / sensitivity_radius);
    if scaled.is_finite() { scaled } else { 0.0 }
}

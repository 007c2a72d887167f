use crate::range::Extreme;

/// Rotation (degrees) pointing straight down, the middle of the dial's gap.
pub const DIAL_BOTTOM: f64 = 270.0;

/// Single-update rotation below which a drag through the gap counts as a
/// reversal at the endpoint rather than a sweep to the opposite end.
pub const ROTATION_SNAP_BUFFER: f64 = 30.0;

/// Where the committed needle sits relative to the gap at the bottom of the dial.
///
/// `Idle` means no rotation has been committed since the last reset (drag start
/// or programmatic value change); it resolves to the zone of the previous
/// rotation on the next update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeState {
    #[default]
    Idle,
    /// Just before the bottom, on the side of the minimum end: `(180, 270)`.
    NearMinEdge,
    /// Just past the bottom, on the side of the maximum end: `[270, 360)`.
    NearMaxEdge,
    FreeRotation,
}

/// How a single update passed through the gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapCrossing {
    /// Small step past an endpoint; the value stays pinned on the extreme being approached.
    SnapBack(Extreme),
    /// Large step through the gap; the value lands on the opposite extreme.
    SweepThrough(Extreme),
}

impl GapCrossing {
    pub fn target(self) -> Extreme {
        match self {
            Self::SnapBack(extreme) | Self::SweepThrough(extreme) => extreme,
        }
    }
}

impl EdgeState {
    /// Zone of a rotation already normalised to `[0, 360)`.
    pub fn classify(rotation: f64) -> Self {
        if (DIAL_BOTTOM..360.0).contains(&rotation) {
            Self::NearMaxEdge
        } else if rotation > 180.0 && rotation < DIAL_BOTTOM {
            Self::NearMinEdge
        } else {
            Self::FreeRotation
        }
    }

    pub fn resolve(self, previous_rotation: f64) -> Self {
        match self {
            Self::Idle => Self::classify(previous_rotation),
            zone => zone,
        }
    }

    /// Detects a pass through the bottom of the dial between `self` and `next`.
    ///
    /// `delta` is the signed rotation change of this update (`next - previous`).
    /// A crossing towards an extreme the value already rests on is ignored.
    pub fn crossing(
        self,
        next: EdgeState,
        delta: f64,
        at_min: bool,
        at_max: bool,
    ) -> Option<GapCrossing> {
        match (self, next) {
            (Self::NearMaxEdge, Self::NearMinEdge) if !at_min => {
                Some(if -delta < ROTATION_SNAP_BUFFER {
                    GapCrossing::SnapBack(Extreme::Max)
                } else {
                    GapCrossing::SweepThrough(Extreme::Min)
                })
            }
            (Self::NearMinEdge, Self::NearMaxEdge) if !at_max => {
                Some(if delta < ROTATION_SNAP_BUFFER {
                    GapCrossing::SnapBack(Extreme::Min)
                } else {
                    GapCrossing::SweepThrough(Extreme::Max)
                })
            }
            _ => None,
        }
    }
}

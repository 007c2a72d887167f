pub mod layout;
pub mod sector;

pub use layout::{DialLayout, LabelAnchor, OverlayFrame, SizeHints};
pub use sector::{DialGeometry, DialSnapshot, Label, SectorGeometryBuilder};

// Lengths below are in dp and get multiplied by the display density.
pub const SENSITIVITY_RADIUS_DP: f64 = 48.0; // pointer distance giving 1:1 angular motion
pub const TEXT_MARGIN_DP: f64 = 2.0; // label clearance from the sector opening
pub const OVERLAY_SIZE_DP: f64 = 192.0; // overlay height
pub const OVERLAY_PADDING_DP: f64 = 12.0;
pub const DEFAULT_DIAMETER_DP: f64 = 88.0;

/// Maximum distance in pixels between a flattened arc and the true circle.
pub const ARC_TOLERANCE: f64 = 0.25;
pub const MAX_ARC_SEGMENTS: usize = 720;

pub mod controller;
pub mod edge;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod mapper;
pub mod paint;
pub mod range;
pub mod settings;
pub mod text;

pub use controller::{Knob, KnobAction};
pub use edge::{EdgeState, GapCrossing};
pub use error::ConfigError;
pub use geometry::{DialGeometry, DialLayout, Label, OverlayFrame, SectorGeometryBuilder, SizeHints};
pub use gesture::GestureTranslator;
pub use mapper::{RotationMapper, RotationState};
pub use paint::{LineCap, Painter};
pub use range::{Extreme, RangeModel};
pub use settings::{DialColors, DialStyle, HexColor, KnobSettings, UnitLabel, ValuePosition};
pub use text::{ApproxTextMeasure, MeasureText, TextAlign};

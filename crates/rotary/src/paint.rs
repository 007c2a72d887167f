use crate::geometry::{DialGeometry, Label};
use crate::settings::DialStyle;
use geo::{Line, MultiPolygon};
use palette::Srgba;
use strum::Display as StrumDisplay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum LineCap {
    Butt,
    Round,
}

/// Drawing surface the dial is painted onto.
pub trait Painter {
    type Error;

    /// Fills `shape`; holes and overlapping rings use the even-odd rule.
    fn fill(&mut self, shape: &MultiPolygon<f64>, color: Srgba<f64>) -> Result<(), Self::Error>;

    fn stroke(
        &mut self,
        line: &Line<f64>,
        width: f64,
        cap: LineCap,
        color: Srgba<f64>,
    ) -> Result<(), Self::Error>;

    fn text(&mut self, label: &Label, color: Srgba<f64>) -> Result<(), Self::Error>;
}

pub fn draw<P: Painter>(
    painter: &mut P,
    geometry: &DialGeometry,
    style: &DialStyle,
) -> Result<(), P::Error> {
    let colors = &style.palette;

    painter.fill(&geometry.background, colors.sector)?;
    painter.fill(&geometry.value, colors.value_sector)?;

    for tick in &geometry.ticks {
        painter.stroke(tick, geometry.tick_width, LineCap::Butt, colors.ticks)?;
    }

    if let Some(needle) = &geometry.needle {
        painter.stroke(needle, geometry.needle_width, LineCap::Round, colors.needle)?;
    }

    if let Some(label) = &geometry.label {
        painter.text(label, colors.text)?;
    }
    Ok(())
}

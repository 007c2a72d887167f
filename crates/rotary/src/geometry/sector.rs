//! Vector shapes of one dial instance.
//!
//! Shapes are built in screen space (y down) around the layout centre, with
//! the needle rotation convention of [`crate::mapper`], then turned as a whole
//! by the face rotation. Every rebuild starts from scratch.

use super::layout::{DialLayout, LabelAnchor};
use super::{ARC_TOLERANCE, MAX_ARC_SEGMENTS};
use crate::edge::DIAL_BOTTOM;
use crate::mapper::RotationMapper;
use crate::range::{Extreme, RangeModel};
use crate::settings::DialStyle;
use geo::{BooleanOps, Coord, Line, LineString, MultiPolygon, Point, Polygon, Rect, Rotate, coord};
use std::f64::consts::{FRAC_PI_2, TAU};

const SWEEP_EPSILON: f64 = 1e-9;

/// What a rebuild needs from the controller's state. Both dial instances are
/// built from the same snapshot so their angles agree exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct DialSnapshot {
    pub rotation: f64,
    /// Sweep of the value sector from the minimum end.
    pub sweep: f64,
    pub label: String,
}

impl DialSnapshot {
    pub fn capture(mapper: &RotationMapper, range: &RangeModel, rotation: f64, label: String) -> Self {
        let sweep = mapper
            .rotation_to_sweep(rotation, range.is_at(Extreme::Max))
            .clamp(0.0, mapper.max_sweep());
        Self {
            rotation,
            sweep,
            label,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub anchor: LabelAnchor,
    pub size: f64,
}

/// Renderable output for one dial instance.
#[derive(Debug, Clone, PartialEq)]
pub struct DialGeometry {
    pub background: MultiPolygon<f64>,
    pub value: MultiPolygon<f64>,
    pub ticks: Vec<Line<f64>>,
    pub needle: Option<Line<f64>>,
    pub label: Option<Label>,
    pub background_sweep: f64,
    pub value_sweep: f64,
    pub scale: f64,
    pub tick_width: f64,
    pub needle_width: f64,
}

pub struct SectorGeometryBuilder<'a> {
    style: &'a DialStyle,
    layout: &'a DialLayout,
}

impl<'a> SectorGeometryBuilder<'a> {
    pub fn new(style: &'a DialStyle, layout: &'a DialLayout) -> Self {
        Self { style, layout }
    }

    fn start_angle(&self) -> f64 {
        DIAL_BOTTOM - self.style.half_opening
    }

    fn max_sweep(&self) -> f64 {
        360.0 - 2.0 * self.style.half_opening
    }

    pub fn build(&self, snapshot: &DialSnapshot) -> DialGeometry {
        let notches = self.tick_notches();
        let face = self.style.face_rotation();
        let center = Point::from(self.layout.center);

        let background_sweep = self.max_sweep();
        let value_sweep = snapshot.sweep.clamp(0.0, background_sweep);

        let background = self
            .sector(background_sweep, &notches)
            .rotate_around_point(face, center);
        let value = self
            .sector(value_sweep, &notches)
            .rotate_around_point(face, center);

        let ticks = if self.style.show_ticks {
            self.tick_angles()
                .into_iter()
                .map(|angle| {
                    self.radial_line(
                        angle,
                        self.style.tick_min_radius,
                        self.style.tick_max_radius,
                    )
                    .rotate_around_point(face, center)
                })
                .collect()
        } else {
            Vec::new()
        };

        let needle = self.style.show_needle.then(|| {
            self.radial_line(snapshot.rotation, 0.0, self.style.needle_radius)
                .rotate_around_point(face, center)
        });

        let label = self.style.show_value.then(|| Label {
            text: snapshot.label.clone(),
            anchor: self.layout.label,
            size: self.style.text_size * self.layout.scale,
        });

        DialGeometry {
            background,
            value,
            ticks,
            needle,
            label,
            background_sweep,
            value_sweep,
            scale: self.layout.scale,
            tick_width: self.style.ticks_width * self.layout.scale,
            needle_width: self.style.needle_width * self.layout.scale,
        }
    }

    /// Angles of the ticks, from the minimum end towards the maximum end.
    fn tick_angles(&self) -> Vec<f64> {
        let count = self.style.num_ticks;
        let start = self.start_angle();
        let increment = if count > 1 {
            self.max_sweep() / f64::from(count - 1)
        } else {
            0.0
        };
        (0..count).map(|i| start - f64::from(i) * increment).collect()
    }

    /// Point at `radius_scale` of the dial radius along math angle `angle_deg`.
    fn polar(&self, angle_deg: f64, radius_scale: f64) -> Coord<f64> {
        polar(self.layout.center, self.layout.radius * radius_scale, angle_deg.to_radians())
    }

    fn radial_line(&self, angle_deg: f64, from_scale: f64, to_scale: f64) -> Line<f64> {
        Line::new(
            self.polar(angle_deg, from_scale),
            self.polar(angle_deg, to_scale),
        )
    }

    /// Thin rectangles cut out of the sectors at each tick. Empty unless
    /// subtraction is on.
    fn tick_notches(&self) -> Vec<Polygon<f64>> {
        if !self.style.subtract_ticks || self.style.num_ticks == 0 || self.layout.radius <= 0.0 {
            return Vec::new();
        }
        let center = self.layout.center;
        let half_width = 0.5 * self.style.ticks_subtract_width * self.layout.scale;
        let length = self.style.sector_max_radius.max(1.0) * self.layout.radius;
        let notch = Rect::new(
            coord! { x: center.x, y: center.y - half_width },
            coord! { x: center.x + length, y: center.y + half_width },
        )
        .to_polygon();

        self.tick_angles()
            .into_iter()
            .map(|angle| notch.rotate_around_point(-angle, Point::from(center)))
            .collect()
    }

    /// Annular sector from the minimum end clockwise by `sweep` degrees,
    /// minus the notches.
    fn sector(&self, sweep: f64, notches: &[Polygon<f64>]) -> MultiPolygon<f64> {
        let radius = self.layout.radius;
        let inner = radius * self.style.sector_min_radius.min(self.style.sector_max_radius);
        let outer = radius * self.style.sector_min_radius.max(self.style.sector_max_radius);
        if sweep <= SWEEP_EPSILON || outer <= 0.0 {
            return MultiPolygon::new(Vec::new());
        }

        let shape = if sweep >= 360.0 {
            annulus(self.layout.center, inner.max(0.0), outer)
        } else {
            arc_band(self.layout.center, inner.max(0.0), outer, self.start_angle(), sweep)
        };

        notches
            .iter()
            .fold(MultiPolygon::new(vec![shape]), |shape, notch| {
                shape.difference(notch)
            })
    }
}

fn polar(center: Coord<f64>, radius: f64, angle: f64) -> Coord<f64> {
    coord! { x: center.x + radius * angle.cos(), y: center.y - radius * angle.sin() }
}

/// Segments needed to keep a flattened arc within [`ARC_TOLERANCE`] of the circle.
fn arc_segments(radius: f64, sweep_rad: f64) -> usize {
    let step = if radius > ARC_TOLERANCE {
        2.0 * (1.0 - ARC_TOLERANCE / radius).acos()
    } else {
        FRAC_PI_2
    };
    ((sweep_rad / step).ceil() as usize).clamp(1, MAX_ARC_SEGMENTS)
}

fn arc_points(center: Coord<f64>, radius: f64, start: f64, sweep: f64, segments: usize) -> Vec<Coord<f64>> {
    (0..=segments)
        .map(|i| polar(center, radius, start - sweep * i as f64 / segments as f64))
        .collect()
}

fn arc_band(center: Coord<f64>, inner: f64, outer: f64, start_deg: f64, sweep_deg: f64) -> Polygon<f64> {
    let start = start_deg.to_radians();
    let sweep = sweep_deg.to_radians();
    let segments = arc_segments(outer, sweep);

    let mut ring = arc_points(center, outer, start, sweep, segments);
    if inner > 0.0 {
        let mut inside = arc_points(center, inner, start, sweep, segments);
        inside.reverse();
        ring.extend(inside);
    } else {
        ring.push(center);
    }
    Polygon::new(LineString::new(ring), Vec::new())
}

fn annulus(center: Coord<f64>, inner: f64, outer: f64) -> Polygon<f64> {
    let circle = |radius: f64| {
        let segments = arc_segments(radius, TAU);
        let mut points = arc_points(center, radius, 0.0, TAU, segments);
        points.pop();
        LineString::new(points)
    };
    let holes = if inner > 0.0 { vec![circle(inner)] } else { Vec::new() };
    Polygon::new(circle(outer), holes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{KnobSettings, ValuePosition};
    use crate::text::LabelMetrics;
    use geo::Area;

    const EPSILON: f64 = 1e-6;

    fn style_with(settings: KnobSettings) -> DialStyle {
        DialStyle::from_settings(&settings).unwrap()
    }

    fn layout(style: &DialStyle, scale: f64) -> DialLayout {
        let size = 100.0 * scale;
        let bounds = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: size, y: size });
        let metrics = LabelMetrics {
            width: 0.0,
            height: 0.0,
            ascent: 0.0,
            descent: 0.0,
        };
        DialLayout::new(bounds, scale, style, metrics)
    }

    fn snapshot(style: &DialStyle, value: f64) -> DialSnapshot {
        let mapper = RotationMapper::new(style.half_opening).unwrap();
        let range = RangeModel::new(0.0, 100.0, 100, value).unwrap();
        let rotation = mapper.value_to_rotation(&range);
        DialSnapshot::capture(&mapper, &range, rotation, style.format_value(value))
    }

    fn angle_of(center: Coord<f64>, point: Coord<f64>) -> f64 {
        let a = (-(point.y - center.y)).atan2(point.x - center.x).to_degrees();
        a.rem_euclid(360.0)
    }

    fn plain() -> KnobSettings {
        KnobSettings {
            subtract_ticks: false,
            ..KnobSettings::default()
        }
    }

    #[test]
    fn ticks_are_evenly_spaced_across_the_sweep() {
        let style = style_with(KnobSettings {
            num_ticks: 5,
            ..plain()
        });
        let layout = layout(&style, 1.0);
        let geometry = SectorGeometryBuilder::new(&style, &layout).build(&snapshot(&style, 50.0));

        assert_eq!(geometry.ticks.len(), 5);
        let angles: Vec<f64> = geometry
            .ticks
            .iter()
            .map(|tick| angle_of(layout.center, tick.end))
            .collect();
        for (angle, expected) in angles.iter().zip([240.0, 165.0, 90.0, 15.0, 300.0]) {
            assert!((angle - expected).abs() < EPSILON, "{angles:?}");
        }

        let tick = geometry.ticks[0];
        let length = (tick.end.x - tick.start.x).hypot(tick.end.y - tick.start.y);
        assert!((length - 0.2 * layout.radius).abs() < EPSILON);
    }

    #[test]
    fn single_tick_sits_at_the_minimum_end() {
        let style = style_with(KnobSettings {
            num_ticks: 1,
            ..plain()
        });
        let layout = layout(&style, 1.0);
        let geometry = SectorGeometryBuilder::new(&style, &layout).build(&snapshot(&style, 50.0));
        assert_eq!(geometry.ticks.len(), 1);
        assert!((angle_of(layout.center, geometry.ticks[0].end) - 240.0).abs() < EPSILON);
    }

    #[test]
    fn hidden_ticks_still_cut_notches() {
        let notched = style_with(KnobSettings {
            show_ticks: false,
            num_ticks: 5,
            ..KnobSettings::default()
        });
        let solid = style_with(KnobSettings {
            show_ticks: false,
            num_ticks: 5,
            ..plain()
        });
        let layout = layout(&notched, 1.0);
        let cut = SectorGeometryBuilder::new(&notched, &layout).build(&snapshot(&notched, 50.0));
        let whole = SectorGeometryBuilder::new(&solid, &layout).build(&snapshot(&solid, 50.0));

        assert!(cut.ticks.is_empty());
        assert!(cut.background.unsigned_area() < whole.background.unsigned_area() - 1.0);
        assert!(cut.value.unsigned_area() < whole.value.unsigned_area() - 1.0);
    }

    #[test]
    fn background_area_matches_the_annular_sector() {
        let style = style_with(plain());
        let layout = layout(&style, 1.0);
        let geometry = SectorGeometryBuilder::new(&style, &layout).build(&snapshot(&style, 50.0));

        let r = layout.radius;
        let expected = 300.0 / 360.0 * std::f64::consts::PI * ((0.75 * r).powi(2) - (0.4 * r).powi(2));
        let area = geometry.background.unsigned_area();
        assert!((area - expected).abs() / expected < 0.01, "{area} vs {expected}");
        assert!((geometry.value_sweep - 150.0).abs() < EPSILON);
    }

    #[test]
    fn value_at_minimum_has_no_value_sector() {
        let style = style_with(plain());
        let layout = layout(&style, 1.0);
        let geometry = SectorGeometryBuilder::new(&style, &layout).build(&snapshot(&style, 0.0));
        assert_eq!(geometry.value_sweep, 0.0);
        assert!(geometry.value.0.is_empty());
    }

    #[test]
    fn full_turn_becomes_an_annulus() {
        let style = style_with(plain());
        let layout = layout(&style, 1.0);
        let builder = SectorGeometryBuilder::new(&style, &layout);
        let ring = builder.sector(360.0, &[]);

        assert_eq!(ring.0.len(), 1);
        assert_eq!(ring.0[0].interiors().len(), 1);
        let r = layout.radius;
        let expected = std::f64::consts::PI * ((0.75 * r).powi(2) - (0.4 * r).powi(2));
        let area = ring.unsigned_area();
        assert!((area - expected).abs() / expected < 0.01, "{area} vs {expected}");
    }

    #[test]
    fn face_rotation_turns_shapes_but_not_the_label() {
        let style = style_with(KnobSettings {
            value_position: ValuePosition::Top,
            ..plain()
        });
        let layout = layout(&style, 1.0);
        let geometry = SectorGeometryBuilder::new(&style, &layout).build(&snapshot(&style, 0.0));

        let needle = geometry.needle.unwrap();
        // minimum end at 240 turned half a turn
        assert!((angle_of(layout.center, needle.end) - 60.0).abs() < EPSILON);
        assert_eq!(geometry.label.unwrap().anchor, layout.label);
    }

    #[test]
    fn primary_and_overlay_share_angles() {
        let style = style_with(KnobSettings::default());
        let primary = layout(&style, 1.0);
        let overlay = layout(&style, 1.75);
        let snapshot = snapshot(&style, 37.0);

        let small = SectorGeometryBuilder::new(&style, &primary).build(&snapshot);
        let large = SectorGeometryBuilder::new(&style, &overlay).build(&snapshot);

        assert_eq!(small.value_sweep, large.value_sweep);
        assert_eq!(small.background_sweep, large.background_sweep);
        assert_eq!(large.needle_width, 1.75 * small.needle_width);
        let small_angle = angle_of(primary.center, small.needle.unwrap().end);
        let large_angle = angle_of(overlay.center, large.needle.unwrap().end);
        assert!((small_angle - large_angle).abs() < EPSILON);
    }
}

use super::{DEFAULT_DIAMETER_DP, OVERLAY_PADDING_DP, OVERLAY_SIZE_DP};
use crate::settings::{DialStyle, ValuePosition};
use crate::text::{LabelMetrics, TextAlign};
use geo::{Coord, Rect, coord};

/// Baseline point of the value label and how the text hangs off it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelAnchor {
    pub position: Coord<f64>,
    pub align: TextAlign,
}

/// Placement of one dial instance inside its bounds at a given scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialLayout {
    pub bounds: Rect<f64>,
    pub scale: f64,
    pub center: Coord<f64>,
    pub radius: f64,
    pub label: LabelAnchor,
    /// Label box at this scale.
    pub metrics: LabelMetrics,
}

impl DialLayout {
    /// `metrics` must already be measured at `scale`.
    pub fn new(bounds: Rect<f64>, scale: f64, style: &DialStyle, metrics: LabelMetrics) -> Self {
        let width = bounds.width();
        let mut height = bounds.height();
        let mut center = bounds.center();
        let text_height = metrics.height;

        let (diameter, label) = match style.value_position {
            ValuePosition::Center => {
                let d = width.min(height);
                let anchor = LabelAnchor {
                    position: coord! { x: center.x, y: center.y + 0.5 * metrics.ascent },
                    align: TextAlign::Center,
                };
                (d, anchor)
            }
            ValuePosition::Bottom => {
                height -= text_height;
                let d = width.min(height);
                center.y -= 0.5 * text_height;
                let anchor = LabelAnchor {
                    position: coord! { x: center.x, y: center.y + 0.5 * d + metrics.ascent },
                    align: TextAlign::Center,
                };
                (d, anchor)
            }
            ValuePosition::Top => {
                height -= text_height;
                let d = width.min(height);
                center.y += 0.5 * text_height;
                let anchor = LabelAnchor {
                    position: coord! { x: center.x, y: center.y - 0.5 * d + metrics.descent },
                    align: TextAlign::Center,
                };
                (d, anchor)
            }
            ValuePosition::Right => {
                let d = height;
                let offset = clearance(style, text_height, d);
                center.x -= 0.5 * (metrics.width + offset - 0.5 * d);
                let anchor = LabelAnchor {
                    position: coord! { x: center.x + offset, y: center.y + 0.5 * metrics.ascent },
                    align: TextAlign::Left,
                };
                (d, anchor)
            }
            ValuePosition::Left => {
                let d = height;
                let offset = clearance(style, text_height, d);
                center.x += 0.5 * (metrics.width + offset - 0.5 * d);
                let anchor = LabelAnchor {
                    position: coord! { x: center.x - offset, y: center.y + 0.5 * metrics.ascent },
                    align: TextAlign::Right,
                };
                (d, anchor)
            }
        };

        let layout = Self {
            bounds,
            scale,
            center,
            radius: (0.5 * diameter).max(0.0),
            label,
            metrics,
        };
        log::debug!(
            "Dial laid out at scale {scale}: center ({}, {}), radius {}",
            layout.center.x,
            layout.center.y,
            layout.radius
        );
        layout
    }
}

/// Label distance from the centre for side placements, kept within the dial.
fn clearance(style: &DialStyle, text_height: f64, diameter: f64) -> f64 {
    style
        .text_offset(text_height)
        .min(0.5 * diameter)
        .max(0.0)
}

/// Intrinsic size suggestions for the primary dial, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeHints {
    pub position: ValuePosition,
    pub text_width: f64,
    pub text_height: f64,
    /// Label clearance for a label `text_height` tall.
    pub text_offset: f64,
    pub default_diameter: f64,
}

impl SizeHints {
    pub fn new(style: &DialStyle, metrics: LabelMetrics) -> Self {
        Self {
            position: style.value_position,
            text_width: metrics.width,
            text_height: metrics.height,
            text_offset: style.text_offset(metrics.height),
            default_diameter: style.dp(DEFAULT_DIAMETER_DP),
        }
    }

    pub fn minimum_height(&self) -> f64 {
        match self.position {
            ValuePosition::Bottom | ValuePosition::Top => self.text_height + self.minimum_width(),
            ValuePosition::Center | ValuePosition::Left | ValuePosition::Right => {
                2.0 * self.text_height
            }
        }
    }

    pub fn minimum_width(&self) -> f64 {
        match self.position {
            ValuePosition::Bottom | ValuePosition::Top => self.text_width,
            ValuePosition::Center => self.minimum_height(),
            ValuePosition::Left | ValuePosition::Right => self.text_width + self.minimum_height(),
        }
    }

    /// Height to ask for once the width is fixed.
    pub fn suggested_height(&self, width: f64, max_height: f64) -> f64 {
        if width <= 0.0 || max_height <= 0.0 {
            return 0.0;
        }
        let height = match self.position {
            ValuePosition::Center => width,
            ValuePosition::Bottom | ValuePosition::Top => width + self.text_height,
            ValuePosition::Left | ValuePosition::Right => {
                (width - self.text_width).max(0.0).max(self.text_height)
            }
        };
        height.min(max_height)
    }

    /// Width to ask for once the height is fixed.
    pub fn suggested_width(&self, height: f64, max_width: f64) -> f64 {
        if height <= 0.0 || max_width <= 0.0 {
            return 0.0;
        }
        let width = match self.position {
            ValuePosition::Center => height,
            ValuePosition::Bottom | ValuePosition::Top => {
                (height - self.text_height).max(0.0).max(self.text_height)
            }
            ValuePosition::Left | ValuePosition::Right => {
                let offset = self.text_offset.min(0.5 * height);
                height + self.text_width + offset - 0.5 * height
            }
        };
        width.min(max_width)
    }

    /// Size with no constraints at all, built around the default diameter.
    pub fn preferred_size(&self) -> (f64, f64) {
        let mut width = self.default_diameter;
        let mut height = self.default_diameter;
        match self.position {
            ValuePosition::Bottom | ValuePosition::Top => height += self.text_height,
            ValuePosition::Left | ValuePosition::Right => {
                let overhang = (0.5 * self.default_diameter - self.text_offset).max(0.0);
                width += self.text_width + overhang;
            }
            ValuePosition::Center => {}
        }
        (width, height)
    }
}

/// Magnified copy of the dial shown while dragging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayFrame {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    /// Area the overlay dial is laid out in, relative to the padded origin.
    pub inner: Rect<f64>,
    /// Overlay size relative to the primary dial.
    pub scale: f64,
}

impl OverlayFrame {
    /// Sized after `primary`'s aspect ratio. `None` when the primary bounds
    /// are empty or too narrow to leave room inside the padding.
    pub fn for_primary(primary: Rect<f64>, style: &DialStyle) -> Option<Self> {
        let aspect = primary.width() / primary.height();
        if !aspect.is_finite() || aspect <= 0.0 {
            return None;
        }

        let height = style.dp(OVERLAY_SIZE_DP);
        let width = height * aspect;
        let padding = style.dp(OVERLAY_PADDING_DP);
        let inner_width = width - 2.0 * padding;
        let inner_height = height - 2.0 * padding;
        if inner_width <= 0.0 || inner_height <= 0.0 {
            return None;
        }

        Some(Self {
            width,
            height,
            padding,
            inner: Rect::new(
                coord! { x: 0.0, y: 0.0 },
                coord! { x: inner_width, y: inner_height },
            ),
            scale: inner_width / primary.width(),
        })
    }

    /// Maps a point of the overlay dial's layout to overlay-frame coordinates.
    pub fn to_frame(&self, point: Coord<f64>) -> Coord<f64> {
        coord! { x: point.x + self.padding, y: point.y + self.padding }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::KnobSettings;

    const EPSILON: f64 = 1e-9;

    fn style(position: ValuePosition) -> DialStyle {
        let settings = KnobSettings {
            value_position: position,
            ..KnobSettings::default()
        };
        DialStyle::from_settings(&settings).unwrap()
    }

    fn metrics() -> LabelMetrics {
        LabelMetrics {
            width: 50.0,
            height: 20.0,
            ascent: 16.0,
            descent: 4.0,
        }
    }

    fn bounds(w: f64, h: f64) -> Rect<f64> {
        Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: w, y: h })
    }

    #[test]
    fn bottom_label_reserves_text_height() {
        let layout = DialLayout::new(bounds(100.0, 120.0), 1.0, &style(ValuePosition::Bottom), metrics());
        assert_eq!(layout.radius, 50.0);
        assert_eq!(layout.center, coord! { x: 50.0, y: 50.0 });
        assert_eq!(layout.label.position, coord! { x: 50.0, y: 116.0 });
        assert_eq!(layout.label.align, TextAlign::Center);
    }

    #[test]
    fn top_label_shifts_dial_down() {
        let layout = DialLayout::new(bounds(100.0, 120.0), 1.0, &style(ValuePosition::Top), metrics());
        assert_eq!(layout.center, coord! { x: 50.0, y: 70.0 });
        assert_eq!(layout.label.position.y, 70.0 - 50.0 + 4.0);
    }

    #[test]
    fn center_label_uses_the_smaller_side() {
        let layout = DialLayout::new(bounds(80.0, 120.0), 1.0, &style(ValuePosition::Center), metrics());
        assert_eq!(layout.radius, 40.0);
        assert_eq!(layout.label.position, coord! { x: 40.0, y: 68.0 });
    }

    #[test]
    fn side_labels_clear_the_opening() {
        let style = style(ValuePosition::Right);
        let offset = style.text_offset(20.0);
        assert!((offset - 11.0 / 30f64.to_radians().tan()).abs() < EPSILON);

        let layout = DialLayout::new(bounds(200.0, 100.0), 1.0, &style, metrics());
        assert_eq!(layout.radius, 50.0);
        let cx = 100.0 - 0.5 * (50.0 + offset - 50.0);
        assert!((layout.center.x - cx).abs() < EPSILON);
        assert!((layout.label.position.x - (cx + offset)).abs() < EPSILON);
        assert_eq!(layout.label.align, TextAlign::Left);

        let left = DialLayout::new(bounds(200.0, 100.0), 1.0, &self::style(ValuePosition::Left), metrics());
        assert!((left.center.x - (200.0 - cx)).abs() < EPSILON);
        assert_eq!(left.label.align, TextAlign::Right);
    }

    #[test]
    fn wide_opening_clamps_clearance_to_zero() {
        let settings = KnobSettings {
            value_position: ValuePosition::Right,
            sector_open_angle: 240.0,
            ..KnobSettings::default()
        };
        let style = DialStyle::from_settings(&settings).unwrap();
        assert!(style.text_offset(20.0) < 0.0);
        let layout = DialLayout::new(bounds(200.0, 100.0), 1.0, &style, metrics());
        assert_eq!(layout.label.position.x, layout.center.x);
    }

    #[test]
    fn minimum_sizes_follow_label_position() {
        let bottom = SizeHints::new(&style(ValuePosition::Bottom), metrics());
        assert_eq!(bottom.minimum_width(), 50.0);
        assert_eq!(bottom.minimum_height(), 70.0);

        let center = SizeHints::new(&style(ValuePosition::Center), metrics());
        assert_eq!(center.minimum_height(), 40.0);
        assert_eq!(center.minimum_width(), 40.0);

        let left = SizeHints::new(&style(ValuePosition::Left), metrics());
        assert_eq!(left.minimum_width(), 90.0);
    }

    #[test]
    fn suggested_sizes_respect_limits() {
        let bottom = SizeHints::new(&style(ValuePosition::Bottom), metrics());
        assert_eq!(bottom.suggested_height(100.0, 1000.0), 120.0);
        assert_eq!(bottom.suggested_height(100.0, 110.0), 110.0);
        assert_eq!(bottom.suggested_height(0.0, 110.0), 0.0);
        assert_eq!(bottom.suggested_width(120.0, 1000.0), 100.0);
        assert_eq!(bottom.suggested_width(10.0, 1000.0), 20.0);

        let right = SizeHints::new(&style(ValuePosition::Right), metrics());
        assert_eq!(right.suggested_height(150.0, 1000.0), 100.0);
        let expected = 100.0 + 50.0 + right.text_offset - 50.0;
        assert!((right.suggested_width(100.0, 1000.0) - expected).abs() < EPSILON);
    }

    #[test]
    fn preferred_size_uses_default_diameter() {
        let bottom = SizeHints::new(&style(ValuePosition::Bottom), metrics());
        assert_eq!(bottom.preferred_size(), (88.0, 108.0));

        let right = SizeHints::new(&style(ValuePosition::Right), metrics());
        let (w, h) = right.preferred_size();
        assert_eq!(h, 88.0);
        assert!((w - (88.0 + 50.0 + (44.0 - right.text_offset))).abs() < EPSILON);
    }

    #[test]
    fn overlay_keeps_aspect_and_scales_from_inner_width() {
        let style = style(ValuePosition::Bottom);
        let frame = OverlayFrame::for_primary(bounds(96.0, 96.0), &style).unwrap();
        assert_eq!((frame.width, frame.height), (192.0, 192.0));
        assert_eq!(frame.inner.width(), 168.0);
        assert_eq!(frame.scale, 168.0 / 96.0);
        assert_eq!(frame.to_frame(coord! { x: 0.0, y: 0.0 }), coord! { x: 12.0, y: 12.0 });

        assert!(OverlayFrame::for_primary(bounds(0.0, 96.0), &style).is_none());
        assert!(OverlayFrame::for_primary(bounds(1.0, 96.0), &style).is_none());
    }
}

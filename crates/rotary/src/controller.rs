use crate::error::ConfigError;
use crate::geometry::{
    DialGeometry, DialLayout, DialSnapshot, OverlayFrame, SENSITIVITY_RADIUS_DP,
    SectorGeometryBuilder, SizeHints,
};
use crate::gesture::GestureTranslator;
use crate::mapper::{RotationMapper, RotationState, RotationUpdate};
use crate::paint::{self, Painter};
use crate::range::RangeModel;
use crate::settings::{DialStyle, KnobSettings};
use crate::text::{LabelMetrics, MeasureText};
use geo::{Coord, Rect};
use std::fmt;

/// What the host has to do after a controller call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KnobAction {
    pub redraw_primary: bool,
    pub redraw_overlay: bool,
    pub show_overlay: bool,
    pub hide_overlay: bool,
    pub value_changed: bool,
}

pub type ValueListener = Box<dyn FnMut(f64)>;

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragSession {
    start_value: f64,
    dial_center: Coord<f64>,
}

#[derive(Debug, Clone, PartialEq)]
struct DialView {
    layout: DialLayout,
    geometry: DialGeometry,
}

impl DialView {
    fn new(layout: DialLayout, style: &DialStyle, snapshot: &DialSnapshot) -> Self {
        let geometry = SectorGeometryBuilder::new(style, &layout).build(snapshot);
        Self { layout, geometry }
    }

    fn rebuild(&mut self, style: &DialStyle, snapshot: &DialSnapshot) {
        self.geometry = SectorGeometryBuilder::new(style, &self.layout).build(snapshot);
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Overlay {
    frame: OverlayFrame,
    view: DialView,
}

/// A rotary knob: owns the value, the needle and the drag gesture, and keeps
/// the primary and magnified dial geometry in sync with them.
pub struct Knob {
    style: DialStyle,
    range: RangeModel,
    mapper: RotationMapper,
    rotation: RotationState,
    gesture: GestureTranslator,
    track_value: bool,
    label: String,
    session: Option<DragSession>,
    primary: Option<DialView>,
    overlay: Option<Overlay>,
    listener: Option<ValueListener>,
}

impl fmt::Debug for Knob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Knob")
            .field("range", &self.range)
            .field("rotation", &self.rotation)
            .field("label", &self.label)
            .field("session", &self.session)
            .field("has_listener", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}

impl Knob {
    pub fn new(settings: &KnobSettings) -> Result<Self, ConfigError> {
        let style = DialStyle::from_settings(settings)?;
        let range = RangeModel::new(
            settings.min_value,
            settings.max_value,
            settings.step_count,
            settings.value,
        )?;
        let mapper = RotationMapper::new(style.half_opening)?;
        let rotation = mapper.state_for(&range);
        let gesture = GestureTranslator::new(style.dp(SENSITIVITY_RADIUS_DP));
        let label = style.format_value(range.value());

        Ok(Self {
            style,
            range,
            mapper,
            rotation,
            gesture,
            track_value: settings.track_value,
            label,
            session: None,
            primary: None,
            overlay: None,
            listener: None,
        })
    }

    pub fn value(&self) -> f64 {
        self.range.value()
    }

    pub fn range(&self) -> &RangeModel {
        &self.range
    }

    pub fn style(&self) -> &DialStyle {
        &self.style
    }

    /// Committed needle rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.rotation.rotation
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Registers the change listener and calls it right away with the current value.
    pub fn set_value_changed_listener(&mut self, listener: impl FnMut(f64) + 'static) {
        let mut listener: ValueListener = Box::new(listener);
        listener(self.range.value());
        self.listener = Some(listener);
    }

    /// Sets the value programmatically. Does not notify the listener.
    pub fn set_value(&mut self, value: f64) -> KnobAction {
        let value_changed = self.range.set_value(value);
        self.rotation = self.mapper.state_for(&self.range);
        self.label = self.style.format_value(self.range.value());
        KnobAction {
            value_changed,
            ..self.refresh()
        }
    }

    /// Persisted state: the value alone.
    pub fn saved_value(&self) -> f64 {
        self.range.value()
    }

    /// Restores a persisted value; the needle and label are derived from it.
    pub fn restore(&mut self, value: f64) -> KnobAction {
        log::debug!("Restoring knob value {value}");
        self.set_value(value)
    }

    /// Proposes an absolute needle rotation, subject to the dead zone and
    /// gap crossing rules.
    pub fn set_rotation(&mut self, rotation: f64) -> KnobAction {
        let update = self
            .mapper
            .apply_rotation(&mut self.range, &mut self.rotation, rotation);
        self.after_rotation(update)
    }

    pub fn add_rotation_change(&mut self, delta: f64) -> KnobAction {
        let update = self
            .mapper
            .add_rotation_change(&mut self.range, &mut self.rotation, delta);
        self.after_rotation(update)
    }

    fn after_rotation(&mut self, update: RotationUpdate) -> KnobAction {
        log::trace!(
            "Rotation proposed {} committed {} value {}",
            update.proposed,
            self.rotation.rotation,
            self.range.value()
        );
        if update.value_changed {
            self.label = self.style.format_value(self.range.value());
            if self.track_value {
                self.notify();
            }
        }
        KnobAction {
            value_changed: update.value_changed,
            ..self.refresh()
        }
    }

    fn notify(&mut self) {
        let value = self.range.value();
        if let Some(listener) = self.listener.as_mut() {
            listener(value);
        }
    }

    fn snapshot(&self) -> DialSnapshot {
        DialSnapshot::capture(
            &self.mapper,
            &self.range,
            self.rotation.rotation,
            self.label.clone(),
        )
    }

    /// Rebuilds the geometry that is on screen. The primary dial is hidden
    /// while dragging and only catches up when the drag ends.
    fn refresh(&mut self) -> KnobAction {
        let snapshot = self.snapshot();
        if self.session.is_some() {
            if let Some(overlay) = &mut self.overlay {
                overlay.view.rebuild(&self.style, &snapshot);
            }
            KnobAction {
                redraw_overlay: self.overlay.is_some(),
                ..KnobAction::default()
            }
        } else {
            if let Some(primary) = &mut self.primary {
                primary.rebuild(&self.style, &snapshot);
            }
            KnobAction {
                redraw_primary: self.primary.is_some(),
                ..KnobAction::default()
            }
        }
    }

    fn label_metrics(&self, measure: &impl MeasureText, scale: f64) -> LabelMetrics {
        LabelMetrics::for_range(
            measure,
            &self.style.format_value(self.range.min()),
            &self.style.format_value(self.range.max()),
            self.style.text_size * scale,
        )
    }

    /// Lays the dial out inside `bounds`, along with the overlay sized after it.
    pub fn set_bounds(&mut self, bounds: Rect<f64>, measure: &impl MeasureText) -> KnobAction {
        let snapshot = self.snapshot();

        let layout = DialLayout::new(bounds, 1.0, &self.style, self.label_metrics(measure, 1.0));
        self.primary = Some(DialView::new(layout, &self.style, &snapshot));

        self.overlay = OverlayFrame::for_primary(bounds, &self.style).map(|frame| {
            let metrics = self.label_metrics(measure, frame.scale);
            let layout = DialLayout::new(frame.inner, frame.scale, &self.style, metrics);
            Overlay {
                frame,
                view: DialView::new(layout, &self.style, &snapshot),
            }
        });
        if self.overlay.is_none() {
            log::warn!("Bounds {bounds:?} leave no room for a drag overlay");
        }

        KnobAction {
            redraw_primary: true,
            redraw_overlay: self.session.is_some() && self.overlay.is_some(),
            ..KnobAction::default()
        }
    }

    pub fn size_hints(&self, measure: &impl MeasureText) -> SizeHints {
        SizeHints::new(&self.style, self.label_metrics(measure, 1.0))
    }

    /// Dial radius of the primary layout, once laid out.
    pub fn radius(&self) -> Option<f64> {
        self.primary.as_ref().map(|view| view.layout.radius)
    }

    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.primary.as_ref().map(|view| view.layout.bounds)
    }

    pub fn primary_layout(&self) -> Option<&DialLayout> {
        self.primary.as_ref().map(|view| &view.layout)
    }

    /// Current only while not dragging.
    pub fn primary_geometry(&self) -> Option<&DialGeometry> {
        self.primary.as_ref().map(|view| &view.geometry)
    }

    pub fn overlay_frame(&self) -> Option<&OverlayFrame> {
        self.overlay.as_ref().map(|overlay| &overlay.frame)
    }

    pub fn overlay_layout(&self) -> Option<&DialLayout> {
        self.overlay.as_ref().map(|overlay| &overlay.view.layout)
    }

    pub fn overlay_geometry(&self) -> Option<&DialGeometry> {
        self.overlay.as_ref().map(|overlay| &overlay.view.geometry)
    }

    /// Overlay dial centre in overlay-frame coordinates.
    pub fn overlay_center(&self) -> Option<Coord<f64>> {
        self.overlay
            .as_ref()
            .map(|overlay| overlay.frame.to_frame(overlay.view.layout.center))
    }

    /// Starts a drag. `dial_center` is the overlay dial centre in the same
    /// coordinates the pointer positions will arrive in.
    pub fn drag_start(&mut self, dial_center: Coord<f64>) -> KnobAction {
        if let Some(session) = &mut self.session {
            log::debug!("Drag already in progress, moving centre to {dial_center:?}");
            session.dial_center = dial_center;
            return KnobAction::default();
        }

        self.session = Some(DragSession {
            start_value: self.range.value(),
            dial_center,
        });
        self.rotation = self.mapper.state_for(&self.range);
        log::debug!(
            "Drag started at value {} around ({}, {})",
            self.range.value(),
            dial_center.x,
            dial_center.y
        );

        let refreshed = self.refresh();
        KnobAction {
            redraw_primary: true,
            show_overlay: self.overlay.is_some(),
            ..refreshed
        }
    }

    /// Feeds one pointer move; positions are absolute.
    pub fn drag_move(&mut self, previous: Coord<f64>, current: Coord<f64>) -> KnobAction {
        let Some(session) = self.session else {
            return KnobAction::default();
        };
        let delta = self
            .gesture
            .rotation_delta(session.dial_center, previous, current);
        log::trace!(
            "Pointer at {:.1} px from the centre, rotation change {delta}",
            (current.x - session.dial_center.x).hypot(current.y - session.dial_center.y)
        );
        self.add_rotation_change(delta)
    }

    /// Ends the drag, puts the primary dial back and, unless values were
    /// tracked live, reports a changed value once.
    pub fn drag_end(&mut self) -> KnobAction {
        let Some(session) = self.session.take() else {
            return KnobAction::default();
        };

        let value = self.range.value();
        let value_changed = value != session.start_value;
        log::debug!("Drag ended, value {} -> {value}", session.start_value);
        if value_changed && !self.track_value {
            self.notify();
        }

        let refreshed = self.refresh();
        KnobAction {
            hide_overlay: true,
            value_changed,
            ..refreshed
        }
    }

    /// A cancelled gesture ends the drag like a release does.
    pub fn drag_cancel(&mut self) -> KnobAction {
        log::debug!("Drag cancelled");
        self.drag_end()
    }

    pub fn set_show_value(&mut self, show: bool) -> KnobAction {
        self.style.show_value = show;
        self.refresh()
    }

    pub fn set_show_needle(&mut self, show: bool) -> KnobAction {
        self.style.show_needle = show;
        self.refresh()
    }

    pub fn set_show_ticks(&mut self, show: bool) -> KnobAction {
        self.style.show_ticks = show;
        self.refresh()
    }

    /// Paints the primary dial. Nothing is painted while dragging.
    pub fn draw_primary<P: Painter>(&self, painter: &mut P) -> Result<(), P::Error> {
        match (&self.primary, self.session) {
            (Some(view), None) => paint::draw(painter, &view.geometry, &self.style),
            _ => Ok(()),
        }
    }

    /// Paints the overlay dial in its inner coordinates. Nothing is painted
    /// unless dragging.
    pub fn draw_overlay<P: Painter>(&self, painter: &mut P) -> Result<(), P::Error> {
        match (&self.overlay, self.session) {
            (Some(overlay), Some(_)) => paint::draw(painter, &overlay.view.geometry, &self.style),
            _ => Ok(()),
        }
    }
}

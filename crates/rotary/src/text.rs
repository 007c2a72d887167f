use strum::Display as StrumDisplay;

/// Horizontal alignment of the label relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Size of a run of text, in pixels. `ascent` and `descent` are both positive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextExtent {
    pub width: f64,
    pub ascent: f64,
    pub descent: f64,
}

/// Text measurement provided by the rendering side.
pub trait MeasureText {
    fn measure(&self, text: &str, size: f64) -> TextExtent;
}

/// Fixed-advance estimate for when no font backend is around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproxTextMeasure {
    pub advance: f64,
    pub ascent: f64,
    pub descent: f64,
}

impl Default for ApproxTextMeasure {
    fn default() -> Self {
        Self {
            advance: 0.6,
            ascent: 0.8,
            descent: 0.2,
        }
    }
}

impl MeasureText for ApproxTextMeasure {
    fn measure(&self, text: &str, size: f64) -> TextExtent {
        TextExtent {
            width: text.chars().count() as f64 * self.advance * size,
            ascent: self.ascent * size,
            descent: self.descent * size,
        }
    }
}

/// Box reserved for the value label at one scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LabelMetrics {
    pub width: f64,
    pub height: f64,
    pub ascent: f64,
    pub descent: f64,
}

impl LabelMetrics {
    /// Sized for the wider of the labels at the two range ends, so the
    /// layout stays put while the value changes.
    pub fn for_range(
        measure: &impl MeasureText,
        min_label: &str,
        max_label: &str,
        size: f64,
    ) -> Self {
        let min = measure.measure(min_label, size);
        let max = measure.measure(max_label, size);
        Self {
            width: min.width.max(max.width),
            height: size,
            ascent: min.ascent.max(max.ascent),
            descent: min.descent.max(max.descent),
        }
    }
}

pub fn format_value(value: f64, digits: usize, unit: Option<&str>) -> String {
    match unit.filter(|u| !u.is_empty()) {
        Some(unit) => format!("{value:.digits$} {unit}"),
        None => format!("{value:.digits$}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_digits_and_unit() {
        assert_eq!(format_value(42.0, 1, Some("dB")), "42.0 dB");
        assert_eq!(format_value(0.126, 2, None), "0.13");
        assert_eq!(format_value(7.0, 0, Some("")), "7");
    }

    #[test]
    fn label_box_covers_both_ends() {
        let measure = ApproxTextMeasure::default();
        let metrics = LabelMetrics::for_range(&measure, "0.0", "100.0", 10.0);
        assert_eq!(metrics.width, 5.0 * 0.6 * 10.0);
        assert_eq!(metrics.height, 10.0);
        assert_eq!(metrics.ascent, 8.0);
    }

    #[test]
    fn align_names_are_lowercase() {
        assert_eq!(TextAlign::Center.to_string(), "center");
    }
}

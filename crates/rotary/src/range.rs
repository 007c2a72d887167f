use crate::error::{ConfigError, ensure_finite};

/// Which end of the range a value is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Min,
    Max,
}

impl Extreme {
    pub fn opposite(self) -> Self {
        match self {
            Self::Min => Self::Max,
            Self::Max => Self::Min,
        }
    }
}

/// Bounded, step-quantised scalar.
///
/// After any mutation `min <= value <= max` holds and `value` sits an exact
/// number of steps away from `min`.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeModel {
    min: f64,
    max: f64,
    step_count: u32,
    value: f64,
}

impl RangeModel {
    pub fn new(min: f64, max: f64, step_count: u32, value: f64) -> Result<Self, ConfigError> {
        let mut min = ensure_finite("min_value", min)?;
        let mut max = ensure_finite("max_value", max)?;
        let value = ensure_finite("value", value)?;

        if step_count < 1 {
            return Err(ConfigError::InvalidStepCount(step_count));
        }

        if max < min {
            log::warn!("Range [{min}, {max}] is inverted, swapping bounds");
            std::mem::swap(&mut min, &mut max);
        }

        let mut range = Self {
            min,
            max,
            step_count,
            value: min,
        };
        range.set_value(value);
        Ok(range)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn step_size(&self) -> f64 {
        self.span() / f64::from(self.step_count)
    }

    pub fn extreme(&self, extreme: Extreme) -> f64 {
        match extreme {
            Extreme::Min => self.min,
            Extreme::Max => self.max,
        }
    }

    pub fn is_at(&self, extreme: Extreme) -> bool {
        self.value == self.extreme(extreme)
    }

    /// Normalised position of the current value in `[0, 1]`.
    pub fn ratio(&self) -> f64 {
        let span = self.span();
        if span > 0.0 {
            (self.value - self.min) / span
        } else {
            0.0
        }
    }

    /// Rounds `value` to the nearest step counted from `min`. The first and
    /// last steps are exactly `min` and `max`.
    pub fn snap_to_steps(&self, value: f64) -> f64 {
        let step = self.step_size();
        if step.is_nan() || step <= 0.0 || !value.is_finite() {
            return self.min;
        }
        let index = ((value - self.min) / step).round();
        if index <= 0.0 {
            self.min
        } else if index >= f64::from(self.step_count) {
            self.max
        } else {
            (self.min + self.span() * index / f64::from(self.step_count)).clamp(self.min, self.max)
        }
    }

    /// Clamps and quantises `value`, returning whether the stored value changed.
    pub fn set_value(&mut self, value: f64) -> bool {
        let value = self.snap_to_steps(value.clamp(self.min, self.max));
        let changed = value != self.value;
        self.value = value;
        changed
    }

    /// Value at `ratio` of the span, quantised.
    pub fn value_at_ratio(&self, ratio: f64) -> f64 {
        self.snap_to_steps(self.min + ratio.clamp(0.0, 1.0) * self.span())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_bounds_are_swapped() {
        let range = RangeModel::new(100.0, 0.0, 10, 30.0).unwrap();
        assert_eq!(range.min(), 0.0);
        assert_eq!(range.max(), 100.0);
        assert_eq!(range.value(), 30.0);
    }

    #[test]
    fn zero_step_count_is_rejected() {
        assert_eq!(
            RangeModel::new(0.0, 1.0, 0, 0.5),
            Err(ConfigError::InvalidStepCount(0))
        );
    }

    #[test]
    fn non_finite_bounds_are_rejected() {
        let err = RangeModel::new(f64::NAN, 1.0, 1, 0.5).unwrap_err();
        assert!(matches!(err, ConfigError::NonFinite { name: "min_value", .. }));
    }

    #[test]
    fn initial_value_is_clamped_and_snapped() {
        let range = RangeModel::new(0.0, 100.0, 10, 134.0).unwrap();
        assert_eq!(range.value(), 100.0);

        let range = RangeModel::new(0.0, 100.0, 10, 44.0).unwrap();
        assert_eq!(range.value(), 40.0);
    }

    #[test]
    fn snapping_counts_steps_from_min() {
        let range = RangeModel::new(5.0, 25.0, 4, 5.0).unwrap();
        assert_eq!(range.step_size(), 5.0);
        assert_eq!(range.snap_to_steps(12.4), 10.0);
        assert_eq!(range.snap_to_steps(12.5), 15.0);
        assert_eq!(range.snap_to_steps(-3.0), 5.0);
    }

    #[test]
    fn zero_span_collapses_to_min() {
        let mut range = RangeModel::new(3.0, 3.0, 5, 3.0).unwrap();
        assert_eq!(range.snap_to_steps(10.0), 3.0);
        assert!(!range.set_value(7.0));
        assert_eq!(range.value(), 3.0);
        assert_eq!(range.ratio(), 0.0);
    }

    #[test]
    fn set_value_reports_changes() {
        let mut range = RangeModel::new(0.0, 100.0, 10, 50.0).unwrap();
        assert!(!range.set_value(52.0));
        assert!(range.set_value(58.0));
        assert_eq!(range.value(), 60.0);
        assert!(!range.is_at(Extreme::Max));
        range.set_value(1000.0);
        assert!(range.is_at(Extreme::Max));
    }

    #[test]
    fn top_step_lands_exactly_on_max() {
        let mut range = RangeModel::new(0.0, 1.0, 49, 0.0).unwrap();
        assert_eq!(range.snap_to_steps(1.0), 1.0);
        assert!(range.set_value(range.max()));
        assert_eq!(range.value(), 1.0);
        assert!(range.is_at(Extreme::Max));
        assert_eq!(range.value_at_ratio(1.0), 1.0);
        assert_eq!(range.snap_to_steps(0.99), 1.0);
    }

    #[test]
    fn value_at_ratio_is_quantised() {
        let range = RangeModel::new(0.0, 100.0, 10, 0.0).unwrap();
        assert_eq!(range.value_at_ratio(0.55), 60.0);
        assert_eq!(range.value_at_ratio(2.0), 100.0);
        assert_eq!(range.value_at_ratio(-1.0), 0.0);
    }
}

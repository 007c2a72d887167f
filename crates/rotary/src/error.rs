use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Step count must be at least 1, got {0}")]
    InvalidStepCount(u32),
    #[error("Sector opening must lie strictly between 0 and 360 degrees, got {0}")]
    InvalidOpenAngle(f64),
    #[error("Setting '{name}' must be a finite number, got {value}")]
    NonFinite { name: &'static str, value: f64 },
    #[error("Display density must be positive, got {0}")]
    InvalidDensity(f64),
}

pub(crate) fn ensure_finite(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { name, value })
    }
}

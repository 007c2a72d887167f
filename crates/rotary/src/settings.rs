use crate::error::{ConfigError, ensure_finite};
use crate::geometry::TEXT_MARGIN_DP;
use crate::mapper::RotationMapper;
use crate::text::format_value;
use derive_more::{AsRef, Deref, Display, From, Into};
use palette::rgb::FromHexError;
use palette::{Srgb, Srgba};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumIter, EnumString};

/// Where the value label sits; the dial face is turned so its gap faces the label.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ValuePosition {
    #[default]
    #[strum(to_string = "bottom", serialize = "0")]
    Bottom,
    #[strum(to_string = "left", serialize = "1")]
    Left,
    #[strum(to_string = "top", serialize = "2")]
    Top,
    #[strum(to_string = "right", serialize = "3")]
    Right,
    #[strum(to_string = "center", serialize = "centre", serialize = "4")]
    Center,
}

impl ValuePosition {
    /// Clockwise turn of the dial face, in degrees.
    pub fn face_rotation(self) -> f64 {
        match self {
            Self::Top => 180.0,
            Self::Right => -90.0,
            Self::Left => 90.0,
            Self::Bottom | Self::Center => 0.0,
        }
    }
}

/// An opaque colour written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub struct HexColor(pub Srgb<u8>);

impl HexColor {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self(Srgb::new(red, green, blue))
    }

    pub fn to_srgba(self) -> Srgba<f64> {
        let c: Srgb<f64> = self.0.into_format();
        Srgba::new(c.red, c.green, c.blue, 1.0)
    }
}

impl FromStr for HexColor {
    type Err = FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Srgb::from_str(s.trim()).map(Self)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.0.into_components();
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct UnitLabel(String);

impl UnitLabel {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialColors {
    pub text: HexColor,
    pub sector: HexColor,
    pub value_sector: HexColor,
    pub ticks: HexColor,
    pub needle: HexColor,
}

impl Default for DialColors {
    fn default() -> Self {
        Self {
            text: HexColor::new(0x00, 0x00, 0x00),
            sector: HexColor::new(0xdd, 0xdd, 0xdd),
            value_sector: HexColor::new(0xaa, 0xaa, 0xaa),
            ticks: HexColor::new(0x00, 0x66, 0x99),
            needle: HexColor::new(0x88, 0x00, 0x00),
        }
    }
}

/// Everything a knob is configured with. Lengths are in dp, radii are
/// fractions of the dial radius, angles are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnobSettings {
    pub min_value: f64,
    pub max_value: f64,
    pub value: f64,
    pub step_count: u32,
    pub value_num_digits: usize,
    pub unit: UnitLabel,
    pub show_value: bool,
    pub show_unit: bool,
    pub show_ticks: bool,
    pub show_needle: bool,
    pub subtract_ticks: bool,
    pub num_ticks: u32,
    pub value_position: ValuePosition,
    /// Full width of the gap at the bottom of the dial.
    pub sector_open_angle: f64,
    pub sector_rotation: f64,
    pub sector_min_radius: f64,
    pub sector_max_radius: f64,
    pub tick_min_radius: f64,
    pub tick_max_radius: f64,
    pub needle_radius: f64,
    pub colors: DialColors,
    pub needle_width: f64,
    pub ticks_width: f64,
    pub ticks_subtract_width: f64,
    pub text_size: f64,
    /// Notify on every step while dragging instead of once on release.
    pub track_value: bool,
    /// Pixels per dp.
    pub density: f64,
}

impl Default for KnobSettings {
    fn default() -> Self {
        Self {
            min_value: 0.0,
            max_value: 100.0,
            value: 50.0,
            step_count: 100,
            value_num_digits: 1,
            unit: UnitLabel::default(),
            show_value: true,
            show_unit: true,
            show_ticks: true,
            show_needle: true,
            subtract_ticks: true,
            num_ticks: 2,
            value_position: ValuePosition::Bottom,
            sector_open_angle: 60.0,
            sector_rotation: 0.0,
            sector_min_radius: 0.4,
            sector_max_radius: 0.75,
            tick_min_radius: 0.8,
            tick_max_radius: 1.0,
            needle_radius: 1.0,
            colors: DialColors::default(),
            needle_width: 4.0,
            ticks_width: 4.0,
            ticks_subtract_width: 2.0,
            text_size: 20.0,
            track_value: false,
            density: 1.0,
        }
    }
}

/// Resolved colours handed to the painter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialPalette {
    pub text: Srgba<f64>,
    pub sector: Srgba<f64>,
    pub value_sector: Srgba<f64>,
    pub ticks: Srgba<f64>,
    pub needle: Srgba<f64>,
}

impl From<&DialColors> for DialPalette {
    fn from(colors: &DialColors) -> Self {
        Self {
            text: colors.text.to_srgba(),
            sector: colors.sector.to_srgba(),
            value_sector: colors.value_sector.to_srgba(),
            ticks: colors.ticks.to_srgba(),
            needle: colors.needle.to_srgba(),
        }
    }
}

/// Validated, pixel-resolved appearance shared by every rendering of one knob.
#[derive(Debug, Clone, PartialEq)]
pub struct DialStyle {
    pub half_opening: f64,
    pub sector_rotation: f64,
    pub sector_min_radius: f64,
    pub sector_max_radius: f64,
    pub tick_min_radius: f64,
    pub tick_max_radius: f64,
    pub needle_radius: f64,
    pub num_ticks: u32,
    pub show_value: bool,
    pub show_unit: bool,
    pub show_ticks: bool,
    pub show_needle: bool,
    pub subtract_ticks: bool,
    pub value_position: ValuePosition,
    pub value_num_digits: usize,
    pub unit: UnitLabel,
    pub needle_width: f64,
    pub ticks_width: f64,
    pub ticks_subtract_width: f64,
    pub text_size: f64,
    pub palette: DialPalette,
    pub density: f64,
}

impl DialStyle {
    pub fn from_settings(settings: &KnobSettings) -> Result<Self, ConfigError> {
        let density = ensure_finite("density", settings.density)?;
        if density <= 0.0 {
            return Err(ConfigError::InvalidDensity(density));
        }
        let sector_open_angle = ensure_finite("sector_open_angle", settings.sector_open_angle)?;
        let mapper = RotationMapper::new(0.5 * sector_open_angle)?;

        let text_size = match ensure_finite("text_size", settings.text_size)? {
            size if size > 0.0 => size,
            _ => 10.0,
        };

        Ok(Self {
            half_opening: mapper.half_opening(),
            sector_rotation: ensure_finite("sector_rotation", settings.sector_rotation)?,
            sector_min_radius: ensure_finite("sector_min_radius", settings.sector_min_radius)?,
            sector_max_radius: ensure_finite("sector_max_radius", settings.sector_max_radius)?,
            tick_min_radius: ensure_finite("tick_min_radius", settings.tick_min_radius)?,
            tick_max_radius: ensure_finite("tick_max_radius", settings.tick_max_radius)?,
            needle_radius: ensure_finite("needle_radius", settings.needle_radius)?,
            num_ticks: settings.num_ticks,
            show_value: settings.show_value,
            show_unit: settings.show_unit,
            show_ticks: settings.show_ticks,
            show_needle: settings.show_needle,
            subtract_ticks: settings.subtract_ticks,
            value_position: settings.value_position,
            value_num_digits: settings.value_num_digits,
            unit: settings.unit.clone(),
            needle_width: ensure_finite("needle_width", settings.needle_width)? * density,
            ticks_width: ensure_finite("ticks_width", settings.ticks_width)? * density,
            ticks_subtract_width: ensure_finite(
                "ticks_subtract_width",
                settings.ticks_subtract_width,
            )? * density,
            text_size: text_size * density,
            palette: DialPalette::from(&settings.colors),
            density,
        })
    }

    /// Converts density-independent units to pixels.
    pub fn dp(&self, dp: f64) -> f64 {
        dp * self.density
    }

    /// Clockwise turn of the whole face, position and user rotation combined.
    pub fn face_rotation(&self) -> f64 {
        self.value_position.face_rotation() + self.sector_rotation
    }

    /// Distance from the dial centre at which a label of `text_height` clears
    /// the sector opening. Negative once the opening is wider than a half turn.
    pub fn text_offset(&self, text_height: f64) -> f64 {
        0.5 * (text_height + self.dp(TEXT_MARGIN_DP)) / self.half_opening.to_radians().tan()
    }

    pub fn format_value(&self, value: f64) -> String {
        let unit = self.show_unit.then(|| self.unit.as_str());
        format_value(value, self.value_num_digits, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_value_position_deserialization() {
        let cases = vec![
            ("\"bottom\"", ValuePosition::Bottom),
            ("\"Bottom\"", ValuePosition::Bottom),
            ("\"TOP\"", ValuePosition::Top),
            ("\"0\"", ValuePosition::Bottom),
            ("\"1\"", ValuePosition::Left),
            ("\"3\"", ValuePosition::Right),
            ("\"centre\"", ValuePosition::Center),
            ("\"4\"", ValuePosition::Center),
        ];

        for (json, expected) in cases {
            let deserialized: ValuePosition = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
        assert!(serde_json::from_str::<ValuePosition>("\"diagonal\"").is_err());
    }

    #[test]
    fn value_position_round_trips_through_display() {
        for position in ValuePosition::iter() {
            assert_eq!(position.to_string().parse::<ValuePosition>(), Ok(position));
        }
        assert_eq!(
            serde_json::to_string(&ValuePosition::Right).unwrap(),
            "\"right\""
        );
    }

    #[test]
    fn hex_colors_parse_and_print() {
        let color: HexColor = "#006699".parse().unwrap();
        assert_eq!(color, HexColor::new(0x00, 0x66, 0x99));
        assert_eq!(color.to_string(), "#006699");
        assert!("#zzzzzz".parse::<HexColor>().is_err());

        let rgba = HexColor::new(0xff, 0x00, 0x00).to_srgba();
        assert_eq!((rgba.red, rgba.green, rgba.blue, rgba.alpha), (1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn settings_fill_in_defaults() {
        let settings: KnobSettings = serde_json::from_str(
            r##"{ "max_value": 10, "unit": "V", "colors": { "needle": "#112233" } }"##,
        )
        .unwrap();
        assert_eq!(settings.max_value, 10.0);
        assert_eq!(settings.min_value, 0.0);
        assert_eq!(settings.unit.as_str(), "V");
        assert_eq!(settings.colors.needle, HexColor::new(0x11, 0x22, 0x33));
        assert_eq!(settings.colors.ticks, DialColors::default().ticks);
        assert_eq!(settings.sector_open_angle, 60.0);
    }

    #[test]
    fn style_resolves_density_and_opening() {
        let settings = KnobSettings {
            density: 2.0,
            ..KnobSettings::default()
        };
        let style = DialStyle::from_settings(&settings).unwrap();
        assert_eq!(style.half_opening, 30.0);
        assert_eq!(style.needle_width, 8.0);
        assert_eq!(style.text_size, 40.0);
        assert_eq!(style.dp(48.0), 96.0);
    }

    #[test]
    fn style_rejects_bad_opening_and_density() {
        let settings = KnobSettings {
            sector_open_angle: 360.0,
            ..KnobSettings::default()
        };
        assert_eq!(
            DialStyle::from_settings(&settings),
            Err(ConfigError::InvalidOpenAngle(360.0))
        );

        let settings = KnobSettings {
            density: 0.0,
            ..KnobSettings::default()
        };
        assert_eq!(
            DialStyle::from_settings(&settings),
            Err(ConfigError::InvalidDensity(0.0))
        );
    }

    #[test]
    fn face_rotation_combines_position_and_user_turn() {
        let settings = KnobSettings {
            value_position: ValuePosition::Right,
            sector_rotation: 15.0,
            ..KnobSettings::default()
        };
        let style = DialStyle::from_settings(&settings).unwrap();
        assert_eq!(style.face_rotation(), -75.0);
    }

    #[test]
    fn unit_is_only_shown_when_enabled() {
        let mut settings = KnobSettings {
            unit: UnitLabel::new("Hz"),
            ..KnobSettings::default()
        };
        let style = DialStyle::from_settings(&settings).unwrap();
        assert_eq!(style.format_value(440.0), "440.0 Hz");

        settings.show_unit = false;
        let style = DialStyle::from_settings(&settings).unwrap();
        assert_eq!(style.format_value(440.0), "440.0");
    }
}

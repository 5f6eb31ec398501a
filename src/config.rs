use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Marker size range in pixels.
pub const MIN_SIZE: u32 = 6;
pub const MAX_SIZE: u32 = 400;

/// Maximum border thickness in pixels.
pub const MAX_BORDER_THICKNESS: u32 = 10;

/// Fixed edge length of the (mostly transparent) overlay window. Must stay
/// larger than MAX_SIZE so the marker always fits.
pub const WINDOW_SIZE: f32 = 500.0;

/// The persisted overlay configuration. Field names on disk are fixed by the
/// settings-file format; missing keys fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Marker fill color, as a named color or `#RRGGBB`/`#AARRGGBB`.
    #[serde(rename = "ch_color", default = "default_color")]
    pub color: String,
    /// Marker border color.
    #[serde(rename = "ch_border_color", default = "default_border_color")]
    pub border_color: String,
    /// Marker edge length in pixels.
    #[serde(rename = "ch_size", default = "default_size")]
    pub size: u32,
    /// Overlay opacity, 0.0 (invisible) to 1.0 (opaque).
    #[serde(rename = "ch_opacity", default = "default_opacity")]
    pub opacity: f32,
    /// Border width in pixels; 0 disables the border.
    #[serde(rename = "ch_border_thickness", default)]
    pub border_thickness: u32,
    /// Custom marker image. When set, the image replaces the filled shape.
    #[serde(rename = "ch_img", default)]
    pub image: Option<PathBuf>,
    /// Last window top-left position; `None` means center on screen.
    #[serde(rename = "ch_pos_x", default)]
    pub pos_x: Option<i32>,
    #[serde(rename = "ch_pos_y", default)]
    pub pos_y: Option<i32>,
}

fn default_color() -> String {
    "red".to_string()
}

fn default_border_color() -> String {
    "black".to_string()
}

fn default_size() -> u32 {
    8
}

fn default_opacity() -> f32 {
    1.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: default_color(),
            border_color: default_border_color(),
            size: default_size(),
            opacity: default_opacity(),
            border_thickness: 0,
            image: None,
            pos_x: None,
            pos_y: None,
        }
    }
}

impl Settings {
    /// Force all numeric fields back into their documented ranges. The panel
    /// sliders clamp by construction; this covers hand-edited settings files.
    pub fn clamp_ranges(&mut self) {
        self.size = self.size.clamp(MIN_SIZE, MAX_SIZE);
        self.opacity = self.opacity.clamp(0.0, 1.0);
        self.border_thickness = self.border_thickness.min(MAX_BORDER_THICKNESS);
    }

    pub fn position(&self) -> Option<(i32, i32)> {
        match (self.pos_x, self.pos_y) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.pos_x = Some(x);
        self.pos_y = Some(y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.color, "red");
        assert_eq!(settings.border_color, "black");
        assert_eq!(settings.size, 8);
        assert_eq!(settings.opacity, 1.0);
        assert_eq!(settings.border_thickness, 0);
        assert!(settings.image.is_none());
        assert!(settings.position().is_none());
    }

    #[test]
    fn test_clamp_out_of_range_values() {
        let mut settings = Settings {
            size: 1000,
            opacity: 3.0,
            border_thickness: 99,
            ..Settings::default()
        };
        settings.clamp_ranges();
        assert_eq!(settings.size, MAX_SIZE);
        assert_eq!(settings.opacity, 1.0);
        assert_eq!(settings.border_thickness, MAX_BORDER_THICKNESS);

        let mut settings = Settings {
            size: 1,
            opacity: -0.5,
            ..Settings::default()
        };
        settings.clamp_ranges();
        assert_eq!(settings.size, MIN_SIZE);
        assert_eq!(settings.opacity, 0.0);
    }

    #[test]
    fn test_clamp_leaves_valid_values_alone() {
        let mut settings = Settings {
            size: 42,
            opacity: 0.5,
            border_thickness: 3,
            ..Settings::default()
        };
        settings.clamp_ranges();
        assert_eq!(settings.size, 42);
        assert_eq!(settings.opacity, 0.5);
        assert_eq!(settings.border_thickness, 3);
    }

    #[test]
    fn test_position_requires_both_coordinates() {
        let mut settings = Settings::default();
        settings.pos_x = Some(10);
        assert!(settings.position().is_none());

        settings.set_position(10, 20);
        assert_eq!(settings.position(), Some((10, 20)));
    }
}

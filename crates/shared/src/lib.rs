use serde::{Deserialize, Serialize};

/// RGB color with channels in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Default color applied to unselected models (`#0277bd`).
pub const DEFAULT_MODEL_COLOR: Color = Color {
    r: 0.007_843,
    g: 0.466_667,
    b: 0.741_176,
};

/// Color applied to selected models (`#03a9f4`).
pub const SELECTED_MODEL_COLOR: Color = Color {
    r: 0.011_765,
    g: 0.662_745,
    b: 0.956_863,
};

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` hex string.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| -> Option<f32> {
            let v = u8::from_str_radix(&hex[range], 16).ok()?;
            Some(v as f32 / 255.0)
        };
        Some(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

/// Drawable surface representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
    Points,
    Wireframe,
    #[default]
    Surface,
}

/// Drawable shading interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    #[default]
    Flat,
    Gouraud,
}

/// Bulk display policy applied across the whole model collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub representation: Representation,
    /// Opacity in [0, 1].
    pub opacity: f64,
    pub gouraud_interpolation: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            representation: Representation::Surface,
            opacity: 1.0,
            gouraud_interpolation: false,
        }
    }
}

/// Process-wide model color configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelColors {
    pub default_color: Color,
    pub selected_color: Color,
}

impl Default for ModelColors {
    fn default() -> Self {
        Self {
            default_color: DEFAULT_MODEL_COLOR,
            selected_color: SELECTED_MODEL_COLOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        let c = Color::from_hex("#ff0080").unwrap();
        assert!((c.r - 1.0).abs() < 1e-6);
        assert!(c.g.abs() < 1e-6);
        assert!((c.b - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_color_from_hex_rejects_malformed() {
        assert!(Color::from_hex("0277bd").is_none());
        assert!(Color::from_hex("#0277b").is_none());
        assert!(Color::from_hex("#zzzzzz").is_none());
    }

    #[test]
    fn test_default_colors_match_hex() {
        let default = Color::from_hex("#0277bd").unwrap();
        assert!((default.r - DEFAULT_MODEL_COLOR.r).abs() < 1e-4);
        assert!((default.g - DEFAULT_MODEL_COLOR.g).abs() < 1e-4);
        assert!((default.b - DEFAULT_MODEL_COLOR.b).abs() < 1e-4);

        let selected = Color::from_hex("#03a9f4").unwrap();
        assert!((selected.r - SELECTED_MODEL_COLOR.r).abs() < 1e-4);
        assert!((selected.g - SELECTED_MODEL_COLOR.g).abs() < 1e-4);
        assert!((selected.b - SELECTED_MODEL_COLOR.b).abs() < 1e-4);
    }

    #[test]
    fn test_display_settings_json_round_trip() {
        let settings = DisplaySettings {
            representation: Representation::Wireframe,
            opacity: 0.5,
            gouraud_interpolation: true,
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"wireframe\""));
        let back: DisplaySettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.representation, Representation::Wireframe);
        assert!(back.gouraud_interpolation);
    }
}

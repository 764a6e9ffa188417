use serde::{Deserialize, Serialize};

/// sRGB RGBA color, components in 0-1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color(pub [f32; 4]);

impl Color {
    /// Convert a hex color (#RRGGBB) to sRGB with alpha 1.0.
    pub const fn hex(r: u8, g: u8, b: u8) -> Self {
        Self([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0])
    }

    /// Convert a hex color with custom alpha.
    pub const fn hex_a(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a])
    }

    pub fn alpha(&self) -> f32 {
        self.0[3]
    }

    /// CSS form consumed by the rendering surface: `#rrggbb` when opaque,
    /// `rgba(r, g, b, a)` otherwise.
    pub fn to_css(&self) -> String {
        let [r, g, b, a] = self.0;
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        if a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", to_byte(r), to_byte(g), to_byte(b))
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                to_byte(r),
                to_byte(g),
                to_byte(b),
                a.clamp(0.0, 1.0)
            )
        }
    }
}

/// Label styling shared by every region label layer.
#[derive(Debug, Clone)]
pub struct MapTheme {
    /// Label text: near-white sand #FFF8E7
    pub label_text: Color,
    /// Label halo: dark earth #3C2A1A
    pub label_halo: Color,
    /// Halo width in pixels.
    pub label_halo_width: f32,
    /// Label font size in pixels.
    pub label_size: f32,
    /// Label font stack, first available wins.
    pub label_font: Vec<String>,
}

impl Default for MapTheme {
    fn default() -> Self {
        Self {
            label_text: Color::hex(0xFF, 0xF8, 0xE7),
            label_halo: Color::hex(0x3C, 0x2A, 0x1A),
            label_halo_width: 2.0,
            label_size: 14.0,
            label_font: vec!["Open Sans Bold".into(), "Arial Unicode MS Bold".into()],
        }
    }
}

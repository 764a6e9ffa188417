use serde::{Deserialize, Serialize};

use crate::geo::LngLat;

/// Tunable map behaviour. Loaded from RON; every field has a default so a
/// partial file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Basemap style fetched by the rendering surface.
    pub style_url: String,
    /// Continental anchor the camera starts on.
    pub center: LngLat,
    pub zoom: f64,
    /// Keeps the user from zooming out past the region of interest.
    pub min_zoom: f64,
    /// Keeps the user from zooming in past street level.
    pub max_zoom: f64,

    // -- Region layers --
    pub fill_opacity: f32,
    pub hover_opacity: f32,
    pub outline_width: f32,

    // -- Fly-to --
    pub fly_zoom: f64,
    pub fly_duration_ms: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            style_url: "https://demotiles.maplibre.org/style.json".into(),
            center: LngLat::new(-12.0, 26.0),
            zoom: 5.0,
            min_zoom: 4.0,
            max_zoom: 9.0,
            fill_opacity: 0.5,
            hover_opacity: 0.7,
            outline_width: 2.0,
            fly_zoom: 6.5,
            fly_duration_ms: 2000,
        }
    }
}

impl MapConfig {
    /// Clamp a zoom level into `[min_zoom, max_zoom]`.
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Repair inconsistent values in place, logging each fix.
    pub fn sanitize(&mut self) {
        if self.min_zoom > self.max_zoom {
            log::warn!(
                "min_zoom {} > max_zoom {}, swapping",
                self.min_zoom,
                self.max_zoom
            );
            std::mem::swap(&mut self.min_zoom, &mut self.max_zoom);
        }
        for (name, zoom) in [("zoom", &mut self.zoom), ("fly_zoom", &mut self.fly_zoom)] {
            let clamped = zoom.clamp(self.min_zoom, self.max_zoom);
            if clamped != *zoom {
                log::warn!("{name} {} outside zoom bounds, clamped to {clamped}", *zoom);
                *zoom = clamped;
            }
        }
        for (name, opacity) in [
            ("fill_opacity", &mut self.fill_opacity),
            ("hover_opacity", &mut self.hover_opacity),
        ] {
            let clamped = opacity.clamp(0.0, 1.0);
            if clamped != *opacity {
                log::warn!("{name} {} outside [0, 1], clamped", *opacity);
                *opacity = clamped;
            }
        }
    }
}

/// Load map config from a RON file. Logs a warning and returns the default
/// config if the file is missing or malformed.
pub fn load_map_config(path: &str) -> MapConfig {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("failed to read {}: {}, using default config", path, e);
            return MapConfig::default();
        }
    };
    parse_map_config(&content).unwrap_or_else(|e| {
        log::warn!("failed to parse RON {}: {}, using default config", path, e);
        MapConfig::default()
    })
}

/// Parse and sanitize a RON config string.
pub fn parse_map_config(content: &str) -> Result<MapConfig, ron::error::SpannedError> {
    let mut config = ron::from_str::<MapConfig>(content)?;
    config.sanitize();
    Ok(config)
}

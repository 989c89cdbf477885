use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::model::{GeoPoint, MapResult, ViewportSize};
use crate::view::{CanvasConfig, MapStyle, PanelConfig};

/// Where region boundaries are fetched from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// URL or local path; `None` means the host supplies geometry itself.
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        BoundaryConfig {
            url: None,
            timeout_secs: 30,
        }
    }
}

/// Complete engine configuration. Every field has a default, so `{}` is a
/// valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub viewport: ViewportSize,
    pub canvas: CanvasConfig,
    pub panel: PanelConfig,
    pub style: MapStyle,
    pub boundaries: BoundaryConfig,
    /// Marker fallback when positions stay geographic.
    pub default_center: GeoPoint,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            viewport: ViewportSize::default(),
            canvas: CanvasConfig::default(),
            panel: PanelConfig::default(),
            style: MapStyle::default(),
            boundaries: BoundaryConfig::default(),
            default_center: GeoPoint::new(133.7751, -25.2744),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(content: &str) -> MapResult<Self> {
        let config: EngineConfig = serde_json::from_str(content)
            .map_err(|e| MapError::Config(format!("Invalid JSON config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> MapResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MapError::Io(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        tracing::info!("Loaded engine config from {}", path.display());
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> MapResult<()> {
        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            return Err(MapError::Config("Viewport dimensions must be > 0".to_string()));
        }

        let canvas = &self.canvas;
        // Reset must land exactly on 1.0
        if !(canvas.min_zoom > 0.0 && canvas.min_zoom <= 1.0 && canvas.max_zoom >= 1.0) {
            return Err(MapError::Config(format!(
                "Zoom range {}..{} must be positive and contain 1.0",
                canvas.min_zoom, canvas.max_zoom
            )));
        }
        if canvas.zoom_step <= 0.0 {
            return Err(MapError::Config("Zoom step must be > 0".to_string()));
        }
        if canvas.click_slop_px < 0.0 {
            return Err(MapError::Config("Click slop must not be negative".to_string()));
        }

        let points = &self.panel.snap_points;
        if points.is_empty() {
            return Err(MapError::Config("At least one snap point is required".to_string()));
        }
        if let Some(point) = points.iter().find(|p| !(p.fraction > 0.0 && p.fraction <= 1.0)) {
            return Err(MapError::Config(format!(
                "Snap point {} fraction {} is outside (0, 1]",
                point.name, point.fraction
            )));
        }
        if points.windows(2).any(|pair| pair[0].fraction >= pair[1].fraction) {
            return Err(MapError::Config("Snap points must be in ascending order".to_string()));
        }

        if self.boundaries.timeout_secs == 0 {
            return Err(MapError::Config("Boundary timeout must be > 0".to_string()));
        }
        if !self.default_center.is_valid() {
            return Err(MapError::Config("Default center is not a valid lng/lat".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::SnapPoint;
    use std::io::Write;

    #[test]
    fn test_empty_object_is_all_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.canvas.min_zoom, 0.5);
        assert_eq!(config.canvas.max_zoom, 3.0);
        assert_eq!(config.canvas.zoom_step, 0.25);
        assert_eq!(config.boundaries.timeout_secs, 30);
        assert_eq!(config.panel.snap_points.len(), 3);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{"canvas": {"max_zoom": 5.0}, "boundaries": {"url": "https://example.com/lga.geojson"}}"#,
        )
        .unwrap();
        assert_eq!(config.canvas.max_zoom, 5.0);
        assert_eq!(config.canvas.min_zoom, 0.5);
        assert_eq!(config.boundaries.url.as_deref(), Some("https://example.com/lga.geojson"));
        assert_eq!(config.boundaries.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        assert!(matches!(EngineConfig::from_json_str("{"), Err(MapError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EngineConfig::default();
        config.canvas.min_zoom = 4.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.canvas.max_zoom = 0.8;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.canvas.zoom_step = 0.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.panel.snap_points = vec![SnapPoint::new("big", 0.9), SnapPoint::new("small", 0.2)];
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.panel.snap_points = vec![SnapPoint::new("over", 1.5)];
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.panel.snap_points.clear();
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.boundaries.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.viewport = ViewportSize::new(0.0, 600.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"viewport": {{"width": 400.0, "height": 300.0}}}}"#).unwrap();
        let config = EngineConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.viewport, ViewportSize::new(400.0, 300.0));

        assert!(matches!(
            EngineConfig::load_from_file(Path::new("/definitely/missing.json")),
            Err(MapError::Io(_))
        ));
    }
}

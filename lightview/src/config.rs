use std::path::Path;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::framebuffer::MIN_TIME_UPDATE;

// Texture and scheduling tuneables:
// - bubble_radius: half the edge of the generated light bubble, in texels.
// - brightness_intensity: alpha gain applied to the bubble falloff.
// - center_factor: fraction of the radius that stays fully lit.
// - shade_diameter: edge of the shade stamp, in texels.
// - shade_scale: shade stamp size relative to one tile.
// - min_update_interval_ms: default delay for `LightView::schedule_painting`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LightingConfig {
    pub bubble_radius: u16,
    pub brightness_intensity: f32,
    pub center_factor: f32,
    pub shade_diameter: u16,
    pub shade_scale: f32,
    pub min_update_interval_ms: u64,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            bubble_radius: 256,
            brightness_intensity: 1.2,
            center_factor: 0.0,
            shade_diameter: 6,
            shade_scale: 1.9,
            min_update_interval_ms: MIN_TIME_UPDATE.as_millis() as u64,
        }
    }
}

impl LightingConfig {
    /// Parses and validates a JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), ?config, "loaded lighting config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bubble_radius == 0 {
            return Err(invalid("bubble_radius", "must be positive"));
        }
        if !self.brightness_intensity.is_finite() || self.brightness_intensity <= 0.0 {
            return Err(invalid("brightness_intensity", "must be a positive number"));
        }
        if !(0.0..1.0).contains(&self.center_factor) {
            return Err(invalid("center_factor", "must be in [0, 1)"));
        }
        if self.shade_diameter < 3 {
            return Err(invalid("shade_diameter", "needs at least one interior texel"));
        }
        if !self.shade_scale.is_finite() || self.shade_scale <= 0.0 {
            return Err(invalid("shade_scale", "must be a positive number"));
        }
        Ok(())
    }

    pub fn min_update_interval(&self) -> Duration {
        Duration::from_millis(self.min_update_interval_ms)
    }

    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(LightingConfig)
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_document_is_the_default() {
        let config = LightingConfig::from_json_str("{}").expect("parse");
        assert_eq!(config, LightingConfig::default());
        assert_eq!(config.min_update_interval(), Duration::from_millis(16));
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config =
            LightingConfig::from_json_str(r#"{"bubble_radius": 64, "shade_scale": 1.5}"#)
                .expect("parse");
        assert_eq!(config.bubble_radius, 64);
        assert_eq!(config.shade_scale, 1.5);
        assert_eq!(config.shade_diameter, 6);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = LightingConfig::from_json_str(r#"{"center_factor": 1.0}"#)
            .expect_err("center_factor 1.0 leaves no falloff");
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "center_factor",
                ..
            }
        ));

        let err = LightingConfig::from_json_str(r#"{"shade_diameter": 2}"#).expect_err("too small");
        assert!(err.to_string().contains("shade_diameter"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = LightingConfig::from_json_str("{ bubble_radius: 1 }").expect_err("bad json");
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = LightingConfig::load(Path::new("/nonexistent/lighting.json"))
            .expect_err("no such file");
        assert!(err.to_string().contains("/nonexistent/lighting.json"));
    }

    #[test]
    fn schema_lists_every_field() {
        let schema = serde_json::to_value(LightingConfig::json_schema()).expect("schema json");
        let properties = schema["properties"].as_object().expect("properties");
        assert_eq!(properties.len(), 6);
        assert!(properties.contains_key("min_update_interval_ms"));
    }
}

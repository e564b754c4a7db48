//! Board configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default lower bound for the viewport scale.
pub const MIN_SCALE: f64 = 0.05;
/// Default upper bound for the viewport scale.
pub const MAX_SCALE: f64 = 20.0;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tunable constants for the drawing surface.
///
/// Every field has a default, so a JSON override only needs to name the
/// fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Smallest allowed scale.
    pub min_scale: f64,
    /// Largest allowed scale.
    pub max_scale: f64,
    /// Wheel zoom base; the factor is `base^(-delta_y)`.
    pub wheel_zoom_base: f64,
    /// Eraser radius in screen pixels.
    pub erase_radius_px: f64,
    /// Sampling step along an eraser drag, in screen pixels.
    pub erase_step_px: f64,
    /// Padding around content in exported documents (world units).
    pub export_padding: f64,
    /// Padding around content when fitting an imported document.
    pub fit_padding: f64,
    /// Initial drawing color.
    pub default_color: String,
    /// Initial stroke width.
    pub default_stroke_width: f64,
    /// Color for imported strokes that declare none.
    pub import_default_color: String,
    /// Width for imported strokes that declare none.
    pub import_default_width: f64,
    /// Fill of the background rect in exported documents.
    pub background: String,
    /// Key code that turns a primary-button drag into a pan while held.
    pub pan_key: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            wheel_zoom_base: 1.0015,
            erase_radius_px: 10.0,
            erase_step_px: 8.0,
            export_padding: 20.0,
            fit_padding: 50.0,
            default_color: "#0c62f0".to_string(),
            default_stroke_width: 6.0,
            import_default_color: "#000000".to_string(),
            import_default_width: 2.0,
            background: "white".to_string(),
            pan_key: "Space".to_string(),
        }
    }
}

impl BoardConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that the numeric constants are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("min_scale", self.min_scale)?;
        positive("max_scale", self.max_scale)?;
        if self.min_scale > self.max_scale {
            return Err(ConfigError::Invalid {
                field: "min_scale",
                reason: format!("{} exceeds max_scale {}", self.min_scale, self.max_scale),
            });
        }
        positive("wheel_zoom_base", self.wheel_zoom_base)?;
        positive("erase_radius_px", self.erase_radius_px)?;
        positive("erase_step_px", self.erase_step_px)?;
        non_negative("export_padding", self.export_padding)?;
        non_negative("fit_padding", self.fit_padding)?;
        positive("default_stroke_width", self.default_stroke_width)?;
        positive("import_default_width", self.import_default_width)?;
        writable_color("default_color", &self.default_color)?;
        writable_color("import_default_color", &self.import_default_color)?;
        Ok(())
    }
}

fn writable_color(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("{value:?} is not a stroke color"),
        });
    }
    Ok(())
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} is not a positive number"),
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} is negative or not finite"),
        })
    }
}

//! Engine configuration.
//!
//! Everything the layout pipeline used to read from scattered constants
//! lives here as an explicit configuration object, built once at
//! composition time and passed by reference. A JSON/JSON5 file can
//! override the defaults.

use crate::text_metrics::FontProps;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default maximum label width before ellipsis truncation, in pixels.
pub const DEFAULT_MAX_LABEL_WIDTH: f32 = 50.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] json5::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelConfig {
    pub font_family: String,
    pub font_size: f32,
    /// Use the calibrated character table instead of font lookup.
    pub fast_text_metrics: bool,
    /// Maximum formatted-label width before truncation.
    pub max_label_width: f32,
    /// Gap between a shape edge and an outside label.
    pub label_margin: f32,
    /// Absolute value beyond which a raw value is reported out of range
    /// by the warning pass (2^53, the largest exactly-representable
    /// integer range).
    pub safe_value_range: f64,
    pub scatter: ScatterLabelConfig,
    pub donut: DonutLabelConfig,
    pub funnel: FunnelLabelConfig,
    pub waterfall: WaterfallLabelConfig,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, sans-serif".to_string(),
            font_size: 12.0,
            fast_text_metrics: false,
            max_label_width: DEFAULT_MAX_LABEL_WIDTH,
            label_margin: 6.0,
            safe_value_range: 9_007_199_254_740_992.0,
            scatter: ScatterLabelConfig::default(),
            donut: DonutLabelConfig::default(),
            funnel: FunnelLabelConfig::default(),
            waterfall: WaterfallLabelConfig::default(),
        }
    }
}

impl LabelConfig {
    pub fn font(&self) -> FontProps {
        FontProps::new(self.font_family.clone(), self.font_size)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScatterLabelConfig {
    /// Extra gap between the marker edge and the label, on top of the
    /// marker radius.
    pub marker_margin: f32,
}

impl Default for ScatterLabelConfig {
    fn default() -> Self {
        Self { marker_margin: 5.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DonutLabelConfig {
    /// Label anchor radius as a fraction of the outer arc radius.
    pub label_radius_factor: f32,
}

impl Default for DonutLabelConfig {
    fn default() -> Self {
        Self {
            label_radius_factor: 1.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FunnelLabelConfig {
    /// Gap between the bar end and an outside-end label.
    pub end_margin: f32,
}

impl Default for FunnelLabelConfig {
    fn default() -> Self {
        Self { end_margin: 6.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WaterfallLabelConfig {
    /// Gap between the bar top and an above label.
    pub label_margin: f32,
}

impl Default for WaterfallLabelConfig {
    fn default() -> Self {
        Self { label_margin: 8.0 }
    }
}

/// Load configuration from a JSON or JSON5 file; `None` yields defaults.
pub fn load_config(path: Option<&Path>) -> Result<LabelConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(LabelConfig::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config: LabelConfig = json5::from_str(&contents)?;
    Ok(config)
}

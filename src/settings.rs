//! Per-visual label settings and the host property round trip.
//!
//! The host reads current values through `enumerate_data_labels` and later
//! pushes edited values back as a JSON object map on the next data update.
//! The rendering path never mutates settings beyond normalizing
//! out-of-range values at apply time.

use crate::data::ChartKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_LABEL_COLOR: &str = "#777777";
/// Color used when a label is committed inside its owning shape.
pub const DEFAULT_INSIDE_LABEL_COLOR: &str = "#FFFFFF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelPosition {
    Above,
    Below,
    InsideCenter,
    InsideEnd,
    InsideBase,
    OutsideEnd,
}

impl LabelPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            LabelPosition::Above => "above",
            LabelPosition::Below => "below",
            LabelPosition::InsideCenter => "insideCenter",
            LabelPosition::InsideEnd => "insideEnd",
            LabelPosition::InsideBase => "insideBase",
            LabelPosition::OutsideEnd => "outsideEnd",
        }
    }

    fn from_str(raw: &str) -> Option<Self> {
        match raw {
            "above" => Some(LabelPosition::Above),
            "below" => Some(LabelPosition::Below),
            "insideCenter" => Some(LabelPosition::InsideCenter),
            "insideEnd" => Some(LabelPosition::InsideEnd),
            "insideBase" => Some(LabelPosition::InsideBase),
            "outsideEnd" => Some(LabelPosition::OutsideEnd),
            _ => None,
        }
    }
}

/// Display-unit selector. `0.0` means automatic.
pub const DISPLAY_UNITS_AUTO: f64 = 0.0;

/// Upper bound for host-supplied precision; the host UI caps decimal
/// places well below this.
pub const MAX_LABEL_PRECISION: u32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSettings {
    pub show: bool,
    pub color: String,
    /// `0.0` = automatic; otherwise a numeric unit selector such as
    /// `1000.0` (thousands) or `1e9` (billions).
    pub display_units: f64,
    /// `None` = formatter default.
    pub precision: Option<u32>,
    pub position: Option<LabelPosition>,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            show: false,
            color: DEFAULT_LABEL_COLOR.to_string(),
            display_units: DISPLAY_UNITS_AUTO,
            precision: None,
            position: None,
        }
    }
}

impl LabelSettings {
    pub fn shown() -> Self {
        Self {
            show: true,
            ..Self::default()
        }
    }

    /// Apply a host-edited `labels` object map. Unknown keys are ignored;
    /// precision is clamped into `[0, MAX_LABEL_PRECISION]`.
    pub fn apply_object(&mut self, object: &Value) {
        let Some(map) = object.as_object() else {
            return;
        };
        if let Some(show) = map.get("show").and_then(Value::as_bool) {
            self.show = show;
        }
        if let Some(color) = map.get("color").and_then(Value::as_str) {
            self.color = color.to_string();
        }
        if let Some(units) = map.get("labelDisplayUnits").and_then(Value::as_f64) {
            self.display_units = if units.is_finite() && units >= 0.0 {
                units
            } else {
                DISPLAY_UNITS_AUTO
            };
        }
        if let Some(precision) = map.get("labelPrecision") {
            self.precision = match precision.as_f64() {
                Some(p) if p.is_finite() => {
                    Some(p.clamp(0.0, MAX_LABEL_PRECISION as f64) as u32)
                }
                _ => None,
            };
        }
        if let Some(position) = map.get("labelPosition").and_then(Value::as_str) {
            self.position = LabelPosition::from_str(position);
        }
    }
}

/// What the enumeration contract exposes for a given chart kind.
#[derive(Debug, Clone, Copy)]
pub struct LabelCapabilities {
    pub supports_display_units: bool,
    pub supports_precision: bool,
    pub positions: &'static [LabelPosition],
}

impl ChartKind {
    pub fn label_capabilities(self) -> LabelCapabilities {
        match self {
            ChartKind::Scatter | ChartKind::Line => LabelCapabilities {
                supports_display_units: true,
                supports_precision: true,
                positions: &[LabelPosition::Above, LabelPosition::Below],
            },
            ChartKind::Map => LabelCapabilities {
                supports_display_units: false,
                supports_precision: false,
                positions: &[LabelPosition::Above, LabelPosition::Below],
            },
            ChartKind::Column
            | ChartKind::StackedColumn
            | ChartKind::HundredPercentStackedColumn => LabelCapabilities {
                supports_display_units: true,
                supports_precision: true,
                positions: &[],
            },
            ChartKind::Donut => LabelCapabilities {
                supports_display_units: true,
                supports_precision: true,
                positions: &[],
            },
            ChartKind::Funnel => LabelCapabilities {
                supports_display_units: true,
                supports_precision: true,
                positions: &[LabelPosition::InsideCenter, LabelPosition::OutsideEnd],
            },
            ChartKind::Waterfall => LabelCapabilities {
                supports_display_units: true,
                supports_precision: true,
                positions: &[],
            },
        }
    }
}

/// One object instance returned to the host's enumeration call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualObjectInstance {
    pub object_name: String,
    pub properties: serde_json::Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_values: Option<serde_json::Map<String, Value>>,
}

/// Build the `labels` enumeration: `show` and `color` always, units and
/// precision only when the chart supports them, position (with its
/// allow-list) only when configurable.
pub fn enumerate_data_labels(
    settings: &LabelSettings,
    kind: ChartKind,
) -> Vec<VisualObjectInstance> {
    let caps = kind.label_capabilities();
    let mut properties = serde_json::Map::new();
    properties.insert("show".to_string(), Value::Bool(settings.show));
    properties.insert("color".to_string(), Value::String(settings.color.clone()));
    if caps.supports_display_units {
        properties.insert(
            "labelDisplayUnits".to_string(),
            serde_json::json!(settings.display_units),
        );
    }
    if caps.supports_precision {
        properties.insert(
            "labelPrecision".to_string(),
            match settings.precision {
                Some(p) => serde_json::json!(p),
                None => Value::Null,
            },
        );
    }
    let mut valid_values = None;
    if !caps.positions.is_empty() {
        let position = settings.position.unwrap_or(caps.positions[0]);
        properties.insert(
            "labelPosition".to_string(),
            Value::String(position.as_str().to_string()),
        );
        let allowed: Vec<Value> = caps
            .positions
            .iter()
            .map(|p| Value::String(p.as_str().to_string()))
            .collect();
        let mut map = serde_json::Map::new();
        map.insert("labelPosition".to_string(), Value::Array(allowed));
        valid_values = Some(map);
    }
    vec![VisualObjectInstance {
        object_name: "labels".to_string(),
        properties,
        valid_values,
    }]
}

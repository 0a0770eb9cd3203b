//! Point-marker label strategy, shared by scatter, line, and map visuals.
//!
//! Labels anchor above or below the marker by its radius plus a fixed
//! margin; the direction comes from the position setting.

use super::types::{LabelCandidate, TextAnchor};
use crate::config::LabelConfig;
use crate::data::DataPoint;
use crate::format::LabelTextBuilder;
use crate::settings::{LabelPosition, LabelSettings};
use crate::text_metrics::TextMeasurer;

/// One rendered marker: data point plus its screen geometry.
#[derive(Debug, Clone)]
pub struct MarkerPoint {
    pub data: DataPoint,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

pub fn marker_label_candidates(
    points: &[MarkerPoint],
    settings: &LabelSettings,
    measurer: &TextMeasurer,
    config: &LabelConfig,
) -> Vec<LabelCandidate> {
    let mut builder = LabelTextBuilder::new(measurer, settings, config);
    let font = builder.font().clone();
    let text_height = measurer.estimate_height(&font);
    let below = settings.position == Some(LabelPosition::Below);
    let margin = config.scatter.marker_margin;

    let mut candidates = Vec::new();
    for point in points {
        // Ineligible points are excluded before any measurement runs.
        if !point.data.is_labelable() {
            continue;
        }
        let value = point.data.value.unwrap_or_default();
        let text = builder.format_value(value, None, point.data.format_string.as_deref(), None);
        let width = measurer.measure_width(&text, &font);
        let anchor_y = if below {
            point.y + point.radius + margin + text_height
        } else {
            point.y - point.radius - margin
        };
        let fill = point
            .data
            .label_fill
            .clone()
            .unwrap_or_else(|| settings.color.clone());
        candidates.push(LabelCandidate {
            owner_key: point.data.identity.clone(),
            anchor_x: point.x,
            anchor_y,
            text,
            width,
            height: text_height,
            fill,
            anchor: TextAnchor::Middle,
            inside_shape: false,
        });
    }
    candidates
}

//! Donut/pie label strategy.
//!
//! Labels anchor on the outer-arc centroid of each slice, pushed out past
//! the arc by a configurable radius factor. Positions are relative to the
//! donut center; the collision resolver receives the center as a
//! translation so boxes are tested in absolute viewport coordinates.
//! Angles follow the pie convention: zero at twelve o'clock, clockwise.

use super::types::{LabelCandidate, TextAnchor};
use crate::config::LabelConfig;
use crate::data::DataPoint;
use crate::format::LabelTextBuilder;
use crate::settings::LabelSettings;
use crate::text_metrics::TextMeasurer;
use std::f32::consts::{PI, TAU};

#[derive(Debug, Clone)]
pub struct DonutSlice {
    pub data: DataPoint,
    /// Radians from twelve o'clock, clockwise.
    pub start_angle: f32,
    pub end_angle: f32,
}

impl DonutSlice {
    pub fn mid_angle(&self) -> f32 {
        ((self.start_angle + self.end_angle) / 2.0).rem_euclid(TAU)
    }
}

/// Text anchor for a slice label: slices on the right half read outward
/// with `start`, left-half slices flip to `end`.
pub fn slice_text_anchor(mid_angle: f32) -> TextAnchor {
    if mid_angle.rem_euclid(TAU) < PI {
        TextAnchor::Start
    } else {
        TextAnchor::End
    }
}

pub fn donut_label_candidates(
    slices: &[DonutSlice],
    radius: f32,
    settings: &LabelSettings,
    measurer: &TextMeasurer,
    config: &LabelConfig,
) -> Vec<LabelCandidate> {
    let mut builder = LabelTextBuilder::new(measurer, settings, config);
    let font = builder.font().clone();
    let text_height = measurer.estimate_height(&font);
    let label_radius = radius * config.donut.label_radius_factor;

    let mut candidates = Vec::new();
    for slice in slices {
        if !slice.data.is_labelable() {
            continue;
        }
        let value = slice.data.value.unwrap_or_default();
        let text = builder.format_value(value, None, slice.data.format_string.as_deref(), None);
        let width = measurer.measure_width(&text, &font);

        let mid = slice.mid_angle();
        let anchor_x = mid.sin() * label_radius;
        let anchor_y = -mid.cos() * label_radius + text_height / 2.0;
        let fill = slice
            .data
            .label_fill
            .clone()
            .unwrap_or_else(|| settings.color.clone());
        candidates.push(LabelCandidate {
            owner_key: slice.data.identity.clone(),
            anchor_x,
            anchor_y,
            text,
            width,
            height: text_height,
            fill,
            anchor: slice_text_anchor(mid),
            inside_shape: false,
        });
    }
    candidates
}

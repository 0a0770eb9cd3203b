//! Waterfall label strategy.
//!
//! Each bar spans `position .. position + value` in domain units, where
//! `position` is the running total before the bar. Decreases label below
//! the bar, increases above it, and when the preferred side has no room
//! the label falls back to a clamped midpoint inside the bar, which keeps
//! it on-screen even when the bar itself is clipped at the viewport edge.

use super::types::{LabelCandidate, LinearScale, TextAnchor};
use crate::config::LabelConfig;
use crate::data::DataPoint;
use crate::format::LabelTextBuilder;
use crate::settings::{DEFAULT_INSIDE_LABEL_COLOR, LabelSettings};
use crate::text_metrics::TextMeasurer;

/// One waterfall bar before pixel mapping. `position` is the running
/// total at the bar's base; the total bar uses `position = 0` with the
/// grand total as its value.
#[derive(Debug, Clone)]
pub struct WaterfallBar {
    pub data: DataPoint,
    pub position: f64,
}

/// A resolved label ordinate plus the inside/outside decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterfallLabelY {
    pub y: f32,
    pub inside: bool,
}

/// Compute the label baseline for one bar.
///
/// Decreases try below the bar, increases try above it; when the
/// preferred side has no room the result is the midpoint of the bar's
/// start/end pixel positions clamped into `[0, scale(domain floor)]`,
/// with `inside` set.
pub fn waterfall_label_y_position(
    scale: &LinearScale,
    bar: &WaterfallBar,
    text_height: f32,
    label_margin: f32,
) -> WaterfallLabelY {
    let value = bar.data.value.unwrap_or(0.0);
    // Bar height in pixel space.
    let y_value = scale.scale(0.0) - scale.scale(value.abs());
    let y_pos = scale.scale(bar.position);
    // Pixel position of the domain floor, the lower clipping bound.
    let scale_min_domain = scale.scale(scale.domain().0);
    let end_position = scale.scale(bar.position + value);

    if value < 0.0 {
        let below = y_pos + y_value + text_height;
        if scale_min_domain > below {
            return WaterfallLabelY {
                y: below,
                inside: false,
            };
        }
    } else {
        let above = y_pos - y_value - label_margin;
        if above > 0.0 {
            return WaterfallLabelY {
                y: above,
                inside: false,
            };
        }
    }

    // No room outside in the preferred direction: clamp both ends of the
    // bar into the visible pixel range and sit at their midpoint.
    let floor = scale_min_domain.max(0.0);
    let clamped_start = y_pos.clamp(0.0, floor);
    let clamped_end = end_position.clamp(0.0, floor);
    WaterfallLabelY {
        y: (clamped_start + clamped_end) / 2.0,
        inside: true,
    }
}

/// Whether a bar's label can be shown at all.
///
/// An outside position that is on-screen always fits, with no size check
/// against the bar. The outside candidate is sign-dependent: below the
/// bar for a decrease, above it otherwise, the same decision the
/// Y-positioning makes. Only when the label would have to sit inside
/// does the measured text box get compared against the bar's width and
/// height; labels exceeding either dimension are dropped, never shrunk.
pub fn does_label_fit_in_shape(
    bar: &WaterfallBar,
    scale: &LinearScale,
    category_width: f32,
    label_margin: f32,
    text_width: f32,
    text_height: f32,
) -> bool {
    let Some(value) = bar.data.value else {
        return false;
    };
    let placed = waterfall_label_y_position(scale, bar, text_height, label_margin);
    if !placed.inside {
        return true;
    }
    let bar_height = (scale.scale(0.0) - scale.scale(value)).abs();
    text_width <= category_width && text_height <= bar_height
}

pub fn waterfall_label_candidates(
    bars: &[WaterfallBar],
    scale: &LinearScale,
    category_width: f32,
    settings: &LabelSettings,
    measurer: &TextMeasurer,
    config: &LabelConfig,
) -> Vec<LabelCandidate> {
    let mut builder = LabelTextBuilder::new(measurer, settings, config);
    let font = builder.font().clone();
    let text_height = measurer.estimate_height(&font);
    let margin = config.waterfall.label_margin;

    let mut candidates = Vec::new();
    for bar in bars {
        if !bar.data.is_labelable() {
            continue;
        }
        let value = bar.data.value.unwrap_or_default();
        let text = builder.format_value(value, None, bar.data.format_string.as_deref(), None);
        let width = measurer.measure_width(&text, &font);

        if !does_label_fit_in_shape(bar, scale, category_width, margin, width, text_height) {
            continue;
        }

        let placed = waterfall_label_y_position(scale, bar, text_height, margin);
        let anchor_x = bar.data.category_index as f32 * category_width + category_width / 2.0;
        let fill = if placed.inside {
            DEFAULT_INSIDE_LABEL_COLOR.to_string()
        } else {
            bar.data
                .label_fill
                .clone()
                .unwrap_or_else(|| settings.color.clone())
        };
        candidates.push(LabelCandidate {
            owner_key: bar.data.identity.clone(),
            anchor_x,
            anchor_y: placed.y,
            text,
            width,
            height: text_height,
            fill,
            anchor: TextAnchor::Middle,
            inside_shape: placed.inside,
        });
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(key: &str, index: usize, position: f64, value: Option<f64>) -> WaterfallBar {
        let mut data = DataPoint::new(key, index, value);
        data.category = Some(key.to_string());
        WaterfallBar { data, position }
    }

    #[test]
    fn increase_with_headroom_labels_above_the_bar() {
        // Domain [0, 200] over a 400px panel.
        let scale = LinearScale::new((0.0, 200.0), (400.0, 0.0));
        let b = bar("a", 0, 0.0, Some(50.0));
        let placed = waterfall_label_y_position(&scale, &b, 15.0, 8.0);
        assert!(!placed.inside);
        // Bar top is at 300px; label sits 8px above it.
        assert_eq!(placed.y, 292.0);
    }

    #[test]
    fn decrease_with_room_labels_below_the_bar() {
        let scale = LinearScale::new((0.0, 200.0), (400.0, 0.0));
        // Running total 150, drop of 50: bar spans 100..150.
        let b = bar("a", 0, 150.0, Some(-50.0));
        let placed = waterfall_label_y_position(&scale, &b, 15.0, 8.0);
        assert!(!placed.inside);
        // Bar bottom is at 200px; baseline 15px under it.
        assert_eq!(placed.y, 215.0);
    }

    #[test]
    fn clipped_decrease_falls_back_to_clamped_midpoint() {
        // Domain [-100, 200]: a drop to the floor has no room below.
        let scale = LinearScale::new((-100.0, 200.0), (300.0, 0.0));
        let b = bar("a", 0, 0.0, Some(-100.0));
        let placed = waterfall_label_y_position(&scale, &b, 50.0, 8.0);
        assert!(placed.inside);
        // Bar spans pixels 200..300; midpoint of the clamped pair.
        assert_eq!(placed.y, 250.0);
        assert!(placed.y >= 0.0 && placed.y <= 300.0);
    }

    #[test]
    fn positive_outside_position_always_fits() {
        let scale = LinearScale::new((0.0, 200.0), (400.0, 0.0));
        let b = bar("a", 0, 0.0, Some(50.0));
        // Deliberately huge text: outside placement never checks size.
        assert!(does_label_fit_in_shape(&b, &scale, 10.0, 8.0, 900.0, 50.0));
    }

    #[test]
    fn high_decrease_with_room_below_fits_any_text() {
        let scale = LinearScale::new((0.0, 200.0), (400.0, 0.0));
        // A drop near the top of the chart: the label goes below the bar
        // with ample room, so text wider than the band still fits.
        let b = bar("a", 0, 190.0, Some(-50.0));
        let placed = waterfall_label_y_position(&scale, &b, 15.0, 8.0);
        assert!(!placed.inside);
        assert!(does_label_fit_in_shape(&b, &scale, 40.0, 8.0, 60.0, 15.0));
    }

    #[test]
    fn inside_label_taller_than_the_bar_does_not_fit() {
        let scale = LinearScale::new((0.0, 200.0), (200.0, 0.0));
        // Bar fills the full panel height: no outside room above.
        let b = bar("a", 0, 0.0, Some(200.0));
        assert!(!does_label_fit_in_shape(&b, &scale, 60.0, 8.0, 30.0, 300.0));
        assert!(does_label_fit_in_shape(&b, &scale, 60.0, 8.0, 30.0, 15.0));
    }

    #[test]
    fn null_value_never_fits() {
        let scale = LinearScale::new((0.0, 200.0), (200.0, 0.0));
        let b = bar("a", 0, 0.0, None);
        assert!(!does_label_fit_in_shape(&b, &scale, 60.0, 8.0, 5.0, 5.0));
    }

    #[test]
    fn anchor_x_sits_at_the_band_center() {
        let scale = LinearScale::new((0.0, 200.0), (400.0, 0.0));
        let bars = vec![bar("a", 0, 0.0, Some(50.0)), bar("b", 1, 50.0, Some(30.0))];
        let candidates = waterfall_label_candidates(
            &bars,
            &scale,
            80.0,
            &LabelSettings::shown(),
            &TextMeasurer::fast(),
            &LabelConfig::default(),
        );
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].anchor_x, 40.0);
        assert_eq!(candidates[1].anchor_x, 120.0);
    }

    #[test]
    fn inside_fallback_uses_the_inside_color() {
        let scale = LinearScale::new((0.0, 200.0), (200.0, 0.0));
        // Full-height bar: label must go inside.
        let bars = vec![bar("a", 0, 0.0, Some(200.0))];
        let candidates = waterfall_label_candidates(
            &bars,
            &scale,
            120.0,
            &LabelSettings::shown(),
            &TextMeasurer::fast(),
            &LabelConfig::default(),
        );
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].inside_shape);
        assert_eq!(candidates[0].fill, DEFAULT_INSIDE_LABEL_COLOR);
    }
}

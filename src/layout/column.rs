//! Column/bar label strategy: clustered, stacked, and 100%-stacked.
//!
//! Placement is decided first as a pure function of the shape geometry
//! (`decide_placement`), and the label color is then a pure read of that
//! decision. Labels that end up inside a shape too small for their text
//! are dropped rather than shrunk.

use super::types::{LabelCandidate, TextAnchor};
use crate::config::LabelConfig;
use crate::data::{ChartKind, DataPoint};
use crate::format::LabelTextBuilder;
use crate::settings::{DEFAULT_INSIDE_LABEL_COLOR, LabelSettings};
use crate::text_metrics::TextMeasurer;

/// One rendered column: data point plus its screen rectangle. For
/// stacked charts `last_in_stack` marks the topmost series segment,
/// which defaults to an outside label when there is headroom.
#[derive(Debug, Clone)]
pub struct ColumnShape {
    pub data: DataPoint,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub last_in_stack: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub inside: bool,
}

/// Decide inside-vs-outside for one column. Stacked segments below the
/// top of their stack always label inside; the stack top (and every
/// clustered column) labels outside when the viewport has headroom above
/// the shape.
pub fn decide_placement(
    kind: ChartKind,
    shape: &ColumnShape,
    text_height: f32,
    margin: f32,
) -> Placement {
    if kind.is_stacked() && !shape.last_in_stack {
        return Placement { inside: true };
    }
    let outside_y = shape.y - margin;
    Placement {
        inside: outside_y - text_height < 0.0,
    }
}

/// Whether the measured text box fits within the shape when placed
/// inside. Outside placements never need this check.
pub fn fits_in_shape(shape: &ColumnShape, text_width: f32, text_height: f32) -> bool {
    text_width <= shape.width && text_height <= shape.height
}

pub fn column_label_candidates(
    kind: ChartKind,
    shapes: &[ColumnShape],
    settings: &LabelSettings,
    measurer: &TextMeasurer,
    config: &LabelConfig,
) -> Vec<LabelCandidate> {
    let mut builder = LabelTextBuilder::new(measurer, settings, config);
    let font = builder.font().clone();
    let text_height = measurer.estimate_height(&font);
    let margin = config.label_margin;

    let mut candidates = Vec::new();
    for shape in shapes {
        if !shape.data.is_labelable() {
            continue;
        }
        let value = shape.data.value.unwrap_or_default();
        let text = builder.format_value(value, None, shape.data.format_string.as_deref(), None);
        let width = measurer.measure_width(&text, &font);

        let placement = decide_placement(kind, shape, text_height, margin);
        if placement.inside && !fits_in_shape(shape, width, text_height) {
            continue;
        }

        let anchor_x = shape.x + shape.width / 2.0;
        let anchor_y = if placement.inside {
            shape.y + shape.height / 2.0 + text_height / 2.0
        } else {
            shape.y - margin
        };
        // Color is a pure read of the already-decided placement.
        let fill = if placement.inside {
            DEFAULT_INSIDE_LABEL_COLOR.to_string()
        } else {
            shape
                .data
                .label_fill
                .clone()
                .unwrap_or_else(|| settings.color.clone())
        };
        candidates.push(LabelCandidate {
            owner_key: shape.data.identity.clone(),
            anchor_x,
            anchor_y,
            text,
            width,
            height: text_height,
            fill,
            anchor: TextAnchor::Middle,
            inside_shape: placement.inside,
        });
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(key: &str, y: f32, height: f32, last: bool) -> ColumnShape {
        let mut data = DataPoint::new(key, 0, Some(42.0));
        data.category = Some(key.to_string());
        ColumnShape {
            data,
            x: 10.0,
            y,
            width: 60.0,
            height,
            last_in_stack: last,
        }
    }

    #[test]
    fn clustered_column_with_headroom_labels_outside() {
        let placement = decide_placement(ChartKind::Column, &shape("a", 100.0, 80.0, true), 15.0, 6.0);
        assert!(!placement.inside);
    }

    #[test]
    fn clustered_column_at_top_edge_labels_inside() {
        let placement = decide_placement(ChartKind::Column, &shape("a", 10.0, 80.0, true), 15.0, 6.0);
        assert!(placement.inside);
    }

    #[test]
    fn stacked_segment_below_the_top_labels_inside() {
        let placement = decide_placement(
            ChartKind::StackedColumn,
            &shape("a", 200.0, 80.0, false),
            15.0,
            6.0,
        );
        assert!(placement.inside);
    }

    #[test]
    fn inside_label_wider_than_column_is_dropped() {
        let measurer = TextMeasurer::fast();
        let settings = LabelSettings::shown();
        let config = LabelConfig::default();
        // A narrow segment deep in a stack: inside placement, no room.
        let mut narrow = shape("a", 100.0, 8.0, false);
        narrow.width = 4.0;
        let candidates = column_label_candidates(
            ChartKind::StackedColumn,
            &[narrow],
            &settings,
            &measurer,
            &config,
        );
        assert!(candidates.is_empty());
    }

    #[test]
    fn inside_labels_use_the_inside_default_color() {
        let measurer = TextMeasurer::fast();
        let settings = LabelSettings::shown();
        let config = LabelConfig::default();
        let mut segment = shape("a", 100.0, 80.0, false);
        segment.width = 200.0;
        let candidates = column_label_candidates(
            ChartKind::StackedColumn,
            &[segment],
            &settings,
            &measurer,
            &config,
        );
        assert_eq!(candidates[0].fill, DEFAULT_INSIDE_LABEL_COLOR);
        assert!(candidates[0].inside_shape);
    }
}

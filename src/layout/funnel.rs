//! Funnel label strategy.
//!
//! Each funnel bar is a horizontal band; its label goes either in the
//! bar's center or just past its right end. The preferred position comes
//! from the settings, and the strategy swaps automatically when the
//! preferred side lacks pixel room for the measured text.

use super::types::{LabelCandidate, TextAnchor, Viewport};
use crate::config::LabelConfig;
use crate::data::DataPoint;
use crate::format::LabelTextBuilder;
use crate::settings::{DEFAULT_INSIDE_LABEL_COLOR, LabelPosition, LabelSettings};
use crate::text_metrics::TextMeasurer;

/// One funnel band: data point plus its screen rectangle.
#[derive(Debug, Clone)]
pub struct FunnelBar {
    pub data: DataPoint,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Decide inside-center vs outside-end for one bar. The preferred side
/// wins when it has room; otherwise the other side is tried; a label
/// with room on neither side stays inside (the collision resolver or the
/// fit check will drop it if it truly cannot be shown).
pub fn decide_funnel_placement(
    bar: &FunnelBar,
    text_width: f32,
    viewport: Viewport,
    end_margin: f32,
    preferred: LabelPosition,
) -> bool {
    let inside_room = text_width <= bar.width;
    let outside_room = bar.x + bar.width + end_margin + text_width <= viewport.width;
    match preferred {
        LabelPosition::OutsideEnd => !outside_room,
        _ => {
            if inside_room {
                true
            } else {
                !outside_room
            }
        }
    }
}

pub fn funnel_label_candidates(
    bars: &[FunnelBar],
    settings: &LabelSettings,
    measurer: &TextMeasurer,
    config: &LabelConfig,
    viewport: Viewport,
) -> Vec<LabelCandidate> {
    let mut builder = LabelTextBuilder::new(measurer, settings, config);
    let font = builder.font().clone();
    let text_height = measurer.estimate_height(&font);
    let end_margin = config.funnel.end_margin;
    let preferred = settings.position.unwrap_or(LabelPosition::InsideCenter);

    let mut candidates = Vec::new();
    for bar in bars {
        if !bar.data.is_labelable() {
            continue;
        }
        let value = bar.data.value.unwrap_or_default();
        let text = builder.format_value(value, None, bar.data.format_string.as_deref(), None);
        let width = measurer.measure_width(&text, &font);

        let inside = decide_funnel_placement(bar, width, viewport, end_margin, preferred);
        let baseline = bar.y + bar.height / 2.0 + text_height / 2.0;
        let (anchor_x, anchor) = if inside {
            (bar.x + bar.width / 2.0, TextAnchor::Middle)
        } else {
            (bar.x + bar.width + end_margin, TextAnchor::Start)
        };
        let fill = if inside {
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
            anchor_y: baseline,
            text,
            width,
            height: text_height,
            fill,
            anchor,
            inside_shape: inside,
        });
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(key: &str, x: f32, width: f32) -> FunnelBar {
        let mut data = DataPoint::new(key, 0, Some(100.0));
        data.category = Some(key.to_string());
        FunnelBar {
            data,
            x,
            y: 40.0,
            width,
            height: 24.0,
        }
    }

    #[test]
    fn wide_bar_keeps_the_inside_preference() {
        let viewport = Viewport::new(400.0, 300.0);
        let inside =
            decide_funnel_placement(&bar("a", 50.0, 200.0), 60.0, viewport, 6.0, LabelPosition::InsideCenter);
        assert!(inside);
    }

    #[test]
    fn narrow_bar_swaps_to_outside_end() {
        let viewport = Viewport::new(400.0, 300.0);
        let inside =
            decide_funnel_placement(&bar("a", 180.0, 40.0), 60.0, viewport, 6.0, LabelPosition::InsideCenter);
        assert!(!inside);
    }

    #[test]
    fn outside_preference_swaps_back_when_the_edge_is_near() {
        let viewport = Viewport::new(400.0, 300.0);
        // Bar ends at 390: no room for 60px of text past the end.
        let inside =
            decide_funnel_placement(&bar("a", 190.0, 200.0), 60.0, viewport, 6.0, LabelPosition::OutsideEnd);
        assert!(inside);
    }

    #[test]
    fn outside_labels_left_align_past_the_bar_end() {
        let settings = LabelSettings {
            position: Some(LabelPosition::OutsideEnd),
            ..LabelSettings::shown()
        };
        let bars = vec![bar("a", 100.0, 80.0)];
        let candidates = funnel_label_candidates(
            &bars,
            &settings,
            &TextMeasurer::fast(),
            &LabelConfig::default(),
            Viewport::new(600.0, 300.0),
        );
        assert_eq!(candidates[0].anchor, TextAnchor::Start);
        assert_eq!(candidates[0].anchor_x, 186.0);
        assert!(!candidates[0].inside_shape);
    }
}

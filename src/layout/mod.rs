//! Label layout: per-chart candidate strategies plus collision
//! resolution.
//!
//! Each chart family owns its geometry and fit rules in its own module;
//! `compute_labels` dispatches on the scene variant and finishes every
//! pass with the shared greedy collision resolver. One pass runs filter,
//! placement, fit check, and collision to completion before the next can
//! start; nothing is carried over between passes.

pub mod collision;
pub mod column;
pub mod donut;
pub mod funnel;
pub mod scatter;
pub mod types;
pub mod waterfall;

pub use collision::hide_collided_labels;
pub use column::{ColumnShape, column_label_candidates};
pub use donut::{DonutSlice, donut_label_candidates};
pub use funnel::{FunnelBar, funnel_label_candidates};
pub use scatter::{MarkerPoint, marker_label_candidates};
pub use types::{LabelCandidate, LinearScale, PlacedLabel, TextAnchor, Viewport};
pub use waterfall::{WaterfallBar, waterfall_label_candidates};

use crate::config::LabelConfig;
use crate::data::ChartKind;
use crate::settings::LabelSettings;
use crate::text_metrics::TextMeasurer;

/// Screen-space chart geometry, one variant per chart family. Built
/// fresh per render from the projected data and the current viewport.
#[derive(Debug, Clone)]
pub enum ChartScene {
    /// Scatter, line, and map visuals: point markers.
    Markers { points: Vec<MarkerPoint> },
    /// Clustered, stacked, and 100%-stacked columns.
    Columns {
        kind: ChartKind,
        shapes: Vec<ColumnShape>,
    },
    /// Donut/pie: slice angles relative to a center.
    Donut {
        center: (f32, f32),
        radius: f32,
        slices: Vec<DonutSlice>,
    },
    Funnel { bars: Vec<FunnelBar> },
    Waterfall {
        bars: Vec<WaterfallBar>,
        scale: LinearScale,
        category_width: f32,
    },
}

/// Run one full label layout pass: candidates per the scene's strategy,
/// then collision resolution against the viewport. Donut candidates are
/// relative to the donut center, which is handed to the resolver as a
/// translation. Returns an empty set when labels are switched off.
pub fn compute_labels(
    scene: &ChartScene,
    settings: &LabelSettings,
    measurer: &TextMeasurer,
    config: &LabelConfig,
    viewport: Viewport,
) -> Vec<PlacedLabel> {
    if !settings.show {
        return Vec::new();
    }
    let (candidates, transform) = match scene {
        ChartScene::Markers { points } => (
            marker_label_candidates(points, settings, measurer, config),
            None,
        ),
        ChartScene::Columns { kind, shapes } => (
            column_label_candidates(*kind, shapes, settings, measurer, config),
            None,
        ),
        ChartScene::Donut {
            center,
            radius,
            slices,
        } => (
            donut_label_candidates(slices, *radius, settings, measurer, config),
            Some(*center),
        ),
        ChartScene::Funnel { bars } => (
            funnel_label_candidates(bars, settings, measurer, config, viewport),
            None,
        ),
        ChartScene::Waterfall {
            bars,
            scale,
            category_width,
        } => (
            waterfall_label_candidates(bars, scale, *category_width, settings, measurer, config),
            None,
        ),
    };
    hide_collided_labels(viewport, &candidates, transform)
}

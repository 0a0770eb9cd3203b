//! The per-chart visual: host lifecycle surface plus scene construction.
//!
//! The host drives a visual through `init`, `on_data_changed`,
//! `on_resizing`, and `enumerate_object_instances`; each render rebuilds
//! the chart geometry from the projected data, runs one label layout
//! pass, reconciles the persistent label scene, and emits SVG. The only
//! state carried across renders is the settings object and the label
//! scene itself.

use crate::config::LabelConfig;
use crate::data::{ChartData, ChartKind, DataPoint};
use crate::layout::{
    ChartScene, ColumnShape, DonutSlice, FunnelBar, LinearScale, MarkerPoint, Viewport,
    WaterfallBar, compute_labels,
};
use crate::render::{LabelScene, SyncStats, render_svg};
use crate::settings::{LabelSettings, VisualObjectInstance, enumerate_data_labels};
use crate::text_metrics::TextMeasurer;
use serde_json::Value;

const PANEL_PADDING: f32 = 20.0;
const MARKER_RADIUS: f32 = 4.0;

pub struct Visual {
    kind: ChartKind,
    settings: LabelSettings,
    config: LabelConfig,
    measurer: TextMeasurer,
    scene: LabelScene,
    data: Option<ChartData>,
    viewport: Viewport,
}

impl Visual {
    pub fn init(kind: ChartKind, config: LabelConfig) -> Self {
        let measurer = if config.fast_text_metrics {
            TextMeasurer::fast()
        } else {
            TextMeasurer::new()
        };
        Self {
            kind,
            settings: LabelSettings::default(),
            config,
            measurer,
            scene: LabelScene::new(),
            data: None,
            viewport: Viewport::new(800.0, 600.0),
        }
    }

    /// New data from the host. `objects` is the edited `labels` property
    /// map from the data view metadata, when present.
    pub fn on_data_changed(&mut self, data: ChartData, objects: Option<&Value>) {
        debug_assert_eq!(data.kind, self.kind, "data view kind must match the visual");
        if let Some(objects) = objects {
            self.settings.apply_object(objects);
        }
        self.data = Some(data);
    }

    pub fn on_resizing(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn enumerate_object_instances(&self, object_name: &str) -> Vec<VisualObjectInstance> {
        match object_name {
            "labels" => enumerate_data_labels(&self.settings, self.kind),
            _ => Vec::new(),
        }
    }

    pub fn settings(&self) -> &LabelSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut LabelSettings {
        &mut self.settings
    }

    pub fn label_scene(&self) -> &LabelScene {
        &self.scene
    }

    /// Run one full render pass. Returns the SVG document, or `None`
    /// before the first data update.
    pub fn render(&mut self) -> Option<String> {
        let data = self.data.as_ref()?;
        let scene = build_scene(data, self.viewport, &self.config);
        let placed = compute_labels(
            &scene,
            &self.settings,
            &self.measurer,
            &self.config,
            self.viewport,
        );
        self.scene.sync(&placed);
        Some(render_svg(&scene, &self.scene, self.viewport, &self.config))
    }

    /// Layout without emission, for hosts that draw shapes themselves.
    pub fn layout(&mut self) -> SyncStats {
        let Some(data) = self.data.as_ref() else {
            return SyncStats::default();
        };
        let scene = build_scene(data, self.viewport, &self.config);
        let placed = compute_labels(
            &scene,
            &self.settings,
            &self.measurer,
            &self.config,
            self.viewport,
        );
        self.scene.sync(&placed)
    }
}

/// Finite value of a point, with NaN and Infinity tolerated as absent.
fn finite_value(point: &DataPoint) -> Option<f64> {
    point.value.filter(|v| v.is_finite())
}

fn value_extent(data: &ChartData) -> (f64, f64) {
    let mut min = 0.0f64;
    let mut max = 0.0f64;
    for point in data.points() {
        if let Some(v) = finite_value(point) {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if min == max {
        max = min + 1.0;
    }
    (min, max)
}

/// Build screen geometry for the current viewport. Rebuilt fresh every
/// render; bad values are simply skipped here and reported by the
/// warning pass, never by the layout itself.
pub fn build_scene(data: &ChartData, viewport: Viewport, config: &LabelConfig) -> ChartScene {
    match data.kind {
        ChartKind::Scatter | ChartKind::Line | ChartKind::Map => marker_scene(data, viewport),
        ChartKind::Column => clustered_scene(data, viewport),
        ChartKind::StackedColumn | ChartKind::HundredPercentStackedColumn => {
            stacked_scene(data, viewport)
        }
        ChartKind::Donut => donut_scene(data, viewport),
        ChartKind::Funnel => funnel_scene(data, viewport),
        ChartKind::Waterfall => waterfall_scene(data, viewport, config),
    }
}

fn marker_scene(data: &ChartData, viewport: Viewport) -> ChartScene {
    let bands = data.categories.len().max(1) as f32;
    let band_width = viewport.width / bands;
    let (min, max) = value_extent(data);
    let scale = LinearScale::new((min, max), (viewport.height - PANEL_PADDING, PANEL_PADDING));

    let mut points = Vec::new();
    for point in data.points() {
        let Some(value) = finite_value(point) else {
            continue;
        };
        points.push(MarkerPoint {
            data: point.clone(),
            x: point.category_index as f32 * band_width + band_width / 2.0,
            y: scale.scale(value),
            radius: MARKER_RADIUS,
        });
    }
    ChartScene::Markers { points }
}

fn clustered_scene(data: &ChartData, viewport: Viewport) -> ChartScene {
    let bands = data.categories.len().max(1) as f32;
    let band_width = viewport.width / bands;
    let series_count = data.series.len().max(1) as f32;
    let column_width = band_width * 0.8 / series_count;
    let (min, max) = value_extent(data);
    let domain = (min.min(0.0), max.max(0.0));
    let scale = LinearScale::new(domain, (viewport.height - PANEL_PADDING, PANEL_PADDING));

    let mut shapes = Vec::new();
    for (series_index, series) in data.series.iter().enumerate() {
        for point in &series.points {
            let Some(value) = finite_value(point) else {
                continue;
            };
            let band_x = point.category_index as f32 * band_width + band_width * 0.1;
            let x = band_x + series_index as f32 * column_width;
            let top = scale.scale(value.max(0.0));
            let height = (scale.scale(value) - scale.scale(0.0)).abs();
            shapes.push(ColumnShape {
                data: point.clone(),
                x,
                y: top,
                width: column_width,
                height,
                last_in_stack: true,
            });
        }
    }
    ChartScene::Columns {
        kind: data.kind,
        shapes,
    }
}

fn stacked_scene(data: &ChartData, viewport: Viewport) -> ChartScene {
    let normalize = data.kind == ChartKind::HundredPercentStackedColumn;
    let bands = data.categories.len().max(1) as f32;
    let band_width = viewport.width / bands;
    let categories = data.categories.len().max(1);

    // Stack totals per category, positives only; negative segments are
    // rare in stacked visuals and stack downward from zero.
    let mut totals = vec![0.0f64; categories];
    for point in data.points() {
        if let Some(v) = finite_value(point) {
            if point.category_index < categories && v > 0.0 {
                totals[point.category_index] += v;
            }
        }
    }
    let domain_max = if normalize {
        1.0
    } else {
        totals.iter().cloned().fold(1.0f64, f64::max)
    };
    let scale = LinearScale::new(
        (0.0, domain_max),
        (viewport.height - PANEL_PADDING, PANEL_PADDING),
    );

    // Topmost series per category, for the outside-label default.
    let mut top_series = vec![None; categories];
    for (series_index, series) in data.series.iter().enumerate() {
        for point in &series.points {
            if finite_value(point).is_some_and(|v| v > 0.0) && point.category_index < categories {
                top_series[point.category_index] = Some(series_index);
            }
        }
    }

    let mut running = vec![0.0f64; categories];
    let mut shapes = Vec::new();
    for (series_index, series) in data.series.iter().enumerate() {
        for point in &series.points {
            let Some(value) = finite_value(point).filter(|v| *v > 0.0) else {
                continue;
            };
            if point.category_index >= categories {
                continue;
            }
            let total = totals[point.category_index].max(f64::EPSILON);
            let value = if normalize { value / total } else { value };
            let base = running[point.category_index];
            running[point.category_index] = base + value;
            let x = point.category_index as f32 * band_width + band_width * 0.1;
            let top = scale.scale(base + value);
            let height = (scale.scale(base) - top).abs();
            shapes.push(ColumnShape {
                data: point.clone(),
                x,
                y: top,
                width: band_width * 0.8,
                height,
                last_in_stack: top_series[point.category_index] == Some(series_index),
            });
        }
    }
    ChartScene::Columns {
        kind: data.kind,
        shapes,
    }
}

fn donut_scene(data: &ChartData, viewport: Viewport) -> ChartScene {
    let center = (viewport.width / 2.0, viewport.height / 2.0);
    let radius = (viewport.width.min(viewport.height) / 2.0 - PANEL_PADDING * 2.0).max(10.0);
    let points: Vec<&DataPoint> = data
        .series
        .first()
        .map(|s| s.points.iter().collect())
        .unwrap_or_default();
    let total: f64 = points
        .iter()
        .filter_map(|p| finite_value(p))
        .map(f64::abs)
        .sum();
    let total = if total > 0.0 { total } else { 1.0 };

    let mut slices = Vec::new();
    let mut angle = 0.0f32;
    for point in points {
        let Some(value) = finite_value(point) else {
            continue;
        };
        let sweep = (value.abs() / total) as f32 * std::f32::consts::TAU;
        slices.push(DonutSlice {
            data: point.clone(),
            start_angle: angle,
            end_angle: angle + sweep,
        });
        angle += sweep;
    }
    ChartScene::Donut {
        center,
        radius,
        slices,
    }
}

fn funnel_scene(data: &ChartData, viewport: Viewport) -> ChartScene {
    let points: Vec<&DataPoint> = data
        .series
        .first()
        .map(|s| s.points.iter().collect())
        .unwrap_or_default();
    let max = points
        .iter()
        .filter_map(|p| finite_value(p))
        .map(f64::abs)
        .fold(1.0f64, f64::max);
    let rows = points.len().max(1) as f32;
    let row_height = (viewport.height - PANEL_PADDING * 2.0) / rows;
    let full_width = viewport.width - PANEL_PADDING * 2.0;

    let mut bars = Vec::new();
    for (row, point) in points.into_iter().enumerate() {
        let Some(value) = finite_value(point) else {
            continue;
        };
        let width = (value.abs() / max) as f32 * full_width;
        bars.push(FunnelBar {
            data: point.clone(),
            x: (viewport.width - width) / 2.0,
            y: PANEL_PADDING + row as f32 * row_height + row_height * 0.1,
            width,
            height: row_height * 0.8,
        });
    }
    ChartScene::Funnel { bars }
}

fn waterfall_scene(data: &ChartData, viewport: Viewport, _config: &LabelConfig) -> ChartScene {
    let points: Vec<&DataPoint> = data
        .series
        .first()
        .map(|s| s.points.iter().collect())
        .unwrap_or_default();
    let category_width = viewport.width / points.len().max(1) as f32;

    // Running totals give both the bar positions and the value domain.
    let mut bars = Vec::new();
    let mut position = 0.0f64;
    let mut domain_min = 0.0f64;
    let mut domain_max = 0.0f64;
    for point in points {
        let value = finite_value(point).unwrap_or(0.0);
        bars.push(WaterfallBar {
            data: point.clone(),
            position,
        });
        position += value;
        domain_min = domain_min.min(position);
        domain_max = domain_max.max(position);
    }
    if domain_min == domain_max {
        domain_max = domain_min + 1.0;
    }
    let scale = LinearScale::new(
        (domain_min, domain_max),
        (viewport.height - PANEL_PADDING, PANEL_PADDING),
    );
    ChartScene::Waterfall {
        bars,
        scale,
        category_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Series;

    fn waterfall_data() -> ChartData {
        let categories = vec!["Jan", "Feb", "Mar"];
        let values = [40.0, -15.0, 25.0];
        ChartData {
            kind: ChartKind::Waterfall,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            series: vec![Series {
                name: None,
                points: values
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| {
                        let mut p = DataPoint::new(format!("p{i}"), i, Some(v));
                        p.category = Some(categories[i].to_string());
                        p
                    })
                    .collect(),
            }],
        }
    }

    fn test_config() -> LabelConfig {
        LabelConfig {
            fast_text_metrics: true,
            ..LabelConfig::default()
        }
    }

    #[test]
    fn waterfall_scene_threads_running_positions() {
        let scene = build_scene(
            &waterfall_data(),
            Viewport::new(600.0, 400.0),
            &test_config(),
        );
        let ChartScene::Waterfall { bars, .. } = scene else {
            panic!("expected a waterfall scene");
        };
        assert_eq!(bars[0].position, 0.0);
        assert_eq!(bars[1].position, 40.0);
        assert_eq!(bars[2].position, 25.0);
    }

    #[test]
    fn visual_round_trips_host_edits() {
        let mut visual = Visual::init(ChartKind::Waterfall, test_config());
        visual.on_data_changed(
            waterfall_data(),
            Some(&serde_json::json!({ "show": true, "color": "#222222" })),
        );
        assert!(visual.settings().show);
        let instances = visual.enumerate_object_instances("labels");
        assert_eq!(instances[0].properties["color"], "#222222");
    }

    #[test]
    fn render_emits_svg_with_labels() {
        let mut visual = Visual::init(ChartKind::Waterfall, test_config());
        visual.on_data_changed(waterfall_data(), Some(&serde_json::json!({ "show": true })));
        visual.on_resizing(Viewport::new(600.0, 400.0));
        let svg = visual.render().expect("data is present");
        assert!(svg.contains("<svg"));
        assert!(svg.contains("class=\"labels\""));
        assert!(!visual.label_scene().is_empty());
    }

    #[test]
    fn hidden_labels_clear_the_scene() {
        let mut visual = Visual::init(ChartKind::Waterfall, test_config());
        visual.on_data_changed(waterfall_data(), Some(&serde_json::json!({ "show": true })));
        visual.on_resizing(Viewport::new(600.0, 400.0));
        visual.layout();
        assert!(!visual.label_scene().is_empty());
        visual.settings_mut().show = false;
        let stats = visual.layout();
        assert!(stats.exited > 0);
        assert!(visual.label_scene().is_empty());
    }

    #[test]
    fn stacked_scene_marks_the_stack_top() {
        let mut p0 = DataPoint::new("s0c0", 0, Some(10.0));
        p0.category = Some("A".to_string());
        let mut p1 = DataPoint::new("s1c0", 0, Some(20.0));
        p1.category = Some("A".to_string());
        p1.series_index = 1;
        let data = ChartData {
            kind: ChartKind::StackedColumn,
            categories: vec!["A".to_string()],
            series: vec![
                Series {
                    name: None,
                    points: vec![p0],
                },
                Series {
                    name: None,
                    points: vec![p1],
                },
            ],
        };
        let scene = build_scene(&data, Viewport::new(300.0, 300.0), &test_config());
        let ChartScene::Columns { shapes, .. } = scene else {
            panic!("expected columns");
        };
        assert!(!shapes[0].last_in_stack);
        assert!(shapes[1].last_in_stack);
    }
}

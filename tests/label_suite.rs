//! End-to-end properties of the label layout engine, exercised through
//! the public crate surface.

use std::rc::Rc;

use chart_labels::config::LabelConfig;
use chart_labels::data::{ChartData, ChartKind, DataPoint, Series};
use chart_labels::format::{FormatterCache, FormatterOptions, ValueFormatter};
use chart_labels::layout::waterfall::{
    WaterfallBar, does_label_fit_in_shape, waterfall_label_y_position,
};
use chart_labels::layout::{
    ChartScene, LinearScale, MarkerPoint, Viewport, compute_labels, hide_collided_labels,
};
use chart_labels::layout::types::{LabelCandidate, TextAnchor};
use chart_labels::settings::LabelSettings;
use chart_labels::text_metrics::{ELLIPSIS, FontProps, TextMeasurer};
use chart_labels::visual::Visual;

fn test_config() -> LabelConfig {
    LabelConfig {
        fast_text_metrics: true,
        ..LabelConfig::default()
    }
}

fn marker(key: &str, x: f32, y: f32, value: f64) -> MarkerPoint {
    let mut data = DataPoint::new(key, 0, Some(value));
    data.category = Some(key.to_string());
    MarkerPoint {
        data,
        x,
        y,
        radius: 4.0,
    }
}

fn marker_scene(count: usize, spacing: f32) -> ChartScene {
    ChartScene::Markers {
        points: (0..count)
            .map(|i| marker(&format!("p{i}"), 30.0 + i as f32 * spacing, 120.0, 10.0 + i as f64))
            .collect(),
    }
}

#[test]
fn layout_pass_is_idempotent() {
    let scene = marker_scene(30, 17.0);
    let settings = LabelSettings::shown();
    let measurer = TextMeasurer::fast();
    let config = test_config();
    let viewport = Viewport::new(500.0, 300.0);
    let first = compute_labels(&scene, &settings, &measurer, &config, viewport);
    let second = compute_labels(&scene, &settings, &measurer, &config, viewport);
    assert_eq!(first, second);
}

#[test]
fn shrinking_the_viewport_never_grows_the_label_count() {
    let scene = marker_scene(40, 23.0);
    let settings = LabelSettings::shown();
    let measurer = TextMeasurer::fast();
    let config = test_config();
    let mut previous = usize::MAX;
    for width in [1000.0, 700.0, 450.0, 280.0, 140.0, 60.0] {
        let placed = compute_labels(
            &scene,
            &settings,
            &measurer,
            &config,
            Viewport::new(width, 300.0),
        );
        assert!(
            placed.len() <= previous,
            "width {width}: {} labels after {previous}",
            placed.len()
        );
        previous = placed.len();
    }
}

#[test]
fn earlier_candidate_survives_a_collision() {
    let candidate = |key: &str, x: f32| LabelCandidate {
        owner_key: key.to_string(),
        anchor_x: x,
        anchor_y: 50.0,
        text: key.to_string(),
        width: 50.0,
        height: 12.0,
        fill: "#777777".to_string(),
        anchor: TextAnchor::Middle,
        inside_shape: false,
    };
    let placed = hide_collided_labels(
        Viewport::new(400.0, 200.0),
        &[candidate("total", 100.0), candidate("regular", 120.0)],
        None,
    );
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].owner_key, "total");
}

#[test]
fn waterfall_clipped_bar_reports_inside_midpoint() {
    // Domain [-100, 200] over a panel too short to fit the label below a
    // full drop to the floor.
    let scale = LinearScale::new((-100.0, 200.0), (300.0, 0.0));
    let mut data = DataPoint::new("drop", 0, Some(-100.0));
    data.category = Some("drop".to_string());
    let bar = WaterfallBar {
        data,
        position: 0.0,
    };
    let placed = waterfall_label_y_position(&scale, &bar, 60.0, 8.0);
    assert!(placed.inside);
    // Bar spans pixels 200..300; the clamped midpoint is 250.
    assert_eq!(placed.y, 250.0);
    assert!(placed.y >= 0.0 && placed.y <= 300.0);
}

#[test]
fn formatter_cache_shares_by_format_string() {
    let settings = LabelSettings::shown();
    let mut cache = FormatterCache::new();
    let dollars_a = cache.get_or_create(Some("$0"), &settings, None);
    let dollars_b = cache.get_or_create(Some("$0"), &settings, None);
    let decimals = cache.get_or_create(Some("0.00"), &settings, None);
    assert!(Rc::ptr_eq(&dollars_a, &dollars_b));
    assert!(!Rc::ptr_eq(&dollars_a, &decimals));
}

#[test]
fn display_unit_formatting_table() {
    let formatter = |units: f64, precision: u32| {
        ValueFormatter::create(FormatterOptions {
            format: None,
            precision: Some(precision),
            value: units,
            value2: None,
            allow_beautification: false,
        })
    };
    assert_eq!(formatter(0.0, 0).format(20_000.0), "20,000");
    assert_eq!(formatter(10_000.0, 0).format(20_000.0), "20K");
    assert_eq!(formatter(1_000_000.0, 1).format(200_000.0), "0.2M");
    assert_eq!(formatter(1_000_000_000.0, 0).format(200_000_000_000.0), "200bn");
    assert_eq!(formatter(1_000_000_000_000.0, 1).format(200_000_000_000.0), "0.2T");
}

#[test]
fn truncation_round_trip() {
    let measurer = TextMeasurer::fast();
    let font = FontProps::new("sans-serif", 12.0);
    let max = 55.0;

    let long = "Quarterly revenue by region";
    assert!(measurer.measure_width(long, &font) > max);
    let tailored = measurer.tailor_or_default(long, &font, max);
    assert!(tailored.ends_with(ELLIPSIS));
    assert!(measurer.measure_width(&tailored, &font) <= max);

    let short = "Q1";
    let untouched = measurer.tailor_or_default(short, &font, max);
    assert_eq!(untouched, short);
}

#[test]
fn positive_outside_position_fits_any_text() {
    let scale = LinearScale::new((0.0, 200.0), (400.0, 0.0));
    let mut data = DataPoint::new("bar", 0, Some(50.0));
    data.category = Some("bar".to_string());
    let bar = WaterfallBar {
        data,
        position: 0.0,
    };
    // Outside position is on-screen: even absurdly long text fits.
    assert!(does_label_fit_in_shape(&bar, &scale, 5.0, 8.0, 5000.0, 120.0));
}

#[test]
fn full_visual_pipeline_renders_and_reconciles() {
    let categories = ["Start", "Q1", "Q2", "Q3"];
    let values = [100.0, 30.0, -20.0, 45.0];
    let data = ChartData {
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
    };

    let mut visual = Visual::init(ChartKind::Waterfall, test_config());
    visual.on_resizing(Viewport::new(800.0, 500.0));
    visual.on_data_changed(data.clone(), Some(&serde_json::json!({ "show": true })));
    let svg = visual.render().expect("svg");
    assert!(svg.contains("<svg"));
    assert!(!visual.label_scene().is_empty());
    let committed = visual.label_scene().nodes().len();
    assert!(committed > 0);

    // A resize re-runs the pass from scratch against the fresh viewport.
    visual.on_resizing(Viewport::new(200.0, 120.0));
    visual.layout();
    assert!(visual.label_scene().nodes().len() <= committed);
}

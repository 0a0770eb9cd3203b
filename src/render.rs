//! Rendering: the persistent label scene and SVG emission.
//!
//! `LabelScene` is the one piece of state the binder owns across renders.
//! Every pass reconciles the freshly placed label set against it keyed by
//! owner: new keys enter, surviving keys are repositioned and restyled,
//! vanished keys exit. An empty pass removes the whole group so the next
//! non-empty render recreates it from scratch.

use crate::config::LabelConfig;
use crate::layout::{ChartScene, PlacedLabel, Viewport};
use anyhow::Result;
use std::collections::HashSet;
use std::path::Path;

/// Fill palette for chart shapes, cycled by category index.
const SHAPE_PALETTE: [&str; 8] = [
    "#4E79A7", "#F28E2B", "#E15759", "#76B7B2", "#59A14F", "#EDC948", "#B07AA1", "#FF9DA7",
];
const INCREASE_COLOR: &str = "#59A14F";
const DECREASE_COLOR: &str = "#E15759";
const BACKGROUND_COLOR: &str = "#FFFFFF";

/// One committed label element in the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelNode {
    pub key: String,
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub fill: String,
    pub anchor: &'static str,
}

/// Counts from one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub entered: usize,
    pub updated: usize,
    pub exited: usize,
}

/// The persistent label group. `None` means no group exists, which is
/// both the initial state and the state after an empty render.
#[derive(Debug, Default)]
pub struct LabelScene {
    group: Option<Vec<LabelNode>>,
}

impl LabelScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.group.is_none()
    }

    pub fn nodes(&self) -> &[LabelNode] {
        self.group.as_deref().unwrap_or(&[])
    }

    /// Reconcile the scene against `labels`: enter new keys, update
    /// surviving ones, drop the rest. Node order follows the input.
    pub fn sync(&mut self, labels: &[PlacedLabel]) -> SyncStats {
        debug_assert!(
            {
                let mut keys = HashSet::new();
                labels.iter().all(|l| keys.insert(l.owner_key.as_str()))
            },
            "placed labels must have unique owner keys"
        );

        if labels.is_empty() {
            let exited = self.nodes().len();
            self.group = None;
            return SyncStats {
                exited,
                ..SyncStats::default()
            };
        }

        let previous: HashSet<String> =
            self.nodes().iter().map(|n| n.key.clone()).collect();
        let mut stats = SyncStats::default();
        let mut nodes = Vec::with_capacity(labels.len());
        for label in labels {
            if previous.contains(&label.owner_key) {
                stats.updated += 1;
            } else {
                stats.entered += 1;
            }
            nodes.push(LabelNode {
                key: label.owner_key.clone(),
                x: label.x,
                y: label.y,
                text: label.text.clone(),
                fill: label.fill.clone(),
                anchor: label.anchor.as_str(),
            });
        }
        let kept: HashSet<&str> = labels.iter().map(|l| l.owner_key.as_str()).collect();
        stats.exited = previous.iter().filter(|k| !kept.contains(k.as_str())).count();
        self.group = Some(nodes);
        stats
    }
}

/// Emit the full chart as an SVG document: background, shapes per the
/// scene variant, then the committed labels on top.
pub fn render_svg(
    scene: &ChartScene,
    labels: &LabelScene,
    viewport: Viewport,
    config: &LabelConfig,
) -> String {
    let width = viewport.width.max(1.0);
    let height = viewport.height.max(1.0);
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{BACKGROUND_COLOR}\"/>"
    ));

    match scene {
        ChartScene::Markers { points } => {
            for point in points {
                let fill = palette(point.data.category_index);
                svg.push_str(&format!(
                    "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{fill}\"/>",
                    point.x, point.y, point.radius
                ));
            }
        }
        ChartScene::Columns { shapes, .. } => {
            for shape in shapes {
                let fill = palette(shape.data.series_index);
                svg.push_str(&rect_svg(shape.x, shape.y, shape.width, shape.height, fill));
            }
        }
        ChartScene::Donut {
            center,
            radius,
            slices,
        } => {
            let inner = radius * 0.6;
            for slice in slices {
                let fill = palette(slice.data.category_index);
                svg.push_str(&annular_sector_path(
                    *center,
                    inner,
                    *radius,
                    slice.start_angle,
                    slice.end_angle,
                    fill,
                ));
            }
        }
        ChartScene::Funnel { bars } => {
            for bar in bars {
                let fill = palette(bar.data.category_index);
                svg.push_str(&rect_svg(bar.x, bar.y, bar.width, bar.height, fill));
            }
        }
        ChartScene::Waterfall {
            bars,
            scale,
            category_width,
        } => {
            for bar in bars {
                let value = bar.data.value.unwrap_or(0.0);
                let top = scale.scale(bar.position.max(bar.position + value));
                let bottom = scale.scale(bar.position.min(bar.position + value));
                let x = bar.data.category_index as f32 * category_width + category_width * 0.1;
                let fill = if value < 0.0 {
                    DECREASE_COLOR
                } else {
                    INCREASE_COLOR
                };
                svg.push_str(&rect_svg(
                    x,
                    top,
                    category_width * 0.8,
                    (bottom - top).max(1.0),
                    fill,
                ));
            }
        }
    }

    // Donut labels are stored relative to the center; translate the group
    // instead of rewriting every coordinate.
    let transform = match scene {
        ChartScene::Donut { center, .. } => {
            format!(" transform=\"translate({:.2} {:.2})\"", center.0, center.1)
        }
        _ => String::new(),
    };
    if !labels.is_empty() {
        svg.push_str(&format!("<g class=\"labels\"{transform}>"));
        for node in labels.nodes() {
            svg.push_str(&format!(
                "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
                node.x,
                node.y,
                node.anchor,
                config.font_family,
                config.font_size,
                node.fill,
                escape_xml(&node.text)
            ));
        }
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}

fn palette(index: usize) -> &'static str {
    SHAPE_PALETTE[index % SHAPE_PALETTE.len()]
}

fn rect_svg(x: f32, y: f32, width: f32, height: f32, fill: &str) -> String {
    format!(
        "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" fill=\"{fill}\"/>"
    )
}

/// Annular sector between two pie angles (radians from twelve o'clock,
/// clockwise), as a closed path around the given center.
fn annular_sector_path(
    center: (f32, f32),
    inner: f32,
    outer: f32,
    start: f32,
    end: f32,
    fill: &str,
) -> String {
    let point = |radius: f32, angle: f32| {
        (
            center.0 + angle.sin() * radius,
            center.1 - angle.cos() * radius,
        )
    };
    let (x0, y0) = point(outer, start);
    let (x1, y1) = point(outer, end);
    let (x2, y2) = point(inner, end);
    let (x3, y3) = point(inner, start);
    let large = if (end - start).abs() > std::f32::consts::PI {
        1
    } else {
        0
    };
    format!(
        "<path d=\"M {x0:.2} {y0:.2} A {outer:.2} {outer:.2} 0 {large} 1 {x1:.2} {y1:.2} L {x2:.2} {y2:.2} A {inner:.2} {inner:.2} 0 {large} 0 {x3:.2} {y3:.2} Z\" fill=\"{fill}\"/>"
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{svg}");
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, viewport: Viewport) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.default_size = usvg::Size::from_wh(viewport.width, viewport.height)
        .unwrap_or(usvg::Size::from_wh(800.0, 600.0).unwrap());

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

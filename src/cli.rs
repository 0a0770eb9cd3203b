use crate::config::load_config;
use crate::data::ChartData;
use crate::render::write_output_svg;
use crate::visual::Visual;
use crate::warnings::collect_invalid_value_warnings;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "chart-labels",
    version,
    about = "Render labeled chart visuals from a chart JSON projection"
)]
pub struct Args {
    /// Input chart JSON file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON/JSON5 file overriding label defaults
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width", default_value_t = 800.0)]
    pub width: f32,

    /// Height
    #[arg(short = 'H', long = "height", default_value_t = 600.0)]
    pub height: f32,

    /// Label color override, e.g. '#333333'
    #[arg(long = "labelColor")]
    pub label_color: Option<String>,

    /// Display-unit selector (0 = auto, 1000 = thousands, ...)
    #[arg(long = "displayUnits")]
    pub display_units: Option<f64>,

    /// Decimal places for label values
    #[arg(long = "precision")]
    pub precision: Option<u32>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let input = read_input(args.input.as_deref())?;
    let data: ChartData = serde_json::from_str(&input)?;
    let viewport = crate::layout::Viewport::new(args.width, args.height);

    for warning in collect_invalid_value_warnings(&[&data], &config) {
        eprintln!("warning: {}", warning.message());
    }

    let mut labels = serde_json::Map::new();
    labels.insert("show".to_string(), serde_json::json!(true));
    if let Some(color) = &args.label_color {
        labels.insert("color".to_string(), serde_json::json!(color));
    }
    if let Some(units) = args.display_units {
        labels.insert("labelDisplayUnits".to_string(), serde_json::json!(units));
    }
    if let Some(precision) = args.precision {
        labels.insert("labelPrecision".to_string(), serde_json::json!(precision));
    }

    let mut visual = Visual::init(data.kind, config);
    visual.on_resizing(viewport);
    visual.on_data_changed(data, Some(&serde_json::Value::Object(labels)));
    let svg = visual
        .render()
        .ok_or_else(|| anyhow::anyhow!("No chart data to render"))?;

    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output)?;
            write_png(&svg, &output, viewport)?;
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok(buf);
        }
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>) -> Result<PathBuf> {
    output
        .clone()
        .ok_or_else(|| anyhow::anyhow!("Output path required for png output"))
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, viewport: crate::layout::Viewport) -> Result<()> {
    crate::render::write_output_png(svg, output, viewport)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _viewport: crate::layout::Viewport) -> Result<()> {
    Err(anyhow::anyhow!(
        "png output requires building with the 'png' feature"
    ))
}

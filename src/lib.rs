#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod data;
pub mod format;
pub mod layout;
pub mod render;
pub mod settings;
pub mod text_metrics;
pub mod visual;
pub mod warnings;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{LabelConfig, load_config};
pub use data::{ChartData, ChartKind, DataPoint, Series};
pub use layout::{ChartScene, PlacedLabel, Viewport, compute_labels, hide_collided_labels};
pub use render::{LabelScene, render_svg};
pub use settings::{LabelSettings, enumerate_data_labels};
pub use text_metrics::TextMeasurer;
pub use visual::Visual;

//! Chart data model: the shaped records a host hands to a visual.
//!
//! Data arrives already projected into categories and series; this module
//! only models that projection plus the per-point fields the label
//! pipeline reads.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Scatter,
    Line,
    Map,
    Column,
    StackedColumn,
    HundredPercentStackedColumn,
    Donut,
    Funnel,
    Waterfall,
}

impl ChartKind {
    pub fn is_stacked(self) -> bool {
        matches!(
            self,
            ChartKind::StackedColumn | ChartKind::HundredPercentStackedColumn
        )
    }
}

/// One data point as supplied by the host projection. `identity` is the
/// stable owner key used for enter/update/exit matching across renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    pub identity: String,
    pub category_index: usize,
    #[serde(default)]
    pub series_index: usize,
    pub value: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    /// Per-point numeric format, e.g. `"$0"` or `"0.00"`.
    #[serde(default)]
    pub format_string: Option<String>,
    /// Host-assigned label color override.
    #[serde(default)]
    pub label_fill: Option<String>,
}

impl DataPoint {
    pub fn new(identity: impl Into<String>, category_index: usize, value: Option<f64>) -> Self {
        Self {
            identity: identity.into(),
            category_index,
            series_index: 0,
            value,
            category: None,
            format_string: None,
            label_fill: None,
        }
    }

    /// Points with no value or no category never get a label and must be
    /// excluded before measurement or collision work.
    pub fn is_labelable(&self) -> bool {
        self.value.is_some() && self.category.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    #[serde(default)]
    pub name: Option<String>,
    pub points: Vec<DataPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub kind: ChartKind,
    #[serde(default)]
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

impl ChartData {
    pub fn points(&self) -> impl Iterator<Item = &DataPoint> {
        self.series.iter().flat_map(|s| s.points.iter())
    }
}

//! Invalid-value warning collection.
//!
//! Raw values are inspected before any label work; the label engine
//! itself tolerates bad values silently and this pass is the single
//! source of user-visible reporting. One warning per code across all
//! supplied data views, emitted in fixed priority order regardless of
//! discovery order.

use crate::config::LabelConfig;
use crate::data::ChartData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCode {
    NaNNotSupported,
    InfinityValuesNotSupported,
    ValuesOutOfRange,
}

impl WarningCode {
    pub fn message(self) -> &'static str {
        match self {
            WarningCode::NaNNotSupported => "The data contains NaN values, which are not shown.",
            WarningCode::InfinityValuesNotSupported => {
                "The data contains Infinity values, which are not shown."
            }
            WarningCode::ValuesOutOfRange => {
                "Some values fall outside the supported range and are not shown."
            }
        }
    }
}

/// Scan every data view for NaN, infinite, and out-of-range values.
/// Deduplicated; output order is always NaN, Infinity, out-of-range.
pub fn collect_invalid_value_warnings(
    views: &[&ChartData],
    config: &LabelConfig,
) -> Vec<WarningCode> {
    let mut saw_nan = false;
    let mut saw_infinity = false;
    let mut saw_out_of_range = false;
    for view in views {
        for point in view.points() {
            let Some(value) = point.value else {
                continue;
            };
            if value.is_nan() {
                saw_nan = true;
            } else if value.is_infinite() {
                saw_infinity = true;
            } else if value.abs() > config.safe_value_range {
                saw_out_of_range = true;
            }
        }
    }
    let mut warnings = Vec::new();
    if saw_nan {
        warnings.push(WarningCode::NaNNotSupported);
    }
    if saw_infinity {
        warnings.push(WarningCode::InfinityValuesNotSupported);
    }
    if saw_out_of_range {
        warnings.push(WarningCode::ValuesOutOfRange);
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ChartKind, DataPoint, Series};

    fn view(values: &[f64]) -> ChartData {
        ChartData {
            kind: ChartKind::Column,
            categories: values.iter().map(|_| "c".to_string()).collect(),
            series: vec![Series {
                name: None,
                points: values
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| {
                        let mut p = DataPoint::new(format!("p{i}"), i, Some(v));
                        p.category = Some("c".to_string());
                        p
                    })
                    .collect(),
            }],
        }
    }

    #[test]
    fn clean_data_produces_no_warnings() {
        let data = view(&[1.0, 2.0, 3.0]);
        let warnings = collect_invalid_value_warnings(&[&data], &LabelConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn warnings_are_deduplicated_and_priority_ordered() {
        // Out-of-range first in the data, NaN last; output order must
        // still be NaN, Infinity, out-of-range.
        let data = view(&[1e300, f64::INFINITY, f64::NAN, f64::NAN]);
        let warnings = collect_invalid_value_warnings(&[&data], &LabelConfig::default());
        assert_eq!(
            warnings,
            vec![
                WarningCode::NaNNotSupported,
                WarningCode::InfinityValuesNotSupported,
                WarningCode::ValuesOutOfRange,
            ]
        );
    }

    #[test]
    fn warnings_span_multiple_views() {
        let a = view(&[f64::NAN]);
        let b = view(&[f64::INFINITY]);
        let warnings = collect_invalid_value_warnings(&[&a, &b], &LabelConfig::default());
        assert_eq!(warnings.len(), 2);
    }
}

//! Value formatting for data labels: display units, precision, a small
//! numeric-format-string subset, the per-pass formatter cache, and the
//! final truncated label text builder.

use crate::config::LabelConfig;
use crate::settings::{DISPLAY_UNITS_AUTO, LabelSettings};
use crate::text_metrics::{FontProps, TextMeasurer};
use std::collections::HashMap;
use std::rc::Rc;

/// Named display units, largest first. `bn` is deliberately lowercase to
/// match host formatting conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayUnit {
    None,
    Thousands,
    Millions,
    Billions,
    Trillions,
}

impl DisplayUnit {
    /// Map a numeric unit selector onto the largest named unit whose base
    /// does not exceed it. A selector of 10 000 therefore lands on
    /// thousands and renders 20 000 as `20K`.
    pub fn from_selector(selector: f64) -> Self {
        if selector >= 1e12 {
            DisplayUnit::Trillions
        } else if selector >= 1e9 {
            DisplayUnit::Billions
        } else if selector >= 1e6 {
            DisplayUnit::Millions
        } else if selector >= 1e3 {
            DisplayUnit::Thousands
        } else {
            DisplayUnit::None
        }
    }

    /// Unit best matching a raw value's magnitude.
    pub fn from_magnitude(value: f64) -> Self {
        Self::from_selector(value.abs())
    }

    pub fn base(self) -> f64 {
        match self {
            DisplayUnit::None => 1.0,
            DisplayUnit::Thousands => 1e3,
            DisplayUnit::Millions => 1e6,
            DisplayUnit::Billions => 1e9,
            DisplayUnit::Trillions => 1e12,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            DisplayUnit::None => "",
            DisplayUnit::Thousands => "K",
            DisplayUnit::Millions => "M",
            DisplayUnit::Billions => "bn",
            DisplayUnit::Trillions => "T",
        }
    }
}

/// Options mirroring the host formatter-factory contract: `value` is the
/// display-unit selector, `value2` an axis-inferred fallback applied when
/// the selector says auto.
#[derive(Debug, Clone, Default)]
pub struct FormatterOptions {
    pub format: Option<String>,
    pub precision: Option<u32>,
    pub value: f64,
    pub value2: Option<f64>,
    pub allow_beautification: bool,
}

/// Pieces parsed out of a numeric format string such as `"$0"`,
/// `"0.00"` or `"0%"`. Only the subset the label pipeline needs.
#[derive(Debug, Clone, Default, PartialEq)]
struct FormatPattern {
    prefix: String,
    suffix: String,
    decimals: Option<u32>,
    percent: bool,
}

fn parse_format(format: &str) -> FormatPattern {
    let mut pattern = FormatPattern::default();
    let mut chars = format.chars().peekable();
    // Literal prefix runs until the first digit placeholder.
    while let Some(&ch) = chars.peek() {
        if ch == '0' || ch == '#' {
            break;
        }
        pattern.prefix.push(ch);
        chars.next();
    }
    // Digit body: count decimals after the decimal point.
    let mut in_decimals = false;
    let mut decimals = 0u32;
    let mut saw_point = false;
    while let Some(&ch) = chars.peek() {
        match ch {
            '0' | '#' | ',' => {
                if in_decimals && ch == '0' {
                    decimals += 1;
                }
                chars.next();
            }
            '.' => {
                saw_point = true;
                in_decimals = true;
                chars.next();
            }
            _ => break,
        }
    }
    if saw_point {
        pattern.decimals = Some(decimals);
    }
    // Literal suffix; '%' both appears and scales.
    for ch in chars {
        if ch == '%' {
            pattern.percent = true;
        }
        pattern.suffix.push(ch);
    }
    pattern
}

/// A bound formatter instance: one per distinct format string per layout
/// pass, shared through `Rc` so cache hits are observable by identity.
#[derive(Debug)]
pub struct ValueFormatter {
    pattern: FormatPattern,
    precision: Option<u32>,
    unit: DisplayUnit,
    beautify: bool,
}

impl ValueFormatter {
    pub fn create(options: FormatterOptions) -> Self {
        let pattern = options
            .format
            .as_deref()
            .map(parse_format)
            .unwrap_or_default();
        let selector = if options.value != DISPLAY_UNITS_AUTO {
            options.value
        } else {
            options.value2.unwrap_or(DISPLAY_UNITS_AUTO)
        };
        let pinned = options.value != DISPLAY_UNITS_AUTO;
        Self {
            pattern,
            precision: options.precision,
            unit: DisplayUnit::from_selector(selector),
            beautify: options.allow_beautification && !pinned,
        }
    }

    /// Format one raw value into its display string.
    pub fn format(&self, value: f64) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }
        if value.is_infinite() {
            return if value > 0.0 { "+Infinity" } else { "-Infinity" }.to_string();
        }
        let value = if self.pattern.percent {
            value * 100.0
        } else {
            value
        };
        let unit = if self.beautify && self.unit != DisplayUnit::None {
            // Not pinned: pick the unit matching this value's magnitude
            // when it reads better than the inferred one.
            DisplayUnit::from_magnitude(value)
        } else {
            self.unit
        };
        let scaled = value / unit.base();
        let decimals = self.precision.or(self.pattern.decimals);
        let group = unit == DisplayUnit::None;
        let body = match decimals {
            Some(d) => format_fixed(scaled, d, group),
            None => format_trimmed(scaled, group),
        };
        format!(
            "{}{}{}{}",
            self.pattern.prefix,
            body,
            unit.suffix(),
            self.pattern.suffix
        )
    }
}

/// Fixed-decimal rendering with optional thousands grouping.
fn format_fixed(value: f64, decimals: u32, group: bool) -> String {
    let rendered = format!("{:.*}", decimals as usize, value);
    if group { group_digits(&rendered) } else { rendered }
}

/// Render with up to two decimals, trimming trailing zeros.
fn format_trimmed(value: f64, group: bool) -> String {
    let mut rendered = format!("{:.2}", value);
    while rendered.contains('.') && (rendered.ends_with('0') || rendered.ends_with('.')) {
        rendered.pop();
    }
    if group { group_digits(&rendered) } else { rendered }
}

fn group_digits(rendered: &str) -> String {
    let (body, frac) = match rendered.split_once('.') {
        Some((b, f)) => (b, Some(f)),
        None => (rendered, None),
    };
    let (sign, digits) = match body.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", body),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let mut out = format!("{sign}{grouped}");
    if let Some(frac) = frac {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Memoizes formatter instances per format string for one layout pass.
/// Points without an explicit format collapse onto a single shared default
/// slot so they render with consistent units. Rebuilt every pass; no
/// eviction.
#[derive(Default)]
pub struct FormatterCache {
    default_slot: Option<Rc<ValueFormatter>>,
    by_format: HashMap<String, Rc<ValueFormatter>>,
}

impl FormatterCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(
        &mut self,
        format_string: Option<&str>,
        settings: &LabelSettings,
        unit_override: Option<f64>,
    ) -> Rc<ValueFormatter> {
        let format_string = format_string.filter(|s| !s.is_empty());
        let build = |format: Option<&str>| {
            Rc::new(ValueFormatter::create(FormatterOptions {
                format: format.map(str::to_string),
                precision: settings.precision,
                value: settings.display_units,
                value2: unit_override,
                allow_beautification: settings.display_units == DISPLAY_UNITS_AUTO,
            }))
        };
        match format_string {
            Some(format) => {
                if let Some(existing) = self.by_format.get(format) {
                    return Rc::clone(existing);
                }
                let formatter = build(Some(format));
                self.by_format
                    .insert(format.to_string(), Rc::clone(&formatter));
                formatter
            }
            None => match &self.default_slot {
                Some(existing) => Rc::clone(existing),
                None => {
                    let formatter = build(None);
                    self.default_slot = Some(Rc::clone(&formatter));
                    formatter
                }
            },
        }
    }
}

/// Produces the final truncated, unit-scaled label string for a data
/// point. Callers substitute blank sentinels upstream; this only formats
/// and truncates.
pub struct LabelTextBuilder<'a> {
    cache: FormatterCache,
    measurer: &'a TextMeasurer,
    settings: &'a LabelSettings,
    font: FontProps,
    max_width: f32,
    unit_override: Option<f64>,
}

impl<'a> LabelTextBuilder<'a> {
    pub fn new(
        measurer: &'a TextMeasurer,
        settings: &'a LabelSettings,
        config: &LabelConfig,
    ) -> Self {
        Self {
            cache: FormatterCache::new(),
            measurer,
            settings,
            font: config.font(),
            max_width: config.max_label_width,
            unit_override: None,
        }
    }

    /// Supply an axis-inferred display unit used when settings say auto.
    pub fn with_unit_override(mut self, unit_override: Option<f64>) -> Self {
        self.unit_override = unit_override;
        self
    }

    pub fn font(&self) -> &FontProps {
        &self.font
    }

    pub fn formatter(&mut self, format_string: Option<&str>) -> Rc<ValueFormatter> {
        self.cache
            .get_or_create(format_string, self.settings, self.unit_override)
    }

    /// Format and truncate one value. `max_width` falls back to the
    /// configured default; an explicit formatter override bypasses the
    /// cache.
    pub fn format_value(
        &mut self,
        value: f64,
        max_width: Option<f32>,
        format_string: Option<&str>,
        formatter_override: Option<&Rc<ValueFormatter>>,
    ) -> String {
        let formatter = match formatter_override {
            Some(f) => Rc::clone(f),
            None => self.formatter(format_string),
        };
        let raw = formatter.format(value);
        let max_width = max_width.unwrap_or(self.max_width);
        self.measurer.tailor_or_default(&raw, &self.font, max_width)
    }
}

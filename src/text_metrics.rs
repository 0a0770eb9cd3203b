//! Text measurement for label sizing and truncation.
//!
//! Widths come from real glyph advances (fontdb + ttf-parser) when a
//! matching face is installed, with a calibrated per-character fallback
//! table otherwise. The measurer is an explicit value constructed once at
//! composition time and passed down; only the system font database is a
//! process-wide shared resource.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

pub const ELLIPSIS: &str = "...";

/// System fonts are expensive to enumerate; load them once per process and
/// share the database across all measurer instances.
static FONT_DB: Lazy<Database> = Lazy::new(|| {
    let mut db = Database::new();
    db.load_system_fonts();
    db
});

/// Font properties a label is measured and committed with. Candidates must
/// be measured with the same properties they are later rendered with.
#[derive(Debug, Clone, PartialEq)]
pub struct FontProps {
    pub family: String,
    pub size: f32,
}

impl FontProps {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }
}

impl Default for FontProps {
    fn default() -> Self {
        Self {
            family: "Inter, Segoe UI, system-ui, sans-serif".to_string(),
            size: 12.0,
        }
    }
}

pub struct TextMeasurer {
    inner: Mutex<MeasurerState>,
    /// Skip font lookup entirely and use the calibrated character table.
    /// Deterministic across machines; used by tests and font-less hosts.
    fast_metrics: bool,
    line_height: f32,
}

struct MeasurerState {
    faces: HashMap<String, Option<FaceMetrics>>,
}

impl TextMeasurer {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MeasurerState {
                faces: HashMap::new(),
            }),
            fast_metrics: false,
            line_height: 1.25,
        }
    }

    pub fn fast() -> Self {
        Self {
            fast_metrics: true,
            ..Self::new()
        }
    }

    /// Pixel width of `text` at the given font properties.
    pub fn measure_width(&self, text: &str, font: &FontProps) -> f32 {
        if text.is_empty() || font.size <= 0.0 {
            return 0.0;
        }
        if self.fast_metrics {
            return fallback_width(text, font.size);
        }
        let Ok(mut state) = self.inner.lock() else {
            return fallback_width(text, font.size);
        };
        let key = normalize_family_key(&font.family);
        if !state.faces.contains_key(&key) {
            let face = load_face(&font.family);
            state.faces.insert(key.clone(), face);
        }
        match state.faces.get(&key).and_then(|f| f.as_ref()) {
            Some(face) => face.measure_width(text, font.size),
            None => fallback_width(text, font.size),
        }
    }

    /// Estimated height of a single line of text at the given font.
    pub fn estimate_height(&self, font: &FontProps) -> f32 {
        font.size * self.line_height
    }

    /// Return `text` unchanged when it fits in `max_width`, otherwise the
    /// longest prefix that fits with an appended ellipsis. Degrades to the
    /// bare ellipsis when even one character is too wide, and to an empty
    /// string when the ellipsis itself exceeds `max_width`, so the result
    /// never measures wider than the limit.
    pub fn tailor_or_default(&self, text: &str, font: &FontProps, max_width: f32) -> String {
        if self.measure_width(text, font) <= max_width {
            return text.to_string();
        }
        if self.measure_width(ELLIPSIS, font) > max_width {
            return String::new();
        }
        let chars: Vec<char> = text.chars().collect();
        // Binary search the longest fitting prefix; widths are monotone in
        // prefix length.
        let mut lo = 0usize;
        let mut hi = chars.len();
        while lo < hi {
            let mid = (lo + hi).div_ceil(2);
            let candidate: String = chars[..mid].iter().collect::<String>() + ELLIPSIS;
            if self.measure_width(&candidate, font) <= max_width {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        let mut out: String = chars[..lo].iter().collect();
        out.push_str(ELLIPSIS);
        out
    }
}

impl Default for TextMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

/// ASCII advance table extracted from a parsed face. Non-ASCII characters
/// fall back to the calibrated table, which keeps the measurer free of
/// self-referential face storage.
struct FaceMetrics {
    units_per_em: u16,
    ascii_advances: [u16; 128],
}

impl FaceMetrics {
    fn from_face(face: &Face) -> Self {
        let mut advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        Self {
            units_per_em: face.units_per_em().max(1),
            ascii_advances: advances,
        }
    }

    fn measure_width(&self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em as f32;
        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = if ch.is_ascii() {
                self.ascii_advances[ch as usize]
            } else {
                0
            };
            if advance == 0 {
                width += char_width_factor(ch) * font_size;
            } else {
                width += advance as f32 * scale;
            }
        }
        width.max(0.0)
    }
}

fn load_face(font_family: &str) -> Option<FaceMetrics> {
    let mut names: Vec<String> = Vec::new();
    let mut generics: Vec<Family<'static>> = Vec::new();
    for part in font_family.split(',') {
        let raw = part.trim().trim_matches('"').trim_matches('\'');
        if raw.is_empty() {
            continue;
        }
        match raw.to_ascii_lowercase().as_str() {
            "serif" => generics.push(Family::Serif),
            "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                generics.push(Family::SansSerif)
            }
            "monospace" | "ui-monospace" => generics.push(Family::Monospace),
            "cursive" => generics.push(Family::Cursive),
            "fantasy" => generics.push(Family::Fantasy),
            _ => names.push(raw.to_string()),
        }
    }

    let mut families: Vec<Family<'_>> = names.iter().map(|n| Family::Name(n.as_str())).collect();
    families.extend(generics);
    if families.is_empty() {
        families.push(Family::SansSerif);
    }

    let query = Query {
        families: &families,
        weight: Weight::NORMAL,
        stretch: Stretch::Normal,
        style: Style::Normal,
    };
    let id = FONT_DB.query(&query)?;
    let mut metrics = None;
    FONT_DB.with_face_data(id, |data, index| {
        if let Ok(face) = Face::parse(data, index) {
            metrics = Some(FaceMetrics::from_face(&face));
        }
    });
    metrics
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}

fn fallback_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

/// Calibrated per-character width fractions for the default UI font stack
/// at a 16px measurement baseline.
fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.306,
        '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' | '\'' => 0.321,
        'i' | 'j' | 'l' => 0.24,
        'f' | 't' | 'r' => 0.34,
        'I' => 0.272,
        'm' | 'M' | 'w' | 'W' => 0.89,
        '@' | '#' | '%' | '&' => 0.946,
        '0'..='9' | '$' => 0.6,
        'A'..='Z' => 0.66,
        _ => 0.56,
    }
}

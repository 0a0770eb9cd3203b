//! Shared geometry types for the label layout pipeline.

/// Clipping bounds for one layout pass. Supplied fresh on every call and
/// never cached across resizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle: (x, y, width, height).
pub type Rect = (f32, f32, f32, f32);

pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.0 < b.0 + b.2 && b.0 < a.0 + a.2 && a.1 < b.1 + b.3 && b.1 < a.1 + a.3
}

/// Linear domain-to-pixel mapping. Pixel space grows downward, so the
/// range is typically inverted: domain max maps to pixel 0.
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f32, f32),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f32, f32)) -> Self {
        Self { domain, range }
    }

    pub fn scale(&self, value: f64) -> f32 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if (d1 - d0).abs() < f64::EPSILON {
            return r0;
        }
        let t = (value - d0) / (d1 - d0);
        r0 + (r1 - r0) * t as f32
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }
}

/// Horizontal text anchoring, matching the SVG `text-anchor` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    Start,
    #[default]
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// One prospective label for one data point: pre-formatted text, measured
/// box, untranslated anchor. Immutable once built; placement decisions
/// are threaded forward into `PlacedLabel` rather than written back.
#[derive(Debug, Clone)]
pub struct LabelCandidate {
    /// Stable identity of the underlying data point; unique per pass.
    pub owner_key: String,
    /// Anchor before collision adjustment: x per `anchor`, y at the text
    /// baseline.
    pub anchor_x: f32,
    pub anchor_y: f32,
    pub text: String,
    pub width: f32,
    pub height: f32,
    pub fill: String,
    pub anchor: TextAnchor,
    /// Set by the shape-fit phase; affects color resolution upstream.
    pub inside_shape: bool,
}

impl LabelCandidate {
    /// Bounding box at the candidate anchor, honoring the text anchor.
    pub fn bounding_rect(&self) -> Rect {
        let left = match self.anchor {
            TextAnchor::Start => self.anchor_x,
            TextAnchor::Middle => self.anchor_x - self.width / 2.0,
            TextAnchor::End => self.anchor_x - self.width,
        };
        (left, self.anchor_y - self.height, self.width, self.height)
    }
}

/// A label that survived collision resolution. `x`/`y` are the original
/// candidate anchors; the resolver drops rather than nudges.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    pub owner_key: String,
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub fill: String,
    pub anchor: TextAnchor,
    pub inside_shape: bool,
}

impl PlacedLabel {
    pub fn from_candidate(candidate: &LabelCandidate) -> Self {
        Self {
            owner_key: candidate.owner_key.clone(),
            x: candidate.anchor_x,
            y: candidate.anchor_y,
            text: candidate.text.clone(),
            fill: candidate.fill.clone(),
            anchor: candidate.anchor,
            inside_shape: candidate.inside_shape,
        }
    }
}

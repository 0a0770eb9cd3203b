//! Collision resolution for data labels.
//!
//! Greedy first-wins policy: candidates are visited in their given array
//! order; a candidate whose box overlaps any previously accepted box, or
//! falls outside the viewport, is dropped outright. Later candidates
//! never bump earlier-accepted ones, and accepted labels keep their
//! original anchors. Simple, deterministic, and stable across identical
//! inputs.

use super::types::{LabelCandidate, PlacedLabel, Rect, Viewport, rects_overlap};
use std::collections::{HashMap, HashSet};

/// Accepted-box index. Same uniform-grid scheme the renderer uses for
/// obstacle queries; purely an acceleration structure, the accept/reject
/// semantics are identical to a linear scan.
struct OccupancyGrid {
    cell: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl OccupancyGrid {
    fn new(cell: f32) -> Self {
        Self {
            cell: cell.max(16.0),
            cells: HashMap::new(),
        }
    }

    fn span(&self, rect: &Rect) -> (i32, i32, i32, i32) {
        (
            (rect.0 / self.cell).floor() as i32,
            (rect.1 / self.cell).floor() as i32,
            ((rect.0 + rect.2) / self.cell).floor() as i32,
            ((rect.1 + rect.3) / self.cell).floor() as i32,
        )
    }

    fn insert(&mut self, idx: usize, rect: &Rect) {
        let (x0, y0, x1, y1) = self.span(rect);
        for ix in x0..=x1 {
            for iy in y0..=y1 {
                self.cells.entry((ix, iy)).or_default().push(idx);
            }
        }
    }

    fn query(&self, rect: &Rect) -> Vec<usize> {
        let (x0, y0, x1, y1) = self.span(rect);
        let mut seen = HashSet::new();
        let mut hits = Vec::new();
        for ix in x0..=x1 {
            for iy in y0..=y1 {
                if let Some(indices) = self.cells.get(&(ix, iy)) {
                    for &idx in indices {
                        if seen.insert(idx) {
                            hits.push(idx);
                        }
                    }
                }
            }
        }
        hits
    }
}

/// Resolve collisions among `candidates` against `viewport`.
///
/// `transform`, when present, is a translation applied to every candidate
/// box before testing: donut-style callers produce positions relative to
/// a translated origin and must be compared in absolute viewport
/// coordinates. Output order equals input order; owner keys must be
/// unique within a pass.
pub fn hide_collided_labels(
    viewport: Viewport,
    candidates: &[LabelCandidate],
    transform: Option<(f32, f32)>,
) -> Vec<PlacedLabel> {
    debug_assert!(
        {
            let mut keys = HashSet::new();
            candidates.iter().all(|c| keys.insert(c.owner_key.as_str()))
        },
        "owner keys must be unique within a layout pass"
    );

    let (dx, dy) = transform.unwrap_or((0.0, 0.0));
    let mut accepted_rects: Vec<Rect> = Vec::new();
    let mut grid = OccupancyGrid::new(48.0);
    let mut placed = Vec::new();

    for candidate in candidates {
        let local = candidate.bounding_rect();
        let rect: Rect = (local.0 + dx, local.1 + dy, local.2, local.3);

        if rect.0 < 0.0
            || rect.1 < 0.0
            || rect.0 + rect.2 > viewport.width
            || rect.1 + rect.3 > viewport.height
        {
            continue;
        }

        let collides = grid
            .query(&rect)
            .into_iter()
            .any(|idx| rects_overlap(&rect, &accepted_rects[idx]));
        if collides {
            continue;
        }

        grid.insert(accepted_rects.len(), &rect);
        accepted_rects.push(rect);
        placed.push(PlacedLabel::from_candidate(candidate));
    }

    placed
}

// THEORY:
// The `Region` module is the used-region tracker: the set of new-image pixels
// already claimed by some match. The engine only ever needs two operations
// from it, so it stays far simpler than general region algebra:
//
// 1.  **Intersection probe**: the grid generator asks "does this cell overlap
//     anything already matched?" to mask claimed cells out of finer levels.
// 2.  **Complement cover**: after the level driver finishes, the pixels the
//     region does NOT cover are reported as unmatched. The cover is computed
//     by y-banding: cut the bounds at every horizontal edge of the union,
//     then walk each band left to right emitting the gaps. Vertically
//     adjacent bands with an identical span are coalesced afterwards.
//
// The rects fed into the region are pairwise disjoint by construction: a cell
// is only matched if it survived the mask, and cells of one level never
// overlap each other. That invariant is what keeps `add` a plain push.

use crate::core_modules::rect::Rect;

/// A union of pairwise-disjoint rectangles over one buffer.
#[derive(Debug, Clone, Default)]
pub struct Region {
    rects: Vec<Rect>,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn intersects(&self, rect: &Rect) -> bool {
        self.rects.iter().any(|r| r.intersects(rect))
    }

    /// Adds a rect to the union. Callers only feed rects disjoint from the
    /// current union; the invariant is checked in debug builds.
    pub fn add(&mut self, rect: Rect) {
        debug_assert!(!self.intersects(&rect));
        self.rects.push(rect);
    }

    /// Disjoint rectangular cover of `bounds` minus this region.
    pub fn complement(&self, bounds: &Rect) -> Vec<Rect> {
        let mut cuts: Vec<u32> = vec![bounds.y, bounds.bottom()];
        for rect in &self.rects {
            if rect.intersects(bounds) {
                cuts.push(rect.y.max(bounds.y));
                cuts.push(rect.bottom().min(bounds.bottom()));
            }
        }
        cuts.sort_unstable();
        cuts.dedup();

        let mut cover = Vec::new();
        for band in cuts.windows(2) {
            let (top, bottom) = (band[0], band[1]);
            let mut spans: Vec<(u32, u32)> = self
                .rects
                .iter()
                .filter(|r| r.y < bottom && r.bottom() > top)
                .filter(|r| r.x < bounds.right() && r.right() > bounds.x)
                .map(|r| (r.x.max(bounds.x), r.right().min(bounds.right())))
                .collect();
            spans.sort_unstable();

            let mut cursor = bounds.x;
            for (left, right) in spans {
                if left > cursor {
                    cover.push(Rect::new(cursor, top, left - cursor, bottom - top));
                }
                cursor = cursor.max(right);
            }
            if cursor < bounds.right() {
                cover.push(Rect::new(cursor, top, bounds.right() - cursor, bottom - top));
            }
        }

        // Stitch bands whose gap structure repeats.
        let mut merged: Vec<Rect> = Vec::new();
        for rect in cover {
            match merged
                .iter_mut()
                .find(|m| m.x == rect.x && m.width == rect.width && m.bottom() == rect.y)
            {
                Some(m) => m.height += rect.height,
                None => merged.push(rect),
            }
        }
        merged
    }
}

// THEORY:
// The `pipeline` module is the top-level API for the diff engine. It owns the
// two pixel buffers and every piece of run state, drives the refinement loop,
// and hands back a single `DiffReport` describing what moved, what stayed,
// and what has no counterpart.
//
// The run is a quadtree-style refinement:
// 1.  **Level Driver**: Starting at `count = 1`, the new image is cut into a
//     `count x count` mesh with already-matched pixels masked out, and the
//     old image into the same mesh unmasked. The count grows by one per
//     level until no cell of at least `min_size` fits.
// 2.  **Neighborhood Search**: Each surviving new cell probes the old cells
//     within a Chebyshev radius of `range` grid steps. The origin offset is
//     probed first, then the offset box row-major; the first equal chunk
//     wins. That fixed order is what makes output deterministic.
// 3.  **Accumulation**: A match claims its new-side rect in the used region,
//     which masks it out of all finer levels. Claimed rects can therefore
//     never overlap.
// 4.  **Post-Processing**: Matched pairs that represent one common
//     translation are merged by the joiner, and the complement of the used
//     region is rectangularized into the unmatched report.

use crate::core_modules::chunk::chunk::Chunk;
use crate::core_modules::grid_manager::GridManager;
use crate::core_modules::joiner;
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::region::Region;
use anyhow::{Result, bail};
use log::{debug, trace};
use std::sync::Arc;

// Re-export the report building blocks for the public API.
pub use crate::core_modules::rect::{Alignment, Rect};

/// Tunables for one diff run.
#[derive(Debug, Clone)]
pub struct DiffConfig {
    /// Chebyshev search radius around a cell, in grid steps.
    pub range: u32,
    /// Minimum chunk side length in pixels; refinement stops below it.
    pub min_size: u32,
    /// Color tolerance in the 0-255 channel scale.
    pub threshold: f32,
    /// Whether translation-compatible neighbors are merged after the run.
    pub join: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            range: 2,
            min_size: 10,
            threshold: 0.0,
            join: true,
        }
    }
}

/// A new-image chunk and the old-image chunk it was found in. Both sides
/// always have identical width and height.
#[derive(Clone)]
pub struct MatchPair {
    pub new_chunk: Chunk,
    pub old_chunk: Chunk,
}

impl MatchPair {
    /// A match whose two sides sit at identical coordinates.
    pub fn in_place(&self) -> bool {
        self.new_chunk.rect() == self.old_chunk.rect()
    }
}

/// The primary output of a run.
pub struct DiffReport {
    pub matches: Vec<MatchPair>,
    /// Disjoint cover of the new-image pixels with no counterpart anywhere
    /// in the old image.
    pub unmatched: Vec<Rect>,
}

/// The synchronous diff engine. See `ParallelDiffPipeline` for the
/// multi-core variant producing identical output.
pub struct DiffPipeline {
    old: Arc<PixelBuffer>,
    new: Arc<PixelBuffer>,
    config: DiffConfig,
}

impl DiffPipeline {
    /// Both buffers must share dimensions; anything else is refused up
    /// front.
    pub fn new(
        old: Arc<PixelBuffer>,
        new: Arc<PixelBuffer>,
        config: DiffConfig,
    ) -> Result<Self> {
        if old.width() != new.width() || old.height() != new.height() {
            bail!(
                "Images have different sizes: {}x{} vs {}x{}",
                old.width(),
                old.height(),
                new.width(),
                new.height()
            );
        }
        Ok(Self { old, new, config })
    }

    pub fn run(&self) -> DiffReport {
        let new_grid = GridManager::new(self.new.clone(), self.config.min_size);
        let old_grid = GridManager::new(self.old.clone(), self.config.min_size);

        let mut matches: Vec<MatchPair> = Vec::new();
        let mut used = Region::new();
        let mut count = 1u32;
        loop {
            let new_cells = new_grid.cells(count, Some(&used));
            if new_cells.is_empty() {
                break;
            }
            let old_cells = old_grid.cells(count, None);
            for (index, cell) in new_cells.iter().enumerate() {
                let Some(new_chunk) = cell else { continue };
                if let Some(old_chunk) = find_match(new_chunk, &old_cells, count, index, &self.config) {
                    used.add(new_chunk.rect());
                    matches.push(MatchPair {
                        new_chunk: new_chunk.clone(),
                        old_chunk,
                    });
                }
            }
            debug!("level {count}: {} matches so far", matches.len());
            count += 1;
        }

        if self.config.join {
            joiner::join_matches(&mut matches);
        }
        let unmatched = used.complement(&self.old.rect());
        DiffReport { matches, unmatched }
    }
}

/// The first old-image chunk in the candidate neighborhood equal to
/// `new_chunk`. Cells whose rect differs in size (the last row and column
/// absorb remainder pixels) are skipped without comparing.
pub(crate) fn find_match(
    new_chunk: &Chunk,
    old_cells: &[Option<Chunk>],
    count: u32,
    index: usize,
    config: &DiffConfig,
) -> Option<Chunk> {
    for idx in candidate_indexes(count, index, config.range) {
        let Some(old_chunk) = &old_cells[idx] else {
            continue;
        };
        trace!(
            "comparing chunks new {:?} old {:?}",
            new_chunk.rect(),
            old_chunk.rect()
        );
        if old_chunk.rect().size() == new_chunk.rect().size()
            && new_chunk.matches(old_chunk, config.threshold)
        {
            return Some(old_chunk.clone());
        }
    }
    None
}

/// In-bounds cell indexes of the Chebyshev neighborhood around `index`:
/// the origin offset first, then the offset box row-major with the origin
/// skipped. The order is part of the output contract.
fn candidate_indexes(count: u32, index: usize, range: u32) -> Vec<usize> {
    let count = count as i64;
    let cell_y = index as i64 / count;
    let cell_x = index as i64 % count;
    let range = range as i64;

    let mut indexes = Vec::new();
    let mut add = |dx: i64, dy: i64| {
        let x = cell_x + dx;
        if x < 0 || x >= count {
            return;
        }
        let y = cell_y + dy;
        if y < 0 || y >= count {
            return;
        }
        indexes.push((y * count + x) as usize);
    };
    add(0, 0);
    for dy in -range..=range {
        for dx in -range..=range {
            if dx != 0 || dy != 0 {
                add(dx, dy);
            }
        }
    }
    indexes
}

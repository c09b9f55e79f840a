// THEORY:
// The `GridManager` slices a pixel buffer into the `count x count` mesh the
// level driver walks at each refinement step. It is the data-transformation
// stage between a raw buffer and the chunk-based matching paradigm: the
// driver only asks it for cells, never touches pixel math itself.
//
// Key architectural principles:
// 1.  **Sparse, Index-Preserving Output**: The result is a `count x count`
//     vector of optional chunks in row-major order. Cells masked out by the
//     used region are returned as `None` rather than omitted, so a cell's
//     position in the vector is always its grid coordinate. The neighborhood
//     search depends on that.
// 2.  **Remainder Absorption**: When the buffer does not divide evenly, the
//     leftover pixels are absorbed by the last column and row instead of
//     spilling into a ragged extra row of undersized cells.
// 3.  **Termination Signal**: An empty vector means no cell of at least
//     `min_size` fits at this count. The level driver treats that as the end
//     of refinement.

use crate::core_modules::chunk::chunk::Chunk;
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::rect::Rect;
use crate::core_modules::region::Region;
use std::sync::Arc;

pub struct GridManager {
    buffer: Arc<PixelBuffer>,
    min_size: u32,
}

impl GridManager {
    pub fn new(buffer: Arc<PixelBuffer>, min_size: u32) -> Self {
        Self { buffer, min_size }
    }

    /// The cell mesh for one level. `mask` drops cells that overlap pixels
    /// already claimed by a match. At `count == 1` the single cell covers the
    /// whole buffer and the mask must be empty.
    pub fn cells(&self, count: u32, mask: Option<&Region>) -> Vec<Option<Chunk>> {
        if count == 1 {
            debug_assert!(mask.is_none_or(|m| m.is_empty()));
            return vec![Some(Chunk::new(self.buffer.clone(), self.buffer.rect()))];
        }
        debug_assert!(count > 1);
        let cell_width = self.buffer.width() / count;
        let cell_height = self.buffer.height() / count;
        if cell_width < self.min_size || cell_height < self.min_size {
            return Vec::new();
        }
        let width_extra = self.buffer.width() - cell_width * count;
        let height_extra = self.buffer.height() - cell_height * count;

        let mut cells = Vec::with_capacity(count as usize * count as usize);
        for cy in 0..count {
            for cx in 0..count {
                let rect = Rect::new(
                    cx * cell_width,
                    cy * cell_height,
                    cell_width + if cx + 1 == count { width_extra } else { 0 },
                    cell_height + if cy + 1 == count { height_extra } else { 0 },
                );
                if mask.is_some_and(|m| m.intersects(&rect)) {
                    cells.push(None);
                } else {
                    cells.push(Some(Chunk::new(self.buffer.clone(), rect)));
                }
            }
        }
        cells
    }
}

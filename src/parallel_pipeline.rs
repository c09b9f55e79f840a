// THEORY:
// The parallel pipeline produces the same `DiffReport` as the synchronous
// `DiffPipeline`, but fans the expensive part (the per-cell candidate
// searches) across a worker set sized to the machine.
//
// Parallelism only ever happens inside one grid level. The levels themselves
// stay sequential because each level's mesh depends on the used region built
// by the previous ones, while within a level every cell's search is
// independent: the mesh was generated before the level started and cells of
// one level never overlap, so a match recorded for one cell cannot mask a
// sibling. Each worker takes a contiguous slice of the populated cells in
// row-major order and the results are stitched back in task order, which
// keeps match order, the used region, and therefore the final report
// bit-identical to the synchronous driver.

use crate::core_modules::chunk::chunk::Chunk;
use crate::core_modules::grid_manager::GridManager;
use crate::core_modules::joiner;
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::region::Region;
use crate::pipeline::{self, DiffConfig, DiffPipeline, DiffReport, MatchPair};
use anyhow::Result;
use futures::future::join_all;
use log::debug;
use std::sync::Arc;

pub struct ParallelDiffPipeline {
    old: Arc<PixelBuffer>,
    new: Arc<PixelBuffer>,
    config: DiffConfig,
    workers: usize,
}

impl ParallelDiffPipeline {
    pub fn new(
        old: Arc<PixelBuffer>,
        new: Arc<PixelBuffer>,
        config: DiffConfig,
    ) -> Result<Self> {
        // Same dimension guard as the synchronous engine.
        DiffPipeline::new(old.clone(), new.clone(), config.clone())?;
        Ok(Self {
            old,
            new,
            config,
            workers: num_cpus::get().max(1),
        })
    }

    pub async fn run(&self) -> Result<DiffReport> {
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
            let old_cells = Arc::new(old_grid.cells(count, None));

            let populated: Vec<(usize, Chunk)> = new_cells
                .into_iter()
                .enumerate()
                .filter_map(|(index, cell)| cell.map(|chunk| (index, chunk)))
                .collect();
            let stride = populated.len().div_ceil(self.workers).max(1);

            let mut tasks = Vec::new();
            for slice in populated.chunks(stride) {
                let slice = slice.to_vec();
                let old_cells = old_cells.clone();
                let config = self.config.clone();
                tasks.push(tokio::task::spawn_blocking(move || {
                    slice
                        .into_iter()
                        .filter_map(|(index, new_chunk)| {
                            pipeline::find_match(&new_chunk, &old_cells, count, index, &config)
                                .map(|old_chunk| MatchPair {
                                    new_chunk,
                                    old_chunk,
                                })
                        })
                        .collect::<Vec<MatchPair>>()
                }));
            }
            for task in join_all(tasks).await {
                for pair in task? {
                    used.add(pair.new_chunk.rect());
                    matches.push(pair);
                }
            }
            debug!("level {count}: {} matches so far", matches.len());
            count += 1;
        }

        if self.config.join {
            joiner::join_matches(&mut matches);
        }
        let unmatched = used.complement(&self.old.rect());
        Ok(DiffReport { matches, unmatched })
    }
}

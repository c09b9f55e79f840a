// THEORY:
// The joiner is the spatial post-processing stage. The level driver reports
// matches at whatever cell granularity they were found, so a region that
// moved as one piece usually arrives as a run of small neighboring pairs.
// This stage fuses them back together.
//
// Two pairs may merge only when the merge preserves a pure translation:
// their new-side chunks must be edge-aligned in some direction AND their
// old-side chunks must be aligned in that same direction. In-place matches
// never participate (they are reported separately), and transparent matches
// never fuse with visible ones.
//
// The scan is a fixed point: after every successful merge the pass restarts,
// because the grown rect may align with pairs that were already skipped.
// Each merge removes one element, so the loop terminates.

use crate::pipeline::MatchPair;
use log::{debug, trace};

/// Merges translation-compatible neighboring pairs in place until no more
/// merges apply. Running it again on its own output changes nothing.
pub fn join_matches(matches: &mut Vec<MatchPair>) {
    loop {
        let mut modified = false;
        'scan: for i in 0..matches.len() {
            if matches[i].in_place() {
                continue;
            }
            for j in (i + 1)..matches.len() {
                if matches[i].new_chunk.all_transparent() != matches[j].new_chunk.all_transparent()
                {
                    continue;
                }
                let aligned = matches[i].new_chunk.alignment(&matches[j].new_chunk);
                trace!(
                    "probing join {:?} {:?} -> {:?}",
                    matches[i].new_chunk.rect(),
                    matches[j].new_chunk.rect(),
                    aligned
                );
                let Some(direction) = aligned else {
                    continue;
                };
                if matches[i].old_chunk.alignment(&matches[j].old_chunk) == Some(direction) {
                    let absorbed = matches.remove(j);
                    matches[i].new_chunk.absorb(&absorbed.new_chunk);
                    matches[i].old_chunk.absorb(&absorbed.old_chunk);
                    debug!(
                        "match {i} grew to {:?} by absorbing {:?}",
                        matches[i].new_chunk.rect(),
                        absorbed.new_chunk.rect()
                    );
                    modified = true;
                    break 'scan;
                }
            }
        }
        if !modified {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::join_matches;
    use crate::core_modules::chunk::chunk::Chunk;
    use crate::core_modules::pixel::pixel::Pixel;
    use crate::core_modules::pixel_buffer::PixelBuffer;
    use crate::core_modules::rect::Rect;
    use crate::pipeline::MatchPair;
    use std::sync::Arc;

    fn solid(width: u32, height: u32, pixel: Pixel) -> Arc<PixelBuffer> {
        Arc::new(PixelBuffer::from_raw(
            width,
            height,
            vec![pixel; width as usize * height as usize],
        ))
    }

    fn pair(
        old: &Arc<PixelBuffer>,
        new: &Arc<PixelBuffer>,
        old_rect: Rect,
        new_rect: Rect,
    ) -> MatchPair {
        MatchPair {
            new_chunk: Chunk::new(new.clone(), new_rect),
            old_chunk: Chunk::new(old.clone(), old_rect),
        }
    }

    #[test]
    fn common_translation_fuses_into_one_pair() {
        let old = solid(100, 100, Pixel::new(9, 9, 9, 255));
        let new = solid(100, 100, Pixel::new(9, 9, 9, 255));
        let mut matches = vec![
            pair(&old, &new, Rect::new(0, 0, 10, 10), Rect::new(50, 0, 10, 10)),
            pair(
                &old,
                &new,
                Rect::new(10, 0, 10, 10),
                Rect::new(60, 0, 10, 10),
            ),
        ];
        join_matches(&mut matches);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].old_chunk.rect(), Rect::new(0, 0, 20, 10));
        assert_eq!(matches[0].new_chunk.rect(), Rect::new(50, 0, 20, 10));
    }

    #[test]
    fn different_displacements_stay_apart() {
        let old = solid(100, 100, Pixel::new(9, 9, 9, 255));
        let new = solid(100, 100, Pixel::new(9, 9, 9, 255));
        // New sides touch, but the old sides sit apart: no shared direction.
        let mut matches = vec![
            pair(&old, &new, Rect::new(0, 0, 10, 10), Rect::new(50, 0, 10, 10)),
            pair(
                &old,
                &new,
                Rect::new(30, 0, 10, 10),
                Rect::new(60, 0, 10, 10),
            ),
        ];
        join_matches(&mut matches);
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn in_place_matches_are_never_joined() {
        let old = solid(100, 100, Pixel::new(9, 9, 9, 255));
        let new = solid(100, 100, Pixel::new(9, 9, 9, 255));
        let mut matches = vec![
            pair(&old, &new, Rect::new(0, 0, 10, 10), Rect::new(0, 0, 10, 10)),
            pair(
                &old,
                &new,
                Rect::new(10, 0, 10, 10),
                Rect::new(10, 0, 10, 10),
            ),
        ];
        join_matches(&mut matches);
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn transparent_and_visible_matches_never_cross_join() {
        let old = solid(100, 100, Pixel::new(9, 9, 9, 255));
        let new = solid(100, 100, Pixel::new(9, 9, 9, 255));
        let clear_old = solid(100, 100, Pixel::new(0, 0, 0, 0));
        let clear_new = solid(100, 100, Pixel::new(0, 0, 0, 0));
        let mut matches = vec![
            pair(
                &clear_old,
                &clear_new,
                Rect::new(0, 0, 10, 10),
                Rect::new(50, 0, 10, 10),
            ),
            pair(
                &old,
                &new,
                Rect::new(10, 0, 10, 10),
                Rect::new(60, 0, 10, 10),
            ),
        ];
        join_matches(&mut matches);
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn vertical_runs_fuse_too() {
        let old = solid(100, 100, Pixel::new(9, 9, 9, 255));
        let new = solid(100, 100, Pixel::new(9, 9, 9, 255));
        let mut matches = vec![
            pair(&old, &new, Rect::new(0, 0, 10, 10), Rect::new(50, 20, 10, 10)),
            pair(
                &old,
                &new,
                Rect::new(0, 10, 10, 10),
                Rect::new(50, 30, 10, 10),
            ),
        ];
        join_matches(&mut matches);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].old_chunk.rect(), Rect::new(0, 0, 10, 20));
        assert_eq!(matches[0].new_chunk.rect(), Rect::new(50, 20, 10, 20));
    }

    #[test]
    fn joining_is_idempotent() {
        let old = solid(100, 100, Pixel::new(9, 9, 9, 255));
        let new = solid(100, 100, Pixel::new(9, 9, 9, 255));
        let mut matches = vec![
            pair(&old, &new, Rect::new(0, 0, 10, 10), Rect::new(50, 0, 10, 10)),
            pair(
                &old,
                &new,
                Rect::new(10, 0, 10, 10),
                Rect::new(60, 0, 10, 10),
            ),
            pair(
                &old,
                &new,
                Rect::new(0, 10, 20, 10),
                Rect::new(50, 10, 20, 10),
            ),
        ];
        join_matches(&mut matches);
        let once: Vec<_> = matches
            .iter()
            .map(|p| (p.old_chunk.rect(), p.new_chunk.rect()))
            .collect();
        join_matches(&mut matches);
        let twice: Vec<_> = matches
            .iter()
            .map(|p| (p.old_chunk.rect(), p.new_chunk.rect()))
            .collect();
        assert_eq!(once, twice);
    }
}

// The --dump-images renderer. Composes a human-checkable picture of a run:
// the new capture as the base with the old capture ghosted over it, moved
// regions filled yellow, unmatched regions filled green, both outlined.
// In-place matches are left untouched so the interesting regions stand out.

use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::rect::Rect;
use crate::pipeline::DiffReport;
use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect as DrawRect;
use std::path::Path;

/// Where `--dump-images` writes its overlay.
pub const DUMP_PATH: &str = "/tmp/shift_vision-dump.png";

const GHOST_OPACITY: f32 = 0.3;
const FILL_OPACITY: f32 = 0.5;
const MOVED_FILL: Rgba<u8> = Rgba([255, 255, 0, 255]);
const UNMATCHED_FILL: Rgba<u8> = Rgba([0, 255, 0, 255]);
const OUTLINE: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Builds the annotated overlay image for a finished run.
pub fn render(old: &PixelBuffer, new: &PixelBuffer, report: &DiffReport) -> RgbaImage {
    let mut canvas = to_image(new);
    ghost_over(&mut canvas, old);
    for pair in &report.matches {
        if pair.in_place() {
            continue;
        }
        fill_rect(&mut canvas, &pair.new_chunk.rect(), MOVED_FILL);
        outline_rect(&mut canvas, &pair.new_chunk.rect());
    }
    for rect in &report.unmatched {
        fill_rect(&mut canvas, rect, UNMATCHED_FILL);
        outline_rect(&mut canvas, rect);
    }
    canvas
}

/// Renders and writes the overlay to `path`.
pub fn dump(
    old: &PixelBuffer,
    new: &PixelBuffer,
    report: &DiffReport,
    path: &Path,
) -> Result<()> {
    render(old, new, report)
        .save(path)
        .with_context(|| format!("Failed to write overlay to {}", path.display()))
}

fn to_image(buffer: &PixelBuffer) -> RgbaImage {
    let mut image = RgbaImage::new(buffer.width(), buffer.height());
    for (x, y, sample) in image.enumerate_pixels_mut() {
        let pixel = buffer.pixel(x, y);
        *sample = Rgba([pixel.red, pixel.green, pixel.blue, pixel.alpha]);
    }
    image
}

fn blend(base: u8, over: u8, opacity: f32) -> u8 {
    (over as f32 * opacity + base as f32 * (1.0 - opacity)).round() as u8
}

fn ghost_over(canvas: &mut RgbaImage, source: &PixelBuffer) {
    for (x, y, sample) in canvas.enumerate_pixels_mut() {
        let over = source.pixel(x, y);
        sample.0 = [
            blend(sample.0[0], over.red, GHOST_OPACITY),
            blend(sample.0[1], over.green, GHOST_OPACITY),
            blend(sample.0[2], over.blue, GHOST_OPACITY),
            255,
        ];
    }
}

fn fill_rect(canvas: &mut RgbaImage, rect: &Rect, color: Rgba<u8>) {
    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            let sample = canvas.get_pixel_mut(x, y);
            sample.0 = [
                blend(sample.0[0], color.0[0], FILL_OPACITY),
                blend(sample.0[1], color.0[1], FILL_OPACITY),
                blend(sample.0[2], color.0[2], FILL_OPACITY),
                255,
            ];
        }
    }
}

fn outline_rect(canvas: &mut RgbaImage, rect: &Rect) {
    draw_hollow_rect_mut(
        canvas,
        DrawRect::at(rect.x as i32, rect.y as i32).of_size(rect.width, rect.height),
        OUTLINE,
    );
}

#[cfg(test)]
mod tests {
    use super::render;
    use crate::core_modules::pixel::pixel::Pixel;
    use crate::core_modules::pixel_buffer::PixelBuffer;
    use crate::core_modules::rect::Rect;
    use crate::pipeline::{DiffReport, MatchPair};
    use crate::core_modules::chunk::chunk::Chunk;
    use std::sync::Arc;

    #[test]
    fn overlay_recolors_moved_and_unmatched_regions() {
        let old = PixelBuffer::from_raw(40, 40, vec![Pixel::new(0, 0, 0, 255); 1600]);
        let new = PixelBuffer::from_raw(40, 40, vec![Pixel::new(0, 0, 0, 255); 1600]);
        let shared = Arc::new(PixelBuffer::from_raw(
            40,
            40,
            vec![Pixel::new(0, 0, 0, 255); 1600],
        ));
        let report = DiffReport {
            matches: vec![MatchPair {
                new_chunk: Chunk::new(shared.clone(), Rect::new(20, 20, 10, 10)),
                old_chunk: Chunk::new(shared, Rect::new(0, 0, 10, 10)),
            }],
            unmatched: vec![Rect::new(0, 30, 10, 10)],
        };
        let image = render(&old, &new, &report);

        // Inside the moved fill (off the outline): yellow pulled toward base.
        let moved = image.get_pixel(25, 25);
        assert!(moved.0[0] > 100 && moved.0[1] > 100 && moved.0[2] < 50);
        // Inside the unmatched fill: green dominates.
        let unmatched = image.get_pixel(5, 35);
        assert!(unmatched.0[1] > 100 && unmatched.0[0] < 50);
        // Outline pixels are darkened to black.
        assert_eq!(image.get_pixel(20, 20).0, [0, 0, 0, 255]);
        // Untouched area stays the blended base.
        assert_eq!(image.get_pixel(5, 5).0, [0, 0, 0, 255]);
    }
}

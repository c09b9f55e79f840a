// THEORY:
// The `PixelBuffer` is the immutable ground truth a whole run works against.
// It is decoded once per input image and then only ever read: every `Chunk`
// produced by the grid holds a shared handle to one of the two buffers and
// resolves its pixels through it, so no pixel data is ever duplicated.
//
// Addressing is flat and row-major (`pixels[y * width + x]`), which keeps the
// per-pixel lookup O(1) and the decode loop a single pass over the raw RGBA
// byte stream.

use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::rect::Rect;
use anyhow::{Context, Result};
use std::path::Path;

pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

impl PixelBuffer {
    /// Decodes an image file into a buffer. Any format the `image` crate
    /// recognizes is accepted; everything is normalized to RGBA.
    pub fn load(path: &Path) -> Result<PixelBuffer> {
        let decoded =
            image::open(path).with_context(|| format!("Failed to decode {}", path.display()))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for sample in rgba.as_raw().chunks_exact(4) {
            pixels.push(Pixel::from(sample));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Builds a buffer from already-decoded samples, row-major. `pixels` must
    /// hold exactly `width * height` entries.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<Pixel>) -> PixelBuffer {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The whole buffer as a rect anchored at the origin.
    pub fn rect(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn pixel(&self, x: u32, y: u32) -> &Pixel {
        debug_assert!(x < self.width);
        debug_assert!(y < self.height);
        &self.pixels[y as usize * self.width as usize + x as usize]
    }
}

// THEORY:
// The `Chunk` module represents the unit of comparison for the whole engine:
// a rectangular window over one of the two pixel buffers. It is the bridge
// between raw pixel data and the block-matching search.
//
// Key architectural principles:
// 1.  **Window, Not Copy**: A chunk never owns pixel data. It carries a shared
//     handle to its buffer plus a rect, and resolves chunk-relative
//     coordinates through the buffer on demand. Creating a chunk is cheap in
//     memory no matter how large its rect is.
// 2.  **Eager Transparency Flag**: Whether every pixel in the window is fully
//     transparent is scanned once at construction. Two all-transparent chunks
//     of the same size compare equal no matter what RGB values the dead
//     pixels carry, and the flag also keeps transparent and visible matches
//     from being merged into one region later.
// 3.  **First-Mismatch Exit**: Equality walks the window row-major and bails
//     on the first pixel pair the comparator rejects, so grossly different
//     blocks cost almost nothing to reject.

pub mod chunk {
    use crate::core_modules::pixel::pixel::Pixel;
    use crate::core_modules::pixel_buffer::PixelBuffer;
    use crate::core_modules::rect::{Alignment, Rect};
    use std::sync::Arc;

    /// A rectangular window over a shared pixel buffer.
    #[derive(Clone)]
    pub struct Chunk {
        buffer: Arc<PixelBuffer>,
        rect: Rect,
        all_transparent: bool,
    }

    impl Chunk {
        /// Creates a window over `rect` and scans it for the transparency
        /// flag. `rect` must be non-empty and lie inside the buffer.
        pub fn new(buffer: Arc<PixelBuffer>, rect: Rect) -> Self {
            debug_assert!(rect.width > 0 && rect.height > 0);
            debug_assert!(rect.right() <= buffer.width());
            debug_assert!(rect.bottom() <= buffer.height());
            let mut all_transparent = true;
            'scan: for y in 0..rect.height {
                for x in 0..rect.width {
                    if buffer.pixel(rect.x + x, rect.y + y).alpha != 0 {
                        all_transparent = false;
                        break 'scan;
                    }
                }
            }
            Self {
                buffer,
                rect,
                all_transparent,
            }
        }

        pub fn rect(&self) -> Rect {
            self.rect
        }

        pub fn width(&self) -> u32 {
            self.rect.width
        }

        pub fn height(&self) -> u32 {
            self.rect.height
        }

        pub fn all_transparent(&self) -> bool {
            self.all_transparent
        }

        /// Pixel lookup in chunk coordinates.
        pub fn pixel(&self, x: u32, y: u32) -> &Pixel {
            debug_assert!(x < self.rect.width);
            debug_assert!(y < self.rect.height);
            self.buffer.pixel(self.rect.x + x, self.rect.y + y)
        }

        /// Chunk equality under the color comparator. Only chunks of
        /// identical size may be compared; two all-transparent chunks are
        /// equal regardless of color content.
        pub fn matches(&self, other: &Chunk, threshold: f32) -> bool {
            if self.all_transparent && other.all_transparent {
                return true;
            }
            debug_assert_eq!(self.rect.size(), other.rect.size());
            for y in 0..self.rect.height {
                for x in 0..self.rect.width {
                    if !self.pixel(x, y).matches(other.pixel(x, y), threshold) {
                        return false;
                    }
                }
            }
            true
        }

        pub fn alignment(&self, other: &Chunk) -> Option<Alignment> {
            self.rect.alignment(&other.rect)
        }

        /// Grows this chunk to the bounding rect of itself and an aligned
        /// neighbour in the same buffer. The transparency flag is inherited;
        /// the joiner only merges chunks of matching parity.
        pub fn absorb(&mut self, other: &Chunk) {
            debug_assert!(self.alignment(other).is_some());
            self.rect = self.rect.united(&other.rect);
            debug_assert!(self.rect.right() <= self.buffer.width());
            debug_assert!(self.rect.bottom() <= self.buffer.height());
        }
    }
}
